pub mod cli;
pub mod profile;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "field-sync")]
#[command(about = "Sync, consolidate and query field-service job orders")]
pub struct CliConfig {
    #[arg(long, default_value = "./profile.toml")]
    pub profile: String,

    #[arg(long, help = "Override the profile page size")]
    pub page_size: Option<usize>,

    #[arg(long, default_value = "0", help = "Zero-based display page")]
    pub page: usize,

    #[arg(long, default_value = "10", help = "Records per display page")]
    pub display_size: usize,

    #[arg(long, help = "Exact match on Overall Job Status")]
    pub status: Option<String>,

    #[arg(long, help = "Substring match on Document Number")]
    pub document: Option<String>,

    #[arg(long, help = "Substring match on Equipment")]
    pub equipment: Option<String>,

    #[arg(long, help = "Scheduled date lower bound, MM/DD/YYYY")]
    pub date_start: Option<String>,

    #[arg(long, help = "Scheduled date upper bound, MM/DD/YYYY")]
    pub date_end: Option<String>,

    #[arg(long, help = "Sort field, defaults to the document key")]
    pub sort_by: Option<String>,

    #[arg(long, help = "Sort descending instead of ascending")]
    pub descending: bool,

    #[arg(long, help = "Write the full consolidated listing to this CSV file")]
    pub export_csv: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
