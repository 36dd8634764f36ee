pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::LocalStorage;
pub use core::accumulator::{FetchOutcome, PageAccumulator};
pub use core::engine::{SyncEngine, ViewConfig};
pub use utils::error::{Result, SyncError};
