use chrono::NaiveDate;
use clap::Parser;
use field_sync::adapters::remote::{RemoteClient, RemotePageSource};
use field_sync::adapters::signer::ProfileSigner;
use field_sync::app::views::job_orders;
use field_sync::app::{export, views::job_orders::STATUS_FIELD};
use field_sync::config::profile::RemoteProfile;
use field_sync::core::query::{parse_date, SortSpec, DATE_FORMAT};
use field_sync::domain::ports::{PageSource, RequestSigner};
use field_sync::utils::{logger, validation::Validate};
use field_sync::{CliConfig, LocalStorage, PageAccumulator, SyncEngine, SyncError};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting field-sync CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 載入並驗證 profile
    let profile = match RemoteProfile::from_file(&config.profile) {
        Ok(profile) => profile,
        Err(e) => return fail(e),
    };
    if let Err(e) = profile.validate() {
        return fail(e);
    }

    let signer = Arc::new(ProfileSigner::from_profile(&profile));
    if !signer.has_credentials() {
        return fail(SyncError::MissingCredentials {
            profile: profile.profile.name.clone(),
        });
    }

    // 建立遠端來源與同步引擎
    let client = RemoteClient::new(&profile, signer);
    let source = RemotePageSource::new(
        client,
        job_orders::LIST_OPERATION,
        job_orders::DOCUMENT_KEY_FIELD,
    );
    let page_size = config.page_size.unwrap_or(profile.page_size());
    let accumulator = PageAccumulator::new(source, page_size).with_max_pages(profile.max_pages());
    let engine = SyncEngine::new(accumulator, job_orders::view_config());

    match run(&engine, &config).await {
        Ok(()) => {
            tracing::info!("✅ Sync completed successfully!");
            Ok(())
        }
        Err(e) => fail(e),
    }
}

async fn run<S: PageSource>(engine: &SyncEngine<S>, config: &CliConfig) -> field_sync::Result<()> {
    let date_start = parse_cli_date("date-start", &config.date_start)?;
    let date_end = parse_cli_date("date-end", &config.date_end)?;

    engine.sync().await?;

    let filter = job_orders::list_filter(
        config.status.as_deref(),
        config.document.as_deref(),
        config.equipment.as_deref(),
        date_start,
        date_end,
    );
    let sort = config.sort_by.as_deref().map(|field| {
        if config.descending {
            SortSpec::descending(field)
        } else {
            SortSpec::ascending(field)
        }
    });

    let window = engine.query(&filter, sort.as_ref(), config.page, config.display_size);

    println!(
        "{:<16} {:<16} {:<14} {:<14} {:<6} {}",
        "Document", "Status", "Scheduled", "Completed", "Lines", "Equipment"
    );
    for item in &window.items {
        println!(
            "{:<16} {:<16} {:<14} {:<14} {:<6} {}",
            item.document_key,
            item.text(STATUS_FIELD),
            item.text(job_orders::SCHEDULED_DATE_FIELD),
            item.text(job_orders::COMPLETION_DATE_FIELD),
            item.source_count,
            item.text(job_orders::EQUIPMENT_FIELD),
        );
    }
    println!(
        "Showing {}-{} of {} (page {} of {})",
        window.from(),
        window.to(),
        window.total_count,
        window.page_index + 1,
        window.page_count().max(1)
    );

    for (status, count) in engine.status_totals(STATUS_FIELD) {
        tracing::info!("📊 {}: {}", status, count);
    }

    if let Some(file_name) = &config.export_csv {
        // 匯出的是套用相同篩選與排序後的完整清單
        let full = engine.query(&filter, sort.as_ref(), 0, usize::MAX);
        let storage = LocalStorage::new(config.output_path.clone());
        export::export_consolidated_csv(
            &storage,
            file_name,
            &[
                job_orders::DOCUMENT_KEY_FIELD,
                STATUS_FIELD,
                job_orders::SCHEDULED_DATE_FIELD,
                job_orders::COMPLETION_DATE_FIELD,
                job_orders::ITEM_FIELD,
                job_orders::EQUIPMENT_FIELD,
            ],
            &full.items,
        )
        .await?;
        println!("📁 Exported {} records to {}", full.total_count, file_name);
    }

    Ok(())
}

fn parse_cli_date(field: &str, value: &Option<String>) -> field_sync::Result<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(text) => parse_date(text).map(Some).ok_or_else(|| {
            SyncError::InvalidConfigValueError {
                field: field.to_string(),
                value: text.clone(),
                reason: format!("Dates must be {}", DATE_FORMAT),
            }
        }),
    }
}

fn fail(e: SyncError) -> anyhow::Result<()> {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Sync failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        field_sync::utils::error::ErrorSeverity::Low => 0,
        field_sync::utils::error::ErrorSeverity::Medium => 2,
        field_sync::utils::error::ErrorSeverity::High => 1,
        field_sync::utils::error::ErrorSeverity::Critical => 3,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
