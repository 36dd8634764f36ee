use crate::domain::model::ConsolidatedRecord;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, SyncError};

/// Writes the consolidated listing as CSV through the storage port. Columns
/// are the caller's field names plus a trailing line count; rows follow the
/// order of `records` so an exported page matches what the screen showed.
pub async fn export_consolidated_csv<S: Storage>(
    storage: &S,
    file_name: &str,
    columns: &[&str],
    records: &[ConsolidatedRecord],
) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = columns.to_vec();
    header.push("Line Count");
    writer.write_record(&header)?;

    for record in records {
        let mut row: Vec<String> = columns.iter().map(|field| record.text(field)).collect();
        row.push(record.source_count.to_string());
        writer.write_record(&row)?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| SyncError::ProcessingError {
            message: format!("CSV buffer flush failed: {}", e),
        })?;

    storage.write_file(file_name, &data).await?;
    tracing::info!("📁 Exported {} consolidated records to {}", records.len(), file_name);
    Ok(file_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RawRecord;
    use crate::utils::error::Result;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MemoryStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MemoryStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MemoryStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                SyncError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn consolidated(key: &str, equipment: &str, count: usize) -> ConsolidatedRecord {
        let raw = match json!({"Document Number": key, "Equipment": equipment}) {
            serde_json::Value::Object(map) => RawRecord::from_object("Document Number", map),
            _ => unreachable!(),
        };
        ConsolidatedRecord {
            document_key: key.to_string(),
            fields: raw.fields,
            source_count: count,
        }
    }

    #[tokio::test]
    async fn test_export_writes_header_and_rows() {
        let storage = MemoryStorage::new();
        let records = vec![
            consolidated("EQJOB1", "Main spring, Battery", 2),
            consolidated("EQJOB2", "Gear", 1),
        ];

        export_consolidated_csv(
            &storage,
            "job_orders.csv",
            &["Document Number", "Equipment"],
            &records,
        )
        .await
        .unwrap();

        let data = storage.get_file("job_orders.csv").await.unwrap();
        let content = String::from_utf8(data).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "Document Number,Equipment,Line Count");
        assert_eq!(lines[1], "EQJOB1,\"Main spring, Battery\",2");
        assert_eq!(lines[2], "EQJOB2,Gear,1");
    }
}
