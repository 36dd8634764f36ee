use crate::core::consolidate::{MergePolicy, MergePolicyTable};
use crate::core::engine::ViewConfig;
use crate::core::query::{FilterSpec, SortSpec};
use chrono::NaiveDate;

// 工單清單畫面的欄位與操作名稱
pub const DOCUMENT_KEY_FIELD: &str = "Document Number";
pub const STATUS_FIELD: &str = "Overall Job Status";
pub const SCHEDULED_DATE_FIELD: &str = "Scheduled Maintenance Date";
pub const COMPLETION_DATE_FIELD: &str = "Maintenance Completion Date";
pub const ITEM_FIELD: &str = "Item";
pub const EQUIPMENT_FIELD: &str = "Equipment";

pub const LIST_OPERATION: &str = "getJobOrders";

/// Merge policies for consolidating job-order line items into one document
/// row. Anything not listed is copied from the first line seen.
pub fn merge_policies() -> MergePolicyTable {
    MergePolicyTable::new()
        .with(SCHEDULED_DATE_FIELD, MergePolicy::FirstDistinct)
        .with(ITEM_FIELD, MergePolicy::JoinDistinct)
        .with(EQUIPMENT_FIELD, MergePolicy::JoinDistinct)
        .with(COMPLETION_DATE_FIELD, MergePolicy::FirstNonEmpty)
        .with(STATUS_FIELD, MergePolicy::StatusConsensus)
}

/// The job-order list screen as engine configuration.
pub fn view_config() -> ViewConfig {
    ViewConfig {
        key_field: DOCUMENT_KEY_FIELD.to_string(),
        policies: merge_policies(),
        default_sort: SortSpec::ascending(DOCUMENT_KEY_FIELD),
    }
}

/// Builds the screen's filter from its form values. Blank inputs impose no
/// constraint, so an untouched form lists everything.
pub fn list_filter(
    status: Option<&str>,
    document: Option<&str>,
    equipment: Option<&str>,
    date_start: Option<NaiveDate>,
    date_end: Option<NaiveDate>,
) -> FilterSpec {
    let mut spec = FilterSpec::new()
        .equals(STATUS_FIELD, status.unwrap_or(""))
        .contains(DOCUMENT_KEY_FIELD, document.unwrap_or(""))
        .contains(EQUIPMENT_FIELD, equipment.unwrap_or(""));

    if let Some(start) = date_start {
        spec = spec.date_from(SCHEDULED_DATE_FIELD, start);
    }
    if let Some(end) = date_end {
        spec = spec.date_to(SCHEDULED_DATE_FIELD, end);
    }
    spec
}
