use crate::domain::model::{value_text, ConsolidatedRecord, RawRecord, MIXED_STATUS};
use serde_json::Value;
use std::collections::HashMap;

/// How one named field is merged when several line items share a document key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Use the first distinct value observed in group order (schedule dates).
    FirstDistinct,
    /// Join all distinct values with ", " (Item, Equipment).
    JoinDistinct,
    /// Use the first non-empty value; leave empty if none (completion dates).
    FirstNonEmpty,
    /// Keep a unanimous value, otherwise write the `MIXED_STATUS` sentinel.
    StatusConsensus,
}

/// Per-field merge policy table. Fields without an entry are copied from the
/// first record in the group.
#[derive(Debug, Clone, Default)]
pub struct MergePolicyTable {
    policies: Vec<(String, MergePolicy)>,
}

impl MergePolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, policy: MergePolicy) -> Self {
        self.policies.push((field.to_string(), policy));
        self
    }

    pub fn policy_for(&self, field: &str) -> Option<MergePolicy> {
        self.policies
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, policy)| *policy)
    }

    pub fn entries(&self) -> &[(String, MergePolicy)] {
        &self.policies
    }
}

/// Groups raw records by document key (first-seen group order) and merges
/// each group into one `ConsolidatedRecord` per the policy table. Records
/// without a document key are excluded from grouping. Pure: re-running on
/// the same input always yields identical output.
pub fn consolidate(records: &[RawRecord], policies: &MergePolicyTable) -> Vec<ConsolidatedRecord> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&RawRecord>> = HashMap::new();

    for record in records {
        let Some(key) = record.document_key.as_deref() else {
            continue;
        };
        match groups.get_mut(key) {
            Some(group) => group.push(record),
            None => {
                order.push(key);
                groups.insert(key, vec![record]);
            }
        }
    }

    order
        .into_iter()
        .map(|key| merge_group(key, &groups[key], policies))
        .collect()
}

fn merge_group(
    key: &str,
    group: &[&RawRecord],
    policies: &MergePolicyTable,
) -> ConsolidatedRecord {
    // 單筆資料直接照抄，不套用合併規則
    let mut fields = group[0].fields.clone();
    if group.len() > 1 {
        for (field, policy) in policies.entries() {
            if let Some(merged) = merge_field(group, field, *policy) {
                fields.insert(field.clone(), merged);
            }
        }
    }

    ConsolidatedRecord {
        document_key: key.to_string(),
        fields,
        source_count: group.len(),
    }
}

fn merge_field(group: &[&RawRecord], field: &str, policy: MergePolicy) -> Option<Value> {
    let values: Vec<&Value> = group.iter().filter_map(|r| r.field(field)).collect();
    if values.is_empty() {
        return None;
    }

    // 以文字表示法判斷相異值，保留首見順序
    let mut distinct: Vec<(String, &Value)> = Vec::new();
    for &value in &values {
        let text = value_text(value);
        if !distinct.iter().any(|(seen, _)| *seen == text) {
            distinct.push((text, value));
        }
    }

    match policy {
        MergePolicy::FirstDistinct => Some(distinct[0].1.clone()),
        MergePolicy::JoinDistinct => {
            if distinct.len() == 1 {
                Some(distinct[0].1.clone())
            } else {
                let joined: Vec<&str> = distinct.iter().map(|(text, _)| text.as_str()).collect();
                Some(Value::String(joined.join(", ")))
            }
        }
        MergePolicy::FirstNonEmpty => values
            .iter()
            .find(|v| !value_text(v).is_empty())
            .map(|v| (*v).clone()),
        MergePolicy::StatusConsensus => {
            let non_empty: Vec<&(String, &Value)> =
                distinct.iter().filter(|(text, _)| !text.is_empty()).collect();
            match non_empty.len() {
                0 => None,
                1 => Some(non_empty[0].1.clone()),
                _ => Some(Value::String(MIXED_STATUS.to_string())),
            }
        }
    }
}
