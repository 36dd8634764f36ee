use crate::domain::model::{ConsolidatedRecord, RawRecord};
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Parses a `MM/DD/YYYY` value. Time-of-day never enters the comparison;
/// both filter bounds and record values reduce to calendar days.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Field access shared by raw and consolidated records so the same query
/// operations serve both kinds of list screens.
pub trait FieldText {
    fn field_text(&self, name: &str) -> String;
}

impl FieldText for ConsolidatedRecord {
    fn field_text(&self, name: &str) -> String {
        self.text(name)
    }
}

impl FieldText for RawRecord {
    fn field_text(&self, name: &str) -> String {
        self.text(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    /// Case-insensitive substring containment.
    Contains(String),
    /// Exact match on the text rendering.
    Equals(String),
    /// Inclusive lower calendar-day bound.
    DateFrom(NaiveDate),
    /// Inclusive upper calendar-day bound.
    DateTo(NaiveDate),
}

/// Conjunction of per-field predicates. Blank values never become
/// constraints, so an untouched filter form matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    constraints: Vec<(String, FilterPredicate)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(mut self, field: &str, text: &str) -> Self {
        if !text.trim().is_empty() {
            self.constraints.push((
                field.to_string(),
                FilterPredicate::Contains(text.trim().to_string()),
            ));
        }
        self
    }

    pub fn equals(mut self, field: &str, text: &str) -> Self {
        if !text.trim().is_empty() {
            self.constraints.push((
                field.to_string(),
                FilterPredicate::Equals(text.trim().to_string()),
            ));
        }
        self
    }

    pub fn date_from(mut self, field: &str, date: NaiveDate) -> Self {
        self.constraints
            .push((field.to_string(), FilterPredicate::DateFrom(date)));
        self
    }

    pub fn date_to(mut self, field: &str, date: NaiveDate) -> Self {
        self.constraints
            .push((field.to_string(), FilterPredicate::DateTo(date)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn matches<T: FieldText>(&self, record: &T) -> bool {
        self.constraints.iter().all(|(field, predicate)| {
            let value = record.field_text(field);
            match predicate {
                FilterPredicate::Contains(text) => {
                    value.to_lowercase().contains(&text.to_lowercase())
                }
                FilterPredicate::Equals(text) => value == *text,
                // 記錄上的日期解析失敗視為不符合條件
                FilterPredicate::DateFrom(bound) => {
                    parse_date(&value).map(|d| d >= *bound).unwrap_or(false)
                }
                FilterPredicate::DateTo(bound) => {
                    parse_date(&value).map(|d| d <= *bound).unwrap_or(false)
                }
            }
        })
    }
}

pub fn apply_filter<T: FieldText + Clone>(records: &[T], spec: &FilterSpec) -> Vec<T> {
    records
        .iter()
        .filter(|record| spec.matches(*record))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

/// Numeric value of a human document identifier: all digits concatenated,
/// so `EQJOB62` compares as 62. No digits compares as 0.
pub fn numeric_key(key: &str) -> u64 {
    let digits: String = key.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Stable sort over a snapshot; the input is never mutated. When `field` is
/// the view's document-key field, alphanumeric keys compare by their numeric
/// portion instead of lexicographically; ties keep original order.
pub fn apply_sort<T: FieldText + Clone>(
    records: &[T],
    spec: &SortSpec,
    key_field: &str,
) -> Vec<T> {
    let mut sorted: Vec<T> = records.to_vec();
    let by_key = spec.field == key_field;

    sorted.sort_by(|a, b| {
        let left = a.field_text(&spec.field);
        let right = b.field_text(&spec.field);
        let ordering = if by_key {
            numeric_key(&left).cmp(&numeric_key(&right))
        } else {
            compare_values(&left, &right)
        };
        match spec.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    sorted
}

fn compare_values(left: &str, right: &str) -> std::cmp::Ordering {
    match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(l), Ok(r)) => l.partial_cmp(&r).unwrap_or(std::cmp::Ordering::Equal),
        _ => left.cmp(right),
    }
}

/// One display window over the filtered+sorted sequence, with the totals the
/// screen needs for "from–to of total" and page-count rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PageWindow<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub page_index: usize,
    pub page_size: usize,
}

impl<T> PageWindow<T> {
    /// 1-based index of the first record in this window, 0 when empty.
    pub fn from(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.page_index * self.page_size + 1
        }
    }

    /// 1-based index of the last record in this window.
    pub fn to(&self) -> usize {
        self.page_index * self.page_size + self.items.len()
    }

    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            0
        } else {
            self.total_count.div_ceil(self.page_size)
        }
    }
}

pub fn page_window<T: Clone>(records: &[T], page_index: usize, page_size: usize) -> PageWindow<T> {
    let items: Vec<T> = records
        .iter()
        .skip(page_index * page_size)
        .take(page_size)
        .cloned()
        .collect();

    PageWindow {
        items,
        total_count: records.len(),
        page_index,
        page_size,
    }
}
