use crate::domain::model::{DocumentKey, RawRecord};
use crate::domain::ports::Invalidate;
use std::collections::HashMap;
use std::sync::Mutex;

/// Per-document line-item cache backing detail screens. Entries are filled
/// from fetched pages and dropped on mutation invalidation, so a detail view
/// never shows pre-mutation lines after a successful write.
#[derive(Debug, Default)]
pub struct DetailCache {
    entries: Mutex<HashMap<DocumentKey, Vec<RawRecord>>>,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<RawRecord>> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: DocumentKey, lines: Vec<RawRecord>) {
        self.entries.lock().unwrap().insert(key, lines);
    }

    pub fn evict(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Invalidate for DetailCache {
    fn invalidate(&self, document_key: Option<&str>) {
        match document_key {
            Some(key) => self.evict(key),
            None => self.clear(),
        }
    }
}
