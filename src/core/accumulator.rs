use crate::domain::model::{Page, RawRecord, RecordIdentity};
use crate::domain::ports::{Invalidate, PageSource};
use crate::utils::error::Result;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Result of one guarded fetch step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was applied; `added` counts records with new identities.
    Fetched { added: usize },
    /// `has_more` was already false.
    Exhausted,
    /// Another fetch owns the in-flight slot.
    AlreadyFetching,
    /// The response arrived after a reset and was discarded.
    Stale,
}

#[derive(Debug, Default)]
struct AccumulatorState {
    identities: HashSet<RecordIdentity>,
    records: Vec<RawRecord>,
    next_page: u32,
    has_more: bool,
    fetch_in_flight: bool,
    epoch: u64,
    pages_fetched: u32,
    last_error: Option<String>,
    needs_refresh: bool,
}

impl AccumulatorState {
    fn fresh(epoch: u64) -> Self {
        Self {
            has_more: true,
            epoch,
            ..Default::default()
        }
    }
}

/// Drives repeated page fetches against one remote source and maintains the
/// deduplicated, insertion-ordered working set. One instance per screen;
/// nothing is shared across accumulators.
pub struct PageAccumulator<S: PageSource> {
    source: S,
    page_size: usize,
    max_pages: u32,
    state: Mutex<AccumulatorState>,
    cancelled: AtomicBool,
}

impl<S: PageSource> PageAccumulator<S> {
    pub fn new(source: S, page_size: usize) -> Self {
        Self {
            source,
            page_size,
            max_pages: DEFAULT_MAX_PAGES,
            state: Mutex::new(AccumulatorState::fresh(0)),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Hard cap on pages fetched per session, guarding against an endpoint
    /// that keeps returning full pages and never signals exhaustion.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Working-set snapshot in insertion order.
    pub fn records(&self) -> Vec<RawRecord> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().unwrap().has_more
    }

    /// Initial load: a fetch is running and nothing has arrived yet.
    pub fn is_loading(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.fetch_in_flight && state.records.is_empty()
    }

    /// A continuation fetch is running behind an already-visible list.
    pub fn is_fetching_more(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.fetch_in_flight && !state.records.is_empty()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.lock().unwrap().last_error.clone()
    }

    /// Discards the working set and restarts pagination from page zero.
    /// Bumping the epoch makes any in-flight response stale.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        let epoch = state.epoch + 1;
        *state = AccumulatorState::fresh(epoch);
        tracing::debug!("Accumulator reset, epoch {}", epoch);
    }

    /// Advisory invalidation: the next sync resets before fetching.
    pub fn mark_stale(&self) {
        self.state.lock().unwrap().needs_refresh = true;
    }

    pub fn is_stale(&self) -> bool {
        self.state.lock().unwrap().needs_refresh
    }

    /// Screen teardown: the pagination loop stops at the next iteration
    /// boundary and an in-flight response is discarded instead of applied.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// One guarded fetch. No-op when a fetch is in flight or the source is
    /// exhausted; on transport failure the partial working set is retained
    /// and the error both recorded and returned.
    pub async fn load_more(&self) -> Result<FetchOutcome> {
        let (epoch, page_index) = {
            let mut state = self.state.lock().unwrap();
            if state.fetch_in_flight {
                return Ok(FetchOutcome::AlreadyFetching);
            }
            if !state.has_more {
                return Ok(FetchOutcome::Exhausted);
            }
            state.fetch_in_flight = true;
            (state.epoch, state.next_page)
        };

        // 鎖不跨越 await；完成後用 epoch 判斷回應是否已過期
        let fetched = self.source.fetch_page(page_index, self.page_size).await;

        let mut state = self.state.lock().unwrap();
        if state.epoch != epoch {
            tracing::debug!("Discarding stale response for page {}", page_index);
            return Ok(FetchOutcome::Stale);
        }
        state.fetch_in_flight = false;
        if self.is_cancelled() {
            // 畫面已拆除,回應不再套用
            tracing::debug!("Discarding response for page {} after cancellation", page_index);
            return Ok(FetchOutcome::Stale);
        }

        match fetched {
            Err(e) => {
                state.last_error = Some(e.to_string());
                Err(e)
            }
            Ok(page) => {
                state.last_error = None;
                let fetched_count = page.records.len();
                let explicit_has_more = page.explicit_has_more;
                let added = apply_page(&mut state, page_index, page);
                state.has_more = explicit_has_more.unwrap_or(fetched_count == self.page_size);
                state.next_page = page_index + 1;
                state.pages_fetched += 1;
                tracing::debug!(
                    "📥 Page {}: {} records, {} new (has_more: {})",
                    page_index,
                    fetched_count,
                    added,
                    state.has_more
                );
                Ok(FetchOutcome::Fetched { added })
            }
        }
    }

    /// Explicit pagination loop: fetches until the source is exhausted, the
    /// accumulator is cancelled, or the per-session page cap is hit. Returns
    /// the working-set size on completion.
    pub async fn sync_to_exhaustion(&self) -> Result<usize> {
        if self.take_refresh_flag() {
            self.reset();
        }

        loop {
            if self.is_cancelled() {
                tracing::debug!("Pagination loop cancelled");
                break;
            }
            {
                let state = self.state.lock().unwrap();
                if !state.has_more {
                    break;
                }
                if state.pages_fetched >= self.max_pages {
                    tracing::warn!(
                        "⚠️ Page cap of {} reached with more data remaining; stopping this sync",
                        self.max_pages
                    );
                    break;
                }
            }

            match self.load_more().await? {
                FetchOutcome::Fetched { .. } => continue,
                // 其他結果代表這個迴圈不該再繼續
                FetchOutcome::Exhausted
                | FetchOutcome::AlreadyFetching
                | FetchOutcome::Stale => break,
            }
        }

        Ok(self.len())
    }

    /// Pull-to-refresh: discard everything and re-sync.
    pub async fn refresh(&self) -> Result<usize> {
        self.reset();
        self.sync_to_exhaustion().await
    }

    fn take_refresh_flag(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        std::mem::take(&mut state.needs_refresh)
    }
}

impl<S: PageSource> Invalidate for PageAccumulator<S> {
    fn invalidate(&self, _document_key: Option<&str>) {
        // 清單畫面一律整組重抓,不做單筆修補
        self.mark_stale();
    }
}

/// Appends a page's records by identity, skipping ones already present.
/// Identities derive from page content and position, so re-applying the same
/// page is a no-op (first write wins).
fn apply_page(state: &mut AccumulatorState, page_index: u32, page: Page) -> usize {
    let mut key_lines: HashMap<String, u32> = HashMap::new();
    let mut added = 0;

    for (row, record) in page.records.into_iter().enumerate() {
        let identity = match &record.document_key {
            Some(key) => {
                let line = key_lines.entry(key.clone()).or_insert(0);
                let identity = RecordIdentity::Keyed {
                    page: page_index,
                    key: key.clone(),
                    line: *line,
                };
                *line += 1;
                identity
            }
            None => RecordIdentity::Unkeyed {
                page: page_index,
                row: row as u32,
            },
        };

        if state.identities.insert(identity) {
            state.records.push(record);
            added += 1;
        }
    }

    added
}
