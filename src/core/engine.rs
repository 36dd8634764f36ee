use crate::core::accumulator::PageAccumulator;
use crate::core::consolidate::{consolidate, MergePolicyTable};
use crate::core::query::{apply_filter, apply_sort, page_window, FilterSpec, PageWindow, SortSpec};
use crate::domain::model::ConsolidatedRecord;
use crate::domain::model::RawRecord;
use crate::domain::ports::PageSource;
use crate::utils::error::Result;

/// Everything a list screen configures: which field carries the document
/// key, how fields merge, and the order records appear in by default.
/// Screens are thin configuration of the engine, not reimplementations.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub key_field: String,
    pub policies: MergePolicyTable,
    pub default_sort: SortSpec,
}

/// Glues one accumulator to the consolidation and query layers. All
/// derived values (consolidated documents, totals) are computed on demand
/// from the current working set; no second counter can drift.
pub struct SyncEngine<S: PageSource> {
    accumulator: PageAccumulator<S>,
    view: ViewConfig,
}

impl<S: PageSource> SyncEngine<S> {
    pub fn new(accumulator: PageAccumulator<S>, view: ViewConfig) -> Self {
        Self { accumulator, view }
    }

    pub fn accumulator(&self) -> &PageAccumulator<S> {
        &self.accumulator
    }

    pub fn key_field(&self) -> &str {
        &self.view.key_field
    }

    /// Pages the remote source to exhaustion, honoring a pending
    /// invalidation first.
    pub async fn sync(&self) -> Result<usize> {
        tracing::info!("🚀 Syncing remote records");
        let total = self.accumulator.sync_to_exhaustion().await?;
        tracing::info!("📊 Working set holds {} raw records", total);
        Ok(total)
    }

    /// Pull-to-refresh: discard and re-sync.
    pub async fn refresh(&self) -> Result<usize> {
        self.accumulator.refresh().await
    }

    pub fn raw_records(&self) -> Vec<RawRecord> {
        self.accumulator.records()
    }

    /// One merged record per document, derived fresh from the working set.
    pub fn consolidated(&self) -> Vec<ConsolidatedRecord> {
        consolidate(&self.accumulator.records(), &self.view.policies)
    }

    /// Filter, sort, and slice the consolidated set for display. Passing no
    /// sort applies the view's default order.
    pub fn query(
        &self,
        filter: &FilterSpec,
        sort: Option<&SortSpec>,
        page_index: usize,
        page_size: usize,
    ) -> PageWindow<ConsolidatedRecord> {
        let consolidated = self.consolidated();
        let filtered = apply_filter(&consolidated, filter);
        let sort = sort.unwrap_or(&self.view.default_sort);
        let sorted = apply_sort(&filtered, sort, &self.view.key_field);
        page_window(&sorted, page_index, page_size)
    }

    /// Documents per status value, first-seen order, computed on demand.
    pub fn status_totals(&self, status_field: &str) -> Vec<(String, usize)> {
        let mut totals: Vec<(String, usize)> = Vec::new();
        for record in self.consolidated() {
            let status = record.text(status_field);
            match totals.iter_mut().find(|(name, _)| *name == status) {
                Some((_, count)) => *count += 1,
                None => totals.push((status, 1)),
            }
        }
        totals
    }
}
