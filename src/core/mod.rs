pub mod accumulator;
pub mod consolidate;
pub mod detail_cache;
pub mod engine;
pub mod query;

pub use crate::domain::model::{ConsolidatedRecord, Page, RawRecord};
pub use crate::domain::ports::{PageSource, RequestSigner, Storage};
pub use crate::utils::error::Result;
