//! Retrieval pipeline, record queries and statistics export for jobstat.

mod config;
mod export;
mod pipeline;
mod queries;

pub use config::{SyncConfig, DEFAULT_CACHE_FILE, DEFAULT_PAGE_SIZE};
pub use export::{default_statistics_file, records_csv, statistics_csv, write_export, ExportError};
pub use pipeline::{
    Provenance, RecordSet, ReloadOutcome, ReloadSummary, RetrievalError, RetrievalPipeline,
};
pub use queries::{find_by_id, search, top};

pub const CRATE_NAME: &str = "jobstat-sync";
