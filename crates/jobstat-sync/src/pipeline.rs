use std::path::PathBuf;
use std::time::Duration;

use jobstat_core::JobRecord;
use jobstat_source::{PageRequest, RecordSource, SourceError};
use jobstat_storage::{SnapshotError, SnapshotStore};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::DEFAULT_PAGE_SIZE;

/// Where the records of a [`RecordSet`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Snapshot,
    Fetched,
    /// The reload failed; the set is empty.
    Unavailable,
}

/// Records loaded for one session, handed explicitly to every query.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    records: Vec<JobRecord>,
    provenance: Provenance,
}

impl RecordSet {
    pub fn new(records: Vec<JobRecord>, provenance: Provenance) -> Self {
        Self {
            records,
            provenance,
        }
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("record source unavailable at page {page}: {source}")]
    SourceUnavailable {
        page: u32,
        #[source]
        source: SourceError,
    },
    #[error("source reported an implausible total of {0} records")]
    ImplausibleTotal(u64),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

#[derive(Debug, Clone, Serialize)]
pub struct ReloadSummary {
    pub run_id: Uuid,
    /// `None` when the source response carried no total at all.
    pub total_hint: Option<u64>,
    pub pages: u32,
    pub records: usize,
    pub snapshot_path: Option<PathBuf>,
    pub snapshot_bytes: Option<usize>,
    pub snapshot_sha256: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReloadOutcome {
    pub records: Vec<JobRecord>,
    pub summary: ReloadSummary,
}

/// Fetches the full listing page by page and keeps the snapshot in step with it.
pub struct RetrievalPipeline {
    source: Box<dyn RecordSource>,
    store: SnapshotStore,
    page_size: u32,
    settle_delay: Duration,
}

impl RetrievalPipeline {
    pub fn new(source: Box<dyn RecordSource>, store: SnapshotStore) -> Self {
        Self {
            source,
            store,
            page_size: DEFAULT_PAGE_SIZE,
            settle_delay: Duration::ZERO,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Pause after a completed fetch so back-to-back runs do not trip throttling.
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Serve the snapshot, or reload when asked to or when there is none.
    ///
    /// A failed reload is logged and yields an empty set; the snapshot on disk
    /// is left exactly as it was.
    pub async fn get_records(&self, force_reload: bool) -> RecordSet {
        if !force_reload {
            match self.store.load().await {
                Ok(Some(records)) => {
                    info!(
                        records = records.len(),
                        path = %self.store.path().display(),
                        "serving records from snapshot"
                    );
                    return RecordSet::new(records, Provenance::Snapshot);
                }
                Ok(None) => warn!(
                    path = %self.store.path().display(),
                    "snapshot not found; reloading from source"
                ),
                Err(err) => warn!(error = %err, "snapshot unreadable; reloading from source"),
            }
        }

        match self.reload().await {
            Ok(outcome) => RecordSet::new(outcome.records, Provenance::Fetched),
            Err(err) => {
                error!(error = %err, "reload aborted; snapshot left untouched");
                RecordSet::new(Vec::new(), Provenance::Unavailable)
            }
        }
    }

    /// Fetch every page and replace the snapshot. Nothing is written unless all
    /// pages arrive.
    pub async fn reload(&self) -> Result<ReloadOutcome, RetrievalError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("reload", %run_id, source = self.source.source_id());
        self.reload_inner(run_id).instrument(span).await
    }

    async fn reload_inner(&self, run_id: Uuid) -> Result<ReloadOutcome, RetrievalError> {
        let probe = self
            .source
            .fetch_page(PageRequest::new(1, self.page_size))
            .await
            .map_err(|source| RetrievalError::SourceUnavailable { page: 1, source })?;
        let total = match probe.total {
            Some(0) => {
                info!("source reports no records");
                0
            }
            Some(total) => total,
            None => {
                warn!("source response has no total; treating the listing as empty");
                0
            }
        };

        if total == 0 {
            return Ok(ReloadOutcome {
                records: Vec::new(),
                summary: ReloadSummary {
                    run_id,
                    total_hint: probe.total,
                    pages: 0,
                    records: 0,
                    snapshot_path: None,
                    snapshot_bytes: None,
                    snapshot_sha256: None,
                },
            });
        }

        let pages = u32::try_from(total.div_ceil(u64::from(self.page_size)))
            .map_err(|_| RetrievalError::ImplausibleTotal(total))?;
        info!(total, pages, page_size = self.page_size, "fetching listing");

        let mut records = Vec::new();
        for page in 1..=pages {
            let fetched = self
                .source
                .fetch_page(PageRequest::new(page, self.page_size))
                .await
                .map_err(|source| RetrievalError::SourceUnavailable { page, source })?;
            debug!(page, pages, results = fetched.results.len(), "page fetched");
            records.extend(fetched.results);
        }

        let written = self.store.save(&records).await?;
        info!(
            records = records.len(),
            path = %written.path.display(),
            sha256 = %written.sha256,
            "snapshot saved"
        );

        if !self.settle_delay.is_zero() {
            debug!(delay_ms = self.settle_delay.as_millis() as u64, "settling after fetch");
            tokio::time::sleep(self.settle_delay).await;
        }

        Ok(ReloadOutcome {
            summary: ReloadSummary {
                run_id,
                total_hint: Some(total),
                pages,
                records: records.len(),
                snapshot_path: Some(written.path),
                snapshot_bytes: Some(written.byte_size),
                snapshot_sha256: Some(written.sha256),
            },
            records,
        })
    }
}
