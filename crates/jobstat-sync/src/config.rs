use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use jobstat_cluster::{ClusterBuilder, TitleNormalizer};
use jobstat_source::{ItJobsSource, DEFAULT_BASE_URL};
use jobstat_storage::{HttpClientConfig, HttpFetcher, SnapshotStore};

use crate::pipeline::RetrievalPipeline;

pub const DEFAULT_CACHE_FILE: &str = "cache_vagas.json";
pub const DEFAULT_PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub api_key: String,
    pub base_url: String,
    pub cache_file: PathBuf,
    pub page_size: u32,
    pub settle_delay: Duration,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    pub rules_file: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl SyncConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup("JOBSTAT_API_KEY").unwrap_or_default(),
            base_url: lookup("JOBSTAT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            cache_file: lookup("JOBSTAT_CACHE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE)),
            page_size: lookup("JOBSTAT_PAGE_SIZE")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            settle_delay: Duration::from_secs(
                lookup("JOBSTAT_SETTLE_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            ),
            user_agent: lookup("JOBSTAT_USER_AGENT").unwrap_or_else(|| "Mozilla/5.0".to_string()),
            http_timeout_secs: lookup("JOBSTAT_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            rules_file: lookup("JOBSTAT_RULES_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn build_pipeline(&self) -> Result<RetrievalPipeline> {
        let http = HttpFetcher::new(HttpClientConfig {
            timeout: Duration::from_secs(self.http_timeout_secs),
            user_agent: Some(self.user_agent.clone()),
            ..Default::default()
        })
        .context("building http client")?;
        let source = ItJobsSource::new(http, self.base_url.clone(), self.api_key.clone());
        Ok(RetrievalPipeline::new(
            Box::new(source),
            SnapshotStore::new(self.cache_file.clone()),
        )
        .with_page_size(self.page_size)
        .with_settle_delay(self.settle_delay))
    }

    pub fn build_cluster_builder(&self) -> Result<ClusterBuilder> {
        let normalizer = match &self.rules_file {
            Some(path) => TitleNormalizer::from_path(path)
                .with_context(|| format!("loading title rules {}", path.display()))?,
            None => TitleNormalizer::builtin().context("loading builtin title rules")?,
        };
        Ok(ClusterBuilder::new(normalizer))
    }
}
