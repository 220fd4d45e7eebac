//! Job-title canonicalization, greedy fuzzy clustering and per-dimension statistics.

mod cluster;
mod display;
mod normalizer;
pub mod rules;
mod stats;

pub use cluster::{similarity, ClusterBuilder, TitleCluster, TitleGroup, MERGE_THRESHOLD};
pub use display::title_case;
pub use normalizer::TitleNormalizer;
pub use rules::{RuleFile, RulesError};
pub use stats::{aggregate, StatisticsTable};

pub const CRATE_NAME: &str = "jobstat-cluster";
