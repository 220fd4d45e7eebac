use std::collections::BTreeSet;

use tracing::debug;

use crate::display::title_case;
use crate::normalizer::TitleNormalizer;

/// Keys must score strictly above this to share a cluster.
pub const MERGE_THRESHOLD: u8 = 85;

/// Indel similarity of two keys on a 0–100 scale: `2·lcs / (len_a + len_b)`,
/// rounded half to even. Two empty keys score 100.
pub fn similarity(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let common = longest_common_subsequence(&a, &b);
    (200.0 * common as f64 / total as f64).round_ties_even() as u8
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Titles that landed under one canonical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCluster {
    key: String,
    members: Vec<String>,
    occurrences: usize,
}

impl TitleCluster {
    fn new(key: String, title: &str) -> Self {
        Self {
            key,
            members: vec![title.to_string()],
            occurrences: 1,
        }
    }

    fn absorb(&mut self, title: &str) {
        self.occurrences += 1;
        if !self.members.iter().any(|m| m == title) {
            self.members.push(title.to_string());
        }
    }

    /// Canonical key of the title that opened the cluster.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> String {
        title_case(&self.key)
    }

    /// Distinct original titles in arrival order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Every title routed here, duplicates included.
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// Members in display form; titles differing only by case collapse.
    pub fn display_members(&self) -> BTreeSet<String> {
        self.members.iter().map(|m| title_case(m)).collect()
    }
}

/// Clusters produced by one [`ClusterBuilder::group`] call, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleGroup {
    clusters: Vec<TitleCluster>,
}

impl TitleGroup {
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TitleCluster> {
        self.clusters.iter()
    }

    pub fn by_label(&self, label: &str) -> Option<&TitleCluster> {
        self.clusters.iter().find(|c| c.label() == label)
    }

    pub fn total_occurrences(&self) -> usize {
        self.clusters.iter().map(TitleCluster::occurrences).sum()
    }
}

impl<'a> IntoIterator for &'a TitleGroup {
    type Item = &'a TitleCluster;
    type IntoIter = std::slice::Iter<'a, TitleCluster>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}

/// Greedy first-match clustering over normalized titles.
///
/// Every title is compared against each existing cluster key in creation order
/// and joins the first one scoring above the threshold; otherwise it opens a new
/// cluster under its own key. Cost is O(n·g) per call. A nearest-neighbour index
/// would change which cluster counts as the first match, so none is used.
#[derive(Debug, Clone)]
pub struct ClusterBuilder {
    normalizer: TitleNormalizer,
}

impl ClusterBuilder {
    pub fn new(normalizer: TitleNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalize(&self, title: &str) -> String {
        self.normalizer.normalize(title)
    }

    pub fn group<I, S>(&self, titles: I) -> TitleGroup
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut clusters: Vec<TitleCluster> = Vec::new();
        for title in titles {
            let title = title.as_ref();
            let key = self.normalizer.normalize(title);
            match clusters
                .iter_mut()
                .find(|c| similarity(&key, &c.key) > MERGE_THRESHOLD)
            {
                Some(cluster) => cluster.absorb(title),
                None => clusters.push(TitleCluster::new(key, title)),
            }
        }
        debug!(clusters = clusters.len(), "titles grouped");
        TitleGroup { clusters }
    }
}
