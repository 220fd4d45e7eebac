use std::collections::BTreeMap;

use jobstat_core::{Dimension, JobRecord};
use tracing::debug;

use crate::cluster::{ClusterBuilder, TitleGroup};

/// Title clusters per dimension value (zone or job type), ordered by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsTable {
    dimension: Dimension,
    buckets: BTreeMap<String, TitleGroup>,
}

impl StatisticsTable {
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, value: &str) -> Option<&TitleGroup> {
        self.buckets.get(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TitleGroup)> {
        self.buckets.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Route every record's title into each bucket it lists for `dimension`, then
/// cluster each bucket once.
///
/// Records listing no value for the dimension are left out; there is no
/// catch-all bucket.
pub fn aggregate(
    builder: &ClusterBuilder,
    records: &[JobRecord],
    dimension: Dimension,
) -> StatisticsTable {
    let mut routed: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    let mut skipped = 0usize;
    for record in records {
        let values = record.dimension_values(dimension);
        if values.is_empty() {
            skipped += 1;
            continue;
        }
        for value in values {
            routed
                .entry(value.to_string())
                .or_default()
                .push(record.title.as_str());
        }
    }
    debug!(
        %dimension,
        buckets = routed.len(),
        skipped,
        "records routed for statistics"
    );

    let buckets = routed
        .into_iter()
        .map(|(value, titles)| (value, builder.group(titles)))
        .collect();
    StatisticsTable { dimension, buckets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::TitleNormalizer;

    fn builder() -> ClusterBuilder {
        ClusterBuilder::new(TitleNormalizer::builtin().expect("builtin rules"))
    }

    fn records() -> Vec<JobRecord> {
        vec![
            JobRecord::new(1, "Senior Python Developer")
                .with_zones(["Lisboa", "Porto"])
                .with_types(["Full-time"]),
            JobRecord::new(2, "Python Developer (Junior)")
                .with_zones(["Lisboa"])
                .with_types(["Full-time", "Remote"]),
            JobRecord::new(3, "Data Engineer").with_zones(["Braga"]),
            JobRecord::new(4, "QA Tester"),
        ]
    }

    #[test]
    fn multi_zone_record_lands_in_every_zone_once() {
        let table = aggregate(&builder(), &records(), Dimension::Zone);
        assert_eq!(table.dimension(), Dimension::Zone);
        assert_eq!(
            table.iter().map(|(zone, _)| zone).collect::<Vec<_>>(),
            vec!["Braga", "Lisboa", "Porto"]
        );

        let porto = table.get("Porto").expect("porto");
        let cluster = porto.by_label("Python").expect("python in porto");
        assert_eq!(cluster.occurrences(), 1);

        let lisboa = table.get("Lisboa").expect("lisboa");
        assert_eq!(lisboa.len(), 1);
        let cluster = lisboa.by_label("Python").expect("python in lisboa");
        assert_eq!(cluster.occurrences(), 2);
        assert_eq!(cluster.members().len(), 2);
    }

    #[test]
    fn records_without_dimension_values_are_excluded() {
        let table = aggregate(&builder(), &records(), Dimension::Type);
        assert_eq!(
            table.iter().map(|(ty, _)| ty).collect::<Vec<_>>(),
            vec!["Full-time", "Remote"]
        );
        let total: usize = table.iter().map(|(_, g)| g.total_occurrences()).sum();
        assert_eq!(total, 3);
        assert!(table
            .iter()
            .all(|(_, g)| g.iter().all(|c| c.label() != "Qa" && c.label() != "Data")));
    }

    #[test]
    fn raw_count_keeps_duplicates() {
        let records = vec![
            JobRecord::new(1, "QA Tester").with_zones(["Aveiro"]),
            JobRecord::new(2, "QA Tester").with_zones(["Aveiro"]),
        ];
        let table = aggregate(&builder(), &records, Dimension::Zone);
        let cluster = table
            .get("Aveiro")
            .and_then(|g| g.by_label("Qa"))
            .expect("qa cluster");
        assert_eq!(cluster.occurrences(), 2);
        assert_eq!(cluster.display_members().len(), 1);
    }

    #[test]
    fn no_records_is_an_empty_table() {
        let table = aggregate(&builder(), &[], Dimension::Zone);
        assert!(table.is_empty());
    }
}
