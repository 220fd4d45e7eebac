use std::path::{Path, PathBuf};

use jobstat_cluster::StatisticsTable;
use jobstat_core::{Dimension, JobRecord, NOT_AVAILABLE};
use jobstat_storage::write_atomic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("encoding csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("flushing csv buffer: {0}")]
    Flush(#[source] std::io::Error),
    #[error("writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn default_statistics_file(dimension: Dimension) -> PathBuf {
    PathBuf::from(format!("statistics_{}.csv", dimension.as_str()))
}

/// One row per cluster: dimension value, cluster label and raw member count.
/// `verbose` adds the distinct member titles, which may number fewer than the
/// count when a title repeats.
pub fn statistics_csv(table: &StatisticsTable, verbose: bool) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec![table.dimension().column_label(), "Job Title", "Number of jobs"];
    if verbose {
        header.push("Grouped Titles");
    }
    writer.write_record(&header)?;

    for (value, group) in table.iter() {
        for cluster in group {
            let mut row = vec![
                value.to_string(),
                cluster.label(),
                cluster.occurrences().to_string(),
            ];
            if verbose {
                row.push(
                    cluster
                        .display_members()
                        .into_iter()
                        .collect::<Vec<_>>()
                        .join("; "),
                );
            }
            writer.write_record(&row)?;
        }
    }
    writer.into_inner().map_err(|err| ExportError::Flush(err.into_error()))
}

/// Flat listing columns; absent fields are written as `N/A`.
pub fn records_csv(records: &[JobRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "job_title",
        "company",
        "company_description",
        "published_at",
        "salary",
        "location",
    ])?;
    for record in records {
        let locations = record.zone_names().collect::<Vec<_>>();
        let locations = if locations.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            locations.join(", ")
        };
        let title = if record.title.is_empty() {
            NOT_AVAILABLE
        } else {
            record.title.as_str()
        };
        writer.write_record([
            title,
            record.company_name_or_na(),
            record
                .company_description_or_na()
                .replace(['\n', '\r'], " ")
                .as_str(),
            record.published_at.as_deref().unwrap_or(NOT_AVAILABLE),
            record.wage_or_na(),
            locations.as_str(),
        ])?;
    }
    writer.into_inner().map_err(|err| ExportError::Flush(err.into_error()))
}

pub async fn write_export(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    write_atomic(path, bytes).await.map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobstat_cluster::{aggregate, ClusterBuilder, TitleNormalizer};

    fn table() -> StatisticsTable {
        let records = vec![
            JobRecord::new(1, "QA Tester").with_zones(["Lisboa"]),
            JobRecord::new(2, "qa tester").with_zones(["Lisboa"]),
            JobRecord::new(3, "QA Tester").with_zones(["Lisboa"]),
            JobRecord::new(4, "Data Engineer").with_zones(["Porto"]),
        ];
        let builder = ClusterBuilder::new(TitleNormalizer::builtin().expect("rules"));
        aggregate(&builder, &records, Dimension::Zone)
    }

    #[test]
    fn statistics_rows_without_member_column() {
        let csv = String::from_utf8(statistics_csv(&table(), false).expect("csv")).expect("utf8");
        assert_eq!(
            csv,
            "Zone,Job Title,Number of jobs\nLisboa,Qa,3\nPorto,Data,1\n"
        );
    }

    #[test]
    fn verbose_rows_list_distinct_members() {
        let csv = String::from_utf8(statistics_csv(&table(), true).expect("csv")).expect("utf8");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Zone,Job Title,Number of jobs,Grouped Titles");
        assert_eq!(lines[1], "Lisboa,Qa,3,Qa Tester");
        assert_eq!(lines[2], "Porto,Data,1,Data Engineer");
    }

    #[test]
    fn records_csv_fills_missing_fields() {
        let mut record = JobRecord::new(7, "Python Developer").with_zones(["Lisboa", "Porto"]);
        record.company = Some(jobstat_core::Company {
            name: Some("Acme".into()),
            description: Some("line one\nline two".into()),
            ..Default::default()
        });
        let bare = JobRecord::new(8, "");
        let csv = String::from_utf8(records_csv(&[record, bare]).expect("csv")).expect("utf8");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[1],
            "Python Developer,Acme,line one line two,N/A,N/A,\"Lisboa, Porto\""
        );
        assert_eq!(lines[2], "N/A,N/A,N/A,N/A,N/A,N/A");
    }

    #[test]
    fn statistics_file_name_follows_dimension() {
        assert_eq!(default_statistics_file(Dimension::Type), PathBuf::from("statistics_type.csv"));
    }

    #[tokio::test]
    async fn export_is_written_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("statistics_zone.csv");
        let bytes = statistics_csv(&table(), false).expect("csv");
        write_export(&path, &bytes).await.expect("write");
        assert_eq!(std::fs::read(&path).expect("read"), bytes);
    }
}
