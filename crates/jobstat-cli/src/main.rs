use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobstat_cluster::aggregate;
use jobstat_core::{Dimension, JobRecord};
use jobstat_sync::{
    default_statistics_file, find_by_id, records_csv, search, statistics_csv, top, write_export,
    Provenance, RecordSet, SyncConfig,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "jobstat")]
#[command(about = "Job listing cache and title statistics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Refetch the whole listing and replace the local snapshot.
    Reload,
    /// Cluster job titles per zone or per job type and export the table as CSV.
    Statistics {
        /// `zone` or `type`
        dimension: Dimension,
        /// Add the grouped original titles as a fourth column.
        #[arg(long)]
        show: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show one posting by id.
    Get {
        id: i64,
        #[arg(long)]
        save: bool,
    },
    /// Show the `n` most recent postings.
    Top {
        n: usize,
        #[arg(long)]
        save: bool,
    },
    /// Full-time postings of a company in a zone.
    Search {
        company: String,
        zone: String,
        limit: usize,
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobstat=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = SyncConfig::from_env();
    let pipeline = config.build_pipeline()?;

    match cli.command {
        Commands::Reload => {
            let outcome = pipeline.reload().await.context("reloading listing")?;
            let summary = outcome.summary;
            println!(
                "reload complete: run_id={} pages={} records={} snapshot={}",
                summary.run_id,
                summary.pages,
                summary.records,
                summary
                    .snapshot_path
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "not written".to_string())
            );
        }
        Commands::Statistics {
            dimension,
            show,
            output,
        } => {
            let records = load(&pipeline).await?;
            let builder = config.build_cluster_builder()?;
            let table = aggregate(&builder, records.records(), dimension);
            let path = output.unwrap_or_else(|| default_statistics_file(dimension));
            let bytes = statistics_csv(&table, show)?;
            write_export(&path, &bytes).await?;
            info!(buckets = table.len(), path = %path.display(), "statistics exported");
            println!("statistics by {dimension} written to {}", path.display());
        }
        Commands::Get { id, save } => {
            let records = load(&pipeline).await?;
            match find_by_id(records.records(), id) {
                Some(record) => {
                    print_records(std::slice::from_ref(record))?;
                    if save {
                        save_records(std::slice::from_ref(record), "get_job.csv").await?;
                    }
                }
                None => eprintln!("job {id} not found"),
            }
        }
        Commands::Top { n, save } => {
            let records = load(&pipeline).await?;
            let found = top(records.records(), n);
            print_records(found)?;
            if save {
                save_records(found, "top_jobs.csv").await?;
            }
        }
        Commands::Search {
            company,
            zone,
            limit,
            save,
        } => {
            let records = load(&pipeline).await?;
            let found: Vec<JobRecord> = search(records.records(), &company, &zone, limit)
                .into_iter()
                .cloned()
                .collect();
            if found.is_empty() {
                eprintln!("no full-time postings for {company} in {zone}");
            } else {
                print_records(&found)?;
                if save {
                    save_records(&found, "search_jobs.csv").await?;
                }
            }
        }
    }

    Ok(())
}

async fn load(pipeline: &jobstat_sync::RetrievalPipeline) -> Result<RecordSet> {
    let records = pipeline.get_records(false).await;
    if records.provenance() == Provenance::Unavailable {
        eprintln!("listing unavailable; see the log above");
    }
    Ok(records)
}

fn print_records(records: &[JobRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("serializing records")?;
    println!("{json}");
    Ok(())
}

async fn save_records(records: &[JobRecord], file_name: &str) -> Result<()> {
    let path = PathBuf::from(file_name);
    let bytes = records_csv(records)?;
    write_export(&path, &bytes).await?;
    println!("results saved to {}", path.display());
    Ok(())
}
