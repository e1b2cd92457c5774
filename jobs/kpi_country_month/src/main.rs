use anyhow::Result;
use clap::Parser;
use kassa::io::read_clean_rows;
use kassa::jobs::kpi;
use kassa::report;
use std::path::PathBuf;
use tracing::info;

/// Aggregate total sales per (country, month) over the clean dataset.
#[derive(Parser, Debug)]
struct Args {
    /// Clean dataset CSV
    #[arg(long)]
    input: PathBuf,
    /// Output CSV path
    #[arg(long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let rows = read_clean_rows(&args.input)?;
    let kpis = kpi::run(&rows);
    report::write_kpi_csv(&args.output, &kpis)?;

    info!(rows = kpis.len(), output = %args.output.display(), "kpi job finished");
    Ok(())
}
