use anyhow::Result;
use clap::Parser;
use kassa::io::read_clean_rows;
use kassa::jobs::return_rate;
use kassa::report;
use std::path::PathBuf;
use tracing::info;

/// Compute the global return rate over the clean dataset.
#[derive(Parser, Debug)]
struct Args {
    /// Clean dataset CSV
    #[arg(long)]
    input: PathBuf,
    /// Output JSONL path
    #[arg(long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let rows = read_clean_rows(&args.input)?;
    let summary = return_rate::run(&rows);
    report::write_return_rate_jsonl(&args.output, &summary)?;

    info!(
        total = summary.total,
        returned = summary.returned,
        rate_pct = summary.return_rate_pct,
        "return-rate job finished"
    );
    Ok(())
}
