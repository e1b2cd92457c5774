use anyhow::Result;
use clap::Parser;
use kassa::clean::clean_and_join;
use kassa::report;
use std::path::PathBuf;
use tracing::info;

/// Merge raw multi-channel sales exports, deduplicate by transaction,
/// join the product catalog and write the clean dataset plus the reject
/// and stats reports.
#[derive(Parser, Debug)]
struct Args {
    /// Sales source files, processed in the given order
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,
    /// Product catalog CSV; enrichment is empty when the file is absent
    #[arg(long)]
    catalog: PathBuf,
    /// Output directory (clean/ and rejects/ are created inside)
    #[arg(long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let outcome = clean_and_join(&args.input, &args.catalog)?;

    report::write_clean_csv(args.output.join("clean/clean.csv"), &outcome.records)?;
    report::write_rejects_csv(args.output.join("rejects/rejects.csv"), &outcome.rejects)?;
    report::write_stats_summary(
        args.output.join("clean/stats_summary.csv"),
        &outcome.summary,
    )?;

    info!(
        valid_rows = outcome.summary.valid_rows,
        rejected_files = outcome.summary.rejected_files,
        rejected_rows = outcome.summary.rejected_rows,
        pct_valid = format!("{:.2}%", outcome.summary.pct_valid()),
        "clean/join stage finished"
    );
    Ok(())
}
