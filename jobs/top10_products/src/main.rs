use anyhow::Result;
use clap::Parser;
use kassa::io::read_clean_rows;
use kassa::jobs::top10;
use kassa::report;
use std::path::PathBuf;
use tracing::info;

/// Select the ten highest-revenue products over the clean dataset.
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
    let top = top10::run(&rows);
    report::write_top10_csv(&args.output, &top)?;

    info!(rows = top.len(), output = %args.output.display(), "top-10 job finished");
    Ok(())
}
