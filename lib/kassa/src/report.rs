use crate::io::open_writer;
use crate::jobs::kpi::KpiRow;
use crate::jobs::return_rate::ReturnRateSummary;
use crate::jobs::top10::ProductRevenue;
use crate::record::{CanonicalSalesRecord, RejectRecord};
use crate::schema::CLEAN_HEADER;
use crate::stats::CleanSummary;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write the canonical dataset with the committed column order.
pub fn write_clean_csv(path: impl AsRef<Path>, records: &[CanonicalSalesRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_writer(open_writer(path)?);
    writer.write_record(CLEAN_HEADER)?;
    for r in records {
        writer.write_record([
            r.transaction_id.clone(),
            r.product_id.clone(),
            r.date.format("%Y-%m-%d").to_string(),
            r.country.clone(),
            r.quantity.to_string(),
            r.unit_price.to_string(),
            r.revenue.to_string(),
            r.product_name.clone(),
            r.category.clone(),
            r.year_month.clone(),
            r.net_amount.to_string(),
            flag(r.is_return).to_string(),
        ])?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = records.len(), "clean dataset written");
    Ok(())
}

fn flag(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

/// Write the file-level reject report: one row per failed source file.
pub fn write_rejects_csv(path: impl AsRef<Path>, rejects: &[RejectRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_writer(open_writer(path)?);
    writer.write_record(["reason", "file"])?;
    for r in rejects {
        writer.write_record([r.reason.as_str(), r.source_file.as_str()])?;
    }
    writer.flush()?;
    info!(path = %path.display(), rejects = rejects.len(), "reject report written");
    Ok(())
}

/// Write the cleaning stats summary.
pub fn write_stats_summary(path: impl AsRef<Path>, summary: &CleanSummary) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_writer(open_writer(path)?);
    writer.write_record([
        "executed_at",
        "source_files",
        "valid_rows",
        "rejected_files",
        "rejected_rows",
        "total_rows",
        "unique_transactions",
        "pct_valid",
        "pct_rejected",
    ])?;
    writer.write_record([
        summary.executed_at.clone(),
        summary.source_files.join(", "),
        summary.valid_rows.to_string(),
        summary.rejected_files.to_string(),
        summary.rejected_rows.to_string(),
        summary.total_rows().to_string(),
        summary.unique_transactions.to_string(),
        format!("{:.2}%", summary.pct_valid()),
        format!("{:.2}%", summary.pct_rejected()),
    ])?;
    writer.flush()?;
    info!(path = %path.display(), "stats summary written");
    Ok(())
}

/// Write the KPI job output: one row per (country, month).
pub fn write_kpi_csv(path: impl AsRef<Path>, rows: &[KpiRow]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_writer(open_writer(path)?);
    writer.write_record(["country", "month", "total_sales"])?;
    for row in rows {
        writer.write_record([
            row.country.clone(),
            row.month.clone(),
            row.total_sales.to_string(),
        ])?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "kpi output written");
    Ok(())
}

/// Write the Top-10 job output.
pub fn write_top10_csv(path: impl AsRef<Path>, rows: &[ProductRevenue]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_writer(open_writer(path)?);
    writer.write_record(["product_id", "product_name", "category", "total_revenue"])?;
    for row in rows {
        writer.write_record([
            row.product_id.clone(),
            row.product_name.clone(),
            row.category.clone(),
            row.total_revenue.to_string(),
        ])?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "top-10 output written");
    Ok(())
}

/// Write the return-rate job output as one JSON object per line.
pub fn write_return_rate_jsonl(path: impl AsRef<Path>, summary: &ReturnRateSummary) -> Result<()> {
    let path = path.as_ref();
    let mut writer = open_writer(path)?;
    let line = serde_json::to_string(summary).context("serialize return-rate summary")?;
    writeln!(writer, "{line}")?;
    writer.flush()?;
    info!(path = %path.display(), "return-rate output written");
    Ok(())
}
