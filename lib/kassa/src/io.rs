use crate::error::CleanError;
use crate::schema::{CleanRow, CleanSchema};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    fs::create_dir_all(path.as_ref())
        .with_context(|| format!("create_dir_all {}", path.as_ref().display()))
}

pub fn open_writer(path: impl AsRef<Path>) -> Result<BufWriter<File>> {
    if let Some(parent) = path.as_ref().parent() {
        ensure_dir(parent)?;
    }
    let file = File::create(path)?;
    Ok(BufWriter::new(file))
}

/// Read the clean dataset back as rows that resolve fields by name.
pub fn read_clean_rows(path: impl AsRef<Path>) -> Result<Vec<CleanRow>, CleanError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CleanError::FileMissing(path.to_path_buf()));
    }
    let file = File::open(path)?;
    clean_rows_from_reader(file)
}

/// Same as [`read_clean_rows`], for callers holding an open file handle
/// or any other record stream.
pub fn clean_rows_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<CleanRow>, CleanError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let schema = Arc::new(CleanSchema::from_header(
        csv_reader.headers().map_err(|source| CleanError::Csv {
            file: "clean dataset".to_string(),
            source,
        })?,
    ));

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        match record {
            Ok(r) => rows.push(CleanRow::new(Arc::clone(&schema), r)),
            Err(e) => warn!(error = %e, "skipping unreadable clean row"),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_through_the_header_binding() {
        let data = "country,year_month,net_amount\nFR,2025-01,100\nDE,2025-01,30\n";
        let rows = clean_rows_from_reader(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("country"), Some("FR"));
        assert_eq!(rows[1].get("net_amount"), Some("30"));
    }
}
