use crate::catalog::Catalog;
use crate::error::CleanError;
use crate::record::{CanonicalSalesRecord, RejectRecord};
use crate::schema::SalesSchema;
use crate::stats::{file_name, CleanSummary};
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// One validated row from a source file, prior to dedup and join.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    pub transaction_id: String,
    pub product_id: String,
    pub date: NaiveDate,
    pub country: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Revenue as supplied by the source, when it had such a column and
    /// the value parsed as a non-negative number.
    pub source_revenue: Option<f64>,
    pub is_return: bool,
}

/// Result of scanning one source file.
#[derive(Debug)]
pub struct FileScan {
    pub rows: Vec<ValidatedRow>,
    pub rows_read: u64,
    pub rows_rejected: u64,
}

/// Everything the cleaning/join stage produces.
#[derive(Debug)]
pub struct CleanOutcome {
    pub records: Vec<CanonicalSalesRecord>,
    pub rejects: Vec<RejectRecord>,
    pub summary: CleanSummary,
}

/// Read one sales source, resolving its header against the synonym table
/// and dropping invalid rows. Fails only at file level: a missing file or
/// a header lacking required columns. An unreadable data line counts as a
/// rejected row.
pub fn scan_sales_file(path: &Path) -> Result<FileScan, CleanError> {
    if !path.exists() {
        return Err(CleanError::FileMissing(path.to_path_buf()));
    }
    let file = file_name(path);
    let csv_err = |source| CleanError::Csv {
        file: file.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let header = reader.headers().map_err(csv_err)?.clone();
    let schema = SalesSchema::from_header(&file, &header)?;

    let mut rows = Vec::new();
    let mut rows_read = 0u64;
    let mut rows_rejected = 0u64;
    for record in reader.records() {
        rows_read += 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(file = %file, error = %e, "skipping unreadable row");
                rows_rejected += 1;
                continue;
            }
        };
        match validate_row(&schema, &record) {
            Some(row) => rows.push(row),
            None => rows_rejected += 1,
        }
    }

    info!(
        file = %file,
        rows_read,
        rows_valid = rows.len(),
        rows_rejected,
        "sales source scanned"
    );
    Ok(FileScan {
        rows,
        rows_read,
        rows_rejected,
    })
}

/// Row validity filter: required fields present and non-empty, positive
/// quantity and unit price, parsable date, and a transaction id to
/// deduplicate on.
fn validate_row(schema: &SalesSchema, record: &StringRecord) -> Option<ValidatedRow> {
    let transaction_id = non_empty(schema.transaction_id(record)?)?;
    let product_id = non_empty(schema.product_id(record)?)?;
    let country = non_empty(schema.country(record)?)?;
    let quantity = positive_number(schema.quantity(record)?)?;
    let unit_price = positive_number(schema.unit_price(record)?)?;
    let date = parse_date(schema.date(record)?)?;
    let source_revenue = schema
        .revenue(record)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0);
    let is_return = schema.is_return(record).map(|s| s == "1").unwrap_or(false);

    Some(ValidatedRow {
        transaction_id: transaction_id.to_string(),
        product_id: product_id.to_string(),
        date,
        country: country.to_string(),
        quantity,
        unit_price,
        source_revenue,
        is_return,
    })
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn positive_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|dt| dt.date())
                .ok()
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .map(|dt| dt.date())
                .ok()
        })
        .or_else(|| NaiveDate::parse_from_str(s, "%d/%m/%Y").ok())
}

/// Keep the first row per `transaction_id`, in input order. Later
/// duplicates are discarded silently, not counted as rejects.
pub fn dedup_by_transaction(rows: Vec<ValidatedRow>) -> Vec<ValidatedRow> {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.transaction_id.clone()))
        .collect()
}

/// Left join against the catalog and compute the derived fields. Every
/// input row appears in the output exactly once; unmatched products keep
/// empty name/category.
pub fn join_and_derive(rows: Vec<ValidatedRow>, catalog: &Catalog) -> Vec<CanonicalSalesRecord> {
    rows.into_iter()
        .map(|row| {
            let (product_name, category) = match catalog.get(&row.product_id) {
                Some(entry) => (entry.product_name.clone(), entry.category.clone()),
                None => (String::new(), String::new()),
            };
            let revenue = row.quantity * row.unit_price;
            let net_amount = row.source_revenue.unwrap_or(revenue);
            let year_month = row.date.format("%Y-%m").to_string();
            CanonicalSalesRecord {
                transaction_id: row.transaction_id,
                product_id: row.product_id,
                date: row.date,
                country: row.country,
                quantity: row.quantity,
                unit_price: row.unit_price,
                revenue,
                product_name,
                category,
                year_month,
                net_amount,
                is_return: row.is_return,
            }
        })
        .collect()
}

/// The whole cleaning stage: scan every source in declared order, merge,
/// dedup, join, derive. Partial failures (missing or schema-broken files)
/// degrade into reject records; only the case where no file at all was
/// readable aborts.
pub fn clean_and_join(
    inputs: &[impl AsRef<Path>],
    catalog_path: &Path,
) -> Result<CleanOutcome, CleanError> {
    let catalog = Catalog::load(catalog_path)?;

    let mut merged: Vec<ValidatedRow> = Vec::new();
    let mut rejects: Vec<RejectRecord> = Vec::new();
    let mut rejected_rows = 0u64;
    let mut readable_files = 0usize;

    for input in inputs {
        let path = input.as_ref();
        let file = file_name(path);
        match scan_sales_file(path) {
            Ok(scan) => {
                readable_files += 1;
                rejected_rows += scan.rows_rejected;
                merged.extend(scan.rows);
            }
            Err(CleanError::FileMissing(_)) => {
                warn!(file = %file, "input file missing");
                rejects.push(RejectRecord::new("missing_file", file));
            }
            Err(CleanError::Schema { missing, .. }) => {
                warn!(file = %file, ?missing, "required columns missing");
                rejects.push(RejectRecord::new(
                    format!("schema_error: missing {}", missing.join("/")),
                    file,
                ));
            }
            Err(e) => {
                warn!(file = %file, error = %e, "input file unreadable");
                rejects.push(RejectRecord::new(format!("read_error: {e}"), file));
            }
        }
    }

    if readable_files == 0 {
        return Err(CleanError::NoValidInput);
    }

    let deduped = dedup_by_transaction(merged);
    let records = join_and_derive(deduped, &catalog);

    let unique_transactions = records.len() as u64;
    let summary = CleanSummary::new(
        inputs,
        records.len() as u64,
        rejects.len() as u64,
        rejected_rows,
        unique_transactions,
    );
    info!(
        valid_rows = summary.valid_rows,
        rejected_files = summary.rejected_files,
        rejected_rows = summary.rejected_rows,
        unique_transactions,
        "clean/join stage complete"
    );

    Ok(CleanOutcome {
        records,
        rejects,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CatalogEntry;

    fn row(tx: &str, product: &str) -> ValidatedRow {
        ValidatedRow {
            transaction_id: tx.to_string(),
            product_id: product.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            country: "FR".to_string(),
            quantity: 2.0,
            unit_price: 10.0,
            source_revenue: None,
            is_return: false,
        }
    }

    fn schema(cols: &[&str]) -> SalesSchema {
        SalesSchema::from_header("test.csv", &StringRecord::from(cols.to_vec())).unwrap()
    }

    const BASE: [&str; 6] = [
        "transaction_id",
        "product_id",
        "date",
        "country",
        "quantity",
        "unit_price",
    ];

    #[test]
    fn rejects_rows_with_invalid_values() {
        let schema = schema(&BASE);
        let valid = StringRecord::from(vec!["t1", "p1", "2025-01-15", "FR", "2", "10"]);
        assert!(validate_row(&schema, &valid).is_some());

        let cases = [
            vec!["", "p1", "2025-01-15", "FR", "2", "10"],      // no transaction id
            vec!["t1", "", "2025-01-15", "FR", "2", "10"],      // no product id
            vec!["t1", "p1", "not-a-date", "FR", "2", "10"],    // bad date
            vec!["t1", "p1", "2025-01-15", "", "2", "10"],      // no country
            vec!["t1", "p1", "2025-01-15", "FR", "0", "10"],    // zero quantity
            vec!["t1", "p1", "2025-01-15", "FR", "-1", "10"],   // negative quantity
            vec!["t1", "p1", "2025-01-15", "FR", "2", "abc"],   // non-numeric price
        ];
        for fields in cases {
            let record = StringRecord::from(fields.clone());
            assert!(
                validate_row(&schema, &record).is_none(),
                "expected reject: {fields:?}"
            );
        }
    }

    #[test]
    fn accepts_datetime_and_slash_dates() {
        let schema = schema(&BASE);
        for date in ["2025-01-15 10:30:00", "2025-01-15T10:30:00", "15/01/2025"] {
            let record = StringRecord::from(vec!["t1", "p1", date, "FR", "2", "10"]);
            let row = validate_row(&schema, &record).expect(date);
            assert_eq!(row.date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        }
    }

    #[test]
    fn source_revenue_is_kept_only_when_parsable_and_non_negative() {
        let schema = schema(&[
            "transaction_id",
            "product_id",
            "date",
            "country",
            "quantity",
            "unit_price",
            "revenue",
        ]);
        let with = StringRecord::from(vec!["t1", "p1", "2025-01-15", "FR", "2", "10", "19.5"]);
        assert_eq!(
            validate_row(&schema, &with).unwrap().source_revenue,
            Some(19.5)
        );
        let junk = StringRecord::from(vec!["t1", "p1", "2025-01-15", "FR", "2", "10", "n/a"]);
        assert_eq!(validate_row(&schema, &junk).unwrap().source_revenue, None);
        let negative = StringRecord::from(vec!["t1", "p1", "2025-01-15", "FR", "2", "10", "-4"]);
        assert_eq!(validate_row(&schema, &negative).unwrap().source_revenue, None);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let rows = vec![row("t1", "p1"), row("t2", "p2"), row("t1", "p9")];
        let deduped = dedup_by_transaction(rows);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].product_id, "p1");
        assert_eq!(deduped[1].transaction_id, "t2");
    }

    #[test]
    fn dedup_is_idempotent() {
        let rows = vec![row("t1", "p1"), row("t2", "p2"), row("t1", "p9")];
        let once = dedup_by_transaction(rows);
        let twice = dedup_by_transaction(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn join_never_drops_rows_and_fills_empty_on_miss() {
        let file = {
            use std::io::Write;
            let mut f = tempfile::NamedTempFile::new().unwrap();
            f.write_all(b"product_id,product_name,category\np1,Keyboard,Office\n")
                .unwrap();
            f.flush().unwrap();
            f
        };
        let catalog = Catalog::load(file.path()).unwrap();

        let records = join_and_derive(vec![row("t1", "p1"), row("t2", "unknown")], &catalog);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product_name, "Keyboard");
        assert_eq!(records[0].category, "Office");
        assert_eq!(records[1].product_name, "");
        assert_eq!(records[1].category, "");
        assert_eq!(
            catalog.get("p1"),
            Some(&CatalogEntry {
                product_id: "p1".to_string(),
                product_name: "Keyboard".to_string(),
                category: "Office".to_string(),
            })
        );
    }

    #[test]
    fn derives_net_amount_and_year_month() {
        let plain = row("t1", "p1");
        let mut sourced = row("t2", "p2");
        sourced.source_revenue = Some(15.0);

        let records = join_and_derive(vec![plain, sourced], &Catalog::empty());
        assert_eq!(records[0].net_amount, 20.0); // quantity * unit_price
        assert_eq!(records[0].revenue, 20.0);
        assert_eq!(records[0].year_month, "2025-01");
        assert_eq!(records[1].net_amount, 15.0); // source revenue wins
        assert_eq!(records[1].revenue, 20.0); // recomputed regardless
    }
}
