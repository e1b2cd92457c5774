use chrono::NaiveDate;

/// One normalized, validated, catalog-enriched sales transaction.
///
/// Unique per `transaction_id`; `quantity` and `unit_price` are positive;
/// immutable once built; the jobs only ever read it.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalSalesRecord {
    pub transaction_id: String,
    pub product_id: String,
    pub date: NaiveDate,
    pub country: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Recomputed `quantity * unit_price`.
    pub revenue: f64,
    /// Catalog name, empty when the product has no catalog match.
    pub product_name: String,
    /// Catalog category, empty when the product has no catalog match.
    pub category: String,
    /// `YYYY-MM` of `date`.
    pub year_month: String,
    /// Source-supplied revenue when present, else `quantity * unit_price`.
    pub net_amount: f64,
    pub is_return: bool,
}

/// One product catalog row after column normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
}

/// A file-level ingestion failure. Row-level drops are only counted, never
/// itemized.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectRecord {
    pub reason: String,
    pub source_file: String,
}

impl RejectRecord {
    pub fn new(reason: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            source_file: source_file.into(),
        }
    }
}
