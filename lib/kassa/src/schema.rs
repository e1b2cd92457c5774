use crate::error::CleanError;
use csv::StringRecord;
use std::collections::HashMap;
use std::sync::Arc;

/// Canonical columns every sales source must provide after alias
/// resolution. Absence of any of them is fatal for the whole file.
pub const REQUIRED_SALES_COLUMNS: [&str; 5] =
    ["product_id", "date", "country", "quantity", "unit_price"];

/// Column order of the clean dataset.
pub const CLEAN_HEADER: [&str; 12] = [
    "transaction_id",
    "product_id",
    "date",
    "country",
    "quantity",
    "unit_price",
    "revenue",
    "product_name",
    "category",
    "year_month",
    "net_amount",
    "is_return",
];

/// Synonym table for sales source headers. Input must already be
/// lowercased with spaces collapsed to underscores.
fn sales_alias(name: &str) -> &str {
    match name {
        "ts" | "timestamp" | "transaction_date" => "date",
        "qty" | "quantite" => "quantity",
        "prix_unitaire" => "unit_price",
        "pays" => "country",
        "produit_id" => "product_id",
        "tx_id" | "id_transaction" => "transaction_id",
        other => other,
    }
}

fn normalize_column(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Column layout of one sales source, bound once per file scan and passed
/// explicitly to every row lookup.
#[derive(Debug, Clone)]
pub struct SalesSchema {
    transaction_id: Option<usize>,
    product_id: usize,
    date: usize,
    country: usize,
    quantity: usize,
    unit_price: usize,
    revenue: Option<usize>,
    is_return: Option<usize>,
}

impl SalesSchema {
    /// Resolve a raw header against the synonym table. The first
    /// occurrence wins when a canonical name appears twice.
    pub fn from_header(file: &str, header: &StringRecord) -> Result<Self, CleanError> {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (i, raw) in header.iter().enumerate() {
            let canonical = sales_alias(&normalize_column(raw)).to_string();
            index.entry(canonical).or_insert(i);
        }

        let missing: Vec<String> = REQUIRED_SALES_COLUMNS
            .iter()
            .filter(|c| !index.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CleanError::Schema {
                file: file.to_string(),
                missing,
            });
        }

        Ok(Self {
            transaction_id: index.get("transaction_id").copied(),
            product_id: index["product_id"],
            date: index["date"],
            country: index["country"],
            quantity: index["quantity"],
            unit_price: index["unit_price"],
            revenue: index.get("revenue").copied(),
            is_return: index.get("is_return").copied(),
        })
    }

    pub fn transaction_id<'r>(&self, row: &'r StringRecord) -> Option<&'r str> {
        self.transaction_id.and_then(|i| row.get(i))
    }

    pub fn product_id<'r>(&self, row: &'r StringRecord) -> Option<&'r str> {
        row.get(self.product_id)
    }

    pub fn date<'r>(&self, row: &'r StringRecord) -> Option<&'r str> {
        row.get(self.date)
    }

    pub fn country<'r>(&self, row: &'r StringRecord) -> Option<&'r str> {
        row.get(self.country)
    }

    pub fn quantity<'r>(&self, row: &'r StringRecord) -> Option<&'r str> {
        row.get(self.quantity)
    }

    pub fn unit_price<'r>(&self, row: &'r StringRecord) -> Option<&'r str> {
        row.get(self.unit_price)
    }

    /// Whether the source supplied its own revenue column.
    pub fn has_revenue(&self) -> bool {
        self.revenue.is_some()
    }

    pub fn revenue<'r>(&self, row: &'r StringRecord) -> Option<&'r str> {
        self.revenue.and_then(|i| row.get(i))
    }

    pub fn is_return<'r>(&self, row: &'r StringRecord) -> Option<&'r str> {
        self.is_return.and_then(|i| row.get(i))
    }
}

/// Header binding for the clean dataset, shared by every row of one scan.
/// Jobs resolve fields by name through this, never by position.
#[derive(Debug, Clone)]
pub struct CleanSchema {
    index: HashMap<String, usize>,
}

impl CleanSchema {
    pub fn from_header(header: &StringRecord) -> Self {
        let mut index = HashMap::new();
        for (i, raw) in header.iter().enumerate() {
            index.entry(normalize_column(raw)).or_insert(i);
        }
        Self { index }
    }

    pub fn get<'r>(&self, row: &'r StringRecord, field: &str) -> Option<&'r str> {
        self.index
            .get(field)
            .and_then(|&i| row.get(i))
            .map(str::trim)
    }
}

/// One data row of the clean dataset plus the header binding needed to
/// resolve its fields by name.
#[derive(Debug, Clone)]
pub struct CleanRow {
    schema: Arc<CleanSchema>,
    record: StringRecord,
}

impl CleanRow {
    pub fn new(schema: Arc<CleanSchema>, record: StringRecord) -> Self {
        Self { schema, record }
    }

    /// Trimmed field value, `None` when the column is absent.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.schema.get(&self.record, field)
    }
}
