use super::round2;
use crate::api::{Mapper, Reducer};
use crate::runtime::Pipeline;
use crate::schema::CleanRow;
use anyhow::{Context, Result};
use serde::Serialize;

/// One output row of the sales-by-country/month job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiRow {
    pub country: String,
    pub month: String,
    pub total_sales: f64,
}

/// Emits `(country, year_month) -> net_amount` for rows with a country,
/// a month and a positive net amount.
pub struct KpiMapper;

impl Mapper for KpiMapper {
    type Input = CleanRow;
    type Key = (String, String);
    type Value = f64;

    fn map(&self, row: &CleanRow) -> Result<Option<((String, String), f64)>> {
        let country = row.get("country").unwrap_or_default();
        let month = row.get("year_month").unwrap_or_default();
        let net_amount = match row.get("net_amount") {
            Some(s) if !s.is_empty() => s.parse::<f64>().context("net_amount is not numeric")?,
            _ => 0.0,
        };
        if country.is_empty() || month.is_empty() || net_amount <= 0.0 {
            return Ok(None);
        }
        Ok(Some((
            (country.to_string(), month.to_string()),
            net_amount,
        )))
    }
}

/// Sums net amounts per key, rounded to two decimals.
pub struct KpiReducer;

impl Reducer for KpiReducer {
    type Key = (String, String);
    type ValueIn = f64;
    type Out = KpiRow;

    fn reduce(&self, key: &(String, String), values: Vec<f64>) -> Option<KpiRow> {
        let total: f64 = values.iter().sum();
        Some(KpiRow {
            country: key.0.clone(),
            month: key.1.clone(),
            total_sales: round2(total),
        })
    }
}

/// Aggregate net revenue per (country, month). Rows come back sorted by
/// key.
pub fn run(rows: &[CleanRow]) -> Vec<KpiRow> {
    let mut pipeline = Pipeline::new("kpi_sales_by_country_month");
    pipeline.map_reduce(rows, &KpiMapper, &KpiReducer)
}
