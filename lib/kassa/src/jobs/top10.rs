use super::round2;
use crate::api::{FinalReducer, Mapper, Reducer};
use crate::runtime::Pipeline;
use crate::schema::CleanRow;
use anyhow::{Context, Result};
use serde::Serialize;

pub const TOP_LIMIT: usize = 10;

/// One per-product revenue total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRevenue {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub total_revenue: f64,
}

/// Emits `product_id -> (name, category, quantity * unit_price)` for rows
/// with a product id and positive revenue. Revenue is recomputed from
/// quantity and unit price rather than read from the dataset.
pub struct RevenueMapper;

impl Mapper for RevenueMapper {
    type Input = CleanRow;
    type Key = String;
    type Value = (String, String, f64);

    fn map(&self, row: &CleanRow) -> Result<Option<(String, (String, String, f64))>> {
        let product_id = row.get("product_id").unwrap_or_default();
        let product_name = row.get("product_name").unwrap_or_default();
        let category = row.get("category").unwrap_or_default();
        let quantity = numeric_or_zero(row, "quantity")?;
        let unit_price = numeric_or_zero(row, "unit_price")?;
        let revenue = quantity * unit_price;
        if product_id.is_empty() || revenue <= 0.0 {
            return Ok(None);
        }
        Ok(Some((
            product_id.to_string(),
            (product_name.to_string(), category.to_string(), revenue),
        )))
    }
}

fn numeric_or_zero(row: &CleanRow, field: &str) -> Result<f64> {
    match row.get(field) {
        Some(s) if !s.is_empty() => s
            .parse::<f64>()
            .with_context(|| format!("{field} is not numeric")),
        _ => Ok(0.0),
    }
}

/// Sums revenue per product. Labels are not aggregated: the last value
/// seen stands for the product, assuming source data is consistent.
pub struct RevenueSumReducer;

impl Reducer for RevenueSumReducer {
    type Key = String;
    type ValueIn = (String, String, f64);
    type Out = ProductRevenue;

    fn reduce(&self, key: &String, values: Vec<(String, String, f64)>) -> Option<ProductRevenue> {
        let mut total = 0.0;
        let mut product_name = String::new();
        let mut category = String::new();
        for (name, cat, revenue) in values {
            total += revenue;
            product_name = name;
            category = cat;
        }
        Some(ProductRevenue {
            product_id: key.clone(),
            product_name,
            category,
            total_revenue: round2(total),
        })
    }
}

/// Global selection over all per-product totals: stable sort descending
/// by revenue, then truncate. Ties keep the upstream key order.
pub struct TopKSelector {
    pub limit: usize,
}

impl FinalReducer for TopKSelector {
    type In = ProductRevenue;
    type Out = Vec<ProductRevenue>;

    fn reduce(&self, mut products: Vec<ProductRevenue>) -> Vec<ProductRevenue> {
        products.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
        products.truncate(self.limit);
        products
    }
}

/// The three-stage Top-10 job: revenue map, per-product sum, global
/// top-k selection.
pub fn run(rows: &[CleanRow]) -> Vec<ProductRevenue> {
    let mut pipeline = Pipeline::new("top10_products");
    let totals = pipeline.map_reduce(rows, &RevenueMapper, &RevenueSumReducer);
    pipeline.finalize(totals, &TopKSelector { limit: TOP_LIMIT })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::testing::rows;
    use std::fmt::Write as _;

    #[test]
    fn selects_the_ten_highest_revenues_in_descending_order() {
        // 15 products with revenues 1000, 2000, ... 15000.
        let mut csv = String::from("product_id,product_name,category,quantity,unit_price\n");
        for i in 1..=15 {
            writeln!(csv, "p{i:02},Product {i},Cat,{i},1000").unwrap();
        }
        let out = run(&rows(&csv));

        assert_eq!(out.len(), TOP_LIMIT);
        let revenues: Vec<f64> = out.iter().map(|p| p.total_revenue).collect();
        let expected: Vec<f64> = (6..=15).rev().map(|i| (i * 1000) as f64).collect();
        assert_eq!(revenues, expected);
        assert_eq!(out[0].product_id, "p15");
        assert_eq!(out[9].product_id, "p06");
    }

    #[test]
    fn sums_across_transactions_and_keeps_last_labels() {
        let input = rows(
            "product_id,product_name,category,quantity,unit_price\n\
             p1,Keyboard,Office,2,50\n\
             p1,Keyboard Pro,Office,1,50\n\
             p2,Mouse,Office,1,30\n",
        );
        let out = run(&input);
        assert_eq!(out[0].product_id, "p1");
        assert_eq!(out[0].total_revenue, 150.0);
        assert_eq!(out[0].product_name, "Keyboard Pro");
        assert_eq!(out[1].total_revenue, 30.0);
    }

    #[test]
    fn ties_keep_product_id_order() {
        let input = rows(
            "product_id,product_name,category,quantity,unit_price\n\
             pb,B,Cat,1,100\n\
             pa,A,Cat,1,100\n\
             pc,C,Cat,1,100\n",
        );
        let out = run(&input);
        let ids: Vec<&str> = out.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, vec!["pa", "pb", "pc"]);
    }

    #[test]
    fn filters_missing_product_id_and_zero_revenue() {
        let input = rows(
            "product_id,product_name,category,quantity,unit_price\n\
             ,Ghost,Cat,2,50\n\
             p1,Keyboard,Office,0,50\n\
             p2,Mouse,Office,1,0\n",
        );
        assert!(run(&input).is_empty());
    }

    #[test]
    fn shorter_inputs_yield_fewer_than_ten_rows() {
        let input = rows(
            "product_id,product_name,category,quantity,unit_price\n\
             p1,Keyboard,Office,1,10\n",
        );
        assert_eq!(run(&input).len(), 1);
    }
}
