use super::round2;
use crate::api::{Mapper, Reducer};
use crate::runtime::Pipeline;
use crate::schema::CleanRow;
use anyhow::Result;
use serde::Serialize;

/// The single output record of the return-rate job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnRateSummary {
    pub total: u64,
    pub returned: u64,
    #[serde(rename = "return_rate(%)")]
    pub return_rate_pct: f64,
}

impl ReturnRateSummary {
    fn empty() -> Self {
        Self {
            total: 0,
            returned: 0,
            return_rate_pct: 0.0,
        }
    }
}

/// Emits one `(1, indicator)` pair per row under the single global key.
/// The return flag is resolved by name from the header.
pub struct ReturnFlagMapper;

impl Mapper for ReturnFlagMapper {
    type Input = CleanRow;
    type Key = ();
    type Value = (u64, u64);

    fn map(&self, row: &CleanRow) -> Result<Option<((), (u64, u64))>> {
        let flagged = row.get("is_return").map(|v| v == "1").unwrap_or(false);
        Ok(Some(((), (1, u64::from(flagged)))))
    }
}

/// Sums both counters over the global group. A zero total yields a zero
/// rate rather than a division error.
pub struct ReturnRateReducer;

impl Reducer for ReturnRateReducer {
    type Key = ();
    type ValueIn = (u64, u64);
    type Out = ReturnRateSummary;

    fn reduce(&self, _key: &(), values: Vec<(u64, u64)>) -> Option<ReturnRateSummary> {
        let mut total = 0u64;
        let mut returned = 0u64;
        for (t, r) in values {
            total += t;
            returned += r;
        }
        let return_rate_pct = if total > 0 {
            round2(returned as f64 / total as f64 * 100.0)
        } else {
            0.0
        };
        Some(ReturnRateSummary {
            total,
            returned,
            return_rate_pct,
        })
    }
}

/// Global return rate over the clean dataset. Always produces exactly one
/// summary, even for an empty input.
pub fn run(rows: &[CleanRow]) -> ReturnRateSummary {
    let mut pipeline = Pipeline::new("return_rate");
    pipeline
        .map_reduce(rows, &ReturnFlagMapper, &ReturnRateReducer)
        .pop()
        .unwrap_or_else(ReturnRateSummary::empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::testing::rows;

    #[test]
    fn computes_the_global_rate() {
        let mut csv = String::from("transaction_id,is_return\n");
        for i in 0..10 {
            csv.push_str(&format!("t{i},{}\n", if i < 3 { "1" } else { "0" }));
        }
        let summary = run(&rows(&csv));
        assert_eq!(
            summary,
            ReturnRateSummary {
                total: 10,
                returned: 3,
                return_rate_pct: 30.0,
            }
        );
    }

    #[test]
    fn zero_rows_yield_zero_rate_without_dividing() {
        let summary = run(&rows("transaction_id,is_return\n"));
        assert_eq!(summary, ReturnRateSummary::empty());
    }

    #[test]
    fn missing_flag_column_counts_rows_as_not_returned() {
        let summary = run(&rows("transaction_id\nt1\nt2\n"));
        assert_eq!(summary.total, 2);
        assert_eq!(summary.returned, 0);
        assert_eq!(summary.return_rate_pct, 0.0);
    }

    #[test]
    fn serializes_the_percent_field_name() {
        let summary = ReturnRateSummary {
            total: 10,
            returned: 3,
            return_rate_pct: 30.0,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, r#"{"total":10,"returned":3,"return_rate(%)":30.0}"#);
    }
}
