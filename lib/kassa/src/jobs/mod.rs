//! The aggregation jobs, each an explicit pipeline of map/reduce stages
//! over the clean dataset. Jobs parse fields by name from [`CleanRow`]s;
//! a row that fails to parse is a mapper fault the runtime skips.
//!
//! [`CleanRow`]: crate::schema::CleanRow

pub mod kpi;
pub mod return_rate;
pub mod top10;

/// Round to two decimal places, the precision all job outputs commit to.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
