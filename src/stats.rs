use crate::series::YearSeries;
use serde::{Deserialize, Serialize};

/// Summary statistics for one year of the map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearSummary {
    pub year: i32,
    pub regions: usize,
    /// Regions carrying a record value (not defaulted to 0).
    pub with_data: usize,
    pub defaulted: usize,
    pub conflicts: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute per-year statistics over the values that came from data.
pub fn year_summaries(series: &YearSeries) -> Vec<YearSummary> {
    let mut out = Vec::new();
    for entry in series.iter() {
        let geometry = &entry.geometry;
        let report = geometry.report();

        let mut vals: Vec<f64> = geometry
            .values()
            .iter()
            .zip(geometry.origins())
            .filter(|(v, o)| o.has_data() && v.is_finite())
            .map(|(v, _)| *v)
            .collect();

        vals.sort_by(|a, b| a.total_cmp(b));
        let count = vals.len();
        let min = vals.first().cloned();
        let max = vals.last().cloned();
        let mean = if count > 0 {
            Some(vals.iter().copied().sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        out.push(YearSummary {
            year: entry.year,
            regions: geometry.len(),
            with_data: count,
            defaulted: report.defaulted(),
            conflicts: report.conflicts,
            min,
            max,
            mean,
            median,
        });
    }
    out
}
