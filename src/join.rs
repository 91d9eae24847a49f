//! Resolve one value per region and attach it to the region geometry.

use crate::geometry::{Region, RegionGeometry};
use crate::models::RegionId;
use crate::records::YearSlice;
use ahash::{AHashMap, AHashSet};
use anyhow::Result;
use geojson::{Feature, FeatureCollection, Geometry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the property that carries the resolved value in serialized output.
pub const VALUE_FIELD: &str = "value";

/// How a region row's category cells collapsed into a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one category held a value.
    Single,
    /// No category held a value; resolved to 0.
    Missing,
    /// Several categories held values; the last one in scan order won.
    Conflict { candidates: usize },
}

/// Collapse the category cells of one region. Cells are scanned in
/// `Borough::ALL` order and the last non-missing value wins; all-missing gives 0.
pub fn resolve_categories(categories: &[Option<f64>]) -> (f64, Resolution) {
    let mut value = 0.0;
    let mut candidates = 0;
    for v in categories.iter().flatten() {
        value = *v;
        candidates += 1;
    }
    let resolution = match candidates {
        0 => Resolution::Missing,
        1 => Resolution::Single,
        n => Resolution::Conflict { candidates: n },
    };
    (value, resolution)
}

/// Where a region's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    Record(Resolution),
    /// No record row for this region.
    Unmatched,
}

impl ValueOrigin {
    /// True when the value is a sale average rather than a default.
    pub fn has_data(self) -> bool {
        matches!(
            self,
            ValueOrigin::Record(Resolution::Single | Resolution::Conflict { .. })
        )
    }
}

/// Data-quality counters for one join. Nothing here aborts the run; the
/// numbers let callers assert expectations on real data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinReport {
    /// Geometry regions that found a record row.
    pub matched: usize,
    /// Geometry regions with no record row, defaulted to 0.
    pub unmatched: Vec<RegionId>,
    /// Matched rows whose categories were all missing, defaulted to 0.
    pub missing: usize,
    /// Matched rows with more than one category value.
    pub conflicts: usize,
    /// Record regions that no geometry region asked for.
    pub unused: usize,
}

impl JoinReport {
    /// Geometry regions whose value is a default rather than data.
    pub fn defaulted(&self) -> usize {
        self.unmatched.len() + self.missing
    }
}

/// Region geometry plus one value per region, for one year.
#[derive(Debug, Clone)]
pub struct AnnotatedGeometry {
    pub year: String,
    base: Arc<RegionGeometry>,
    values: Vec<f64>,
    origins: Vec<ValueOrigin>,
    report: JoinReport,
}

impl AnnotatedGeometry {
    pub fn base(&self) -> &RegionGeometry {
        &self.base
    }

    /// Values in geometry row order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Origins in geometry row order, parallel to `values`.
    pub fn origins(&self) -> &[ValueOrigin] {
        &self.origins
    }

    pub fn report(&self) -> &JoinReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Regions paired with their values, in geometry order.
    pub fn iter(&self) -> impl Iterator<Item = (&Region, f64)> + '_ {
        self.base.iter().zip(self.values.iter().copied())
    }

    /// Value of the first region with this id.
    pub fn value_of(&self, id: &RegionId) -> Option<f64> {
        self.iter().find(|(r, _)| &r.id == id).map(|(_, v)| v)
    }

    /// Feature collection with the region attributes plus `value`.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .iter()
            .map(|(region, value)| {
                let mut properties = region.properties.clone();
                properties.insert(VALUE_FIELD.to_string(), serde_json::Value::from(value));
                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(geojson::Value::from(&region.shape))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    /// Serialized GeoJSON text, as handed to the figure data source.
    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_feature_collection())?)
    }
}

/// Join one year's slice onto the base geometry.
///
/// Output has exactly one value per geometry region, in geometry order, and
/// does not depend on the slice's row order. Regions without a record get 0.
pub fn annotate(slice: &YearSlice, base: &Arc<RegionGeometry>) -> AnnotatedGeometry {
    let mut resolved: AHashMap<&RegionId, (f64, Resolution)> =
        AHashMap::with_capacity(slice.rows.len());
    for row in &slice.rows {
        resolved
            .entry(&row.region)
            .or_insert_with(|| resolve_categories(&row.categories));
    }

    let mut report = JoinReport::default();
    let mut used = 0usize;
    let mut seen: AHashSet<&RegionId> = AHashSet::new();
    let mut values = Vec::with_capacity(base.len());
    let mut origins = Vec::with_capacity(base.len());
    for region in base.iter() {
        match resolved.get(&region.id) {
            Some(&(value, resolution)) => {
                report.matched += 1;
                if seen.insert(&region.id) {
                    used += 1;
                }
                match resolution {
                    Resolution::Single => {}
                    Resolution::Missing => {
                        report.missing += 1;
                        log::debug!(
                            "Year {}: region {} has no category value, using 0",
                            slice.year,
                            region.id
                        );
                    }
                    Resolution::Conflict { candidates } => {
                        report.conflicts += 1;
                        log::debug!(
                            "Year {}: region {} has {candidates} category values, using the last",
                            slice.year,
                            region.id
                        );
                    }
                }
                values.push(value);
                origins.push(ValueOrigin::Record(resolution));
            }
            None => {
                log::debug!(
                    "Year {}: region {} missing from records, using 0",
                    slice.year,
                    region.id
                );
                report.unmatched.push(region.id.clone());
                values.push(0.0);
                origins.push(ValueOrigin::Unmatched);
            }
        }
    }
    report.unused = resolved.len() - used;

    if report.defaulted() > 0 || report.conflicts > 0 {
        log::info!(
            "Year {}: {} of {} regions defaulted to 0 ({} unmatched, {} empty), {} conflicts, {} unused records",
            slice.year,
            report.defaulted(),
            base.len(),
            report.unmatched.len(),
            report.missing,
            report.conflicts,
            report.unused
        );
    }

    AnnotatedGeometry {
        year: slice.year.clone(),
        base: Arc::clone(base),
        values,
        origins,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_kinds() {
        assert_eq!(
            resolve_categories(&[None, Some(5.0), None, None, None]),
            (5.0, Resolution::Single)
        );
        assert_eq!(resolve_categories(&[None; 5]), (0.0, Resolution::Missing));
        assert_eq!(
            resolve_categories(&[Some(1.0), None, Some(3.0), None, None]),
            (3.0, Resolution::Conflict { candidates: 2 })
        );
    }

    #[test]
    fn defaulted_counts_both_kinds() {
        let report = JoinReport {
            matched: 3,
            unmatched: vec![RegionId::new("10001")],
            missing: 2,
            conflicts: 0,
            unused: 0,
        };
        assert_eq!(report.defaulted(), 3);
    }
}
