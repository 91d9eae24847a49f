//! Per-year annotated geometries, keyed explicitly by year.

use crate::config::MapConfig;
use crate::error::MapError;
use crate::geometry::RegionGeometry;
use crate::join::{AnnotatedGeometry, annotate};
use crate::models::YearRange;
use crate::records::{RecordTable, slice_years};
use crate::viz::{ColorScale, Figure, FigureLayout};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One year's joined geometry and its serialized GeoJSON.
#[derive(Debug, Clone)]
pub struct YearEntry {
    pub year: i32,
    pub geometry: AnnotatedGeometry,
    pub geojson: String,
}

/// Entries for every year of a range; built once, then only looked up.
#[derive(Debug, Clone)]
pub struct YearSeries {
    range: YearRange,
    entries: BTreeMap<i32, YearEntry>,
}

impl YearSeries {
    /// Slice, join and serialize every year of `range`.
    pub fn build(table: &RecordTable, base: Arc<RegionGeometry>, range: YearRange) -> Result<Self> {
        let slices = slice_years(table, &range.labels())?;
        let mut entries = Vec::with_capacity(slices.len());
        for (year, slice) in range.years().zip(&slices) {
            let geometry = annotate(slice, &base);
            let geojson = geometry
                .to_geojson_string()
                .with_context(|| format!("serializing year {year}"))?;
            entries.push(YearEntry {
                year,
                geometry,
                geojson,
            });
        }
        let series = Self::from_entries(range, entries)?;
        log::info!(
            "Prepared {} years ({}..={}) over {} regions",
            series.len(),
            range.start,
            range.end,
            base.len()
        );
        Ok(series)
    }

    /// Load both inputs named by `cfg` and build its year range.
    pub fn from_config(cfg: &MapConfig) -> Result<Self> {
        let table = RecordTable::from_path(&cfg.records)?;
        let base = RegionGeometry::from_path(&cfg.shapes, &cfg.id_field)?;
        Self::build(&table, Arc::new(base), cfg.years)
    }

    /// Assemble from prepared entries; they must cover `range` exactly, once each.
    pub fn from_entries(range: YearRange, entries: Vec<YearEntry>) -> Result<Self, MapError> {
        let mismatch = |detail: String| MapError::SeriesMismatch {
            start: range.start,
            end: range.end,
            detail,
        };
        let mut map = BTreeMap::new();
        for entry in entries {
            if !range.contains(entry.year) {
                return Err(mismatch(format!("unexpected year {}", entry.year)));
            }
            let year = entry.year;
            if map.insert(year, entry).is_some() {
                return Err(mismatch(format!("duplicate year {year}")));
            }
        }
        if let Some(missing) = range.years().find(|y| !map.contains_key(y)) {
            return Err(mismatch(format!("missing year {missing}")));
        }
        Ok(Self {
            range,
            entries: map,
        })
    }

    pub fn range(&self) -> YearRange {
        self.range
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `year`; years outside the range are a typed error.
    pub fn get(&self, year: i32) -> Result<&YearEntry, MapError> {
        self.entries.get(&year).ok_or(MapError::YearOutOfRange {
            year,
            start: self.range.start,
            end: self.range.end,
        })
    }

    /// Serialized GeoJSON for `year`.
    pub fn geojson(&self, year: i32) -> Result<&str, MapError> {
        self.get(year).map(|e| e.geojson.as_str())
    }

    /// Entries in increasing year order.
    pub fn iter(&self) -> impl Iterator<Item = &YearEntry> {
        self.entries.values()
    }

    /// One figure per year, titled with its year, all sharing `scale`.
    pub fn figures(&self, scale: &Arc<ColorScale>, layout: FigureLayout) -> Vec<Figure> {
        self.iter()
            .map(|e| Figure::for_year(e.year, Arc::clone(scale)).with_layout(layout))
            .collect()
    }
}
