use crate::geometry::DEFAULT_ID_FIELD;
use crate::models::YearRange;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest year range a config may request.
pub const MAX_YEARS: usize = 500;

/// Everything that shapes a run. Defaults reproduce the NYC sales map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Wide CSV of yearly averages per category and region.
    pub records: PathBuf,
    /// `.shp` or `.geojson` with one boundary per region.
    pub shapes: PathBuf,
    /// Geometry attribute holding the region id.
    pub id_field: String,
    pub years: YearRange,
    /// Lower end of the color scale.
    pub low: f64,
    /// Upper end of the color scale.
    pub high: f64,
    /// Color for values that cannot be placed on the scale.
    pub nan_color: String,
    /// Color bar tick positions and their labels.
    pub ticks: Vec<(f64, String)>,
    /// Map area size in pixels (title and legend bands are added around it).
    pub map_width: u32,
    pub map_height: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            records: PathBuf::from("data/zipcode_averages_nyc.csv"),
            shapes: PathBuf::from("data/shape-files/zipcode_shapes.shp"),
            id_field: DEFAULT_ID_FIELD.to_string(),
            years: YearRange::NYC_SALES,
            low: 0.0,
            high: 25_000_000.0,
            nan_color: "#d9d9d9".to_string(),
            ticks: [
                (0.0, "$0"),
                (5_000_000.0, "$5M"),
                (10_000_000.0, "$10M"),
                (15_000_000.0, "$15M"),
                (20_000_000.0, "$20M"),
                (25_000_000.0, "$25M"),
            ]
            .into_iter()
            .map(|(v, l)| (v, l.to_string()))
            .collect(),
            map_width: 600,
            map_height: 600,
        }
    }
}

impl MapConfig {
    /// Read a JSON config; missing keys fall back to the defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: MapConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.years.is_empty() {
            bail!(
                "year range {}..={} is empty",
                self.years.start,
                self.years.end
            );
        }
        if self.years.len() > MAX_YEARS {
            bail!(
                "year range {}..={} spans {} years, at most {MAX_YEARS} are allowed",
                self.years.start,
                self.years.end,
                self.years.len()
            );
        }
        if !(self.low.is_finite() && self.high.is_finite() && self.low < self.high) {
            bail!("color scale needs low < high, got {}..{}", self.low, self.high);
        }
        if self.map_width < 100 || self.map_height < 100 {
            bail!("map area must be at least 100x100 pixels");
        }
        Ok(())
    }
}
