//! State of the interactive view: the year series, the live figure and its
//! data source, and the year slider. The slider callback is a plain method so
//! it can be exercised without an event loop.

use crate::error::MapError;
use crate::models::{RegionId, YearRange};
use crate::series::{YearEntry, YearSeries};
use crate::viz::{
    ColorScale, Figure, FigureLayout, LIVE_TITLE, MapProjection, TOOLTIP_FIELDS, format_price,
    year_title,
};
use anyhow::Result;
use geo::{Area, Contains, Point};
use std::sync::Arc;

/// Year slider bounds and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearSlider {
    pub range: YearRange,
    pub step: i32,
    pub value: i32,
}

impl YearSlider {
    pub fn new(range: YearRange) -> Self {
        Self {
            range,
            step: 1,
            value: range.start,
        }
    }
}

/// The figure's data source: serialized GeoJSON of the shown year.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub year: i32,
    pub geojson: String,
}

/// Hover information for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub region: RegionId,
    pub value: f64,
    pub has_data: bool,
}

impl Tooltip {
    /// Rows as shown on screen, e.g. `Zipcode: 10001`.
    pub fn lines(&self) -> Vec<String> {
        let [(zip_label, _), (value_label, _)] = TOOLTIP_FIELDS;
        let value = if self.has_data {
            format_price(self.value)
        } else {
            format!("{} (no data)", format_price(self.value))
        };
        vec![
            format!("{zip_label}: {}", self.region),
            format!("{value_label}: {value}"),
        ]
    }
}

/// Application state owned by the event loop.
#[derive(Debug)]
pub struct MapApp {
    series: YearSeries,
    figure: Figure,
    source: DataSource,
    slider: YearSlider,
}

impl MapApp {
    /// Start on the first year of the series with the overview title.
    pub fn new(series: YearSeries, scale: Arc<ColorScale>, layout: FigureLayout) -> Result<Self> {
        let slider = YearSlider::new(series.range());
        let source = DataSource {
            year: slider.value,
            geojson: series.geojson(slider.value)?.to_string(),
        };
        Ok(Self {
            figure: Figure::new(LIVE_TITLE, scale, layout),
            series,
            source,
            slider,
        })
    }

    /// Slider callback: show `year`. Out-of-range years leave the state as it was.
    pub fn on_year_change(&mut self, year: i32) -> Result<(), MapError> {
        let entry = self.series.get(year)?;
        self.source = DataSource {
            year,
            geojson: entry.geojson.clone(),
        };
        self.figure.title = year_title(year);
        self.slider.value = year;
        log::debug!("Showing year {year}");
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.figure.title
    }

    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn slider(&self) -> YearSlider {
        self.slider
    }

    pub fn series(&self) -> &YearSeries {
        &self.series
    }

    /// Entry behind the live data source.
    pub fn current(&self) -> Result<&YearEntry, MapError> {
        self.series.get(self.source.year)
    }

    /// Region under a data-space point, topmost (smallest) first.
    pub fn region_at(&self, x: f64, y: f64) -> Option<Tooltip> {
        let point = Point::new(x, y);
        let geometry = &self.current().ok()?.geometry;
        geometry
            .iter()
            .zip(geometry.origins())
            .filter(|((region, _), _)| region.shape.contains(&point))
            .min_by(|((a, _), _), ((b, _), _)| {
                a.shape.unsigned_area().total_cmp(&b.shape.unsigned_area())
            })
            .map(|((region, value), origin)| Tooltip {
                region: region.id.clone(),
                value,
                has_data: origin.has_data(),
            })
    }

    /// Region under a pixel of the rendered figure.
    pub fn tooltip_at_pixel(&self, px: f64, py: f64) -> Option<Tooltip> {
        let entry = self.current().ok()?;
        let projection: MapProjection = self.figure.projection(&entry.geometry).ok()?;
        let (ox, oy) = self.figure.layout.map_origin();
        let (mx, my) = (px - ox as f64, py - oy as f64);
        if mx < 0.0
            || my < 0.0
            || mx > self.figure.layout.map_width as f64
            || my > self.figure.layout.map_height as f64
        {
            return None;
        }
        let (x, y) = projection.to_data(mx, my);
        self.region_at(x, y)
    }
}
