//! nyc_sales_map
//!
//! Joins yearly average property-sale prices per NYC zipcode with zipcode
//! boundary shapes and renders them as a choropleth. Pairs with the `nycmap`
//! CLI and the `nycmap-gui` interactive viewer.
//!
//! ### Features
//! - Slice a wide borough × year × zipcode CSV into one record set per year
//! - Join each year onto shapefile/GeoJSON boundaries (missing zipcodes → 0)
//! - Fixed 512-entry palette over a `$0..$25M` linear scale
//! - Per-year figures rendered to SVG/PNG, plus a slider-driven live view
//!
//! ### Example
//! ```no_run
//! use nyc_sales_map::{MapConfig, YearSeries};
//! use nyc_sales_map::palette::build_palette;
//! use nyc_sales_map::viz::{self, ColorScale, FigureLayout};
//! use std::sync::Arc;
//!
//! let cfg = MapConfig::default();
//! let series = YearSeries::from_config(&cfg)?;
//! let scale = Arc::new(ColorScale::from_config(&cfg, build_palette()?)?);
//! let entry = series.get(2012)?;
//! let figures = series.figures(&scale, FigureLayout::default());
//! viz::render_to_path(&figures[7], &entry.geometry, "nyc_2012.svg")?;
//! for s in nyc_sales_map::stats::year_summaries(&series) {
//!     println!("{:?}", s);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod geometry;
pub mod join;
pub mod models;
pub mod palette;
pub mod records;
pub mod series;
pub mod stats;
pub mod viz;

pub use app::MapApp;
pub use config::MapConfig;
pub use error::MapError;
pub use geometry::RegionGeometry;
pub use join::{AnnotatedGeometry, JoinReport, annotate};
pub use models::{Borough, RegionId, YearRange};
pub use records::{RecordTable, YearSlice};
pub use series::YearSeries;
