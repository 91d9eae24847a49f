//! Figure assembly and rendering: choropleth patches + color bar, to **SVG**,
//! **PNG**, or an in-memory RGB buffer for the GUI.
//!
//! - Fixed linear color scale shared by every year
//! - Regions painted largest-first so enclosed regions stay visible
//! - Title band above the map, horizontal color bar below it

pub mod layout;
pub mod legend;

pub use layout::{FigureLayout, MapProjection};
pub use legend::ColorBar;

use crate::config::MapConfig;
use crate::error::MapError;
use crate::join::AnnotatedGeometry;
use crate::palette::{ColorPalette, hex_to_rgb};
use anyhow::{Result, anyhow};
use geo::{Area, LineString};
use num_format::{Locale, ToFormattedString};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::{Arc, Once};

/// Title of the live view before any slider interaction.
pub const LIVE_TITLE: &str = "NYC Property Sales throughout the years";

/// Tooltip rows: label and the field they show.
pub const TOOLTIP_FIELDS: [(&str, &str); 2] = [("Zipcode", "id"), ("Property Sale", "value")];

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

pub fn year_title(year: i32) -> String {
    format!("NYC Property Sales in {year}")
}

/// Linear value → palette mapping over a fixed domain, plus the color bar ticks.
#[derive(Debug, Clone)]
pub struct ColorScale {
    palette: ColorPalette,
    rgb: Vec<RGBColor>,
    low: f64,
    high: f64,
    nan_color: RGBColor,
    ticks: Vec<(f64, String)>,
}

impl ColorScale {
    pub fn new(
        palette: ColorPalette,
        low: f64,
        high: f64,
        nan_color: &str,
        ticks: Vec<(f64, String)>,
    ) -> Result<Self, MapError> {
        let rgb = palette
            .colors()
            .iter()
            .map(|h| hex_to_rgb(h).map(|[r, g, b]| RGBColor(r, g, b)))
            .collect::<Result<Vec<_>, _>>()?;
        let [r, g, b] = hex_to_rgb(nan_color)?;
        Ok(Self {
            palette,
            rgb,
            low,
            high,
            nan_color: RGBColor(r, g, b),
            ticks,
        })
    }

    pub fn from_config(cfg: &MapConfig, palette: ColorPalette) -> Result<Self, MapError> {
        Self::new(palette, cfg.low, cfg.high, &cfg.nan_color, cfg.ticks.clone())
    }

    /// `[0, 25M]` with the default ticks and gray for unplaceable values.
    pub fn nyc_default(palette: ColorPalette) -> Result<Self, MapError> {
        Self::from_config(&MapConfig::default(), palette)
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    pub fn ticks(&self) -> &[(f64, String)] {
        &self.ticks
    }

    /// Palette index for `value`; `None` for NaN/infinite values.
    /// The domain end maps to the last entry; values outside clamp to the ends.
    pub fn index_for(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || self.rgb.is_empty() {
            return None;
        }
        let n = self.rgb.len();
        if value >= self.high {
            return Some(n - 1);
        }
        if value <= self.low {
            return Some(0);
        }
        let normed = (value - self.low) / (self.high - self.low);
        Some(((normed * n as f64) as usize).min(n - 1))
    }

    pub fn color_for(&self, value: f64) -> RGBColor {
        match self.index_for(value) {
            Some(i) => self.rgb[i],
            None => self.nan_color,
        }
    }
}

/// Everything needed to draw one map, except the data.
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub scale: Arc<ColorScale>,
    pub layout: FigureLayout,
    pub color_bar: ColorBar,
}

impl Figure {
    pub fn new(title: impl Into<String>, scale: Arc<ColorScale>, layout: FigureLayout) -> Self {
        Self {
            title: title.into(),
            scale,
            layout,
            color_bar: ColorBar::default(),
        }
    }

    /// Default-layout figure titled with `year`.
    pub fn for_year(year: i32, scale: Arc<ColorScale>) -> Self {
        Self::new(year_title(year), scale, FigureLayout::default())
    }

    pub fn with_layout(mut self, layout: FigureLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Projection of `geometry` into this figure's map area.
    pub fn projection(&self, geometry: &AnnotatedGeometry) -> Result<MapProjection> {
        let bounds = crate::geometry::ensure_drawable(geometry.base())?;
        Ok(MapProjection::for_layout(bounds, &self.layout))
    }
}

/// Format a sale value for tooltips, e.g. `$1,234,567`.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let n = value.round() as i64;
    if n < 0 {
        format!("-${}", (-n).to_formatted_string(&Locale::en))
    } else {
        format!("${}", n.to_formatted_string(&Locale::en))
    }
}

/// Render to `.svg`, or to a bitmap format inferred from the extension.
pub fn render_to_path<P: AsRef<Path>>(
    figure: &Figure,
    geometry: &AnnotatedGeometry,
    out_path: P,
) -> Result<()> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let size = (figure.layout.width(), figure.layout.height());

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_figure(root, figure, geometry)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_figure(root, figure, geometry)?;
    }
    log::debug!("Rendered {:?} to {}", figure.title, out_path.display());
    Ok(())
}

/// Render into a tightly packed RGB buffer of `width * height * 3` bytes.
pub fn render_to_rgb(figure: &Figure, geometry: &AnnotatedGeometry) -> Result<Vec<u8>> {
    ensure_fonts_registered();
    let (w, h) = (figure.layout.width(), figure.layout.height());
    let mut buf = vec![0u8; (w as usize) * (h as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        draw_figure(root, figure, geometry)?;
    }
    Ok(buf)
}

/// Render to an SVG document string.
pub fn render_to_svg_string(figure: &Figure, geometry: &AnnotatedGeometry) -> Result<String> {
    ensure_fonts_registered();
    let mut out = String::new();
    {
        let size = (figure.layout.width(), figure.layout.height());
        let root = SVGBackend::with_string(&mut out, size).into_drawing_area();
        draw_figure(root, figure, geometry)?;
    }
    Ok(out)
}

/// Helper that draws to any Plotters backend.
fn draw_figure<DB>(
    root: DrawingArea<DB, Shift>,
    figure: &Figure,
    geometry: &AnnotatedGeometry,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let layout = figure.layout;

    let (title_area, rest) = root.split_vertically(layout.title_band as i32);
    let (map_area, legend_area) = rest.split_vertically(layout.map_height as i32);

    let title_style: TextStyle =
        TextStyle::from((FontFamily::SansSerif, 20)).pos(Pos::new(HPos::Left, VPos::Center));
    title_area
        .draw(&Text::new(
            figure.title.as_str(),
            (layout.margin as i32, layout.title_band as i32 / 2),
            title_style,
        ))
        .map_err(|e| anyhow!("{:?}", e))?;

    let projection = figure.projection(geometry)?;
    draw_regions(&map_area, &projection, &figure.scale, geometry)?;
    legend::draw_color_bar(&legend_area, &figure.scale, &figure.color_bar)?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Hairline region border; a faint 1px line stands in for a quarter-pixel one.
fn outline_style() -> ShapeStyle {
    BLACK.mix(0.25).stroke_width(1)
}

/// Patches layer: filled exteriors, then black outlines of every ring.
fn draw_regions<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    projection: &MapProjection,
    scale: &ColorScale,
    geometry: &AnnotatedGeometry,
) -> Result<()> {
    let to_px = |ring: &LineString<f64>| -> Vec<(i32, i32)> {
        ring.coords().map(|c| projection.to_pixel(c.x, c.y)).collect()
    };

    // Largest first, so regions sitting inside another region's hole are painted last.
    let mut order: Vec<(f64, usize)> = geometry
        .iter()
        .enumerate()
        .map(|(i, (region, _))| (region.shape.unsigned_area(), i))
        .collect();
    order.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

    let regions: Vec<_> = geometry.iter().collect();
    for &(_, i) in &order {
        let (region, value) = regions[i];
        let fill = scale.color_for(value).filled();
        for polygon in region.shape.iter() {
            area.draw(&Polygon::new(to_px(polygon.exterior()), fill))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    let outline = outline_style();
    for (region, _) in geometry.iter() {
        for polygon in region.shape.iter() {
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                area.draw(&PathElement::new(to_px(ring), outline))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::build_palette;

    fn scale() -> ColorScale {
        ColorScale::nyc_default(build_palette().unwrap()).unwrap()
    }

    #[test]
    fn index_boundaries() {
        let s = scale();
        assert_eq!(s.index_for(0.0), Some(0));
        assert_eq!(s.index_for(-5.0), Some(0));
        assert_eq!(s.index_for(25_000_000.0), Some(511));
        assert_eq!(s.index_for(30_000_000.0), Some(511));
        // 12.5M is the exact middle of the domain
        assert_eq!(s.index_for(12_500_000.0), Some(256));
        assert_eq!(s.index_for(f64::NAN), None);
        let RGBColor(r, g, b) = s.color_for(f64::NAN);
        assert_eq!((r, g, b), (0xd9, 0xd9, 0xd9));
    }

    #[test]
    fn prices_format_with_separators() {
        assert_eq!(format_price(1_234_567.4), "$1,234,567");
        assert_eq!(format_price(0.0), "$0");
        assert_eq!(format_price(f64::NAN), "n/a");
    }

    #[test]
    fn outlines_are_faint_hairlines() {
        let style = outline_style();
        assert_eq!(style.stroke_width, 1);
        let RGBAColor(r, g, b, a) = style.color;
        assert_eq!((r, g, b), (0, 0, 0));
        assert!(a <= 0.25);
    }

    #[test]
    fn titles() {
        assert_eq!(year_title(2011), "NYC Property Sales in 2011");
    }
}
