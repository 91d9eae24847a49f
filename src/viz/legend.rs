//! Horizontal color bar drawn in the legend band below the map.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::ColorScale;

/// Color bar geometry in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBar {
    pub width: u32,
    pub height: u32,
    /// Gap between the bar and its tick labels.
    pub label_standoff: u32,
    pub font_px: u32,
}

impl Default for ColorBar {
    fn default() -> Self {
        Self {
            width: 500,
            height: 20,
            label_standoff: 8,
            font_px: 13,
        }
    }
}

impl ColorBar {
    /// Left edge of the bar when centered in a band `band_w` wide.
    pub fn left(&self, band_w: u32) -> i32 {
        (band_w.saturating_sub(self.width) / 2) as i32
    }

    /// Horizontal pixel offset of `value` from the bar's left edge.
    pub fn offset_of(&self, scale: &ColorScale, value: f64) -> i32 {
        let t = ((value - scale.low()) / (scale.high() - scale.low())).clamp(0.0, 1.0);
        (t * self.width as f64).round() as i32
    }
}

/// Draw the bar (one column per pixel, colored through the scale) plus tick
/// marks and labels.
pub fn draw_color_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    scale: &ColorScale,
    bar: &ColorBar,
) -> Result<()> {
    let (band_w, _) = area.dim_in_pixel();
    let x0 = bar.left(band_w);
    let y0 = 10;
    let y1 = y0 + bar.height as i32;

    let span = scale.high() - scale.low();
    for i in 0..bar.width as i32 {
        let v = scale.low() + span * (i as f64 + 0.5) / bar.width as f64;
        area.draw(&Rectangle::new(
            [(x0 + i, y0), (x0 + i + 1, y1)],
            scale.color_for(v).filled(),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    }

    let label_style: TextStyle =
        TextStyle::from((FontFamily::SansSerif, bar.font_px)).pos(Pos::new(HPos::Center, VPos::Top));
    for (value, label) in scale.ticks() {
        let x = x0 + bar.offset_of(scale, *value);
        area.draw(&PathElement::new(vec![(x, y1), (x, y1 + 4)], BLACK))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        area.draw(&Text::new(
            label.as_str(),
            (x, y1 + bar.label_standoff as i32),
            label_style.clone(),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::build_palette;

    #[test]
    fn ticks_span_the_bar() {
        let scale = ColorScale::nyc_default(build_palette().unwrap()).unwrap();
        let bar = ColorBar::default();
        assert_eq!(bar.offset_of(&scale, 0.0), 0);
        assert_eq!(bar.offset_of(&scale, 12_500_000.0), 250);
        assert_eq!(bar.offset_of(&scale, 25_000_000.0), 500);
        assert_eq!(bar.offset_of(&scale, 99_000_000.0), 500);
        assert_eq!(bar.left(600), 50);
    }
}
