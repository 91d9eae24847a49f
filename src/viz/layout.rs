//! Figure layout and the data → pixel projection shared by rendering and hit-testing.

use geo::Rect;

/// Pixel layout of a figure: title band, map area, legend band, stacked vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureLayout {
    pub map_width: u32,
    pub map_height: u32,
    pub title_band: u32,
    pub legend_band: u32,
    /// Inner padding around the map drawing.
    pub margin: u32,
}

impl Default for FigureLayout {
    fn default() -> Self {
        Self::with_map_size(600, 600)
    }
}

impl FigureLayout {
    pub fn with_map_size(map_width: u32, map_height: u32) -> Self {
        Self {
            map_width,
            map_height,
            title_band: 40,
            legend_band: 70,
            margin: 10,
        }
    }

    pub fn width(&self) -> u32 {
        self.map_width
    }

    pub fn height(&self) -> u32 {
        self.title_band + self.map_height + self.legend_band
    }

    /// Top-left corner of the map area in figure pixels.
    pub fn map_origin(&self) -> (i32, i32) {
        (0, self.title_band as i32)
    }
}

/// Uniform scale fit of a data rectangle into the map area, y axis flipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    scale: f64,
    data_min_x: f64,
    data_max_y: f64,
    offset_x: f64,
    offset_y: f64,
}

impl MapProjection {
    /// Fit `bounds` into `width` × `height` pixels, keeping aspect ratio and
    /// centering the slack axis.
    pub fn fit(bounds: Rect<f64>, width: u32, height: u32, margin: u32) -> Self {
        let inner_w = (width.saturating_sub(2 * margin)).max(1) as f64;
        let inner_h = (height.saturating_sub(2 * margin)).max(1) as f64;
        let dx = bounds.width();
        let dy = bounds.height();
        let scale = match (dx > 0.0, dy > 0.0) {
            (true, true) => (inner_w / dx).min(inner_h / dy),
            (true, false) => inner_w / dx,
            (false, true) => inner_h / dy,
            (false, false) => 1.0,
        };
        let offset_x = margin as f64 + (inner_w - dx * scale) / 2.0;
        let offset_y = margin as f64 + (inner_h - dy * scale) / 2.0;
        Self {
            scale,
            data_min_x: bounds.min().x,
            data_max_y: bounds.max().y,
            offset_x,
            offset_y,
        }
    }

    /// Projection for a figure's map area.
    pub fn for_layout(bounds: Rect<f64>, layout: &FigureLayout) -> Self {
        Self::fit(bounds, layout.map_width, layout.map_height, layout.margin)
    }

    pub fn to_pixel(&self, x: f64, y: f64) -> (i32, i32) {
        let px = self.offset_x + (x - self.data_min_x) * self.scale;
        let py = self.offset_y + (self.data_max_y - y) * self.scale;
        (px.round() as i32, py.round() as i32)
    }

    pub fn to_data(&self, px: f64, py: f64) -> (f64, f64) {
        (
            self.data_min_x + (px - self.offset_x) / self.scale,
            self.data_max_y - (py - self.offset_y) / self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    #[test]
    fn wide_bounds_are_centered_vertically() {
        let bounds = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 200.0, y: 100.0 });
        let p = MapProjection::fit(bounds, 220, 220, 10);
        assert_eq!(p.to_pixel(0.0, 100.0), (10, 60));
        assert_eq!(p.to_pixel(200.0, 0.0), (210, 160));
    }

    #[test]
    fn pixel_round_trip() {
        let bounds = Rect::new(
            Coord { x: 913_000.0, y: 120_000.0 },
            Coord { x: 1_067_000.0, y: 273_000.0 },
        );
        let p = MapProjection::fit(bounds, 600, 600, 10);
        let (x, y) = p.to_data(300.0, 300.0);
        let (px, py) = p.to_pixel(x, y);
        assert_eq!((px, py), (300, 300));
    }

    #[test]
    fn layout_height_stacks_bands() {
        let l = FigureLayout::default();
        assert_eq!(l.height(), 40 + 600 + 70);
        assert_eq!(l.map_origin(), (0, 40));
    }
}
