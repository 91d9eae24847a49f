//! Custom 512-color palette stitched together from five ramps.
//!
//! Low values get a short run of teal/purple hues (cool, spring), high values a
//! long red → white → green tail, which suits the skew of sale prices.

use crate::error::MapError;
use serde::{Deserialize, Serialize};

/// Named continuous color ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    Cool,
    Spring,
    Autumn,
    Bwr,
    Greens,
}

const fn rgb8(r: u8, g: u8, b: u8) -> [f64; 3] {
    [r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0]
}

// ColorBrewer sequential greens, evenly spaced.
const GREENS: [[f64; 3]; 9] = [
    rgb8(247, 252, 245),
    rgb8(229, 245, 224),
    rgb8(199, 233, 192),
    rgb8(161, 217, 155),
    rgb8(116, 196, 118),
    rgb8(65, 171, 93),
    rgb8(35, 139, 69),
    rgb8(0, 109, 44),
    rgb8(0, 68, 27),
];

impl Ramp {
    /// Color stops as (position, rgb) with positions ascending in [0, 1].
    fn stops(self) -> Vec<(f64, [f64; 3])> {
        match self {
            Ramp::Cool => vec![(0.0, [0.0, 1.0, 1.0]), (1.0, [1.0, 0.0, 1.0])],
            Ramp::Spring => vec![(0.0, [1.0, 0.0, 1.0]), (1.0, [1.0, 1.0, 0.0])],
            Ramp::Autumn => vec![(0.0, [1.0, 0.0, 0.0]), (1.0, [1.0, 1.0, 0.0])],
            Ramp::Bwr => vec![
                (0.0, [0.0, 0.0, 1.0]),
                (0.5, [1.0, 1.0, 1.0]),
                (1.0, [1.0, 0.0, 0.0]),
            ],
            Ramp::Greens => {
                let step = 1.0 / (GREENS.len() - 1) as f64;
                GREENS
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        let pos = if i == GREENS.len() - 1 {
                            1.0
                        } else {
                            i as f64 * step
                        };
                        (pos, *c)
                    })
                    .collect()
            }
        }
    }
}

/// A ramp resampled into a fixed-size lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledRamp {
    lut: Vec<[f64; 3]>,
}

impl SampledRamp {
    /// Build an `n`-entry table; entry `k` is the ramp value at `k / (n - 1)`.
    pub fn new(ramp: Ramp, n: usize, reversed: bool) -> Self {
        let mut stops = ramp.stops();
        if reversed {
            stops = stops
                .into_iter()
                .rev()
                .map(|(pos, c)| (1.0 - pos, c))
                .collect();
        }
        let xs = linspace(0.0, 1.0, n);
        let lut = xs.iter().map(|&x| interpolate(&stops, x)).collect();
        Self { lut }
    }

    pub fn len(&self) -> usize {
        self.lut.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lut.is_empty()
    }

    /// Color at fraction `x`, picked from the table (not re-interpolated).
    /// An empty table reads as black.
    pub fn at(&self, x: f64) -> [f64; 3] {
        let n = self.lut.len();
        let idx = (x.clamp(0.0, 1.0) * n as f64) as usize;
        self.lut
            .get(idx.min(n.saturating_sub(1)))
            .copied()
            .unwrap_or_default()
    }
}

/// `n` evenly spaced values from `start` to `stop`, both inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            out[n - 1] = stop;
            out
        }
    }
}

fn interpolate(stops: &[(f64, [f64; 3])], x: f64) -> [f64; 3] {
    let (first, last) = (stops[0], stops[stops.len() - 1]);
    if x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }
    // First stop at or past x; x lies in (stops[hi - 1], stops[hi]].
    let hi = stops.iter().position(|s| s.0 >= x).unwrap_or(stops.len() - 1);
    let (x0, c0) = stops[hi - 1];
    let (x1, c1) = stops[hi];
    let t = (x - x0) / (x1 - x0);
    [
        t * (c1[0] - c0[0]) + c0[0],
        t * (c1[1] - c0[1]) + c0[1],
        t * (c1[2] - c0[2]) + c0[2],
    ]
}

/// One slice of the stitched palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteSegment {
    pub ramp: Ramp,
    pub reversed: bool,
    pub samples: usize,
    pub from: f64,
    pub to: f64,
}

impl PaletteSegment {
    pub const fn new(ramp: Ramp, reversed: bool, samples: usize, from: f64, to: f64) -> Self {
        Self {
            ramp,
            reversed,
            samples,
            from,
            to,
        }
    }
}

/// The five segments, in palette order.
pub const NYC_SEGMENTS: [PaletteSegment; 5] = [
    PaletteSegment::new(Ramp::Cool, false, 32, 0.0, 1.0),
    PaletteSegment::new(Ramp::Spring, false, 32, 0.0, 1.0),
    PaletteSegment::new(Ramp::Autumn, true, 64, 0.0, 1.0),
    PaletteSegment::new(Ramp::Bwr, true, 192, 0.0, 0.5),
    PaletteSegment::new(Ramp::Greens, false, 192, 0.0, 1.0),
];

/// Ordered `#rrggbb` colors, shared read-only by every figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorPalette(Vec<String>);

impl ColorPalette {
    pub fn new(colors: Vec<String>) -> Self {
        Self(colors)
    }

    pub fn colors(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build a palette from segments: each ramp is resampled to `samples` entries
/// and read at `samples` evenly spaced fractions of `[from, to]`.
pub fn build_from_segments(segments: &[PaletteSegment]) -> Result<ColorPalette, MapError> {
    let mut colors = Vec::with_capacity(segments.iter().map(|s| s.samples).sum());
    for seg in segments {
        let sampled = SampledRamp::new(seg.ramp, seg.samples, seg.reversed);
        for x in linspace(seg.from, seg.to, seg.samples) {
            let [r, g, b] = sampled.at(x);
            colors.push(rgb_to_hex([channel_u8(r), channel_u8(g), channel_u8(b)])?);
        }
    }
    Ok(ColorPalette(colors))
}

/// The 512-entry NYC sales palette.
pub fn build_palette() -> Result<ColorPalette, MapError> {
    let palette = build_from_segments(&NYC_SEGMENTS)?;
    log::debug!("Built palette with {} colors", palette.len());
    Ok(palette)
}

/// Scale a channel fraction to 0..=255 by truncation. Out-of-range fractions
/// produce out-of-range integers, which `rgb_to_hex` rejects.
fn channel_u8(c: f64) -> i64 {
    (c * 255.0) as i64
}

/// Format integer channels as `#rrggbb`, rejecting anything outside 0..=255.
///
/// ```
/// use nyc_sales_map::palette::rgb_to_hex;
/// assert_eq!(rgb_to_hex([7, 102, 230]).unwrap(), "#0766e6");
/// ```
pub fn rgb_to_hex(rgb: [i64; 3]) -> Result<String, MapError> {
    for (channel, value) in ['r', 'g', 'b'].into_iter().zip(rgb) {
        if !(0..=255).contains(&value) {
            return Err(MapError::ChannelOutOfRange { channel, value });
        }
    }
    Ok(format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]))
}

/// Parse `#rrggbb` (case-insensitive) back into channels.
pub fn hex_to_rgb(hex: &str) -> Result<[u8; 3], MapError> {
    let invalid = || MapError::InvalidHexColor(hex.to_string());
    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}
