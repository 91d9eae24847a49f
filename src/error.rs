use thiserror::Error;

/// Typed failures of the map pipeline.
///
/// File-level problems (unreadable CSV, broken shapefile) are reported through
/// `anyhow` with context instead; this enum covers the conditions callers may
/// want to match on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("year {year} is outside the configured range {start}..={end}")]
    YearOutOfRange { year: i32, start: i32, end: i32 },

    #[error("color channel {channel} = {value} is outside 0..=255")]
    ChannelOutOfRange { channel: char, value: i64 },

    #[error("invalid hex color {0:?}, expected #rrggbb")]
    InvalidHexColor(String),

    #[error("record table has no `year` column")]
    MissingYearColumn,

    #[error("year {year} has {found} category rows, at most 5 are allowed")]
    TooManyCategoryRows { year: String, found: usize },

    #[error("region record {index} has no `{field}` field")]
    MissingRegionId { index: usize, field: String },

    #[error("year series does not match range {start}..={end}: {detail}")]
    SeriesMismatch { start: i32, end: i32, detail: String },
}
