use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five mutually exclusive category buckets a region belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Borough {
    Brooklyn,
    Bronx,
    Queens,
    Manhattan,
    StatenIsland,
}

impl Borough {
    /// Fixed scan order. Positional category columns are assigned in this order.
    pub const ALL: [Borough; 5] = [
        Borough::Brooklyn,
        Borough::Bronx,
        Borough::Queens,
        Borough::Manhattan,
        Borough::StatenIsland,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Borough::Brooklyn => "BROOKLYN",
            Borough::Bronx => "BRONX",
            Borough::Queens => "QUEENS",
            Borough::Manhattan => "MANHATTAN",
            Borough::StatenIsland => "STATEN ISLAND",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Case-insensitive match on the borough name ("staten island", "Bronx", ...).
    pub fn from_label(label: &str) -> Option<Borough> {
        let wanted = label.trim();
        Borough::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Borough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalize a label so that values written by different tools compare equal.
///
/// Trims whitespace and renders integral numbers without a fraction, so
/// `" 10001.0"` and `"10001"` both become `"10001"`. Anything else is kept as is.
pub fn normalize_label(raw: &str) -> String {
    let s = raw.trim();
    if let Ok(v) = s.parse::<f64>()
        && v.is_finite()
        && v.fract() == 0.0
        && v.abs() < 1e15
        && s.contains('.')
    {
        return format!("{}", v as i64);
    }
    s.to_string()
}

/// Region (zipcode) identifier, compared by normalized value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(raw: &str) -> Self {
        RegionId(normalize_label(raw))
    }

    /// Build an id from a JSON attribute value (string or number).
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(RegionId::new(s)),
            serde_json::Value::Number(n) => Some(RegionId::new(&n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(s: &str) -> Self {
        RegionId::new(s)
    }
}

/// Inclusive year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub const NYC_SALES: YearRange = YearRange {
        start: 2005,
        end: 2019,
    };

    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (i64::from(self.end) - i64::from(self.start) + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn years(self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    /// Year labels as they appear in the record table.
    pub fn labels(&self) -> Vec<String> {
        self.years().map(|y| y.to_string()).collect()
    }
}

impl Default for YearRange {
    fn default() -> Self {
        YearRange::NYC_SALES
    }
}
