//! Wide yearly record table and the per-year slicer.
//!
//! The CSV holds one row per (category, year) and one column per region:
//!
//! ```text
//! BOROUGH,year,10001,10002,11214,...
//! MANHATTAN,2005,1200000,,,...
//! BROOKLYN,2005,,,400000,...
//! ```
//!
//! Slicing a year keeps that year's rows and transposes them so regions become
//! rows and categories become columns.

use crate::error::MapError;
use crate::models::{Borough, RegionId, normalize_label};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

/// Number of leading header-origin columns (index label + year) dropped after transposition.
const HEADER_ORIGIN_COLUMNS: usize = 2;

/// Raw record table as read from CSV; cells stay strings until sliced.
#[derive(Debug, Clone)]
pub struct RecordTable {
    headers: Vec<String>,
    year_column: usize,
    rows: Vec<Vec<String>>,
}

/// One region of a year slice: the five category cells in `Borough::ALL` order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub region: RegionId,
    pub categories: [Option<f64>; 5],
}

/// Regions × categories for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSlice {
    pub year: String,
    pub rows: Vec<RegionRecord>,
    /// Cells that held text which is neither empty nor a number.
    pub unparsable_cells: usize,
}

impl YearSlice {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl RecordTable {
    /// Build a table from headers and rows. Rows must match the header width.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let year_column = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("year"))
            .ok_or(MapError::MissingYearColumn)?;
        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                anyhow::bail!(
                    "row {} has {} cells, header has {}",
                    i + 1,
                    row.len(),
                    headers.len()
                );
            }
        }
        Ok(Self {
            headers,
            year_column,
            rows,
        })
    }

    /// Parse CSV text with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers: Vec<String> = rdr
            .headers()
            .context("reading CSV header")?
            .iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for (i, rec) in rdr.records().enumerate() {
            let rec = rec.with_context(|| format!("reading CSV row {}", i + 1))?;
            rows.push(rec.iter().map(str::to_string).collect());
        }
        Self::from_rows(headers, rows)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening record table {}", path.display()))?;
        let table = Self::from_reader(file)
            .with_context(|| format!("parsing record table {}", path.display()))?;
        log::info!(
            "Loaded {} record rows x {} region columns from {}",
            table.rows.len(),
            table.region_columns().count(),
            path.display()
        );
        Ok(table)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn region_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (HEADER_ORIGIN_COLUMNS..self.headers.len()).filter(move |&c| c != self.year_column)
    }

    /// Extract one year: rows tagged `year`, transposed to regions × categories.
    ///
    /// A year with no rows gives an empty slice, not an error.
    pub fn slice_year(&self, year: &str) -> Result<YearSlice, MapError> {
        let wanted = normalize_label(year);
        let year_rows: Vec<&Vec<String>> = self
            .rows
            .iter()
            .filter(|r| normalize_label(&r[self.year_column]) == wanted)
            .collect();

        if year_rows.is_empty() {
            log::warn!("Year {wanted} has no rows in the record table; slice is empty");
            return Ok(YearSlice {
                year: wanted,
                rows: Vec::new(),
                unparsable_cells: 0,
            });
        }
        if year_rows.len() > Borough::ALL.len() {
            return Err(MapError::TooManyCategoryRows {
                year: wanted,
                found: year_rows.len(),
            });
        }

        let categories = self.assign_categories(&year_rows);

        let mut unparsable_cells = 0;
        let mut rows = Vec::new();
        for col in self.region_columns() {
            let mut cells = [None; 5];
            for (row, borough) in year_rows.iter().zip(&categories) {
                match parse_cell(&row[col]) {
                    Cell::Value(v) => cells[borough.index()] = Some(v),
                    Cell::Missing => {}
                    Cell::Unparsable => {
                        unparsable_cells += 1;
                        log::debug!(
                            "Year {wanted}, region {}: unparsable cell {:?} treated as missing",
                            self.headers[col],
                            row[col]
                        );
                    }
                }
            }
            rows.push(RegionRecord {
                region: RegionId::new(&self.headers[col]),
                categories: cells,
            });
        }

        if unparsable_cells > 0 {
            log::warn!("Year {wanted}: {unparsable_cells} unparsable cells treated as missing");
        }

        Ok(YearSlice {
            year: wanted,
            rows,
            unparsable_cells,
        })
    }

    /// Name-based assignment when every row's first cell is a borough, else positional.
    fn assign_categories(&self, year_rows: &[&Vec<String>]) -> Vec<Borough> {
        let label_column = if self.year_column == 0 { 1 } else { 0 };
        let named: Option<Vec<Borough>> = year_rows
            .iter()
            .map(|r| r.get(label_column).and_then(|l| Borough::from_label(l)))
            .collect();
        match named {
            Some(b) => b,
            None => Borough::ALL[..year_rows.len()].to_vec(),
        }
    }
}

/// Slice every requested year, preserving the requested order.
pub fn slice_years(table: &RecordTable, years: &[String]) -> Result<Vec<YearSlice>, MapError> {
    years.iter().map(|y| table.slice_year(y)).collect()
}

enum Cell {
    Value(f64),
    Missing,
    Unparsable,
}

fn parse_cell(raw: &str) -> Cell {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("null") {
        return Cell::Missing;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_nan() => Cell::Missing,
        Ok(v) => Cell::Value(v),
        Err(_) => Cell::Unparsable,
    }
}
