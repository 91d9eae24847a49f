use nyc_sales_map::geometry::RegionGeometry;
use nyc_sales_map::palette::build_palette;
use nyc_sales_map::records::RecordTable;
use nyc_sales_map::series::YearSeries;
use nyc_sales_map::viz::{ColorScale, FigureLayout};
use nyc_sales_map::{MapError, YearRange};
use std::sync::Arc;

const TWO_SQUARES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"ZIPCODE": "10001"},
     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
    {"type": "Feature", "properties": {"ZIPCODE": "10002"},
     "geometry": {"type": "Polygon", "coordinates": [[[2,0],[3,0],[3,1],[2,1],[2,0]]]}}
  ]
}"#;

// Columns deliberately not in geometry order.
const RECORDS: &str = "\
BOROUGH,year,10002,10001
MANHATTAN,2005,,1000000
BROOKLYN,2005,750000,
MANHATTAN,2006,,1250000
BROOKLYN,2006,800000,
";

fn series() -> YearSeries {
    let table = RecordTable::from_reader(RECORDS.as_bytes()).unwrap();
    let base = Arc::new(RegionGeometry::from_geojson_str(TWO_SQUARES, "ZIPCODE").unwrap());
    YearSeries::build(&table, base, YearRange::new(2005, 2006)).unwrap()
}

fn geojson_values(text: &str) -> Vec<f64> {
    let json: serde_json::Value = serde_json::from_str(text).unwrap();
    json["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["properties"]["value"].as_f64().unwrap())
        .collect()
}

#[test]
fn two_regions_two_years() {
    let s = series();
    assert_eq!(s.len(), 2);

    let expected = [(2005, [1_000_000.0, 750_000.0]), (2006, [1_250_000.0, 800_000.0])];
    for (entry, (year, values)) in s.iter().zip(expected) {
        assert_eq!(entry.year, year);
        assert_eq!(entry.geometry.values(), &values);
        assert_eq!(geojson_values(&entry.geojson), values);
        assert_eq!(entry.geometry.report().defaulted(), 0);
    }
}

#[test]
fn lookups_are_keyed_by_year() {
    let s = series();
    assert_eq!(s.get(2006).unwrap().year, 2006);
    assert_eq!(
        s.get(2019).unwrap_err(),
        MapError::YearOutOfRange {
            year: 2019,
            start: 2005,
            end: 2006
        }
    );
    assert!(s.geojson(2004).is_err());
}

#[test]
fn every_year_gets_its_own_title() {
    let s = series();
    let scale = Arc::new(ColorScale::nyc_default(build_palette().unwrap()).unwrap());
    let figures = s.figures(&scale, FigureLayout::default());
    let titles: Vec<&str> = figures.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, ["NYC Property Sales in 2005", "NYC Property Sales in 2006"]);
}

#[test]
fn entries_must_cover_the_range() {
    let s = series();
    let entries: Vec<_> = s.iter().cloned().collect();

    let wider = YearSeries::from_entries(YearRange::new(2005, 2007), entries.clone());
    assert!(matches!(wider, Err(MapError::SeriesMismatch { .. })));

    let mut doubled = entries.clone();
    doubled.push(entries[0].clone());
    let dup = YearSeries::from_entries(YearRange::new(2005, 2006), doubled);
    assert!(matches!(dup, Err(MapError::SeriesMismatch { .. })));

    assert!(YearSeries::from_entries(YearRange::new(2005, 2006), entries).is_ok());
}

#[test]
fn loads_from_files_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("averages.csv");
    let shapes = dir.path().join("zips.geojson");
    std::fs::write(&csv, RECORDS).unwrap();
    std::fs::write(&shapes, TWO_SQUARES).unwrap();

    let cfg = nyc_sales_map::MapConfig {
        records: csv,
        shapes,
        years: YearRange::new(2005, 2006),
        ..Default::default()
    };
    let s = YearSeries::from_config(&cfg).unwrap();
    assert_eq!(s.get(2005).unwrap().geometry.values(), &[1_000_000.0, 750_000.0]);
}

#[test]
fn missing_files_name_the_path() {
    let cfg = nyc_sales_map::MapConfig {
        records: "does/not/exist.csv".into(),
        ..Default::default()
    };
    let err = YearSeries::from_config(&cfg).unwrap_err();
    assert!(format!("{err:#}").contains("does/not/exist.csv"));
}
