use nyc_sales_map::geometry::RegionGeometry;
use nyc_sales_map::records::RecordTable;
use nyc_sales_map::series::YearSeries;
use nyc_sales_map::stats::year_summaries;
use nyc_sales_map::YearRange;
use std::sync::Arc;

const THREE_SQUARES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"ZIPCODE": "10001"},
     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
    {"type": "Feature", "properties": {"ZIPCODE": "10002"},
     "geometry": {"type": "Polygon", "coordinates": [[[2,0],[3,0],[3,1],[2,1],[2,0]]]}},
    {"type": "Feature", "properties": {"ZIPCODE": "10003"},
     "geometry": {"type": "Polygon", "coordinates": [[[4,0],[5,0],[5,1],[4,1],[4,0]]]}}
  ]
}"#;

#[test]
fn summaries_ignore_defaulted_regions() {
    // 2005: 10001 and 10002 have data, 10003 is absent from the table.
    // 2006: only 10001 has data, 10002 holds two values.
    let csv = "\
BOROUGH,year,10001,10002
MANHATTAN,2005,100,300
MANHATTAN,2006,200,
BROOKLYN,2006,,50
QUEENS,2006,,70
";
    let table = RecordTable::from_reader(csv.as_bytes()).unwrap();
    let base = Arc::new(RegionGeometry::from_geojson_str(THREE_SQUARES, "ZIPCODE").unwrap());
    let series = YearSeries::build(&table, base, YearRange::new(2005, 2006)).unwrap();

    let got = year_summaries(&series);
    assert_eq!(got.len(), 2);

    let a = &got[0];
    assert_eq!(a.year, 2005);
    assert_eq!(a.regions, 3);
    assert_eq!(a.with_data, 2);
    assert_eq!(a.defaulted, 1);
    assert_eq!(a.min, Some(100.0));
    assert_eq!(a.max, Some(300.0));
    assert_eq!(a.mean, Some(200.0));
    assert_eq!(a.median, Some(200.0));

    let b = &got[1];
    assert_eq!(b.year, 2006);
    assert_eq!(b.with_data, 2);
    assert_eq!(b.conflicts, 1);
    // 10002 resolves to the later category (QUEENS after BROOKLYN)
    assert_eq!(b.max, Some(200.0));
    assert_eq!(b.min, Some(70.0));
    assert_eq!(b.median, Some(135.0));
}

#[test]
fn year_without_rows_has_no_statistics() {
    let csv = "BOROUGH,year,10001\nMANHATTAN,2005,100\n";
    let table = RecordTable::from_reader(csv.as_bytes()).unwrap();
    let base = Arc::new(RegionGeometry::from_geojson_str(THREE_SQUARES, "ZIPCODE").unwrap());
    let series = YearSeries::build(&table, base, YearRange::new(2005, 2006)).unwrap();

    let got = year_summaries(&series);
    let empty = &got[1];
    assert_eq!(empty.with_data, 0);
    assert_eq!(empty.defaulted, 3);
    assert_eq!(empty.min, None);
    assert_eq!(empty.median, None);
}
