use nyc_sales_map::geometry::RegionGeometry;
use nyc_sales_map::join::{AnnotatedGeometry, annotate};
use nyc_sales_map::palette::build_palette;
use nyc_sales_map::records::RecordTable;
use nyc_sales_map::viz::{self, ColorScale, Figure, FigureLayout};
use std::fs;
use std::sync::Arc;

// An outer square with a hole, and a smaller square sitting in the hole.
const NESTED: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"ZIPCODE": "11201"},
     "geometry": {"type": "Polygon", "coordinates": [
        [[0,0],[10,0],[10,10],[0,10],[0,0]],
        [[4,4],[6,4],[6,6],[4,6],[4,4]]]}},
    {"type": "Feature", "properties": {"ZIPCODE": "11202"},
     "geometry": {"type": "Polygon", "coordinates": [[[4,4],[6,4],[6,6],[4,6],[4,4]]]}},
    {"type": "Feature", "properties": {"ZIPCODE": "10001"},
     "geometry": {"type": "MultiPolygon", "coordinates": [
        [[[12,0],[14,0],[14,2],[12,2],[12,0]]],
        [[[12,4],[14,4],[14,6],[12,6],[12,4]]]]}}
  ]
}"#;

const RECORDS: &str = "\
BOROUGH,year,11201,11202,10001
BROOKLYN,2010,2500000,30000000,
MANHATTAN,2010,,,NaN
";

fn annotated() -> AnnotatedGeometry {
    let table = RecordTable::from_reader(RECORDS.as_bytes()).unwrap();
    let base = Arc::new(RegionGeometry::from_geojson_str(NESTED, "ZIPCODE").unwrap());
    annotate(&table.slice_year("2010").unwrap(), &base)
}

fn figure(layout: FigureLayout) -> Figure {
    let scale = Arc::new(ColorScale::nyc_default(build_palette().unwrap()).unwrap());
    Figure::for_year(2010, scale).with_layout(layout)
}

#[test]
fn svg_and_png_files_are_written() {
    let geometry = annotated();
    let fig = figure(FigureLayout::default());
    let dir = tempfile::tempdir().unwrap();
    for name in ["map.svg", "map.png"] {
        let path = dir.path().join(name);
        viz::render_to_path(&fig, &geometry, &path).unwrap();
        let meta = fs::metadata(&path).expect("file created");
        assert!(meta.len() > 0, "{name} has content");
    }
}

#[test]
fn svg_string_contains_title_and_ticks() {
    let geometry = annotated();
    let svg = viz::render_to_svg_string(&figure(FigureLayout::default()), &geometry).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("NYC Property Sales in 2010"));
    for tick in ["$0", "$5M", "$25M"] {
        assert!(svg.contains(tick), "missing tick {tick}");
    }
}

#[test]
fn rgb_buffer_matches_layout() {
    let geometry = annotated();
    let layout = FigureLayout::with_map_size(300, 240);
    let fig = figure(layout);
    let buf = viz::render_to_rgb(&fig, &geometry).unwrap();
    assert_eq!(
        buf.len(),
        layout.width() as usize * layout.height() as usize * 3
    );
    // white background in the top-left corner of the title band
    assert_eq!(&buf[..3], &[255, 255, 255]);
}

#[test]
fn enclosed_region_keeps_its_own_color() {
    let geometry = annotated();
    let layout = FigureLayout::default();
    let fig = figure(layout);
    let buf = viz::render_to_rgb(&fig, &geometry).unwrap();

    let projection = fig.projection(&geometry).unwrap();
    let (ox, oy) = layout.map_origin();
    let pixel = |x: f64, y: f64| {
        let (px, py) = projection.to_pixel(x, y);
        let i = ((py + oy) as usize * layout.width() as usize + (px + ox) as usize) * 3;
        [buf[i], buf[i + 1], buf[i + 2]]
    };
    let scale = &fig.scale;
    let rgb = |v: f64| {
        let c = scale.color_for(v);
        [c.0, c.1, c.2]
    };
    assert_eq!(pixel(2.0, 2.0), rgb(2_500_000.0));
    assert_eq!(pixel(5.0, 5.0), rgb(30_000_000.0));
}

#[test]
fn empty_geometry_cannot_be_drawn() {
    let table = RecordTable::from_reader(RECORDS.as_bytes()).unwrap();
    let base = Arc::new(RegionGeometry::default());
    let geometry = annotate(&table.slice_year("2010").unwrap(), &base);
    assert!(viz::render_to_svg_string(&figure(FigureLayout::default()), &geometry).is_err());
}
