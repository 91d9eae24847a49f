use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;

const SHAPES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"ZIPCODE": "10001"},
     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
    {"type": "Feature", "properties": {"ZIPCODE": "10002"},
     "geometry": {"type": "Polygon", "coordinates": [[[1,0],[2,0],[2,1],[1,1],[1,0]]]}}
  ]
}"#;

const RECORDS: &str = "\
BOROUGH,year,10001,10002
MANHATTAN,2005,1000000,
BROOKLYN,2005,,750000
MANHATTAN,2006,1250000,
BROOKLYN,2006,,800000
";

fn write_fixtures(dir: &Path) -> (String, String) {
    let csv = dir.join("averages.csv");
    let shapes = dir.join("zips.geojson");
    std::fs::write(&csv, RECORDS).unwrap();
    std::fs::write(&shapes, SHAPES).unwrap();
    (
        csv.to_string_lossy().into_owned(),
        shapes.to_string_lossy().into_owned(),
    )
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("nycmap").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("nycmap"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn palette_prints_512_colors() {
    let mut cmd = Command::cargo_bin("nycmap").unwrap();
    cmd.arg("palette");
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("0 #00ffff\n"))
        .stdout(predicate::str::contains("511 #00441b"))
        .stdout(predicate::str::contains("512 ").not());
}

#[test]
fn render_writes_one_file_per_year() {
    let dir = tempfile::tempdir().unwrap();
    let (csv, shapes) = write_fixtures(dir.path());
    let out = dir.path().join("out");

    let mut cmd = Command::cargo_bin("nycmap").unwrap();
    cmd.args([
        "render",
        "--records",
        csv.as_str(),
        "--shapes",
        shapes.as_str(),
        "--years",
        "2005:2006",
        "--format",
        "svg",
        "--stats",
        "--out-dir",
    ])
    .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2005  regions=2 with_data=2"))
        .stderr(predicate::str::contains("NYC Property Sales in 2006"));

    for year in [2005, 2006] {
        let path = out.join(format!("nyc_sales_{year}.svg"));
        assert!(path.exists(), "{} missing", path.display());
    }
}

#[test]
fn render_rejects_year_outside_range() {
    let dir = tempfile::tempdir().unwrap();
    let (csv, shapes) = write_fixtures(dir.path());

    let mut cmd = Command::cargo_bin("nycmap").unwrap();
    cmd.args([
        "render",
        "--records",
        csv.as_str(),
        "--shapes",
        shapes.as_str(),
        "--years",
        "2005:2006",
        "--year",
        "2019",
        "--out-dir",
    ])
    .arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("outside the configured range"));
}

#[test]
fn summary_reads_a_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let (csv, shapes) = write_fixtures(dir.path());
    let cfg = dir.path().join("map.json");
    let json = serde_json::json!({
        "records": csv,
        "shapes": shapes,
        "years": {"start": 2006, "end": 2006}
    });
    std::fs::write(&cfg, json.to_string()).unwrap();

    let mut cmd = Command::cargo_bin("nycmap").unwrap();
    cmd.arg("summary").arg("--config").arg(&cfg);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2006  regions=2 with_data=2"))
        .stdout(predicate::str::contains("max=$1,250,000"));
}

#[test]
fn missing_inputs_fail_with_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("nycmap").unwrap();
    cmd.args(["summary", "--records"])
        .arg(dir.path().join("nope.csv"))
        .args(["--shapes", "nope.geojson"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("nope.csv"));
}

#[test]
fn extreme_config_years_fail_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("bad.json");
    std::fs::write(&cfg, r#"{"years":{"start":-2147483648,"end":2147483647}}"#).unwrap();

    let mut cmd = Command::cargo_bin("nycmap").unwrap();
    cmd.arg("summary").arg("--config").arg(&cfg);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("at most 500"))
        .stderr(predicate::str::contains("panicked").not());
}
