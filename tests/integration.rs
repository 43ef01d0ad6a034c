use assert_cmd::cargo::cargo_bin_cmd;
use kml::types::Geometry;
use kml::{Kml, KmlReader};
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// samples/drive.nmea: 31 valid fixes, 6 below 0.5 kn, one 90 degree left turn
// flagged at fixes 14 and 20, moving from fix 4 to fix 28 over 120 seconds.
const DRIVE_FIXES: usize = 31;
const DRIVE_STOPS: usize = 6;
const DRIVE_TURNS: usize = 2;

fn samples_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples")
}

fn flatten_kml(kml: Vec<Kml>) -> Vec<Kml> {
    kml.into_iter()
        .flat_map(|k| match k {
            Kml::KmlDocument(d) => flatten_kml(d.elements),
            Kml::Document { attrs: _, elements } => flatten_kml(elements),
            Kml::Folder { attrs: _, elements } => flatten_kml(elements),
            k => vec![k],
        })
        .collect()
}

/// Returns (route coordinate count, stop markers, turn markers).
fn count_features(kml_bytes: &[u8]) -> (usize, usize, usize) {
    let kml = KmlReader::<_, f64>::from_reader(kml_bytes).read().unwrap();
    let (mut route, mut stops, mut turns) = (0, 0, 0);
    for k in flatten_kml(vec![kml]) {
        if let Kml::Placemark(p) = k {
            match (p.geometry, p.name.as_deref()) {
                (Some(Geometry::LineString(line)), _) => route += line.coords.len(),
                (Some(Geometry::Point(_)), Some(name)) if name.starts_with("Stop") => stops += 1,
                (Some(Geometry::Point(_)), Some(name)) if name.starts_with("Turn") => turns += 1,
                _ => {}
            }
        }
    }
    (route, stops, turns)
}

fn convert(file: &str, output_dir: &TempDir) -> Vec<u8> {
    let mut cmd = cargo_bin_cmd!("nmea2kml");
    cmd.arg("convert")
        .arg(file)
        .arg("--input-dir")
        .arg(samples_dir())
        .arg("--output-dir")
        .arg(output_dir.path())
        .assert()
        .success();

    let name = PathBuf::from(file).with_extension("kml");
    fs::read(output_dir.path().join(name)).unwrap()
}

#[test]
fn test_convert_writes_kml_and_prints_summary() {
    let out = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("nmea2kml");
    cmd.arg("convert")
        .arg("drive.nmea")
        .arg("--input-dir")
        .arg(samples_dir())
        .arg("--output-dir")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated:"))
        .stdout(predicate::str::contains("drive.kml"))
        .stdout(predicate::str::contains(format!("Fixes: {DRIVE_FIXES}")))
        .stdout(predicate::str::contains(format!("Stops: {DRIVE_STOPS}")))
        .stdout(predicate::str::contains(format!("Left turns: {DRIVE_TURNS}")))
        .stdout(predicate::str::contains("First moving fix: 4"))
        .stdout(predicate::str::contains("Last moving fix: 28"))
        .stdout(predicate::str::contains("Trip duration: 120 s (2.00 min)"));

    assert!(out.path().join("drive.kml").exists());
}

#[test]
fn test_convert_output_is_valid_kml() {
    let out = TempDir::new().unwrap();
    let kml = convert("drive.nmea", &out);

    assert_eq!(count_features(&kml), (DRIVE_FIXES, DRIVE_STOPS, DRIVE_TURNS));
}

#[test]
fn test_convert_marks_turns_at_expected_fixes() {
    let out = TempDir::new().unwrap();
    let kml = String::from_utf8(convert("drive.nmea", &out)).unwrap();

    assert!(kml.contains("<name>Turn 14</name>"));
    assert!(kml.contains("<name>Turn 20</name>"));
    assert!(kml.contains("<name>Stop 1</name>"));
    assert!(kml.contains("<name>Stop 31</name>"));
}

#[test]
fn test_convert_is_idempotent() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    assert_eq!(convert("drive.nmea", &first), convert("drive.nmea", &second));
}

#[test]
fn test_convert_creates_output_directory() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("nested").join("kml");

    let mut cmd = cargo_bin_cmd!("nmea2kml");
    cmd.arg("convert")
        .arg("drive.nmea")
        .arg("--input-dir")
        .arg(samples_dir())
        .arg("--output-dir")
        .arg(&nested)
        .assert()
        .success();

    assert!(nested.join("drive.kml").exists());
}

#[test]
fn test_convert_to_stdout() {
    let mut cmd = cargo_bin_cmd!("nmea2kml");
    let output = cmd
        .arg("convert")
        .arg("drive.nmea")
        .arg("--input-dir")
        .arg(samples_dir())
        .arg("--stdout")
        .assert()
        .success()
        .stderr(predicate::str::contains(format!("Fixes: {DRIVE_FIXES}")))
        .get_output()
        .stdout
        .clone();

    assert_eq!(count_features(&output), (DRIVE_FIXES, DRIVE_STOPS, DRIVE_TURNS));
}

#[test]
fn test_convert_empty_track() {
    let out = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("nmea2kml");
    cmd.arg("convert")
        .arg("empty.nmea")
        .arg("--input-dir")
        .arg(samples_dir())
        .arg("--output-dir")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixes: 0"))
        .stdout(predicate::str::contains("First moving fix: none"))
        .stdout(predicate::str::contains("Trip duration: 0 s"));

    let kml = fs::read_to_string(out.path().join("empty.kml")).unwrap();
    assert!(kml.contains("<LineString>"));
    assert!(!kml.contains("<Point>"));
}

#[test]
fn test_convert_missing_input_fails() {
    let out = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("nmea2kml");
    cmd.arg("convert")
        .arg("no_such_file.nmea")
        .arg("--input-dir")
        .arg(samples_dir())
        .arg("--output-dir")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("no_such_file.nmea"));

    assert!(!out.path().join("no_such_file.kml").exists());
}

#[test]
fn test_summary_does_not_write_kml() {
    let temp = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("nmea2kml");
    cmd.current_dir(temp.path())
        .arg("summary")
        .arg("drive.nmea")
        .arg("--input-dir")
        .arg(samples_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Fixes: {DRIVE_FIXES}")))
        .stdout(predicate::str::contains("Generated:").not());

    assert!(!temp.path().join("output").exists());
}

#[test]
fn test_summary_custom_thresholds() {
    let mut cmd = cargo_bin_cmd!("nmea2kml");
    cmd.arg("summary")
        .arg("drive.nmea")
        .arg("--input-dir")
        .arg(samples_dir())
        .arg("--stop-threshold")
        .arg("0.1")
        .arg("--turn-threshold")
        .arg("-100")
        .arg("--moving-threshold")
        .arg("10")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stops: 0"))
        .stdout(predicate::str::contains("Left turns: 0"))
        .stdout(predicate::str::contains("First moving fix: none"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let mut cmd = cargo_bin_cmd!("nmea2kml");
    cmd.env_remove("RUST_LOG")
        .arg("-vv")
        .arg("summary")
        .arg("drive.nmea")
        .arg("--input-dir")
        .arg(samples_dir())
        .assert()
        .success()
        .stderr(predicate::str::contains("loaded 31 fixes"))
        .stderr(predicate::str::contains("fix status \"V\""));
}
