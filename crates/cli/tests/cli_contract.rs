use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

fn capture(x: f64, y: f64) -> Value {
    json!({ "type": "capture_point", "x": x, "y": y })
}

/// Measure before calibrating, calibrate, repeat the rejected click, then measure an area.
fn survey_events() -> Vec<Value> {
    vec![
        json!({ "type": "select_tool", "tool": "distance" }),
        capture(0.0, 0.0),
        capture(3.0, 4.0),
        json!({ "type": "start_calibration" }),
        capture(0.0, 0.0),
        capture(3.0, 4.0),
        json!({ "type": "calibration_distance_text", "text": "10" }),
        json!({ "type": "confirm_calibration" }),
        capture(3.0, 4.0),
        json!({ "type": "select_tool", "tool": "area" }),
        capture(100.0, 100.0),
        capture(130.0, 100.0),
        capture(130.0, 120.0),
        capture(100.0, 120.0),
        capture(102.0, 101.0),
        json!({ "type": "set_label", "index": 1, "label": "Lot" }),
        json!({ "type": "delete_measurement", "index": 7 }),
    ]
}

fn write_script(dir: &Path, script: &Value) -> PathBuf {
    let path = dir.join("script.json");
    std::fs::write(&path, serde_json::to_vec_pretty(script).expect("script should serialize"))
        .expect("script should be written");
    path
}

fn replay_output(args: &[&std::ffi::OsStr]) -> Value {
    let output = cargo_bin_cmd!("scalemark")
        .arg("replay")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    serde_json::from_slice(&output).expect("stdout should contain valid json")
}

#[test]
fn replay_emits_stable_report() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_script(
        temp.path(),
        &json!({
            "image": { "width": 800, "height": 600 },
            "events": survey_events(),
        }),
    );

    let report = replay_output(&[script.as_os_str()]);

    assert_eq!(report["scale_factor"], json!(2.0));
    assert_eq!(report["measurements"][0]["value"], json!(10.0));
    assert_eq!(report["measurements"][1]["value"], json!(2400.0));
    assert_eq!(report["measurements"][1]["points"].as_array().map(Vec::len), Some(4));
    assert_eq!(report["layouts"].as_array().map(Vec::len), Some(2));

    // Ids are random; snapshot only the stable display contract.
    let summary = json!({
        "display_values": report["measurements"]
            .as_array()
            .expect("measurements should be an array")
            .iter()
            .map(|m| m["display_value"].clone())
            .collect::<Vec<_>>(),
        "errors": report["errors"],
        "kinds": report["measurements"]
            .as_array()
            .expect("measurements should be an array")
            .iter()
            .map(|m| m["kind"].clone())
            .collect::<Vec<_>>(),
        "labels": report["layouts"]
            .as_array()
            .expect("layouts should be an array")
            .iter()
            .map(|l| l["label_text"].clone())
            .collect::<Vec<_>>(),
        "scale_summary": report["scale_summary"],
    });

    insta::assert_json_snapshot!("replay_survey_report", summary);
}

#[test]
fn replay_reads_image_size_from_file() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let image_path = temp.path().join("plan.png");
    image::RgbImage::new(64, 48).save(&image_path).expect("png should be written");
    let script = write_script(temp.path(), &json!({ "events": [] }));

    let report = replay_output(&[script.as_os_str(), "--image".as_ref(), image_path.as_os_str()]);

    assert_eq!(report["image"], json!({ "width": 64, "height": 48 }));
    assert_eq!(report["scale_factor"], Value::Null);
    assert_eq!(report["measurements"], json!([]));
}

#[test]
fn replay_applies_config_file() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let config_path = temp.path().join("config.json");
    std::fs::write(&config_path, r#"{ "unit": "m", "initial_zoom": 2.0 }"#)
        .expect("config should be written");
    let script = write_script(
        temp.path(),
        &json!({
            "image": { "width": 100, "height": 100 },
            "events": [
                { "type": "start_calibration" },
                capture(0.0, 0.0),
                capture(20.0, 0.0),
                { "type": "calibration_distance_text", "text": "5" },
                { "type": "confirm_calibration" },
            ],
        }),
    );

    let report =
        replay_output(&[script.as_os_str(), "--config".as_ref(), config_path.as_os_str()]);

    assert_eq!(report["view"]["zoom"], json!(2.0));
    assert_eq!(report["scale_factor"], json!(0.5));
    assert_eq!(report["scale_summary"], json!("1 px = 0.5000 m"));
}

#[test]
fn replay_fails_for_missing_script() {
    cargo_bin_cmd!("scalemark")
        .arg("replay")
        .arg("does-not-exist.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn replay_fails_for_invalid_script() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let path = temp.path().join("script.json");
    std::fs::write(&path, r#"{ "events": [ { "type": "teleport" } ] }"#)
        .expect("script should be written");

    cargo_bin_cmd!("scalemark")
        .arg("replay")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid replay script"));
}

#[test]
fn replay_requires_image_size() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_script(temp.path(), &json!({ "events": [] }));

    cargo_bin_cmd!("scalemark")
        .arg("replay")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no image size"));
}

#[test]
fn version_prints_package_version() {
    cargo_bin_cmd!("scalemark")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
