use std::fs;
use std::path::Path;

use hexmake::HexmakeError;

fn write_spec(root: &Path, json: &str) {
    fs::write(root.join("Hexmake"), json).unwrap();
}

#[test]
fn command_failure_stops_the_run_and_skips_publish() {
    let tmp = tempfile::tempdir().unwrap();
    write_spec(
        tmp.path(),
        r#"{
          "rules": [
            {"outputs": ["out/good"], "inputs": [], "commands": ["echo ok > out/good"]},
            {"outputs": ["out/bad"], "inputs": [], "commands": ["exit 7"]}
          ]
        }"#,
    );

    let ok = hexmake::build(
        tmp.path(),
        &["out/good".to_string(), "out/bad".to_string()],
        2,
    )
    .unwrap();

    assert!(!ok);
    assert!(!tmp.path().join("out/bad").exists());
}

#[test]
fn missing_declared_output_is_reported_without_publishing() {
    let tmp = tempfile::tempdir().unwrap();
    write_spec(
        tmp.path(),
        r#"{
          "rules": [
            {"outputs": ["out/missing"], "inputs": [], "commands": ["true"]}
          ]
        }"#,
    );

    let ok = hexmake::build(tmp.path(), &["out/missing".to_string()], 1).unwrap();
    assert!(!ok);
    assert!(!tmp.path().join("out/missing").exists());
}

#[test]
fn missing_source_input_is_rejected_before_any_command_runs() {
    let tmp = tempfile::tempdir().unwrap();
    write_spec(
        tmp.path(),
        r#"{
          "rules": [
            {"outputs": ["out/foo"], "inputs": ["does-not-exist.txt"],
             "commands": ["touch out/marker-that-should-never-appear", "cp does-not-exist.txt out/foo"]}
          ]
        }"#,
    );

    let ok = hexmake::build(tmp.path(), &["out/foo".to_string()], 1).unwrap();
    assert!(!ok);
    assert!(!tmp.path().join("out/marker-that-should-never-appear").exists());
}

#[test]
fn direct_cycle_is_rejected_before_any_work_runs() {
    let tmp = tempfile::tempdir().unwrap();
    write_spec(
        tmp.path(),
        r#"{
          "rules": [
            {"outputs": ["out/a"], "inputs": ["out/b"], "commands": ["cp out/b out/a"]},
            {"outputs": ["out/b"], "inputs": ["out/a"], "commands": ["cp out/a out/b"]}
          ]
        }"#,
    );

    let err = hexmake::build(tmp.path(), &["out/a".to_string()], 1).unwrap_err();
    assert!(matches!(err, HexmakeError::CycleDetected(_)));
    assert!(!tmp.path().join("out").exists());
}

#[test]
fn self_referential_rule_is_a_cycle() {
    let tmp = tempfile::tempdir().unwrap();
    write_spec(
        tmp.path(),
        r#"{
          "rules": [
            {"outputs": ["out/a"], "inputs": ["out/a"], "commands": ["cp out/a out/a"]}
          ]
        }"#,
    );

    let err = hexmake::build(tmp.path(), &["out/a".to_string()], 1).unwrap_err();
    assert!(matches!(err, HexmakeError::CycleDetected(_)));
}
