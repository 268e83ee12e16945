use std::fs;
use std::path::Path;

fn write_spec(root: &Path, json: &str) {
    fs::write(root.join("Hexmake"), json).unwrap();
}

#[test]
fn two_level_c_build() {
    let tmp = tempfile::tempdir().unwrap();
    write_spec(
        tmp.path(),
        r#"{
          "rules": [
            {"outputs": ["out/foo.o"], "inputs": ["foo.c"], "commands": ["cp foo.c out/foo.o"]},
            {"outputs": ["out/foo"], "inputs": ["out/foo.o"], "commands": ["cp out/foo.o out/foo"]}
          ]
        }"#,
    );
    fs::write(tmp.path().join("foo.c"), b"int main(){}").unwrap();

    let ok = hexmake::build(tmp.path(), &["out/foo".to_string()], 2).unwrap();
    assert!(ok);
    assert!(tmp.path().join("out/foo.o").exists());
    assert!(tmp.path().join("out/foo").exists());
}

#[test]
fn shared_dependency_builds_both_consumers() {
    let tmp = tempfile::tempdir().unwrap();
    write_spec(
        tmp.path(),
        r#"{
          "rules": [
            {"outputs": ["out/lib.o"], "inputs": ["lib.c"], "commands": ["cp lib.c out/lib.o"]},
            {"outputs": ["out/foo"], "inputs": ["out/lib.o"], "commands": ["cp out/lib.o out/foo"]},
            {"outputs": ["out/bar"], "inputs": ["out/lib.o"], "commands": ["cp out/lib.o out/bar"]}
          ]
        }"#,
    );
    fs::write(tmp.path().join("lib.c"), b"int lib(){}").unwrap();

    let ok = hexmake::build(
        tmp.path(),
        &["out/foo".to_string(), "out/bar".to_string()],
        4,
    )
    .unwrap();
    assert!(ok);
    assert!(tmp.path().join("out/foo").exists());
    assert!(tmp.path().join("out/bar").exists());
}

#[test]
fn multi_output_rule_feeds_a_downstream_build() {
    let tmp = tempfile::tempdir().unwrap();
    write_spec(
        tmp.path(),
        r#"{
          "rules": [
            {"outputs": ["out/foo.c", "out/bar.c"], "inputs": ["gensources"],
             "commands": ["touch out/foo.c out/bar.c"]},
            {"outputs": ["out/foo"], "inputs": ["out/foo.c"], "commands": ["cp out/foo.c out/foo"]}
          ]
        }"#,
    );
    fs::write(tmp.path().join("gensources"), b"#!/bin/sh\n").unwrap();

    let ok = hexmake::build(tmp.path(), &["out/foo".to_string()], 2).unwrap();
    assert!(ok);
    assert!(tmp.path().join("out/foo").exists());
}

#[test]
fn duplicate_target_request_builds_once() {
    let tmp = tempfile::tempdir().unwrap();
    write_spec(
        tmp.path(),
        r#"{
          "rules": [
            {"outputs": ["out/foo"], "inputs": [], "commands": ["echo hi > out/foo"]}
          ]
        }"#,
    );

    let ok = hexmake::build(
        tmp.path(),
        &["out/foo".to_string(), "out/foo".to_string()],
        2,
    )
    .unwrap();
    assert!(ok);
    assert!(tmp.path().join("out/foo").exists());
}

#[test]
fn directory_input_is_staged_and_built_from() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("data/nested")).unwrap();
    fs::write(tmp.path().join("data/a.txt"), b"a").unwrap();
    fs::write(tmp.path().join("data/nested/b.txt"), b"b").unwrap();
    write_spec(
        tmp.path(),
        r#"{
          "rules": [
            {"outputs": ["out/bundle.txt"], "inputs": ["data"],
             "commands": ["cat data/a.txt data/nested/b.txt > out/bundle.txt"]}
          ]
        }"#,
    );

    let ok = hexmake::build(tmp.path(), &["out/bundle.txt".to_string()], 1).unwrap();
    assert!(ok);
    assert_eq!(
        fs::read_to_string(tmp.path().join("out/bundle.txt")).unwrap(),
        "ab"
    );
}
