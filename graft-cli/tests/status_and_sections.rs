use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

use graft_core::SignatureKind;

fn graft_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("graft"))
}

fn write_signed(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, SignatureKind::Full.sign(body).unwrap()).unwrap();
    path
}

#[test]
fn status_json_reports_state_per_file() {
    let dir = TempDir::new().unwrap();
    write_signed(dir.path(), "good.txt", "fine\n");
    let bad = write_signed(dir.path(), "bad.txt", "fine\n");
    let mut tampered = fs::read_to_string(&bad).unwrap();
    tampered.push_str("oops\n");
    fs::write(&bad, tampered).unwrap();
    fs::write(dir.path().join("plain.txt"), "no seal\n").unwrap();

    let assert = graft_cmd()
        .arg("status")
        .arg(dir.path())
        .arg("--json")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");

    assert_eq!(parsed["summary"]["files"], 3);
    assert_eq!(parsed["summary"]["signed"], 2);
    assert_eq!(parsed["summary"]["failing"], 1);

    let files = parsed["files"].as_array().expect("files array");
    let state_of = |name: &str| {
        files
            .iter()
            .find(|f| f["path"].as_str().unwrap().ends_with(name))
            .unwrap_or_else(|| panic!("missing row for {name}"))["state"]
            .as_str()
            .unwrap()
            .to_string()
    };
    assert_eq!(state_of("good.txt"), "ok");
    assert_eq!(state_of("bad.txt"), "modified");
    assert_eq!(state_of("plain.txt"), "unsigned");
}

#[test]
fn status_table_never_fails_the_process() {
    let dir = TempDir::new().unwrap();
    let bad = write_signed(dir.path(), "bad.txt", "fine\n");
    let mut tampered = fs::read_to_string(&bad).unwrap();
    tampered.push_str("oops\n");
    fs::write(&bad, tampered).unwrap();

    graft_cmd()
        .arg("status")
        .arg(&bad)
        .assert()
        .success()
        .stdout(contains("MODIFIED"));
}

#[test]
fn status_reports_partial_kind() {
    let dir = TempDir::new().unwrap();
    let text = "gen\n# graft-manual: k\nbody\n# graft-manual-end\n";
    let path = dir.path().join("partial.txt");
    fs::write(&path, SignatureKind::Partial.sign(text).unwrap()).unwrap();

    let assert = graft_cmd()
        .arg("status")
        .arg(&path)
        .arg("--json")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["files"][0]["kind"], "partial");
    assert_eq!(parsed["files"][0]["state"], "ok");
}

#[test]
fn sections_lists_keys_and_line_counts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("artifact.txt");
    fs::write(
        &path,
        concat!(
            "gen\n",
            "# graft-manual: alpha\none\ntwo\n# graft-manual-end\n",
            "# graft-manual: beta\n# graft-manual-end\n",
        ),
    )
    .unwrap();

    graft_cmd()
        .arg("sections")
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("alpha  (2 line(s))"))
        .stdout(contains("beta  (0 line(s))"));
}

#[test]
fn sections_on_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.txt");
    fs::write(&path, "# graft-manual: open\nnever closed\n").unwrap();

    graft_cmd()
        .arg("sections")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(contains("malformed sections"));
}

#[test]
fn sections_reports_sectionless_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.txt");
    fs::write(&path, "nothing here\n").unwrap();

    graft_cmd()
        .arg("sections")
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("no manual sections"));
}
