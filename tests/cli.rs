use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn mission_prints_the_ledger_and_exports_csv() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("out").join("duna.csv");
    let json_path = dir.path().join("duna.json");

    let mut cmd = Command::cargo_bin("mission").expect("mission bin");
    cmd.arg("configs/missions/kerbin_to_duna.toml")
        .arg("--csv")
        .arg(&csv_path)
        .arg("--json")
        .arg(&json_path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("=== Mission: Duna (1x Orome) ==="))
        .stdout(predicate::str::contains("Duna capture"))
        .stdout(predicate::str::contains("Final orbit: elliptic orbit about Duna"));

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "index");
    assert_eq!(&headers[2], "action");
    let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(&rows[1][2], "escape");
    assert_eq!(&rows[4][2], "payload drop");

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(summary["feasible"], true);
    assert_eq!(summary["entries"].as_array().unwrap().len(), 5);
}

#[test]
fn mission_reports_missing_scripts() {
    let mut cmd = Command::cargo_bin("mission").expect("mission bin");
    cmd.arg("configs/missions/does_not_exist.toml");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("loading mission script"));
}

#[test]
fn windows_lists_every_sibling() {
    let mut cmd = Command::cargo_bin("windows").expect("windows bin");
    cmd.args(["--from", "kerbin", "--year", "1", "--day", "1"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();
    assert!(stdout.contains("Transfer windows from Kerbin"), "{stdout}");
    for sibling in ["Moho", "Eve", "Duna", "Dres", "Jool", "Eeloo"] {
        assert!(stdout.contains(sibling), "missing {sibling}: {stdout}");
    }
}

#[test]
fn windows_rejects_impossible_dates() {
    let mut cmd = Command::cargo_bin("windows").expect("windows bin");
    cmd.args(["--from", "Kerbin", "--day", "500"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not a valid date"));
}
