use std::path::PathBuf;
use std::process::Command;

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "upgrade-planner-cli-{label}-{}.json",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn write_fixture(label: &str) -> PathBuf {
    let path = temp_path(label);
    let data = serde_json::json!([
        {"name": "Upgrade A", "cost": 100, "income_increase": 10, "category": "Markets", "unlocked": true},
        {"name": "Upgrade B", "cost": 50, "income_increase": 10, "category": "PR&Team", "unlocked": true},
        {"name": "Upgrade C", "cost": 200, "income_increase": 10, "category": "Legal", "unlocked": false}
    ]);
    std::fs::write(&path, serde_json::to_string(&data).expect("json")).expect("write fixture");
    path
}

fn planner(path: &PathBuf, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_upgrade-planner"))
        .arg("--file")
        .arg(path)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run cli")
}

#[test]
fn best_names_the_top_upgrade() {
    let path = write_fixture("best");
    let out = planner(&path, &["best"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(
        stdout.trim(),
        "The most profitable upgrade to buy is: Upgrade B"
    );
    std::fs::remove_file(path).ok();
}

#[test]
fn list_with_category_filter() {
    let path = write_fixture("list");
    let out = planner(&path, &["list", "--category", "Legal"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("[2] Upgrade C, Legal"));
    std::fs::remove_file(path).ok();
}

#[test]
fn rank_rejects_zero_top() {
    let path = write_fixture("top0");
    let out = planner(&path, &["rank", "--top", "0"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("at least 1"));
    std::fs::remove_file(path).ok();
}

#[test]
fn edit_persists_and_refreshes_best() {
    let path = write_fixture("edit");
    let out = planner(
        &path,
        &["edit", "0", "--cost", "20", "--income", "12.5", "--category", "Special"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("The most profitable upgrade to buy is: Upgrade A"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
    let first = &saved[0];
    assert_eq!(first["name"], "Upgrade A");
    assert_eq!(first["cost"], 20);
    assert_eq!(first["income_increase"], 12.5);
    assert_eq!(first["category"], "Special");
    assert_eq!(first["unlocked"], true);
    assert_eq!(saved[1]["cost"], 50);
    std::fs::remove_file(path).ok();
}

#[test]
fn edit_rejects_amount_that_would_not_survive_saving() {
    let path = write_fixture("inexact");
    let before = std::fs::read_to_string(&path).expect("read");
    let out = planner(&path, &["edit", "0", "--income", "12345678901234567890123"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("more precision"));
    assert_eq!(std::fs::read_to_string(&path).expect("read"), before);
    std::fs::remove_file(path).ok();
}

#[test]
fn edit_out_of_range_fails_and_leaves_file() {
    let path = write_fixture("oob");
    let before = std::fs::read_to_string(&path).expect("read");
    let out = planner(&path, &["edit", "99", "--cost", "1"]);
    assert!(!out.status.success());
    assert_eq!(std::fs::read_to_string(&path).expect("read"), before);
    std::fs::remove_file(path).ok();
}

#[test]
fn missing_file_reports_error() {
    let path = temp_path("missing");
    let out = planner(&path, &["rank"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("loading"));
}
