mod common;

use std::fs;

use assert_cmd::Command;
use common::{TestWorkspace, stock_config_path};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

const INTERNAL: &str = "transaction_reference,amount,status\nT1,10,paid\nT2,5,paid\nT3,7,pending\n";
const PROVIDER: &str = "transaction_reference,amount,status\nT1,10.00,paid\nT2,6,paid\nT4,1,paid\n";

fn command(workspace: &TestWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("mini-reconcile").expect("binary exists");
    cmd.current_dir(workspace.path())
        .env_remove("RECONCILE_CONFIG_PATH")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn prints_each_category_with_counts() {
    let workspace = TestWorkspace::new();
    let internal = workspace.write("internal.csv", INTERNAL);
    let provider = workspace.write("provider.csv", PROVIDER);

    command(&workspace)
        .arg(&internal)
        .arg(&provider)
        .arg("--config")
        .arg(stock_config_path())
        .assert()
        .success()
        .stdout(contains("=== MATCHED === (1 rows)"))
        .stdout(contains("=== ONLY_INTERNAL === (1 rows)"))
        .stdout(contains("=== ONLY_PROVIDER === (1 rows)"))
        .stdout(contains("=== MISMATCHED === (1 rows)"))
        .stdout(contains("Transaction Reference"))
        .stdout(contains("Only in Provider"));
}

#[test]
fn preview_rows_zero_prints_counts_only() {
    let workspace = TestWorkspace::new();
    let internal = workspace.write("internal.csv", INTERNAL);
    let provider = workspace.write("provider.csv", PROVIDER);

    command(&workspace)
        .arg(&internal)
        .arg(&provider)
        .args(["--default-config", "-n", "0"])
        .assert()
        .success()
        .stdout(contains("=== MATCHED === (1 rows)"))
        .stdout(contains("Transaction Reference").not());
}

#[test]
fn writes_category_files_and_summary() {
    let workspace = TestWorkspace::new();
    let internal = workspace.write("internal.csv", INTERNAL);
    let provider = workspace.write("provider.csv", PROVIDER);
    let out_dir = workspace.path().join("results");
    let summary = workspace.path().join("summary.json");

    command(&workspace)
        .arg(&internal)
        .arg(&provider)
        .arg("--default-config")
        .arg("--output-dir")
        .arg(&out_dir)
        .arg("--summary")
        .arg(&summary)
        .assert()
        .success();

    let mismatched = fs::read_to_string(out_dir.join("mismatched.csv")).expect("mismatched.csv");
    assert_eq!(
        mismatched,
        concat!(
            "Transaction Reference,Internal Amount,Internal Status,",
            "Provider Amount,Provider Status,result\n",
            "T2,5,paid,6,paid,Mismatched\n",
        )
    );
    for name in ["matched.csv", "only_internal.csv", "only_provider.csv"] {
        assert!(out_dir.join(name).exists(), "{name} missing");
    }

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary).expect("summary")).expect("json");
    assert_eq!(json["counts"]["matched"], 1);
    assert_eq!(json["counts"]["mismatched"], 1);
    assert_eq!(json["differing_fields"]["amount"], 1);
    assert_eq!(json["events"].as_array().map(Vec::len), Some(3));
}

#[test]
fn config_path_can_come_from_environment() {
    let workspace = TestWorkspace::new();
    let internal = workspace.write("internal.csv", INTERNAL);
    let provider = workspace.write("provider.csv", PROVIDER);

    command(&workspace)
        .env("RECONCILE_CONFIG_PATH", stock_config_path())
        .arg(&internal)
        .arg(&provider)
        .assert()
        .success()
        .stdout(contains("=== MISMATCHED === (1 rows)"));
}

#[test]
fn missing_config_fails_before_reading_inputs() {
    let workspace = TestWorkspace::new();

    command(&workspace)
        .args(["does-not-exist.csv", "also-missing.csv"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("config file not found"));
}

#[test]
fn missing_required_column_is_reported() {
    let workspace = TestWorkspace::new();
    let internal = workspace.write("internal.csv", "transaction_reference,amount\nT1,10\n");
    let provider = workspace.write("provider.csv", PROVIDER);

    command(&workspace)
        .arg(&internal)
        .arg(&provider)
        .arg("--default-config")
        .assert()
        .failure()
        .stderr(contains("Internal System Export: missing required column(s): status"));
}

#[test]
fn missing_merge_key_surfaces_engine_error() {
    let workspace = TestWorkspace::new();
    let config = fs::read_to_string(stock_config_path())
        .expect("stock config")
        .replace(
            "required_columns: [transaction_reference, amount, status]",
            "required_columns: []",
        );
    let config_path = workspace.write("config.yaml", &config);
    let internal = workspace.write("internal.csv", INTERNAL);
    let provider = workspace.write("provider.csv", "ref,amount,status\nT1,10,paid\n");

    command(&workspace)
        .arg(&internal)
        .arg(&provider)
        .arg("-c")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(contains(
            "merge key 'transaction_reference' not found in provider dataset",
        ));
}

#[test]
fn semicolon_delimited_inputs_are_supported() {
    let workspace = TestWorkspace::new();
    let internal = workspace.write("internal.txt", &INTERNAL.replace(',', ";"));
    let provider = workspace.write("provider.txt", &PROVIDER.replace(',', ";"));

    command(&workspace)
        .arg(&internal)
        .arg(&provider)
        .args(["--default-config", "--delimiter", ";"])
        .assert()
        .success()
        .stdout(contains("=== ONLY_PROVIDER === (1 rows)"));
}
