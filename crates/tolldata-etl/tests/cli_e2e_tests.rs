//! End-to-end tests for the tolldata-etl binary

mod helpers;

use assert_cmd::Command;
use helpers::{archive_url, serve_archive, Fixture, ARCHIVE_PATH};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Binary isolated from the caller's environment and any `.env` file
fn tolldata_etl(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tolldata-etl").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("TOLLDATA_SOURCE_URL")
        .env_remove("TOLLDATA_STAGING_DIR")
        .env_remove("TOLLDATA_JOIN_MODE")
        .env_remove("LOG_OUTPUT")
        .env_remove("LOG_LEVEL")
        .env("TOLLDATA_RETRIES", "0")
        .env("TOLLDATA_RETRY_DELAY_SECS", "0");
    cmd
}

#[test]
fn test_graph_lists_stages() {
    let dir = TempDir::new().unwrap();

    tolldata_etl(&dir)
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::contains("1: download_dataset"))
        .stdout(predicate::str::contains(
            "3: extract_data_from_csv, extract_data_from_tsv, extract_data_from_fixed_width",
        ))
        .stdout(predicate::str::contains("5: transform_data"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_writes_output_and_report() {
    let server = MockServer::start().await;
    serve_archive(&server, Fixture::two_rows().archive()).await;
    let dir = TempDir::new().unwrap();
    let staging = dir.path().join("staging");
    let report = dir.path().join("report.json");

    tolldata_etl(&dir)
        .args(["run", "--report"])
        .arg(&report)
        .arg("--staging-dir")
        .arg(&staging)
        .args(["--source-url", &archive_url(&server)])
        .assert()
        .success()
        .stdout(predicate::str::contains("transform_data"));

    assert!(staging.join("transformed_data.csv").is_file());
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["status"], "succeeded");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_run_exits_non_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ARCHIVE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    tolldata_etl(&dir)
        .arg("run")
        .arg("--staging-dir")
        .arg(dir.path().join("staging"))
        .args(["--source-url", &archive_url(&server)])
        .assert()
        .failure()
        .stdout(predicate::str::contains("skipped"));
}

#[test]
fn test_single_task_runs_against_existing_staging() {
    let dir = TempDir::new().unwrap();
    let staging = dir.path().join("staging");
    fs::create_dir_all(&staging).unwrap();
    fs::write(staging.join("tollplaza-data.tsv"), Fixture::two_rows().plaza).unwrap();

    tolldata_etl(&dir)
        .args(["task", "extract_data_from_tsv", "--staging-dir"])
        .arg(&staging)
        .assert()
        .success();

    let extract = fs::read_to_string(staging.join("tsv_data.csv")).unwrap();
    assert!(extract.starts_with("Number of axles,Tollplaza id,Tollplaza code\n"));
}

#[test]
fn test_unknown_task_is_an_error() {
    let dir = TempDir::new().unwrap();

    tolldata_etl(&dir)
        .args(["task", "load_data", "--staging-dir"])
        .arg(dir.path().join("staging"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown task 'load_data'"));
}

#[test]
fn test_invalid_source_url_is_rejected() {
    let dir = TempDir::new().unwrap();

    tolldata_etl(&dir)
        .args(["run", "--source-url", "ftp://example.com/tolldata.tgz", "--staging-dir"])
        .arg(dir.path().join("staging"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));
}
