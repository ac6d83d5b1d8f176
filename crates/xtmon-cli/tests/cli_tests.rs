use pretty_assertions::assert_eq;
use std::fs;
use xtmon_cli::{cli, run};

const REPORT: &str = r#"{
    "columns": ["DatabaseName", "FileGroup", "UsedSpaceMB", "AlertLevel"],
    "rows": [
        ["DB2", "PRIMARY", "2048.4", "OK"],
        ["DB1", "PRIMARY", "1234567", "CRITICAL"]
    ]
}"#;

const FLOWS: &str = r#"[
    {"flowId": 1, "flowIdDerivedFrom": 11, "pnlDate": "2024-01-05", "feedSourceName": "Murex"},
    {"flowId": 2, "flowIdDerivedFrom": 12, "pnlDate": "2024-01-05", "feedSourceName": "Summit"},
    {"flowId": 3, "flowIdDerivedFrom": 13, "pnlDate": "2024-01-06", "feedSourceName": "Murex"}
]"#;

async fn run_args(args: &[&str]) -> anyhow::Result<String> {
    let matches = cli().try_get_matches_from(args)?;
    run(&matches).await
}

#[test]
fn command_definition_is_consistent() {
    cli().debug_assert();
}

#[tokio::test]
async fn test_pnl_date_canonicalizes() {
    let out = run_args(&["xtmon", "pnl-date", "2024/01/05"]).await.unwrap();
    assert_eq!(out, "05-01-2024");

    let err = run_args(&["xtmon", "pnl-date", "5-1-2024"]).await.unwrap_err();
    assert!(err.to_string().contains("Enter a valid date (DD-MM-YYYY)"));
}

#[tokio::test]
async fn test_cards_text_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.json");
    fs::write(&input, REPORT).unwrap();

    let out = run_args(&["xtmon", "cards", "--input", input.to_str().unwrap()])
        .await
        .unwrap();
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines[0], "== DB1 ==");
    assert!(lines[1].contains("Used Space MB"));
    assert!(lines[2].starts_with('!'));
    assert!(lines[2].contains("1 234 567 MB"));
    assert_eq!(lines[3], "== DB2 ==");
    assert!(lines[5].contains("2 048 MB"));
}

#[tokio::test]
async fn test_cards_json_honours_config_whitelist() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.json");
    let config = dir.path().join("xtmon.toml");
    fs::write(&input, REPORT).unwrap();
    fs::write(&config, "[monitoring]\ncard_columns = [\"AlertLevel\"]\n").unwrap();

    let out = run_args(&[
        "xtmon",
        "cards",
        "--input",
        input.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--json",
    ])
    .await
    .unwrap();
    let cards: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(cards[0]["name"], "DB1");
    assert_eq!(cards[0]["columns"], serde_json::json!(["AlertLevel"]));
}

#[tokio::test]
async fn test_replay_dry_run_prints_filtered_batch() {
    let dir = tempfile::tempdir().unwrap();
    let flows = dir.path().join("flows.json");
    fs::write(&flows, FLOWS).unwrap();

    let out = run_args(&[
        "xtmon",
        "replay",
        "--flows",
        flows.to_str().unwrap(),
        "--pnl-date",
        "05-01-2024",
        "--feed-source",
        "murex",
    ])
    .await
    .unwrap();
    let batch: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(batch.as_array().map(Vec::len), Some(1));
    assert_eq!(batch[0]["flowId"], 1);
    assert_eq!(batch[0]["flowIdDerivedFrom"], 11);
}

#[tokio::test]
async fn test_replay_with_empty_view_fails() {
    let dir = tempfile::tempdir().unwrap();
    let flows = dir.path().join("flows.json");
    fs::write(&flows, FLOWS).unwrap();

    let err = run_args(&[
        "xtmon",
        "replay",
        "--flows",
        flows.to_str().unwrap(),
        "--pnl-date",
        "05-01-2024",
        "--calc-type",
        "Intraday",
    ])
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Select at least one row to submit."));
}

#[tokio::test]
async fn test_missing_snapshot_is_reported() {
    let err = run_args(&["xtmon", "cards", "--input", "/nonexistent/report.json"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("GetDbSizePlusDisk failed"));
}

#[tokio::test]
async fn test_errors_name_the_configured_procedure() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("xtmon.toml");
    fs::write(&config, "[monitoring]\nprocedure = \"ops.DiskReport\"\n").unwrap();
    let missing = dir.path().join("absent.json");

    let err = run_args(&[
        "xtmon",
        "cards",
        "--input",
        missing.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ])
    .await
    .unwrap_err();
    assert!(err.to_string().starts_with("ops.DiskReport failed"));
}
