use std::{fs, path::PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

const GRAPH: &str = r#"{
  "vertices": [
    {"id": "1", "types": ["t1"], "name": "one"},
    {"id": "3", "types": ["t2"], "name": "three"},
    {"id": "4", "types": ["t3"], "name": "four"}
  ],
  "edges": [
    {"source_id": "1", "target_id": "3", "types": ["et1"]},
    {"source_id": "3", "target_id": "4", "types": ["et2"]}
  ],
  "rules": [
    {"antecedent": "()[et1]>()[et2,et3]>()", "production": "(1)[et1](3)"}
  ]
}"#;

fn write_graph(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("graph.json");
    fs::write(&path, GRAPH).expect("write graph");
    path
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("json output")
}

#[test]
fn test_cli_exits_with_success_on_help() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_patterngraph"));
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn test_cli_stats_without_graph() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_patterngraph"));
    cmd.args(["--command", "stats"]);
    let stats = stdout_json(&mut cmd);
    assert_eq!(stats["vertices"], 0);
}

#[test]
fn test_cli_stats_with_graph() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_graph(&dir);
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_patterngraph"));
    cmd.args(["--graph", path.to_str().expect("utf8"), "stats"]);
    let stats = stdout_json(&mut cmd);
    assert_eq!(stats["vertices"], 3);
    assert_eq!(stats["edges"], 2);
}

#[test]
fn test_cli_parse_command() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_patterngraph"));
    cmd.args(["--command", "parse", "--input", "?(t1)-[et1]->(*)"]);
    let parsed = stdout_json(&mut cmd);
    assert_eq!(parsed["kind"], "complex");
    assert_eq!(parsed["query"][0]["relationship"]["direction"], "outbound");
}

#[test]
fn test_cli_query_runs_rules_first() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_graph(&dir);
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_patterngraph"));
    cmd.args([
        "--graph",
        path.to_str().expect("utf8"),
        "--command",
        "query",
        "--input",
        "(t1)=>(*)",
    ]);
    let result = stdout_json(&mut cmd);
    assert_eq!(result["count"], 2);
}

#[test]
fn test_cli_derive_reports_generations() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_graph(&dir);
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_patterngraph"));
    cmd.args([
        "--graph",
        path.to_str().expect("utf8"),
        "--command",
        "derive",
        "--generations",
        "2",
    ]);
    let result = stdout_json(&mut cmd);
    assert_eq!(result["report"]["generations"], 2);
    assert_eq!(result["report"]["edges_created"], 1);
    assert_eq!(result["stats"]["edges"], 3);
}

#[test]
fn test_cli_usage_errors_exit_with_two() {
    for args in [
        vec!["--command", "explode"],
        vec!["--command", "query"],
        vec!["--generations", "many"],
        vec!["--bogus"],
    ] {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_patterngraph"));
        cmd.args(&args);
        cmd.assert().code(2);
    }
}

#[test]
fn test_cli_invalid_query_exits_with_one() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_patterngraph"));
    cmd.args(["--command", "query", "--input", "(*)"]);
    cmd.assert().code(1);
}

#[test]
fn test_command_line_config_parsing() {
    use patterngraph::client::{CliCommand, CommandLineConfig};

    let config = CommandLineConfig::from_args(&[
        "patterngraph",
        "--graph",
        "g.json",
        "query",
        "--input",
        "(t1)",
        "--generations",
        "3",
    ])
    .expect("config");
    assert_eq!(config.command, CliCommand::Query);
    assert_eq!(config.graph, Some(PathBuf::from("g.json")));
    assert_eq!(config.input.as_deref(), Some("(t1)"));
    assert_eq!(config.generations, Some(3));

    let defaults = CommandLineConfig::from_args(&["patterngraph"]).expect("defaults");
    assert_eq!(defaults.command, CliCommand::Stats);
    assert!(CommandLineConfig::from_args(&["patterngraph", "--graph"]).is_err());
}
