use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    PatternGraphError,
    analysis::PatternAnalysisEngine,
    derivation::DerivationEngine,
    document::GraphDocument,
    dsl::parse_query,
};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliCommand {
    Stats,
    Parse,
    Query,
    Derive,
}

impl CliCommand {
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name {
            "stats" => Ok(CliCommand::Stats),
            "parse" => Ok(CliCommand::Parse),
            "query" => Ok(CliCommand::Query),
            "derive" => Ok(CliCommand::Derive),
            other => Err(format!("unknown command {other}")),
        }
    }

    fn needs_input(self) -> bool {
        matches!(self, CliCommand::Parse | CliCommand::Query)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLineConfig {
    pub graph: Option<PathBuf>,
    pub command: CliCommand,
    pub input: Option<String>,
    pub generations: Option<u32>,
}

impl CommandLineConfig {
    pub fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut graph = None;
        let mut command = CliCommand::Stats;
        let mut input = None;
        let mut generations = None;
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match *arg {
                "--graph" => {
                    graph = Some(PathBuf::from(
                        iter.next()
                            .ok_or_else(|| "--graph requires a value".to_string())?,
                    ));
                }
                "--command" => {
                    command = CliCommand::from_name(
                        iter.next()
                            .ok_or_else(|| "--command requires a value".to_string())?,
                    )?;
                }
                "--input" => {
                    input = Some(
                        iter.next()
                            .ok_or_else(|| "--input requires a value".to_string())?
                            .to_string(),
                    );
                }
                "--generations" => {
                    let raw = iter
                        .next()
                        .ok_or_else(|| "--generations requires a value".to_string())?;
                    generations = Some(
                        raw.parse::<u32>()
                            .map_err(|_| format!("--generations expects a number, got {raw}"))?,
                    );
                }
                other if other.starts_with("--") => {
                    return Err(format!("unknown flag {other}"));
                }
                other => {
                    command = CliCommand::from_name(other)?;
                }
            }
        }
        if command.needs_input() && input.is_none() {
            return Err("--input is required for parse and query".to_string());
        }
        Ok(Self {
            graph,
            command,
            input,
            generations,
        })
    }

    pub fn help() -> &'static str {
        "Usage: patterngraph [--graph PATH] [--command stats|parse|query|derive] \
         [--input PATTERN] [--generations N]\n"
    }
}

/// Installs a stderr subscriber honouring `RUST_LOG`. Safe to call more than once.
pub fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();
}

/// Runs one command and returns its JSON output.
pub fn execute(config: &CommandLineConfig) -> Result<Value, PatternGraphError> {
    let document = match &config.graph {
        Some(path) => GraphDocument::from_path(path)?,
        None => GraphDocument::default(),
    };
    let generations = config
        .generations
        .unwrap_or(document.derivation.max_generations);
    let input = config.input.as_deref().unwrap_or_default();

    match config.command {
        CliCommand::Stats => to_json(&document.build_graph()?.index_stats()),
        CliCommand::Parse => to_json(&parse_query(input)?.compile()),
        CliCommand::Derive => {
            let mut graph = document.build_graph()?;
            let rules = document.build_rules()?;
            let report = DerivationEngine::new(&mut graph, &rules).derive_edges(generations)?;
            Ok(json!({
                "report": to_json(&report)?,
                "stats": to_json(&graph.index_stats())?,
            }))
        }
        CliCommand::Query => {
            let mut graph = document.build_graph()?;
            let rules = document.build_rules()?;
            if !rules.is_empty() {
                DerivationEngine::new(&mut graph, &rules).derive_edges(generations)?;
            }
            let rows = PatternAnalysisEngine::new(&graph).run(input)?;
            Ok(json!({
                "count": rows.len(),
                "rows": to_json(&rows)?,
            }))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, PatternGraphError> {
    serde_json::to_value(value).map_err(|e| PatternGraphError::document(e.to_string()))
}
