//! JSON graph documents: the vertices, edges and rules of one graph in a single file.
//!
//! ```json
//! {
//!   "vertices": [{"id": "1", "types": ["service"], "name": "billing"}],
//!   "edges": [{"source_id": "1", "target_id": "2", "types": ["calls"]}],
//!   "rules": [{"antecedent": "()[calls]>()[calls]>()", "production": "(1)[reaches](3)"}],
//!   "derivation": {"max_generations": 2}
//! }
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    backend::GraphRepository,
    config::DerivationConfig,
    derivation::DerivationRule,
    errors::PatternGraphError,
    graph::{GraphEdge, GraphVertex, IndexedGraph},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub antecedent: String,
    pub production: String,
}

impl RuleSpec {
    pub fn compile(&self) -> Result<DerivationRule, PatternGraphError> {
        let rule = DerivationRule::new(&self.antecedent, &self.production)?;
        Ok(match &self.name {
            Some(name) => rule.named(name.as_str()),
            None => rule,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub vertices: Vec<GraphVertex>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    #[serde(default)]
    pub derivation: DerivationConfig,
}

impl GraphDocument {
    pub fn from_json(text: &str) -> Result<Self, PatternGraphError> {
        serde_json::from_str(text).map_err(|e| PatternGraphError::document(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PatternGraphError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| PatternGraphError::document(format!("{}: {e}", path.display())))?;
        let document = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            vertices = document.vertices.len(),
            edges = document.edges.len(),
            rules = document.rules.len(),
            "graph document loaded"
        );
        Ok(document)
    }

    pub fn build_graph(&self) -> Result<IndexedGraph, PatternGraphError> {
        let mut graph = IndexedGraph::new();
        graph.add_many_vertices(self.vertices.clone())?;
        graph.add_many_edges(self.edges.clone())?;
        Ok(graph)
    }

    pub fn build_rules(&self) -> Result<Vec<DerivationRule>, PatternGraphError> {
        self.rules.iter().map(RuleSpec::compile).collect()
    }
}
