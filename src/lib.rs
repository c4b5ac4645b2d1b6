//! In-memory typed property graph with a pattern query language and generational,
//! rule-based edge derivation.
//!
//! Patterns such as `?(service)-[calls]->(*)=>('mongo':db)` are parsed by [`dsl`],
//! compiled into [`descriptor`]s and executed by the [`query`] engine against any
//! [`backend::GraphRepository`]. [`derivation`] rules like
//! `()[calls]>()[calls]>()` / `(1)[reaches](3)` add derived edges generation by
//! generation. Run Criterion benchmarks with `cargo bench`.

pub mod analysis;
pub mod backend;
pub mod bench_utils;
pub mod chain;
pub mod client;
pub mod config;
pub mod derivation;
pub mod descriptor;
pub mod document;
pub mod dsl;
pub mod errors;
pub mod graph;
pub mod pattern;
pub mod query;
pub mod shared;

pub use crate::analysis::{PatternAnalysisEngine, ResolvedElement};
pub use crate::backend::{EdgeFilter, EdgeScope, GraphElement, GraphRepository, VertexFilter};
pub use crate::chain::{Direction, InputChain, InputNode, NodeRole};
pub use crate::config::DerivationConfig;
pub use crate::derivation::{
    DerivationEngine, DerivationReport, DerivationRule, EdgeBuilder, default_edge_builder,
};
pub use crate::descriptor::{
    AntecedentDescriptor, ProductionDescriptor, QueryDescriptor, QueryNode, QueryRelationship,
    QueryTriple, compile, compile_antecedent,
};
pub use crate::document::{GraphDocument, RuleSpec};
pub use crate::dsl::{parse_antecedent, parse_production, parse_query};
pub use crate::errors::PatternGraphError;
pub use crate::graph::{Derivation, EdgeId, GraphEdge, GraphVertex, IndexStats, IndexedGraph};
pub use crate::pattern::{ResultRow, RowElement};
pub use crate::query::QueryEngine;
pub use crate::shared::SharedGraph;
