use std::borrow::Cow;

use serde::Serialize;

use crate::{
    backend::GraphRepository,
    descriptor::QueryDescriptor,
    dsl::{QUERY_SIGIL, parse_query},
    errors::PatternGraphError,
    graph::{GraphEdge, GraphVertex, IndexedGraph},
    pattern::{ResultRow, RowElement},
    query::QueryEngine,
};

/// Pattern text in, match rows out.
pub struct PatternAnalysisEngine<'a, R: ?Sized> {
    repository: &'a R,
}

/// Projected row element resolved back to the stored vertex or edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "element", content = "value", rename_all = "snake_case")]
pub enum ResolvedElement<'a> {
    Vertex(&'a GraphVertex),
    Edge(&'a GraphEdge),
}

impl<'a, R> PatternAnalysisEngine<'a, R>
where
    R: GraphRepository + ?Sized,
{
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// Parses and compiles a pattern. The leading `?` is optional here.
    pub fn compile(&self, pattern: &str) -> Result<QueryDescriptor, PatternGraphError> {
        Ok(parse_query(&with_sigil(pattern))?.compile())
    }

    pub fn run(&self, pattern: &str) -> Result<Vec<ResultRow>, PatternGraphError> {
        let descriptor = self.compile(pattern)?;
        Ok(QueryEngine::new(self.repository).run(&descriptor))
    }

    pub fn count(&self, pattern: &str) -> Result<usize, PatternGraphError> {
        Ok(self.run(pattern)?.len())
    }

    /// Looks up every projected element of `row`. A row that outlived a removal fails with
    /// `NotFound`.
    pub fn resolve(&self, row: &ResultRow) -> Result<Vec<ResolvedElement<'a>>, PatternGraphError> {
        let repository = self.repository;
        row.projected()
            .map(|element| match element {
                RowElement::Vertex { id, .. } => repository
                    .get_vertex(id)
                    .map(ResolvedElement::Vertex)
                    .ok_or_else(|| PatternGraphError::not_found(format!("vertex {id}"))),
                RowElement::Edge { id, .. } => repository
                    .get_edge(id.as_str())?
                    .map(ResolvedElement::Edge)
                    .ok_or_else(|| PatternGraphError::not_found(format!("edge {id}"))),
            })
            .collect()
    }
}

impl IndexedGraph {
    pub fn analysis(&self) -> PatternAnalysisEngine<'_, Self> {
        PatternAnalysisEngine::new(self)
    }
}

fn with_sigil(pattern: &str) -> Cow<'_, str> {
    let trimmed = pattern.trim();
    if trimmed.starts_with(QUERY_SIGIL) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("{QUERY_SIGIL}{trimmed}"))
    }
}
