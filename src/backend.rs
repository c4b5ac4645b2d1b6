//! Repository contract consumed by the query and derivation engines. The engines only ever
//! talk to a [`GraphRepository`]; [`crate::graph::IndexedGraph`] is the in-memory
//! implementation, and any other store (networked, disk-backed) plugs in by implementing
//! the same trait.

use serde::{Deserialize, Serialize};

use crate::{
    PatternGraphError,
    graph::{EdgeId, GraphEdge, GraphVertex, normalize_types},
};

/// Which edges an edge lookup may return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeScope {
    #[default]
    All,
    NonDerivedOnly,
    DerivedOnly,
}

impl EdgeScope {
    pub fn admits(self, derived: bool) -> bool {
        match self {
            EdgeScope::All => true,
            EdgeScope::NonDerivedOnly => !derived,
            EdgeScope::DerivedOnly => derived,
        }
    }
}

/// Vertex lookup filter. Every populated field narrows the result; an empty filter
/// selects every vertex.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexFilter {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub search_term: Option<String>,
}

impl VertexFilter {
    pub fn by_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn by_types<I, T>(types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            types: normalize_types(types),
            ..Self::default()
        }
    }

    pub fn by_search_term(term: impl Into<String>) -> Self {
        Self::default().with_search_term(term)
    }

    pub fn with_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.types = normalize_types(types);
        self
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search_term = if term.is_empty() { None } else { Some(term) };
        self
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref().filter(|term| !term.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.types.is_empty() && self.search_term().is_none()
    }

    pub fn matches(&self, vertex: &GraphVertex) -> bool {
        if !self.ids.is_empty() && !self.ids.iter().any(|id| *id == vertex.id) {
            return false;
        }
        if !self.types.is_empty() && !vertex.has_any_type(&self.types) {
            return false;
        }
        if let Some(term) = self.search_term() {
            if !vertex.name_contains(term) {
                return false;
            }
        }
        true
    }
}

/// Edge lookup filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeFilter {
    #[serde(default)]
    pub types: Vec<String>,
    /// When set, an edge must carry every listed type instead of at least one.
    #[serde(default)]
    pub inclusive_types: bool,
    #[serde(default)]
    pub scope: EdgeScope,
    /// Derived edges whose generation is at or above this limit are invisible.
    #[serde(default)]
    pub generation_limit: Option<u32>,
}

impl EdgeFilter {
    pub fn new(scope: EdgeScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn with_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.types = normalize_types(types);
        self
    }

    pub fn inclusive(mut self, inclusive_types: bool) -> Self {
        self.inclusive_types = inclusive_types;
        self
    }

    pub fn with_generation_limit(mut self, limit: Option<u32>) -> Self {
        self.generation_limit = limit;
        self
    }

    pub fn matches(&self, edge: &GraphEdge) -> bool {
        if !self.scope.admits(edge.is_derived()) {
            return false;
        }
        if let (Some(limit), Some(generation)) = (self.generation_limit, edge.generation()) {
            if generation >= limit {
                return false;
            }
        }
        if self.types.is_empty() {
            return true;
        }
        if self.inclusive_types {
            edge.has_all_types(&self.types)
        } else {
            edge.has_any_type(&self.types)
        }
    }
}

/// Borrowed vertex or edge, used for existence checks.
#[derive(Clone, Copy, Debug)]
pub enum GraphElement<'a> {
    Vertex(&'a GraphVertex),
    Edge(&'a GraphEdge),
}

pub trait GraphRepository {
    fn add_vertex(&mut self, vertex: GraphVertex) -> Result<(), PatternGraphError>;

    fn add_many_vertices(&mut self, vertices: Vec<GraphVertex>) -> Result<usize, PatternGraphError> {
        let mut added = 0;
        for vertex in vertices {
            self.add_vertex(vertex)?;
            added += 1;
        }
        Ok(added)
    }

    /// Removes a vertex and every edge touching it. Absent ids resolve to `None`.
    fn remove_vertex(&mut self, vertex_id: &str) -> Option<GraphVertex>;

    /// Returns `false` when an edge with the same identity is already stored.
    fn add_edge(&mut self, edge: GraphEdge) -> Result<bool, PatternGraphError>;

    fn add_many_edges(&mut self, edges: Vec<GraphEdge>) -> Result<usize, PatternGraphError> {
        let mut added = 0;
        for edge in edges {
            if self.add_edge(edge)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Fails only on a structurally invalid id; a well-formed but absent id yields `None`.
    fn remove_edge(&mut self, edge_id: &str) -> Result<Option<GraphEdge>, PatternGraphError>;

    fn exists(&self, element: GraphElement<'_>) -> bool;

    fn get_vertex(&self, vertex_id: &str) -> Option<&GraphVertex>;

    fn get_vertices(&self, vertex_ids: &[String]) -> Vec<&GraphVertex>;

    fn get_all_vertices(&self) -> Vec<&GraphVertex>;

    fn get_vertices_by_filter(&self, filter: &VertexFilter) -> Vec<&GraphVertex>;

    fn get_edge(&self, edge_id: &str) -> Result<Option<&GraphEdge>, PatternGraphError>;

    fn get_edges(&self, edge_ids: &[EdgeId]) -> Vec<&GraphEdge>;

    fn get_all_edges(&self) -> Vec<&GraphEdge>;

    fn get_edges_by_filter(
        &self,
        source: Option<&VertexFilter>,
        edge: &EdgeFilter,
        target: Option<&VertexFilter>,
    ) -> Vec<&GraphEdge>;
}
