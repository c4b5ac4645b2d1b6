use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::PatternGraphError;

/// Separates the three parts of an edge identifier: `source>types>target`.
pub const EDGE_ID_SEPARATOR: char = '>';
/// Separates edge types inside an edge identifier.
pub const EDGE_TYPE_SEPARATOR: char = ',';

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphVertex {
    pub id: String,
    pub types: Vec<String>,
    #[serde(default)]
    pub name: String,
}

impl GraphVertex {
    pub fn new<I, T>(id: impl Into<String>, types: I, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            id: id.into(),
            types: normalize_types(types),
            name: name.into(),
        }
    }

    pub fn has_any_type(&self, types: &[String]) -> bool {
        types.iter().any(|ty| self.types.iter().any(|own| own == ty))
    }

    /// Case-insensitive substring match against the vertex name.
    pub fn name_contains(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(&term.to_lowercase())
    }
}

/// One step of provenance attached to a derived edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Derivation {
    pub rule: String,
    pub generation: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphEdge {
    pub source_id: String,
    pub target_id: String,
    pub types: Vec<String>,
    #[serde(default)]
    pub derivation_path: Vec<Derivation>,
}

impl GraphEdge {
    pub fn new<I, T>(source_id: impl Into<String>, types: I, target_id: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            types: normalize_types(types),
            derivation_path: Vec::new(),
        }
    }

    pub fn derived<I, T>(
        source_id: impl Into<String>,
        types: I,
        target_id: impl Into<String>,
        derivation: Derivation,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut edge = Self::new(source_id, types, target_id);
        edge.derivation_path.push(derivation);
        edge
    }

    pub fn id(&self) -> EdgeId {
        EdgeId::new(&self.source_id, &self.types, &self.target_id)
    }

    pub fn is_derived(&self) -> bool {
        !self.derivation_path.is_empty()
    }

    /// Earliest generation recorded in the derivation path; `None` for asserted edges.
    pub fn generation(&self) -> Option<u32> {
        self.derivation_path.iter().map(|step| step.generation).min()
    }

    pub fn has_any_type(&self, types: &[String]) -> bool {
        types.iter().any(|ty| self.types.iter().any(|own| own == ty))
    }

    pub fn has_all_types(&self, types: &[String]) -> bool {
        types.iter().all(|ty| self.types.iter().any(|own| own == ty))
    }
}

/// Deterministic edge identity: `source>sorted,types>target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(source_id: &str, types: &[String], target_id: &str) -> Self {
        let mut sorted: Vec<&str> = types.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted.dedup();
        let joined = sorted.join(&EDGE_TYPE_SEPARATOR.to_string());
        EdgeId(format!(
            "{source_id}{EDGE_ID_SEPARATOR}{joined}{EDGE_ID_SEPARATOR}{target_id}"
        ))
    }

    /// Parses a raw identifier. Anything that is not three non-empty parts is malformed.
    pub fn parse(raw: &str) -> Result<Self, PatternGraphError> {
        let parts: Vec<&str> = raw.split(EDGE_ID_SEPARATOR).collect();
        if parts.len() != 3 || parts.iter().any(|part| part.trim().is_empty()) {
            return Err(PatternGraphError::malformed_identifier(format!(
                "edge id {raw:?} is not of the form source>types>target"
            )));
        }
        let types: Vec<String> = parts[1]
            .split(EDGE_TYPE_SEPARATOR)
            .map(|ty| ty.trim().to_lowercase())
            .collect();
        if types.iter().any(String::is_empty) {
            return Err(PatternGraphError::malformed_identifier(format!(
                "edge id {raw:?} contains an empty type"
            )));
        }
        Ok(EdgeId::new(parts[0], &types, parts[2]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercases, sorts and de-duplicates a type list.
pub fn normalize_types<I, T>(types: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut normalized: Vec<String> = types
        .into_iter()
        .map(|ty| ty.as_ref().trim().to_lowercase())
        .collect();
    normalized.sort_unstable();
    normalized.dedup();
    normalized
}

pub fn validate_vertex(vertex: &GraphVertex) -> Result<(), PatternGraphError> {
    validate_vertex_id(&vertex.id)?;
    validate_types(&vertex.types, "vertex")
}

pub fn validate_edge(edge: &GraphEdge) -> Result<(), PatternGraphError> {
    validate_vertex_id(&edge.source_id)?;
    validate_vertex_id(&edge.target_id)?;
    validate_types(&edge.types, "edge")
}

fn validate_vertex_id(id: &str) -> Result<(), PatternGraphError> {
    if id.trim().is_empty() {
        return Err(PatternGraphError::invalid_input("vertex id must be set"));
    }
    if id.contains(EDGE_ID_SEPARATOR) {
        return Err(PatternGraphError::invalid_input(format!(
            "vertex id {id:?} must not contain '{EDGE_ID_SEPARATOR}'"
        )));
    }
    Ok(())
}

fn validate_types(types: &[String], owner: &str) -> Result<(), PatternGraphError> {
    if types.is_empty() {
        return Err(PatternGraphError::invalid_input(format!(
            "{owner} must have at least one type"
        )));
    }
    for ty in types {
        if ty.is_empty()
            || ty.contains(EDGE_ID_SEPARATOR)
            || ty.contains(EDGE_TYPE_SEPARATOR)
            || ty.chars().any(char::is_whitespace)
        {
            return Err(PatternGraphError::invalid_input(format!(
                "{owner} type {ty:?} is not a valid type tag"
            )));
        }
    }
    Ok(())
}
