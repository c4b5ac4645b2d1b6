//! Executable form of a parsed pattern.
//!
//! A single-node chain compiles to [`QueryDescriptor::Simple`], a vertex filter. Longer
//! chains compile to one [`QueryTriple`] per hop, where each triple's target node is the
//! next triple's source node.

use serde::Serialize;

use crate::{
    backend::{EdgeFilter, EdgeScope, VertexFilter},
    chain::{
        Direction, InputChain, InputNode, InputRelationship, NodeRole, TypeMultiplicity,
        validate_antecedent_chain,
    },
    errors::PatternGraphError,
};

/// Hop weight assigned to every relationship the parsers produce.
pub const DEFAULT_HOP_WEIGHT: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryNode {
    pub types: Vec<String>,
    pub search_term: Option<String>,
    pub ids: Vec<String>,
    pub role: NodeRole,
}

impl QueryNode {
    pub fn from_input(node: &InputNode) -> Self {
        Self {
            types: node.types().to_vec(),
            search_term: node.search_term().map(str::to_string),
            ids: Vec::new(),
            role: node.role(),
        }
    }

    pub fn filter(&self) -> VertexFilter {
        VertexFilter {
            ids: self.ids.clone(),
            types: self.types.clone(),
            search_term: self.search_term.clone(),
        }
    }

    pub fn should_be_returned(&self) -> bool {
        self.role.should_be_returned()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryRelationship {
    pub types: Vec<String>,
    /// Carried for callers that rank paths; traversal ignores it.
    pub hop_weight: u32,
    pub inclusive_types: bool,
    pub is_path: bool,
    pub direction: Direction,
}

impl QueryRelationship {
    pub fn from_input(relationship: &InputRelationship) -> Self {
        Self {
            types: relationship.types.clone(),
            hop_weight: DEFAULT_HOP_WEIGHT,
            inclusive_types: relationship.multiplicity == TypeMultiplicity::Conjunctive,
            is_path: relationship.is_path(),
            direction: relationship.direction(),
        }
    }

    pub fn scope(&self) -> EdgeScope {
        if self.is_path {
            EdgeScope::All
        } else {
            EdgeScope::NonDerivedOnly
        }
    }

    pub fn edge_filter(&self) -> EdgeFilter {
        EdgeFilter::new(self.scope())
            .with_types(&self.types)
            .inclusive(self.inclusive_types)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryTriple {
    pub source: QueryNode,
    pub relationship: QueryRelationship,
    pub target: QueryNode,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "query", rename_all = "snake_case")]
pub enum QueryDescriptor {
    Simple(VertexFilter),
    Complex(Vec<QueryTriple>),
}

impl QueryDescriptor {
    pub fn is_complex_query(&self) -> bool {
        matches!(self, QueryDescriptor::Complex(_))
    }

    pub fn query_filter(&self) -> Option<&VertexFilter> {
        match self {
            QueryDescriptor::Simple(filter) => Some(filter),
            QueryDescriptor::Complex(_) => None,
        }
    }

    /// Empty for simple queries.
    pub fn triples(&self) -> &[QueryTriple] {
        match self {
            QueryDescriptor::Simple(_) => &[],
            QueryDescriptor::Complex(triples) => triples,
        }
    }
}

pub fn compile(chain: &InputChain) -> QueryDescriptor {
    if chain.hops.is_empty() {
        return QueryDescriptor::Simple(QueryNode::from_input(&chain.head).filter());
    }
    let mut triples = Vec::with_capacity(chain.hops.len());
    let mut source = QueryNode::from_input(&chain.head);
    for hop in &chain.hops {
        let target = QueryNode::from_input(&hop.node);
        triples.push(QueryTriple {
            source,
            relationship: QueryRelationship::from_input(&hop.relationship),
            target: target.clone(),
        });
        source = target;
    }
    QueryDescriptor::Complex(triples)
}

impl InputChain {
    pub fn compile(&self) -> QueryDescriptor {
        compile(self)
    }
}

/// Compiled rule antecedent: always two triples over three slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AntecedentDescriptor {
    query: QueryDescriptor,
}

impl AntecedentDescriptor {
    pub fn query(&self) -> &QueryDescriptor {
        &self.query
    }

    pub fn triples(&self) -> &[QueryTriple] {
        self.query.triples()
    }
}

pub fn compile_antecedent(chain: &InputChain) -> Result<AntecedentDescriptor, PatternGraphError> {
    validate_antecedent_chain(chain)?;
    Ok(AntecedentDescriptor {
        query: compile(chain),
    })
}

/// One of the three antecedent slots, numbered from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SlotRef(u8);

impl SlotRef {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 3;

    pub fn new(position: u8) -> Result<Self, PatternGraphError> {
        if !(Self::FIRST..=Self::LAST).contains(&position) {
            return Err(PatternGraphError::invalid_query(format!(
                "slot {position} is outside {}..={}",
                Self::FIRST,
                Self::LAST
            )));
        }
        Ok(Self(position))
    }

    pub fn position(self) -> u8 {
        self.0
    }

    /// Index of the slot's vertex inside a match row `[v1, e1, v2, e2, v3]`.
    pub fn row_index(self) -> usize {
        2 * usize::from(self.0 - Self::FIRST)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductionDescriptor {
    pub source: SlotRef,
    pub target: SlotRef,
    pub types: Vec<String>,
}
