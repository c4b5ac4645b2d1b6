//! Parsed form of a pattern: a head node followed by `(relationship, node)` hops.
//!
//! Both pattern dialects (user queries and rule antecedents) produce an [`InputChain`];
//! the dialects differ only in their relationship spelling and in which structural rules
//! they enforce.

use serde::{Deserialize, Serialize};

use crate::errors::PatternGraphError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum InputNode {
    /// `()`: matches anything, hidden from projection.
    NotDescribed,
    /// `(*)`: matches anything.
    Group,
    Typed {
        types: Vec<String>,
    },
    Described {
        search_term: String,
    },
    DescribedTyped {
        search_term: String,
        types: Vec<String>,
    },
}

impl InputNode {
    pub fn role(&self) -> NodeRole {
        match self {
            InputNode::NotDescribed => NodeRole::NotDescribed,
            InputNode::Group => NodeRole::Group,
            InputNode::Typed { .. } => NodeRole::Typed,
            InputNode::Described { .. } => NodeRole::Described,
            InputNode::DescribedTyped { .. } => NodeRole::DescribedTyped,
        }
    }

    pub fn types(&self) -> &[String] {
        match self {
            InputNode::Typed { types } | InputNode::DescribedTyped { types, .. } => types,
            InputNode::NotDescribed | InputNode::Group | InputNode::Described { .. } => &[],
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        match self {
            InputNode::Described { search_term } | InputNode::DescribedTyped { search_term, .. } => {
                Some(search_term)
            }
            InputNode::NotDescribed | InputNode::Group | InputNode::Typed { .. } => None,
        }
    }

    /// Only typed or described nodes may anchor a query.
    pub fn is_anchor(&self) -> bool {
        match self {
            InputNode::Typed { .. } | InputNode::Described { .. } | InputNode::DescribedTyped { .. } => {
                true
            }
            InputNode::NotDescribed | InputNode::Group => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    NotDescribed,
    Group,
    Typed,
    Described,
    DescribedTyped,
}

impl NodeRole {
    pub fn should_be_returned(self) -> bool {
        !matches!(self, NodeRole::NotDescribed)
    }
}

/// `Short` relationships carry no type list; `Typed` ones carry a bracketed list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Short,
    Typed,
}

/// Bonded relationships only see asserted edges; path relationships also see derived ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BondStyle {
    Bonded,
    Path,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeMultiplicity {
    /// Edge needs at least one of the listed types.
    Disjunctive,
    /// Edge needs every listed type.
    Conjunctive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outbound,
    Inbound,
    Both,
}

impl Direction {
    pub fn from_bonds(left_bond: bool, right_bond: bool) -> Self {
        match (left_bond, right_bond) {
            (false, true) => Direction::Outbound,
            (true, false) => Direction::Inbound,
            (true, true) | (false, false) => Direction::Both,
        }
    }

    pub fn includes_outbound(self) -> bool {
        matches!(self, Direction::Outbound | Direction::Both)
    }

    pub fn includes_inbound(self) -> bool {
        matches!(self, Direction::Inbound | Direction::Both)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InputRelationship {
    pub kind: RelationshipKind,
    pub style: BondStyle,
    pub left_bond: bool,
    pub right_bond: bool,
    pub types: Vec<String>,
    pub multiplicity: TypeMultiplicity,
}

impl InputRelationship {
    pub fn direction(&self) -> Direction {
        Direction::from_bonds(self.left_bond, self.right_bond)
    }

    pub fn is_path(&self) -> bool {
        self.style == BondStyle::Path
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InputHop {
    pub relationship: InputRelationship,
    pub node: InputNode,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InputChain {
    pub head: InputNode,
    pub hops: Vec<InputHop>,
}

impl InputChain {
    pub fn node_count(&self) -> usize {
        self.hops.len() + 1
    }

    pub fn is_single_node(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &InputNode> {
        std::iter::once(&self.head).chain(self.hops.iter().map(|hop| &hop.node))
    }

    pub fn relationships(&self) -> impl Iterator<Item = &InputRelationship> {
        self.hops.iter().map(|hop| &hop.relationship)
    }
}

pub fn validate_query_chain(chain: &InputChain) -> Result<(), PatternGraphError> {
    if chain.is_single_node() && !chain.head.is_anchor() {
        return Err(PatternGraphError::invalid_query(
            "a lone (*) or () node does not select anything",
        ));
    }
    if !chain.head.is_anchor() {
        return Err(PatternGraphError::invalid_query(
            "a query must start with a typed or described node",
        ));
    }
    Ok(())
}

/// Rule antecedents are exactly two directed hops over three slots.
pub fn validate_antecedent_chain(chain: &InputChain) -> Result<(), PatternGraphError> {
    if chain.hops.len() != 2 {
        return Err(PatternGraphError::invalid_query(format!(
            "a rule antecedent needs exactly three slots, found {}",
            chain.node_count()
        )));
    }
    if chain
        .relationships()
        .any(|relationship| relationship.direction() == Direction::Both)
    {
        return Err(PatternGraphError::invalid_query(
            "rule antecedent hops must point in one direction",
        ));
    }
    Ok(())
}
