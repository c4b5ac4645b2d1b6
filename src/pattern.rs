use std::ops::Index;

use serde::Serialize;

use crate::graph::EdgeId;

/// One position of a match row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum RowElement {
    Vertex { id: String, should_be_returned: bool },
    Edge { id: EdgeId, should_be_returned: bool },
}

impl RowElement {
    pub fn id(&self) -> &str {
        match self {
            RowElement::Vertex { id, .. } => id,
            RowElement::Edge { id, .. } => id.as_str(),
        }
    }

    pub fn should_be_returned(&self) -> bool {
        match self {
            RowElement::Vertex {
                should_be_returned, ..
            }
            | RowElement::Edge {
                should_be_returned, ..
            } => *should_be_returned,
        }
    }

    pub fn is_vertex(&self) -> bool {
        matches!(self, RowElement::Vertex { .. })
    }
}

/// A matched chain laid out as `[v0, e0, v1, e1, ..., vn]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResultRow {
    elements: Vec<RowElement>,
}

impl ResultRow {
    pub fn start(vertex_id: impl Into<String>, should_be_returned: bool) -> Self {
        Self {
            elements: vec![RowElement::Vertex {
                id: vertex_id.into(),
                should_be_returned,
            }],
        }
    }

    /// Copy of the row with one more `edge, vertex` step. Edges are always returned;
    /// `should_be_returned` applies to the vertex only.
    pub fn extended(&self, edge_id: EdgeId, vertex_id: &str, should_be_returned: bool) -> Self {
        let mut elements = Vec::with_capacity(self.elements.len() + 2);
        elements.extend_from_slice(&self.elements);
        elements.push(RowElement::Edge {
            id: edge_id,
            should_be_returned: true,
        });
        elements.push(RowElement::Vertex {
            id: vertex_id.to_string(),
            should_be_returned,
        });
        Self { elements }
    }

    pub fn elements(&self) -> &[RowElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn last_vertex_id(&self) -> Option<&str> {
        self.elements
            .last()
            .filter(|element| element.is_vertex())
            .map(RowElement::id)
    }

    /// Vertex id at `index`, or `None` when the position is out of range or holds an edge.
    pub fn vertex_at(&self, index: usize) -> Option<&str> {
        self.elements
            .get(index)
            .filter(|element| element.is_vertex())
            .map(RowElement::id)
    }

    /// Elements marked for projection, in row order.
    pub fn projected(&self) -> impl Iterator<Item = &RowElement> {
        self.elements
            .iter()
            .filter(|element| element.should_be_returned())
    }

    pub fn ids(&self) -> Vec<String> {
        self.elements
            .iter()
            .map(|element| element.id().to_string())
            .collect()
    }
}

impl Index<usize> for ResultRow {
    type Output = RowElement;

    fn index(&self, index: usize) -> &RowElement {
        &self.elements[index]
    }
}
