use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    backend::GraphRepository,
    errors::PatternGraphError,
    graph::{GraphEdge, GraphVertex, IndexedGraph},
};

/// Size and type spread of a generated graph.
#[derive(Clone, Copy, Debug)]
pub struct DatasetShape {
    pub vertices: usize,
    pub edges: usize,
    pub vertex_types: usize,
    pub edge_types: usize,
}

#[derive(Clone, Debug)]
pub struct GraphDataset {
    pub vertices: Vec<GraphVertex>,
    pub edges: Vec<GraphEdge>,
}

impl GraphDataset {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn materialize(&self) -> Result<IndexedGraph, PatternGraphError> {
        let mut graph = IndexedGraph::new();
        graph.add_many_vertices(self.vertices.clone())?;
        graph.add_many_edges(self.edges.clone())?;
        Ok(graph)
    }
}

/// Deterministic random graph: vertices `v0..vN` typed `t0..tK`, edges typed `e0..eM`
/// between uniformly chosen endpoints. Duplicate draws collapse when materialized.
pub fn generate_typed_graph(shape: DatasetShape, seed: u64) -> GraphDataset {
    assert!(shape.vertices > 0, "vertex count must be positive");
    assert!(
        shape.vertex_types > 0 && shape.edge_types > 0,
        "type counts must be positive"
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let vertices = (0..shape.vertices)
        .map(|idx| {
            let ty = rng.gen_range(0..shape.vertex_types);
            GraphVertex::new(vertex_id(idx), [format!("t{ty}")], format!("vertex {idx}"))
        })
        .collect();
    let edges = (0..shape.edges)
        .map(|_| {
            let source = rng.gen_range(0..shape.vertices);
            let target = rng.gen_range(0..shape.vertices);
            let ty = rng.gen_range(0..shape.edge_types);
            GraphEdge::new(vertex_id(source), [format!("e{ty}")], vertex_id(target))
        })
        .collect();
    GraphDataset { vertices, edges }
}

/// Straight chain `v0 -> v1 -> ...`, every vertex typed `t{idx}` and every edge `link`.
pub fn generate_chain(length: usize) -> GraphDataset {
    let vertices = (0..length)
        .map(|idx| GraphVertex::new(vertex_id(idx), [format!("t{idx}")], format!("vertex {idx}")))
        .collect();
    let edges = (1..length)
        .map(|idx| GraphEdge::new(vertex_id(idx - 1), ["link"], vertex_id(idx)))
        .collect();
    GraphDataset { vertices, edges }
}

fn vertex_id(idx: usize) -> String {
    format!("v{idx}")
}
