#![allow(dead_code)]

use patterngraph::{DerivationRule, GraphEdge, GraphRepository, GraphVertex, IndexedGraph};

pub fn vertex(id: &str, ty: &str) -> GraphVertex {
    GraphVertex::new(id, [ty], id)
}

pub fn named_vertex(id: &str, types: &[&str], name: &str) -> GraphVertex {
    GraphVertex::new(id, types, name)
}

pub fn edge(source: &str, ty: &str, target: &str) -> GraphEdge {
    GraphEdge::new(source, [ty], target)
}

/// 1(t1) -et1-> 3(t2) -et2-> 4(t3); 2(t1) -et2-> 3; 2 -et3-> 5(t3) -et3-> 3.
pub fn basic_graph() -> IndexedGraph {
    let mut graph = IndexedGraph::new();
    graph
        .add_many_vertices(vec![
            vertex("1", "t1"),
            vertex("2", "t1"),
            vertex("3", "t2"),
            vertex("4", "t3"),
            vertex("5", "t3"),
        ])
        .expect("vertices");
    graph
        .add_many_edges(vec![
            edge("1", "et1", "3"),
            edge("3", "et2", "4"),
            edge("2", "et2", "3"),
            edge("2", "et3", "5"),
            edge("5", "et3", "3"),
        ])
        .expect("edges");
    graph
}

pub fn basic_rule() -> DerivationRule {
    DerivationRule::new("()[et1]>()[et2,et3]>()", "(1)[et1](3)").expect("rule")
}

/// a1(t1) -> a2(t2) -> a3(t3) -> a4(t4) -> a5(t5), every edge `et1`.
pub fn long_path_graph() -> IndexedGraph {
    let mut graph = IndexedGraph::new();
    for idx in 1..=5 {
        graph
            .add_vertex(vertex(&format!("a{idx}"), &format!("t{idx}")))
            .expect("vertex");
    }
    for idx in 1..5 {
        graph
            .add_edge(edge(&format!("a{idx}"), "et1", &format!("a{}", idx + 1)))
            .expect("edge");
    }
    graph
}

pub fn long_path_rule() -> DerivationRule {
    DerivationRule::new("()[et1]>()[et1]>()", "(1)[et1](3)").expect("rule")
}

pub fn row_ids(row: &patterngraph::ResultRow) -> Vec<String> {
    row.ids()
}
