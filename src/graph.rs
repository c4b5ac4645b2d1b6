use ahash::AHashMap;
use serde::Serialize;
use tracing::{debug, trace};

mod index;
mod types;

pub use index::{BucketKey, Provenance, TypeSlot};
pub use types::{
    Derivation, EDGE_ID_SEPARATOR, EDGE_TYPE_SEPARATOR, EdgeId, GraphEdge, GraphVertex,
    normalize_types, validate_edge, validate_vertex,
};

use crate::{
    backend::{EdgeFilter, GraphElement, GraphRepository, VertexFilter},
    errors::PatternGraphError,
};
use index::{BucketIndex, EdgeSlot, keys_for_edge, keys_for_lookup};

type VertexSlot = usize;

#[derive(Clone, Debug)]
struct EdgeEntry {
    edge: GraphEdge,
    /// Keys the edge is filed under; empty while an endpoint is missing.
    buckets: Vec<BucketKey>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub vertices: usize,
    pub edges: usize,
    pub pending_edges: usize,
    pub buckets: usize,
    pub bucket_entries: usize,
    pub vertex_tombstones: usize,
    pub edge_tombstones: usize,
}

/// Removals below this many tombstones never trigger compaction.
pub const COMPACTION_THRESHOLD: usize = 64;

/// In-memory typed property graph.
///
/// Vertices and edges live in append-only arenas addressed by slot; removal leaves a
/// tombstone so slots stay stable and iteration follows insertion order. Every mutation
/// updates the arenas, the adjacency lists and the bucket index in one step.
#[derive(Clone, Debug, Default)]
pub struct IndexedGraph {
    vertices: Vec<Option<GraphVertex>>,
    vertex_slots: AHashMap<String, VertexSlot>,
    vertices_by_type: AHashMap<String, Vec<VertexSlot>>,
    edges: Vec<Option<EdgeEntry>>,
    edge_slots: AHashMap<EdgeId, EdgeSlot>,
    outbound: AHashMap<String, Vec<EdgeSlot>>,
    inbound: AHashMap<String, Vec<EdgeSlot>>,
    buckets: BucketIndex,
}

impl IndexedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_slots.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_slots.len()
    }

    pub fn insert_vertex(&mut self, mut vertex: GraphVertex) -> Result<(), PatternGraphError> {
        vertex.types = normalize_types(&vertex.types);
        validate_vertex(&vertex)?;
        if self.vertex_slots.contains_key(&vertex.id) {
            return Err(PatternGraphError::invalid_input(format!(
                "vertex {} already exists",
                vertex.id
            )));
        }
        self.store_vertex(vertex);
        Ok(())
    }

    fn store_vertex(&mut self, vertex: GraphVertex) {
        let slot = self.vertices.len();
        for ty in &vertex.types {
            self.vertices_by_type.entry(ty.clone()).or_default().push(slot);
        }
        let id = vertex.id.clone();
        self.vertex_slots.insert(id.clone(), slot);
        self.vertices.push(Some(vertex));
        self.index_pending_edges(&id);
        trace!(vertex = %id, slot, "vertex inserted");
    }

    /// Removes the vertex, then purges every edge touching it from the edge arena, both
    /// adjacency lists and the bucket index.
    pub fn delete_vertex(&mut self, vertex_id: &str) -> Option<GraphVertex> {
        let slot = self.vertex_slots.get(vertex_id).copied()?;
        let mut touching: Vec<EdgeSlot> = self
            .outbound
            .get(vertex_id)
            .into_iter()
            .chain(self.inbound.get(vertex_id))
            .flatten()
            .copied()
            .collect();
        touching.sort_unstable();
        touching.dedup();
        for edge_slot in &touching {
            self.detach_edge(*edge_slot);
        }
        self.outbound.remove(vertex_id);
        self.inbound.remove(vertex_id);

        let vertex = self.vertices.get_mut(slot)?.take()?;
        for ty in &vertex.types {
            if let Some(slots) = self.vertices_by_type.get_mut(ty) {
                slots.retain(|&candidate| candidate != slot);
                if slots.is_empty() {
                    self.vertices_by_type.remove(ty);
                }
            }
        }
        self.vertex_slots.remove(vertex_id);
        trace!(vertex = vertex_id, edges = touching.len(), "vertex removed");
        self.compact_if_sparse();
        Some(vertex)
    }

    pub fn insert_edge(&mut self, mut edge: GraphEdge) -> Result<bool, PatternGraphError> {
        edge.types = normalize_types(&edge.types);
        validate_edge(&edge)?;
        let id = edge.id();
        if self.edge_slots.contains_key(&id) {
            return Ok(false);
        }
        self.store_edge(id, edge);
        Ok(true)
    }

    fn store_edge(&mut self, id: EdgeId, edge: GraphEdge) {
        let slot = self.edges.len();
        self.outbound
            .entry(edge.source_id.clone())
            .or_default()
            .push(slot);
        self.inbound
            .entry(edge.target_id.clone())
            .or_default()
            .push(slot);
        trace!(edge = %id, slot, derived = edge.is_derived(), "edge inserted");
        self.edge_slots.insert(id, slot);
        self.edges.push(Some(EdgeEntry {
            edge,
            buckets: Vec::new(),
        }));
        self.index_edge(slot);
    }

    pub fn delete_edge(&mut self, edge_id: &str) -> Result<Option<GraphEdge>, PatternGraphError> {
        let id = EdgeId::parse(edge_id)?;
        match self.edge_slots.get(&id).copied() {
            Some(slot) => {
                let removed = self.detach_edge(slot);
                self.compact_if_sparse();
                Ok(removed)
            }
            None => Ok(None),
        }
    }

    pub fn vertex(&self, vertex_id: &str) -> Option<&GraphVertex> {
        self.vertex_slots
            .get(vertex_id)
            .and_then(|&slot| self.vertices.get(slot))
            .and_then(Option::as_ref)
    }

    pub fn edge(&self, edge_id: &EdgeId) -> Option<&GraphEdge> {
        self.edge_slots
            .get(edge_id)
            .and_then(|&slot| self.edges.get(slot))
            .and_then(Option::as_ref)
            .map(|entry| &entry.edge)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &GraphVertex> {
        self.vertices.iter().flatten()
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().flatten().map(|entry| &entry.edge)
    }

    pub fn filter_vertices(&self, filter: &VertexFilter) -> Vec<&GraphVertex> {
        if filter.is_empty() {
            return self.vertices().collect();
        }
        let mut slots: Vec<VertexSlot> = if !filter.ids.is_empty() {
            filter
                .ids
                .iter()
                .filter_map(|id| self.vertex_slots.get(id).copied())
                .collect()
        } else if !filter.types.is_empty() {
            filter
                .types
                .iter()
                .filter_map(|ty| self.vertices_by_type.get(ty))
                .flatten()
                .copied()
                .collect()
        } else {
            (0..self.vertices.len()).collect()
        };
        slots.sort_unstable();
        slots.dedup();
        slots
            .into_iter()
            .filter_map(|slot| self.vertices.get(slot).and_then(Option::as_ref))
            .filter(|vertex| filter.matches(vertex))
            .collect()
    }

    /// Concrete ids on either side route through the adjacency lists; otherwise the
    /// bucket index supplies candidates. Both paths re-validate endpoints, so dangling
    /// edges never surface here.
    pub fn filter_edges(
        &self,
        source: Option<&VertexFilter>,
        edge: &EdgeFilter,
        target: Option<&VertexFilter>,
    ) -> Vec<&GraphEdge> {
        let source_ids = source.filter(|filter| !filter.ids.is_empty());
        let target_ids = target.filter(|filter| !filter.ids.is_empty());
        let candidates = if let Some(filter) = source_ids {
            adjacent(&self.outbound, &filter.ids)
        } else if let Some(filter) = target_ids {
            adjacent(&self.inbound, &filter.ids)
        } else {
            let keys = keys_for_lookup(
                source.map(|filter| filter.types.as_slice()).unwrap_or_default(),
                &edge.types,
                target.map(|filter| filter.types.as_slice()).unwrap_or_default(),
                edge.scope,
            );
            self.buckets.collect(&keys)
        };
        candidates
            .into_iter()
            .filter_map(|slot| self.edges.get(slot).and_then(Option::as_ref))
            .map(|entry| &entry.edge)
            .filter(|candidate| edge.matches(candidate))
            .filter(|candidate| {
                self.endpoint_matches(&candidate.source_id, source)
                    && self.endpoint_matches(&candidate.target_id, target)
            })
            .collect()
    }

    pub fn index_stats(&self) -> IndexStats {
        let pending_edges = self
            .edges
            .iter()
            .flatten()
            .filter(|entry| entry.buckets.is_empty())
            .count();
        IndexStats {
            vertices: self.vertex_count(),
            edges: self.edge_count(),
            pending_edges,
            buckets: self.buckets.bucket_count(),
            bucket_entries: self.buckets.entry_count(),
            vertex_tombstones: self.vertices.len() - self.vertex_slots.len(),
            edge_tombstones: self.edges.len() - self.edge_slots.len(),
        }
    }

    /// Rebuilds the arenas without tombstones. Slots are renumbered; ids, insertion order
    /// and pending edges are kept.
    pub fn compact(&mut self) {
        let vertices: Vec<GraphVertex> = self.vertices.drain(..).flatten().collect();
        let edges: Vec<GraphEdge> = self
            .edges
            .drain(..)
            .flatten()
            .map(|entry| entry.edge)
            .collect();
        let mut rebuilt = IndexedGraph::new();
        for vertex in vertices {
            rebuilt.store_vertex(vertex);
        }
        for edge in edges {
            rebuilt.store_edge(edge.id(), edge);
        }
        debug!(
            vertices = rebuilt.vertices.len(),
            edges = rebuilt.edges.len(),
            "graph compacted"
        );
        *self = rebuilt;
    }

    fn compact_if_sparse(&mut self) {
        let live = self.vertex_slots.len() + self.edge_slots.len();
        let tombstones = self.vertices.len() + self.edges.len() - live;
        if tombstones >= COMPACTION_THRESHOLD && tombstones > live {
            self.compact();
        }
    }

    fn endpoint_matches(&self, vertex_id: &str, filter: Option<&VertexFilter>) -> bool {
        match self.vertex(vertex_id) {
            Some(vertex) => filter.is_none_or(|filter| filter.matches(vertex)),
            None => false,
        }
    }

    fn bucket_keys_for(&self, edge: &GraphEdge) -> Option<Vec<BucketKey>> {
        let source = self.vertex(&edge.source_id)?;
        let target = self.vertex(&edge.target_id)?;
        Some(keys_for_edge(
            &source.types,
            &edge.types,
            &target.types,
            Provenance::of(edge.is_derived()),
        ))
    }

    fn index_edge(&mut self, slot: EdgeSlot) {
        let Some(keys) = self
            .edges
            .get(slot)
            .and_then(Option::as_ref)
            .and_then(|entry| self.bucket_keys_for(&entry.edge))
        else {
            return;
        };
        self.buckets.insert(&keys, slot);
        if let Some(Some(entry)) = self.edges.get_mut(slot) {
            entry.buckets = keys;
        }
    }

    fn index_pending_edges(&mut self, vertex_id: &str) {
        let mut pending: Vec<EdgeSlot> = self
            .outbound
            .get(vertex_id)
            .into_iter()
            .chain(self.inbound.get(vertex_id))
            .flatten()
            .copied()
            .filter(|&slot| {
                matches!(self.edges.get(slot), Some(Some(entry)) if entry.buckets.is_empty())
            })
            .collect();
        pending.sort_unstable();
        pending.dedup();
        for slot in pending {
            self.index_edge(slot);
        }
    }

    fn detach_edge(&mut self, slot: EdgeSlot) -> Option<GraphEdge> {
        let entry = self.edges.get_mut(slot)?.take()?;
        self.buckets.remove(&entry.buckets, slot);
        self.edge_slots.remove(&entry.edge.id());
        if let Some(slots) = self.outbound.get_mut(&entry.edge.source_id) {
            slots.retain(|&candidate| candidate != slot);
        }
        if let Some(slots) = self.inbound.get_mut(&entry.edge.target_id) {
            slots.retain(|&candidate| candidate != slot);
        }
        Some(entry.edge)
    }
}

fn adjacent(map: &AHashMap<String, Vec<EdgeSlot>>, ids: &[String]) -> Vec<EdgeSlot> {
    let mut slots: Vec<EdgeSlot> = ids
        .iter()
        .filter_map(|id| map.get(id))
        .flatten()
        .copied()
        .collect();
    slots.sort_unstable();
    slots.dedup();
    slots
}

impl GraphRepository for IndexedGraph {
    fn add_vertex(&mut self, vertex: GraphVertex) -> Result<(), PatternGraphError> {
        self.insert_vertex(vertex)
    }

    fn remove_vertex(&mut self, vertex_id: &str) -> Option<GraphVertex> {
        self.delete_vertex(vertex_id)
    }

    fn add_edge(&mut self, edge: GraphEdge) -> Result<bool, PatternGraphError> {
        self.insert_edge(edge)
    }

    fn remove_edge(&mut self, edge_id: &str) -> Result<Option<GraphEdge>, PatternGraphError> {
        self.delete_edge(edge_id)
    }

    fn exists(&self, element: GraphElement<'_>) -> bool {
        match element {
            GraphElement::Vertex(vertex) => self.vertex_slots.contains_key(&vertex.id),
            GraphElement::Edge(edge) => self.edge_slots.contains_key(&edge.id()),
        }
    }

    fn get_vertex(&self, vertex_id: &str) -> Option<&GraphVertex> {
        self.vertex(vertex_id)
    }

    fn get_vertices(&self, vertex_ids: &[String]) -> Vec<&GraphVertex> {
        vertex_ids.iter().filter_map(|id| self.vertex(id)).collect()
    }

    fn get_all_vertices(&self) -> Vec<&GraphVertex> {
        self.vertices().collect()
    }

    fn get_vertices_by_filter(&self, filter: &VertexFilter) -> Vec<&GraphVertex> {
        self.filter_vertices(filter)
    }

    fn get_edge(&self, edge_id: &str) -> Result<Option<&GraphEdge>, PatternGraphError> {
        let id = EdgeId::parse(edge_id)?;
        Ok(self.edge(&id))
    }

    fn get_edges(&self, edge_ids: &[EdgeId]) -> Vec<&GraphEdge> {
        edge_ids.iter().filter_map(|id| self.edge(id)).collect()
    }

    fn get_all_edges(&self) -> Vec<&GraphEdge> {
        self.edges().collect()
    }

    fn get_edges_by_filter(
        &self,
        source: Option<&VertexFilter>,
        edge: &EdgeFilter,
        target: Option<&VertexFilter>,
    ) -> Vec<&GraphEdge> {
        self.filter_edges(source, edge, target)
    }
}
