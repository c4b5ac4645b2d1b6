use ahash::AHashSet;
use tracing::{debug, debug_span};

use crate::{
    backend::{EdgeFilter, GraphRepository, VertexFilter},
    descriptor::{QueryDescriptor, QueryTriple},
    graph::GraphEdge,
    pattern::ResultRow,
};

/// Executes compiled descriptors against a repository.
///
/// Complex queries grow a frontier of partial rows one triple at a time: every row is
/// extended by each edge that leaves (or enters, or both) its last vertex under the
/// triple's edge filter and lands on a vertex accepted by the triple's target filter.
pub struct QueryEngine<'a, R: ?Sized> {
    repository: &'a R,
    generation_limit: Option<u32>,
}

impl<'a, R> QueryEngine<'a, R>
where
    R: GraphRepository + ?Sized,
{
    pub fn new(repository: &'a R) -> Self {
        Self {
            repository,
            generation_limit: None,
        }
    }

    /// Hides derived edges from generation `generation` onwards.
    pub fn with_generation_limit(mut self, generation: u32) -> Self {
        self.generation_limit = Some(generation);
        self
    }

    pub fn run(&self, descriptor: &QueryDescriptor) -> Vec<ResultRow> {
        match descriptor {
            QueryDescriptor::Simple(filter) => self.run_simple(filter),
            QueryDescriptor::Complex(triples) => self.run_complex(triples),
        }
    }

    fn run_simple(&self, filter: &VertexFilter) -> Vec<ResultRow> {
        self.repository
            .get_vertices_by_filter(filter)
            .into_iter()
            .map(|vertex| ResultRow::start(vertex.id.as_str(), true))
            .collect()
    }

    fn run_complex(&self, triples: &[QueryTriple]) -> Vec<ResultRow> {
        let Some(first) = triples.first() else {
            return Vec::new();
        };
        let _span = debug_span!("query", triples = triples.len()).entered();
        let mut frontier: Vec<ResultRow> = self
            .repository
            .get_vertices_by_filter(&first.source.filter())
            .into_iter()
            .map(|vertex| ResultRow::start(vertex.id.as_str(), first.source.should_be_returned()))
            .collect();
        debug!(rows = frontier.len(), "anchors selected");

        for (hop, triple) in triples.iter().enumerate() {
            let step = Step {
                edge: triple
                    .relationship
                    .edge_filter()
                    .with_generation_limit(self.generation_limit),
                target: triple.target.filter(),
                outbound: triple.relationship.direction.includes_outbound(),
                inbound: triple.relationship.direction.includes_inbound(),
                should_be_returned: triple.target.should_be_returned(),
            };
            let mut next = Vec::new();
            for row in &frontier {
                next.extend(self.expand(row, &step));
            }
            debug!(hop, rows = next.len(), "frontier expanded");
            if next.is_empty() {
                return next;
            }
            frontier = next;
        }
        dedup_rows(frontier)
    }

    fn expand(&self, row: &ResultRow, step: &Step) -> Vec<ResultRow> {
        let Some(current) = row.last_vertex_id() else {
            return Vec::new();
        };
        let anchor = VertexFilter::by_ids([current]);
        let mut moves: Vec<(&GraphEdge, &str)> = Vec::new();
        if step.outbound {
            for edge in
                self.repository
                    .get_edges_by_filter(Some(&anchor), &step.edge, Some(&step.target))
            {
                moves.push((edge, edge.target_id.as_str()));
            }
        }
        if step.inbound {
            for edge in
                self.repository
                    .get_edges_by_filter(Some(&step.target), &step.edge, Some(&anchor))
            {
                moves.push((edge, edge.source_id.as_str()));
            }
        }
        let mut seen = AHashSet::new();
        moves
            .into_iter()
            .filter_map(|(edge, next)| {
                let id = edge.id();
                seen.insert((id.clone(), next))
                    .then(|| row.extended(id, next, step.should_be_returned))
            })
            .collect()
    }
}

struct Step {
    edge: EdgeFilter,
    target: VertexFilter,
    outbound: bool,
    inbound: bool,
    should_be_returned: bool,
}

/// Keeps the first row for every distinct id sequence.
fn dedup_rows(mut rows: Vec<ResultRow>) -> Vec<ResultRow> {
    let mut seen = AHashSet::new();
    rows.retain(|row| seen.insert(row.ids()));
    rows
}
