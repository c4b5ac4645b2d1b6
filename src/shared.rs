use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::{
    analysis::PatternAnalysisEngine,
    derivation::{DerivationEngine, DerivationReport, DerivationRule},
    errors::PatternGraphError,
    graph::IndexedGraph,
    pattern::ResultRow,
};

/// Graph handle that many readers and one deriving writer can share across threads.
///
/// Queries hold the read lock for one run. Derivation takes the write lock once per
/// generation, so readers interleave between generations and never see half of one.
#[derive(Clone, Debug, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<IndexedGraph>>,
}

impl SharedGraph {
    pub fn new(graph: IndexedGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, IndexedGraph> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, IndexedGraph> {
        self.inner.write()
    }

    pub fn run(&self, pattern: &str) -> Result<Vec<ResultRow>, PatternGraphError> {
        let graph = self.inner.read();
        PatternAnalysisEngine::new(&*graph).run(pattern)
    }

    pub fn derive_edges(
        &self,
        rules: &[DerivationRule],
        max_generations: u32,
    ) -> Result<DerivationReport, PatternGraphError> {
        let mut report = DerivationReport::default();
        for generation in 1..=max_generations {
            let mut graph = self.inner.write();
            let created = DerivationEngine::new(&mut *graph, rules).run_generation(generation)?;
            drop(graph);
            debug!(generation, created, "shared generation released");
            report.record(generation, created);
        }
        Ok(report)
    }
}
