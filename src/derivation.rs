//! Generational edge derivation.
//!
//! A rule pairs a three-slot antecedent with a production naming two of those slots. Each
//! generation runs every antecedent against a snapshot holding the asserted edges plus
//! the edges derived by earlier generations, then inserts one derived edge per match.
//! Edges created inside a generation never feed matches in the same generation, which
//! keeps the result independent of rule order and makes a re-run a no-op.

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::{
    backend::GraphRepository,
    descriptor::{AntecedentDescriptor, ProductionDescriptor, compile_antecedent},
    dsl::{parse_antecedent, parse_production},
    errors::PatternGraphError,
    graph::{Derivation, GraphEdge},
    query::QueryEngine,
};

/// Builds the edge stored for one rule match from its source id, production types, target
/// id and derivation record.
pub type EdgeBuilder = dyn Fn(&str, &[String], &str, Derivation) -> GraphEdge + Sync;

pub fn default_edge_builder(
    source_id: &str,
    types: &[String],
    target_id: &str,
    derivation: Derivation,
) -> GraphEdge {
    GraphEdge::derived(source_id, types, target_id, derivation)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivationRule {
    name: String,
    antecedent: AntecedentDescriptor,
    production: ProductionDescriptor,
}

impl DerivationRule {
    /// Compiles a rule from its two text halves. The rule is named after its source text
    /// unless [`DerivationRule::named`] overrides it.
    pub fn new(antecedent: &str, production: &str) -> Result<Self, PatternGraphError> {
        let chain = parse_antecedent(antecedent)?;
        Ok(Self {
            name: format!("{} => {}", antecedent.trim(), production.trim()),
            antecedent: compile_antecedent(&chain)?,
            production: parse_production(production)?,
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn antecedent(&self) -> &AntecedentDescriptor {
        &self.antecedent
    }

    pub fn production(&self) -> &ProductionDescriptor {
        &self.production
    }

    fn candidates<R>(
        &self,
        snapshot: &QueryEngine<'_, R>,
        generation: u32,
        build_edge: &EdgeBuilder,
    ) -> Vec<GraphEdge>
    where
        R: GraphRepository + ?Sized,
    {
        let source_index = self.production.source.row_index();
        let target_index = self.production.target.row_index();
        snapshot
            .run(self.antecedent.query())
            .iter()
            .filter_map(|row| {
                let source = row.vertex_at(source_index)?;
                let target = row.vertex_at(target_index)?;
                Some(build_edge(
                    source,
                    self.production.types.as_slice(),
                    target,
                    Derivation {
                        rule: self.name.clone(),
                        generation,
                    },
                ))
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DerivationReport {
    pub generations: u32,
    pub edges_created: usize,
    pub created_per_generation: Vec<usize>,
}

impl DerivationReport {
    pub fn record(&mut self, generation: u32, created: usize) {
        self.generations = generation;
        self.edges_created += created;
        self.created_per_generation.push(created);
    }
}

pub struct DerivationEngine<'a, R: ?Sized> {
    repository: &'a mut R,
    rules: &'a [DerivationRule],
    edge_builder: &'a EdgeBuilder,
}

impl<'a, R> DerivationEngine<'a, R>
where
    R: GraphRepository + ?Sized,
{
    pub fn new(repository: &'a mut R, rules: &'a [DerivationRule]) -> Self {
        Self {
            repository,
            rules,
            edge_builder: &default_edge_builder,
        }
    }

    /// Replaces the constructor used for derived edges. The builder should keep the
    /// derivation record so the edge stays out of non-derived scopes.
    pub fn with_edge_builder(mut self, edge_builder: &'a EdgeBuilder) -> Self {
        self.edge_builder = edge_builder;
        self
    }

    /// Runs generations `1..=max_generations`. Generations that find nothing new still
    /// count, so the report always covers the requested range.
    pub fn derive_edges(
        &mut self,
        max_generations: u32,
    ) -> Result<DerivationReport, PatternGraphError> {
        let _span = info_span!("derive", rules = self.rules.len(), max_generations).entered();
        let mut report = DerivationReport::default();
        for generation in 1..=max_generations {
            let created = self.run_generation(generation)?;
            report.record(generation, created);
        }
        info!(
            generations = report.generations,
            edges_created = report.edges_created,
            "derivation finished"
        );
        Ok(report)
    }

    /// Applies every rule once against the snapshot visible to `generation` and returns
    /// the number of edges that were new.
    pub fn run_generation(&mut self, generation: u32) -> Result<usize, PatternGraphError> {
        let candidates: Vec<GraphEdge> = {
            let snapshot = QueryEngine::new(&*self.repository).with_generation_limit(generation);
            self.rules
                .iter()
                .flat_map(|rule| rule.candidates(&snapshot, generation, self.edge_builder))
                .collect()
        };
        let matched = candidates.len();
        let mut created = 0;
        for edge in candidates {
            if self.repository.add_edge(edge)? {
                created += 1;
            }
        }
        debug!(generation, matched, created, "generation applied");
        Ok(created)
    }
}
