//! Type-combination bucket index.
//!
//! Every indexed edge is filed under each `(source type, edge type, target type)`
//! combination it satisfies, with any slot optionally replaced by [`TypeSlot::Any`], and
//! split by provenance so asserted and derived edges can be scanned separately. A lookup
//! with partial type information therefore resolves to a handful of O(1) bucket reads.

use ahash::AHashMap;

use crate::backend::EdgeScope;

/// Arena position of an edge inside [`crate::graph::IndexedGraph`].
pub(crate) type EdgeSlot = usize;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeSlot {
    Any,
    Named(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provenance {
    Asserted,
    Derived,
}

impl Provenance {
    pub fn of(derived: bool) -> Self {
        if derived {
            Provenance::Derived
        } else {
            Provenance::Asserted
        }
    }

    fn admitted_by(scope: EdgeScope) -> &'static [Provenance] {
        match scope {
            EdgeScope::All => &[Provenance::Asserted, Provenance::Derived],
            EdgeScope::NonDerivedOnly => &[Provenance::Asserted],
            EdgeScope::DerivedOnly => &[Provenance::Derived],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub source: TypeSlot,
    pub edge: TypeSlot,
    pub target: TypeSlot,
    pub provenance: Provenance,
}

/// Every key an edge is filed under: the cross product of `Any` plus each concrete type
/// for all three slots.
pub(crate) fn keys_for_edge(
    source_types: &[String],
    edge_types: &[String],
    target_types: &[String],
    provenance: Provenance,
) -> Vec<BucketKey> {
    let sources = with_wildcard(source_types);
    let edges = with_wildcard(edge_types);
    let targets = with_wildcard(target_types);
    cross(&sources, &edges, &targets, &[provenance])
}

/// Keys a lookup must read: each filter slot contributes its concrete types, or `Any`
/// when it lists none.
pub(crate) fn keys_for_lookup(
    source_types: &[String],
    edge_types: &[String],
    target_types: &[String],
    scope: EdgeScope,
) -> Vec<BucketKey> {
    let sources = concrete_or_wildcard(source_types);
    let edges = concrete_or_wildcard(edge_types);
    let targets = concrete_or_wildcard(target_types);
    cross(&sources, &edges, &targets, Provenance::admitted_by(scope))
}

fn with_wildcard(types: &[String]) -> Vec<TypeSlot> {
    let mut slots = Vec::with_capacity(types.len() + 1);
    slots.push(TypeSlot::Any);
    slots.extend(types.iter().map(|ty| TypeSlot::Named(ty.to_lowercase())));
    slots.dedup();
    slots
}

fn concrete_or_wildcard(types: &[String]) -> Vec<TypeSlot> {
    if types.is_empty() {
        return vec![TypeSlot::Any];
    }
    let mut slots: Vec<TypeSlot> = types
        .iter()
        .map(|ty| TypeSlot::Named(ty.to_lowercase()))
        .collect();
    slots.sort();
    slots.dedup();
    slots
}

fn cross(
    sources: &[TypeSlot],
    edges: &[TypeSlot],
    targets: &[TypeSlot],
    provenances: &[Provenance],
) -> Vec<BucketKey> {
    let mut keys =
        Vec::with_capacity(sources.len() * edges.len() * targets.len() * provenances.len());
    for &provenance in provenances {
        for source in sources {
            for edge in edges {
                for target in targets {
                    keys.push(BucketKey {
                        source: source.clone(),
                        edge: edge.clone(),
                        target: target.clone(),
                        provenance,
                    });
                }
            }
        }
    }
    keys
}

#[derive(Clone, Debug, Default)]
pub(crate) struct BucketIndex {
    buckets: AHashMap<BucketKey, Vec<EdgeSlot>>,
}

impl BucketIndex {
    pub(crate) fn insert(&mut self, keys: &[BucketKey], slot: EdgeSlot) {
        for key in keys {
            self.buckets.entry(key.clone()).or_default().push(slot);
        }
    }

    pub(crate) fn remove(&mut self, keys: &[BucketKey], slot: EdgeSlot) {
        for key in keys {
            if let Some(entries) = self.buckets.get_mut(key) {
                entries.retain(|&candidate| candidate != slot);
                if entries.is_empty() {
                    self.buckets.remove(key);
                }
            }
        }
    }

    /// Union of the requested buckets, ordered by slot and free of duplicates.
    pub(crate) fn collect(&self, keys: &[BucketKey]) -> Vec<EdgeSlot> {
        let mut slots = Vec::new();
        for key in keys {
            if let Some(entries) = self.buckets.get(key) {
                slots.extend_from_slice(entries);
            }
        }
        slots.sort_unstable();
        slots.dedup();
        slots
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn entry_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_edge_keys_cover_wildcard_cross_product() {
        let keys = keys_for_edge(
            &types(&["a", "b"]),
            &types(&["e"]),
            &types(&["c"]),
            Provenance::Asserted,
        );
        // (any, a, b) x (any, e) x (any, c)
        assert_eq!(keys.len(), 3 * 2 * 2);
        assert!(keys.contains(&BucketKey {
            source: TypeSlot::Any,
            edge: TypeSlot::Any,
            target: TypeSlot::Any,
            provenance: Provenance::Asserted,
        }));
        assert!(keys.contains(&BucketKey {
            source: TypeSlot::Named("b".into()),
            edge: TypeSlot::Named("e".into()),
            target: TypeSlot::Any,
            provenance: Provenance::Asserted,
        }));
    }

    #[test]
    fn test_lookup_keys_follow_scope() {
        let all = keys_for_lookup(&[], &types(&["e"]), &[], EdgeScope::All);
        assert_eq!(all.len(), 2);
        let direct = keys_for_lookup(&[], &types(&["e"]), &[], EdgeScope::NonDerivedOnly);
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].provenance, Provenance::Asserted);
    }

    #[test]
    fn test_remove_drops_empty_buckets() {
        let mut index = BucketIndex::default();
        let keys = keys_for_edge(&types(&["a"]), &types(&["e"]), &types(&["b"]), Provenance::Derived);
        index.insert(&keys, 0);
        index.insert(&keys, 1);
        assert_eq!(index.entry_count(), keys.len() * 2);
        index.remove(&keys, 0);
        assert_eq!(index.collect(&keys), vec![1]);
        index.remove(&keys, 1);
        assert_eq!(index.bucket_count(), 0);
    }
}
