//! Readable, collision-free anchor identifiers.
//!
//! Identifiers follow where a reader finds a symbol:
//!
//! - entrypoint modules use their import specifier (`@scope/pkg/sub`),
//! - exported symbols append their export name to their canonical parent
//!   (`@scope/pkg.Options`),
//! - enum members append their name to their enum (`@scope/pkg.Color.Red`),
//! - everything else is rendered inline beneath the first placed symbol that
//!   references it (`@scope/pkg.createClient~Internal`).
//!
//! Placement runs in rounds until nothing new can be placed, so chains of
//! inline symbols resolve in any discovery order. Each round's candidates
//! are made unique with `-1`, `-2`, ... suffixes before the next round builds
//! on them.

use crate::document::CanonicalExportLocation;
use crate::ids::SymbolId;
use crate::serialized::SerializedSymbol;
use crate::walker::SymbolGraph;
use apigraph_common::limits::MAX_PLACEMENT_ROUNDS;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Identifiers {
    pub good_identifiers: BTreeMap<SymbolId, String>,
    /// Owner → symbols placed inline beneath it, in placement order.
    pub symbols_for_inner_bit: BTreeMap<SymbolId, Vec<SymbolId>>,
}

pub struct IdentifierAllocator<'a> {
    graph: &'a SymbolGraph,
    canonical: &'a BTreeMap<SymbolId, CanonicalExportLocation>,
}

impl<'a> IdentifierAllocator<'a> {
    pub fn new(graph: &'a SymbolGraph, canonical: &'a BTreeMap<SymbolId, CanonicalExportLocation>) -> Self {
        IdentifierAllocator { graph, canonical }
    }

    pub fn allocate(&self) -> Identifiers {
        let mut placed: FxHashMap<&SymbolId, String> = FxHashMap::default();
        let mut taken: FxHashSet<String> = FxHashSet::default();
        for root in &self.graph.roots {
            taken.insert(root.specifier.clone());
            placed.insert(&root.id, root.specifier.clone());
        }

        let enum_of: FxHashMap<&SymbolId, &SymbolId> = self
            .graph
            .symbols
            .iter()
            .filter_map(|(id, symbol)| match symbol {
                SerializedSymbol::Enum { members, .. } => Some(members.iter().map(move |member| (member, id))),
                _ => None,
            })
            .flatten()
            .collect();

        let mut pending: Vec<&SymbolId> = self
            .graph
            .symbols
            .keys()
            .filter(|id| !placed.contains_key(id))
            .collect();
        let mut inner: BTreeMap<SymbolId, Vec<SymbolId>> = BTreeMap::new();

        let mut rounds = 0;
        while !pending.is_empty() {
            if rounds == MAX_PLACEMENT_ROUNDS {
                warn!(remaining = pending.len(), "identifier placement did not settle");
                break;
            }
            rounds += 1;

            let mut candidates: Vec<(&SymbolId, String)> = Vec::new();
            let mut owners: FxHashMap<&SymbolId, &SymbolId> = FxHashMap::default();
            for &id in &pending {
                if let Some(location) = self.canonical.get(id) {
                    if let Some(parent) = placed.get(&location.parent) {
                        candidates.push((id, format!("{parent}.{}", location.export_name)));
                    }
                    continue;
                }
                if let Some(&owner) = enum_of.get(id) {
                    if let Some(parent) = placed.get(owner) {
                        candidates.push((id, format!("{parent}.{}", self.name_of(id))));
                    }
                    continue;
                }
                let owner = self
                    .graph
                    .references
                    .get(id)
                    .and_then(|referencers| referencers.iter().find(|referencer| placed.contains_key(referencer)));
                if let Some(owner) = owner {
                    candidates.push((id, format!("{}~{}", placed[owner], self.name_of(id))));
                    owners.insert(id, owner);
                }
            }
            if candidates.is_empty() {
                break;
            }

            // Owners are final before their children are named, so a
            // suffixed owner passes its suffix down.
            for (id, identifier) in make_unique(&mut taken, candidates) {
                trace!(symbol = %id, identifier = %identifier, "placed identifier");
                if let Some(owner) = owners.get(id) {
                    inner.entry((*owner).clone()).or_default().push(id.clone());
                }
                placed.insert(id, identifier);
            }
            pending.retain(|id| !placed.contains_key(id));
        }

        let leftovers: Vec<(&SymbolId, String)> = pending
            .into_iter()
            .map(|id| {
                trace!(symbol = %id, "unplaced symbol uses its bare name");
                (id, self.name_of(id).to_string())
            })
            .collect();
        placed.extend(make_unique(&mut taken, leftovers));
        debug!(symbols = placed.len(), rounds, "allocated identifiers");

        Identifiers {
            good_identifiers: placed.into_iter().map(|(id, identifier)| (id.clone(), identifier)).collect(),
            symbols_for_inner_bit: inner,
        }
    }

    fn name_of(&self, id: &SymbolId) -> &'a str {
        self.graph.symbols.get(id).map_or("", SerializedSymbol::name)
    }
}

/// Keep the first holder of each free candidate in (candidate, id) order,
/// then suffix the rest with the smallest free `-n`. Every identifier handed
/// out is added to `taken`.
fn make_unique<'i>(taken: &mut FxHashSet<String>, mut candidates: Vec<(&'i SymbolId, String)>) -> Vec<(&'i SymbolId, String)> {
    candidates.sort_by(|(a_id, a), (b_id, b)| (a, a_id).cmp(&(b, b_id)));

    let mut unique = Vec::with_capacity(candidates.len());
    let mut duplicates = Vec::new();
    for (id, candidate) in candidates {
        if taken.insert(candidate.clone()) {
            unique.push((id, candidate));
        } else {
            duplicates.push((id, candidate));
        }
    }
    for (id, candidate) in duplicates {
        let mut suffix = 1u32;
        let identifier = loop {
            let attempt = format!("{candidate}-{suffix}");
            if !taken.contains(&attempt) {
                break attempt;
            }
            suffix += 1;
        };
        taken.insert(identifier.clone());
        unique.push((id, identifier));
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_get_the_smallest_free_suffix() {
        let a = SymbolId::new("a.ts:10");
        let b = SymbolId::new("b.ts:10");
        let c = SymbolId::new("c.ts:10");
        let d = SymbolId::new("d.ts:10");
        let candidates = vec![
            (&d, "pkg~Options".to_string()),
            (&b, "pkg~Options".to_string()),
            (&c, "pkg~Options-1".to_string()),
            (&a, "pkg~Options".to_string()),
        ];

        let mut taken = FxHashSet::default();
        let unique: FxHashMap<&SymbolId, String> = make_unique(&mut taken, candidates).into_iter().collect();
        assert_eq!(unique[&a], "pkg~Options");
        assert_eq!(unique[&c], "pkg~Options-1");
        assert_eq!(unique[&b], "pkg~Options-2");
        assert_eq!(unique[&d], "pkg~Options-3");
        assert_eq!(taken.len(), 4);
    }

    #[test]
    fn identifiers_taken_in_earlier_rounds_stay_reserved() {
        let a = SymbolId::new("a.ts:10");
        let mut taken: FxHashSet<String> = ["pkg.Options".to_string()].into_iter().collect();
        let unique = make_unique(&mut taken, vec![(&a, "pkg.Options".to_string())]);
        assert_eq!(unique, vec![(&a, "pkg.Options-1".to_string())]);
    }
}
