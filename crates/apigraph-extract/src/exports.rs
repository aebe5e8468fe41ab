//! Canonical export locations.
//!
//! A symbol re-exported from several modules is rendered in full at one of
//! them. Starting at the entrypoint modules, every export table reachable
//! through module-like exports is scanned; each accessible target collects
//! the sites exporting it, and the best site wins:
//!
//! 1. a site in a file or ambient module beats a site inside a namespace,
//! 2. then the parent declared in the shorter file path,
//! 3. then the site seen first.

use crate::document::CanonicalExportLocation;
use crate::ids::{SymbolId, symbol_id};
use crate::serialized::SerializedSymbol;
use crate::walker::SymbolGraph;
use apigraph_binder::{Program, Resolution, SymbolFlags, SymbolRef};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, VecDeque};
use tracing::trace;

#[derive(Clone, Debug)]
struct Candidate {
    location: CanonicalExportLocation,
    module_level: bool,
    path_len: usize,
    order: usize,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        (!self.module_level, self.path_len, self.order) < (!other.module_level, other.path_len, other.order)
    }
}

pub struct ExportResolver<'a> {
    program: &'a Program,
    graph: &'a SymbolGraph,
}

impl<'a> ExportResolver<'a> {
    pub fn new(program: &'a Program, graph: &'a SymbolGraph) -> Self {
        ExportResolver { program, graph }
    }

    /// Best export site of every accessible non-root symbol that is exported
    /// anywhere below the entrypoints.
    pub fn resolve(&self) -> BTreeMap<SymbolId, CanonicalExportLocation> {
        let roots: FxHashSet<&SymbolId> = self.graph.roots.iter().map(|root| &root.id).collect();
        let mut best: FxHashMap<SymbolId, Candidate> = FxHashMap::default();
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        let mut queue: VecDeque<SymbolId> = self.graph.roots.iter().map(|root| root.id.clone()).collect();
        let mut order = 0usize;

        while let Some(parent) = queue.pop_front() {
            if !visited.insert(parent.clone()) {
                continue;
            }
            let Some(handle) = self.graph.handles.get(&parent).copied() else {
                continue;
            };
            let parent_flags = self.program.symbol(handle).flags;
            let module_level = parent_flags.intersects(SymbolFlags::SOURCE_FILE | SymbolFlags::AMBIENT_MODULE);
            let path_len = self.declaring_path(handle).chars().count();

            for (export_name, target) in self.exports_of(&parent, handle) {
                if roots.contains(&target) {
                    continue;
                }
                let Some(target_handle) = self.graph.handles.get(&target).copied() else {
                    continue;
                };
                let candidate = Candidate {
                    location: CanonicalExportLocation {
                        export_name,
                        parent: parent.clone(),
                    },
                    module_level,
                    path_len,
                    order,
                };
                order += 1;
                match best.get(&target) {
                    Some(current) if !candidate.beats(current) => {}
                    _ => {
                        trace!(
                            symbol = %target,
                            parent = %candidate.location.parent,
                            export_name = %candidate.location.export_name,
                            "canonical export candidate"
                        );
                        best.insert(target.clone(), candidate);
                    }
                }
                if self.program.symbol(target_handle).is_module_like() && !visited.contains(&target) {
                    queue.push_back(target);
                }
            }
        }

        best.into_iter()
            .map(|(symbol, candidate)| (symbol, candidate.location))
            .collect()
    }

    fn declaring_path(&self, symbol: SymbolRef) -> &'a str {
        self.program
            .symbol(symbol)
            .declarations
            .first()
            .map_or("", |site| self.program.relative_path(site.file()))
    }

    /// Export name → target id. Modules carry their serialized export map;
    /// namespaces merged into a class, function or enum are read from the
    /// binder's export table.
    fn exports_of(&self, id: &SymbolId, handle: SymbolRef) -> Vec<(String, SymbolId)> {
        if let Some(SerializedSymbol::Module { exports, .. }) = self.graph.symbols.get(id) {
            return exports
                .iter()
                .map(|(name, target)| (name.clone(), target.clone()))
                .collect();
        }
        if !self.program.symbol(handle).is_module_like() {
            return Vec::new();
        }
        self.program
            .exports_of(handle)
            .iter()
            .filter_map(|(name, resolution)| match resolution {
                Resolution::Symbol(symbol) => Some((name.clone(), self.resolved_id(*symbol)?)),
                Resolution::Unresolved { .. } => None,
            })
            .collect()
    }

    fn resolved_id(&self, symbol: SymbolRef) -> Option<SymbolId> {
        if !self.program.symbol(symbol).is_alias() {
            return Some(symbol_id(self.program, symbol));
        }
        match self.program.resolve_alias(symbol)? {
            Resolution::Symbol(target) if !self.program.symbol(target).is_alias() => {
                Some(symbol_id(self.program, target))
            }
            _ => None,
        }
    }
}
