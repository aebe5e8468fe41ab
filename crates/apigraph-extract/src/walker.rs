//! Breadth-first closure over the symbols reachable from the entrypoints.
//!
//! The walker owns all traversal state. Serializing a symbol references
//! others (type references, module exports, enum members); each referenced
//! package symbol is enqueued once and serialized once, and every reference
//! is recorded in the reverse index under the symbol being serialized.
//! Symbols declared outside the package are recorded but never walked.

use crate::error::ExtractError;
use crate::external::ExternalSymbol;
use crate::ids::{SymbolId, site_offset, symbol_id};
use crate::serialized::SerializedSymbol;
use apigraph_binder::{FileId, Program, Resolution, SymbolRef};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// An entrypoint module of the walk.
#[derive(Clone, Debug)]
pub struct RootModule {
    pub specifier: String,
    pub symbol: SymbolRef,
    pub id: SymbolId,
}

/// Everything the walk discovered, in discovery order.
#[derive(Debug, Default)]
pub struct SymbolGraph {
    pub roots: Vec<RootModule>,
    pub symbols: IndexMap<SymbolId, SerializedSymbol>,
    pub handles: IndexMap<SymbolId, SymbolRef>,
    /// Referenced symbol → referencing symbols, in first-reference order.
    pub references: IndexMap<SymbolId, IndexSet<SymbolId>>,
    pub externals: IndexMap<SymbolId, ExternalSymbol>,
}

#[derive(Debug, Default)]
pub(crate) struct WalkState {
    queue: VecDeque<SymbolRef>,
    enqueued: FxHashSet<SymbolRef>,
    visited: IndexMap<SymbolId, SerializedSymbol>,
    handles: IndexMap<SymbolId, SymbolRef>,
    references: IndexMap<SymbolId, IndexSet<SymbolId>>,
    /// Symbol being serialized; the source of every recorded reference.
    current: Option<SymbolId>,
    externals: IndexMap<SymbolId, ExternalSymbol>,
    ids: FxHashMap<SymbolRef, SymbolId>,
}

pub struct Extractor<'p> {
    pub(crate) program: &'p Program,
    pub(crate) max_type_depth: u32,
    state: WalkState,
}

impl<'p> Extractor<'p> {
    pub fn new(program: &'p Program, max_type_depth: u32) -> Self {
        Extractor {
            program,
            max_type_depth,
            state: WalkState::default(),
        }
    }

    /// Walk from the given entrypoint files until the queue drains.
    #[tracing::instrument(level = "debug", skip_all, fields(entrypoints = entrypoints.len()))]
    pub fn walk(mut self, entrypoints: &[(String, FileId)]) -> Result<SymbolGraph, ExtractError> {
        if entrypoints.is_empty() {
            return Err(ExtractError::NoEntrypoints);
        }

        let mut roots: Vec<RootModule> = Vec::with_capacity(entrypoints.len());
        for (specifier, file) in entrypoints {
            let Some(symbol) = self.program.module_symbol(*file) else {
                return Err(ExtractError::EntrypointNotModule {
                    specifier: specifier.clone(),
                    path: self.program.relative_path(*file).to_string(),
                });
            };
            let id = self.id_of(symbol);
            if roots.iter().any(|root| root.id == id) {
                trace!(specifier = %specifier, "entrypoint shares its module with an earlier one");
                continue;
            }
            self.enqueue(symbol);
            roots.push(RootModule {
                specifier: specifier.clone(),
                symbol,
                id,
            });
        }

        while let Some(symbol) = self.state.queue.pop_front() {
            let id = self.id_of(symbol);
            if self.state.visited.contains_key(&id) {
                continue;
            }
            self.state.current = Some(id.clone());
            let serialized = self.serialize_symbol(symbol)?;
            self.state.current = None;
            debug!(symbol = %id, kind = serialized.kind_name(), "serialized symbol");
            self.state.handles.insert(id.clone(), symbol);
            self.state.visited.insert(id, serialized);
        }

        debug!(
            symbols = self.state.visited.len(),
            externals = self.state.externals.len(),
            "walk complete"
        );
        Ok(SymbolGraph {
            roots,
            symbols: self.state.visited,
            handles: self.state.handles,
            references: self.state.references,
            externals: self.state.externals,
        })
    }

    pub(crate) fn id_of(&mut self, symbol: SymbolRef) -> SymbolId {
        if let Some(id) = self.state.ids.get(&symbol) {
            return id.clone();
        }
        let id = symbol_id(self.program, symbol);
        self.state.ids.insert(symbol, id.clone());
        id
    }

    /// A symbol belongs to the package when every declaration does; anything
    /// straddling the boundary is treated as external.
    pub(crate) fn is_internal(&self, symbol: SymbolRef) -> bool {
        let declarations = &self.program.symbol(symbol).declarations;
        !declarations.is_empty() && declarations.iter().all(|site| self.program.is_internal(site.file()))
    }

    fn enqueue(&mut self, symbol: SymbolRef) {
        if self.state.enqueued.insert(symbol) {
            self.state.queue.push_back(symbol);
        }
    }

    fn record_reference(&mut self, target: &SymbolId) {
        let Some(current) = &self.state.current else {
            return;
        };
        if current == target {
            return;
        }
        self.state
            .references
            .entry(target.clone())
            .or_default()
            .insert(current.clone());
    }

    /// Reference a bound symbol from the symbol being serialized.
    pub(crate) fn reference_symbol(&mut self, symbol: SymbolRef) -> SymbolId {
        if self.program.symbol(symbol).is_alias() {
            if let Some(resolution) = self.program.resolve_alias(symbol) {
                if resolution != Resolution::Symbol(symbol) {
                    return self.reference_resolution(&resolution);
                }
            }
            let name = self.program.symbol(symbol).name.clone();
            return self.reference_global(&name);
        }

        let id = self.id_of(symbol);
        self.record_reference(&id);
        if self.is_internal(symbol) {
            self.enqueue(symbol);
        } else if !self.state.externals.contains_key(&id) {
            let program = self.program;
            let entry = program.symbol(symbol);
            trace!(symbol = %id, "recording external symbol");
            let sites = entry
                .declarations
                .iter()
                .map(|site| (program.file(site.file()).path.clone(), site_offset(program, *site)))
                .collect();
            self.state.externals.insert(
                id.clone(),
                ExternalSymbol {
                    id: id.clone(),
                    name: entry.name.clone(),
                    sites,
                    specifier: None,
                },
            );
        }
        id
    }

    pub(crate) fn reference_resolution(&mut self, resolution: &Resolution) -> SymbolId {
        match resolution {
            Resolution::Symbol(symbol) => self.reference_symbol(*symbol),
            Resolution::Unresolved { specifier, name } => {
                let id = SymbolId::unresolved(specifier, name);
                self.record_reference(&id);
                let display = if name.is_empty() { specifier } else { name };
                self.state.externals.entry(id.clone()).or_insert_with(|| ExternalSymbol {
                    id: id.clone(),
                    name: display.clone(),
                    sites: Vec::new(),
                    specifier: Some(specifier.clone()),
                });
                id
            }
        }
    }

    /// A name with no declaration in the program, such as a library global.
    pub(crate) fn reference_global(&mut self, name: &str) -> SymbolId {
        let id = SymbolId::global(name);
        self.record_reference(&id);
        self.state.externals.entry(id.clone()).or_insert_with(|| ExternalSymbol {
            id: id.clone(),
            name: name.to_string(),
            sites: Vec::new(),
            specifier: None,
        });
        id
    }
}
