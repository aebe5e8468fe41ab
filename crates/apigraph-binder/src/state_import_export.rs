//! Module export tables and import alias resolution.
//!
//! A module's export table lists, in order: its own exported declarations and
//! export statements, then names from each `export *` source not already
//! present (local exports win, `default` is never star-exported), then the
//! members of an `export =` namespace target. Tables are computed on first
//! request; a module reached again while its own table is being computed
//! contributes nothing, which terminates `export *` cycles.

use crate::program::{EXPORT_EQUALS, ExportTable, Program, Resolution};
use crate::resolver::is_relative_specifier;
use crate::symbols::{AliasTarget, DeclSite, FileId, SymbolRef};
use apigraph_common::limits::MAX_ALIAS_RESOLUTION_DEPTH;
use apigraph_syntax::ast::{DeclarationKind, ModuleNameKind, Statement};
use std::path::Path;
use std::sync::Arc;
use tracing::{Level, debug, span, trace, warn};

impl Program {
    /// Module symbol a specifier written in `from` refers to. Bare specifiers
    /// prefer a matching `declare module` over files.
    pub fn resolve_module(&self, from: FileId, specifier: &str) -> Option<SymbolRef> {
        if !is_relative_specifier(specifier) && !Path::new(specifier).is_absolute() {
            if let Some(module) = self.scopes.ambient_modules.get(specifier) {
                return Some(*module);
            }
        }
        let target = self.resolved_modules.get(&(from, specifier.to_string()))?;
        self.file(*target).module_symbol
    }

    /// Export table of a file module, ambient module or namespace.
    pub fn exports_of(&self, module: SymbolRef) -> Arc<ExportTable> {
        if let Some(table) = self.export_tables.borrow().get(&module) {
            return Arc::clone(table);
        }
        if !self.exports_in_progress.borrow_mut().insert(module) {
            trace!(module = %self.symbol(module).name, "export cycle");
            return Arc::new(ExportTable::default());
        }

        let table = Arc::new(self.compute_exports(module));
        self.exports_in_progress.borrow_mut().remove(&module);
        self.export_tables.borrow_mut().insert(module, Arc::clone(&table));
        table
    }

    /// Look up `name` in an export table; `default` falls back to `export =`.
    pub fn lookup_export(&self, exports: &ExportTable, name: &str) -> Option<Resolution> {
        exports.get(name).cloned().or_else(|| {
            if name == "default" {
                exports.get(EXPORT_EQUALS).cloned()
            } else {
                None
            }
        })
    }

    /// What `import * as ns` or `import ns = require()` binds for a module.
    pub fn module_value(&self, module: SymbolRef) -> Resolution {
        self.exports_of(module)
            .get(EXPORT_EQUALS)
            .cloned()
            .unwrap_or(Resolution::Symbol(module))
    }

    fn compute_exports(&self, module: SymbolRef) -> ExportTable {
        let _span = span!(Level::DEBUG, "compute_exports", module = %self.symbol(module).name).entered();

        let mut table = ExportTable::default();
        let mut stars: Vec<(FileId, &str)> = Vec::new();
        let mut export_equals = None;

        for site in &self.symbol(module).declarations {
            let file = site.file();
            let source = &self.file(file).source;
            let statements = match *site {
                DeclSite::SourceFile(_) => &source.statements,
                DeclSite::Declaration(_, index) => match &source.decl(index).kind {
                    DeclarationKind::Module(declaration) => match &declaration.body {
                        Some(body) => body,
                        None => continue,
                    },
                    _ => continue,
                },
            };
            let implicit = self.scopes.implicit_exports.contains(site);

            for statement in statements {
                match statement {
                    Statement::Declaration(index) => {
                        let decl = source.decl(*index);
                        if let DeclarationKind::Module(declaration) = &decl.kind {
                            if declaration.name_kind != ModuleNameKind::Identifier {
                                continue;
                            }
                        }
                        if !(decl.is_exported() || implicit) {
                            continue;
                        }
                        let name = if decl.is_default_export() { "default" } else { decl.name.text.as_str() };
                        if let Some(symbol) = self.symbol_of_declaration(file, *index) {
                            table
                                .entry(name.to_string())
                                .or_insert(Resolution::Symbol(symbol));
                        }
                    }
                    Statement::ImportEquals(import) if import.is_export => {
                        if let Some(resolution) = self
                            .lookup_name(*site, &import.name.text)
                            .and_then(|alias| self.resolve_alias(alias))
                        {
                            table.insert(import.name.text.clone(), resolution);
                        }
                    }
                    Statement::Export(export) => match &export.module_specifier {
                        None => {
                            for specifier in &export.specifiers {
                                match self
                                    .lookup_name(*site, &specifier.local.text)
                                    .and_then(|symbol| self.resolve_alias(symbol))
                                {
                                    Some(resolution) => {
                                        table.insert(specifier.exported.text.clone(), resolution);
                                    }
                                    None => trace!(export_name = %specifier.local.text, "export of unknown local"),
                                }
                            }
                        }
                        Some(module_specifier) => match self.resolve_module(file, module_specifier) {
                            Some(target) => {
                                let exports = self.exports_of(target);
                                for specifier in &export.specifiers {
                                    match self.lookup_export(&exports, &specifier.local.text) {
                                        Some(resolution) => {
                                            table.insert(specifier.exported.text.clone(), resolution);
                                        }
                                        None => debug!(
                                            export_name = %specifier.local.text,
                                            from = %module_specifier,
                                            "re-export of missing member"
                                        ),
                                    }
                                }
                            }
                            None => {
                                for specifier in &export.specifiers {
                                    table.insert(
                                        specifier.exported.text.clone(),
                                        Resolution::Unresolved {
                                            specifier: module_specifier.clone(),
                                            name: specifier.local.text.clone(),
                                        },
                                    );
                                }
                            }
                        },
                    },
                    Statement::ExportAll(export_all) => match &export_all.alias {
                        Some(alias) => {
                            let resolution = match self.resolve_module(file, &export_all.module_specifier) {
                                Some(target) => Resolution::Symbol(target),
                                None => Resolution::Unresolved {
                                    specifier: export_all.module_specifier.clone(),
                                    name: String::new(),
                                },
                            };
                            table.insert(alias.text.clone(), resolution);
                        }
                        None => stars.push((file, export_all.module_specifier.as_str())),
                    },
                    Statement::ExportAssignment(assignment) => {
                        let parts: Vec<&str> = assignment.target.parts.iter().map(|part| part.text.as_str()).collect();
                        let Some(resolution) = self.resolve_entity(*site, &parts) else {
                            trace!(target = %assignment.target.text(), "unresolved export assignment");
                            continue;
                        };
                        if assignment.is_export_equals {
                            export_equals = Some(resolution.clone());
                            table.insert(EXPORT_EQUALS.to_string(), resolution);
                        } else {
                            table.insert("default".to_string(), resolution);
                        }
                    }
                    Statement::Import(_) | Statement::ImportEquals(_) | Statement::Unknown(_) => {}
                }
            }
        }

        for (file, specifier) in stars {
            let Some(target) = self.resolve_module(file, specifier) else {
                trace!(%specifier, "export * from unresolved module");
                continue;
            };
            for (name, resolution) in self.exports_of(target).iter() {
                if name == "default" || name == EXPORT_EQUALS {
                    continue;
                }
                table
                    .entry(name.clone())
                    .or_insert_with(|| resolution.clone());
            }
        }

        if let Some(Resolution::Symbol(target)) = export_equals {
            if target != module && self.symbol(target).is_module_like() {
                for (name, resolution) in self.exports_of(target).iter() {
                    if name != EXPORT_EQUALS {
                        table
                            .entry(name.clone())
                            .or_insert_with(|| resolution.clone());
                    }
                }
            }
        }

        table
    }

    /// Follow an import binding to the symbol it names. Non-alias symbols
    /// resolve to themselves.
    pub fn resolve_alias(&self, symbol: SymbolRef) -> Option<Resolution> {
        self.resolve_alias_at_depth(symbol, 0)
    }

    pub(crate) fn resolve_alias_at_depth(&self, symbol: SymbolRef, depth: u32) -> Option<Resolution> {
        let mut current = symbol;
        for step in depth..MAX_ALIAS_RESOLUTION_DEPTH {
            let Some(alias) = &self.symbol(current).alias else {
                return Some(Resolution::Symbol(current));
            };
            let file = alias.scope.file();
            let next = match &alias.target {
                AliasTarget::Export { specifier, name } => match self.resolve_module(file, specifier) {
                    Some(module) => self.lookup_export(&self.exports_of(module), name)?,
                    None => {
                        return Some(Resolution::Unresolved {
                            specifier: specifier.clone(),
                            name: name.clone(),
                        });
                    }
                },
                AliasTarget::Namespace { specifier } | AliasTarget::Require { specifier } => {
                    match self.resolve_module(file, specifier) {
                        Some(module) => self.module_value(module),
                        None => {
                            return Some(Resolution::Unresolved {
                                specifier: specifier.clone(),
                                name: String::new(),
                            });
                        }
                    }
                }
                AliasTarget::Entity(parts) => {
                    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                    return self.resolve_entity_at_depth(alias.scope, &parts, step + 1);
                }
            };
            match next {
                Resolution::Symbol(target) => current = target,
                unresolved => return Some(unresolved),
            }
        }
        warn!(symbol = %self.symbol(symbol).name, "alias chain exceeds resolution depth");
        None
    }
}
