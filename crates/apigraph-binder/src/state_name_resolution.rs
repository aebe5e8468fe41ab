//! Lexical name lookup and qualified-name resolution.

use crate::program::{Program, Resolution};
use crate::symbols::{DeclSite, FileId, SymbolFlags, SymbolRef};
use apigraph_common::limits::MAX_ALIAS_RESOLUTION_DEPTH;
use apigraph_syntax::ast::{DeclIndex, DeclarationKind, ModuleNameKind};
use tracing::trace;

/// Append a member name to the dotted path of an unresolved import.
pub fn qualify(path: &str, member: &str) -> String {
    if path.is_empty() {
        member.to_string()
    } else {
        format!("{path}.{member}")
    }
}

impl Program {
    /// Scope in which names written inside a declaration are looked up: the
    /// nearest enclosing namespace body, else the file.
    pub fn scope_of(&self, file: FileId, decl: DeclIndex) -> DeclSite {
        let source = &self.file(file).source;
        let mut current = source.decl(decl).parent;
        while let Some(index) = current {
            if matches!(source.decl(index).kind, DeclarationKind::Module(_)) {
                return DeclSite::Declaration(file, index);
            }
            current = source.decl(index).parent;
        }
        DeclSite::SourceFile(file)
    }

    /// Find the binding `name` refers to from `scope`, walking out through
    /// enclosing namespaces to the file and then the global scope. Aliases
    /// are returned unresolved.
    pub fn lookup_name(&self, scope: DeclSite, name: &str) -> Option<SymbolRef> {
        let file = scope.file();
        let source = &self.file(file).source;

        let mut current = scope.decl();
        while let Some(index) = current {
            let decl = source.decl(index);
            if let DeclarationKind::Module(module) = &decl.kind {
                if module.name_kind != ModuleNameKind::Global {
                    let site = DeclSite::Declaration(file, index);
                    if let Some(symbol) = self.scopes.locals.get(&site).and_then(|locals| locals.get(name)) {
                        return Some(*symbol);
                    }
                    // Exported members of other bodies of a merged namespace.
                    if let Some(member) = self
                        .symbol_of_declaration(file, index)
                        .and_then(|namespace| self.symbol(namespace).members.get(name))
                    {
                        return Some(*member);
                    }
                }
            }
            current = decl.parent;
        }

        self.scopes
            .locals
            .get(&DeclSite::SourceFile(file))
            .and_then(|locals| locals.get(name))
            .or_else(|| self.scopes.globals.get(name))
            .copied()
    }

    /// Global-scope symbol named `name`.
    pub fn resolve_global(&self, name: &str) -> Option<SymbolRef> {
        self.scopes.globals.get(name).copied()
    }

    /// Resolve a dotted name such as `ns.Inner.Type` written in `scope`.
    pub fn resolve_entity(&self, scope: DeclSite, parts: &[&str]) -> Option<Resolution> {
        self.resolve_entity_at_depth(scope, parts, 0)
    }

    pub(crate) fn resolve_entity_at_depth(&self, scope: DeclSite, parts: &[&str], depth: u32) -> Option<Resolution> {
        if depth >= MAX_ALIAS_RESOLUTION_DEPTH {
            return None;
        }
        let (first, rest) = parts.split_first()?;
        let symbol = self.lookup_name(scope, first)?;
        let mut current = self.resolve_alias_at_depth(symbol, depth)?;
        for part in rest {
            current = match current {
                Resolution::Symbol(symbol) => self.member_of(symbol, part)?,
                Resolution::Unresolved { specifier, name } => Resolution::Unresolved {
                    name: qualify(&name, part),
                    specifier,
                },
            };
        }
        Some(current)
    }

    /// Member `name` of a module, namespace or enum symbol.
    pub fn member_of(&self, symbol: SymbolRef, name: &str) -> Option<Resolution> {
        let target = self.symbol(symbol);
        if target.is_module_like() {
            if let Some(resolution) = self.lookup_export(&self.exports_of(symbol), name) {
                return Some(resolution);
            }
        }
        if target.flags.contains(SymbolFlags::ENUM) {
            if let Some(member) = target.members.get(name) {
                return Some(Resolution::Symbol(*member));
            }
        }
        trace!(container = %target.name, member = name, "no such member");
        None
    }
}
