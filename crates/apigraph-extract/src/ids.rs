//! Stable symbol identifiers derived from declaration sites.
//!
//! A declaration site renders as `<package-relative path>:<offset>`, where the
//! offset is the start of the declaration's name (`0` for a file module).
//! Merged symbols join their sorted sites with `+`, so the id only depends on
//! which declarations make up the symbol.

use apigraph_binder::{DeclSite, Program, SymbolRef};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(String);

impl SymbolId {
    pub fn new(id: impl Into<String>) -> Self {
        SymbolId(id.into())
    }

    /// A library global with no declaration in the program.
    pub fn global(name: &str) -> Self {
        SymbolId(format!("global:{name}"))
    }

    /// A name imported from a module specifier that did not resolve.
    pub fn unresolved(specifier: &str, name: &str) -> Self {
        SymbolId(format!("unresolved:{specifier}#{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `(path, offset)` of every declaration site of `symbol`, sorted.
pub fn declaration_sites(program: &Program, symbol: SymbolRef) -> Vec<(&str, u32)> {
    let mut sites: Vec<(&str, u32)> = program
        .symbol(symbol)
        .declarations
        .iter()
        .map(|site| (program.relative_path(site.file()), site_offset(program, *site)))
        .collect();
    sites.sort_unstable();
    sites.dedup();
    sites
}

pub(crate) fn site_offset(program: &Program, site: DeclSite) -> u32 {
    program.declaration(site).map_or(0, |decl| decl.name.span.start)
}

pub fn symbol_id(program: &Program, symbol: SymbolRef) -> SymbolId {
    format_sites(declaration_sites(program, symbol).into_iter())
}

pub(crate) fn format_sites<'s>(sites: impl Iterator<Item = (&'s str, u32)>) -> SymbolId {
    let rendered: Vec<String> = sites.map(|(path, offset)| format!("{path}:{offset}")).collect();
    SymbolId(rendered.join("+"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sites_join_with_plus() {
        let id = format_sites([("a.ts", 3), ("b.ts", 10)].into_iter());
        assert_eq!(id.as_str(), "a.ts:3+b.ts:10");
        assert_eq!(SymbolId::global("Promise").as_str(), "global:Promise");
        assert_eq!(SymbolId::unresolved("pkg", "a.B").as_str(), "unresolved:pkg#a.B");
    }
}
