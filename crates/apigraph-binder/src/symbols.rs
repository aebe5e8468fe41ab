//! Symbols, symbol flags and symbol tables.

use apigraph_syntax::ast::DeclIndex;
use bitflags::bitflags;
use indexmap::IndexMap;
use smallvec::SmallVec;

/// Index of a file in [`crate::Program::files`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

/// Handle to a symbol in the program's [`SymbolArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolRef(pub u32);

/// A place that declares a symbol.
///
/// File modules are declared by their source file; everything else by one
/// declaration inside a file. Scopes are keyed the same way: a file, or the
/// namespace declaration whose body introduces the scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclSite {
    SourceFile(FileId),
    Declaration(FileId, DeclIndex),
}

impl DeclSite {
    pub fn file(self) -> FileId {
        match self {
            DeclSite::SourceFile(file) | DeclSite::Declaration(file, _) => file,
        }
    }

    pub fn decl(self) -> Option<DeclIndex> {
        match self {
            DeclSite::SourceFile(_) => None,
            DeclSite::Declaration(_, decl) => Some(decl),
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SymbolFlags: u32 {
        const FUNCTION = 1 << 0;
        const VARIABLE = 1 << 1;
        const TYPE_ALIAS = 1 << 2;
        const INTERFACE = 1 << 3;
        const CLASS = 1 << 4;
        const ENUM = 1 << 5;
        const ENUM_MEMBER = 1 << 6;
        /// `namespace N {}`
        const NAMESPACE = 1 << 7;
        /// `declare module "m" {}`
        const AMBIENT_MODULE = 1 << 8;
        /// An external module file.
        const SOURCE_FILE = 1 << 9;
        /// An import binding; see [`Symbol::alias`].
        const ALIAS = 1 << 10;

        const MODULE = Self::NAMESPACE.bits() | Self::AMBIENT_MODULE.bits() | Self::SOURCE_FILE.bits();
        const TYPE = Self::TYPE_ALIAS.bits() | Self::INTERFACE.bits() | Self::CLASS.bits() | Self::ENUM.bits();
        const VALUE = Self::FUNCTION.bits() | Self::VARIABLE.bits() | Self::CLASS.bits() | Self::ENUM.bits() | Self::ENUM_MEMBER.bits();
    }
}

/// What an import binding refers to before resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AliasTarget {
    /// `import { name } from "m"`; default imports use the name `default`.
    Export { specifier: String, name: String },
    /// `import * as ns from "m"`
    Namespace { specifier: String },
    /// `import x = require("m")`
    Require { specifier: String },
    /// `import x = a.b.c`
    Entity(Vec<String>),
}

#[derive(Clone, Debug)]
pub struct Alias {
    pub target: AliasTarget,
    /// Scope the binding was declared in.
    pub scope: DeclSite,
}

/// Name → symbol in insertion order.
pub type SymbolTable = IndexMap<String, SymbolRef>;

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub flags: SymbolFlags,
    /// Declaration sites in binding order. Empty only for aliases.
    pub declarations: SmallVec<[DeclSite; 2]>,
    /// Enclosing module, namespace or enum.
    pub parent: Option<SymbolRef>,
    /// Exported members of a namespace or ambient module; members of an enum.
    pub members: SymbolTable,
    pub alias: Option<Alias>,
}

impl Symbol {
    pub fn is_module_like(&self) -> bool {
        self.flags.intersects(SymbolFlags::MODULE)
    }

    pub fn is_alias(&self) -> bool {
        self.alias.is_some()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> Self {
        SymbolArena::default()
    }

    pub fn alloc(&mut self, flags: SymbolFlags, name: String) -> SymbolRef {
        let id = SymbolRef(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name,
            flags,
            declarations: SmallVec::new(),
            parent: None,
            members: SymbolTable::default(),
            alias: None,
        });
        id
    }

    pub fn get(&self, id: SymbolRef) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: SymbolRef) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolRef, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| (SymbolRef(index as u32), symbol))
    }
}

impl std::ops::Index<SymbolRef> for SymbolArena {
    type Output = Symbol;

    fn index(&self, id: SymbolRef) -> &Symbol {
        &self.symbols[id.0 as usize]
    }
}

impl std::ops::IndexMut<SymbolRef> for SymbolArena {
    fn index_mut(&mut self, id: SymbolRef) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_flags_cover_every_module_kind() {
        for flag in [SymbolFlags::NAMESPACE, SymbolFlags::AMBIENT_MODULE, SymbolFlags::SOURCE_FILE] {
            assert!(SymbolFlags::MODULE.contains(flag));
        }
        assert!(!SymbolFlags::MODULE.intersects(SymbolFlags::CLASS | SymbolFlags::ALIAS));
    }

    #[test]
    fn arena_allocates_sequential_handles() {
        let mut arena = SymbolArena::new();
        let a = arena.alloc(SymbolFlags::INTERFACE, "A".to_string());
        let b = arena.alloc(SymbolFlags::CLASS, "B".to_string());
        assert_eq!((a, b), (SymbolRef(0), SymbolRef(1)));
        assert_eq!(arena.get(b).map(|symbol| symbol.name.as_str()), Some("B"));
        assert!(arena.get(SymbolRef(2)).is_none());
        assert_eq!(arena.iter().count(), 2);
    }
}
