//! Program loading and the queries the extractor runs against it.
//!
//! A [`Program`] is an immutable snapshot: every file reachable from the
//! entrypoints is read through the [`SourceHost`], parsed, resolved and bound
//! once in [`Program::load`]. Module export tables are computed on first use
//! and cached.

use crate::host::SourceHost;
use crate::resolver::{ModuleResolver, is_declaration_file, is_relative_specifier};
use crate::symbols::{DeclSite, FileId, Symbol, SymbolArena, SymbolRef, SymbolTable};
use apigraph_common::Diagnostic;
use apigraph_common::diagnostics::{diagnostic_codes, format_message};
use apigraph_syntax::ast::{DeclIndex, Declaration, SourceFile, Statement, TypeNodeKind};
use apigraph_syntax::visit::walk_declaration_types;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("package root {0} does not exist")]
    RootNotFound(PathBuf),
    #[error("cannot resolve entrypoint '{entry}' under {root}")]
    EntrypointNotFound { entry: String, root: PathBuf },
    #[error("cannot read {0}")]
    Unreadable(PathBuf),
}

/// Target of a name after following aliases.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    Symbol(SymbolRef),
    /// A name imported from a module specifier that did not resolve. `name` is
    /// the dotted path below the module, empty for the module itself.
    Unresolved { specifier: String, name: String },
}

/// Export name → target, in declaration order.
pub type ExportTable = IndexMap<String, Resolution>;

/// Export table key for an `export =` assignment.
pub const EXPORT_EQUALS: &str = "export=";

#[derive(Debug)]
pub struct BoundFile {
    pub id: FileId,
    /// Canonical absolute path.
    pub path: PathBuf,
    pub source: SourceFile,
    pub is_declaration_file: bool,
    /// Inside the package root and not under a `node_modules` directory.
    pub is_internal: bool,
    /// Module symbol when the file is an external module.
    pub module_symbol: Option<SymbolRef>,
}

#[derive(Debug, Default)]
pub(crate) struct ScopeTables {
    /// Script file declarations and `declare global` blocks.
    pub(crate) globals: SymbolTable,
    /// Lexical locals of each file module and namespace body.
    pub(crate) locals: FxHashMap<DeclSite, SymbolTable>,
    /// Bodies whose declarations are exported without an `export` keyword.
    pub(crate) implicit_exports: FxHashSet<DeclSite>,
    pub(crate) ambient_modules: IndexMap<String, SymbolRef>,
    pub(crate) declaration_symbols: FxHashMap<(FileId, DeclIndex), SymbolRef>,
}

#[derive(Debug)]
pub struct Program {
    pub(crate) root: PathBuf,
    pub(crate) files: Vec<BoundFile>,
    pub(crate) file_ids: FxHashMap<PathBuf, FileId>,
    pub(crate) entrypoints: Vec<FileId>,
    /// File each `(importing file, specifier)` pair resolved to.
    pub(crate) resolved_modules: FxHashMap<(FileId, String), FileId>,
    pub(crate) symbols: SymbolArena,
    pub(crate) scopes: ScopeTables,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) export_tables: RefCell<FxHashMap<SymbolRef, Arc<ExportTable>>>,
    pub(crate) exports_in_progress: RefCell<FxHashSet<SymbolRef>>,
}

impl Program {
    /// Load every file reachable from `entrypoints` (paths relative to `root`).
    #[tracing::instrument(level = "debug", skip_all, fields(root = %root.display()))]
    pub fn load(host: &dyn SourceHost, root: &Path, entrypoints: &[String]) -> Result<Program, ProgramError> {
        if !host.directory_exists(root) {
            return Err(ProgramError::RootNotFound(root.to_path_buf()));
        }
        let root = host.canonicalize(root);
        let resolver = ModuleResolver::new(host);

        let mut program = Program {
            root,
            files: Vec::new(),
            file_ids: FxHashMap::default(),
            entrypoints: Vec::new(),
            resolved_modules: FxHashMap::default(),
            symbols: SymbolArena::new(),
            scopes: ScopeTables::default(),
            diagnostics: Vec::new(),
            export_tables: RefCell::new(FxHashMap::default()),
            exports_in_progress: RefCell::new(FxHashSet::default()),
        };

        let mut queue = VecDeque::new();
        for entry in entrypoints {
            let path = resolver
                .resolve_entry(&program.root, entry)
                .ok_or_else(|| ProgramError::EntrypointNotFound {
                    entry: entry.clone(),
                    root: program.root.clone(),
                })?;
            let id = program
                .add_file(host, &path, &mut queue)
                .ok_or(ProgramError::Unreadable(path))?;
            program.entrypoints.push(id);
        }

        while let Some(file) = queue.pop_front() {
            let from = program.file(file).path.clone();
            for specifier in collect_module_specifiers(&program.file(file).source) {
                let key = (file, specifier);
                if program.resolved_modules.contains_key(&key) {
                    continue;
                }
                match resolver.resolve(&from, &key.1) {
                    Some(path) => {
                        if let Some(target) = program.add_file(host, &path, &mut queue) {
                            program.resolved_modules.insert(key, target);
                        }
                    }
                    None => {
                        // Bare specifiers may still name an ambient module.
                        if is_relative_specifier(&key.1) && program.file(file).is_internal {
                            let diagnostic = Diagnostic::warning(
                                program.file(file).source.file_name.clone(),
                                0,
                                0,
                                format_message("Cannot find module '{0}'.", &[key.1.as_str()]),
                                diagnostic_codes::CANNOT_FIND_MODULE,
                            );
                            program.diagnostics.push(diagnostic);
                        }
                    }
                }
            }
        }

        program.bind_all();
        debug!(
            files = program.files.len(),
            symbols = program.symbols.len(),
            "program loaded"
        );
        Ok(program)
    }

    fn add_file(&mut self, host: &dyn SourceHost, path: &Path, queue: &mut VecDeque<FileId>) -> Option<FileId> {
        if let Some(id) = self.file_ids.get(path) {
            return Some(*id);
        }
        let Some(text) = host.read_file(path) else {
            warn!(path = %path.display(), "resolved file could not be read");
            return None;
        };

        let id = FileId(self.files.len() as u32);
        let source = apigraph_syntax::parse(display_path(&self.root, path), text);
        debug!(
            file = %source.file_name,
            declarations = source.declarations.len(),
            diagnostics = source.diagnostics.len(),
            "parsed file"
        );
        self.files.push(BoundFile {
            id,
            path: path.to_path_buf(),
            source,
            is_declaration_file: is_declaration_file(path),
            is_internal: is_within_package(&self.root, path),
            module_symbol: None,
        });
        self.file_ids.insert(path.to_path_buf(), id);
        queue.push_back(id);
        Some(id)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[BoundFile] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> &BoundFile {
        &self.files[id.0 as usize]
    }

    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.file_ids.get(path).copied()
    }

    /// Entrypoint files in the order they were given to [`Program::load`].
    pub fn entrypoints(&self) -> &[FileId] {
        &self.entrypoints
    }

    pub fn symbols(&self) -> &SymbolArena {
        &self.symbols
    }

    pub fn symbol(&self, id: SymbolRef) -> &Symbol {
        &self.symbols[id]
    }

    pub fn declaration(&self, site: DeclSite) -> Option<&Declaration> {
        site.decl().map(|index| self.file(site.file()).source.decl(index))
    }

    pub fn module_symbol(&self, file: FileId) -> Option<SymbolRef> {
        self.file(file).module_symbol
    }

    pub fn symbol_of_declaration(&self, file: FileId, decl: DeclIndex) -> Option<SymbolRef> {
        self.scopes.declaration_symbols.get(&(file, decl)).copied()
    }

    pub fn globals(&self) -> &SymbolTable {
        &self.scopes.globals
    }

    pub fn ambient_module(&self, name: &str) -> Option<SymbolRef> {
        self.scopes.ambient_modules.get(name).copied()
    }

    pub fn is_internal(&self, file: FileId) -> bool {
        self.file(file).is_internal
    }

    /// Path of `file` relative to the package root, `/`-separated.
    pub fn relative_path(&self, file: FileId) -> &str {
        &self.file(file).source.file_name
    }

    /// Parse diagnostics of every file followed by load diagnostics.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files
            .iter()
            .flat_map(|file| file.source.diagnostics.iter())
            .chain(self.diagnostics.iter())
    }
}

/// Every module specifier a file mentions: imports, re-exports, import-equals
/// requires and `import("m")` types, in order of first appearance.
pub(crate) fn collect_module_specifiers(source: &SourceFile) -> Vec<String> {
    let mut specifiers = Vec::new();
    collect_statement_specifiers(source, &source.statements, &mut specifiers);
    for decl in &source.declarations {
        walk_declaration_types(decl, &mut |ty| {
            if let TypeNodeKind::Import { specifier, .. } = &ty.kind {
                specifiers.push(specifier.clone());
            }
        });
    }

    let mut seen = FxHashSet::default();
    specifiers.retain(|specifier| seen.insert(specifier.clone()));
    specifiers
}

fn collect_statement_specifiers(source: &SourceFile, statements: &[Statement], out: &mut Vec<String>) {
    use apigraph_syntax::ast::{DeclarationKind, ImportEqualsTarget};

    for statement in statements {
        match statement {
            Statement::Import(import) => out.push(import.module_specifier.clone()),
            Statement::ImportEquals(import) => {
                if let ImportEqualsTarget::External(specifier) = &import.target {
                    out.push(specifier.clone());
                }
            }
            Statement::Export(export) => {
                if let Some(specifier) = &export.module_specifier {
                    out.push(specifier.clone());
                }
            }
            Statement::ExportAll(export) => out.push(export.module_specifier.clone()),
            Statement::Declaration(index) => {
                if let DeclarationKind::Module(module) = &source.decl(*index).kind {
                    if let Some(body) = &module.body {
                        collect_statement_specifiers(source, body, out);
                    }
                }
            }
            Statement::ExportAssignment(_) | Statement::Unknown(_) => {}
        }
    }
}

/// `path` relative to `root` with `/` separators, or the full path when it
/// lies outside the root.
pub(crate) fn display_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().replace('\\', "/"),
    }
}

/// A file belongs to the package when it is under the root and not inside a
/// nested dependency. Paths that escape the root after canonicalization are
/// external.
pub(crate) fn is_within_package(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root).is_ok_and(|relative| {
        !relative
            .components()
            .any(|component| matches!(component, Component::Normal(name) if name == "node_modules"))
    })
}
