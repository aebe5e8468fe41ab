//! Declaration binding: symbol creation, declaration merging and scopes.
//!
//! Declarations with the same name in the same scope merge into one symbol
//! (interfaces, namespaces, overloads, class + interface, function/class/enum
//! + namespace). Exported declarations of a namespace or ambient module also
//! merge across separate bodies through the container symbol's members.
//! Local declarations shadow import bindings of the same name.

use crate::program::{BoundFile, Program, ScopeTables};
use crate::symbols::{Alias, AliasTarget, DeclSite, FileId, SymbolArena, SymbolFlags, SymbolRef, SymbolTable};
use apigraph_syntax::ast::{
    DeclIndex, DeclarationKind, ImportDeclaration, ImportEqualsTarget, ModifierFlags, ModuleNameKind, Statement,
};
use tracing::{debug, trace};

/// Where declarations of one statement list are bound.
struct Container {
    scope: DeclSite,
    /// Module-like symbol collecting exported members.
    symbol: Option<SymbolRef>,
    /// Script files and `declare global` bind straight into the global scope.
    global: bool,
    implicit_export: bool,
    ambient: bool,
}

pub(crate) struct BinderState<'a> {
    files: &'a [BoundFile],
    symbols: &'a mut SymbolArena,
    scopes: &'a mut ScopeTables,
}

impl Program {
    pub(crate) fn bind_all(&mut self) {
        let module_symbols: Vec<Option<SymbolRef>> = {
            let mut binder = BinderState {
                files: &self.files,
                symbols: &mut self.symbols,
                scopes: &mut self.scopes,
            };
            (0..self.files.len())
                .map(|index| binder.bind_file(FileId(index as u32)))
                .collect()
        };
        for (file, module_symbol) in self.files.iter_mut().zip(module_symbols) {
            file.module_symbol = module_symbol;
        }
        debug!(
            symbols = self.symbols.len(),
            globals = self.scopes.globals.len(),
            ambient_modules = self.scopes.ambient_modules.len(),
            "bound program"
        );
    }
}

/// An explicit `export {}` list or export assignment turns off the implicit
/// exports of ambient bodies.
fn has_export_list(statements: &[Statement]) -> bool {
    statements
        .iter()
        .any(|statement| matches!(statement, Statement::Export(_) | Statement::ExportAssignment(_)))
}

fn flags_for_declaration(kind: &DeclarationKind) -> SymbolFlags {
    match kind {
        DeclarationKind::Function(_) => SymbolFlags::FUNCTION,
        DeclarationKind::Variable(_) => SymbolFlags::VARIABLE,
        DeclarationKind::TypeAlias(_) => SymbolFlags::TYPE_ALIAS,
        DeclarationKind::Interface(_) => SymbolFlags::INTERFACE,
        DeclarationKind::Class(_) => SymbolFlags::CLASS,
        DeclarationKind::Enum(_) => SymbolFlags::ENUM,
        DeclarationKind::EnumMember(_) => SymbolFlags::ENUM_MEMBER,
        DeclarationKind::Module(_) => SymbolFlags::NAMESPACE,
    }
}

/// `src/utils/index.d.ts` → `src/utils/index`.
fn module_name(file_name: &str) -> String {
    const EXTENSIONS: [&str; 7] = [".d.mts", ".d.cts", ".d.ts", ".mts", ".cts", ".tsx", ".ts"];
    EXTENSIONS
        .iter()
        .find_map(|ext| file_name.strip_suffix(ext))
        .unwrap_or(file_name)
        .to_string()
}

impl<'a> BinderState<'a> {
    fn bind_file(&mut self, id: FileId) -> Option<SymbolRef> {
        let files = self.files;
        let file = &files[id.0 as usize];
        let source = &file.source;
        let scope = DeclSite::SourceFile(id);

        if source.is_external_module {
            let module = self.symbols.alloc(SymbolFlags::SOURCE_FILE, module_name(&source.file_name));
            self.symbols[module].declarations.push(scope);
            let container = Container {
                scope,
                symbol: Some(module),
                global: false,
                implicit_export: file.is_declaration_file && !has_export_list(&source.statements),
                ambient: file.is_declaration_file,
            };
            self.bind_statements(id, &source.statements, &container);
            trace!(file = %source.file_name, "bound module");
            Some(module)
        } else {
            let container = Container {
                scope,
                symbol: None,
                global: true,
                implicit_export: false,
                ambient: file.is_declaration_file,
            };
            self.bind_statements(id, &source.statements, &container);
            trace!(file = %source.file_name, "bound script");
            None
        }
    }

    fn bind_statements(&mut self, file: FileId, statements: &'a [Statement], container: &Container) {
        if container.implicit_export {
            self.scopes.implicit_exports.insert(container.scope);
        }
        for statement in statements {
            match statement {
                Statement::Declaration(index) => self.bind_declaration(file, *index, container),
                Statement::Import(import) => self.bind_import(import, container),
                Statement::ImportEquals(import) => {
                    let target = match &import.target {
                        ImportEqualsTarget::External(specifier) => AliasTarget::Require {
                            specifier: specifier.clone(),
                        },
                        ImportEqualsTarget::Entity(name) => {
                            AliasTarget::Entity(name.parts.iter().map(|part| part.text.clone()).collect())
                        }
                    };
                    let alias = self.declare_alias(container, &import.name.text, target);
                    if import.is_export {
                        if let Some(module) = container.symbol {
                            self.symbols[module].members.insert(import.name.text.clone(), alias);
                        }
                    }
                }
                Statement::Export(_)
                | Statement::ExportAll(_)
                | Statement::ExportAssignment(_)
                | Statement::Unknown(_) => {}
            }
        }
    }

    fn bind_import(&mut self, import: &ImportDeclaration, container: &Container) {
        let specifier = &import.module_specifier;
        if let Some(default) = &import.default_binding {
            let target = AliasTarget::Export {
                specifier: specifier.clone(),
                name: "default".to_string(),
            };
            self.declare_alias(container, &default.text, target);
        }
        if let Some(namespace) = &import.namespace_binding {
            let target = AliasTarget::Namespace {
                specifier: specifier.clone(),
            };
            self.declare_alias(container, &namespace.text, target);
        }
        for named in &import.named {
            let target = AliasTarget::Export {
                specifier: specifier.clone(),
                name: named.imported.text.clone(),
            };
            self.declare_alias(container, &named.local.text, target);
        }
    }

    fn bind_declaration(&mut self, file: FileId, index: DeclIndex, container: &Container) {
        let files = self.files;
        let decl = files[file.0 as usize].source.decl(index);
        let exported = decl.is_exported() || container.implicit_export;

        match &decl.kind {
            DeclarationKind::Module(module) => {
                let scope = DeclSite::Declaration(file, index);
                let (symbol, inner) = match module.name_kind {
                    ModuleNameKind::Global => (
                        None,
                        Container {
                            scope,
                            symbol: None,
                            global: true,
                            implicit_export: false,
                            ambient: true,
                        },
                    ),
                    ModuleNameKind::String => {
                        let symbol = match self.scopes.ambient_modules.get(&decl.name.text) {
                            Some(existing) => *existing,
                            None => {
                                let symbol = self.symbols.alloc(SymbolFlags::AMBIENT_MODULE, decl.name.text.clone());
                                self.scopes.ambient_modules.insert(decl.name.text.clone(), symbol);
                                symbol
                            }
                        };
                        self.add_declaration(symbol, file, index);
                        let implicit_export = module.body.as_deref().is_some_and(|body| !has_export_list(body));
                        (
                            Some(symbol),
                            Container {
                                scope,
                                symbol: Some(symbol),
                                global: false,
                                implicit_export,
                                ambient: true,
                            },
                        )
                    }
                    ModuleNameKind::Identifier => {
                        let symbol = self.declare_symbol(container, file, index, SymbolFlags::NAMESPACE, exported);
                        let ambient = container.ambient || decl.modifiers.contains(ModifierFlags::DECLARE);
                        let implicit_export =
                            ambient && module.body.as_deref().is_some_and(|body| !has_export_list(body));
                        (
                            Some(symbol),
                            Container {
                                scope,
                                symbol: Some(symbol),
                                global: false,
                                implicit_export,
                                ambient,
                            },
                        )
                    }
                };
                if let Some(body) = &module.body {
                    trace!(module = %decl.name.text, symbol = ?symbol, "binding module body");
                    self.bind_statements(file, body, &inner);
                }
            }
            DeclarationKind::Enum(enum_decl) => {
                let symbol = self.declare_symbol(container, file, index, SymbolFlags::ENUM, exported);
                for member in &enum_decl.members {
                    let name = &files[file.0 as usize].source.decl(*member).name.text;
                    let member_symbol = match self.symbols[symbol].members.get(name) {
                        Some(existing) => *existing,
                        None => {
                            let member_symbol = self.symbols.alloc(SymbolFlags::ENUM_MEMBER, name.clone());
                            self.symbols[member_symbol].parent = Some(symbol);
                            self.symbols[symbol].members.insert(name.clone(), member_symbol);
                            member_symbol
                        }
                    };
                    self.add_declaration(member_symbol, file, *member);
                }
            }
            // Bound through their enum.
            DeclarationKind::EnumMember(_) => {}
            kind => {
                self.declare_symbol(container, file, index, flags_for_declaration(kind), exported);
            }
        }
    }

    fn scope_table(&mut self, container: &Container) -> &mut SymbolTable {
        if container.global {
            &mut self.scopes.globals
        } else {
            self.scopes.locals.entry(container.scope).or_default()
        }
    }

    fn declare_symbol(
        &mut self,
        container: &Container,
        file: FileId,
        index: DeclIndex,
        flags: SymbolFlags,
        exported: bool,
    ) -> SymbolRef {
        let files = self.files;
        let decl = files[file.0 as usize].source.decl(index);
        let name = decl.name.text.as_str();
        // `export default function () {}` has no local binding.
        let local_name = (!(decl.is_default_export() && name == "default")).then_some(name);
        let member_of = container
            .symbol
            .filter(|_| exported && !container.global && !decl.is_default_export());

        let mut existing = member_of.and_then(|module| self.symbols[module].members.get(name).copied());
        if existing.is_none() {
            if let Some(local) = local_name {
                existing = self.scope_table(container).get(local).copied();
            }
        }
        let existing = existing.filter(|symbol| !self.symbols[*symbol].is_alias());

        let symbol = match existing {
            Some(symbol) => {
                trace!(symbol_name = name, existing = ?self.symbols[symbol].flags, new = ?flags, "merging declaration");
                self.symbols[symbol].flags |= flags;
                symbol
            }
            None => {
                let symbol = self.symbols.alloc(flags, name.to_string());
                self.symbols[symbol].parent = container.symbol;
                symbol
            }
        };
        self.add_declaration(symbol, file, index);

        if let Some(local) = local_name {
            self.scope_table(container).insert(local.to_string(), symbol);
        }
        if let Some(module) = member_of {
            self.symbols[module].members.insert(name.to_string(), symbol);
        }
        symbol
    }

    fn declare_alias(&mut self, container: &Container, name: &str, target: AliasTarget) -> SymbolRef {
        if let Some(existing) = self.scope_table(container).get(name).copied() {
            if !self.symbols[existing].is_alias() {
                return existing;
            }
        }
        let symbol = self.symbols.alloc(SymbolFlags::ALIAS, name.to_string());
        let entry = &mut self.symbols[symbol];
        entry.parent = container.symbol;
        entry.alias = Some(Alias {
            target,
            scope: container.scope,
        });
        self.scope_table(container).insert(name.to_string(), symbol);
        symbol
    }

    fn add_declaration(&mut self, symbol: SymbolRef, file: FileId, index: DeclIndex) {
        let site = DeclSite::Declaration(file, index);
        let declarations = &mut self.symbols[symbol].declarations;
        if !declarations.contains(&site) {
            declarations.push(site);
        }
        self.scopes.declaration_symbols.insert((file, index), symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_names_drop_typescript_extensions() {
        assert_eq!(module_name("src/index.d.ts"), "src/index");
        assert_eq!(module_name("src/a.mts"), "src/a");
        assert_eq!(module_name("README"), "README");
    }
}
