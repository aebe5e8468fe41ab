//! Declaration serialization: one [`SerializedSymbol`] per walked symbol.

use crate::error::{ExtractError, SerializeError};
use crate::serialized::{
    ClassMember, EnumMemberValue, ObjectMember, SerializedSignature, SerializedSymbol, SerializedType,
    VariableKindName,
};
use crate::type_serializer::{TypeScope, collapse_optional};
use crate::walker::Extractor;
use apigraph_binder::checker::{
    EnumValue, enum_member_values, infer_parameter_type, infer_property_type, infer_return_type, infer_variable_type,
};
use apigraph_binder::{DeclSite, FileId, SymbolFlags, SymbolRef};
use apigraph_common::limits::MAX_DOC_INHERITANCE_HOPS;
use apigraph_syntax::ast::{
    ClassDeclaration, ClassMemberKind, DeclIndex, Declaration, DeclarationKind, ModifierFlags, PropertyName,
    Statement, VariableKind,
};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{trace, warn};

type SerializeResult<T> = Result<T, SerializeError>;

/// What a symbol serializes as when its declarations mix kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SymbolKind {
    Class,
    Enum,
    Function,
    Interface,
    TypeAlias,
    Variable,
    Module,
    EnumMember,
}

impl SymbolKind {
    fn of(flags: SymbolFlags) -> Option<SymbolKind> {
        const PRECEDENCE: [(SymbolFlags, SymbolKind); 8] = [
            (SymbolFlags::CLASS, SymbolKind::Class),
            (SymbolFlags::ENUM, SymbolKind::Enum),
            (SymbolFlags::FUNCTION, SymbolKind::Function),
            (SymbolFlags::INTERFACE, SymbolKind::Interface),
            (SymbolFlags::TYPE_ALIAS, SymbolKind::TypeAlias),
            (SymbolFlags::VARIABLE, SymbolKind::Variable),
            (SymbolFlags::MODULE, SymbolKind::Module),
            (SymbolFlags::ENUM_MEMBER, SymbolKind::EnumMember),
        ];
        PRECEDENCE
            .iter()
            .find(|(flag, _)| flags.intersects(*flag))
            .map(|(_, kind)| *kind)
    }

    fn matches(self, kind: &DeclarationKind) -> bool {
        matches!(
            (self, kind),
            (SymbolKind::Class, DeclarationKind::Class(_))
                | (SymbolKind::Enum, DeclarationKind::Enum(_))
                | (SymbolKind::Function, DeclarationKind::Function(_))
                | (SymbolKind::Interface, DeclarationKind::Interface(_))
                | (SymbolKind::TypeAlias, DeclarationKind::TypeAlias(_))
                | (SymbolKind::Variable, DeclarationKind::Variable(_))
                | (SymbolKind::Module, DeclarationKind::Module(_))
                | (SymbolKind::EnumMember, DeclarationKind::EnumMember(_))
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum AccessorKind {
    Get,
    Set,
}

/// One declaration of the symbol being serialized.
#[derive(Clone, Copy)]
struct DeclRef<'p> {
    file: FileId,
    index: DeclIndex,
    decl: &'p Declaration,
}

fn is_private_member(modifiers: ModifierFlags, name: Option<&PropertyName>) -> bool {
    modifiers.contains(ModifierFlags::PRIVATE) || name.is_some_and(|name| name.is_private())
}

/// Overloaded functions and methods list their overload signatures; the
/// implementation signature is dropped.
fn without_implementations<T>(items: Vec<T>, has_body: impl Fn(&T) -> bool) -> Vec<T> {
    if items.len() < 2 {
        return items;
    }
    let overloads: Vec<bool> = items.iter().map(|item| !has_body(item)).collect();
    if !overloads.iter().any(|overload| *overload) {
        return items;
    }
    items
        .into_iter()
        .zip(overloads)
        .filter_map(|(item, overload)| overload.then_some(item))
        .collect()
}

impl<'p> Extractor<'p> {
    fn declarations(&self, symbol: SymbolRef) -> Vec<DeclRef<'p>> {
        let program = self.program;
        program
            .symbol(symbol)
            .declarations
            .iter()
            .filter_map(|site| match site {
                DeclSite::Declaration(file, index) => Some(DeclRef {
                    file: *file,
                    index: *index,
                    decl: program.file(*file).source.decl(*index),
                }),
                DeclSite::SourceFile(_) => None,
            })
            .collect()
    }

    fn scope_for(&self, decl: DeclRef<'p>) -> TypeScope {
        TypeScope::new(decl.file, self.program.scope_of(decl.file, decl.index))
    }

    /// Serialize a dequeued symbol. Recoverable failures degrade to an
    /// `unknown` entry; a symbol without declarations aborts the run.
    pub(crate) fn serialize_symbol(&mut self, symbol: SymbolRef) -> Result<SerializedSymbol, ExtractError> {
        let program = self.program;
        let entry = program.symbol(symbol);
        if entry.declarations.is_empty() {
            return Err(ExtractError::NoDeclarations {
                name: entry.name.clone(),
            });
        }
        let name = entry.name.clone();
        let declarations = self.declarations(symbol);

        let Some(kind) = SymbolKind::of(entry.flags) else {
            warn!(symbol_name = %name, flags = ?entry.flags, "no serializable declaration");
            return Ok(self.unknown(&name, &declarations, "unsupported declaration kind".to_string()));
        };
        let of_kind: Vec<DeclRef<'p>> = declarations
            .iter()
            .copied()
            .filter(|decl| kind.matches(&decl.decl.kind))
            .collect();

        let serialized = match kind {
            SymbolKind::Class => self.serialize_class(&name, &of_kind),
            SymbolKind::Enum => Ok(self.serialize_enum(&name, &of_kind)),
            SymbolKind::Function => self.serialize_function(&name, &of_kind),
            SymbolKind::Interface => self.serialize_interface(&name, &of_kind),
            SymbolKind::TypeAlias => self.serialize_type_alias(&name, &of_kind),
            SymbolKind::Variable => self.serialize_variable(&name, &of_kind),
            SymbolKind::Module => Ok(self.serialize_module(symbol, &name, &of_kind)),
            SymbolKind::EnumMember => Ok(self.serialize_enum_member(&name, &of_kind)),
        };

        if kind != SymbolKind::Module && entry.flags.intersects(SymbolFlags::NAMESPACE) {
            self.discover_namespace_exports(symbol);
        }

        Ok(match serialized {
            Ok(serialized) => serialized,
            Err(error) => {
                warn!(symbol_name = %name, error = %error, "serialization failed; emitting unknown symbol");
                self.unknown(&name, &declarations, error.to_string())
            }
        })
    }

    fn unknown(&self, name: &str, declarations: &[DeclRef<'p>], error: String) -> SerializedSymbol {
        let first = declarations.first();
        SerializedSymbol::Unknown {
            name: name.to_string(),
            docs: first.and_then(|decl| decl.decl.doc.clone()),
            content: first.map_or_else(String::new, |decl| self.source_text(decl.file, decl.decl.span)),
            error,
        }
    }

    fn first_docs(declarations: &[DeclRef<'p>]) -> Option<String> {
        declarations.iter().find_map(|decl| decl.decl.doc.clone())
    }

    /// Namespace exports of a symbol that serializes as something else
    /// (function + namespace, class + namespace, ...).
    fn discover_namespace_exports(&mut self, symbol: SymbolRef) {
        let exports = self.program.exports_of(symbol);
        for resolution in exports.values() {
            self.reference_resolution(resolution);
        }
    }

    fn serialize_function(&mut self, name: &str, declarations: &[DeclRef<'p>]) -> SerializeResult<SerializedSymbol> {
        let functions: Vec<_> = declarations
            .iter()
            .filter_map(|decl| match &decl.decl.kind {
                DeclarationKind::Function(function) => Some((*decl, function)),
                _ => None,
            })
            .collect();
        let functions = without_implementations(functions, |(_, function)| function.body.is_some());

        let mut signatures = Vec::with_capacity(functions.len());
        for (decl, function) in functions {
            let mut cx = self.scope_for(decl);
            let is_async = decl.decl.modifiers.contains(ModifierFlags::ASYNC);
            let inferred = infer_return_type(&function.signature, function.body.as_ref(), None, is_async);
            signatures.push(self.serialize_signature(
                &mut cx,
                &function.signature,
                decl.decl.doc.as_deref(),
                false,
                inferred.as_ref(),
                0,
            )?);
        }
        Ok(SerializedSymbol::Function {
            name: name.to_string(),
            docs: Self::first_docs(declarations),
            signatures,
        })
    }

    fn serialize_variable(&mut self, name: &str, declarations: &[DeclRef<'p>]) -> SerializeResult<SerializedSymbol> {
        let Some((decl, variable)) = declarations.iter().find_map(|decl| match &decl.decl.kind {
            DeclarationKind::Variable(variable) => Some((*decl, variable)),
            _ => None,
        }) else {
            return Ok(self.unknown(name, declarations, "variable without declaration".to_string()));
        };
        let mut cx = self.scope_for(decl);
        let ty = self.serialize_inferred(&mut cx, &infer_variable_type(variable), 0)?;
        Ok(SerializedSymbol::Variable {
            name: name.to_string(),
            docs: decl.decl.doc.clone(),
            variable_kind: match variable.variable_kind {
                VariableKind::Var => VariableKindName::Var,
                VariableKind::Let => VariableKindName::Let,
                VariableKind::Const => VariableKindName::Const,
            },
            ty,
        })
    }

    fn serialize_type_alias(
        &mut self,
        name: &str,
        declarations: &[DeclRef<'p>],
    ) -> SerializeResult<SerializedSymbol> {
        let Some((decl, alias)) = declarations.iter().find_map(|decl| match &decl.decl.kind {
            DeclarationKind::TypeAlias(alias) => Some((*decl, alias)),
            _ => None,
        }) else {
            return Ok(self.unknown(name, declarations, "type alias without declaration".to_string()));
        };
        let mut cx = self.scope_for(decl);
        cx.enter(alias.type_params.iter().map(|param| param.name.text.as_str()));
        Ok(SerializedSymbol::TypeAlias {
            name: name.to_string(),
            docs: decl.decl.doc.clone(),
            type_params: self.serialize_type_params(&mut cx, &alias.type_params, 0)?,
            ty: self.serialize_type(&mut cx, &alias.ty, 0)?,
        })
    }

    fn serialize_interface(
        &mut self,
        name: &str,
        declarations: &[DeclRef<'p>],
    ) -> SerializeResult<SerializedSymbol> {
        let mut type_params = Vec::new();
        let mut extends = Vec::new();
        let mut members = Vec::new();
        for decl in declarations {
            let DeclarationKind::Interface(interface) = &decl.decl.kind else {
                continue;
            };
            let mut cx = self.scope_for(*decl);
            cx.enter(interface.type_params.iter().map(|param| param.name.text.as_str()));
            if type_params.is_empty() {
                type_params = self.serialize_type_params(&mut cx, &interface.type_params, 0)?;
            }
            for heritage in &interface.extends {
                extends.push(self.serialize_type(&mut cx, heritage, 0)?);
            }
            members.extend(self.serialize_type_members(&mut cx, &interface.members, 0)?);
        }
        Ok(SerializedSymbol::Interface {
            name: name.to_string(),
            docs: Self::first_docs(declarations),
            type_params,
            extends,
            members,
        })
    }

    fn serialize_class(&mut self, name: &str, declarations: &[DeclRef<'p>]) -> SerializeResult<SerializedSymbol> {
        let Some((decl, class)) = declarations.iter().find_map(|decl| match &decl.decl.kind {
            DeclarationKind::Class(class) => Some((*decl, class)),
            _ => None,
        }) else {
            return Ok(self.unknown(name, declarations, "class without declaration".to_string()));
        };
        let mut cx = self.scope_for(decl);
        cx.enter(class.type_params.iter().map(|param| param.name.text.as_str()));

        let type_params = self.serialize_type_params(&mut cx, &class.type_params, 0)?;
        let extends = match &class.extends {
            Some(extends) => Some(self.serialize_type(&mut cx, extends, 0)?),
            None => None,
        };
        let mut implements = Vec::with_capacity(class.implements.len());
        for heritage in &class.implements {
            implements.push(self.serialize_type(&mut cx, heritage, 0)?);
        }
        let (constructors, members, has_private_members) = self.serialize_class_members(&mut cx, class)?;

        Ok(SerializedSymbol::Class {
            name: name.to_string(),
            docs: decl.decl.doc.clone(),
            type_params,
            extends,
            implements,
            constructors,
            members,
            has_private_members,
            is_abstract: decl.decl.modifiers.contains(ModifierFlags::ABSTRACT),
        })
    }

    fn serialize_class_members(
        &mut self,
        cx: &mut TypeScope,
        class: &'p ClassDeclaration,
    ) -> SerializeResult<(Vec<SerializedSignature>, Vec<ClassMember>, bool)> {
        let mut has_private_members = false;
        let mut overload_counts: FxHashMap<(bool, &str), usize> = FxHashMap::default();
        for member in &class.members {
            if let ClassMemberKind::Method { name, .. } = &member.kind {
                let is_static = member.modifiers.contains(ModifierFlags::STATIC);
                *overload_counts.entry((is_static, name.text())).or_default() += 1;
            }
        }
        let constructor_count = class
            .members
            .iter()
            .filter(|member| matches!(member.kind, ClassMemberKind::Constructor { .. }))
            .count();
        let has_accessor = |wanted: AccessorKind, name: &str, is_static: bool| {
            class.members.iter().any(|other| {
                let kind = match &other.kind {
                    ClassMemberKind::GetAccessor { .. } => AccessorKind::Get,
                    ClassMemberKind::SetAccessor { .. } => AccessorKind::Set,
                    _ => return false,
                };
                kind == wanted
                    && other.modifiers.contains(ModifierFlags::STATIC) == is_static
                    && other.name().is_some_and(|other_name| other_name.text() == name)
            })
        };

        let mut constructors = Vec::new();
        let mut members = Vec::new();
        let mut parameter_properties: IndexMap<&'p str, ClassMember> = IndexMap::new();

        for member in &class.members {
            if is_private_member(member.modifiers, member.name()) {
                has_private_members = true;
                continue;
            }
            let modifiers = member.modifiers;
            let is_static = modifiers.contains(ModifierFlags::STATIC);
            let docs = member.doc.clone();

            let object_member = match &member.kind {
                ClassMemberKind::Property {
                    name,
                    optional,
                    ty,
                    initializer,
                } => {
                    let readonly = modifiers.contains(ModifierFlags::READONLY);
                    let ty = match ty {
                        Some(ty) => self.serialize_type(cx, ty, 0)?,
                        None => self.serialize_inferred(cx, &infer_property_type(initializer.as_ref(), readonly), 0)?,
                    };
                    ObjectMember::Prop {
                        name: name.text().to_string(),
                        docs,
                        optional: *optional,
                        readonly,
                        ty: if *optional { collapse_optional(ty) } else { ty },
                    }
                }
                ClassMemberKind::Method {
                    name,
                    optional,
                    signature,
                    body,
                } => {
                    let overloaded = overload_counts.get(&(is_static, name.text())).copied().unwrap_or(0) > 1;
                    if overloaded && body.is_some() {
                        continue;
                    }
                    let inferred = infer_return_type(
                        signature,
                        body.as_ref(),
                        None,
                        modifiers.contains(ModifierFlags::ASYNC),
                    );
                    ObjectMember::Method {
                        name: name.text().to_string(),
                        optional: *optional,
                        signature: self.serialize_signature(cx, signature, docs.as_deref(), false, inferred.as_ref(), 0)?,
                        docs,
                    }
                }
                ClassMemberKind::Constructor { signature, body } => {
                    for param in &signature.params {
                        if !param.modifiers.intersects(ModifierFlags::PARAMETER_PROPERTY) {
                            continue;
                        }
                        if param.modifiers.contains(ModifierFlags::PRIVATE) {
                            has_private_members = true;
                            continue;
                        }
                        if parameter_properties.contains_key(param.name.text.as_str()) {
                            continue;
                        }
                        let ty = self.serialize_inferred(cx, &infer_parameter_type(param), 0)?;
                        let optional = param.question;
                        parameter_properties.insert(
                            param.name.text.as_str(),
                            ClassMember {
                                member: ObjectMember::Prop {
                                    name: param.name.text.clone(),
                                    docs: None,
                                    optional,
                                    readonly: param.modifiers.contains(ModifierFlags::READONLY),
                                    ty: if optional { collapse_optional(ty) } else { ty },
                                },
                                is_static: false,
                                is_protected: param.modifiers.contains(ModifierFlags::PROTECTED),
                                is_abstract: false,
                            },
                        );
                    }
                    if constructor_count > 1 && body.is_some() {
                        continue;
                    }
                    constructors.push(self.serialize_signature(cx, signature, docs.as_deref(), true, None, 0)?);
                    continue;
                }
                ClassMemberKind::GetAccessor { name, ty, .. } => {
                    let has_setter = has_accessor(AccessorKind::Set, name.text(), is_static);
                    ObjectMember::Prop {
                        name: name.text().to_string(),
                        docs,
                        optional: false,
                        readonly: !has_setter,
                        ty: match ty {
                            Some(ty) => self.serialize_type(cx, ty, 0)?,
                            None => SerializedType::any(),
                        },
                    }
                }
                ClassMemberKind::SetAccessor { name, param } => {
                    let has_getter = has_accessor(AccessorKind::Get, name.text(), is_static);
                    if has_getter {
                        continue;
                    }
                    ObjectMember::Prop {
                        name: name.text().to_string(),
                        docs,
                        optional: false,
                        readonly: false,
                        ty: match param.as_ref().and_then(|param| param.type_annotation.as_ref()) {
                            Some(ty) => self.serialize_type(cx, ty, 0)?,
                            None => SerializedType::any(),
                        },
                    }
                }
                ClassMemberKind::Index { params, ty } => {
                    let key = params.first();
                    ObjectMember::Index {
                        docs,
                        key_name: key.map_or_else(String::new, |key| key.name.text.clone()),
                        key_type: match key.and_then(|key| key.type_annotation.as_ref()) {
                            Some(key_type) => self.serialize_type(cx, key_type, 0)?,
                            None => SerializedType::any(),
                        },
                        readonly: modifiers.contains(ModifierFlags::READONLY),
                        ty: match ty {
                            Some(ty) => self.serialize_type(cx, ty, 0)?,
                            None => SerializedType::any(),
                        },
                    }
                }
                ClassMemberKind::Unknown => {
                    trace!(offset = member.span.start, "skipping unsupported class member");
                    continue;
                }
            };
            members.push(ClassMember {
                member: object_member,
                is_static,
                is_protected: modifiers.contains(ModifierFlags::PROTECTED),
                is_abstract: modifiers.contains(ModifierFlags::ABSTRACT),
            });
        }

        let mut all_members: Vec<ClassMember> = parameter_properties.into_values().collect();
        all_members.extend(members);
        Ok((constructors, all_members, has_private_members))
    }

    fn serialize_enum(&mut self, name: &str, declarations: &[DeclRef<'p>]) -> SerializedSymbol {
        let program = self.program;
        let mut members = Vec::new();
        let mut is_const = false;
        for decl in declarations {
            let DeclarationKind::Enum(enum_decl) = &decl.decl.kind else {
                continue;
            };
            is_const |= decl.decl.modifiers.contains(ModifierFlags::CONST);
            for member in &enum_decl.members {
                if let Some(symbol) = program.symbol_of_declaration(decl.file, *member) {
                    let id = self.reference_symbol(symbol);
                    if !members.contains(&id) {
                        members.push(id);
                    }
                }
            }
        }
        SerializedSymbol::Enum {
            name: name.to_string(),
            docs: Self::first_docs(declarations),
            is_const,
            members,
        }
    }

    fn serialize_enum_member(&mut self, name: &str, declarations: &[DeclRef<'p>]) -> SerializedSymbol {
        let program = self.program;
        let value = declarations.first().and_then(|decl| {
            let source = &program.file(decl.file).source;
            let parent = decl.decl.parent?;
            let DeclarationKind::Enum(enum_decl) = &source.decl(parent).kind else {
                return None;
            };
            let position = enum_decl.members.iter().position(|member| *member == decl.index)?;
            enum_member_values(source, &enum_decl.members)
                .into_iter()
                .nth(position)
                .flatten()
        });
        SerializedSymbol::EnumMember {
            name: name.to_string(),
            docs: Self::first_docs(declarations),
            value: value.map(|value| match value {
                EnumValue::String(value) => EnumMemberValue::String(value),
                EnumValue::Number(value) => EnumMemberValue::Number(value),
            }),
        }
    }

    fn serialize_module(&mut self, symbol: SymbolRef, name: &str, declarations: &[DeclRef<'p>]) -> SerializedSymbol {
        let exports_table = self.program.exports_of(symbol);
        let mut exports = IndexMap::with_capacity(exports_table.len());
        for (export_name, resolution) in exports_table.iter() {
            let id = self.reference_resolution(resolution);
            exports.insert(export_name.clone(), id);
        }
        SerializedSymbol::Module {
            name: name.to_string(),
            docs: self.module_docs(symbol).or_else(|| Self::first_docs(declarations)),
            exports,
        }
    }

    /// A file's own documentation, else that of the module it purely
    /// re-exports, followed for a bounded number of hops.
    fn module_docs(&self, symbol: SymbolRef) -> Option<String> {
        let program = self.program;
        let mut file = program.symbol(symbol).declarations.iter().find_map(|site| match site {
            DeclSite::SourceFile(file) => Some(*file),
            DeclSite::Declaration(..) => None,
        })?;
        for _ in 0..=MAX_DOC_INHERITANCE_HOPS {
            let source = &program.file(file).source;
            if let Some(doc) = &source.doc {
                return Some(doc.clone());
            }
            let specifier = pure_reexport_source(&source.statements)?;
            let target = program.resolve_module(file, specifier)?;
            let next = program.symbol(target).declarations.first()?.file();
            trace!(from = %program.relative_path(file), to = %program.relative_path(next), "inheriting module docs");
            file = next;
        }
        None
    }
}

/// The single module a file re-exports when it consists only of
/// `export { .. } from "m"` and `export * from "m"` statements.
fn pure_reexport_source(statements: &[Statement]) -> Option<&str> {
    let mut source: Option<&str> = None;
    for statement in statements {
        let specifier = match statement {
            Statement::Export(export) => export.module_specifier.as_deref()?,
            Statement::ExportAll(export_all) if export_all.alias.is_none() => export_all.module_specifier.as_str(),
            _ => return None,
        };
        match source {
            Some(existing) if existing != specifier => return None,
            _ => source = Some(specifier),
        }
    }
    source
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_prefers_class_then_enum() {
        assert_eq!(
            SymbolKind::of(SymbolFlags::CLASS | SymbolFlags::INTERFACE | SymbolFlags::NAMESPACE),
            Some(SymbolKind::Class)
        );
        assert_eq!(
            SymbolKind::of(SymbolFlags::FUNCTION | SymbolFlags::NAMESPACE),
            Some(SymbolKind::Function)
        );
        assert_eq!(SymbolKind::of(SymbolFlags::NAMESPACE), Some(SymbolKind::Module));
        assert_eq!(SymbolKind::of(SymbolFlags::ALIAS), None);
    }

    #[test]
    fn overload_sets_drop_the_implementation() {
        let items = vec![("a", false), ("b", false), ("impl", true)];
        let kept = without_implementations(items, |(_, body)| *body);
        assert_eq!(kept, vec![("a", false), ("b", false)]);

        let single = vec![("impl", true)];
        assert_eq!(without_implementations(single, |(_, body)| *body), vec![("impl", true)]);
    }

    #[test]
    fn pure_reexports_need_a_single_source() {
        let file = apigraph_syntax::parse("index.ts", "export { A } from \"./a\";\nexport * from \"./a\";\n");
        assert_eq!(pure_reexport_source(&file.statements), Some("./a"));

        let mixed = apigraph_syntax::parse("index.ts", "export { A } from \"./a\";\nexport * from \"./b\";\n");
        assert_eq!(pure_reexport_source(&mixed.statements), None);

        let local = apigraph_syntax::parse("index.ts", "export { A } from \"./a\";\nexport const b = 1;\n");
        assert_eq!(pure_reexport_source(&local.statements), None);
    }
}
