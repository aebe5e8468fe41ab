//! Type expression serialization.
//!
//! Written type annotations and inferred types both serialize to
//! [`SerializedType`]. Named types become references by [`SymbolId`] and are
//! handed to the walker, so serialization of a single type is bounded by the
//! size of the written expression (and by `max_type_depth` for pathological
//! nesting).

use crate::error::SerializeError;
use crate::serialized::{
    MappedModifierName, ObjectMember, SerializedParameter, SerializedSignature, SerializedTupleElement,
    SerializedType, SerializedTypeParameter, TupleElementKind,
};
use crate::walker::Extractor;
use apigraph_binder::checker::{InferredMember, InferredType, infer_parameter_type};
use apigraph_binder::{DeclSite, FileId, Resolution};
use apigraph_common::Span;
use apigraph_syntax::ast::{
    EntityName, LiteralType, MappedModifier, Signature, TupleElement, TypeMember, TypeMemberKind, TypeNode,
    TypeNodeKind, TypeOperator, TypeParameter,
};
use apigraph_syntax::visit::walk_type;
use tracing::{trace, warn};

type SerializeResult<T> = Result<T, SerializeError>;

/// Lexical context of a type expression: the file and scope names resolve
/// in, plus the type parameters currently in scope.
#[derive(Clone, Debug)]
pub(crate) struct TypeScope {
    pub(crate) file: FileId,
    pub(crate) scope: DeclSite,
    type_params: Vec<String>,
}

impl TypeScope {
    pub(crate) fn new(file: FileId, scope: DeclSite) -> Self {
        TypeScope {
            file,
            scope,
            type_params: Vec::new(),
        }
    }

    /// Bring type parameter names into scope; returns the mark to pass to
    /// [`TypeScope::exit`].
    pub(crate) fn enter<'n>(&mut self, names: impl IntoIterator<Item = &'n str>) -> usize {
        let mark = self.type_params.len();
        self.type_params.extend(names.into_iter().map(str::to_string));
        mark
    }

    pub(crate) fn exit(&mut self, mark: usize) {
        self.type_params.truncate(mark);
    }

    fn is_type_param(&self, name: &str) -> bool {
        self.type_params.iter().any(|param| param == name)
    }
}

fn mapped_modifier(modifier: MappedModifier) -> MappedModifierName {
    match modifier {
        MappedModifier::Present => MappedModifierName::Present,
        MappedModifier::Plus => MappedModifierName::Add,
        MappedModifier::Minus => MappedModifierName::Remove,
    }
}

/// Optional properties already admit `undefined`, so it is dropped from a
/// written union; a union left with one member collapses to it.
pub(crate) fn collapse_optional(ty: SerializedType) -> SerializedType {
    let SerializedType::Union { types } = ty else {
        return ty;
    };
    if types.len() < 2 || !types.iter().any(|member| member.is_intrinsic("undefined")) {
        return SerializedType::Union { types };
    }
    let mut remaining: Vec<SerializedType> = types
        .into_iter()
        .filter(|member| !member.is_intrinsic("undefined"))
        .collect();
    if remaining.len() == 1 {
        remaining.remove(0)
    } else {
        SerializedType::Union { types: remaining }
    }
}

/// Names bound by `infer X` anywhere inside `node`.
fn infer_bindings(node: &TypeNode) -> Vec<&str> {
    let mut names = Vec::new();
    walk_type(node, &mut |ty| {
        if let TypeNodeKind::Infer { name, .. } = &ty.kind {
            names.push(name.text.as_str());
        }
    });
    names
}

impl<'p> Extractor<'p> {
    pub(crate) fn source_text(&self, file: FileId, span: Span) -> String {
        self.program.file(file).source.text_of(span).trim().to_string()
    }

    fn raw(&self, cx: &TypeScope, span: Span) -> SerializedType {
        SerializedType::Raw {
            value: self.source_text(cx.file, span),
        }
    }

    pub(crate) fn serialize_type(
        &mut self,
        cx: &mut TypeScope,
        node: &'p TypeNode,
        depth: u32,
    ) -> SerializeResult<SerializedType> {
        if depth > self.max_type_depth {
            warn!(
                file = %self.program.relative_path(cx.file),
                offset = node.span.start,
                "type nesting exceeds serialization depth"
            );
            return Ok(self.raw(cx, node.span));
        }
        let next = depth + 1;

        let serialized = match &node.kind {
            TypeNodeKind::Keyword(keyword) => SerializedType::intrinsic(keyword.as_str()),
            TypeNodeKind::Reference { name, type_arguments } => {
                self.serialize_type_reference(cx, name, type_arguments, next)?
            }
            TypeNodeKind::Query { name, .. } => {
                let parts: Vec<&str> = name.parts.iter().map(|part| part.text.as_str()).collect();
                let id = self.reference_entity(cx, &parts);
                SerializedType::Typeof { id, name: name.text() }
            }
            TypeNodeKind::Array(element) => SerializedType::Array {
                readonly: false,
                inner: Box::new(self.serialize_type(cx, element, next)?),
            },
            TypeNodeKind::Operator { operator, ty } => match (operator, &ty.kind) {
                (TypeOperator::Readonly, TypeNodeKind::Array(element)) => SerializedType::Array {
                    readonly: true,
                    inner: Box::new(self.serialize_type(cx, element, next)?),
                },
                (TypeOperator::Readonly, TypeNodeKind::Tuple(elements)) => SerializedType::Tuple {
                    readonly: true,
                    elements: self.serialize_tuple_elements(cx, elements, next)?,
                },
                (TypeOperator::Keyof, _) => SerializedType::Keyof {
                    value: Box::new(self.serialize_type(cx, ty, next)?),
                },
                _ => self.raw(cx, node.span),
            },
            TypeNodeKind::Union(types) => SerializedType::Union {
                types: self.serialize_types(cx, types, next)?,
            },
            TypeNodeKind::Intersection(types) => SerializedType::Intersection {
                types: self.serialize_types(cx, types, next)?,
            },
            TypeNodeKind::Infer { name, constraint } => SerializedType::Infer {
                name: name.text.clone(),
                constraint: match constraint {
                    Some(constraint) => Some(Box::new(self.serialize_type(cx, constraint, next)?)),
                    None => None,
                },
            },
            TypeNodeKind::Parenthesized(inner) => SerializedType::Paren {
                value: Box::new(self.serialize_type(cx, inner, next)?),
            },
            TypeNodeKind::Tuple(elements) => SerializedType::Tuple {
                readonly: false,
                elements: self.serialize_tuple_elements(cx, elements, next)?,
            },
            TypeNodeKind::TypeLiteral(members) => SerializedType::Object {
                members: self.serialize_type_members(cx, members, next)?,
            },
            TypeNodeKind::IndexedAccess { object, index } => SerializedType::IndexedAccess {
                object: Box::new(self.serialize_type(cx, object, next)?),
                index: Box::new(self.serialize_type(cx, index, next)?),
            },
            TypeNodeKind::Conditional {
                check,
                extends,
                true_type,
                false_type,
            } => {
                let missing = |branch: &'static str| SerializeError::MissingConditionalBranch {
                    text: self.source_text(cx.file, node.span),
                    location: format!("{}:{}", self.program.relative_path(cx.file), node.span.start),
                    branch,
                };
                let true_type = true_type.as_deref().ok_or_else(|| missing("true"))?;
                let false_type = false_type.as_deref().ok_or_else(|| missing("false"))?;

                let check_type = self.serialize_type(cx, check, next)?;
                let mark = cx.enter(infer_bindings(extends));
                let extends_type = self.serialize_type(cx, extends, next);
                let resolved_true = self.serialize_type(cx, true_type, next);
                cx.exit(mark);
                SerializedType::Conditional {
                    check_type: Box::new(check_type),
                    extends_type: Box::new(extends_type?),
                    true_type: Box::new(resolved_true?),
                    false_type: Box::new(self.serialize_type(cx, false_type, next)?),
                }
            }
            TypeNodeKind::Literal(LiteralType::String(value)) => SerializedType::StringLiteral { value: value.clone() },
            TypeNodeKind::Literal(LiteralType::Number(value)) => SerializedType::NumericLiteral { value: *value },
            TypeNodeKind::Literal(LiteralType::BigInt(value)) => SerializedType::BigintLiteral { value: value.clone() },
            TypeNodeKind::Mapped {
                readonly,
                type_param,
                constraint,
                name_type,
                optional,
                ty,
            } => {
                let constraint = self.serialize_type(cx, constraint, next)?;
                let mark = cx.enter([type_param.text.as_str()]);
                let name_type = match name_type {
                    Some(name_type) => self.serialize_type(cx, name_type, next).map(|ty| Some(Box::new(ty))),
                    None => Ok(None),
                };
                let value_type = match ty {
                    Some(ty) => self.serialize_type(cx, ty, next).map(|ty| Some(Box::new(ty))),
                    None => Ok(None),
                };
                cx.exit(mark);
                SerializedType::Mapped {
                    param: type_param.text.clone(),
                    constraint: Box::new(constraint),
                    name_type: name_type?,
                    readonly: readonly.map(mapped_modifier),
                    optional: optional.map(mapped_modifier),
                    ty: value_type?,
                }
            }
            TypeNodeKind::Function(signature) => {
                SerializedType::Signature(self.serialize_signature(cx, signature, None, false, None, next)?)
            }
            TypeNodeKind::Constructor { signature, .. } => {
                SerializedType::Signature(self.serialize_signature(cx, signature, None, true, None, next)?)
            }
            TypeNodeKind::TypePredicate { asserts, param, ty } => SerializedType::TypePredicate {
                asserts: *asserts,
                param: param.text.clone(),
                ty: match ty {
                    Some(ty) => Some(Box::new(self.serialize_type(cx, ty, next)?)),
                    None => None,
                },
            },
            TypeNodeKind::Import {
                specifier,
                qualifier,
                type_arguments,
                is_typeof,
            } => self.serialize_import_type(cx, specifier, qualifier.as_ref(), type_arguments, *is_typeof, next)?,
            TypeNodeKind::TemplateLiteral | TypeNodeKind::Unsupported => self.raw(cx, node.span),
        };
        Ok(serialized)
    }

    fn serialize_types(
        &mut self,
        cx: &mut TypeScope,
        nodes: &'p [TypeNode],
        depth: u32,
    ) -> SerializeResult<Vec<SerializedType>> {
        nodes.iter().map(|node| self.serialize_type(cx, node, depth)).collect()
    }

    fn serialize_type_reference(
        &mut self,
        cx: &mut TypeScope,
        name: &'p EntityName,
        type_arguments: &'p [TypeNode],
        depth: u32,
    ) -> SerializeResult<SerializedType> {
        if name.is_simple() && cx.is_type_param(&name.first().text) {
            return Ok(SerializedType::TypeParameter {
                name: name.first().text.clone(),
            });
        }
        if let [element] = type_arguments {
            if let Some(readonly) = self.global_array_kind(cx, name) {
                return Ok(SerializedType::Array {
                    readonly,
                    inner: Box::new(self.serialize_type(cx, element, depth)?),
                });
            }
        }

        let parts: Vec<&str> = name.parts.iter().map(|part| part.text.as_str()).collect();
        let id = self.reference_entity(cx, &parts);
        Ok(SerializedType::Reference {
            id,
            name: name.text(),
            type_arguments: self.serialize_types(cx, type_arguments, depth)?,
        })
    }

    /// `Some(readonly)` when `name` is the library `Array` or `ReadonlyArray`
    /// rather than a package declaration of the same name.
    fn global_array_kind(&self, cx: &TypeScope, name: &EntityName) -> Option<bool> {
        if !name.is_simple() {
            return None;
        }
        let text = name.first().text.as_str();
        let readonly = match text {
            "Array" => false,
            "ReadonlyArray" => true,
            _ => return None,
        };
        match self.program.lookup_name(cx.scope, text) {
            None => Some(readonly),
            Some(symbol) => {
                let is_lib_global = self.program.resolve_global(text) == Some(symbol) && !self.is_internal(symbol);
                is_lib_global.then_some(readonly)
            }
        }
    }

    /// Resolve a dotted name and record the reference.
    pub(crate) fn reference_entity(&mut self, cx: &TypeScope, parts: &[&str]) -> crate::ids::SymbolId {
        match self.program.resolve_entity(cx.scope, parts) {
            Some(resolution) => self.reference_resolution(&resolution),
            None => {
                trace!(name = %parts.join("."), "unresolved name treated as library global");
                self.reference_global(&parts.join("."))
            }
        }
    }

    fn serialize_import_type(
        &mut self,
        cx: &mut TypeScope,
        specifier: &'p str,
        qualifier: Option<&'p EntityName>,
        type_arguments: &'p [TypeNode],
        is_typeof: bool,
        depth: u32,
    ) -> SerializeResult<SerializedType> {
        let qualifier_parts: Vec<&str> = qualifier
            .map(|qualifier| qualifier.parts.iter().map(|part| part.text.as_str()).collect())
            .unwrap_or_default();
        let mut resolution = match self.program.resolve_module(cx.file, specifier) {
            Some(module) => Some(Resolution::Symbol(module)),
            None => Some(Resolution::Unresolved {
                specifier: specifier.to_string(),
                name: String::new(),
            }),
        };
        for part in &qualifier_parts {
            resolution = match resolution {
                Some(Resolution::Symbol(symbol)) => self.program.member_of(symbol, part),
                Some(Resolution::Unresolved { specifier, name }) => Some(Resolution::Unresolved {
                    name: apigraph_binder::qualify(&name, part),
                    specifier,
                }),
                None => None,
            };
        }

        let display = match qualifier {
            Some(qualifier) => format!("import(\"{specifier}\").{}", qualifier.text()),
            None => format!("import(\"{specifier}\")"),
        };
        let id = match &resolution {
            Some(resolution) => self.reference_resolution(resolution),
            None => self.reference_global(&display),
        };
        if is_typeof {
            return Ok(SerializedType::Typeof { id, name: display });
        }
        Ok(SerializedType::Reference {
            id,
            name: display,
            type_arguments: self.serialize_types(cx, type_arguments, depth)?,
        })
    }

    fn serialize_tuple_elements(
        &mut self,
        cx: &mut TypeScope,
        elements: &'p [TupleElement],
        depth: u32,
    ) -> SerializeResult<Vec<SerializedTupleElement>> {
        let mut serialized = Vec::with_capacity(elements.len());
        for element in elements {
            let (kind, ty) = if element.dot_dot_dot {
                match self.serialize_type(cx, &element.ty, depth)? {
                    SerializedType::Array { inner, .. } => (TupleElementKind::Rest, *inner),
                    other => (TupleElementKind::Variadic, other),
                }
            } else if element.optional {
                (TupleElementKind::Optional, self.serialize_type(cx, &element.ty, depth)?)
            } else {
                (TupleElementKind::Required, self.serialize_type(cx, &element.ty, depth)?)
            };
            serialized.push(SerializedTupleElement {
                kind,
                label: element.label.as_ref().map(|label| label.text.clone()),
                ty,
            });
        }
        Ok(serialized)
    }

    /// Type parameters already entered into `cx`.
    pub(crate) fn serialize_type_params(
        &mut self,
        cx: &mut TypeScope,
        params: &'p [TypeParameter],
        depth: u32,
    ) -> SerializeResult<Vec<SerializedTypeParameter>> {
        let mut serialized = Vec::with_capacity(params.len());
        for param in params {
            serialized.push(SerializedTypeParameter {
                name: param.name.text.clone(),
                constraint: match &param.constraint {
                    Some(constraint) => Some(self.serialize_type(cx, constraint, depth)?),
                    None => None,
                },
                default: match &param.default {
                    Some(default) => Some(self.serialize_type(cx, default, depth)?),
                    None => None,
                },
            });
        }
        Ok(serialized)
    }

    /// Serialize a signature. Without a written return type the return type is
    /// `inferred_return`, else `any`.
    pub(crate) fn serialize_signature(
        &mut self,
        cx: &mut TypeScope,
        signature: &'p Signature,
        docs: Option<&str>,
        is_constructor: bool,
        inferred_return: Option<&InferredType<'p>>,
        depth: u32,
    ) -> SerializeResult<SerializedSignature> {
        let mark = cx.enter(signature.type_params.iter().map(|param| param.name.text.as_str()));
        let serialized = self.serialize_signature_in_scope(cx, signature, docs, is_constructor, inferred_return, depth);
        cx.exit(mark);
        serialized
    }

    fn serialize_signature_in_scope(
        &mut self,
        cx: &mut TypeScope,
        signature: &'p Signature,
        docs: Option<&str>,
        is_constructor: bool,
        inferred_return: Option<&InferredType<'p>>,
        depth: u32,
    ) -> SerializeResult<SerializedSignature> {
        let type_params = self.serialize_type_params(cx, &signature.type_params, depth)?;

        let mut parameters = Vec::with_capacity(signature.params.len());
        for param in &signature.params {
            let ty = match &param.type_annotation {
                Some(annotation) => self.serialize_type(cx, annotation, depth)?,
                None => self.serialize_inferred(cx, &infer_parameter_type(param), depth)?,
            };
            parameters.push(SerializedParameter {
                name: param.name.text.clone(),
                ty,
                optional: param.question || param.initializer.is_some(),
                rest: param.dot_dot_dot,
            });
        }

        let return_type = match (&signature.return_type, inferred_return) {
            (Some(written), _) => self.serialize_type(cx, written, depth)?,
            (None, Some(inferred)) => self.serialize_inferred(cx, inferred, depth)?,
            (None, None) => SerializedType::any(),
        };

        Ok(SerializedSignature {
            docs: docs.map(str::to_string),
            type_params,
            parameters,
            return_type: Box::new(return_type),
            is_constructor,
        })
    }

    /// Members of an interface or type literal.
    pub(crate) fn serialize_type_members(
        &mut self,
        cx: &mut TypeScope,
        members: &'p [TypeMember],
        depth: u32,
    ) -> SerializeResult<Vec<ObjectMember>> {
        let mut serialized = Vec::with_capacity(members.len());
        for member in members {
            let docs = member.doc.clone();
            let object_member = match &member.kind {
                TypeMemberKind::Property {
                    name,
                    optional,
                    readonly,
                    ty,
                } => {
                    let ty = match ty {
                        Some(ty) => self.serialize_type(cx, ty, depth)?,
                        None => SerializedType::any(),
                    };
                    ObjectMember::Prop {
                        name: name.text().to_string(),
                        docs,
                        optional: *optional,
                        readonly: *readonly,
                        ty: if *optional { collapse_optional(ty) } else { ty },
                    }
                }
                TypeMemberKind::Method {
                    name,
                    optional,
                    signature,
                } => ObjectMember::Method {
                    name: name.text().to_string(),
                    optional: *optional,
                    signature: self.serialize_signature(cx, signature, None, false, None, depth)?,
                    docs,
                },
                TypeMemberKind::Call(signature) => ObjectMember::Call {
                    signature: self.serialize_signature(cx, signature, None, false, None, depth)?,
                    docs,
                },
                TypeMemberKind::Construct(signature) => ObjectMember::Constructor {
                    signature: self.serialize_signature(cx, signature, None, true, None, depth)?,
                    docs,
                },
                TypeMemberKind::Index { params, ty, readonly } => {
                    let (key_name, key_type) = match params.first() {
                        Some(param) => (
                            param.name.text.clone(),
                            match &param.type_annotation {
                                Some(key) => self.serialize_type(cx, key, depth)?,
                                None => SerializedType::any(),
                            },
                        ),
                        None => (String::new(), SerializedType::any()),
                    };
                    ObjectMember::Index {
                        docs,
                        key_name,
                        key_type,
                        readonly: *readonly,
                        ty: match ty {
                            Some(ty) => self.serialize_type(cx, ty, depth)?,
                            None => SerializedType::any(),
                        },
                    }
                }
                TypeMemberKind::GetAccessor { name, ty } => {
                    let has_setter = members.iter().any(|other| {
                        matches!(&other.kind, TypeMemberKind::SetAccessor { name: setter, .. } if setter.text() == name.text())
                    });
                    ObjectMember::Prop {
                        name: name.text().to_string(),
                        docs,
                        optional: false,
                        readonly: !has_setter,
                        ty: match ty {
                            Some(ty) => self.serialize_type(cx, ty, depth)?,
                            None => SerializedType::any(),
                        },
                    }
                }
                TypeMemberKind::SetAccessor { name, param } => {
                    let has_getter = members.iter().any(|other| {
                        matches!(&other.kind, TypeMemberKind::GetAccessor { name: getter, .. } if getter.text() == name.text())
                    });
                    if has_getter {
                        continue;
                    }
                    ObjectMember::Prop {
                        name: name.text().to_string(),
                        docs,
                        optional: false,
                        readonly: false,
                        ty: match param.as_ref().and_then(|param| param.type_annotation.as_ref()) {
                            Some(ty) => self.serialize_type(cx, ty, depth)?,
                            None => SerializedType::any(),
                        },
                    }
                }
                TypeMemberKind::Unknown => ObjectMember::Unknown {
                    content: self.source_text(cx.file, member.span),
                },
            };
            serialized.push(object_member);
        }
        Ok(serialized)
    }

    /// Serialize a type read off an initializer.
    pub(crate) fn serialize_inferred(
        &mut self,
        cx: &mut TypeScope,
        ty: &InferredType<'p>,
        depth: u32,
    ) -> SerializeResult<SerializedType> {
        if depth > self.max_type_depth {
            warn!(file = %self.program.relative_path(cx.file), "inferred type exceeds serialization depth");
            return Ok(SerializedType::any());
        }
        let next = depth + 1;
        let serialized = match ty {
            InferredType::Intrinsic(name) => SerializedType::intrinsic(*name),
            InferredType::StringLiteral(value) => SerializedType::StringLiteral {
                value: value.to_string(),
            },
            InferredType::NumberLiteral(value) => SerializedType::NumericLiteral { value: *value },
            InferredType::BigIntLiteral(value) => SerializedType::BigintLiteral {
                value: value.to_string(),
            },
            InferredType::BooleanLiteral(value) => SerializedType::intrinsic(if *value { "true" } else { "false" }),
            InferredType::Array(element) => SerializedType::Array {
                readonly: false,
                inner: Box::new(self.serialize_inferred(cx, element, next)?),
            },
            InferredType::Tuple { readonly, elements } => {
                let mut serialized = Vec::with_capacity(elements.len());
                for element in elements {
                    serialized.push(SerializedTupleElement {
                        kind: TupleElementKind::Required,
                        label: None,
                        ty: self.serialize_inferred(cx, element, next)?,
                    });
                }
                SerializedType::Tuple {
                    readonly: *readonly,
                    elements: serialized,
                }
            }
            InferredType::Union(types) => {
                let mut serialized = Vec::with_capacity(types.len());
                for member in types {
                    serialized.push(self.serialize_inferred(cx, member, next)?);
                }
                SerializedType::Union { types: serialized }
            }
            InferredType::Object { readonly, members } => {
                let mut serialized = Vec::with_capacity(members.len());
                for member in members {
                    serialized.push(match member {
                        InferredMember::Property { name, ty } => ObjectMember::Prop {
                            name: name.to_string(),
                            docs: None,
                            optional: false,
                            readonly: *readonly,
                            ty: self.serialize_inferred(cx, ty, next)?,
                        },
                        InferredMember::Method { name, signature } => ObjectMember::Method {
                            name: name.to_string(),
                            docs: None,
                            optional: false,
                            signature: self.serialize_signature(
                                cx,
                                signature.signature,
                                None,
                                false,
                                signature.return_type.as_deref(),
                                next,
                            )?,
                        },
                    });
                }
                SerializedType::Object { members: serialized }
            }
            InferredType::Query(parts) => {
                let names: Vec<&str> = parts.iter().map(|part| part.text.as_str()).collect();
                SerializedType::Typeof {
                    id: self.reference_entity(cx, &names),
                    name: names.join("."),
                }
            }
            InferredType::Instance(parts) => {
                let names: Vec<&str> = parts.iter().map(|part| part.text.as_str()).collect();
                SerializedType::Reference {
                    id: self.reference_entity(cx, &names),
                    name: names.join("."),
                    type_arguments: Vec::new(),
                }
            }
            InferredType::Written(node) => self.serialize_type(cx, *node, next)?,
            InferredType::Global { name, type_arguments } => {
                let mut arguments = Vec::with_capacity(type_arguments.len());
                for argument in type_arguments {
                    arguments.push(self.serialize_inferred(cx, argument, next)?);
                }
                SerializedType::Reference {
                    id: self.reference_entity(cx, &[*name]),
                    name: name.to_string(),
                    type_arguments: arguments,
                }
            }
            InferredType::Function(function) => SerializedType::Signature(self.serialize_signature(
                cx,
                function.signature,
                None,
                false,
                function.return_type.as_deref(),
                next,
            )?),
        };
        Ok(serialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_collapse_strips_undefined() {
        let union = SerializedType::Union {
            types: vec![SerializedType::intrinsic("string"), SerializedType::intrinsic("undefined")],
        };
        assert_eq!(collapse_optional(union), SerializedType::intrinsic("string"));

        let wider = SerializedType::Union {
            types: vec![
                SerializedType::intrinsic("string"),
                SerializedType::intrinsic("number"),
                SerializedType::intrinsic("undefined"),
            ],
        };
        assert_eq!(
            collapse_optional(wider),
            SerializedType::Union {
                types: vec![SerializedType::intrinsic("string"), SerializedType::intrinsic("number")],
            }
        );

        let plain = SerializedType::Union {
            types: vec![SerializedType::intrinsic("string"), SerializedType::intrinsic("number")],
        };
        assert_eq!(collapse_optional(plain.clone()), plain);
    }
}
