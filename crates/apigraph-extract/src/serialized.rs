//! The serialized symbol graph: declarations and type expressions as plain,
//! tree-shaped data.
//!
//! Named types never nest: a type that refers to an interface, class, alias
//! or enum holds a [`SerializedType::Reference`] with the target's
//! [`SymbolId`], so cyclic type graphs serialize as finite trees.

use crate::ids::SymbolId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SerializedSymbol {
    Function {
        name: String,
        docs: Option<String>,
        signatures: Vec<SerializedSignature>,
    },
    Module {
        name: String,
        docs: Option<String>,
        /// Export name → target, in export table order.
        exports: IndexMap<String, SymbolId>,
    },
    Variable {
        name: String,
        docs: Option<String>,
        variable_kind: VariableKindName,
        #[serde(rename = "type")]
        ty: SerializedType,
    },
    TypeAlias {
        name: String,
        docs: Option<String>,
        type_params: Vec<SerializedTypeParameter>,
        #[serde(rename = "type")]
        ty: SerializedType,
    },
    Interface {
        name: String,
        docs: Option<String>,
        type_params: Vec<SerializedTypeParameter>,
        extends: Vec<SerializedType>,
        members: Vec<ObjectMember>,
    },
    Class {
        name: String,
        docs: Option<String>,
        type_params: Vec<SerializedTypeParameter>,
        extends: Option<SerializedType>,
        implements: Vec<SerializedType>,
        constructors: Vec<SerializedSignature>,
        members: Vec<ClassMember>,
        has_private_members: bool,
        #[serde(rename = "abstract")]
        is_abstract: bool,
    },
    Enum {
        name: String,
        docs: Option<String>,
        #[serde(rename = "const")]
        is_const: bool,
        members: Vec<SymbolId>,
    },
    EnumMember {
        name: String,
        docs: Option<String>,
        value: Option<EnumMemberValue>,
    },
    /// A declaration that could not be serialized.
    Unknown {
        name: String,
        docs: Option<String>,
        content: String,
        error: String,
    },
}

impl SerializedSymbol {
    pub fn name(&self) -> &str {
        match self {
            SerializedSymbol::Function { name, .. }
            | SerializedSymbol::Module { name, .. }
            | SerializedSymbol::Variable { name, .. }
            | SerializedSymbol::TypeAlias { name, .. }
            | SerializedSymbol::Interface { name, .. }
            | SerializedSymbol::Class { name, .. }
            | SerializedSymbol::Enum { name, .. }
            | SerializedSymbol::EnumMember { name, .. }
            | SerializedSymbol::Unknown { name, .. } => name,
        }
    }

    pub fn docs(&self) -> Option<&str> {
        match self {
            SerializedSymbol::Function { docs, .. }
            | SerializedSymbol::Module { docs, .. }
            | SerializedSymbol::Variable { docs, .. }
            | SerializedSymbol::TypeAlias { docs, .. }
            | SerializedSymbol::Interface { docs, .. }
            | SerializedSymbol::Class { docs, .. }
            | SerializedSymbol::Enum { docs, .. }
            | SerializedSymbol::EnumMember { docs, .. }
            | SerializedSymbol::Unknown { docs, .. } => docs.as_deref(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SerializedSymbol::Function { .. } => "function",
            SerializedSymbol::Module { .. } => "module",
            SerializedSymbol::Variable { .. } => "variable",
            SerializedSymbol::TypeAlias { .. } => "type-alias",
            SerializedSymbol::Interface { .. } => "interface",
            SerializedSymbol::Class { .. } => "class",
            SerializedSymbol::Enum { .. } => "enum",
            SerializedSymbol::EnumMember { .. } => "enum-member",
            SerializedSymbol::Unknown { .. } => "unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKindName {
    Var,
    Let,
    Const,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumMemberValue {
    String(String),
    Number(f64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedTypeParameter {
    pub name: String,
    pub constraint: Option<SerializedType>,
    pub default: Option<SerializedType>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SerializedType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub rest: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedSignature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    pub type_params: Vec<SerializedTypeParameter>,
    pub parameters: Vec<SerializedParameter>,
    pub return_type: Box<SerializedType>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_constructor: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TupleElementKind {
    Required,
    Optional,
    Rest,
    Variadic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedTupleElement {
    pub kind: TupleElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub ty: SerializedType,
}

/// `+readonly`, `-readonly` or a bare `readonly` on a mapped type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappedModifierName {
    Present,
    Add,
    Remove,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ObjectMember {
    Prop {
        name: String,
        docs: Option<String>,
        optional: bool,
        readonly: bool,
        #[serde(rename = "type")]
        ty: SerializedType,
    },
    Index {
        docs: Option<String>,
        key_name: String,
        key_type: SerializedType,
        readonly: bool,
        #[serde(rename = "type")]
        ty: SerializedType,
    },
    Method {
        name: String,
        docs: Option<String>,
        optional: bool,
        signature: SerializedSignature,
    },
    Call {
        docs: Option<String>,
        signature: SerializedSignature,
    },
    Constructor {
        docs: Option<String>,
        signature: SerializedSignature,
    },
    Unknown {
        content: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMember {
    #[serde(flatten)]
    pub member: ObjectMember,
    #[serde(rename = "static", default, skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(rename = "protected", default, skip_serializing_if = "is_false")]
    pub is_protected: bool,
    #[serde(rename = "abstract", default, skip_serializing_if = "is_false")]
    pub is_abstract: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SerializedType {
    /// `string`, `any`, `this`, `true`, `unique symbol`, ...
    Intrinsic {
        value: String,
    },
    Reference {
        id: SymbolId,
        name: String,
        type_arguments: Vec<SerializedType>,
    },
    Typeof {
        id: SymbolId,
        name: String,
    },
    Array {
        readonly: bool,
        inner: Box<SerializedType>,
    },
    TypeParameter {
        name: String,
    },
    Union {
        types: Vec<SerializedType>,
    },
    Intersection {
        types: Vec<SerializedType>,
    },
    Infer {
        name: String,
        constraint: Option<Box<SerializedType>>,
    },
    Paren {
        value: Box<SerializedType>,
    },
    Tuple {
        readonly: bool,
        elements: Vec<SerializedTupleElement>,
    },
    Object {
        members: Vec<ObjectMember>,
    },
    IndexedAccess {
        object: Box<SerializedType>,
        index: Box<SerializedType>,
    },
    Conditional {
        check_type: Box<SerializedType>,
        extends_type: Box<SerializedType>,
        true_type: Box<SerializedType>,
        false_type: Box<SerializedType>,
    },
    StringLiteral {
        value: String,
    },
    NumericLiteral {
        value: f64,
    },
    BigintLiteral {
        value: String,
    },
    Keyof {
        value: Box<SerializedType>,
    },
    Mapped {
        param: String,
        constraint: Box<SerializedType>,
        name_type: Option<Box<SerializedType>>,
        readonly: Option<MappedModifierName>,
        optional: Option<MappedModifierName>,
        #[serde(rename = "type")]
        ty: Option<Box<SerializedType>>,
    },
    Signature(SerializedSignature),
    TypePredicate {
        asserts: bool,
        param: String,
        #[serde(rename = "type")]
        ty: Option<Box<SerializedType>>,
    },
    /// Source text of a construct with no structured form.
    Raw {
        value: String,
    },
}

impl SerializedType {
    pub fn intrinsic(value: impl Into<String>) -> Self {
        SerializedType::Intrinsic { value: value.into() }
    }

    pub fn any() -> Self {
        SerializedType::intrinsic("any")
    }

    pub fn is_intrinsic(&self, name: &str) -> bool {
        matches!(self, SerializedType::Intrinsic { value } if value == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn types_serialize_with_kebab_case_tags() {
        let ty = SerializedType::Array {
            readonly: true,
            inner: Box::new(SerializedType::TypeParameter { name: "T".to_string() }),
        };
        assert_eq!(
            serde_json::to_value(&ty).unwrap(),
            json!({ "kind": "array", "readonly": true, "inner": { "kind": "type-parameter", "name": "T" } })
        );
    }

    #[test]
    fn class_members_flatten_their_member_kind() {
        let member = ClassMember {
            member: ObjectMember::Prop {
                name: "id".to_string(),
                docs: None,
                optional: false,
                readonly: true,
                ty: SerializedType::intrinsic("number"),
            },
            is_static: true,
            is_protected: false,
            is_abstract: false,
        };
        assert_eq!(
            serde_json::to_value(&member).unwrap(),
            json!({
                "kind": "prop",
                "name": "id",
                "docs": null,
                "optional": false,
                "readonly": true,
                "type": { "kind": "intrinsic", "value": "number" },
                "static": true
            })
        );
    }

    #[test]
    fn enum_member_values_are_untagged() {
        let member = SerializedSymbol::EnumMember {
            name: "A".to_string(),
            docs: None,
            value: Some(EnumMemberValue::Number(1.0)),
        };
        assert_eq!(
            serde_json::to_value(&member).unwrap(),
            json!({ "kind": "enum-member", "name": "A", "docs": null, "value": 1.0 })
        );
    }
}
