//! Syntactic type inference for declarations without annotations.
//!
//! Only what can be read off the source is inferred: literal initializers,
//! array and object literals, `new` expressions, assertions, arrow and
//! function expressions, and references to other declarations (as `typeof`
//! queries). Anything else infers as `any`.

use apigraph_syntax::ast::{
    DeclIndex, DeclarationKind, Expression, ExpressionKind, FunctionBody, Ident, ObjectLiteralMember, Parameter,
    SourceFile, Signature, TypeNode, VariableDeclaration, VariableKind,
};

/// Whether literal types survive inference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Widening {
    /// `const` declarations and `readonly` properties keep literal types.
    Literal,
    /// Mutable locations widen literals to their primitive.
    Widened,
}

#[derive(Clone, Debug)]
pub enum InferredType<'a> {
    /// `string`, `number`, `any`, `void`, `undefined`, ...
    Intrinsic(&'static str),
    StringLiteral(&'a str),
    NumberLiteral(f64),
    BigIntLiteral(&'a str),
    BooleanLiteral(bool),
    Array(Box<InferredType<'a>>),
    Tuple {
        readonly: bool,
        elements: Vec<InferredType<'a>>,
    },
    Union(Vec<InferredType<'a>>),
    Object {
        readonly: bool,
        members: Vec<InferredMember<'a>>,
    },
    /// `typeof a.b`
    Query(Vec<&'a Ident>),
    /// Instance type of the named class.
    Instance(Vec<&'a Ident>),
    /// A type written in the source, e.g. in an `as` assertion.
    Written(&'a TypeNode),
    /// A lib type such as `Promise<T>`.
    Global {
        name: &'static str,
        type_arguments: Vec<InferredType<'a>>,
    },
    Function(InferredSignature<'a>),
}

#[derive(Clone, Debug)]
pub enum InferredMember<'a> {
    Property { name: &'a str, ty: InferredType<'a> },
    Method { name: &'a str, signature: InferredSignature<'a> },
}

#[derive(Clone, Debug)]
pub struct InferredSignature<'a> {
    pub signature: &'a Signature,
    /// `None` when the signature has a written return type.
    pub return_type: Option<Box<InferredType<'a>>>,
}

impl InferredType<'_> {
    pub const ANY: InferredType<'static> = InferredType::Intrinsic("any");

    /// Structural equality for the primitive and literal cases; composite
    /// types never compare equal.
    fn same_as(&self, other: &InferredType<'_>) -> bool {
        match (self, other) {
            (InferredType::Intrinsic(a), InferredType::Intrinsic(b)) => a == b,
            (InferredType::StringLiteral(a), InferredType::StringLiteral(b)) => a == b,
            (InferredType::NumberLiteral(a), InferredType::NumberLiteral(b)) => a == b,
            (InferredType::BigIntLiteral(a), InferredType::BigIntLiteral(b)) => a == b,
            (InferredType::BooleanLiteral(a), InferredType::BooleanLiteral(b)) => a == b,
            (InferredType::Array(a), InferredType::Array(b)) => a.same_as(b),
            _ => false,
        }
    }
}

/// Type of an expression at a location with the given widening.
pub fn infer_expression(expression: &Expression, widening: Widening) -> InferredType<'_> {
    let literal = widening == Widening::Literal;
    match &expression.kind {
        ExpressionKind::String(text) if literal => InferredType::StringLiteral(text),
        ExpressionKind::String(_) | ExpressionKind::Template { .. } => InferredType::Intrinsic("string"),
        ExpressionKind::Number(value) if literal => InferredType::NumberLiteral(*value),
        ExpressionKind::Number(_) => InferredType::Intrinsic("number"),
        ExpressionKind::BigInt(text) if literal => InferredType::BigIntLiteral(text),
        ExpressionKind::BigInt(_) => InferredType::Intrinsic("bigint"),
        ExpressionKind::True if literal => InferredType::BooleanLiteral(true),
        ExpressionKind::False if literal => InferredType::BooleanLiteral(false),
        ExpressionKind::True | ExpressionKind::False => InferredType::Intrinsic("boolean"),
        ExpressionKind::Null => InferredType::Intrinsic("null"),
        ExpressionKind::Entity(name) => match name.text().as_str() {
            "undefined" => InferredType::Intrinsic("undefined"),
            "NaN" | "Infinity" => InferredType::Intrinsic("number"),
            _ => InferredType::Query(name.parts.iter().collect()),
        },
        ExpressionKind::Array(elements) => {
            let element = union_of(elements.iter().map(|element| infer_expression(element, Widening::Widened)));
            InferredType::Array(Box::new(element.unwrap_or(InferredType::ANY)))
        }
        ExpressionKind::Object(members) => InferredType::Object {
            readonly: false,
            members: infer_object_members(members, Widening::Widened),
        },
        ExpressionKind::New { callee: Some(callee) } => InferredType::Instance(callee.parts.iter().collect()),
        ExpressionKind::As { ty, .. } => InferredType::Written(ty),
        ExpressionKind::AsConst(inner) => infer_const_assertion(inner),
        ExpressionKind::Function {
            signature,
            body,
            body_expression,
            is_async,
        } => InferredType::Function(InferredSignature {
            signature,
            return_type: infer_return_type(signature, body.as_ref(), body_expression.as_deref(), *is_async)
                .map(Box::new),
        }),
        ExpressionKind::Prefix { operator, operand } => match (operator.as_str(), &operand.kind) {
            ("-", ExpressionKind::Number(value)) if literal => InferredType::NumberLiteral(-value),
            ("+", ExpressionKind::Number(value)) if literal => InferredType::NumberLiteral(*value),
            ("-", ExpressionKind::BigInt(_)) => InferredType::Intrinsic("bigint"),
            ("-" | "+" | "~", _) => InferredType::Intrinsic("number"),
            ("!", _) => InferredType::Intrinsic("boolean"),
            ("typeof", _) => InferredType::Intrinsic("string"),
            ("void", _) => InferredType::Intrinsic("undefined"),
            _ => InferredType::ANY,
        },
        ExpressionKind::New { callee: None } | ExpressionKind::Unknown => InferredType::ANY,
    }
}

/// `expr as const`: literals are kept and containers become readonly.
fn infer_const_assertion(expression: &Expression) -> InferredType<'_> {
    match &expression.kind {
        ExpressionKind::Array(elements) => InferredType::Tuple {
            readonly: true,
            elements: elements.iter().map(infer_const_assertion).collect(),
        },
        ExpressionKind::Object(members) => InferredType::Object {
            readonly: true,
            members: members
                .iter()
                .filter_map(|member| match member {
                    ObjectLiteralMember::Property { name, value } => Some(InferredMember::Property {
                        name: name.text(),
                        ty: infer_const_assertion(value),
                    }),
                    _ => infer_object_member(member, Widening::Literal),
                })
                .collect(),
        },
        _ => infer_expression(expression, Widening::Literal),
    }
}

fn infer_object_members(members: &[ObjectLiteralMember], widening: Widening) -> Vec<InferredMember<'_>> {
    members
        .iter()
        .filter_map(|member| infer_object_member(member, widening))
        .collect()
}

fn infer_object_member(member: &ObjectLiteralMember, widening: Widening) -> Option<InferredMember<'_>> {
    match member {
        ObjectLiteralMember::Property { name, value } => Some(InferredMember::Property {
            name: name.text(),
            ty: infer_expression(value, widening),
        }),
        ObjectLiteralMember::Shorthand(ident) => Some(InferredMember::Property {
            name: &ident.text,
            ty: InferredType::Query(vec![ident]),
        }),
        ObjectLiteralMember::Method { name, signature } => Some(InferredMember::Method {
            name: name.text(),
            signature: InferredSignature {
                signature,
                return_type: infer_return_type(signature, None, None, false).map(Box::new),
            },
        }),
        // Spread members contribute properties that cannot be read syntactically.
        ObjectLiteralMember::Spread(_) => None,
    }
}

/// Deduplicated union; `None` for no types.
fn union_of<'a>(types: impl Iterator<Item = InferredType<'a>>) -> Option<InferredType<'a>> {
    let mut members: Vec<InferredType<'a>> = Vec::new();
    for ty in types {
        if !members.iter().any(|existing| existing.same_as(&ty)) {
            members.push(ty);
        }
    }
    match members.len() {
        0 => None,
        1 => members.pop(),
        _ => Some(InferredType::Union(members)),
    }
}

/// Return type of a function without a written return type; `None` when one
/// is written.
pub fn infer_return_type<'a>(
    signature: &'a Signature,
    body: Option<&FunctionBody>,
    body_expression: Option<&'a Expression>,
    is_async: bool,
) -> Option<InferredType<'a>> {
    if signature.return_type.is_some() {
        return None;
    }
    let inferred = match (body_expression, body) {
        (Some(expression), _) => infer_expression(expression, Widening::Widened),
        (None, Some(body)) if body.has_return_value => InferredType::ANY,
        (None, Some(_)) => InferredType::Intrinsic("void"),
        (None, None) => InferredType::ANY,
    };
    Some(if is_async {
        InferredType::Global {
            name: "Promise",
            type_arguments: vec![inferred],
        }
    } else {
        inferred
    })
}

/// Type of a variable: the annotation, else its initializer.
pub fn infer_variable_type(declaration: &VariableDeclaration) -> InferredType<'_> {
    if let Some(ty) = &declaration.type_annotation {
        return InferredType::Written(ty);
    }
    let widening = match declaration.variable_kind {
        VariableKind::Const => Widening::Literal,
        VariableKind::Let | VariableKind::Var => Widening::Widened,
    };
    declaration
        .initializer
        .as_ref()
        .map_or(InferredType::ANY, |initializer| infer_expression(initializer, widening))
}

/// Type of a class property from its initializer.
pub fn infer_property_type(initializer: Option<&Expression>, readonly: bool) -> InferredType<'_> {
    let widening = if readonly { Widening::Literal } else { Widening::Widened };
    initializer.map_or(InferredType::ANY, |initializer| infer_expression(initializer, widening))
}

pub fn infer_parameter_type(parameter: &Parameter) -> InferredType<'_> {
    if let Some(ty) = &parameter.type_annotation {
        return InferredType::Written(ty);
    }
    if parameter.dot_dot_dot {
        return InferredType::Array(Box::new(InferredType::ANY));
    }
    parameter
        .initializer
        .as_ref()
        .map_or(InferredType::ANY, |initializer| infer_expression(initializer, Widening::Widened))
}

/// Constant value of an enum member.
#[derive(Clone, Debug, PartialEq)]
pub enum EnumValue {
    String(String),
    Number(f64),
}

/// Values of an enum's members in declaration order. Members without an
/// initializer continue counting from the previous numeric member; members
/// whose value cannot be computed syntactically are `None`, as is every
/// later member without an initializer.
pub fn enum_member_values(source: &SourceFile, members: &[DeclIndex]) -> Vec<Option<EnumValue>> {
    let mut values: Vec<Option<EnumValue>> = Vec::with_capacity(members.len());
    let mut next: Option<f64> = Some(0.0);

    for index in members {
        let initializer = match &source.decl(*index).kind {
            DeclarationKind::EnumMember(member) => member.initializer.as_ref(),
            _ => None,
        };
        let value = match initializer {
            None => next.map(EnumValue::Number),
            Some(expression) => constant_value(source, members, &values, expression),
        };
        next = match &value {
            Some(EnumValue::Number(number)) => Some(number + 1.0),
            _ => None,
        };
        values.push(value);
    }
    values
}

fn constant_value(
    source: &SourceFile,
    members: &[DeclIndex],
    earlier: &[Option<EnumValue>],
    expression: &Expression,
) -> Option<EnumValue> {
    match &expression.kind {
        ExpressionKind::String(text) => Some(EnumValue::String(text.clone())),
        ExpressionKind::Number(value) => Some(EnumValue::Number(*value)),
        ExpressionKind::Prefix { operator, operand } => {
            match (operator.as_str(), constant_value(source, members, earlier, operand)?) {
                ("-", EnumValue::Number(value)) => Some(EnumValue::Number(-value)),
                ("+", EnumValue::Number(value)) => Some(EnumValue::Number(value)),
                _ => None,
            }
        }
        // A reference to an earlier member of the same enum, optionally
        // qualified by the enum name.
        ExpressionKind::Entity(name) => {
            let member_name = &name.last().text;
            let position = members
                .iter()
                .take(earlier.len())
                .position(|index| &source.decl(*index).name.text == member_name)?;
            earlier[position].clone()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unions_drop_duplicate_primitives() {
        let union = union_of(
            [
                InferredType::Intrinsic("number"),
                InferredType::Intrinsic("string"),
                InferredType::Intrinsic("number"),
            ]
            .into_iter(),
        );
        match union {
            Some(InferredType::Union(members)) => assert_eq!(members.len(), 2),
            other => panic!("expected a union, got {other:?}"),
        }
        assert!(union_of(std::iter::empty()).is_none());
    }
}
