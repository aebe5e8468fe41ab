//! Pre-order traversal over the type nodes of a declaration.

use crate::ast::{
    ClassMemberKind, Declaration, DeclarationKind, Signature, TypeMember, TypeMemberKind, TypeNode,
    TypeNodeKind, TypeParameter,
};

/// Calls `visitor` on every type node written in `decl`, outermost first.
///
/// Namespace bodies and enum members are separate declarations and are not
/// visited through their parent.
pub fn walk_declaration_types<'a>(decl: &'a Declaration, visitor: &mut impl FnMut(&'a TypeNode)) {
    match &decl.kind {
        DeclarationKind::Function(function) => walk_signature(&function.signature, visitor),
        DeclarationKind::Variable(variable) => {
            if let Some(ty) = &variable.type_annotation {
                walk_type(ty, visitor);
            }
        }
        DeclarationKind::TypeAlias(alias) => {
            walk_type_params(&alias.type_params, visitor);
            walk_type(&alias.ty, visitor);
        }
        DeclarationKind::Interface(interface) => {
            walk_type_params(&interface.type_params, visitor);
            for ty in &interface.extends {
                walk_type(ty, visitor);
            }
            walk_members(&interface.members, visitor);
        }
        DeclarationKind::Class(class) => {
            walk_type_params(&class.type_params, visitor);
            for ty in class.extends.iter().chain(&class.implements) {
                walk_type(ty, visitor);
            }
            for member in &class.members {
                match &member.kind {
                    ClassMemberKind::Property { ty, .. }
                    | ClassMemberKind::GetAccessor { ty, .. }
                    | ClassMemberKind::Index { ty, .. } => {
                        if let Some(ty) = ty {
                            walk_type(ty, visitor);
                        }
                    }
                    ClassMemberKind::Method { signature, .. }
                    | ClassMemberKind::Constructor { signature, .. } => walk_signature(signature, visitor),
                    ClassMemberKind::SetAccessor { param, .. } => {
                        if let Some(ty) = param.as_ref().and_then(|param| param.type_annotation.as_ref()) {
                            walk_type(ty, visitor);
                        }
                    }
                    ClassMemberKind::Unknown => {}
                }
            }
        }
        DeclarationKind::Enum(_) | DeclarationKind::EnumMember(_) | DeclarationKind::Module(_) => {}
    }
}

pub fn walk_type<'a>(ty: &'a TypeNode, visitor: &mut impl FnMut(&'a TypeNode)) {
    visitor(ty);
    match &ty.kind {
        TypeNodeKind::Reference { type_arguments, .. }
        | TypeNodeKind::Query { type_arguments, .. }
        | TypeNodeKind::Import { type_arguments, .. } => {
            for arg in type_arguments {
                walk_type(arg, visitor);
            }
        }
        TypeNodeKind::Array(inner) | TypeNodeKind::Parenthesized(inner) => walk_type(inner, visitor),
        TypeNodeKind::Operator { ty, .. } => walk_type(ty, visitor),
        TypeNodeKind::Union(types) | TypeNodeKind::Intersection(types) => {
            for ty in types {
                walk_type(ty, visitor);
            }
        }
        TypeNodeKind::Infer { constraint, .. } => {
            if let Some(constraint) = constraint {
                walk_type(constraint, visitor);
            }
        }
        TypeNodeKind::Tuple(elements) => {
            for element in elements {
                walk_type(&element.ty, visitor);
            }
        }
        TypeNodeKind::TypeLiteral(members) => walk_members(members, visitor),
        TypeNodeKind::IndexedAccess { object, index } => {
            walk_type(object, visitor);
            walk_type(index, visitor);
        }
        TypeNodeKind::Conditional {
            check,
            extends,
            true_type,
            false_type,
        } => {
            walk_type(check, visitor);
            walk_type(extends, visitor);
            for branch in [true_type, false_type].into_iter().flatten() {
                walk_type(branch, visitor);
            }
        }
        TypeNodeKind::Mapped {
            constraint,
            name_type,
            ty,
            ..
        } => {
            walk_type(constraint, visitor);
            for inner in [name_type, ty].into_iter().flatten() {
                walk_type(inner, visitor);
            }
        }
        TypeNodeKind::Function(signature) | TypeNodeKind::Constructor { signature, .. } => {
            walk_signature(signature, visitor);
        }
        TypeNodeKind::TypePredicate { ty, .. } => {
            if let Some(ty) = ty {
                walk_type(ty, visitor);
            }
        }
        TypeNodeKind::Keyword(_)
        | TypeNodeKind::Literal(_)
        | TypeNodeKind::TemplateLiteral
        | TypeNodeKind::Unsupported => {}
    }
}

fn walk_type_params<'a>(params: &'a [TypeParameter], visitor: &mut impl FnMut(&'a TypeNode)) {
    for param in params {
        for ty in param.constraint.iter().chain(&param.default) {
            walk_type(ty, visitor);
        }
    }
}

fn walk_signature<'a>(signature: &'a Signature, visitor: &mut impl FnMut(&'a TypeNode)) {
    walk_type_params(&signature.type_params, visitor);
    for param in &signature.params {
        if let Some(ty) = &param.type_annotation {
            walk_type(ty, visitor);
        }
    }
    if let Some(ty) = &signature.return_type {
        walk_type(ty, visitor);
    }
}

fn walk_members<'a>(members: &'a [TypeMember], visitor: &mut impl FnMut(&'a TypeNode)) {
    for member in members {
        match &member.kind {
            TypeMemberKind::Property { ty, .. }
            | TypeMemberKind::Index { ty, .. }
            | TypeMemberKind::GetAccessor { ty, .. } => {
                if let Some(ty) = ty {
                    walk_type(ty, visitor);
                }
            }
            TypeMemberKind::Method { signature, .. }
            | TypeMemberKind::Call(signature)
            | TypeMemberKind::Construct(signature) => walk_signature(signature, visitor),
            TypeMemberKind::SetAccessor { param, .. } => {
                if let Some(ty) = param.as_ref().and_then(|param| param.type_annotation.as_ref()) {
                    walk_type(ty, visitor);
                }
            }
            TypeMemberKind::Unknown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn visits_nested_import_types() {
        let file = parse(
            "a.d.ts",
            "export declare function f<T extends import(\"./x\").X>(a: { b: Array<import(\"./y\").Y> }): void;",
        );
        let decl = file.decl(file.top_level_declarations().next().unwrap());
        let mut specifiers = Vec::new();
        walk_declaration_types(decl, &mut |ty| {
            if let TypeNodeKind::Import { specifier, .. } = &ty.kind {
                specifiers.push(specifier.clone());
            }
        });
        assert_eq!(specifiers, vec!["./x", "./y"]);
    }
}
