//! Parser state - class bodies

use super::ParserState;
use crate::ast::{ClassMember, ClassMemberKind, FunctionBody, ModifierFlags};
use crate::scanner::SyntaxKind;

const CLASS_MEMBER_MODIFIERS: &[(&str, ModifierFlags)] = &[
    ("public", ModifierFlags::PUBLIC),
    ("private", ModifierFlags::PRIVATE),
    ("protected", ModifierFlags::PROTECTED),
    ("static", ModifierFlags::STATIC),
    ("readonly", ModifierFlags::READONLY),
    ("abstract", ModifierFlags::ABSTRACT),
    ("override", ModifierFlags::OVERRIDE),
    ("declare", ModifierFlags::DECLARE),
    ("accessor", ModifierFlags::ACCESSOR),
    ("async", ModifierFlags::ASYNC),
];

impl ParserState {
    pub(crate) fn parse_class_members(&mut self) -> Vec<ClassMember> {
        let mut members = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return members;
        }
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            if self.parse_optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            let before = self.token_pos();
            members.push(self.parse_class_member());
            if self.token_pos() == before {
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        members
    }

    fn parse_class_member_modifiers(&mut self) -> ModifierFlags {
        let mut modifiers = ModifierFlags::empty();
        'modifiers: loop {
            for (word, flag) in CLASS_MEMBER_MODIFIERS {
                if self.is_word(word) && self.look_ahead_is_member_name_after_modifier() {
                    self.next_token();
                    modifiers |= *flag;
                    continue 'modifiers;
                }
            }
            return modifiers;
        }
    }

    fn parse_class_member(&mut self) -> ClassMember {
        let doc = self.parse_leading_doc();
        let start = self.token_pos();
        self.skip_decorators();
        let modifiers = self.parse_class_member_modifiers();

        let kind = self.parse_class_member_kind();
        self.parse_optional(SyntaxKind::SemicolonToken);
        ClassMember {
            span: self.span_from(start),
            doc,
            modifiers,
            kind,
        }
    }

    fn parse_class_member_kind(&mut self) -> ClassMemberKind {
        // `static { ... }`
        if self.is_word("static") && self.next_token_is(SyntaxKind::OpenBraceToken) {
            self.next_token();
            self.skip_balanced();
            return ClassMemberKind::Unknown;
        }

        if self.is_token(SyntaxKind::OpenBracketToken) && self.look_ahead_is_index_signature() {
            let (params, ty) = self.parse_index_signature();
            return ClassMemberKind::Index { params, ty };
        }

        if self.is_word("constructor")
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::OpenParenToken) || p.is_token(SyntaxKind::LessThanToken)
            })
        {
            self.next_token();
            let signature = self.parse_signature(SyntaxKind::ColonToken);
            let body = self.parse_optional_function_body();
            return ClassMemberKind::Constructor { signature, body };
        }

        if (self.is_word("get") || self.is_word("set")) && self.look_ahead_is_member_name_after_modifier() {
            let is_get = self.is_word("get");
            self.next_token();
            let name = self.parse_property_name();
            let signature = self.parse_signature(SyntaxKind::ColonToken);
            let body = self.parse_optional_function_body();
            return if is_get {
                ClassMemberKind::GetAccessor {
                    name,
                    ty: signature.return_type.map(|ty| *ty),
                    body,
                }
            } else {
                ClassMemberKind::SetAccessor {
                    name,
                    param: signature.params.into_iter().next().map(Box::new),
                }
            };
        }

        self.parse_optional(SyntaxKind::AsteriskToken);
        let name = self.parse_property_name();
        let optional = self.parse_optional(SyntaxKind::QuestionToken);
        self.parse_optional(SyntaxKind::ExclamationToken);

        if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken) {
            let signature = self.parse_signature(SyntaxKind::ColonToken);
            let body = self.parse_optional_function_body();
            return ClassMemberKind::Method {
                name,
                optional,
                signature,
                body,
            };
        }

        let ty = self
            .parse_optional(SyntaxKind::ColonToken)
            .then(|| self.parse_type_allowing_conditionals());
        let initializer = self
            .parse_optional(SyntaxKind::EqualsToken)
            .then(|| self.parse_assignment_expression());
        self.parse_semicolon();
        ClassMemberKind::Property {
            name,
            optional,
            ty,
            initializer,
        }
    }

    fn parse_optional_function_body(&mut self) -> Option<FunctionBody> {
        if self.is_token(SyntaxKind::OpenBraceToken) {
            Some(self.skip_function_body())
        } else {
            self.parse_semicolon();
            None
        }
    }
}
