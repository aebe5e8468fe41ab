//! Parser state - types, type members, parameters and signatures

use super::{CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, ParserState};
use crate::ast::{
    EntityName, Ident, LiteralType, MappedModifier, ModifierFlags, Parameter, PropertyName, Signature,
    TupleElement, TypeMember, TypeMemberKind, TypeNode, TypeNodeKind, TypeOperator, TypeParameter,
};
use crate::scanner::{SyntaxKind, parse_numeric_value};
use apigraph_common::Span;
use apigraph_common::diagnostics::diagnostic_codes;

/// Type keywords serialized as intrinsics.
const KEYWORD_TYPES: &[&str] = &[
    "any", "bigint", "boolean", "false", "intrinsic", "never", "null", "number", "object", "string",
    "symbol", "this", "true", "undefined", "unknown", "void",
];

const PARAMETER_MODIFIERS: &[(&str, ModifierFlags)] = &[
    ("public", ModifierFlags::PUBLIC),
    ("private", ModifierFlags::PRIVATE),
    ("protected", ModifierFlags::PROTECTED),
    ("readonly", ModifierFlags::READONLY),
    ("override", ModifierFlags::OVERRIDE),
];

impl ParserState {
    // =========================================================================
    // Parse Methods - Types
    // =========================================================================

    fn unsupported_type(&self, start: u32) -> TypeNode {
        TypeNode {
            span: self.span_from(start),
            kind: TypeNodeKind::Unsupported,
        }
    }

    /// Tokens that end a type; `parse_type` never consumes them on error.
    fn is_type_terminator(&self) -> bool {
        matches!(
            self.current_token,
            SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::CommaToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::GreaterThanToken
                | SyntaxKind::EqualsToken
                | SyntaxKind::EqualsGreaterThanToken
                | SyntaxKind::EndOfFileToken
        )
    }

    /// Parse a type (functions, unions, intersections, conditionals).
    pub(crate) fn parse_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        if !self.enter_recursion() {
            while !self.is_type_terminator() {
                if self.is_token(SyntaxKind::OpenParenToken)
                    || self.is_token(SyntaxKind::OpenBracketToken)
                    || self.is_token(SyntaxKind::OpenBraceToken)
                {
                    self.skip_balanced();
                } else {
                    self.next_token();
                }
            }
            return self.unsupported_type(start);
        }
        let ty = self.parse_type_worker();
        self.leave_recursion();
        ty
    }

    fn parse_type_worker(&mut self) -> TypeNode {
        let start = self.token_pos();
        if self.is_start_of_function_type() {
            let signature = self.parse_signature(SyntaxKind::EqualsGreaterThanToken);
            return TypeNode {
                span: self.span_from(start),
                kind: TypeNodeKind::Function(signature),
            };
        }
        if self.is_word("new") || (self.is_word("abstract") && self.next_token_is_word("new")) {
            let is_abstract = self.parse_optional_word("abstract");
            self.next_token();
            let signature = self.parse_signature(SyntaxKind::EqualsGreaterThanToken);
            return TypeNode {
                span: self.span_from(start),
                kind: TypeNodeKind::Constructor {
                    signature,
                    is_abstract,
                },
            };
        }

        let check = self.parse_union_type();
        if self.context_flags & CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES != 0
            || self.has_preceding_line_break()
            || !self.is_word("extends")
        {
            return check;
        }

        self.next_token();
        let saved_flags = self.context_flags;
        self.context_flags |= CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES;
        let extends = self.parse_type();
        self.context_flags = saved_flags;

        let mut true_type = None;
        let mut false_type = None;
        if self.parse_expected(SyntaxKind::QuestionToken) {
            true_type = Some(Box::new(self.parse_type_allowing_conditionals()));
            if self.parse_expected(SyntaxKind::ColonToken) {
                false_type = Some(Box::new(self.parse_type_allowing_conditionals()));
            }
        }
        TypeNode {
            span: self.span_from(start),
            kind: TypeNodeKind::Conditional {
                check: Box::new(check),
                extends: Box::new(extends),
                true_type,
                false_type,
            },
        }
    }

    /// Nested type contexts (brackets, branches, return types) re-enable
    /// conditional types.
    pub(crate) fn parse_type_allowing_conditionals(&mut self) -> TypeNode {
        let saved_flags = self.context_flags;
        self.context_flags &= !CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES;
        let ty = self.parse_type();
        self.context_flags = saved_flags;
        ty
    }

    /// `<T>(...) =>` or `(...) =>`, decided by skipping the parenthesized group.
    fn is_start_of_function_type(&mut self) -> bool {
        if self.is_token(SyntaxKind::LessThanToken) {
            return true;
        }
        if !self.is_token(SyntaxKind::OpenParenToken) {
            return false;
        }
        self.look_ahead(|p| {
            p.skip_balanced();
            p.is_token(SyntaxKind::EqualsGreaterThanToken)
        })
    }

    fn parse_union_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        let leading = self.parse_optional(SyntaxKind::BarToken);
        let first = self.parse_intersection_type();
        if !self.is_token(SyntaxKind::BarToken) {
            return if leading {
                TypeNode {
                    span: self.span_from(start),
                    kind: first.kind,
                }
            } else {
                first
            };
        }
        let mut types = vec![first];
        while self.parse_optional(SyntaxKind::BarToken) {
            types.push(self.parse_intersection_type());
        }
        TypeNode {
            span: self.span_from(start),
            kind: TypeNodeKind::Union(types),
        }
    }

    fn parse_intersection_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        let leading = self.parse_optional(SyntaxKind::AmpersandToken);
        let first = self.parse_type_operator();
        if !self.is_token(SyntaxKind::AmpersandToken) {
            return if leading {
                TypeNode {
                    span: self.span_from(start),
                    kind: first.kind,
                }
            } else {
                first
            };
        }
        let mut types = vec![first];
        while self.parse_optional(SyntaxKind::AmpersandToken) {
            types.push(self.parse_type_operator());
        }
        TypeNode {
            span: self.span_from(start),
            kind: TypeNodeKind::Intersection(types),
        }
    }

    /// Does the token after the current word start an operand type?
    fn next_token_starts_operand(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            !p.is_type_terminator()
                && !matches!(
                    p.current_token,
                    SyntaxKind::BarToken
                        | SyntaxKind::AmpersandToken
                        | SyntaxKind::QuestionToken
                        | SyntaxKind::ColonToken
                        | SyntaxKind::DotToken
                )
        })
    }

    fn parse_type_operator(&mut self) -> TypeNode {
        let start = self.token_pos();
        let operator = if self.is_word("keyof") {
            Some(TypeOperator::Keyof)
        } else if self.is_word("readonly") {
            Some(TypeOperator::Readonly)
        } else if self.is_word("unique") && !self.next_token_is_word("symbol") {
            Some(TypeOperator::Unique)
        } else {
            None
        };
        if let Some(operator) = operator.filter(|_| self.next_token_starts_operand()) {
            self.next_token();
            let ty = self.parse_type_operator();
            return TypeNode {
                span: self.span_from(start),
                kind: TypeNodeKind::Operator {
                    operator,
                    ty: Box::new(ty),
                },
            };
        }
        if self.is_word("infer") && self.next_token_is_identifier_on_same_line() {
            self.next_token();
            let name = self.parse_identifier();
            let constraint = self.try_parse(|p| {
                if !p.parse_optional_word("extends") {
                    return None;
                }
                let saved_flags = p.context_flags;
                p.context_flags |= CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES;
                let constraint = p.parse_type();
                p.context_flags = saved_flags;
                // `infer U extends X ? A : B` is a conditional, not a constraint.
                let is_conditional = saved_flags & CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES == 0
                    && p.is_token(SyntaxKind::QuestionToken);
                (!is_conditional).then(|| Box::new(constraint))
            });
            return TypeNode {
                span: self.span_from(start),
                kind: TypeNodeKind::Infer { name, constraint },
            };
        }
        self.parse_postfix_type()
    }

    fn parse_postfix_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        let mut ty = self.parse_non_array_type();
        while !self.has_preceding_line_break() {
            if self.is_token(SyntaxKind::OpenBracketToken) {
                self.next_token();
                if self.parse_optional(SyntaxKind::CloseBracketToken) {
                    ty = TypeNode {
                        span: self.span_from(start),
                        kind: TypeNodeKind::Array(Box::new(ty)),
                    };
                } else {
                    let index = self.parse_type_allowing_conditionals();
                    self.parse_expected(SyntaxKind::CloseBracketToken);
                    ty = TypeNode {
                        span: self.span_from(start),
                        kind: TypeNodeKind::IndexedAccess {
                            object: Box::new(ty),
                            index: Box::new(index),
                        },
                    };
                }
            } else if self.is_token(SyntaxKind::ExclamationToken) {
                // JSDoc non-nullable postfix
                self.next_token();
            } else {
                break;
            }
        }
        ty
    }

    fn parse_non_array_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        let token = self.current_token;
        match token {
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let inner = self.parse_type_allowing_conditionals();
                self.parse_expected(SyntaxKind::CloseParenToken);
                TypeNode {
                    span: self.span_from(start),
                    kind: TypeNodeKind::Parenthesized(Box::new(inner)),
                }
            }
            SyntaxKind::OpenBracketToken => self.parse_tuple_type(),
            SyntaxKind::OpenBraceToken => {
                if self.look_ahead_is_mapped_type() {
                    self.parse_mapped_type()
                } else {
                    let members = self.parse_object_type_members();
                    TypeNode {
                        span: self.span_from(start),
                        kind: TypeNodeKind::TypeLiteral(members),
                    }
                }
            }
            SyntaxKind::StringLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                self.literal_type(start, LiteralType::String(value))
            }
            SyntaxKind::NumericLiteral => {
                let value = parse_numeric_value(self.token_value());
                self.next_token();
                self.literal_type(start, LiteralType::Number(value))
            }
            SyntaxKind::BigIntLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                self.literal_type(start, LiteralType::BigInt(value))
            }
            SyntaxKind::MinusToken if self.next_token_is(SyntaxKind::NumericLiteral) => {
                self.next_token();
                let value = parse_numeric_value(self.token_value());
                self.next_token();
                self.literal_type(start, LiteralType::Number(-value))
            }
            SyntaxKind::MinusToken if self.next_token_is(SyntaxKind::BigIntLiteral) => {
                self.next_token();
                let value = format!("-{}", self.token_value());
                self.next_token();
                self.literal_type(start, LiteralType::BigInt(value))
            }
            SyntaxKind::TemplateLiteral => {
                self.next_token();
                TypeNode {
                    span: self.span_from(start),
                    kind: TypeNodeKind::TemplateLiteral,
                }
            }
            SyntaxKind::Identifier => self.parse_identifier_type(),
            _ => {
                self.error_at_current_token("Type expected.", diagnostic_codes::TYPE_EXPECTED);
                if !self.is_type_terminator() {
                    self.next_token();
                }
                self.unsupported_type(start)
            }
        }
    }

    fn literal_type(&self, start: u32, literal: LiteralType) -> TypeNode {
        TypeNode {
            span: self.span_from(start),
            kind: TypeNodeKind::Literal(literal),
        }
    }

    fn parse_identifier_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        if self.is_word("typeof") {
            self.next_token();
            if self.is_word("import") {
                return self.parse_import_type(start, true);
            }
            let name = self.parse_entity_name();
            let type_arguments = self.parse_type_arguments_on_same_line();
            return TypeNode {
                span: self.span_from(start),
                kind: TypeNodeKind::Query {
                    name,
                    type_arguments,
                },
            };
        }
        if self.is_word("import") && self.next_token_is(SyntaxKind::OpenParenToken) {
            return self.parse_import_type(start, false);
        }
        if self.is_word("unique") && self.next_token_is_word("symbol") {
            self.next_token();
            self.next_token();
            return TypeNode {
                span: self.span_from(start),
                kind: TypeNodeKind::Keyword("unique symbol".to_string()),
            };
        }
        if KEYWORD_TYPES.contains(&self.token_value()) && !self.next_token_is(SyntaxKind::DotToken) {
            let keyword = self.token_value().to_string();
            self.next_token();
            return TypeNode {
                span: self.span_from(start),
                kind: TypeNodeKind::Keyword(keyword),
            };
        }
        let name = self.parse_entity_name();
        let type_arguments = self.parse_type_arguments_on_same_line();
        TypeNode {
            span: self.span_from(start),
            kind: TypeNodeKind::Reference {
                name,
                type_arguments,
            },
        }
    }

    /// `import("m").A.B<T>` with the `import` keyword current.
    fn parse_import_type(&mut self, start: u32, is_typeof: bool) -> TypeNode {
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let specifier = self.parse_string_literal().unwrap_or_default();
        if self.parse_optional(SyntaxKind::CommaToken) && self.is_token(SyntaxKind::OpenBraceToken) {
            // import attributes
            self.skip_balanced();
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        let qualifier = self
            .parse_optional(SyntaxKind::DotToken)
            .then(|| self.parse_entity_name());
        let type_arguments = self.parse_type_arguments_on_same_line();
        TypeNode {
            span: self.span_from(start),
            kind: TypeNodeKind::Import {
                specifier,
                qualifier,
                type_arguments,
                is_typeof,
            },
        }
    }

    pub(crate) fn parse_entity_name(&mut self) -> EntityName {
        let start = self.token_pos();
        let mut parts = vec![self.parse_identifier()];
        while self.is_token(SyntaxKind::DotToken) {
            self.next_token();
            // `a.#b` never appears in type positions; plain identifiers only.
            parts.push(self.parse_identifier());
        }
        EntityName {
            parts,
            span: self.span_from(start),
        }
    }

    fn parse_tuple_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let element_start = self.token_pos();
            let dot_dot_dot = self.parse_optional(SyntaxKind::DotDotDotToken);
            let is_labeled = self.is_identifier()
                && self.look_ahead(|p| {
                    p.next_token();
                    p.parse_optional(SyntaxKind::QuestionToken);
                    p.is_token(SyntaxKind::ColonToken)
                });
            let mut label = None;
            let mut optional = false;
            if is_labeled {
                label = Some(self.parse_identifier());
                optional = self.parse_optional(SyntaxKind::QuestionToken);
                self.parse_expected(SyntaxKind::ColonToken);
                // `name: ...T` spelling
                if !dot_dot_dot && self.is_token(SyntaxKind::DotDotDotToken) {
                    self.next_token();
                    let ty = self.parse_type_allowing_conditionals();
                    elements.push(TupleElement {
                        span: self.span_from(element_start),
                        label,
                        optional,
                        dot_dot_dot: true,
                        ty,
                    });
                    if !self.parse_optional(SyntaxKind::CommaToken) {
                        break;
                    }
                    continue;
                }
            }
            let ty = self.parse_type_allowing_conditionals();
            if !is_labeled && self.parse_optional(SyntaxKind::QuestionToken) {
                optional = true;
            }
            elements.push(TupleElement {
                span: self.span_from(element_start),
                label,
                optional,
                dot_dot_dot,
                ty,
            });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        TypeNode {
            span: self.span_from(start),
            kind: TypeNodeKind::Tuple(elements),
        }
    }

    fn look_ahead_is_mapped_type(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            if p.is_token(SyntaxKind::PlusToken) || p.is_token(SyntaxKind::MinusToken) {
                p.next_token();
                if !p.is_word("readonly") {
                    return false;
                }
            }
            if p.is_word("readonly") {
                p.next_token();
            }
            if !p.parse_optional(SyntaxKind::OpenBracketToken) || !p.is_identifier() {
                return false;
            }
            p.next_token();
            p.is_word("in")
        })
    }

    fn parse_mapped_modifier(&mut self, word: Option<&str>) -> Option<MappedModifier> {
        let modifier = if self.parse_optional(SyntaxKind::PlusToken) {
            MappedModifier::Plus
        } else if self.parse_optional(SyntaxKind::MinusToken) {
            MappedModifier::Minus
        } else {
            let present = match word {
                Some(word) => self.is_word(word),
                None => self.is_token(SyntaxKind::QuestionToken),
            };
            if !present {
                return None;
            }
            MappedModifier::Present
        };
        match word {
            Some(word) => {
                self.parse_expected_word(word);
            }
            None => {
                self.parse_expected(SyntaxKind::QuestionToken);
            }
        }
        Some(modifier)
    }

    fn parse_mapped_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        self.next_token();
        let readonly = self.parse_mapped_modifier(Some("readonly"));
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let type_param = self.parse_identifier();
        self.parse_expected_word("in");
        let constraint = self.parse_type_allowing_conditionals();
        let name_type = self
            .parse_optional_word("as")
            .then(|| Box::new(self.parse_type_allowing_conditionals()));
        self.parse_expected(SyntaxKind::CloseBracketToken);
        let optional = self.parse_mapped_modifier(None);
        let ty = self
            .parse_optional(SyntaxKind::ColonToken)
            .then(|| Box::new(self.parse_type_allowing_conditionals()));
        self.parse_optional(SyntaxKind::SemicolonToken);
        self.parse_optional(SyntaxKind::CommaToken);
        self.parse_expected(SyntaxKind::CloseBraceToken);
        TypeNode {
            span: self.span_from(start),
            kind: TypeNodeKind::Mapped {
                readonly,
                type_param,
                constraint: Box::new(constraint),
                name_type,
                optional,
                ty,
            },
        }
    }

    // =========================================================================
    // Type arguments and parameters
    // =========================================================================

    pub(crate) fn parse_type_arguments(&mut self) -> Vec<TypeNode> {
        let mut types = Vec::new();
        if !self.parse_optional(SyntaxKind::LessThanToken) {
            return types;
        }
        while !self.is_token(SyntaxKind::GreaterThanToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            types.push(self.parse_type_allowing_conditionals());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        types
    }

    fn parse_type_arguments_on_same_line(&mut self) -> Vec<TypeNode> {
        if self.is_token(SyntaxKind::LessThanToken) && !self.has_preceding_line_break() {
            self.parse_type_arguments()
        } else {
            Vec::new()
        }
    }

    pub(crate) fn parse_type_parameters(&mut self) -> Vec<TypeParameter> {
        let mut params = Vec::new();
        if !self.parse_optional(SyntaxKind::LessThanToken) {
            return params;
        }
        while !self.is_token(SyntaxKind::GreaterThanToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            // `const T`, `in T`, `out T` variance/const modifiers
            while (self.is_word("const") || self.is_word("in") || self.is_word("out"))
                && self.next_token_is_identifier_on_same_line()
            {
                self.next_token();
            }
            let name = self.parse_identifier();
            let constraint = self
                .parse_optional_word("extends")
                .then(|| self.parse_type_allowing_conditionals());
            let default = self
                .parse_optional(SyntaxKind::EqualsToken)
                .then(|| self.parse_type_allowing_conditionals());
            params.push(TypeParameter {
                name,
                constraint,
                default,
            });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        params
    }

    // =========================================================================
    // Signatures and parameters
    // =========================================================================

    /// `<T>(params)` followed by a return type introduced by `return_token`
    /// (`:` for declarations, `=>` for function types).
    pub(crate) fn parse_signature(&mut self, return_token: SyntaxKind) -> Signature {
        let type_params = self.parse_type_parameters();
        let params = self.parse_parameter_list();
        let return_type = if return_token == SyntaxKind::EqualsGreaterThanToken {
            self.parse_expected(return_token);
            Some(Box::new(self.parse_return_type()))
        } else if self.parse_optional(return_token) {
            Some(Box::new(self.parse_return_type()))
        } else {
            None
        };
        Signature {
            type_params,
            params,
            return_type,
        }
    }

    pub(crate) fn parse_parameter_list(&mut self) -> Vec<Parameter> {
        let mut params = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return params;
        }
        while !self.is_token(SyntaxKind::CloseParenToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            params.push(self.parse_parameter());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        params
    }

    pub(crate) fn parse_parameter(&mut self) -> Parameter {
        self.skip_decorators();
        let start = self.token_pos();
        let mut modifiers = ModifierFlags::empty();
        'modifiers: loop {
            for (word, flag) in PARAMETER_MODIFIERS {
                if self.is_word(word) && self.look_ahead_is_parameter_name_after_modifier() {
                    self.next_token();
                    modifiers |= *flag;
                    continue 'modifiers;
                }
            }
            break;
        }
        let dot_dot_dot = self.parse_optional(SyntaxKind::DotDotDotToken);
        let name = if self.is_token(SyntaxKind::OpenBraceToken) || self.is_token(SyntaxKind::OpenBracketToken) {
            let pattern_start = self.token_pos();
            self.skip_balanced();
            let span = self.span_from(pattern_start);
            Ident::new(self.source_slice(span.start, span.end), span)
        } else {
            self.parse_identifier()
        };
        let question = self.parse_optional(SyntaxKind::QuestionToken);
        let type_annotation = self
            .parse_optional(SyntaxKind::ColonToken)
            .then(|| self.parse_type_allowing_conditionals());
        let initializer = self
            .parse_optional(SyntaxKind::EqualsToken)
            .then(|| self.parse_assignment_expression());
        Parameter {
            name,
            span: self.span_from(start),
            modifiers,
            dot_dot_dot,
            question,
            type_annotation,
            initializer,
        }
    }

    fn look_ahead_is_parameter_name_after_modifier(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            p.is_identifier()
                || p.is_token(SyntaxKind::OpenBraceToken)
                || p.is_token(SyntaxKind::OpenBracketToken)
                || p.is_token(SyntaxKind::DotDotDotToken)
        })
    }

    /// Return type position: a type, `x is T`, `asserts x`, `asserts x is T`.
    pub(crate) fn parse_return_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        let asserts = self.is_word("asserts") && self.next_token_is_identifier_on_same_line();
        if asserts {
            self.next_token();
        }
        let is_predicate = self.is_identifier()
            && self.look_ahead(|p| {
                p.next_token();
                p.is_word("is") && !p.has_preceding_line_break()
            });
        if asserts || is_predicate {
            let param = self.parse_identifier();
            let ty = self
                .parse_optional_word("is")
                .then(|| Box::new(self.parse_type_allowing_conditionals()));
            return TypeNode {
                span: self.span_from(start),
                kind: TypeNodeKind::TypePredicate { asserts, param, ty },
            };
        }
        self.parse_type_allowing_conditionals()
    }

    // =========================================================================
    // Type members (interfaces and type literals)
    // =========================================================================

    /// `{ member; member, member }`
    pub(crate) fn parse_object_type_members(&mut self) -> Vec<TypeMember> {
        let mut members = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return members;
        }
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let before = self.token_pos();
            members.push(self.parse_type_member());
            if !self.parse_optional(SyntaxKind::SemicolonToken) {
                self.parse_optional(SyntaxKind::CommaToken);
            }
            if self.token_pos() == before {
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        members
    }

    fn parse_type_member(&mut self) -> TypeMember {
        let doc = self.parse_leading_doc();
        let start = self.token_pos();

        if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken) {
            let signature = self.parse_signature(SyntaxKind::ColonToken);
            return self.type_member(start, doc, TypeMemberKind::Call(signature));
        }
        if self.is_word("new")
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::OpenParenToken) || p.is_token(SyntaxKind::LessThanToken)
            })
        {
            self.next_token();
            let signature = self.parse_signature(SyntaxKind::ColonToken);
            return self.type_member(start, doc, TypeMemberKind::Construct(signature));
        }

        let readonly = self.is_word("readonly") && self.look_ahead_is_member_name_after_modifier();
        if readonly {
            self.next_token();
        }

        if self.is_token(SyntaxKind::OpenBracketToken) && self.look_ahead_is_index_signature() {
            let (params, ty) = self.parse_index_signature();
            return self.type_member(start, doc, TypeMemberKind::Index { params, ty, readonly });
        }

        if (self.is_word("get") || self.is_word("set")) && self.look_ahead_is_member_name_after_modifier() {
            let is_get = self.is_word("get");
            self.next_token();
            let name = self.parse_property_name();
            let signature = self.parse_signature(SyntaxKind::ColonToken);
            let kind = if is_get {
                TypeMemberKind::GetAccessor {
                    name,
                    ty: signature.return_type.map(|ty| *ty),
                }
            } else {
                TypeMemberKind::SetAccessor {
                    name,
                    param: signature.params.into_iter().next().map(Box::new),
                }
            };
            return self.type_member(start, doc, kind);
        }

        let name = self.parse_property_name();
        let optional = self.parse_optional(SyntaxKind::QuestionToken);
        if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken) {
            let signature = self.parse_signature(SyntaxKind::ColonToken);
            return self.type_member(
                start,
                doc,
                TypeMemberKind::Method {
                    name,
                    optional,
                    signature,
                },
            );
        }
        let ty = self
            .parse_optional(SyntaxKind::ColonToken)
            .then(|| self.parse_type_allowing_conditionals());
        self.type_member(
            start,
            doc,
            TypeMemberKind::Property {
                name,
                optional,
                readonly,
                ty,
            },
        )
    }

    fn type_member(&self, start: u32, doc: Option<String>, kind: TypeMemberKind) -> TypeMember {
        TypeMember {
            span: self.span_from(start),
            doc,
            kind,
        }
    }

    /// After a contextual modifier word (`readonly`, `get`, `static`...),
    /// does a member name follow?
    pub(crate) fn look_ahead_is_member_name_after_modifier(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            matches!(
                p.current_token,
                SyntaxKind::Identifier
                    | SyntaxKind::PrivateIdentifier
                    | SyntaxKind::StringLiteral
                    | SyntaxKind::NumericLiteral
                    | SyntaxKind::OpenBracketToken
                    | SyntaxKind::AsteriskToken
            )
        })
    }

    /// `[key: string]` as opposed to a computed property name.
    pub(crate) fn look_ahead_is_index_signature(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            if p.is_token(SyntaxKind::DotDotDotToken) || p.is_token(SyntaxKind::CloseBracketToken) {
                return true;
            }
            if !p.is_identifier() {
                return false;
            }
            p.next_token();
            p.is_token(SyntaxKind::ColonToken) || p.is_token(SyntaxKind::CommaToken)
        })
    }

    /// `[key: K]: T` with the `[` current.
    pub(crate) fn parse_index_signature(&mut self) -> (Vec<Parameter>, Option<TypeNode>) {
        self.next_token();
        let mut params = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            params.push(self.parse_parameter());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        let ty = self
            .parse_optional(SyntaxKind::ColonToken)
            .then(|| self.parse_type_allowing_conditionals());
        (params, ty)
    }

    pub(crate) fn parse_property_name(&mut self) -> PropertyName {
        let span = self.token_span();
        match self.current_token {
            SyntaxKind::Identifier => PropertyName::Identifier(self.parse_identifier()),
            SyntaxKind::PrivateIdentifier => {
                let ident = Ident::new(self.token_value(), span);
                self.next_token();
                PropertyName::Private(ident)
            }
            SyntaxKind::StringLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                PropertyName::String(value, span)
            }
            SyntaxKind::NumericLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                PropertyName::Numeric(value, span)
            }
            SyntaxKind::OpenBracketToken => {
                self.skip_balanced();
                let span = self.span_from(span.start);
                PropertyName::Computed(self.source_slice(span.start, span.end), span)
            }
            _ => {
                self.error_at_current_token("Property or signature expected.", diagnostic_codes::IDENTIFIER_EXPECTED);
                PropertyName::Identifier(Ident::new("", Span::new(span.start, span.start)))
            }
        }
    }
}
