//! Parser state - initializer expressions
//!
//! Only the expression forms that carry type information for inference are
//! modelled. Everything else (binary operators, calls, conditionals) is
//! skipped to the end of the expression and kept as `Unknown`.

use super::ParserState;
use crate::ast::{
    EntityName, Expression, ExpressionKind, Ident, ModifierFlags, ObjectLiteralMember, Parameter, Signature,
};
use crate::scanner::{SyntaxKind, parse_numeric_value};

impl ParserState {
    fn expression(&self, start: u32, kind: ExpressionKind) -> Expression {
        Expression {
            span: self.span_from(start),
            kind,
        }
    }

    /// Tokens that end an expression in a declaration context.
    fn is_expression_terminator(&self) -> bool {
        matches!(
            self.current_token,
            SyntaxKind::CommaToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::EndOfFileToken
        )
    }

    /// Skip the remainder of an expression, stopping at a depth-0 terminator
    /// or at a line break followed by a statement keyword.
    fn skip_expression_rest(&mut self) {
        while !self.is_expression_terminator() {
            if self.has_preceding_line_break()
                && ["export", "import", "declare", "function", "class", "interface", "type", "const", "let", "var"]
                    .iter()
                    .any(|word| self.is_word(word))
            {
                return;
            }
            if matches!(
                self.current_token,
                SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken | SyntaxKind::OpenBraceToken
            ) {
                self.skip_balanced();
            } else {
                self.next_token();
            }
        }
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> Expression {
        let start = self.token_pos();
        if !self.enter_recursion() {
            self.skip_expression_rest();
            return self.expression(start, ExpressionKind::Unknown);
        }
        let expression = self.parse_assignment_expression_worker();
        self.leave_recursion();
        expression
    }

    fn parse_assignment_expression_worker(&mut self) -> Expression {
        let start = self.token_pos();
        if let Some(arrow) = self.try_parse(|p| p.try_parse_arrow_function()) {
            return arrow;
        }

        let mut expression = self.parse_unary_expression();
        loop {
            if self.has_preceding_line_break() {
                break;
            }
            if self.is_word("as") {
                self.next_token();
                if self.parse_optional_word("const") {
                    expression = self.expression(start, ExpressionKind::AsConst(Box::new(expression)));
                } else {
                    let ty = self.parse_type();
                    expression = self.expression(
                        start,
                        ExpressionKind::As {
                            expression: Box::new(expression),
                            ty,
                        },
                    );
                }
            } else if self.is_word("satisfies") {
                self.next_token();
                self.parse_type();
            } else if self.is_token(SyntaxKind::ExclamationToken) {
                self.next_token();
            } else {
                break;
            }
        }

        if self.is_expression_terminator() || self.is_expression_boundary() {
            return expression;
        }
        // Binary operator, conditional or similar: not modelled.
        self.skip_expression_rest();
        self.expression(start, ExpressionKind::Unknown)
    }

    /// A line break before a statement keyword ends an ASI-terminated initializer.
    fn is_expression_boundary(&self) -> bool {
        self.has_preceding_line_break()
            && !matches!(
                self.current_token,
                SyntaxKind::DotToken
                    | SyntaxKind::QuestionDotToken
                    | SyntaxKind::OperatorToken
                    | SyntaxKind::BarToken
                    | SyntaxKind::AmpersandToken
                    | SyntaxKind::PlusToken
                    | SyntaxKind::MinusToken
                    | SyntaxKind::AsteriskToken
                    | SyntaxKind::SlashToken
                    | SyntaxKind::QuestionToken
                    | SyntaxKind::ColonToken
                    | SyntaxKind::LessThanToken
                    | SyntaxKind::GreaterThanToken
                    | SyntaxKind::EqualsToken
            )
    }

    /// `(a: T) => ...`, `async x => ...`, `<T>(x: T): T => ...`
    fn try_parse_arrow_function(&mut self) -> Option<Expression> {
        let start = self.token_pos();
        let is_async = self.is_word("async") && !self.next_token_is(SyntaxKind::EqualsGreaterThanToken);
        if is_async {
            self.next_token();
            if self.has_preceding_line_break() {
                return None;
            }
        }
        let signature = if self.is_identifier() {
            let name = self.parse_identifier();
            if !self.is_token(SyntaxKind::EqualsGreaterThanToken) {
                return None;
            }
            let span = name.span;
            Signature {
                type_params: Vec::new(),
                params: vec![Parameter {
                    name,
                    span,
                    modifiers: ModifierFlags::empty(),
                    dot_dot_dot: false,
                    question: false,
                    type_annotation: None,
                    initializer: None,
                }],
                return_type: None,
            }
        } else if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken) {
            let is_arrow = self.look_ahead(|p| {
                if p.is_token(SyntaxKind::LessThanToken) {
                    p.skip_angle_brackets();
                }
                if !p.is_token(SyntaxKind::OpenParenToken) {
                    return false;
                }
                p.skip_balanced();
                p.is_token(SyntaxKind::EqualsGreaterThanToken) || p.is_token(SyntaxKind::ColonToken)
            });
            if !is_arrow {
                return None;
            }
            let signature = self.parse_signature(SyntaxKind::ColonToken);
            if !self.is_token(SyntaxKind::EqualsGreaterThanToken) {
                return None;
            }
            signature
        } else {
            return None;
        };

        self.next_token();
        let (body, body_expression) = if self.is_token(SyntaxKind::OpenBraceToken) {
            (Some(self.skip_function_body()), None)
        } else {
            (None, Some(Box::new(self.parse_assignment_expression())))
        };
        Some(self.expression(
            start,
            ExpressionKind::Function {
                signature,
                body,
                body_expression,
                is_async,
            },
        ))
    }

    fn skip_angle_brackets(&mut self) {
        let mut depth = 0u32;
        loop {
            match self.current_token {
                SyntaxKind::LessThanToken => depth += 1,
                SyntaxKind::GreaterThanToken => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.next_token();
                        return;
                    }
                }
                SyntaxKind::EndOfFileToken => return,
                _ => {}
            }
            self.next_token();
        }
    }

    fn parse_unary_expression(&mut self) -> Expression {
        let start = self.token_pos();
        let operator = match self.current_token {
            SyntaxKind::MinusToken => Some("-"),
            SyntaxKind::PlusToken => Some("+"),
            SyntaxKind::ExclamationToken => Some("!"),
            SyntaxKind::Identifier if self.is_word("typeof") => Some("typeof"),
            SyntaxKind::Identifier if self.is_word("void") => Some("void"),
            SyntaxKind::Identifier if self.is_word("await") => Some("await"),
            _ => None,
        };
        if let Some(operator) = operator {
            self.next_token();
            let operand = self.parse_unary_expression();
            return self.expression(
                start,
                ExpressionKind::Prefix {
                    operator: operator.to_string(),
                    operand: Box::new(operand),
                },
            );
        }
        if self.is_token(SyntaxKind::LessThanToken) {
            // `<T>expr` type assertion
            self.next_token();
            let ty = self.parse_type();
            self.parse_expected(SyntaxKind::GreaterThanToken);
            let operand = self.parse_unary_expression();
            return self.expression(
                start,
                ExpressionKind::As {
                    expression: Box::new(operand),
                    ty,
                },
            );
        }
        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Expression {
        let start = self.token_pos();
        let mut expression = self.parse_primary_expression();
        loop {
            let token = self.current_token;
            match token {
                SyntaxKind::DotToken | SyntaxKind::QuestionDotToken => {
                    let optional = self.is_token(SyntaxKind::QuestionDotToken);
                    self.next_token();
                    if !self.is_identifier() && !self.is_token(SyntaxKind::PrivateIdentifier) {
                        // `a?.[x]` / `a?.()`
                        if matches!(
                            self.current_token,
                            SyntaxKind::OpenBracketToken | SyntaxKind::OpenParenToken
                        ) {
                            self.skip_balanced();
                        }
                        expression = self.expression(start, ExpressionKind::Unknown);
                        continue;
                    }
                    let name = Ident::new(self.token_value(), self.token_span());
                    self.next_token();
                    expression = match expression.kind {
                        ExpressionKind::Entity(mut entity) if !optional => {
                            entity.parts.push(name);
                            entity.span = self.span_from(start);
                            self.expression(start, ExpressionKind::Entity(entity))
                        }
                        _ => self.expression(start, ExpressionKind::Unknown),
                    };
                }
                SyntaxKind::OpenBracketToken | SyntaxKind::OpenParenToken
                    if !self.has_preceding_line_break() =>
                {
                    self.skip_balanced();
                    expression = self.expression(start, ExpressionKind::Unknown);
                }
                SyntaxKind::LessThanToken if self.look_ahead_is_call_type_arguments() => {
                    self.parse_type_arguments();
                }
                SyntaxKind::TemplateLiteral if !self.has_preceding_line_break() => {
                    self.next_token();
                    expression = self.expression(start, ExpressionKind::Unknown);
                }
                SyntaxKind::OperatorToken
                    if !self.has_preceding_line_break()
                        && matches!(self.scanner.token_text(), "++" | "--") =>
                {
                    self.next_token();
                    expression = self.expression(start, ExpressionKind::Unknown);
                }
                _ => break,
            }
        }
        expression
    }

    /// `f<T>(x)`: type arguments followed by a call.
    fn look_ahead_is_call_type_arguments(&mut self) -> bool {
        self.look_ahead(|p| {
            let diagnostics_before = p.diagnostics.len();
            p.parse_type_arguments();
            p.diagnostics.len() == diagnostics_before && p.is_token(SyntaxKind::OpenParenToken)
        })
    }

    fn parse_primary_expression(&mut self) -> Expression {
        let start = self.token_pos();
        match self.current_token {
            SyntaxKind::StringLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                self.expression(start, ExpressionKind::String(value))
            }
            SyntaxKind::NumericLiteral => {
                let value = parse_numeric_value(self.token_value());
                self.next_token();
                self.expression(start, ExpressionKind::Number(value))
            }
            SyntaxKind::BigIntLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                self.expression(start, ExpressionKind::BigInt(value))
            }
            SyntaxKind::TemplateLiteral => {
                let has_substitutions = self.scanner.template_has_substitutions();
                self.next_token();
                self.expression(start, ExpressionKind::Template { has_substitutions })
            }
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let inner = self.parse_assignment_expression();
                if self.is_token(SyntaxKind::CommaToken) {
                    // comma operator
                    self.skip_expression_rest();
                    self.parse_expected(SyntaxKind::CloseParenToken);
                    return self.expression(start, ExpressionKind::Unknown);
                }
                self.parse_expected(SyntaxKind::CloseParenToken);
                inner
            }
            SyntaxKind::Identifier => self.parse_identifier_expression(),
            _ => {
                if !self.is_expression_terminator() {
                    self.next_token();
                }
                self.expression(start, ExpressionKind::Unknown)
            }
        }
    }

    fn parse_identifier_expression(&mut self) -> Expression {
        let start = self.token_pos();
        let word = self.token_value().to_string();
        match word.as_str() {
            "true" => {
                self.next_token();
                self.expression(start, ExpressionKind::True)
            }
            "false" => {
                self.next_token();
                self.expression(start, ExpressionKind::False)
            }
            "null" => {
                self.next_token();
                self.expression(start, ExpressionKind::Null)
            }
            "function" => {
                self.next_token();
                self.parse_optional(SyntaxKind::AsteriskToken);
                if self.is_identifier() {
                    self.next_token();
                }
                let signature = self.parse_signature(SyntaxKind::ColonToken);
                let body = self
                    .is_token(SyntaxKind::OpenBraceToken)
                    .then(|| self.skip_function_body());
                self.expression(
                    start,
                    ExpressionKind::Function {
                        signature,
                        body,
                        body_expression: None,
                        is_async: false,
                    },
                )
            }
            "class" => {
                while !self.is_token(SyntaxKind::OpenBraceToken) && !self.is_expression_terminator() {
                    if self.is_token(SyntaxKind::OpenParenToken) {
                        self.skip_balanced();
                    } else {
                        self.next_token();
                    }
                }
                if self.is_token(SyntaxKind::OpenBraceToken) {
                    self.skip_balanced();
                }
                self.expression(start, ExpressionKind::Unknown)
            }
            "new" => {
                self.next_token();
                let callee = if self.is_identifier() {
                    let entity: EntityName = self.parse_entity_name();
                    Some(entity)
                } else {
                    None
                };
                if self.is_token(SyntaxKind::LessThanToken) {
                    self.parse_type_arguments();
                }
                if self.is_token(SyntaxKind::OpenParenToken) {
                    self.skip_balanced();
                }
                self.expression(start, ExpressionKind::New { callee })
            }
            _ => {
                let ident = self.parse_identifier();
                self.expression(start, ExpressionKind::Entity(EntityName::from_ident(ident)))
            }
        }
    }

    fn parse_array_literal(&mut self) -> Expression {
        let start = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            if self.is_token(SyntaxKind::CommaToken) {
                // hole
                self.next_token();
                continue;
            }
            let element_start = self.token_pos();
            if self.parse_optional(SyntaxKind::DotDotDotToken) {
                self.parse_assignment_expression();
                elements.push(self.expression(element_start, ExpressionKind::Unknown));
            } else {
                elements.push(self.parse_assignment_expression());
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.expression(start, ExpressionKind::Array(elements))
    }

    fn parse_object_literal(&mut self) -> Expression {
        let start = self.token_pos();
        self.next_token();
        let mut members = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let member_start = self.token_pos();
            if self.parse_optional(SyntaxKind::DotDotDotToken) {
                self.parse_assignment_expression();
                members.push(ObjectLiteralMember::Spread(self.span_from(member_start)));
            } else if (self.is_word("get") || self.is_word("set") || self.is_word("async"))
                && self.look_ahead_is_member_name_after_modifier()
            {
                // Accessors and async methods are not inferred.
                self.next_token();
                self.parse_property_name();
                self.parse_signature(SyntaxKind::ColonToken);
                if self.is_token(SyntaxKind::OpenBraceToken) {
                    self.skip_function_body();
                }
            } else {
                self.parse_optional(SyntaxKind::AsteriskToken);
                let is_shorthand = self.is_identifier()
                    && self.look_ahead(|p| {
                        p.next_token();
                        matches!(
                            p.current_token,
                            SyntaxKind::CommaToken | SyntaxKind::CloseBraceToken | SyntaxKind::EqualsToken
                        )
                    });
                if is_shorthand {
                    let ident = self.parse_identifier();
                    if self.parse_optional(SyntaxKind::EqualsToken) {
                        self.parse_assignment_expression();
                    }
                    members.push(ObjectLiteralMember::Shorthand(ident));
                } else {
                    let name = self.parse_property_name();
                    self.parse_optional(SyntaxKind::QuestionToken);
                    if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken) {
                        let signature = self.parse_signature(SyntaxKind::ColonToken);
                        if self.is_token(SyntaxKind::OpenBraceToken) {
                            self.skip_function_body();
                        }
                        members.push(ObjectLiteralMember::Method { name, signature });
                    } else {
                        self.parse_expected(SyntaxKind::ColonToken);
                        let value = self.parse_assignment_expression();
                        members.push(ObjectLiteralMember::Property { name, value });
                    }
                }
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.expression(start, ExpressionKind::Object(members))
    }
}
