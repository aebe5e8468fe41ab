//! Recursive-descent parser for the declaration surface.
//!
//! `ParserState` owns the scanner and the declaration arena of the file being
//! parsed. The grammar is split the same way the statement/type/member
//! productions are:
//! - `state_statements`: imports, exports and declarations
//! - `state_class_members`: class bodies
//! - `state_types`: type nodes, type members, signatures
//! - `state_expressions`: initializer expressions
//!
//! Parsing never fails. Anything outside the supported grammar is skipped,
//! recorded as an `Unknown`/`Unsupported` node and reported as a diagnostic.

mod state_class_members;
mod state_expressions;
mod state_statements;
mod state_types;

use crate::ast::{DeclIndex, Declaration, DeclarationKind, FunctionBody, Ident, ModifierFlags, SourceFile};
use crate::scanner::{Scanner, ScannerState, SyntaxKind, punctuation_to_text};
use apigraph_common::comments::{CommentRange, file_jsdoc, get_jsdoc_content, leading_jsdoc};
use apigraph_common::diagnostics::{Diagnostic, diagnostic_codes, format_message};
use apigraph_common::limits::MAX_PARSER_RECURSION_DEPTH;
use apigraph_common::Span;
use tracing::trace;

/// Disallow `A extends B ? C : D` at the current position (inside an
/// `extends` clause of a conditional type or an `infer X extends C`).
pub(crate) const CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES: u32 = 1 << 0;

/// Snapshot for speculative parsing.
pub(crate) struct ParserSnapshot {
    scanner: ScannerState,
    current_token: SyntaxKind,
    last_token_end: u32,
    diagnostics_len: usize,
    declarations_len: usize,
}

pub struct ParserState {
    pub(crate) scanner: Scanner,
    pub(crate) current_token: SyntaxKind,
    file_name: String,
    pub(crate) declarations: Vec<Declaration>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) context_flags: u32,
    pub(crate) current_parent: Option<DeclIndex>,
    pub(crate) is_external_module: bool,
    pub(crate) first_statement_pos: Option<u32>,
    last_token_end: u32,
    recursion_depth: u32,
}

/// Parse `source` as the file `file_name`.
pub fn parse(file_name: impl Into<String>, source: impl Into<String>) -> SourceFile {
    ParserState::new(file_name, source).parse_source_file()
}

impl ParserState {
    pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> Self {
        ParserState {
            scanner: Scanner::new(source),
            current_token: SyntaxKind::Unknown,
            file_name: file_name.into(),
            declarations: Vec::new(),
            diagnostics: Vec::new(),
            context_flags: 0,
            current_parent: None,
            is_external_module: false,
            first_statement_pos: None,
            last_token_end: 0,
            recursion_depth: 0,
        }
    }

    pub fn parse_source_file(mut self) -> SourceFile {
        self.next_token();
        let statements = self.parse_statement_list(false);

        let mut comments = self.scanner.take_comments();
        comments.dedup_by_key(|comment| comment.pos);
        let text = self.scanner.source_text().to_string();
        let doc = file_jsdoc(&comments, self.first_statement_pos, &text);

        let mut diagnostics: Vec<Diagnostic> = self
            .scanner
            .take_diagnostics()
            .into_iter()
            .map(|diag| Diagnostic::error(&self.file_name, diag.pos, diag.length, diag.message, diag.code))
            .collect();
        diagnostics.append(&mut self.diagnostics);
        diagnostics.sort_by_key(|diag| diag.start);

        trace!(
            file = %self.file_name,
            declarations = self.declarations.len(),
            diagnostics = diagnostics.len(),
            "parsed source file"
        );

        SourceFile {
            file_name: self.file_name,
            text,
            statements,
            declarations: self.declarations,
            comments,
            doc,
            is_external_module: self.is_external_module,
            diagnostics,
        }
    }

    // =========================================================================
    // Token access
    // =========================================================================

    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.last_token_end = self.scanner.token_end();
        self.current_token = self.scanner.scan();
        self.current_token
    }

    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current_token == kind
    }

    /// Current token is the identifier `word`.
    pub(crate) fn is_word(&self, word: &str) -> bool {
        self.current_token == SyntaxKind::Identifier && self.scanner.token_value() == word
    }

    pub(crate) fn is_identifier(&self) -> bool {
        self.current_token == SyntaxKind::Identifier
    }

    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.token_pos()
    }

    pub(crate) fn token_end(&self) -> u32 {
        self.scanner.token_end()
    }

    pub(crate) fn token_value(&self) -> &str {
        self.scanner.token_value()
    }

    pub(crate) fn token_span(&self) -> Span {
        Span::new(self.token_pos(), self.token_end())
    }

    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    pub(crate) fn source_slice(&self, start: u32, end: u32) -> String {
        Span::new(start, end).text(self.scanner.source_text()).to_string()
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.last_token_end.max(start))
    }

    // =========================================================================
    // Expectation helpers
    // =========================================================================

    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            return true;
        }
        let text = punctuation_to_text(kind).unwrap_or("token");
        self.error_at_current_token(
            &format_message("'{0}' expected.", &[text]),
            diagnostic_codes::TOKEN_EXPECTED,
        );
        false
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub(crate) fn parse_optional_word(&mut self, word: &str) -> bool {
        if self.is_word(word) {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub(crate) fn parse_expected_word(&mut self, word: &str) -> bool {
        if self.parse_optional_word(word) {
            return true;
        }
        self.error_at_current_token(
            &format_message("'{0}' expected.", &[word]),
            diagnostic_codes::TOKEN_EXPECTED,
        );
        false
    }

    pub(crate) fn parse_identifier(&mut self) -> Ident {
        if self.is_identifier() {
            let ident = Ident::new(self.token_value(), self.token_span());
            self.next_token();
            return ident;
        }
        self.error_at_current_token("Identifier expected.", diagnostic_codes::IDENTIFIER_EXPECTED);
        Ident::new("", Span::new(self.token_pos(), self.token_pos()))
    }

    /// Consume a string literal and return its cooked value.
    pub(crate) fn parse_string_literal(&mut self) -> Option<String> {
        if self.is_token(SyntaxKind::StringLiteral) {
            let value = self.token_value().to_string();
            self.next_token();
            Some(value)
        } else {
            self.parse_expected(SyntaxKind::StringLiteral);
            None
        }
    }

    /// Automatic semicolon insertion point.
    pub(crate) fn can_parse_semicolon(&self) -> bool {
        self.is_token(SyntaxKind::SemicolonToken)
            || self.is_token(SyntaxKind::CloseBraceToken)
            || self.is_token(SyntaxKind::EndOfFileToken)
            || self.has_preceding_line_break()
    }

    pub(crate) fn parse_semicolon(&mut self) {
        if self.parse_optional(SyntaxKind::SemicolonToken) || self.can_parse_semicolon() {
            return;
        }
        self.parse_expected(SyntaxKind::SemicolonToken);
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn error_at(&mut self, start: u32, length: u32, message: &str, code: u32) {
        // One diagnostic per position keeps recovery loops from flooding.
        if self.diagnostics.last().is_some_and(|last| last.start == start) {
            return;
        }
        self.diagnostics
            .push(Diagnostic::error(&self.file_name, start, length, message, code));
    }

    pub(crate) fn error_at_current_token(&mut self, message: &str, code: u32) {
        let span = self.token_span();
        self.error_at(span.start, span.len(), message, code);
    }

    // =========================================================================
    // Speculation and recursion guards
    // =========================================================================

    pub(crate) fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            scanner: self.scanner.save_state(),
            current_token: self.current_token,
            last_token_end: self.last_token_end,
            diagnostics_len: self.diagnostics.len(),
            declarations_len: self.declarations.len(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: ParserSnapshot) {
        self.scanner.restore_state(snapshot.scanner);
        self.current_token = snapshot.current_token;
        self.last_token_end = snapshot.last_token_end;
        self.diagnostics.truncate(snapshot.diagnostics_len);
        self.declarations.truncate(snapshot.declarations_len);
    }

    /// Run `f` and rewind, returning its answer.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.snapshot();
        let result = f(self);
        self.restore(snapshot);
        result
    }

    /// Run `f`, rewinding when it returns `None`.
    pub(crate) fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let snapshot = self.snapshot();
        let result = f(self);
        if result.is_none() {
            self.restore(snapshot);
        }
        result
    }

    pub(crate) fn next_token_is(&mut self, kind: SyntaxKind) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            p.is_token(kind)
        })
    }

    pub(crate) fn next_token_is_word(&mut self, word: &str) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            p.is_word(word)
        })
    }

    pub(crate) fn next_token_is_identifier_on_same_line(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            p.is_identifier() && !p.has_preceding_line_break()
        })
    }

    /// Returns false once the nesting limit is reached; callers then bail out.
    pub(crate) fn enter_recursion(&mut self) -> bool {
        if self.recursion_depth >= MAX_PARSER_RECURSION_DEPTH {
            self.error_at_current_token(
                "Expression or type nested too deeply.",
                diagnostic_codes::UNSUPPORTED_SYNTAX,
            );
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    pub(crate) fn leave_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    // =========================================================================
    // Skipping
    // =========================================================================

    fn is_open_bracket(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::OpenBraceToken | SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken
        )
    }

    fn is_close_bracket(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::CloseBraceToken | SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken
        )
    }

    /// Skip a bracketed group starting at the current open bracket.
    pub(crate) fn skip_balanced(&mut self) {
        let mut depth = 0u32;
        loop {
            let token = self.current_token;
            if token == SyntaxKind::EndOfFileToken {
                self.error_at_current_token("'}' expected.", diagnostic_codes::TOKEN_EXPECTED);
                return;
            }
            self.next_token();
            if Self::is_open_bracket(token) {
                depth += 1;
            } else if Self::is_close_bracket(token) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return;
                }
            }
            if depth == 0 {
                return;
            }
        }
    }

    /// Skip a function body `{ ... }`, noting whether it returns a value.
    ///
    /// `return` statements inside nested `function` bodies and braced arrow
    /// bodies are not counted.
    pub(crate) fn skip_function_body(&mut self) -> FunctionBody {
        let start = self.token_pos();
        let mut depth = 0u32;
        let mut nested_function_depths: Vec<u32> = Vec::new();
        let mut pending_function = false;
        let mut has_return_value = false;

        loop {
            match self.current_token {
                SyntaxKind::EndOfFileToken => {
                    self.error_at_current_token("'}' expected.", diagnostic_codes::TOKEN_EXPECTED);
                    break;
                }
                SyntaxKind::OpenBraceToken => {
                    depth += 1;
                    if pending_function {
                        nested_function_depths.push(depth);
                        pending_function = false;
                    }
                    self.next_token();
                }
                SyntaxKind::CloseBraceToken => {
                    if nested_function_depths.last() == Some(&depth) {
                        nested_function_depths.pop();
                    }
                    depth = depth.saturating_sub(1);
                    self.next_token();
                    if depth == 0 {
                        break;
                    }
                }
                SyntaxKind::EqualsGreaterThanToken => {
                    self.next_token();
                    pending_function = self.is_token(SyntaxKind::OpenBraceToken);
                }
                SyntaxKind::SemicolonToken => {
                    pending_function = false;
                    self.next_token();
                }
                SyntaxKind::Identifier if self.is_word("function") => {
                    pending_function = true;
                    self.next_token();
                }
                SyntaxKind::Identifier if self.is_word("return") => {
                    self.next_token();
                    let returns_value = !self.has_preceding_line_break()
                        && !matches!(
                            self.current_token,
                            SyntaxKind::SemicolonToken
                                | SyntaxKind::CloseBraceToken
                                | SyntaxKind::EndOfFileToken
                        );
                    if returns_value && nested_function_depths.is_empty() {
                        has_return_value = true;
                    }
                }
                _ => {
                    self.next_token();
                }
            }
        }

        FunctionBody {
            span: self.span_from(start),
            has_return_value,
        }
    }

    /// Skip `@expr` decorators.
    pub(crate) fn skip_decorators(&mut self) {
        while self.parse_optional(SyntaxKind::AtToken) {
            if self.is_token(SyntaxKind::OpenParenToken) {
                self.skip_balanced();
                continue;
            }
            self.parse_identifier();
            while self.parse_optional(SyntaxKind::DotToken) {
                self.parse_identifier();
            }
            if self.is_token(SyntaxKind::LessThanToken) {
                self.parse_type_arguments();
            }
            if self.is_token(SyntaxKind::OpenParenToken) {
                self.skip_balanced();
            }
        }
    }

    // =========================================================================
    // Declarations and documentation
    // =========================================================================

    pub(crate) fn push_declaration(
        &mut self,
        name: Ident,
        span: Span,
        modifiers: ModifierFlags,
        doc: Option<String>,
        kind: DeclarationKind,
    ) -> DeclIndex {
        let index = DeclIndex(self.declarations.len() as u32);
        self.declarations.push(Declaration {
            name,
            span,
            modifiers,
            doc,
            kind,
            parent: self.current_parent,
        });
        index
    }

    pub(crate) fn declaration_mut(&mut self, index: DeclIndex) -> &mut Declaration {
        &mut self.declarations[index.0 as usize]
    }

    /// JSDoc comment in the trivia directly before the current token.
    ///
    /// The file's own documentation comment is never attached to the first
    /// declaration.
    pub(crate) fn parse_leading_doc(&self) -> Option<String> {
        let source = self.scanner.source_text();
        let pos = self.token_pos();
        let comment = leading_jsdoc(self.scanner.comments(), self.last_token_end, pos, source)?;
        if self.is_file_doc_comment(comment, pos) {
            return None;
        }
        Some(get_jsdoc_content(comment, source))
    }

    fn is_file_doc_comment(&self, comment: &CommentRange, pos: u32) -> bool {
        let source = self.scanner.source_text();
        let Some(first) = self.scanner.comments().first() else {
            return false;
        };
        if first.pos != comment.pos || self.first_statement_pos.is_some_and(|stmt| stmt < pos) {
            return false;
        }
        file_jsdoc(std::slice::from_ref(comment), Some(pos), source).is_some()
    }
}
