//! Parser state - statements, imports/exports and declarations

use super::ParserState;
use crate::ast::{
    ClassDeclaration, DeclIndex, DeclarationKind, EntityName, EnumDeclaration, EnumMemberDeclaration,
    ExportAllDeclaration, ExportAssignment, ExportDeclaration, ExportSpecifier, Expression,
    FunctionDeclaration, Ident, ImportDeclaration, ImportEqualsDeclaration, ImportEqualsTarget,
    ImportSpecifier, InterfaceDeclaration, ModifierFlags, ModuleDeclaration, ModuleNameKind,
    Statement, TypeAliasDeclaration, TypeNode, TypeNodeKind, VariableDeclaration, VariableKind,
};
use crate::scanner::SyntaxKind;
use apigraph_common::Span;
use apigraph_common::diagnostics::diagnostic_codes;

/// Words that start a statement; used to stop skipping at a line break.
const STATEMENT_KEYWORDS: &[&str] = &[
    "abstract", "class", "const", "declare", "enum", "export", "function", "import", "interface",
    "let", "module", "namespace", "type", "var",
];

impl ParserState {
    // =========================================================================
    // Statement lists
    // =========================================================================

    /// Parse statements up to end of file, or up to `}` inside a block.
    pub(crate) fn parse_statement_list(&mut self, in_block: bool) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            if self.is_token(SyntaxKind::EndOfFileToken) {
                if in_block {
                    self.parse_expected(SyntaxKind::CloseBraceToken);
                }
                break;
            }
            if in_block && self.is_token(SyntaxKind::CloseBraceToken) {
                break;
            }
            let start = self.token_pos();
            if !in_block && self.first_statement_pos.is_none() {
                self.first_statement_pos = Some(start);
            }
            self.parse_statement(&mut statements);
            if self.token_pos() == start && !self.is_token(SyntaxKind::EndOfFileToken) {
                self.error_at_current_token(
                    "Declaration or statement expected.",
                    diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
                );
                self.next_token();
            }
        }
        statements
    }

    fn parse_statement(&mut self, out: &mut Vec<Statement>) {
        let doc = self.parse_leading_doc();
        let start = self.token_pos();

        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return;
        }
        if self.is_token(SyntaxKind::AtToken) {
            self.skip_decorators();
        }

        if self.is_word("import") && !self.look_ahead_is_import_call() {
            if let Some(statement) = self.parse_import_declaration(start, ModifierFlags::empty()) {
                out.push(statement);
            }
            return;
        }
        if self.is_word("export") {
            self.parse_export(start, doc, out);
            return;
        }

        let modifiers = self.parse_declaration_modifiers();
        if !self.parse_declaration(start, doc, modifiers, out) {
            self.skip_statement();
            out.push(Statement::Unknown(self.span_from(start)));
        }
    }

    /// Skip the rest of a statement we do not model.
    pub(crate) fn skip_statement(&mut self) {
        let start = self.token_pos();
        loop {
            match self.current_token {
                SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken => return,
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                    return;
                }
                SyntaxKind::OpenBraceToken
                | SyntaxKind::OpenParenToken
                | SyntaxKind::OpenBracketToken => {
                    let was_brace = self.is_token(SyntaxKind::OpenBraceToken);
                    let brace_at_start = self.token_pos() == start;
                    self.skip_balanced();
                    // A block statement ends at its closing brace.
                    if was_brace && brace_at_start {
                        return;
                    }
                }
                _ => {
                    let at_new_statement = self.token_pos() != start
                        && self.has_preceding_line_break()
                        && STATEMENT_KEYWORDS.iter().any(|word| self.is_word(word));
                    if at_new_statement {
                        return;
                    }
                    self.next_token();
                }
            }
        }
    }

    fn look_ahead_is_import_call(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            p.is_token(SyntaxKind::OpenParenToken) || p.is_token(SyntaxKind::DotToken)
        })
    }

    // =========================================================================
    // Modifiers
    // =========================================================================

    /// Statement-level modifiers (`declare`, `abstract`, `async`, `const enum`, `default`).
    pub(crate) fn parse_declaration_modifiers(&mut self) -> ModifierFlags {
        let mut flags = ModifierFlags::empty();
        loop {
            let flag = if self.is_word("declare") {
                ModifierFlags::DECLARE
            } else if self.is_word("abstract") {
                ModifierFlags::ABSTRACT
            } else if self.is_word("async") {
                ModifierFlags::ASYNC
            } else if self.is_word("default") {
                ModifierFlags::DEFAULT
            } else if self.is_word("const") && self.next_token_is_word("enum") {
                self.next_token();
                flags |= ModifierFlags::CONST;
                continue;
            } else {
                return flags;
            };
            if !self.next_token_is_identifier_on_same_line() {
                return flags;
            }
            flags |= flag;
            self.next_token();
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Parse a declaration starting at the current keyword. Returns false when
    /// the current token does not start a declaration.
    pub(crate) fn parse_declaration(
        &mut self,
        start: u32,
        doc: Option<String>,
        modifiers: ModifierFlags,
        out: &mut Vec<Statement>,
    ) -> bool {
        if !self.is_identifier() {
            return false;
        }
        let keyword = self.token_value().to_string();
        let index = match keyword.as_str() {
            "function" => self.parse_function_declaration(start, doc, modifiers),
            "var" | "let" | "const" => {
                if self.is_word("let") && !self.look_ahead_is_binding_start() {
                    return false;
                }
                for index in self.parse_variable_statement(doc, modifiers) {
                    out.push(Statement::Declaration(index));
                }
                return true;
            }
            "type" if self.next_token_is_identifier_on_same_line() => {
                self.parse_type_alias_declaration(start, doc, modifiers)
            }
            "interface" if self.next_token_is_identifier_on_same_line() => {
                self.parse_interface_declaration(start, doc, modifiers)
            }
            "class" => self.parse_class_declaration(start, doc, modifiers),
            "enum" if self.next_token_is_identifier_on_same_line() => {
                self.parse_enum_declaration(start, doc, modifiers)
            }
            "namespace" | "module" if self.look_ahead_is_module_name() => {
                self.next_token();
                self.parse_module_declaration(start, doc, modifiers)
            }
            "global" if self.next_token_is(SyntaxKind::OpenBraceToken) => {
                let name = Ident::new("global", self.token_span());
                self.next_token();
                self.parse_module_body(start, doc, modifiers, name, ModuleNameKind::Global)
            }
            _ => return false,
        };
        out.push(Statement::Declaration(index));
        true
    }

    fn look_ahead_is_binding_start(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            p.is_identifier()
                || p.is_token(SyntaxKind::OpenBraceToken)
                || p.is_token(SyntaxKind::OpenBracketToken)
        })
    }

    fn look_ahead_is_module_name(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            !p.has_preceding_line_break()
                && (p.is_identifier() || p.is_token(SyntaxKind::StringLiteral))
        })
    }

    fn parse_function_declaration(
        &mut self,
        start: u32,
        doc: Option<String>,
        modifiers: ModifierFlags,
    ) -> DeclIndex {
        let keyword = self.token_span();
        self.next_token();
        self.parse_optional(SyntaxKind::AsteriskToken);
        let name = if self.is_identifier() {
            self.parse_identifier()
        } else {
            // `export default function () {}`
            if !modifiers.contains(ModifierFlags::DEFAULT) {
                self.parse_identifier();
            }
            Ident::new("default", keyword)
        };
        let signature = self.parse_signature(SyntaxKind::ColonToken);
        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            Some(self.skip_function_body())
        } else {
            self.parse_semicolon();
            None
        };
        let span = self.span_from(start);
        self.push_declaration(
            name,
            span,
            modifiers,
            doc,
            DeclarationKind::Function(FunctionDeclaration { signature, body }),
        )
    }

    /// Each declarator becomes its own declaration spanning from its name.
    fn parse_variable_statement(&mut self, doc: Option<String>, modifiers: ModifierFlags) -> Vec<DeclIndex> {
        let variable_kind = match self.token_value() {
            "var" => VariableKind::Var,
            "let" => VariableKind::Let,
            _ => VariableKind::Const,
        };
        self.next_token();
        let mut declarations = Vec::new();
        loop {
            if self.is_token(SyntaxKind::OpenBraceToken) || self.is_token(SyntaxKind::OpenBracketToken) {
                // Destructuring declarations introduce no documented names.
                self.skip_balanced();
                if self.parse_optional(SyntaxKind::ColonToken) {
                    self.parse_type();
                }
                if self.parse_optional(SyntaxKind::EqualsToken) {
                    self.parse_assignment_expression();
                }
            } else {
                let name = self.parse_identifier();
                self.parse_optional(SyntaxKind::ExclamationToken);
                let type_annotation = self
                    .parse_optional(SyntaxKind::ColonToken)
                    .then(|| self.parse_type());
                let initializer = self
                    .parse_optional(SyntaxKind::EqualsToken)
                    .then(|| self.parse_assignment_expression());
                let span = self.span_from(name.span.start);
                let index = self.push_declaration(
                    name,
                    span,
                    modifiers,
                    doc.clone(),
                    DeclarationKind::Variable(VariableDeclaration {
                        variable_kind,
                        type_annotation,
                        initializer,
                    }),
                );
                declarations.push(index);
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_semicolon();
        declarations
    }

    fn parse_type_alias_declaration(
        &mut self,
        start: u32,
        doc: Option<String>,
        modifiers: ModifierFlags,
    ) -> DeclIndex {
        self.next_token();
        let name = self.parse_identifier();
        let type_params = self.parse_type_parameters();
        self.parse_expected(SyntaxKind::EqualsToken);
        let ty = self.parse_type();
        self.parse_semicolon();
        let span = self.span_from(start);
        self.push_declaration(
            name,
            span,
            modifiers,
            doc,
            DeclarationKind::TypeAlias(TypeAliasDeclaration { type_params, ty }),
        )
    }

    fn parse_interface_declaration(
        &mut self,
        start: u32,
        doc: Option<String>,
        modifiers: ModifierFlags,
    ) -> DeclIndex {
        self.next_token();
        let name = self.parse_identifier();
        let type_params = self.parse_type_parameters();
        let mut extends = Vec::new();
        if self.parse_optional_word("extends") {
            extends = self.parse_heritage_list();
        }
        let members = self.parse_object_type_members();
        let span = self.span_from(start);
        self.push_declaration(
            name,
            span,
            modifiers,
            doc,
            DeclarationKind::Interface(InterfaceDeclaration {
                type_params,
                extends,
                members,
            }),
        )
    }

    /// `A, B.C<D>, ...` in `extends`/`implements` clauses.
    fn parse_heritage_list(&mut self) -> Vec<TypeNode> {
        let mut types = vec![self.parse_heritage_type()];
        while self.parse_optional(SyntaxKind::CommaToken) {
            types.push(self.parse_heritage_type());
        }
        types
    }

    /// An expression with type arguments. Anything beyond a dotted name
    /// (a mixin call, say) is kept as an unsupported node.
    fn parse_heritage_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        if !self.is_identifier() {
            self.skip_heritage_expression();
            return TypeNode {
                span: self.span_from(start),
                kind: TypeNodeKind::Unsupported,
            };
        }
        let name = self.parse_entity_name();
        let type_arguments = if self.is_token(SyntaxKind::LessThanToken) {
            self.parse_type_arguments()
        } else {
            Vec::new()
        };
        if self.is_token(SyntaxKind::OpenParenToken) {
            self.skip_heritage_expression();
            return TypeNode {
                span: self.span_from(start),
                kind: TypeNodeKind::Unsupported,
            };
        }
        TypeNode {
            span: self.span_from(start),
            kind: TypeNodeKind::Reference {
                name,
                type_arguments,
            },
        }
    }

    fn skip_heritage_expression(&mut self) {
        while !self.is_token(SyntaxKind::OpenBraceToken)
            && !self.is_token(SyntaxKind::CommaToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
            && !self.is_word("implements")
        {
            if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::OpenBracketToken) {
                self.skip_balanced();
            } else {
                self.next_token();
            }
        }
    }

    fn parse_class_declaration(
        &mut self,
        start: u32,
        doc: Option<String>,
        modifiers: ModifierFlags,
    ) -> DeclIndex {
        let keyword = self.token_span();
        self.next_token();
        let name = if self.is_identifier() && !self.is_word("extends") && !self.is_word("implements") {
            self.parse_identifier()
        } else {
            if !modifiers.contains(ModifierFlags::DEFAULT) {
                self.parse_identifier();
            }
            Ident::new("default", keyword)
        };
        let type_params = self.parse_type_parameters();
        let mut extends = None;
        let mut implements = Vec::new();
        loop {
            if self.parse_optional_word("extends") {
                extends = Some(self.parse_heritage_type());
            } else if self.parse_optional_word("implements") {
                implements.extend(self.parse_heritage_list());
            } else {
                break;
            }
        }
        let members = self.parse_class_members();
        let span = self.span_from(start);
        self.push_declaration(
            name,
            span,
            modifiers,
            doc,
            DeclarationKind::Class(ClassDeclaration {
                type_params,
                extends,
                implements,
                members,
            }),
        )
    }

    fn parse_enum_declaration(
        &mut self,
        start: u32,
        doc: Option<String>,
        modifiers: ModifierFlags,
    ) -> DeclIndex {
        self.next_token();
        let name = self.parse_identifier();
        let index = self.push_declaration(
            name,
            Span::new(start, start),
            modifiers,
            doc,
            DeclarationKind::Enum(EnumDeclaration { members: Vec::new() }),
        );

        let saved_parent = self.current_parent.replace(index);
        let mut members = Vec::new();
        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
                let member_doc = self.parse_leading_doc();
                let member_start = self.token_pos();
                let name = match self.current_token {
                    SyntaxKind::Identifier | SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral => {
                        let ident = Ident::new(self.token_value(), self.token_span());
                        self.next_token();
                        ident
                    }
                    _ => {
                        self.error_at_current_token(
                            "Enum member expected.",
                            diagnostic_codes::IDENTIFIER_EXPECTED,
                        );
                        self.next_token();
                        continue;
                    }
                };
                let initializer: Option<Expression> = self
                    .parse_optional(SyntaxKind::EqualsToken)
                    .then(|| self.parse_assignment_expression());
                let span = self.span_from(member_start);
                members.push(self.push_declaration(
                    name,
                    span,
                    ModifierFlags::empty(),
                    member_doc,
                    DeclarationKind::EnumMember(EnumMemberDeclaration { initializer }),
                ));
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }
        self.current_parent = saved_parent;

        let span = self.span_from(start);
        let declaration = self.declaration_mut(index);
        declaration.span = span;
        declaration.kind = DeclarationKind::Enum(EnumDeclaration { members });
        index
    }

    /// After `namespace`/`module`: `A.B.C { ... }` or `"m" { ... }`.
    fn parse_module_declaration(
        &mut self,
        start: u32,
        doc: Option<String>,
        modifiers: ModifierFlags,
    ) -> DeclIndex {
        if self.is_token(SyntaxKind::StringLiteral) {
            let name = Ident::new(self.token_value(), self.token_span());
            self.next_token();
            return self.parse_module_body(start, doc, modifiers, name, ModuleNameKind::String);
        }
        let name = self.parse_identifier();
        if !self.is_token(SyntaxKind::DotToken) {
            return self.parse_module_body(start, doc, modifiers, name, ModuleNameKind::Identifier);
        }

        // `namespace A.B {}` is `namespace A { export namespace B {} }`.
        let index = self.push_declaration(
            name,
            Span::new(start, start),
            modifiers,
            doc,
            DeclarationKind::Module(ModuleDeclaration {
                name_kind: ModuleNameKind::Identifier,
                body: None,
            }),
        );
        self.next_token();
        let saved_parent = self.current_parent.replace(index);
        let inner_start = self.token_pos();
        let inner_modifiers = ModifierFlags::EXPORT | (modifiers & ModifierFlags::DECLARE);
        let inner = self.parse_module_declaration(inner_start, None, inner_modifiers);
        self.current_parent = saved_parent;

        let span = self.span_from(start);
        let declaration = self.declaration_mut(index);
        declaration.span = span;
        declaration.kind = DeclarationKind::Module(ModuleDeclaration {
            name_kind: ModuleNameKind::Identifier,
            body: Some(vec![Statement::Declaration(inner)]),
        });
        index
    }

    fn parse_module_body(
        &mut self,
        start: u32,
        doc: Option<String>,
        modifiers: ModifierFlags,
        name: Ident,
        name_kind: ModuleNameKind,
    ) -> DeclIndex {
        let index = self.push_declaration(
            name,
            Span::new(start, start),
            modifiers,
            doc,
            DeclarationKind::Module(ModuleDeclaration {
                name_kind,
                body: None,
            }),
        );
        let body = if self.parse_optional(SyntaxKind::OpenBraceToken) {
            let saved_parent = self.current_parent.replace(index);
            let statements = self.parse_statement_list(true);
            self.current_parent = saved_parent;
            self.parse_expected(SyntaxKind::CloseBraceToken);
            Some(statements)
        } else {
            self.parse_semicolon();
            None
        };
        let span = self.span_from(start);
        let declaration = self.declaration_mut(index);
        declaration.span = span;
        declaration.kind = DeclarationKind::Module(ModuleDeclaration { name_kind, body });
        index
    }

    // =========================================================================
    // Imports
    // =========================================================================

    fn mark_module_syntax(&mut self) {
        if self.current_parent.is_none() {
            self.is_external_module = true;
        }
    }

    fn parse_import_declaration(&mut self, start: u32, modifiers: ModifierFlags) -> Option<Statement> {
        self.next_token();
        self.mark_module_syntax();

        if self.is_token(SyntaxKind::StringLiteral) {
            let module_specifier = self.parse_string_literal().unwrap_or_default();
            self.skip_import_attributes();
            self.parse_semicolon();
            return Some(Statement::Import(ImportDeclaration {
                span: self.span_from(start),
                is_type_only: false,
                default_binding: None,
                namespace_binding: None,
                named: Vec::new(),
                module_specifier,
            }));
        }

        let is_type_only = self.is_word("type")
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::OpenBraceToken)
                    || p.is_token(SyntaxKind::AsteriskToken)
                    || (p.is_identifier() && !p.is_word("from"))
                    || (p.is_word("from") && p.next_token_is_word("from"))
            });
        if is_type_only {
            self.next_token();
        }

        let mut default_binding = None;
        if self.is_identifier() && !(self.is_word("from") && self.next_token_is(SyntaxKind::StringLiteral)) {
            let name = self.parse_identifier();
            if self.parse_optional(SyntaxKind::EqualsToken) {
                return Some(self.parse_import_equals_rest(start, name, modifiers));
            }
            default_binding = Some(name);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                return Some(self.finish_import(start, is_type_only, default_binding, None, Vec::new()));
            }
        }

        let mut namespace_binding = None;
        let mut named = Vec::new();
        if self.parse_optional(SyntaxKind::AsteriskToken) {
            self.parse_expected_word("as");
            namespace_binding = Some(self.parse_identifier());
        } else if self.parse_optional(SyntaxKind::OpenBraceToken) {
            while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
                let specifier_type_only = self.is_word("type")
                    && self.look_ahead(|p| {
                        p.next_token();
                        p.is_identifier() || p.is_token(SyntaxKind::StringLiteral)
                    })
                    && !self.look_ahead(|p| {
                        // `{ type as }` / `{ type as as }` name the import `type`.
                        p.next_token();
                        p.is_word("as") && {
                            p.next_token();
                            !p.is_identifier() || p.next_token_is(SyntaxKind::CloseBraceToken)
                        }
                    });
                if specifier_type_only {
                    self.next_token();
                }
                let imported = self.parse_module_export_name();
                let local = if self.parse_optional_word("as") {
                    self.parse_identifier()
                } else {
                    imported.clone()
                };
                named.push(ImportSpecifier {
                    imported,
                    local,
                    is_type_only: specifier_type_only,
                });
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        } else {
            self.error_at_current_token("'{' expected.", diagnostic_codes::TOKEN_EXPECTED);
        }

        Some(self.finish_import(start, is_type_only, default_binding, namespace_binding, named))
    }

    fn finish_import(
        &mut self,
        start: u32,
        is_type_only: bool,
        default_binding: Option<Ident>,
        namespace_binding: Option<Ident>,
        named: Vec<ImportSpecifier>,
    ) -> Statement {
        self.parse_expected_word("from");
        let module_specifier = self.parse_string_literal().unwrap_or_default();
        self.skip_import_attributes();
        self.parse_semicolon();
        Statement::Import(ImportDeclaration {
            span: self.span_from(start),
            is_type_only,
            default_binding,
            namespace_binding,
            named,
            module_specifier,
        })
    }

    /// `with { type: "json" }` / `assert { ... }`
    fn skip_import_attributes(&mut self) {
        if (self.is_word("with") || self.is_word("assert")) && !self.has_preceding_line_break() {
            self.next_token();
            if self.is_token(SyntaxKind::OpenBraceToken) {
                self.skip_balanced();
            }
        }
    }

    /// Identifier or string literal naming an export (`export { "a-b" as c }`).
    fn parse_module_export_name(&mut self) -> Ident {
        if self.is_token(SyntaxKind::StringLiteral) {
            let ident = Ident::new(self.token_value(), self.token_span());
            self.next_token();
            return ident;
        }
        self.parse_identifier()
    }

    fn parse_import_equals_rest(&mut self, start: u32, name: Ident, modifiers: ModifierFlags) -> Statement {
        let target = if self.is_word("require") && self.next_token_is(SyntaxKind::OpenParenToken) {
            self.next_token();
            self.next_token();
            let specifier = self.parse_string_literal().unwrap_or_default();
            self.parse_expected(SyntaxKind::CloseParenToken);
            ImportEqualsTarget::External(specifier)
        } else {
            ImportEqualsTarget::Entity(self.parse_entity_name())
        };
        self.parse_semicolon();
        Statement::ImportEquals(ImportEqualsDeclaration {
            span: self.span_from(start),
            name,
            is_export: modifiers.contains(ModifierFlags::EXPORT),
            target,
        })
    }

    // =========================================================================
    // Exports
    // =========================================================================

    fn parse_export(&mut self, start: u32, doc: Option<String>, out: &mut Vec<Statement>) {
        let export_keyword = self.token_span();
        self.next_token();
        if self.current_parent.is_none() {
            self.is_external_module = true;
        }

        if self.parse_optional(SyntaxKind::AsteriskToken) {
            let alias = self.parse_optional_word("as").then(|| self.parse_module_export_name());
            self.parse_expected_word("from");
            let module_specifier = self.parse_string_literal().unwrap_or_default();
            self.skip_import_attributes();
            self.parse_semicolon();
            out.push(Statement::ExportAll(ExportAllDeclaration {
                span: self.span_from(start),
                alias,
                module_specifier,
            }));
            return;
        }

        if self.parse_optional(SyntaxKind::EqualsToken) {
            out.push(self.parse_export_assignment(start, true));
            return;
        }

        if self.is_word("as") && self.next_token_is_word("namespace") {
            // UMD `export as namespace Lib;` adds nothing to the module surface.
            self.skip_statement();
            out.push(Statement::Unknown(self.span_from(start)));
            return;
        }

        if self.is_word("import") {
            if let Some(statement) = self.parse_import_declaration(start, ModifierFlags::EXPORT) {
                out.push(statement);
            }
            return;
        }

        let is_type_only = self.is_word("type") && self.next_token_is(SyntaxKind::OpenBraceToken);
        if is_type_only {
            self.next_token();
        }
        if self.is_token(SyntaxKind::OpenBraceToken) {
            out.push(self.parse_export_list(start, is_type_only));
            return;
        }

        if self.is_word("default") {
            let default_span = self.token_span();
            self.next_token();
            let modifiers = ModifierFlags::EXPORT | ModifierFlags::DEFAULT | self.parse_declaration_modifiers();
            if self.is_word("function") || self.is_word("class") || self.is_word("interface") {
                if self.parse_declaration(start, doc.clone(), modifiers, out) {
                    return;
                }
            }
            self.parse_export_default_expression(start, doc, default_span, out);
            return;
        }

        let modifiers = ModifierFlags::EXPORT | self.parse_declaration_modifiers();
        if !self.parse_declaration(start, doc, modifiers, out) {
            self.error_at(
                export_keyword.start,
                export_keyword.len(),
                "Declaration expected.",
                diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
            );
            self.skip_statement();
            out.push(Statement::Unknown(self.span_from(start)));
        }
    }

    fn parse_export_list(&mut self, start: u32, is_type_only: bool) -> Statement {
        self.next_token();
        let mut specifiers = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            if self.is_word("type") && self.look_ahead(|p| {
                p.next_token();
                p.is_identifier() && !p.is_word("as")
            }) {
                self.next_token();
            }
            let local = self.parse_module_export_name();
            let exported = if self.parse_optional_word("as") {
                self.parse_module_export_name()
            } else {
                local.clone()
            };
            specifiers.push(ExportSpecifier { local, exported });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        let module_specifier = if self.parse_optional_word("from") {
            self.parse_string_literal()
        } else {
            None
        };
        self.skip_import_attributes();
        self.parse_semicolon();
        Statement::Export(ExportDeclaration {
            span: self.span_from(start),
            is_type_only,
            specifiers,
            module_specifier,
        })
    }

    /// `export = a.b;` / `export default a.b;`
    fn parse_export_assignment(&mut self, start: u32, is_export_equals: bool) -> Statement {
        if self.is_identifier() && self.look_ahead_is_entity_statement() {
            let target = self.parse_entity_name();
            self.parse_semicolon();
            return Statement::ExportAssignment(ExportAssignment {
                span: self.span_from(start),
                is_export_equals,
                target,
            });
        }
        self.error_at_current_token(
            "Only entity names are supported in export assignments.",
            diagnostic_codes::UNSUPPORTED_SYNTAX,
        );
        self.skip_statement();
        Statement::Unknown(self.span_from(start))
    }

    /// An entity name that makes up the whole expression statement.
    fn look_ahead_is_entity_statement(&mut self) -> bool {
        self.look_ahead(|p| {
            p.parse_entity_name();
            p.can_parse_semicolon()
        })
    }

    /// `export default <expr>`: an entity name becomes an export assignment;
    /// any other expression becomes a `const default` declaration.
    fn parse_export_default_expression(
        &mut self,
        start: u32,
        doc: Option<String>,
        default_span: Span,
        out: &mut Vec<Statement>,
    ) {
        if self.is_identifier() && self.look_ahead_is_entity_statement() {
            let target: EntityName = self.parse_entity_name();
            self.parse_semicolon();
            out.push(Statement::ExportAssignment(ExportAssignment {
                span: self.span_from(start),
                is_export_equals: false,
                target,
            }));
            return;
        }
        let initializer = self.parse_assignment_expression();
        self.parse_semicolon();
        let span = self.span_from(start);
        let index = self.push_declaration(
            Ident::new("default", default_span),
            span,
            ModifierFlags::EXPORT | ModifierFlags::DEFAULT,
            doc,
            DeclarationKind::Variable(VariableDeclaration {
                variable_kind: VariableKind::Const,
                type_annotation: None,
                initializer: Some(initializer),
            }),
        );
        out.push(Statement::Declaration(index));
    }
}
