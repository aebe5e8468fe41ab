//! Owned AST for the declaration surface of a TypeScript file.
//!
//! Declarations live in one arena per file ([`SourceFile::declarations`]) and
//! are addressed by [`DeclIndex`]; statements and namespace bodies refer to
//! them by index so binder symbols can point at a `(file, DeclIndex)` pair.
//! Function and method bodies are not represented beyond a [`FunctionBody`]
//! summary.

use apigraph_common::{CommentRange, Diagnostic, Span};
use bitflags::bitflags;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    pub text: String,
    pub span: Span,
}

impl Ident {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Ident {
            text: text.into(),
            span,
        }
    }
}

/// Index of a declaration in [`SourceFile::declarations`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclIndex(pub u32);

bitflags! {
    /// Modifiers written on a declaration, member or parameter.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u32 {
        const EXPORT = 1 << 0;
        const DEFAULT = 1 << 1;
        const DECLARE = 1 << 2;
        const ABSTRACT = 1 << 3;
        const PUBLIC = 1 << 4;
        const PRIVATE = 1 << 5;
        const PROTECTED = 1 << 6;
        const STATIC = 1 << 7;
        const READONLY = 1 << 8;
        const ASYNC = 1 << 9;
        const CONST = 1 << 10;
        const OVERRIDE = 1 << 11;
        const ACCESSOR = 1 << 12;

        const ACCESSIBILITY = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits();
        /// Modifiers that turn a constructor parameter into a property.
        const PARAMETER_PROPERTY = Self::ACCESSIBILITY.bits() | Self::READONLY.bits() | Self::OVERRIDE.bits();
    }
}

// =============================================================================
// Source file and statements
// =============================================================================

#[derive(Clone, Debug)]
pub struct SourceFile {
    pub file_name: String,
    pub text: String,
    pub statements: Vec<Statement>,
    pub declarations: Vec<Declaration>,
    pub comments: Vec<CommentRange>,
    /// The file's own leading documentation comment.
    pub doc: Option<String>,
    /// True when the file has a top-level import or export.
    pub is_external_module: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl SourceFile {
    pub fn decl(&self, index: DeclIndex) -> &Declaration {
        &self.declarations[index.0 as usize]
    }

    pub fn text_of(&self, span: Span) -> &str {
        span.text(&self.text)
    }

    /// Top-level declaration indices in source order.
    pub fn top_level_declarations(&self) -> impl Iterator<Item = DeclIndex> + '_ {
        self.statements.iter().filter_map(|stmt| match stmt {
            Statement::Declaration(index) => Some(*index),
            _ => None,
        })
    }
}

#[derive(Clone, Debug)]
pub enum Statement {
    Declaration(DeclIndex),
    Import(ImportDeclaration),
    ImportEquals(ImportEqualsDeclaration),
    Export(ExportDeclaration),
    ExportAll(ExportAllDeclaration),
    ExportAssignment(ExportAssignment),
    /// A statement with no effect on the declaration surface.
    Unknown(Span),
}

/// `import a, { b as c, type d } from "m"` / `import * as ns from "m"` / `import "m"`
#[derive(Clone, Debug)]
pub struct ImportDeclaration {
    pub span: Span,
    pub is_type_only: bool,
    pub default_binding: Option<Ident>,
    pub namespace_binding: Option<Ident>,
    pub named: Vec<ImportSpecifier>,
    pub module_specifier: String,
}

#[derive(Clone, Debug)]
pub struct ImportSpecifier {
    /// Name exported by the target module.
    pub imported: Ident,
    /// Name bound in this file.
    pub local: Ident,
    pub is_type_only: bool,
}

/// `import x = require("m")` / `import x = a.b.c`
#[derive(Clone, Debug)]
pub struct ImportEqualsDeclaration {
    pub span: Span,
    pub name: Ident,
    pub is_export: bool,
    pub target: ImportEqualsTarget,
}

#[derive(Clone, Debug)]
pub enum ImportEqualsTarget {
    External(String),
    Entity(EntityName),
}

/// `export { a, b as c }` / `export { a } from "m"`
#[derive(Clone, Debug)]
pub struct ExportDeclaration {
    pub span: Span,
    pub is_type_only: bool,
    pub specifiers: Vec<ExportSpecifier>,
    pub module_specifier: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ExportSpecifier {
    /// Local (or re-exported module's) name.
    pub local: Ident,
    /// Name this module exports it as.
    pub exported: Ident,
}

/// `export * from "m"` / `export * as ns from "m"`
#[derive(Clone, Debug)]
pub struct ExportAllDeclaration {
    pub span: Span,
    pub alias: Option<Ident>,
    pub module_specifier: String,
}

/// `export = a.b` / `export default a.b`
#[derive(Clone, Debug)]
pub struct ExportAssignment {
    pub span: Span,
    pub is_export_equals: bool,
    pub target: EntityName,
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Clone, Debug)]
pub struct Declaration {
    pub name: Ident,
    pub span: Span,
    pub modifiers: ModifierFlags,
    pub doc: Option<String>,
    pub kind: DeclarationKind,
    /// Enclosing namespace or enum.
    pub parent: Option<DeclIndex>,
}

impl Declaration {
    pub fn is_exported(&self) -> bool {
        self.modifiers.contains(ModifierFlags::EXPORT)
    }

    pub fn is_default_export(&self) -> bool {
        self.modifiers.contains(ModifierFlags::EXPORT | ModifierFlags::DEFAULT)
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            DeclarationKind::Function(_) => "function",
            DeclarationKind::Variable(_) => "variable",
            DeclarationKind::TypeAlias(_) => "type alias",
            DeclarationKind::Interface(_) => "interface",
            DeclarationKind::Class(_) => "class",
            DeclarationKind::Enum(_) => "enum",
            DeclarationKind::EnumMember(_) => "enum member",
            DeclarationKind::Module(_) => "module",
        }
    }
}

#[derive(Clone, Debug)]
pub enum DeclarationKind {
    Function(FunctionDeclaration),
    Variable(VariableDeclaration),
    TypeAlias(TypeAliasDeclaration),
    Interface(InterfaceDeclaration),
    Class(ClassDeclaration),
    Enum(EnumDeclaration),
    EnumMember(EnumMemberDeclaration),
    Module(ModuleDeclaration),
}

#[derive(Clone, Debug)]
pub struct FunctionDeclaration {
    pub signature: Signature,
    pub body: Option<FunctionBody>,
}

/// Summary of a skipped function body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FunctionBody {
    pub span: Span,
    /// True when the body contains `return <expression>`.
    pub has_return_value: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }
}

#[derive(Clone, Debug)]
pub struct VariableDeclaration {
    pub variable_kind: VariableKind,
    pub type_annotation: Option<TypeNode>,
    pub initializer: Option<Expression>,
}

#[derive(Clone, Debug)]
pub struct TypeAliasDeclaration {
    pub type_params: Vec<TypeParameter>,
    pub ty: TypeNode,
}

#[derive(Clone, Debug)]
pub struct InterfaceDeclaration {
    pub type_params: Vec<TypeParameter>,
    pub extends: Vec<TypeNode>,
    pub members: Vec<TypeMember>,
}

#[derive(Clone, Debug)]
pub struct ClassDeclaration {
    pub type_params: Vec<TypeParameter>,
    pub extends: Option<TypeNode>,
    pub implements: Vec<TypeNode>,
    pub members: Vec<ClassMember>,
}

#[derive(Clone, Debug)]
pub struct EnumDeclaration {
    pub members: Vec<DeclIndex>,
}

#[derive(Clone, Debug)]
pub struct EnumMemberDeclaration {
    pub initializer: Option<Expression>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleNameKind {
    /// `namespace A {}` / `module A {}`
    Identifier,
    /// `declare module "m" {}`
    String,
    /// `declare global {}`
    Global,
}

#[derive(Clone, Debug)]
pub struct ModuleDeclaration {
    pub name_kind: ModuleNameKind,
    /// `None` for a shorthand ambient module (`declare module "m";`).
    pub body: Option<Vec<Statement>>,
}

// =============================================================================
// Members, parameters and signatures
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyName {
    Identifier(Ident),
    String(String, Span),
    Numeric(String, Span),
    Private(Ident),
    /// `[expr]`, kept as source text.
    Computed(String, Span),
}

impl PropertyName {
    pub fn text(&self) -> &str {
        match self {
            PropertyName::Identifier(ident) | PropertyName::Private(ident) => &ident.text,
            PropertyName::String(text, _)
            | PropertyName::Numeric(text, _)
            | PropertyName::Computed(text, _) => text,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            PropertyName::Identifier(ident) | PropertyName::Private(ident) => ident.span,
            PropertyName::String(_, span)
            | PropertyName::Numeric(_, span)
            | PropertyName::Computed(_, span) => *span,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, PropertyName::Private(_))
    }
}

#[derive(Clone, Debug)]
pub struct TypeParameter {
    pub name: Ident,
    pub constraint: Option<TypeNode>,
    pub default: Option<TypeNode>,
}

#[derive(Clone, Debug)]
pub struct Parameter {
    /// Identifier, or the source text of a binding pattern.
    pub name: Ident,
    pub span: Span,
    pub modifiers: ModifierFlags,
    pub dot_dot_dot: bool,
    pub question: bool,
    pub type_annotation: Option<TypeNode>,
    pub initializer: Option<Expression>,
}

#[derive(Clone, Debug, Default)]
pub struct Signature {
    pub type_params: Vec<TypeParameter>,
    pub params: Vec<Parameter>,
    pub return_type: Option<Box<TypeNode>>,
}

#[derive(Clone, Debug)]
pub struct TypeMember {
    pub span: Span,
    pub doc: Option<String>,
    pub kind: TypeMemberKind,
}

#[derive(Clone, Debug)]
pub enum TypeMemberKind {
    Property {
        name: PropertyName,
        optional: bool,
        readonly: bool,
        ty: Option<TypeNode>,
    },
    Method {
        name: PropertyName,
        optional: bool,
        signature: Signature,
    },
    Call(Signature),
    Construct(Signature),
    Index {
        params: Vec<Parameter>,
        ty: Option<TypeNode>,
        readonly: bool,
    },
    GetAccessor {
        name: PropertyName,
        ty: Option<TypeNode>,
    },
    SetAccessor {
        name: PropertyName,
        param: Option<Box<Parameter>>,
    },
    Unknown,
}

#[derive(Clone, Debug)]
pub struct ClassMember {
    pub span: Span,
    pub doc: Option<String>,
    pub modifiers: ModifierFlags,
    pub kind: ClassMemberKind,
}

#[derive(Clone, Debug)]
pub enum ClassMemberKind {
    Property {
        name: PropertyName,
        optional: bool,
        ty: Option<TypeNode>,
        initializer: Option<Expression>,
    },
    Method {
        name: PropertyName,
        optional: bool,
        signature: Signature,
        body: Option<FunctionBody>,
    },
    Constructor {
        signature: Signature,
        body: Option<FunctionBody>,
    },
    GetAccessor {
        name: PropertyName,
        ty: Option<TypeNode>,
        body: Option<FunctionBody>,
    },
    SetAccessor {
        name: PropertyName,
        param: Option<Box<Parameter>>,
    },
    Index {
        params: Vec<Parameter>,
        ty: Option<TypeNode>,
    },
    /// `static { ... }` blocks and unparseable members.
    Unknown,
}

impl ClassMember {
    pub fn name(&self) -> Option<&PropertyName> {
        match &self.kind {
            ClassMemberKind::Property { name, .. }
            | ClassMemberKind::Method { name, .. }
            | ClassMemberKind::GetAccessor { name, .. }
            | ClassMemberKind::SetAccessor { name, .. } => Some(name),
            _ => None,
        }
    }
}

// =============================================================================
// Types
// =============================================================================

/// Dotted name `a.b.c`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityName {
    pub parts: Vec<Ident>,
    pub span: Span,
}

impl EntityName {
    pub fn from_ident(ident: Ident) -> Self {
        let span = ident.span;
        EntityName {
            parts: vec![ident],
            span,
        }
    }

    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|part| part.text.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn first(&self) -> &Ident {
        &self.parts[0]
    }

    pub fn last(&self) -> &Ident {
        &self.parts[self.parts.len() - 1]
    }

    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1
    }
}

#[derive(Clone, Debug)]
pub struct TypeNode {
    pub span: Span,
    pub kind: TypeNodeKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeOperator {
    Keyof,
    Readonly,
    Unique,
}

/// `+`/`-` prefix on a mapped type modifier; `Present` when written bare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappedModifier {
    Present,
    Plus,
    Minus,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralType {
    String(String),
    Number(f64),
    BigInt(String),
}

#[derive(Clone, Debug)]
pub struct TupleElement {
    pub span: Span,
    pub label: Option<Ident>,
    pub optional: bool,
    pub dot_dot_dot: bool,
    pub ty: TypeNode,
}

#[derive(Clone, Debug)]
pub enum TypeNodeKind {
    /// `string`, `any`, `this`, `true`, `unique symbol`, ...
    Keyword(String),
    Reference {
        name: EntityName,
        type_arguments: Vec<TypeNode>,
    },
    /// `typeof a.b`
    Query {
        name: EntityName,
        type_arguments: Vec<TypeNode>,
    },
    Array(Box<TypeNode>),
    Operator {
        operator: TypeOperator,
        ty: Box<TypeNode>,
    },
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Infer {
        name: Ident,
        constraint: Option<Box<TypeNode>>,
    },
    Parenthesized(Box<TypeNode>),
    Tuple(Vec<TupleElement>),
    TypeLiteral(Vec<TypeMember>),
    IndexedAccess {
        object: Box<TypeNode>,
        index: Box<TypeNode>,
    },
    /// Branches are `None` only when the parser had to recover.
    Conditional {
        check: Box<TypeNode>,
        extends: Box<TypeNode>,
        true_type: Option<Box<TypeNode>>,
        false_type: Option<Box<TypeNode>>,
    },
    Literal(LiteralType),
    Mapped {
        readonly: Option<MappedModifier>,
        type_param: Ident,
        constraint: Box<TypeNode>,
        name_type: Option<Box<TypeNode>>,
        optional: Option<MappedModifier>,
        ty: Option<Box<TypeNode>>,
    },
    Function(Signature),
    Constructor {
        signature: Signature,
        is_abstract: bool,
    },
    TypePredicate {
        asserts: bool,
        param: Ident,
        ty: Option<Box<TypeNode>>,
    },
    /// `import("m").A.B<T>` / `typeof import("m")`
    Import {
        specifier: String,
        qualifier: Option<EntityName>,
        type_arguments: Vec<TypeNode>,
        is_typeof: bool,
    },
    TemplateLiteral,
    Unsupported,
}

// =============================================================================
// Expressions (initializers only)
// =============================================================================

#[derive(Clone, Debug)]
pub struct Expression {
    pub span: Span,
    pub kind: ExpressionKind,
}

#[derive(Clone, Debug)]
pub enum ObjectLiteralMember {
    Property { name: PropertyName, value: Expression },
    Shorthand(Ident),
    Method { name: PropertyName, signature: Signature },
    Spread(Span),
}

#[derive(Clone, Debug)]
pub enum ExpressionKind {
    String(String),
    Number(f64),
    BigInt(String),
    Template { has_substitutions: bool },
    True,
    False,
    Null,
    /// Identifier or property access chain `a.b.c`.
    Entity(EntityName),
    Array(Vec<Expression>),
    Object(Vec<ObjectLiteralMember>),
    New { callee: Option<EntityName> },
    As { expression: Box<Expression>, ty: TypeNode },
    AsConst(Box<Expression>),
    Function {
        signature: Signature,
        body: Option<FunctionBody>,
        /// Concise arrow body.
        body_expression: Option<Box<Expression>>,
        is_async: bool,
    },
    /// Unary prefix operator (`-`, `+`, `!`, `typeof`, `void`).
    Prefix { operator: String, operand: Box<Expression> },
    Unknown,
}
