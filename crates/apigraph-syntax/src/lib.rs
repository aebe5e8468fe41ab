//! Scanner, AST and parser for the declaration surface of TypeScript.
//!
//! The parser understands everything that shapes a package's public API:
//! imports and exports, declarations (functions, variables, type aliases,
//! interfaces, classes, enums, namespaces and ambient modules), the complete
//! type grammar and the initializer expressions used for type inference.
//! Function bodies are skipped.

pub mod ast;
pub mod parser;
pub mod scanner;
pub mod visit;

pub use ast::SourceFile;
pub use parser::{ParserState, parse};
pub use scanner::{Scanner, SyntaxKind};
