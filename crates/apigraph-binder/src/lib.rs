//! Module resolution, binding and name resolution for apigraph.
//!
//! [`Program::load`] reads every file reachable from a package's entrypoints,
//! binds declarations into symbols (merging declarations that share a name)
//! and answers the queries the extractor needs: export tables, alias
//! resolution, lexical lookup and qualified-name resolution. The
//! [`checker`] module infers types that can be read off initializers.

pub mod checker;
pub mod host;
pub mod program;
pub mod resolver;
mod state_binding;
mod state_import_export;
mod state_name_resolution;
pub mod symbols;

pub use checker::{EnumValue, InferredMember, InferredSignature, InferredType, Widening};
pub use host::{DiskHost, MemoryHost, SourceHost, normalize_path};
pub use program::{BoundFile, EXPORT_EQUALS, ExportTable, Program, ProgramError, Resolution};
pub use resolver::{ModuleResolver, PackageJson, find_package_root, read_package_json};
pub use state_name_resolution::qualify;
pub use symbols::{Alias, AliasTarget, DeclSite, FileId, Symbol, SymbolArena, SymbolFlags, SymbolRef, SymbolTable};
