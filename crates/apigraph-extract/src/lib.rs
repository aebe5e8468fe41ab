//! Documentation extraction over a bound TypeScript program.
//!
//! The pipeline runs in four stages over one immutable [`Program`]:
//!
//! 1. the [`Extractor`] walks every symbol reachable from the entrypoint
//!    modules, serializing each exactly once,
//! 2. the [`ExportResolver`] picks each symbol's canonical export location,
//! 3. the [`IdentifierAllocator`] assigns unique anchor identifiers,
//! 4. externals are linked through an optional [`ExternalSymbolResolver`].
//!
//! The result is a [`DocsDocument`] whose JSON form is identical across runs
//! on unchanged input.

pub mod config;
mod declaration;
pub mod document;
pub mod error;
pub mod exports;
pub mod external;
pub mod identifiers;
pub mod ids;
pub mod serialized;
mod type_serializer;
pub mod walker;

pub use config::ExtractConfig;
pub use document::{CanonicalExportLocation, DocsDocument, ExternalSymbolLink};
pub use error::{ExtractError, SerializeError};
pub use exports::ExportResolver;
pub use external::{ExternalSymbol, ExternalSymbolResolver, PackageJsonResolver};
pub use identifiers::{IdentifierAllocator, Identifiers};
pub use ids::{SymbolId, symbol_id};
pub use serialized::{
    ClassMember, EnumMemberValue, MappedModifierName, ObjectMember, SerializedParameter, SerializedSignature,
    SerializedSymbol, SerializedTupleElement, SerializedType, SerializedTypeParameter, TupleElementKind,
    VariableKindName,
};
pub use walker::{Extractor, RootModule, SymbolGraph};

use apigraph_binder::{FileId, PackageJson, Program, SourceHost, read_package_json};
use std::collections::BTreeMap;
use tracing::{info, trace};

/// Extract the document for an already loaded program. `program.entrypoints()`
/// must correspond to `config.entrypoints` in order.
#[tracing::instrument(level = "info", skip_all, fields(root = %config.root.display()))]
pub fn extract(
    program: &Program,
    config: &ExtractConfig,
    manifest: Option<&PackageJson>,
    resolver: Option<&dyn ExternalSymbolResolver>,
) -> Result<DocsDocument, ExtractError> {
    let entrypoints: Vec<(String, FileId)> = config
        .entrypoints
        .keys()
        .cloned()
        .zip(program.entrypoints().iter().copied())
        .collect();

    let graph = Extractor::new(program, config.max_type_depth).walk(&entrypoints)?;
    let canonical = ExportResolver::new(program, &graph).resolve();
    let identifiers = IdentifierAllocator::new(&graph, &canonical).allocate();

    let mut external_symbols = BTreeMap::new();
    if let Some(resolver) = resolver {
        for (id, external) in &graph.externals {
            match resolver.resolve(external) {
                Some(link) => {
                    external_symbols.insert(id.clone(), link);
                }
                None => trace!(symbol = %id, "external symbol has no package"),
            }
        }
    }

    let package_name = config
        .package_name
        .clone()
        .or_else(|| manifest.and_then(|manifest| manifest.name.clone()))
        .unwrap_or_default();
    let current_version = config
        .version
        .clone()
        .or_else(|| manifest.and_then(|manifest| manifest.version.clone()))
        .unwrap_or_default();

    info!(
        package = %package_name,
        symbols = graph.symbols.len(),
        canonical = canonical.len(),
        externals = graph.externals.len(),
        "extracted package"
    );

    Ok(DocsDocument {
        package_name,
        current_version,
        versions: config.versions.clone(),
        root_symbols: graph.roots.iter().map(|root| root.id.clone()).collect(),
        symbol_references: graph
            .references
            .iter()
            .map(|(target, referencers)| (target.clone(), referencers.iter().cloned().collect()))
            .collect(),
        accessible_symbols: graph.symbols.into_iter().collect(),
        canonical_export_locations: canonical,
        good_identifiers: identifiers.good_identifiers,
        symbols_for_inner_bit: identifiers.symbols_for_inner_bit,
        external_symbols,
    })
}

/// Load the program described by `config` from `host` and extract it. The
/// package name and version default to the root `package.json`.
pub fn extract_with_host(host: &dyn SourceHost, config: &ExtractConfig) -> Result<DocsDocument, ExtractError> {
    if config.entrypoints.is_empty() {
        return Err(ExtractError::NoEntrypoints);
    }
    let entries: Vec<String> = config.entrypoints.values().cloned().collect();
    let program = Program::load(host, &config.root, &entries)?;
    let manifest = read_package_json(host, &program.root().join("package.json"));
    let resolver = PackageJsonResolver::new(host);
    let resolver = config
        .link_externals
        .then_some(&resolver as &dyn ExternalSymbolResolver);
    extract(&program, config, manifest.as_ref(), resolver)
}
