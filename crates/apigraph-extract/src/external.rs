//! Linking symbols declared outside the package to their own package.

use crate::document::ExternalSymbolLink;
use crate::ids::{SymbolId, format_sites};
use apigraph_binder::{SourceHost, find_package_root};
use std::path::{Path, PathBuf};
use tracing::trace;

/// A symbol the walk reached but did not serialize.
#[derive(Clone, Debug)]
pub struct ExternalSymbol {
    pub id: SymbolId,
    pub name: String,
    /// Absolute path and name offset of each declaration; empty for library
    /// globals and unresolved imports.
    pub sites: Vec<(PathBuf, u32)>,
    /// Module specifier of an unresolved import.
    pub specifier: Option<String>,
}

pub trait ExternalSymbolResolver {
    fn resolve(&self, symbol: &ExternalSymbol) -> Option<ExternalSymbolLink>;
}

/// Resolves a declared external symbol through the nearest `package.json`
/// above its first declaration. The linked id uses paths relative to that
/// package's root, matching what an extraction of the dependency produces.
pub struct PackageJsonResolver<'h> {
    host: &'h dyn SourceHost,
}

impl<'h> PackageJsonResolver<'h> {
    pub fn new(host: &'h dyn SourceHost) -> Self {
        PackageJsonResolver { host }
    }
}

impl ExternalSymbolResolver for PackageJsonResolver<'_> {
    fn resolve(&self, symbol: &ExternalSymbol) -> Option<ExternalSymbolLink> {
        let (first, _) = symbol.sites.first()?;
        let (root, manifest) = find_package_root(self.host, first.parent()?)?;
        let (Some(pkg), Some(version)) = (manifest.name, manifest.version) else {
            trace!(root = %root.display(), "package.json without name or version");
            return None;
        };

        let relative: Vec<(String, u32)> = symbol
            .sites
            .iter()
            .map(|(path, offset)| (relative_to(&root, path), *offset))
            .collect();
        let id = format_sites(relative.iter().map(|(path, offset)| (path.as_str(), *offset)));
        Some(ExternalSymbolLink { pkg, version, id })
    }
}

fn relative_to(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigraph_binder::MemoryHost;

    #[test]
    fn declared_externals_link_to_their_package() {
        let host = MemoryHost::new()
            .with_file(
                "/pkg/node_modules/dep/package.json",
                r#"{ "name": "dep", "version": "2.0.0" }"#,
            )
            .with_file("/pkg/node_modules/dep/lib/index.d.ts", "");
        let resolver = PackageJsonResolver::new(&host);
        let symbol = ExternalSymbol {
            id: SymbolId::new("node_modules/dep/lib/index.d.ts:21"),
            name: "Dep".to_string(),
            sites: vec![(PathBuf::from("/pkg/node_modules/dep/lib/index.d.ts"), 21)],
            specifier: None,
        };
        assert_eq!(
            resolver.resolve(&symbol),
            Some(ExternalSymbolLink {
                pkg: "dep".to_string(),
                version: "2.0.0".to_string(),
                id: SymbolId::new("lib/index.d.ts:21"),
            })
        );

        let global = ExternalSymbol {
            id: SymbolId::global("Promise"),
            name: "Promise".to_string(),
            sites: Vec::new(),
            specifier: None,
        };
        assert_eq!(resolver.resolve(&global), None);
    }
}
