//! Module specifier resolution.
//!
//! Relative and absolute specifiers probe TypeScript extensions, map
//! JavaScript extensions onto their declaration counterparts and fall back to
//! directory `index` files. Bare specifiers walk up through `node_modules`
//! directories and honour `package.json` `types`/`typings`/`main` fields,
//! then `@types` packages.

use crate::host::{SourceHost, normalize_path};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::trace;

const KNOWN_EXTENSIONS: [&str; 11] = [
    ".d.mts", ".d.cts", ".d.ts", ".mts", ".cts", ".tsx", ".ts", ".mjs", ".cjs", ".jsx", ".js",
];
const TS_EXTENSION_CANDIDATES: [&str; 7] = ["ts", "tsx", "d.ts", "mts", "cts", "d.mts", "d.cts"];

/// The `package.json` fields the engine reads.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub types: Option<String>,
    #[serde(default)]
    pub typings: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
}

impl PackageJson {
    /// Entry fields in lookup order.
    fn entry_candidates(&self) -> Vec<&str> {
        let mut candidates: Vec<&str> = Vec::new();
        for value in [&self.types, &self.typings, &self.main].into_iter().flatten() {
            if !candidates.contains(&value.as_str()) {
                candidates.push(value);
            }
        }
        candidates
    }
}

pub fn read_package_json(host: &dyn SourceHost, path: &Path) -> Option<PackageJson> {
    let contents = host.read_file(path)?;
    serde_json::from_str(&contents).ok()
}

/// The nearest directory at or above `from` containing a `package.json`.
pub fn find_package_root(host: &dyn SourceHost, from: &Path) -> Option<(PathBuf, PackageJson)> {
    let mut current = Some(from);
    while let Some(dir) = current {
        let manifest = dir.join("package.json");
        if host.file_exists(&manifest) {
            if let Some(package_json) = read_package_json(host, &manifest) {
                return Some((dir.to_path_buf(), package_json));
            }
        }
        current = dir.parent();
    }
    None
}

pub struct ModuleResolver<'h> {
    host: &'h dyn SourceHost,
}

impl<'h> ModuleResolver<'h> {
    pub fn new(host: &'h dyn SourceHost) -> Self {
        ModuleResolver { host }
    }

    /// Resolve `specifier` as written in `from_file`.
    pub fn resolve(&self, from_file: &Path, specifier: &str) -> Option<PathBuf> {
        let specifier = specifier.trim().replace('\\', "/");
        if specifier.is_empty() {
            return None;
        }
        let from_dir = from_file.parent().unwrap_or(from_file);

        let resolved = if Path::new(&specifier).is_absolute() {
            self.resolve_file_or_directory(&normalize_path(Path::new(&specifier)))
        } else if is_relative_specifier(&specifier) {
            self.resolve_file_or_directory(&normalize_path(&from_dir.join(&specifier)))
        } else {
            self.resolve_node_module(from_dir, &specifier)
        };

        trace!(from = %from_file.display(), %specifier, resolved = ?resolved, "resolve module");
        resolved.map(|path| self.host.canonicalize(&path))
    }

    /// Resolve a package entrypoint path given relative to `root`.
    pub fn resolve_entry(&self, root: &Path, entry: &str) -> Option<PathBuf> {
        let entry = entry.trim().trim_start_matches("./");
        let path = if Path::new(entry).is_absolute() {
            PathBuf::from(entry)
        } else {
            root.join(entry)
        };
        self.resolve_file_or_directory(&normalize_path(&path))
            .map(|path| self.host.canonicalize(&path))
    }

    fn resolve_node_module(&self, from_dir: &Path, specifier: &str) -> Option<PathBuf> {
        let (package_name, subpath) = split_package_specifier(specifier)?;
        let types_package = match package_name.strip_prefix('@') {
            Some(scoped) => format!("@types/{}", scoped.replace('/', "__")),
            None => format!("@types/{package_name}"),
        };

        let mut current = Some(from_dir);
        while let Some(dir) = current {
            let node_modules = dir.join("node_modules");
            if self.host.directory_exists(&node_modules) {
                for name in [package_name.as_str(), types_package.as_str()] {
                    let package_root = node_modules.join(name);
                    let resolved = match &subpath {
                        Some(subpath) => self.resolve_file_or_directory(&package_root.join(subpath)),
                        None => self.resolve_file_or_directory(&package_root),
                    };
                    if resolved.is_some() {
                        return resolved;
                    }
                }
            }
            current = dir.parent();
        }
        None
    }

    fn resolve_file_or_directory(&self, path: &Path) -> Option<PathBuf> {
        self.resolve_file(path).or_else(|| self.resolve_directory(path))
    }

    fn resolve_file(&self, path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        if let Some(ext) = KNOWN_EXTENSIONS.iter().find(|ext| path_str.ends_with(*ext)) {
            if is_typescript_extension(ext) && self.host.file_exists(path) {
                return Some(path.to_path_buf());
            }
            // `./a.js` written in a TypeScript source names `./a.ts` or `./a.d.ts`.
            let base = &path_str[..path_str.len() - ext.len()];
            let replacements: &[&str] = match *ext {
                ".js" => &["ts", "tsx", "d.ts"],
                ".jsx" => &["tsx", "d.ts"],
                ".mjs" => &["mts", "d.mts"],
                ".cjs" => &["cts", "d.cts"],
                _ => &[],
            };
            if let Some(found) = replacements
                .iter()
                .map(|replacement| PathBuf::from(format!("{base}.{replacement}")))
                .find(|candidate| self.host.file_exists(candidate))
            {
                return Some(found);
            }
        }

        TS_EXTENSION_CANDIDATES
            .iter()
            .map(|ext| PathBuf::from(format!("{path_str}.{ext}")))
            .find(|candidate| self.host.file_exists(candidate))
    }

    fn resolve_directory(&self, dir: &Path) -> Option<PathBuf> {
        if !self.host.directory_exists(dir) {
            return None;
        }
        if let Some(package_json) = read_package_json(self.host, &dir.join("package.json")) {
            for entry in package_json.entry_candidates() {
                let entry_path = normalize_path(&dir.join(entry.trim_start_matches("./")));
                if entry_path == dir {
                    continue;
                }
                if let Some(resolved) = self.resolve_file_or_directory(&entry_path) {
                    return Some(resolved);
                }
            }
        }
        self.resolve_file(&dir.join("index"))
    }
}

pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

pub fn is_declaration_file(path: &Path) -> bool {
    let name = path.to_string_lossy();
    name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts")
}

fn is_typescript_extension(ext: &str) -> bool {
    matches!(ext, ".d.mts" | ".d.cts" | ".d.ts" | ".mts" | ".cts" | ".tsx" | ".ts")
}

/// `@scope/pkg/sub/path` → (`@scope/pkg`, `Some("sub/path")`).
pub fn split_package_specifier(specifier: &str) -> Option<(String, Option<String>)> {
    let mut parts = specifier.split('/');
    let first = parts.next().filter(|part| !part.is_empty())?;

    let package = if first.starts_with('@') {
        let second = parts.next().filter(|part| !part.is_empty())?;
        format!("{first}/{second}")
    } else {
        first.to_string()
    };

    let rest = parts.collect::<Vec<_>>().join("/");
    let subpath = if rest.is_empty() { None } else { Some(rest) };
    Some((package, subpath))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_scoped_and_plain_specifiers() {
        assert_eq!(
            split_package_specifier("@scope/pkg/sub/path"),
            Some(("@scope/pkg".to_string(), Some("sub/path".to_string())))
        );
        assert_eq!(split_package_specifier("lodash"), Some(("lodash".to_string(), None)));
        assert_eq!(split_package_specifier("@scope"), None);
    }

    #[test]
    fn relative_specifiers() {
        assert!(is_relative_specifier("./a"));
        assert!(is_relative_specifier(".."));
        assert!(!is_relative_specifier(".hidden"));
        assert!(!is_relative_specifier("pkg"));
    }

    #[test]
    fn package_entry_candidates_are_deduplicated() {
        let package_json: PackageJson = serde_json::from_str(
            r#"{ "name": "p", "types": "./lib/index.d.ts", "typings": "./lib/index.d.ts", "main": "lib/index.js" }"#,
        )
        .unwrap();
        assert_eq!(
            package_json.entry_candidates(),
            vec!["./lib/index.d.ts", "lib/index.js"]
        );
    }
}
