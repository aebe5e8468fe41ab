//! Extraction input.

use apigraph_common::limits::MAX_TYPE_SERIALIZATION_DEPTH;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to extract: a package root and its entrypoints.
///
/// Deserializes from camelCase JSON:
///
/// ```json
/// {
///   "root": "./packages/core",
///   "entrypoints": { "@scope/core": "src/index.ts", "@scope/core/utils": "src/utils.ts" },
///   "linkExternals": true
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractConfig {
    pub root: PathBuf,
    /// Import specifier → entry file relative to `root`, in document order.
    pub entrypoints: IndexMap<String, String>,
    /// Overrides the `package.json` name.
    #[serde(default)]
    pub package_name: Option<String>,
    /// Overrides the `package.json` version.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub versions: Option<Vec<String>>,
    /// Resolve external symbols to their declaring package.
    #[serde(default)]
    pub link_externals: bool,
    #[serde(default = "default_max_type_depth")]
    pub max_type_depth: u32,
}

fn default_max_type_depth() -> u32 {
    MAX_TYPE_SERIALIZATION_DEPTH
}

impl ExtractConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ExtractConfig {
            root: root.into(),
            entrypoints: IndexMap::new(),
            package_name: None,
            version: None,
            versions: None,
            link_externals: false,
            max_type_depth: MAX_TYPE_SERIALIZATION_DEPTH,
        }
    }

    pub fn with_entrypoint(mut self, specifier: impl Into<String>, path: impl Into<String>) -> Self {
        self.entrypoints.insert(specifier.into(), path.into());
        self
    }
}
