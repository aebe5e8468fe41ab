//! apigraph: documentation extraction and symbol-graph resolution for
//! TypeScript packages.
//!
//! The workspace crates do the work; this facade wires them to the file
//! system:
//!
//! - [`syntax`]: scanner, AST and parser for the declaration surface,
//! - [`binder`]: module resolution, symbols, export tables and inference,
//! - [`extract`]: the symbol graph walk, export resolution and identifiers.
//!
//! ```no_run
//! let document = apigraph::extract_package("packages/core/apigraph.json")?;
//! println!("{}", document.to_json_pretty()?);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod tracing_config;

pub use apigraph_binder as binder;
pub use apigraph_common as common;
pub use apigraph_extract as extract;
pub use apigraph_syntax as syntax;

pub use apigraph_extract::{DocsDocument, ExtractConfig, ExtractError, SymbolId};

use anyhow::{Context, Result};
use apigraph_binder::DiskHost;
use std::path::Path;
use tracing::debug;

/// Conventional name of an extraction config file.
pub const CONFIG_FILE_NAME: &str = "apigraph.json";

/// Parse an extraction config. A relative `root` stays relative; see
/// [`load_config`] for resolution against the config file.
pub fn parse_config(source: &str) -> Result<ExtractConfig> {
    serde_json::from_str(source).context("failed to parse extraction config JSON")
}

/// Read an `apigraph.json`. A relative `root` resolves against the
/// directory holding the config file.
pub fn load_config(path: &Path) -> Result<ExtractConfig> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("failed to read config: {}", path.display()))?;
    let mut config =
        parse_config(&source).with_context(|| format!("failed to parse config: {}", path.display()))?;
    if config.root.is_relative() {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.root = base.join(&config.root);
    }
    debug!(config = %path.display(), root = %config.root.display(), "loaded extraction config");
    Ok(config)
}

/// Extract a package from disk as described by `config`.
pub fn extract_from_disk(config: &ExtractConfig) -> Result<DocsDocument> {
    apigraph_extract::extract_with_host(&DiskHost, config)
        .with_context(|| format!("failed to extract package at {}", config.root.display()))
}

/// Load a config file (or a directory holding `apigraph.json`) and extract
/// the package it describes.
pub fn extract_package(path: impl AsRef<Path>) -> Result<DocsDocument> {
    let path = path.as_ref();
    let config_path = if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    let config = load_config(&config_path)?;
    extract_from_disk(&config)
}
