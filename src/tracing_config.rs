//! Tracing configuration for inspecting an extraction run.
//!
//! Supports three output formats controlled by `APIGRAPH_LOG_FORMAT`:
//!
//! - `text` (default): standard `tracing-subscriber` flat output
//! - `tree`: hierarchical indented output via `tracing-tree`, following the
//!   walk, export resolution and identifier spans
//! - `json`: one JSON object per span/event
//!
//! ```bash
//! APIGRAPH_LOG=debug APIGRAPH_LOG_FORMAT=tree my-docs-tool
//! APIGRAPH_LOG="apigraph_extract=trace,apigraph_binder=debug" my-docs-tool
//! ```
//!
//! The subscriber is only initialised when `APIGRAPH_LOG` (or `RUST_LOG`) is
//! set, so library users who install their own subscriber are unaffected.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Parse from the `APIGRAPH_LOG_FORMAT` environment variable.
    fn from_env() -> Self {
        Self::parse(&std::env::var("APIGRAPH_LOG_FORMAT").unwrap_or_default())
    }
}

/// Build an `EnvFilter` from `APIGRAPH_LOG`, falling back to `RUST_LOG`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("APIGRAPH_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `APIGRAPH_LOG` nor `RUST_LOG` is set. Output
/// goes to stderr so it never mixes with a document written to stdout.
pub fn init_tracing() {
    let has_apigraph_log = std::env::var("APIGRAPH_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_apigraph_log && !has_rust_log {
        return;
    }

    let filter = build_filter();
    // `try_init` leaves an already installed subscriber in place.
    let _ = match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).try_init()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => {
            let text_layer = fmt::layer().with_writer(std::io::stderr);
            Registry::default().with(filter).with(text_layer).try_init()
        }
    };
}
