//! Common types and utilities for apigraph.
//!
//! This crate provides foundational types used across all apigraph crates:
//! - Source spans (`Span`) and line/column lookup (`LineMap`)
//! - Comment scanning and JSDoc extraction
//! - Parse/bind diagnostics
//! - Centralized limits and thresholds

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::{LineMap, Span};

// Comment parsing utilities
pub mod comments;
pub use comments::CommentRange;

// Diagnostics reported by the parser and binder
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};

// Centralized limits and thresholds
pub mod limits;
