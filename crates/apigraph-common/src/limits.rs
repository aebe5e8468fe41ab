//! Centralized limits and thresholds.
//!
//! Shared constants for recursion depths and iteration counts used by the
//! parser, binder and extractor. Every limit degrades gracefully: hitting one
//! produces a fallback value and a warning, never a panic.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth for the recursive-descent type and statement parser.
///
/// Past this depth the parser stops descending and records the remaining
/// construct as unsupported text.
pub const MAX_PARSER_RECURSION_DEPTH: u32 = 256;

/// Maximum depth of a single serialized type expression.
///
/// Named types are serialized as references, so only anonymous structure
/// counts towards this limit:
///
/// ```typescript
/// type Deep = { a: { b: { c: { /* ... hundreds of levels ... */ } } } };
/// ```
///
/// Exceeding it serializes the remaining subtree as raw source text.
pub const MAX_TYPE_SERIALIZATION_DEPTH: u32 = 128;

/// Maximum length of an alias chain (`import` → `export {}` → `export *` ...)
/// followed when resolving a symbol to its target declaration.
pub const MAX_ALIAS_RESOLUTION_DEPTH: u32 = 128;

/// Maximum number of pure re-export hops followed to inherit module docs.
pub const MAX_DOC_INHERITANCE_HOPS: u32 = 16;

// =============================================================================
// Iteration Limits
// =============================================================================

/// Maximum number of identifier placement rounds for symbols rendered inline.
///
/// Each round places every symbol whose referencer was placed in an earlier
/// round, so the count is bounded by the longest inner reference chain.
pub const MAX_PLACEMENT_ROUNDS: u32 = 10_000;
