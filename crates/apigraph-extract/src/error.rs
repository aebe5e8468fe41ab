//! Extraction errors.
//!
//! [`ExtractError`] aborts a run: the input breaks an assumption the walk
//! relies on. [`SerializeError`] only affects the symbol being serialized,
//! which degrades to an `unknown` entry carrying the message.

use apigraph_binder::ProgramError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error("entrypoint '{specifier}' ({path}) is not a module")]
    EntrypointNotModule { specifier: String, path: String },
    #[error("symbol '{name}' has no declarations")]
    NoDeclarations { name: String },
    #[error("no entrypoints configured")]
    NoEntrypoints,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("conditional type `{text}` at {location} is missing its {branch} branch")]
    MissingConditionalBranch {
        text: String,
        location: String,
        branch: &'static str,
    },
}
