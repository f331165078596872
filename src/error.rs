//! Error types for schema conversion.
//!
//! Every failure aborts the whole conversion call; there is no partial
//! result. Variants that originate from a schema location carry the
//! location rendered as a `#/...` path.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not parse schema reference `{0}`")]
    ReferenceSyntax(String),

    #[error("definition `{name}` not found at {path}")]
    MissingDefinition { name: String, path: String },

    #[error("property `{name}` not found at {path}")]
    MissingProperty { name: String, path: String },

    #[error("`{keyword}` index {index} is out of range (or not an array) at {path}")]
    Index { keyword: &'static str, index: usize, path: String },

    #[error("enum at {path} must be an array of strings")]
    InvalidEnum { path: String },

    #[error("`type` at {path} must name at least one type")]
    EmptyTypeList { path: String },

    #[error("unknown type name `{name}` at {path}")]
    UnknownTypeName { name: String, path: String },

    #[error("unsupported string format `{format}` at {path}")]
    UnsupportedFormat { format: String, path: String },

    #[error("cannot unify a class with a map")]
    ClassMapConflict,

    #[error("cannot unify an empty list of types")]
    EmptyUnification,

    #[error("unresolvable recursion at {path}: no class or map breaks the cycle")]
    UnresolvableRecursion { path: String },

    #[error("malformed `{keyword}` at {path}")]
    MalformedKeyword { keyword: &'static str, path: String },

    #[error("expected a schema object at {path}")]
    NotASchema { path: String },

    #[error("type {handle} was already completed")]
    AlreadyResolved { handle: String },

    #[error("invalid options at {path}: {message}")]
    Config { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
