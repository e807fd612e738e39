//! CLI support for jsonq
//!
//! Provides programmatic access to the `jsonq` commands so other tools can
//! run them without spawning the binary.

mod query;

pub use query::{
    EvalOptions, PutOptions, QueryOptions, execute_eval, execute_explain, execute_get,
    execute_put,
};

use std::io;

use thiserror::Error;

use crate::{ExprError, QueryError};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Path evaluation or mutation error
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Expression error
    #[error("Expression error: {0}")]
    Expr(#[from] ExprError),

    /// JSON parsing error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No input provided
    #[error("No input provided. Use --input, --file or pipe JSON to stdin.")]
    NoInput,
}
