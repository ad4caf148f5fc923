//! Error taxonomy for the transpiler.

use std::path::PathBuf;

use thiserror::Error;

/// Failures the transpiler can surface.
///
/// Unresolvable types and missing link-source directories are deliberately
/// not represented here: both are non-fatal and degrade to a fallback
/// (`unknown` rendering, empty link map) with a logged warning.
#[derive(Debug, Error)]
pub enum TranspileError {
    /// Cooperative cancellation was requested; no partial output exists.
    #[error("transpilation was cancelled")]
    Cancelled,

    /// A structural wrapper reached a stage that must never see one. This is
    /// a bug in the rewriting pipeline, not a data problem.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    /// The options document could not be parsed.
    #[error("invalid transpiler configuration: {0}")]
    Config(String),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
