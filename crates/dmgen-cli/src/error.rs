//! Run-level faults.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] dmgen_parser::ParseError),

    #[error(transparent)]
    Resolve(#[from] dmgen_resolve::ResolveError),

    #[error(transparent)]
    Emit(#[from] dmgen_emit::EmitError),
}
