//! Emission-side faults.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    /// A block or variable marker without its closing brace.
    #[error("malformed marker in {template} template: {message}")]
    TemplateFormat { template: String, message: String },

    /// A template file could not be read.
    #[error("cannot read template {name}")]
    TemplateRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
