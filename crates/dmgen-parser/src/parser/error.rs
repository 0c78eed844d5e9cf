//! Parse error types.

use std::path::{Path, PathBuf};

use dmgen_model::{ModelError, StateError};
use thiserror::Error;

/// A fault raised while parsing schema source.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Malformed construct: wrong keyword, missing delimiter, bad token.
    #[error("malformed {construct}: {message}")]
    Format {
        construct: &'static str,
        message: String,
    },

    /// A name did not resolve in the current scope or its ancestors.
    #[error("unknown {what} `{name}`")]
    UnknownSymbol { what: &'static str, name: String },

    /// A member name is already taken in the same scope.
    #[error("duplicate declaration of member `{0}`")]
    DuplicateDeclaration(String),

    /// A class already has an identifier member.
    #[error("duplicate identifier member `{0}`")]
    DuplicateIdentifier(String),

    /// Generic-argument count does not match the parent's parameters.
    #[error("inheriting `{parent}`: expected {expected} template arguments, found {found}")]
    TemplateArity {
        parent: String,
        expected: usize,
        found: usize,
    },

    /// A class reached a pass it was not prepared for; this indicates a
    /// pass-0 registration bug and aborts the whole-file parse.
    #[error("pass state fault: {0}")]
    PassState(String),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Per-file wrapper added at the file boundary.
    #[error("failed to parse {}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    pub(crate) fn format(construct: &'static str, message: impl Into<String>) -> Self {
        ParseError::Format {
            construct,
            message: message.into(),
        }
    }

    /// Wrap with file context, unless already wrapped for this file.
    pub fn in_file(self, path: &Path) -> Self {
        match self {
            ParseError::InFile { path: p, source } if p == path => {
                ParseError::InFile { path: p, source }
            }
            other => ParseError::InFile {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }
}
