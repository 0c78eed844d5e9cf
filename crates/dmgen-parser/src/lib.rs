// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Two-pass line-oriented parser for the dmgen data-model DSL.
//!
//! Pass 0 registers class names, custom member constructors and import
//! edges; pass 1 re-reads the buffered lines and resolves class bodies,
//! inheritance and template bindings. The product of a parse is a
//! [`dmgen_model::ModelFile`] ready for project-wide resolution and
//! emission.

pub mod parser;

pub use parser::{DataFile, ParseError};
