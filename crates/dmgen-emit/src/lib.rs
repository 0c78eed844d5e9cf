// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Template-driven text emission.
//!
//! Walks a resolved [`dmgen_model::ModelFile`] against a
//! [`TemplateSet`], once per built profile, producing reader or writer
//! class sources through an [`OutputSink`]. Substitution has two forms:
//! `@{name}` block markers replaced by generated multi-line fragments,
//! and `${name}` variables substituted in-line.

pub mod error;
pub mod sink;
pub mod template;
pub mod writer;

pub use error::EmitError;
pub use sink::{FsSink, MemorySink, OutputSink};
pub use template::{TemplateKind, TemplateSet};
pub use writer::Emitter;
