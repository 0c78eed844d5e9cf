//! Model-level faults shared by the factory and the member catalog.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// A declared type name matches neither a builtin kind nor a
    /// registered custom member.
    #[error("unknown member type `{0}`")]
    UnknownType(String),

    /// A template argument index exceeds the parameter list of the
    /// member's declared type.
    #[error("template parameter index {index} out of range for `{type_name}`")]
    TemplateIndex { type_name: String, index: usize },
}
