//! Run configuration, provided by the external configuration loader.

use std::path::PathBuf;

use crate::target::PerProfile;

/// Everything the compiler consumes from the configuration collaborator:
/// paths, namespaces, extensions, stamps and mode flags.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the input tree holding the schema sources.
    pub input_path: PathBuf,
    /// Directory of template files; `None` selects the built-in set.
    pub template_path: Option<PathBuf>,
    /// Per-profile output directory for generated headers.
    pub out_headers: PerProfile<PathBuf>,
    /// Per-profile output directory for generated implementations.
    pub out_sources: PerProfile<PathBuf>,
    /// Per-profile include prefix; when non-empty, local includes in
    /// implementation files are rewritten below it.
    pub include_paths: PerProfile<String>,
    /// Per-profile namespace of the generated code.
    pub namespaces: PerProfile<String>,
    /// Per-profile export enable flags.
    pub build: PerProfile<bool>,
    /// Composite mode: every inheritance shares members instead of
    /// emitting structural inheritance.
    pub composite: bool,
    pub author: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub version: u32,
    /// Extension of class schema files.
    pub class_ext: String,
    /// Extension of typedef schema files.
    pub typedef_ext: String,
    /// Extension of generated headers.
    pub hpp_ext: String,
    /// Extension of generated implementations.
    pub cpp_ext: String,
    /// Suffix appended to class names and file stems in generated code.
    pub suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            template_path: None,
            out_headers: PerProfile::default(),
            out_sources: PerProfile::default(),
            include_paths: PerProfile::default(),
            namespaces: PerProfile::default(),
            build: PerProfile::default(),
            composite: false,
            author: String::new(),
            year: String::new(),
            month: String::new(),
            day: String::new(),
            version: 1,
            class_ext: "dmg".into(),
            typedef_ext: "tdg".into(),
            hpp_ext: "h".into(),
            cpp_ext: "cpp".into(),
            suffix: "Data".into(),
        }
    }
}
