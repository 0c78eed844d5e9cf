//! Per-file parse driver.
//!
//! [`DataFile`] carries the parse-time state of one root source file
//! (current target, open template arguments, visited imports) and builds
//! the [`ModelFile`] handed to resolution and emission.
//!
//! Two-pass discipline: pass 0 registers class names, factory prototypes
//! and import edges and must stay idempotent; pass 1 iterates the same
//! line buffer again and resolves bodies.

mod annotation;
mod decl;
mod error;
mod import;
mod lines;
mod members;
mod structure;

pub use error::ParseError;

use std::fs;
use std::path::PathBuf;

use dmgen_model::{
    CompilerContext, DataId, MemberId, ModelFile, Target,
};
use tracing::info;

use lines::LineCursor;
use scope::{classify, Construct, ScopeKind};

pub(crate) mod scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    Zero,
    One,
}

/// Parser for one root schema file and everything it imports.
pub struct DataFile<'ctx> {
    pub(crate) ctx: &'ctx mut CompilerContext,
    pub(crate) file: ModelFile,
    /// Files already read in the current pass; keeps repeated and cyclic
    /// imports from being parsed twice.
    pub(crate) visited: Vec<PathBuf>,
    pub(crate) current_target: Target,
    pub(crate) current_import_level: u32,
    /// Generic parameter names captured from a `template` line, consumed
    /// by the following class declaration.
    pub(crate) template_args: Vec<String>,
    /// True when the pending class declaration is a specialization
    /// (`template<>`).
    pub(crate) template_spe: bool,
    /// Concrete argument values of the specialization being parsed.
    pub(crate) template_values: Vec<String>,
}

impl<'ctx> DataFile<'ctx> {
    /// `dir` is the sub-directory of the input tree the file lives in
    /// ("" at the root); `path` the file itself.
    pub fn new(ctx: &'ctx mut CompilerContext, dir: &str, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = dir.trim_matches('/').to_string();
        let depth = dir.split('/').filter(|s| !s.is_empty()).count();
        let rel_path = "../".repeat(depth);

        Self {
            ctx,
            file: ModelFile::new(path, dir, name, rel_path),
            visited: Vec::new(),
            current_target: Target::Common,
            current_import_level: 0,
            template_args: Vec::new(),
            template_spe: false,
            template_values: Vec::new(),
        }
    }

    /// Name the generated artifacts will carry (file stem).
    pub fn name(&self) -> &str {
        &self.file.name
    }

    /// Parse a class schema file: pass 0, rewind, pass 1, then per-class
    /// minimum sizes.
    pub fn parse_class_file(self) -> Result<ModelFile, ParseError> {
        info!(file = %self.file.path.display(), "parse data file");
        let path = self.file.path.clone();
        let text = fs::read_to_string(&path).map_err(|e| ParseError::from(e).in_file(&path))?;
        self.parse_class_source(&text)
    }

    /// Parse class schema source provided directly (the file itself is
    /// not read; imports still resolve against the configured input
    /// path).
    pub fn parse_class_source(mut self, text: &str) -> Result<ModelFile, ParseError> {
        let path = self.file.path.clone();
        let result = (|| -> Result<(), ParseError> {
            let mut cursor = LineCursor::new(text);
            self.parse_class_lines(&mut cursor, 0, Pass::Zero)?;
            // forget visited files before the second pass re-imports them
            self.visited.clear();
            let mut cursor = LineCursor::new(text);
            self.parse_class_lines(&mut cursor, 0, Pass::One)?;
            Ok(())
        })();
        result.map_err(|e| e.in_file(&path))?;
        self.compute_min_sizes();
        Ok(self.file)
    }

    /// Parse a typedef schema file (single pass, `typedef` blocks only).
    pub fn parse_typedef_file(self) -> Result<ModelFile, ParseError> {
        info!(file = %self.file.path.display(), "parse typedef file");
        let path = self.file.path.clone();
        let text = fs::read_to_string(&path).map_err(|e| ParseError::from(e).in_file(&path))?;
        self.parse_typedef_source(&text)
    }

    /// Parse typedef schema source provided directly.
    pub fn parse_typedef_source(mut self, text: &str) -> Result<ModelFile, ParseError> {
        let path = self.file.path.clone();
        let mut cursor = LineCursor::new(text);
        self.parse_typedef_lines(&mut cursor)
            .map_err(|e| e.in_file(&path))?;
        Ok(self.file)
    }

    /// Top-level line dispatch for one class file or import.
    pub(crate) fn parse_class_lines(
        &mut self,
        cursor: &mut LineCursor,
        import_level: u32,
        pass: Pass,
    ) -> Result<(), ParseError> {
        while let Some(line) = cursor.next_line() {
            self.current_import_level = import_level;
            self.current_target = Target::Common;

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with("import") {
                self.import_data(&line, import_level + 1, pass)?;
            } else if line.starts_with("using") {
                self.import_typedef(&line, pass)?;
            } else if line.starts_with("typedef") {
                self.parse_typedef(cursor, &line, pass)?;
            } else if line.starts_with("data") || line.starts_with("abstract") {
                self.parse_data(cursor, &line, pass)?;
                // consumed by the class declaration
                self.template_args.clear();
                self.template_spe = false;
            } else if line.starts_with("template") {
                self.parse_template(&line)?;
            }
            // anything else at the top level is a body line of a class
            // whose body this pass does not read; skip it
        }
        Ok(())
    }

    /// Line dispatch for typedef files, where only `typedef` is legal.
    pub(crate) fn parse_typedef_lines(&mut self, cursor: &mut LineCursor) -> Result<(), ParseError> {
        while let Some(line) = cursor.next_line() {
            self.current_target = Target::Common;

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with("typedef") {
                self.parse_typedef(cursor, &line, Pass::Zero)?;
            } else {
                return Err(ParseError::format(
                    "typedef file",
                    "only typedef is supported in a typedef file",
                ));
            }
        }
        Ok(())
    }

    /// Shared body walker for class bodies, target blocks and loop/if
    /// bodies. Consumes lines until the closing brace; `begin` tells
    /// whether the opening brace was already seen on the header line.
    pub(crate) fn parse_scope(
        &mut self,
        cursor: &mut LineCursor,
        mut begin: bool,
        data_id: DataId,
        parent: Option<MemberId>,
        scope: ScopeKind,
    ) -> Result<(), ParseError> {
        while let Some(line) = cursor.next_line() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('{') {
                if begin {
                    return Err(ParseError::format(
                        "block",
                        "opening bracket { must not follow another {",
                    ));
                }
                if line.len() > 1 {
                    return Err(ParseError::format(
                        "block",
                        "opening bracket { must end its line",
                    ));
                }
                begin = true;
                continue;
            }

            if !begin {
                return Err(ParseError::format("block", "missing prior opening bracket {"));
            }

            if line.starts_with('}') {
                if line.len() > 1 {
                    return Err(ParseError::format(
                        "block",
                        "ending bracket } line must only contain the ending bracket",
                    ));
                }
                if scope == ScopeKind::TargetBlock {
                    self.current_target = Target::Common;
                }
                return Ok(());
            }

            let mut line = line;
            let mut is_public = false;
            if let Some(rest) = line.strip_prefix("public ") {
                is_public = true;
                line = rest.trim_start().to_string();
            }

            let construct = classify(&line);
            if !scope.allows(construct) {
                return Err(ParseError::format("block", scope.rejection(construct)));
            }

            match construct {
                Construct::Annotation => self.parse_annotation(&line, data_id)?,
                Construct::Target => self.parse_target(cursor, &line, data_id)?,
                Construct::Identifier => self.parse_identifier(&line, data_id)?,
                Construct::Loop => self.parse_loop(cursor, &line, data_id, parent)?,
                Construct::If => self.parse_if(cursor, &line, data_id, parent)?,
                Construct::Const => self.parse_const(&line, data_id, parent, is_public)?,
                Construct::Bit => self.parse_bit(&line, data_id, parent)?,
                Construct::Array => self.parse_array(&line, data_id, parent)?,
                Construct::Member => self.parse_member(&line, data_id, parent)?,
            }
        }
        Err(ParseError::format(
            "block",
            format!("unexpected end of file inside {}", scope.name()),
        ))
    }

    fn compute_min_sizes(&mut self) {
        let ModelFile { symbols, arena, .. } = &mut self.file;
        for data in symbols.iter_mut() {
            let mut total = 0;
            for target in Target::ALL {
                for &id in &data.members[target] {
                    let member = arena.get(id);
                    total += member.kind.min_size(&member.value);
                }
            }
            data.min_size = total;
        }
    }
}
