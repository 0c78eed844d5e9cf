//! Profile writers.
//!
//! One reader class/impl pair (plus a write-once user scaffold) per
//! reading profile, one writer class/impl pair for the editor profile.
//! Output files are skipped entirely when the source file holds no
//! concrete root-level class.

use std::path::PathBuf;

use dmgen_model::{emit, CompilerContext, Data, FileKind, ModelFile, Profile, Target};
use tracing::debug;

use crate::error::EmitError;
use crate::sink::OutputSink;
use crate::template::{TemplateKind, TemplateSet};

/// What the `@{content}` block of a file template expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    ReaderClass,
    ReaderImpl,
    ReaderUserImpl,
    WriterClass,
    WriterImpl,
}

impl ContentKind {
    fn class_template(self) -> TemplateKind {
        match self {
            ContentKind::ReaderClass => TemplateKind::ReaderClass,
            ContentKind::ReaderImpl => TemplateKind::ReaderImpl,
            ContentKind::ReaderUserImpl => TemplateKind::ReaderUserImpl,
            ContentKind::WriterClass => TemplateKind::WriterClass,
            ContentKind::WriterImpl => TemplateKind::WriterImpl,
        }
    }

    /// Header-type content declares classes and predeclarations.
    fn is_header(self) -> bool {
        matches!(self, ContentKind::ReaderClass | ContentKind::WriterClass)
    }
}

/// Emits every output file of one resolved source file.
pub struct Emitter<'a> {
    ctx: &'a CompilerContext,
    templates: &'a TemplateSet,
    file: &'a ModelFile,
}

impl<'a> Emitter<'a> {
    pub fn new(ctx: &'a CompilerContext, templates: &'a TemplateSet, file: &'a ModelFile) -> Self {
        Self {
            ctx,
            templates,
            file,
        }
    }

    /// Write all artifacts for every built profile.
    pub fn write_all(&self, sink: &mut dyn OutputSink) -> Result<(), EmitError> {
        if !self.file.has_concrete_root() {
            debug!(file = %self.file.name, "no concrete root class, skipping output");
            return Ok(());
        }
        for profile in Profile::ALL {
            if !self.ctx.config.build[profile] {
                continue;
            }
            self.write_profile(profile, sink)?;
        }
        Ok(())
    }

    /// Write one profile's artifacts: readers for displaying/authority
    /// profiles, writers for the editor profile.
    pub fn write_profile(
        &self,
        profile: Profile,
        sink: &mut dyn OutputSink,
    ) -> Result<(), EmitError> {
        match profile {
            Profile::Displayer | Profile::Authority => {
                self.write_file(profile, TemplateKind::Header, ContentKind::ReaderClass, sink)?;
                self.write_file(profile, TemplateKind::Impl, ContentKind::ReaderImpl, sink)?;
                self.write_file(
                    profile,
                    TemplateKind::Impl,
                    ContentKind::ReaderUserImpl,
                    sink,
                )?;
            }
            Profile::Editor => {
                self.write_file(profile, TemplateKind::Header, ContentKind::WriterClass, sink)?;
                self.write_file(profile, TemplateKind::Impl, ContentKind::WriterImpl, sink)?;
            }
        }
        Ok(())
    }

    fn output_path(&self, profile: Profile, content: ContentKind) -> PathBuf {
        let config = &self.ctx.config;
        let (base, ext) = if content.is_header() {
            (&config.out_headers[profile], &config.hpp_ext)
        } else {
            (&config.out_sources[profile], &config.cpp_ext)
        };
        let user = if content == ContentKind::ReaderUserImpl {
            ".user"
        } else {
            ""
        };
        let file_name = format!("{}{}{user}.{ext}", self.file.name, config.suffix);
        let mut path = base.clone();
        if !self.file.dir.is_empty() {
            path = path.join(&self.file.dir);
        }
        path.join(file_name)
    }

    fn write_file(
        &self,
        profile: Profile,
        template: TemplateKind,
        content: ContentKind,
        sink: &mut dyn OutputSink,
    ) -> Result<(), EmitError> {
        let path = self.output_path(profile, content);

        // the user scaffold is written once and never overwritten
        if content == ContentKind::ReaderUserImpl && sink.exists(&path) {
            debug!(path = %path.display(), "user implementation exists, keeping it");
            return Ok(());
        }

        let mut lines = Vec::new();
        self.expand_file_template(template, content, profile, &mut lines)?;
        debug!(path = %path.display(), "write output file");
        sink.write(&path, &lines)
    }

    fn expand_file_template(
        &self,
        template: TemplateKind,
        content: ContentKind,
        profile: Profile,
        out: &mut Vec<String>,
    ) -> Result<(), EmitError> {
        for line in self.templates.get(template) {
            if line.is_empty() {
                out.push(String::new());
                continue;
            }
            match self.block_name(template, line)? {
                Some("license") => {
                    out.extend(self.templates.get(TemplateKind::License).iter().cloned());
                }
                Some("includes") => self.write_includes(content, profile, out),
                Some("content") => {
                    if content.is_header() && !self.file.pre_classes.is_empty() {
                        for class in &self.file.pre_classes {
                            out.push(format!("class {class};"));
                        }
                        out.push(String::new());
                    }
                    for data in self.file.symbols.iter() {
                        if data.abstract_ || data.import_level != 0 {
                            continue;
                        }
                        self.expand_class_template(content, data, profile, out)?;
                    }
                }
                Some(_) => {
                    // unrecognized block markers expand to nothing
                }
                None => out.push(self.substitute_vars(template, line, None, profile)?),
            }
        }
        Ok(())
    }

    fn expand_class_template(
        &self,
        content: ContentKind,
        data: &Data,
        profile: Profile,
        out: &mut Vec<String>,
    ) -> Result<(), EmitError> {
        let template = content.class_template();
        let target = profile.target();
        let arena = &self.file.arena;
        let suffix = &self.ctx.config.suffix;

        for line in self.templates.get(template) {
            if line.is_empty() {
                out.push(String::new());
                continue;
            }
            match self.block_name(template, line)? {
                Some("initializers") => {
                    for &m in &data.initializers {
                        let member = arena.get(m);
                        // only resolved values reach the constructor
                        if !member.value.is_empty() && !member.value.starts_with('<') {
                            out.push(format!("        {} = {};", member.name, member.value));
                        }
                    }
                }
                Some("private_members") => {
                    for t in [Target::Common, target] {
                        for &m in &data.members[t] {
                            if !arena.get(m).is_public() {
                                emit::write_decl(arena, m, out);
                            }
                        }
                    }
                }
                Some("public_members") => {
                    for t in [Target::Common, target] {
                        for &m in &data.members[t] {
                            if arena.get(m).is_public() {
                                emit::write_decl(arena, m, out);
                            }
                        }
                    }
                }
                Some("getters") => {
                    for t in [Target::Common, target] {
                        for &m in &data.members[t] {
                            emit::write_getter_decl(arena, m, out);
                        }
                    }
                }
                Some("setters") => {
                    for t in [Target::Common, target] {
                        for &m in &data.members[t] {
                            emit::write_setter_decl(arena, m, out);
                        }
                    }
                }
                Some("readFromFile") => {
                    if let Some(parent) = self.structural_parent(data) {
                        out.push(format!("    {parent}{suffix}::readFromFile(is);"));
                        out.push(String::new());
                    }
                    for t in [Target::Common, target] {
                        for &m in &data.members[t] {
                            emit::write_read(arena, m, out);
                        }
                    }
                }
                Some("writeToFile") => {
                    if let Some(parent) = self.structural_parent(data) {
                        out.push(format!("    {parent}{suffix}::writeToFile(os);"));
                        out.push(String::new());
                    }
                    for t in [Target::Common, target] {
                        for &m in &data.members[t] {
                            emit::write_write(arena, m, out);
                        }
                    }
                }
                Some("finalize") => {
                    for &m in &data.finalizers {
                        emit::write_finalize(
                            arena,
                            &self.file.symbols,
                            data,
                            target,
                            suffix,
                            m,
                            out,
                        );
                    }
                }
                Some(_) => {
                    // unrecognized block markers expand to nothing
                }
                None => out.push(self.substitute_vars(template, line, Some(data), profile)?),
            }
        }
        out.push(String::new());
        Ok(())
    }

    /// Parent class name when inheritance is structural (emitted in the
    /// generated code); `None` when members were shared instead, since a
    /// shared parent may be abstract and thus never emitted.
    fn structural_parent(&self, data: &Data) -> Option<String> {
        let pid = data.direct_inherit?;
        let parent = self.file.symbols.get(pid);
        if parent.abstract_ || self.ctx.config.composite {
            None
        } else {
            Some(parent.name.clone())
        }
    }

    fn write_includes(&self, content: ContentKind, profile: Profile, out: &mut Vec<String>) {
        let target = profile.target();
        if content.is_header() {
            for t in [Target::Common, target] {
                for header in self.file.includes[t].list(FileKind::Header) {
                    out.push(format!("#include {header}"));
                }
            }
            return;
        }

        let include_path = &self.ctx.config.include_paths[profile];
        for t in [Target::Common, target] {
            for header in self.file.includes[t].list(FileKind::Impl) {
                if include_path.is_empty() {
                    out.push(format!("#include {header}"));
                } else if let Some(local) = header.strip_prefix('"') {
                    // locals are re-rooted below the include prefix; the
                    // target-specific ones drop their relative climbs
                    let local = if t == Target::Common {
                        local.to_string()
                    } else {
                        local.replace("../", "")
                    };
                    out.push(format!("#include \"{include_path}/{local}"));
                } else {
                    out.push(format!("#include {include_path}/{header}"));
                }
            }
        }
    }

    /// Locate a `@{name}` block marker; a marker without its closing
    /// brace is a fatal template fault.
    fn block_name<'l>(
        &self,
        template: TemplateKind,
        line: &'l str,
    ) -> Result<Option<&'l str>, EmitError> {
        let Some(start) = line.find("@{") else {
            return Ok(None);
        };
        let rest = &line[start + 2..];
        let end = rest.find('}').ok_or_else(|| EmitError::TemplateFormat {
            template: template.file_name().to_string(),
            message: "missing ending bracket } after @{".to_string(),
        })?;
        Ok(Some(&rest[..end]))
    }

    /// Substitute every `${name}` variable, left to right.
    fn substitute_vars(
        &self,
        template: TemplateKind,
        line: &str,
        data: Option<&Data>,
        profile: Profile,
    ) -> Result<String, EmitError> {
        let config = &self.ctx.config;
        let mut out = line.to_string();

        while let Some(p1) = out.find("${") {
            let Some(len) = out[p1 + 2..].find('}') else {
                return Err(EmitError::TemplateFormat {
                    template: template.file_name().to_string(),
                    message: "missing ending bracket } after ${".to_string(),
                });
            };
            let p2 = p1 + 2 + len;
            let var = out[p1 + 2..p2].to_string();

            let header = format!("{}{}", self.file.name, config.suffix);
            let replacement = match var.as_str() {
                "data" => data.map(|d| d.name.clone()).unwrap_or_default(),
                "dataId" => data
                    .and_then(|d| d.id)
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                "author" => config.author.clone(),
                "yyyy" => config.year.clone(),
                "mm" => config.month.clone(),
                "dd" => config.day.clone(),
                "ns" => config.namespaces[profile].clone(),
                "NS" => config.namespaces[profile].to_uppercase(),
                "header" => {
                    let include_path = &config.include_paths[profile];
                    if include_path.is_empty() {
                        header
                    } else if self.file.dir.is_empty() {
                        format!("{include_path}/{header}")
                    } else {
                        format!("{include_path}/{}/{header}", self.file.dir)
                    }
                }
                "hpp" => config.hpp_ext.clone(),
                "HPP" => config.hpp_ext.to_uppercase(),
                "FILENAME" => header.to_uppercase(),
                "baseclasses" => match data.and_then(|d| self.structural_parent(d)) {
                    Some(parent) => format!(" : public {parent}{}", config.suffix),
                    None => String::new(),
                },
                _ => String::new(),
            };
            out.replace_range(p1..=p2, &replacement);
        }
        Ok(out)
    }
}
