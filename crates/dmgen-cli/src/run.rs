//! The generation run: traverse the input tree, parse every schema,
//! finalize the project, emit per profile.

use std::path::Path;

use dmgen_emit::{Emitter, FsSink, TemplateSet};
use dmgen_model::{CompilerContext, Config, ModelFile};
use dmgen_parser::DataFile;
use tracing::{error, info};
use walkdir::{DirEntry, WalkDir};

use crate::error::RunError;

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

pub fn run(config: Config) -> Result<(), RunError> {
    let templates = match &config.template_path {
        Some(dir) => TemplateSet::load(dir)?,
        None => TemplateSet::builtin(),
    };
    info!(version = config.version, "generate");

    let mut ctx = CompilerContext::new(config);
    let input = ctx.config.input_path.clone();
    let mut files: Vec<ModelFile> = Vec::new();

    // every schema file is fully parsed before emission starts:
    // cross-file references and id assignment need the whole universe
    for entry in WalkDir::new(&input)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry.map_err(|e| {
            let message = e.to_string();
            e.into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, message))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };

        let rel_dir = relative_dir(&input, path);
        if ext == ctx.config.class_ext {
            let model = DataFile::new(&mut ctx, &rel_dir, path).parse_class_file()?;
            files.push(model);
        } else if ext == ctx.config.typedef_ext {
            let model = DataFile::new(&mut ctx, &rel_dir, path).parse_typedef_file()?;
            files.push(model);
        }
    }

    dmgen_resolve::finalize_project(&mut ctx, &mut files)?;

    // an emission fault aborts the current file's output, not the run
    let mut sink = FsSink;
    let mut first_error = None;
    for file in &files {
        let emitter = Emitter::new(&ctx, &templates, file);
        if let Err(e) = emitter.write_all(&mut sink) {
            error!(file = %file.path.display(), error = %e, "emission failed");
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn relative_dir(input: &Path, file: &Path) -> String {
    file.parent()
        .and_then(|p| p.strip_prefix(input).ok())
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default()
}
