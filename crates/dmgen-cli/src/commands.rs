//! Maintenance commands: rename or remove a schema together with its
//! previously generated artifacts.
//!
//! Generated files are rewritten by literal name substitution (plain and
//! upper-cased), the schema source only on its `data` lines.

use std::fs;
use std::path::{Path, PathBuf};

use dmgen_model::{Config, Profile};
use tracing::info;

use crate::error::RunError;

fn generated_paths(config: &Config, name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for profile in Profile::ALL {
        paths.push(
            config.out_headers[profile].join(format!("{name}{}.{}", config.suffix, config.hpp_ext)),
        );
        paths.push(
            config.out_sources[profile].join(format!("{name}{}.{}", config.suffix, config.cpp_ext)),
        );
        paths.push(
            config.out_sources[profile]
                .join(format!("{name}{}.user.{}", config.suffix, config.cpp_ext)),
        );
    }
    paths
}

/// `mv <from> <to>`: rename the schema source and every generated file.
pub fn rename(config: &Config, from: &str, to: &str) -> Result<(), RunError> {
    let source = config
        .input_path
        .join(format!("{from}.{}", config.class_ext));
    if source.exists() {
        let target = config.input_path.join(format!("{to}.{}", config.class_ext));
        rename_schema(&source, &target, from, to)?;
        fs::remove_file(&source)?;
        info!(from = %source.display(), to = %target.display(), "renamed schema");
    }

    let olds = generated_paths(config, from);
    let news = generated_paths(config, to);
    for (old, new) in olds.iter().zip(&news) {
        if old.exists() {
            rename_generated(old, new, from, to)?;
            fs::remove_file(old)?;
            info!(from = %old.display(), to = %new.display(), "renamed generated file");
        }
    }
    Ok(())
}

/// `rm <name>`: remove the schema source and every generated file.
pub fn remove(config: &Config, name: &str) -> Result<(), RunError> {
    let source = config
        .input_path
        .join(format!("{name}.{}", config.class_ext));
    if source.exists() {
        fs::remove_file(&source)?;
        info!(file = %source.display(), "removed schema");
    }
    for path in generated_paths(config, name) {
        if path.exists() {
            fs::remove_file(&path)?;
            info!(file = %path.display(), "removed generated file");
        }
    }
    Ok(())
}

/// Rewrite the schema source, substituting the class name on `data`
/// declaration lines only.
fn rename_schema(from: &Path, to: &Path, old: &str, new: &str) -> Result<(), RunError> {
    let text = fs::read_to_string(from)?;
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if line.trim_start().starts_with("data") {
            out.push_str(&line.replace(old, new));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    fs::write(to, out)?;
    Ok(())
}

/// Rewrite a generated file, substituting both the plain and the
/// upper-cased name (include guards, file doc headers).
fn rename_generated(from: &Path, to: &Path, old: &str, new: &str) -> Result<(), RunError> {
    let text = fs::read_to_string(from)?;
    let rewritten = text
        .replace(old, new)
        .replace(&old.to_uppercase(), &new.to_uppercase());
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(to, rewritten)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_rename_touches_only_data_lines() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("Point.dmg");
        let to = dir.path().join("Vertex.dmg");
        fs::write(&from, "# Point schema\ndata Point\n{\n    int32 Pointless\n}\n").unwrap();

        rename_schema(&from, &to, "Point", "Vertex").unwrap();
        let text = fs::read_to_string(&to).unwrap();
        assert!(text.contains("data Vertex"));
        // comments and member lines keep the old spelling
        assert!(text.contains("# Point schema"));
        assert!(text.contains("Pointless"));
    }

    #[test]
    fn generated_rename_also_rewrites_guards() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("PointData.h");
        let to = dir.path().join("VertexData.h");
        fs::write(&from, "#ifndef _NS_POINTDATA_H\nclass PointData {};\n").unwrap();

        rename_generated(&from, &to, "Point", "Vertex").unwrap();
        let text = fs::read_to_string(&to).unwrap();
        assert!(text.contains("_NS_VERTEXDATA_H"));
        assert!(text.contains("class VertexData"));
    }
}
