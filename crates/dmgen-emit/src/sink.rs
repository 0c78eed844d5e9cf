//! Output sinks.
//!
//! Emission produces ordered lines per output file and hands them to an
//! [`OutputSink`]; the sink owns directory creation and the
//! write-once check for hand-editable scaffolds.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EmitError;

pub trait OutputSink {
    fn exists(&self, path: &Path) -> bool;
    fn write(&mut self, path: &Path, lines: &[String]) -> Result<(), EmitError>;
}

/// Collects output in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub files: BTreeMap<PathBuf, Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.get(path.as_ref()).map(|lines| lines.join("\n"))
    }
}

impl OutputSink for MemorySink {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn write(&mut self, path: &Path, lines: &[String]) -> Result<(), EmitError> {
        self.files.insert(path.to_path_buf(), lines.to_vec());
        Ok(())
    }
}

/// Writes output files below their configured directories, creating
/// missing directories on the way.
#[derive(Debug, Default)]
pub struct FsSink;

impl OutputSink for FsSink {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write(&mut self, path: &Path, lines: &[String]) -> Result<(), EmitError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut text = lines.join("\n");
        text.push('\n');
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_round_trips() {
        let mut sink = MemorySink::new();
        let path = Path::new("out/a.h");
        assert!(!sink.exists(path));
        sink.write(path, &["x".into(), "y".into()]).unwrap();
        assert!(sink.exists(path));
        assert_eq!(sink.text("out/a.h").unwrap(), "x\ny");
    }
}
