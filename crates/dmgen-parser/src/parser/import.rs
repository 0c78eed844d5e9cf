//! Cross-file imports.
//!
//! `import <dotted.path>` pulls a class file into the current parse;
//! `using <dotted.path>` pulls a typedef file. Imports of an already
//! visited file are no-ops, which also makes cycles terminate: each file
//! is recorded before its body is read.

use std::fs;
use std::path::Path;

use dmgen_lexer::Tokenizer;
use tracing::info;

use super::lines::LineCursor;
use super::{DataFile, Pass, ParseError};

/// `../` run plus descent from the root file's directory to the imported
/// file's directory.
fn relative_dir(current: &Path, imported: &Path) -> String {
    let a: Vec<_> = imported.components().collect();
    let b: Vec<_> = current.components().collect();
    let mut shared = 0;
    while shared < a.len() && shared < b.len() && a[shared] == b[shared] {
        shared += 1;
    }
    let mut out = "../".repeat(b.len() - shared);
    for comp in &a[shared..] {
        out.push_str(&comp.as_os_str().to_string_lossy());
        out.push('/');
    }
    out
}

impl DataFile<'_> {
    /// `import <dotted.path>`: parse the referenced class file at the
    /// given import level, once per pass.
    pub(crate) fn import_data(
        &mut self,
        line: &str,
        import_level: u32,
        pass: Pass,
    ) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, "");
        tk.next_token()
            .ok_or_else(|| ParseError::format("import", "missing import declaration"))?;
        let name = tk
            .next_token()
            .ok_or_else(|| ParseError::format("import", "missing import target name"))?;

        let rel = name.replace('.', "/");
        let filename = self
            .ctx
            .config
            .input_path
            .join(format!("{rel}.{}", self.ctx.config.class_ext));

        // a file cannot import itself
        if filename == self.file.path {
            return Ok(());
        }
        // repeated and cyclic imports are no-ops after the first
        if self.visited.contains(&filename) {
            return Ok(());
        }

        info!(file = %filename.display(), "import data file");

        // header path of the imported file, relative to the root file
        let current_dir = self.file.path.parent().unwrap_or_else(|| Path::new(""));
        let import_dir = filename.parent().unwrap_or_else(|| Path::new(""));
        let stem = filename
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let import_ref = format!("{}{stem}", relative_dir(current_dir, import_dir));

        if pass == Pass::Zero && !self.file.imports.contains(&import_ref) {
            self.file.imports.push(import_ref);
        }
        self.visited.push(filename.clone());

        let text =
            fs::read_to_string(&filename).map_err(|e| ParseError::from(e).in_file(&filename))?;
        let mut cursor = LineCursor::new(&text);
        self.parse_class_lines(&mut cursor, import_level, pass)
            .map_err(|e| e.in_file(&filename))
    }

    /// `using <dotted.path> [<localName>]`: parse the referenced typedef
    /// file during pass 0.
    pub(crate) fn import_typedef(&mut self, line: &str, pass: Pass) -> Result<(), ParseError> {
        if pass == Pass::One {
            return Ok(());
        }

        let mut tk = Tokenizer::new(line, "");
        tk.next_token()
            .ok_or_else(|| ParseError::format("using", "missing using declaration"))?;
        let name = tk
            .next_token()
            .ok_or_else(|| ParseError::format("using", "missing import target name"))?;
        // an optional local alias is accepted and carries nothing today

        let rel = name.replace('.', "/");
        let filename = self
            .ctx
            .config
            .input_path
            .join(format!("{rel}.{}", self.ctx.config.typedef_ext));

        if self.visited.contains(&filename) {
            return Ok(());
        }
        self.visited.push(filename.clone());

        info!(file = %filename.display(), "import typedef file");

        let text =
            fs::read_to_string(&filename).map_err(|e| ParseError::from(e).in_file(&filename))?;
        let mut cursor = LineCursor::new(&text);
        self.parse_typedef_lines(&mut cursor)
            .map_err(|e| e.in_file(&filename))
    }
}

#[cfg(test)]
mod tests {
    use super::relative_dir;
    use std::path::Path;

    #[test]
    fn same_directory_needs_no_prefix() {
        assert_eq!(relative_dir(Path::new("in/a"), Path::new("in/a")), "");
    }

    #[test]
    fn ancestor_directory_climbs() {
        assert_eq!(relative_dir(Path::new("in/a/b"), Path::new("in")), "../../");
    }

    #[test]
    fn divergent_branch_climbs_then_descends() {
        assert_eq!(
            relative_dir(Path::new("in/a/b"), Path::new("in/c")),
            "../../c/"
        );
    }
}
