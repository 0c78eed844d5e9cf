//! Buffered line cursor.
//!
//! Each source file is read once; both passes iterate a fresh cursor over
//! the same buffer, which stands in for rewinding a seekable stream.

pub(crate) struct LineCursor {
    lines: Vec<String>,
    pos: usize,
}

impl LineCursor {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text
                .lines()
                .map(|l| l.replace('\t', " ").trim().to_string())
                .collect(),
            pos: 0,
        }
    }

    pub fn next_line(&mut self) -> Option<String> {
        let line = self.lines.get(self.pos).cloned();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_trimmed_and_detabbed() {
        let mut cursor = LineCursor::new("  a\t b  \n\n\t}\n");
        assert_eq!(cursor.next_line().unwrap(), "a  b");
        assert_eq!(cursor.next_line().unwrap(), "");
        assert_eq!(cursor.next_line().unwrap(), "}");
        assert_eq!(cursor.next_line(), None);
    }
}
