// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis for the dmgen data-model DSL.
//!
//! The DSL is line oriented: every construct lives on one trimmed line and
//! each construct parser tokenizes that line with its own delimiter set
//! (`data` headers split on `:{}<>,`, conditions on `{}[]`, and so on).
//! [`Tokenizer`] therefore works on a single line at a time rather than a
//! whole source buffer.
//!
//! # Rules
//!
//! - Whitespace separates tokens outside double quotes.
//! - Text between double quotes is copied verbatim (quotes dropped);
//!   delimiters, whitespace and `#` lose their meaning inside.
//! - `#` outside quotes truncates the rest of the line as a comment.
//! - Each delimiter character is emitted as a one-character token. When a
//!   delimiter immediately follows accumulated text, the text is emitted
//!   first and the delimiter is re-offered on the next call.
//! - [`Tokenizer::cancel`] pushes the last token back (depth 1): the next
//!   call returns it again.

/// Delimiter-aware tokenizer over a single source line.
pub struct Tokenizer<'a> {
    chars: Vec<char>,
    pos: usize,
    delims: &'a str,
    token: String,
    cancelled: bool,
    in_string: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over `line`, splitting on whitespace and on each
    /// character of `delims`.
    pub fn new(line: &str, delims: &'a str) -> Self {
        Self {
            chars: line.chars().collect(),
            pos: 0,
            delims,
            token: String::new(),
            cancelled: false,
            in_string: false,
        }
    }

    /// Produce the next token, or `None` once the line is exhausted.
    ///
    /// A pending [`cancel`](Self::cancel) re-returns the previous token.
    pub fn next_token(&mut self) -> Option<String> {
        if self.cancelled {
            self.cancelled = false;
            if self.token.is_empty() {
                return None;
            }
            return Some(self.token.clone());
        }

        self.token.clear();

        let mut n = self.pos;
        while n < self.chars.len() {
            let c = self.chars[n];

            if c == '"' {
                self.in_string = !self.in_string;
                n += 1;
                continue;
            }

            if self.in_string {
                self.token.push(c);
                n += 1;
                continue;
            }

            // comment truncates the rest of the line
            if c == '#' {
                self.pos = self.chars.len();
                return None;
            }

            if c.is_whitespace() {
                if self.token.is_empty() {
                    n += 1;
                    continue;
                }
                self.pos = n + 1;
                return Some(self.token.clone());
            }

            if self.delims.contains(c) {
                if self.token.is_empty() {
                    self.token.push(c);
                    self.pos = n + 1;
                } else {
                    // emit the accumulated text, re-offer the delimiter
                    self.pos = n;
                }
                return Some(self.token.clone());
            }

            self.token.push(c);
            n += 1;
        }

        self.pos = self.chars.len();
        if self.token.is_empty() {
            None
        } else {
            Some(self.token.clone())
        }
    }

    /// True until the end of the line is reached.
    pub fn has_more(&self) -> bool {
        self.pos < self.chars.len()
    }

    /// Push the last token back; the next [`next_token`](Self::next_token)
    /// call returns it again. Depth is 1: cancelling twice before reading
    /// has the same effect as cancelling once.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}

/// True when `name` matches `(alpha | '_') (alphanumeric | '_')*`.
pub fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// True when `s` is a non-empty run of ASCII digits.
pub fn is_uint(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// True when `s` is an optionally negated run of ASCII digits.
pub fn is_int(s: &str) -> bool {
    is_uint(s.strip_prefix('-').unwrap_or(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(line: &str, delims: &str) -> Vec<String> {
        let mut tk = Tokenizer::new(line, delims);
        let mut out = Vec::new();
        while let Some(tok) = tk.next_token() {
            out.push(tok);
        }
        out
    }

    #[test]
    fn whitespace_separates_tokens() {
        assert_eq!(lex("data Point  extra", ""), vec!["data", "Point", "extra"]);
    }

    #[test]
    fn delimiters_are_single_tokens() {
        assert_eq!(
            lex("data Circle : Shape<int32,uint32> {", ":{}<>,"),
            vec![
                "data", "Circle", ":", "Shape", "<", "int32", ",", "uint32", ">", "{"
            ]
        );
    }

    #[test]
    fn delimiter_glued_to_text_splits() {
        // `flags[READY]` with bracket delimiters: text first, then the
        // re-offered delimiter on the next call.
        assert_eq!(lex("bit flags[READY]", "[]"), vec!["bit", "flags", "[", "READY", "]"]);
    }

    #[test]
    fn comment_truncates_line() {
        assert_eq!(lex("int32 x # the x coordinate", ""), vec!["int32", "x"]);
        assert_eq!(lex("# whole line", ""), Vec::<String>::new());
    }

    #[test]
    fn quoted_text_is_verbatim() {
        assert_eq!(
            lex("name \"hello # {world}\" tail", "{}"),
            vec!["name", "hello # {world}", "tail"]
        );
    }

    #[test]
    fn cancel_replays_last_token() {
        let mut tk = Tokenizer::new("a b", "");
        assert_eq!(tk.next_token().unwrap(), "a");
        tk.cancel();
        assert_eq!(tk.next_token().unwrap(), "a");
        assert_eq!(tk.next_token().unwrap(), "b");
        assert_eq!(tk.next_token(), None);
    }

    #[test]
    fn retokenizing_is_deterministic() {
        let line = "loop items: count[MAX] { # trailing";
        assert_eq!(lex(line, "{}[]:"), lex(line, "{}[]:"));
    }

    #[test]
    fn name_predicate() {
        assert!(is_name("_foo1"));
        assert!(is_name("Point"));
        assert!(!is_name("1abc"));
        assert!(!is_name(""));
        assert!(!is_name("a-b"));
    }

    #[test]
    fn integer_predicates() {
        assert!(is_uint("42"));
        assert!(!is_uint("4a"));
        assert!(!is_uint(""));
        assert!(is_int("-3"));
        assert!(!is_int("-"));
    }
}
