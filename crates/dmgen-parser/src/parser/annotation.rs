//! `@<name> param=(v1,v2,...) ...` annotations.
//!
//! Only `@identifier` is recognized; it carries `headers`, `manager` and
//! `method` parameter groups. During a template specialization the
//! settings land in the specialization's identifier-metadata entry keyed
//! by the comma-joined argument values.

use dmgen_lexer::{is_name, Tokenizer};
use dmgen_model::DataId;

use super::{DataFile, ParseError};

impl DataFile<'_> {
    pub(crate) fn parse_annotation(
        &mut self,
        line: &str,
        data_id: DataId,
    ) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, "@=,()");

        match tk.next_token() {
            Some(t) if t == "@" => {}
            _ => return Err(ParseError::format("annotation", "annotation begins with @")),
        }
        let name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => {
                return Err(ParseError::format(
                    "annotation",
                    "annotation name must be a literal",
                ))
            }
        };

        // repeated `param=(v1,...)` groups
        let mut params: Vec<(String, Vec<String>)> = Vec::new();
        while let Some(token) = tk.next_token() {
            if !is_name(&token) {
                return Err(ParseError::format(
                    "annotation",
                    "annotation parameter must be a literal",
                ));
            }
            match tk.next_token() {
                Some(t) if t == "=" => {}
                _ => return Err(ParseError::format("annotation", "= expected")),
            }
            match tk.next_token() {
                Some(t) if t == "(" => {}
                _ => return Err(ParseError::format("annotation", "( expected")),
            }
            let mut values = Vec::new();
            loop {
                match tk.next_token() {
                    Some(t) if t == ")" => break,
                    Some(t) if t == "," => continue,
                    Some(t) => values.push(t),
                    None => return Err(ParseError::format("annotation", ") expected")),
                }
            }
            params.push((token, values));
        }
        if params.is_empty() {
            return Err(ParseError::format(
                "annotation",
                "annotation carries at least one parameter",
            ));
        }

        if name != "identifier" {
            return Err(ParseError::format(
                "annotation",
                format!("unsupported annotation `{name}`"),
            ));
        }

        let key = if self.template_spe {
            Some(self.template_values.join(","))
        } else {
            None
        };
        let target = self.current_target;
        let data = self.file.symbols.get_mut(data_id);
        let entry = data.identifier_meta[target].entry_mut(key.as_deref());

        for (param, values) in params {
            match param.as_str() {
                "headers" => entry.headers = values,
                "manager" => {
                    entry.manager = values.into_iter().next().ok_or_else(|| {
                        ParseError::format("annotation", "manager requires a value")
                    })?;
                }
                "method" => {
                    let mut values = values.into_iter();
                    entry.method = values.next().ok_or_else(|| {
                        ParseError::format("annotation", "method requires a value")
                    })?;
                    entry.params = values.collect();
                }
                other => {
                    return Err(ParseError::format(
                        "annotation",
                        format!("unsupported annotation parameter `{other}`"),
                    ))
                }
            }
        }
        Ok(())
    }
}
