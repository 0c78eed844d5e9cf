//! Class, template and typedef declarations.

use dmgen_lexer::{is_name, Tokenizer};
use dmgen_model::{
    CustomMember, Data, DataId, FileKind, MemberKind, PassState, Target, TemplateParam,
};
use tracing::info;

use super::lines::LineCursor;
use super::scope::ScopeKind;
use super::{DataFile, Pass, ParseError};

/// Parsed shape of a `data` / `abstract` header line.
enum HeaderState {
    AfterName,
    ParentName,
    AfterParent,
    TemplateArgs,
    AfterTemplate,
    Begun,
}

impl DataFile<'_> {
    /// `data <Name> [: <Parent>[<Args>]] [{]` or a template
    /// specialization `data <Name><values> [{]`.
    pub(crate) fn parse_data(
        &mut self,
        cursor: &mut LineCursor,
        line: &str,
        pass: Pass,
    ) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, ":{}<>,");

        let kw = tk
            .next_token()
            .ok_or_else(|| ParseError::format("data", "missing data or abstract keyword"))?;
        if kw != "data" && kw != "abstract" {
            return Err(ParseError::format("data", "expected data or abstract keyword"));
        }
        let name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => return Err(ParseError::format("data", "data name must be a literal")),
        };

        let mut inherit_from = String::new();
        let mut template_values: Vec<String> = Vec::new();
        let mut state = HeaderState::AfterName;

        while let Some(token) = tk.next_token() {
            state = match state {
                HeaderState::AfterName => match token.as_str() {
                    ":" => HeaderState::ParentName,
                    "<" => {
                        if !self.template_spe {
                            return Err(ParseError::format(
                                "data",
                                "template argument list requires a specialization",
                            ));
                        }
                        HeaderState::TemplateArgs
                    }
                    "{" => HeaderState::Begun,
                    _ => return Err(ParseError::format("data", "expected :, < or {")),
                },
                HeaderState::ParentName => {
                    if !is_name(&token) {
                        return Err(ParseError::format(
                            "data",
                            "inherited data name must be a literal",
                        ));
                    }
                    inherit_from = token;
                    HeaderState::AfterParent
                }
                HeaderState::AfterParent => match token.as_str() {
                    "{" => HeaderState::Begun,
                    "<" => HeaderState::TemplateArgs,
                    _ => return Err(ParseError::format("data", "expected < or {")),
                },
                HeaderState::TemplateArgs => match token.as_str() {
                    "," => HeaderState::TemplateArgs,
                    ">" => HeaderState::AfterTemplate,
                    _ => {
                        template_values.push(token);
                        HeaderState::TemplateArgs
                    }
                },
                HeaderState::AfterTemplate => match token.as_str() {
                    "{" => HeaderState::Begun,
                    _ => return Err(ParseError::format("data", "expected {")),
                },
                HeaderState::Begun => {
                    return Err(ParseError::format(
                        "data",
                        "opening bracket { is only permitted as the last token of a line",
                    ))
                }
            };
        }
        let begin = matches!(state, HeaderState::Begun);

        let data_id = match pass {
            Pass::Zero => self.register_data(&name, kw == "abstract"),
            Pass::One => self.file.symbols.lookup(&name).ok_or_else(|| {
                ParseError::PassState(format!("data `{name}` not found at second pass"))
            })?,
        };

        let state = self.file.symbols.get(data_id).state;
        match (pass, state, self.template_spe) {
            (Pass::Zero, PassState::Unregistered, false) => {
                {
                    let data = self.file.symbols.get_mut(data_id);
                    data.state = data.state.advance(PassState::RegisteredPass0, &name)?;
                    data.import_level = self.current_import_level;
                }
                self.bind_inheritance(data_id, &inherit_from, &template_values)?;
                info!(name = %name, "add data");
            }
            (Pass::One, PassState::RegisteredPass0, false) => {
                {
                    let data = self.file.symbols.get_mut(data_id);
                    data.state = data.state.advance(PassState::ResolvedPass1, &name)?;
                }
                // header of the inherited class
                if let Some(pid) = self.file.symbols.get(data_id).direct_inherit {
                    let parent_name = self.file.symbols.get(pid).name.clone();
                    let headers = self.header_for(&parent_name);
                    if self.current_import_level == 0 {
                        self.file
                            .update_headers(Target::Common, FileKind::Header, &headers);
                    }
                }
                self.parse_data_body(cursor, begin, data_id)?;
            }
            (
                Pass::One,
                PassState::ResolvedPass1 | PassState::SpecializationResolved,
                true,
            ) => {
                {
                    let data = self.file.symbols.get_mut(data_id);
                    data.state = data.state.advance(PassState::SpecializationResolved, &name)?;
                }
                self.template_values = template_values;
                self.parse_data_body(cursor, begin, data_id)?;
            }
            // repeated sighting through another import path: no-op
            _ => {}
        }

        Ok(())
    }

    /// Find or create the class symbol and register its factory
    /// prototypes. Idempotent across repeated sightings.
    fn register_data(&mut self, name: &str, abstract_: bool) -> DataId {
        if let Some(id) = self.file.symbols.lookup(name) {
            if !self.template_spe {
                self.file.symbols.get_mut(id).import_level = self.current_import_level;
            }
            return id;
        }

        let mut data = Data::new(name);
        data.import_level = self.current_import_level;
        data.templates_args = self.template_args.clone();
        data.is_template = !self.template_args.is_empty();
        data.abstract_ = abstract_;
        let id = self.file.symbols.insert(data);

        let out_type = format!("{}{}", name, self.ctx.config.suffix);
        let headers = self.header_for(name);

        let mut custom = CustomMember {
            type_name: name.to_string(),
            out_type_name: out_type,
            headers,
            templates: Vec::new(),
        };
        custom.set_templates_args(&self.template_args);

        self.ctx
            .registry
            .register(name, MemberKind::Custom(custom.clone()));
        self.ctx
            .registry
            .register(format!("{name}[]"), MemberKind::CustomArray(custom.clone()));
        // the reference prototype resolves its class and headers at use
        custom.headers = Vec::new();
        self.ctx.registry.register(
            format!("{name}&"),
            MemberKind::CustomRef {
                custom,
                ref_data: None,
                shadow: None,
            },
        );
        id
    }

    /// Bind `: Parent<values>` at pass 0: arity check and parameter
    /// triples, deferred when a value names one of the child's own open
    /// generic parameters.
    fn bind_inheritance(
        &mut self,
        data_id: DataId,
        inherit_from: &str,
        values: &[String],
    ) -> Result<(), ParseError> {
        if inherit_from.is_empty() {
            return Ok(());
        }
        let pid = self
            .file
            .symbols
            .lookup(inherit_from)
            .ok_or_else(|| ParseError::UnknownSymbol {
                what: "class",
                name: inherit_from.to_string(),
            })?;
        let parent_args = self.file.symbols.get(pid).templates_args.clone();
        if parent_args.len() != values.len() {
            return Err(ParseError::TemplateArity {
                parent: inherit_from.to_string(),
                expected: parent_args.len(),
                found: values.len(),
            });
        }
        let own_args = self.file.symbols.get(data_id).templates_args.clone();
        let data = self.file.symbols.get_mut(data_id);
        data.direct_inherit = Some(pid);
        for (arg, value) in parent_args.iter().zip(values) {
            data.templates_params.push(TemplateParam {
                name: arg.clone(),
                value: value.clone(),
                resolved: !own_args.contains(value),
            });
        }
        Ok(())
    }

    /// Resolve a class body: member-sharing injection, then the scope
    /// walker.
    fn parse_data_body(
        &mut self,
        cursor: &mut LineCursor,
        begin: bool,
        data_id: DataId,
    ) -> Result<(), ParseError> {
        // inject members of the inherited class when it is abstract or
        // composite mode is on; this happens here because only the second
        // pass reaches bodies
        if let Some(pid) = self.file.symbols.get(data_id).direct_inherit {
            let parent = self.file.symbols.get(pid);
            if parent.abstract_ || self.ctx.config.composite {
                let members = parent.members.clone();
                let finalizers = parent.finalizers.clone();
                let identifier = parent.identifier;
                let statics = parent.statics.clone();
                let externs = parent.externs.clone();
                let is_template = parent.is_template;
                let templates_args = parent.templates_args.clone();
                let templates_params = parent.templates_params.clone();

                let data = self.file.symbols.get_mut(data_id);
                data.members = members;
                data.finalizers = finalizers;
                data.identifier = identifier;
                data.statics = statics;
                data.externs = externs;
                data.is_template = is_template;
                data.templates_args = templates_args;
                // the child's own bindings from the inheritance site take
                // precedence over the parent's open parameters
                if data.templates_params.is_empty() {
                    data.templates_params = templates_params;
                }
            }
        }

        self.file.symbols.get_mut(data_id).templates_args = self.template_args.clone();
        self.current_target = Target::Common;
        self.parse_scope(cursor, begin, data_id, None, ScopeKind::ClassBody)
    }

    /// `template<Arg1,Arg2,...>`; an empty list marks the next class
    /// declaration as a specialization.
    pub(crate) fn parse_template(&mut self, line: &str) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, "<>,");

        match tk.next_token() {
            Some(t) if t == "template" => {}
            _ => return Err(ParseError::format("template", "missing template keyword")),
        }
        match tk.next_token() {
            Some(t) if t == "<" => {}
            _ => return Err(ParseError::format("template", "expected <")),
        }

        loop {
            match tk.next_token() {
                Some(t) if t == ">" => break,
                Some(t) if t == "," => continue,
                Some(t) => {
                    if !is_name(&t) {
                        return Err(ParseError::format(
                            "template",
                            "invalid template argument name",
                        ));
                    }
                    if self.template_args.contains(&t) {
                        return Err(ParseError::format(
                            "template",
                            format!("template argument `{t}` already used"),
                        ));
                    }
                    self.template_args.push(t);
                }
                None => return Err(ParseError::format("template", "expected >")),
            }
        }
        if tk.next_token().is_some() {
            return Err(ParseError::format("template", "end of line expected"));
        }

        if self.template_args.is_empty() {
            self.template_spe = true;
        }
        Ok(())
    }

    /// `typedef <Name> { header <path> ; class <OutName> }` registers a
    /// custom type triple. Body lines are consumed on both passes but
    /// registration happens only at pass 0.
    pub(crate) fn parse_typedef(
        &mut self,
        cursor: &mut LineCursor,
        line: &str,
        pass: Pass,
    ) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, "{}");

        match tk.next_token() {
            Some(t) if t == "typedef" => {}
            _ => return Err(ParseError::format("typedef", "missing typedef keyword")),
        }
        let name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => return Err(ParseError::format("typedef", "type name must be a literal")),
        };
        let mut begin = false;
        if let Some(t) = tk.next_token() {
            if t != "{" {
                return Err(ParseError::format("typedef", "expected {"));
            }
            begin = true;
            if tk.next_token().is_some() {
                return Err(ParseError::format(
                    "typedef",
                    "end of line expected after opening bracket {",
                ));
            }
        }

        let mut out_type_name = String::new();
        let mut headers: Vec<String> = Vec::new();

        loop {
            let Some(line) = cursor.next_line() else {
                return Err(ParseError::format(
                    "typedef",
                    "unexpected end of file inside typedef block",
                ));
            };
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('{') {
                if begin {
                    return Err(ParseError::format(
                        "typedef",
                        "opening bracket { must not follow another {",
                    ));
                }
                begin = true;
                continue;
            }
            if !begin {
                return Err(ParseError::format("typedef", "missing prior opening bracket {"));
            }
            if line.starts_with('}') {
                if line.len() > 1 {
                    return Err(ParseError::format(
                        "typedef",
                        "ending bracket } line must only contain the ending bracket",
                    ));
                }
                break;
            }
            if let Some(header) = line.strip_prefix("header ") {
                headers.push(header.trim_start().to_string());
            } else if let Some(class) = line.strip_prefix("class ") {
                out_type_name = class.trim_start().to_string();
            } else {
                return Err(ParseError::format("typedef", "unsupported keyword"));
            }
        }

        if pass == Pass::Zero {
            let custom = CustomMember {
                type_name: name.clone(),
                out_type_name,
                headers,
                templates: Vec::new(),
            };
            self.ctx
                .registry
                .register(name.as_str(), MemberKind::Custom(custom.clone()));
            self.ctx
                .registry
                .register(format!("{name}[]"), MemberKind::CustomArray(custom.clone()));
            self.ctx.registry.register(
                format!("{name}&"),
                MemberKind::CustomRef {
                    custom,
                    ref_data: None,
                    shadow: None,
                },
            );
        }
        Ok(())
    }

    /// Header path for `class_name` when it was imported, as a quoted
    /// include directive.
    pub(crate) fn header_for(&self, class_name: &str) -> Vec<String> {
        for import in &self.file.imports {
            if import == class_name || import.ends_with(&format!("/{class_name}")) {
                return vec![format!(
                    "\"{}{}.{}\"",
                    import, self.ctx.config.suffix, self.ctx.config.hpp_ext
                )];
            }
        }
        Vec::new()
    }
}
