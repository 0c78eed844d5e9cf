//! Member-level declarations: plain members, arrays, consts, bits and
//! the identifier member.

use dmgen_lexer::{is_int, is_name, is_uint, Tokenizer};
use dmgen_model::{DataId, FileKind, MemberId, MemberKind, Target, Visibility};
use tracing::debug;

use super::{DataFile, ParseError};

impl DataFile<'_> {
    /// Attach a member to its scope, rejecting duplicate names in that
    /// scope. A nested declaration may shadow an outer one.
    pub(crate) fn add_member(
        &mut self,
        target: Target,
        data_id: DataId,
        member_id: MemberId,
        parent: Option<MemberId>,
    ) -> Result<(), ParseError> {
        let name = self.file.arena.get(member_id).name.clone();
        match parent {
            Some(parent) => {
                let duplicate = self
                    .file
                    .arena
                    .get(parent)
                    .kind
                    .children()
                    .is_some_and(|cs| cs.iter().any(|&c| self.file.arena.get(c).name == name));
                if duplicate {
                    return Err(ParseError::DuplicateDeclaration(name));
                }
                if let Some(children) = self.file.arena.get_mut(parent).kind.children_mut() {
                    children.push(member_id);
                }
            }
            None => {
                let data = self.file.symbols.get(data_id);
                if data.members[target]
                    .iter()
                    .any(|&m| self.file.arena.get(m).name == name)
                {
                    return Err(ParseError::DuplicateDeclaration(name));
                }
                self.file.symbols.get_mut(data_id).members[target].push(member_id);
            }
        }
        Ok(())
    }

    /// Resolve a counter/condition/bitset variable: current target list,
    /// then Common, then the lexical parent chain.
    pub(crate) fn find_variable(
        &self,
        data_id: DataId,
        parent: Option<MemberId>,
        name: &str,
    ) -> Option<MemberId> {
        let data = self.file.symbols.get(data_id);
        for target in [self.current_target, Target::Common] {
            for &m in &data.members[target] {
                if self.file.arena.get(m).name == name {
                    return Some(m);
                }
            }
        }
        parent.and_then(|p| self.file.arena.find_member(p, name))
    }

    /// `identifier <type> <name>` — the class's unique key member.
    pub(crate) fn parse_identifier(
        &mut self,
        line: &str,
        data_id: DataId,
    ) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, "");

        match tk.next_token() {
            Some(t) if t == "identifier" => {}
            _ => return Err(ParseError::format("identifier", "missing identifier keyword")),
        }
        let type_name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => return Err(ParseError::format("identifier", "invalid type format")),
        };
        let name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => return Err(ParseError::format("identifier", "invalid name format")),
        };
        if tk.next_token().is_some() {
            return Err(ParseError::format("identifier", "end of line expected"));
        }

        let member_id = self
            .ctx
            .registry
            .build(&type_name, None, &mut self.file.arena)?;
        self.file.arena.get_mut(member_id).name = name.clone();

        if self.file.symbols.get(data_id).identifier.is_some() {
            return Err(ParseError::DuplicateIdentifier(name));
        }
        self.file.symbols.get_mut(data_id).identifier = Some(member_id);

        // also a regular member for declaration and read/write
        self.add_member(Target::Common, data_id, member_id, None)
    }

    /// Plain member: `<type>[<TArgs>][&]<name>[= <value>]`.
    pub(crate) fn parse_member(
        &mut self,
        line: &str,
        data_id: DataId,
        parent: Option<MemberId>,
    ) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, "&<>=,");

        let type_name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => return Err(ParseError::format("member", "type name must be a literal")),
        };

        // optional template argument list
        let mut template_args: Vec<String> = Vec::new();
        match tk.next_token() {
            Some(t) if t == "<" => loop {
                match tk.next_token() {
                    Some(t) if t == ">" => break,
                    Some(t) if t == "," => continue,
                    Some(t) => {
                        if !is_name(&t) {
                            return Err(ParseError::format(
                                "member",
                                "template argument must be a literal",
                            ));
                        }
                        template_args.push(t);
                    }
                    None => {
                        return Err(ParseError::format(
                            "member",
                            "unterminated template argument list",
                        ))
                    }
                }
            },
            Some(_) => tk.cancel(),
            None => return Err(ParseError::format("member", "missing member name")),
        }

        // optional reference marker
        let mut is_ref = false;
        match tk.next_token() {
            Some(t) if t == "&" => is_ref = true,
            Some(_) => tk.cancel(),
            None => return Err(ParseError::format("member", "missing member name")),
        }

        let name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => return Err(ParseError::format("member", "member name must be a literal")),
        };

        // optional initial value
        let mut value = String::new();
        if let Some(t) = tk.next_token() {
            if t != "=" {
                return Err(ParseError::format("member", "= expected"));
            }
            value = tk
                .next_token()
                .ok_or_else(|| ParseError::format("member", "missing value after ="))?;
            if tk.next_token().is_some() {
                return Err(ParseError::format("member", "end of line expected"));
            }
        }

        let member_id = if is_ref {
            if !value.is_empty() {
                return Err(ParseError::format(
                    "member",
                    "a reference member cannot have an initial value",
                ));
            }
            self.build_reference_member(&type_name, &name, data_id, parent)?
        } else {
            let member_id = self
                .ctx
                .registry
                .build(&type_name, parent, &mut self.file.arena)?;

            if !value.is_empty() {
                // a value naming an open generic parameter is marked for
                // late substitution
                let marked = if self.template_args.contains(&value) {
                    format!("<{value}>")
                } else {
                    value.clone()
                };
                self.file.arena.get_mut(member_id).value = marked;
                self.file.symbols.get_mut(data_id).initializers.push(member_id);
            }

            // a member of a declared class type resolves late
            if self.file.symbols.lookup(&type_name).is_some() {
                self.file.symbols.get_mut(data_id).finalizers.push(member_id);
            }

            if self.current_import_level == 0 {
                let headers = self.file.arena.get(member_id).kind.headers();
                self.file
                    .update_headers(self.current_target, FileKind::Header, &headers);
            }
            member_id
        };

        self.file.arena.get_mut(member_id).name = name.clone();

        // bind declared template values; unresolved when the value names
        // an open generic of the declaring class
        let own_args = self.file.symbols.get(data_id).templates_args.clone();
        for (i, v) in template_args.iter().enumerate() {
            let resolved = !own_args.contains(v);
            self.file
                .arena
                .get_mut(member_id)
                .kind
                .set_template(i, v, resolved)?;
        }

        self.add_member(self.current_target, data_id, member_id, parent)?;
        debug!(type_name = %type_name, name = %name, "member");
        Ok(())
    }

    /// A `<Name>&` member: the reference itself plus the shadow `int32`
    /// identifier member it reads and writes through.
    fn build_reference_member(
        &mut self,
        type_name: &str,
        name: &str,
        data_id: DataId,
        parent: Option<MemberId>,
    ) -> Result<MemberId, ParseError> {
        let member_id = self
            .ctx
            .registry
            .build(&format!("{type_name}&"), parent, &mut self.file.arena)?;

        let shadow = self.ctx.registry.build("int32", parent, &mut self.file.arena)?;
        self.file.arena.get_mut(shadow).name = format!("{name}Id");

        let ref_data = self
            .file
            .symbols
            .lookup(type_name)
            .ok_or_else(|| ParseError::UnknownSymbol {
                what: "class",
                name: type_name.to_string(),
            })?;
        let ref_args = self.file.symbols.get(ref_data).templates_args.clone();

        if let MemberKind::CustomRef {
            custom,
            ref_data: rd,
            shadow: sh,
        } = &mut self.file.arena.get_mut(member_id).kind
        {
            custom.set_templates_args(&ref_args);
            *rd = Some(ref_data);
            *sh = Some(shadow);
            // open generic parameters of the declaring class bind through
            for (i, v) in self.template_args.iter().enumerate() {
                if i < custom.templates.len() {
                    custom
                        .set_template(i, v, true)
                        .expect("index checked above");
                }
            }
        }

        // satisfied at finalize time through the manager lookup
        self.file.symbols.get_mut(data_id).finalizers.push(member_id);

        if self.current_import_level == 0 {
            let pre_class = format!("{type_name}{}", self.ctx.config.suffix);
            self.file.update_classes(&pre_class);
            // identifier-metadata headers flow into the implementation
            // includes once annotations are known, at resolve time
            if !self.file.ref_classes.contains(&ref_data) {
                self.file.ref_classes.push(ref_data);
            }
        }
        Ok(member_id)
    }

    /// Fixed or dynamic array member: `<type>[<size>] <name>`.
    pub(crate) fn parse_array(
        &mut self,
        line: &str,
        data_id: DataId,
        parent: Option<MemberId>,
    ) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, "&<>[],");

        let type_name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => return Err(ParseError::format("array", "type name must be a literal")),
        };

        // template arguments are tolerated but carry nothing for arrays
        match tk.next_token() {
            Some(t) if t == "<" => loop {
                match tk.next_token() {
                    Some(t) if t == ">" => break,
                    Some(t) if t == "," => continue,
                    Some(t) if is_name(&t) => continue,
                    _ => {
                        return Err(ParseError::format(
                            "array",
                            "template argument must be a literal",
                        ))
                    }
                }
            },
            Some(_) => tk.cancel(),
            None => return Err(ParseError::format("array", "missing array size")),
        }

        match tk.next_token() {
            Some(t) if t == "&" => {
                return Err(ParseError::format(
                    "array",
                    "& reference is not compatible with array []",
                ))
            }
            Some(_) => tk.cancel(),
            None => return Err(ParseError::format("array", "missing array size")),
        }

        match tk.next_token() {
            Some(t) if t == "[" => {}
            _ => return Err(ParseError::format("array", "[ expected")),
        }
        // empty brackets mean a dynamic size
        let mut size = String::new();
        loop {
            match tk.next_token() {
                Some(t) if t == "]" => break,
                Some(t) if is_uint(&t) => size = t,
                _ => {
                    return Err(ParseError::format(
                        "array",
                        "expected integer array size or ]",
                    ))
                }
            }
        }

        let name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => return Err(ParseError::format("array", "name must be a literal")),
        };
        if tk.next_token().is_some() {
            return Err(ParseError::format("array", "end of line expected"));
        }

        let member_id = self
            .ctx
            .registry
            .build(&format!("{type_name}[]"), parent, &mut self.file.arena)?;
        {
            let member = self.file.arena.get_mut(member_id);
            member.name = name.clone();
            member.value = size;
        }

        if self.file.symbols.lookup(&type_name).is_some() {
            self.file.symbols.get_mut(data_id).finalizers.push(member_id);
        }
        if self.current_import_level == 0 {
            let headers = self.file.arena.get(member_id).kind.headers();
            self.file
                .update_headers(self.current_target, FileKind::Header, &headers);
        }

        self.add_member(self.current_target, data_id, member_id, parent)?;
        debug!(type_name = %type_name, name = %name, "array member");
        Ok(())
    }

    /// `[public] const <type> <name> = <value>`.
    pub(crate) fn parse_const(
        &mut self,
        line: &str,
        data_id: DataId,
        parent: Option<MemberId>,
        is_public: bool,
    ) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, "=");

        match tk.next_token() {
            Some(t) if t == "const" => {}
            _ => return Err(ParseError::format("const", "missing const keyword")),
        }
        let type_name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => return Err(ParseError::format("const", "type name must be a literal")),
        };
        let name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => return Err(ParseError::format("const", "const name must be a literal")),
        };
        match tk.next_token() {
            Some(t) if t == "=" => {}
            _ => return Err(ParseError::format("const", "= expected")),
        }
        let value = match tk.next_token() {
            Some(t) if is_name(&t) || is_int(&t) => t,
            _ => {
                return Err(ParseError::format(
                    "const",
                    "const value must be a literal or an immediate integer",
                ))
            }
        };
        if tk.next_token().is_some() {
            return Err(ParseError::format("const", "end of line expected"));
        }

        let member_id =
            self.ctx
                .registry
                .build(&format!("const {type_name}"), parent, &mut self.file.arena)?;
        {
            let member = self.file.arena.get_mut(member_id);
            member.name = name;
            member.value = value;
            if is_public {
                member.visibility = Visibility::Public;
            }
        }

        self.add_member(self.current_target, data_id, member_id, parent)
    }

    /// `bit <bitsetVar>[<constName>]` — a named bit drawn from the
    /// bitset's own allocator.
    pub(crate) fn parse_bit(
        &mut self,
        line: &str,
        data_id: DataId,
        parent: Option<MemberId>,
    ) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, "[]");

        match tk.next_token() {
            Some(t) if t == "bit" => {}
            _ => return Err(ParseError::format("bit", "missing bit keyword")),
        }
        let var_name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => return Err(ParseError::format("bit", "bitset variable must be a literal")),
        };
        match tk.next_token() {
            Some(t) if t == "[" => {}
            _ => return Err(ParseError::format("bit", "[ expected")),
        }
        let const_name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            Some(t) if is_uint(&t) => {
                return Err(ParseError::format(
                    "bit",
                    format!("bit name must be a literal, got `{t}`"),
                ))
            }
            _ => return Err(ParseError::format("bit", "bit name must be a literal")),
        };
        match tk.next_token() {
            Some(t) if t == "]" => {}
            _ => return Err(ParseError::format("bit", "] expected")),
        }
        if tk.next_token().is_some() {
            return Err(ParseError::format("bit", "end of line expected"));
        }

        let var = self
            .find_variable(data_id, parent, &var_name)
            .ok_or_else(|| ParseError::UnknownSymbol {
                what: "bitset variable",
                name: var_name,
            })?;

        let bit_value = self.file.arena.next_uint_id(var);
        let member_id = self.ctx.registry.build("bit", None, &mut self.file.arena)?;
        {
            let member = self.file.arena.get_mut(member_id);
            member.name = const_name;
            member.value = bit_value.to_string();
            if let MemberKind::Bit { var: v } = &mut member.kind {
                *v = Some(var);
            }
        }

        self.add_member(self.current_target, data_id, member_id, parent)
    }
}
