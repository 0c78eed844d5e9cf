//! Structural constructs: target blocks, loops and conditionals.

use dmgen_lexer::{is_name, is_uint, Tokenizer};
use dmgen_model::{DataId, MemberId, MemberKind, Profile};

use super::lines::LineCursor;
use super::scope::ScopeKind;
use super::{DataFile, ParseError};

impl DataFile<'_> {
    /// `target <profile> { ... }` routes the enclosed declarations to a
    /// profile-specific member list, restoring Common at `}`.
    pub(crate) fn parse_target(
        &mut self,
        cursor: &mut LineCursor,
        line: &str,
        data_id: DataId,
    ) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, "{}");

        match tk.next_token() {
            Some(t) if t == "target" => {}
            _ => return Err(ParseError::format("target", "missing target keyword")),
        }
        match tk.next_token() {
            Some(t) => match Profile::from_name(&t) {
                Some(profile) => self.current_target = profile.target(),
                None => return Err(ParseError::format("target", "invalid target name")),
            },
            None => return Err(ParseError::format("target", "missing target name")),
        }

        let mut begin = false;
        if let Some(t) = tk.next_token() {
            if t != "{" {
                return Err(ParseError::format("target", "expected {"));
            }
            begin = true;
            if tk.next_token().is_some() {
                return Err(ParseError::format(
                    "target",
                    "end of line expected after opening bracket {",
                ));
            }
        }

        self.parse_scope(cursor, begin, data_id, None, ScopeKind::TargetBlock)
    }

    /// `loop <name>: <counterVar>[<constOrInt>] { ... }`.
    pub(crate) fn parse_loop(
        &mut self,
        cursor: &mut LineCursor,
        line: &str,
        data_id: DataId,
        parent: Option<MemberId>,
    ) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, "{}[]:");

        match tk.next_token() {
            Some(t) if t == "loop" => {}
            _ => return Err(ParseError::format("loop", "missing loop keyword")),
        }
        let loop_name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => return Err(ParseError::format("loop", "loop name must be a literal")),
        };
        match tk.next_token() {
            Some(t) if t == ":" => {}
            _ => return Err(ParseError::format("loop", ": expected")),
        }
        let var_name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => {
                return Err(ParseError::format(
                    "loop",
                    "counter variable name must be a literal",
                ))
            }
        };
        let (param, begin) = self.parse_condition_tail(&mut tk, "loop", false)?;

        let var = self
            .find_variable(data_id, parent, &var_name)
            .ok_or_else(|| ParseError::UnknownSymbol {
                what: "counter variable",
                name: var_name,
            })?;

        let param_member = self.materialize_condition_param(data_id, var, param.as_deref())?;

        let member_id = self.ctx.registry.build("loop", parent, &mut self.file.arena)?;
        {
            let member = self.file.arena.get_mut(member_id);
            member.name = loop_name;
            if let MemberKind::Loop {
                var: v, param: p, ..
            } = &mut member.kind
            {
                *v = Some(var);
                *p = param_member;
            }
        }
        self.add_member(self.current_target, data_id, member_id, parent)?;

        self.parse_scope(cursor, begin, data_id, Some(member_id), ScopeKind::LoopBody)
    }

    /// `if <condVar>[<constOrInt>] { ... }`.
    pub(crate) fn parse_if(
        &mut self,
        cursor: &mut LineCursor,
        line: &str,
        data_id: DataId,
        parent: Option<MemberId>,
    ) -> Result<(), ParseError> {
        let mut tk = Tokenizer::new(line, "{}[]");

        match tk.next_token() {
            Some(t) if t == "if" => {}
            _ => return Err(ParseError::format("if", "missing if keyword")),
        }
        let var_name = match tk.next_token() {
            Some(t) if is_name(&t) => t,
            _ => {
                return Err(ParseError::format(
                    "if",
                    "condition variable must be a literal",
                ))
            }
        };
        let (param, begin) = self.parse_condition_tail(&mut tk, "if", true)?;

        let var = self
            .find_variable(data_id, parent, &var_name)
            .ok_or_else(|| ParseError::UnknownSymbol {
                what: "condition variable",
                name: var_name,
            })?;

        let param_member = self.materialize_condition_param(data_id, var, param.as_deref())?;

        let member_id = self.ctx.registry.build("if", parent, &mut self.file.arena)?;
        {
            let member = self.file.arena.get_mut(member_id);
            member.name = "if".into();
            if let MemberKind::If {
                var: v, param: p, ..
            } = &mut member.kind
            {
                *v = Some(var);
                *p = param_member;
            }
        }
        self.add_member(self.current_target, data_id, member_id, parent)?;

        self.parse_scope(cursor, begin, data_id, Some(member_id), ScopeKind::IfBody)
    }

    /// Shared tail of loop/if headers: an optional (loop) or required
    /// (if) `[param]`, then an optional `{`.
    fn parse_condition_tail(
        &mut self,
        tk: &mut Tokenizer<'_>,
        construct: &'static str,
        param_required: bool,
    ) -> Result<(Option<String>, bool), ParseError> {
        let mut param = None;

        match tk.next_token() {
            Some(t) if t == "[" => {
                let value = match tk.next_token() {
                    Some(t) if is_name(&t) || is_uint(&t) => t,
                    _ => {
                        return Err(ParseError::format(
                            construct,
                            "parameter must be a literal or an immediate unsigned integer",
                        ))
                    }
                };
                match tk.next_token() {
                    Some(t) if t == "]" => {}
                    _ => return Err(ParseError::format(construct, "] expected")),
                }
                param = Some(value);
            }
            Some(_) if param_required => {
                return Err(ParseError::format(construct, "[ expected"));
            }
            Some(_) => tk.cancel(),
            None if param_required => {
                return Err(ParseError::format(construct, "[ expected"));
            }
            None => {}
        }

        let mut begin = false;
        if let Some(t) = tk.next_token() {
            if t != "{" {
                return Err(ParseError::format(construct, "invalid condition expression"));
            }
            begin = true;
            if tk.next_token().is_some() {
                return Err(ParseError::format(
                    construct,
                    "end of line expected after opening bracket {",
                ));
            }
        }
        Ok((param, begin))
    }

    /// Materialize a loop/if parameter into a member: an integer makes an
    /// anonymous `immediate` named by the variable's allocator, a symbol
    /// makes a `const uint32` valued from it. Either lands in the class's
    /// current-target list.
    fn materialize_condition_param(
        &mut self,
        data_id: DataId,
        var: MemberId,
        param: Option<&str>,
    ) -> Result<Option<MemberId>, ParseError> {
        let Some(param) = param else {
            return Ok(None);
        };

        let uint_id = self.file.arena.next_uint_id(var);
        let member_id = if is_uint(param) {
            let id = self
                .ctx
                .registry
                .build("immediate", None, &mut self.file.arena)?;
            self.file.arena.get_mut(id).name = uint_id.to_string();
            id
        } else {
            let id = self
                .ctx
                .registry
                .build("const uint32", None, &mut self.file.arena)?;
            {
                let member = self.file.arena.get_mut(id);
                member.name = param.to_string();
                member.value = uint_id.to_string();
            }
            id
        };
        self.add_member(self.current_target, data_id, member_id, None)?;
        Ok(Some(member_id))
    }
}
