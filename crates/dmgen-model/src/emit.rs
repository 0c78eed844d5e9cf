//! Per-member code emission.
//!
//! Each function renders one member's contribution to the generated
//! class, appending lines to `out`. Structural members (loop/if) emit a
//! control-flow frame and delegate to their children; a reference member
//! delegates its read/write to its shadow identifier member and never
//! encodes itself.

use crate::data::{Data, SymbolTable};
use crate::member::{MemberArena, MemberId, MemberKind};
use crate::target::Target;

/// Accessor-facing name: leading `_` / `m_` stripped, first letter
/// upper-cased.
fn accessor_name(name: &str) -> String {
    let base = name
        .strip_prefix("m_")
        .or_else(|| name.strip_prefix('_'))
        .unwrap_or(name);
    let mut chars = base.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Name of the local element counter in array read/write loops.
fn counter_name(name: &str) -> String {
    let base = name
        .strip_prefix("m_")
        .or_else(|| name.strip_prefix('_'))
        .unwrap_or(name);
    format!("{base}Size")
}

fn member_name(arena: &MemberArena, id: Option<MemberId>) -> Option<String> {
    id.map(|id| arena.get(id).name.clone())
}

/// Loop bound expression: indexed for array counters, the counter member
/// itself otherwise.
fn loop_bound(arena: &MemberArena, var: Option<MemberId>, param: Option<MemberId>) -> String {
    let Some(var) = var else {
        return "0".into();
    };
    let var_name = arena.get(var).name.clone();
    match (&arena.get(var).kind, member_name(arena, param)) {
        (MemberKind::ArrayUInt8 { .. } | MemberKind::ArrayUInt32 { .. }, Some(p)) => {
            format!("{var_name}[{p}]")
        }
        _ => var_name,
    }
}

/// Declaration line(s) of a member inside the generated class body.
pub fn write_decl(arena: &MemberArena, id: MemberId, out: &mut Vec<String>) {
    let member = arena.get(id);
    let ind = arena.indent_of(id);
    match &member.kind {
        MemberKind::Loop { children, .. } | MemberKind::If { children, .. } => {
            for &child in children {
                write_decl(arena, child, out);
            }
        }
        MemberKind::Bit { .. } => {
            out.push(format!(
                "{ind}static const uint32_t {} = {};",
                member.name, member.value
            ));
        }
        MemberKind::Const(k) => {
            out.push(format!(
                "{ind}static const {} {} = {};",
                k.out_type_name(),
                member.name,
                member.value
            ));
        }
        MemberKind::Immediate => {}
        MemberKind::ArrayUInt8 { .. } | MemberKind::ArrayUInt32 { .. } => {
            out.push(format!(
                "{ind}{} {}[{}];",
                member.kind.out_type_name(),
                member.name,
                member.value
            ));
        }
        MemberKind::CustomRef { shadow, .. } => {
            out.push(format!(
                "{ind}{} {};",
                member.kind.out_type_name(),
                member.name
            ));
            if let Some(shadow) = shadow {
                write_decl(arena, *shadow, out);
            }
        }
        _ => {
            out.push(format!(
                "{ind}{} {};",
                member.kind.out_type_name(),
                member.name
            ));
        }
    }
}

/// Read statement(s) of a member in `readFromFile`.
pub fn write_read(arena: &MemberArena, id: MemberId, out: &mut Vec<String>) {
    let member = arena.get(id);
    let ind = arena.indent_of(id);
    let name = &member.name;
    match &member.kind {
        MemberKind::Loop {
            var,
            param,
            children,
        } => {
            let bound = loop_bound(arena, *var, *param);
            out.push(format!("{ind}for (uint32_t i = 0; i < {bound}; ++i)"));
            out.push(format!("{ind}{{"));
            for &child in children {
                write_read(arena, child, out);
            }
            out.push(format!("{ind}}}"));
        }
        MemberKind::If {
            var,
            param,
            children,
        } => {
            let Some(var) = var else { return };
            let test = arena
                .get(*var)
                .kind
                .if_test(member_name(arena, *param).as_deref());
            out.push(format!("{ind}if ({}{test})", arena.get(*var).name));
            out.push(format!("{ind}{{"));
            for &child in children {
                write_read(arena, child, out);
            }
            out.push(format!("{ind}}}"));
        }
        MemberKind::Bit { .. } | MemberKind::Immediate | MemberKind::Const(_) => {}
        MemberKind::BitSet16 { .. } | MemberKind::BitSet32 { .. } | MemberKind::BitSet64 { .. } => {
            out.push(format!(
                "{ind}{name}.set(is.{}());",
                member.kind.read_method()
            ));
        }
        MemberKind::ArrayUInt8 { .. } | MemberKind::ArrayUInt32 { .. } => {
            out.push(format!("{ind}is.read({name}, {});", member.value));
        }
        MemberKind::Custom(_) => {
            out.push(format!("{ind}{name}.readFromFile(is);"));
        }
        MemberKind::CustomArray(_) => {
            let counter = counter_name(name);
            out.push(format!("{ind}uint32_t {counter} = is.readUInt32();"));
            out.push(format!("{ind}{name}.resize({counter});"));
            out.push(format!("{ind}for (uint32_t i = 0; i < {counter}; ++i)"));
            out.push(format!("{ind}{{"));
            out.push(format!("{ind}    {name}[i].readFromFile(is);"));
            out.push(format!("{ind}}}"));
        }
        MemberKind::CustomRef { shadow, .. } => {
            if let Some(shadow) = shadow {
                write_read(arena, *shadow, out);
            }
        }
        _ => {
            out.push(format!(
                "{ind}{name} = is.{}();",
                member.kind.read_method()
            ));
        }
    }
}

/// Write statement(s) of a member in `writeToFile`.
pub fn write_write(arena: &MemberArena, id: MemberId, out: &mut Vec<String>) {
    let member = arena.get(id);
    let ind = arena.indent_of(id);
    let name = &member.name;
    match &member.kind {
        MemberKind::Loop {
            var,
            param,
            children,
        } => {
            let bound = loop_bound(arena, *var, *param);
            out.push(format!("{ind}for (uint32_t i = 0; i < {bound}; ++i)"));
            out.push(format!("{ind}{{"));
            for &child in children {
                write_write(arena, child, out);
            }
            out.push(format!("{ind}}}"));
        }
        MemberKind::If {
            var,
            param,
            children,
        } => {
            let Some(var) = var else { return };
            let test = arena
                .get(*var)
                .kind
                .if_test(member_name(arena, *param).as_deref());
            out.push(format!("{ind}if ({}{test})", arena.get(*var).name));
            out.push(format!("{ind}{{"));
            for &child in children {
                write_write(arena, child, out);
            }
            out.push(format!("{ind}}}"));
        }
        MemberKind::Bit { .. } | MemberKind::Immediate | MemberKind::Const(_) => {}
        MemberKind::BitSet16 { .. } | MemberKind::BitSet32 { .. } | MemberKind::BitSet64 { .. } => {
            out.push(format!(
                "{ind}os.{}({name}.word());",
                member.kind.write_method()
            ));
        }
        MemberKind::ArrayUInt8 { .. } | MemberKind::ArrayUInt32 { .. } => {
            out.push(format!("{ind}os.write({name}, {});", member.value));
        }
        MemberKind::Custom(_) => {
            out.push(format!("{ind}{name}.writeToFile(os);"));
        }
        MemberKind::CustomArray(_) => {
            let counter = counter_name(name);
            out.push(format!(
                "{ind}uint32_t {counter} = (uint32_t){name}.size();"
            ));
            out.push(format!("{ind}os.writeUInt32({counter});"));
            out.push(format!("{ind}for (uint32_t i = 0; i < {counter}; ++i)"));
            out.push(format!("{ind}{{"));
            out.push(format!("{ind}    {name}[i].writeToFile(os);"));
            out.push(format!("{ind}}}"));
        }
        MemberKind::CustomRef { shadow, .. } => {
            if let Some(shadow) = shadow {
                write_write(arena, *shadow, out);
            }
        }
        _ => {
            out.push(format!(
                "{ind}os.{}({name});",
                member.kind.write_method()
            ));
        }
    }
}

fn push_inline_accessor(out: &mut Vec<String>, signature: String, body: String) {
    out.push(format!("    {signature}"));
    out.push("    {".into());
    out.push(format!("        {body}"));
    out.push("    }".into());
    out.push(String::new());
}

/// Getter declaration(s) of a member in the generated class.
pub fn write_getter_decl(arena: &MemberArena, id: MemberId, out: &mut Vec<String>) {
    let member = arena.get(id);
    let name = &member.name;
    let acc = accessor_name(name);
    match &member.kind {
        MemberKind::Loop { children, .. } | MemberKind::If { children, .. } => {
            for &child in children {
                write_getter_decl(arena, child, out);
            }
        }
        MemberKind::Const(_) | MemberKind::Immediate => {}
        MemberKind::ArrayUInt8 { .. } | MemberKind::ArrayUInt32 { .. } => {
            push_inline_accessor(
                out,
                format!(
                    "const {}* get{acc}() const",
                    member.kind.out_type_name()
                ),
                format!("return {name};"),
            );
        }
        MemberKind::CustomRef { custom, shadow, .. } => {
            push_inline_accessor(
                out,
                format!("const {}* get{acc}() const", custom.out_type_name),
                format!("return {name};"),
            );
            if let Some(shadow) = shadow {
                let shadow = arena.get(*shadow);
                push_inline_accessor(
                    out,
                    format!(
                        "{} get{acc}Id() const",
                        shadow.kind.out_type_name()
                    ),
                    format!("return {};", shadow.name),
                );
            }
        }
        kind => {
            let ret = if kind.is_ref() || matches!(kind, MemberKind::Custom(_)) {
                format!("const {}&", kind.out_type_name())
            } else {
                kind.out_type_name()
            };
            push_inline_accessor(
                out,
                format!("{ret} get{acc}() const"),
                format!("return {name};"),
            );
        }
    }
}

/// Setter declaration(s) of a member in the generated class.
pub fn write_setter_decl(arena: &MemberArena, id: MemberId, out: &mut Vec<String>) {
    let member = arena.get(id);
    let name = &member.name;
    let acc = accessor_name(name);
    let param = format!("{name}_");
    match &member.kind {
        MemberKind::Loop { children, .. } | MemberKind::If { children, .. } => {
            for &child in children {
                write_setter_decl(arena, child, out);
            }
        }
        MemberKind::Const(_) | MemberKind::Immediate => {}
        MemberKind::BitSet16 { .. } | MemberKind::BitSet32 { .. } | MemberKind::BitSet64 { .. } => {
            // bits are toggled through their named flags
        }
        MemberKind::Bit { var } => {
            let Some(var) = var else { return };
            let var = arena.get(*var);
            out.push(format!("    void set{acc}(bool {param})"));
            out.push("    {".into());
            out.push(format!("        if ({param})"));
            out.push(format!(
                "            {}{};",
                var.name,
                var.kind.set_to(Some(name.as_str()), true)
            ));
            out.push("        else".into());
            out.push(format!(
                "            {}{};",
                var.name,
                var.kind.set_to(Some(name.as_str()), false)
            ));
            out.push("    }".into());
            out.push(String::new());
        }
        MemberKind::ArrayUInt8 { .. } => {
            push_inline_accessor(
                out,
                format!("void set{acc}(const uint8_t *{param})"),
                format!("memcpy({name}, {param}, {});", member.value),
            );
        }
        MemberKind::ArrayUInt32 { .. } => {
            push_inline_accessor(
                out,
                format!("void set{acc}(const uint32_t *{param})"),
                format!(
                    "memcpy({name}, {param}, {} * sizeof(uint32_t));",
                    member.value
                ),
            );
        }
        MemberKind::CustomRef { custom, shadow, .. } => {
            push_inline_accessor(
                out,
                format!("void set{acc}(const {} *{param})", custom.out_type_name),
                format!("{name} = {param};"),
            );
            if let Some(shadow) = shadow {
                let shadow = arena.get(*shadow);
                push_inline_accessor(
                    out,
                    format!(
                        "void set{acc}Id({} {param})",
                        shadow.kind.out_type_name()
                    ),
                    format!("{} = {param};", shadow.name),
                );
            }
        }
        MemberKind::CustomArray(_) => {
            push_inline_accessor(
                out,
                format!(
                    "void set{acc}(const {} &{param})",
                    member.kind.out_type_name()
                ),
                format!("{name} = {param};"),
            );
            // mutable getter for in-place filling
            push_inline_accessor(
                out,
                format!("{}& get{acc}()", member.kind.out_type_name()),
                format!("return {name};"),
            );
        }
        kind => {
            let arg = if kind.is_ref() || matches!(kind, MemberKind::Custom(_)) {
                format!("const {} &{param}", kind.out_type_name())
            } else {
                format!("{} {param}", kind.out_type_name())
            };
            push_inline_accessor(
                out,
                format!("void set{acc}({arg})"),
                format!("{name} = {param};"),
            );
        }
    }
}

/// Finalize statement(s) of a member: late object-graph resolution after
/// all reads completed.
pub fn write_finalize(
    arena: &MemberArena,
    symbols: &SymbolTable,
    data: &Data,
    target: Target,
    suffix: &str,
    id: MemberId,
    out: &mut Vec<String>,
) {
    let member = arena.get(id);
    let name = &member.name;
    match &member.kind {
        MemberKind::Custom(_) => {
            out.push(format!("    {name}.finalize();"));
        }
        MemberKind::CustomArray(custom) => {
            let ind = arena.indent_of(id);
            out.push(format!("{ind}for ({} &v : {name})", custom.out_type_name));
            out.push(format!("{ind}{{"));
            out.push(format!("{ind}    v.finalize();"));
            out.push(format!("{ind}}}"));
        }
        MemberKind::CustomRef {
            custom,
            ref_data,
            shadow,
        } => {
            let Some(ref_data) = ref_data else { return };
            let ref_data = symbols.get(*ref_data);
            // class-level annotations land in the Common slot; a profile
            // target without its own settings falls back to them
            let meta = {
                let m = &ref_data.identifier_meta[target];
                if m.default_entry.manager.is_empty() && m.specialized.is_empty() {
                    &ref_data.identifier_meta[Target::Common]
                } else {
                    m
                }
            };
            let entry = if custom.templates.is_empty() {
                &meta.default_entry
            } else {
                meta.lookup(&custom.template_key())
            };

            let (call, method) = match entry.method.strip_prefix('*') {
                Some(stripped) => ("->", stripped),
                None => (".", entry.method.as_str()),
            };

            let shadow_name = member_name(arena, *shadow).unwrap_or_default();
            let mut args = Vec::new();
            for p in &entry.params {
                if p == "$id" {
                    args.push(shadow_name.clone());
                } else if let Some(tpl) = custom.templates.iter().find(|t| &t.name == p) {
                    args.push(format!("{}{suffix}::{}", ref_data.name, tpl.value));
                } else if data.member_by_name(arena, p).is_some() {
                    args.push(p.clone());
                } else {
                    args.push(format!("{}{suffix}::{p}", ref_data.name));
                }
            }

            out.push(format!(
                "    {name} = {}{call}{method}({});",
                entry.manager,
                args.join(", ")
            ));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{Member, MemberKind};

    fn plain(arena: &mut MemberArena, kind: MemberKind, name: &str) -> MemberId {
        let mut m = Member::new(kind, None);
        m.name = name.into();
        arena.alloc(m)
    }

    #[test]
    fn scalar_read_write_and_decl() {
        let mut arena = MemberArena::new();
        let x = plain(&mut arena, MemberKind::Int32, "x");

        let mut out = Vec::new();
        write_decl(&arena, x, &mut out);
        assert_eq!(out, vec!["    int32_t x;"]);

        out.clear();
        write_read(&arena, x, &mut out);
        assert_eq!(out, vec!["    x = is.readInt32();"]);

        out.clear();
        write_write(&arena, x, &mut out);
        assert_eq!(out, vec!["    os.writeInt32(x);"]);
    }

    #[test]
    fn accessors_strip_member_prefixes() {
        let mut arena = MemberArena::new();
        let x = plain(&mut arena, MemberKind::Float, "m_speed");
        let mut out = Vec::new();
        write_getter_decl(&arena, x, &mut out);
        assert_eq!(out[0], "    float getSpeed() const");
        assert_eq!(out[2], "        return m_speed;");
        out.clear();
        write_setter_decl(&arena, x, &mut out);
        assert_eq!(out[0], "    void setSpeed(float m_speed_)");
    }

    #[test]
    fn string_accessors_use_references() {
        let mut arena = MemberArena::new();
        let s = plain(&mut arena, MemberKind::Str, "label");
        let mut out = Vec::new();
        write_getter_decl(&arena, s, &mut out);
        assert_eq!(out[0], "    const std::string& getLabel() const");
        out.clear();
        write_setter_decl(&arena, s, &mut out);
        assert_eq!(out[0], "    void setLabel(const std::string &label_)");
    }

    #[test]
    fn if_member_frames_its_children() {
        let mut arena = MemberArena::new();
        let flags = plain(&mut arena, MemberKind::BitSet32 { next_bit: 1 }, "flags");
        let mut bit = Member::new(MemberKind::Bit { var: Some(flags) }, None);
        bit.name = "HAS_EXTRA".into();
        bit.value = "0".into();
        let bit = arena.alloc(bit);

        let cond = arena.alloc(Member::new(
            MemberKind::If {
                var: Some(flags),
                param: Some(bit),
                children: Vec::new(),
            },
            None,
        ));
        let mut extra = Member::new(MemberKind::UInt16, Some(cond));
        extra.name = "extra".into();
        let extra = arena.alloc(extra);
        arena.get_mut(cond).kind.children_mut().unwrap().push(extra);

        let mut out = Vec::new();
        write_read(&arena, cond, &mut out);
        assert_eq!(
            out,
            vec![
                "    if (flags.getBit(HAS_EXTRA))",
                "    {",
                "        extra = is.readUInt16();",
                "    }",
            ]
        );
    }

    #[test]
    fn bit_setter_toggles_through_the_bitset() {
        let mut arena = MemberArena::new();
        let flags = plain(&mut arena, MemberKind::BitSet64 { next_bit: 1 }, "flags");
        let mut bit = Member::new(MemberKind::Bit { var: Some(flags) }, None);
        bit.name = "READY".into();
        bit.value = "0".into();
        let bit = arena.alloc(bit);

        let mut out = Vec::new();
        write_setter_decl(&arena, bit, &mut out);
        assert_eq!(out[0], "    void setREADY(bool READY_)");
        assert!(out.contains(&"            flags.enable(READY);".to_string()));
        assert!(out.contains(&"            flags.disable(READY);".to_string()));
    }

    #[test]
    fn custom_array_read_uses_a_counter() {
        let mut arena = MemberArena::new();
        let items = plain(
            &mut arena,
            MemberKind::CustomArray(crate::member::CustomMember {
                type_name: "Item".into(),
                out_type_name: "ItemData".into(),
                headers: Vec::new(),
                templates: Vec::new(),
            }),
            "items",
        );
        let mut out = Vec::new();
        write_read(&arena, items, &mut out);
        assert_eq!(out[0], "    uint32_t itemsSize = is.readUInt32();");
        assert_eq!(out[1], "    items.resize(itemsSize);");
        assert_eq!(out[4], "        items[i].readFromFile(is);");
    }
}
