//! Class-body parsing tests: member kinds, targets, scoping rules and
//! the faults a malformed schema must raise.

use dmgen_model::{CompilerContext, Config, MemberKind, ModelFile, Target, Visibility};
use dmgen_parser::{DataFile, ParseError};

fn parse(source: &str) -> Result<ModelFile, ParseError> {
    let mut ctx = CompilerContext::new(Config::default());
    DataFile::new(&mut ctx, "", "test.dmg").parse_class_source(source)
}

fn member_names(file: &ModelFile, class: &str, target: Target) -> Vec<String> {
    let data = file.symbols.get(file.symbols.lookup(class).unwrap());
    data.members[target]
        .iter()
        .map(|&m| file.arena.get(m).name.clone())
        .collect()
}

fn unwrap_inner(err: ParseError) -> ParseError {
    match err {
        ParseError::InFile { source, .. } => unwrap_inner(*source),
        other => other,
    }
}

#[test]
fn minimal_class_declares_members_in_order() {
    let file = parse("data Point\n{\n    int32 x\n    int32 y\n}\n").unwrap();
    assert_eq!(member_names(&file, "Point", Target::Common), vec!["x", "y"]);

    let point = file.symbols.get(file.symbols.lookup("Point").unwrap());
    assert_eq!(point.min_size, 8);
    assert!(!point.abstract_);
    assert_eq!(point.import_level, 0);
}

#[test]
fn brace_may_open_on_the_header_line_or_its_own() {
    // members live on their own lines; tokens after { are rejected
    assert!(parse("data Point { int32 x }").is_err());

    let same_line = parse("data Point {\n    int32 x\n}\n").unwrap();
    assert_eq!(member_names(&same_line, "Point", Target::Common), vec!["x"]);

    let own_line = parse("data Point\n{\n    int32 x\n}\n").unwrap();
    assert_eq!(member_names(&own_line, "Point", Target::Common), vec!["x"]);
}

#[test]
fn target_blocks_route_members_to_profiles() {
    let source = "\
data Entity
{
    int32 id
    target displayer
    {
        string label
    }
    target authority
    {
        uint64 secret
    }
    int32 tail
}
";
    let file = parse(source).unwrap();
    assert_eq!(
        member_names(&file, "Entity", Target::Common),
        vec!["id", "tail"]
    );
    assert_eq!(
        member_names(&file, "Entity", Target::Displayer),
        vec!["label"]
    );
    assert_eq!(
        member_names(&file, "Entity", Target::Authority),
        vec!["secret"]
    );
    assert!(member_names(&file, "Entity", Target::Editor).is_empty());
}

#[test]
fn identifier_member_is_unique() {
    let file = parse("data A\n{\n    identifier int32 id\n}\n").unwrap();
    let a = file.symbols.get(file.symbols.lookup("A").unwrap());
    assert!(a.identifier.is_some());
    // the identifier is also a regular common member
    assert_eq!(member_names(&file, "A", Target::Common), vec!["id"]);

    let err = parse("data A\n{\n    identifier int32 id\n    identifier int32 other\n}\n")
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(
        unwrap_inner(err),
        ParseError::DuplicateIdentifier(_)
    ));
}

#[test]
fn duplicate_member_in_same_scope_is_rejected() {
    let err = parse("data A\n{\n    int32 x\n    float x\n}\n").unwrap_err();
    assert!(matches!(
        unwrap_inner(err),
        ParseError::DuplicateDeclaration(name) if name == "x"
    ));
}

#[test]
fn same_name_in_different_targets_is_allowed() {
    let source = "\
data A
{
    target displayer
    {
        int32 x
    }
    target authority
    {
        int32 x
    }
}
";
    assert!(parse(source).is_ok());
}

#[test]
fn nested_declaration_shadows_the_outer_scope() {
    // the if declares HAS_X itself, drawing from the bitset's allocator
    let source = "\
data A
{
    bitset32 flags
    if flags[HAS_X]
    {
        int32 x
        loop xs: x
        {
            int8 x
        }
    }
}
";
    let file = parse(source).unwrap();
    let a = file.symbols.get(file.symbols.lookup("A").unwrap());
    let cond = *a.members[Target::Common]
        .iter()
        .find(|&&m| matches!(file.arena.get(m).kind, MemberKind::If { .. }))
        .unwrap();
    let inner_loop = file
        .arena
        .find_member(cond, "xs")
        .expect("loop inside the conditional");
    let shadowed = file.arena.find_member(inner_loop, "x").unwrap();
    assert!(matches!(file.arena.get(shadowed).kind, MemberKind::Int8));
}

#[test]
fn nesting_rules_are_enforced() {
    let loop_in_loop = "\
data A
{
    uint32 n
    loop outer: n
    {
        loop inner: n
        {
        }
    }
}
";
    let err = unwrap_inner(parse(loop_in_loop).unwrap_err());
    assert!(matches!(err, ParseError::Format { .. }));
    assert!(err.to_string().contains("loop in loop body is forbidden"));

    let if_in_if = "\
data A
{
    bitset16 flags
    if flags[A_BIT]
    {
        if flags[B_BIT]
        {
        }
    }
}
";
    let err = unwrap_inner(parse(if_in_if).unwrap_err());
    assert!(err.to_string().contains("if in if body is forbidden"));

    let if_in_loop = "\
data A
{
    uint32 n
    bitset16 flags
    loop items: n
    {
        if flags[A_BIT]
        {
        }
    }
}
";
    let err = unwrap_inner(parse(if_in_loop).unwrap_err());
    assert!(err.to_string().contains("if in loop body is forbidden"));

    let loop_in_if = "\
data A
{
    uint32 n
    bitset16 flags
    if flags[A_BIT]
    {
        loop items: n
        {
            int32 v
        }
    }
}
";
    assert!(parse(loop_in_if).is_ok());
}

#[test]
fn bit_declarations_draw_from_the_bitset_allocator() {
    let source = "\
data A
{
    bitset32 flags
    bit flags[FIRST]
    bit flags[SECOND]
}
";
    let file = parse(source).unwrap();
    let a = file.symbols.get(file.symbols.lookup("A").unwrap());
    let values: Vec<(String, String)> = a.members[Target::Common]
        .iter()
        .filter(|&&m| matches!(file.arena.get(m).kind, MemberKind::Bit { .. }))
        .map(|&m| {
            let member = file.arena.get(m);
            (member.name.clone(), member.value.clone())
        })
        .collect();
    assert_eq!(
        values,
        vec![
            ("FIRST".to_string(), "0".to_string()),
            ("SECOND".to_string(), "1".to_string())
        ]
    );
}

#[test]
fn bit_on_an_unknown_variable_is_rejected() {
    let err = unwrap_inner(parse("data A\n{\n    bit flags[READY]\n}\n").unwrap_err());
    assert!(matches!(
        err,
        ParseError::UnknownSymbol { what: "bitset variable", .. }
    ));
}

#[test]
fn loop_with_symbolic_parameter_makes_a_const() {
    let source = "\
data A
{
    uint32[8] slots
    loop entries: slots[MAX_ENTRIES]
    {
        int16 v
    }
}
";
    let file = parse(source).unwrap();
    let a = file.symbols.get(file.symbols.lookup("A").unwrap());
    let const_member = a
        .member_by_name(&file.arena, "MAX_ENTRIES")
        .expect("materialized const");
    assert!(matches!(
        file.arena.get(const_member).kind,
        MemberKind::Const(_)
    ));
    // the loop itself nests its body member
    let entries = a.member_by_name(&file.arena, "entries").unwrap();
    assert!(file.arena.find_member(entries, "v").is_some());
}

#[test]
fn public_const_members_carry_visibility() {
    let source = "\
data A
{
    public const int32 LIMIT = 64
    const uint16 innerLimit = 8
}
";
    let file = parse(source).unwrap();
    let a = file.symbols.get(file.symbols.lookup("A").unwrap());
    let limit = a.member_by_name(&file.arena, "LIMIT").unwrap();
    let inner = a.member_by_name(&file.arena, "innerLimit").unwrap();
    assert_eq!(file.arena.get(limit).visibility, Visibility::Public);
    assert_eq!(file.arena.get(inner).visibility, Visibility::Private);
    assert_eq!(file.arena.get(limit).value, "64");
}

#[test]
fn arrays_keep_their_size_in_the_value_slot() {
    let source = "\
data A
{
    uint8[16] digest
    uint32[4] words
}
";
    let file = parse(source).unwrap();
    let a = file.symbols.get(file.symbols.lookup("A").unwrap());
    let digest = a.member_by_name(&file.arena, "digest").unwrap();
    assert_eq!(file.arena.get(digest).value, "16");
    // a byte per element, four bytes per word
    assert_eq!(a.min_size, 16 + 16);
}

#[test]
fn unknown_member_type_is_rejected() {
    let err = unwrap_inner(parse("data A\n{\n    quaternion q\n}\n").unwrap_err());
    assert!(err.to_string().contains("unknown member type"));
}

#[test]
fn inheritance_arity_is_validated() {
    let source = "\
template<K,V>
abstract Table
{
}
data Ints : Table<int32>
{
}
";
    let err = unwrap_inner(parse(source).unwrap_err());
    assert!(matches!(
        err,
        ParseError::TemplateArity {
            expected: 2,
            found: 1,
            ..
        }
    ));
}

#[test]
fn inheriting_an_unknown_class_is_rejected() {
    let err = unwrap_inner(parse("data A : Missing\n{\n}\n").unwrap_err());
    assert!(matches!(
        err,
        ParseError::UnknownSymbol { what: "class", .. }
    ));
}

#[test]
fn reference_member_gets_a_shadow_identifier() {
    let source = "\
data Target
{
    identifier int32 uid
}
data Holder
{
    Target& target
}
";
    let file = parse(source).unwrap();
    let holder = file.symbols.get(file.symbols.lookup("Holder").unwrap());
    let reference = holder.member_by_name(&file.arena, "target").unwrap();
    match &file.arena.get(reference).kind {
        MemberKind::CustomRef { shadow, ref_data, .. } => {
            let shadow = shadow.expect("shadow member");
            assert_eq!(file.arena.get(shadow).name, "targetId");
            assert!(ref_data.is_some());
        }
        other => panic!("expected a reference member, got {other:?}"),
    }
    // satisfied late, through the manager lookup
    assert_eq!(holder.finalizers.len(), 1);
    assert_eq!(file.pre_classes, vec!["TargetData"]);
}

#[test]
fn reference_to_an_unknown_class_is_rejected() {
    let err = unwrap_inner(parse("data A\n{\n    Missing& other\n}\n").unwrap_err());
    assert!(matches!(
        err,
        ParseError::UnknownSymbol { .. } | ParseError::Model(_)
    ));
}

#[test]
fn initializers_mark_open_template_values() {
    let source = "\
template<T>
abstract Base
{
    int32 capacity = T
    int32 fixed = 8
}
";
    let file = parse(source).unwrap();
    let base = file.symbols.get(file.symbols.lookup("Base").unwrap());
    assert_eq!(base.initializers.len(), 2);
    let capacity = base.member_by_name(&file.arena, "capacity").unwrap();
    let fixed = base.member_by_name(&file.arena, "fixed").unwrap();
    assert_eq!(file.arena.get(capacity).value, "<T>");
    assert_eq!(file.arena.get(fixed).value, "8");
}

#[test]
fn specialization_records_its_own_identifier_entry() {
    let source = "\
template<K,V>
abstract Registry
{
    identifier int32 uid
    @identifier manager=(genericRegistry) method=(findByKey,$id)
}
template<>
data Registry<int32,string>
{
    @identifier manager=(stringRegistry) method=(*findByKey,$id)
}
";
    let file = parse(source).unwrap();
    let registry = file.symbols.get(file.symbols.lookup("Registry").unwrap());
    let meta = &registry.identifier_meta[Target::Common];

    assert_eq!(meta.default_entry.manager, "genericRegistry");
    assert_eq!(meta.lookup("int32,string").manager, "stringRegistry");
    assert_eq!(meta.lookup("int32,string").method, "*findByKey");
    // any other pair resolves to the default entry
    assert_eq!(meta.lookup("float,float").manager, "genericRegistry");
    assert_eq!(meta.lookup("int32,string").params, vec!["$id"]);
}

#[test]
fn annotation_with_multiple_groups_parses_each() {
    let source = "\
data A
{
    identifier int32 uid
    @identifier headers=(\"registry.h\",\"manager.h\") manager=(registry) method=(find,$id,kind)
    int32 kind
}
";
    let file = parse(source).unwrap();
    let a = file.symbols.get(file.symbols.lookup("A").unwrap());
    let entry = &a.identifier_meta[Target::Common].default_entry;
    assert_eq!(entry.headers, vec!["registry.h", "manager.h"]);
    assert_eq!(entry.manager, "registry");
    assert_eq!(entry.method, "find");
    assert_eq!(entry.params, vec!["$id", "kind"]);
}

#[test]
fn typedef_registers_value_array_and_reference_kinds() {
    let source = "\
typedef Color
{
    header <game/color.h>
    class Color
}
data Sprite
{
    Color tint
    Color[] palette
}
";
    let file = parse(source).unwrap();
    let sprite = file.symbols.get(file.symbols.lookup("Sprite").unwrap());
    let tint = sprite.member_by_name(&file.arena, "tint").unwrap();
    let palette = sprite.member_by_name(&file.arena, "palette").unwrap();
    assert!(matches!(file.arena.get(tint).kind, MemberKind::Custom(_)));
    assert!(matches!(
        file.arena.get(palette).kind,
        MemberKind::CustomArray(_)
    ));
    // the typedef's header reaches the generated file
    assert!(file.includes[Target::Common]
        .header
        .contains(&"<game/color.h>".to_string()));
}

#[test]
fn comments_and_blank_lines_are_ignored_everywhere() {
    let source = "\
# leading comment
data A
{
    # a comment inside the body

    int32 x # trailing comment
}
";
    let file = parse(source).unwrap();
    assert_eq!(member_names(&file, "A", Target::Common), vec!["x"]);
}
