//! End-to-end emission tests: schema source in, generated text out
//! through a memory sink.

use std::path::Path;

use dmgen_emit::{EmitError, Emitter, MemorySink, OutputSink, TemplateSet};
use dmgen_model::{CompilerContext, Config, ModelFile, Profile};
use dmgen_parser::DataFile;

fn compile(source: &str, configure: impl FnOnce(&mut Config)) -> (CompilerContext, ModelFile) {
    let mut config = Config::default();
    config.author = "jane".into();
    config.year = "2026".into();
    config.month = "08".into();
    config.day = "06".into();
    config.namespaces[Profile::Displayer] = "view".into();
    config.namespaces[Profile::Authority] = "world".into();
    config.namespaces[Profile::Editor] = "tools".into();
    config.build[Profile::Displayer] = true;
    configure(&mut config);

    let mut ctx = CompilerContext::new(config);
    let mut file = DataFile::new(&mut ctx, "", "test.dmg")
        .parse_class_source(source)
        .unwrap();
    dmgen_resolve::finalize_project(&mut ctx, std::slice::from_mut(&mut file)).unwrap();
    (ctx, file)
}

fn emit(ctx: &CompilerContext, file: &ModelFile) -> MemorySink {
    let templates = TemplateSet::builtin();
    let mut sink = MemorySink::new();
    Emitter::new(ctx, &templates, file)
        .write_all(&mut sink)
        .unwrap();
    sink
}

const POINT: &str = "\
data Point
{
    int32 x
    int32 y
}
";

#[test]
fn point_reader_header_declares_fields_and_accessors() {
    let (ctx, file) = compile(POINT, |_| {});
    let sink = emit(&ctx, &file);

    let header = sink.text("testData.h").expect("reader header");
    assert!(header.contains("class PointData"));
    assert!(header.contains("    int32_t x;"));
    assert!(header.contains("    int32_t y;"));
    assert!(header.contains("    int32_t getX() const"));
    assert!(header.contains("    int32_t getY() const"));
    assert!(header.contains("namespace view {"));
    assert!(header.contains("@author jane"));
    assert!(header.contains("2026-08-06"));

    // reading profile: no setters
    assert!(!header.contains("void setX("));

    let point = file.symbols.get(file.symbols.lookup("Point").unwrap());
    assert_eq!(point.min_size, 8);
}

#[test]
fn point_reader_impl_reads_fields_in_declared_order() {
    let (ctx, file) = compile(POINT, |_| {});
    let sink = emit(&ctx, &file);

    let impl_ = sink.text("testData.cpp").expect("reader impl");
    assert!(impl_.contains("void PointData::readFromFile(InStream &is)"));
    let x = impl_.find("    x = is.readInt32();").expect("read x");
    let y = impl_.find("    y = is.readInt32();").expect("read y");
    assert!(x < y, "fields read in declaration order");
}

#[test]
fn editor_profile_emits_a_writer_class() {
    let (ctx, file) = compile(POINT, |config| {
        config.build[Profile::Displayer] = false;
        config.build[Profile::Editor] = true;
    });
    let sink = emit(&ctx, &file);

    let header = sink.text("testData.h").expect("writer header");
    assert!(header.contains("void writeToFile(OutStream &os) const;"));
    assert!(header.contains("void setX(int32_t x_)"));
    assert!(header.contains("namespace tools {"));

    let impl_ = sink.text("testData.cpp").expect("writer impl");
    assert!(impl_.contains("void PointData::writeToFile(OutStream &os) const"));
    assert!(impl_.contains("    os.writeInt32(x);"));
}

#[test]
fn abstract_classes_produce_no_output() {
    let (ctx, file) = compile("abstract Shape\n{\n    int32 kind\n}\n", |_| {});
    let sink = emit(&ctx, &file);
    assert!(sink.files.is_empty());
}

#[test]
fn structural_inheritance_emits_a_base_class_clause() {
    let source = "\
data Shape
{
    identifier int32 id
}
data Circle : Shape
{
    int32 radius
}
";
    let (ctx, file) = compile(source, |_| {});
    let sink = emit(&ctx, &file);

    let header = sink.text("testData.h").unwrap();
    assert!(header.contains("class ShapeData"));
    assert!(header.contains("class CircleData : public ShapeData"));

    // Circle's own member block holds only radius
    let circle_block = &header[header.find("class CircleData").unwrap()..];
    assert!(circle_block.contains("int32_t radius;"));
    assert!(!circle_block.contains("int32_t id;"));

    let impl_ = sink.text("testData.cpp").unwrap();
    assert!(impl_.contains("    ShapeData::readFromFile(is);"));
}

#[test]
fn shared_inheritance_inlines_the_parent_members() {
    let source = "\
abstract Shape
{
    identifier int32 id
}
data Circle : Shape
{
    int32 radius
}
";
    let (ctx, file) = compile(source, |_| {});
    let sink = emit(&ctx, &file);

    let header = sink.text("testData.h").unwrap();
    // the abstract parent never becomes a base class of generated code
    assert!(!header.contains("public ShapeData"));
    assert!(!header.contains("class ShapeData"));
    let circle_block = &header[header.find("class CircleData").unwrap()..];
    assert!(circle_block.contains("int32_t id;"));
    assert!(circle_block.contains("int32_t radius;"));

    let impl_ = sink.text("testData.cpp").unwrap();
    assert!(!impl_.contains("ShapeData::readFromFile"));
    assert!(impl_.contains("    id = is.readInt32();"));
}

#[test]
fn user_impl_scaffold_is_written_once() {
    let (ctx, file) = compile(POINT, |_| {});
    let templates = TemplateSet::builtin();
    let mut sink = MemorySink::new();
    let user_path = Path::new("testData.user.cpp");

    Emitter::new(&ctx, &templates, &file)
        .write_all(&mut sink)
        .unwrap();
    assert!(sink.exists(user_path));

    // a hand-edited scaffold survives the next run untouched
    sink.files
        .insert(user_path.to_path_buf(), vec!["// edited by hand".into()]);
    Emitter::new(&ctx, &templates, &file)
        .write_all(&mut sink)
        .unwrap();
    assert_eq!(sink.text(user_path).unwrap(), "// edited by hand");
}

#[test]
fn conditional_members_read_behind_their_flag() {
    let source = "\
data Packet
{
    bitset32 flags
    if flags[HAS_EXTRA]
    {
        uint16 extra
    }
}
";
    let (ctx, file) = compile(source, |_| {});
    let sink = emit(&ctx, &file);

    let header = sink.text("testData.h").unwrap();
    assert!(header.contains("static const uint32_t HAS_EXTRA = 0;"));

    let impl_ = sink.text("testData.cpp").unwrap();
    assert!(impl_.contains("    if (flags.getBit(HAS_EXTRA))"));
    assert!(impl_.contains("        extra = is.readUInt16();"));
}

#[test]
fn reference_members_finalize_through_the_manager() {
    let source = "\
template<K,V>
abstract Registry
{
    identifier int32 uid
    @identifier manager=(genericRegistry) method=(findByKey,$id)
}
data Holder
{
    Registry<int32,string>& lookup
}
template<>
data Registry<int32,string>
{
    @identifier manager=(stringRegistry) method=(*findByKey,$id)
}
";
    let (ctx, file) = compile(source, |_| {});
    let sink = emit(&ctx, &file);

    let header = sink.text("testData.h").unwrap();
    assert!(header.contains("class RegistryData;"));
    assert!(header.contains("const RegistryData* lookup;"));
    assert!(header.contains("int32_t lookupId;"));
    assert!(header.contains("void setLookupId(int32_t lookup_)") || header.contains("int32_t getLookupId() const"));

    let impl_ = sink.text("testData.cpp").unwrap();
    // the shadow identifier is the encoded form
    assert!(impl_.contains("    lookupId = is.readInt32();"));
    assert!(!impl_.contains("    lookup = is."));
    // the exact specialization wins over the default entry
    assert!(impl_.contains("    lookup = stringRegistry->findByKey(lookupId);"));
}

#[test]
fn default_identifier_entry_serves_other_specializations() {
    let source = "\
template<K,V>
abstract Registry
{
    identifier int32 uid
    @identifier manager=(genericRegistry) method=(findByKey,$id)
}
data Holder
{
    Registry<float,float>& lookup
}
";
    let (ctx, file) = compile(source, |_| {});
    let sink = emit(&ctx, &file);

    let impl_ = sink.text("testData.cpp").unwrap();
    assert!(impl_.contains("    lookup = genericRegistry.findByKey(lookupId);"));
}

#[test]
fn unterminated_block_marker_is_fatal() {
    let (ctx, file) = compile(POINT, |_| {});
    let mut templates = TemplateSet::builtin();
    templates.set(dmgen_emit::TemplateKind::Header, "@{includes\n");

    let mut sink = MemorySink::new();
    let err = Emitter::new(&ctx, &templates, &file)
        .write_all(&mut sink)
        .unwrap_err();
    assert!(matches!(err, EmitError::TemplateFormat { .. }));
}

#[test]
fn include_prefix_rewrites_local_includes() {
    let source = "\
data Holder
{
    identifier int32 uid
    string name
}
";
    let (ctx, file) = compile(source, |config| {
        config.include_paths[Profile::Displayer] = "game/data".into();
    });
    let sink = emit(&ctx, &file);

    let header = sink.text("testData.h").unwrap();
    // headers collected from the string member
    assert!(header.contains("#include <string>"));

    let impl_ = sink.text("testData.cpp").unwrap();
    assert!(impl_.contains("#include \"game/data/testData.h\""));
}
