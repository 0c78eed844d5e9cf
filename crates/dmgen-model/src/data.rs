//! Class symbols and the per-source-file parse product.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::member::{MemberArena, MemberId};
use crate::state::PassState;
use crate::target::{PerTarget, Target};

/// Index of a class in its file's [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataId(u32);

impl DataId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A generic parameter bound at an inheritance site: parameter name,
/// supplied value, and whether the value is final or deferred to the
/// child's own parameters.
#[derive(Debug, Clone, Default)]
pub struct TemplateParam {
    pub name: String,
    pub value: String,
    pub resolved: bool,
}

/// How a referenced object is looked up through its manager at
/// finalize time.
#[derive(Debug, Clone, Default)]
pub struct IdentifierEntry {
    /// Manager-object expression the lookup method is invoked on.
    pub manager: String,
    /// Lookup method; a leading `*` selects `->` invocation.
    pub method: String,
    /// Call parameters: `$id` for the identifier value itself, a generic
    /// parameter name, or a member name.
    pub params: Vec<String>,
    /// Headers the implementation file must include for the lookup.
    pub headers: Vec<String>,
}

/// Identifier metadata for one target: a default entry plus entries
/// specialized by comma-joined template-argument values.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMeta {
    pub default_entry: IdentifierEntry,
    pub specialized: IndexMap<String, IdentifierEntry>,
}

impl IdentifierMeta {
    /// The entry for exactly `key` (comma-joined argument values), or the
    /// default entry.
    pub fn lookup(&self, key: &str) -> &IdentifierEntry {
        self.specialized.get(key).unwrap_or(&self.default_entry)
    }

    pub fn entry_mut(&mut self, key: Option<&str>) -> &mut IdentifierEntry {
        match key {
            Some(k) => self.specialized.entry(k.to_string()).or_default(),
            None => &mut self.default_entry,
        }
    }
}

/// A schema-level class declaration.
#[derive(Debug, Clone)]
pub struct Data {
    pub name: String,
    /// Generated class id; `None` until assigned by the project pass.
    pub id: Option<u32>,
    pub state: PassState,
    /// Abstract classes are never emitted.
    pub abstract_: bool,
    pub is_template: bool,
    /// 0 when declared in the root file; >0 when reached via imports.
    pub import_level: u32,
    /// Sum of the minimum encoded sizes of the declared members.
    pub min_size: u32,
    /// Exclusive single-parent link.
    pub direct_inherit: Option<DataId>,
    /// Ordered generic parameter names.
    pub templates_args: Vec<String>,
    /// Parameter bindings populated at an inheritance site.
    pub templates_params: Vec<TemplateParam>,
    /// Declared members per target.
    pub members: PerTarget<Vec<MemberId>>,
    /// The unique identifying member, if declared.
    pub identifier: Option<MemberId>,
    /// Members needing the late resolution pass.
    pub finalizers: Vec<MemberId>,
    /// Members carrying a default value.
    pub initializers: Vec<MemberId>,
    /// Declared-only members taken over from a shared parent.
    pub externs: Vec<MemberId>,
    pub statics: Vec<MemberId>,
    /// Identifier lookup settings per target.
    pub identifier_meta: PerTarget<IdentifierMeta>,
}

impl Data {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            state: PassState::Unregistered,
            abstract_: false,
            is_template: false,
            import_level: 0,
            min_size: 0,
            direct_inherit: None,
            templates_args: Vec::new(),
            templates_params: Vec::new(),
            members: PerTarget::default(),
            identifier: None,
            finalizers: Vec::new(),
            initializers: Vec::new(),
            externs: Vec::new(),
            statics: Vec::new(),
            identifier_meta: PerTarget::default(),
        }
    }

    /// Search every target list for a top-level member named `name`.
    pub fn member_by_name(&self, arena: &MemberArena, name: &str) -> Option<MemberId> {
        for target in Target::ALL {
            for &id in &self.members[target] {
                if arena.get(id).name == name {
                    return Some(id);
                }
            }
        }
        None
    }
}

/// Class name → [`Data`], in declaration order.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<Data>,
    index: IndexMap<String, DataId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, data: Data) -> DataId {
        let id = DataId(self.entries.len() as u32);
        self.index.insert(data.name.clone(), id);
        self.entries.push(data);
        id
    }

    pub fn lookup(&self, name: &str) -> Option<DataId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, id: DataId) -> &Data {
        &self.entries[id.index()]
    }

    pub fn get_mut(&mut self, id: DataId) -> &mut Data {
        &mut self.entries[id.index()]
    }

    pub fn ids(&self) -> Vec<DataId> {
        (0..self.entries.len() as u32).map(DataId).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Data> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Data> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which generated file a header belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Header,
    Impl,
}

/// Accumulated include directives for one target.
#[derive(Debug, Clone, Default)]
pub struct IncludeSet {
    pub header: Vec<String>,
    pub impl_: Vec<String>,
}

impl IncludeSet {
    fn list_mut(&mut self, kind: FileKind) -> &mut Vec<String> {
        match kind {
            FileKind::Header => &mut self.header,
            FileKind::Impl => &mut self.impl_,
        }
    }

    pub fn list(&self, kind: FileKind) -> &[String] {
        match kind {
            FileKind::Header => &self.header,
            FileKind::Impl => &self.impl_,
        }
    }
}

/// Everything parsed out of one root source file, ready for the project
/// pass and emission.
#[derive(Debug)]
pub struct ModelFile {
    /// Path of the root source file.
    pub path: PathBuf,
    /// Sub-directory of the input tree the file was found in ("" at the
    /// root); mirrored below the output directories.
    pub dir: String,
    /// File stem, which is also the generated file prefix.
    pub name: String,
    /// Run of `../` from the file's directory back to the input root.
    pub rel_path: String,
    pub symbols: SymbolTable,
    pub arena: MemberArena,
    /// Stems of imported files, as output-relative header paths.
    pub imports: Vec<String>,
    pub includes: PerTarget<IncludeSet>,
    /// Classes needing a predeclaration in the generated header.
    pub pre_classes: Vec<String>,
    /// Classes referenced through `&` members; their identifier-metadata
    /// headers flow into the implementation includes at resolve time.
    pub ref_classes: Vec<DataId>,
}

impl ModelFile {
    pub fn new(path: PathBuf, dir: String, name: String, rel_path: String) -> Self {
        Self {
            path,
            dir,
            name,
            rel_path,
            symbols: SymbolTable::new(),
            arena: MemberArena::new(),
            imports: Vec::new(),
            includes: PerTarget::default(),
            pre_classes: Vec::new(),
            ref_classes: Vec::new(),
        }
    }

    /// True when the file declares at least one concrete root-level
    /// class; files without one produce no output at all.
    pub fn has_concrete_root(&self) -> bool {
        self.symbols
            .iter()
            .any(|d| !d.abstract_ && d.import_level == 0)
    }

    /// Record headers for `target`/`kind`, skipping duplicates.
    pub fn update_headers(&mut self, target: Target, kind: FileKind, headers: &[String]) {
        let list = self.includes[target].list_mut(kind);
        for header in headers {
            if !list.iter().any(|h| h == header) {
                list.push(header.clone());
            }
        }
    }

    /// Record a class predeclaration, skipping duplicates.
    pub fn update_classes(&mut self, class_name: &str) {
        if !self.pre_classes.iter().any(|c| c == class_name) {
            self.pre_classes.push(class_name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_meta_specialization_lookup() {
        let mut meta = IdentifierMeta::default();
        meta.default_entry.manager = "registry".into();
        let entry = meta.entry_mut(Some("int32,uint32"));
        entry.manager = "intRegistry".into();

        assert_eq!(meta.lookup("int32,uint32").manager, "intRegistry");
        // any other pair falls back to the default entry
        assert_eq!(meta.lookup("float,float").manager, "registry");
        assert_eq!(meta.lookup("").manager, "registry");
    }

    #[test]
    fn headers_deduplicate() {
        let mut file = ModelFile::new(PathBuf::from("a.dmg"), String::new(), "a".into(), String::new());
        let headers = vec!["<string>".to_string(), "<string>".to_string()];
        file.update_headers(Target::Common, FileKind::Header, &headers);
        file.update_headers(Target::Common, FileKind::Header, &headers);
        assert_eq!(file.includes[Target::Common].header, vec!["<string>"]);
    }

    #[test]
    fn symbol_table_preserves_declaration_order() {
        let mut table = SymbolTable::new();
        table.insert(Data::new("B"));
        table.insert(Data::new("A"));
        let names: Vec<_> = table.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert!(table.lookup("A").is_some());
        assert!(table.lookup("C").is_none());
    }
}
