//! Template files.
//!
//! Eight template kinds drive emission. A built-in set covers the common
//! case; a configured template directory overrides it file by file using
//! the conventional names.

use std::fs;
use std::path::Path;

use crate::error::EmitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    License,
    Header,
    Impl,
    ReaderClass,
    ReaderImpl,
    ReaderUserImpl,
    WriterClass,
    WriterImpl,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 8] = [
        TemplateKind::License,
        TemplateKind::Header,
        TemplateKind::Impl,
        TemplateKind::ReaderClass,
        TemplateKind::ReaderImpl,
        TemplateKind::ReaderUserImpl,
        TemplateKind::WriterClass,
        TemplateKind::WriterImpl,
    ];

    /// Conventional file name inside a template directory.
    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::License => "license.template",
            TemplateKind::Header => "hpp.template",
            TemplateKind::Impl => "cpp.template",
            TemplateKind::ReaderClass => "data.reader.class.template",
            TemplateKind::ReaderImpl => "data.reader.impl.template",
            TemplateKind::ReaderUserImpl => "data.reader.user.impl.template",
            TemplateKind::WriterClass => "data.writer.class.template",
            TemplateKind::WriterImpl => "data.writer.impl.template",
        }
    }

    fn index(self) -> usize {
        TemplateKind::ALL
            .iter()
            .position(|k| *k == self)
            .unwrap_or(0)
    }
}

/// The loaded template lines per kind.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    lines: [Vec<String>; 8],
}

impl TemplateSet {
    /// The built-in default templates.
    pub fn builtin() -> Self {
        let mut set = Self {
            lines: Default::default(),
        };
        set.set(TemplateKind::License, BUILTIN_LICENSE);
        set.set(TemplateKind::Header, BUILTIN_HEADER);
        set.set(TemplateKind::Impl, BUILTIN_IMPL);
        set.set(TemplateKind::ReaderClass, BUILTIN_READER_CLASS);
        set.set(TemplateKind::ReaderImpl, BUILTIN_READER_IMPL);
        set.set(TemplateKind::ReaderUserImpl, BUILTIN_READER_USER_IMPL);
        set.set(TemplateKind::WriterClass, BUILTIN_WRITER_CLASS);
        set.set(TemplateKind::WriterImpl, BUILTIN_WRITER_IMPL);
        set
    }

    /// Load every template from `dir` by its conventional name.
    pub fn load(dir: &Path) -> Result<Self, EmitError> {
        let mut set = Self {
            lines: Default::default(),
        };
        for kind in TemplateKind::ALL {
            let path = dir.join(kind.file_name());
            let text = fs::read_to_string(&path).map_err(|e| EmitError::TemplateRead {
                name: kind.file_name().to_string(),
                source: e,
            })?;
            set.lines[kind.index()] = text.lines().map(str::to_string).collect();
        }
        Ok(set)
    }

    pub fn get(&self, kind: TemplateKind) -> &[String] {
        &self.lines[kind.index()]
    }

    pub fn set(&mut self, kind: TemplateKind, text: &str) {
        self.lines[kind.index()] = text.lines().map(str::to_string).collect();
    }
}

const BUILTIN_LICENSE: &str = "\
/*
 * Generated data model. Edit the source schema, not this file.
 */";

const BUILTIN_HEADER: &str = "\
@{license}

/**
 * @file ${header}.${hpp}
 * @author ${author}
 * @date ${yyyy}-${mm}-${dd}
 */

#ifndef _${NS}_${FILENAME}_${HPP}
#define _${NS}_${FILENAME}_${HPP}

@{includes}

namespace ${ns} {

@{content}
} // namespace ${ns}

#endif // _${NS}_${FILENAME}_${HPP}";

const BUILTIN_IMPL: &str = "\
@{license}

#include \"${header}.${hpp}\"

@{includes}

using namespace ${ns};

@{content}";

const BUILTIN_READER_CLASS: &str = "\
class ${data}Data${baseclasses}
{
public:

    static const uint32_t DATA_ID = ${dataId};

    ${data}Data()
    {
@{initializers}
    }

    void readFromFile(InStream &is);
    void finalize();

@{getters}
@{public_members}
private:

@{private_members}
};";

const BUILTIN_READER_IMPL: &str = "\
void ${data}Data::readFromFile(InStream &is)
{
@{readFromFile}
}

void ${data}Data::finalize()
{
@{finalize}
}";

const BUILTIN_READER_USER_IMPL: &str = "\
// Hand-editable extensions for ${data}Data.
// Generated once; this file is yours and is never overwritten.";

const BUILTIN_WRITER_CLASS: &str = "\
class ${data}Data${baseclasses}
{
public:

    static const uint32_t DATA_ID = ${dataId};

    ${data}Data()
    {
@{initializers}
    }

    void writeToFile(OutStream &os) const;

@{getters}
@{setters}
@{public_members}
private:

@{private_members}
};";

const BUILTIN_WRITER_IMPL: &str = "\
void ${data}Data::writeToFile(OutStream &os) const
{
@{writeToFile}
}";
