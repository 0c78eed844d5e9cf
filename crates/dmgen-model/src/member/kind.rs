//! The closed member-type catalog.
//!
//! One variant per kind the DSL can declare; every emission site matches
//! exhaustively so adding a kind is a compile-visible change.

use crate::data::DataId;
use crate::error::ModelError;
use crate::member::MemberId;

/// Integer type of a `const <type>` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstKind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
}

impl ConstKind {
    pub fn from_type_name(name: &str) -> Option<ConstKind> {
        match name {
            "int8" => Some(ConstKind::Int8),
            "uint8" => Some(ConstKind::UInt8),
            "int16" => Some(ConstKind::Int16),
            "uint16" => Some(ConstKind::UInt16),
            "int32" => Some(ConstKind::Int32),
            "uint32" => Some(ConstKind::UInt32),
            _ => None,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            ConstKind::Int8 => "const int8",
            ConstKind::UInt8 => "const uint8",
            ConstKind::Int16 => "const int16",
            ConstKind::UInt16 => "const uint16",
            ConstKind::Int32 => "const int32",
            ConstKind::UInt32 => "const uint32",
        }
    }

    pub fn out_type_name(self) -> &'static str {
        match self {
            ConstKind::Int8 => "int8_t",
            ConstKind::UInt8 => "uint8_t",
            ConstKind::Int16 => "int16_t",
            ConstKind::UInt16 => "uint16_t",
            ConstKind::Int32 => "int32_t",
            ConstKind::UInt32 => "uint32_t",
        }
    }
}

/// One generic parameter of a custom member: the parameter name from the
/// declaring class, the supplied value, and whether that value is final
/// or still names an open generic of the enclosing class.
#[derive(Debug, Clone, Default)]
pub struct TemplateSlot {
    pub name: String,
    pub value: String,
    pub resolved: bool,
}

/// State shared by the custom (user/typedef) member kinds: the declared
/// type name, the generated type name, the headers the generated code
/// must include, and the generic parameter slots.
#[derive(Debug, Clone, Default)]
pub struct CustomMember {
    pub type_name: String,
    pub out_type_name: String,
    pub headers: Vec<String>,
    pub templates: Vec<TemplateSlot>,
}

impl CustomMember {
    /// Declare the generic parameter names (values still unbound).
    pub fn set_templates_args(&mut self, args: &[String]) {
        self.templates = args
            .iter()
            .map(|a| TemplateSlot {
                name: a.clone(),
                value: String::new(),
                resolved: false,
            })
            .collect();
    }

    pub fn set_template(
        &mut self,
        index: usize,
        value: &str,
        resolved: bool,
    ) -> Result<(), ModelError> {
        let type_name = self.type_name.clone();
        let slot = self
            .templates
            .get_mut(index)
            .ok_or(ModelError::TemplateIndex { type_name, index })?;
        slot.value = value.to_string();
        slot.resolved = resolved;
        Ok(())
    }

    /// Comma-joined template values, the key identifier-metadata
    /// specializations are looked up by.
    pub fn template_key(&self) -> String {
        self.templates
            .iter()
            .map(|t| t.value.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Every member kind the DSL can declare.
#[derive(Debug, Clone)]
pub enum MemberKind {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    Str,
    BitSet16 { next_bit: u32 },
    BitSet32 { next_bit: u32 },
    BitSet64 { next_bit: u32 },
    ArrayUInt8 { next_id: u32 },
    ArrayUInt32 { next_id: u32 },
    Loop {
        var: Option<MemberId>,
        param: Option<MemberId>,
        children: Vec<MemberId>,
    },
    If {
        var: Option<MemberId>,
        param: Option<MemberId>,
        children: Vec<MemberId>,
    },
    Bit { var: Option<MemberId> },
    Immediate,
    Const(ConstKind),
    Custom(CustomMember),
    CustomArray(CustomMember),
    CustomRef {
        custom: CustomMember,
        ref_data: Option<DataId>,
        /// The encoded-id companion member, owned and emitted exclusively
        /// by this reference member.
        shadow: Option<MemberId>,
    },
}

impl MemberKind {
    /// The DSL-side type name.
    pub fn type_name(&self) -> String {
        match self {
            MemberKind::Bool => "bool".into(),
            MemberKind::Int8 => "int8".into(),
            MemberKind::UInt8 => "uint8".into(),
            MemberKind::Int16 => "int16".into(),
            MemberKind::UInt16 => "uint16".into(),
            MemberKind::Int32 => "int32".into(),
            MemberKind::UInt32 => "uint32".into(),
            MemberKind::Int64 => "int64".into(),
            MemberKind::UInt64 => "uint64".into(),
            MemberKind::Float => "float".into(),
            MemberKind::Double => "double".into(),
            MemberKind::Str => "string".into(),
            MemberKind::BitSet16 { .. } => "bitset16".into(),
            MemberKind::BitSet32 { .. } => "bitset32".into(),
            MemberKind::BitSet64 { .. } => "bitset64".into(),
            MemberKind::ArrayUInt8 { .. } => "uint8[]".into(),
            MemberKind::ArrayUInt32 { .. } => "uint32[]".into(),
            MemberKind::Loop { .. } => "loop".into(),
            MemberKind::If { .. } => "if".into(),
            MemberKind::Bit { .. } => "bit".into(),
            MemberKind::Immediate => "immediate".into(),
            MemberKind::Const(k) => k.type_name().into(),
            MemberKind::Custom(c) => c.type_name.clone(),
            MemberKind::CustomArray(c) => format!("{}[]", c.type_name),
            MemberKind::CustomRef { custom, .. } => format!("{}&", custom.type_name),
        }
    }

    /// The generated-code type name.
    pub fn out_type_name(&self) -> String {
        match self {
            MemberKind::Bool => "bool".into(),
            MemberKind::Int8 => "int8_t".into(),
            MemberKind::UInt8 => "uint8_t".into(),
            MemberKind::Int16 => "int16_t".into(),
            MemberKind::UInt16 => "uint16_t".into(),
            MemberKind::Int32 => "int32_t".into(),
            MemberKind::UInt32 => "uint32_t".into(),
            MemberKind::Int64 => "int64_t".into(),
            MemberKind::UInt64 => "uint64_t".into(),
            MemberKind::Float => "float".into(),
            MemberKind::Double => "double".into(),
            MemberKind::Str => "std::string".into(),
            MemberKind::BitSet16 { .. } => "BitSet16".into(),
            MemberKind::BitSet32 { .. } => "BitSet32".into(),
            MemberKind::BitSet64 { .. } => "BitSet64".into(),
            MemberKind::ArrayUInt8 { .. } => "uint8_t".into(),
            MemberKind::ArrayUInt32 { .. } => "uint32_t".into(),
            MemberKind::Loop { .. } | MemberKind::If { .. } => String::new(),
            MemberKind::Bit { .. } => "uint32_t".into(),
            MemberKind::Immediate => String::new(),
            MemberKind::Const(k) => k.out_type_name().into(),
            MemberKind::Custom(c) => c.out_type_name.clone(),
            MemberKind::CustomArray(c) => format!("std::vector<{}>", c.out_type_name),
            MemberKind::CustomRef { custom, .. } => format!("const {}*", custom.out_type_name),
        }
    }

    /// Method invoked on the input stream to read this member.
    pub fn read_method(&self) -> &'static str {
        match self {
            MemberKind::Bool => "readBool",
            MemberKind::Int8 => "readInt8",
            MemberKind::UInt8 => "readUInt8",
            MemberKind::Int16 => "readInt16",
            MemberKind::UInt16 => "readUInt16",
            MemberKind::Int32 => "readInt32",
            MemberKind::UInt32 => "readUInt32",
            MemberKind::Int64 => "readInt64",
            MemberKind::UInt64 => "readUInt64",
            MemberKind::Float => "readFloat",
            MemberKind::Double => "readDouble",
            MemberKind::Str => "readString",
            MemberKind::BitSet16 { .. } => "readUInt16",
            MemberKind::BitSet32 { .. } => "readUInt32",
            MemberKind::BitSet64 { .. } => "readUInt64",
            MemberKind::ArrayUInt8 { .. } | MemberKind::ArrayUInt32 { .. } => "read",
            MemberKind::Custom(_) | MemberKind::CustomArray(_) | MemberKind::CustomRef { .. } => {
                "readFromFile"
            }
            _ => "",
        }
    }

    /// Method invoked on the output stream to write this member.
    pub fn write_method(&self) -> &'static str {
        match self {
            MemberKind::Bool => "writeBool",
            MemberKind::Int8 => "writeInt8",
            MemberKind::UInt8 => "writeUInt8",
            MemberKind::Int16 => "writeInt16",
            MemberKind::UInt16 => "writeUInt16",
            MemberKind::Int32 => "writeInt32",
            MemberKind::UInt32 => "writeUInt32",
            MemberKind::Int64 => "writeInt64",
            MemberKind::UInt64 => "writeUInt64",
            MemberKind::Float => "writeFloat",
            MemberKind::Double => "writeDouble",
            MemberKind::Str => "writeString",
            MemberKind::BitSet16 { .. } => "writeUInt16",
            MemberKind::BitSet32 { .. } => "writeUInt32",
            MemberKind::BitSet64 { .. } => "writeUInt64",
            MemberKind::ArrayUInt8 { .. } | MemberKind::ArrayUInt32 { .. } => "write",
            MemberKind::Custom(_) | MemberKind::CustomArray(_) | MemberKind::CustomRef { .. } => {
                "writeToFile"
            }
            _ => "",
        }
    }

    /// Minimum encoded size in bytes. `value` is the member's value slot
    /// (fixed arrays keep their element count there).
    pub fn min_size(&self, value: &str) -> u32 {
        match self {
            MemberKind::Bool | MemberKind::Int8 | MemberKind::UInt8 => 1,
            MemberKind::Int16 | MemberKind::UInt16 | MemberKind::BitSet16 { .. } => 2,
            MemberKind::Int32
            | MemberKind::UInt32
            | MemberKind::Float
            | MemberKind::BitSet32 { .. } => 4,
            MemberKind::Int64
            | MemberKind::UInt64
            | MemberKind::Double
            | MemberKind::BitSet64 { .. } => 8,
            MemberKind::Str => 2,
            MemberKind::ArrayUInt8 { .. } => value.parse().unwrap_or(0),
            MemberKind::ArrayUInt32 { .. } => 4 * value.parse::<u32>().unwrap_or(0),
            MemberKind::Custom(_) => 2,
            MemberKind::CustomArray(_) => 4,
            // encoded as the shadow int32 identifier
            MemberKind::CustomRef { .. } => 4,
            MemberKind::Loop { .. }
            | MemberKind::If { .. }
            | MemberKind::Bit { .. }
            | MemberKind::Immediate
            | MemberKind::Const(_) => 0,
        }
    }

    /// Generated-code expression for the member's encoded size.
    pub fn size_of(&self, name: &str, value: &str) -> String {
        match self {
            MemberKind::Str => format!("{name}.length() + 2"),
            MemberKind::ArrayUInt8 { .. } => value.to_string(),
            MemberKind::ArrayUInt32 { .. } => format!("{value} * 4"),
            MemberKind::Custom(_) => format!("{name}.sizeOf()"),
            MemberKind::CustomArray(_) => format!("{name}.size() + 4"),
            MemberKind::CustomRef { .. } => "4".into(),
            _ => self.min_size(value).to_string(),
        }
    }

    /// Headers the generated code needs for this member.
    pub fn headers(&self) -> Vec<String> {
        match self {
            MemberKind::Str => vec!["<string>".into()],
            MemberKind::BitSet16 { .. } | MemberKind::BitSet32 { .. } | MemberKind::BitSet64 { .. } => {
                vec!["<dm/bitset.h>".into()]
            }
            MemberKind::ArrayUInt8 { .. } | MemberKind::ArrayUInt32 { .. } => {
                vec!["<cstring>".into()]
            }
            MemberKind::Custom(c) | MemberKind::CustomRef { custom: c, .. } => c.headers.clone(),
            MemberKind::CustomArray(c) => {
                let mut h = c.headers.clone();
                h.push("<vector>".into());
                h
            }
            _ => Vec::new(),
        }
    }

    /// Condition fragment appended to the variable name in a generated
    /// `if`: how this kind tests the bit/slot named by `param`.
    pub fn if_test(&self, param: Option<&str>) -> String {
        match self {
            MemberKind::BitSet16 { .. } | MemberKind::BitSet32 { .. } | MemberKind::BitSet64 { .. } => {
                format!(".getBit({})", param.unwrap_or("0"))
            }
            MemberKind::ArrayUInt8 { .. } | MemberKind::ArrayUInt32 { .. } => {
                format!("[{}]", param.unwrap_or("0"))
            }
            _ => match param {
                Some(p) => format!("[{p}] != 0"),
                None => " != 0".into(),
            },
        }
    }

    /// Assignment fragment appended to the variable name to set or clear
    /// the bit/slot named by `param`.
    pub fn set_to(&self, param: Option<&str>, value: bool) -> String {
        match self {
            MemberKind::BitSet16 { .. } | MemberKind::BitSet32 { .. } | MemberKind::BitSet64 { .. } => {
                let method = if value { "enable" } else { "disable" };
                format!(".{}({})", method, param.unwrap_or("0"))
            }
            _ => {
                let v = if value { 1 } else { 0 };
                match param {
                    Some(p) => format!("[{p}] = {v}"),
                    None => format!(" = {v}"),
                }
            }
        }
    }

    /// Reference-style members are passed and returned by reference.
    pub fn is_ref(&self) -> bool {
        matches!(
            self,
            MemberKind::Str
                | MemberKind::ArrayUInt8 { .. }
                | MemberKind::ArrayUInt32 { .. }
                | MemberKind::CustomArray(_)
                | MemberKind::CustomRef { .. }
        )
    }

    /// Extra indentation this member imposes on its children.
    pub fn indent_step(&self) -> usize {
        match self {
            MemberKind::Loop { .. } | MemberKind::If { .. } => 1,
            _ => 0,
        }
    }

    pub fn children(&self) -> Option<&[MemberId]> {
        match self {
            MemberKind::Loop { children, .. } | MemberKind::If { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<MemberId>> {
        match self {
            MemberKind::Loop { children, .. } | MemberKind::If { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn custom(&self) -> Option<&CustomMember> {
        match self {
            MemberKind::Custom(c)
            | MemberKind::CustomArray(c)
            | MemberKind::CustomRef { custom: c, .. } => Some(c),
            _ => None,
        }
    }

    pub fn custom_mut(&mut self) -> Option<&mut CustomMember> {
        match self {
            MemberKind::Custom(c)
            | MemberKind::CustomArray(c)
            | MemberKind::CustomRef { custom: c, .. } => Some(c),
            _ => None,
        }
    }

    /// Bind a template value on a custom member; no-op for kinds without
    /// generic parameters.
    pub fn set_template(
        &mut self,
        index: usize,
        value: &str,
        resolved: bool,
    ) -> Result<(), ModelError> {
        match self.custom_mut() {
            Some(c) => c.set_template(index, value, resolved),
            None => Ok(()),
        }
    }

    /// Name of the declared type's generic parameter at `index`.
    pub fn template_name(&self, index: usize) -> Option<&str> {
        self.custom()
            .and_then(|c| c.templates.get(index))
            .map(|t| t.name.as_str())
    }

    pub(crate) fn next_uint_id(&mut self) -> u32 {
        match self {
            MemberKind::BitSet16 { next_bit }
            | MemberKind::BitSet32 { next_bit }
            | MemberKind::BitSet64 { next_bit } => {
                let id = *next_bit;
                *next_bit += 1;
                id
            }
            MemberKind::ArrayUInt8 { next_id } | MemberKind::ArrayUInt32 { next_id } => {
                let id = *next_id;
                *next_id += 1;
                id
            }
            _ => 0,
        }
    }
}
