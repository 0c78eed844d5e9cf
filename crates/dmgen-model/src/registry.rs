//! The member factory.
//!
//! Builds a member from its declared type name. Builtin kinds are a fixed
//! table; `data` and `typedef` declarations extend the registry at parse
//! time with value / array / reference prototypes that are cloned on
//! every use.

use indexmap::IndexMap;

use crate::error::ModelError;
use crate::member::{ConstKind, Member, MemberArena, MemberId, MemberKind};

/// Type name → member prototype.
#[derive(Debug, Default)]
pub struct MemberRegistry {
    customs: IndexMap<String, MemberKind>,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) a custom prototype under `type_name`.
    /// Re-registration overwrites: repeated pass-0 sightings of the same
    /// declaration must stay idempotent.
    pub fn register(&mut self, type_name: impl Into<String>, proto: MemberKind) {
        self.customs.insert(type_name.into(), proto);
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.customs.contains_key(type_name) || builtin_kind(type_name).is_some()
    }

    /// Build a member of the kind declared by `type_name` into `arena`.
    pub fn build(
        &self,
        type_name: &str,
        parent: Option<MemberId>,
        arena: &mut MemberArena,
    ) -> Result<MemberId, ModelError> {
        let kind = builtin_kind(type_name)
            .or_else(|| self.customs.get(type_name).cloned())
            .ok_or_else(|| ModelError::UnknownType(type_name.to_string()))?;
        Ok(arena.alloc(Member::new(kind, parent)))
    }
}

fn builtin_kind(type_name: &str) -> Option<MemberKind> {
    let kind = match type_name {
        "bool" => MemberKind::Bool,
        "int8" => MemberKind::Int8,
        "uint8" => MemberKind::UInt8,
        "int16" => MemberKind::Int16,
        "uint16" => MemberKind::UInt16,
        "int32" => MemberKind::Int32,
        "uint32" => MemberKind::UInt32,
        "int64" => MemberKind::Int64,
        "uint64" => MemberKind::UInt64,
        "float" => MemberKind::Float,
        "double" => MemberKind::Double,
        "string" => MemberKind::Str,
        "bitset16" => MemberKind::BitSet16 { next_bit: 0 },
        "bitset32" => MemberKind::BitSet32 { next_bit: 0 },
        "bitset64" => MemberKind::BitSet64 { next_bit: 0 },
        "uint8[]" => MemberKind::ArrayUInt8 { next_id: 0 },
        "uint32[]" => MemberKind::ArrayUInt32 { next_id: 0 },
        "loop" => MemberKind::Loop {
            var: None,
            param: None,
            children: Vec::new(),
        },
        "if" => MemberKind::If {
            var: None,
            param: None,
            children: Vec::new(),
        },
        "bit" => MemberKind::Bit { var: None },
        "immediate" => MemberKind::Immediate,
        _ => {
            let const_type = type_name.strip_prefix("const ")?;
            return ConstKind::from_type_name(const_type).map(MemberKind::Const);
        }
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::CustomMember;

    #[test]
    fn builtin_types_build() {
        let registry = MemberRegistry::new();
        let mut arena = MemberArena::new();
        for name in [
            "bool", "int8", "uint64", "float", "string", "bitset32", "uint8[]", "loop", "if",
            "bit", "immediate", "const uint32",
        ] {
            let id = registry.build(name, None, &mut arena).unwrap();
            assert_eq!(arena.get(id).kind.type_name(), name);
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        let registry = MemberRegistry::new();
        let mut arena = MemberArena::new();
        assert!(matches!(
            registry.build("quaternion", None, &mut arena),
            Err(ModelError::UnknownType(_))
        ));
    }

    #[test]
    fn custom_prototypes_are_cloned_per_build() {
        let mut registry = MemberRegistry::new();
        let mut arena = MemberArena::new();
        registry.register(
            "Vec3",
            MemberKind::Custom(CustomMember {
                type_name: "Vec3".into(),
                out_type_name: "Vec3Data".into(),
                headers: vec!["\"Vec3Data.h\"".into()],
                templates: Vec::new(),
            }),
        );
        let a = registry.build("Vec3", None, &mut arena).unwrap();
        let b = registry.build("Vec3", None, &mut arena).unwrap();
        assert_ne!(a, b);
        assert_eq!(arena.get(b).kind.out_type_name(), "Vec3Data");
        // re-registration is idempotent, not duplicating
        registry.register(
            "Vec3",
            MemberKind::Custom(CustomMember {
                type_name: "Vec3".into(),
                out_type_name: "Vec3Data".into(),
                headers: Vec::new(),
                templates: Vec::new(),
            }),
        );
        assert!(registry.is_registered("Vec3"));
    }
}
