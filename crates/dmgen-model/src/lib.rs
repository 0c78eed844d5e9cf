// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Data/member model for the dmgen schema compiler.
//!
//! This crate holds everything the parser produces and the emission engine
//! consumes:
//!
//! - [`Target`]/[`Profile`] — the Common-plus-profiles axis every member
//!   list is indexed by
//! - [`Member`]/[`MemberKind`] — the closed member-type catalog (~30
//!   kinds), stored in a per-file [`MemberArena`] and linked by id
//! - [`MemberRegistry`] — the factory building members from declared type
//!   names, extended at parse time with custom value/array/reference
//!   prototypes
//! - [`Data`]/[`SymbolTable`]/[`ModelFile`] — class symbols and the
//!   per-source-file parse product
//! - [`CompilerContext`] — the per-run registry, id allocator and
//!   configuration threaded through parsing, resolution and emission

pub mod config;
pub mod context;
pub mod data;
pub mod emit;
pub mod error;
pub mod member;
pub mod registry;
pub mod state;
pub mod target;

pub use config::Config;
pub use context::{CompilerContext, IdAllocator};
pub use data::{
    Data, DataId, FileKind, IdentifierEntry, IdentifierMeta, IncludeSet, ModelFile, SymbolTable,
    TemplateParam,
};
pub use error::ModelError;
pub use member::{Member, MemberArena, MemberId, Visibility};
pub use member::{ConstKind, CustomMember, MemberKind, TemplateSlot};
pub use registry::MemberRegistry;
pub use state::{PassState, StateError};
pub use target::{PerProfile, PerTarget, Profile, Target};
