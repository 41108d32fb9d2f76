//! Pure mappings from the schema model to framework constructs.

pub mod naming;
pub mod relations;
pub mod types;

pub use relations::{Relation, RelationKind, relations};
pub use types::{CastType, DeclaredType, ForeignKeyAction, StorageType, cast_type, storage_type};
