//! # Ergon Core Contract Primitives
//!
//! Foundations shared by every entity contract in the Ergon
//! occupational-health platform: opaque identifiers, tolerant date
//! strings, pagination, authoring metadata, the success envelope,
//! polymorphic references, violation collection, field-descriptor
//! tables, and the legacy-vocabulary upgrade boundary.
//!
//! Everything here is a pure, synchronous validation or transformation
//! over an in-memory value. There is no I/O, no shared mutable state,
//! and no runtime configuration; descriptor tables are `static` and
//! immutable for the life of the process.

pub mod authoring;
pub mod descriptor;
pub mod envelope;
pub mod id;
pub mod legacy;
pub mod normalize;
pub mod pagination;
pub mod persisted;
pub mod reference;
pub mod temporal;
pub mod validate;

pub use authoring::{Authoring, Modification};
pub use descriptor::{EntityDescriptor, FieldRole, FieldSpec, SchemaVariant};
pub use envelope::ApiResponse;
pub use id::{InvalidId, ObjectId, OBJECT_ID_LEN};
pub use normalize::Normalize;
pub use pagination::{Pagination, SortOrder};
pub use persisted::Persisted;
pub use reference::Reference;
pub use temporal::{DateString, InvalidDateString};
pub use validate::{Validate, ValidationError, Violation, Violations};
