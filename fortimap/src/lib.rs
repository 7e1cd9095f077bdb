//! fortimap - schema-driven config tree mapping for FortiOS
//!
//! Converts between the hyphen-keyed records the FortiOS REST API speaks and
//! the underscore-keyed, typed records a Terraform provider stores. Each
//! object type is described once as an [`ObjectSchema`]; [`Flattener`] and
//! [`Expander`] interpret it.

// Core modules
pub mod error;
pub mod schema;
pub mod types;

// Mapping engine
pub mod codec;
pub mod expand;
pub mod flatten;
pub mod merge;
pub mod sort;

// Helper modules
pub mod validator;
pub mod version;

// Re-exports for convenience
pub use codec::{FieldCodec, NumericPolicy};
pub use error::{MapError, Result};
pub use expand::{expand, Expander};
pub use flatten::{flatten, Flattener};
pub use merge::{should_flatten_field, MergeMode, TableMergePolicy};
pub use schema::{
    Block, FieldBuilder, FieldShape, FieldSpec, Mkey, ObjectSchema, Optionality, ScalarKind,
    SchemaBuilder,
};
pub use sort::SortMode;
pub use types::{LocalRecord, Record, RemoteRecord, Value};
pub use validator::{validate, Validator};
pub use version::{AvailabilityGate, Version, VersionRange, VersionRangeGate};
