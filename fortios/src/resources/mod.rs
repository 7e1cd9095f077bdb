//! Concrete FortiOS object types
//!
//! Each module describes one CMDB object as an [`ObjectSchema`] and exposes a
//! lazily built, shared [`ResourceDefinition`].

pub mod firewall_profileprotocoloptions;
pub mod firewall_shapingpolicy;
pub mod report_layout;
pub mod router_multicast;
pub mod system_ike;
pub mod ztna_webproxy;

use crate::resource::ResourceDefinition;
use fortimap::validator::{IntRangeValidator, OneOfValidator, StringLengthValidator};
use fortimap::{FieldBuilder, MapError, ObjectSchema};
use std::sync::{Arc, OnceLock};

pub type DefinitionFn = fn() -> Result<&'static ResourceDefinition, MapError>;

/// Terraform type name to definition, in registration order
pub const REGISTRY: &[(&str, DefinitionFn)] = &[
    (
        firewall_shapingpolicy::TYPE_NAME,
        firewall_shapingpolicy::definition,
    ),
    (
        firewall_profileprotocoloptions::TYPE_NAME,
        firewall_profileprotocoloptions::definition,
    ),
    (router_multicast::TYPE_NAME, router_multicast::definition),
    (system_ike::TYPE_NAME, system_ike::definition),
    (report_layout::TYPE_NAME, report_layout::definition),
    (ztna_webproxy::TYPE_NAME, ztna_webproxy::definition),
];

pub fn lookup(type_name: &str) -> Option<DefinitionFn> {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, definition)| *definition)
}

/// Builds the definition on first use; a schema error is kept and returned on every call
pub(crate) fn cached(
    cell: &'static OnceLock<Result<ResourceDefinition, MapError>>,
    type_name: &'static str,
    schema: fn() -> Result<ObjectSchema, MapError>,
) -> Result<&'static ResourceDefinition, MapError> {
    cell.get_or_init(|| schema().map(|schema| ResourceDefinition::new(type_name, schema)))
        .as_ref()
        .map_err(Clone::clone)
}

/// Table of `{name}` rows, the common way FortiOS references other objects
pub(crate) fn name_table(local_name: &str) -> FieldBuilder {
    FieldBuilder::table(
        local_name,
        vec![FieldBuilder::string("name").validator(max_len(79))],
    )
    .sort_key("name")
}

/// Table of `{id}` rows
pub(crate) fn id_table(local_name: &str) -> FieldBuilder {
    FieldBuilder::table(local_name, vec![FieldBuilder::int("id")]).sort_key("id")
}

pub(crate) fn enable_disable(local_name: &str) -> FieldBuilder {
    FieldBuilder::string(local_name).validator(Arc::new(OneOfValidator::enable_disable()))
}

pub(crate) fn one_of(local_name: &str, allowed: &[&str]) -> FieldBuilder {
    FieldBuilder::string(local_name).validator(Arc::new(OneOfValidator::new(allowed)))
}

pub(crate) fn int_range(local_name: &str, min: i64, max: i64) -> FieldBuilder {
    FieldBuilder::int(local_name).validator(Arc::new(IntRangeValidator {
        min: Some(min),
        max: Some(max),
    }))
}

pub(crate) fn max_len(max: usize) -> Arc<StringLengthValidator> {
    Arc::new(StringLengthValidator {
        min: None,
        max: Some(max),
    })
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_schema_builds() {
        for (type_name, definition) in REGISTRY {
            let definition = definition().unwrap_or_else(|e| panic!("{}: {}", type_name, e));
            assert_eq!(definition.type_name, *type_name);
            assert!(!definition.schema.block.fields.is_empty());
        }
    }

    #[test]
    fn definitions_are_shared() {
        let a = system_ike::definition().unwrap();
        let b = system_ike::definition().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn lookup_finds_registered_types() {
        assert!(lookup("fortios_system_ike").is_some());
        assert!(lookup("fortios_system_global").is_none());
    }
}
