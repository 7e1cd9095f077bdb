//! Schema types and builders for fortimap
//!
//! An [`ObjectSchema`] describes one FortiOS configuration object as data.
//! Flatten and expand interpret it; nothing here knows about a particular
//! object type.

use crate::codec::FieldCodec;
use crate::error::{MapError, Result};
use crate::types::{LocalRecord, Value};
use crate::validator::Validator;
use crate::version::VersionRange;
use std::collections::HashSet;
use std::sync::Arc;

/// Scalar type of a leaf field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Int,
    Bool,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Int => "int",
            ScalarKind::Bool => "bool",
        }
    }
}

/// Cardinality of a field together with what it holds
#[derive(Debug, Clone)]
pub enum FieldShape {
    Scalar(ScalarKind),
    ScalarList(ScalarKind),
    /// A single nested object
    Record(Block),
    /// An ordered list of nested objects
    Table(Block),
}

impl FieldShape {
    pub fn is_compound(&self) -> bool {
        matches!(self, FieldShape::Record(_) | FieldShape::Table(_))
    }

    pub fn describe(&self) -> String {
        match self {
            FieldShape::Scalar(kind) => kind.name().to_string(),
            FieldShape::ScalarList(kind) => format!("list of {}", kind.name()),
            FieldShape::Record(_) => "record".to_string(),
            FieldShape::Table(_) => "list of record".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Optionality {
    Required,
    Optional,
    OptionalWithDefault(Value),
    /// Set by the device only, never sent by the provider layer
    Computed,
}

/// FieldSpec describes one field of a configuration object
#[derive(Clone)]
pub struct FieldSpec {
    pub local_name: String,
    pub wire_name: String,
    pub shape: FieldShape,
    pub optionality: Optionality,
    pub sensitive: bool,
    /// Child field a table is ordered by when dynamic sort is on
    pub sort_key: Option<String>,
    pub availability: Option<VersionRange>,
    pub validators: Vec<Arc<dyn Validator>>,
    pub description: String,
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("local_name", &self.local_name)
            .field("wire_name", &self.wire_name)
            .field("shape", &self.shape)
            .field("optionality", &self.optionality)
            .field("sensitive", &self.sensitive)
            .field("sort_key", &self.sort_key)
            .field("availability", &self.availability)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .finish()
    }
}

impl FieldSpec {
    pub fn is_computed(&self) -> bool {
        self.optionality == Optionality::Computed
    }
}

/// Block is an ordered set of sibling fields
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub fields: Vec<FieldSpec>,
}

impl Block {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn field(&self, local_name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.local_name == local_name)
    }

    fn check(&self, path: &str) -> Result<()> {
        let mut locals = HashSet::new();
        let mut wires = HashSet::new();

        for field in &self.fields {
            let field_path = crate::error::child_path(path, &field.local_name);
            if !locals.insert(field.local_name.as_str()) {
                return Err(MapError::InvalidSchema(format!(
                    "duplicate local name '{}'",
                    field_path
                )));
            }
            if !wires.insert(field.wire_name.as_str()) {
                return Err(MapError::InvalidSchema(format!(
                    "duplicate wire name '{}' at '{}'",
                    field.wire_name, field_path
                )));
            }
            if let Optionality::OptionalWithDefault(default) = &field.optionality {
                check_default(default, &field.shape, &field_path)?;
            }

            match &field.shape {
                FieldShape::Record(nested) => nested.check(&field_path)?,
                FieldShape::Table(nested) => {
                    if let Some(key) = &field.sort_key {
                        match nested.field(key) {
                            Some(child) if matches!(child.shape, FieldShape::Scalar(_)) => {}
                            _ => {
                                return Err(MapError::InvalidSchema(format!(
                                    "sort key '{}' of '{}' is not a scalar child",
                                    key, field_path
                                )))
                            }
                        }
                    }
                    nested.check(&field_path)?;
                }
                _ => {
                    if field.sort_key.is_some() {
                        return Err(MapError::InvalidSchema(format!(
                            "sort key set on non-table field '{}'",
                            field_path
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// A default must encode the way a configured value of the field would
fn check_default(default: &Value, shape: &FieldShape, path: &str) -> Result<()> {
    let codec = FieldCodec::default();
    let invalid = |detail: String| {
        MapError::InvalidSchema(format!("default of '{}' does not fit: {}", path, detail))
    };
    match (shape, default) {
        (_, Value::Null) => Ok(()),
        (FieldShape::Scalar(kind), _) => codec
            .encode(default, *kind, path)
            .map(|_| ())
            .map_err(|e| invalid(e.to_string())),
        (FieldShape::ScalarList(kind), Value::List(items)) => {
            for (idx, item) in items.iter().enumerate() {
                codec
                    .encode(item, *kind, &crate::error::index_path(path, idx))
                    .map_err(|e| invalid(e.to_string()))?;
            }
            Ok(())
        }
        (FieldShape::Record(_), Value::Record(_)) | (FieldShape::Table(_), Value::List(_)) => Ok(()),
        _ => Err(invalid(format!(
            "expected {}, got {}",
            shape.describe(),
            default.type_name()
        ))),
    }
}

/// How an object instance is identified on the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mkey {
    /// A top-level scalar field carries the identifier
    Field(String),
    /// Singleton objects (e.g. `system ike`) have a fixed identifier
    Synthetic(String),
}

/// ObjectSchema describes one configuration object type
/// Immutable once built, share it freely
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub name: String,
    pub mkey: Mkey,
    pub block: Block,
    pub description: String,
}

impl ObjectSchema {
    pub fn field(&self, local_name: &str) -> Option<&FieldSpec> {
        self.block.field(local_name)
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self.mkey, Mkey::Synthetic(_))
    }

    /// Identifier of the object described by `local`
    pub fn mkey_of(&self, local: &LocalRecord) -> Option<String> {
        match &self.mkey {
            Mkey::Synthetic(id) => Some(id.clone()),
            Mkey::Field(name) => match local.get(name)? {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Int(i) => Some(i.to_string()),
                _ => None,
            },
        }
    }

    /// Fills absent top-level fields that declare a default
    pub fn apply_defaults(&self, local: &LocalRecord) -> LocalRecord {
        let mut result = local.clone();
        for field in &self.block.fields {
            if let Optionality::OptionalWithDefault(default) = &field.optionality {
                if !result.contains_key(&field.local_name) {
                    result.insert(field.local_name.clone(), default.clone());
                }
            }
        }
        result
    }
}

/// FieldBuilder provides a fluent API for building fields
/// The wire name defaults to the local name with `_` replaced by `-`
pub struct FieldBuilder {
    field: FieldSpec,
}

impl FieldBuilder {
    pub fn new(local_name: &str, shape: FieldShape) -> Self {
        Self {
            field: FieldSpec {
                local_name: local_name.to_string(),
                wire_name: local_name.replace('_', "-"),
                shape,
                optionality: Optionality::Optional,
                sensitive: false,
                sort_key: None,
                availability: None,
                validators: Vec::new(),
                description: String::new(),
            },
        }
    }

    pub fn string(local_name: &str) -> Self {
        Self::new(local_name, FieldShape::Scalar(ScalarKind::String))
    }

    pub fn int(local_name: &str) -> Self {
        Self::new(local_name, FieldShape::Scalar(ScalarKind::Int))
    }

    pub fn bool(local_name: &str) -> Self {
        Self::new(local_name, FieldShape::Scalar(ScalarKind::Bool))
    }

    pub fn string_list(local_name: &str) -> Self {
        Self::new(local_name, FieldShape::ScalarList(ScalarKind::String))
    }

    pub fn int_list(local_name: &str) -> Self {
        Self::new(local_name, FieldShape::ScalarList(ScalarKind::Int))
    }

    pub fn record(local_name: &str, fields: Vec<FieldBuilder>) -> Self {
        Self::new(local_name, FieldShape::Record(build_block(fields)))
    }

    pub fn table(local_name: &str, fields: Vec<FieldBuilder>) -> Self {
        Self::new(local_name, FieldShape::Table(build_block(fields)))
    }

    /// Override the derived wire name
    pub fn wire_name(mut self, wire_name: &str) -> Self {
        self.field.wire_name = wire_name.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.field.optionality = Optionality::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.field.optionality = Optionality::Optional;
        self
    }

    pub fn computed(mut self) -> Self {
        self.field.optionality = Optionality::Computed;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.field.optionality = Optionality::OptionalWithDefault(value.into());
        self
    }

    /// Secrets the device only returns masked
    pub fn sensitive(mut self) -> Self {
        self.field.sensitive = true;
        self
    }

    pub fn sort_key(mut self, key: &str) -> Self {
        self.field.sort_key = Some(key.to_string());
        self
    }

    pub fn available(mut self, range: VersionRange) -> Self {
        self.field.availability = Some(range);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.field.validators.push(validator);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.field.description = desc.to_string();
        self
    }

    pub fn build(self) -> FieldSpec {
        self.field
    }
}

fn build_block(fields: Vec<FieldBuilder>) -> Block {
    Block::new(fields.into_iter().map(FieldBuilder::build).collect())
}

/// SchemaBuilder assembles and checks an ObjectSchema
pub struct SchemaBuilder {
    name: String,
    mkey: Option<Mkey>,
    fields: Vec<FieldSpec>,
    description: String,
}

impl SchemaBuilder {
    /// `name` is the CLI-style object path, e.g. `firewall.shaping-policy`
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mkey: None,
            fields: Vec::new(),
            description: String::new(),
        }
    }

    /// The object is identified by a top-level field
    pub fn mkey(mut self, local_name: &str) -> Self {
        self.mkey = Some(Mkey::Field(local_name.to_string()));
        self
    }

    /// The object is a singleton with a fixed identifier
    pub fn singleton(mut self, id: &str) -> Self {
        self.mkey = Some(Mkey::Synthetic(id.to_string()));
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field.build());
        self
    }

    pub fn build(self) -> Result<ObjectSchema> {
        let block = Block::new(self.fields);
        block.check("")?;

        let mkey = self.mkey.ok_or_else(|| {
            MapError::InvalidSchema(format!("'{}' declares no mkey", self.name))
        })?;

        if let Mkey::Field(name) = &mkey {
            match block.field(name) {
                Some(f) if matches!(f.shape, FieldShape::Scalar(_)) => {}
                _ => {
                    return Err(MapError::InvalidSchema(format!(
                        "mkey '{}' of '{}' is not a top-level scalar field",
                        name, self.name
                    )))
                }
            }
        }

        Ok(ObjectSchema {
            name: self.name,
            mkey,
            block,
            description: self.description,
        })
    }
}
