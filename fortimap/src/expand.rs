//! TreeExpander: local record to wire record
//!
//! Presence in the local record is the "explicitly set" signal. Absent fields
//! are not sent so the device applies its own defaults; a present `Null` is
//! sent as an explicit null, which resets the field on the device.

use crate::codec::FieldCodec;
use crate::error::{child_path, index_path, MapError, Result};
use crate::schema::{Block, FieldShape, FieldSpec, ObjectSchema};
use crate::types::{LocalRecord, Record, RemoteRecord, Value};
use crate::version::{field_available, AvailabilityGate, VersionRangeGate};

static DEFAULT_GATE: VersionRangeGate = VersionRangeGate;

pub struct Expander<'a> {
    schema: &'a ObjectSchema,
    clear: bool,
    skip_computed: bool,
    codec: FieldCodec,
    version: Option<&'a str>,
    gate: &'a dyn AvailabilityGate,
}

impl<'a> Expander<'a> {
    pub fn new(schema: &'a ObjectSchema) -> Self {
        Self {
            schema,
            clear: false,
            skip_computed: false,
            codec: FieldCodec::default(),
            version: None,
            gate: &DEFAULT_GATE,
        }
    }

    /// Emit null for every present top-level field instead of its value
    pub fn clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    /// Leave out fields only the device may set
    pub fn skip_computed(mut self, skip: bool) -> Self {
        self.skip_computed = skip;
        self
    }

    pub fn codec(mut self, codec: FieldCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn version(mut self, version: &'a str) -> Self {
        self.version = Some(version);
        self
    }

    pub fn gate(mut self, gate: &'a dyn AvailabilityGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn expand(&self, local: &LocalRecord) -> Result<RemoteRecord> {
        self.expand_block(local, &self.schema.block, "", self.clear)
    }

    fn expand_block(
        &self,
        local: &LocalRecord,
        block: &Block,
        parent: &str,
        clear: bool,
    ) -> Result<RemoteRecord> {
        let mut wire = Record::new();

        for field in &block.fields {
            let Some(value) = local.get(&field.local_name) else {
                continue;
            };
            if self.skip_computed && field.is_computed() {
                continue;
            }

            let path = child_path(parent, &field.local_name);

            if !field_available(self.gate, field, self.version)? {
                if clear || value.is_null() {
                    continue;
                }
                return Err(MapError::UnsupportedField {
                    path,
                    version: self.version.unwrap_or_default().to_string(),
                });
            }

            let encoded = if clear {
                Value::Null
            } else {
                self.expand_value(value, field, &path)?
            };
            wire.insert(field.wire_name.clone(), encoded);
        }

        Ok(wire)
    }

    fn expand_value(&self, value: &Value, field: &FieldSpec, path: &str) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match &field.shape {
            FieldShape::Scalar(kind) => self.codec.encode(value, *kind, path),
            FieldShape::ScalarList(kind) => {
                let items = value.as_list().ok_or_else(|| {
                    MapError::type_mismatch(path, field.shape.describe(), value.type_name())
                })?;
                let encoded = items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| self.codec.encode(item, *kind, &index_path(path, idx)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::List(encoded))
            }
            FieldShape::Record(nested) => {
                let record = value.as_record().ok_or_else(|| {
                    MapError::type_mismatch(path, "record", value.type_name())
                })?;
                Ok(Value::Record(self.expand_block(record, nested, path, false)?))
            }
            FieldShape::Table(nested) => {
                let items = value.as_list().ok_or_else(|| {
                    MapError::type_mismatch(path, field.shape.describe(), value.type_name())
                })?;
                let mut rows = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let row_path = index_path(path, idx);
                    let record = item.as_record().ok_or_else(|| {
                        MapError::type_mismatch(&row_path, "record", item.type_name())
                    })?;
                    rows.push(Value::Record(
                        self.expand_block(record, nested, &row_path, false)?,
                    ));
                }
                Ok(Value::List(rows))
            }
        }
    }
}

/// One-shot expand with the default codec and no version gating
pub fn expand(local: &LocalRecord, schema: &ObjectSchema, clear: bool) -> Result<RemoteRecord> {
    Expander::new(schema).clear(clear).expand(local)
}
