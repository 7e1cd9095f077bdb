use crate::error::{child_path, index_path, MapError, Result};
use crate::schema::{Block, FieldShape, ObjectSchema, Optionality};
use crate::types::{LocalRecord, Value};

/// Checks a single local value; values of another type are ignored
pub trait Validator: Send + Sync {
    fn description(&self) -> String;
    fn validate(&self, value: &Value, path: &str) -> Result<()>;
}

fn invalid(path: &str, message: String) -> MapError {
    MapError::Validation {
        path: path.to_string(),
        message,
    }
}

pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        format!("string length between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, value: &Value, path: &str) -> Result<()> {
        if let Some(s) = value.as_str() {
            let len = s.chars().count();
            if let Some(min) = self.min {
                if len < min {
                    return Err(invalid(
                        path,
                        format!("must have minimum length of {}, got {}", min, len),
                    ));
                }
            }
            if let Some(max) = self.max {
                if len > max {
                    return Err(invalid(
                        path,
                        format!("must have maximum length of {}, got {}", max, len),
                    ));
                }
            }
        }
        Ok(())
    }
}

pub struct StringPatternValidator {
    pub pattern: regex::Regex,
    pub description: String,
}

impl Validator for StringPatternValidator {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn validate(&self, value: &Value, path: &str) -> Result<()> {
        match value.as_str() {
            Some(s) if !self.pattern.is_match(s) => Err(invalid(
                path,
                format!("must match {}, got '{}'", self.description, s),
            )),
            _ => Ok(()),
        }
    }
}

/// FortiOS integer fields are mostly bounded, e.g. 0..=4294967295
pub struct IntRangeValidator {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Validator for IntRangeValidator {
    fn description(&self) -> String {
        format!("integer between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, value: &Value, path: &str) -> Result<()> {
        if let Some(n) = value.as_int() {
            if let Some(min) = self.min {
                if n < min {
                    return Err(invalid(path, format!("must be at least {}, got {}", min, n)));
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    return Err(invalid(path, format!("must be at most {}, got {}", max, n)));
                }
            }
        }
        Ok(())
    }
}

/// Enumerated option strings such as `enable`/`disable`
pub struct OneOfValidator {
    pub allowed: Vec<String>,
}

impl OneOfValidator {
    pub fn new(allowed: &[&str]) -> Self {
        Self {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn enable_disable() -> Self {
        Self::new(&["enable", "disable"])
    }
}

impl Validator for OneOfValidator {
    fn description(&self) -> String {
        format!("one of {:?}", self.allowed)
    }

    fn validate(&self, value: &Value, path: &str) -> Result<()> {
        match value.as_str() {
            Some(s) if !self.allowed.iter().any(|a| a == s) => Err(invalid(
                path,
                format!("must be one of {:?}, got '{}'", self.allowed, s),
            )),
            _ => Ok(()),
        }
    }
}

pub struct ListLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for ListLengthValidator {
    fn description(&self) -> String {
        format!("between {:?} and {:?} items", self.min, self.max)
    }

    fn validate(&self, value: &Value, path: &str) -> Result<()> {
        if let Value::List(items) = value {
            if let Some(min) = self.min {
                if items.len() < min {
                    return Err(invalid(
                        path,
                        format!("must have at least {} items, got {}", min, items.len()),
                    ));
                }
            }
            if let Some(max) = self.max {
                if items.len() > max {
                    return Err(invalid(
                        path,
                        format!("must have at most {} items, got {}", max, items.len()),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Checks required fields and field validators of a local record
///
/// Stops at the first problem. Fields the schema does not declare are ignored.
pub fn validate(local: &LocalRecord, schema: &ObjectSchema) -> Result<()> {
    validate_block(local, &schema.block, "")
}

fn validate_block(local: &LocalRecord, block: &Block, parent: &str) -> Result<()> {
    for field in &block.fields {
        let path = child_path(parent, &field.local_name);

        let value = match local.get(&field.local_name) {
            Some(v) if !v.is_null() => v,
            _ => {
                if field.optionality == Optionality::Required {
                    return Err(MapError::MissingRequired { path });
                }
                continue;
            }
        };

        for validator in &field.validators {
            validator.validate(value, &path)?;
        }

        match &field.shape {
            FieldShape::Scalar(_) => {}
            FieldShape::ScalarList(_) => {
                let items = value
                    .as_list()
                    .ok_or_else(|| MapError::shape_mismatch(&path, "list", value.type_name()))?;
                for (idx, item) in items.iter().enumerate() {
                    let item_path = index_path(&path, idx);
                    for validator in &field.validators {
                        validator.validate(item, &item_path)?;
                    }
                }
            }
            FieldShape::Record(nested) => {
                let record = value
                    .as_record()
                    .ok_or_else(|| MapError::shape_mismatch(&path, "record", value.type_name()))?;
                validate_block(record, nested, &path)?;
            }
            FieldShape::Table(nested) => {
                let rows = value
                    .as_list()
                    .ok_or_else(|| MapError::shape_mismatch(&path, "list", value.type_name()))?;
                for (idx, row) in rows.iter().enumerate() {
                    let row_path = index_path(&path, idx);
                    let record = row.as_record().ok_or_else(|| {
                        MapError::shape_mismatch(&row_path, "record", row.type_name())
                    })?;
                    validate_block(record, nested, &row_path)?;
                }
            }
        }
    }
    Ok(())
}
