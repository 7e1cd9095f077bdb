//! Dynamic subtable sort
//!
//! The device may return table rows in a different order on successive reads.
//! When `dynamic_sort_subtable` is on, tables that declare a sort key are
//! ordered by that key so the stored state stays stable.

use crate::error::{MapError, Result};
use crate::schema::{Block, FieldShape, ObjectSchema};
use crate::types::{LocalRecord, Value};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Off,
    /// Plain lexicographic order
    Alphabetical,
    /// Digit runs compare numerically, so `port2` sorts before `port10`
    Natural,
}

impl SortMode {
    /// Parses the `dynamic_sort_subtable` option
    pub fn from_flag(flag: &str) -> Result<Self> {
        match flag {
            "false" | "" => Ok(SortMode::Off),
            "true" => Ok(SortMode::Alphabetical),
            "natural" => Ok(SortMode::Natural),
            other => Err(MapError::InvalidOption {
                name: "dynamic_sort_subtable".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Stable sort of table rows by `key`; rows without the key go last
pub fn sort_rows(rows: &mut [Value], key: &str, mode: SortMode) {
    if mode == SortMode::Off {
        return;
    }
    rows.sort_by(|a, b| {
        let ka = sort_key_of(a, key);
        let kb = sort_key_of(b, key);
        match (ka, kb) {
            (Some(ka), Some(kb)) => match mode {
                SortMode::Natural => natural_cmp(&ka, &kb),
                _ => ka.cmp(&kb),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

fn sort_key_of(row: &Value, key: &str) -> Option<String> {
    match row.as_record()?.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Compares strings treating runs of ASCII digits as numbers
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = Chunks::new(a);
    let mut cb = Chunks::new(b);
    loop {
        match (ca.next(), cb.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (is_digits(x), is_digits(y)) {
                    (true, true) => {
                        let xt = x.trim_start_matches('0');
                        let yt = y.trim_start_matches('0');
                        xt.len().cmp(&yt.len()).then_with(|| xt.cmp(yt))
                    }
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn is_digits(s: &str) -> bool {
    s.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

/// Splits a string into alternating digit and non-digit runs
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.as_bytes().first()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}

/// Applies the dynamic sort to every sortable table of a local record
///
/// Used to put a caller-built record in the order flatten would produce.
pub fn normalize(local: &LocalRecord, schema: &ObjectSchema, mode: SortMode) -> LocalRecord {
    normalize_block(local, &schema.block, mode)
}

fn normalize_block(local: &LocalRecord, block: &Block, mode: SortMode) -> LocalRecord {
    let mut result = local.clone();
    for field in &block.fields {
        let Some(value) = result.get(&field.local_name) else {
            continue;
        };
        let normalized = match (&field.shape, value) {
            (FieldShape::Record(nested), Value::Record(r)) => {
                Value::Record(normalize_block(r, nested, mode))
            }
            (FieldShape::Table(nested), Value::List(rows)) => {
                let mut rows: Vec<Value> = rows
                    .iter()
                    .map(|row| match row {
                        Value::Record(r) => Value::Record(normalize_block(r, nested, mode)),
                        other => other.clone(),
                    })
                    .collect();
                if let Some(key) = &field.sort_key {
                    sort_rows(&mut rows, key, mode);
                }
                Value::List(rows)
            }
            _ => continue,
        };
        result.insert(field.local_name.clone(), normalized);
    }
    result
}
