//! Table merge policy
//!
//! Decides whether a top-level record or table field is refreshed from the
//! device. In selective mode only fields the local configuration already
//! manages are pulled in, so entries an operator maintains by hand on the
//! device never show up as drift.

use crate::error::{MapError, Result};
use crate::types::LocalRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Flatten every field the device returns
    ImportAll,
    /// Flatten compound fields only when the prior local record has them
    #[default]
    SelectiveRefresh,
}

impl MergeMode {
    /// Parses the `get_all_tables` option (`"true"` / `"false"`)
    pub fn from_flag(flag: &str) -> Result<Self> {
        match flag {
            "true" => Ok(MergeMode::ImportAll),
            "false" | "" => Ok(MergeMode::SelectiveRefresh),
            other => Err(MapError::InvalidOption {
                name: "get_all_tables".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

pub fn should_flatten_field(field_path: &str, mode: MergeMode, prior_local_had_value: bool) -> bool {
    let decision = match mode {
        MergeMode::ImportAll => true,
        MergeMode::SelectiveRefresh => prior_local_had_value,
    };
    if !decision {
        tracing::trace!("Skipping unmanaged field {} in selective refresh", field_path);
    }
    decision
}

/// Merge mode bound to the prior local record of one read
#[derive(Debug, Clone, Copy)]
pub struct TableMergePolicy<'a> {
    pub mode: MergeMode,
    pub prior: Option<&'a LocalRecord>,
}

impl<'a> TableMergePolicy<'a> {
    pub fn new(mode: MergeMode, prior: Option<&'a LocalRecord>) -> Self {
        Self { mode, prior }
    }

    pub fn import_all() -> Self {
        Self::new(MergeMode::ImportAll, None)
    }

    /// Consulted once per top-level compound field, children inherit it
    pub fn should_flatten(&self, local_name: &str) -> bool {
        let had_value = self.prior.is_some_and(|p| p.has_value(local_name));
        should_flatten_field(local_name, self.mode, had_value)
    }
}

impl Default for TableMergePolicy<'_> {
    fn default() -> Self {
        Self::import_all()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::types::{Record, Value};

    #[test]
    fn import_all_always_flattens() {
        assert!(should_flatten_field("srcintf", MergeMode::ImportAll, false));
        assert!(should_flatten_field("srcintf", MergeMode::ImportAll, true));
    }

    #[test]
    fn selective_refresh_follows_prior_value() {
        assert!(!should_flatten_field("srcintf", MergeMode::SelectiveRefresh, false));
        assert!(should_flatten_field("srcintf", MergeMode::SelectiveRefresh, true));
    }

    #[test]
    fn policy_treats_empty_prior_values_as_unmanaged() {
        let prior = Record::new()
            .with("srcintf", vec![Value::from(Record::new().with("name", "port1"))])
            .with("dstintf", Value::List(vec![]));
        let policy = TableMergePolicy::new(MergeMode::SelectiveRefresh, Some(&prior));

        assert!(policy.should_flatten("srcintf"));
        assert!(!policy.should_flatten("dstintf"));
        assert!(!policy.should_flatten("dh_group_1"));
        assert!(!TableMergePolicy::new(MergeMode::SelectiveRefresh, None).should_flatten("x"));
    }

    #[test]
    fn get_all_tables_flag_parses() {
        assert_eq!(MergeMode::from_flag("true").unwrap(), MergeMode::ImportAll);
        assert_eq!(
            MergeMode::from_flag("false").unwrap(),
            MergeMode::SelectiveRefresh
        );
        assert!(MergeMode::from_flag("yes").is_err());
    }
}
