//! Error types for fortimap

/// Error type for schema construction, flatten and expand
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("Type mismatch at '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Shape mismatch at '{path}': expected {expected}, got {actual}")]
    ShapeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Argument '{path}' is not supported on FortiOS {version}")]
    UnsupportedField { path: String, version: String },

    #[error("Missing required field '{path}'")]
    MissingRequired { path: String },

    #[error("Validation failed at '{path}': {message}")]
    Validation { path: String, message: String },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid version token: {0}")]
    InvalidVersion(String),

    #[error("Invalid option {name}: {value}")]
    InvalidOption { name: String, value: String },
}

/// Result type alias for fortimap operations
pub type Result<T> = std::result::Result<T, MapError>;

impl MapError {
    pub(crate) fn type_mismatch(
        path: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        MapError::TypeMismatch {
            path: path.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub(crate) fn shape_mismatch(
        path: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        MapError::ShapeMismatch {
            path: path.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Field path the error refers to, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            MapError::TypeMismatch { path, .. }
            | MapError::ShapeMismatch { path, .. }
            | MapError::UnsupportedField { path, .. }
            | MapError::MissingRequired { path }
            | MapError::Validation { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Joins a parent path and a child field name
pub(crate) fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

/// Appends a list index to a path
pub(crate) fn index_path(parent: &str, idx: usize) -> String {
    format!("{}[{}]", parent, idx)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn paths_join_fields_and_indexes() {
        let p = child_path("", "srcintf");
        let p = index_path(&p, 1);
        let p = child_path(&p, "name");
        assert_eq!(p, "srcintf[1].name");
    }

    #[test]
    fn error_messages_include_path() {
        let err = MapError::type_mismatch("embryonic_limit", "int", "string");
        assert_eq!(
            err.to_string(),
            "Type mismatch at 'embryonic_limit': expected int, got string"
        );
        assert_eq!(err.path(), Some("embryonic_limit"));
        assert_eq!(MapError::InvalidSchema("x".into()).path(), None);
    }
}
