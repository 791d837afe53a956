//! Dataset schema: the declarative description of expected table columns.

use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Expected type of a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// 64-bit floating point
    Float,
    /// 64-bit signed integer
    Int,
    /// Free-form string treated as a categorical value
    Categorical,
    /// Boolean flag
    Bool,
}

impl ColumnKind {
    /// Whether values of this kind participate in the numeric drift check.
    #[inline]
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Float | Self::Int)
    }

    /// Stable lowercase name used in reports and fingerprints.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Categorical => "categorical",
            Self::Bool => "bool",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of the expected table shape.
///
/// Column order is preserved from the YAML document; the fingerprint and the
/// feature-encoding order both depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Column name → expected kind, in declaration order
    pub columns: IndexMap<String, ColumnKind>,
    /// Name of the label column; must appear in `columns`
    pub target: String,
}

impl DatasetSchema {
    /// Validate internal consistency.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if the schema is empty, the target
    /// column is not declared, or no feature column remains.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns.is_empty() {
            return Err(ConfigError::Invalid("schema declares no columns".into()));
        }
        if !self.columns.contains_key(&self.target) {
            return Err(ConfigError::Invalid(format!(
                "target column `{}` is not declared in the schema",
                self.target
            )));
        }
        if self.feature_columns().next().is_none() {
            return Err(ConfigError::Invalid(
                "schema declares no feature columns besides the target".into(),
            ));
        }
        Ok(())
    }

    /// Feature columns in declaration order (everything except the target).
    pub fn feature_columns(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.columns
            .iter()
            .filter(|(name, _)| *name != &self.target)
            .map(|(name, kind)| (name.as_str(), *kind))
    }

    /// Number of declared columns including the target.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema declares no columns.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Content fingerprint over column names, kinds, and the target.
    ///
    /// A model bundle records the fingerprint of the schema its transformer
    /// was fitted on; a bundle is never applied under a different fingerprint.
    /// Sensitive to column order, names, kinds, and target choice.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, kind) in &self.columns {
            hasher.update(name.as_bytes());
            hasher.update([0]);
            hasher.update(kind.as_str().as_bytes());
            hasher.update([0]);
        }
        hasher.update(self.target.as_bytes());
        let digest = hasher.finalize();
        let mut out = String::with_capacity(64);
        for byte in digest {
            use std::fmt::Write;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(cols: &[(&str, ColumnKind)], target: &str) -> DatasetSchema {
        DatasetSchema {
            columns: cols
                .iter()
                .map(|(n, k)| ((*n).to_string(), *k))
                .collect(),
            target: target.to_string(),
        }
    }

    #[test]
    fn validates_target_presence() {
        let s = schema(&[("age", ColumnKind::Int)], "label");
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_target_only_schema() {
        let s = schema(&[("label", ColumnKind::Categorical)], "label");
        assert!(s.validate().is_err());
    }

    #[test]
    fn feature_columns_exclude_target() {
        let s = schema(
            &[
                ("age", ColumnKind::Int),
                ("city", ColumnKind::Categorical),
                ("label", ColumnKind::Bool),
            ],
            "label",
        );
        let features: Vec<_> = s.feature_columns().map(|(n, _)| n.to_string()).collect();
        assert_eq!(features, vec!["age", "city"]);
    }

    #[test]
    fn fingerprint_is_stable_and_order_sensitive() {
        let a = schema(
            &[("age", ColumnKind::Int), ("label", ColumnKind::Bool)],
            "label",
        );
        let b = schema(
            &[("age", ColumnKind::Int), ("label", ColumnKind::Bool)],
            "label",
        );
        let c = schema(
            &[("label", ColumnKind::Bool), ("age", ColumnKind::Int)],
            "label",
        );
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_kind() {
        let a = schema(
            &[("age", ColumnKind::Int), ("label", ColumnKind::Bool)],
            "label",
        );
        let b = schema(
            &[("age", ColumnKind::Float), ("label", ColumnKind::Bool)],
            "label",
        );
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
