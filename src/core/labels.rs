//! Versioned label configuration for classification models.
//!
//! A classification model emits one score per class index; the mapping from
//! index to human-readable label is fixed at training time. That ordering is
//! carried here as an explicit, versioned value shipped alongside the model
//! artifact instead of being inferred at runtime. Index i of the label list
//! names the class the model scores at position i, so the order must match
//! the training-time class ordering exactly.

use crate::core::config::ConfigError;
use crate::core::errors::RecognitionError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// An ordered, versioned set of class labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet {
    /// Version tag tying the ordering to a model artifact.
    version: String,
    /// Labels in training-time class order.
    labels: Vec<String>,
}

impl LabelSet {
    /// Creates a new label set after validating it.
    ///
    /// # Errors
    ///
    /// Returns a ConfigError if the label list is empty or contains
    /// duplicates.
    pub fn new(
        version: impl Into<String>,
        labels: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let set = Self {
            version: version.into(),
            labels,
        };
        set.validate()?;
        Ok(set)
    }

    /// The label set for the shipped vgg19 recipe recognition model.
    ///
    /// The order is the model's training-time class order and must not be
    /// rearranged.
    pub fn recipe_v1() -> Self {
        Self {
            version: "vgg19-recipe-v1".to_string(),
            labels: [
                "Dosa",
                "Idli",
                "Pulao",
                "Samosa",
                "Vada",
                "burger",
                "chocolate-cake",
                "french-fries",
                "hot-dog",
                "kabab",
                "pizza",
                "sandwitches",
                "strawberry-cake",
                "tomato-soup",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }

    /// Loads a label set from a JSON file and validates it.
    ///
    /// The file carries `{ "version": ..., "labels": [...] }`, typically
    /// shipped next to the model artifact.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RecognitionError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let set: Self = serde_json::from_str(&contents).map_err(|e| {
            RecognitionError::config_error(format!(
                "failed to parse label file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        set.validate()?;
        Ok(set)
    }

    /// Validates that the label list is non-empty and free of duplicates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.labels.is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "label set must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for label in &self.labels {
            if !seen.insert(label.as_str()) {
                return Err(ConfigError::InvalidConfig {
                    message: format!("duplicate label '{}' in label set", label),
                });
            }
        }

        Ok(())
    }

    /// Version tag of this label set.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true when the label set holds no labels. A validated set is
    /// never empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at the given class index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Class index of the given label, by exact string match.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// All labels in class order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_v1_order_is_training_order() {
        let labels = LabelSet::recipe_v1();
        assert_eq!(labels.len(), 14);
        assert_eq!(labels.get(0), Some("Dosa"));
        assert_eq!(labels.get(5), Some("burger"));
        assert_eq!(labels.get(13), Some("tomato-soup"));
        assert_eq!(labels.index_of("pizza"), Some(10));
        assert!(labels.validate().is_ok());
    }

    #[test]
    fn empty_labels_rejected() {
        assert!(LabelSet::new("v0", vec![]).is_err());
    }

    #[test]
    fn duplicate_labels_rejected() {
        let result = LabelSet::new("v0", vec!["pizza".into(), "pizza".into()]);
        assert!(result.is_err());
    }

    #[test]
    fn json_round_trip() {
        let labels = LabelSet::recipe_v1();
        let json = serde_json::to_string(&labels).unwrap();
        let parsed: LabelSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, labels);
    }

    #[test]
    fn from_json_file_reads_and_validates() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"version": "test-v1", "labels": ["a", "b", "c"]}}"#
        )
        .unwrap();

        let labels = LabelSet::from_json_file(file.path()).unwrap();
        assert_eq!(labels.version(), "test-v1");
        assert_eq!(labels.len(), 3);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, r#"{{"version": "test-v1", "labels": []}}"#).unwrap();
        assert!(LabelSet::from_json_file(bad.path()).is_err());
    }
}
