use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Property weights for contamination scoring.
///
/// A flat map from curated-property name to a non-negative weight. Shipped
/// configurations use integer weights in 0–2; anything non-negative is
/// accepted. Properties weighted 0 never contribute.
///
/// Example JSON (`data/score_weights.json`):
/// ```json
/// {
///   "Reagent": 2,
///   "Hospital": 2,
///   "Soil": 1,
///   "Water": 1
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct WeightConfig {
    weights: BTreeMap<String, f64>,
}

impl Default for WeightConfig {
    /// The shipped default weight set: laboratory-associated sources are
    /// weighted double, host/environmental habitats single, food and
    /// plant associations are informational only.
    fn default() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert("Reagent".to_string(), 2.0);
        weights.insert("Hospital".to_string(), 2.0);
        weights.insert("Human".to_string(), 1.0);
        weights.insert("Animal".to_string(), 1.0);
        weights.insert("Soil".to_string(), 1.0);
        weights.insert("Water".to_string(), 1.0);
        weights.insert("Plant".to_string(), 0.0);
        weights.insert("Food".to_string(), 0.0);
        WeightConfig { weights }
    }
}

impl WeightConfig {
    /// Load weights from a JSON file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            return Err(EngineError::NotFound { path: path.to_path_buf() });
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::invalid(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| EngineError::invalid(format!("{}: invalid weight config: {e}", path.display())))
    }

    /// Build a weight set from explicit pairs. Mostly for tests and
    /// embedding callers.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        WeightConfig {
            weights: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Reset to the shipped default weight set.
    pub fn restore_defaults(&mut self) {
        *self = WeightConfig::default();
    }

    pub fn get(&self, property: &str) -> Option<f64> {
        self.weights.get(property).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Pretty JSON, as written by `init-weights`.
    pub fn to_pretty_json(&self) -> String {
        // BTreeMap serialization cannot fail.
        serde_json::to_string_pretty(&self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let config = WeightConfig::default();
        assert_eq!(config.get("Reagent"), Some(2.0));
        assert_eq!(config.get("Soil"), Some(1.0));
        assert_eq!(config.get("Food"), Some(0.0));
        assert_eq!(config.len(), 8);
    }

    #[test]
    fn test_weights_serde_roundtrip() {
        let config = WeightConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: WeightConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_parse_flat_json_object() {
        let json = r#"{"Soil": 1, "Reagent": 2}"#;
        let config: WeightConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.get("Soil"), Some(1.0));
        assert_eq!(config.get("Reagent"), Some(2.0));
        assert_eq!(config.get("Water"), None);
    }

    #[test]
    fn test_restore_defaults() {
        let mut config = WeightConfig::from_pairs([("Soil", 0.25)]);
        config.restore_defaults();
        assert_eq!(config, WeightConfig::default());
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let err = WeightConfig::load(Path::new("/no/such/weights.json")).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_load_malformed_json_is_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = WeightConfig::load(&path).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn test_shipped_file_matches_default() {
        let shipped = concat!(env!("CARGO_MANIFEST_DIR"), "/data/score_weights.json");
        let config = WeightConfig::load(Path::new(shipped)).unwrap();
        assert_eq!(config, WeightConfig::default());
    }
}
