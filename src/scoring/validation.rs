use super::config::WeightConfig;

/// Validate a weight configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_weights(config: &WeightConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.is_empty() {
        errors.push("weights: at least one property weight is required".to_string());
    }

    for (property, weight) in config.iter() {
        if weight < 0.0 {
            errors.push(format!(
                "weights.{property}: must be non-negative, got {weight}"
            ));
        } else if !weight.is_finite() {
            errors.push(format!("weights.{property}: must be finite, got {weight}"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
