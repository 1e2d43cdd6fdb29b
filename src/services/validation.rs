use std::sync::OnceLock;

use regex::Regex;

use crate::database::entities::series;
use crate::errors::FieldErrors;

fn color_regex() -> &'static Regex {
    static COLOR_RE: OnceLock<Regex> = OnceLock::new();
    COLOR_RE.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern is valid"))
}

/// Field-level validators. Each entity has a single entry point returning the
/// full field -> message map so callers can render every problem at once.
pub struct ValidationService;

impl ValidationService {
    /// Validate a complete series definition (create, or update after merging
    /// the patch into the existing row).
    pub fn validate_series(
        name: &str,
        unit: &str,
        min_value: f64,
        max_value: f64,
        color: &str,
    ) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if name.trim().is_empty() {
            errors.insert("name".to_string(), "name cannot be empty".to_string());
        } else if name.trim().len() > 100 {
            errors.insert(
                "name".to_string(),
                "name is too long (max 100 characters)".to_string(),
            );
        }

        if unit.trim().is_empty() {
            errors.insert("unit".to_string(), "unit cannot be empty".to_string());
        }

        if !min_value.is_finite() {
            errors.insert(
                "min_value".to_string(),
                "min_value must be a finite number".to_string(),
            );
        }
        if !max_value.is_finite() {
            errors.insert(
                "max_value".to_string(),
                "max_value must be a finite number".to_string(),
            );
        }
        if min_value.is_finite() && max_value.is_finite() && min_value >= max_value {
            errors.insert(
                "max_value".to_string(),
                "max_value must be greater than min_value".to_string(),
            );
        }

        if !color_regex().is_match(color) {
            errors.insert(
                "color".to_string(),
                "color must be a valid hex code (e.g. #FF5733)".to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate a measurement value against the current bounds of its series.
    /// Bounds are inclusive on both ends.
    pub fn validate_measurement_value(
        value: f64,
        series: &series::Model,
    ) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if !value.is_finite() {
            errors.insert(
                "value".to_string(),
                "value must be a finite number".to_string(),
            );
        } else if value < series.min_value || value > series.max_value {
            errors.insert(
                "value".to_string(),
                format!(
                    "value {} is outside the acceptable range [{}, {}] for series '{}'",
                    value, series.min_value, series.max_value, series.name
                ),
            );
            errors.insert("min_value".to_string(), series.min_value.to_string());
            errors.insert("max_value".to_string(), series.max_value.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn validate_sensor_name(name: &str) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if name.trim().is_empty() {
            errors.insert("name".to_string(), "name cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_series() -> series::Model {
        series::Model {
            id: 1,
            name: "Temperature".to_string(),
            description: None,
            unit: "°C".to_string(),
            min_value: -20.0,
            max_value: 50.0,
            color: "#FF5733".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn series_validation_collects_all_failures() {
        let errors =
            ValidationService::validate_series("", "", 10.0, 10.0, "red").unwrap_err();
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("unit"));
        assert!(errors.contains_key("max_value"));
        assert!(errors.contains_key("color"));
    }

    #[test]
    fn series_validation_accepts_well_formed_input() {
        assert!(
            ValidationService::validate_series("Humidity", "%", 0.0, 100.0, "#00ff00").is_ok()
        );
    }

    #[test]
    fn color_pattern_requires_six_hex_digits() {
        assert!(ValidationService::validate_series("A", "u", 0.0, 1.0, "#FFF").is_err());
        assert!(ValidationService::validate_series("A", "u", 0.0, 1.0, "FF5733").is_err());
        assert!(ValidationService::validate_series("A", "u", 0.0, 1.0, "#0a1B2c").is_ok());
    }

    #[test]
    fn measurement_bounds_are_inclusive() {
        let series = sample_series();
        assert!(ValidationService::validate_measurement_value(50.0, &series).is_ok());
        assert!(ValidationService::validate_measurement_value(-20.0, &series).is_ok());

        let errors = ValidationService::validate_measurement_value(51.0, &series).unwrap_err();
        assert!(errors["value"].contains("[-20, 50]"));
        assert_eq!(errors["min_value"], "-20");
        assert_eq!(errors["max_value"], "50");
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let series = sample_series();
        assert!(ValidationService::validate_measurement_value(f64::NAN, &series).is_err());
        assert!(ValidationService::validate_measurement_value(f64::INFINITY, &series).is_err());
    }
}
