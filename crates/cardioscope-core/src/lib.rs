//! Core types and errors for Cardioscope
//!
//! This crate contains the foundational types shared across all Cardioscope
//! components: the clinical feature vector consumed by the classifier, the
//! per-field form metadata, the binary verdict, the error taxonomy, and the
//! server configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Feature vector
// ---------------------------------------------------------------------------

/// Number of clinical measurements the classifier consumes.
pub const FEATURE_COUNT: usize = 13;

/// The field order the classifier was trained on.
///
/// The classifier treats its input positionally — a misordered row produces
/// a wrong but well-formed answer — so every conversion into a row goes
/// through this list.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// An ordered record of the thirteen clinical measurements.
///
/// Constructed fresh per form submission, scored immediately, and discarded
/// after the result is rendered. Field ranges are enforced by the form
/// widgets, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Age in years.
    pub age: f64,
    /// Sex flag (0 = female, 1 = male).
    pub sex: f64,
    /// Chest pain type (0-3).
    pub cp: f64,
    /// Resting blood pressure in mm Hg.
    pub trestbps: f64,
    /// Serum cholesterol in mg/dl.
    pub chol: f64,
    /// Fasting blood sugar > 120 mg/dl flag.
    pub fbs: f64,
    /// Resting electrocardiographic result (0-2).
    pub restecg: f64,
    /// Maximum heart rate achieved.
    pub thalach: f64,
    /// Exercise-induced angina flag.
    pub exang: f64,
    /// ST depression induced by exercise relative to rest.
    pub oldpeak: f64,
    /// Slope of the peak exercise ST segment (0-2).
    pub slope: f64,
    /// Number of major vessels colored by fluoroscopy (0-4).
    pub ca: f64,
    /// Thalassemia result (0-2).
    pub thal: f64,
}

impl FeatureVector {
    /// Flatten into a single classifier row, in [`FEATURE_ORDER`].
    pub fn as_row(&self) -> [f64; FEATURE_COUNT] {
        [
            self.age,
            self.sex,
            self.cp,
            self.trestbps,
            self.chol,
            self.fbs,
            self.restecg,
            self.thalach,
            self.exang,
            self.oldpeak,
            self.slope,
            self.ca,
            self.thal,
        ]
    }

    /// Build a vector from a classifier row, in [`FEATURE_ORDER`].
    pub fn from_row(row: [f64; FEATURE_COUNT]) -> Self {
        Self {
            age: row[0],
            sex: row[1],
            cp: row[2],
            trestbps: row[3],
            chol: row[4],
            fbs: row[5],
            restecg: row[6],
            thalach: row[7],
            exang: row[8],
            oldpeak: row[9],
            slope: row[10],
            ca: row[11],
            thal: row[12],
        }
    }

    /// Vector with every field at its form default.
    pub fn defaults() -> Self {
        let mut row = [0.0; FEATURE_COUNT];
        for (slot, field) in row.iter_mut().zip(FIELDS.iter()) {
            *slot = field.default;
        }
        Self::from_row(row)
    }
}

// ---------------------------------------------------------------------------
// Form field metadata
// ---------------------------------------------------------------------------

/// Declared bounds, step, and default for one form input.
///
/// This table is the single source of truth for both form rendering and
/// submission coercion; its order matches [`FEATURE_ORDER`].
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name, as submitted by the form and stored in the model artifact.
    pub name: &'static str,
    /// Human-readable input label.
    pub label: &'static str,
    /// Minimum accepted value (widget-enforced).
    pub min: f64,
    /// Maximum accepted value (widget-enforced).
    pub max: f64,
    /// Input step size.
    pub step: f64,
    /// Pre-filled default value.
    pub default: f64,
}

/// The thirteen form fields, in classifier order.
pub const FIELDS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        name: "age",
        label: "Age",
        min: 1.0,
        max: 120.0,
        step: 1.0,
        default: 30.0,
    },
    FieldSpec {
        name: "sex",
        label: "Sex (0=Female, 1=Male)",
        min: 0.0,
        max: 1.0,
        step: 1.0,
        default: 1.0,
    },
    FieldSpec {
        name: "cp",
        label: "Chest Pain Type (0-3)",
        min: 0.0,
        max: 3.0,
        step: 1.0,
        default: 0.0,
    },
    FieldSpec {
        name: "trestbps",
        label: "Resting Blood Pressure (mm Hg)",
        min: 50.0,
        max: 250.0,
        step: 1.0,
        default: 120.0,
    },
    FieldSpec {
        name: "chol",
        label: "Serum Cholesterol (mg/dl)",
        min: 100.0,
        max: 600.0,
        step: 1.0,
        default: 200.0,
    },
    FieldSpec {
        name: "fbs",
        label: "Fasting Blood Sugar > 120 mg/dl (0=No,1=Yes)",
        min: 0.0,
        max: 1.0,
        step: 1.0,
        default: 0.0,
    },
    FieldSpec {
        name: "restecg",
        label: "Resting ECG results (0,1,2)",
        min: 0.0,
        max: 2.0,
        step: 1.0,
        default: 0.0,
    },
    FieldSpec {
        name: "thalach",
        label: "Maximum Heart Rate Achieved",
        min: 60.0,
        max: 250.0,
        step: 1.0,
        default: 150.0,
    },
    FieldSpec {
        name: "exang",
        label: "Exercise Induced Angina (0=No,1=Yes)",
        min: 0.0,
        max: 1.0,
        step: 1.0,
        default: 0.0,
    },
    FieldSpec {
        name: "oldpeak",
        label: "ST depression induced by exercise",
        min: 0.0,
        max: 10.0,
        step: 0.1,
        default: 1.0,
    },
    FieldSpec {
        name: "slope",
        label: "Slope of peak exercise ST segment (0,1,2)",
        min: 0.0,
        max: 2.0,
        step: 1.0,
        default: 1.0,
    },
    FieldSpec {
        name: "ca",
        label: "Major vessels colored by fluoroscopy (0-4)",
        min: 0.0,
        max: 4.0,
        step: 1.0,
        default: 0.0,
    },
    FieldSpec {
        name: "thal",
        label: "Thalassemia (0,1,2)",
        min: 0.0,
        max: 2.0,
        step: 1.0,
        default: 1.0,
    },
];

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Binary outcome of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The classifier reported heart disease.
    Positive,
    /// The classifier reported no heart disease.
    Negative,
}

impl Verdict {
    /// Map a raw classifier label to a verdict.
    ///
    /// Label `1` is positive; every other label — canonically `0` — maps to
    /// negative. The bundled classifier is binary, so the non-1 branch only
    /// ever sees `0`, but the mapping is deterministic for any label.
    #[must_use]
    pub fn from_label(label: i64) -> Self {
        if label == 1 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    /// User-facing result line.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Positive => "The person has heart disease",
            Self::Negative => "The person does not have heart disease",
        }
    }

    /// Whether this verdict reports disease.
    #[must_use]
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

// ---------------------------------------------------------------------------
// Server configuration
// ---------------------------------------------------------------------------

/// Configuration for the Cardioscope HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Path to the serialized classifier artifact.
    pub model_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            model_path: "saved_models/heart_disease_model.json".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// The single generic message shown to the user for any per-request failure.
///
/// Coercion failures and inference failures are deliberately not
/// distinguished; every cause collapses to this one line.
pub const VALIDATION_MESSAGE: &str = "Please fill all fields with valid numeric values.";

/// Core error types.
#[derive(thiserror::Error, Debug)]
pub enum CardioError {
    /// The classifier artifact is missing, unreadable, or unusable.
    /// Fatal at startup; never recovered.
    #[error("Model error: {0}")]
    Model(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A submission could not be coerced or scored. Recoverable; the
    /// session remains usable for another attempt.
    #[error("Please fill all fields with valid numeric values.")]
    ValidationFailed,
}

/// Convenience alias for `std::result::Result<T, CardioError>`.
pub type Result<T> = std::result::Result<T, CardioError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order_is_the_trained_order() {
        assert_eq!(
            FEATURE_ORDER,
            [
                "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang",
                "oldpeak", "slope", "ca", "thal",
            ]
        );
    }

    #[test]
    fn test_fields_match_feature_order() {
        for (field, name) in FIELDS.iter().zip(FEATURE_ORDER.iter()) {
            assert_eq!(field.name, *name);
        }
    }

    #[test]
    fn test_as_row_is_positional() {
        let vector = FeatureVector {
            age: 1.0,
            sex: 2.0,
            cp: 3.0,
            trestbps: 4.0,
            chol: 5.0,
            fbs: 6.0,
            restecg: 7.0,
            thalach: 8.0,
            exang: 9.0,
            oldpeak: 10.0,
            slope: 11.0,
            ca: 12.0,
            thal: 13.0,
        };
        assert_eq!(
            vector.as_row(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0]
        );
    }

    #[test]
    fn test_row_round_trip() {
        let row = [
            63.0, 1.0, 3.0, 145.0, 233.0, 1.0, 0.0, 150.0, 0.0, 2.3, 0.0, 0.0, 1.0,
        ];
        assert_eq!(FeatureVector::from_row(row).as_row(), row);
    }

    #[test]
    fn test_defaults_match_field_specs() {
        let row = FeatureVector::defaults().as_row();
        assert_eq!(
            row,
            [30.0, 1.0, 0.0, 120.0, 200.0, 0.0, 0.0, 150.0, 0.0, 1.0, 1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_field_ranges_are_sane() {
        for field in &FIELDS {
            assert!(field.min < field.max, "{} has an empty range", field.name);
            assert!(
                field.default >= field.min && field.default <= field.max,
                "{} default is out of range",
                field.name
            );
            assert!(field.step > 0.0);
        }
    }

    #[test]
    fn test_verdict_label_mapping() {
        assert_eq!(Verdict::from_label(1), Verdict::Positive);
        assert_eq!(Verdict::from_label(0), Verdict::Negative);
        // Any non-1 label maps to negative, deterministically.
        assert_eq!(Verdict::from_label(2), Verdict::Negative);
        assert_eq!(Verdict::from_label(-1), Verdict::Negative);
    }

    #[test]
    fn test_verdict_messages() {
        assert_eq!(Verdict::Positive.message(), "The person has heart disease");
        assert_eq!(
            Verdict::Negative.message(),
            "The person does not have heart disease"
        );
        assert!(Verdict::Positive.is_positive());
        assert!(!Verdict::Negative.is_positive());
    }

    #[test]
    fn test_verdict_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Verdict::Positive).unwrap(),
            "\"positive\""
        );
        assert_eq!(
            serde_json::to_string(&Verdict::Negative).unwrap(),
            "\"negative\""
        );
    }

    #[test]
    fn test_validation_error_uses_the_generic_message() {
        assert_eq!(CardioError::ValidationFailed.to_string(), VALIDATION_MESSAGE);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.model_path, "saved_models/heart_disease_model.json");
    }

    #[test]
    fn test_server_config_partial_yaml_fills_defaults() {
        let config: ServerConfig = serde_yaml::from_str("listen_addr: \"0.0.0.0:9000\"").unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.model_path, "saved_models/heart_disease_model.json");
    }
}
