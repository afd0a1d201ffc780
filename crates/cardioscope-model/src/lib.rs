//! Classifier loading and inference for Cardioscope.
//!
//! Provides [`HeartClassifier`], a standardized logistic-regression model
//! deserialized once from disk at startup, and [`Predictor`], the inference
//! entry point request handlers call. The classifier is immutable after
//! loading; inference is a pure function of its parameters and input, so a
//! single instance is safe to share read-only across concurrent sessions.

use std::collections::HashMap;
use std::path::Path;

use cardioscope_core::{
    CardioError, FeatureVector, Result, Verdict, FEATURE_COUNT, FEATURE_ORDER,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Serialized artifact
// ---------------------------------------------------------------------------

/// On-disk schema of the classifier artifact.
///
/// The artifact is produced by an external training process and bundled in
/// `saved_models/`. It describes a logistic regression over standardized
/// inputs: each feature is shifted by `means` and divided by `scales` before
/// the dot product with `coefficients`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Artifact schema version.
    pub version: u32,
    /// Feature names in training order; must match [`FEATURE_ORDER`].
    pub feature_names: Vec<String>,
    /// Per-feature standardization means.
    pub means: Vec<f64>,
    /// Per-feature standardization scales.
    pub scales: Vec<f64>,
    /// Logistic-regression coefficients over standardized features.
    pub coefficients: Vec<f64>,
    /// Logistic-regression intercept.
    pub intercept: f64,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// A validated, in-memory heart-disease classifier.
pub struct HeartClassifier {
    means: [f64; FEATURE_COUNT],
    scales: [f64; FEATURE_COUNT],
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
}

impl HeartClassifier {
    /// Load and validate a classifier artifact from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CardioError::Model`] if the file cannot be read, the JSON
    /// is malformed, or the artifact fails validation. Callers must treat
    /// this as fatal: a process without a classifier cannot serve requests.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CardioError::Model(format!(
                "Failed to read classifier artifact {}: {}",
                path.display(),
                e
            ))
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&contents).map_err(|e| {
            CardioError::Model(format!(
                "Failed to parse classifier artifact {}: {}",
                path.display(),
                e
            ))
        })?;
        let classifier = Self::from_artifact(artifact)?;
        info!(path = %path.display(), "Heart-disease classifier loaded");
        Ok(classifier)
    }

    /// Validate an artifact and build the classifier.
    ///
    /// The feature-name list must equal [`FEATURE_ORDER`] exactly; the model
    /// is positional and a reordered artifact would silently score wrong.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        if artifact.feature_names != FEATURE_ORDER {
            return Err(CardioError::Model(format!(
                "Artifact feature order {:?} does not match the trained order {:?}",
                artifact.feature_names, FEATURE_ORDER
            )));
        }

        let means = to_row(&artifact.means, "means")?;
        let scales = to_row(&artifact.scales, "scales")?;
        let coefficients = to_row(&artifact.coefficients, "coefficients")?;

        for (name, scale) in FEATURE_ORDER.iter().zip(scales.iter()) {
            if !scale.is_finite() || *scale == 0.0 {
                return Err(CardioError::Model(format!(
                    "Artifact scale for '{}' must be finite and non-zero, got {}",
                    name, scale
                )));
            }
        }
        for value in means.iter().chain(coefficients.iter()) {
            if !value.is_finite() {
                return Err(CardioError::Model(
                    "Artifact parameters must be finite".to_string(),
                ));
            }
        }
        if !artifact.intercept.is_finite() {
            return Err(CardioError::Model(
                "Artifact intercept must be finite".to_string(),
            ));
        }

        Ok(Self {
            means,
            scales,
            coefficients,
            intercept: artifact.intercept,
        })
    }

    /// Signed distance of a row from the decision boundary.
    pub fn decision_value(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let mut z = self.intercept;
        for i in 0..FEATURE_COUNT {
            z += self.coefficients[i] * (row[i] - self.means[i]) / self.scales[i];
        }
        z
    }

    /// Raw class label for a row: `1` above the boundary, `0` otherwise.
    pub fn predict_label(&self, row: &[f64; FEATURE_COUNT]) -> i64 {
        i64::from(self.decision_value(row) > 0.0)
    }
}

/// Convert an artifact vector into a fixed-size row, checking its length.
fn to_row(values: &[f64], what: &str) -> Result<[f64; FEATURE_COUNT]> {
    <[f64; FEATURE_COUNT]>::try_from(values).map_err(|_| {
        CardioError::Model(format!(
            "Artifact {} must have length {}, got {}",
            what,
            FEATURE_COUNT,
            values.len()
        ))
    })
}

// ---------------------------------------------------------------------------
// Predictor
// ---------------------------------------------------------------------------

/// Inference entry point handed to request handlers.
///
/// Wraps the loaded classifier behind the error boundary the surfaces rely
/// on: any per-request failure — a field that does not coerce, a missing
/// field, a non-finite score — is collapsed into the single
/// [`CardioError::ValidationFailed`] kind with no cause distinction.
pub struct Predictor {
    classifier: HeartClassifier,
}

impl Predictor {
    /// Wrap an already-loaded classifier.
    pub fn new(classifier: HeartClassifier) -> Self {
        Self { classifier }
    }

    /// Load the classifier from `path` and wrap it.
    ///
    /// # Errors
    ///
    /// Propagates [`CardioError::Model`]; see [`HeartClassifier::load`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(HeartClassifier::load(path)?))
    }

    /// Score a single feature vector.
    ///
    /// # Errors
    ///
    /// Returns [`CardioError::ValidationFailed`] when the decision value is
    /// not finite (a NaN or infinite input poisons the dot product).
    pub fn predict(&self, vector: &FeatureVector) -> Result<Verdict> {
        let row = vector.as_row();
        let z = self.classifier.decision_value(&row);
        if !z.is_finite() {
            return Err(CardioError::ValidationFailed);
        }
        let label = i64::from(z > 0.0);
        debug!(decision_value = z, label, "Scored feature vector");
        Ok(Verdict::from_label(label))
    }

    /// Coerce raw submitted fields and score them.
    ///
    /// Fields are looked up by name and assembled in [`FEATURE_ORDER`], so
    /// the submission order never matters. Every coercion failure maps to
    /// [`CardioError::ValidationFailed`].
    pub fn predict_raw(&self, fields: &HashMap<String, String>) -> Result<Verdict> {
        let mut row = [0.0; FEATURE_COUNT];
        for (slot, name) in row.iter_mut().zip(FEATURE_ORDER.iter()) {
            let raw = fields.get(*name).ok_or(CardioError::ValidationFailed)?;
            *slot = raw
                .trim()
                .parse()
                .map_err(|_| CardioError::ValidationFailed)?;
        }
        self.predict(&FeatureVector::from_row(row))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
