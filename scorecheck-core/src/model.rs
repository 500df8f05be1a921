//! Persisted pre-trained models.
//!
//! A model file is a JSON object tagged by `kind`:
//!
//! ```json
//! { "kind": "linear", "classes": [0, 1], "weights": [[0.5, -1.0], [-0.5, 1.0]], "intercepts": [0.0, 0.1] }
//! { "kind": "nearest_centroid", "classes": ["a", "b"], "centroids": [[0.0, 0.0], [5.0, 5.0]] }
//! { "kind": "majority", "label": 1 }
//! ```

use crate::classifier::Classifier;
use crate::error::ClassifierError;
use crate::fixture::Label;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conventional model location, relative to the workspace.
pub const DEFAULT_MODEL_PATH: &str = "data/model.json";

/// Serialized form of a supported model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear {
        classes: Vec<Label>,
        weights: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    NearestCentroid {
        classes: Vec<Label>,
        centroids: Vec<Vec<f64>>,
    },
    Majority {
        label: Label,
    },
}

impl ModelSpec {
    /// Check shapes and build the described classifier.
    pub fn build(self) -> Result<Box<dyn Classifier>, ClassifierError> {
        match self {
            Self::Linear {
                classes,
                weights,
                intercepts,
            } => Ok(Box::new(LinearClassifier::new(classes, weights, intercepts)?)),
            Self::NearestCentroid { classes, centroids } => {
                Ok(Box::new(NearestCentroid::new(classes, centroids)?))
            }
            Self::Majority { label } => Ok(Box::new(MajorityClass::new(label))),
        }
    }
}

/// Load a model file and build its classifier.
pub fn load_model(path: &Path) -> Result<Box<dyn Classifier>, ClassifierError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ClassifierError::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    let spec: ModelSpec = serde_json::from_str(&content)
        .map_err(|e| ClassifierError::invalid(format!("{}: {e}", path.display())))?;
    let classifier = spec.build()?;
    tracing::debug!(path = %path.display(), model = classifier.name(), "Loaded model");
    Ok(classifier)
}

/// Check that `rows` is non-empty, matches `classes` in count, and is rectangular.
/// Returns the shared row length.
fn check_matrix(what: &str, classes: &[Label], rows: &[Vec<f64>]) -> Result<usize, ClassifierError> {
    if classes.is_empty() {
        return Err(ClassifierError::invalid("model has no classes"));
    }
    if rows.len() != classes.len() {
        return Err(ClassifierError::invalid(format!(
            "{} classes but {} {what}",
            classes.len(),
            rows.len()
        )));
    }
    let dimensions = rows[0].len();
    if dimensions == 0 {
        return Err(ClassifierError::invalid(format!("{what} are empty")));
    }
    if let Some(i) = rows.iter().position(|r| r.len() != dimensions) {
        return Err(ClassifierError::invalid(format!(
            "{what} row {i} has {} values, expected {dimensions}",
            rows[i].len()
        )));
    }
    Ok(dimensions)
}

/// Index of the first maximum. Ties go to the lower index.
fn argmax(values: impl Iterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, v) in values.enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// One-vs-rest linear model: picks the class with the highest `w · x + b`.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    classes: Vec<Label>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    dimensions: usize,
}

impl LinearClassifier {
    pub fn new(
        classes: Vec<Label>,
        weights: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self, ClassifierError> {
        let dimensions = check_matrix("weights", &classes, &weights)?;
        if intercepts.len() != classes.len() {
            return Err(ClassifierError::invalid(format!(
                "{} classes but {} intercepts",
                classes.len(),
                intercepts.len()
            )));
        }
        Ok(Self {
            classes,
            weights,
            intercepts,
            dimensions,
        })
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, row: &[f64]) -> Result<Label, ClassifierError> {
        if row.len() != self.dimensions {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.dimensions,
                actual: row.len(),
            });
        }
        let scores = self.weights.iter().zip(&self.intercepts).map(|(w, b)| {
            w.iter().zip(row).map(|(weight, x)| weight * x).sum::<f64>() + b
        });
        Ok(self.classes[argmax(scores)].clone())
    }

    fn name(&self) -> &str {
        "linear"
    }
}

/// Picks the class whose centroid is closest in squared Euclidean distance.
#[derive(Debug, Clone)]
pub struct NearestCentroid {
    classes: Vec<Label>,
    centroids: Vec<Vec<f64>>,
    dimensions: usize,
}

impl NearestCentroid {
    pub fn new(classes: Vec<Label>, centroids: Vec<Vec<f64>>) -> Result<Self, ClassifierError> {
        let dimensions = check_matrix("centroids", &classes, &centroids)?;
        Ok(Self {
            classes,
            centroids,
            dimensions,
        })
    }
}

impl Classifier for NearestCentroid {
    fn predict(&self, row: &[f64]) -> Result<Label, ClassifierError> {
        if row.len() != self.dimensions {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.dimensions,
                actual: row.len(),
            });
        }
        let closeness = self.centroids.iter().map(|c| {
            -c.iter()
                .zip(row)
                .map(|(a, x)| (a - x) * (a - x))
                .sum::<f64>()
        });
        Ok(self.classes[argmax(closeness)].clone())
    }

    fn name(&self) -> &str {
        "nearest_centroid"
    }
}

/// Baseline that always predicts one label.
#[derive(Debug, Clone)]
pub struct MajorityClass {
    label: Label,
}

impl MajorityClass {
    pub fn new(label: Label) -> Self {
        Self { label }
    }
}

impl Classifier for MajorityClass {
    fn predict(&self, _row: &[f64]) -> Result<Label, ClassifierError> {
        Ok(self.label.clone())
    }

    fn name(&self) -> &str {
        "majority"
    }
}
