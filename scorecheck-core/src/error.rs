//! Error types for the scorecheck-core crate.

use std::path::PathBuf;
use thiserror::Error;

/// The test fixture could not be loaded or does not have the expected shape.
///
/// Any of these means the check never reached the scoring step.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Fixture not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read fixture {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fixture {} is not a [features, labels] pair: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Fixture has {features} feature rows but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },

    #[error("Fixture row {row} has {actual} features, expected {expected}")]
    Jagged {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Fixture contains no rows")]
    Empty,

    #[error("Fixture value at row {row}, column {column} is not finite")]
    NonFinite { row: usize, column: usize },
}

/// The classifier dependency is missing or cannot score the fixture.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Model not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Invalid model: {0}")]
    Invalid(String),

    #[error("Row has {actual} features but the model expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Classifier returned score {0}, expected a value in [0, 1]")]
    ScoreOutOfRange(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClassifierError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Top-level error for a check run.
///
/// A threshold miss is not an error; see [`crate::check::Verdict`].
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Fixture error: {0}")]
    Fixture(#[from] FixtureError),

    #[error("Classifier dependency error: {0}")]
    Dependency(#[from] ClassifierError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CheckError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the failure happened while loading the fixture.
    pub fn is_fixture(&self) -> bool {
        matches!(self, Self::Fixture(_))
    }

    /// Whether the failure came from the classifier dependency.
    pub fn is_dependency(&self) -> bool {
        matches!(self, Self::Dependency(_))
    }
}

impl From<Box<figment::Error>> for CheckError {
    fn from(err: Box<figment::Error>) -> Self {
        Self::Config(err.to_string())
    }
}

/// The classifier's accuracy did not exceed the threshold.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Accuracy {accuracy:.6} did not exceed threshold {threshold:.6}")]
pub struct AccuracyAssertionFailure {
    pub accuracy: f64,
    pub threshold: f64,
}
