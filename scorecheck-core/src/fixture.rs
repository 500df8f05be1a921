//! Test fixture loading and validation.
//!
//! A fixture is a JSON document holding exactly a two-element array
//! `[features, labels]`:
//!
//! ```json
//! [[[5.1, 3.5, 1.4, 0.2], [6.2, 2.9, 4.3, 1.3]], [0, 1]]
//! ```
//!
//! `features` is a list of equal-length numeric rows and `labels` holds one
//! label (integer or string) per row. Whole-number float labels such as `1.0`,
//! as written by numpy exports, read as integers; `0.5` is rejected.

use crate::error::FixtureError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// Conventional fixture location, relative to the workspace.
pub const DEFAULT_FIXTURE_PATH: &str = "data/test_data.json";

/// A class label. Integer and string labels never compare equal to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged, try_from = "RawLabel")]
pub enum Label {
    Int(i64),
    Text(String),
}

/// Label as it appears on disk, before float labels are narrowed to integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Int(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<RawLabel> for Label {
    type Error = String;

    fn try_from(raw: RawLabel) -> Result<Self, Self::Error> {
        match raw {
            RawLabel::Int(v) => Ok(Self::Int(v)),
            RawLabel::Text(v) => Ok(Self::Text(v)),
            RawLabel::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                Ok(Self::Int(v as i64))
            }
            RawLabel::Float(v) => Err(format!("label {v} is not a whole number")),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A validated `(features, labels)` pair.
///
/// Construction goes through [`Fixture::load`] or [`Fixture::from_parts`], so a
/// value of this type always has matching lengths, at least one row, and rows of
/// one dimensionality.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    features: Vec<Vec<f64>>,
    labels: Vec<Label>,
    digest: String,
    source: Option<PathBuf>,
}

impl Fixture {
    /// Read and validate a fixture file.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FixtureError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                FixtureError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let (features, labels): (Vec<Vec<f64>>, Vec<Label>) = serde_json::from_slice(&bytes)
            .map_err(|source| FixtureError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let mut fixture = Self::validated(features, labels, hash_bytes(&bytes))?;
        fixture.source = Some(path.to_path_buf());

        tracing::debug!(
            path = %path.display(),
            rows = fixture.len(),
            dimensions = fixture.dimensions(),
            digest = %fixture.digest,
            "Loaded fixture"
        );
        Ok(fixture)
    }

    /// Build a fixture from in-memory parts, applying the same validation as `load`.
    ///
    /// The digest covers every feature value's bit pattern and every label.
    pub fn from_parts(features: Vec<Vec<f64>>, labels: Vec<Label>) -> Result<Self, FixtureError> {
        let digest = hash_parts(&features, &labels);
        Self::validated(features, labels, digest)
    }

    fn validated(
        features: Vec<Vec<f64>>,
        labels: Vec<Label>,
        digest: String,
    ) -> Result<Self, FixtureError> {
        if features.len() != labels.len() {
            return Err(FixtureError::LengthMismatch {
                features: features.len(),
                labels: labels.len(),
            });
        }
        let Some(first) = features.first() else {
            return Err(FixtureError::Empty);
        };

        let expected = first.len();
        for (row, values) in features.iter().enumerate() {
            if values.len() != expected {
                return Err(FixtureError::Jagged {
                    row,
                    expected,
                    actual: values.len(),
                });
            }
            if let Some(column) = values.iter().position(|v| !v.is_finite()) {
                return Err(FixtureError::NonFinite { row, column });
            }
        }

        Ok(Self {
            features,
            labels,
            digest,
            source: None,
        })
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a validated fixture.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature count per row.
    pub fn dimensions(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    /// SHA-256 of the fixture bytes, hex encoded.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// File the fixture was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Compute SHA-256 hash of arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn hash_parts(features: &[Vec<f64>], labels: &[Label]) -> String {
    let mut hasher = Sha256::new();
    for row in features {
        hasher.update((row.len() as u64).to_le_bytes());
        for value in row {
            hasher.update(value.to_le_bytes());
        }
    }
    for label in labels {
        match label {
            Label::Int(v) => {
                hasher.update([0u8]);
                hasher.update(v.to_le_bytes());
            }
            Label::Text(v) => {
                hasher.update([1u8]);
                hasher.update((v.len() as u64).to_le_bytes());
                hasher.update(v.as_bytes());
            }
        }
    }
    format!("{:x}", hasher.finalize())
}
