//! The classifier capability scored by the accuracy check.

use crate::error::ClassifierError;
use crate::fixture::Label;

/// A pre-trained classifier.
///
/// Only [`Classifier::predict`] is required. [`Classifier::score`] defaults to
/// plain accuracy over `predict`; implementations whose score is computed
/// elsewhere override it directly.
pub trait Classifier: Send + Sync {
    /// Predict the label of a single feature row.
    fn predict(&self, row: &[f64]) -> Result<Label, ClassifierError>;

    /// Fraction of rows whose prediction equals the expected label.
    fn score(&self, features: &[Vec<f64>], labels: &[Label]) -> Result<f64, ClassifierError> {
        let predicted = features
            .iter()
            .map(|row| self.predict(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(accuracy(&predicted, labels))
    }

    /// Human-readable name for logs and reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Accuracy of `predicted` against `expected`, compared position by position.
///
/// Returns `0.0` when there is nothing to compare. Extra elements on either
/// side count as misses.
pub fn accuracy(predicted: &[Label], expected: &[Label]) -> f64 {
    let total = predicted.len().max(expected.len());
    if total == 0 {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(expected)
        .filter(|(p, e)| p == e)
        .count();
    correct as f64 / total as f64
}
