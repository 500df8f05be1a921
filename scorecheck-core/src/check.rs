//! The accuracy check: fixture load -> classifier score -> threshold comparison.

use crate::classifier::Classifier;
use crate::config::CheckConfig;
use crate::error::{AccuracyAssertionFailure, CheckError, ClassifierError};
use crate::fixture::{DEFAULT_FIXTURE_PATH, Fixture};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Minimum accuracy a classifier must strictly exceed.
pub const ACCURACY_THRESHOLD: f64 = 0.9;

/// Whether `accuracy` clears `threshold`. Equality does not.
pub fn exceeds_threshold(accuracy: f64, threshold: f64) -> bool {
    accuracy > threshold
}

fn validate_threshold(threshold: f64) -> Result<(), CheckError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(CheckError::config(format!(
            "threshold must be within [0, 1], got {threshold}"
        )))
    }
}

/// Outcome of a single scoring run, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyResult {
    pub accuracy: f64,
    pub threshold: f64,
    pub samples: usize,
    pub dimensions: usize,
    pub fixture_digest: String,
    pub classifier: String,
    pub evaluated_at: DateTime<Utc>,
}

impl AccuracyResult {
    pub fn passed(&self) -> bool {
        exceeds_threshold(self.accuracy, self.threshold)
    }
}

/// Terminal outcome of a completed check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Pass(AccuracyResult),
    Fail(AccuracyResult),
}

impl Verdict {
    fn from_result(result: AccuracyResult) -> Self {
        if result.passed() {
            Self::Pass(result)
        } else {
            Self::Fail(result)
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass(_))
    }

    pub fn result(&self) -> &AccuracyResult {
        match self {
            Self::Pass(r) | Self::Fail(r) => r,
        }
    }

    /// Turn a failing verdict into an assertion error carrying score and threshold.
    pub fn ensure_passed(self) -> Result<AccuracyResult, AccuracyAssertionFailure> {
        match self {
            Self::Pass(r) => Ok(r),
            Self::Fail(r) => Err(AccuracyAssertionFailure {
                accuracy: r.accuracy,
                threshold: r.threshold,
            }),
        }
    }

    /// One-line summary for terminal output.
    pub fn summary(&self) -> String {
        let r = self.result();
        match self {
            Self::Pass(_) => format!(
                "PASS: accuracy {:.4} > threshold {:.4} ({} samples, {})",
                r.accuracy, r.threshold, r.samples, r.classifier
            ),
            Self::Fail(_) => format!(
                "FAIL: accuracy {:.4} <= threshold {:.4} ({} samples, {})",
                r.accuracy, r.threshold, r.samples, r.classifier
            ),
        }
    }
}

/// Verifies that a classifier beats a minimum accuracy on a fixed fixture.
///
/// The classifier is injected; the check never constructs or mutates it.
pub struct AccuracyCheck {
    classifier: Arc<dyn Classifier>,
    fixture_path: PathBuf,
    threshold: f64,
}

impl AccuracyCheck {
    /// A check against the conventional fixture path and the default threshold.
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            fixture_path: PathBuf::from(DEFAULT_FIXTURE_PATH),
            threshold: ACCURACY_THRESHOLD,
        }
    }

    /// A check using the fixture location from loaded settings.
    ///
    /// Configuration never changes the threshold; it stays at
    /// [`ACCURACY_THRESHOLD`] unless [`AccuracyCheck::with_threshold`] is called.
    pub fn from_config(classifier: Arc<dyn Classifier>, config: &CheckConfig) -> Self {
        Self::new(classifier).with_fixture_path(&config.fixture_path)
    }

    pub fn with_fixture_path(mut self, path: impl AsRef<Path>) -> Self {
        self.fixture_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, CheckError> {
        validate_threshold(threshold)?;
        self.threshold = threshold;
        Ok(self)
    }

    pub fn fixture_path(&self) -> &Path {
        &self.fixture_path
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Load the fixture, score the classifier, and compare against the threshold.
    ///
    /// A threshold miss is `Ok(Verdict::Fail)`. Errors mean no verdict was reached.
    pub fn run(&self) -> Result<Verdict, CheckError> {
        let fixture = Fixture::load(&self.fixture_path)?;
        self.evaluate(&fixture)
    }

    /// Score an already loaded fixture.
    pub fn evaluate(&self, fixture: &Fixture) -> Result<Verdict, CheckError> {
        let accuracy = self
            .classifier
            .score(fixture.features(), fixture.labels())?;
        if !(0.0..=1.0).contains(&accuracy) {
            return Err(ClassifierError::ScoreOutOfRange(accuracy).into());
        }

        let verdict = Verdict::from_result(AccuracyResult {
            accuracy,
            threshold: self.threshold,
            samples: fixture.len(),
            dimensions: fixture.dimensions(),
            fixture_digest: fixture.digest().to_string(),
            classifier: self.classifier.name().to_string(),
            evaluated_at: Utc::now(),
        });

        match &verdict {
            Verdict::Pass(r) => tracing::info!(
                accuracy = r.accuracy,
                threshold = r.threshold,
                samples = r.samples,
                classifier = %r.classifier,
                "Accuracy check passed"
            ),
            Verdict::Fail(r) => tracing::warn!(
                accuracy = r.accuracy,
                threshold = r.threshold,
                samples = r.samples,
                classifier = %r.classifier,
                fixture_digest = %r.fixture_digest,
                "Accuracy check failed"
            ),
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Label;

    struct FixedScore(f64);

    impl Classifier for FixedScore {
        fn predict(&self, _row: &[f64]) -> Result<Label, ClassifierError> {
            Ok(Label::Int(0))
        }

        fn score(&self, _features: &[Vec<f64>], _labels: &[Label]) -> Result<f64, ClassifierError> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn fixture() -> Fixture {
        Fixture::from_parts(vec![vec![1.0], vec![2.0]], vec![Label::Int(0), Label::Int(1)])
            .unwrap()
    }

    fn check(score: f64) -> AccuracyCheck {
        AccuracyCheck::new(Arc::new(FixedScore(score)))
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!exceeds_threshold(0.9, 0.9));
        assert!(exceeds_threshold(0.9000001, 0.9));
        assert!(!exceeds_threshold(0.5, 0.9));
    }

    #[test]
    fn test_defaults() {
        let c = check(1.0);
        assert_eq!(c.fixture_path(), Path::new("data/test_data.json"));
        assert_eq!(c.threshold(), 0.9);
    }

    #[test]
    fn test_evaluate_pass_and_fail() {
        let pass = check(0.95).evaluate(&fixture()).unwrap();
        assert!(pass.is_pass());
        assert_eq!(pass.result().samples, 2);
        assert_eq!(pass.result().classifier, "fixed");

        let fail = check(0.9).evaluate(&fixture()).unwrap();
        assert!(!fail.is_pass());
        let err = fail.ensure_passed().unwrap_err();
        assert_eq!(err.accuracy, 0.9);
        assert_eq!(err.threshold, 0.9);
    }

    #[test]
    fn test_out_of_range_score_is_dependency_error() {
        for score in [f64::NAN, -0.1, 1.5] {
            let err = check(score).evaluate(&fixture()).unwrap_err();
            assert!(err.is_dependency(), "score {score} should be rejected");
        }
    }

    #[test]
    fn test_with_threshold_validates() {
        assert!(check(1.0).with_threshold(0.5).is_ok());
        assert!(matches!(
            check(1.0).with_threshold(-0.5),
            Err(CheckError::Config(_))
        ));
    }

    #[test]
    fn test_summary() {
        let verdict = check(1.0).evaluate(&fixture()).unwrap();
        assert_eq!(
            verdict.summary(),
            "PASS: accuracy 1.0000 > threshold 0.9000 (2 samples, fixed)"
        );
        let verdict = check(0.25).evaluate(&fixture()).unwrap();
        assert!(verdict.summary().starts_with("FAIL: accuracy 0.2500 <= threshold 0.9000"));
    }

    #[test]
    fn test_verdict_serializes_with_tag() {
        let verdict = check(1.0).evaluate(&fixture()).unwrap();
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["verdict"], "pass");
        assert_eq!(json["accuracy"], 1.0);
        assert_eq!(json["samples"], 2);
    }
}
