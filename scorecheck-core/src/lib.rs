//! # scorecheck-core — Accuracy gate for pre-trained classifiers
//!
//! Loads a fixed `(features, labels)` fixture, scores an injected classifier on
//! it, and reports whether the accuracy strictly exceeds a threshold (0.9 by
//! default).
//!
//! ```no_run
//! use scorecheck_core::{AccuracyCheck, load_model};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let classifier = load_model(Path::new("data/model.json"))?;
//! let verdict = AccuracyCheck::new(Arc::from(classifier)).run()?;
//! println!("{}", verdict.summary());
//! # Ok::<(), scorecheck_core::CheckError>(())
//! ```

pub mod check;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fixture;
pub mod model;

// Re-exports
pub use check::{ACCURACY_THRESHOLD, AccuracyCheck, AccuracyResult, Verdict};
pub use classifier::Classifier;
pub use config::{CheckConfig, ConfigOverrides, load_config};
pub use error::{AccuracyAssertionFailure, CheckError, ClassifierError, FixtureError};
pub use fixture::{Fixture, Label};
pub use model::{ModelSpec, load_model};
