//! Configuration for the accuracy check.
//!
//! Uses `figment` for layered configuration: defaults -> user config -> workspace
//! config -> explicit config file -> environment -> explicit overrides.
//! Configuration is read from `<config dir>/scorecheck/config.toml` and/or
//! `.scorecheck/config.toml` in the workspace directory.
//!
//! Only file locations are configurable. The accuracy threshold is fixed at
//! [`crate::check::ACCURACY_THRESHOLD`]; a `threshold` key in a config file is
//! rejected and a `SCORECHECK_THRESHOLD` variable is ignored.

use crate::error::CheckError;
use crate::fixture::DEFAULT_FIXTURE_PATH;
use crate::model::DEFAULT_MODEL_PATH;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Keys the `SCORECHECK_` environment layer may set.
const ENV_KEYS: &[&str] = &["fixture_path", "model_path"];

/// File locations for one check run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    /// Fixture file; relative paths resolve against the workspace.
    #[serde(default = "default_fixture_path")]
    pub fixture_path: PathBuf,
    /// Model file; relative paths resolve against the workspace.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            fixture_path: default_fixture_path(),
            model_path: default_model_path(),
        }
    }
}

fn default_fixture_path() -> PathBuf {
    PathBuf::from(DEFAULT_FIXTURE_PATH)
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

/// Partial settings supplied by a caller, typically from CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
}

impl CheckConfig {
    /// Rewrite relative paths so they are rooted at `workspace`.
    pub fn resolve_paths(mut self, workspace: &Path) -> Self {
        if self.fixture_path.is_relative() {
            self.fixture_path = workspace.join(&self.fixture_path);
        }
        if self.model_path.is_relative() {
            self.model_path = workspace.join(&self.model_path);
        }
        self
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (`SCORECHECK_FIXTURE_PATH`, `SCORECHECK_MODEL_PATH`)
/// 3. Explicit config file (`config_file`, e.g. from `--config`)
/// 4. Workspace-local config (`.scorecheck/config.toml`)
/// 5. User config (`~/.config/scorecheck/config.toml`)
/// 6. Built-in defaults
///
/// An explicit `config_file` that does not exist is an error. Relative paths in
/// the result are resolved against `workspace` when given.
pub fn load_config(
    workspace: Option<&Path>,
    config_file: Option<&Path>,
    overrides: Option<&ConfigOverrides>,
) -> Result<CheckConfig, CheckError> {
    let mut figment = Figment::from(Serialized::defaults(CheckConfig::default()));

    if let Some(config_dir) = directories::ProjectDirs::from("dev", "scorecheck", "scorecheck") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".scorecheck").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = config_file {
        if !path.is_file() {
            return Err(CheckError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        figment = figment.merge(Toml::file_exact(path));
    }

    figment = figment.merge(Env::prefixed("SCORECHECK_").only(ENV_KEYS));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: CheckConfig = figment.extract().map_err(Box::new)?;

    tracing::debug!(
        fixture = %config.fixture_path.display(),
        model = %config.model_path.display(),
        "Loaded configuration"
    );

    Ok(match workspace {
        Some(ws) => config.resolve_paths(ws),
        None => config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{ACCURACY_THRESHOLD, AccuracyCheck};
    use crate::fixture::Label;
    use crate::model::MajorityClass;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    /// Clear the environment and point the user config dir inside the jail.
    fn sandbox(jail: &mut Jail) {
        jail.clear_env();
        let xdg = jail.directory().join("xdg");
        jail.set_env("XDG_CONFIG_HOME", xdg.display());
    }

    fn load(
        jail: &Jail,
        config_file: Option<&Path>,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<CheckConfig, CheckError> {
        load_config(Some(jail.directory()), config_file, overrides)
    }

    #[test]
    fn test_default_config() {
        let config = CheckConfig::default();
        assert_eq!(config.fixture_path, PathBuf::from("data/test_data.json"));
        assert_eq!(config.model_path, PathBuf::from("data/model.json"));
    }

    #[test]
    fn test_load_config_with_overrides() {
        Jail::expect_with(|jail| {
            sandbox(jail);
            let overrides = ConfigOverrides {
                fixture_path: Some(PathBuf::from("other/fixture.json")),
                ..Default::default()
            };
            let config = load(jail, None, Some(&overrides)).map_err(|e| e.to_string())?;
            assert_eq!(config.fixture_path, jail.directory().join("other/fixture.json"));
            assert_eq!(config.model_path, jail.directory().join("data/model.json"));
            Ok(())
        });
    }

    #[test]
    fn test_load_config_from_workspace() {
        Jail::expect_with(|jail| {
            sandbox(jail);
            jail.create_dir(".scorecheck")?;
            let file = CheckConfig {
                fixture_path: PathBuf::from("fixtures/holdout.json"),
                model_path: PathBuf::from("/opt/models/model.json"),
            };
            jail.create_file(
                ".scorecheck/config.toml",
                &toml::to_string(&file).map_err(|e| e.to_string())?,
            )?;

            let config = load(jail, None, None).map_err(|e| e.to_string())?;
            assert_eq!(config.fixture_path, jail.directory().join("fixtures/holdout.json"));
            assert_eq!(config.model_path, PathBuf::from("/opt/models/model.json"));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_config_file_beats_workspace_file() {
        Jail::expect_with(|jail| {
            sandbox(jail);
            jail.create_dir(".scorecheck")?;
            jail.create_file(".scorecheck/config.toml", "fixture_path = \"ws.json\"\n")?;
            jail.create_file("ci.toml", "fixture_path = \"ci.json\"\n")?;

            let explicit = jail.directory().join("ci.toml");
            let config = load(jail, Some(&explicit), None).map_err(|e| e.to_string())?;
            assert_eq!(config.fixture_path, jail.directory().join("ci.json"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_config_file_is_error() {
        Jail::expect_with(|jail| {
            sandbox(jail);
            let missing = jail.directory().join("absent.toml");
            let err = load(jail, Some(&missing), None).unwrap_err();
            assert!(matches!(err, CheckError::Config(_)));
            Ok(())
        });
    }

    #[test]
    fn test_overrides_beat_environment() {
        Jail::expect_with(|jail| {
            sandbox(jail);
            jail.set_env("SCORECHECK_MODEL_PATH", "env-model.json");
            jail.set_env("SCORECHECK_FIXTURE_PATH", "env-fixture.json");
            let overrides = ConfigOverrides {
                fixture_path: Some(PathBuf::from("flag-fixture.json")),
                ..Default::default()
            };
            let config = load(jail, None, Some(&overrides)).map_err(|e| e.to_string())?;
            assert_eq!(config.model_path, jail.directory().join("env-model.json"));
            assert_eq!(config.fixture_path, jail.directory().join("flag-fixture.json"));
            Ok(())
        });
    }

    #[test]
    fn test_threshold_environment_variable_is_ignored() {
        Jail::expect_with(|jail| {
            sandbox(jail);
            jail.set_env("SCORECHECK_THRESHOLD", "0");
            let config = load(jail, None, None).map_err(|e| e.to_string())?;
            assert_eq!(config, CheckConfig::default().resolve_paths(jail.directory()));

            let check = AccuracyCheck::from_config(
                Arc::new(MajorityClass::new(Label::Int(0))),
                &config,
            );
            assert_eq!(check.threshold(), ACCURACY_THRESHOLD);
            Ok(())
        });
    }

    #[test]
    fn test_threshold_in_config_file_is_rejected() {
        Jail::expect_with(|jail| {
            sandbox(jail);
            jail.create_dir(".scorecheck")?;
            jail.create_file(".scorecheck/config.toml", "threshold = 0.0\n")?;
            let err = load(jail, None, None).unwrap_err();
            assert!(matches!(err, CheckError::Config(_)));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        Jail::expect_with(|jail| {
            sandbox(jail);
            jail.create_dir(".scorecheck")?;
            jail.create_file(".scorecheck/config.toml", "fixture_path = [1, 2]\n")?;
            let err = load(jail, None, None).unwrap_err();
            assert!(matches!(err, CheckError::Config(_)));
            Ok(())
        });
    }
}
