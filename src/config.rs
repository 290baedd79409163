//! Application-level configuration loading, including per-variant presets.

use std::{collections::HashMap, env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::game::{Direction, Score, Variant};

/// Default location on disk where the host looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCORE_KEEPER_CONFIG_PATH";
/// Directory used by the file store when the config does not name one.
const DEFAULT_DATA_DIR: &str = "data";
/// Round duration offered to custom games when the player enables the timer
/// without picking a value.
pub const DEFAULT_CUSTOM_COUNTDOWN_SECONDS: u32 = 120;

/// Defaults applied to a new game of one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPreset {
    /// Target used when the setup request leaves it out.
    pub target_score: Score,
    /// Direction used when the variant does not let the player choose.
    pub direction: Direction,
    /// Per-round countdown, only honored for customizable variants.
    pub countdown_seconds: Option<u32>,
}

impl VariantPreset {
    /// Built-in preset for `variant`.
    pub fn builtin(variant: Variant) -> Self {
        let target_score = match variant {
            Variant::Belote => 1000,
            Variant::Skyjo => 100,
            Variant::Custom => 100,
            Variant::Yam => 200,
        };
        let countdown_seconds = variant
            .is_customizable()
            .then_some(DEFAULT_CUSTOM_COUNTDOWN_SECONDS);

        Self {
            target_score,
            direction: variant.default_direction(),
            countdown_seconds,
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    data_dir: PathBuf,
    presets: HashMap<Variant, VariantPreset>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        data_dir = %app_config.data_dir.display(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Directory holding saved games for the file store.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Effective preset for `variant`.
    pub fn preset(&self, variant: Variant) -> VariantPreset {
        self.presets
            .get(&variant)
            .copied()
            .unwrap_or_else(|| VariantPreset::builtin(variant))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            presets: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    data_dir: Option<PathBuf>,
    #[serde(default)]
    presets: HashMap<Variant, RawPreset>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let presets = value
            .presets
            .into_iter()
            .map(|(variant, raw)| (variant, raw.apply(VariantPreset::builtin(variant))))
            .collect();

        Self {
            data_dir: value
                .data_dir
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            presets,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single preset override.
struct RawPreset {
    #[serde(default)]
    target_score: Option<Score>,
    #[serde(default)]
    countdown_seconds: Option<u32>,
}

impl RawPreset {
    fn apply(self, mut preset: VariantPreset) -> VariantPreset {
        if let Some(target) = self.target_score.filter(|target| *target >= 1) {
            preset.target_score = target;
        }
        if preset.countdown_seconds.is_some()
            && let Some(seconds) = self.countdown_seconds.filter(|seconds| *seconds > 0)
        {
            preset.countdown_seconds = Some(seconds);
        }
        preset
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_presets() {
        let config = AppConfig::default();
        assert_eq!(config.preset(Variant::Belote).target_score, 1000);
        assert_eq!(
            config.preset(Variant::Skyjo).direction,
            Direction::DescendingWins
        );
        assert_eq!(config.preset(Variant::Yam).countdown_seconds, None);
        assert_eq!(
            config.preset(Variant::Custom).countdown_seconds,
            Some(DEFAULT_CUSTOM_COUNTDOWN_SECONDS)
        );
        assert_eq!(config.data_dir(), &PathBuf::from("data"));
    }

    #[test]
    fn overrides_merge_with_builtins() {
        let config = AppConfig::from_json(
            r#"{
                "data_dir": "/var/lib/scores",
                "presets": {
                    "Skyjo": { "target_score": 80 },
                    "Custom": { "countdown_seconds": 45 },
                    "Belote": { "countdown_seconds": 30 }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.data_dir(), &PathBuf::from("/var/lib/scores"));
        let skyjo = config.preset(Variant::Skyjo);
        assert_eq!(skyjo.target_score, 80);
        assert_eq!(skyjo.direction, Direction::DescendingWins);
        assert_eq!(config.preset(Variant::Custom).countdown_seconds, Some(45));
        // Only the custom game runs a timer.
        assert_eq!(config.preset(Variant::Belote).countdown_seconds, None);
    }

    #[test]
    fn nonsensical_overrides_are_ignored() {
        let config =
            AppConfig::from_json(r#"{ "presets": { "Yam": { "target_score": 0 } } }"#).unwrap();
        assert_eq!(config.preset(Variant::Yam).target_score, 200);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.data_dir(), &PathBuf::from("data"));
        assert_eq!(config.preset(Variant::Custom).target_score, 100);
    }

    #[test]
    fn unknown_variant_is_a_parse_error() {
        assert!(AppConfig::from_json(r#"{ "presets": { "Tarot": {} } }"#).is_err());
    }
}
