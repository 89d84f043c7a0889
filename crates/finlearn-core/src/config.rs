//! API key configuration.
//!
//! Keys come from a TOML secrets file and may be overridden per key by
//! environment variables (`FINLEARN_*` first, then the provider's conventional
//! name). Each key unlocks exactly one [`Feature`]; a missing key blocks only
//! that feature.
//!
//! ```toml
//! [newsapi]
//! api_key = "..."
//!
//! [alpha_vantage]
//! api_key = "..."
//!
//! [openai]
//! api_key = "..."
//! ```

use std::env;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming an explicit secrets file.
pub const SECRETS_PATH_ENV: &str = "FINLEARN_SECRETS";

/// Secrets file consulted when no path is given. Absence is not an error.
pub const DEFAULT_SECRETS_PATH: &str = ".finlearn/secrets.toml";

/// Capability gated behind an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    News,
    MarketDataFallback,
    Chat,
}

impl Feature {
    pub const ALL: [Self; 3] = [Self::News, Self::MarketDataFallback, Self::Chat];

    /// Primary environment override.
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::News => "FINLEARN_NEWSAPI_API_KEY",
            Self::MarketDataFallback => "FINLEARN_ALPHAVANTAGE_API_KEY",
            Self::Chat => "FINLEARN_OPENAI_API_KEY",
        }
    }

    /// Conventional provider variable, consulted after [`Feature::env_var`].
    pub const fn fallback_env_var(self) -> &'static str {
        match self {
            Self::News => "NEWSAPI_API_KEY",
            Self::MarketDataFallback => "ALPHAVANTAGE_API_KEY",
            Self::Chat => "OPENAI_API_KEY",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::News => "news",
            Self::MarketDataFallback => "market data fallback",
            Self::Chat => "chat",
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{feature} is unavailable: no API key configured (set {env_var} or add it to the secrets file)")]
    Missing {
        feature: Feature,
        env_var: &'static str,
    },
    #[error("failed to read secrets file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse secrets file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Resolved API keys. Blank values are treated as absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    newsapi: Option<String>,
    alpha_vantage: Option<String>,
    openai: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mask = |key: &Option<String>| if key.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("newsapi", &mask(&self.newsapi))
            .field("alpha_vantage", &mask(&self.alpha_vantage))
            .field("openai", &mask(&self.openai))
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(default)]
    newsapi: KeySection,
    #[serde(default)]
    alpha_vantage: KeySection,
    #[serde(default)]
    openai: KeySection,
}

#[derive(Debug, Default, Deserialize)]
struct KeySection {
    #[serde(default)]
    api_key: Option<String>,
}

impl Secrets {
    /// Load keys from the resolved secrets file, then apply environment overrides.
    ///
    /// Path resolution: `explicit`, else `$FINLEARN_SECRETS`, else
    /// [`DEFAULT_SECRETS_PATH`]. Only the default path may be absent.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] or [`ConfigError::Parse`] when a named file is
    /// missing or invalid, or the default file exists but cannot be parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| non_blank_env(SECRETS_PATH_ENV).map(PathBuf::from));

        let secrets = match named {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = Path::new(DEFAULT_SECRETS_PATH);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    debug!(path = DEFAULT_SECRETS_PATH, "no secrets file; using environment only");
                    Self::default()
                }
            }
        };

        Ok(secrets.with_env_overrides())
    }

    /// Read and parse one secrets file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let file: SecretsFile = toml::from_str(text)?;
        Ok(Self {
            newsapi: non_blank(file.newsapi.api_key),
            alpha_vantage: non_blank(file.alpha_vantage.api_key),
            openai: non_blank(file.openai.api_key),
        })
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|name| env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for feature in Feature::ALL {
            let value = non_blank(lookup(feature.env_var()))
                .or_else(|| non_blank(lookup(feature.fallback_env_var())));
            if let Some(value) = value {
                *self.slot_mut(feature) = Some(value);
            }
        }
        self
    }

    pub fn with_key(mut self, feature: Feature, key: impl Into<String>) -> Self {
        *self.slot_mut(feature) = non_blank(Some(key.into()));
        self
    }

    pub fn api_key(&self, feature: Feature) -> Option<&str> {
        match feature {
            Feature::News => self.newsapi.as_deref(),
            Feature::MarketDataFallback => self.alpha_vantage.as_deref(),
            Feature::Chat => self.openai.as_deref(),
        }
    }

    /// Key for `feature`, or the error that blocks it.
    pub fn require(&self, feature: Feature) -> Result<&str, ConfigError> {
        self.api_key(feature).ok_or(ConfigError::Missing {
            feature,
            env_var: feature.env_var(),
        })
    }

    fn slot_mut(&mut self, feature: Feature) -> &mut Option<String> {
        match feature {
            Feature::News => &mut self.newsapi,
            Feature::MarketDataFallback => &mut self.alpha_vantage,
            Feature::Chat => &mut self.openai,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn non_blank_env(name: &str) -> Option<String> {
    non_blank(env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections_and_ignores_blank_keys() {
        let secrets = Secrets::from_toml_str(
            r#"
            [newsapi]
            api_key = "news-key"

            [openai]
            api_key = "   "
            "#,
        )
        .expect("valid toml");

        assert_eq!(secrets.api_key(Feature::News), Some("news-key"));
        assert_eq!(secrets.api_key(Feature::MarketDataFallback), None);
        assert_eq!(secrets.api_key(Feature::Chat), None);
    }

    #[test]
    fn prefixed_env_var_wins_over_conventional_name() {
        let secrets = Secrets::default().with_env_lookup(|name| match name {
            "FINLEARN_OPENAI_API_KEY" => Some("prefixed".into()),
            "OPENAI_API_KEY" => Some("plain".into()),
            "ALPHAVANTAGE_API_KEY" => Some("av".into()),
            _ => None,
        });

        assert_eq!(secrets.api_key(Feature::Chat), Some("prefixed"));
        assert_eq!(secrets.api_key(Feature::MarketDataFallback), Some("av"));
    }

    #[test]
    fn require_names_the_blocked_feature() {
        let error = Secrets::default()
            .require(Feature::News)
            .expect_err("missing key");

        assert!(matches!(
            error,
            ConfigError::Missing {
                feature: Feature::News,
                env_var: "FINLEARN_NEWSAPI_API_KEY"
            }
        ));
        assert!(error.to_string().starts_with("news is unavailable"));
    }

    #[test]
    fn debug_output_masks_keys() {
        let secrets = Secrets::default().with_key(Feature::Chat, "sk-secret");
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<set>"));
    }
}
