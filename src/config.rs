//! Runtime configuration.
//!
//! The binary takes no flags. The manifest location comes from the
//! `DECKGEN_MANIFEST` environment variable and falls back to
//! [`DEFAULT_MANIFEST`]; log verbosity comes from `RUST_LOG`.

use std::path::PathBuf;

/// Environment variable overriding the manifest path.
pub const MANIFEST_ENV: &str = "DECKGEN_MANIFEST";

/// Manifest path used when [`MANIFEST_ENV`] is unset.
pub const DEFAULT_MANIFEST: &str = "presentation/deck.yaml";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub manifest_path: PathBuf,
}

impl Config {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let manifest_path = lookup(MANIFEST_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST));
        Self { manifest_path }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
        }
    }
}
