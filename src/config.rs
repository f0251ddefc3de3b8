//! Mirrorseed configuration
//!
//! Ledger locations and reflector policy in one place. Loaded from TOML at
//! startup, falls back to defaults if no config file exists.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorseedConfig {
    /// Where each ledger lives.
    pub ledgers: LedgerConfig,
    /// How the reflector selects echo lines.
    pub reflector: ReflectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Directory the ledger file names below are resolved against.
    pub dir: PathBuf,
    pub echo: String,
    pub reflection: String,
    pub recursion: String,
    pub pulse: String,
    /// Hash log written by the cleaning pass.
    pub fingerprint_log: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectorConfig {
    pub match_policy: MatchPolicy,
}

/// How echo ledger lines are matched against the current input id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// The raw line contains the input id anywhere. Compatible with ledgers
    /// written by earlier tooling, and also matches ids that merely share a
    /// substring.
    #[default]
    Substring,
    /// The parsed input id equals the current input id.
    Exact,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            echo: "echo.log".into(),
            reflection: "reflection.log".into(),
            recursion: "recursion.log".into(),
            pulse: "pulse.log".into(),
            fingerprint_log: "mirrorseed.log".into(),
        }
    }
}

impl LedgerConfig {
    pub fn echo_path(&self) -> PathBuf {
        self.dir.join(&self.echo)
    }

    pub fn reflection_path(&self) -> PathBuf {
        self.dir.join(&self.reflection)
    }

    pub fn recursion_path(&self) -> PathBuf {
        self.dir.join(&self.recursion)
    }

    pub fn pulse_path(&self) -> PathBuf {
        self.dir.join(&self.pulse)
    }

    pub fn fingerprint_log_path(&self) -> PathBuf {
        self.dir.join(&self.fingerprint_log)
    }
}

impl MirrorseedConfig {
    /// Config with every ledger placed under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.ledgers.dir = dir.into();
        config
    }

    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!("No config at {} - using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_under_dir() {
        let config = MirrorseedConfig::in_dir("/var/mirror");
        assert_eq!(config.ledgers.echo_path(), PathBuf::from("/var/mirror/echo.log"));
        assert_eq!(
            config.ledgers.fingerprint_log_path(),
            PathBuf::from("/var/mirror/mirrorseed.log")
        );
        assert_eq!(config.reflector.match_policy, MatchPolicy::Substring);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: MirrorseedConfig = toml::from_str(
            "[ledgers]\npulse = \"beats.log\"\n\n[reflector]\nmatch_policy = \"exact\"\n",
        )
        .unwrap();
        assert_eq!(config.ledgers.pulse, "beats.log");
        assert_eq!(config.ledgers.echo, "echo.log");
        assert_eq!(config.reflector.match_policy, MatchPolicy::Exact);
    }

    #[test]
    fn dumped_toml_parses_back() {
        let text = MirrorseedConfig::default().to_toml();
        let parsed: MirrorseedConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.ledgers.recursion, "recursion.log");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = MirrorseedConfig::load(Path::new("/nonexistent/mirrorseed.toml"));
        assert_eq!(config.ledgers.reflection, "reflection.log");
    }
}
