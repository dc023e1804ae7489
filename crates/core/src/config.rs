//! `ics.toml` settings shared by the CLI and the language server.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "ics.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IcsConfig {
    pub specs: SpecsConfig,
    pub verifier: VerifierConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecsConfig {
    /// Directory of assignment spec files. Relative paths are resolved
    /// against the directory holding the config file.
    pub dir: PathBuf,
}

impl Default for SpecsConfig {
    fn default() -> Self {
        SpecsConfig {
            dir: PathBuf::from("specs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    pub enabled: bool,
    pub program: String,
    /// Arguments placed before the source file path.
    pub args: Vec<String>,
    pub timeout_secs: u64,
    pub parallel: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        VerifierConfig {
            enabled: true,
            program: "ocamlfind".to_string(),
            args: vec!["ocamlc".to_string(), "-i".to_string()],
            timeout_secs: 10,
            parallel: false,
        }
    }
}

impl VerifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl IcsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// `dir/ics.toml` when present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// The spec directory, resolved against `base` when relative.
    pub fn resolve_spec_dir(&self, base: &Path) -> PathBuf {
        if self.specs.dir.is_absolute() {
            self.specs.dir.clone()
        } else {
            base.join(&self.specs.dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = IcsConfig::from_toml_str("").unwrap();
        assert_eq!(config, IcsConfig::default());
        assert_eq!(config.verifier.timeout(), Duration::from_secs(10));
        assert_eq!(config.verifier.args, vec!["ocamlc", "-i"]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config =
            IcsConfig::from_toml_str("[verifier]\ntimeout_secs = 3\nparallel = true\n").unwrap();
        assert_eq!(config.verifier.timeout_secs, 3);
        assert!(config.verifier.parallel);
        assert_eq!(config.verifier.program, "ocamlfind");
        assert_eq!(config.specs.dir, PathBuf::from("specs"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(IcsConfig::from_toml_str("[verifier]\ntimeout = 3\n").is_err());
    }

    #[test]
    fn discover_reads_file_and_resolves_relative_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[specs]\ndir = \"assignments\"\n").unwrap();
        let config = IcsConfig::discover(dir.path()).unwrap();
        assert_eq!(config.resolve_spec_dir(dir.path()), dir.path().join("assignments"));

        let empty = tempfile::tempdir().unwrap();
        assert_eq!(IcsConfig::discover(empty.path()).unwrap(), IcsConfig::default());
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[specs\n").unwrap();
        let err = IcsConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}
