//! Effective settings for one CLI run: `ics.toml` plus flag overrides.

use std::path::{Path, PathBuf};

use ics_core::config::CONFIG_FILE;
use ics_core::{ConfigError, IcsConfig};

/// Flags that take precedence over the config file.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub spec_dir: Option<PathBuf>,
    pub no_verify: bool,
    pub verifier_timeout: Option<u64>,
}

#[derive(Debug)]
pub(crate) struct Settings {
    pub config: IcsConfig,
    /// Spec directory with relative paths already resolved.
    pub spec_dir: PathBuf,
}

impl Settings {
    /// An explicit `--config` must exist. Otherwise `./ics.toml` is used
    /// when present. A relative spec dir in the file is resolved against
    /// the file's directory; one given by flag against the working
    /// directory.
    pub fn load(config_path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let (mut config, base) = match config_path {
            Some(path) => {
                let config = IcsConfig::load(path)?;
                let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
                (config, base)
            }
            None => {
                let cwd = PathBuf::from(".");
                let config = IcsConfig::discover(&cwd)?;
                tracing::debug!(found = cwd.join(CONFIG_FILE).is_file(), "config discovery");
                (config, cwd)
            }
        };

        if overrides.no_verify {
            config.verifier.enabled = false;
        }
        if let Some(secs) = overrides.verifier_timeout {
            config.verifier.timeout_secs = secs;
        }
        let spec_dir = match overrides.spec_dir {
            Some(dir) => dir,
            None => config.resolve_spec_dir(&base),
        };
        Ok(Settings { config, spec_dir })
    }
}
