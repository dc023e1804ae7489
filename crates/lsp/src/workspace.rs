//! Per-workspace settings: the `ics.toml` of the workspace root and the
//! assignment specs it points at.

use std::path::{Path, PathBuf};

use ics_core::assignment::{AssignmentSpecProvider, CachedSpecProvider, DirectorySpecProvider};
use ics_core::config::CONFIG_FILE;
use ics_core::IcsConfig;
use tracing::{info, warn};

pub struct Workspace {
    root: Option<PathBuf>,
    provider: CachedSpecProvider<DirectorySpecProvider>,
}

impl Workspace {
    /// Load `root/ics.toml`. A broken config falls back to defaults so the
    /// editor still gets structural diagnostics.
    pub fn load(root: &Path) -> Self {
        let config = IcsConfig::discover(root).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring workspace config");
            IcsConfig::default()
        });
        let spec_dir = config.resolve_spec_dir(root);
        info!(root = %root.display(), spec_dir = %spec_dir.display(), "workspace loaded");
        Workspace {
            root: Some(root.to_path_buf()),
            provider: CachedSpecProvider::new(DirectorySpecProvider::new(spec_dir)),
        }
    }

    /// No workspace root known yet: specs resolve against the default
    /// directory relative to the server's working directory.
    pub fn unrooted() -> Self {
        let config = IcsConfig::default();
        Workspace {
            root: None,
            provider: CachedSpecProvider::new(DirectorySpecProvider::new(config.specs.dir)),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn provider(&self) -> &dyn AssignmentSpecProvider {
        &self.provider
    }

    /// Forget cached specs so edits to spec files are picked up.
    pub fn refresh(&self) {
        self.provider.invalidate();
    }
}

/// Walk up from a file looking for `ics.toml` or `.git`; falls back to the
/// file's directory.
pub fn infer_workspace_root(file_path: &Path) -> Option<PathBuf> {
    let start = file_path.parent()?;
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(CONFIG_FILE).exists() || dir.join(".git").exists() {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    Some(start.to_path_buf())
}
