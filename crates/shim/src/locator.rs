//! Project layout resolution
//!
//! Works out the project root, the marker file inside it and the real binary
//! sitting next to the wrapper. Nothing is created or spawned here; a failed
//! check stops the invocation before any side effect.

use std::path::{Path, PathBuf};

use envshim_common::paths::lexical_ancestor;
use envshim_common::RootDiscovery;
use log::debug;

use crate::context::ShimSettings;
use crate::error::ShimError;

/// Paths derived once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub marker_file: PathBuf,
    pub real_binary: PathBuf,
}

impl ProjectLayout {
    pub fn locate(
        shim_dir: &Path,
        command_name: &str,
        settings: &ShimSettings,
    ) -> Result<Self, ShimError> {
        let root = match settings.root {
            RootDiscovery::Fixed(depth) => lexical_ancestor(shim_dir, depth),
            RootDiscovery::Search => search_upward(shim_dir, &settings.marker_file)
                .ok_or_else(|| {
                    ShimError::Configuration(format!(
                        "{} file not found in {} or any parent directory",
                        settings.marker_file,
                        shim_dir.display()
                    ))
                })?,
        };
        debug!("project root ({}): {}", settings.root, root.display());

        let marker_file = root.join(&settings.marker_file);
        if !marker_file.exists() {
            return Err(ShimError::Configuration(format!(
                "{} file not found in project directory {}",
                settings.marker_file,
                root.display()
            )));
        }

        let real_name = settings.real_binary_name(command_name);
        let real_binary = shim_dir.join(&real_name);
        if !real_binary.exists() {
            return Err(ShimError::Configuration(format!(
                "{real_name} executable not found in {}",
                shim_dir.display()
            )));
        }
        if !is_executable(&real_binary) {
            return Err(ShimError::Configuration(format!(
                "{} is not an executable file",
                real_binary.display()
            )));
        }

        Ok(Self {
            root,
            marker_file,
            real_binary,
        })
    }
}

/// Nearest directory, starting at `start` itself, that holds `marker`.
fn search_upward(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).exists())
        .map(Path::to_path_buf)
}

/// Check if a path is executable (cross-platform)
pub(crate) fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = std::fs::metadata(path) {
            metadata.is_file() && (metadata.permissions().mode() & 0o111 != 0)
        } else {
            false
        }
    }

    #[cfg(not(unix))]
    {
        std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
    }
}
