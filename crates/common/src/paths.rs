//! Naming defaults for the wrapper's on-disk layout

use std::path::{Component, Path, PathBuf};

/// Marker file that identifies the project root.
pub const DEFAULT_MARKER_FILE: &str = "devenv.nix";
/// Suffix appended to the wrapper's own name to find the real binary.
pub const REAL_BINARY_SUFFIX: &str = ".orig";
/// Parent steps from the wrapper directory to the project root in fixed mode.
pub const DEFAULT_ROOT_DEPTH: usize = 4;
/// Variable exported by the environment once it is active.
pub const DEFAULT_ACTIVE_VAR: &str = "DEVENV_ROOT";
/// Directory-scoped environment tool, run as `<tool> export bash`.
pub const DEFAULT_ENV_TOOL: &str = "direnv";
/// Interpreter for the generated script.
pub const DEFAULT_SHELL: &str = "sh";

/// Sibling file name of the real binary for a wrapper called `command_name`.
pub fn real_binary_name(command_name: &str) -> String {
    format!("{command_name}{REAL_BINARY_SUFFIX}")
}

/// Walk `depth` parent steps up from `dir` without touching the filesystem.
///
/// Trailing `..` components are resolved lexically, so `a/b/..` counts as `a`.
/// Steps beyond the filesystem root stay at the root.
pub fn lexical_ancestor(dir: &Path, depth: usize) -> PathBuf {
    let mut out = PathBuf::new();
    for component in dir.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }

    for _ in 0..depth {
        if !out.pop() {
            break;
        }
    }

    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// A plain file name: non-empty, no separators, not `.` or `..`.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains('/')
}

/// A POSIX shell variable name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_shell_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
