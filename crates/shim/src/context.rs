//! Invocation context and settings
//!
//! Everything the wrapper reads from its process (own path, arguments,
//! working directory, `ENVSHIM_*` variables) is captured here once, so the
//! rest of the pipeline works on explicit values.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use envshim_common::paths::{
    self, DEFAULT_ACTIVE_VAR, DEFAULT_ENV_TOOL, DEFAULT_MARKER_FILE, DEFAULT_SHELL,
};
use envshim_common::RootDiscovery;

use crate::error::ShimError;
use crate::script::Activation;

/// Environment variables read by the wrapper
pub const ROOT_MODE_VAR: &str = "ENVSHIM_ROOT_MODE"; // fixed | search
pub const ROOT_DEPTH_VAR: &str = "ENVSHIM_ROOT_DEPTH"; // parent steps in fixed mode
pub const MARKER_VAR: &str = "ENVSHIM_MARKER"; // project marker file name
pub const REAL_BINARY_VAR: &str = "ENVSHIM_REAL_BINARY"; // sibling name of the real binary
pub const ACTIVE_VAR_VAR: &str = "ENVSHIM_ACTIVE_VAR"; // "environment already active" signal
pub const ENV_TOOL_VAR: &str = "ENVSHIM_ENV_TOOL"; // run as `<tool> export bash`
pub const SHELL_VAR: &str = "ENVSHIM_SHELL"; // interpreter for the generated script
pub const TRACE_LOG_VAR: &str = "ENVSHIM_TRACE_LOG"; // JSONL trace log path

/// Knobs resolved from `ENVSHIM_*` variables, with the devenv/direnv defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimSettings {
    pub root: RootDiscovery,
    pub marker_file: String,
    /// `None` means `<command name>.orig`.
    pub real_binary: Option<String>,
    pub active_var: String,
    pub env_tool: String,
    pub shell: String,
    pub trace_log: Option<PathBuf>,
}

impl Default for ShimSettings {
    fn default() -> Self {
        Self {
            root: RootDiscovery::default(),
            marker_file: DEFAULT_MARKER_FILE.to_string(),
            real_binary: None,
            active_var: DEFAULT_ACTIVE_VAR.to_string(),
            env_tool: DEFAULT_ENV_TOOL.to_string(),
            shell: DEFAULT_SHELL.to_string(),
            trace_log: None,
        }
    }
}

impl ShimSettings {
    pub fn from_env() -> Result<Self, ShimError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ShimError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let root = RootDiscovery::from_parts(
            get(ROOT_MODE_VAR).as_deref(),
            get(ROOT_DEPTH_VAR).as_deref(),
        )
        .map_err(|e| ShimError::Configuration(format!("{ROOT_MODE_VAR}/{ROOT_DEPTH_VAR}: {e}")))?;

        let marker_file = get(MARKER_VAR).unwrap_or(defaults.marker_file);
        if !paths::is_plain_file_name(&marker_file) {
            return Err(ShimError::Configuration(format!(
                "{MARKER_VAR} must be a plain file name, got `{marker_file}`"
            )));
        }

        let real_binary = get(REAL_BINARY_VAR);
        if let Some(name) = &real_binary {
            if !paths::is_plain_file_name(name) {
                return Err(ShimError::Configuration(format!(
                    "{REAL_BINARY_VAR} must be a plain file name, got `{name}`"
                )));
            }
        }

        let active_var = get(ACTIVE_VAR_VAR).unwrap_or(defaults.active_var);
        if !paths::is_shell_identifier(&active_var) {
            return Err(ShimError::Configuration(format!(
                "{ACTIVE_VAR_VAR} must be a shell variable name, got `{active_var}`"
            )));
        }

        Ok(Self {
            root,
            marker_file,
            real_binary,
            active_var,
            env_tool: get(ENV_TOOL_VAR).unwrap_or(defaults.env_tool),
            shell: get(SHELL_VAR).unwrap_or(defaults.shell),
            trace_log: get(TRACE_LOG_VAR).map(PathBuf::from),
        })
    }

    pub fn real_binary_name(&self, command_name: &str) -> String {
        self.real_binary
            .clone()
            .unwrap_or_else(|| paths::real_binary_name(command_name))
    }

    pub fn activation(&self) -> Activation {
        Activation {
            active_var: self.active_var.clone(),
            env_tool: self.env_tool.clone(),
        }
    }
}

/// Execution context for one wrapper invocation
#[derive(Debug, Clone)]
pub struct ShimContext {
    /// Resolved path of the running wrapper
    pub exe_path: PathBuf,
    /// Directory holding the wrapper and the real binary
    pub shim_dir: PathBuf,
    /// Name the wrapper is installed under (e.g. "go")
    pub command_name: String,
    /// Arguments after argv[0], in order
    pub args: Vec<String>,
    /// Directory the caller ran the wrapper from
    pub cwd: PathBuf,
    pub settings: ShimSettings,
}

impl ShimContext {
    /// Create context from the current executable, argv, cwd and environment
    pub fn from_current_exe() -> Result<Self, ShimError> {
        let exe = env::current_exe().map_err(|e| {
            ShimError::Configuration(format!("cannot determine own executable path: {e}"))
        })?;
        let settings = ShimSettings::from_env()?;
        let args = collect_args(env::args_os().skip(1))?;
        let cwd = env::current_dir().map_err(|e| {
            ShimError::Configuration(format!("cannot determine current working directory: {e}"))
        })?;
        let cwd = logical_cwd(cwd, env::var_os("PWD"));

        Self::new(exe, args, cwd, settings)
    }

    pub fn new(
        exe_path: PathBuf,
        args: Vec<String>,
        cwd: PathBuf,
        settings: ShimSettings,
    ) -> Result<Self, ShimError> {
        let shim_dir = exe_path
            .parent()
            .ok_or_else(|| {
                ShimError::Configuration(format!(
                    "executable {} has no parent directory",
                    exe_path.display()
                ))
            })?
            .to_path_buf();

        let command_name = exe_path
            .file_name()
            .ok_or_else(|| {
                ShimError::Configuration(format!("executable {} has no file name", exe_path.display()))
            })?
            .to_string_lossy()
            .to_string();

        Ok(Self {
            exe_path,
            shim_dir,
            command_name,
            args,
            cwd,
            settings,
        })
    }
}

/// Keep the caller's spelling of the working directory.
///
/// `current_dir` resolves symlinks; `$PWD` is used instead when it is
/// absolute and names the same directory.
fn logical_cwd(physical: PathBuf, pwd: Option<OsString>) -> PathBuf {
    let Some(pwd) = pwd.map(PathBuf::from).filter(|p| p.is_absolute()) else {
        return physical;
    };

    match (pwd.canonicalize(), physical.canonicalize()) {
        (Ok(logical), Ok(resolved)) if logical == resolved => pwd,
        _ => physical,
    }
}

/// Arguments must be UTF-8 to be embedded in the generated script.
fn collect_args<I>(raw: I) -> Result<Vec<String>, ShimError>
where
    I: IntoIterator<Item = OsString>,
{
    raw.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            arg.into_string().map_err(|arg| {
                ShimError::Encoding(format!(
                    "argument {} is not valid UTF-8: {}",
                    i + 1,
                    arg.to_string_lossy()
                ))
            })
        })
        .collect()
}
