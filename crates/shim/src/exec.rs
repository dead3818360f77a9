//! Main shim execution logic
//!
//! `run_shim` drives one invocation: resolve the layout, render the
//! activation script, write it to a temporary file, run it with `sh` from the
//! project root and hand back the delegate's exit code. The temporary file is
//! a `TempPath`, so it is removed on every return path once it exists.

use anyhow::Result;
use log::{debug, warn};
use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Instant, SystemTime};
use tempfile::TempPath;

use crate::context::ShimContext;
use crate::error::ShimError;
use crate::locator::ProjectLayout;
use crate::logger::{log_execution, log_spawn_failure};
use crate::script::WrapperScript;

/// File name prefix of generated scripts in the temp directory
pub const SCRIPT_PREFIX: &str = "envshim_";
const SCRIPT_SUFFIX: &str = ".sh";

/// Main shim execution function
pub fn run_shim() -> Result<i32> {
    let ctx = ShimContext::from_current_exe()?;
    let layout = ProjectLayout::locate(&ctx.shim_dir, &ctx.command_name, &ctx.settings)?;
    debug!(
        "wrapping {} (real binary {})",
        ctx.command_name,
        layout.real_binary.display()
    );

    let script = WrapperScript::render(
        &layout.real_binary,
        &ctx.args,
        &ctx.cwd,
        &ctx.settings.activation(),
    )?;
    let script_path = write_script(&script)?;
    debug!("activation script at {}", script_path.display());

    let start_time = Instant::now();
    let timestamp = SystemTime::now();

    let status = match run_script(&ctx.settings.shell, &script_path, &layout.root) {
        Ok(status) => status,
        Err(err) => {
            if let Some(log_path) = &ctx.settings.trace_log {
                if let Err(e) = log_spawn_failure(log_path, &ctx, &layout, timestamp, &err) {
                    warn!("failed to write trace log {}: {e}", log_path.display());
                }
            }
            return Err(err.into());
        }
    };

    if let Err(e) = script_path.close() {
        debug!("could not remove activation script: {e}");
    }

    if let Some(log_path) = &ctx.settings.trace_log {
        if let Err(e) = log_execution(
            log_path,
            &ctx,
            &layout,
            &status,
            start_time.elapsed(),
            timestamp,
        ) {
            warn!("failed to write trace log {}: {e}", log_path.display());
        }
    }

    Ok(exit_code_of(&status))
}

/// Write the script to a fresh, uniquely named executable file.
pub(crate) fn write_script(script: &WrapperScript) -> Result<TempPath, ShimError> {
    let mut file = tempfile::Builder::new()
        .prefix(SCRIPT_PREFIX)
        .suffix(SCRIPT_SUFFIX)
        .tempfile()
        .map_err(ShimError::resource("failed to create temporary script file"))?;

    // An early return drops `file`, which deletes the partial script.
    file.write_all(script.as_str().as_bytes())
        .and_then(|()| file.flush())
        .map_err(ShimError::resource("failed to write activation script"))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o755))
            .map_err(ShimError::resource("failed to mark activation script executable"))?;
    }

    Ok(file.into_temp_path())
}

/// Run `shell script` from `root` with the wrapper's own stdio, blocking until it exits.
pub(crate) fn run_script(shell: &str, script: &Path, root: &Path) -> Result<ExitStatus, ShimError> {
    Command::new(shell)
        .arg(script)
        .current_dir(root)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| ShimError::Launch {
            shell: shell.to_string(),
            source,
        })
}

/// Exit status as seen by a shell: the code itself, or 128 + signal.
pub(crate) fn exit_code_of(status: &ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    status.code().unwrap_or(1)
}
