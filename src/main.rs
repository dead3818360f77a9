//! envshim - wraps a toolchain binary so the project environment is active
//!
//! Install this binary under the wrapped tool's name (e.g. `go`) and move the
//! real tool next to it as `go.orig`. Every invocation activates the direnv
//! environment of the surrounding project, then hands over to the real binary.

use std::process::ExitCode;

use envshim_shim::{run_shim, ShimError};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("ENVSHIM_LOG", "warn"))
        .format_timestamp(None)
        .init();

    match run_main() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("envshim: {e:#}");
            ExitCode::from(ShimError::EXIT_CODE)
        }
    }
}

fn run_main() -> anyhow::Result<i32> {
    let exit_code = run_shim()?;
    log::debug!("delegate finished with exit code {exit_code}");
    Ok(exit_code)
}
