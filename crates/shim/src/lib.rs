//! envshim command execution shim
//!
//! This library backs a wrapper binary that shadows a toolchain executable
//! (for example `go`) inside a devenv/direnv project, so every invocation runs
//! with the project environment loaded.
//!
//! ## Architecture
//!
//! The shim works by:
//! 1. Being installed under the tool's name, with the real tool renamed to a
//!    sibling `<name>.orig`
//! 2. Locating the project root (fixed parent depth or upward marker search)
//!    and checking the `devenv.nix` marker and the real binary
//! 3. Rendering a POSIX script that runs `direnv export bash` unless
//!    `DEVENV_ROOT` is already set, then execs the real binary from the
//!    caller's directory
//! 4. Running that script with inherited stdio and returning its exit code
//!
//! ## Usage
//!
//! ```rust,no_run
//! use envshim_shim::run_shim;
//!
//! fn main() -> anyhow::Result<()> {
//!     let exit_code = run_shim()?;
//!     std::process::exit(exit_code);
//! }
//! ```

pub use context::{ShimContext, ShimSettings};
pub use error::ShimError;
pub use exec::run_shim;
pub use locator::ProjectLayout;
pub use script::{quote_arg, quote_args, Activation, WrapperScript};

mod context;
mod error;
mod exec;
mod locator;
mod logger;
mod script;
