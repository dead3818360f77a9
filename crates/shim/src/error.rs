//! Failure taxonomy for a single wrapper invocation
//!
//! Every variant is fatal and maps to exit status 1. A delegate that exits
//! non-zero is not an error of the wrapper and never becomes a `ShimError`.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShimError {
    /// Wrong install layout or unusable settings.
    #[error("{0}")]
    Configuration(String),

    /// Arguments or paths that cannot be written into a shell script.
    #[error("{0}")]
    Encoding(String),

    /// Temporary script could not be created or written.
    #[error("{context}")]
    Resource {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    /// The shell interpreter could not be started.
    #[error("failed to launch `{shell}`")]
    Launch {
        shell: String,
        #[source]
        source: io::Error,
    },
}

impl ShimError {
    pub const EXIT_CODE: u8 = 1;

    pub(crate) fn resource(context: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Resource { context, source }
    }
}
