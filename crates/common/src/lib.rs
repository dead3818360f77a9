//! Shared utilities for envshim components

pub mod paths;
pub mod settings;

pub use settings::RootDiscovery;

use std::ffi::OsStr;

/// Setting `ENVSHIM_LOG_OPTS=raw` disables argv redaction in trace logs.
pub const LOG_OPTS_VAR: &str = "ENVSHIM_LOG_OPTS";

/// Standard trace log schema keys
pub mod log_schema {
    pub const TIMESTAMP: &str = "ts";
    pub const COMPONENT: &str = "component";
    pub const COMMAND: &str = "command";
    pub const ARGV: &str = "argv";
    pub const CWD: &str = "cwd";
    pub const PROJECT_ROOT: &str = "project_root";
    pub const REAL_BINARY: &str = "real_binary";
    pub const EXIT_CODE: &str = "exit_code";
    pub const TERM_SIGNAL: &str = "term_signal";
    pub const DURATION_MS: &str = "duration_ms";
    pub const ERROR: &str = "error";
}

/// Name fragments that mark a `NAME=value` argument as secret.
const SECRET_NAME_PARTS: &[&str] = &[
    "token",
    "password",
    "passwd",
    "secret",
    "apikey",
    "api_key",
    "access_key",
    "private_key",
    "credential",
];

/// Flags whose following argument is a secret.
const SECRET_FLAGS: &[&str] = &[
    "--token",
    "--auth-token",
    "--api-token",
    "--password",
    "--secret",
    "--api-key",
    "--apikey",
    "--access-key",
    "--secret-key",
];

fn raw_logging() -> bool {
    std::env::var(LOG_OPTS_VAR).as_deref() == Ok("raw")
}

fn is_secret_name(name: &str) -> bool {
    let name = name.trim_start_matches('-').to_ascii_lowercase().replace('-', "_");
    SECRET_NAME_PARTS.iter().any(|part| name.contains(part))
}

fn is_secret_flag(arg: &str) -> bool {
    SECRET_FLAGS.iter().any(|flag| arg.eq_ignore_ascii_case(flag))
}

/// Redact the value of a `NAME=value` argument whose name looks secret
///
/// Covers environment-style assignments (`GITHUB_TOKEN=...`) and the
/// `--flag=value` spelling of secret flags.
pub fn redact_sensitive(arg: &str) -> String {
    if raw_logging() {
        return arg.to_string();
    }

    match arg.split_once('=') {
        Some((name, _)) if is_secret_name(name) => format!("{name}=***"),
        _ => arg.to_string(),
    }
}

/// Redact an argument vector; the value after a secret flag is hidden too
pub fn redact_sensitive_argv<S: AsRef<OsStr>>(argv: &[S]) -> Vec<String> {
    let raw = raw_logging();
    let mut result = Vec::with_capacity(argv.len());
    let mut hide_next = false;

    for arg in argv {
        let arg = arg.as_ref().to_string_lossy();
        if raw {
            result.push(arg.into_owned());
        } else if hide_next {
            result.push("***".to_string());
            hide_next = false;
        } else {
            hide_next = is_secret_flag(&arg);
            result.push(redact_sensitive(&arg));
        }
    }

    result
}
