//! Structured JSONL trace log
//!
//! When `ENVSHIM_TRACE_LOG` points at a file, each invocation appends one
//! JSON object describing what was wrapped and how it ended. Arguments are
//! redacted unless `ENVSHIM_LOG_OPTS=raw`.

use anyhow::{Context, Result};
use envshim_common::log_schema as key;
use envshim_common::redact_sensitive_argv;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::ExitStatus;
use std::time::{Duration, SystemTime};

use crate::context::ShimContext;
use crate::error::ShimError;
use crate::locator::ProjectLayout;

const COMPONENT: &str = "envshim";

/// Log a finished invocation
pub fn log_execution(
    log_path: &Path,
    ctx: &ShimContext,
    layout: &ProjectLayout,
    status: &ExitStatus,
    duration: Duration,
    timestamp: SystemTime,
) -> Result<()> {
    #[cfg(unix)]
    let (exit_code, term_signal) = {
        use std::os::unix::process::ExitStatusExt;
        (status.code(), status.signal())
    };
    #[cfg(not(unix))]
    let (exit_code, term_signal) = (status.code(), None::<i32>);

    let mut entry = base_entry(ctx, layout, timestamp);
    entry[key::EXIT_CODE] = json!(exit_code.unwrap_or(-1));
    entry[key::DURATION_MS] = json!(duration.as_millis());
    if let Some(signal) = term_signal {
        entry[key::TERM_SIGNAL] = json!(signal);
    }

    write_log_entry(log_path, &entry)
}

/// Log a shell that never started
pub fn log_spawn_failure(
    log_path: &Path,
    ctx: &ShimContext,
    layout: &ProjectLayout,
    timestamp: SystemTime,
    err: &ShimError,
) -> Result<()> {
    let mut entry = base_entry(ctx, layout, timestamp);
    entry[key::ERROR] = json!("spawn_failed");
    if let ShimError::Launch { shell, source } = err {
        entry["shell"] = json!(shell);
        entry["spawn_error_kind"] = json!(format!("{:?}", source.kind()));
        if let Some(errno) = source.raw_os_error() {
            entry["spawn_errno"] = json!(errno);
        }
    }

    write_log_entry(log_path, &entry)
}

fn base_entry(ctx: &ShimContext, layout: &ProjectLayout, timestamp: SystemTime) -> Value {
    let mut entry = json!({
        "activation": {
            "active_var": ctx.settings.active_var,
            "already_active": env::var_os(&ctx.settings.active_var).is_some_and(|v| !v.is_empty()),
            "env_tool": ctx.settings.env_tool,
        },
        "root_discovery": ctx.settings.root.to_string(),
        "pid": std::process::id(),
        "hostname": gethostname::gethostname().to_string_lossy(),
        "platform": std::env::consts::OS,
        "shim_version": env!("ENVSHIM_VERSION"),
        "shim_fingerprint": get_shim_fingerprint(),
    });

    entry[key::TIMESTAMP] = json!(format_timestamp(timestamp));
    entry[key::COMPONENT] = json!(COMPONENT);
    entry[key::COMMAND] = json!(ctx.command_name);
    entry[key::ARGV] = json!(redact_sensitive_argv(&ctx.args));
    entry[key::CWD] = json!(ctx.cwd.to_string_lossy());
    entry[key::PROJECT_ROOT] = json!(layout.root.to_string_lossy());
    entry[key::REAL_BINARY] = json!(layout.real_binary.to_string_lossy());
    entry
}

/// Append one JSON line to the trace log, creating it if needed
pub fn write_log_entry(log_path: &Path, entry: &Value) -> Result<()> {
    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut line = serde_json::to_vec(entry)?;
    line.push(b'\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("failed to open trace log {}", log_path.display()))?;
    file.write_all(&line)?;
    Ok(())
}

/// Format timestamp as RFC3339 with milliseconds
pub fn format_timestamp(timestamp: SystemTime) -> String {
    let dt: chrono::DateTime<chrono::Utc> = timestamp.into();
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// SHA-256 of the running wrapper binary
pub fn get_shim_fingerprint() -> String {
    use once_cell::sync::Lazy;

    static SHIM_FINGERPRINT: Lazy<String> = Lazy::new(|| {
        env::current_exe()
            .and_then(std::fs::read)
            .map(|bytes| format!("sha256:{:x}", Sha256::digest(&bytes)))
            .unwrap_or_else(|_| "sha256:unknown".to_string())
    });

    SHIM_FINGERPRINT.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ShimSettings;
    use std::path::PathBuf;
    use std::time::UNIX_EPOCH;
    use tempfile::TempDir;

    fn sample() -> (ShimContext, ProjectLayout) {
        let ctx = ShimContext::new(
            PathBuf::from("/p/.devenv/profile/go/bin/go"),
            vec!["get".to_string(), "--token".to_string(), "s3cr3t".to_string()],
            PathBuf::from("/p/cmd"),
            ShimSettings::default(),
        )
        .unwrap();
        let layout = ProjectLayout {
            root: PathBuf::from("/p"),
            marker_file: PathBuf::from("/p/devenv.nix"),
            real_binary: PathBuf::from("/p/.devenv/profile/go/bin/go.orig"),
        };
        (ctx, layout)
    }

    #[test]
    fn test_format_timestamp() {
        let ts = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(format_timestamp(ts), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn test_binary_fingerprint() {
        let fingerprint = get_shim_fingerprint();
        assert!(fingerprint.starts_with("sha256:"));
        if fingerprint != "sha256:unknown" {
            assert_eq!(fingerprint.len(), 71);
            assert!(fingerprint.chars().skip(7).all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    #[serial_test::serial]
    fn spawn_failure_entry_is_appended() {
        std::env::remove_var(envshim_common::LOG_OPTS_VAR);

        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("logs").join("trace.jsonl");
        let (ctx, layout) = sample();
        let err = ShimError::Launch {
            shell: "/missing/sh".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };

        log_spawn_failure(&log_path, &ctx, &layout, SystemTime::now(), &err).unwrap();
        log_spawn_failure(&log_path, &ctx, &layout, SystemTime::now(), &err).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let entry: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(entry["error"], "spawn_failed");
        assert_eq!(entry["shell"], "/missing/sh");
        assert_eq!(entry["spawn_error_kind"], "NotFound");
        assert_eq!(entry["command"], "go");
        assert_eq!(entry["argv"], json!(["get", "--token", "***"]));
        assert_eq!(entry["project_root"], "/p");
        assert_eq!(entry["component"], "envshim");
        assert!(!content.contains("s3cr3t"));
    }

    #[test]
    fn spawn_failure_reports_unwritable_log() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let (ctx, layout) = sample();
        let err = ShimError::Launch {
            shell: "/missing/sh".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };

        let result = log_spawn_failure(
            &blocker.join("trace.jsonl"),
            &ctx,
            &layout,
            SystemTime::now(),
            &err,
        );
        assert!(result.is_err());
    }
}
