//! Stamps `ENVSHIM_VERSION` into the wrapper for trace log entries.

use std::path::{Path, PathBuf};
use std::process::Command;

fn main() {
    let manifest_dir = PathBuf::from(std::env::var_os("CARGO_MANIFEST_DIR").unwrap_or_default());
    let git_dir = manifest_dir.join("..").join("..").join(".git");

    println!("cargo:rerun-if-changed=Cargo.toml");
    if git_dir.is_dir() {
        println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
    }

    let stamp = match short_commit(&git_dir) {
        Some(commit) => format!("{}+{commit}", env!("CARGO_PKG_VERSION")),
        None => env!("CARGO_PKG_VERSION").to_string(),
    };
    println!("cargo:rustc-env=ENVSHIM_VERSION={stamp}");
}

/// Abbreviated HEAD commit, or `None` outside a git checkout.
fn short_commit(git_dir: &Path) -> Option<String> {
    if !git_dir.is_dir() {
        return None;
    }

    let output = Command::new("git")
        .arg("--git-dir")
        .arg(git_dir)
        .args(["rev-parse", "--short=10", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let commit = String::from_utf8(output.stdout).ok()?;
    let commit = commit.trim();
    (!commit.is_empty()).then(|| commit.to_string())
}
