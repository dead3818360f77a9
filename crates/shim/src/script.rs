//! Activation script generation
//!
//! The wrapper never execs the real binary itself. It renders a short POSIX
//! script that exports the direnv environment (unless the environment is
//! already active), changes into the caller's directory and execs the real
//! binary with the forwarded arguments. Rendering is a pure function of its
//! inputs.

use std::borrow::Cow;
use std::path::Path;

use envshim_common::paths::is_shell_identifier;

use crate::error::ShimError;

/// Characters that make a word unsafe to leave unquoted.
///
/// `\`, `#` and `~` are special to the shell as well, so they are quoted too.
pub const SPECIAL_CHARS: &[char] = &[
    '"', '\'', '`', '$', '&', '*', '(', ')', '[', ']', '{', '}', '|', ';', '<', '>', '?', '!',
    '\\', '#', '~',
];

/// Characters that keep their meaning inside double quotes.
const DOUBLE_QUOTE_ESCAPES: &[char] = &['"', '$', '`', '\\'];

/// How the script detects and performs environment activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// Non-empty when the environment is already exported. Must be a valid
    /// shell identifier.
    pub active_var: String,
    /// Invoked as `<env_tool> export bash`.
    pub env_tool: String,
}

pub fn needs_quoting(word: &str) -> bool {
    word.is_empty()
        || word
            .chars()
            .any(|c| c.is_whitespace() || SPECIAL_CHARS.contains(&c))
}

/// Quote one word so a POSIX shell reads it back unchanged.
pub fn quote_arg(word: &str) -> Cow<'_, str> {
    if !needs_quoting(word) {
        return Cow::Borrowed(word);
    }

    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('"');
    for c in word.chars() {
        if DOUBLE_QUOTE_ESCAPES.contains(&c) {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// Quote every argument and join them with single spaces.
pub fn quote_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| quote_arg(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rendered script text, ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperScript {
    text: String,
}

impl WrapperScript {
    pub fn render(
        real_binary: &Path,
        args: &[String],
        cwd: &Path,
        activation: &Activation,
    ) -> Result<Self, ShimError> {
        if !is_shell_identifier(&activation.active_var) {
            return Err(ShimError::Configuration(format!(
                "activation variable must be a shell variable name, got `{}`",
                activation.active_var
            )));
        }
        let real_binary = path_str(real_binary, "real binary path")?;
        let cwd = path_str(cwd, "working directory")?;

        let mut exec_line = format!("exec {}", quote_arg(real_binary));
        if !args.is_empty() {
            exec_line.push(' ');
            exec_line.push_str(&quote_args(args));
        }
        let cd_line = format!("cd {}", quote_arg(cwd));

        let text = format!(
            "#!/bin/sh\n\
             if [ ! -z \"${active_var}\" ]; then\n\
             \x20   {cd_line}\n\
             \x20   {exec_line}\n\
             fi\n\
             eval \"$({env_tool} export bash 2>/dev/null)\" >/dev/null 2>&1\n\
             {cd_line}\n\
             {exec_line}\n",
            active_var = activation.active_var,
            env_tool = quote_arg(&activation.env_tool),
        );

        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

fn path_str<'a>(path: &'a Path, what: &str) -> Result<&'a str, ShimError> {
    path.to_str().ok_or_else(|| {
        ShimError::Encoding(format!("{what} is not valid UTF-8: {}", path.display()))
    })
}
