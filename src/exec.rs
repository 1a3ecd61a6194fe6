//! Running the shell commands that talk to sysfs.
//!
//! Every pin operation becomes one command line handed to a
//! [`CommandExecutor`]. The executor captures stdout and stderr together and
//! reports the exit code; [`CommandExecutor::run`] then turns a failed command
//! into an empty string after printing what went wrong.

use log::debug;
use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::error::{GpioError, Result};

static DEFAULT_SHELL: &str = "/bin/sh";

/// Combined output and exit code of one finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// The command line as it was handed to the shell, redirection included.
    pub command: String,
    /// Everything the command wrote to stdout and stderr.
    pub output: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Applies the soft-fail policy and returns the text handed to callers.
    ///
    /// On failure the [`diagnostic`](CommandOutput::diagnostic) block is
    /// printed to stdout and the result is an empty string. On success exactly
    /// one trailing line break is removed.
    pub fn into_text(self) -> String {
        if self.success() {
            return strip_trailing_newline(&self.output).to_string();
        }

        debug!("command '{}' failed, exit code {:?}", self.command, self.exit_code);
        print!("{}", self.diagnostic());

        String::new()
    }

    /// The report printed for a failed command.
    pub fn diagnostic(&self) -> String {
        let code = match self.exit_code {
            Some(code) => code.to_string(),
            None => String::from("signal"),
        };

        format!(
            "============\n\
             Command: '{}' failed with exit code: {}\n\
             Combined command output is:\n\
             {}\n\
             ============\n",
            self.command, code, self.output
        )
    }
}

/// Quotes `path` for use as a single shell word.
///
/// Paths made only of `[A-Za-z0-9/._-]` are returned unchanged; anything else
/// is wrapped in single quotes with embedded `'` escaped.
///
/// # Example
///
/// ```rust
/// use db410c_gpio::shell_quote;
/// use std::path::Path;
///
/// assert_eq!(shell_quote(Path::new("/sys/class/gpio/export")), "/sys/class/gpio/export");
/// assert_eq!(shell_quote(Path::new("/tmp/gpio root")), "'/tmp/gpio root'");
/// ```
pub fn shell_quote(path: &Path) -> String {
    let text = path.to_string_lossy();
    let plain = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-'));
    if plain {
        return text.into_owned();
    }

    format!("'{}'", text.replace('\'', "'\\''"))
}

/// Removes a single trailing `\n`, if there is one.
///
/// # Example
///
/// ```rust
/// use db410c_gpio::strip_trailing_newline;
///
/// assert_eq!(strip_trailing_newline("out\n"), "out");
/// assert_eq!(strip_trailing_newline("1\n\n"), "1\n");
/// assert_eq!(strip_trailing_newline("\n"), "");
/// ```
pub fn strip_trailing_newline(s: &str) -> &str {
    s.strip_suffix('\n').unwrap_or(s)
}

/// Something that can run a fully formed command line.
///
/// Implementors only provide [`execute`](CommandExecutor::execute); the
/// soft-fail policy in [`run`](CommandExecutor::run) is shared.
pub trait CommandExecutor {
    /// Runs `command` to completion and captures its combined output.
    ///
    /// Only a failure to start the command is an error. A non-zero exit code
    /// is reported through [`CommandOutput::exit_code`].
    fn execute(&self, command: &str) -> Result<CommandOutput>;

    /// Runs `command` and returns its output, or an empty string if it failed.
    ///
    /// An empty string where a value was expected must be treated as a failed
    /// operation by the caller.
    fn run(&self, command: &str) -> Result<String> {
        debug!("exec: {}", command);
        Ok(self.execute(command)?.into_text())
    }
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for &E {
    fn execute(&self, command: &str) -> Result<CommandOutput> {
        (**self).execute(command)
    }
}

/// Runs commands through `sh -c`, blocking until they exit.
///
/// There is no timeout: a command that never exits blocks the caller.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: PathBuf,
}

impl ShellExecutor {
    pub fn new() -> Self {
        ShellExecutor {
            shell: PathBuf::from(DEFAULT_SHELL),
        }
    }

    /// Uses `shell` instead of `/bin/sh`. It must accept `-c <command>`.
    pub fn with_shell(shell: impl Into<PathBuf>) -> Self {
        ShellExecutor {
            shell: shell.into(),
        }
    }

    pub fn shell(&self) -> &Path {
        &self.shell
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for ShellExecutor {
    fn execute(&self, command: &str) -> Result<CommandOutput> {
        let command = format!("{} 2>&1", command);

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| GpioError::ProcessSpawn {
                command: command.clone(),
                source,
            })?;

        // stderr is already folded into stdout by the redirection; anything
        // left here came from the shell itself.
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            command,
            output: text,
            exit_code: output.status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(output: &str, exit_code: Option<i32>) -> CommandOutput {
        CommandOutput {
            command: String::from("cat /sys/class/gpio/gpio24/value 2>&1"),
            output: output.to_string(),
            exit_code,
        }
    }

    #[test]
    fn strips_exactly_one_line_break() {
        assert_eq!(strip_trailing_newline("1\n"), "1");
        assert_eq!(strip_trailing_newline("1\n\n"), "1\n");
        assert_eq!(strip_trailing_newline("out"), "out");
        assert_eq!(strip_trailing_newline("\n"), "");
        assert_eq!(strip_trailing_newline(""), "");
    }

    #[test]
    fn success_returns_trimmed_output() {
        assert_eq!(finished("in\n", Some(0)).into_text(), "in");
    }

    #[test]
    fn failure_returns_empty_string() {
        assert_eq!(finished("No such file or directory\n", Some(1)).into_text(), "");
        assert_eq!(finished("1\n", Some(2)).into_text(), "");
    }

    #[test]
    fn diagnostic_block_format() {
        assert_eq!(
            finished("cat: value: No such file or directory\n", Some(1)).diagnostic(),
            "============\n\
             Command: 'cat /sys/class/gpio/gpio24/value 2>&1' failed with exit code: 1\n\
             Combined command output is:\n\
             cat: value: No such file or directory\n\n\
             ============\n"
        );
        assert_eq!(
            finished("", None).diagnostic(),
            "============\n\
             Command: 'cat /sys/class/gpio/gpio24/value 2>&1' failed with exit code: signal\n\
             Combined command output is:\n\
             \n\
             ============\n"
        );
    }

    #[test]
    fn quotes_paths_with_shell_characters() {
        assert_eq!(shell_quote(Path::new("/sys/class/gpio/gpio24/value")), "/sys/class/gpio/gpio24/value");
        assert_eq!(shell_quote(Path::new("/tmp/gpio root/export")), "'/tmp/gpio root/export'");
        assert_eq!(shell_quote(Path::new("/tmp/a;b")), "'/tmp/a;b'");
        assert_eq!(shell_quote(Path::new("/tmp/it's")), "'/tmp/it'\\''s'");
        assert_eq!(shell_quote(Path::new("")), "''");
    }

    #[test]
    fn quoted_path_survives_the_shell() {
        let sh = ShellExecutor::new();
        let path = Path::new("/tmp/it's $HOME; a file");
        assert_eq!(sh.run(&format!("printf '%s' {}", shell_quote(path))).unwrap(), "/tmp/it's $HOME; a file");
    }

    #[test]
    fn signal_counts_as_failure() {
        let out = finished("1\n", None);
        assert!(!out.success());
        assert_eq!(out.into_text(), "");
    }

    #[test]
    fn shell_captures_stdout_and_strips_newline() {
        let sh = ShellExecutor::new();
        assert_eq!(sh.run("echo out").unwrap(), "out");
        assert_eq!(sh.run("printf 'a\\n\\n'").unwrap(), "a\n");
        assert_eq!(sh.run("printf 'a'").unwrap(), "a");
        assert_eq!(sh.run("printf ''").unwrap(), "");
    }

    #[test]
    fn shell_folds_stderr_into_output() {
        let out = ShellExecutor::new().execute("echo oops >&2").unwrap();
        assert!(out.success());
        assert_eq!(out.output, "oops\n");
        assert!(out.command.ends_with(" 2>&1"));
    }

    #[test]
    fn shell_reports_exit_code_and_soft_fails() {
        let sh = ShellExecutor::new();
        let out = sh.execute("echo half; exit 3").unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.output, "half\n");
        assert_eq!(sh.run("echo half; exit 3").unwrap(), "");
    }

    #[test]
    fn missing_shell_is_a_spawn_error() {
        assert_eq!(ShellExecutor::new().shell(), Path::new("/bin/sh"));
        let sh = ShellExecutor::with_shell("/nonexistent/db410c-gpio-shell");
        assert_eq!(sh.shell(), Path::new("/nonexistent/db410c-gpio-shell"));
        let err = sh.run("echo 1").unwrap_err();
        assert!(err.is_environment_fault());
        match err {
            GpioError::ProcessSpawn { command, .. } => assert_eq!(command, "echo 1 2>&1"),
            other => panic!("expected ProcessSpawn, got {:?}", other),
        }
    }
}
