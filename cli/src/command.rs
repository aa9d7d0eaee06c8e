//! Per-item command execution.
//!
//! A [`CommandTemplate`] is the user's command line with a placeholder. For each item it
//! renders an argv, spawns it through a [`ChildGuard`] and reports the exit status.
//! Whether that status counts as success is left to the run's success predicate.

use std::fmt;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tokio::time;

use crate::process::ChildGuard;

pub const DEFAULT_PLACEHOLDER: &str = "{}";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no command given")]
    Empty,
    #[error("placeholder must not be empty")]
    EmptyPlaceholder,
    #[error("failed to spawn {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("failed to wait for {program}: {source}")]
    Wait { program: String, source: io::Error },
    #[error("timed out after {}s", timeout.as_secs_f64())]
    TimedOut { timeout: Duration },
}

/// Exit status of one item's command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl From<ExitStatus> for CommandOutput {
    fn from(status: ExitStatus) -> Self {
        Self {
            exit_code: status.code(),
        }
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("killed by signal"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandTemplate {
    args: Vec<String>,
    placeholder: String,
    shell: Option<String>,
    timeout: Option<Duration>,
}

impl CommandTemplate {
    pub fn new(args: Vec<String>) -> Result<Self, CommandError> {
        if args.first().is_none_or(String::is_empty) {
            return Err(CommandError::Empty);
        }
        Ok(Self {
            args,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            shell: None,
            timeout: None,
        })
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Result<Self, CommandError> {
        let placeholder = placeholder.into();
        if placeholder.is_empty() {
            return Err(CommandError::EmptyPlaceholder);
        }
        self.placeholder = placeholder;
        Ok(self)
    }

    /// Run the joined command line through `<shell> -c` instead of exec'ing it directly.
    pub fn with_shell(mut self, shell: Option<String>) -> Self {
        self.shell = shell;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Argv for `item`.
    ///
    /// Every occurrence of the placeholder is replaced by the item. Without any
    /// occurrence the item becomes the last argument. In shell mode the item is
    /// spliced into the script text as-is.
    #[must_use]
    pub fn render(&self, item: &str) -> Vec<String> {
        let uses_placeholder = self.args.iter().any(|arg| arg.contains(&self.placeholder));

        match &self.shell {
            Some(shell) => {
                let script = self.args.join(" ");
                let script = if uses_placeholder {
                    script.replace(&self.placeholder, item)
                } else {
                    format!("{script} {item}")
                };
                vec![shell.clone(), "-c".to_string(), script]
            }
            None if uses_placeholder => self
                .args
                .iter()
                .map(|arg| arg.replace(&self.placeholder, item))
                .collect(),
            None => {
                let mut argv = self.args.clone();
                argv.push(item.to_string());
                argv
            }
        }
    }

    /// Spawn the command for `item` and wait for it, honoring the timeout.
    ///
    /// The child's stdout is sent to our stderr so stdout carries only the report.
    pub async fn run(&self, item: String) -> Result<CommandOutput, CommandError> {
        let argv = self.render(&item);
        let Some((program, args)) = argv.split_first() else {
            return Err(CommandError::Empty);
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(io::stderr())
            .stderr(Stdio::inherit());

        let mut guard = ChildGuard::spawn(&mut cmd).map_err(|source| CommandError::Spawn {
            program: program.clone(),
            source,
        })?;
        tracing::trace!(pid = ?guard.id(), %program, item = %item, "spawned");

        let status = match self.timeout {
            Some(timeout) => time::timeout(timeout, guard.wait())
                .await
                .map_err(|_| CommandError::TimedOut { timeout })?,
            None => guard.wait().await,
        }
        .map_err(|source| CommandError::Wait {
            program: program.clone(),
            source,
        })?;

        Ok(CommandOutput::from(status))
    }
}
