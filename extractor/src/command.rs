//! External command execution.
//!
//! The archiver shells out to the JDK's `jar` tool. Running it through the
//! [`CommandExecutor`] trait keeps the invocation observable in tests and lets
//! the host implementation enforce an optional timeout.

use crate::error::{ExtractError, Result};
use log::debug;
use std::io::Read;
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// A non-zero exit is not an error at this level; callers inspect
    /// [`Output::status`].
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ArchiverSpawn`] if the program cannot be
    /// started and [`ExtractError::ArchiverTimeout`] if it outlives the
    /// executor's timeout.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pz_extract::command::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor::default();
    /// let output = executor.run("jar", &["--version"])?;
    /// assert!(output.status.success());
    /// # Ok::<(), pz_extract::error::ExtractError>(())
    /// ```
    fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for &T {
    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        (**self).run(program, args)
    }
}

/// Executes commands on the host system.
///
/// Without a timeout the call blocks until the child exits, however long that
/// takes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor {
    timeout: Option<Duration>,
}

impl SystemCommandExecutor {
    /// Executor that kills the child after `timeout`.
    #[must_use]
    pub const fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        debug!("running {program} {}", args.join(" "));
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let spawn_failed = |source| ExtractError::ArchiverSpawn {
            program: program.to_owned(),
            source,
        };

        let Some(timeout) = self.timeout else {
            return cmd.output().map_err(spawn_failed);
        };

        let mut child = cmd.spawn().map_err(spawn_failed)?;
        match child.wait_timeout(timeout)? {
            Some(status) => Ok(Output {
                status,
                stdout: drain(child.stdout.take())?,
                stderr: drain(child.stderr.take())?,
            }),
            None => {
                kill_quietly(&mut child);
                Err(ExtractError::ArchiverTimeout {
                    program: program.to_owned(),
                    seconds: timeout.as_secs(),
                })
            }
        }
    }
}

fn drain(pipe: Option<impl Read>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf)?;
    }
    Ok(buf)
}

fn kill_quietly(child: &mut Child) {
    if child.kill().is_ok() {
        let _ = child.wait();
    }
}

/// Render captured process output for an error message, preferring stderr.
#[must_use]
pub fn diagnostic_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_owned();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    if stdout.is_empty() {
        "no diagnostic output".to_owned()
    } else {
        stdout.to_owned()
    }
}
