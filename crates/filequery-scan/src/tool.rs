//! Blocking invocation of external command-line tools.

use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Interval between exit checks while a timeout is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Failure of a single external tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The program could not be started.
    #[error("could not run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program exited unsuccessfully.
    #[error("`{program}` exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The program did not finish in time and was killed.
    #[error("`{program}` did not finish within {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    /// Waiting on or reading from the program failed.
    #[error("I/O error talking to `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// An external program run once per file with the file path as its only
/// argument.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: OsString,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Create a command for `program` with no timeout.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            timeout: None,
        }
    }

    /// Kill the program if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name of the program, for messages.
    pub fn program(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Run the program on `path` and return its standard output.
    pub fn run(&self, path: &Path) -> Result<String, ToolError> {
        let program = self.program();
        let mut child = Command::new(&self.program)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: program.clone(),
                source,
            })?;

        let status = match self.timeout {
            Some(timeout) => wait_with_deadline(&mut child, timeout, &program)?,
            None => child.wait().map_err(|source| ToolError::Io {
                program: program.clone(),
                source,
            })?,
        };

        // Both tools print one short line, well under the pipe buffer.
        let stdout = read_pipe(child.stdout.take(), &program)?;
        if !status.success() {
            let stderr = read_pipe(child.stderr.take(), &program)?;
            return Err(ToolError::Exit {
                program,
                status,
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
    program: &str,
) -> Result<ExitStatus, ToolError> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ToolError::TimedOut {
                    program: program.to_string(),
                    timeout,
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(source) => {
                return Err(ToolError::Io {
                    program: program.to_string(),
                    source,
                });
            }
        }
    }
}

fn read_pipe<R: Read>(pipe: Option<R>, program: &str) -> Result<String, ToolError> {
    let mut bytes = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut bytes).map_err(|source| ToolError::Io {
            program: program.to_string(),
            source,
        })?;
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
