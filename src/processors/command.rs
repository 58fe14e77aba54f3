//! External command execution for processors.
//!
//! Every backend that shells out (Helm, Kustomize, plugins, pre-processors)
//! goes through [`run`]. The child runs in the package directory with stdout
//! and stderr piped. Optional stdin is fed from a writer thread and both
//! output pipes are drained on reader threads, so a chatty child can never
//! deadlock against a full pipe buffer. When a timeout is configured the
//! child is killed once it elapses.

use std::fmt;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};
use wait_timeout::ChildExt;

use crate::error::{Error, Result};

/// A program, its arguments, and extra environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// A shell command line, run with `sh -c`.
    pub fn shell(script: &str) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Run `spec` in `dir` and return its stdout.
///
/// `input`, when given, is written to the child's stdin; otherwise stdin is
/// closed. A non-zero exit is `Error::CommandFailed` carrying stderr.
pub fn run(
    spec: &CommandSpec,
    dir: &Path,
    input: Option<&str>,
    timeout: Option<Duration>,
) -> Result<String> {
    let command = spec.to_string();
    debug!("Running `{}` in {}", command, dir.display());

    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(dir)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| command_error(&command, e))?;

    let writer = match (child.stdin.take(), input) {
        (Some(mut stdin), Some(text)) => {
            let text = text.to_owned();
            // Dropping stdin at the end of the thread closes the pipe.
            Some(thread::spawn(move || stdin.write_all(text.as_bytes())))
        }
        _ => None,
    };
    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let status = wait(&mut child, &command, timeout)?;

    if let Some(writer) = writer {
        match writer.join() {
            Ok(Ok(())) => {}
            // The child may legitimately exit without reading all of stdin.
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(command_error(&command, e)),
            Err(_) => return Err(command_error(&command, "stdin writer panicked")),
        }
    }

    let stdout = collect(stdout, &command)?;
    let stderr = collect(stderr, &command)?;

    if !status.success() {
        return Err(Error::CommandFailed {
            command,
            status: status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    if !stderr.trim().is_empty() {
        debug!("`{}` stderr: {}", command, stderr.trim());
    }

    Ok(stdout)
}

fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn collect(handle: Option<JoinHandle<io::Result<Vec<u8>>>>, command: &str) -> Result<String> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| command_error(command, "output reader panicked"))?
        .map_err(|e| command_error(command, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Wait for the child, killing it if `timeout` elapses first.
fn wait(child: &mut Child, command: &str, timeout: Option<Duration>) -> Result<ExitStatus> {
    let Some(timeout) = timeout else {
        return child.wait().map_err(|e| command_error(command, e));
    };

    match child
        .wait_timeout(timeout)
        .map_err(|e| command_error(command, e))?
    {
        Some(status) => Ok(status),
        None => {
            warn!(
                "`{}` timed out after {}s, killing process",
                command,
                timeout.as_secs()
            );
            drop(child.kill());
            drop(child.wait());
            Err(Error::CommandTimeout {
                command: command.to_string(),
                timeout_secs: timeout.as_secs(),
            })
        }
    }
}

fn command_error(command: &str, message: impl ToString) -> Error {
    Error::Command {
        command: command.to_string(),
        message: message.to_string(),
    }
}
