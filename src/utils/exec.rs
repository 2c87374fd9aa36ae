//! External command execution.
//!
//! Converters that only exist as command-line tools are driven through
//! pipes: input bytes on stdin, result bytes from stdout.

use std::{
    ffi::OsStr,
    io::Write,
    process::{Command, ExitStatus, Stdio},
    thread,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("command is empty")]
    Empty,

    #[error("`{0}` not found, please install it first")]
    NotFound(String),

    #[error("failed to run `{0}`")]
    Spawn(String, #[source] std::io::Error),

    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Check that the program of `command` can be found on `PATH`.
pub fn check_installed(command: &[String]) -> Result<(), ExecError> {
    let program = command.first().ok_or(ExecError::Empty)?;
    which::which(program).map_err(|_| ExecError::NotFound(program.clone()))?;
    Ok(())
}

/// Run `command` followed by `args`, feeding `input` on stdin.
///
/// Returns stdout on success. Stdin is written from a scoped thread so a
/// tool that streams output before reading all input cannot deadlock.
pub fn run_with_stdin<S: AsRef<OsStr>>(
    command: &[String],
    args: &[S],
    input: &[u8],
) -> Result<Vec<u8>, ExecError> {
    let (program, base_args) = command.split_first().ok_or(ExecError::Empty)?;
    let path = which::which(program).map_err(|_| ExecError::NotFound(program.clone()))?;

    let mut child = Command::new(path)
        .args(base_args)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ExecError::Spawn(program.clone(), e))?;

    let stdin = child.stdin.take();
    let output = thread::scope(|s| {
        if let Some(mut stdin) = stdin {
            // A closed pipe shows up in the exit status
            s.spawn(move || stdin.write_all(input).ok());
        }
        child.wait_with_output()
    })
    .map_err(|e| ExecError::Spawn(program.clone(), e))?;

    if !output.status.success() {
        return Err(ExecError::Failed {
            command: program.clone(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }

    Ok(output.stdout)
}
