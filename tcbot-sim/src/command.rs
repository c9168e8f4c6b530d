//! Utilities for [`std::process::Command`].

use std::{ffi::OsStr, fmt, io, process};

/// Errors returned when running an external command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The command line was empty.
    #[error("empty command provided")]
    Empty,
    /// The process could not be spawned or waited on.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The process ran but exited with a failure status.
    #[error("{0}")]
    NonZero(Output),
}

impl Error {
    /// The stdout captured before the failure, if the process ran at all.
    pub fn stdout(&self) -> &str {
        match self {
            Self::NonZero(output) => &output.stdout,
            Self::Empty | Self::Io(_) => "",
        }
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct Output {
    pub status: process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl From<process::Output> for Output {
    fn from(value: process::Output) -> Self {
        Self {
            status: value.status,
            stdout: String::from_utf8_lossy(&value.stdout).to_string(),
            stderr: String::from_utf8_lossy(&value.stderr).to_string(),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            write!(f, "{}", self.status)
        } else {
            write!(f, "{}: {stderr}", self.status)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Runs external programs, capturing stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct Runner;

impl Runner {
    /// Runs `program` with the provided arguments and waits for it to exit.
    ///
    /// A non-zero exit status is returned as [`Error::NonZero`], carrying whatever the process
    /// wrote before failing.
    pub fn run<I, S>(program: &str, args: I) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        if program.is_empty() {
            return Err(Error::Empty);
        }

        let mut cmd = process::Command::new(program);
        cmd.args(args).stderr(process::Stdio::piped()).stdout(process::Stdio::piped());

        tracing::debug!(?cmd, "running command");

        let output: Output = cmd.spawn()?.wait_with_output()?.into();

        if !output.status.success() {
            tracing::debug!(?output.stderr, ?output.status, ?cmd, "command returned non-zero status");
            return Err(Error::NonZero(output));
        }

        Ok(output)
    }
}
