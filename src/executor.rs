//! Synchronous subprocess execution for measurement runs and rebuilds.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

/// A command line plus the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
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

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// A run or build that did not exit cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("command `{command}` failed ({}): {stderr}", status_text(.status))]
pub struct CommandFailure {
    pub command: String,
    /// Exit code; `None` if the process could not be spawned or was killed
    /// by a signal.
    pub status: Option<i32>,
    pub stderr: String,
}

fn status_text(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}

/// Executes an invocation to completion and returns its stdout.
///
/// Implementations must block until the process exits; sweeps rely on a
/// rebuild being finished before the next measurement starts.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<String, CommandFailure>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, invocation: &Invocation) -> Result<String, CommandFailure> {
        (**self).run(invocation)
    }
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<String, CommandFailure> {
        info!(command = %invocation, "running command");
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|err| CommandFailure {
            command: invocation.to_string(),
            status: None,
            stderr: err.to_string(),
        })?;

        if !output.status.success() {
            return Err(CommandFailure {
                command: invocation.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(command = %invocation, bytes = stdout.len(), "command finished");
        Ok(stdout)
    }
}

/// The measurement command: `<program> <n_items> <phi> <variant>`.
pub fn measurement(program: &Path, n_items: u64, phi: f64, sketch_id: &str) -> Invocation {
    Invocation::new(program).args([n_items.to_string(), phi.to_string(), sketch_id.to_string()])
}

/// The rebuild command: `<build...> COPT=<define>` run next to the program.
///
/// An empty `build_command` falls back to `make -B`.
pub fn rebuild(build_command: &[String], program: &Path, define: &str) -> Invocation {
    let (exe, rest) = match build_command.split_first() {
        Some((exe, rest)) => (exe.as_str(), rest.to_vec()),
        None => ("make", vec!["-B".to_string()]),
    };
    Invocation::new(exe)
        .args(rest)
        .arg(format!("COPT={define}"))
        .current_dir(source_dir(program))
}

/// Directory holding the external program's sources; the program's parent,
/// or `.` for a bare file name.
pub fn source_dir(program: &Path) -> PathBuf {
    match program.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
