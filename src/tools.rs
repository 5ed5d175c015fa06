//! Typed external tool invocation.
//!
//! Every subprocess the pipeline runs (git, unzip, tar, gradle, jar,
//! convert, hdiutil, python3, gu) goes through a [`ToolCommand`] descriptor
//! executed by a [`ToolRunner`]. The descriptor carries its own working
//! directory and environment overlay; the ambient process environment is
//! never mutated. Tests substitute a scripted runner to exercise failure
//! and retry policies without spawning anything.

use crate::error::{BundlerError, Result};
use std::path::{Path, PathBuf};

/// Description of one external tool invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
}

impl ToolCommand {
    /// Starts a descriptor for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory for the invocation.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Adds an environment variable overlaid on the inherited environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Program name, used in error reporting.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Argument list.
    pub fn argv(&self) -> &[String] {
        &self.args
    }

    /// Working directory, if one was set.
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Environment overlay entries.
    pub fn env_overlay(&self) -> &[(String, String)] {
        &self.env
    }
}

/// Captured result of a tool invocation.
#[derive(Clone, Debug)]
pub struct ToolOutput {
    /// Whether the tool exited successfully
    pub success: bool,
    /// Exit code when the tool exited normally
    pub code: Option<i32>,
    /// Captured standard error
    pub stderr: String,
}

/// Executes [`ToolCommand`]s. The pipeline is generic over this so tests
/// can script outcomes.
pub trait ToolRunner {
    /// Runs the command to completion and captures its status.
    fn run(&self, cmd: &ToolCommand) -> impl Future<Output = Result<ToolOutput>> + Send;
}

/// Real runner backed by [`tokio::process::Command`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    async fn run(&self, cmd: &ToolCommand) -> Result<ToolOutput> {
        log::debug!("running {} {:?}", cmd.program(), cmd.argv());

        let mut command = tokio::process::Command::new(cmd.program());
        command.args(cmd.argv());
        if let Some(dir) = cmd.cwd() {
            command.current_dir(dir);
        }
        for (key, value) in cmd.env_overlay() {
            command.env(key, value);
        }

        let output = command.output().await?;
        Ok(ToolOutput {
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Runs a command and turns a non-zero exit into [`BundlerError::ToolFailed`].
pub async fn run_checked<R: ToolRunner>(runner: &R, cmd: &ToolCommand) -> Result<ToolOutput> {
    let output = runner.run(cmd).await?;
    if output.success {
        Ok(output)
    } else {
        Err(BundlerError::ToolFailed {
            tool: cmd.program().to_string(),
            status: match output.code {
                Some(code) => format!("exit code {code}"),
                None => "signal".to_string(),
            },
            stderr: output.stderr,
        })
    }
}
