//! External tool invocations.
//!
//! Commands are explicit argument lists handed straight to the process; no
//! shell ever interprets them. Display strings are shell-quoted for logs only.
use crate::config::BinSpec;
use crate::util::{exit_status_string, path_arg};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Split a configured command such as `nix run .#bespin --` into program
    /// and leading arguments.
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut words = shell_words::split(command_line)
            .with_context(|| format!("parse tool command: {command_line}"))?;
        if words.is_empty() {
            return Err(anyhow!("tool command is empty"));
        }
        let mut command = Self::new(words.remove(0));
        command.args = words;
        Ok(command)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Value following `flag`, e.g. the output path after `-o`.
    #[cfg(test)]
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|idx| self.args.get(idx + 1))
            .map(String::as_str)
    }

    /// Shell-quoted rendering for logs and `--dry-run`.
    pub fn display(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(self.args.iter()))
    }
}

/// `bespin bin <in> -o <out> [-d ..]* [-f ..]* [-b ..]* -v <var> [-O]`
pub fn bin_command(
    base: &ToolCommand,
    spec: &BinSpec,
    variable: &str,
    input: &Path,
    output: &Path,
    overwrite: bool,
) -> Result<ToolCommand> {
    if variable.trim().is_empty() {
        return Err(anyhow!(
            "binning spec \"{}\" has no variable for {}",
            spec.name,
            input.display()
        ));
    }
    let mut cmd = base
        .clone()
        .arg("bin")
        .arg(path_arg(input)?)
        .arg("-o")
        .arg(path_arg(output)?);
    for diagnostic in &spec.diagnostics {
        cmd = cmd.arg("-d").arg(diagnostic.as_str());
    }
    for filter in &spec.filters {
        cmd = cmd.arg("-f").arg(filter.as_str());
    }
    for bin in &spec.bins {
        cmd = cmd.arg("-b").arg(bin.as_str());
    }
    cmd = cmd.arg("-v").arg(variable);
    if overwrite {
        cmd = cmd.arg("-O");
    }
    Ok(cmd)
}

/// `bespin merge <in>... -o <out> [-O]`
pub fn merge_command(
    base: &ToolCommand,
    inputs: &[PathBuf],
    output: &Path,
    overwrite: bool,
) -> Result<ToolCommand> {
    if inputs.is_empty() {
        return Err(anyhow!("merge into {} has no inputs", output.display()));
    }
    let mut cmd = base.clone().arg("merge");
    for input in inputs {
        cmd = cmd.arg(path_arg(input)?);
    }
    cmd = cmd.arg("-o").arg(path_arg(output)?);
    if overwrite {
        cmd = cmd.arg("-O");
    }
    Ok(cmd)
}

/// `<plot> <in>... --domain <d> [--qc <sel>]* [--diff] -o <prefix>`
pub fn plot_command(
    base: &ToolCommand,
    inputs: &[PathBuf],
    domain: &str,
    qc: &[String],
    diff: bool,
    prefix: &Path,
) -> Result<ToolCommand> {
    if inputs.is_empty() {
        return Err(anyhow!("plot {} has no inputs", prefix.display()));
    }
    let mut cmd = base.clone();
    for input in inputs {
        cmd = cmd.arg(path_arg(input)?);
    }
    cmd = cmd.arg("--domain").arg(domain);
    for selector in qc {
        cmd = cmd.arg("--qc").arg(selector.as_str());
    }
    if diff {
        cmd = cmd.arg("--diff");
    }
    Ok(cmd.arg("-o").arg(path_arg(prefix)?))
}

/// Executes tool commands and file copies for the workflows.
pub trait ToolRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<()>;

    fn copy(&mut self, from: &Path, to: &Path) -> Result<()>;

    /// When true, nothing on disk may change.
    fn dry_run(&self) -> bool {
        false
    }
}

/// Runs commands as blocking child processes.
#[derive(Debug, Default)]
pub struct ProcessRunner {
    dry_run: bool,
}

impl ProcessRunner {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<()> {
        let rendered = command.display();
        if self.dry_run {
            println!("{rendered}");
            return Ok(());
        }
        let program = which::which(command.program())
            .with_context(|| format!("locate tool {}", command.program()))?;
        tracing::debug!(command = %rendered, "running tool");

        let start = Instant::now();
        let status = Command::new(&program)
            .args(command.args())
            .status()
            .with_context(|| format!("spawn {}", program.display()))?;
        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            program = %command.program(),
            "tool invocation complete"
        );

        if !status.success() {
            return Err(anyhow!(
                "{} failed with status {}: {}",
                command.program(),
                exit_status_string(&status),
                rendered
            ));
        }
        Ok(())
    }

    fn copy(&mut self, from: &Path, to: &Path) -> Result<()> {
        if self.dry_run {
            println!("cp {} {}", from.display(), to.display());
            return Ok(());
        }
        fs::copy(from, to)
            .with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
        Ok(())
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
