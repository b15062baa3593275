//! Merge step shared by the per-cycle (l1b) and cross-cycle (l1c) levels.
use super::Outcome;
use crate::discover::decide;
use crate::tool::{merge_command, ToolCommand, ToolRunner};
use crate::util::ensure_parent_dir;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Bring `output` up to date with `inputs`.
///
/// No inputs means nothing to merge; a single input is copied instead of
/// invoking the merge tool.
pub(super) fn merge_into(
    bespin: &ToolCommand,
    inputs: &[PathBuf],
    output: &Path,
    force: bool,
    runner: &mut dyn ToolRunner,
) -> Result<Outcome> {
    if inputs.is_empty() {
        tracing::warn!(output = %output.display(), "no inputs left to merge, skipping");
        return Ok(Outcome::Skipped);
    }
    let decision = decide(output, inputs, force)?;
    if !decision.needs_regeneration() {
        tracing::debug!(output = %output.display(), "up to date");
        return Ok(Outcome::UpToDate);
    }
    tracing::debug!(output = %output.display(), ?decision, inputs = inputs.len(), "merging");
    if !runner.dry_run() {
        ensure_parent_dir(output)?;
    }
    if let [single] = inputs {
        runner.copy(single, output)?;
        return Ok(Outcome::Copied);
    }
    let command = merge_command(bespin, inputs, output, decision.overwrite())?;
    runner.run(&command)?;
    Ok(Outcome::Generated)
}
