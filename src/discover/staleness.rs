//! Regeneration decisions based on modification times.
use crate::util::{file_name_str, modified_time, modified_time_optional, sorted_entries};
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Why an output is, or is not, regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The output does not exist yet.
    Missing,
    /// The output exists but `--force` was given.
    Forced,
    /// An input is newer than the output.
    Stale,
    UpToDate,
}

impl Decision {
    pub fn needs_regeneration(self) -> bool {
        !matches!(self, Decision::UpToDate)
    }

    /// Whether the tool must be told to overwrite an existing output.
    pub fn overwrite(self) -> bool {
        matches!(self, Decision::Forced | Decision::Stale)
    }
}

/// Decide from already-collected modification times.
pub fn decide_from_times<I>(output: Option<SystemTime>, inputs: I, force: bool) -> Decision
where
    I: IntoIterator<Item = SystemTime>,
{
    let Some(output) = output else {
        return Decision::Missing;
    };
    if force {
        return Decision::Forced;
    }
    if inputs.into_iter().any(|input| input > output) {
        Decision::Stale
    } else {
        Decision::UpToDate
    }
}

/// Decide whether `output` must be regenerated from `inputs`.
///
/// Inputs must exist; a vanished input is an error rather than a silent skip.
pub fn decide(output: &Path, inputs: &[PathBuf], force: bool) -> Result<Decision> {
    let output_time = modified_time_optional(output)?;
    if output_time.is_none() || force {
        return Ok(decide_from_times(output_time, std::iter::empty(), force));
    }
    let input_times = inputs
        .iter()
        .map(|input| modified_time(input.as_path()))
        .collect::<Result<Vec<_>>>()?;
    Ok(decide_from_times(output_time, input_times, force))
}

/// Like [`decide`] for tools that write several files sharing `prefix`
/// (`<dir>/<stem>`, `<dir>/<stem>.*`, `<dir>/<stem>_*`). The oldest of those
/// files stands for the output.
pub fn decide_prefix(prefix: &Path, inputs: &[PathBuf], force: bool) -> Result<Decision> {
    let mut oldest: Option<SystemTime> = None;
    for output in prefix_outputs(prefix)? {
        if let Some(time) = modified_time_optional(&output)? {
            oldest = Some(oldest.map_or(time, |current| current.min(time)));
        }
    }
    if oldest.is_none() || force {
        return Ok(decide_from_times(oldest, std::iter::empty(), force));
    }
    let input_times = inputs
        .iter()
        .map(|input| modified_time(input.as_path()))
        .collect::<Result<Vec<_>>>()?;
    Ok(decide_from_times(oldest, input_times, force))
}

fn prefix_outputs(prefix: &Path) -> Result<Vec<PathBuf>> {
    let (Some(dir), Some(stem)) = (prefix.parent(), file_name_str(prefix)) else {
        return Ok(Vec::new());
    };
    let outputs = sorted_entries(dir)?
        .into_iter()
        .filter(|path| {
            file_name_str(path).is_some_and(|name| {
                name == stem
                    || name
                        .strip_prefix(stem)
                        .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('_'))
            })
        })
        .filter(|path| path.is_file())
        .collect();
    Ok(outputs)
}
