//! Walking the `<YYYY>/<YYYYMMDDHH>` directory layout.
use crate::dates::parse_cycle_name;
use crate::util::{file_name_str, sorted_entries};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use glob::{MatchOptions, Pattern};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Source of the raw observations of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Ctrl,
    Ens,
}

impl Branch {
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::Ctrl => "ctrl",
            Branch::Ens => "ens",
        }
    }
}

/// One assimilation cycle, named `YYYYMMDDHH`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cycle {
    label: String,
    time: NaiveDateTime,
}

impl Cycle {
    pub fn from_label(label: &str) -> Option<Self> {
        let time = parse_cycle_name(label)?;
        Some(Self {
            label: label.to_string(),
            time,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Year directory the cycle is filed under.
    pub fn year(&self) -> &str {
        &self.label[..4]
    }

    pub fn time(&self) -> &NaiveDateTime {
        &self.time
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInputs {
    pub cycle: Cycle,
    pub files: Vec<PathBuf>,
}

/// Raw observation files of the chosen branch, by cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInventory {
    pub branch: Branch,
    pub cycles: Vec<CycleInputs>,
}

impl RawInventory {
    pub fn file_count(&self) -> usize {
        self.cycles.iter().map(|cycle| cycle.files.len()).sum()
    }
}

/// Glob over raw file names built from an obs-type pattern such as `sst*`.
pub fn obs_type_pattern(obstype: &str) -> Result<Pattern> {
    Pattern::new(&format!("{obstype}.nc"))
        .with_context(|| format!("invalid obs type pattern {obstype:?}"))
}

pub(super) fn match_options() -> MatchOptions {
    MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    }
}

/// Cycle directories under `root/<YYYY>/`, in chronological order.
pub fn list_cycles(root: &Path) -> Result<Vec<(Cycle, PathBuf)>> {
    let mut cycles = Vec::new();
    for year_dir in sorted_entries(root)? {
        let is_year = file_name_str(&year_dir)
            .is_some_and(|name| name.len() == 4 && name.bytes().all(|b| b.is_ascii_digit()));
        if !is_year || !year_dir.is_dir() {
            continue;
        }
        for cycle_dir in sorted_entries(&year_dir)? {
            if !cycle_dir.is_dir() {
                continue;
            }
            if let Some(cycle) = file_name_str(&cycle_dir).and_then(Cycle::from_label) {
                cycles.push((cycle, cycle_dir));
            }
        }
    }
    cycles.sort();
    Ok(cycles)
}

/// Files directly inside `dir` whose name matches `pattern`, sorted.
pub(super) fn matching_files(dir: &Path, pattern: &Pattern) -> Result<Vec<PathBuf>> {
    let options = match_options();
    let mut files = Vec::new();
    for path in sorted_entries(dir)? {
        let matched = file_name_str(&path).is_some_and(|name| pattern.matches_with(name, options));
        if matched && path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

fn scan_branch(cycles: &[(Cycle, PathBuf)], branch: Branch, pattern: &Pattern) -> Result<Vec<CycleInputs>> {
    let mut found = Vec::new();
    for (cycle, dir) in cycles {
        let files = matching_files(&dir.join(branch.as_str()), pattern)?;
        if !files.is_empty() {
            found.push(CycleInputs {
                cycle: cycle.clone(),
                files,
            });
        }
    }
    Ok(found)
}

/// Scan `obs_out/` and keep whichever branch has more matching files.
///
/// Ties go to `ctrl`. The two branches are never combined.
pub fn scan_raw_observations(obs_out: &Path, pattern: &Pattern) -> Result<RawInventory> {
    let cycles = list_cycles(obs_out)?;
    let ctrl = scan_branch(&cycles, Branch::Ctrl, pattern)?;
    let ens = scan_branch(&cycles, Branch::Ens, pattern)?;
    let count = |found: &[CycleInputs]| found.iter().map(|c| c.files.len()).sum::<usize>();
    let (branch, cycles) = if count(&ctrl) >= count(&ens) {
        (Branch::Ctrl, ctrl)
    } else {
        (Branch::Ens, ens)
    };
    Ok(RawInventory { branch, cycles })
}
