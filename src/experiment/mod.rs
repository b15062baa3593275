//! Experiment metadata: name, regionality and the period each experiment
//! covers.
//!
//! Metadata comes from `exp.config` (start date, name, regional flag) and
//! `cycle_status` (latest completed cycle). It is read once per invocation.
use crate::dates::parse_date;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

mod expconfig;
mod paths;
mod window;

pub use expconfig::{parse_exp_config, parse_flag};
pub use paths::{ExperimentPaths, PLOT_REQUIRED_ENTRIES};
pub use window::{check_plot_count, common_window, plot_set_name, Window};

pub const EXP_NAME_KEY: &str = "EXP_NAME";
pub const REGIONAL_KEY: &str = "DA_REGIONAL_ENABLED";
pub const START_DATE_KEY: &str = "EXP_START_DATE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Experiment {
    pub name: String,
    pub path: PathBuf,
    pub regional: bool,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Canonicalize an experiment directory, which must exist.
pub fn resolve_experiment_root(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(anyhow!(
            "experiment directory {} does not exist",
            path.display()
        ));
    }
    path.canonicalize()
        .with_context(|| format!("resolve experiment root {}", path.display()))
}

/// Canonicalize all roots and reject the same directory given twice.
pub fn resolve_experiment_roots(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut roots: Vec<PathBuf> = Vec::with_capacity(paths.len());
    for path in paths {
        let root = resolve_experiment_root(path)?;
        if roots.contains(&root) {
            return Err(anyhow!(
                "cannot use the same experiment more than once on the command line: {}",
                root.display()
            ));
        }
        roots.push(root);
    }
    Ok(roots)
}

/// Fail when any experiment lacks one of `entries`.
pub fn require_entries(roots: &[PathBuf], entries: &[&str]) -> Result<()> {
    for entry in entries {
        for root in roots {
            if !root.join(entry).exists() {
                return Err(anyhow!(
                    "experiment at \"{}\" does not contain required \"{}\"",
                    root.display(),
                    entry
                ));
            }
        }
    }
    Ok(())
}

/// Read one experiment's metadata.
pub fn read_experiment(root: &Path) -> Result<Experiment> {
    let paths = ExperimentPaths::new(root.to_path_buf());
    let config_path = paths.exp_config_path();
    let (name, regional, start) = read_exp_config(&config_path).with_context(|| {
        format!(
            "unable to read variables from file \"{}\"",
            config_path.display()
        )
    })?;

    let status_path = paths.cycle_status_path();
    let status = fs::read_to_string(&status_path)
        .with_context(|| format!("read {}", status_path.display()))?;
    let end = parse_date(&status)
        .with_context(|| format!("parse end date from {}", status_path.display()))?;

    Ok(Experiment {
        name,
        path: root.to_path_buf(),
        regional,
        start,
        end,
    })
}

fn read_exp_config(path: &Path) -> Result<(String, bool, NaiveDateTime)> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let vars = parse_exp_config(&text)?;
    let name = vars
        .get(EXP_NAME_KEY)
        .map(|value| value.trim().to_string())
        .unwrap_or_default();
    if name.is_empty() {
        return Err(anyhow!("illegal value for {EXP_NAME_KEY} {name:?}"));
    }
    let regional = vars.get(REGIONAL_KEY).is_some_and(|value| parse_flag(value));
    let start_text = vars
        .get(START_DATE_KEY)
        .ok_or_else(|| anyhow!("{START_DATE_KEY} is not set"))?;
    let start = parse_date(start_text).with_context(|| format!("parse {START_DATE_KEY}"))?;
    Ok((name, regional, start))
}

/// Read every experiment, rejecting duplicate names.
pub fn read_experiments(roots: &[PathBuf]) -> Result<Vec<Experiment>> {
    let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut experiments = Vec::with_capacity(roots.len());
    for root in roots {
        let experiment = read_experiment(root)?;
        if let Some(previous) = seen.get(&experiment.name) {
            return Err(anyhow!(
                "experiment name \"{}\" is already present.\n trying to add: \"{}\"\n already present: \"{}\"",
                experiment.name,
                root.display(),
                previous.display()
            ));
        }
        seen.insert(experiment.name.clone(), root.clone());
        experiments.push(experiment);
    }
    Ok(experiments)
}

#[cfg(test)]
#[path = "experiment_tests.rs"]
mod tests;
