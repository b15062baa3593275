//! Typed paths into a soca-science experiment layout.
//!
//! Centralizing path construction keeps the binning and plotting workflows in
//! agreement about where each level lives.
use crate::config::Level;
use crate::discover::Cycle;
use std::path::{Path, PathBuf};

/// Files and directories every plotted experiment must contain.
pub const PLOT_REQUIRED_ENTRIES: [&str; 3] = ["cycle_status", "exp.config", "obs_bin"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentPaths {
    root: PathBuf,
}

impl ExperimentPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the `exp.config` path.
    pub fn exp_config_path(&self) -> PathBuf {
        self.root.join("exp.config")
    }

    /// Return the `cycle_status` path.
    pub fn cycle_status_path(&self) -> PathBuf {
        self.root.join("cycle_status")
    }

    /// Return the `obs_out/` directory holding raw observations.
    pub fn obs_out_dir(&self) -> PathBuf {
        self.root.join("obs_out")
    }

    /// Return the `obs_bin/` directory holding binned products.
    pub fn obs_bin_dir(&self) -> PathBuf {
        self.root.join("obs_bin")
    }

    /// Return `obs_bin/<level>/`.
    pub fn level_dir(&self, level: Level) -> PathBuf {
        self.obs_bin_dir().join(level.as_str())
    }

    /// Return `obs_bin/<level>/<YYYY>/<YYYYMMDDHH>/`.
    pub fn level_cycle_dir(&self, level: Level, cycle: &Cycle) -> PathBuf {
        self.level_dir(level).join(cycle.year()).join(cycle.label())
    }
}
