//! Level specifications and tool settings.
//!
//! The config directory is read once at startup into an immutable [`Config`]
//! that every workflow borrows; nothing is kept in global state.
use std::collections::BTreeMap;
use std::path::PathBuf;

mod levels;
mod load;
mod tools;

pub use levels::{BinSpec, Level, MergeOperation, MergeSpec, ObsTypeSpec, SourceRef};
pub use load::{load_config, resolve_config_dir};
pub use tools::{PlotConfig, ToolsConfig};

/// File name of the optional tool command overrides.
pub const TOOLS_FILE: &str = "tools.yaml";
/// File name of the optional plot settings.
pub const PLOT_FILE: &str = "plot.yaml";

/// Everything loaded from the config directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    /// Raw binning levels keyed by name.
    pub l1a: BTreeMap<String, BinSpec>,
    /// Per-cycle platform merges keyed by name.
    pub l1b: BTreeMap<String, MergeSpec>,
    /// Cross-cycle merges keyed by name.
    pub l1c: BTreeMap<String, MergeSpec>,
    pub tools: ToolsConfig,
    pub plot: PlotConfig,
}

impl Config {
    /// An empty configuration rooted at `root`, with default tools.
    #[cfg(test)]
    pub fn empty(root: &std::path::Path) -> Self {
        Self {
            root: root.to_path_buf(),
            l1a: BTreeMap::new(),
            l1b: BTreeMap::new(),
            l1c: BTreeMap::new(),
            tools: ToolsConfig::default(),
            plot: PlotConfig::default(),
        }
    }

    /// l1c levels selected for plotting.
    pub fn plotted_l1c(&self) -> impl Iterator<Item = (&String, &MergeSpec)> {
        self.l1c
            .iter()
            .filter(move |(name, _)| match self.plot.source.as_deref() {
                Some(source) => source == name.as_str(),
                None => true,
            })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
