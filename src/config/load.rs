//! Config directory loading.
//!
//! Each level directory holds one YAML spec per file, keyed by its `name`.
use super::{
    BinSpec, Config, Level, MergeOperation, MergeSpec, PlotConfig, ToolsConfig, PLOT_FILE,
    TOOLS_FILE,
};
use crate::util::sorted_entries;
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// `~/.config/socaplot` (or the platform equivalent).
pub fn default_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow!("cannot determine config directory"))?;
    Ok(base.join("socaplot"))
}

/// Explicit `--config-dir` / `SOCAPLOT_CONFIG_DIR` wins over the default.
pub fn resolve_config_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_dir(),
    }
}

/// Load and validate every level spec plus the optional tool/plot settings.
pub fn load_config(root: &Path) -> Result<Config> {
    if !root.is_dir() {
        return Err(anyhow!(
            "config directory {} does not exist (pass --config-dir or set SOCAPLOT_CONFIG_DIR)",
            root.display()
        ));
    }
    let config = Config {
        root: root.to_path_buf(),
        l1a: load_level(root, Level::L1a, |spec: &BinSpec| spec.name.clone())?,
        l1b: load_level(root, Level::L1b, |spec: &MergeSpec| spec.name.clone())?,
        l1c: load_level(root, Level::L1c, |spec: &MergeSpec| spec.name.clone())?,
        tools: load_optional::<ToolsConfig>(&root.join(TOOLS_FILE))?
            .unwrap_or_default()
            .with_env_overrides(),
        plot: load_optional::<PlotConfig>(&root.join(PLOT_FILE))?.unwrap_or_default(),
    };
    validate_config(&config)?;
    tracing::debug!(
        root = %config.root.display(),
        l1a = config.l1a.len(),
        l1b = config.l1b.len(),
        l1c = config.l1c.len(),
        "config loaded"
    );
    Ok(config)
}

/// Check cross-references between levels and required fields.
pub fn validate_config(config: &Config) -> Result<()> {
    for (name, spec) in &config.l1a {
        if name.trim().is_empty() {
            return Err(anyhow!("l1a spec with an empty name"));
        }
        for (obs_type, obs) in &spec.obs_types {
            if !obs.skip && obs.variable.trim().is_empty() {
                return Err(anyhow!(
                    "l1a \"{name}\": obs type \"{obs_type}\" needs a non-empty variable"
                ));
            }
        }
    }
    validate_merges(config, Level::L1b)?;
    validate_merges(config, Level::L1c)?;
    if let Some(source) = config.plot.source.as_deref() {
        if !config.l1c.contains_key(source) {
            return Err(anyhow!(
                "{PLOT_FILE}: source \"{source}\" is not a configured l1c level"
            ));
        }
    }
    if config.tools.bespin.trim().is_empty() || config.tools.plot.trim().is_empty() {
        return Err(anyhow!("{TOOLS_FILE}: tool commands must be non-empty"));
    }
    Ok(())
}

fn validate_merges(config: &Config, level: Level) -> Result<()> {
    let (specs, expected_source, expected_op) = match level {
        Level::L1b => (&config.l1b, Level::L1a, "merge_plat"),
        Level::L1c => (&config.l1c, Level::L1b, "merge_cycle"),
        Level::L1a => return Ok(()),
    };
    for (name, spec) in specs {
        if spec.operation.as_str() != expected_op {
            return Err(anyhow!(
                "{level} \"{name}\": operation must be {expected_op} (got {})",
                spec.operation.as_str()
            ));
        }
        if spec.source.level != expected_source {
            return Err(anyhow!(
                "{level} \"{name}\": source level must be {expected_source} (got {})",
                spec.source.level
            ));
        }
        let known = match expected_source {
            Level::L1a => config.l1a.contains_key(&spec.source.name),
            Level::L1b => config.l1b.contains_key(&spec.source.name),
            Level::L1c => false,
        };
        if !known {
            return Err(anyhow!(
                "{level} \"{name}\": unknown source {expected_source} \"{}\"",
                spec.source.name
            ));
        }
        if let MergeOperation::MergePlat { ignore } = &spec.operation {
            if let Some(obs_type) = ignore.keys().find(|key| key.trim().is_empty()) {
                return Err(anyhow!(
                    "{level} \"{name}\": empty obs type {obs_type:?} in ignore list"
                ));
            }
        }
    }
    Ok(())
}

fn load_level<T, F>(root: &Path, level: Level, name_of: F) -> Result<BTreeMap<String, T>>
where
    T: DeserializeOwned,
    F: Fn(&T) -> String,
{
    let dir = root.join(level.as_str());
    let mut specs = BTreeMap::new();
    let mut origins: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in sorted_entries(&dir)? {
        if !is_yaml(&path) {
            continue;
        }
        let spec: T = read_yaml(&path)?;
        let name = name_of(&spec);
        if let Some(previous) = origins.get(&name) {
            return Err(anyhow!(
                "{level} name \"{name}\" defined twice: {} and {}",
                previous.display(),
                path.display()
            ));
        }
        origins.insert(name.clone(), path);
        specs.insert(name, spec);
    }
    Ok(specs)
}

fn load_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.is_file() {
        return Ok(None);
    }
    read_yaml(path).map(Some)
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    serde_yaml::from_slice(&bytes).with_context(|| format!("parse config {}", path.display()))
}

fn is_yaml(path: &Path) -> bool {
    path.is_file()
        && matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        )
}
