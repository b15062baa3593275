//! File-name decomposition.
//!
//! Raw files are `<obstype>_<platform>.nc`, binned products are
//! `<spec>.<obstype>[_<platform>][.<suffix>].nc`. Names split on `.` first,
//! then the observation token splits on its first `_`.
use super::layout::matching_files;
use crate::util::file_name_str;
use anyhow::{Context, Result};
use glob::Pattern;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObsKey {
    pub obs_type: String,
    pub platform: Option<String>,
}

impl ObsKey {
    /// `sst_viirs_npp` -> (`sst`, `viirs_npp`); `adt` -> (`adt`, none).
    pub fn parse(token: &str) -> Self {
        match token.split_once('_') {
            Some((obs_type, platform)) => Self {
                obs_type: obs_type.to_string(),
                platform: Some(platform.to_string()),
            },
            None => Self {
                obs_type: token.to_string(),
                platform: None,
            },
        }
    }
}

/// Stem and key of a raw observation file.
pub fn raw_file_key(path: &Path) -> Option<(String, ObsKey)> {
    let stem = file_name_str(path)?.split('.').next()?;
    if stem.is_empty() {
        return None;
    }
    Some((stem.to_string(), ObsKey::parse(stem)))
}

/// Key of a binned product, read from the token after the spec name.
pub fn level_file_key(path: &Path) -> Option<ObsKey> {
    let token = file_name_str(path)?.split('.').nth(1)?;
    if token.is_empty() {
        return None;
    }
    Some(ObsKey::parse(token))
}

/// Obs types present among `<source>.<obstype-pattern>.nc` products in `dir`.
pub fn product_obs_types(dir: &Path, source: &str, obstype: &str) -> Result<BTreeSet<String>> {
    let pattern = Pattern::new(&format!("{}.{obstype}.nc", Pattern::escape(source)))
        .with_context(|| format!("invalid obs type pattern {obstype:?}"))?;
    let obs_types = matching_files(dir, &pattern)?
        .iter()
        .filter_map(|path| level_file_key(path))
        .map(|key| key.obs_type)
        .collect();
    Ok(obs_types)
}

/// Per-platform products `<source>.<obs_type>_*.nc` in `dir`, minus the
/// excluded platforms.
pub fn merge_inputs(
    dir: &Path,
    source: &str,
    obs_type: &str,
    excluded: &[String],
) -> Result<Vec<PathBuf>> {
    let pattern = Pattern::new(&format!(
        "{}.{}_*.nc",
        Pattern::escape(source),
        Pattern::escape(obs_type)
    ))
    .with_context(|| format!("invalid merge pattern for {source}.{obs_type}"))?;
    let inputs = matching_files(dir, &pattern)?
        .into_iter()
        .filter(|path| {
            let platform = level_file_key(path).and_then(|key| key.platform);
            match platform {
                Some(platform) => !excluded.contains(&platform),
                None => true,
            }
        })
        .collect();
    Ok(inputs)
}
