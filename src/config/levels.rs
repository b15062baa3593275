use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Processing level of a binned product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    L1a,
    L1b,
    L1c,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::L1a => "l1a",
            Level::L1b => "l1b",
            Level::L1c => "l1c",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An l1a binning spec: which diagnostics, filters and bins to apply.
#[derive(Debug, Clone, Deserialize)]
pub struct BinSpec {
    pub name: String,
    #[serde(default, deserialize_with = "scalar_list")]
    pub diagnostics: Vec<String>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub filters: Vec<String>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub bins: Vec<String>,
    #[serde(rename = "obs types", default)]
    pub obs_types: BTreeMap<String, ObsTypeSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObsTypeSpec {
    /// Variable handed to the binning tool with `-v`.
    #[serde(default)]
    pub variable: String,
    #[serde(default)]
    pub skip: bool,
}

/// Level and name of the products a merge consumes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceRef {
    pub level: Level,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum MergeOperation {
    /// Merge all platforms of an obs type within one cycle (l1b).
    MergePlat {
        #[serde(default)]
        ignore: BTreeMap<String, Vec<String>>,
    },
    /// Merge one obs type across cycles (l1c).
    MergeCycle,
}

impl MergeOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeOperation::MergePlat { .. } => "merge_plat",
            MergeOperation::MergeCycle => "merge_cycle",
        }
    }
}

/// An l1b or l1c merge spec.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeSpec {
    pub name: String,
    pub source: SourceRef,
    pub operation: MergeOperation,
    /// Restricts the merged obs types; empty means all discovered ones.
    #[serde(rename = "obs types", default)]
    pub obs_types: Vec<String>,
}

impl MergeSpec {
    /// Platforms dropped from the inputs of a merge of `obs_type`.
    pub fn excluded_platforms(&self, obs_type: &str) -> &[String] {
        match &self.operation {
            MergeOperation::MergePlat { ignore } => {
                ignore.get(obs_type).map(Vec::as_slice).unwrap_or(&[])
            }
            MergeOperation::MergeCycle => &[],
        }
    }

    pub fn wants_obs_type(&self, obs_type: &str) -> bool {
        self.obs_types.is_empty() || self.obs_types.iter().any(|t| t == obs_type)
    }
}

/// Accept YAML scalars of any kind (bin edges are often numbers).
fn scalar_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_yaml::Value>>::deserialize(deserializer)?;
    values
        .unwrap_or_default()
        .iter()
        .map(|value| match value {
            serde_yaml::Value::String(text) => Ok(text.clone()),
            serde_yaml::Value::Number(number) => Ok(number.to_string()),
            serde_yaml::Value::Bool(flag) => Ok(flag.to_string()),
            other => Err(D::Error::custom(format!(
                "expected a scalar list entry, got {other:?}"
            ))),
        })
        .collect()
}
