use serde::Deserialize;

/// Environment override for the binning/merging tool command.
pub const BESPIN_ENV: &str = "SOCAPLOT_BESPIN";
/// Environment override for the plotting tool command.
pub const PLOT_ENV: &str = "SOCAPLOT_PLOT";

/// Command lines of the external tools, split with shell-words at use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub bespin: String,
    pub plot: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            bespin: "bespin".to_string(),
            plot: "padme plot".to_string(),
        }
    }
}

impl ToolsConfig {
    /// Apply `SOCAPLOT_BESPIN` / `SOCAPLOT_PLOT` when set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(value) = env_command(BESPIN_ENV) {
            self.bespin = value;
        }
        if let Some(value) = env_command(PLOT_ENV) {
            self.plot = value;
        }
        self
    }
}

fn env_command(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// What to plot and where.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// l1c level to plot; all l1c levels when unset.
    pub source: Option<String>,
    /// Quality-control selectors passed with `--qc`.
    pub qc: Vec<String>,
    pub domains: PlotDomains,
}

/// Named geographic domains, chosen by experiment regionality.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlotDomains {
    pub global: Vec<String>,
    pub regional: Vec<String>,
}

impl Default for PlotDomains {
    fn default() -> Self {
        Self {
            global: vec!["global".to_string()],
            regional: vec!["regional".to_string()],
        }
    }
}

impl PlotDomains {
    pub fn for_regional(&self, regional: bool) -> &[String] {
        if regional {
            &self.regional
        } else {
            &self.global
        }
    }
}
