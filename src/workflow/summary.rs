//! Per-run counts, printed as text or JSON when a workflow finishes.
use crate::config::Level;
use crate::discover::Branch;
use crate::experiment::Window;
use anyhow::{Context, Result};
use serde::Serialize;

/// What happened to one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The tool ran (or would run, under `--dry-run`).
    Generated,
    /// A single-input merge was satisfied by copying the input.
    Copied,
    UpToDate,
    /// Nothing to do: unconfigured obs type, `skip`, or no inputs.
    Skipped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    pub generated: usize,
    pub copied: usize,
    pub up_to_date: usize,
    pub skipped: usize,
}

impl LevelCounts {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Generated => self.generated += 1,
            Outcome::Copied => self.copied += 1,
            Outcome::UpToDate => self.up_to_date += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.generated + self.copied + self.up_to_date + self.skipped
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub experiments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<Branch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<Window>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_set: Option<String>,
    pub l1a: LevelCounts,
    pub l1b: LevelCounts,
    pub l1c: LevelCounts,
    pub plots: LevelCounts,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn level_mut(&mut self, level: Level) -> &mut LevelCounts {
        match level {
            Level::L1a => &mut self.l1a,
            Level::L1b => &mut self.l1b,
            Level::L1c => &mut self.l1c,
        }
    }

    pub fn record(&mut self, level: Level, outcome: Outcome) {
        self.level_mut(level).record(outcome);
    }

    /// Render the summary as human-readable lines.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        if !self.experiments.is_empty() {
            lines.push(format!("experiments: {}", self.experiments.join(", ")));
        }
        if let Some(branch) = self.branch {
            lines.push(format!("observations: {}", branch.as_str()));
        }
        if let Some(window) = &self.window {
            lines.push(format!("period: {window}"));
        }
        if let Some(plot_set) = &self.plot_set {
            lines.push(format!("plot set: {plot_set}"));
        }
        let levels = [
            ("l1a", &self.l1a),
            ("l1b", &self.l1b),
            ("l1c", &self.l1c),
            ("plots", &self.plots),
        ];
        for (label, counts) in levels {
            if counts.total() == 0 {
                continue;
            }
            lines.push(format!(
                "{label}: {} generated, {} copied, {} up to date, {} skipped",
                counts.generated, counts.copied, counts.up_to_date, counts.skipped
            ));
        }
        if self.dry_run {
            lines.push("dry run: no files were changed".to_string());
        }
        lines.join("\n")
    }

    pub fn print(&self, json: bool) -> Result<()> {
        if json {
            let text = serde_json::to_string_pretty(self).context("serialize run summary")?;
            println!("{text}");
        } else {
            println!("{}", self.to_text());
        }
        Ok(())
    }
}
