use super::Experiment;
use crate::dates::format_cycle;
use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Period shared by every experiment of a plot set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    /// Narrow the window to user-supplied bounds, which must lie inside it.
    pub fn restrict(self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Result<Self> {
        let mut window = self;
        if let Some(start) = start {
            if !self.covers(&start) {
                return Err(anyhow!(
                    "start date {start} is outside the common period {self}"
                ));
            }
            window.start = start;
        }
        if let Some(end) = end {
            if !self.covers(&end) {
                return Err(anyhow!("end date {end} is outside the common period {self}"));
            }
            window.end = end;
        }
        if window.start > window.end {
            return Err(anyhow!(
                "start date {} is after end date {}",
                window.start,
                window.end
            ));
        }
        Ok(window)
    }

    pub fn covers(&self, time: &NaiveDateTime) -> bool {
        self.start <= *time && *time <= self.end
    }

    /// `<start>_<end>` in cycle format, used in l1c file names.
    pub fn tag(&self) -> String {
        format!("{}_{}", format_cycle(&self.start), format_cycle(&self.end))
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Latest start and earliest end over all experiments.
pub fn common_window(experiments: &[Experiment]) -> Result<Window> {
    let start = experiments.iter().map(|exp| exp.start).max();
    let end = experiments.iter().map(|exp| exp.end).min();
    let (Some(start), Some(end)) = (start, end) else {
        return Err(anyhow!("no experiments given"));
    };
    if start > end {
        let names: Vec<&str> = experiments.iter().map(|exp| exp.name.as_str()).collect();
        return Err(anyhow!(
            "experiments {} have no common period (latest start {start} is after earliest end {end})",
            names.join(", ")
        ));
    }
    Ok(Window { start, end })
}

/// Only one or two experiments can be plotted together.
pub fn check_plot_count(count: usize) -> Result<()> {
    match count {
        0 => Err(anyhow!("at least one experiment is required")),
        1 | 2 => Ok(()),
        n => Err(anyhow!(
            "plotting {n} experiments is not implemented (at most 2 are supported)"
        )),
    }
}

/// `name` for one experiment, `second-first` for two.
pub fn plot_set_name(experiments: &[Experiment]) -> Result<String> {
    match experiments {
        [single] => Ok(single.name.clone()),
        [first, second] => Ok(format!("{}-{}", second.name, first.name)),
        other => {
            check_plot_count(other.len())?;
            Err(anyhow!("unsupported experiment count {}", other.len()))
        }
    }
}
