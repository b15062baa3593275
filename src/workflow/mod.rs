//! Binning and plotting workflows.
//!
//! Both walk the experiment tree, decide per output whether it is missing or
//! stale, and hand each regeneration to a [`ToolRunner`](crate::tool::ToolRunner)
//! in strict sequence. The first failure aborts the run.
mod bin;
mod merge;
mod plot;
mod summary;

pub use bin::{bin_experiment, run_bin, BinOptions};
pub use plot::{plot_experiments, run_plot, PlotOptions};
pub use summary::{Outcome, RunSummary};

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
