//! CLI argument parsing for the binning and plotting workflows.
//!
//! The CLI stays thin: it only collects paths and options, the workflows own
//! every decision about what gets regenerated.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default obs-type pattern: every observation file in a cycle.
pub const DEFAULT_OBSTYPE_PATTERN: &str = "*";

/// Default directory for generated plots, relative to the working directory.
pub const DEFAULT_PLOT_DIR: &str = "plots";

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "socaplot",
    version,
    about = "soca-science binning and plotting tools (BESPIN/PADME wrappers)",
    after_help = "Commands:\n  bin <EXP_DIR>         Bin and merge the raw observations of one experiment\n  plot <EXP_DIR>...     Merge across cycles and plot one or two experiments\n\nExamples:\n  socaplot bin /work/exp1 --startdate 2020-01-01 --obstype 'sst*'\n  socaplot plot /work/ctrl /work/exp1 --outdir /work/plots",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Directory holding the l1a/l1b/l1c level specs, tools.yaml and plot.yaml
    #[arg(long, value_name = "DIR", env = "SOCAPLOT_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Emit debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level workflow commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Bin(BinArgs),
    Plot(PlotArgs),
}

/// Bin command inputs for a single experiment.
#[derive(Parser, Debug)]
#[command(about = "Perform the raw (l1a) binning and per-cycle (l1b) merge of one experiment")]
pub struct BinArgs {
    /// Top level directory of a soca-science experiment
    #[arg(value_name = "EXP_DIR")]
    pub exp_dir: PathBuf,

    /// Force rebinning of all observations
    #[arg(short, long)]
    pub force: bool,

    /// First cycle date to process (inclusive)
    #[arg(short = 's', long, value_name = "DATE")]
    pub startdate: Option<String>,

    /// Last cycle date to process (inclusive)
    #[arg(short = 'e', long, value_name = "DATE")]
    pub enddate: Option<String>,

    /// Glob over observation file stems, e.g. 'sst*'
    #[arg(short = 'o', long, value_name = "PATTERN", default_value = DEFAULT_OBSTYPE_PATTERN)]
    pub obstype: String,

    /// Print the commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Plot command inputs for one or more experiments.
#[derive(Parser, Debug)]
#[command(about = "Merge binned observations across cycles and plot one or two experiments")]
pub struct PlotArgs {
    /// Top level directories of the experiments to compare
    #[arg(value_name = "EXP_DIR", required = true, num_args = 1..)]
    pub exp_dirs: Vec<PathBuf>,

    /// Start of the plotted period (must lie within the common period)
    #[arg(short = 's', long, value_name = "DATE")]
    pub startdate: Option<String>,

    /// End of the plotted period (must lie within the common period)
    #[arg(short = 'e', long, value_name = "DATE")]
    pub enddate: Option<String>,

    /// Directory receiving the plots
    #[arg(short = 'O', long, value_name = "DIR", default_value = DEFAULT_PLOT_DIR)]
    pub outdir: PathBuf,

    /// Regenerate the cross-cycle merges and plots even when up to date
    #[arg(short, long)]
    pub force: bool,

    /// Print the commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run summary as JSON
    #[arg(long)]
    pub json: bool,
}
