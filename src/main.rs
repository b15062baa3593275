//! socaplot: binning and plotting orchestration for soca-science experiments.
//!
//! All numerical work is done by external tools (`bespin` for binning and
//! merging, a PADME plot command for figures). This binary walks the
//! experiment tree, decides what is missing or stale, and runs those tools in
//! sequence.
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod dates;
mod discover;
mod experiment;
mod tool;
mod util;
mod workflow;

fn main() -> Result<()> {
    let args = cli::RootArgs::parse();
    init_tracing(args.verbose);

    let config_dir = config::resolve_config_dir(args.config_dir.as_deref())?;

    match args.command {
        cli::Command::Bin(bin) => workflow::run_bin(&bin, &config::load_config(&config_dir)?),
        cli::Command::Plot(plot) => {
            // Reject unsupported experiment counts before touching the disk.
            experiment::check_plot_count(plot.exp_dirs.len())?;
            workflow::run_plot(&plot, &config::load_config(&config_dir)?)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
