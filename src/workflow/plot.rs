//! `socaplot plot`: merge each experiment's l1b products across the common
//! period (l1c), then plot one experiment or the difference of two.
use super::merge::merge_into;
use super::{Outcome, RunSummary};
use crate::cli::PlotArgs;
use crate::config::{Config, Level, MergeSpec};
use crate::dates::{parse_date, DateRange};
use crate::discover::{decide_prefix, list_cycles, product_obs_types};
use crate::experiment::{
    check_plot_count, common_window, plot_set_name, read_experiments, require_entries,
    resolve_experiment_roots, Experiment, ExperimentPaths, Window, PLOT_REQUIRED_ENTRIES,
};
use crate::tool::{plot_command, ProcessRunner, ToolCommand, ToolRunner};
use crate::util::{display_path, ensure_parent_dir};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PlotOptions {
    /// Overrides of the common period; both must lie inside it.
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub outdir: PathBuf,
    pub force: bool,
}

struct PlotContext<'a> {
    bespin: ToolCommand,
    plotter: ToolCommand,
    window: Window,
    options: &'a PlotOptions,
}

pub fn run_plot(args: &PlotArgs, config: &Config) -> Result<()> {
    let start = args
        .startdate
        .as_deref()
        .map(parse_date)
        .transpose()
        .context("invalid start date")?;
    let end = args
        .enddate
        .as_deref()
        .map(parse_date)
        .transpose()
        .context("invalid end date")?;
    let options = PlotOptions {
        start,
        end,
        outdir: args.outdir.clone(),
        force: args.force,
    };
    let mut runner = ProcessRunner::new(args.dry_run);
    let summary = plot_experiments(&args.exp_dirs, config, &options, &mut runner)?;
    summary.print(args.json)
}

/// Validate the experiments, build their l1c products for the common period
/// and invoke the plot tool once per (l1c level, obs type, domain).
pub fn plot_experiments(
    exp_dirs: &[PathBuf],
    config: &Config,
    options: &PlotOptions,
    runner: &mut dyn ToolRunner,
) -> Result<RunSummary> {
    let started = Instant::now();
    check_plot_count(exp_dirs.len())?;
    let roots = resolve_experiment_roots(exp_dirs)?;
    require_entries(&roots, &PLOT_REQUIRED_ENTRIES)?;
    let experiments = read_experiments(&roots)?;
    let window = common_window(&experiments)?.restrict(options.start, options.end)?;
    let plot_set = plot_set_name(&experiments)?;

    if experiments.len() == 1 {
        eprintln!("plotting a single experiment");
    } else {
        eprintln!("plotting the difference of {} experiments", experiments.len());
    }
    eprintln!("common period: {window}");

    let ctx = PlotContext {
        bespin: ToolCommand::from_command_line(&config.tools.bespin)?,
        plotter: ToolCommand::from_command_line(&config.tools.plot)?,
        window,
        options,
    };
    let regional = experiments.iter().any(|exp| exp.regional);
    let domains = config.plot.domains.for_regional(regional);

    let mut summary = RunSummary::new(runner.dry_run());
    summary.experiments = experiments.iter().map(|exp| exp.name.clone()).collect();
    summary.window = Some(window);
    summary.plot_set = Some(plot_set.clone());

    for (l1c_name, spec) in config.plotted_l1c() {
        let mut products: Vec<BTreeMap<String, PathBuf>> = Vec::with_capacity(experiments.len());
        for experiment in &experiments {
            let merged =
                merge_across_cycles(&ctx, experiment, l1c_name, spec, runner, &mut summary)?;
            products.push(merged);
        }

        for obs_type in shared_obs_types(&experiments, &products) {
            let inputs: Vec<PathBuf> = products
                .iter()
                .filter_map(|merged| merged.get(&obs_type).cloned())
                .collect();
            for domain in domains {
                let prefix = options
                    .outdir
                    .join(&plot_set)
                    .join(l1c_name)
                    .join(domain)
                    .join(&obs_type);
                let outcome = plot_one(
                    &ctx.plotter,
                    &inputs,
                    domain,
                    &config.plot.qc,
                    &prefix,
                    options.force,
                    runner,
                )?;
                summary.plots.record(outcome);
            }
        }
    }

    tracing::info!(
        elapsed_ms = started.elapsed().as_millis(),
        plot_set = %plot_set,
        plots = summary.plots.generated,
        "plotting complete"
    );
    Ok(summary)
}

/// Build `<name>.<obstype>.<start>_<end>.nc` for every obs type found in the
/// source level within `[start, end)`. Returns the products by obs type.
fn merge_across_cycles(
    ctx: &PlotContext<'_>,
    experiment: &Experiment,
    name: &str,
    spec: &MergeSpec,
    runner: &mut dyn ToolRunner,
    summary: &mut RunSummary,
) -> Result<BTreeMap<String, PathBuf>> {
    let window = &ctx.window;
    let paths = ExperimentPaths::new(experiment.path.clone());
    let range = DateRange {
        start: window.start,
        end: window.end,
    };
    let cycle_dirs: Vec<PathBuf> = list_cycles(&paths.level_dir(spec.source.level))?
        .into_iter()
        .filter(|(cycle, _)| range.contains_half_open(cycle.time()))
        .map(|(_, dir)| dir)
        .collect();

    let mut obs_types = BTreeSet::new();
    for dir in &cycle_dirs {
        obs_types.extend(product_obs_types(dir, &spec.source.name, "*")?);
    }

    let mut products = BTreeMap::new();
    for obs_type in obs_types.into_iter().filter(|ot| spec.wants_obs_type(ot)) {
        let inputs: Vec<PathBuf> = cycle_dirs
            .iter()
            .map(|dir| dir.join(format!("{}.{obs_type}.nc", spec.source.name)))
            .filter(|path| path.is_file())
            .collect();
        let output = paths
            .level_dir(Level::L1c)
            .join(format!("{name}.{obs_type}.{}.nc", window.tag()));
        let outcome = merge_into(&ctx.bespin, &inputs, &output, ctx.options.force, runner)?;
        if matches!(outcome, Outcome::Generated | Outcome::Copied) {
            eprintln!(
                "{}: merged {} cycles -> {}",
                experiment.name,
                inputs.len(),
                display_path(&output, Some(paths.root()))
            );
        }
        summary.record(Level::L1c, outcome);
        if outcome != Outcome::Skipped {
            products.insert(obs_type, output);
        }
    }
    Ok(products)
}

/// Obs types with an l1c product in every experiment; the rest are reported.
fn shared_obs_types(
    experiments: &[Experiment],
    products: &[BTreeMap<String, PathBuf>],
) -> Vec<String> {
    let all: BTreeSet<&String> = products.iter().flat_map(|merged| merged.keys()).collect();
    let mut shared = Vec::new();
    for obs_type in all {
        let missing: Vec<&str> = experiments
            .iter()
            .zip(products)
            .filter(|(_, merged)| !merged.contains_key(obs_type))
            .map(|(exp, _)| exp.name.as_str())
            .collect();
        if missing.is_empty() {
            shared.push(obs_type.clone());
        } else {
            tracing::warn!(
                obs_type = %obs_type,
                missing = %missing.join(", "),
                "obs type not available in every experiment, not plotting"
            );
        }
    }
    shared
}

fn plot_one(
    plotter: &ToolCommand,
    inputs: &[PathBuf],
    domain: &str,
    qc: &[String],
    prefix: &Path,
    force: bool,
    runner: &mut dyn ToolRunner,
) -> Result<Outcome> {
    // Under --dry-run the l1c inputs may not exist yet.
    let pending = runner.dry_run() && inputs.iter().any(|input| !input.is_file());
    if !pending && !decide_prefix(prefix, inputs, force)?.needs_regeneration() {
        return Ok(Outcome::UpToDate);
    }
    if !runner.dry_run() {
        ensure_parent_dir(prefix)?;
    }
    let diff = inputs.len() == 2;
    let command = plot_command(plotter, inputs, domain, qc, diff, prefix)?;
    eprintln!("plotting {}", prefix.display());
    runner.run(&command)?;
    Ok(Outcome::Generated)
}
