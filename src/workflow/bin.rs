//! `socaplot bin`: raw per-file binning (l1a) followed by the per-cycle
//! platform merge (l1b) of one experiment.
use super::merge::merge_into;
use super::{Outcome, RunSummary};
use crate::cli::BinArgs;
use crate::config::{BinSpec, Config, Level, MergeSpec};
use crate::dates::DateRange;
use crate::discover::{
    decide, merge_inputs, obs_type_pattern, product_obs_types, raw_file_key, scan_raw_observations,
    CycleInputs,
};
use crate::experiment::{require_entries, resolve_experiment_root, ExperimentPaths};
use crate::tool::{bin_command, ProcessRunner, ToolCommand, ToolRunner};
use crate::util::{display_path, ensure_parent_dir};
use anyhow::Result;
use std::path::Path;
use std::time::Instant;

/// Inputs of one binning run, already parsed from the CLI.
#[derive(Debug, Clone)]
pub struct BinOptions {
    pub range: DateRange,
    /// Glob over raw file stems, e.g. `sst*`.
    pub obstype: String,
    pub force: bool,
}

struct BinContext<'a> {
    paths: ExperimentPaths,
    bespin: ToolCommand,
    options: &'a BinOptions,
}

pub fn run_bin(args: &BinArgs, config: &Config) -> Result<()> {
    let options = BinOptions {
        range: DateRange::from_args(args.startdate.as_deref(), args.enddate.as_deref())?,
        obstype: args.obstype.clone(),
        force: args.force,
    };
    let mut runner = ProcessRunner::new(args.dry_run);
    let summary = bin_experiment(&args.exp_dir, config, &options, &mut runner)?;
    summary.print(args.json)
}

/// Bin and merge every cycle of `exp_dir` that falls inside the range.
pub fn bin_experiment(
    exp_dir: &Path,
    config: &Config,
    options: &BinOptions,
    runner: &mut dyn ToolRunner,
) -> Result<RunSummary> {
    let started = Instant::now();
    let root = resolve_experiment_root(exp_dir)?;
    require_entries(std::slice::from_ref(&root), &["obs_out"])?;
    let ctx = BinContext {
        paths: ExperimentPaths::new(root),
        bespin: ToolCommand::from_command_line(&config.tools.bespin)?,
        options,
    };
    let paths = &ctx.paths;

    let pattern = obs_type_pattern(&options.obstype)?;
    let inventory = scan_raw_observations(&paths.obs_out_dir(), &pattern)?;
    let cycles: Vec<&CycleInputs> = inventory
        .cycles
        .iter()
        .filter(|inputs| options.range.contains(inputs.cycle.time()))
        .collect();
    let file_count: usize = cycles.iter().map(|inputs| inputs.files.len()).sum();
    tracing::debug!(
        branch = inventory.branch.as_str(),
        scanned = inventory.file_count(),
        in_range = file_count,
        "raw observations scanned"
    );
    eprintln!(
        "processing {file_count} files in {} cycles ({} observations)",
        cycles.len(),
        inventory.branch.as_str()
    );

    let mut summary = RunSummary::new(runner.dry_run());
    summary.branch = Some(inventory.branch);
    if let Some(name) = paths.root().file_name() {
        summary.experiments.push(name.to_string_lossy().into_owned());
    }

    for inputs in &cycles {
        for (name, spec) in &config.l1a {
            for file in &inputs.files {
                let outcome = bin_file(&ctx, name, spec, inputs, file, runner)?;
                summary.record(Level::L1a, outcome);
            }
        }
    }

    for inputs in &cycles {
        for (name, spec) in &config.l1b {
            merge_cycle_platforms(&ctx, name, spec, inputs, runner, &mut summary)?;
        }
    }

    tracing::info!(
        elapsed_ms = started.elapsed().as_millis(),
        l1a_generated = summary.l1a.generated,
        l1b_generated = summary.l1b.generated + summary.l1b.copied,
        "binning complete"
    );
    Ok(summary)
}

fn bin_file(
    ctx: &BinContext<'_>,
    name: &str,
    spec: &BinSpec,
    inputs: &CycleInputs,
    file: &Path,
    runner: &mut dyn ToolRunner,
) -> Result<Outcome> {
    let paths = &ctx.paths;
    let Some((stem, key)) = raw_file_key(file) else {
        tracing::warn!(file = %file.display(), "cannot split observation file name, skipping");
        return Ok(Outcome::Skipped);
    };
    let Some(obs_spec) = spec.obs_types.get(&key.obs_type) else {
        tracing::warn!(
            level = name,
            obs_type = %key.obs_type,
            file = %file.display(),
            "obs type not configured for level, skipping"
        );
        return Ok(Outcome::Skipped);
    };
    if obs_spec.skip {
        return Ok(Outcome::Skipped);
    }

    let output = paths
        .level_cycle_dir(Level::L1a, &inputs.cycle)
        .join(format!("{name}.{stem}.nc"));
    let decision = decide(&output, &[file.to_path_buf()], ctx.options.force)?;
    if !decision.needs_regeneration() {
        return Ok(Outcome::UpToDate);
    }
    eprintln!(
        "binning {} -> {}",
        display_path(file, Some(paths.root())),
        display_path(&output, Some(paths.root()))
    );
    if !runner.dry_run() {
        ensure_parent_dir(&output)?;
    }
    let command = bin_command(
        &ctx.bespin,
        spec,
        &obs_spec.variable,
        file,
        &output,
        decision.overwrite(),
    )?;
    runner.run(&command)?;
    Ok(Outcome::Generated)
}

fn merge_cycle_platforms(
    ctx: &BinContext<'_>,
    name: &str,
    spec: &MergeSpec,
    inputs: &CycleInputs,
    runner: &mut dyn ToolRunner,
    summary: &mut RunSummary,
) -> Result<()> {
    let paths = &ctx.paths;
    let source_dir = paths.level_cycle_dir(spec.source.level, &inputs.cycle);
    let output_dir = paths.level_cycle_dir(Level::L1b, &inputs.cycle);
    let obs_types = product_obs_types(&source_dir, &spec.source.name, &ctx.options.obstype)?;
    for obs_type in obs_types.iter().filter(|ot| spec.wants_obs_type(ot)) {
        let merge_from = merge_inputs(
            &source_dir,
            &spec.source.name,
            obs_type,
            spec.excluded_platforms(obs_type),
        )?;
        let output = output_dir.join(format!("{name}.{obs_type}.nc"));
        let outcome = merge_into(&ctx.bespin, &merge_from, &output, ctx.options.force, runner)?;
        if matches!(outcome, Outcome::Generated | Outcome::Copied) {
            eprintln!(
                "merged {} platforms -> {}",
                merge_from.len(),
                display_path(&output, Some(paths.root()))
            );
        }
        summary.record(Level::L1b, outcome);
    }
    Ok(())
}
