//! End-to-end `socaplot bin` runs against fake tools.
#![cfg(unix)]

mod common;

use common::{stderr, stdout_json, Workspace};

fn seed(ws: &Workspace) -> std::path::PathBuf {
    let exp = ws.path().join("exp1");
    for file in ["sst_viirs_npp.nc", "sst_amsr2.nc", "sst_avhrr.nc", "adt_j3.nc"] {
        ws.raw(&exp, "2020010100", file);
    }
    ws.raw(&exp, "2020010200", "sst_amsr2.nc");
    exp
}

#[test]
fn bins_merges_and_skips_up_to_date_outputs() {
    let ws = Workspace::new();
    let exp = seed(&ws);
    let exp_arg = exp.to_str().unwrap();

    let summary = stdout_json(&ws.run(&["bin", exp_arg, "--json"]));
    assert_eq!(summary["branch"], "ctrl");
    assert_eq!(summary["l1a"]["generated"], 5);
    assert_eq!(summary["l1b"]["generated"], 1);
    assert_eq!(summary["l1b"]["copied"], 2);

    let log = ws.tool_log();
    assert_eq!(log.iter().filter(|line| line.starts_with("fake-bespin bin ")).count(), 5);
    let merges: Vec<&String> = log
        .iter()
        .filter(|line| line.starts_with("fake-bespin merge "))
        .collect();
    assert_eq!(merges.len(), 1);
    assert!(!merges[0].contains("viirs_npp"));
    assert!(exp
        .join("obs_bin/l1b/2020/2020010100/hires_all.sst.nc")
        .is_file());
    assert!(exp
        .join("obs_bin/l1b/2020/2020010200/hires_all.sst.nc")
        .is_file());

    let again = stdout_json(&ws.run(&["bin", exp_arg, "--json"]));
    assert_eq!(again["l1a"]["generated"], 0);
    assert_eq!(again["l1a"]["up_to_date"], 5);
    assert_eq!(ws.tool_log().len(), log.len());
}

#[test]
fn force_passes_overwrite_to_the_tool() {
    let ws = Workspace::new();
    let exp = seed(&ws);
    let exp_arg = exp.to_str().unwrap();
    assert!(ws.run(&["bin", exp_arg]).status.success());
    let before = ws.tool_log().len();

    let output = ws.run(&["bin", exp_arg, "--force", "--obstype", "adt*"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let forced: Vec<String> = ws.tool_log().into_iter().skip(before).collect();
    assert_eq!(forced.len(), 1);
    assert!(forced[0].starts_with("fake-bespin bin "));
    assert!(forced[0].ends_with(" -v absolute_dynamic_topography -O"));
}

#[test]
fn dry_run_prints_commands_and_writes_nothing() {
    let ws = Workspace::new();
    let exp = seed(&ws);
    let output = ws.run(&["bin", exp.to_str().unwrap(), "--dry-run"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().filter(|line| line.contains("fake-bespin bin ")).count(), 5);
    assert!(stdout.contains("dry run"));
    assert!(ws.tool_log().is_empty());
    assert!(!exp.join("obs_bin").exists());
}

#[test]
fn startdate_limits_the_cycles() {
    let ws = Workspace::new();
    let exp = seed(&ws);
    let summary = stdout_json(&ws.run(&[
        "bin",
        exp.to_str().unwrap(),
        "-s",
        "2020-01-02T00",
        "--json",
    ]));
    assert_eq!(summary["l1a"]["generated"], 1);
    assert!(!exp.join("obs_bin/l1a/2020/2020010100").exists());
}

#[test]
fn invalid_dates_and_tool_failures_are_errors() {
    let ws = Workspace::new();
    let exp = seed(&ws);
    let exp_arg = exp.to_str().unwrap();

    let output = ws.run(&["bin", exp_arg, "--startdate", "yesterday"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid start date"));

    let output = ws
        .command()
        .args(["bin", exp_arg])
        .env("SOCAPLOT_BESPIN", "false")
        .output()
        .expect("run socaplot");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed with status 1"));
}

#[test]
fn missing_config_dir_is_reported() {
    let ws = Workspace::new();
    let exp = seed(&ws);
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_socaplot"))
        .args(["--config-dir", "nowhere", "bin", exp.to_str().unwrap()])
        .current_dir(ws.path())
        .output()
        .expect("run socaplot");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("config directory nowhere does not exist"));
}
