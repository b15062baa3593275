//! Shared test infrastructure for integration tests.
//!
//! Each test gets a scratch workspace holding a config directory, fake
//! `bespin`/plot scripts that log their arguments and create whatever `-o`
//! names, and any number of experiment trees.
#![allow(dead_code)]

use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const L1A: &str = r#"
name: hires
diagnostics: [ombg]
bins: ["latitude:-90:90:1.0"]
obs types:
  sst:
    variable: sea_surface_temperature
  adt:
    variable: absolute_dynamic_topography
"#;

const L1B: &str = r#"
name: hires_all
source:
  level: l1a
  name: hires
operation:
  name: merge_plat
  ignore:
    sst: [viirs_npp]
"#;

const L1C: &str = r#"
name: hires_all
source:
  level: l1b
  name: hires_all
operation:
  name: merge_cycle
"#;

const FAKE_TOOL: &str = r#"#!/bin/sh
echo "$(basename "$0") $*" >> "__LOG__"
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
if [ -n "$out" ]; then touch "$out__SUFFIX__"; fi
exit 0
"#;

/// Old enough that anything the tools write is newer.
const SEED_MTIME: i64 = 1_000_000;

pub struct Workspace {
    pub dir: TempDir,
    pub config_dir: PathBuf,
    pub bespin: PathBuf,
    pub plot: PathBuf,
    log: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_dir = dir.path().join("config");
        write_file(&config_dir.join("l1a/hires.yaml"), L1A);
        write_file(&config_dir.join("l1b/hires_all.yaml"), L1B);
        write_file(&config_dir.join("l1c/hires_all.yaml"), L1C);

        let log = dir.path().join("tools.log");
        let tools = dir.path().join("tools");
        let bespin = write_script(&tools.join("fake-bespin"), &fake_tool(&log, ""));
        let plot = write_script(&tools.join("fake-plot"), &fake_tool(&log, ".png"));
        Self {
            dir,
            config_dir,
            bespin,
            plot,
            log,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Experiment with metadata and an (empty) `obs_bin/`.
    pub fn experiment(&self, name: &str, start: &str, end: &str) -> PathBuf {
        let exp = self.path().join(name);
        fs::create_dir_all(exp.join("obs_bin")).expect("mkdir obs_bin");
        write_file(
            &exp.join("exp.config"),
            &format!("# generated\nexport EXP_NAME=\"{name}\"\nEXP_START_DATE={start}\n"),
        );
        write_file(&exp.join("cycle_status"), &format!("{end}\n"));
        exp
    }

    pub fn raw(&self, exp: &Path, cycle: &str, file: &str) -> PathBuf {
        let path = exp
            .join("obs_out")
            .join(&cycle[..4])
            .join(cycle)
            .join("ctrl")
            .join(file);
        seed_file(&path);
        path
    }

    pub fn l1b(&self, exp: &Path, cycle: &str, obs_type: &str) -> PathBuf {
        let path = exp
            .join("obs_bin/l1b")
            .join(&cycle[..4])
            .join(cycle)
            .join(format!("hires_all.{obs_type}.nc"));
        seed_file(&path);
        path
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_socaplot"));
        cmd.arg("--config-dir")
            .arg(&self.config_dir)
            .env("SOCAPLOT_BESPIN", &self.bespin)
            .env("SOCAPLOT_PLOT", &self.plot)
            .env_remove("RUST_LOG")
            .current_dir(self.path());
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("run socaplot")
    }

    /// Lines the fake tools logged, in invocation order.
    pub fn tool_log(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

pub fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "socaplot failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("summary is JSON")
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn fake_tool(log: &Path, suffix: &str) -> String {
    FAKE_TOOL
        .replace("__LOG__", &log.display().to_string())
        .replace("__SUFFIX__", suffix)
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write file");
}

fn write_script(path: &Path, contents: &str) -> PathBuf {
    write_file(path, contents);
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod");
    path.to_path_buf()
}

fn seed_file(path: &Path) {
    write_file(path, "nc");
    set_file_mtime(path, FileTime::from_unix_time(SEED_MTIME, 0)).expect("set mtime");
}
