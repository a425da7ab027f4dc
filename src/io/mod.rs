use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use log::info;
use serde::Serialize;

use crate::problem::dth::DTHInstance;
use crate::solution::Cost;

pub mod instance_file;
pub mod solution_file;

pub fn load_instance(path: impl Into<String>) -> Result<DTHInstance> {
    instance_file::load_instance(path)
}

/// All `*.in` files directly in `dir`, sorted by path so batch runs are
/// deterministic.
pub fn input_files_in_dir(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("cannot read directory '{}'", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "in") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// `<output_dir>/<stem>.out` for an input `<stem>.in`.
pub fn input_to_output(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    output_dir.join(Path::new(stem).with_extension("out"))
}

#[derive(Debug, Serialize)]
pub struct InstanceReport {
    pub input: String,
    pub output: Option<String>,
    pub status: String,
    pub driving_cost: Option<f64>,
    pub walking_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub seconds: f64,
}

impl InstanceReport {
    pub fn solved(input: &Path, output: &Path, cost: &Cost, seconds: f64) -> Self {
        Self {
            input: input.display().to_string(),
            output: Some(output.display().to_string()),
            status: "solved".to_string(),
            driving_cost: Some(f64::from(cost.driving)),
            walking_cost: Some(f64::from(cost.walking)),
            total_cost: Some(cost.total()),
            seconds,
        }
    }

    pub fn failed(input: &Path, error: &anyhow::Error, seconds: f64) -> Self {
        Self {
            input: input.display().to_string(),
            output: None,
            status: format!("failed: {:#}", error),
            driving_cost: None,
            walking_cost: None,
            total_cost: None,
            seconds,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.status == "solved"
    }
}

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub reports: Vec<InstanceReport>,
}

impl RunSummary {
    pub fn push(&mut self, report: InstanceReport) {
        self.reports.push(report);
    }

    pub fn num_solved(&self) -> usize {
        self.reports.iter().filter(|r| r.is_solved()).count()
    }

    pub fn num_failed(&self) -> usize {
        self.reports.len() - self.num_solved()
    }
}

pub fn write_summary(path: impl AsRef<Path>, summary: &RunSummary) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path)
        .with_context(|| format!("cannot create summary '{}'", path.display()))?;
    serde_json::to_writer_pretty(f, summary).context("cannot serialize summary")?;
    Ok(())
}

/// Stages and commits the given files in the enclosing git repository.
/// An unchanged working tree is not an error.
pub fn commit_paths(paths: &[PathBuf], message: &str) -> Result<()> {
    if paths.is_empty() {
        return Ok(());
    }
    let add = Command::new("git")
        .arg("add")
        .arg("--")
        .args(paths)
        .output()
        .context("failed to run git add")?;
    if !add.status.success() {
        bail!(
            "git add failed: {}",
            String::from_utf8_lossy(&add.stderr).trim()
        );
    }
    let commit = Command::new("git")
        .arg("commit")
        .arg("-m")
        .arg(message)
        .arg("--")
        .args(paths)
        .output()
        .context("failed to run git commit")?;
    if !commit.status.success() {
        let stdout = String::from_utf8_lossy(&commit.stdout);
        if stdout.contains("nothing to commit") || stdout.contains("no changes added") {
            info!("nothing new to commit");
            return Ok(());
        }
        bail!(
            "git commit failed: {}{}",
            String::from_utf8_lossy(&commit.stderr).trim(),
            stdout.trim()
        );
    }
    info!("committed {} file(s): {}", paths.len(), message);
    Ok(())
}
