//! `<artifact>.provenance.json` records written next to every CLI output.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::io::write_json;

#[derive(Debug, Serialize)]
pub struct Callsite {
    pub file: &'static str,
    pub line: u32,
}

/// What produced an artifact: revision, library version, command, parameters
/// and the files read and written.
#[derive(Debug, Serialize)]
pub struct Sidecar {
    pub code_rev: String,
    pub hullmix_version: &'static str,
    pub command: &'static str,
    pub callsite: Callsite,
    pub params: Value,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl Sidecar {
    /// Captures the caller's location as the callsite.
    #[track_caller]
    pub fn new(command: &'static str, params: Value) -> Self {
        let at = Location::caller();
        Self {
            code_rev: code_revision(),
            hullmix_version: hullmix::VERSION,
            command,
            callsite: Callsite {
                file: at.file(),
                line: at.line(),
            },
            params,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn input(mut self, path: &Path) -> Self {
        self.inputs.push(path.display().to_string());
        self
    }

    /// Record `artifact` as the output and write the sidecar beside it.
    pub fn write_next_to(mut self, artifact: &Path) -> Result<PathBuf> {
        let path = sidecar_path(artifact);
        self.outputs.push(artifact.display().to_string());
        write_json(&path, &self)?;
        Ok(path)
    }
}

/// `out/layers.json` -> `out/layers.provenance.json`.
fn sidecar_path(artifact: &Path) -> PathBuf {
    artifact.with_extension("provenance.json")
}

/// `GIT_COMMIT` (runtime, then build time), else `git rev-parse HEAD`, else "unknown".
pub fn code_revision() -> String {
    let pinned = [
        std::env::var("GIT_COMMIT").ok(),
        option_env!("GIT_COMMIT").map(str::to_owned),
    ];
    pinned
        .into_iter()
        .flatten()
        .find(|rev| !rev.is_empty())
        .or_else(git_head)
        .unwrap_or_else(|| "unknown".to_owned())
}

fn git_head() -> Option<String> {
    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let rev = String::from_utf8(out.stdout).ok()?;
    Some(rev.trim().to_owned()).filter(|r| !r.is_empty())
}
