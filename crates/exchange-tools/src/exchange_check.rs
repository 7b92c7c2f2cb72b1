//! Batch checks of exchange payload files (`signal-ack`, `field-report`).

use anyhow::{Context, Result};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use translator::validate_exchange_payload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Valid,
    Invalid(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub path: PathBuf,
    pub status: CheckStatus,
}

impl CheckOutcome {
    pub fn is_valid(&self) -> bool {
        self.status == CheckStatus::Valid
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.status {
            CheckStatus::Valid => write!(f, "VALID: {path}"),
            CheckStatus::Invalid(reason) => write!(f, "INVALID: {path} -> {reason}"),
            CheckStatus::Missing => write!(f, "MISSING: {path}"),
        }
    }
}

/// Directories expand to their `*.json` files (sorted); other paths pass
/// through untouched so a missing file is reported rather than skipped.
pub fn expand_paths(targets: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for target in targets {
        if target.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(target)
                .with_context(|| format!("Failed to list {}", target.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            found.sort();
            paths.extend(found);
        } else {
            paths.push(target.clone());
        }
    }
    Ok(paths)
}

pub fn check_file(path: &Path) -> CheckOutcome {
    let status = match std::fs::read_to_string(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckStatus::Missing,
        Err(e) => CheckStatus::Invalid(format!("unreadable: {e}")),
        Ok(source) => match serde_json::from_str::<Value>(&source) {
            Err(e) => CheckStatus::Invalid(format!("invalid JSON: {e}")),
            Ok(payload) => match validate_exchange_payload(&payload) {
                Ok(schema) => {
                    debug!(path = %path.display(), %schema, "Exchange payload valid");
                    CheckStatus::Valid
                }
                Err(e) => CheckStatus::Invalid(e.to_string()),
            },
        },
    };
    CheckOutcome {
        path: path.to_path_buf(),
        status,
    }
}

pub fn check_paths(targets: &[PathBuf]) -> Result<Vec<CheckOutcome>> {
    Ok(expand_paths(targets)?
        .iter()
        .map(|path| check_file(path))
        .collect())
}
