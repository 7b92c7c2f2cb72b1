//! Monitoring pass over factory orders read back from storage.
//!
//! Every `*.json` under the samples root (recursively, sorted) is run
//! through the order validator plus the `narration.line` check. The report
//! is appended to a monitor log as `[OK]` / `[FAIL]` / `[ERROR]` lines.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use translator::validation::check_narration_line;
use translator::{Translator, ValidationResult};

pub const DEFAULT_SAMPLES_DIR: &str = "telemetry/emoji_runtime/promoted_samples";
pub const MONITOR_LOG_NAME: &str = "factory_order_monitor.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorStatus {
    /// Accepted; carries the order summary when it is a string
    Ok(Option<String>),
    Fail(ValidationResult),
    /// Unreadable file or invalid JSON
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorOutcome {
    pub path: PathBuf,
    pub status: MonitorStatus,
}

impl MonitorOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, MonitorStatus::Ok(_))
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

impl fmt::Display for MonitorOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match &self.status {
            MonitorStatus::Ok(Some(summary)) => write!(f, "  [OK] {name} ({summary})"),
            MonitorStatus::Ok(None) => write!(f, "  [OK] {name}"),
            MonitorStatus::Error(reason) => write!(f, "  [ERROR] {name}: {reason}"),
            MonitorStatus::Fail(result) => {
                write!(f, "  [FAIL] {name}")?;
                for err in &result.schema_errors {
                    write!(f, "\n    schema: {err}")?;
                }
                for err in &result.dq_errors {
                    write!(f, "\n    dq: {err}")?;
                }
                Ok(())
            }
        }
    }
}

/// One monitoring run
#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub root: PathBuf,
    pub started: DateTime<Utc>,
    pub outcomes: Vec<MonitorOutcome>,
}

impl MonitorReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }

    pub fn is_ok(&self) -> bool {
        self.failures() == 0
    }

    /// Header, one entry per payload, footer
    pub fn lines(&self) -> Vec<String> {
        let stamp = self.started.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        let mut lines = vec![format!(
            "[{stamp}] Monitoring run for {}: {} payload(s)",
            self.root.display(),
            self.outcomes.len()
        )];
        lines.extend(self.outcomes.iter().map(|o| o.to_string()));
        lines.push(format!(
            "[{stamp}] Monitoring complete: status={}, failures={}",
            if self.is_ok() { "OK" } else { "FAIL" },
            self.failures()
        ));
        lines
    }
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list {}", dir.display()))?
            .path();
        if path.is_dir() {
            walk(&path, found)?;
        } else if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            found.push(path);
        }
    }
    Ok(())
}

/// Every `*.json` file under `root`, sorted; a missing root yields nothing.
pub fn collect_orders(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if root.is_dir() {
        walk(root, &mut found)?;
    }
    found.sort();
    Ok(found)
}

/// Validate one stored order
pub fn monitor_file(path: &Path, translator: &Translator) -> MonitorOutcome {
    let status = match std::fs::read_to_string(path) {
        Err(e) => MonitorStatus::Error(format!("Unreadable ({e})")),
        Ok(source) => match serde_json::from_str::<Value>(&source) {
            Err(e) => MonitorStatus::Error(format!("Invalid JSON ({e})")),
            Ok(order) => {
                let mut result = translator.validate(&order);
                result.merge(check_narration_line(&order));
                if result.accepted {
                    let summary = order.get("summary").and_then(Value::as_str);
                    MonitorStatus::Ok(summary.map(str::to_string))
                } else {
                    MonitorStatus::Fail(result)
                }
            }
        },
    };
    MonitorOutcome {
        path: path.to_path_buf(),
        status,
    }
}

pub fn monitor_orders(
    root: &Path,
    translator: &Translator,
    started: DateTime<Utc>,
) -> Result<MonitorReport> {
    let outcomes: Vec<MonitorOutcome> = collect_orders(root)?
        .iter()
        .map(|path| monitor_file(path, translator))
        .collect();
    let report = MonitorReport {
        root: root.to_path_buf(),
        started,
        outcomes,
    };
    if report.is_ok() {
        info!(root = %root.display(), payloads = report.outcomes.len(), "Factory orders healthy");
    } else {
        warn!(root = %root.display(), failures = report.failures(), "Factory order monitor found failures");
    }
    Ok(report)
}

/// Append the report lines to `path`, creating parent directories as needed.
pub fn append_log(report: &MonitorReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open monitor log {}", path.display()))?;
    for line in report.lines() {
        writeln!(file, "{line}")
            .with_context(|| format!("Failed to append to {}", path.display()))?;
    }
    Ok(())
}
