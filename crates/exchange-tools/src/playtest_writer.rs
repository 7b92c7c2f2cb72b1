//! Campaign tutorial simulation and its log/attachment outputs.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use translator::playtest::{
    CommandTelemetry, PlaytestEvent, PlaytestSummary, RunStamp, TutorialScript, WheelBindings,
};
use translator::Translator;

pub const DEFAULT_ORDER_ID: &str = "order-2025-11-26-061";
pub const DEFAULT_WORKSPACE: &str = "toysoldiers_ai_0";

/// Tutorial script used when no script file is given
pub const BUILTIN_TUTORIAL: &str = include_str!("../fixtures/campaign2_tutorial.json");

/// Run id derived from the run start, e.g. `campaign2-20251126T060000Z`
pub fn default_run_id(start: DateTime<Utc>) -> String {
    format!("campaign2-{}", start.format("%Y%m%dT%H%M%SZ"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaytestPaths {
    pub events: PathBuf,
    pub telemetry: PathBuf,
    pub attachment_events: PathBuf,
    pub attachment_telemetry: PathBuf,
}

impl PlaytestPaths {
    pub fn new(order_id: &str, log_dir: &Path, attachments_dir: &Path) -> Self {
        let events = format!("{order_id}-campaign2-playtest.jsonl");
        let telemetry = format!("{order_id}-campaign2-telemetry.json");
        Self {
            attachment_events: attachments_dir.join(&events),
            attachment_telemetry: attachments_dir.join(&telemetry),
            events: log_dir.join(events),
            telemetry: log_dir.join(telemetry),
        }
    }
}

fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for record in records {
        let line = serde_json::to_string(record).context("Failed to serialize event")?;
        writeln!(file, "{line}").with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize summary")?;
    std::fs::write(path, rendered).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the event log and summary to the log dir and mirror both into the
/// attachments dir.
pub fn write_outputs(
    events: &[PlaytestEvent],
    summary: &PlaytestSummary,
    log_dir: &Path,
    attachments_dir: &Path,
) -> Result<PlaytestPaths> {
    for dir in [log_dir, attachments_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let paths = PlaytestPaths::new(&summary.order_id, log_dir, attachments_dir);

    write_jsonl(&paths.events, events)?;
    write_json(&paths.telemetry, summary)?;
    write_jsonl(&paths.attachment_events, events)?;
    write_json(&paths.attachment_telemetry, summary)?;

    info!(
        events = %paths.events.display(),
        telemetry = %paths.telemetry.display(),
        "Wrote playtest outputs"
    );
    Ok(paths)
}

/// Everything needed for one simulated run
#[derive(Debug, Clone)]
pub struct Simulation {
    pub stamp: RunStamp,
    pub start: DateTime<Utc>,
    pub script: TutorialScript,
    pub bindings: WheelBindings,
}

impl Simulation {
    /// Replay the script and build the summary; `finished` stamps the summary.
    pub fn run(
        &self,
        translator: &Translator,
        finished: DateTime<Utc>,
    ) -> Result<(Vec<PlaytestEvent>, PlaytestSummary)> {
        let mut telemetry = CommandTelemetry::new(translator, self.stamp.clone(), self.start);
        self.script
            .replay(&mut telemetry, &self.bindings)
            .context("Tutorial script replay failed")?;
        let summary = telemetry.build_summary(self.script.duration_ms(), finished);
        info!(
            run_id = %self.stamp.run_id,
            commands = summary.metrics.commands_executed,
            valid = summary.metrics.commands_valid,
            "Simulated tutorial run"
        );
        Ok((telemetry.events().to_vec(), summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BUILTIN_LEXICON;
    use chrono::TimeZone;
    use translator::{GlyphIndex, OrderSynthesizer};

    fn simulation() -> Simulation {
        let start = Utc.with_ymd_and_hms(2025, 11, 26, 6, 0, 0).unwrap();
        Simulation {
            stamp: RunStamp {
                order_id: DEFAULT_ORDER_ID.to_string(),
                run_id: default_run_id(start),
                workspace: DEFAULT_WORKSPACE.to_string(),
            },
            start,
            script: TutorialScript::from_json_str(BUILTIN_TUTORIAL).unwrap(),
            bindings: WheelBindings::default(),
        }
    }

    fn translator() -> Translator {
        Translator::new(
            GlyphIndex::from_json_str(BUILTIN_LEXICON).unwrap(),
            OrderSynthesizer::default(),
        )
    }

    #[test]
    fn test_default_run_id() {
        assert_eq!(simulation().stamp.run_id, "campaign2-20251126T060000Z");
    }

    #[test]
    fn test_builtin_tutorial_metrics() {
        let sim = simulation();
        let (events, summary) = sim.run(&translator(), sim.start).unwrap();
        let metrics = &summary.metrics;
        assert_eq!(metrics.commands_executed, 11);
        assert_eq!(metrics.commands_valid, 10);
        assert_eq!(metrics.time_to_fun_ms, Some(3200));
        assert_eq!(metrics.revive_ms, Some(14_600));
        assert_eq!(metrics.tutorial_duration_ms, 90_000);
        assert_eq!(metrics.command_accuracy, 0.909);
        assert!(metrics.one_more_accept);
        assert_eq!(summary.hud_signals.ui_state_events, 3);
        assert_eq!(summary.hud_signals.emoji_latency_samples, 11);
        // 16 script steps, each command adds a latency sample
        assert_eq!(events.len(), 27);
    }

    #[test]
    fn test_outputs_written_and_mirrored() {
        let sim = simulation();
        let (events, summary) = sim.run(&translator(), sim.start).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let attachments = dir.path().join("exchange").join("attachments");

        let paths = write_outputs(&events, &summary, &log_dir, &attachments).unwrap();
        assert_eq!(
            paths.events.file_name().unwrap(),
            "order-2025-11-26-061-campaign2-playtest.jsonl"
        );

        let log = std::fs::read_to_string(&paths.events).unwrap();
        assert_eq!(log.lines().count(), events.len());
        assert_eq!(log, std::fs::read_to_string(&paths.attachment_events).unwrap());

        let telemetry: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.attachment_telemetry).unwrap())
                .unwrap();
        assert_eq!(telemetry["schema"], "toysoldiers-campaign2-telemetry@1.0");
        assert_eq!(telemetry["metrics"]["commands_valid"], 10);
    }

    #[test]
    fn test_out_of_range_script_offset_is_an_error() {
        let mut sim = simulation();
        sim.script = TutorialScript::from_json_str(
            r#"[{"delta_ms": 18446744073709551615, "type": "one_more_prompt", "accepted": true}]"#,
        )
        .unwrap();
        let err = sim.run(&translator(), sim.start).unwrap_err();
        assert!(format!("{err:#}").contains("Tutorial script replay failed"));
        assert!(format!("{err:#}").contains("out of range"));
    }
}
