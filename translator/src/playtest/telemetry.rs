//! Emoji command telemetry for tutorial playtests.
//!
//! Every command is routed through the [`Translator`] so the emoji-only
//! guardrail holds: a chain either translates or is logged as rejected.
//! Events are stamped with the run identity and an offset from run start.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TranslatorError, TranslatorResult};
use crate::intent::IntentIds;
use crate::lexicon::GlyphIndex;
use crate::pipeline::Translator;

pub const PLAYTEST_TELEMETRY_SCHEMA: &str = "toysoldiers-campaign2-telemetry@1.0";
/// Stands in for a glyph id the lexicon does not know
pub const UNRESOLVED_GLYPH: &str = "<?>";
pub const INPUT_MODE: &str = "emoji_dsl_only";
pub const GUARDRAIL_FILTERS: [&str; 3] = [
    "no free text",
    "template-bound commands",
    "wheel-locked quick-cast",
];

/// Identity copied onto every event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStamp {
    pub order_id: String,
    pub run_id: String,
    pub workspace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEvent {
    pub event_id: String,
    pub timestamp: String,
    pub player: String,
    pub source: String,
    pub wheel: String,
    pub slot: String,
    pub glyph_ids: Vec<String>,
    pub glyphs: Vec<String>,
    pub latency_ms: u64,
    pub label: Option<String>,
    #[serde(flatten)]
    pub stamp: RunStamp,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentIds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySample {
    pub event_id: String,
    pub related_event: String,
    pub timestamp: String,
    pub player: String,
    pub glyph_ids: Vec<String>,
    pub glyphs: Vec<String>,
    pub latency_ms: u64,
    pub valid: bool,
    #[serde(flatten)]
    pub stamp: RunStamp,
}

/// One line of the playtest event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaytestEvent {
    UiState {
        timestamp: String,
        state: String,
        detail: Option<String>,
        wheel: Option<String>,
        player: Option<String>,
        #[serde(flatten)]
        stamp: RunStamp,
    },
    Command(CommandEvent),
    EmojiLatencySample(LatencySample),
    Downed {
        timestamp: String,
        player: String,
        by: String,
        #[serde(flatten)]
        stamp: RunStamp,
    },
    Revive {
        timestamp: String,
        player: String,
        by: String,
        emoji: Option<String>,
        #[serde(flatten)]
        stamp: RunStamp,
    },
    OneMorePrompt {
        timestamp: String,
        accepted: bool,
        #[serde(flatten)]
        stamp: RunStamp,
    },
}

impl PlaytestEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UiState { .. } => "ui_state",
            Self::Command(_) => "command",
            Self::EmojiLatencySample(_) => "emoji_latency_sample",
            Self::Downed { .. } => "downed",
            Self::Revive { .. } => "revive",
            Self::OneMorePrompt { .. } => "one_more_prompt",
        }
    }
}

/// A wheel command as fired by a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub player: String,
    pub source: String,
    pub wheel: String,
    pub slot: String,
    pub glyph_ids: Vec<String>,
    pub latency_ms: u64,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaytestMetrics {
    pub time_to_fun_ms: Option<u64>,
    pub revive_ms: Option<i64>,
    pub tutorial_duration_ms: u64,
    pub avg_command_latency_ms: u64,
    pub p95_command_latency_ms: u64,
    pub command_accuracy: f64,
    pub commands_executed: usize,
    pub commands_valid: usize,
    pub one_more_accept: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudSignals {
    pub ui_state_events: usize,
    pub revive_events: usize,
    pub one_more_prompts: usize,
    pub emoji_latency_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardrails {
    pub input_mode: String,
    pub filters: Vec<String>,
    pub non_emoji_inputs: Vec<String>,
}

impl Default for Guardrails {
    fn default() -> Self {
        Self {
            input_mode: INPUT_MODE.to_string(),
            filters: GUARDRAIL_FILTERS.iter().map(|f| f.to_string()).collect(),
            non_emoji_inputs: Vec::new(),
        }
    }
}

/// Aggregate record written next to the event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaytestSummary {
    pub schema: String,
    pub order_id: String,
    pub workspace: String,
    pub run_id: String,
    pub timestamp: String,
    pub metrics: PlaytestMetrics,
    pub hud_signals: HudSignals,
    /// Same records as the `emoji_latency_sample` events
    pub latency_samples: Vec<PlaytestEvent>,
    pub guardrails: Guardrails,
}

/// Nearest-rank percentile without interpolation; 0 for no values
pub fn percentile(values: &[u64], pct: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let mut ordered = values.to_vec();
    ordered.sort_unstable();
    let rank = ((ordered.len() - 1) as f64 * pct).floor() as usize;
    ordered[rank.min(ordered.len() - 1)]
}

/// Emoji for each glyph id, [`UNRESOLVED_GLYPH`] where the id is unknown
pub fn ids_to_glyphs<S: AsRef<str>>(glyph_ids: &[S], index: &GlyphIndex) -> Vec<String> {
    glyph_ids
        .iter()
        .map(|id| {
            index
                .get_by_id(id.as_ref())
                .map_or_else(|| UNRESOLVED_GLYPH.to_string(), |g| g.emoji.clone())
        })
        .collect()
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Collects playtest events for one run
#[derive(Debug)]
pub struct CommandTelemetry<'t> {
    translator: &'t Translator,
    stamp: RunStamp,
    start_time: DateTime<Utc>,
    events: Vec<PlaytestEvent>,
    latency_samples: Vec<PlaytestEvent>,
    valid_latencies_ms: Vec<u64>,
    commands_executed: usize,
    commands_valid: usize,
    first_valid_ms: Option<u64>,
    downed_ms: Option<u64>,
    revived_ms: Option<u64>,
    one_more_accept: bool,
    next_command: usize,
}

impl<'t> CommandTelemetry<'t> {
    pub fn new(translator: &'t Translator, stamp: RunStamp, start_time: DateTime<Utc>) -> Self {
        Self {
            translator,
            stamp,
            start_time,
            events: Vec::new(),
            latency_samples: Vec::new(),
            valid_latencies_ms: Vec::new(),
            commands_executed: 0,
            commands_valid: 0,
            first_valid_ms: None,
            downed_ms: None,
            revived_ms: None,
            one_more_accept: false,
            next_command: 0,
        }
    }

    pub fn stamp(&self) -> &RunStamp {
        &self.stamp
    }

    pub fn events(&self) -> &[PlaytestEvent] {
        &self.events
    }

    /// Run start plus `delta_ms`; an offset past the representable range is a
    /// configuration error.
    fn at(&self, delta_ms: u64) -> TranslatorResult<DateTime<Utc>> {
        i64::try_from(delta_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .and_then(|offset| self.start_time.checked_add_signed(offset))
            .ok_or_else(|| {
                TranslatorError::configuration(format!(
                    "event offset {delta_ms}ms is out of range for a run starting at {}",
                    iso(self.start_time)
                ))
            })
    }

    pub fn record_ui_state(
        &mut self,
        state: &str,
        detail: Option<&str>,
        wheel: Option<&str>,
        player: Option<&str>,
        delta_ms: u64,
    ) -> TranslatorResult<()> {
        let timestamp = iso(self.at(delta_ms)?);
        self.events.push(PlaytestEvent::UiState {
            timestamp,
            state: state.to_string(),
            detail: detail.map(str::to_string),
            wheel: wheel.map(str::to_string),
            player: player.map(str::to_string),
            stamp: self.stamp.clone(),
        });
        Ok(())
    }

    /// Translate a wheel command and log it with its latency sample
    pub fn record_command(
        &mut self,
        request: CommandRequest,
        delta_ms: u64,
    ) -> TranslatorResult<()> {
        let at = self.at(delta_ms)?;
        let event_id = format!("cmd-{}", self.next_command);
        self.next_command += 1;
        self.commands_executed += 1;

        let timestamp = iso(at);
        let glyphs = ids_to_glyphs(request.glyph_ids.as_slice(), self.translator.index());

        let (intent, error) = match self.translator.translate_at(request.glyph_ids.as_slice(), at) {
            Ok(trip) => {
                self.commands_valid += 1;
                self.valid_latencies_ms.push(request.latency_ms);
                self.first_valid_ms.get_or_insert(delta_ms);
                (Some(trip.intent), None)
            }
            Err(e) => (None, Some(e.to_string())),
        };
        let valid = error.is_none();
        debug!(event_id = %event_id, valid, wheel = %request.wheel, slot = %request.slot, "Recorded emoji command");

        let sample = PlaytestEvent::EmojiLatencySample(LatencySample {
            event_id: format!("latency-{event_id}"),
            related_event: event_id.clone(),
            timestamp: timestamp.clone(),
            player: request.player.clone(),
            glyph_ids: request.glyph_ids.clone(),
            glyphs: glyphs.clone(),
            latency_ms: request.latency_ms,
            valid,
            stamp: self.stamp.clone(),
        });

        self.events.push(PlaytestEvent::Command(CommandEvent {
            event_id,
            timestamp,
            player: request.player,
            source: request.source,
            wheel: request.wheel,
            slot: request.slot,
            glyph_ids: request.glyph_ids,
            glyphs,
            latency_ms: request.latency_ms,
            label: request.label,
            stamp: self.stamp.clone(),
            valid,
            intent,
            error,
        }));
        self.latency_samples.push(sample.clone());
        self.events.push(sample);
        Ok(())
    }

    pub fn record_downed(&mut self, player: &str, by: &str, delta_ms: u64) -> TranslatorResult<()> {
        let timestamp = iso(self.at(delta_ms)?);
        self.downed_ms = Some(delta_ms);
        self.events.push(PlaytestEvent::Downed {
            timestamp,
            player: player.to_string(),
            by: by.to_string(),
            stamp: self.stamp.clone(),
        });
        Ok(())
    }

    pub fn record_revive(
        &mut self,
        player: &str,
        by: &str,
        emoji: Option<&str>,
        delta_ms: u64,
    ) -> TranslatorResult<()> {
        let timestamp = iso(self.at(delta_ms)?);
        self.revived_ms = Some(delta_ms);
        self.events.push(PlaytestEvent::Revive {
            timestamp,
            player: player.to_string(),
            by: by.to_string(),
            emoji: emoji.map(str::to_string),
            stamp: self.stamp.clone(),
        });
        Ok(())
    }

    pub fn record_one_more_prompt(
        &mut self,
        accepted: bool,
        delta_ms: u64,
    ) -> TranslatorResult<()> {
        let timestamp = iso(self.at(delta_ms)?);
        self.one_more_accept = accepted;
        self.events.push(PlaytestEvent::OneMorePrompt {
            timestamp,
            accepted,
            stamp: self.stamp.clone(),
        });
        Ok(())
    }

    fn count(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn build_summary(&self, duration_ms: u64, now: DateTime<Utc>) -> PlaytestSummary {
        let accuracy = if self.commands_executed == 0 {
            0.0
        } else {
            self.commands_valid as f64 / self.commands_executed as f64
        };
        let avg_latency = if self.valid_latencies_ms.is_empty() {
            0
        } else {
            self.valid_latencies_ms.iter().sum::<u64>() / self.valid_latencies_ms.len() as u64
        };
        let revive_ms = match (self.downed_ms, self.revived_ms) {
            (Some(downed), Some(revived)) => Some(revived as i64 - downed as i64),
            _ => None,
        };

        PlaytestSummary {
            schema: PLAYTEST_TELEMETRY_SCHEMA.to_string(),
            order_id: self.stamp.order_id.clone(),
            workspace: self.stamp.workspace.clone(),
            run_id: self.stamp.run_id.clone(),
            timestamp: iso(now),
            metrics: PlaytestMetrics {
                time_to_fun_ms: self.first_valid_ms,
                revive_ms,
                tutorial_duration_ms: duration_ms,
                avg_command_latency_ms: avg_latency,
                p95_command_latency_ms: percentile(&self.valid_latencies_ms, 0.95),
                command_accuracy: (accuracy * 1000.0).round() / 1000.0,
                commands_executed: self.commands_executed,
                commands_valid: self.commands_valid,
                one_more_accept: self.one_more_accept,
            },
            hud_signals: HudSignals {
                ui_state_events: self.count("ui_state"),
                revive_events: self.count("revive"),
                one_more_prompts: self.count("one_more_prompt"),
                emoji_latency_samples: self.latency_samples.len(),
            },
            latency_samples: self.latency_samples.clone(),
            guardrails: Guardrails::default(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::order::OrderSynthesizer;
    use chrono::TimeZone;
    use serde_json::json;

    pub(crate) fn playtest_translator() -> Translator {
        let index = GlyphIndex::from_value(&json!({
            "nouns": [
                {"id": "ally", "emoji": "🤝"},
                {"id": "target", "emoji": "🎯"},
                {"id": "forge", "emoji": "🔥"},
                {"id": "seed", "emoji": "🌱"}
            ],
            "verbs": [
                {"id": "shield", "emoji": "🛡️"},
                {"id": "craft", "emoji": "🛠️"},
                {"id": "deliver", "emoji": "📦"}
            ],
            "qualifiers": [{"id": "tempo", "emoji": "⏱️"}],
            "outcomes": [
                {"id": "risk", "emoji": "⚠️"},
                {"id": "rise", "emoji": "🌅"}
            ]
        }))
        .unwrap();
        Translator::new(index, OrderSynthesizer::default())
    }

    fn stamp() -> RunStamp {
        RunStamp {
            order_id: "order-2025-11-26-061".to_string(),
            run_id: "campaign2-test".to_string(),
            workspace: "toysoldiers_ai_0".to_string(),
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 26, 6, 0, 0).unwrap()
    }

    fn command(glyph_ids: &[&str], latency_ms: u64) -> CommandRequest {
        CommandRequest {
            player: "P1".to_string(),
            source: "quick_cast".to_string(),
            wheel: "ability".to_string(),
            slot: "north".to_string(),
            glyph_ids: glyph_ids.iter().map(|id| id.to_string()).collect(),
            latency_ms,
            label: None,
        }
    }

    #[test]
    fn test_percentile() {
        assert_eq!(percentile(&[], 0.95), 0);
        assert_eq!(percentile(&[7], 0.95), 7);
        assert_eq!(percentile(&[400, 100, 300, 200], 0.95), 300);
        assert_eq!(percentile(&[400, 100, 300, 200], 1.0), 400);
    }

    #[test]
    fn test_ids_to_glyphs_marks_unknown() {
        let translator = playtest_translator();
        assert_eq!(
            ids_to_glyphs(&["ally", "nope"], translator.index()),
            vec!["🤝", "<?>"]
        );
    }

    #[test]
    fn test_valid_and_rejected_commands() {
        let translator = playtest_translator();
        let mut telemetry = CommandTelemetry::new(&translator, stamp(), start());
        telemetry.record_command(command(&["ally", "shield", "target"], 320), 3200).unwrap();
        telemetry
            .record_command(command(&["ally", "shield", "unknown_token"], 480), 22_600)
            .unwrap();

        let events = telemetry.events();
        assert_eq!(events.len(), 4);
        match &events[0] {
            PlaytestEvent::Command(cmd) => {
                assert_eq!(cmd.event_id, "cmd-0");
                assert_eq!(cmd.timestamp, "2025-11-26T06:00:03.200Z");
                assert!(cmd.valid);
                assert_eq!(cmd.intent.as_ref().unwrap().actor, "ally");
            }
            other => panic!("unexpected event {other:?}"),
        }
        match &events[3] {
            PlaytestEvent::EmojiLatencySample(sample) => {
                assert_eq!(sample.event_id, "latency-cmd-1");
                assert_eq!(sample.related_event, "cmd-1");
                assert_eq!(sample.glyphs, vec!["🤝", "🛡️", "<?>"]);
                assert!(!sample.valid);
            }
            other => panic!("unexpected event {other:?}"),
        }

        let line = serde_json::to_value(&events[2]).unwrap();
        assert_eq!(line["type"], "command");
        assert_eq!(line["valid"], false);
        assert_eq!(line["error"], "Unknown glyph token: unknown_token");
        assert!(line.get("intent").is_none());
        assert_eq!(line["order_id"], "order-2025-11-26-061");
    }

    #[test]
    fn test_summary_metrics() {
        let translator = playtest_translator();
        let mut telemetry = CommandTelemetry::new(&translator, stamp(), start());
        telemetry.record_ui_state("tutorial_start", Some("warmup"), None, None, 0).unwrap();
        telemetry.record_command(command(&["ally", "shield", "target"], 300), 3200).unwrap();
        telemetry.record_command(command(&["forge", "craft", "tempo"], 400), 6200).unwrap();
        telemetry.record_command(command(&["ally", "shield", "ghost"], 900), 9000).unwrap();
        telemetry.record_downed("P2", "phantom", 32_000).unwrap();
        telemetry.record_revive("P2", "P1", Some("ally+shield+seed"), 46_600).unwrap();
        telemetry.record_one_more_prompt(true, 90_000).unwrap();

        let now = Utc.with_ymd_and_hms(2025, 11, 26, 7, 0, 0).unwrap();
        let summary = telemetry.build_summary(90_000, now);
        assert_eq!(summary.schema, "toysoldiers-campaign2-telemetry@1.0");
        assert_eq!(summary.timestamp, "2025-11-26T07:00:00Z");

        let metrics = &summary.metrics;
        assert_eq!(metrics.time_to_fun_ms, Some(3200));
        assert_eq!(metrics.revive_ms, Some(14_600));
        assert_eq!(metrics.avg_command_latency_ms, 350);
        assert_eq!(metrics.p95_command_latency_ms, 300);
        assert_eq!(metrics.command_accuracy, 0.667);
        assert_eq!(metrics.commands_executed, 3);
        assert_eq!(metrics.commands_valid, 2);
        assert!(metrics.one_more_accept);

        assert_eq!(
            summary.hud_signals,
            HudSignals {
                ui_state_events: 1,
                revive_events: 1,
                one_more_prompts: 1,
                emoji_latency_samples: 3,
            }
        );
        assert_eq!(summary.latency_samples.len(), 3);
        assert_eq!(summary.guardrails.input_mode, "emoji_dsl_only");
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        let translator = playtest_translator();
        let mut telemetry = CommandTelemetry::new(&translator, stamp(), start());

        let err = telemetry.record_downed("P2", "phantom", u64::MAX).unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
        assert!(err.to_string().contains("out of range"));

        let err = telemetry
            .record_command(command(&["ally", "shield", "target"], 320), i64::MAX as u64)
            .unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");

        // Nothing is recorded for a rejected offset
        assert!(telemetry.events().is_empty());
        let summary = telemetry.build_summary(0, start());
        assert_eq!(summary.metrics.commands_executed, 0);
        assert_eq!(summary.metrics.revive_ms, None);
    }

    #[test]
    fn test_empty_run_summary() {
        let translator = playtest_translator();
        let telemetry = CommandTelemetry::new(&translator, stamp(), start());
        let summary = telemetry.build_summary(0, start());
        assert_eq!(summary.metrics.time_to_fun_ms, None);
        assert_eq!(summary.metrics.revive_ms, None);
        assert_eq!(summary.metrics.command_accuracy, 0.0);
        assert!(!summary.metrics.one_more_accept);

        let value = serde_json::to_value(&summary).unwrap();
        assert!(value["metrics"]["time_to_fun_ms"].is_null());
    }
}
