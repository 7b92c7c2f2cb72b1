//! Scripted tutorial runs replayed into [`CommandTelemetry`].

use serde::{Deserialize, Serialize};

use super::telemetry::{CommandRequest, CommandTelemetry};
use super::wheel::WheelBindings;
use crate::error::{TranslatorError, TranslatorResult};

/// One scripted tutorial beat, offset from run start by `delta_ms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TutorialStep {
    UiState {
        delta_ms: u64,
        state: String,
        detail: Option<String>,
        wheel: Option<String>,
        player: Option<String>,
    },
    /// `source`, `glyph_ids` and `label` fall back to the wheel bindings
    Command {
        delta_ms: u64,
        player: String,
        source: Option<String>,
        wheel: String,
        slot: String,
        glyph_ids: Option<Vec<String>>,
        latency_ms: u64,
        label: Option<String>,
    },
    Downed {
        delta_ms: u64,
        player: String,
        by: String,
    },
    Revive {
        delta_ms: u64,
        player: String,
        by: String,
        emoji: Option<String>,
    },
    OneMorePrompt {
        delta_ms: u64,
        accepted: bool,
    },
}

impl TutorialStep {
    pub fn delta_ms(&self) -> u64 {
        match self {
            Self::UiState { delta_ms, .. }
            | Self::Command { delta_ms, .. }
            | Self::Downed { delta_ms, .. }
            | Self::Revive { delta_ms, .. }
            | Self::OneMorePrompt { delta_ms, .. } => *delta_ms,
        }
    }
}

/// Ordered list of tutorial steps (a bare JSON array on disk)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TutorialScript {
    pub steps: Vec<TutorialStep>,
}

impl TutorialScript {
    pub fn from_json_str(source: &str) -> TranslatorResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Offset of the final step
    pub fn duration_ms(&self) -> u64 {
        self.steps.last().map_or(0, TutorialStep::delta_ms)
    }

    /// Feed every step into `telemetry`.
    ///
    /// A command with neither explicit glyph ids nor a matching wheel slot is
    /// a configuration error, as is a step offset that cannot be added to the
    /// run start. An unknown glyph id is not; it is logged as a rejected
    /// command.
    pub fn replay(
        &self,
        telemetry: &mut CommandTelemetry<'_>,
        bindings: &WheelBindings,
    ) -> TranslatorResult<()> {
        for step in &self.steps {
            match step {
                TutorialStep::UiState {
                    delta_ms,
                    state,
                    detail,
                    wheel,
                    player,
                } => telemetry.record_ui_state(
                    state,
                    detail.as_deref(),
                    wheel.as_deref(),
                    player.as_deref(),
                    *delta_ms,
                )?,
                TutorialStep::Command {
                    delta_ms,
                    player,
                    source,
                    wheel,
                    slot,
                    glyph_ids,
                    latency_ms,
                    label,
                } => {
                    let bound = bindings.slot(wheel, slot);
                    let glyph_ids = match (glyph_ids, bound) {
                        (Some(ids), _) => ids.clone(),
                        (None, Some(bound)) => bound.glyph_ids.clone(),
                        (None, None) => {
                            return Err(TranslatorError::configuration(format!(
                                "no glyph binding for wheel '{wheel}' slot '{slot}'"
                            )))
                        }
                    };
                    let request = CommandRequest {
                        player: player.clone(),
                        source: source
                            .clone()
                            .unwrap_or_else(|| WheelBindings::source_for(wheel).to_string()),
                        wheel: wheel.clone(),
                        slot: slot.clone(),
                        glyph_ids,
                        latency_ms: *latency_ms,
                        label: label.clone().or_else(|| bound.map(|b| b.label.clone())),
                    };
                    telemetry.record_command(request, *delta_ms)?;
                }
                TutorialStep::Downed {
                    delta_ms,
                    player,
                    by,
                } => telemetry.record_downed(player, by, *delta_ms)?,
                TutorialStep::Revive {
                    delta_ms,
                    player,
                    by,
                    emoji,
                } => telemetry.record_revive(player, by, emoji.as_deref(), *delta_ms)?,
                TutorialStep::OneMorePrompt { delta_ms, accepted } => {
                    telemetry.record_one_more_prompt(*accepted, *delta_ms)?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playtest::telemetry::tests::playtest_translator;
    use crate::playtest::telemetry::{PlaytestEvent, RunStamp};
    use chrono::{TimeZone, Utc};

    const SCRIPT: &str = r#"[
        {"delta_ms": 0, "type": "ui_state", "state": "tutorial_start", "detail": "warmup"},
        {"delta_ms": 3200, "type": "command", "player": "P1", "wheel": "ability", "slot": "north", "latency_ms": 320},
        {"delta_ms": 9200, "type": "command", "player": "P1", "source": "quick_cast", "wheel": "textless_comm",
         "slot": "ping", "glyph_ids": ["ally", "deliver", "risk"], "latency_ms": 280, "label": "Danger ping"},
        {"delta_ms": 32000, "type": "downed", "player": "P2", "by": "phantom"},
        {"delta_ms": 46600, "type": "revive", "player": "P2", "by": "P1", "emoji": "ally+shield+seed"},
        {"delta_ms": 90000, "type": "one_more_prompt", "accepted": false}
    ]"#;

    fn stamp() -> RunStamp {
        RunStamp {
            order_id: "order-1".to_string(),
            run_id: "run-1".to_string(),
            workspace: "ws".to_string(),
        }
    }

    #[test]
    fn test_parse_and_duration() {
        let script = TutorialScript::from_json_str(SCRIPT).unwrap();
        assert_eq!(script.steps.len(), 6);
        assert_eq!(script.duration_ms(), 90_000);
        assert_eq!(TutorialScript::default().duration_ms(), 0);
    }

    #[test]
    fn test_replay_fills_from_bindings() {
        let translator = playtest_translator();
        let start = Utc.with_ymd_and_hms(2025, 11, 26, 6, 0, 0).unwrap();
        let mut telemetry = CommandTelemetry::new(&translator, stamp(), start);
        let script = TutorialScript::from_json_str(SCRIPT).unwrap();
        script
            .replay(&mut telemetry, &WheelBindings::default())
            .unwrap();

        let PlaytestEvent::Command(first) = &telemetry.events()[1] else {
            panic!("expected a command event");
        };
        assert_eq!(first.glyph_ids, vec!["ally", "shield", "target"]);
        assert_eq!(first.source, "quick_cast");
        assert_eq!(first.label.as_deref(), Some("Shield ally"));
        assert!(first.valid);

        let summary = telemetry.build_summary(script.duration_ms(), start);
        assert_eq!(summary.metrics.revive_ms, Some(14_600));
        assert_eq!(summary.metrics.commands_valid, 2);
        assert!(!summary.metrics.one_more_accept);
    }

    #[test]
    fn test_unbound_slot_is_configuration_error() {
        let translator = playtest_translator();
        let start = Utc.with_ymd_and_hms(2025, 11, 26, 6, 0, 0).unwrap();
        let mut telemetry = CommandTelemetry::new(&translator, stamp(), start);
        let script = TutorialScript::from_json_str(
            r#"[{"delta_ms": 0, "type": "command", "player": "P1", "wheel": "ability", "slot": "up", "latency_ms": 1}]"#,
        )
        .unwrap();
        let err = script
            .replay(&mut telemetry, &WheelBindings::default())
            .unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_oversized_offset_is_configuration_error() {
        let translator = playtest_translator();
        let start = Utc.with_ymd_and_hms(2025, 11, 26, 6, 0, 0).unwrap();
        let mut telemetry = CommandTelemetry::new(&translator, stamp(), start);
        let script = TutorialScript::from_json_str(
            r#"[
                {"delta_ms": 0, "type": "ui_state", "state": "tutorial_start"},
                {"delta_ms": 18446744073709551615, "type": "downed", "player": "P2", "by": "phantom"}
            ]"#,
        )
        .unwrap();
        let err = script
            .replay(&mut telemetry, &WheelBindings::default())
            .unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
        assert_eq!(telemetry.events().len(), 1);
    }
}
