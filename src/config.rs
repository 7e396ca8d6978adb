use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    COMBO_SCORES, DEFAULT_SCHEDULE, FRIGHTENED_DURATION_MS, MAX_TICK_RATE, PELLET_SCORE,
    POWER_PELLET_SCORE, RELEASE_DELAYS_MS, SHY_RADIUS, STARTING_LIVES, TICK_RATE,
};
use crate::error::ConfigError;
use crate::types::GlobalMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModePhase {
    pub mode: GlobalMode,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl ModePhase {
    pub fn timed(mode: GlobalMode, duration_ms: u64) -> Self {
        Self {
            mode,
            duration_ms: Some(duration_ms),
        }
    }

    pub fn forever(mode: GlobalMode) -> Self {
        Self {
            mode,
            duration_ms: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub schedule: Vec<ModePhase>,
    pub frightened_ms: u64,
    pub combo_scores: Vec<u32>,
    pub pellet_score: u32,
    pub power_pellet_score: u32,
    pub starting_lives: u32,
    pub tick_rate: u32,
    pub shy_radius: f32,
    pub release_delays_ms: [u64; 4],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schedule: DEFAULT_SCHEDULE
                .iter()
                .map(|&(mode, duration_ms)| ModePhase { mode, duration_ms })
                .collect(),
            frightened_ms: FRIGHTENED_DURATION_MS,
            combo_scores: COMBO_SCORES.to_vec(),
            pellet_score: PELLET_SCORE,
            power_pellet_score: POWER_PELLET_SCORE,
            starting_lives: STARTING_LIVES,
            tick_rate: TICK_RATE,
            shy_radius: SHY_RADIUS,
            release_delays_ms: RELEASE_DELAYS_MS,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        if self.combo_scores.is_empty() {
            return Err(ConfigError::EmptyComboTable);
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.tick_rate > MAX_TICK_RATE {
            return Err(ConfigError::TickRateTooHigh(self.tick_rate));
        }
        Ok(())
    }

    pub fn tick_ms(&self) -> u64 {
        1000 / self.tick_rate.max(1) as u64
    }

    pub fn combo_score(&self, combo_index: usize) -> u32 {
        let last = self.combo_scores.len().saturating_sub(1);
        self.combo_scores
            .get(combo_index.min(last))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineConfig, ModePhase};
    use crate::error::ConfigError;
    use crate::types::GlobalMode;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.schedule.first().map(|p| p.mode), Some(GlobalMode::Scatter));
        assert_eq!(config.schedule.last().and_then(|p| p.duration_ms), None);
        assert_eq!(config.tick_ms(), 100);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{"frightenedMs": 4000, "schedule": [{"mode": "chase"}]}"#,
        )
        .expect("config should parse");
        assert_eq!(config.frightened_ms, 4_000);
        assert_eq!(config.schedule, vec![ModePhase::forever(GlobalMode::Chase)]);
        assert_eq!(config.combo_scores, vec![200, 400, 800, 1600]);
        assert_eq!(config.starting_lives, 3);
    }

    #[test]
    fn empty_schedule_is_rejected() {
        let result = EngineConfig::from_json_str(r#"{"schedule": []}"#);
        assert!(matches!(result, Err(ConfigError::EmptySchedule)));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let result = EngineConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn combo_score_caps_at_last_entry() {
        let config = EngineConfig::default();
        assert_eq!(config.combo_score(0), 200);
        assert_eq!(config.combo_score(3), 1600);
        assert_eq!(config.combo_score(9), 1600);
    }

    #[test]
    fn tick_rate_must_leave_whole_milliseconds() {
        let result = EngineConfig::from_json_str(r#"{"tickRate": 1001}"#);
        assert!(matches!(result, Err(ConfigError::TickRateTooHigh(1001))));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"tickRate": 0}"#),
            Err(ConfigError::ZeroTickRate)
        ));

        let fastest = EngineConfig::from_json_str(r#"{"tickRate": 1000}"#)
            .expect("1000 ticks per second is allowed");
        assert_eq!(fastest.tick_ms(), 1);
    }
}
