use crate::config::ModePhase;
use crate::types::GlobalMode;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeUpdate {
    pub frightened_ended: bool,
    pub phase_changed: bool,
}

#[derive(Clone, Debug)]
pub struct ModeScheduler {
    schedule: Vec<ModePhase>,
    phase_index: usize,
    phase_elapsed_ms: u64,
    frightened_remaining_ms: Option<u64>,
}

impl ModeScheduler {
    /// An empty schedule behaves as Scatter forever.
    pub fn new(schedule: Vec<ModePhase>) -> Self {
        let schedule = if schedule.is_empty() {
            vec![ModePhase::forever(GlobalMode::Scatter)]
        } else {
            schedule
        };
        Self {
            schedule,
            phase_index: 0,
            phase_elapsed_ms: 0,
            frightened_remaining_ms: None,
        }
    }

    pub fn reset(&mut self) {
        self.phase_index = 0;
        self.phase_elapsed_ms = 0;
        self.frightened_remaining_ms = None;
    }

    pub fn global_mode(&self) -> GlobalMode {
        self.schedule[self.phase_index].mode
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn phase_remaining_ms(&self) -> Option<u64> {
        if self.is_last_phase() {
            return None;
        }
        self.schedule[self.phase_index]
            .duration_ms
            .map(|duration| duration.saturating_sub(self.phase_elapsed_ms))
    }

    pub fn is_frightened(&self) -> bool {
        self.frightened_remaining_ms.is_some()
    }

    pub fn frightened_remaining_ms(&self) -> u64 {
        self.frightened_remaining_ms.unwrap_or(0)
    }

    /// Starts Frightened, or restarts its timer when already running.
    pub fn frighten(&mut self, duration_ms: u64) {
        tracing::debug!(duration_ms, "frightened override started");
        self.frightened_remaining_ms = Some(duration_ms);
    }

    pub fn clear_frightened(&mut self) {
        self.frightened_remaining_ms = None;
    }

    pub fn update(&mut self, dt_ms: u64) -> ModeUpdate {
        let mut update = ModeUpdate::default();
        let mut schedule_dt = dt_ms;

        if let Some(remaining) = self.frightened_remaining_ms {
            if remaining > dt_ms {
                self.frightened_remaining_ms = Some(remaining - dt_ms);
                return update;
            }
            self.frightened_remaining_ms = None;
            update.frightened_ended = true;
            schedule_dt = dt_ms - remaining;
            tracing::debug!(mode = ?self.global_mode(), "frightened override ended");
        }

        self.phase_elapsed_ms = self.phase_elapsed_ms.saturating_add(schedule_dt);
        while !self.is_last_phase() {
            let Some(duration) = self.schedule[self.phase_index].duration_ms else {
                break;
            };
            if self.phase_elapsed_ms < duration {
                break;
            }
            self.phase_elapsed_ms -= duration;
            self.phase_index += 1;
            update.phase_changed = true;
        }
        update
    }

    fn is_last_phase(&self) -> bool {
        self.phase_index + 1 >= self.schedule.len()
    }
}
