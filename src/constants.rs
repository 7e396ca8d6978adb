use crate::types::GlobalMode;

pub const TICK_RATE: u32 = 10;
pub const MAX_TICK_RATE: u32 = 1000;

pub const PELLET_SCORE: u32 = 10;
pub const POWER_PELLET_SCORE: u32 = 50;
pub const COMBO_SCORES: [u32; 4] = [200, 400, 800, 1600];

pub const STARTING_LIVES: u32 = 3;
pub const FRIGHTENED_DURATION_MS: u64 = 6_000;
pub const RELEASE_DELAYS_MS: [u64; 4] = [0, 1_000, 2_000, 3_000];

pub const AMBUSHER_LOOKAHEAD: i32 = 4;
pub const FLANKER_PIVOT_LOOKAHEAD: i32 = 2;
pub const SHY_RADIUS: f32 = 8.0;

/// Level-one Scatter/Chase alternation. `None` holds forever.
pub const DEFAULT_SCHEDULE: [(GlobalMode, Option<u64>); 8] = [
    (GlobalMode::Scatter, Some(7_000)),
    (GlobalMode::Chase, Some(20_000)),
    (GlobalMode::Scatter, Some(7_000)),
    (GlobalMode::Chase, Some(20_000)),
    (GlobalMode::Scatter, Some(5_000)),
    (GlobalMode::Chase, Some(20_000)),
    (GlobalMode::Scatter, Some(5_000)),
    (GlobalMode::Chase, None),
];
