use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout has no tiles")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("layout declares {expected} tiles but holds {found}")]
    SizeMismatch { expected: usize, found: usize },
    #[error("unknown glyph {glyph:?} at ({x},{y})")]
    UnknownGlyph { glyph: char, x: i32, y: i32 },
    #[error("missing spawn: {0}")]
    MissingSpawn(&'static str),
    #[error("{what} spawn at ({x},{y}) is not walkable")]
    SpawnOnWall { what: &'static str, x: i32, y: i32 },
    #[error("tunnel at ({x},{y}) has no valid pair")]
    UnpairedTunnel { x: i32, y: i32 },
    #[error("tile ({x},{y}) has no walkable neighbor")]
    IsolatedTile { x: i32, y: i32 },
    #[error("tile ({x},{y}) is unreachable from the player spawn")]
    Unreachable { x: i32, y: i32 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("mode schedule is empty")]
    EmptySchedule,
    #[error("combo score table is empty")]
    EmptyComboTable,
    #[error("tick rate must be positive")]
    ZeroTickRate,
    #[error("tick rate {0} exceeds 1000 ticks per second")]
    TickRateTooHigh(u32),
    #[error("config json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid layout: {0}")]
    InvalidLayout(#[from] LayoutError),
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}
