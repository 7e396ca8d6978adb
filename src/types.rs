use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    /// Tie-break order used whenever two moves are equally good.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn delta(self) -> TilePos {
        match self {
            Direction::Up => TilePos::new(0, -1),
            Direction::Left => TilePos::new(-1, 0),
            Direction::Down => TilePos::new(0, 1),
            Direction::Right => TilePos::new(1, 0),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Left => Direction::Right,
            Direction::Down => Direction::Up,
            Direction::Right => Direction::Left,
        }
    }
}

/// Tile coordinate. Signed because targets may lie outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dir: Direction, tiles: i32) -> Self {
        self + dir.delta().scale(tiles)
    }

    pub fn scale(self, factor: i32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn distance_sq(self, other: TilePos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    pub fn manhattan(self, other: TilePos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Add for TilePos {
    type Output = TilePos;

    fn add(self, rhs: TilePos) -> TilePos {
        TilePos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for TilePos {
    type Output = TilePos;

    fn sub(self, rhs: TilePos) -> TilePos {
        TilePos::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Wall,
    Open,
    Pellet,
    PowerPellet,
    Tunnel,
}

impl TileKind {
    pub fn is_walkable(self) -> bool {
        self != TileKind::Wall
    }

    pub fn is_edible(self) -> bool {
        matches!(self, TileKind::Pellet | TileKind::PowerPellet)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalMode {
    Scatter,
    Chase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Scatter,
    Chase,
    Frightened,
    Dead,
}

impl From<GlobalMode> for GhostMode {
    fn from(mode: GlobalMode) -> Self {
        match mode {
            GlobalMode::Scatter => GhostMode::Scatter,
            GlobalMode::Chase => GhostMode::Chase,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    Chaser,
    Ambusher,
    Flanker,
    Shy,
}

impl Personality {
    /// Update order. Flanker must come after Chaser.
    pub const ALL: [Personality; 4] = [
        Personality::Chaser,
        Personality::Ambusher,
        Personality::Flanker,
        Personality::Shy,
    ];

    pub fn index(self) -> usize {
        match self {
            Personality::Chaser => 0,
            Personality::Ambusher => 1,
            Personality::Flanker => 2,
            Personality::Shy => 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PelletEaten {
        x: i32,
        y: i32,
    },
    PowerPelletEaten {
        x: i32,
        y: i32,
    },
    GhostEaten {
        ghost: Personality,
        points: u32,
    },
    LifeLost {
        #[serde(rename = "livesLeft")]
        lives_left: u32,
    },
    LevelComplete {
        level: u32,
    },
    GameOver {
        score: u32,
    },
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct GhostView {
    pub id: Personality,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub mode: GhostMode,
    pub released: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct EngineSnapshot {
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub level: u32,
    pub score: u32,
    pub lives: u32,
    #[serde(rename = "pelletsRemaining")]
    pub pellets_remaining: usize,
    #[serde(rename = "globalMode")]
    pub global_mode: GlobalMode,
    #[serde(rename = "frightenedRemainingMs")]
    pub frightened_remaining_ms: u64,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub events: Vec<GameEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub score: u32,
    pub level: u32,
    #[serde(rename = "livesLeft")]
    pub lives_left: u32,
    pub ticks: u64,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    #[serde(rename = "ghostsEaten")]
    pub ghosts_eaten: u32,
    #[serde(rename = "pelletsEaten")]
    pub pellets_eaten: u32,
    #[serde(rename = "gameOver")]
    pub game_over: bool,
}

#[cfg(test)]
mod tests {
    use super::{Direction, GameEvent, Personality, TilePos};

    #[test]
    fn reverse_is_an_involution() {
        for dir in Direction::PRIORITY {
            assert_ne!(dir.reverse(), dir);
            assert_eq!(dir.reverse().reverse(), dir);
            assert_eq!(dir.delta() + dir.reverse().delta(), TilePos::new(0, 0));
        }
    }

    #[test]
    fn offset_moves_along_heading() {
        let origin = TilePos::new(5, 5);
        assert_eq!(origin.offset(Direction::Up, 4), TilePos::new(5, 1));
        assert_eq!(origin.offset(Direction::Right, 2), TilePos::new(7, 5));
        assert_eq!(origin.offset(Direction::Left, 7), TilePos::new(-2, 5));
    }

    #[test]
    fn personality_order_matches_index() {
        for (idx, personality) in Personality::ALL.iter().enumerate() {
            assert_eq!(personality.index(), idx);
        }
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(GameEvent::GhostEaten {
            ghost: Personality::Flanker,
            points: 400,
        })
        .expect("event should serialize");
        assert_eq!(json["type"], "ghost_eaten");
        assert_eq!(json["ghost"], "flanker");
        assert_eq!(json["points"], 400);
    }
}
