use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::ghost::GhostAgent;
use crate::maze::{MazeGraph, MazeLayout};
use crate::mode::ModeScheduler;
use crate::rng::Rng;
use crate::targeting::TargetContext;
use crate::types::{
    Direction, EngineSnapshot, GameEvent, GameSummary, Personality, PlayerView, TileKind, TilePos,
};

mod collision_system;
mod pellet_system;
mod spawn_system;

pub use self::collision_system::{CollisionResolver, Contact, Encounter};
pub use self::pellet_system::PelletBoard;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreState {
    pub score: u32,
    pub combo_index: usize,
    pub pellets_remaining: usize,
    pub lives: u32,
    pub level: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerState {
    pub pos: TilePos,
    pub heading: Direction,
}

#[derive(Clone, Debug, Default)]
struct EngineStats {
    ghosts_eaten: u32,
    pellets_eaten: u32,
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: EngineConfig,

    graph: MazeGraph,
    board: PelletBoard,
    scheduler: ModeScheduler,
    ghosts: Vec<GhostAgent>,
    player: PlayerState,
    player_before_tick: TilePos,
    score: ScoreState,
    rng: Rng,
    events: Vec<GameEvent>,
    stats: EngineStats,

    tick_counter: u64,
    elapsed_ms: u64,
    ended: bool,
}

impl GameEngine {
    pub fn new(layout: MazeLayout, config: EngineConfig, seed: u32) -> Result<Self, EngineError> {
        config.validate()?;
        let graph = MazeGraph::new(layout)?;
        let board = PelletBoard::from_graph(&graph);
        let ghosts = Self::spawn_agents(&graph, &config);
        let scheduler = ModeScheduler::new(config.schedule.clone());
        let spawn = graph.player_spawn();
        let score = ScoreState {
            score: 0,
            combo_index: 0,
            pellets_remaining: board.total(),
            lives: config.starting_lives,
            level: 1,
        };
        tracing::debug!(
            seed,
            width = graph.width(),
            height = graph.height(),
            pellets = board.total(),
            "engine created"
        );

        Ok(Self {
            config,
            graph,
            board,
            scheduler,
            ghosts,
            player: PlayerState {
                pos: spawn,
                heading: Direction::Left,
            },
            player_before_tick: spawn,
            score,
            rng: Rng::new(seed),
            events: Vec::new(),
            stats: EngineStats::default(),
            tick_counter: 0,
            elapsed_ms: 0,
            ended: false,
        })
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Player movement is driven from outside; the engine only reads it.
    pub fn set_player(&mut self, pos: TilePos, heading: Direction) {
        if !self.graph.is_walkable(pos) {
            tracing::warn!(?pos, "player placed on a non-walkable tile");
        }
        self.player = PlayerState { pos, heading };
    }

    pub fn tick(&mut self, dt_ms: u64) {
        if self.ended {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_ms += dt_ms;
        let player_before = self.player_before_tick;

        self.consume_player_tile();
        if self.board.total() > 0 && self.score.pellets_remaining == 0 {
            self.complete_level();
            return;
        }

        let update = self.scheduler.update(dt_ms);
        if update.phase_changed {
            tracing::debug!(
                tick = self.tick_counter,
                phase = self.scheduler.phase_index(),
                mode = ?self.scheduler.global_mode(),
                "global mode changed"
            );
        }
        if update.frightened_ended {
            for ghost in &mut self.ghosts {
                ghost.calm();
            }
            self.score.combo_index = 0;
        }

        let ghosts_before: Vec<TilePos> = self.ghosts.iter().map(|ghost| ghost.pos).collect();
        self.move_agents(dt_ms);
        self.resolve_ghost_collisions(player_before, &ghosts_before);
        self.player_before_tick = self.player.pos;
    }

    /// Agents move in fixed order; later agents see the Chaser's new tile.
    fn move_agents(&mut self, dt_ms: u64) {
        let global = self.scheduler.global_mode();
        let mut ctx = TargetContext {
            player: self.player.pos,
            player_dir: self.player.heading,
            chaser: self.chaser_pos(),
        };
        for ghost in &mut self.ghosts {
            ghost.advance(
                &self.graph,
                &ctx,
                global,
                self.config.shy_radius,
                &mut self.rng,
                dt_ms,
            );
            if ghost.personality == Personality::Chaser {
                ctx.chaser = ghost.pos;
            }
        }
    }

    fn chaser_pos(&self) -> TilePos {
        self.ghost(Personality::Chaser)
            .map(|ghost| ghost.pos)
            .unwrap_or(self.player.pos)
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> EngineSnapshot {
        let global = self.scheduler.global_mode();
        let snapshot = EngineSnapshot {
            tick: self.tick_counter,
            elapsed_ms: self.elapsed_ms,
            level: self.score.level,
            score: self.score.score,
            lives: self.score.lives,
            pellets_remaining: self.score.pellets_remaining,
            global_mode: global,
            frightened_remaining_ms: self.scheduler.frightened_remaining_ms(),
            player: PlayerView {
                x: self.player.pos.x,
                y: self.player.pos.y,
                dir: self.player.heading,
            },
            ghosts: self.ghosts.iter().map(|ghost| ghost.view(global)).collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            score: self.score.score,
            level: self.score.level,
            lives_left: self.score.lives,
            ticks: self.tick_counter,
            duration_ms: self.elapsed_ms,
            ghosts_eaten: self.stats.ghosts_eaten,
            pellets_eaten: self.stats.pellets_eaten,
            game_over: self.ended,
        }
    }

    pub fn graph(&self) -> &MazeGraph {
        &self.graph
    }

    pub fn tile_at(&self, pos: TilePos) -> TileKind {
        self.board.kind(pos)
    }

    pub fn ghosts(&self) -> &[GhostAgent] {
        &self.ghosts
    }

    pub fn ghost(&self, personality: Personality) -> Option<&GhostAgent> {
        self.ghosts
            .iter()
            .find(|ghost| ghost.personality == personality)
    }

    pub fn player(&self) -> PlayerState {
        self.player
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn scheduler(&self) -> &ModeScheduler {
        &self.scheduler
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}
