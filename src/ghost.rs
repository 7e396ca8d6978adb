use serde::Serialize;

use crate::maze::MazeGraph;
use crate::pathfinder::{candidate_moves, next_step};
use crate::rng::Rng;
use crate::targeting::{chase_target, TargetContext};
use crate::types::{Direction, GhostMode, GhostView, GlobalMode, Personality, TilePos};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalMode {
    FollowingGlobal,
    Frightened,
    Dead,
}

#[derive(Clone, Debug)]
pub struct GhostAgent {
    pub personality: Personality,
    pub pos: TilePos,
    pub heading: Direction,
    pub mode: PersonalMode,
    pub spawn: TilePos,
    pub home_corner: TilePos,
    release_in_ms: u64,
}

impl GhostAgent {
    pub fn new(
        personality: Personality,
        spawn: TilePos,
        home_corner: TilePos,
        release_in_ms: u64,
    ) -> Self {
        Self {
            personality,
            pos: spawn,
            heading: Direction::Left,
            mode: PersonalMode::FollowingGlobal,
            spawn,
            home_corner,
            release_in_ms,
        }
    }

    /// Dead beats Frightened beats the global schedule.
    pub fn effective_mode(&self, global: GlobalMode) -> GhostMode {
        match self.mode {
            PersonalMode::Dead => GhostMode::Dead,
            PersonalMode::Frightened => GhostMode::Frightened,
            PersonalMode::FollowingGlobal => global.into(),
        }
    }

    pub fn is_released(&self) -> bool {
        self.release_in_ms == 0
    }

    pub fn is_dead(&self) -> bool {
        self.mode == PersonalMode::Dead
    }

    pub fn is_frightened(&self) -> bool {
        self.mode == PersonalMode::Frightened
    }

    pub fn frighten(&mut self) {
        if self.mode != PersonalMode::Dead {
            self.mode = PersonalMode::Frightened;
        }
    }

    pub fn calm(&mut self) {
        if self.mode == PersonalMode::Frightened {
            self.mode = PersonalMode::FollowingGlobal;
        }
    }

    pub fn kill(&mut self) {
        self.mode = PersonalMode::Dead;
        self.release_in_ms = 0;
    }

    pub fn reset_to_spawn(&mut self, release_in_ms: u64) {
        self.pos = self.spawn;
        self.heading = Direction::Left;
        self.mode = PersonalMode::FollowingGlobal;
        self.release_in_ms = release_in_ms;
    }

    /// Tile steered toward this tick; `None` while Frightened.
    pub fn target(&self, global: GlobalMode, ctx: &TargetContext, shy_radius: f32) -> Option<TilePos> {
        match self.effective_mode(global) {
            GhostMode::Frightened => None,
            GhostMode::Dead => Some(self.spawn),
            GhostMode::Scatter => Some(self.home_corner),
            GhostMode::Chase => Some(chase_target(
                self.personality,
                ctx,
                self.pos,
                self.home_corner,
                shy_radius,
            )),
        }
    }

    pub fn advance(
        &mut self,
        graph: &MazeGraph,
        ctx: &TargetContext,
        global: GlobalMode,
        shy_radius: f32,
        rng: &mut Rng,
        dt_ms: u64,
    ) {
        if self.release_in_ms > 0 {
            self.release_in_ms = self.release_in_ms.saturating_sub(dt_ms);
            return;
        }
        self.revive_if_home();

        let dir = match self.target(global, ctx, shy_radius) {
            Some(target) => next_step(graph, self.pos, target, self.heading),
            None => {
                let options = candidate_moves(graph, self.pos, self.heading);
                match rng.pick(&options) {
                    Some((dir, _)) => dir,
                    None => self.heading,
                }
            }
        };

        if let Some(landing) = graph.step(self.pos, dir) {
            self.pos = landing;
            self.heading = dir;
        }
        self.revive_if_home();
    }

    fn revive_if_home(&mut self) {
        if self.mode == PersonalMode::Dead && self.pos == self.spawn {
            self.mode = PersonalMode::FollowingGlobal;
        }
    }

    pub fn view(&self, global: GlobalMode) -> GhostView {
        GhostView {
            id: self.personality,
            x: self.pos.x,
            y: self.pos.y,
            dir: self.heading,
            mode: self.effective_mode(global),
            released: self.is_released(),
        }
    }
}
