use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    Clear,
    GhostEaten,
    LifeLost,
}

#[derive(Clone, Copy, Debug)]
pub struct Encounter {
    pub player_before: TilePos,
    pub player_now: TilePos,
    pub ghost_before: TilePos,
}

impl Encounter {
    pub fn touches(&self, ghost_now: TilePos) -> bool {
        if ghost_now == self.player_now {
            return true;
        }
        self.player_before != self.player_now
            && ghost_now == self.player_before
            && self.ghost_before == self.player_now
    }
}

pub struct CollisionResolver<'a> {
    config: &'a EngineConfig,
}

impl<'a> CollisionResolver<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Resolves contact between the player and one agent. Lives are
    /// decremented here; resetting positions is left to the caller.
    pub fn check(
        &self,
        ghost: &mut GhostAgent,
        encounter: &Encounter,
        score: &mut ScoreState,
        events: &mut Vec<GameEvent>,
    ) -> Contact {
        if ghost.is_dead() || !encounter.touches(ghost.pos) {
            return Contact::Clear;
        }

        if ghost.is_frightened() {
            let points = self.config.combo_score(score.combo_index);
            let last = self.config.combo_scores.len().saturating_sub(1);
            score.score += points;
            score.combo_index = (score.combo_index + 1).min(last);
            ghost.kill();
            events.push(GameEvent::GhostEaten {
                ghost: ghost.personality,
                points,
            });
            return Contact::GhostEaten;
        }

        score.lives = score.lives.saturating_sub(1);
        events.push(GameEvent::LifeLost {
            lives_left: score.lives,
        });
        Contact::LifeLost
    }
}

impl GameEngine {
    /// Runs after every agent has moved. The first life lost ends the pass.
    pub(super) fn resolve_ghost_collisions(
        &mut self,
        player_before: TilePos,
        ghosts_before: &[TilePos],
    ) {
        let resolver = CollisionResolver::new(&self.config);
        let mut life_lost = false;
        for (idx, ghost) in self.ghosts.iter_mut().enumerate() {
            let encounter = Encounter {
                player_before,
                player_now: self.player.pos,
                ghost_before: ghosts_before.get(idx).copied().unwrap_or(ghost.pos),
            };
            match resolver.check(ghost, &encounter, &mut self.score, &mut self.events) {
                Contact::Clear => {}
                Contact::GhostEaten => self.stats.ghosts_eaten += 1,
                Contact::LifeLost => {
                    life_lost = true;
                    break;
                }
            }
        }
        if life_lost {
            self.after_life_lost();
        }
    }

    fn after_life_lost(&mut self) {
        tracing::info!(lives = self.score.lives, tick = self.tick_counter, "life lost");
        self.scheduler.clear_frightened();
        self.score.combo_index = 0;
        self.reset_positions();
        if self.score.lives == 0 {
            self.events.push(GameEvent::GameOver {
                score: self.score.score,
            });
            self.ended = true;
            tracing::info!(score = self.score.score, level = self.score.level, "game over");
        }
    }
}
