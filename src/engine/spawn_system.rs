use super::*;

impl GameEngine {
    pub(super) fn spawn_agents(graph: &MazeGraph, config: &EngineConfig) -> Vec<GhostAgent> {
        Personality::ALL
            .iter()
            .map(|&personality| {
                GhostAgent::new(
                    personality,
                    graph.ghost_spawn(personality),
                    graph.home_corner(personality),
                    config.release_delays_ms[personality.index()],
                )
            })
            .collect()
    }

    pub(super) fn reset_positions(&mut self) {
        let spawn = self.graph.player_spawn();
        self.player = PlayerState {
            pos: spawn,
            heading: Direction::Left,
        };
        self.player_before_tick = spawn;
        for ghost in &mut self.ghosts {
            let delay = self.config.release_delays_ms[ghost.personality.index()];
            ghost.reset_to_spawn(delay);
        }
    }

    pub(super) fn complete_level(&mut self) {
        let finished = self.score.level;
        self.events.push(GameEvent::LevelComplete { level: finished });
        tracing::info!(level = finished, score = self.score.score, "level complete");

        self.score.level += 1;
        self.score.combo_index = 0;
        self.board.restore(&self.graph);
        self.score.pellets_remaining = self.board.total();
        self.scheduler.reset();
        self.reset_positions();
    }
}
