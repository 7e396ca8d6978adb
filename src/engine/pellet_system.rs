use super::*;

#[derive(Clone, Debug)]
pub struct PelletBoard {
    width: i32,
    contents: Vec<TileKind>,
    total: usize,
}

impl PelletBoard {
    pub fn from_graph(graph: &MazeGraph) -> Self {
        let contents: Vec<TileKind> = graph.tiles().map(|(_, kind)| kind).collect();
        let total = contents.iter().filter(|kind| kind.is_edible()).count();
        Self {
            width: graph.width(),
            contents,
            total,
        }
    }

    pub fn restore(&mut self, graph: &MazeGraph) {
        *self = Self::from_graph(graph);
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn kind(&self, pos: TilePos) -> TileKind {
        self.index(pos)
            .and_then(|idx| self.contents.get(idx).copied())
            .unwrap_or(TileKind::Wall)
    }

    pub fn consume(&mut self, pos: TilePos) -> Option<TileKind> {
        let idx = self.index(pos)?;
        let slot = self.contents.get_mut(idx)?;
        if !slot.is_edible() {
            return None;
        }
        let eaten = *slot;
        *slot = TileKind::Open;
        Some(eaten)
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width {
            return None;
        }
        Some((pos.y * self.width + pos.x) as usize)
    }
}

impl GameEngine {
    pub(super) fn consume_player_tile(&mut self) {
        let pos = self.player.pos;
        let Some(eaten) = self.board.consume(pos) else {
            return;
        };
        self.score.pellets_remaining = self.score.pellets_remaining.saturating_sub(1);
        self.stats.pellets_eaten += 1;

        match eaten {
            TileKind::PowerPellet => {
                self.score.score += self.config.power_pellet_score;
                self.events
                    .push(GameEvent::PowerPelletEaten { x: pos.x, y: pos.y });
                self.start_frightened();
            }
            _ => {
                self.score.score += self.config.pellet_score;
                self.events.push(GameEvent::PelletEaten { x: pos.x, y: pos.y });
            }
        }
    }

    fn start_frightened(&mut self) {
        self.scheduler.frighten(self.config.frightened_ms);
        self.score.combo_index = 0;
        for ghost in &mut self.ghosts {
            ghost.frighten();
        }
    }
}
