use crate::constants::{AMBUSHER_LOOKAHEAD, FLANKER_PIVOT_LOOKAHEAD};
use crate::types::{Direction, Personality, TilePos};

/// World state the Chase heuristics read. `chaser` must already hold the
/// Chaser's position after its move in the current tick.
#[derive(Clone, Copy, Debug)]
pub struct TargetContext {
    pub player: TilePos,
    pub player_dir: Direction,
    pub chaser: TilePos,
}

/// Chase-mode target for a personality. May lie outside the grid.
pub fn chase_target(
    personality: Personality,
    ctx: &TargetContext,
    agent_pos: TilePos,
    home_corner: TilePos,
    shy_radius: f32,
) -> TilePos {
    match personality {
        Personality::Chaser => ctx.player,
        Personality::Ambusher => ctx.player.offset(ctx.player_dir, AMBUSHER_LOOKAHEAD),
        Personality::Flanker => {
            let pivot = ctx.player.offset(ctx.player_dir, FLANKER_PIVOT_LOOKAHEAD);
            pivot.scale(2) - ctx.chaser
        }
        Personality::Shy => {
            let radius_sq = (shy_radius * shy_radius) as f64;
            if agent_pos.distance_sq(ctx.player) as f64 > radius_sq {
                ctx.player
            } else {
                home_corner
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{chase_target, TargetContext};
    use crate::constants::SHY_RADIUS;
    use crate::types::{Direction, Personality, TilePos};

    fn ctx(player: TilePos, player_dir: Direction, chaser: TilePos) -> TargetContext {
        TargetContext {
            player,
            player_dir,
            chaser,
        }
    }

    const HOME: TilePos = TilePos::new(0, 30);

    #[test]
    fn chaser_targets_player_tile() {
        let c = ctx(TilePos::new(10, 12), Direction::Left, TilePos::new(1, 1));
        let target = chase_target(Personality::Chaser, &c, TilePos::new(3, 3), HOME, SHY_RADIUS);
        assert_eq!(target, TilePos::new(10, 12));
    }

    #[test]
    fn ambusher_leads_player_by_four_tiles() {
        let c = ctx(TilePos::new(10, 12), Direction::Up, TilePos::new(1, 1));
        let target =
            chase_target(Personality::Ambusher, &c, TilePos::new(3, 3), HOME, SHY_RADIUS);
        assert_eq!(target, TilePos::new(10, 8));

        let near_edge = ctx(TilePos::new(2, 5), Direction::Left, TilePos::new(1, 1));
        let target = chase_target(
            Personality::Ambusher,
            &near_edge,
            TilePos::new(3, 3),
            HOME,
            SHY_RADIUS,
        );
        assert_eq!(target, TilePos::new(-2, 5));
    }

    #[test]
    fn flanker_reflects_chaser_through_pivot() {
        // pivot = (10,12) + 2*Right = (12,12); target = 2*pivot - chaser
        let c = ctx(TilePos::new(10, 12), Direction::Right, TilePos::new(8, 9));
        let target =
            chase_target(Personality::Flanker, &c, TilePos::new(3, 3), HOME, SHY_RADIUS);
        assert_eq!(target, TilePos::new(16, 15));
    }

    #[test]
    fn flanker_tracks_chaser_position() {
        let player = TilePos::new(5, 5);
        let a = ctx(player, Direction::Down, TilePos::new(5, 1));
        let b = ctx(player, Direction::Down, TilePos::new(5, 2));
        let ta = chase_target(Personality::Flanker, &a, TilePos::new(0, 0), HOME, SHY_RADIUS);
        let tb = chase_target(Personality::Flanker, &b, TilePos::new(0, 0), HOME, SHY_RADIUS);
        assert_eq!(ta, TilePos::new(5, 13));
        assert_eq!(tb, TilePos::new(5, 12));
    }

    #[test]
    fn shy_chases_from_afar_and_retreats_up_close() {
        let c = ctx(TilePos::new(10, 10), Direction::Left, TilePos::new(1, 1));
        let far = chase_target(Personality::Shy, &c, TilePos::new(10, 19), HOME, SHY_RADIUS);
        assert_eq!(far, TilePos::new(10, 10));

        let exactly_eight = chase_target(Personality::Shy, &c, TilePos::new(10, 18), HOME, SHY_RADIUS);
        assert_eq!(exactly_eight, HOME);

        let near = chase_target(Personality::Shy, &c, TilePos::new(12, 12), HOME, SHY_RADIUS);
        assert_eq!(near, HOME);
    }
}
