use std::collections::{HashMap, VecDeque};

use crate::maze::MazeGraph;
use crate::types::{Direction, TilePos};

/// Moves available from `from`, as (direction, landing tile), in priority
/// order. Reversing `heading` is only allowed when it is the sole way out.
pub fn candidate_moves(
    graph: &MazeGraph,
    from: TilePos,
    heading: Direction,
) -> Vec<(Direction, TilePos)> {
    let all: Vec<(Direction, TilePos)> = Direction::PRIORITY
        .iter()
        .filter_map(|&dir| graph.step(from, dir).map(|landing| (dir, landing)))
        .collect();
    if all.len() <= 1 {
        return all;
    }
    let reverse = heading.reverse();
    all.into_iter().filter(|(dir, _)| *dir != reverse).collect()
}

#[derive(Clone, Copy, Debug)]
struct Discovery {
    first_step: Direction,
    depth: u32,
}

/// Next direction along a shortest path from `from` to `to`.
///
/// Every tile found by the breadth-first search carries the first step
/// that reached it. Candidates are seeded in `Direction::PRIORITY` order,
/// so each level of the queue stays sorted by that priority and a tile's
/// label is the best-ranked first step among all of its shortest paths.
///
/// Targets off the graph (walls, outside the grid) steer toward the
/// discovered tile nearest to them. An unreachable target keeps `heading`.
pub fn next_step(graph: &MazeGraph, from: TilePos, to: TilePos, heading: Direction) -> Direction {
    if !graph.is_walkable(from) {
        tracing::warn!(?from, ?to, "pathfinder start is not walkable; holding heading");
        return heading;
    }
    let candidates = candidate_moves(graph, from, heading);
    if candidates.is_empty() {
        tracing::warn!(?from, ?to, "no moves from start; holding heading");
        return heading;
    }
    let reverse_excluded = candidates.len() < graph.neighbors(from).len();

    let mut found: HashMap<TilePos, Discovery> = HashMap::new();
    let mut order: Vec<TilePos> = Vec::new();
    let mut queue = VecDeque::new();
    found.insert(
        from,
        Discovery {
            first_step: heading,
            depth: 0,
        },
    );

    for (dir, landing) in candidates {
        let entered = from + dir.delta();
        let label = Discovery {
            first_step: dir,
            depth: 1,
        };
        if entered != landing && !found.contains_key(&entered) {
            found.insert(entered, label);
            order.push(entered);
        }
        if !found.contains_key(&landing) {
            found.insert(landing, label);
            order.push(landing);
            queue.push_back(landing);
        }
    }

    while let Some(pos) = queue.pop_front() {
        if found.contains_key(&to) {
            break;
        }
        let Some(parent) = found.get(&pos).copied() else {
            continue;
        };
        let label = Discovery {
            first_step: parent.first_step,
            depth: parent.depth + 1,
        };
        for (_, entered) in graph.neighbors(pos) {
            let landing = graph.tunnel_pair(entered).unwrap_or(entered);
            if entered != landing && !found.contains_key(&entered) {
                found.insert(entered, label);
                order.push(entered);
            }
            if !found.contains_key(&landing) {
                found.insert(landing, label);
                order.push(landing);
                queue.push_back(landing);
            }
        }
    }

    if to != from {
        if let Some(hit) = found.get(&to) {
            return hit.first_step;
        }
        if graph.is_walkable(to) && !reverse_excluded {
            tracing::warn!(?from, ?to, "target unreachable; holding heading");
            return heading;
        }
    }

    let mut best: Option<(i64, u32, Direction)> = None;
    for pos in &order {
        let Some(hit) = found.get(pos) else {
            continue;
        };
        let key = (pos.distance_sq(to), hit.depth);
        let better = match best {
            None => true,
            Some((dist, depth, _)) => key < (dist, depth),
        };
        if better {
            best = Some((key.0, key.1, hit.first_step));
        }
    }
    best.map(|(_, _, dir)| dir).unwrap_or(heading)
}

pub fn distance_map(graph: &MazeGraph, start: TilePos) -> HashMap<TilePos, u32> {
    let mut dist = HashMap::new();
    if !graph.is_walkable(start) {
        return dist;
    }
    let mut queue = VecDeque::new();
    dist.insert(start, 0);
    queue.push_back(start);
    while let Some(pos) = queue.pop_front() {
        let base = dist.get(&pos).copied().unwrap_or(0);
        for dir in Direction::PRIORITY {
            let Some(next) = graph.step(pos, dir) else {
                continue;
            };
            if !dist.contains_key(&next) {
                dist.insert(next, base + 1);
                queue.push_back(next);
            }
        }
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::{candidate_moves, distance_map, next_step};
    use crate::maze::tests::{graph_from, TUNNEL_MAZE};
    use crate::maze::{default_home_corners, MazeGraph, MazeLayout};
    use crate::types::{Direction, TileKind, TilePos};

    const CORRIDOR: [&str; 3] = ["#########", "#PCAFS..#", "#########"];

    const ROOM: [&str; 7] = [
        "#######",
        "#.....#",
        "#.....#",
        "#..P..#",
        "#.....#",
        "#CAFS.#",
        "#######",
    ];

    #[test]
    fn corridor_step_reduces_manhattan_distance() {
        let graph = graph_from(&CORRIDOR);
        let from = TilePos::new(4, 1);
        for (target, heading) in [
            (TilePos::new(7, 1), Direction::Right),
            (TilePos::new(1, 1), Direction::Left),
            (TilePos::new(6, 1), Direction::Up),
        ] {
            let dir = next_step(&graph, from, target, heading);
            let next = graph.step(from, dir).expect("move stays in corridor");
            assert!(next.manhattan(target) < from.manhattan(target));
        }
    }

    #[test]
    fn target_behind_heading_is_not_reached_by_reversing() {
        let graph = graph_from(&CORRIDOR);
        let behind = TilePos::new(1, 1);
        assert_eq!(
            next_step(&graph, TilePos::new(4, 1), behind, Direction::Right),
            Direction::Right
        );
        assert_eq!(
            next_step(&graph, TilePos::new(7, 1), behind, Direction::Right),
            Direction::Left
        );
    }

    #[test]
    fn equal_routes_break_ties_up_left_down_right() {
        let graph = graph_from(&ROOM);
        let center = TilePos::new(3, 3);
        assert_eq!(
            next_step(&graph, center, TilePos::new(2, 2), Direction::Up),
            Direction::Up
        );
        assert_eq!(
            next_step(&graph, center, TilePos::new(2, 4), Direction::Left),
            Direction::Left
        );
        assert_eq!(
            next_step(&graph, center, TilePos::new(4, 4), Direction::Right),
            Direction::Down
        );
        assert_eq!(
            next_step(&graph, center, TilePos::new(4, 4), Direction::Up),
            Direction::Right
        );
    }

    #[test]
    fn reverse_heading_is_excluded_when_alternatives_exist() {
        let graph = graph_from(&ROOM);
        let center = TilePos::new(3, 3);
        let moves = candidate_moves(&graph, center, Direction::Up);
        assert!(moves.iter().all(|(dir, _)| *dir != Direction::Down));
        assert_eq!(moves.len(), 3);
        assert_ne!(
            next_step(&graph, center, TilePos::new(3, 5), Direction::Up),
            Direction::Down
        );
    }

    #[test]
    fn dead_end_allows_reversal() {
        let graph = graph_from(&CORRIDOR);
        let end = TilePos::new(7, 1);
        let moves = candidate_moves(&graph, end, Direction::Right);
        assert_eq!(moves, vec![(Direction::Left, TilePos::new(6, 1))]);
        assert_eq!(
            next_step(&graph, end, TilePos::new(1, 1), Direction::Right),
            Direction::Left
        );
    }

    #[test]
    fn shortest_route_goes_through_tunnel() {
        let graph = graph_from(&TUNNEL_MAZE);
        let dir = next_step(&graph, TilePos::new(1, 2), TilePos::new(7, 2), Direction::Up);
        assert_eq!(dir, Direction::Left);
    }

    #[test]
    fn out_of_grid_target_biases_direction() {
        let graph = graph_from(&ROOM);
        let center = TilePos::new(3, 3);
        assert_eq!(
            next_step(&graph, center, TilePos::new(3, -10), Direction::Up),
            Direction::Up
        );
        assert_eq!(
            next_step(&graph, center, TilePos::new(-10, 3), Direction::Up),
            Direction::Left
        );
        assert_eq!(
            next_step(&graph, center, TilePos::new(40, 3), Direction::Up),
            Direction::Right
        );
    }

    #[test]
    fn unwalkable_start_keeps_current_heading() {
        let mut tiles = vec![TileKind::Wall; 15];
        tiles[1 * 3 + 1] = TileKind::Open;
        tiles[2 * 3 + 1] = TileKind::Open;
        let graph = MazeGraph::new(MazeLayout {
            width: 3,
            height: 5,
            tiles,
            tunnels: Vec::new(),
            player_spawn: TilePos::new(1, 1),
            ghost_spawns: [TilePos::new(1, 2); 4],
            home_corners: default_home_corners(3, 5),
        })
        .expect("two-tile layout is valid");

        let chaser = TilePos::new(1, 3);
        assert_eq!(graph.kind(chaser), TileKind::Wall);
        for heading in Direction::PRIORITY {
            assert_eq!(
                next_step(&graph, chaser, TilePos::new(1, 1), heading),
                heading
            );
        }
    }

    #[test]
    fn distance_map_counts_tunnel_jumps() {
        let graph = graph_from(&TUNNEL_MAZE);
        let dist = distance_map(&graph, TilePos::new(1, 2));
        assert_eq!(dist.get(&TilePos::new(8, 2)), Some(&1));
        assert_eq!(dist.get(&TilePos::new(7, 2)), Some(&2));
        assert_eq!(dist.get(&TilePos::new(4, 2)), Some(&3));
    }
}
