use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::error::LayoutError;
use crate::types::{Direction, Personality, TileKind, TilePos};

#[derive(Clone, Debug)]
pub struct MazeLayout {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<TileKind>,
    pub tunnels: Vec<(TilePos, TilePos)>,
    pub player_spawn: TilePos,
    pub ghost_spawns: [TilePos; 4],
    pub home_corners: [TilePos; 4],
}

impl MazeLayout {
    /// Parses ASCII rows: `#` wall, `.` pellet, `o` power pellet, space open,
    /// `T` tunnel, `P` player spawn, `C`/`A`/`F`/`S` ghost spawns.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        let height = rows.len();
        let width = rows.first().map(|row| row.as_ref().chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(LayoutError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * height);
        let mut player_spawn = None;
        let mut ghost_spawns: [Option<TilePos>; 4] = [None; 4];
        let mut tunnels_by_row: BTreeMap<i32, Vec<i32>> = BTreeMap::new();

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(LayoutError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let pos = TilePos::new(x as i32, y as i32);
                let kind = match glyph {
                    '#' => TileKind::Wall,
                    '.' => TileKind::Pellet,
                    'o' => TileKind::PowerPellet,
                    ' ' => TileKind::Open,
                    'T' => {
                        tunnels_by_row.entry(pos.y).or_default().push(pos.x);
                        TileKind::Tunnel
                    }
                    'P' => {
                        player_spawn = Some(pos);
                        TileKind::Open
                    }
                    'C' | 'A' | 'F' | 'S' => {
                        let personality = match glyph {
                            'C' => Personality::Chaser,
                            'A' => Personality::Ambusher,
                            'F' => Personality::Flanker,
                            _ => Personality::Shy,
                        };
                        ghost_spawns[personality.index()] = Some(pos);
                        TileKind::Open
                    }
                    _ => {
                        return Err(LayoutError::UnknownGlyph {
                            glyph,
                            x: pos.x,
                            y: pos.y,
                        })
                    }
                };
                tiles.push(kind);
            }
        }

        let mut tunnels = Vec::new();
        for (y, mut xs) in tunnels_by_row {
            xs.sort_unstable();
            if xs.len() % 2 == 1 {
                return Err(LayoutError::UnpairedTunnel {
                    x: xs[xs.len() / 2],
                    y,
                });
            }
            for i in 0..xs.len() / 2 {
                tunnels.push((
                    TilePos::new(xs[i], y),
                    TilePos::new(xs[xs.len() - 1 - i], y),
                ));
            }
        }

        let player_spawn = player_spawn.ok_or(LayoutError::MissingSpawn("player"))?;
        let mut spawns = [TilePos::new(0, 0); 4];
        for personality in Personality::ALL {
            spawns[personality.index()] = ghost_spawns[personality.index()]
                .ok_or(LayoutError::MissingSpawn(ghost_label(personality)))?;
        }

        let width = width as i32;
        let height = height as i32;
        Ok(Self {
            width,
            height,
            tiles,
            tunnels,
            player_spawn,
            ghost_spawns: spawns,
            home_corners: default_home_corners(width, height),
        })
    }
}

/// Built-in 19x19 board with a side tunnel and a three-tile ghost house.
pub const DEFAULT_LAYOUT: [&str; 19] = [
    "###################",
    "#o.......#.......o#",
    "#.##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.###.#.###.####",
    "####.#...C...#.####",
    "T......##A##......T",
    "####.#.#F S#.#.####",
    "####.#.#####.#.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#.....P.....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

/// Chaser top-right, Ambusher top-left, Flanker bottom-right, Shy bottom-left.
pub fn default_home_corners(width: i32, height: i32) -> [TilePos; 4] {
    [
        TilePos::new(width - 1, 0),
        TilePos::new(0, 0),
        TilePos::new(width - 1, height - 1),
        TilePos::new(0, height - 1),
    ]
}

fn ghost_label(personality: Personality) -> &'static str {
    match personality {
        Personality::Chaser => "chaser",
        Personality::Ambusher => "ambusher",
        Personality::Flanker => "flanker",
        Personality::Shy => "shy",
    }
}

#[derive(Clone, Debug)]
pub struct MazeGraph {
    width: i32,
    height: i32,
    kinds: Vec<TileKind>,
    tunnel_pairs: HashMap<TilePos, TilePos>,
    player_spawn: TilePos,
    ghost_spawns: [TilePos; 4],
    home_corners: [TilePos; 4],
}

impl MazeGraph {
    pub fn new(layout: MazeLayout) -> Result<Self, LayoutError> {
        if layout.width <= 0 || layout.height <= 0 {
            return Err(LayoutError::Empty);
        }
        let found = layout.tiles.len();
        let expected = layout
            .width
            .checked_mul(layout.height)
            .map(|n| n as usize)
            .ok_or(LayoutError::SizeMismatch {
                expected: usize::MAX,
                found,
            })?;
        if found != expected {
            return Err(LayoutError::SizeMismatch { expected, found });
        }

        let mut graph = Self {
            width: layout.width,
            height: layout.height,
            kinds: layout.tiles,
            tunnel_pairs: HashMap::new(),
            player_spawn: layout.player_spawn,
            ghost_spawns: layout.ghost_spawns,
            home_corners: layout.home_corners,
        };

        for (a, b) in layout.tunnels {
            for end in [a, b] {
                if !graph.is_tunnel(end) || a == b || graph.tunnel_pairs.contains_key(&end) {
                    return Err(LayoutError::UnpairedTunnel { x: end.x, y: end.y });
                }
            }
            graph.tunnel_pairs.insert(a, b);
            graph.tunnel_pairs.insert(b, a);
        }

        graph.validate()?;
        Ok(graph)
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if !self.is_walkable(self.player_spawn) {
            return Err(LayoutError::SpawnOnWall {
                what: "player",
                x: self.player_spawn.x,
                y: self.player_spawn.y,
            });
        }
        for personality in Personality::ALL {
            let spawn = self.ghost_spawn(personality);
            if !self.is_walkable(spawn) {
                return Err(LayoutError::SpawnOnWall {
                    what: ghost_label(personality),
                    x: spawn.x,
                    y: spawn.y,
                });
            }
        }

        for pos in self.walkable_tiles() {
            if self.is_tunnel(pos) && !self.tunnel_pairs.contains_key(&pos) {
                return Err(LayoutError::UnpairedTunnel { x: pos.x, y: pos.y });
            }
            if self.neighbors(pos).is_empty() && !self.tunnel_pairs.contains_key(&pos) {
                return Err(LayoutError::IsolatedTile { x: pos.x, y: pos.y });
            }
        }

        let reached = self.reachable_from(self.player_spawn);
        if let Some(pos) = self.walkable_tiles().find(|pos| !reached.contains(pos)) {
            return Err(LayoutError::Unreachable { x: pos.x, y: pos.y });
        }
        Ok(())
    }

    fn reachable_from(&self, start: TilePos) -> HashSet<TilePos> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(pos) = queue.pop_front() {
            for (_, entered) in self.neighbors(pos) {
                let landing = self.tunnel_pair(entered).unwrap_or(entered);
                if landing != entered {
                    seen.insert(entered);
                }
                if seen.insert(landing) {
                    queue.push_back(landing);
                }
            }
        }
        seen
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn kind(&self, pos: TilePos) -> TileKind {
        if !self.in_bounds(pos) {
            return TileKind::Wall;
        }
        self.kinds[(pos.y * self.width + pos.x) as usize]
    }

    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.kind(pos).is_walkable()
    }

    pub fn is_tunnel(&self, pos: TilePos) -> bool {
        self.kind(pos) == TileKind::Tunnel
    }

    pub fn tunnel_pair(&self, pos: TilePos) -> Option<TilePos> {
        self.tunnel_pairs.get(&pos).copied()
    }

    pub fn neighbors(&self, pos: TilePos) -> Vec<(Direction, TilePos)> {
        Direction::PRIORITY
            .iter()
            .map(|&dir| (dir, pos + dir.delta()))
            .filter(|&(_, next)| self.is_walkable(next))
            .collect()
    }

    pub fn step(&self, pos: TilePos, dir: Direction) -> Option<TilePos> {
        let next = pos + dir.delta();
        if !self.is_walkable(next) {
            return None;
        }
        Some(self.tunnel_pair(next).unwrap_or(next))
    }

    pub fn walkable_tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        self.tiles()
            .filter(|(_, kind)| kind.is_walkable())
            .map(|(pos, _)| pos)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (TilePos, TileKind)> + '_ {
        let width = self.width;
        self.kinds.iter().enumerate().map(move |(idx, kind)| {
            let idx = idx as i32;
            (TilePos::new(idx % width, idx / width), *kind)
        })
    }

    pub fn player_spawn(&self) -> TilePos {
        self.player_spawn
    }

    pub fn ghost_spawn(&self, personality: Personality) -> TilePos {
        self.ghost_spawns[personality.index()]
    }

    pub fn home_corner(&self, personality: Personality) -> TilePos {
        self.home_corners[personality.index()]
    }
}
