use chrono::Utc;
use clap::Parser;
use maze_chase_engine::config::EngineConfig;
use maze_chase_engine::engine::GameEngine;
use maze_chase_engine::error::{ConfigError, EngineError, LayoutError};
use maze_chase_engine::maze::{MazeLayout, DEFAULT_LAYOUT};
use maze_chase_engine::pathfinder::distance_map;
use maze_chase_engine::types::{Direction, EngineSnapshot, GameEvent, TilePos};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    layout: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 6_000)]
    max_ticks: u64,
    #[arg(long)]
    lives: Option<u32>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum SetupError {
    #[error("failed to read layout {path}: {source}")]
    LayoutRead {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Clone, Debug, Default, Serialize)]
struct EventTally {
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: u32,
    #[serde(rename = "powerPelletsEaten")]
    power_pellets_eaten: u32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    #[serde(rename = "levelsCompleted")]
    levels_completed: u32,
}

impl EventTally {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::PelletEaten { .. } => self.pellets_eaten += 1,
            GameEvent::PowerPelletEaten { .. } => self.power_pellets_eaten += 1,
            GameEvent::GhostEaten { .. } => self.ghosts_eaten += 1,
            GameEvent::LifeLost { .. } => self.lives_lost += 1,
            GameEvent::LevelComplete { .. } => self.levels_completed += 1,
            GameEvent::GameOver { .. } => {}
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    #[serde(rename = "runId")]
    run_id: String,
    seed: u32,
    score: u32,
    level: u32,
    #[serde(rename = "livesLeft")]
    lives_left: u32,
    ticks: u64,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    #[serde(rename = "gameOver")]
    game_over: bool,
    #[serde(flatten)]
    tally: EventTally,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct RunOutcome {
    #[serde(flatten)]
    result: RunResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    #[serde(rename = "finalSnapshot")]
    final_snapshot: EngineSnapshot,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(flatten)]
    outcome: RunOutcome,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: i64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed, Utc::now().timestamp_millis()));

    let mut engine = match build_engine(&cli, seed) {
        Ok(engine) => engine,
        Err(error) => {
            emit_log(
                "error",
                "setup_failed",
                &run_id,
                Some(seed),
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    emit_log(
        "info",
        "run_started",
        &run_id,
        Some(seed),
        None,
        json!({
            "maxTicks": cli.max_ticks,
            "lives": engine.score().lives,
            "layout": cli.layout.as_ref().map(|path| path.to_string_lossy().to_string()),
        }),
    );

    let outcome = run_game(&mut engine, &run_id, seed, cli.max_ticks);
    for anomaly in &outcome.anomaly_records {
        emit_log(
            "warn",
            "anomaly_detected",
            &run_id,
            Some(seed),
            Some(anomaly.tick),
            json!({ "message": anomaly.message }),
        );
    }

    match serde_json::to_string(&outcome.result) {
        Ok(line) => println!("{line}"),
        Err(error) => {
            emit_log(
                "error",
                "result_serialize_failed",
                &run_id,
                Some(seed),
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    }

    let has_anomaly = !outcome.result.anomalies.is_empty();
    let finished_tick = outcome.result.ticks;
    let score = outcome.result.score;
    let summary = RunSummary {
        finished_at: Utc::now().to_rfc3339(),
        outcome,
    };

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                Some(seed),
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        Some(seed),
        Some(finished_tick),
        json!({
            "score": score,
            "anomalyCount": summary.outcome.anomaly_records.len(),
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn build_engine(cli: &Cli, seed: u32) -> Result<GameEngine, SetupError> {
    let layout = match cli.layout.as_ref() {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| SetupError::LayoutRead {
                path: path.to_string_lossy().to_string(),
                source,
            })?;
            let rows: Vec<&str> = text.lines().filter(|line| !line.is_empty()).collect();
            MazeLayout::parse(&rows)?
        }
        None => MazeLayout::parse(&DEFAULT_LAYOUT)?,
    };
    let mut config = match cli.config.as_ref() {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(lives) = cli.lives {
        config.starting_lives = lives;
    }
    Ok(GameEngine::new(layout, config, seed)?)
}

fn run_game(engine: &mut GameEngine, run_id: &str, seed: u32, max_ticks: u64) -> RunOutcome {
    let tick_ms = engine.config.tick_ms();
    let starting_lives = engine.score().lives;
    let mut tally = EventTally::default();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_score = 0;

    while !engine.is_ended() && engine.tick_count() < max_ticks {
        if let Some((dir, pos)) = choose_player_move(engine) {
            engine.set_player(pos, dir);
        }
        engine.tick(tick_ms);
        let snapshot = engine.build_snapshot(true);

        let mut messages = collect_snapshot_anomalies(engine, &snapshot, starting_lives);
        if snapshot.score < last_score {
            messages.push(format!("score went down: {last_score} -> {}", snapshot.score));
        }
        last_score = snapshot.score;
        for message in messages {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }

        for event in &snapshot.events {
            tally.record(event);
            if let GameEvent::LevelComplete { level } = event {
                emit_log(
                    "info",
                    "level_complete",
                    run_id,
                    Some(seed),
                    Some(snapshot.tick),
                    json!({ "level": level, "score": snapshot.score }),
                );
            }
        }
    }

    let summary = engine.build_summary();
    RunOutcome {
        result: RunResultLine {
            run_id: run_id.to_string(),
            seed,
            score: summary.score,
            level: summary.level,
            lives_left: summary.lives_left,
            ticks: summary.ticks,
            duration_ms: summary.duration_ms,
            game_over: summary.game_over,
            tally,
            anomalies,
        },
        anomaly_records,
        final_snapshot: engine.build_snapshot(false),
    }
}

/// Greedy player: grab adjacent frightened agents, keep one tile away from
/// live ones, otherwise head for the nearest pellet.
fn choose_player_move(engine: &GameEngine) -> Option<(Direction, TilePos)> {
    let graph = engine.graph();
    let player = engine.player();
    let options: Vec<(Direction, TilePos)> = Direction::PRIORITY
        .iter()
        .filter_map(|&dir| graph.step(player.pos, dir).map(|pos| (dir, pos)))
        .collect();

    let threats: Vec<TilePos> = engine
        .ghosts()
        .iter()
        .filter(|ghost| !ghost.is_dead() && !ghost.is_frightened())
        .map(|ghost| ghost.pos)
        .collect();
    let prey: Vec<TilePos> = engine
        .ghosts()
        .iter()
        .filter(|ghost| ghost.is_frightened())
        .map(|ghost| ghost.pos)
        .collect();

    if let Some(step) = options.iter().copied().find(|(_, pos)| prey.contains(pos)) {
        return Some(step);
    }

    let closest_threat = |pos: TilePos| {
        threats
            .iter()
            .map(|threat| threat.manhattan(pos))
            .min()
            .unwrap_or(i32::MAX)
    };
    let safe: Vec<(Direction, TilePos)> = options
        .iter()
        .copied()
        .filter(|(_, pos)| closest_threat(*pos) > 1)
        .collect();
    if safe.is_empty() {
        return options
            .into_iter()
            .max_by_key(|(_, pos)| closest_threat(*pos));
    }
    safe.into_iter()
        .min_by_key(|(_, pos)| nearest_pellet_distance(engine, *pos))
}

fn nearest_pellet_distance(engine: &GameEngine, from: TilePos) -> u32 {
    if engine.tile_at(from).is_edible() {
        return 0;
    }
    distance_map(engine.graph(), from)
        .into_iter()
        .filter(|(pos, _)| engine.tile_at(*pos).is_edible())
        .map(|(_, dist)| dist)
        .min()
        .unwrap_or(u32::MAX)
}

fn collect_snapshot_anomalies(
    engine: &GameEngine,
    snapshot: &EngineSnapshot,
    starting_lives: u32,
) -> Vec<String> {
    let graph = engine.graph();
    let mut anomalies = Vec::new();

    for ghost in &snapshot.ghosts {
        let pos = TilePos::new(ghost.x, ghost.y);
        if !graph.is_walkable(pos) {
            anomalies.push(format!("{:?} on non-walkable tile ({}, {})", ghost.id, ghost.x, ghost.y));
        }
    }
    if !graph.is_walkable(TilePos::new(snapshot.player.x, snapshot.player.y)) {
        anomalies.push(format!(
            "player on non-walkable tile ({}, {})",
            snapshot.player.x, snapshot.player.y
        ));
    }

    let on_board = graph
        .walkable_tiles()
        .filter(|pos| engine.tile_at(*pos).is_edible())
        .count();
    if on_board != snapshot.pellets_remaining {
        anomalies.push(format!(
            "pellet count mismatch: counter {} board {on_board}",
            snapshot.pellets_remaining
        ));
    }

    if snapshot.lives > starting_lives {
        anomalies.push(format!("lives above start: {}", snapshot.lives));
    }
    if snapshot.frightened_remaining_ms > engine.config.frightened_ms {
        anomalies.push(format!(
            "frightened timer out of range: {}",
            snapshot.frightened_remaining_ms
        ));
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: Utc::now().timestamp_millis(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        seed,
        tick,
        details,
    };
    if let Ok(text) = serde_json::to_string(&log_line) {
        eprintln!("{text}");
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_engine(seed: u32) -> GameEngine {
        let layout = MazeLayout::parse(&DEFAULT_LAYOUT).expect("built-in layout parses");
        GameEngine::new(layout, EngineConfig::default(), seed).expect("engine builds")
    }

    #[test]
    fn default_run_id_contains_seed_and_timestamp() {
        assert_eq!(default_run_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn tally_counts_each_event_kind() {
        let mut tally = EventTally::default();
        for event in [
            GameEvent::PelletEaten { x: 1, y: 1 },
            GameEvent::PelletEaten { x: 2, y: 1 },
            GameEvent::PowerPelletEaten { x: 1, y: 2 },
            GameEvent::LifeLost { lives_left: 2 },
            GameEvent::LevelComplete { level: 1 },
            GameEvent::GameOver { score: 10 },
        ] {
            tally.record(&event);
        }
        assert_eq!(tally.pellets_eaten, 2);
        assert_eq!(tally.power_pellets_eaten, 1);
        assert_eq!(tally.lives_lost, 1);
        assert_eq!(tally.levels_completed, 1);
        assert_eq!(tally.ghosts_eaten, 0);
    }

    #[test]
    fn scripted_player_heads_for_pellets() {
        let engine = default_engine(1);
        let (_, next) = choose_player_move(&engine).expect("spawn has exits");
        assert!(engine.graph().is_walkable(next));
        assert!(engine.tile_at(next).is_edible());
    }

    #[test]
    fn short_run_reports_no_anomalies() {
        let mut engine = default_engine(7);
        let outcome = run_game(&mut engine, "sim-test", 7, 400);
        assert!(outcome.result.anomalies.is_empty(), "{:?}", outcome.result.anomalies);
        assert!(outcome.result.ticks <= 400);
        assert!(outcome.result.tally.pellets_eaten > 0);
        assert_eq!(outcome.result.score, outcome.final_snapshot.score);
    }

    #[test]
    fn setup_errors_surface_bad_config() {
        let cli = Cli {
            seed: Some(1),
            layout: None,
            config: Some(std::env::temp_dir().join("maze-chase-missing-config.json")),
            max_ticks: 10,
            lives: None,
            run_id: None,
            summary_out: None,
        };
        assert!(matches!(
            build_engine(&cli, 1),
            Err(SetupError::Config(ConfigError::Io(_)))
        ));
    }

    #[test]
    fn lives_flag_overrides_config() {
        let cli = Cli {
            seed: Some(1),
            layout: None,
            config: None,
            max_ticks: 10,
            lives: Some(5),
            run_id: None,
            summary_out: None,
        };
        let engine = build_engine(&cli, 1).expect("engine builds");
        assert_eq!(engine.score().lives, 5);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let mut engine = default_engine(3);
        let outcome = run_game(&mut engine, "sim-3-1", 3, 5);
        let summary = RunSummary {
            finished_at: Utc::now().to_rfc3339(),
            outcome,
        };
        let target = std::env::temp_dir()
            .join(format!("maze-chase-missing-{}", Utc::now().timestamp_millis()))
            .join("summary.json");
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut records, &mut seen, 10, "same anomaly".to_string());
        push_anomaly(&mut anomalies, &mut records, &mut seen, 11, "same anomaly".to_string());

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tick, 10);
        assert_eq!(records[1].tick, 11);
    }
}
