pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod ghost;
pub mod maze;
pub mod mode;
pub mod pathfinder;
pub mod rng;
pub mod targeting;
pub mod types;

pub use config::EngineConfig;
pub use engine::GameEngine;
pub use error::{ConfigError, EngineError, LayoutError};
pub use maze::{MazeGraph, MazeLayout};
