//! Configuration module

mod engine;

pub use engine::{EngineConfig, EscapeMode, CONFIG_FILE};
