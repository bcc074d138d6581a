//! Ball Sort - a tube sorting puzzle
//!
//! Core modules:
//! - `sim`: Deterministic puzzle engine (board, moves, detection, session)
//! - `settings`: Level rule constants, loadable from JSON
//! - `audio`: Web Audio sound cues (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod settings;
pub mod sim;

pub use settings::{ConfigError, GameConfig};
pub use sim::{Session, TapOutcome, Verdict};

/// Game configuration constants
pub mod consts {
    /// Tube count of the first level (one tube starts empty)
    pub const INITIAL_TUBE_COUNT: usize = 4;
    /// Tube capacity of the first level
    pub const INITIAL_CAPACITY: usize = 8;
    /// Largest tube count; winning at this size wraps back to level 1
    pub const MAX_TUBE_COUNT: usize = 10;

    /// Pause between a terminal move and the level rebuild
    pub const OUTCOME_DELAY_MS: u32 = 400;

    /// Recent board states kept for repetition detection
    pub const HISTORY_LEN: usize = 10;
    /// Consecutive identical states that end the run
    pub const REPEAT_LIMIT: u32 = 2;
}
