//! Puzzle engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable tube order
//! - No rendering or platform dependencies

pub mod detect;
pub mod palette;
pub mod session;
pub mod state;

pub use detect::{
    LossReason, StateHistory, Verdict, check_after_move, evaluate, has_any_legal_move,
    is_tube_complete, scan_for_completions, serialize_state,
};
pub use palette::{BORDER_PALETTE, BallColor, Rgb, generate_borders, generate_colors};
pub use session::{
    BallView, BoardView, GameEvent, Phase, Session, SoundCue, TapOutcome, TubeView,
};
pub use state::{Ball, Board, Level, Tube, create_balls};
