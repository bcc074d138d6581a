//! Completion and stalemate detection
//!
//! Run once after every applied move: lock solved tubes, record the board in
//! the repetition history, then decide whether the level is won, lost, or
//! still in play.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::state::{Board, Tube};
use crate::consts::HISTORY_LEN;

/// Why a level was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// No ordered pair of tubes admits a move
    NoLegalMoves,
    /// The same board came back too many times in a row
    Repetition,
}

/// Outcome of the post-move check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Continue,
    Win,
    Loss(LossReason),
}

impl Verdict {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Verdict::Continue)
    }
}

/// Full and single-colored
pub fn is_tube_complete(tube: &Tube) -> bool {
    let balls = tube.balls();
    let Some(first) = balls.first() else {
        return false;
    };
    balls.len() == tube.capacity() && balls.iter().all(|b| b.color == first.color)
}

/// Lock every complete tube. Returns how many tubes are complete.
pub fn scan_for_completions(board: &mut Board) -> usize {
    let mut complete = 0;
    for tube in board.tubes_mut() {
        if is_tube_complete(tube) {
            tube.lock();
            complete += 1;
        }
    }
    complete
}

pub fn has_any_legal_move(board: &Board) -> bool {
    let n = board.len();
    (0..n).any(|from| (0..n).any(|to| board.can_move(from, to)))
}

/// Canonical key of the board: color keys joined by `,` per tube, tubes
/// joined by `|`
pub fn serialize_state(board: &Board) -> String {
    board
        .tubes()
        .iter()
        .map(|tube| {
            tube.balls()
                .iter()
                .map(|b| b.color.key())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Bounded history of serialized boards plus the consecutive-repeat counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateHistory {
    states: VecDeque<String>,
    capacity: usize,
    repeats: u32,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::new(HISTORY_LEN)
    }
}

impl StateHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            states: VecDeque::with_capacity(capacity),
            capacity,
            repeats: 0,
        }
    }

    /// Push `state`, evicting the oldest entry past capacity. The repeat
    /// counter grows when `state` equals the previous entry and resets
    /// otherwise. Returns the counter.
    pub fn record(&mut self, state: String) -> u32 {
        if self.states.back() == Some(&state) {
            self.repeats += 1;
        } else {
            self.repeats = 0;
        }
        self.states.push_back(state);
        while self.states.len() > self.capacity {
            self.states.pop_front();
        }
        self.repeats
    }

    pub fn repeats(&self) -> u32 {
        self.repeats
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.states.back().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.states.clear();
        self.repeats = 0;
    }
}

/// Decide the verdict for `board` as it stands.
///
/// Win takes priority over both loss conditions.
pub fn evaluate(board: &Board, history: &StateHistory, repeat_limit: u32) -> Verdict {
    if board.locked_count() == board.len().saturating_sub(1) {
        Verdict::Win
    } else if !has_any_legal_move(board) {
        Verdict::Loss(LossReason::NoLegalMoves)
    } else if history.repeats() >= repeat_limit {
        Verdict::Loss(LossReason::Repetition)
    } else {
        Verdict::Continue
    }
}

/// Full post-move pass: lock, record, evaluate
pub fn check_after_move(
    board: &mut Board,
    history: &mut StateHistory,
    repeat_limit: u32,
) -> Verdict {
    let complete = scan_for_completions(board);
    let repeats = history.record(serialize_state(board));
    let verdict = evaluate(board, history, repeat_limit);
    log::debug!(
        "check: complete={} repeats={} verdict={:?}",
        complete,
        repeats,
        verdict
    );
    verdict
}
