//! Session controller
//!
//! Owns the board, score, level, selection and repetition history. Front
//! ends feed it tube taps and drain [`GameEvent`]s back out. A terminal move
//! leaves the session in a pending phase that ignores taps until the front
//! end calls [`Session::resolve_pending`] (after its presentation delay).

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::detect::{LossReason, StateHistory, Verdict, check_after_move};
use super::state::{Board, Level};
use crate::settings::{ConfigError, GameConfig};

/// Controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Playing,
    /// Level solved, waiting to advance
    WinPending,
    /// Run lost, waiting to reset
    LossPending(LossReason),
}

/// Sounds the front end may play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Select,
    Move,
    Reject,
    TubeLocked,
    Win,
    Loss,
}

/// Notifications for the view layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Tube contents or locks changed; re-render
    BoardChanged,
    SelectionChanged(Option<usize>),
    ScoreChanged(u32),
    LevelChanged(Level),
    PlaySound(SoundCue),
    ShowWinMessage,
    ShowLossMessage(LossReason),
}

/// Result of one tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Nothing happened (pending outcome, locked or empty tube, bad index)
    Ignored,
    Selected(usize),
    Deselected(usize),
    /// Move refused; selection cleared
    Rejected { from: usize, to: usize },
    Moved {
        from: usize,
        to: usize,
        verdict: Verdict,
    },
}

/// One ball as the view should draw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallView {
    pub fill: String,
    pub border: String,
}

/// One tube as the view should draw it (balls bottom to top)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TubeView {
    pub balls: Vec<BallView>,
    pub capacity: usize,
    pub locked: bool,
    pub selected: bool,
}

/// Render snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub tubes: Vec<TubeView>,
    pub score: u32,
    pub level: Level,
    pub input_locked: bool,
}

/// A single run of the puzzle
#[derive(Debug, Clone)]
pub struct Session {
    config: GameConfig,
    rng: Pcg32,
    score: u32,
    level: Level,
    board: Board,
    history: StateHistory,
    selected: Option<usize>,
    phase: Phase,
    events: Vec<GameEvent>,
}

impl Session {
    /// Start at level 1 with a board shuffled from `seed`. Fails if `config`
    /// does not validate.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let level = config.initial_level();
        let board = Board::generate(level, &mut rng);
        log::info!(
            "New session (seed {}): {} tubes x {}",
            seed,
            level.tube_count,
            level.capacity
        );
        Ok(Self::assemble(config, rng, level, board))
    }

    /// Start from a prepared board; the level is read off the board.
    ///
    /// Later levels are still generated from `seed`.
    pub fn from_board(config: GameConfig, seed: u64, board: Board) -> Result<Self, ConfigError> {
        config.validate()?;
        let capacity = board.tubes().first().map_or(0, |t| t.capacity());
        let level = Level::new(board.len(), capacity);
        Ok(Self::assemble(config, Pcg32::seed_from_u64(seed), level, board))
    }

    fn assemble(config: GameConfig, rng: Pcg32, level: Level, board: Board) -> Self {
        let history = StateHistory::new(config.history_len);
        Self {
            config,
            rng,
            score: 0,
            level,
            board,
            history,
            selected: None,
            phase: Phase::Playing,
            events: vec![
                GameEvent::LevelChanged(level),
                GameEvent::ScoreChanged(0),
                GameEvent::BoardChanged,
            ],
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a terminal outcome waits to be resolved
    pub fn is_input_locked(&self) -> bool {
        self.phase != Phase::Playing
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Handle a tap on tube `index`
    pub fn handle_tube_selected(&mut self, index: usize) -> TapOutcome {
        if self.is_input_locked() {
            return TapOutcome::Ignored;
        }
        let Some(tube) = self.board.tube(index) else {
            return TapOutcome::Ignored;
        };
        if tube.is_locked() {
            return TapOutcome::Ignored;
        }

        let Some(from) = self.selected else {
            if tube.is_empty() {
                return TapOutcome::Ignored;
            }
            self.set_selection(Some(index));
            self.events.push(GameEvent::PlaySound(SoundCue::Select));
            return TapOutcome::Selected(index);
        };

        if from == index {
            self.set_selection(None);
            return TapOutcome::Deselected(index);
        }

        self.set_selection(None);
        if !self.board.apply_move(from, index) {
            log::debug!("Rejected move {} -> {}", from, index);
            self.events.push(GameEvent::PlaySound(SoundCue::Reject));
            return TapOutcome::Rejected { from, to: index };
        }
        log::debug!("Moved {} -> {}", from, index);

        let locked_before = self.board.locked_count();
        let verdict =
            check_after_move(&mut self.board, &mut self.history, self.config.repeat_limit);
        self.events.push(GameEvent::BoardChanged);
        if self.board.locked_count() > locked_before {
            self.events.push(GameEvent::PlaySound(SoundCue::TubeLocked));
        } else {
            self.events.push(GameEvent::PlaySound(SoundCue::Move));
        }

        match verdict {
            Verdict::Continue => {}
            Verdict::Win => {
                log::info!("Level solved ({} tubes)", self.level.tube_count);
                self.phase = Phase::WinPending;
                self.events.push(GameEvent::PlaySound(SoundCue::Win));
            }
            Verdict::Loss(reason) => {
                log::info!("Run lost: {:?}", reason);
                self.phase = Phase::LossPending(reason);
                self.events.push(GameEvent::PlaySound(SoundCue::Loss));
            }
        }

        TapOutcome::Moved {
            from,
            to: index,
            verdict,
        }
    }

    /// Carry out a pending win or loss. Returns the verdict that was
    /// resolved, `None` when nothing was pending.
    pub fn resolve_pending(&mut self) -> Option<Verdict> {
        match self.phase {
            Phase::Playing => None,
            Phase::WinPending => {
                self.score += 1;
                match self.level.next(self.config.max_tube_count) {
                    Some(next) => self.level = next,
                    None => {
                        log::info!("Top level cleared, starting over");
                        self.level = self.config.initial_level();
                        self.score = 0;
                    }
                }
                self.events.push(GameEvent::ShowWinMessage);
                self.events.push(GameEvent::ScoreChanged(self.score));
                self.events.push(GameEvent::LevelChanged(self.level));
                self.rebuild_board();
                Some(Verdict::Win)
            }
            Phase::LossPending(reason) => {
                self.events.push(GameEvent::ShowLossMessage(reason));
                self.reset_game();
                Some(Verdict::Loss(reason))
            }
        }
    }

    /// Back to level 1 with score 0. Also discards any pending outcome.
    pub fn reset_game(&mut self) {
        log::info!("Game reset");
        self.score = 0;
        self.level = self.config.initial_level();
        self.events.push(GameEvent::ScoreChanged(0));
        self.events.push(GameEvent::LevelChanged(self.level));
        self.rebuild_board();
    }

    fn rebuild_board(&mut self) {
        self.board = Board::generate(self.level, &mut self.rng);
        self.history.clear();
        self.set_selection(None);
        self.phase = Phase::Playing;
        self.events.push(GameEvent::BoardChanged);
        log::info!(
            "Level start: {} tubes x {} (score {})",
            self.level.tube_count,
            self.level.capacity,
            self.score
        );
    }

    fn set_selection(&mut self, selected: Option<usize>) {
        if self.selected != selected {
            self.selected = selected;
            self.events.push(GameEvent::SelectionChanged(selected));
        }
    }

    /// Snapshot for rendering
    pub fn view(&self) -> BoardView {
        let tubes = self
            .board
            .tubes()
            .iter()
            .enumerate()
            .map(|(i, tube)| TubeView {
                balls: tube
                    .balls()
                    .iter()
                    .map(|b| BallView {
                        fill: b.color.to_css(),
                        border: b.border.to_css(),
                    })
                    .collect(),
                capacity: tube.capacity(),
                locked: tube.is_locked(),
                selected: self.selected == Some(i),
            })
            .collect();
        BoardView {
            tubes,
            score: self.score,
            level: self.level,
            input_locked: self.is_input_locked(),
        }
    }
}
