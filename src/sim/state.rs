//! Board state: balls, tubes and moves between them
//!
//! A board is rebuilt from scratch for every level; nothing here survives a
//! reset.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::palette::{BallColor, Rgb, generate_borders, generate_colors};

/// A (tube count, capacity) pair; both grow together on each win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub tube_count: usize,
    pub capacity: usize,
}

impl Level {
    pub fn new(tube_count: usize, capacity: usize) -> Self {
        Self {
            tube_count,
            capacity,
        }
    }

    /// One color per tube except the spare empty one
    pub fn color_count(&self) -> usize {
        self.tube_count.saturating_sub(1)
    }

    /// Next size up, or `None` once `max_tube_count` is reached
    pub fn next(&self, max_tube_count: usize) -> Option<Level> {
        (self.tube_count < max_tube_count)
            .then(|| Level::new(self.tube_count + 1, self.capacity + 1))
    }
}

/// A ball entity. Balls move between tubes, they are never recolored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub color: BallColor,
    pub border: Rgb,
}

/// A capacity-bounded stack of balls; the last element is the top
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tube {
    balls: Vec<Ball>,
    capacity: usize,
    locked: bool,
}

impl Tube {
    pub fn new(capacity: usize) -> Self {
        Self {
            balls: Vec::with_capacity(capacity),
            capacity,
            locked: false,
        }
    }

    /// Tube holding `balls` bottom to top, `None` if they exceed `capacity`
    pub fn with_balls(capacity: usize, balls: Vec<Ball>) -> Option<Self> {
        (balls.len() <= capacity).then_some(Self {
            balls,
            capacity,
            locked: false,
        })
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn top(&self) -> Option<&Ball> {
        self.balls.last()
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.balls.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Freeze the tube until the next reset (idempotent)
    pub fn lock(&mut self) {
        self.locked = true;
    }

    fn clear(&mut self) {
        self.balls.clear();
        self.locked = false;
    }
}

/// Ordered tubes of one level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    tubes: Vec<Tube>,
}

impl Board {
    /// `tube_count` empty tubes of `capacity`
    pub fn new(tube_count: usize, capacity: usize) -> Self {
        Self {
            tubes: (0..tube_count).map(|_| Tube::new(capacity)).collect(),
        }
    }

    pub fn from_tubes(tubes: Vec<Tube>) -> Self {
        Self { tubes }
    }

    /// Fresh shuffled board for `level`
    pub fn generate<R: Rng + ?Sized>(level: Level, rng: &mut R) -> Self {
        let colors = generate_colors(level.color_count());
        let borders = generate_borders(colors.len(), &colors);
        let balls = create_balls(&colors, &borders, level.capacity, rng);

        let mut board = Board::new(level.tube_count, level.capacity);
        board.distribute(balls);
        board
    }

    pub fn tubes(&self) -> &[Tube] {
        &self.tubes
    }

    pub fn tube(&self, index: usize) -> Option<&Tube> {
        self.tubes.get(index)
    }

    pub(crate) fn tubes_mut(&mut self) -> &mut [Tube] {
        &mut self.tubes
    }

    pub fn len(&self) -> usize {
        self.tubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tubes.is_empty()
    }

    pub fn locked_count(&self) -> usize {
        self.tubes.iter().filter(|t| t.is_locked()).count()
    }

    pub fn total_balls(&self) -> usize {
        self.tubes.iter().map(Tube::len).sum()
    }

    /// Clear and unlock every tube, then fill all but the last tube to
    /// capacity in order
    pub fn distribute(&mut self, balls: Vec<Ball>) {
        for tube in &mut self.tubes {
            tube.clear();
        }

        let fillable = self.tubes.len().saturating_sub(1);
        let mut balls = balls.into_iter();
        for tube in self.tubes.iter_mut().take(fillable) {
            while !tube.is_full() {
                match balls.next() {
                    Some(ball) => tube.balls.push(ball),
                    None => return,
                }
            }
        }

        let leftover = balls.count();
        if leftover > 0 {
            log::warn!("{} balls did not fit on the board", leftover);
        }
    }

    /// Whether the top ball of `from` may go onto `to`.
    ///
    /// Colors are not compared: any unlocked tube with room accepts a ball.
    pub fn can_move(&self, from: usize, to: usize) -> bool {
        if from == to {
            return false;
        }
        let (Some(src), Some(dst)) = (self.tubes.get(from), self.tubes.get(to)) else {
            return false;
        };
        !src.is_locked() && !dst.is_locked() && !src.is_empty() && !dst.is_full()
    }

    /// Move the top ball of `from` onto `to`. Returns false and leaves the
    /// board untouched when `can_move` would refuse.
    pub fn apply_move(&mut self, from: usize, to: usize) -> bool {
        if !self.can_move(from, to) {
            return false;
        }
        let Some(ball) = self.tubes[from].balls.pop() else {
            return false;
        };
        self.tubes[to].balls.push(ball);
        true
    }
}

/// `per_tube` balls of each color, uniformly shuffled
pub fn create_balls<R: Rng + ?Sized>(
    colors: &[BallColor],
    borders: &[Rgb],
    per_tube: usize,
    rng: &mut R,
) -> Vec<Ball> {
    let mut balls = Vec::with_capacity(colors.len() * per_tube);
    let mut next_id = 0u32;
    for (i, color) in colors.iter().enumerate() {
        let border = borders
            .get(i)
            .copied()
            .unwrap_or_else(|| Rgb::new(0xff, 0xff, 0xff));
        for _ in 0..per_tube {
            balls.push(Ball {
                id: next_id,
                color: *color,
                border,
            });
            next_id += 1;
        }
    }
    balls.shuffle(rng);
    balls
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Tube with the given colors bottom to top
    pub(crate) fn tube_of(capacity: usize, colors: &[BallColor]) -> Tube {
        let balls = colors
            .iter()
            .enumerate()
            .map(|(i, c)| Ball {
                id: i as u32,
                color: *c,
                border: Rgb::new(0xff, 0xff, 0xff),
            })
            .collect();
        Tube::with_balls(capacity, balls).unwrap()
    }

    const A: BallColor = BallColor::Black;
    const B: BallColor = BallColor::Hue(0);

    #[test]
    fn test_with_balls_rejects_overflow() {
        let balls = vec![
            Ball {
                id: 0,
                color: A,
                border: Rgb::new(1, 1, 1),
            };
            3
        ];
        assert!(Tube::with_balls(2, balls.clone()).is_none());
        assert!(Tube::with_balls(3, balls).is_some());
    }

    #[test]
    fn test_level_next() {
        assert_eq!(Level::new(4, 8).next(10), Some(Level::new(5, 9)));
        assert_eq!(Level::new(9, 13).next(10), Some(Level::new(10, 14)));
        assert_eq!(Level::new(10, 14).next(10), None);
        assert_eq!(Level::new(4, 8).color_count(), 3);
    }

    #[test]
    fn test_can_move_exhaustive_small_board() {
        // empty, partial, full, locked-full
        let mut locked = tube_of(2, &[B, B]);
        locked.lock();
        let board = Board::from_tubes(vec![
            tube_of(2, &[]),
            tube_of(2, &[A]),
            tube_of(2, &[A, B]),
            locked,
        ]);

        for from in 0..board.len() {
            for to in 0..board.len() {
                let src = &board.tubes()[from];
                let dst = &board.tubes()[to];
                let expected = from != to
                    && !src.is_empty()
                    && !dst.is_full()
                    && !src.is_locked()
                    && !dst.is_locked();
                assert_eq!(board.can_move(from, to), expected, "{} -> {}", from, to);
            }
        }
        // Only 1->0 and 2->0 and 2->1 are legal
        assert!(board.can_move(1, 0));
        assert!(board.can_move(2, 1));
        assert!(!board.can_move(0, 1));
        assert!(!board.can_move(3, 0));
    }

    #[test]
    fn test_can_move_ignores_color() {
        let board = Board::from_tubes(vec![tube_of(3, &[A]), tube_of(3, &[B])]);
        assert!(board.can_move(0, 1));
        assert!(board.can_move(1, 0));
    }

    #[test]
    fn test_out_of_range_is_illegal() {
        let mut board = Board::from_tubes(vec![tube_of(2, &[A]), tube_of(2, &[])]);
        assert!(!board.can_move(0, 5));
        assert!(!board.can_move(7, 1));
        assert!(!board.apply_move(0, 5));
        assert_eq!(board.total_balls(), 1);
    }

    #[test]
    fn test_apply_move_moves_same_ball() {
        let mut board = Board::from_tubes(vec![tube_of(3, &[A, B]), tube_of(3, &[])]);
        let top_id = board.tubes()[0].top().unwrap().id;
        assert!(board.apply_move(0, 1));
        assert_eq!(board.tubes()[1].top().unwrap().id, top_id);
        assert_eq!(board.tubes()[0].len(), 1);
    }

    #[test]
    fn test_apply_move_refused_is_noop() {
        let mut board = Board::from_tubes(vec![tube_of(1, &[A]), tube_of(1, &[B])]);
        let before = board.clone();
        assert!(!board.apply_move(0, 1));
        assert_eq!(board, before);
    }

    #[test]
    fn test_distribute_clears_and_unlocks() {
        let mut board = Board::from_tubes(vec![tube_of(2, &[A, A]), tube_of(2, &[B])]);
        board.tubes_mut()[0].lock();
        let balls = create_balls(&[B], &[], 2, &mut Pcg32::seed_from_u64(1));
        board.distribute(balls);
        assert!(!board.tubes()[0].is_locked());
        assert_eq!(board.tubes()[0].len(), 2);
        assert!(board.tubes()[1].is_empty());
    }

    proptest! {
        #[test]
        fn prop_generate_shape(seed in any::<u64>(), tube_count in 2usize..=10) {
            let level = Level::new(tube_count, tube_count + 4);
            let board = Board::generate(level, &mut Pcg32::seed_from_u64(seed));

            prop_assert_eq!(board.len(), tube_count);
            prop_assert_eq!(board.total_balls(), level.color_count() * level.capacity);
            prop_assert!(board.tubes()[tube_count - 1].is_empty());
            for tube in &board.tubes()[..tube_count - 1] {
                prop_assert_eq!(tube.len(), level.capacity);
                prop_assert!(!tube.is_locked());
            }

            for color in generate_colors(level.color_count()) {
                let n = board
                    .tubes()
                    .iter()
                    .flat_map(Tube::balls)
                    .filter(|b| b.color == color)
                    .count();
                prop_assert_eq!(n, level.capacity);
            }
        }

        #[test]
        fn prop_move_round_trip(seed in any::<u64>(), from in 0usize..3) {
            let mut board = Board::generate(Level::new(4, 8), &mut Pcg32::seed_from_u64(seed));
            let before = board.clone();
            prop_assert!(board.apply_move(from, 3));
            prop_assert!(board.apply_move(3, from));
            prop_assert_eq!(board, before);
        }
    }
}
