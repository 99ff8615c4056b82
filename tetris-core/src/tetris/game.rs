use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt};

use super::{Board, Cells, Direction, HIDDEN_ROWS, PieceKind, Tetrimino, WIDTH};

const PREVIEW: usize = 5;
const LEVEL_GOAL: i8 = 5;
const SOFT_DROP_POINTS: u32 = 1;
const HARD_DROP_POINTS: u32 = 2;
const SPAWN_ROW: i8 = HIDDEN_ROWS as i8 - 2;

pub type RandomSeed = u64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub seed: Option<RandomSeed>,
    /// Length of the upcoming-piece queue.
    pub preview: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            preview: PREVIEW,
        }
    }
}

impl GameConfig {
    pub fn with_seed(seed: Option<RandomSeed>) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

pub fn getrandom(seed: Option<RandomSeed>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    }
}

/// One input applied per [`Game::act`] call.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    #[serde(rename = "hold")]
    Hold,
    #[serde(rename = "hd")]
    HardDrop,
    #[serde(rename = "d")]
    SoftDrop,
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
    #[serde(rename = "cw")]
    Cw,
    #[serde(rename = "ccw")]
    Ccw,
    #[serde(rename = "")]
    NoOp,
}

impl Command {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::HardDrop => "hd",
            Self::SoftDrop => "d",
            Self::Left => "l",
            Self::Right => "r",
            Self::Cw => "cw",
            Self::Ccw => "ccw",
            Self::NoOp => "",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    pub board: Board,
    pub piece: Tetrimino,
    pub score: u32,
    pub level: u8,
    pub lines: u32,
    bag: [PieceKind; 7],
    bag_idx: usize,
    pub next_queue: VecDeque<PieceKind>,
    preview: usize,
    pub hold: Option<PieceKind>,
    can_hold: bool,
    fall_timer: u8,
    level_goal: i8,
    piece_rng: SmallRng,
    pub dead: bool,
    /// Number of [`Game::act`] calls since construction.
    pub time_passed: u64,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let mut new = Self {
            board: Board::default(),
            piece: Tetrimino::new(PieceKind::I, 0, 0),
            score: 0,
            level: 1,
            lines: 0,
            bag: PieceKind::ALL,
            bag_idx: 7,
            next_queue: VecDeque::with_capacity(config.preview),
            preview: config.preview,
            hold: None,
            can_hold: true,
            fall_timer: 0,
            level_goal: LEVEL_GOAL,
            piece_rng: getrandom(config.seed),
            dead: false,
            time_passed: 0,
        };
        for _ in 0..config.preview {
            let kind = new.next_kind();
            new.next_queue.push_back(kind);
        }
        let first = new.pop_next();
        new.spawn(first);
        new
    }

    /// Applies one command followed by one gravity tick. Does nothing once dead.
    pub fn act(&mut self, command: Command) {
        if self.dead {
            return;
        }
        self.time_passed += 1;
        match command {
            Command::Hold => self.hold(),
            Command::HardDrop => {
                let distance = self.board.drop(&mut self.piece);
                self.score += HARD_DROP_POINTS * distance;
                return self.lock();
            }
            Command::SoftDrop => {
                if !self.board.move_down(&mut self.piece) {
                    return self.lock();
                }
                self.score += SOFT_DROP_POINTS;
                self.fall_timer = self.fall_interval();
            }
            Command::Left => {
                self.board.move_x(&mut self.piece, -1);
            }
            Command::Right => {
                self.board.move_x(&mut self.piece, 1);
            }
            Command::Cw => {
                self.board.rotate(&mut self.piece, Direction::Cw);
            }
            Command::Ccw => {
                self.board.rotate(&mut self.piece, Direction::Ccw);
            }
            Command::NoOp => {}
        }
        self.gravity();
    }

    pub const fn cells(&self) -> &Cells {
        &self.board.cells
    }

    /// Layer marking the cells of the falling piece.
    pub fn state(&self) -> Cells {
        let mut layer = [[false; WIDTH]; super::HEIGHT];
        for (row, col) in self.piece.occupied() {
            if let Some(cell) = layer.get_mut(row).and_then(|r| r.get_mut(col)) {
                *cell = true;
            }
        }
        layer
    }

    fn gravity(&mut self) {
        self.fall_timer = self.fall_timer.saturating_sub(1);
        if self.fall_timer > 0 {
            return;
        }
        self.fall_timer = self.fall_interval();
        if !self.board.move_down(&mut self.piece) {
            self.lock();
        }
    }

    const fn fall_interval(&self) -> u8 {
        match self.level {
            1 => 10,
            2 => 8,
            3 => 6,
            4 => 5,
            5 => 4,
            6 => 3,
            7 => 2,
            _ => 1,
        }
    }

    fn hold(&mut self) {
        if !self.can_hold {
            return;
        }
        self.can_hold = false;
        let next = match self.hold.replace(self.piece.kind) {
            Some(held) => held,
            None => self.pop_next(),
        };
        self.spawn(next);
    }

    fn lock(&mut self) {
        let above_playfield = self
            .piece
            .occupied()
            .iter()
            .all(|&(row, _)| row < HIDDEN_ROWS);
        self.board.place(&self.piece);
        if above_playfield {
            return self.gameover();
        }

        let rows = self.board.clear_lines();
        if rows > 0 {
            self.lines += u32::from(rows);
            self.score += u32::from(self.level)
                * match rows {
                    1 => 100,
                    2 => 300,
                    3 => 500,
                    _ => 800,
                };
            self.level_goal -= rows as i8;
            if self.level_goal <= 0 {
                self.level = self.level.saturating_add(1);
                self.level_goal += LEVEL_GOAL;
            }
        }

        self.can_hold = true;
        let next = self.pop_next();
        self.spawn(next);
    }

    fn spawn(&mut self, kind: PieceKind) {
        let col = match kind {
            PieceKind::O => 4,
            _ => 3,
        };
        self.piece = Tetrimino::new(kind, col, SPAWN_ROW);
        self.fall_timer = self.fall_interval();
        if !self.board.can_place(&self.piece) {
            self.gameover();
        }
    }

    fn next_kind(&mut self) -> PieceKind {
        if self.bag_idx < 7 {
            let next = self.bag[self.bag_idx];
            self.bag_idx += 1;
            return next;
        }
        for i in 0..7 {
            let swap = self.piece_rng.random_range(i..7);
            self.bag.swap(i, swap);
        }
        self.bag_idx = 1;
        self.bag[0]
    }

    fn pop_next(&mut self) -> PieceKind {
        let kind = self.next_kind();
        if self.preview == 0 {
            return kind;
        }
        self.next_queue.push_back(kind);
        self.next_queue.pop_front().unwrap_or(kind)
    }

    fn gameover(&mut self) {
        self.dead = true;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tetris::HEIGHT;

    fn seeded() -> Game {
        Game::new(GameConfig::with_seed(Some(7)))
    }

    #[test]
    fn same_seed_same_pieces() {
        let a = seeded();
        let b = seeded();
        assert_eq!(a.piece.kind, b.piece.kind);
        assert_eq!(a.next_queue, b.next_queue);
    }

    #[test]
    fn first_bag_has_no_repeats() {
        let game = seeded();
        let mut kinds = vec![game.piece.kind];
        kinds.extend(game.next_queue.iter().copied());
        kinds.sort_unstable_by_key(|k| *k as u8);
        kinds.dedup();
        assert_eq!(kinds.len(), 6);
    }

    #[test]
    fn hard_drop_scores_and_locks() {
        let mut game = seeded();
        let expected_next = game.next_queue[0];
        game.act(Command::HardDrop);
        assert!(game.score > 0);
        assert_eq!(game.piece.kind, expected_next);
        assert!(game.cells()[HEIGHT - 1].iter().any(|c| *c));
        assert_eq!(game.time_passed, 1);
    }

    #[test]
    fn hold_swaps_once_per_piece() {
        let mut game = seeded();
        let first = game.piece.kind;
        let second = game.next_queue[0];
        game.act(Command::Hold);
        assert_eq!(game.hold, Some(first));
        assert_eq!(game.piece.kind, second);
        game.act(Command::Hold);
        assert_eq!(game.hold, Some(first));
        assert_eq!(game.piece.kind, second);
    }

    #[test]
    fn preview_length_is_kept() {
        let mut game = Game::new(GameConfig {
            seed: Some(1),
            preview: 3,
        });
        for _ in 0..20 {
            game.act(Command::HardDrop);
            assert_eq!(game.next_queue.len(), 3);
        }
    }

    #[test]
    fn dead_is_sticky_and_score_monotonic() {
        let mut game = seeded();
        let mut last = game.score;
        for _ in 0..200 {
            game.act(Command::HardDrop);
            assert!(game.score >= last);
            last = game.score;
        }
        assert!(game.dead);
        let frozen = game.time_passed;
        game.act(Command::Left);
        assert!(game.dead);
        assert_eq!(game.time_passed, frozen);
    }

    #[test]
    fn line_clear_adds_score() {
        let mut game = seeded();
        game.board.cells[HEIGHT - 1] = [true; WIDTH];
        game.board.cells[HEIGHT - 1][0] = false;
        game.piece = Tetrimino::new(PieceKind::I, 0, 10);
        game.board.rotate(&mut game.piece, Direction::Cw);
        while game.board.move_x(&mut game.piece, -1) {}
        let before = game.score;
        game.act(Command::HardDrop);
        assert_eq!(game.lines, 1);
        assert!(game.score >= before + 100);
        assert!(!game.board.cells[HEIGHT - 1].iter().all(|c| *c));
    }

    #[test]
    fn state_marks_falling_piece() {
        let game = seeded();
        let marked: Vec<_> = (0..HEIGHT)
            .flat_map(|r| (0..WIDTH).map(move |c| (r, c)))
            .filter(|&(r, c)| game.state()[r][c])
            .collect();
        let mut occupied = game.piece.occupied();
        occupied.sort_unstable();
        assert_eq!(marked, occupied);
    }
}
