use std::collections::VecDeque;

use tetris_core::tetris::{
    Command, Game, GameConfig, HEIGHT, PLAYABLE_HEIGHT, PieceKind, RandomSeed, Tetrimino, WIDTH,
};

/// Boolean cells, indexed `[row][col]` with row 0 at the top.
pub type Grid = Vec<Vec<bool>>;

/// What the environment needs from a board simulator.
///
/// Dimensions never change for the lifetime of a value, `dead` is sticky and
/// the score never decreases.
pub trait Simulator: Sized {
    fn with_seed(seed: Option<RandomSeed>) -> Self;
    fn act(&mut self, command: Command);
    fn score(&self) -> u32;
    fn dead(&self) -> bool;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn playable_height(&self) -> usize;
    /// Derived summary view, `height × width`.
    fn state(&self) -> Grid;
    /// Settled cells, `height × width`.
    fn cells(&self) -> Grid;
    fn current_piece(&self) -> &Tetrimino;
    fn held_piece(&self) -> Option<PieceKind>;
    fn next_pieces(&self) -> &VecDeque<PieceKind>;
}

impl Simulator for Game {
    fn with_seed(seed: Option<RandomSeed>) -> Self {
        Game::new(GameConfig::with_seed(seed))
    }

    fn act(&mut self, command: Command) {
        Game::act(self, command);
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn dead(&self) -> bool {
        self.dead
    }

    fn width(&self) -> usize {
        WIDTH
    }

    fn height(&self) -> usize {
        HEIGHT
    }

    fn playable_height(&self) -> usize {
        PLAYABLE_HEIGHT
    }

    fn state(&self) -> Grid {
        Game::state(self).iter().map(|row| row.to_vec()).collect()
    }

    fn cells(&self) -> Grid {
        Game::cells(self).iter().map(|row| row.to_vec()).collect()
    }

    fn current_piece(&self) -> &Tetrimino {
        &self.piece
    }

    fn held_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    fn next_pieces(&self) -> &VecDeque<PieceKind> {
        &self.next_queue
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::VecDeque;

    use tetris_core::tetris::{Command, PieceKind, RandomSeed, Tetrimino};

    use super::{Grid, Simulator};

    /// Scripted board: every command is recorded and adds `score_per_act`.
    #[derive(Debug, Clone)]
    pub struct FakeBoard {
        pub cells: Grid,
        pub state: Grid,
        pub score: u32,
        pub score_per_act: u32,
        pub dead: bool,
        pub piece: Tetrimino,
        pub held: Option<PieceKind>,
        pub next: VecDeque<PieceKind>,
        pub commands: Vec<Command>,
        pub seed: Option<RandomSeed>,
    }

    pub const WIDTH: usize = 10;
    pub const HEIGHT: usize = 26;
    pub const PLAYABLE: usize = 20;

    impl Simulator for FakeBoard {
        fn with_seed(seed: Option<RandomSeed>) -> Self {
            Self {
                cells: vec![vec![false; WIDTH]; HEIGHT],
                state: vec![vec![false; WIDTH]; HEIGHT],
                score: 0,
                score_per_act: 0,
                dead: false,
                piece: Tetrimino::new(PieceKind::T, 3, 4),
                held: None,
                next: PieceKind::ALL.into_iter().take(5).collect(),
                commands: vec![],
                seed,
            }
        }

        fn act(&mut self, command: Command) {
            self.commands.push(command);
            self.score += self.score_per_act;
        }

        fn score(&self) -> u32 {
            self.score
        }

        fn dead(&self) -> bool {
            self.dead
        }

        fn width(&self) -> usize {
            WIDTH
        }

        fn height(&self) -> usize {
            HEIGHT
        }

        fn playable_height(&self) -> usize {
            PLAYABLE
        }

        fn state(&self) -> Grid {
            self.state.clone()
        }

        fn cells(&self) -> Grid {
            self.cells.clone()
        }

        fn current_piece(&self) -> &Tetrimino {
            &self.piece
        }

        fn held_piece(&self) -> Option<PieceKind> {
            self.held
        }

        fn next_pieces(&self) -> &VecDeque<PieceKind> {
            &self.next
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn game_grids_have_board_dimensions() {
        let game = <Game as Simulator>::with_seed(Some(3));
        for grid in [Simulator::state(&game), Simulator::cells(&game)] {
            assert_eq!(grid.len(), game.height());
            assert!(grid.iter().all(|row| row.len() == game.width()));
        }
        assert!(game.playable_height() < game.height());
    }
}
