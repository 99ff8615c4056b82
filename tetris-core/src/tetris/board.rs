use serde::{Deserialize, Serialize};

pub const WIDTH: usize = 10;
pub const HEIGHT: usize = 26;
pub const PLAYABLE_HEIGHT: usize = 20;
/// Rows above the playfield that absorb pieces spawning or stacking out.
pub const HIDDEN_ROWS: usize = HEIGHT - PLAYABLE_HEIGHT;

pub type Cells = [[bool; WIDTH]; HEIGHT];

#[repr(u8)]
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [
        Self::I,
        Self::O,
        Self::T,
        Self::S,
        Self::Z,
        Self::J,
        Self::L,
    ];

    const fn shape(self) -> &'static [&'static [bool]] {
        const X: bool = true;
        const O: bool = false;
        match self {
            Self::O => &[&[X, X], &[X, X]],
            Self::I => &[&[O, O, O, O], &[X, X, X, X], &[O, O, O, O], &[O, O, O, O]],
            Self::T => &[&[O, X, O], &[X, X, X], &[O, O, O]],
            Self::L => &[&[O, O, X], &[X, X, X], &[O, O, O]],
            Self::J => &[&[X, O, O], &[X, X, X], &[O, O, O]],
            Self::S => &[&[O, X, X], &[X, X, O], &[O, O, O]],
            Self::Z => &[&[X, X, O], &[O, X, X], &[O, O, O]],
        }
    }
}

#[repr(u8)]
#[derive(Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rotation {
    #[default]
    Zero,
    Right,
    Two,
    Left,
}

impl Rotation {
    pub const fn rotate(self, direction: Direction) -> Self {
        match (self, direction) {
            (Self::Zero, Direction::Cw) | (Self::Two, Direction::Ccw) => Self::Right,
            (Self::Right, Direction::Cw) | (Self::Left, Direction::Ccw) => Self::Two,
            (Self::Two, Direction::Cw) | (Self::Zero, Direction::Ccw) => Self::Left,
            (Self::Left, Direction::Cw) | (Self::Right, Direction::Ccw) => Self::Zero,
        }
    }

    /// Number of clockwise quarter turns from spawn orientation.
    pub const fn index(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Cw,
    Ccw,
}

/// Settled cells of the playfield. Row 0 is the top of the hidden area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub cells: Cells,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            cells: [[false; WIDTH]; HEIGHT],
        }
    }
}

impl Board {
    pub fn place(&mut self, piece: &Tetrimino) {
        for (row, col) in piece.occupied() {
            self.cells[row][col] = true;
        }
    }

    pub fn can_place(&self, piece: &Tetrimino) -> bool {
        piece.cells().all(|(row, col)| {
            (0..HEIGHT as i8).contains(&row)
                && (0..WIDTH as i8).contains(&col)
                && !self.cells[row as usize][col as usize]
        })
    }

    /// Drops the piece as far as it goes. Returns the number of rows travelled.
    pub fn drop(&self, piece: &mut Tetrimino) -> u32 {
        let mut distance = 0;
        while self.move_down(piece) {
            distance += 1;
        }
        distance
    }

    /// Rotates the piece with wall-kicks. Returns if the rotation was successful.
    pub fn rotate(&self, piece: &mut Tetrimino, direction: Direction) -> bool {
        let to = piece.rotation.rotate(direction);
        let offsets = match piece.kind {
            PieceKind::O => return true,
            PieceKind::I => Self::get_i_offsets(piece.rotation, to),
            _ => Self::get_three_offsets(piece.rotation, to),
        };

        let mut candidate = piece.clone();
        candidate.rotate_grid(direction);
        candidate.rotation = to;
        for (x, y) in offsets {
            candidate.offset_x = piece.offset_x + x;
            candidate.offset_y = piece.offset_y + y;
            if self.can_place(&candidate) {
                *piece = candidate;
                return true;
            }
        }
        false
    }

    fn get_three_offsets(from: Rotation, to: Rotation) -> [(i8, i8); 5] {
        use Rotation as R;
        match (from, to) {
            (_, R::Right) => [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
            (R::Right, _) => [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
            (_, R::Left) => [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
            (R::Left, _) => [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
            _ => unreachable!("Tried to invalid rotation from: {from:?}, to: {to:?}"),
        }
    }

    fn get_i_offsets(from: Rotation, to: Rotation) -> [(i8, i8); 5] {
        use Rotation as R;
        match (from, to) {
            (R::Zero, R::Right) | (R::Left, R::Two) => [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
            (R::Right, R::Zero) | (R::Two, R::Left) => [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
            (R::Right, R::Two) | (R::Zero, R::Left) => [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
            (R::Two, R::Right) | (R::Left, R::Zero) => [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
            _ => unreachable!("Tried invalid rotation from: {from:?}, to: {to:?}"),
        }
    }

    /// Move along the x-axis. Returns if movement was a success
    pub fn move_x(&self, piece: &mut Tetrimino, offset: i8) -> bool {
        piece.offset_x += offset;
        if self.can_place(piece) {
            return true;
        }
        piece.offset_x -= offset;
        false
    }

    /// Move one row down. Returns if movement was a success
    pub fn move_down(&self, piece: &mut Tetrimino) -> bool {
        piece.offset_y += 1;
        if self.can_place(piece) {
            return true;
        }
        piece.offset_y -= 1;
        false
    }

    /// Removes full rows, shifting everything above down. Returns the number of cleared rows.
    pub fn clear_lines(&mut self) -> u8 {
        let mut count = 0;
        for i in 0..HEIGHT {
            if self.cells[i].iter().all(|&cell| cell) {
                count += 1;
                self.cells.copy_within(0..i, 1);
                self.cells[0] = [false; WIDTH];
            }
        }
        count
    }
}

/// The falling piece, or a candidate used for rotation testing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tetrimino {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub grid: Vec<Vec<bool>>,
    pub offset_x: i8,
    pub offset_y: i8,
}

impl Tetrimino {
    pub fn new(kind: PieceKind, x: i8, y: i8) -> Self {
        Self {
            kind,
            rotation: Rotation::Zero,
            grid: kind.shape().iter().map(|row| row.to_vec()).collect(),
            offset_x: x,
            offset_y: y,
        }
    }

    /// Absolute `(row, col)` of every filled cell, possibly outside the board.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.grid.iter().enumerate().flat_map(move |(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(x, _)| (self.offset_y + y as i8, self.offset_x + x as i8))
        })
    }

    /// Filled cells that lie on the board, as `(row, col)`.
    pub fn occupied(&self) -> Vec<(usize, usize)> {
        self.cells()
            .filter(|&(row, col)| row >= 0 && col >= 0)
            .map(|(row, col)| (row as usize, col as usize))
            .collect()
    }

    /// Top-left corner of the filled cells' bounding box.
    pub fn position(&self) -> (usize, usize) {
        let (row, col) = self
            .cells()
            .fold((i8::MAX, i8::MAX), |(r, c), (row, col)| (r.min(row), c.min(col)));
        (row.max(0) as usize, col.max(0) as usize)
    }

    pub fn rotate_grid(&mut self, direction: Direction) {
        let n = self.grid.len();
        let old = self.grid.clone();
        for (i, row) in self.grid.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = match direction {
                    Direction::Cw => old[n - 1 - j][i],
                    Direction::Ccw => old[j][n - 1 - i],
                };
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rotating_four_times_is_identity() {
        for kind in PieceKind::ALL {
            let original = Tetrimino::new(kind, 3, 10);
            let mut piece = original.clone();
            for _ in 0..4 {
                piece.rotate_grid(Direction::Cw);
            }
            assert_eq!(piece.grid, original.grid);
            piece.rotate_grid(Direction::Ccw);
            piece.rotate_grid(Direction::Cw);
            assert_eq!(piece.grid, original.grid);
        }
    }

    #[test]
    fn every_piece_has_four_cells() {
        for kind in PieceKind::ALL {
            assert_eq!(Tetrimino::new(kind, 3, 10).occupied().len(), 4);
        }
    }

    #[test]
    fn t_piece_position_and_cells() {
        let piece = Tetrimino::new(PieceKind::T, 3, 10);
        assert_eq!(piece.position(), (10, 3));
        let mut cells = piece.occupied();
        cells.sort_unstable();
        assert_eq!(cells, vec![(10, 4), (11, 3), (11, 4), (11, 5)]);
    }

    #[test]
    fn drop_stops_on_floor() {
        let board = Board::default();
        let mut piece = Tetrimino::new(PieceKind::O, 4, 0);
        assert_eq!(board.drop(&mut piece), HEIGHT as u32 - 2);
        assert!(piece.occupied().iter().all(|&(row, _)| row >= HEIGHT - 2));
    }

    #[test]
    fn walls_block_horizontal_movement() {
        let board = Board::default();
        let mut piece = Tetrimino::new(PieceKind::O, 0, 5);
        assert!(!board.move_x(&mut piece, -1));
        assert_eq!(piece.offset_x, 0);
        assert!(board.move_x(&mut piece, 1));
    }

    #[test]
    fn rotation_kicks_off_the_wall() {
        let board = Board::default();
        let mut piece = Tetrimino::new(PieceKind::T, 3, 10);
        assert!(board.rotate(&mut piece, Direction::Cw));
        assert_eq!(piece.rotation, Rotation::Right);
        // against the left wall the next rotation needs a kick
        while board.move_x(&mut piece, -1) {}
        assert!(board.rotate(&mut piece, Direction::Cw));
        assert!(board.can_place(&piece));
    }

    #[test]
    fn clear_lines_shifts_rows_down() {
        let mut board = Board::default();
        board.cells[HEIGHT - 1] = [true; WIDTH];
        board.cells[HEIGHT - 2][0] = true;
        assert_eq!(board.clear_lines(), 1);
        assert!(board.cells[HEIGHT - 1][0]);
        assert_eq!(board.cells[HEIGHT - 1].iter().filter(|c| **c).count(), 1);
        assert!(board.cells[HEIGHT - 2].iter().all(|c| !*c));
    }
}
