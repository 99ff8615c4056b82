use log::warn;
use serde::{Deserialize, Serialize};
use tetris_core::tetris::PieceKind;

use crate::{EnvError, Grid, Result, Simulator, Space, Value};

/// Number of distinct piece codes.
pub const PIECE_CODES: u8 = 7;
/// Reserved, never produced.
pub const CODE_RESERVED: u8 = 7;
/// Held-piece code when nothing is held.
pub const HELD_NONE: u8 = 8;

pub const fn piece_code(kind: PieceKind) -> u8 {
    match kind {
        PieceKind::I => 0,
        PieceKind::O => 1,
        PieceKind::T => 2,
        PieceKind::S => 3,
        PieceKind::Z => 4,
        PieceKind::J => 5,
        PieceKind::L => 6,
    }
}

pub fn held_code(held: Option<PieceKind>) -> u8 {
    held.map_or(HELD_NONE, piece_code)
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EncoderMode {
    /// Derived state and occupancy of the playable rows, stacked as two channels.
    #[default]
    Simple,
    /// Full occupancy plus current, held and upcoming pieces.
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceDescriptor {
    /// `(row, col)`
    pub position: (usize, usize),
    pub rotation: u8,
    pub kind: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Simple {
        state: Grid,
        board: Grid,
    },
    Complex {
        board: Grid,
        piece: PieceDescriptor,
        held: u8,
        next: Vec<u8>,
    },
}

fn binary_rows(grid: &Grid) -> Value {
    Value::Tuple(grid.iter().map(|row| Value::Binary(row.clone())).collect())
}

impl Observation {
    /// Scalars in declaration order. Simple observations are laid out as
    /// `(row, col, channel)`.
    pub fn flatten(&self) -> Vec<f32> {
        let bit = |b: &bool| if *b { 1.0 } else { 0.0 };
        match self {
            Self::Simple { state, board } => state
                .iter()
                .zip(board)
                .flat_map(|(s, b)| s.iter().zip(b))
                .flat_map(|(s, b)| [bit(s), bit(b)])
                .collect(),
            Self::Complex {
                board,
                piece,
                held,
                next,
            } => {
                let mut out: Vec<f32> = board.iter().flatten().map(bit).collect();
                out.extend([
                    piece.position.0 as f32,
                    piece.position.1 as f32,
                    f32::from(piece.rotation),
                    f32::from(piece.kind),
                    f32::from(*held),
                ]);
                out.extend(next.iter().map(|code| f32::from(*code)));
                out
            }
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Simple { state, .. } => {
                let rows = state.len();
                let cols = state.first().map_or(0, Vec::len);
                Value::Array {
                    shape: vec![rows, cols, 2],
                    data: self.flatten(),
                }
            }
            Self::Complex {
                board,
                piece,
                held,
                next,
            } => Value::Tuple(vec![
                binary_rows(board),
                Value::Tuple(vec![
                    Value::Tuple(vec![
                        Value::Int(piece.position.0 as i64),
                        Value::Int(piece.position.1 as i64),
                    ]),
                    Value::Int(i64::from(piece.rotation)),
                    Value::Int(i64::from(piece.kind)),
                ]),
                Value::Int(i64::from(*held)),
                Value::Tuple(next.iter().map(|c| Value::Int(i64::from(*c))).collect()),
            ]),
        }
    }
}

/// Turns simulator state into observations. The mode is fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEncoder {
    mode: EncoderMode,
    next_pieces: usize,
}

impl StateEncoder {
    pub const fn new(mode: EncoderMode, next_pieces: usize) -> Self {
        Self { mode, next_pieces }
    }

    pub const fn mode(&self) -> EncoderMode {
        self.mode
    }

    pub fn observation_space<G: Simulator>(&self, game: &G) -> Space {
        let (height, width) = (game.height(), game.width());
        match self.mode {
            EncoderMode::Simple => Space::Box {
                low: 0.0,
                high: 1.0,
                shape: vec![game.playable_height(), width, 2],
            },
            EncoderMode::Complex => Space::Tuple(vec![
                Space::Tuple(vec![Space::MultiBinary(width); height]),
                Space::Tuple(vec![
                    Space::Tuple(vec![
                        Space::Discrete(height as u32),
                        Space::Discrete(width as u32),
                    ]),
                    Space::Discrete(4),
                    Space::Discrete(u32::from(PIECE_CODES)),
                ]),
                Space::Discrete(u32::from(HELD_NONE) + 1),
                Space::Tuple(vec![Space::Discrete(u32::from(PIECE_CODES)); self.next_pieces]),
            ]),
        }
    }

    pub fn encode<G: Simulator>(&self, game: &G) -> Result<Observation> {
        match self.mode {
            EncoderMode::Simple => Ok(Self::encode_simple(game)),
            EncoderMode::Complex => self.encode_complex(game),
        }
    }

    fn encode_simple<G: Simulator>(game: &G) -> Observation {
        let hidden = game.height() - game.playable_height();
        let visible = |grid: Grid| grid.into_iter().skip(hidden).collect::<Grid>();
        Observation::Simple {
            state: visible(game.state()),
            board: visible(game.cells()),
        }
    }

    fn encode_complex<G: Simulator>(&self, game: &G) -> Result<Observation> {
        let queue = game.next_pieces();
        if queue.len() < self.next_pieces {
            warn!(
                "next-piece queue too short: {} < {}",
                queue.len(),
                self.next_pieces
            );
            return Err(EnvError::QueueTooShort {
                required: self.next_pieces,
                available: queue.len(),
            });
        }
        let piece = game.current_piece();
        Ok(Observation::Complex {
            board: game.cells(),
            piece: PieceDescriptor {
                position: piece.position(),
                rotation: piece.rotation.index(),
                kind: piece_code(piece.kind),
            },
            held: held_code(game.held_piece()),
            next: queue
                .iter()
                .take(self.next_pieces)
                .copied()
                .map(piece_code)
                .collect(),
        })
    }
}
