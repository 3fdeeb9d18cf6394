use crate::logic::board::{Board, BoardCoordinate, Color, Piece};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod eval;
pub mod search;

/// Evaluation score. Positive favours Black, the engine's side.
pub type Score = f64;

/// A fully specified transition. Capture is implicit: whatever stands on
/// the destination is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub from_row: u8,
    pub from_col: u8,
    pub to_row: u8,
    pub to_col: u8,
    #[serde(rename = "pieceId")]
    pub piece: Piece,
}

impl Move {
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(from: BoardCoordinate, to: BoardCoordinate, piece: Piece) -> Self {
        Self {
            from_row: from.row() as u8,
            from_col: from.col() as u8,
            to_row: to.row() as u8,
            to_col: to.col() as u8,
            piece,
        }
    }

    /// Source square, `None` if the raw coordinates are off the board.
    pub fn source(&self) -> Option<BoardCoordinate> {
        BoardCoordinate::new(usize::from(self.from_row), usize::from(self.from_col))
    }

    pub fn target(&self) -> Option<BoardCoordinate> {
        BoardCoordinate::new(usize::from(self.to_row), usize::from(self.to_col))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({},{}) -> ({},{})",
            self.piece, self.from_row, self.from_col, self.to_row, self.to_col
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u64,
    pub time_ms: u64,
}

pub trait Evaluator {
    fn evaluate(&self, board: &Board) -> Score;
}

pub trait Searcher {
    /// Best move for `side`, or `None` when `side` has no legal move or the
    /// search was stopped before it finished.
    fn search(&mut self, board: &Board, side: Color, depth: u8) -> Option<(Move, SearchStats)>;
}
