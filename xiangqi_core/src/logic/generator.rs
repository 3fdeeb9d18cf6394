use crate::engine::Move;
use crate::logic::board::{Board, BoardCoordinate, Color, Piece, PieceType, COLS, ROWS};
use crate::logic::rules::{is_in_check, is_legal_move};

const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
const DIAGONAL: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ELEPHANT: [(isize, isize); 4] = [(-2, -2), (-2, 2), (2, -2), (2, 2)];
const HORSE: [(isize, isize); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// State of the game from the point of view of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Ongoing,
    Checkmate { winner: Color },
    /// No legal move while not in check. Nobody wins.
    Stalemate,
}

/// Enumerates legal moves. Every candidate goes through the shared rules
/// engine, so generation can never disagree with move validation.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub const fn new() -> Self {
        Self
    }

    /// All legal moves for `turn`, ordered row-major by source square and
    /// then row-major by destination.
    pub fn generate_moves(&self, board: &Board, turn: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        for (from, piece) in board.pieces_of(turn) {
            for to in Self::candidate_targets(from, piece) {
                if is_legal_move(board, from, to, piece) {
                    moves.push(Move::new(from, to, piece));
                }
            }
        }
        moves
    }

    /// Legal moves for `turn` that land on an enemy piece.
    pub fn generate_captures(&self, board: &Board, turn: Color) -> Vec<Move> {
        let mut moves = Vec::new();
        for (from, piece) in board.pieces_of(turn) {
            for to in Self::candidate_targets(from, piece) {
                let is_capture = board
                    .get_piece(to)
                    .is_some_and(|target| target.color != turn);
                if is_capture && is_legal_move(board, from, to, piece) {
                    moves.push(Move::new(from, to, piece));
                }
            }
        }
        moves
    }

    /// Returns `true` as soon as one legal move is found.
    pub fn has_legal_moves(&self, board: &Board, turn: Color) -> bool {
        board.pieces_of(turn).any(|(from, piece)| {
            Self::candidate_targets(from, piece)
                .into_iter()
                .any(|to| is_legal_move(board, from, to, piece))
        })
    }

    pub fn count_legal_moves(&self, board: &Board, turn: Color) -> usize {
        board
            .pieces_of(turn)
            .map(|(from, piece)| {
                Self::candidate_targets(from, piece)
                    .into_iter()
                    .filter(|&to| is_legal_move(board, from, to, piece))
                    .count()
            })
            .sum()
    }

    pub fn is_checkmate(&self, board: &Board, color: Color) -> bool {
        is_in_check(board, color) && !self.has_legal_moves(board, color)
    }

    pub fn is_stalemate(&self, board: &Board, color: Color) -> bool {
        !is_in_check(board, color) && !self.has_legal_moves(board, color)
    }

    pub fn game_outcome(&self, board: &Board, to_move: Color) -> GameOutcome {
        if self.has_legal_moves(board, to_move) {
            GameOutcome::Ongoing
        } else if is_in_check(board, to_move) {
            GameOutcome::Checkmate {
                winner: to_move.opposite(),
            }
        } else {
            GameOutcome::Stalemate
        }
    }

    /// Squares a piece could reach by geometry alone, sorted row-major.
    /// Legality is decided later by the rules engine.
    fn candidate_targets(from: BoardCoordinate, piece: Piece) -> Vec<BoardCoordinate> {
        let mut targets: Vec<BoardCoordinate> = match piece.piece_type {
            PieceType::King => Self::offsets(from, &ORTHOGONAL),
            PieceType::Advisor => Self::offsets(from, &DIAGONAL),
            PieceType::Elephant => Self::offsets(from, &ELEPHANT),
            PieceType::Horse => Self::offsets(from, &HORSE),
            PieceType::Chariot | PieceType::Cannon => Self::lines(from),
            PieceType::Pawn => {
                let forward = match piece.color {
                    Color::Red => -1,
                    Color::Black => 1,
                };
                Self::offsets(from, &[(forward, 0), (0, -1), (0, 1)])
            }
        };
        targets.sort_unstable();
        targets
    }

    fn offsets(from: BoardCoordinate, deltas: &[(isize, isize)]) -> Vec<BoardCoordinate> {
        deltas
            .iter()
            .filter_map(|&(dr, dc)| from.offset(dr, dc))
            .collect()
    }

    fn lines(from: BoardCoordinate) -> Vec<BoardCoordinate> {
        let column = (0..ROWS).filter_map(|r| BoardCoordinate::new(r, from.col()));
        let row = (0..COLS).filter_map(|c| BoardCoordinate::new(from.row(), c));
        column.chain(row).filter(|&pos| pos != from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules::is_legal;

    fn at(r: usize, c: usize) -> BoardCoordinate {
        BoardCoordinate::new(r, c).unwrap()
    }

    #[test]
    fn test_opening_move_count() {
        let board = Board::new();
        let generator = MoveGenerator::new();
        assert_eq!(generator.count_legal_moves(&board, Color::Red), 44);
        assert_eq!(generator.count_legal_moves(&board, Color::Black), 44);
        assert_eq!(generator.generate_moves(&board, Color::Black).len(), 44);
        // Each cannon can already take the horse behind the opposing cannon
        assert_eq!(generator.generate_captures(&board, Color::Red).len(), 2);
    }

    #[test]
    fn test_moves_are_ordered_and_legal() {
        let board = Board::new();
        let moves = MoveGenerator::new().generate_moves(&board, Color::Black);
        let keys: Vec<_> = moves
            .iter()
            .map(|m| (m.from_row, m.from_col, m.to_row, m.to_col))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        assert!(moves.iter().all(|m| is_legal(&board, m)));
    }

    #[test]
    fn test_cannon_capture_generation() {
        let mut board = Board::empty();
        board.add_piece(at(9, 4), PieceType::King, Color::Red);
        board.add_piece(at(0, 3), PieceType::King, Color::Black);
        board.add_piece(at(5, 0), PieceType::Cannon, Color::Black);
        board.add_piece(at(5, 3), PieceType::Pawn, Color::Red);
        board.add_piece(at(5, 6), PieceType::Horse, Color::Red);

        let captures = MoveGenerator::new().generate_captures(&board, Color::Black);
        assert_eq!(captures.len(), 1);
        let mv = captures.first().unwrap();
        assert_eq!((mv.to_row, mv.to_col), (5, 6));
    }

    #[test]
    fn test_outcomes() {
        let generator = MoveGenerator::new();
        assert_eq!(
            generator.game_outcome(&Board::new(), Color::Red),
            GameOutcome::Ongoing
        );

        // Black king cornered by two chariots on rows 0 and 1
        let (board, _) = Board::from_fen("3k5/R8/9/9/9/9/9/9/9/R3K4 b").unwrap();
        assert!(!is_in_check(&board, Color::Black));
        let (board, _) = Board::from_fen("R2k5/9/9/9/9/9/9/9/9/1R2K4 b").unwrap();
        assert!(is_in_check(&board, Color::Black));
        let (mate, _) = Board::from_fen("R2k5/1R7/9/9/9/9/9/9/9/4K4 b").unwrap();
        assert!(generator.is_checkmate(&mate, Color::Black));
        assert_eq!(
            generator.game_outcome(&mate, Color::Black),
            GameOutcome::Checkmate {
                winner: Color::Red
            }
        );
    }
}
