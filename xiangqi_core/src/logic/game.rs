use crate::engine::Move;
use crate::logic::board::{Board, BoardCoordinate, Color, Piece};
use crate::logic::generator::{GameOutcome, MoveGenerator};
use crate::logic::rules::{validate_move, MoveError};
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Checkmate(Color), // Winner
    Stalemate,
    Resigned(Color), // Winner
}

impl GameStatus {
    pub const fn winner(self) -> Option<Color> {
        match self {
            Self::Checkmate(c) | Self::Resigned(c) => Some(c),
            Self::Playing | Self::Stalemate => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    pub mv: Move,
    pub captured: Option<Piece>,
}

/// Games won by each side over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub red: u32,
    pub black: u32,
}

impl Tally {
    fn slot(&mut self, color: Color) -> &mut u32 {
        match color {
            Color::Red => &mut self.red,
            Color::Black => &mut self.black,
        }
    }
}

/// One game in progress: the board, whose turn it is, and how we got here.
/// `tally` survives [`GameState::restart`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub status: GameStatus,
    pub history: Vec<MoveRecord>,
    #[serde(default)]
    pub tally: Tally,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self::from_position(Board::new(), Color::Red)
    }

    /// Starts from an arbitrary position; the status is computed immediately.
    #[must_use]
    pub fn from_position(board: Board, turn: Color) -> Self {
        let mut state = Self {
            board,
            turn,
            status: GameStatus::Playing,
            history: Vec::new(),
            tally: Tally::default(),
        };
        state.update_status();
        state
    }

    /// Sets up a fresh opening with Red to move. The tally is kept unless
    /// `reset_tally` is set.
    pub fn restart(&mut self, reset_tally: bool) {
        let tally = if reset_tally {
            Tally::default()
        } else {
            self.tally
        };
        *self = Self::new();
        self.tally = tally;
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last().map(|record| &record.mv)
    }

    pub fn make_move(
        &mut self,
        from: BoardCoordinate,
        to: BoardCoordinate,
    ) -> Result<Move, MoveError> {
        if self.status != GameStatus::Playing {
            return Err(MoveError::GameOver);
        }

        validate_move(&self.board, from, to, self.turn)?;

        let piece = self
            .board
            .get_piece(from)
            .ok_or(MoveError::NoPieceAtSource)?;
        let captured = self.board.move_piece_quiet(from, to);
        let mv = Move::new(from, to, piece);

        self.history.push(MoveRecord { mv, captured });
        self.turn = self.turn.opposite();
        self.update_status();

        Ok(mv)
    }

    /// Plays an engine-supplied move through the same validation as a click.
    pub fn apply(&mut self, mv: &Move) -> Result<(), MoveError> {
        let from = mv.source().ok_or(MoveError::InvalidMovePattern)?;
        let to = mv.target().ok_or(MoveError::InvalidMovePattern)?;
        self.make_move(from, to).map(|_| ())
    }

    /// Takes back the last ply. Works on finished games too.
    pub fn undo_move(&mut self) -> Option<MoveRecord> {
        let record = self.history.pop()?;
        let (Some(from), Some(to)) = (record.mv.source(), record.mv.target()) else {
            return None;
        };
        self.board.set_piece(from, Some(record.mv.piece));
        self.board.set_piece(to, record.captured);
        self.turn = record.mv.piece.color;
        if let Some(winner) = self.status.winner() {
            let won = self.tally.slot(winner);
            *won = won.saturating_sub(1);
        }
        self.status = GameStatus::Playing;
        Some(record)
    }

    /// Takes back the engine's reply and the player's move before it.
    /// Refused once the game is over or with fewer than two plies played.
    pub fn undo_turn(&mut self) -> bool {
        if self.status != GameStatus::Playing || self.history.len() < 2 {
            return false;
        }
        self.undo_move();
        self.undo_move();
        true
    }

    pub fn resign(&mut self, side: Color) {
        if self.status == GameStatus::Playing {
            self.status = GameStatus::Resigned(side.opposite());
            *self.tally.slot(side.opposite()) += 1;
            info!("{side:?} resigned");
        }
    }

    fn update_status(&mut self) {
        self.status = match MoveGenerator::new().game_outcome(&self.board, self.turn) {
            GameOutcome::Ongoing => GameStatus::Playing,
            GameOutcome::Checkmate { winner } => GameStatus::Checkmate(winner),
            GameOutcome::Stalemate => GameStatus::Stalemate,
        };
        if self.status != GameStatus::Playing {
            if let Some(winner) = self.status.winner() {
                *self.tally.slot(winner) += 1;
            }
            info!("game over: {:?}", self.status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::PieceType;

    fn at(r: usize, c: usize) -> BoardCoordinate {
        BoardCoordinate::new(r, c).unwrap()
    }

    #[test]
    fn test_make_move_switches_turn() {
        let mut game = GameState::new();
        let mv = game.make_move(at(7, 1), at(7, 4)).unwrap();
        assert_eq!(mv.piece, Piece::new(Color::Red, PieceType::Cannon));
        assert_eq!(game.turn, Color::Black);
        assert_eq!(game.history.len(), 1);
        assert_eq!(game.last_move(), Some(&mv));
        assert_eq!(
            game.board.get_piece(at(7, 4)),
            Some(Piece::new(Color::Red, PieceType::Cannon))
        );
    }

    #[test]
    fn test_rejects_wrong_side_and_bad_pattern() {
        let mut game = GameState::new();
        assert_eq!(
            game.make_move(at(0, 0), at(1, 0)),
            Err(MoveError::NotYourTurn)
        );
        assert_eq!(
            game.make_move(at(5, 5), at(4, 5)),
            Err(MoveError::NoPieceAtSource)
        );
        assert!(game.make_move(at(9, 1), at(8, 1)).is_err());
        assert!(game.history.is_empty());
        assert_eq!(game.turn, Color::Red);
    }

    #[test]
    fn test_capture_and_undo_restores() {
        let mut game = GameState::new();
        // Cannon takes the horse through the opposing cannon
        game.make_move(at(7, 1), at(0, 1)).unwrap();
        assert_eq!(
            game.history.last().and_then(|r| r.captured),
            Some(Piece::new(Color::Black, PieceType::Horse))
        );

        let record = game.undo_move().unwrap();
        assert_eq!(record.mv.to_row, 0);
        assert_eq!(game.turn, Color::Red);
        assert_eq!(
            game.board.to_fen_string(game.turn),
            Board::new().to_fen_string(Color::Red)
        );
    }

    #[test]
    fn test_undo_turn_needs_two_plies() {
        let mut game = GameState::new();
        assert!(!game.undo_turn());
        game.make_move(at(6, 4), at(5, 4)).unwrap();
        assert!(!game.undo_turn());
        game.make_move(at(3, 4), at(4, 4)).unwrap();
        assert!(game.undo_turn());
        assert!(game.history.is_empty());
        assert_eq!(game.turn, Color::Red);
        assert_eq!(game.board.get_piece(at(6, 4)).map(|p| p.piece_type), Some(PieceType::Pawn));
    }

    #[test]
    fn test_checkmate_ends_game() {
        // Red to deliver mate with the second chariot
        let (board, turn) = Board::from_fen("R2k5/9/9/9/9/9/9/9/1R7/4K4 w").unwrap();
        let mut game = GameState::from_position(board, turn);
        game.make_move(at(8, 1), at(1, 1)).unwrap();
        assert_eq!(game.status, GameStatus::Checkmate(Color::Red));
        assert_eq!(game.status.winner(), Some(Color::Red));
        assert_eq!(game.make_move(at(9, 4), at(8, 4)), Err(MoveError::GameOver));
        assert!(!game.undo_turn());

        // A single undo still reopens the game
        game.undo_move().unwrap();
        assert_eq!(game.status, GameStatus::Playing);
        assert_eq!(game.turn, Color::Red);
    }

    #[test]
    fn test_stalemate_has_no_winner() {
        let mut board = Board::empty();
        board.add_piece(at(0, 3), PieceType::King, Color::Black);
        board.add_piece(at(9, 4), PieceType::King, Color::Red);
        board.add_piece(at(5, 2), PieceType::Chariot, Color::Red);
        let mut game = GameState::from_position(board, Color::Red);
        assert_eq!(game.status, GameStatus::Playing);

        game.make_move(at(5, 2), at(1, 2)).unwrap();
        assert_eq!(game.status, GameStatus::Stalemate);
        assert_eq!(game.status.winner(), None);
    }

    #[test]
    fn test_resign() {
        let mut game = GameState::new();
        game.resign(Color::Red);
        assert_eq!(game.status, GameStatus::Resigned(Color::Black));
        // Resigning twice keeps the first result
        game.resign(Color::Black);
        assert_eq!(game.status.winner(), Some(Color::Black));
        assert_eq!(game.tally, Tally { red: 0, black: 1 });
    }

    #[test]
    fn test_tally_across_games() {
        let (board, turn) = Board::from_fen("R2k5/9/9/9/9/9/9/9/1R7/4K4 w").unwrap();
        let mut game = GameState::from_position(board, turn);
        game.make_move(at(8, 1), at(1, 1)).unwrap();
        assert_eq!(game.tally, Tally { red: 1, black: 0 });

        // Taking the mating move back takes the point back
        game.undo_move().unwrap();
        assert_eq!(game.tally, Tally::default());
        game.make_move(at(8, 1), at(1, 1)).unwrap();

        game.restart(false);
        assert_eq!(game.status, GameStatus::Playing);
        assert!(game.history.is_empty());
        game.resign(Color::Red);
        assert_eq!(game.tally, Tally { red: 1, black: 1 });

        // Stalemate scores nobody
        game.restart(false);
        let mut board = Board::empty();
        board.add_piece(at(0, 3), PieceType::King, Color::Black);
        board.add_piece(at(9, 4), PieceType::King, Color::Red);
        board.add_piece(at(5, 2), PieceType::Chariot, Color::Red);
        game.board = board;
        game.make_move(at(5, 2), at(1, 2)).unwrap();
        assert_eq!(game.status, GameStatus::Stalemate);
        assert_eq!(game.tally, Tally { red: 1, black: 1 });

        game.restart(true);
        assert_eq!(game.tally, Tally::default());
    }
}
