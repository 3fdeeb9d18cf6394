use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ROWS: usize = 10;
pub const COLS: usize = 9;
pub const SQUARES: usize = ROWS * COLS;

/// Wire layout of a board: ten rows of nine nullable pieces, row 0 first.
pub type Grid = [[Option<Piece>; COLS]; ROWS];

/// Red moves first and owns rows 5-9; Black owns rows 0-4 and is the side
/// the engine plays in the standard setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
}

impl Color {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    pub const fn code(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Black => 'B',
        }
    }

    pub const fn from_code(c: char) -> Option<Self> {
        match c {
            'R' => Some(Self::Red),
            'B' => Some(Self::Black),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    King,
    Advisor,
    Elephant,
    Horse,
    Chariot,
    Cannon,
    Pawn,
}

impl PieceType {
    /// Second character of a wire piece code.
    pub const fn code(self) -> char {
        match self {
            Self::King => 'K',
            Self::Advisor => 'A',
            Self::Elephant => 'E',
            Self::Horse => 'H',
            Self::Chariot => 'R',
            Self::Cannon => 'C',
            Self::Pawn => 'P',
        }
    }

    pub const fn from_code(c: char) -> Option<Self> {
        match c {
            'K' => Some(Self::King),
            'A' => Some(Self::Advisor),
            'E' => Some(Self::Elephant),
            'H' => Some(Self::Horse),
            'R' => Some(Self::Chariot),
            'C' => Some(Self::Cannon),
            'P' => Some(Self::Pawn),
            _ => None,
        }
    }

    const fn fen_char(self) -> char {
        match self {
            Self::King => 'k',
            Self::Advisor => 'a',
            Self::Elephant => 'b',
            Self::Horse => 'n',
            Self::Chariot => 'r',
            Self::Cannon => 'c',
            Self::Pawn => 'p',
        }
    }

    const fn from_fen_char(c: char) -> Option<Self> {
        match c {
            'k' => Some(Self::King),
            'a' => Some(Self::Advisor),
            'b' | 'e' => Some(Self::Elephant),
            'n' | 'h' => Some(Self::Horse),
            'r' => Some(Self::Chariot),
            'c' => Some(Self::Cannon),
            'p' => Some(Self::Pawn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PieceCodeError {
    #[error("piece code `{0}` is shorter than two characters")]
    TooShort(String),
    #[error("unknown side in piece code `{0}`")]
    UnknownSide(String),
    #[error("unknown piece type in piece code `{0}`")]
    UnknownType(String),
    #[error("piece code `{0}` has a non-numeric instance suffix")]
    BadSuffix(String),
}

/// A side plus a type. Two pieces with the same side and type are
/// interchangeable; instance numbering on the wire is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub const fn new(color: Color, piece_type: PieceType) -> Self {
        Self { piece_type, color }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color.code(), self.piece_type.code())
    }
}

impl FromStr for Piece {
    type Err = PieceCodeError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let mut chars = code.chars();
        let (Some(side), Some(kind)) = (chars.next(), chars.next()) else {
            return Err(PieceCodeError::TooShort(code.to_owned()));
        };
        let color =
            Color::from_code(side).ok_or_else(|| PieceCodeError::UnknownSide(code.to_owned()))?;
        let piece_type =
            PieceType::from_code(kind).ok_or_else(|| PieceCodeError::UnknownType(code.to_owned()))?;
        if !chars.all(|c| c.is_ascii_digit()) {
            return Err(PieceCodeError::BadSuffix(code.to_owned()));
        }
        Ok(Self { piece_type, color })
    }
}

impl TryFrom<String> for Piece {
    type Error = PieceCodeError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl From<Piece> for String {
    fn from(piece: Piece) -> Self {
        piece.to_string()
    }
}

/// An on-board square. Out-of-range coordinates cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardCoordinate {
    pub(crate) row: usize,
    pub(crate) col: usize,
}

impl BoardCoordinate {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Option<Self> {
        if row < ROWS && col < COLS {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Signed variant used when stepping by offsets.
    #[must_use]
    pub fn from_signed(row: isize, col: isize) -> Option<Self> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        Self::new(row, col)
    }

    #[must_use]
    pub const fn from_index(sq: usize) -> Option<Self> {
        Self::new(sq / COLS, sq % COLS)
    }

    pub const fn row(self) -> usize {
        self.row
    }

    pub const fn col(self) -> usize {
        self.col
    }

    pub const fn index(self) -> usize {
        self.row * COLS + self.col
    }

    #[must_use]
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        #[allow(clippy::cast_possible_wrap)]
        let (row, col) = (self.row as isize, self.col as isize);
        Self::from_signed(row + d_row, col + d_col)
    }

    /// Every square in row-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..SQUARES).filter_map(Self::from_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 10 rows, found {0}")]
    WrongRowCount(usize),
    #[error("row {0} does not describe exactly 9 squares")]
    BadRowWidth(usize),
    #[error("unknown piece letter `{0}`")]
    UnknownPiece(char),
    #[error("unknown side to move `{0}`")]
    BadTurn(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Grid", into = "Grid")]
pub struct Board {
    // Mailbox, index = row * 9 + col
    grid: [Option<Piece>; SQUARES],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard opening position.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self::empty();
        // Black on top (rows 0-3), Red at the bottom (rows 6-9)
        board.setup_pieces(Color::Black, 0, 2, 3);
        board.setup_pieces(Color::Red, 9, 7, 6);
        board
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            grid: [None; SQUARES],
        }
    }

    fn setup_pieces(&mut self, color: Color, back_row: usize, cannon_row: usize, pawn_row: usize) {
        let pieces = [
            PieceType::Chariot,
            PieceType::Horse,
            PieceType::Elephant,
            PieceType::Advisor,
            PieceType::King,
            PieceType::Advisor,
            PieceType::Elephant,
            PieceType::Horse,
            PieceType::Chariot,
        ];

        for (col, &pt) in pieces.iter().enumerate() {
            self.put(back_row, col, Some(Piece::new(color, pt)));
        }

        self.put(cannon_row, 1, Some(Piece::new(color, PieceType::Cannon)));
        self.put(cannon_row, 7, Some(Piece::new(color, PieceType::Cannon)));

        for col in (0..COLS).step_by(2) {
            self.put(pawn_row, col, Some(Piece::new(color, PieceType::Pawn)));
        }
    }

    fn put(&mut self, row: usize, col: usize, piece: Option<Piece>) {
        if let Some(slot) = self.grid.get_mut(row * COLS + col) {
            *slot = piece;
        }
    }

    #[must_use]
    pub fn get_piece(&self, pos: BoardCoordinate) -> Option<Piece> {
        self.grid.get(pos.index()).copied().flatten()
    }

    /// Raw lookup; anything off the board reads as empty.
    #[must_use]
    pub fn piece_at(&self, row: usize, col: usize) -> Option<Piece> {
        BoardCoordinate::new(row, col).and_then(|pos| self.get_piece(pos))
    }

    pub fn set_piece(&mut self, pos: BoardCoordinate, piece: Option<Piece>) {
        self.put(pos.row, pos.col, piece);
    }

    pub fn add_piece(&mut self, pos: BoardCoordinate, piece_type: PieceType, color: Color) {
        self.set_piece(pos, Some(Piece::new(color, piece_type)));
    }

    /// Moves whatever stands on `from` to `to` in place and returns the
    /// captured piece, if any.
    pub fn move_piece_quiet(
        &mut self,
        from: BoardCoordinate,
        to: BoardCoordinate,
    ) -> Option<Piece> {
        let piece = self.get_piece(from);
        let captured = self.get_piece(to);
        self.set_piece(from, None);
        self.set_piece(to, piece);
        captured
    }

    /// Copy of this board with `piece` placed on `to` and `from` emptied.
    /// The receiver is never touched, so sibling search branches stay
    /// independent.
    #[must_use]
    pub fn with_move(&self, from: BoardCoordinate, to: BoardCoordinate, piece: Piece) -> Self {
        let mut next = self.clone();
        next.set_piece(from, None);
        next.set_piece(to, Some(piece));
        next
    }

    #[must_use]
    pub fn find_king(&self, color: Color) -> Option<BoardCoordinate> {
        self.pieces()
            .find(|(_, p)| p.color == color && p.piece_type == PieceType::King)
            .map(|(pos, _)| pos)
    }

    /// Occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (BoardCoordinate, Piece)> + '_ {
        self.grid.iter().enumerate().filter_map(|(sq, cell)| {
            let piece = (*cell)?;
            BoardCoordinate::from_index(sq).map(|pos| (pos, piece))
        })
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (BoardCoordinate, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    #[must_use]
    pub fn to_fen_string(&self, turn: Color) -> String {
        let mut fen = String::new();
        for r in 0..ROWS {
            let mut empty_count = 0;
            for c in 0..COLS {
                if let Some(piece) = self.piece_at(r, c) {
                    if empty_count > 0 {
                        fen.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    let letter = piece.piece_type.fen_char();
                    fen.push(if piece.color == Color::Red {
                        letter.to_ascii_uppercase()
                    } else {
                        letter
                    });
                } else {
                    empty_count += 1;
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if r + 1 < ROWS {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if turn == Color::Red { 'w' } else { 'b' });
        fen
    }

    /// Parses the placement and (optional) side-to-move fields of a FEN
    /// string. Row 0 (Black's back rank) comes first.
    pub fn from_fen(fen: &str) -> Result<(Self, Color), FenError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().unwrap_or_default();
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != ROWS {
            return Err(FenError::WrongRowCount(rows.len()));
        }

        let mut board = Self::empty();
        for (r, row) in rows.iter().enumerate() {
            let mut c = 0;
            for ch in row.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    if skip == 0 {
                        return Err(FenError::BadRowWidth(r));
                    }
                    c += skip as usize;
                    continue;
                }
                let piece_type = PieceType::from_fen_char(ch.to_ascii_lowercase())
                    .ok_or(FenError::UnknownPiece(ch))?;
                let color = if ch.is_ascii_uppercase() {
                    Color::Red
                } else {
                    Color::Black
                };
                if c >= COLS {
                    return Err(FenError::BadRowWidth(r));
                }
                board.put(r, c, Some(Piece::new(color, piece_type)));
                c += 1;
            }
            if c != COLS {
                return Err(FenError::BadRowWidth(r));
            }
        }

        let turn = match fields.next() {
            None | Some("w" | "r") => Color::Red,
            Some("b") => Color::Black,
            Some(other) => return Err(FenError::BadTurn(other.to_owned())),
        };
        Ok((board, turn))
    }
}

impl From<Grid> for Board {
    fn from(rows: Grid) -> Self {
        let mut board = Self::empty();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                board.put(r, c, *cell);
            }
        }
        board
    }
}

impl From<Board> for Grid {
    fn from(board: Board) -> Self {
        let mut rows = [[None; COLS]; ROWS];
        for (pos, piece) in board.pieces() {
            if let Some(cell) = rows.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) {
                *cell = Some(piece);
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(r: usize, c: usize) -> BoardCoordinate {
        BoardCoordinate::new(r, c).unwrap()
    }

    #[test]
    fn test_initial_setup() {
        let board = Board::new();
        let piece = board.get_piece(at(9, 4)).unwrap();
        assert_eq!(piece, Piece::new(Color::Red, PieceType::King));

        let piece = board.get_piece(at(0, 4)).unwrap();
        assert_eq!(piece, Piece::new(Color::Black, PieceType::King));

        assert_eq!(board.pieces_of(Color::Red).count(), 16);
        assert_eq!(board.pieces_of(Color::Black).count(), 16);
    }

    #[test]
    fn test_fen_generation() {
        let board = Board::new();
        assert_eq!(
            board.to_fen_string(Color::Red),
            "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w"
        );
    }

    #[test]
    fn test_fen_parse_matches_initial() {
        let (board, turn) =
            Board::from_fen("rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR b")
                .unwrap();
        assert_eq!(board, Board::new());
        assert_eq!(turn, Color::Black);
    }

    #[test]
    fn test_fen_rejects_bad_input() {
        assert_eq!(Board::from_fen("9/9"), Err(FenError::WrongRowCount(2)));
        assert_eq!(
            Board::from_fen("4k5/9/9/9/9/9/9/9/9/4K4"),
            Err(FenError::BadRowWidth(0))
        );
        assert_eq!(
            Board::from_fen("4x4/9/9/9/9/9/9/9/9/4K4"),
            Err(FenError::UnknownPiece('x'))
        );
        // A zero gap is not a gap, even when the row still adds up
        assert_eq!(
            Board::from_fen("9/9/9/9/9/9/9/9/9/3K05"),
            Err(FenError::BadRowWidth(9))
        );
    }

    #[test]
    fn test_piece_codes() {
        assert_eq!(
            "BR1".parse::<Piece>().unwrap(),
            Piece::new(Color::Black, PieceType::Chariot)
        );
        assert_eq!(
            "RK".parse::<Piece>().unwrap(),
            Piece::new(Color::Red, PieceType::King)
        );
        assert!(matches!("R".parse::<Piece>(), Err(PieceCodeError::TooShort(_))));
        assert!(matches!("XK".parse::<Piece>(), Err(PieceCodeError::UnknownSide(_))));
        assert!(matches!("RZ".parse::<Piece>(), Err(PieceCodeError::UnknownType(_))));
        assert!(matches!("RKx".parse::<Piece>(), Err(PieceCodeError::BadSuffix(_))));
        assert_eq!(Piece::new(Color::Black, PieceType::Horse).to_string(), "BH");
    }

    #[test]
    fn test_grid_serde() {
        let board = Board::new();
        let json = serde_json::to_string(&board).unwrap();
        assert!(json.starts_with(r#"[["BR","BH","BE","BA","BK""#));
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_with_move_leaves_original() {
        let board = Board::new();
        let pawn = board.get_piece(at(6, 4)).unwrap();
        let next = board.with_move(at(6, 4), at(5, 4), pawn);

        assert_eq!(board.get_piece(at(6, 4)), Some(pawn));
        assert!(next.get_piece(at(6, 4)).is_none());
        assert_eq!(next.get_piece(at(5, 4)), Some(pawn));
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(BoardCoordinate::new(10, 0).is_none());
        assert!(BoardCoordinate::new(0, 9).is_none());
        assert!(BoardCoordinate::from_signed(-1, 3).is_none());
        assert_eq!(at(0, 0).offset(1, 2), Some(at(1, 2)));
        assert_eq!(BoardCoordinate::all().count(), SQUARES);
    }
}
