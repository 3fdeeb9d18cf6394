use crate::logic::board::{Color, PieceType};

// Piece Values
pub const VAL_PAWN: i32 = 10;
pub const VAL_ADVISOR: i32 = 20;
pub const VAL_ELEPHANT: i32 = 20;
pub const VAL_HORSE: i32 = 40;
pub const VAL_CANNON: i32 = 45;
pub const VAL_CHARIOT: i32 = 90;
pub const VAL_KING: i32 = 10000;

pub const MOBILITY_WEIGHT: f64 = 0.5;
pub const QUIESCENCE_MAX_DEPTH: u8 = 2;

// Piece-Square Tables, written for the side whose home rank is row 9 (Red).
// Black pieces read the point-mirrored square (9 - row, 8 - col).
// The over-river pawn bonus lives in PST_PAWN rows 0-4.

#[rustfmt::skip]
pub const PST_PAWN: [[i32; 9]; 10] = [
    [  9,   9,   9,  11,  13,  11,   9,   9,   9], // Row 0 (Black back rank)
    [ 19,  24,  32,  37,  37,  37,  32,  24,  19],
    [ 19,  24,  32,  37,  37,  37,  32,  24,  19],
    [ 19,  23,  27,  29,  30,  29,  27,  23,  19],
    [ 14,  18,  20,  27,  29,  27,  20,  18,  14], // Just crossed
    [  7,   7,   7,   7,   7,   7,   7,   7,   7],
    [  5,   5,   5,   5,   5,   5,   5,   5,   5],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0], // Row 9 (Red back rank)
];

#[rustfmt::skip]
pub const PST_HORSE: [[i32; 9]; 10] = [
    [  0,  -2,   0,   2,   0,   2,   0,  -2,   0],
    [ -2,   0,   4,   2,   6,   2,   4,   0,  -2],
    [  0,   4,   2,   6,   4,   6,   2,   4,   0],
    [  2,   2,   6,   8,   6,   8,   6,   2,   2],
    [  0,   6,   8,  10,   8,  10,   8,   6,   0],
    [  2,   4,   6,   8,   6,   8,   6,   4,   2],
    [  0,   2,   4,   6,   4,   6,   4,   2,   0],
    [ -2,   0,   2,   4,   2,   4,   2,   0,  -2],
    [  0,  -2,   0,   2,   0,   2,   0,  -2,   0],
    [ -2,   0,   0,   0,   0,   0,   0,   0,  -2],
];

#[rustfmt::skip]
pub const PST_CHARIOT: [[i32; 9]; 10] = [
    [ 14,  14,  14,  15,  16,  15,  14,  14,  14],
    [ 14,  16,  16,  17,  18,  17,  16,  16,  14],
    [ 14,  16,  16,  17,  18,  17,  16,  16,  14],
    [ 14,  17,  17,  18,  19,  18,  17,  17,  14],
    [ 14,  17,  18,  19,  20,  19,  18,  17,  14],
    [ 14,  16,  17,  18,  19,  18,  17,  16,  14],
    [ 10,  14,  14,  16,  16,  16,  14,  14,  10],
    [  8,  12,  12,  14,  14,  14,  12,  12,   8],
    [  4,   8,   8,  10,  10,  10,   8,   8,   4],
    [  0,   0,   4,   6,   6,   6,   4,   0,   0],
];

#[rustfmt::skip]
pub const PST_CANNON: [[i32; 9]; 10] = [
    [  6,   7,   6,   6,   5,   6,   6,   7,   6],
    [  6,   8,   7,   7,   6,   7,   7,   8,   6],
    [  7,   8,   6,   8,   7,   8,   6,   8,   7],
    [  7,   9,   9,   9,   7,   9,   9,   9,   7],
    [  8,   8,   7,   9,   7,   9,   7,   8,   8],
    [  8,   9,   8,  10,   8,  10,   8,   9,   8],
    [  7,   8,   7,   9,   9,   9,   7,   8,   7],
    [  6,   7,   6,   8,   8,   8,   6,   7,   6],
    [  5,   6,   5,   7,   7,   7,   5,   6,   5],
    [  4,   4,   0,   5,   4,   5,   0,   4,   4],
];

#[rustfmt::skip]
pub const PST_ADVISOR: [[i32; 9]; 10] = [
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   1,   0,   1,   0,   0,   0],
    [  0,   0,   0,   0,   3,   0,   0,   0,   0],
    [  0,   0,   0,   1,   0,   1,   0,   0,   0],
];

#[rustfmt::skip]
pub const PST_ELEPHANT: [[i32; 9]; 10] = [
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   1,   0,   0,   0,   1,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  1,   0,   0,   0,   3,   0,   0,   0,   1],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   1,   0,   3,   0,   1,   0,   0],
];

#[rustfmt::skip]
pub const PST_KING: [[i32; 9]; 10] = [
    [  0,   0,   0,   1,   1,   1,   0,   0,   0],
    [  0,   0,   0,   1,   2,   1,   0,   0,   0],
    [  0,   0,   0,   1,   2,   1,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,  -2,  -3,  -2,   0,   0,   0],
    [  0,   0,   0,  -3,  -4,  -3,   0,   0,   0],
    [  0,   0,   0,  -2,  -3,  -2,   0,   0,   0],
];

pub fn get_pst_value(pt: PieceType, color: Color, row: usize, col: usize) -> i32 {
    let (r, c) = match color {
        Color::Red => (row, col),
        Color::Black => (9usize.saturating_sub(row), 8usize.saturating_sub(col)),
    };

    let table = match pt {
        PieceType::King => &PST_KING,
        PieceType::Advisor => &PST_ADVISOR,
        PieceType::Elephant => &PST_ELEPHANT,
        PieceType::Horse => &PST_HORSE,
        PieceType::Chariot => &PST_CHARIOT,
        PieceType::Cannon => &PST_CANNON,
        PieceType::Pawn => &PST_PAWN,
    };
    table
        .get(r)
        .and_then(|cells| cells.get(c))
        .copied()
        .unwrap_or(0)
}
