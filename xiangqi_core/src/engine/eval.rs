use crate::engine::config::EngineConfig;
use crate::engine::{Evaluator, Score};
use crate::logic::board::{Board, Color};
use crate::logic::eval_constants::get_pst_value;
use crate::logic::generator::MoveGenerator;
use std::sync::Arc;

/// Material + piece-square + mobility, from Black's point of view.
pub struct SimpleEvaluator {
    config: Arc<EngineConfig>,
    generator: MoveGenerator,
}

impl SimpleEvaluator {
    pub const fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            config,
            generator: MoveGenerator::new(),
        }
    }

    /// Material plus positional score for one side.
    pub fn side_score(&self, board: &Board, color: Color) -> i32 {
        board
            .pieces_of(color)
            .map(|(pos, piece)| {
                self.config.piece_value(piece.piece_type)
                    + get_pst_value(piece.piece_type, color, pos.row(), pos.col())
            })
            .sum()
    }

    /// Legal-move count difference, Black minus Red.
    #[allow(clippy::cast_precision_loss)]
    pub fn mobility(&self, board: &Board) -> Score {
        let black = self.generator.count_legal_moves(board, Color::Black) as f64;
        let red = self.generator.count_legal_moves(board, Color::Red) as f64;
        black - red
    }
}

impl Evaluator for SimpleEvaluator {
    fn evaluate(&self, board: &Board) -> Score {
        let material =
            f64::from(self.side_score(board, Color::Black) - self.side_score(board, Color::Red));

        // Skip the two full enumerations when mobility is switched off
        if self.config.mobility_weight.abs() < f64::EPSILON {
            return material;
        }
        material + self.mobility(board) * self.config.mobility_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::{BoardCoordinate, PieceType};

    fn at(r: usize, c: usize) -> BoardCoordinate {
        BoardCoordinate::new(r, c).unwrap()
    }

    fn evaluator() -> SimpleEvaluator {
        SimpleEvaluator::new(Arc::new(EngineConfig::default()))
    }

    #[test]
    fn test_opening_is_balanced() {
        let score = evaluator().evaluate(&Board::new());
        assert!(score.abs() < f64::EPSILON, "opening scored {score}");
    }

    #[test]
    fn test_material_favours_black() {
        let mut board = Board::new();
        // Remove a Red chariot
        board.set_piece(at(9, 0), None);
        let score = evaluator().evaluate(&board);
        assert!(score > 80.0, "expected a large Black edge, got {score}");

        let mut board = Board::new();
        board.set_piece(at(0, 0), None);
        assert!(evaluator().evaluate(&board) < -80.0);
    }

    #[test]
    fn test_components_add_up() {
        let mut board = Board::empty();
        board.add_piece(at(9, 3), PieceType::King, Color::Red);
        board.add_piece(at(0, 4), PieceType::King, Color::Black);
        board.add_piece(at(0, 3), PieceType::Advisor, Color::Black);
        board.add_piece(at(4, 0), PieceType::Chariot, Color::Black);

        let eval = evaluator();
        let black = eval.side_score(&board, Color::Black);
        let red = eval.side_score(&board, Color::Red);
        // Black reads mirrored squares: king (0,4) -> (9,4) is -3,
        // advisor (0,3) -> (9,5) is 1, chariot (4,0) -> (5,8) is 14
        assert_eq!(black, 10000 - 3 + 20 + 1 + 90 + 14);
        assert_eq!(red, 10000 - 2);

        let expected = f64::from(black - red) + eval.mobility(&board) * 0.5;
        assert!((eval.evaluate(&board) - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mobility_weight_zero_is_pure_material() {
        let config = EngineConfig {
            mobility_weight: 0.0,
            ..EngineConfig::default()
        };
        let eval = SimpleEvaluator::new(Arc::new(config));
        let mut board = Board::new();
        board.set_piece(at(6, 0), None);
        // Missing Red pawn at (6,0): value 10 + pst 5
        assert!((eval.evaluate(&board) - 15.0).abs() < f64::EPSILON);
    }
}
