use crate::engine::config::EngineConfig;
use crate::engine::eval::SimpleEvaluator;
use crate::engine::{Evaluator, Move, Score, SearchStats, Searcher};
use crate::logic::board::{Board, Color};
use crate::logic::generator::MoveGenerator;
use crate::logic::rules::is_in_check;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use web_time::Instant;

/// Full-width minimax with alpha-beta pruning and a capture-only
/// quiescence tail. Black maximizes, Red minimizes.
pub struct AlphaBetaEngine {
    config: Arc<EngineConfig>,
    evaluator: SimpleEvaluator,
    generator: MoveGenerator,
    nodes_searched: u64,
    stop: Arc<AtomicBool>,
}

impl AlphaBetaEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self::with_stop_flag(config, Arc::new(AtomicBool::new(false)))
    }

    /// Engine that aborts as soon as `stop` is raised.
    pub fn with_stop_flag(config: Arc<EngineConfig>, stop: Arc<AtomicBool>) -> Self {
        Self {
            evaluator: SimpleEvaluator::new(config.clone()),
            config,
            generator: MoveGenerator::new(),
            nodes_searched: 0,
            stop,
        }
    }

    pub const fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    const fn side_for(maximizing: bool) -> Color {
        if maximizing {
            Color::Black
        } else {
            Color::Red
        }
    }

    fn child(board: &Board, mv: &Move) -> Option<Board> {
        Some(board.with_move(mv.source()?, mv.target()?, mv.piece))
    }

    /// Value of a node whose side to move has nothing to play.
    fn terminal_score(&self, board: &Board, side: Color, depth: u8) -> Score {
        if !is_in_check(board, side) {
            return 0.0;
        }
        let mate = self.config.mate_score + f64::from(depth);
        match side {
            Color::Black => -mate,
            Color::Red => mate,
        }
    }

    /// Returns `None` only when the search was stopped.
    pub fn minimax(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
    ) -> Option<Score> {
        self.nodes_searched += 1;
        if self.is_stopped() {
            return None;
        }

        if depth == 0 {
            let q_depth = self.config.quiescence_depth;
            return self.quiesce(board, alpha, beta, maximizing, q_depth);
        }

        let side = Self::side_for(maximizing);
        let moves = self.generator.generate_moves(board, side);
        if moves.is_empty() {
            return Some(self.terminal_score(board, side, depth));
        }

        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        for mv in &moves {
            let Some(next) = Self::child(board, mv) else {
                continue;
            };
            let score = self.minimax(&next, depth - 1, alpha, beta, !maximizing)?;
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }
        Some(best)
    }

    /// Capture-only extension. Stand-pat is both the floor (for the side to
    /// move) and the answer once `depth` runs out or nothing can be taken.
    pub fn quiesce(
        &mut self,
        board: &Board,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
        depth: u8,
    ) -> Option<Score> {
        self.nodes_searched += 1;
        if self.is_stopped() {
            return None;
        }

        let stand_pat = self.evaluator.evaluate(board);
        if depth == 0 {
            return Some(stand_pat);
        }

        if maximizing {
            if stand_pat >= beta {
                return Some(stand_pat);
            }
            alpha = alpha.max(stand_pat);
        } else {
            if stand_pat <= alpha {
                return Some(stand_pat);
            }
            beta = beta.min(stand_pat);
        }

        let captures = self
            .generator
            .generate_captures(board, Self::side_for(maximizing));

        let mut best = stand_pat;
        for mv in &captures {
            let Some(next) = Self::child(board, mv) else {
                continue;
            };
            let score = self.quiesce(&next, alpha, beta, !maximizing, depth - 1)?;
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if beta <= alpha {
                break;
            }
        }
        Some(best)
    }

    /// Best move for Black, the engine's usual side.
    pub fn find_best_move(&mut self, board: &Board, depth: u8) -> Option<Move> {
        self.search(board, Color::Black, depth).map(|(mv, _)| mv)
    }

    fn search_root(&mut self, board: &Board, side: Color, depth: u8) -> Option<(Move, Score)> {
        let maximizing = side == Color::Black;
        let mut alpha = f64::NEG_INFINITY;
        let mut beta = f64::INFINITY;
        let mut best: Option<(Move, Score)> = None;

        for mv in self.generator.generate_moves(board, side) {
            let Some(next) = Self::child(board, &mv) else {
                continue;
            };
            let score = self.minimax(&next, depth.saturating_sub(1), alpha, beta, !maximizing)?;

            // Strict comparison: the earliest move keeps ties
            let improves = best.is_none_or(|(_, best_score)| {
                if maximizing {
                    score > best_score
                } else {
                    score < best_score
                }
            });
            if improves {
                best = Some((mv, score));
            }
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
        }
        best
    }
}

impl Searcher for AlphaBetaEngine {
    fn search(&mut self, board: &Board, side: Color, depth: u8) -> Option<(Move, SearchStats)> {
        self.nodes_searched = 0;
        let start = Instant::now();

        let result = self.search_root(board, side, depth);
        let time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Some((mv, score)) => {
                debug!(
                    "{side:?} depth {depth}: {mv} score {score} ({} nodes, {time_ms} ms)",
                    self.nodes_searched
                );
                Some((
                    mv,
                    SearchStats {
                        depth,
                        nodes: self.nodes_searched,
                        time_ms,
                    },
                ))
            }
            None if self.is_stopped() => {
                debug!("search stopped after {} nodes", self.nodes_searched);
                None
            }
            None => {
                debug!("{side:?} has no legal move");
                None
            }
        }
    }
}
