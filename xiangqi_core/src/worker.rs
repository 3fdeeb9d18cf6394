use crate::engine::config::EngineConfig;
use crate::engine::search::AlphaBetaEngine;
use crate::engine::{Move, SearchStats, Searcher};
use crate::logic::board::{Board, Color, PieceType};
use crate::logic::generator::{GameOutcome, MoveGenerator};
use gloo_worker::{HandlerId, Worker, WorkerScope};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;

const fn default_side() -> Color {
    Color::Black
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum SearchRequest {
    FindBestMove {
        board: Board,
        depth: u8,
        #[serde(default = "default_side")]
        side: Color,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        config: Option<EngineConfig>,
    },
}

impl SearchRequest {
    pub fn find_best_move(board: Board, depth: u8) -> Self {
        Self::FindBestMove {
            board,
            depth,
            side: Color::Black,
            config: None,
        }
    }
}

/// Why a search produced no move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Checkmate,
    Stalemate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum SearchResponse {
    BestMove {
        #[serde(rename = "move")]
        mv: Option<Move>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outcome: Option<Outcome>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stats: Option<SearchStats>,
    },
}

impl SearchResponse {
    pub const fn best_move(&self) -> Option<&Move> {
        match self {
            Self::BestMove { mv, .. } => mv.as_ref(),
        }
    }

    const fn no_move(outcome: Outcome) -> Self {
        Self::BestMove {
            mv: None,
            outcome: Some(outcome),
            stats: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("search depth must be at least 1")]
    ZeroDepth,
    #[error("search was cancelled")]
    Cancelled,
    #[error("{color:?} must have exactly one king, found {count}")]
    KingCount { color: Color, count: usize },
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Runs one request to completion. `Ok(None)` means `stop` was raised
/// before the search finished.
fn run(
    request: SearchRequest,
    defaults: &Arc<EngineConfig>,
    stop: Arc<AtomicBool>,
) -> Result<Option<SearchResponse>, ProtocolError> {
    let SearchRequest::FindBestMove {
        board,
        depth,
        side,
        config,
    } = request;

    if depth == 0 {
        return Err(ProtocolError::ZeroDepth);
    }
    check_kings(&board)?;

    match MoveGenerator::new().game_outcome(&board, side) {
        GameOutcome::Ongoing => {}
        GameOutcome::Checkmate { winner } => {
            info!("{side:?} is checkmated, {winner:?} wins");
            return Ok(Some(SearchResponse::no_move(Outcome::Checkmate)));
        }
        GameOutcome::Stalemate => {
            info!("{side:?} has no legal move, stalemate");
            return Ok(Some(SearchResponse::no_move(Outcome::Stalemate)));
        }
    }

    let config = config.map_or_else(|| defaults.clone(), Arc::new);
    let mut engine = AlphaBetaEngine::with_stop_flag(config, stop);

    Ok(engine
        .search(&board, side, depth)
        .map(|(mv, stats)| SearchResponse::BestMove {
            mv: Some(mv),
            outcome: None,
            stats: Some(stats),
        }))
}

fn check_kings(board: &Board) -> Result<(), ProtocolError> {
    for color in [Color::Red, Color::Black] {
        let count = board
            .pieces_of(color)
            .filter(|(_, piece)| piece.piece_type == PieceType::King)
            .count();
        if count != 1 {
            return Err(ProtocolError::KingCount { color, count });
        }
    }
    Ok(())
}

pub fn handle_request(
    request: SearchRequest,
    defaults: &Arc<EngineConfig>,
) -> Result<SearchResponse, ProtocolError> {
    run(request, defaults, Arc::new(AtomicBool::new(false)))?.ok_or(ProtocolError::Cancelled)
}

/// One JSON request in, one JSON response out.
pub fn handle_json(message: &str, defaults: &Arc<EngineConfig>) -> Result<String, ProtocolError> {
    let request: SearchRequest = serde_json::from_str(message)?;
    let response = handle_request(request, defaults)?;
    Ok(serde_json::to_string(&response)?)
}

/// The reply sent in place of a response when a request is rejected.
pub fn error_reply(error: &ProtocolError) -> String {
    serde_json::json!({ "error": error.to_string() }).to_string()
}

/// A search running on its own thread. Delivers at most one message.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct SearchTask {
    stop: Arc<AtomicBool>,
    rx: crossbeam_channel::Receiver<Result<SearchResponse, ProtocolError>>,
    join: Option<std::thread::JoinHandle<()>>,
}

#[cfg(not(target_arch = "wasm32"))]
impl SearchTask {
    pub fn cancel(&self) {
        self.stop.store(true, std::sync::atomic::Ordering::Relaxed);
    }

    /// Blocks until the search ends. `None` if it was cancelled.
    pub fn wait(mut self) -> Option<Result<SearchResponse, ProtocolError>> {
        let result = self.rx.recv().ok();
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!("search thread panicked");
            }
        }
        result
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_search(request: SearchRequest, defaults: Arc<EngineConfig>) -> SearchTask {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_for_thread = Arc::clone(&stop);
    let (tx, rx) = crossbeam_channel::bounded(1);
    let join = std::thread::spawn(move || {
        let message = match run(request, &defaults, stop_for_thread) {
            Ok(Some(response)) => Ok(response),
            Ok(None) => return,
            Err(e) => Err(e),
        };
        let _ = tx.send(message);
    });
    SearchTask {
        stop,
        rx,
        join: Some(join),
    }
}

/// Browser-side host for the engine. Messages travel as JSON text so the
/// tagged wire format survives the worker codec unchanged. A rejected
/// request is answered with an `{"error": ...}` object.
pub struct SearchWorker {
    defaults: Arc<EngineConfig>,
}

impl Worker for SearchWorker {
    type Input = String;
    type Message = ();
    type Output = String;

    fn create(_scope: &WorkerScope<Self>) -> Self {
        Self {
            defaults: Arc::new(EngineConfig::default()),
        }
    }

    fn update(&mut self, _scope: &WorkerScope<Self>, _msg: Self::Message) {}

    fn received(&mut self, scope: &WorkerScope<Self>, msg: Self::Input, id: HandlerId) {
        match handle_json(&msg, &self.defaults) {
            Ok(response) => scope.respond(id, response),
            Err(e) => {
                warn!("rejected search request: {e}");
                scope.respond(id, error_reply(&e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Arc<EngineConfig> {
        Arc::new(EngineConfig::default())
    }

    #[test]
    fn test_request_wire_format() {
        let board = serde_json::to_value(Board::new()).unwrap();
        let json = serde_json::json!({
            "command": "findBestMove",
            "board": board,
            "depth": 2
        });
        let request: SearchRequest = serde_json::from_value(json).unwrap();
        let SearchRequest::FindBestMove {
            depth, side, config, ..
        } = request;
        assert_eq!(depth, 2);
        assert_eq!(side, Color::Black);
        assert!(config.is_none());
    }

    #[test]
    fn test_zero_depth_rejected() {
        let request = SearchRequest::find_best_move(Board::new(), 0);
        assert!(matches!(
            handle_request(request, &defaults()),
            Err(ProtocolError::ZeroDepth)
        ));
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(matches!(
            handle_json("{\"command\":\"findBestMove\"", &defaults()),
            Err(ProtocolError::Json(_))
        ));
        assert!(matches!(
            handle_json("{\"command\":\"castle\"}", &defaults()),
            Err(ProtocolError::Json(_))
        ));
    }

    #[test]
    fn test_checkmate_reports_outcome() {
        let (board, _) = Board::from_fen("R2k5/1R7/9/9/9/9/9/9/9/4K4 b").unwrap();
        let response =
            handle_request(SearchRequest::find_best_move(board, 3), &defaults()).unwrap();
        assert_eq!(response, SearchResponse::no_move(Outcome::Checkmate));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["result"], "bestMove");
        assert!(json["move"].is_null());
        assert_eq!(json["outcome"], "checkmate");
    }

    #[test]
    fn test_wrong_king_count_rejected() {
        // Only a Red king: must not read as Black being checkmated
        let (board, _) = Board::from_fen("9/9/9/9/r8/9/9/9/9/3K5 b").unwrap();
        let err = handle_request(SearchRequest::find_best_move(board, 2), &defaults()).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::KingCount {
                color: Color::Black,
                count: 0
            }
        ));

        let (board, _) = Board::from_fen("4k4/9/9/9/r8/9/9/9/9/9 b").unwrap();
        let err = handle_request(SearchRequest::find_best_move(board, 2), &defaults()).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::KingCount {
                color: Color::Red,
                count: 0
            }
        ));

        let (board, _) = Board::from_fen("3k1k3/9/9/9/9/9/9/9/9/3K5 b").unwrap();
        let err = handle_request(SearchRequest::find_best_move(board, 1), &defaults()).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::KingCount {
                color: Color::Black,
                count: 2
            }
        ));
    }

    #[test]
    fn test_error_reply_names_the_problem() {
        let err = handle_json(
            "{\"command\":\"findBestMove\",\"board\":[],\"depth\":0}",
            &defaults(),
        )
        .unwrap_err();
        let reply: serde_json::Value = serde_json::from_str(&error_reply(&err)).unwrap();
        assert!(reply["error"].as_str().unwrap().contains("malformed"));

        let reply = error_reply(&ProtocolError::ZeroDepth);
        let reply: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(reply["error"], "search depth must be at least 1");
    }

    #[test]
    fn test_spawned_search_delivers_once() {
        let task = spawn_search(SearchRequest::find_best_move(Board::new(), 1), defaults());
        let response = task.wait().unwrap().unwrap();
        let mv = response.best_move().unwrap();
        assert_eq!(mv.piece.color, Color::Black);
    }

    #[test]
    fn test_cancelled_search_delivers_nothing() {
        let task = spawn_search(SearchRequest::find_best_move(Board::new(), 6), defaults());
        task.cancel();
        assert!(task.wait().is_none());
    }
}
