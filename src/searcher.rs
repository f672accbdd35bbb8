//! Iterative-deepening minimax with principal variation tracking and
//! cooperative cancellation. No pruning, no caching; position mutation goes
//! through make/unmake so the search never clones the board.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::board::color::Color;
use crate::board::Board;
use crate::chess_move::ChessMove;
use crate::evaluate;
use crate::moves;

/// Receives one progress report per completed search depth. The UCI layer
/// turns these into `info` lines; tests collect them; `NullReporter` drops
/// them.
pub trait InfoReporter: Send {
    fn report_info(&self, depth: u8, score: f32, pv: &[ChessMove]);
}

pub struct NullReporter;

impl InfoReporter for NullReporter {
    fn report_info(&self, _depth: u8, _score: f32, _pv: &[ChessMove]) {}
}

#[derive(Error, Debug, PartialEq)]
pub enum SearchError {
    #[error("no available moves")]
    NoAvailableMoves,
    #[error("depth must be at least 1")]
    DepthTooLow,
}

pub struct Searcher {
    search_depth: u8,
    reporter: Box<dyn InfoReporter>,
    stop_flag: Arc<AtomicBool>,
    last_best_evaluation: f32,
    pub last_searched_position_count: u32,
}

impl Searcher {
    pub fn new(depth: u8) -> Self {
        Self::with_reporter(depth, Box::new(NullReporter))
    }

    pub fn with_reporter(depth: u8, reporter: Box<dyn InfoReporter>) -> Self {
        Self {
            search_depth: depth,
            reporter,
            stop_flag: Arc::new(AtomicBool::new(false)),
            last_best_evaluation: 0.0,
            last_searched_position_count: 0,
        }
    }

    /// Shared cancellation flag. Setting it stops the search within one
    /// node's worth of work.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    pub fn search_depth(&self) -> u8 {
        self.search_depth
    }

    fn stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }

    /// Runs depth 1, 2, … up to the configured depth, reporting each
    /// completed depth, and returns the best move of the last depth that
    /// finished. Cancellation mid-depth discards that depth's partial
    /// result. `NoAvailableMoves` means either the position is terminal or
    /// the search was stopped before depth 1 completed.
    pub fn search(&mut self, board: &mut Board) -> Result<ChessMove, SearchError> {
        if self.search_depth < 1 {
            return Err(SearchError::DepthTooLow);
        }

        self.last_searched_position_count = 0;
        self.last_best_evaluation = 0.0;
        let mut best_move = None;

        for depth in 1..=self.search_depth {
            if self.stopped() {
                debug!("search cancelled before depth {}", depth);
                break;
            }

            debug!(
                "starting search at depth {} of {}",
                depth,
                self.search_depth()
            );
            let (pv, score) = self.minimax(board, depth);

            if self.stopped() {
                debug!("search cancelled during depth {}", depth);
                break;
            }
            if let Some(&mv) = pv.first() {
                best_move = Some(mv);
                self.last_best_evaluation = score;
                debug!(
                    "depth {} complete: best={} score={} nodes={}",
                    depth, mv, score, self.last_searched_position_count
                );
                self.reporter.report_info(depth, score, &pv);
            }
        }

        best_move.ok_or(SearchError::NoAvailableMoves)
    }

    /// Plain minimax. White maximizes, black minimizes; the current node's
    /// role follows from the side to move. Returns the principal variation
    /// from this node and its score. A node with no legal moves is scored
    /// by the static evaluation with an empty variation: stalemate comes
    /// back as the draw it is, checkmate as the stuck side's collapsed
    /// material-and-mobility score.
    fn minimax(&mut self, board: &mut Board, depth: u8) -> (Vec<ChessMove>, f32) {
        self.last_searched_position_count += 1;

        if self.stopped() {
            return (vec![], self.last_best_evaluation);
        }

        if depth == 0 {
            return (vec![], evaluate::score(board));
        }

        let candidates = moves::generate(board);
        if candidates.is_empty() {
            return (vec![], evaluate::score(board));
        }

        let maximizing = board.turn() == Color::White;
        let mut best = if maximizing {
            f32::NEG_INFINITY
        } else {
            f32::INFINITY
        };
        let mut best_pv: Vec<ChessMove> = vec![];

        for mv in candidates {
            if self.stopped() {
                break;
            }

            board.make_move_unchecked(mv);
            let (child_pv, child_score) = self.minimax(board, depth - 1);
            board.unmake_move();

            let improves = if maximizing {
                child_score > best
            } else {
                child_score < best
            };
            if improves {
                best = child_score;
                best_pv = std::iter::once(mv).chain(child_pv).collect();
            }
        }

        (best_pv, best)
    }
}
