use thiserror::Error;

use super::color::Color;
use super::fen::FenError;
use super::square::Square;
use crate::chess_move::ChessMove;

#[derive(Error, Debug, PartialEq)]
pub enum BoardError {
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error("expected exactly one {color} king, found {count}")]
    InvalidKingCount { color: Color, count: usize },
    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(Square),
    #[error("{0} is in check but is not the side to move")]
    InactiveSideInCheck(Color),
    #[error("illegal move {0}")]
    IllegalMove(ChessMove),
    #[error("square {0} already has a piece on it")]
    SquareOccupied(Square),
}
