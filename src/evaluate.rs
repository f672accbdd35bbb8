//! Static evaluation: material plus a small mobility term, white-positive.
//! Deliberately simple; the interesting part is that mobility for the side
//! not on move is measured by flipping the turn with the en passant target
//! cleared, so the flip cannot conjure a capture that is never legal for
//! that side.

use crate::board::color::Color;
use crate::board::piece::ALL_PIECES;
use crate::board::square;
use crate::board::Board;
use crate::moves;

#[derive(Debug, PartialEq)]
pub enum GameEnding {
    Checkmate,
    Stalemate,
}

const MOBILITY_WEIGHT: f32 = 0.1;

pub fn game_ending(board: &mut Board) -> Option<GameEnding> {
    if !moves::generate(board).is_empty() {
        return None;
    }

    if board.is_in_check(board.turn()) {
        Some(GameEnding::Checkmate)
    } else {
        Some(GameEnding::Stalemate)
    }
}

/// Score for the current position, in pawns, positive when white is
/// better. Stalemate short-circuits to 0; checkmate is not encoded here,
/// the search backs out a losing value on its own.
pub fn score(board: &mut Board) -> f32 {
    if let Some(GameEnding::Stalemate) = game_ending(board) {
        return 0.0;
    }

    let (white_mobility, black_mobility) = mobility(board);
    let mobility_score = MOBILITY_WEIGHT * (white_mobility as f32 - black_mobility as f32);

    material_score(board, Color::White) - material_score(board, Color::Black) + mobility_score
}

/// Legal move counts for (white, black). The non-mover's count is taken
/// with the turn flipped and the en passant target cleared; both are
/// restored before returning.
fn mobility(board: &mut Board) -> (usize, usize) {
    let current_side = moves::generate(board).len();

    let saved_target = board.en_passant_target();
    board.set_en_passant_target(None);
    board.toggle_turn();
    let other_side = moves::generate(board).len();
    board.toggle_turn();
    board.set_en_passant_target(saved_target);

    match board.turn() {
        Color::White => (current_side, other_side),
        Color::Black => (other_side, current_side),
    }
}

fn material_score(board: &Board, color: Color) -> f32 {
    let mut material = 0.0;
    for &piece in ALL_PIECES.iter() {
        let count = square::all_squares()
            .filter(|&sq| board.get(sq) == Some((piece, color)))
            .count();
        material += piece.material_value() * count as f32;
    }
    material
}
