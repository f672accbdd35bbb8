//! Legal move generation: per-square pseudo-legal moves filtered by "does
//! this leave my king in check?". The filter relies on make/unmake being
//! cheap and exact.

mod board;
pub mod targets;

use smallvec::SmallVec;

use crate::board::bitboard::EMPTY;
use crate::board::color::Color;
use crate::board::piece::{Piece, PROMOTION_PIECES};
use crate::board::square::{self, Square};
use crate::board::Board;
use crate::chess_move::ChessMove;

pub type MoveList = SmallVec<[ChessMove; 64]>;

/// All strictly legal moves for the side to move.
pub fn generate(board: &mut Board) -> MoveList {
    let mut moves = MoveList::new();
    for from_square in square::all_squares() {
        pseudo_legal_moves(board, from_square, &mut moves);
    }

    let mover = board.turn();
    moves.retain(|&mut mv| !leaves_mover_in_check(board, mv, mover));
    moves
}

/// Walks the legal move tree to the given depth and counts the leaf
/// positions. The standard correctness probe for the generator.
pub fn count_positions(depth: u8, board: &mut Board) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut count = 0;
    for mv in generate(board) {
        board.make_move_unchecked(mv);
        count += count_positions(depth - 1, board);
        board.unmake_move();
    }
    count
}

fn leaves_mover_in_check(board: &mut Board, mv: ChessMove, mover: Color) -> bool {
    // validation would recurse into generation, so the probe bypasses it;
    // every move given to it is already pseudo-legal
    board.make_move_unchecked(mv);
    let in_check = board.is_in_check(mover);
    board.unmake_move();
    in_check
}

fn pseudo_legal_moves(board: &mut Board, from_square: Square, moves: &mut MoveList) {
    let (piece, color) = match board.get(from_square) {
        Some(occupant) if occupant.1 == board.turn() => occupant,
        _ => return,
    };

    match piece {
        Piece::Pawn => pawn_moves(board, from_square, color, moves),
        Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen => {
            standard_moves(board, from_square, piece, color, moves)
        }
        Piece::King => {
            standard_moves(board, from_square, piece, color, moves);
            castling_moves(board, color, moves);
        }
    }
}

/// Attack set with current blockers, minus squares holding friendly pieces.
fn standard_moves(
    board: &Board,
    from_square: Square,
    piece: Piece,
    color: Color,
    moves: &mut MoveList,
) {
    let attacked = targets::attacks(piece, color, from_square, board.occupied());
    let candidates = attacked & !board.occupied_by(color);

    for to_square in square::all_squares() {
        if candidates & to_square.bitboard() != 0 {
            moves.push(ChessMove::new(from_square, to_square));
        }
    }
}

/// Captures come from the attack set intersected with enemy pieces plus the
/// en passant target; pushes are the single step onto an empty square and
/// the guarded double step from the starting rank. Any pawn move landing on
/// a back rank is emitted four times, once per promotion kind.
fn pawn_moves(board: &Board, from_square: Square, color: Color, moves: &mut MoveList) {
    let mut push = |mv: ChessMove, moves: &mut MoveList| {
        let to_rank = mv.to_square().rank();
        if to_rank == 0 || to_rank == 7 {
            for &promotion in PROMOTION_PIECES.iter() {
                moves.push(ChessMove::promote(
                    mv.from_square(),
                    mv.to_square(),
                    promotion,
                ));
            }
        } else {
            moves.push(mv);
        }
    };

    let en_passant = board
        .en_passant_target()
        .map(|target| target.bitboard())
        .unwrap_or(EMPTY);
    let capturable = board.occupied_by(color.opposite()) | en_passant;
    let attacked = targets::attacks(Piece::Pawn, color, from_square, board.occupied());

    for to_square in square::all_squares() {
        if attacked & capturable & to_square.bitboard() != 0 {
            push(ChessMove::new(from_square, to_square), moves);
        }
    }

    let step = 8 * color.direction_factor();
    let single_step = match from_square.offset(step) {
        Some(square) => square,
        None => return,
    };
    if board.is_occupied(single_step) {
        return;
    }
    push(ChessMove::new(from_square, single_step), moves);

    let starting_rank = match color {
        Color::White => 1,
        Color::Black => 6,
    };
    if from_square.rank() == starting_rank {
        let double_step = single_step.offset(step).unwrap();
        if !board.is_occupied(double_step) {
            moves.push(ChessMove::new(from_square, double_step));
        }
    }
}

struct CastlePath {
    right: crate::board::castle_rights::CastleRightsBitmask,
    king_from: Square,
    king_to: Square,
    rook_home: Square,
    /// Squares the king passes through, probed for checks.
    king_path: [Square; 2],
    /// Every square between king and rook; all must be empty, including the
    /// b-file square the king never visits.
    full_path: &'static [Square],
}

fn castle_paths(color: Color) -> [CastlePath; 2] {
    use crate::board::castle_rights::*;
    use crate::board::square::*;

    match color {
        Color::White => [
            CastlePath {
                right: WHITE_KINGSIDE_RIGHTS,
                king_from: E1,
                king_to: G1,
                rook_home: H1,
                king_path: [F1, G1],
                full_path: &[F1, G1],
            },
            CastlePath {
                right: WHITE_QUEENSIDE_RIGHTS,
                king_from: E1,
                king_to: C1,
                rook_home: A1,
                king_path: [D1, C1],
                full_path: &[D1, C1, B1],
            },
        ],
        Color::Black => [
            CastlePath {
                right: BLACK_KINGSIDE_RIGHTS,
                king_from: E8,
                king_to: G8,
                rook_home: H8,
                king_path: [F8, G8],
                full_path: &[F8, G8],
            },
            CastlePath {
                right: BLACK_QUEENSIDE_RIGHTS,
                king_from: E8,
                king_to: C8,
                rook_home: A8,
                king_path: [D8, C8],
                full_path: &[D8, C8, B8],
            },
        ],
    }
}

fn castling_moves(board: &mut Board, color: Color, moves: &mut MoveList) {
    // castling out of check is never allowed; this single pre-check also
    // covers the king's starting square
    if board.is_in_check(color) {
        return;
    }

    for path in castle_paths(color).iter() {
        if board.castle_rights() & path.right == 0 {
            continue;
        }
        if board.get(path.king_from) != Some((Piece::King, color)) {
            continue;
        }
        if board.get(path.rook_home) != Some((Piece::Rook, color)) {
            continue;
        }
        if path.full_path.iter().any(|&sq| board.is_occupied(sq)) {
            continue;
        }

        let transit_is_safe = path.king_path.iter().all(|&transit| {
            !leaves_mover_in_check(board, ChessMove::new(path.king_from, transit), color)
        });
        if transit_is_safe {
            moves.push(ChessMove::new(path.king_from, path.king_to));
        }
    }
}
