//! Move application and reversal. `make_move` validates against the legal
//! move list; `make_move_unchecked` skips validation and is what the move
//! generator, the castling transit probe, and the searcher use. Every
//! application pushes an undo record so `unmake_move` can restore the
//! position exactly, clocks and rights included.

use crate::board::castle_rights::{
    rights_for_color, BLACK_KINGSIDE_RIGHTS, BLACK_QUEENSIDE_RIGHTS, WHITE_KINGSIDE_RIGHTS,
    WHITE_QUEENSIDE_RIGHTS,
};
use crate::board::color::Color;
use crate::board::error::BoardError;
use crate::board::piece::Piece;
use crate::board::square::{self, Square};
use crate::board::{Board, UndoRecord};
use crate::chess_move::ChessMove;
use crate::moves;

/// The four canonical king steps, paired with the rook's sibling move:
/// (king from, king to, rook from, rook to).
const CASTLE_MOVES: [(Square, Square, Square, Square); 4] = [
    (square::E1, square::G1, square::H1, square::F1),
    (square::E1, square::C1, square::A1, square::D1),
    (square::E8, square::G8, square::H8, square::F8),
    (square::E8, square::C8, square::A8, square::D8),
];

fn castle_rook_move(mv: ChessMove) -> Option<(Square, Square)> {
    CASTLE_MOVES
        .iter()
        .find(|(king_from, king_to, _, _)| {
            mv.from_square() == *king_from && mv.to_square() == *king_to
        })
        .map(|(_, _, rook_from, rook_to)| (*rook_from, *rook_to))
}

impl Board {
    /// Validates the move against the full legal move list, then applies
    /// it. External callers always go through this; only the generator and
    /// the searcher may bypass validation.
    pub fn make_move(&mut self, mv: ChessMove) -> Result<(), BoardError> {
        let legal_moves = moves::generate(self);
        if !legal_moves.contains(&mv) {
            return Err(BoardError::IllegalMove(mv));
        }
        self.make_move_unchecked(mv);
        Ok(())
    }

    /// Applies `mv` without checking legality and pushes an undo record.
    ///
    /// Panics if the source square is empty; feeding this a move that was
    /// not generated for the current position is a bug in the engine.
    pub fn make_move_unchecked(&mut self, mv: ChessMove) {
        let (piece, color) = match self.get(mv.from_square()) {
            Some(occupant) => occupant,
            None => panic!(
                "make_move from empty square {} in position\n{}",
                mv.from_square(),
                self
            ),
        };

        let mut undo = UndoRecord {
            mv,
            captured: None,
            prev_castle_rights: self.castle_rights(),
            prev_en_passant_target: self.en_passant_target(),
            prev_halfmove_clock: self.halfmove_clock(),
            prev_fullmove_number: self.fullmove_number(),
            was_castle: false,
            was_promotion: false,
        };

        // classification happens against the pre-move state
        let rook_move = if piece == Piece::King {
            castle_rook_move(mv)
        } else {
            None
        };
        let is_en_passant =
            piece == Piece::Pawn && self.en_passant_target() == Some(mv.to_square());

        if let Some(promotion) = mv.promotion() {
            if let Some((captured, captured_color)) = self.remove(mv.to_square()) {
                undo.captured = Some((captured, captured_color, mv.to_square()));
            }
            self.remove(mv.from_square());
            self.put(mv.to_square(), promotion, color).unwrap();
            undo.was_promotion = true;
        } else if let Some((rook_from, rook_to)) = rook_move {
            self.remove(mv.from_square());
            self.put(mv.to_square(), Piece::King, color).unwrap();
            self.remove(rook_from);
            self.put(rook_to, Piece::Rook, color).unwrap();
            undo.was_castle = true;
        } else if is_en_passant {
            // the captured pawn sits one rank behind the target square
            let capture_square = mv
                .to_square()
                .offset(-8 * color.direction_factor())
                .unwrap();
            let (captured, captured_color) = self.remove(capture_square).unwrap();
            undo.captured = Some((captured, captured_color, capture_square));
            self.remove(mv.from_square());
            self.put(mv.to_square(), piece, color).unwrap();
        } else {
            if let Some((captured, captured_color)) = self.remove(mv.to_square()) {
                undo.captured = Some((captured, captured_color, mv.to_square()));
            }
            self.remove(mv.from_square());
            self.put(mv.to_square(), piece, color).unwrap();
        }

        self.update_castle_rights_after_move(piece, color, mv);
        self.update_en_passant_target_after_move(piece, color, mv);

        let was_capture = undo.captured.is_some();
        if was_capture || piece == Piece::Pawn {
            self.set_halfmove_clock(0);
        } else {
            self.set_halfmove_clock(self.halfmove_clock() + 1);
        }
        if color == Color::Black {
            self.set_fullmove_number(self.fullmove_number() + 1);
        }

        self.toggle_turn();
        self.push_undo(undo);
    }

    /// Pops the last undo record and reverses the move exactly. The
    /// position afterwards compares equal to the one before the matching
    /// `make_move`, clocks and rights included.
    ///
    /// Panics if no move has been made; unmaking past the root is a bug in
    /// the engine.
    pub fn unmake_move(&mut self) {
        let undo = match self.pop_undo() {
            Some(record) => record,
            None => panic!("unmake_move with an empty history"),
        };
        let mv = undo.mv;

        self.toggle_turn();

        if undo.was_castle {
            let (rook_from, rook_to) =
                castle_rook_move(mv).expect("castle flag on a non-castling move");
            let (king, color) = self.remove(mv.to_square()).unwrap();
            self.put(mv.from_square(), king, color).unwrap();
            let (rook, rook_color) = self.remove(rook_to).unwrap();
            self.put(rook_from, rook, rook_color).unwrap();
        } else {
            let (piece, color) = self.remove(mv.to_square()).unwrap();
            if undo.was_promotion {
                self.put(mv.from_square(), Piece::Pawn, color).unwrap();
            } else {
                self.put(mv.from_square(), piece, color).unwrap();
            }
        }

        if let Some((captured, captured_color, capture_square)) = undo.captured {
            self.put(capture_square, captured, captured_color).unwrap();
        }

        self.set_castle_rights(undo.prev_castle_rights);
        self.set_en_passant_target(undo.prev_en_passant_target);
        self.set_halfmove_clock(undo.prev_halfmove_clock);
        self.set_fullmove_number(undo.prev_fullmove_number);
    }

    /// A king move disables both of its color's rights. Any move leaving or
    /// arriving at a corner square disables that corner's right, which also
    /// covers a rook being captured on its home square.
    fn update_castle_rights_after_move(&mut self, piece: Piece, color: Color, mv: ChessMove) {
        let mut lost_rights = 0;
        if piece == Piece::King {
            lost_rights |= rights_for_color(color);
        }
        for &sq in &[mv.from_square(), mv.to_square()] {
            lost_rights |= match sq {
                square::A1 => WHITE_QUEENSIDE_RIGHTS,
                square::H1 => WHITE_KINGSIDE_RIGHTS,
                square::A8 => BLACK_QUEENSIDE_RIGHTS,
                square::H8 => BLACK_KINGSIDE_RIGHTS,
                _ => 0,
            };
        }
        self.lose_castle_rights(lost_rights);
    }

    /// The en passant target is set only when the double push could
    /// actually be answered: some enemy pawn must stand adjacent by file to
    /// the landing square. Edge files do not wrap.
    fn update_en_passant_target_after_move(&mut self, piece: Piece, color: Color, mv: ChessMove) {
        self.set_en_passant_target(None);
        if piece != Piece::Pawn {
            return;
        }

        let step = 8 * color.direction_factor();
        let double_push = mv.from_square().index() as i16 + 2 * step as i16
            == mv.to_square().index() as i16;
        if !double_push {
            return;
        }

        let landing = mv.to_square();
        for &offset in &[-1i8, 1] {
            let file = landing.file() as i8 + offset;
            if !(0..8).contains(&file) {
                continue;
            }
            if let Some(neighbor) = landing.offset(offset) {
                if self.get(neighbor) == Some((Piece::Pawn, color.opposite())) {
                    self.set_en_passant_target(mv.from_square().offset(step));
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::square::*;

    #[test]
    fn test_apply_pawn_push() {
        let mut board = Board::starting_position();
        board.make_move(ChessMove::new(E2, E4)).unwrap();
        assert_eq!(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
            board.to_fen()
        );
    }

    #[test]
    fn test_double_push_without_adjacent_enemy_pawn_sets_no_target() {
        let mut board =
            Board::from_fen("rnbqkbnr/pppppppp/8/P7/8/8/1PPPPPPP/RNBQKBNR b KQkq - 0 1").unwrap();
        board.make_move(ChessMove::new(H7, H5)).unwrap();
        assert_eq!(None, board.en_passant_target());
    }

    #[test]
    fn test_double_push_with_adjacent_enemy_pawn_sets_target() {
        let mut board = Board::from_fen("4k3/8/8/8/4p3/8/3P4/4K3 w - - 0 1").unwrap();
        board.make_move(ChessMove::new(D2, D4)).unwrap();
        assert_eq!(Some(D3), board.en_passant_target());
    }

    #[test]
    fn test_double_push_does_not_wrap_files() {
        // black pawn on a5 must not make h2h4 look answerable
        let mut board = Board::from_fen("4k3/8/8/p7/8/8/7P/4K3 w - - 0 1").unwrap();
        board.make_move(ChessMove::new(H2, H4)).unwrap();
        assert_eq!(None, board.en_passant_target());
    }

    #[test]
    fn test_make_and_unmake_restores_position() {
        let mut board = Board::starting_position();
        let before = board.to_fen();

        board.make_move_unchecked(ChessMove::new(B1, C3));
        board.unmake_move();

        assert_eq!(before, board.to_fen());
        assert_eq!(0, board.history_len());
    }

    #[test]
    fn test_make_and_unmake_capture() {
        let mut board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 3").unwrap();
        let before = board.to_fen();

        board.make_move_unchecked(ChessMove::new(E4, D5));
        assert_eq!(Some((Piece::Pawn, Color::White)), board.get(D5));
        assert_eq!(None, board.get(E4));
        assert_eq!(0, board.halfmove_clock());

        board.unmake_move();
        assert_eq!(before, board.to_fen());
        assert_eq!(Some((Piece::Pawn, Color::Black)), board.get(D5));
    }

    #[test]
    fn test_make_and_unmake_en_passant() {
        let mut board = Board::from_fen("4k3/8/8/8/3PPp2/8/5P2/5K2 b - e3 0 1").unwrap();
        let before = board.to_fen();

        board.make_move(ChessMove::new(F4, E3)).unwrap();
        assert_eq!(Some((Piece::Pawn, Color::Black)), board.get(E3));
        // the captured pawn was on e4, not on the target square
        assert_eq!(None, board.get(E4));
        assert_eq!(None, board.get(F4));

        board.unmake_move();
        assert_eq!(before, board.to_fen());
    }

    #[test]
    fn test_make_and_unmake_promotion_capture() {
        let mut board =
            Board::from_fen("rnbqkbnr/ppppppPp/8/8/8/8/PPPPPP1P/RNBQKBNR w - - 0 1").unwrap();
        let before = board.to_fen();

        board
            .make_move(ChessMove::promote(G7, F8, Piece::Queen))
            .unwrap();
        assert_eq!(Some((Piece::Queen, Color::White)), board.get(F8));
        assert_eq!(None, board.get(G7));

        board.unmake_move();
        assert_eq!(before, board.to_fen());
        assert_eq!(Some((Piece::Pawn, Color::White)), board.get(G7));
        assert_eq!(Some((Piece::Bishop, Color::Black)), board.get(F8));
    }

    #[test]
    fn test_make_and_unmake_castle_kingside() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let before = board.to_fen();

        board.make_move(ChessMove::new(E1, G1)).unwrap();
        assert_eq!(Some((Piece::King, Color::White)), board.get(G1));
        assert_eq!(Some((Piece::Rook, Color::White)), board.get(F1));
        assert_eq!(None, board.get(E1));
        assert_eq!(None, board.get(H1));
        assert_eq!(0, board.castle_rights() & WHITE_KINGSIDE_RIGHTS);

        board.unmake_move();
        assert_eq!(before, board.to_fen());
    }

    #[test]
    fn test_make_and_unmake_castle_queenside_black() {
        let mut board = Board::from_fen("r3k3/8/8/8/8/8/8/4K3 b q - 0 1").unwrap();
        let before = board.to_fen();

        board.make_move(ChessMove::new(E8, C8)).unwrap();
        assert_eq!(Some((Piece::King, Color::Black)), board.get(C8));
        assert_eq!(Some((Piece::Rook, Color::Black)), board.get(D8));

        board.unmake_move();
        assert_eq!(before, board.to_fen());
    }

    #[test]
    fn test_rook_move_loses_one_right() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        board.make_move(ChessMove::new(A1, A2)).unwrap();
        assert_eq!(0, board.castle_rights() & WHITE_QUEENSIDE_RIGHTS);
        assert_ne!(0, board.castle_rights() & WHITE_KINGSIDE_RIGHTS);
    }

    #[test]
    fn test_capture_on_rook_home_square_loses_right() {
        // b7xa8 removes black's queenside castling right
        let mut board =
            Board::from_fen("r3k3/1P6/8/8/8/8/8/4K3 w q - 0 1").unwrap();
        board
            .make_move(ChessMove::promote(B7, A8, Piece::Queen))
            .unwrap();
        assert_eq!(0, board.castle_rights() & BLACK_QUEENSIDE_RIGHTS);
    }

    #[test]
    fn test_clocks_update() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/4P3/4KN2 w - - 3 7").unwrap();
        board.make_move(ChessMove::new(F1, G3)).unwrap();
        assert_eq!(4, board.halfmove_clock());
        assert_eq!(7, board.fullmove_number());

        board.make_move(ChessMove::new(E8, E7)).unwrap();
        assert_eq!(5, board.halfmove_clock());
        assert_eq!(8, board.fullmove_number());

        board.make_move(ChessMove::new(E2, E3)).unwrap();
        assert_eq!(0, board.halfmove_clock());
    }

    #[test]
    fn test_unmake_sequence_restores_start() {
        let mut board = Board::starting_position();
        let before = board.to_fen();

        let line = ["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1"];
        for notation in &line {
            let mv = ChessMove::from_long_algebraic(notation).unwrap();
            board.make_move(mv).unwrap();
        }
        assert_eq!(line.len(), board.history_len());

        for _ in 0..line.len() {
            board.unmake_move();
        }
        assert_eq!(before, board.to_fen());
        assert_eq!(0, board.history_len());
    }

    #[test]
    fn test_illegal_move_is_rejected() {
        let mut board = Board::starting_position();
        assert_eq!(
            Err(BoardError::IllegalMove(ChessMove::new(E2, E5))),
            board.make_move(ChessMove::new(E2, E5))
        );
        // board unchanged
        assert_eq!(Board::starting_position().to_fen(), board.to_fen());
    }

    #[test]
    #[should_panic(expected = "empty history")]
    fn test_unmake_with_empty_history_panics() {
        let mut board = Board::starting_position();
        board.unmake_move();
    }
}
