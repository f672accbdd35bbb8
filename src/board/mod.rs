pub mod bitboard;
pub mod castle_rights;
pub mod color;
pub mod error;
pub mod fen;
pub mod piece;
pub mod square;

mod display;

use bitboard::{Bitboard, EMPTY};
use castle_rights::{CastleRightsBitmask, ALL_CASTLE_RIGHTS};
use color::Color;
use error::BoardError;
use piece::Piece;
use square::Square;

use crate::chess_move::ChessMove;
use crate::moves::targets;

/// The full position: piece placement plus the side to move, castling
/// rights, en passant target, clocks, and the undo stack that makes
/// `unmake_move` exact.
pub struct Board {
    squares: [Option<(Piece, Color)>; 64],
    turn: Color,
    castle_rights: CastleRightsBitmask,
    en_passant_target: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    history: Vec<UndoRecord>,
}

/// Everything needed to reverse exactly one move. For an en passant capture
/// the captured pawn does not sit on the move target, so the capture square
/// is recorded alongside the piece.
pub(crate) struct UndoRecord {
    pub(crate) mv: ChessMove,
    pub(crate) captured: Option<(Piece, Color, Square)>,
    pub(crate) prev_castle_rights: CastleRightsBitmask,
    pub(crate) prev_en_passant_target: Option<Square>,
    pub(crate) prev_halfmove_clock: u32,
    pub(crate) prev_fullmove_number: u32,
    pub(crate) was_castle: bool,
    pub(crate) was_promotion: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            squares: [None; 64],
            turn: Color::White,
            castle_rights: ALL_CASTLE_RIGHTS,
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: vec![],
        }
    }
}

impl Board {
    /// An empty board with white to move and all castling rights. Mostly
    /// useful for building test positions piece by piece.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn starting_position() -> Self {
        Self::from_fen(fen::STARTING_POSITION_FEN).unwrap()
    }

    /// Parses and validates a FEN record. The parser only checks shape; this
    /// constructor additionally rejects positions that cannot occur in a
    /// game (wrong king count, pawns on the back ranks, the side not to
    /// move in check) and clears an en passant target no enemy pawn could
    /// actually capture on.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let parsed = fen::parse(fen)?;
        let mut board = Self {
            squares: parsed.placement,
            turn: parsed.active_color,
            castle_rights: parsed.castle_rights,
            en_passant_target: parsed.en_passant_target,
            halfmove_clock: parsed.halfmove_clock,
            fullmove_number: parsed.fullmove_number,
            history: vec![],
        };
        board.validate()?;
        board.sanitize_en_passant_target();
        Ok(board)
    }

    pub fn get(&self, square: Square) -> Option<(Piece, Color)> {
        self.squares[square.index()]
    }

    pub fn is_occupied(&self, square: Square) -> bool {
        self.squares[square.index()].is_some()
    }

    pub fn put(&mut self, square: Square, piece: Piece, color: Color) -> Result<(), BoardError> {
        if self.is_occupied(square) {
            return Err(BoardError::SquareOccupied(square));
        }
        self.squares[square.index()] = Some((piece, color));
        Ok(())
    }

    pub fn remove(&mut self, square: Square) -> Option<(Piece, Color)> {
        self.squares[square.index()].take()
    }

    pub fn occupied(&self) -> Bitboard {
        let mut blockers = EMPTY;
        for square in square::all_squares() {
            if self.is_occupied(square) {
                blockers |= square.bitboard();
            }
        }
        blockers
    }

    pub fn occupied_by(&self, color: Color) -> Bitboard {
        let mut blockers = EMPTY;
        for square in square::all_squares() {
            if let Some((_, piece_color)) = self.get(square) {
                if piece_color == color {
                    blockers |= square.bitboard();
                }
            }
        }
        blockers
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        square::all_squares().find(|&square| self.get(square) == Some((Piece::King, color)))
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn set_turn(&mut self, turn: Color) {
        self.turn = turn;
    }

    pub fn toggle_turn(&mut self) -> Color {
        self.turn = self.turn.opposite();
        self.turn
    }

    pub fn castle_rights(&self) -> CastleRightsBitmask {
        self.castle_rights
    }

    pub fn lose_castle_rights(&mut self, lost_rights: CastleRightsBitmask) {
        self.castle_rights &= !lost_rights;
    }

    pub(crate) fn set_castle_rights(&mut self, rights: CastleRightsBitmask) {
        self.castle_rights = rights;
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    pub(crate) fn set_en_passant_target(&mut self, target: Option<Square>) {
        self.en_passant_target = target;
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub(crate) fn set_halfmove_clock(&mut self, clock: u32) {
        self.halfmove_clock = clock;
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub(crate) fn set_fullmove_number(&mut self, number: u32) {
        self.fullmove_number = number;
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub(crate) fn push_undo(&mut self, record: UndoRecord) {
        self.history.push(record);
    }

    pub(crate) fn pop_undo(&mut self) -> Option<UndoRecord> {
        self.history.pop()
    }

    /// Whether `color`'s king is attacked. Projects a super-piece (queen
    /// plus knight) from the king's square against the current blockers,
    /// then asks each enemy piece found in that projection whether its own
    /// attack set reaches back to the king. Friendly pieces in the
    /// projection are never attackers.
    pub fn is_in_check(&self, color: Color) -> bool {
        let king_square = match self.king_square(color) {
            Some(square) => square,
            None => return false,
        };
        let blockers = self.occupied();

        let candidates = targets::attacks(Piece::Queen, color, king_square, blockers)
            | targets::attacks(Piece::Knight, color, king_square, blockers);

        for square in square::all_squares() {
            if candidates & square.bitboard() == 0 {
                continue;
            }
            if let Some((piece, piece_color)) = self.get(square) {
                if piece_color == color {
                    continue;
                }
                let attacks = targets::attacks(piece, piece_color, square, blockers);
                if attacks & king_square.bitboard() != 0 {
                    return true;
                }
            }
        }

        false
    }

    fn validate(&self) -> Result<(), BoardError> {
        for &color in &[Color::White, Color::Black] {
            let kings = square::all_squares()
                .filter(|&square| self.get(square) == Some((Piece::King, color)))
                .count();
            if kings != 1 {
                return Err(BoardError::InvalidKingCount {
                    color,
                    count: kings,
                });
            }
        }

        for square in square::all_squares() {
            if let Some((Piece::Pawn, _)) = self.get(square) {
                if square.rank() == 0 || square.rank() == 7 {
                    return Err(BoardError::PawnOnBackRank(square));
                }
            }
        }

        let inactive = self.turn.opposite();
        if self.is_in_check(inactive) {
            return Err(BoardError::InactiveSideInCheck(inactive));
        }

        Ok(())
    }

    /// FEN records an en passant target after every double push; our
    /// canonical form keeps it only when some pawn of the side to move can
    /// actually play the capture. Anything else is cleared so the target
    /// cannot inflate mobility with a move that could never be made.
    fn sanitize_en_passant_target(&mut self) {
        let target = match self.en_passant_target {
            Some(target) => target,
            None => return,
        };

        if !self.en_passant_capture_is_possible(target) {
            self.en_passant_target = None;
        }
    }

    fn en_passant_capture_is_possible(&self, target: Square) -> bool {
        if target.rank() != 2 && target.rank() != 5 {
            return false;
        }

        // the pawn that double-pushed belongs to the side that just moved
        let pushed_color = self.turn.opposite();
        let step = 8 * pushed_color.direction_factor();
        let (landing, origin) = match (target.offset(step), target.offset(-step)) {
            (Some(landing), Some(origin)) => (landing, origin),
            _ => return false,
        };

        if self.get(landing) != Some((Piece::Pawn, pushed_color)) {
            return false;
        }
        if self.is_occupied(origin) {
            return false;
        }

        [-1i8, 1].iter().any(|&offset| {
            let file = landing.file() as i8 + offset;
            if !(0..8).contains(&file) {
                return false;
            }
            landing
                .offset(offset)
                .and_then(|neighbor| self.get(neighbor))
                == Some((Piece::Pawn, self.turn))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::square::*;
    use super::*;

    #[test]
    fn test_get_put_remove() {
        let mut board = Board::new();
        board.put(E4, Piece::Pawn, Color::White).unwrap();
        assert_eq!(Some((Piece::Pawn, Color::White)), board.get(E4));
        assert_eq!(
            Err(BoardError::SquareOccupied(E4)),
            board.put(E4, Piece::Rook, Color::Black)
        );
        assert_eq!(Some((Piece::Pawn, Color::White)), board.remove(E4));
        assert_eq!(None, board.get(E4));
        assert_eq!(None, board.remove(E4));
    }

    #[test]
    fn test_starting_position_layout() {
        let board = Board::starting_position();
        assert_eq!(Some((Piece::Rook, Color::White)), board.get(A1));
        assert_eq!(Some((Piece::King, Color::White)), board.get(E1));
        assert_eq!(Some((Piece::Queen, Color::Black)), board.get(D8));
        assert_eq!(Some((Piece::Pawn, Color::Black)), board.get(F7));
        assert_eq!(None, board.get(E4));
        assert_eq!(Color::White, board.turn());
        assert_eq!(ALL_CASTLE_RIGHTS, board.castle_rights());
        assert_eq!(32, board.occupied().count_ones());
    }

    #[test]
    fn test_rejects_wrong_king_count() {
        assert_eq!(
            Err(BoardError::InvalidKingCount {
                color: Color::White,
                count: 0
            }),
            Board::from_fen("4k3/8/8/8/8/8/8/8 w - - 0 1").map(|_| ())
        );
        assert_eq!(
            Err(BoardError::InvalidKingCount {
                color: Color::Black,
                count: 2
            }),
            Board::from_fen("3kk3/8/8/8/8/8/8/4K3 w - - 0 1").map(|_| ())
        );
    }

    #[test]
    fn test_rejects_pawn_on_back_rank() {
        assert_eq!(
            Err(BoardError::PawnOnBackRank(C8)),
            Board::from_fen("2P1k3/8/8/8/8/8/8/4K3 w - - 0 1").map(|_| ())
        );
        assert_eq!(
            Err(BoardError::PawnOnBackRank(A1)),
            Board::from_fen("4k3/8/8/8/8/8/8/p3K3 w - - 0 1").map(|_| ())
        );
    }

    #[test]
    fn test_rejects_inactive_side_in_check() {
        // white queen gives check but it is white to move
        assert_eq!(
            Err(BoardError::InactiveSideInCheck(Color::Black)),
            Board::from_fen("4k3/4Q3/8/8/8/8/8/4K3 w - - 0 1").map(|_| ())
        );
        // same position with black to move is fine
        assert!(Board::from_fen("4k3/4Q3/8/8/8/8/8/4K3 b - - 0 1").is_ok());
    }

    #[test]
    fn test_check_oracle() {
        let board = Board::from_fen("8/3q1k2/8/8/3K4/8/8/8 w - - 0 1").unwrap();
        assert!(board.is_in_check(Color::White));
        assert!(!board.is_in_check(Color::Black));

        let board = Board::from_fen("8/5k2/8/8/3K4/8/8/8 w - - 0 1").unwrap();
        assert!(!board.is_in_check(Color::White));
        assert!(!board.is_in_check(Color::Black));
    }

    #[test]
    fn test_check_oracle_knight_and_pawn() {
        let board = Board::from_fen("4k3/8/8/8/8/2n5/8/4K3 w - - 0 1").unwrap();
        assert!(board.is_in_check(Color::White));

        let board = Board::from_fen("4k3/3P4/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(board.is_in_check(Color::Black));

        // a friendly pawn on the same diagonal is not an attacker
        let board = Board::from_fen("4k3/3p4/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(!board.is_in_check(Color::Black));
    }

    #[test]
    fn test_check_oracle_blocked_slider() {
        let board = Board::from_fen("4k3/8/8/8/4r3/8/4P3/4K3 w - - 0 1").unwrap();
        assert!(!board.is_in_check(Color::White));

        let board = Board::from_fen("4k3/8/8/8/4r3/8/8/4K3 w - - 0 1").unwrap();
        assert!(board.is_in_check(Color::White));
    }

    #[test]
    fn test_en_passant_target_kept_when_capturable() {
        let board = Board::from_fen("4k3/8/8/8/3PPp2/8/5P2/5K2 b - e3 0 1").unwrap();
        assert_eq!(Some(E3), board.en_passant_target());
    }

    #[test]
    fn test_en_passant_target_cleared_when_no_capturer() {
        // no black pawn adjacent to the e4 landing square
        let board = Board::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(None, board.en_passant_target());

        // the adjacent pawn belongs to the wrong color
        let board = Board::from_fen("4k3/8/8/8/3PP3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(None, board.en_passant_target());

        // no pawn in front of the target at all
        let board = Board::from_fen("4k3/8/8/8/5p2/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(None, board.en_passant_target());
    }

    #[test]
    fn test_king_square() {
        let board = Board::starting_position();
        assert_eq!(Some(E1), board.king_square(Color::White));
        assert_eq!(Some(E8), board.king_square(Color::Black));
    }
}
