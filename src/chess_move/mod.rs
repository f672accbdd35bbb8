use core::fmt;

use regex::Regex;
use thiserror::Error;

use crate::board::piece::Piece;
use crate::board::square::Square;

/// A move in coordinate form: source square, target square, and the piece a
/// pawn promotes to when the move reaches the back rank. Castling is encoded
/// as the king's two-square step; en passant as the capturing pawn's
/// diagonal step onto the target square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove {
    from_square: Square,
    to_square: Square,
    promotion: Option<Piece>,
}

#[derive(Error, Debug, PartialEq)]
#[error("`{0}` is not a move in long algebraic notation")]
pub struct MoveParseError(String);

impl ChessMove {
    pub fn new(from_square: Square, to_square: Square) -> Self {
        Self {
            from_square,
            to_square,
            promotion: None,
        }
    }

    pub fn promote(from_square: Square, to_square: Square, promotion: Piece) -> Self {
        Self {
            from_square,
            to_square,
            promotion: Some(promotion),
        }
    }

    pub fn from_square(&self) -> Square {
        self.from_square
    }

    pub fn to_square(&self) -> Square {
        self.to_square
    }

    pub fn promotion(&self) -> Option<Piece> {
        self.promotion
    }

    /// Parses long algebraic notation: `e2e4`, `e7e8q`. Anything not
    /// matching `^[a-h][1-8][a-h][1-8][nbrq]?$` is rejected.
    pub fn from_long_algebraic(notation: &str) -> Result<Self, MoveParseError> {
        let re = Regex::new(r"^([a-h][1-8])([a-h][1-8])([nbrq])?$").unwrap();
        let caps = re
            .captures(notation)
            .ok_or_else(|| MoveParseError(notation.to_string()))?;

        let from_square = Square::from_algebraic(&caps[1]).unwrap();
        let to_square = Square::from_algebraic(&caps[2]).unwrap();
        let promotion = caps
            .get(3)
            .map(|m| Piece::from_promotion_letter(m.as_str().chars().next().unwrap()).unwrap());

        Ok(Self {
            from_square,
            to_square,
            promotion,
        })
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from_square, self.to_square)?;
        if let Some(promotion) = self.promotion {
            // promotion moves never carry a pawn or king
            write!(f, "{}", promotion.to_promotion_letter().unwrap())?;
        }
        Ok(())
    }
}
