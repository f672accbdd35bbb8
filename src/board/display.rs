use core::fmt;

use super::square::Square;
use super::Board;

impl Board {
    /// Renders the board as an ASCII grid, rank 8 at the top. Used in logs
    /// and test output.
    pub fn to_ascii(&self) -> String {
        let mut out = String::new();
        for rank in (0..8u8).rev() {
            out.push_str(&format!("{} |", rank + 1));
            for file in 0..8u8 {
                match self.get(Square::from_file_rank(file, rank)) {
                    Some((piece, color)) => out.push_str(&format!(" {} ", piece.to_fen(color))),
                    None => out.push_str(" . "),
                }
            }
            out.push('\n');
        }
        out.push_str("   a  b  c  d  e  f  g  h\n");
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ascii())
    }
}
