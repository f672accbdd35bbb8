//! Attack tables. Leaper attacks (pawn, knight, king) are fixed 64-entry
//! bitboard arrays; sliding attacks are ray-walks against precomputed
//! per-direction rays. An attack set always includes the first blocker in a
//! ray regardless of its color; filtering out friendly targets is the move
//! generator's job.

use std::sync::OnceLock;

use crate::board::bitboard::{
    leftmost_bit, rightmost_bit, Bitboard, A_FILE, B_FILE, EMPTY, G_FILE, H_FILE,
};
use crate::board::color::Color;
use crate::board::piece::Piece;
use crate::board::square::Square;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

pub const ROOK_DIRS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

pub const BISHOP_DIRS: [Direction; 4] = [
    Direction::NorthEast,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::NorthWest,
];

const ALL_DIRS: [Direction; 8] = [
    Direction::North,
    Direction::NorthEast,
    Direction::East,
    Direction::SouthEast,
    Direction::South,
    Direction::SouthWest,
    Direction::West,
    Direction::NorthWest,
];

impl Direction {
    fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::NorthEast => 1,
            Direction::East => 2,
            Direction::SouthEast => 3,
            Direction::South => 4,
            Direction::SouthWest => 5,
            Direction::West => 6,
            Direction::NorthWest => 7,
        }
    }

    fn step(self) -> (i8, i8) {
        // (file delta, rank delta)
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }

    /// Whether a step in this direction increases the square index. Decides
    /// which end of an intercept set is nearest to the origin.
    fn ascending(self) -> bool {
        match self {
            Direction::North | Direction::NorthEast | Direction::East | Direction::NorthWest => {
                true
            }
            Direction::South | Direction::SouthWest | Direction::West | Direction::SouthEast => {
                false
            }
        }
    }
}

struct Targets {
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    pawn: [[Bitboard; 64]; 2],
    rays: [[Bitboard; 8]; 64],
}

static TARGETS: OnceLock<Targets> = OnceLock::new();

fn tables() -> &'static Targets {
    TARGETS.get_or_init(Targets::populate)
}

/// Tables are built lazily on first use; call this to pay the cost up front
/// instead (e.g. before starting a search thread).
pub fn force_init() {
    let _ = tables();
}

fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

impl Targets {
    fn populate() -> Self {
        let mut targets = Self {
            knight: [EMPTY; 64],
            king: [EMPTY; 64],
            pawn: [[EMPTY; 64]; 2],
            rays: [[EMPTY; 8]; 64],
        };

        for i in 0..64usize {
            let bit = 1u64 << i;

            // nne = north-north-east, nee = north-east-east, etc. Shifts
            // that would wrap around the board are trimmed by masking the
            // forbidden target files for each jump direction.
            let mut knight = EMPTY;
            knight |= bit << 17 & !A_FILE;
            knight |= bit << 10 & !A_FILE & !B_FILE;
            knight |= bit >> 6 & !A_FILE & !B_FILE;
            knight |= bit >> 15 & !A_FILE;
            knight |= bit << 15 & !H_FILE;
            knight |= bit << 6 & !G_FILE & !H_FILE;
            knight |= bit >> 10 & !G_FILE & !H_FILE;
            knight |= bit >> 17 & !H_FILE;
            targets.knight[i] = knight;

            let mut king = EMPTY;
            king |= bit << 8;
            king |= bit >> 8;
            king |= bit << 1 & !A_FILE;
            king |= bit >> 1 & !H_FILE;
            king |= bit << 9 & !A_FILE;
            king |= bit << 7 & !H_FILE;
            king |= bit >> 7 & !A_FILE;
            king |= bit >> 9 & !H_FILE;
            targets.king[i] = king;

            // a pawn can never stand on the back ranks, so those table
            // entries stay empty
            let rank = i / 8;
            if rank != 0 && rank != 7 {
                targets.pawn[color_index(Color::White)][i] =
                    (bit << 9 & !A_FILE) | (bit << 7 & !H_FILE);
                targets.pawn[color_index(Color::Black)][i] =
                    (bit >> 7 & !A_FILE) | (bit >> 9 & !H_FILE);
            }

            for &dir in ALL_DIRS.iter() {
                let (df, dr) = dir.step();
                let mut file = (i % 8) as i8 + df;
                let mut rank = (i / 8) as i8 + dr;
                let mut ray = EMPTY;
                while (0..8).contains(&file) && (0..8).contains(&rank) {
                    ray |= Square::from_file_rank(file as u8, rank as u8).bitboard();
                    file += df;
                    rank += dr;
                }
                targets.rays[i][dir.index()] = ray;
            }
        }

        targets
    }
}

fn sliding_targets(square: Square, blockers: Bitboard, dirs: &[Direction; 4]) -> Bitboard {
    let tables = tables();
    let mut attacked = EMPTY;

    for &dir in dirs.iter() {
        let ray = tables.rays[square.index()][dir.index()];
        if ray == EMPTY {
            continue;
        }

        let intercepts = ray & blockers;
        if intercepts == EMPTY {
            attacked |= ray;
            continue;
        }

        // the nearest intercept terminates the ray; everything beyond it is
        // shadowed, the intercept itself stays attacked
        let intercept = if dir.ascending() {
            rightmost_bit(intercepts)
        } else {
            leftmost_bit(intercepts)
        };
        let shadowed = tables.rays[intercept.trailing_zeros() as usize][dir.index()];
        attacked |= ray ^ shadowed;
    }

    attacked
}

/// The set of squares `piece` attacks from `square`. Blockers only matter
/// for sliding pieces; color only matters for pawns.
pub fn attacks(piece: Piece, color: Color, square: Square, blockers: Bitboard) -> Bitboard {
    let tables = tables();
    match piece {
        Piece::Pawn => tables.pawn[color_index(color)][square.index()],
        Piece::Knight => tables.knight[square.index()],
        Piece::King => tables.king[square.index()],
        Piece::Rook => sliding_targets(square, blockers, &ROOK_DIRS),
        Piece::Bishop => sliding_targets(square, blockers, &BISHOP_DIRS),
        Piece::Queen => {
            sliding_targets(square, blockers, &ROOK_DIRS)
                | sliding_targets(square, blockers, &BISHOP_DIRS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::square::*;

    fn squares_of(bitboard: Bitboard) -> Vec<Square> {
        crate::board::square::all_squares()
            .filter(|square| bitboard & square.bitboard() != 0)
            .collect()
    }

    #[test]
    fn test_pawn_attacks_empty_on_back_ranks() {
        for &color in &[Color::White, Color::Black] {
            for file in 0..8 {
                let first = Square::from_file_rank(file, 0);
                let last = Square::from_file_rank(file, 7);
                assert_eq!(EMPTY, attacks(Piece::Pawn, color, first, EMPTY));
                assert_eq!(EMPTY, attacks(Piece::Pawn, color, last, EMPTY));
            }
        }
    }

    #[test]
    fn test_pawn_attacks_are_diagonal_only() {
        assert_eq!(
            vec![D3, F3],
            squares_of(attacks(Piece::Pawn, Color::White, E2, EMPTY))
        );
        assert_eq!(
            vec![D6, F6],
            squares_of(attacks(Piece::Pawn, Color::Black, E7, EMPTY))
        );
        // edge files do not wrap
        assert_eq!(
            vec![B5],
            squares_of(attacks(Piece::Pawn, Color::White, A4, EMPTY))
        );
        assert_eq!(
            vec![G3],
            squares_of(attacks(Piece::Pawn, Color::Black, H4, EMPTY))
        );
    }

    #[test]
    fn test_knight_attacks_in_corners() {
        assert_eq!(
            vec![C2, B3],
            squares_of(attacks(Piece::Knight, Color::White, A1, EMPTY))
        );
        assert_eq!(
            vec![G6, F7],
            squares_of(attacks(Piece::Knight, Color::White, H8, EMPTY))
        );
    }

    #[test]
    fn test_knight_attacks_in_center() {
        assert_eq!(
            vec![D2, F2, C3, G3, C5, G5, D6, F6],
            squares_of(attacks(Piece::Knight, Color::White, E4, EMPTY))
        );
    }

    #[test]
    fn test_king_attacks() {
        assert_eq!(
            vec![B1, A2, B2],
            squares_of(attacks(Piece::King, Color::White, A1, EMPTY))
        );
        assert_eq!(
            vec![D3, E3, F3, D4, F4, D5, E5, F5],
            squares_of(attacks(Piece::King, Color::White, E4, EMPTY))
        );
    }

    #[test]
    fn test_rook_attacks_include_blockers() {
        // blockers are attacked no matter their color; the generator
        // filters friendly targets later
        let blockers = H2.bitboard() | G1.bitboard();
        assert_eq!(
            vec![G1, H2],
            squares_of(attacks(Piece::Rook, Color::White, H1, blockers))
        );
    }

    #[test]
    fn test_rook_attacks_open_board() {
        assert_eq!(14, attacks(Piece::Rook, Color::White, E4, EMPTY).count_ones());
        assert_eq!(14, attacks(Piece::Rook, Color::White, A1, EMPTY).count_ones());
    }

    #[test]
    fn test_bishop_attacks_stop_after_blocker() {
        let blockers = C3.bitboard();
        let attacked = attacks(Piece::Bishop, Color::White, A1, blockers);
        assert_eq!(vec![B2, C3], squares_of(attacked));
    }

    #[test]
    fn test_queen_is_rook_union_bishop() {
        let blockers = E7.bitboard() | B4.bitboard() | G2.bitboard() | D3.bitboard();
        for &square in &[A1, E4, H7, D5] {
            let queen = attacks(Piece::Queen, Color::White, square, blockers);
            let rook = attacks(Piece::Rook, Color::White, square, blockers);
            let bishop = attacks(Piece::Bishop, Color::White, square, blockers);
            assert_eq!(rook | bishop, queen);
        }
    }

    #[test]
    fn test_force_init_is_idempotent() {
        force_init();
        force_init();
        assert_eq!(
            attacks(Piece::Knight, Color::White, A1, EMPTY),
            attacks(Piece::Knight, Color::Black, A1, EMPTY)
        );
    }
}
