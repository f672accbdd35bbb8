use regex::Regex;
use thiserror::Error;

use super::castle_rights::{
    CastleRightsBitmask, BLACK_KINGSIDE_RIGHTS, BLACK_QUEENSIDE_RIGHTS, WHITE_KINGSIDE_RIGHTS,
    WHITE_QUEENSIDE_RIGHTS,
};
use super::color::Color;
use super::piece::Piece;
use super::square::Square;
use super::Board;

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Everything that can be wrong with a FEN string, shape-wise. Semantic
/// checks (king counts, impossible checks) belong to the `Board`
/// constructor, not the parser.
#[derive(Error, Debug, PartialEq)]
pub enum FenError {
    #[error("expected 6 whitespace-separated fields, got {0}")]
    WrongFieldCount(usize),
    #[error("invalid piece placement `{0}`")]
    BadPlacement(String),
    #[error("invalid active color `{0}`")]
    BadActiveColor(String),
    #[error("invalid castling availability `{0}`")]
    BadCastling(String),
    #[error("invalid en passant target `{0}`")]
    BadEnPassant(String),
    #[error("invalid halfmove clock `{0}`")]
    BadHalfmove(String),
    #[error("invalid fullmove number `{0}`")]
    BadFullmove(String),
}

/// The six FEN fields, parsed but not yet validated as a reachable position.
pub(super) struct ParsedFen {
    pub placement: [Option<(Piece, Color)>; 64],
    pub active_color: Color,
    pub castle_rights: CastleRightsBitmask,
    pub en_passant_target: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

pub(super) fn parse(fen: &str) -> Result<ParsedFen, FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(FenError::WrongFieldCount(fields.len()));
    }

    Ok(ParsedFen {
        placement: parse_placement(fields[0])?,
        active_color: parse_active_color(fields[1])?,
        castle_rights: parse_castle_rights(fields[2])?,
        en_passant_target: parse_en_passant_target(fields[3])?,
        halfmove_clock: parse_halfmove_clock(fields[4])?,
        fullmove_number: parse_fullmove_number(fields[5])?,
    })
}

fn parse_placement(field: &str) -> Result<[Option<(Piece, Color)>; 64], FenError> {
    let mut placement = [None; 64];
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::BadPlacement(field.to_string()));
    }

    // ranks arrive top first: rank 8 down to rank 1
    for (i, rank) in ranks.iter().enumerate() {
        let rank_index = 7 - i as u8;
        let mut file: u8 = 0;

        for fen_char in rank.chars() {
            match Piece::from_fen(fen_char) {
                Some((piece, color)) => {
                    if file >= 8 {
                        return Err(FenError::BadPlacement((*rank).to_string()));
                    }
                    placement[Square::from_file_rank(file, rank_index).index()] =
                        Some((piece, color));
                    file += 1;
                }
                None => {
                    let run = fen_char
                        .to_digit(10)
                        .filter(|run| (1..=8).contains(run))
                        .ok_or_else(|| FenError::BadPlacement((*rank).to_string()))?;
                    file += run as u8;
                    if file > 8 {
                        return Err(FenError::BadPlacement((*rank).to_string()));
                    }
                }
            }
        }

        if file != 8 {
            return Err(FenError::BadPlacement((*rank).to_string()));
        }
    }

    Ok(placement)
}

fn parse_active_color(field: &str) -> Result<Color, FenError> {
    match field {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(FenError::BadActiveColor(field.to_string())),
    }
}

fn parse_castle_rights(field: &str) -> Result<CastleRightsBitmask, FenError> {
    if field == "-" {
        return Ok(0);
    }

    let mut rights = 0;
    for c in field.chars() {
        let right = match c {
            'K' => WHITE_KINGSIDE_RIGHTS,
            'Q' => WHITE_QUEENSIDE_RIGHTS,
            'k' => BLACK_KINGSIDE_RIGHTS,
            'q' => BLACK_QUEENSIDE_RIGHTS,
            _ => return Err(FenError::BadCastling(field.to_string())),
        };
        if rights & right != 0 {
            // repeated letter
            return Err(FenError::BadCastling(field.to_string()));
        }
        rights |= right;
    }

    Ok(rights)
}

fn parse_en_passant_target(field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }

    Square::from_algebraic(field)
        .map(Some)
        .ok_or_else(|| FenError::BadEnPassant(field.to_string()))
}

fn parse_halfmove_clock(field: &str) -> Result<u32, FenError> {
    let re = Regex::new(r"^(0|[1-9][0-9]*)$").unwrap();
    if !re.is_match(field) {
        return Err(FenError::BadHalfmove(field.to_string()));
    }
    field
        .parse::<u32>()
        .map_err(|_| FenError::BadHalfmove(field.to_string()))
}

fn parse_fullmove_number(field: &str) -> Result<u32, FenError> {
    let re = Regex::new(r"^[1-9][0-9]*$").unwrap();
    if !re.is_match(field) {
        return Err(FenError::BadFullmove(field.to_string()));
    }
    field
        .parse::<u32>()
        .map_err(|_| FenError::BadFullmove(field.to_string()))
}

impl Board {
    /// Serializes the position back to a FEN record. Castling letters come
    /// out in `KQkq` order regardless of the order they were parsed in.
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8u8).rev() {
            let mut empty_run = 0;
            for file in 0..8u8 {
                match self.get(Square::from_file_rank(file, rank)) {
                    Some((piece, color)) => {
                        if empty_run > 0 {
                            placement.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        placement.push(piece.to_fen(color));
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let active_color = match self.turn() {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        for (right, letter) in &[
            (WHITE_KINGSIDE_RIGHTS, 'K'),
            (WHITE_QUEENSIDE_RIGHTS, 'Q'),
            (BLACK_KINGSIDE_RIGHTS, 'k'),
            (BLACK_QUEENSIDE_RIGHTS, 'q'),
        ] {
            if self.castle_rights() & right != 0 {
                castling.push(*letter);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = match self.en_passant_target() {
            Some(square) => square.to_string(),
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            placement,
            active_color,
            castling,
            en_passant,
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }
}
