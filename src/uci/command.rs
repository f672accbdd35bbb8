//! The accepted slice of the UCI command grammar. Commands are dispatched
//! on their first token; anything unrecognized becomes `Unknown` and is
//! logged and ignored by the engine loop.

#[derive(Debug, PartialEq)]
pub(super) enum Command {
    Uci,
    IsReady,
    NewGame,
    SetPosition {
        fen: Option<String>,
        moves: Vec<String>,
    },
    Go {
        depth: Option<u8>,
        infinite: bool,
    },
    Stop,
    Quit,
    Unknown(String),
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        if parts.is_empty() {
            return Command::Unknown(input.to_string());
        }

        match parts[0] {
            "uci" => Command::Uci,
            "isready" => Command::IsReady,
            "ucinewgame" => Command::NewGame,
            "position" => parse_position(&parts),
            "go" => parse_go(&parts),
            "stop" => Command::Stop,
            "quit" => Command::Quit,
            _ => Command::Unknown(input.trim().to_string()),
        }
    }
}

fn parse_position(parts: &[&str]) -> Command {
    let moves_index = parts.iter().position(|&token| token == "moves");
    let moves = match moves_index {
        Some(index) => parts[index + 1..].iter().map(|s| s.to_string()).collect(),
        None => vec![],
    };
    let fen_end = moves_index.unwrap_or(parts.len());

    match parts.get(1) {
        Some(&"startpos") => Command::SetPosition { fen: None, moves },
        Some(&"fen") if parts.len() > 2 => Command::SetPosition {
            fen: Some(parts[2..fen_end].join(" ")),
            moves,
        },
        _ => Command::Unknown(parts.join(" ")),
    }
}

fn parse_go(parts: &[&str]) -> Command {
    let mut depth = None;
    let mut infinite = false;

    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "infinite" => infinite = true,
            "depth" if i + 1 < parts.len() => {
                depth = parts[i + 1].parse().ok();
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    Command::Go { depth, infinite }
}
