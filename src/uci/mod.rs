//! The UCI front-end: a blocking read loop on the main thread and at most
//! one search worker at a time. The worker owns the board for the duration
//! of a `go`; cancellation is a shared atomic flag; every line written to
//! the GUI goes through one locked sink so `info` and `bestmove` lines
//! never interleave.

mod command;

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use log::{debug, info, warn};

use crate::board::Board;
use crate::chess_move::ChessMove;
use crate::searcher::{InfoReporter, Searcher};

/// Depth used to model `go infinite`; deep enough to run until stopped.
const INFINITE_SEARCH_DEPTH: u8 = 99;

/// A line-oriented writer shared between the command loop and the search
/// worker. One lock per line keeps output whole.
#[derive(Clone)]
pub struct Output {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Output {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    fn send(&self, line: &str) {
        let mut sink = self.sink.lock().unwrap();
        // failing to talk to the GUI is not recoverable in any useful way
        writeln!(sink, "{}", line).unwrap();
        sink.flush().unwrap();
    }
}

struct UciInfoReporter {
    output: Output,
}

impl InfoReporter for UciInfoReporter {
    fn report_info(&self, depth: u8, score: f32, pv: &[ChessMove]) {
        let centipawns = (score * 100.0) as i32;
        let formatted_pv = pv
            .iter()
            .map(|mv| mv.to_string())
            .collect::<Vec<String>>()
            .join(" ");
        self.output.send(&format!(
            "info depth {} score cp {} pv {}",
            depth, centipawns, formatted_pv
        ));
    }
}

pub struct Engine<R> {
    input: R,
    output: Output,
    board: Arc<Mutex<Board>>,
    stop_flag: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl<R: BufRead> Engine<R> {
    pub fn new(input: R, output: Output) -> Self {
        Self {
            input,
            output,
            board: Arc::new(Mutex::new(Board::starting_position())),
            stop_flag: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Reads commands until `quit` or end of input. Returning cleanly is
    /// the process's exit code 0.
    pub fn run(&mut self) {
        info!("starting uci command loop");

        loop {
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => panic!("error reading command input: {}", e),
            }
            if line.trim().is_empty() {
                continue;
            }

            match command::Command::parse(&line) {
                command::Command::Uci => self.handshake(),
                command::Command::IsReady => self.output.send("readyok"),
                command::Command::NewGame => self.new_game(),
                command::Command::SetPosition { fen, moves } => self.set_position(fen, moves),
                command::Command::Go { depth, infinite } => self.go(depth, infinite),
                command::Command::Stop => self.stop(),
                command::Command::Quit => break,
                command::Command::Unknown(raw) => {
                    info!("ignoring unrecognized command `{}`", raw);
                }
            }
        }

        // an in-flight search finishes on its own terms so the final
        // bestmove is not cut off; a GUI wanting a fast exit sends stop
        // first
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn handshake(&self) {
        self.output.send(&format!(
            "id name {} v{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ));
        self.output
            .send(&format!("id author {}", env!("CARGO_PKG_AUTHORS")));
        self.output.send("uciok");
    }

    fn new_game(&mut self) {
        if self.search_is_running() {
            info!("ignoring ucinewgame while a search is running");
            return;
        }
        debug!("resetting board to the starting position");
        *self.board.lock().unwrap() = Board::starting_position();
    }

    fn set_position(&mut self, fen: Option<String>, moves: Vec<String>) {
        if self.search_is_running() {
            info!("ignoring position command while a search is running");
            return;
        }

        let new_board = match &fen {
            Some(fen) => match Board::from_fen(fen) {
                Ok(board) => board,
                Err(e) => {
                    info!("unable to set position `{}`: {}", fen, e);
                    return;
                }
            },
            None => Board::starting_position(),
        };

        let mut board = self.board.lock().unwrap();
        *board = new_board;

        for notation in &moves {
            let mv = match ChessMove::from_long_algebraic(notation) {
                Ok(mv) => mv,
                Err(e) => {
                    info!("skipping unparsable move: {}", e);
                    continue;
                }
            };
            if let Err(e) = board.make_move(mv) {
                info!("ignoring illegal move: {}", e);
            }
        }
        debug!("position set:\n{}", board);
    }

    fn go(&mut self, depth: Option<u8>, infinite: bool) {
        if self.search_is_running() {
            info!("a search is already running; ignoring go");
            return;
        }

        let depth = if infinite {
            INFINITE_SEARCH_DEPTH
        } else {
            match depth {
                Some(depth) if depth >= 1 => depth,
                Some(depth) => {
                    warn!("rejecting go with depth {}", depth);
                    return;
                }
                None => {
                    info!("go command without a mode; ignoring it");
                    return;
                }
            }
        };

        let reporter = UciInfoReporter {
            output: self.output.clone(),
        };
        let mut searcher = Searcher::with_reporter(depth, Box::new(reporter));
        self.stop_flag = searcher.stop_handle();

        let board = Arc::clone(&self.board);
        let output = self.output.clone();
        self.worker = Some(std::thread::spawn(move || {
            let mut board = board.lock().unwrap();
            match searcher.search(&mut board) {
                Ok(best_move) => output.send(&format!("bestmove {}", best_move)),
                // stopped before depth 1 completed, or the game is over;
                // there is no move to report
                Err(e) => warn!("search finished without a best move: {}", e),
            }
        }));
    }

    fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    fn search_is_running(&self) -> bool {
        match &self.worker {
            Some(worker) => !worker.is_finished(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// A `Write` handing every byte to a shared buffer the test keeps.
    #[derive(Clone)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run_session(script: &str) -> Vec<String> {
        let buffer = SharedBuffer(Arc::new(Mutex::new(vec![])));
        let output = Output::new(buffer.clone());
        let mut engine = Engine::new(Cursor::new(script.to_string()), output);
        engine.run();

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| line.to_string())
            .collect()
    }

    #[test]
    fn test_handshake_order() {
        let lines = run_session("uci\nquit\n");
        assert!(lines[0].starts_with("id name "));
        assert!(lines[1].starts_with("id author "));
        assert_eq!("uciok", lines[2]);
    }

    #[test]
    fn test_isready() {
        let lines = run_session("isready\nquit\n");
        assert_eq!(vec!["readyok".to_string()], lines);
    }

    #[test]
    fn test_unknown_commands_are_ignored() {
        let lines = run_session("xyzzy\nisready\nquit\n");
        assert_eq!(vec!["readyok".to_string()], lines);
    }

    #[test]
    fn test_go_emits_one_bestmove_after_info_lines() {
        let lines = run_session("position startpos\ngo depth 2\nquit\n");

        let bestmove_lines: Vec<&String> =
            lines.iter().filter(|line| line.starts_with("bestmove ")).collect();
        assert_eq!(1, bestmove_lines.len());
        // bestmove comes after every info line
        assert!(lines.last().unwrap().starts_with("bestmove "));

        let depths: Vec<u8> = lines
            .iter()
            .filter(|line| line.starts_with("info depth "))
            .map(|line| {
                line.split_whitespace()
                    .nth(2)
                    .unwrap()
                    .parse()
                    .unwrap()
            })
            .collect();
        assert_eq!(vec![1, 2], depths);
    }

    #[test]
    fn test_info_lines_have_score_and_pv() {
        let lines = run_session("position startpos\ngo depth 1\nquit\n");
        let info = lines
            .iter()
            .find(|line| line.starts_with("info "))
            .unwrap();
        let tokens: Vec<&str> = info.split_whitespace().collect();
        assert_eq!("info", tokens[0]);
        assert_eq!("depth", tokens[1]);
        assert_eq!("score", tokens[3]);
        assert_eq!("cp", tokens[4]);
        assert_eq!("pv", tokens[6]);
        // the pv holds at least the move to play, in long algebraic form
        assert!(ChessMove::from_long_algebraic(tokens[7]).is_ok());
    }

    #[test]
    fn test_position_moves_are_applied_and_illegal_ones_skipped() {
        // e2e5 is illegal and skipped; e7e5 is black's reply after e2e4
        let lines = run_session(
            "position startpos moves e2e4 e2e5 e7e5\ngo depth 1\nquit\n",
        );
        assert!(lines.iter().any(|line| line.starts_with("bestmove ")));
    }

    #[test]
    fn test_stop_without_search_is_harmless() {
        let lines = run_session("stop\nisready\nquit\n");
        assert_eq!(vec!["readyok".to_string()], lines);
    }

    #[test]
    fn test_stop_during_search_emits_at_most_one_bestmove() {
        // depending on timing the stop lands before or after depth 1
        // completes; either way there is never more than one bestmove and
        // the engine keeps serving commands
        let lines = run_session("position startpos\ngo infinite\nstop\nisready\nquit\n");
        let bestmoves = lines
            .iter()
            .filter(|line| line.starts_with("bestmove "))
            .count();
        assert!(bestmoves <= 1);
        assert!(lines.contains(&"readyok".to_string()));
    }

    #[test]
    fn test_go_with_zero_depth_is_rejected() {
        let lines = run_session("position startpos\ngo depth 0\nquit\n");
        assert!(lines.iter().all(|line| !line.starts_with("bestmove")));
    }

    #[test]
    fn test_invalid_fen_is_rejected_and_engine_keeps_running() {
        let lines = run_session("position fen not a real fen\nisready\nquit\n");
        assert_eq!(vec!["readyok".to_string()], lines);
    }
}
