use std::io;

use log::debug;
use minnow::board::Board;
use minnow::moves;
use minnow::uci::{Engine, Output};
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "minnow", about = "uci chess engine")]
struct Minnow {
    #[structopt(subcommand)]
    command: Option<Subcommand>,
}

#[derive(StructOpt, Debug)]
enum Subcommand {
    /// Count legal positions from the start position (perft).
    CountPositions {
        #[structopt(short, long, default_value = "4")]
        depth: u8,
    },
}

fn main() {
    env_logger::init();

    let args = Minnow::from_args();

    match args.command {
        None => run_uci(),
        Some(Subcommand::CountPositions { depth }) => run_count_positions(depth),
    }
}

fn run_uci() {
    debug!("starting uci engine");
    let stdin = io::stdin();
    let mut engine = Engine::new(stdin.lock(), Output::stdout());
    engine.run();
}

fn run_count_positions(depth: u8) {
    for depth in 0..=depth {
        let mut board = Board::starting_position();
        let count = moves::count_positions(depth, &mut board);
        println!("depth: {}, positions: {}", depth, count);
    }
}
