use std::env;
use std::time::Instant;

use chessbook::Position;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: perft <fen> <depth>");
        return;
    }

    let fen = &args[1];
    let depth: u32 = match args[2].parse() {
        Ok(d) => d,
        Err(_) => {
            eprintln!("invalid depth: {}", args[2]);
            return;
        }
    };

    let position = match Position::from_fen(fen) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("invalid FEN: {e}");
            return;
        }
    };

    println!("perft depth {depth} for {fen}");
    let start = Instant::now();
    let nodes = position.perft(depth);
    let dur = start.elapsed();
    println!("nodes: {nodes} in {dur:?}");
}
