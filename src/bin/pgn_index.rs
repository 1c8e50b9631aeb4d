use std::env;
use std::fs;

use chessbook::pgn::index_games;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: pgn_index <file.pgn>");
        return;
    }

    let text = match fs::read_to_string(&args[1]) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("failed to read {}: {e}", args[1]);
            return;
        }
    };

    let indices = index_games(&text);
    for (i, idx) in indices.iter().enumerate() {
        let header_str: Vec<String> = idx
            .headers
            .iter()
            .map(|(k, v)| format!("{k}=\"{v}\""))
            .collect();
        println!("{i}\t{}..{}\t{}", idx.start_offset, idx.end_offset, header_str.join(" "));
    }
}
