// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tapejson::{SliceReader, Tape, TokenType, Tokenizer, TokenizerConfig};

/// Tokenizes a JSON file and reports the tape or the first fault.
#[derive(Debug, Parser)]
#[command(name = "jsontape", version)]
struct Args {
    /// JSON document to read
    file: PathBuf,

    /// Print every token of the tape
    #[arg(long)]
    dump: bool,

    /// Deepest container nesting accepted
    #[arg(long, default_value_t = TokenizerConfig::default().max_depth)]
    max_depth: usize,
}

fn dump(tape: &Tape, source: &[u8]) {
    // Depth is recovered from child counts: each frame holds the entries its
    // container still owns.
    let mut open: Vec<usize> = Vec::new();
    for (index, token) in tape.tokens().iter().enumerate() {
        while open.last() == Some(&0) {
            open.pop();
        }
        let indent = "  ".repeat(open.len());
        if let Some(owned) = open.last_mut() {
            *owned -= 1;
        }
        let text = match token.kind {
            TokenType::Object | TokenType::Array => format!("({} children)", token.child_count),
            _ => String::from_utf8_lossy(&source[token.span()]).into_owned(),
        };
        println!(
            "{index:>6} {indent}{:<6} {}..{} {text}",
            token.kind, token.begin, token.end
        );
        if token.kind.is_container() {
            open.push(token.owned_entries());
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let source = match std::fs::read(&args.file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: Unable to read file '{}': {}", args.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let tokenizer = Tokenizer::with_config(TokenizerConfig {
        max_depth: args.max_depth,
        ..Default::default()
    });
    let mut reader = SliceReader::new(&source);
    match tokenizer.tokenize(&mut reader) {
        Ok(tape) => {
            if args.dump {
                dump(&tape, &source);
            }
            println!("ok: {} bytes, {} tokens", source.len(), tape.len());
            ExitCode::SUCCESS
        }
        Err(fault) => {
            eprintln!("Error: {fault}");
            ExitCode::FAILURE
        }
    }
}
