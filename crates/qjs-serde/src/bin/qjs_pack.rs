//! `qjs-pack`: encode JSON (stdin) to the QuickJS serialization format (stdout).
//!
//! Usage:
//!   qjs-pack [--max-depth N] [-v]

use qjs_serde::cli::{init_tracing, pack, parse_args};
use std::io::{self, Read, Write};

fn main() {
    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: qjs-pack [--max-depth N] [-v]");
            std::process::exit(2);
        }
    };
    init_tracing(args.verbose);

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match pack(buf.trim(), &args.options) {
        Ok(bytes) => {
            if let Err(e) = io::stdout().write_all(&bytes) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
