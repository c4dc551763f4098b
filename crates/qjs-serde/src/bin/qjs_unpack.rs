//! `qjs-unpack`: decode the QuickJS serialization format (stdin) to JSON (stdout).
//!
//! Usage:
//!   qjs-unpack [--max-depth N] [-v]

use qjs_serde::cli::{init_tracing, parse_args, unpack};
use std::io::{self, Read, Write};

fn main() {
    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: qjs-unpack [--max-depth N] [-v]");
            std::process::exit(2);
        }
    };
    init_tracing(args.verbose);

    let mut buf = Vec::new();
    if let Err(e) = io::stdin().read_to_end(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match unpack(&buf, &args.options) {
        Ok(json) => {
            if let Err(e) = writeln!(io::stdout(), "{json}") {
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
