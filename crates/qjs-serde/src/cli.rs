//! Logic behind the `qjs-pack` and `qjs-unpack` binaries.
//!
//! - `qjs-pack`   reads JSON on stdin and writes the wire bytes to stdout
//! - `qjs-unpack` reads wire bytes on stdin and writes pretty JSON to stdout
//!
//! Both accept `--max-depth N` and `-v` (repeatable, raises log verbosity).

use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Error;
use crate::options::Options;
use crate::value::Value;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Codec(#[from] Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("invalid argument: {0}")]
    Args(String),
}

/// Parsed command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub options: Options,
    pub verbose: u8,
}

/// Parses flags, skipping the program name.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args, CliError> {
    let mut parsed = Args::default();
    let mut args = args.into_iter().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--max-depth" => {
                let n = args
                    .next()
                    .ok_or_else(|| CliError::Args("--max-depth needs a value".into()))?;
                parsed.options.max_depth = n
                    .parse()
                    .map_err(|_| CliError::Args(format!("--max-depth {n}")))?;
            }
            flag if flag.len() > 1 && flag.starts_with('-') && flag[1..].bytes().all(|b| b == b'v') => {
                parsed.verbose = parsed.verbose.saturating_add((flag.len() - 1) as u8);
            }
            other => return Err(CliError::Args(other.to_string())),
        }
    }
    Ok(parsed)
}

/// Installs a stderr `tracing` subscriber; `-v` raises the level from warn.
pub fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Encodes a JSON document into wire bytes.
pub fn pack(json: &str, options: &Options) -> Result<Vec<u8>, CliError> {
    let json: serde_json::Value = serde_json::from_str(json)?;
    let value = Value::try_from(json)?;
    let bytes = Encoder::with_options(*options).encode(&value)?;
    info!(bytes = bytes.len(), "packed");
    Ok(bytes)
}

/// Decodes wire bytes into a pretty-printed JSON document.
pub fn unpack(bytes: &[u8], options: &Options) -> Result<String, CliError> {
    let mut decoder = Decoder::with_options(*options);
    let value = decoder.decode(bytes)?;
    if decoder.consumed() < bytes.len() {
        info!(
            trailing = bytes.len() - decoder.consumed(),
            "ignoring trailing bytes"
        );
    }
    Ok(serde_json::to_string_pretty(&serde_json::Value::from(value))?)
}
