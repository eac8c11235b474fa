//! Aadhaar QR decode command-line tool
//!
//! Reads a raw QR payload from a file and prints exactly one JSON
//! result envelope to stdout. Failures (including a missing or
//! unreadable input file) are reported inside the envelope and the
//! exit code stays 0, so callers only ever need to parse the JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use aqr::{decode, DecodeOptions, Delimiter, Envelope};

#[derive(Parser)]
#[command(name = "aqr")]
#[command(about = "Decode Aadhaar QR payloads to JSON")]
struct Cli {
    /// File containing the raw QR payload text
    input: Option<PathBuf>,

    /// Delimiter encoding of the payload producer
    #[arg(long, value_enum, default_value = "raw")]
    delimiter: DelimiterArg,

    /// Pretty-print the JSON envelope
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum DelimiterArg {
    /// Split on the single 0xFF delimiter byte
    Raw,
    /// Split on the C3 BF pair left by UTF-8 encoding producers
    Utf8,
}

impl From<DelimiterArg> for Delimiter {
    fn from(arg: DelimiterArg) -> Self {
        match arg {
            DelimiterArg::Raw => Delimiter::Raw,
            DelimiterArg::Utf8 => Delimiter::Utf8Pair,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let envelope = run(&cli);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    println!("{json}");
    Ok(())
}

fn run(cli: &Cli) -> Envelope {
    let Some(input) = &cli.input else {
        return Envelope::err("No input file provided");
    };

    let payload = match fs::read_to_string(input) {
        Ok(text) => text,
        Err(e) => return Envelope::err(format!("Failed to read input file: {e}")),
    };

    let options = DecodeOptions {
        delimiter: cli.delimiter.into(),
    };
    decode(payload.trim(), &options)
}
