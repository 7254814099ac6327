use std::{path::PathBuf, process::exit};

use anyhow::Result;
use armtrace::{AccessKind, DecodeConfig, TraceIndex, inline};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the trace lines that read or wrote an address
    Find(FindCmd),
    /// Inline `dofile` includes into a single script
    Inline(InlineCmd),
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Access,
    Read,
    Write,
}

impl Kind {
    fn filter(self) -> Option<AccessKind> {
        match self {
            Kind::Access => None,
            Kind::Read => Some(AccessKind::Read),
            Kind::Write => Some(AccessKind::Write),
        }
    }
}

#[derive(clap::Args)]
struct FindCmd {
    trace: PathBuf,

    /// Address in hex, with or without 0x
    #[arg(value_parser = parse_address)]
    address: u32,

    #[arg(short, long, value_enum, default_value_t = Kind::Read)]
    kind: Kind,

    /// Only print the matching positions
    #[arg(long)]
    positions_only: bool,

    /// Legacy ldm/stm decoding (decrement steps up,
    /// register ranges count once)
    #[arg(long)]
    legacy_block: bool,

    #[arg(long, default_value = armtrace::layout::HEADER_MARKER)]
    header_marker: String,
}

impl FindCmd {
    fn run(&self) -> Result<()> {
        let config = DecodeConfig {
            header_marker: self.header_marker.clone(),
            legacy_block_addressing: self.legacy_block,
        };
        let index = TraceIndex::load(&self.trace, &config)?;
        log::info!("Loaded {} trace entries from {}", index.len(), self.trace.display());

        let positions = index.find(self.address, self.kind.filter());
        println!("{positions:?}");
        if !self.positions_only {
            for line in index.lines(&positions) {
                println!("{line}");
            }
        }
        Ok(())
    }
}

#[derive(clap::Args)]
struct InlineCmd {
    #[arg(requires = "output")]
    input: Option<PathBuf>,

    output: Option<PathBuf>,
}

impl InlineCmd {
    fn run(&self) -> Result<()> {
        match (&self.input, &self.output) {
            (Some(input), Some(output)) => inline::inline_file(input, output),
            _ => {
                println!("Using default file names.");
                inline::inline_file(inline::DEFAULT_INPUT, inline::DEFAULT_OUTPUT)
            }
        }
    }
}

fn parse_address(token: &str) -> Result<u32, String> {
    let token = token.trim();
    let hex = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u32::from_str_radix(hex, 16).map_err(|e| format!("invalid address '{token}': {e}"))
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder()
        .format_timestamp(None)
        .format_level(true)
        .format_target(false)
        .filter_level(level)
        .parse_default_env()
        .init();

    let result = match &cli.command {
        Commands::Find(args) => args.run(),
        Commands::Inline(args) => args.run(),
    };

    if let Err(e) = result {
        log::error!("{e:#}");
        exit(1);
    }
}
