//! Command-line interface definitions and parsing

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Relaychat message broker", long_about = None)]
pub struct Cli {
    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Transcript file path (overrides the config file)
    #[arg(short, long)]
    pub log_file: Option<String>,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
