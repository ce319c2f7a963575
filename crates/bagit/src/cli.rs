use std::path::PathBuf;

use bagit_core::{TagEncoding, Version};
use clap::{Args, Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[command(name = "bagit", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Log at debug level. `RUST_LOG` overrides this.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "c", name = "create", about = "Turn a directory into a bag in place")]
    Create(CreateArg),
    #[command(name = "verify", about = "Check that a bag is complete")]
    Verify(CheckArg),
    #[command(alias = "v", name = "validate", about = "Check that a bag is complete and every checksum matches")]
    Validate(CheckArg),
    #[command(alias = "q", name = "quick", about = "Compare Payload-Oxum with the payload directory")]
    Quick(BagArg),
    #[command(alias = "i", name = "info", about = "Show what a bag declares")]
    Info(BagArg),
}

#[derive(Args, Clone, Debug)]
pub struct CreateArg {
    pub dir: PathBuf,

    /// Checksum algorithms, comma separated.
    #[arg(
        long,
        short,
        value_delimiter = ',',
        default_value = "sha512",
        env = "BAGIT_ALGORITHMS"
    )]
    pub algorithms: Vec<String>,

    #[arg(long = "bagit-version", value_parser = parse_version, default_value = "1.0")]
    pub bagit_version: Version,

    #[arg(long, value_parser = parse_encoding, default_value = "UTF-8")]
    pub encoding: TagEncoding,

    /// Move and checksum dot-prefixed files too.
    #[arg(long)]
    pub include_hidden: bool,

    /// Extra `bag-info.txt` entries as `key=value`.
    #[arg(long = "metadata", short, value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,
}

#[derive(Args, Clone, Debug)]
pub struct CheckArg {
    pub dir: PathBuf,

    /// Skip dot-prefixed payload files when checking manifest membership.
    #[arg(long, env = "BAGIT_IGNORE_HIDDEN")]
    pub ignore_hidden: bool,
}

#[derive(Args, Clone, Debug)]
pub struct BagArg {
    pub dir: PathBuf,
}

fn parse_version(s: &str) -> Result<Version, String> { s.parse().map_err(|e| format!("{e}")) }

fn parse_encoding(s: &str) -> Result<TagEncoding, String> { s.parse().map_err(|e| format!("{e}")) }

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
