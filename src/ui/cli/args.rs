// Wed Jan 15 2026 - Alex

use crate::memory::Address;
use crate::pattern::Notation;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "native-sigscan")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Create and find wildcarded byte signatures in native binaries", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    /// JSON settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a signature for an address range
    Create(CreateArgs),
    /// Search a binary for a signature
    Find(FindArgs),
    /// Rewrite a signature in another notation
    Convert(ConvertArgs),
}

#[derive(clap::Args, Debug)]
pub struct SourceArgs {
    #[arg(short, long)]
    pub binary: PathBuf,

    /// Treat the file as flat bytes addressed by file offset
    #[arg(long)]
    pub raw: bool,

    /// Address of the first byte when --raw is given
    #[arg(long, value_parser = parse_address, default_value = "0")]
    pub base: Address,
}

#[derive(Parser, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(short, long, value_parser = parse_address)]
    pub start: Address,

    #[arg(short = 'n', long)]
    pub length: u64,

    /// Instruction metadata JSON
    #[arg(short, long)]
    pub instructions: Option<PathBuf>,

    #[arg(long)]
    pub notation: Option<Notation>,

    /// Overrides custom_wildcard from the settings
    #[arg(short, long)]
    pub wildcard: Option<String>,
}

#[derive(Parser, Debug)]
pub struct FindArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Signature text, read from stdin when omitted
    #[arg(short, long)]
    pub pattern: Option<String>,

    #[arg(long)]
    pub notation: Option<Notation>,

    /// Reference address for the nearest match
    #[arg(long, value_parser = parse_address)]
    pub from: Option<Address>,

    #[arg(long)]
    pub parallel: bool,

    /// Cancel the search after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Signature text, read from stdin when omitted
    #[arg(short, long)]
    pub pattern: Option<String>,

    #[arg(long)]
    pub from: Notation,

    #[arg(long)]
    pub to: Notation,

    #[arg(short, long)]
    pub wildcard: Option<String>,
}

impl CreateArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.length == 0 {
            return Err("length must be greater than 0".to_string());
        }
        if self.source.raw && self.instructions.is_some() {
            log::warn!("Instruction metadata is ignored for raw views");
        }
        Ok(())
    }
}

pub fn parse_address(text: &str) -> Result<Address, String> {
    Address::parse(text).ok_or_else(|| format!("invalid address '{}'", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_find_command() {
        let args = Args::parse_from([
            "native-sigscan",
            "find",
            "-b",
            "target.bin",
            "-p",
            "48 8B ? ? 90",
            "--from",
            "0x1000",
            "--notation",
            "norm",
        ]);

        match args.command {
            Command::Find(find) => {
                assert_eq!(find.source.binary, PathBuf::from("target.bin"));
                assert_eq!(find.pattern.as_deref(), Some("48 8B ? ? 90"));
                assert_eq!(find.from, Some(Address::new(0x1000)));
                assert_eq!(find.notation, Some(Notation::Norm));
                assert!(!find.source.raw);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_parse_create_command() {
        let args = Args::parse_from([
            "native-sigscan",
            "--log-level",
            "debug",
            "create",
            "-b",
            "target.bin",
            "--raw",
            "--base",
            "0x400000",
            "-s",
            "0x400010",
            "-n",
            "16",
        ]);

        match args.command {
            Command::Create(create) => {
                assert!(create.source.raw);
                assert_eq!(create.source.base, Address::new(0x400000));
                assert_eq!(create.start, Address::new(0x400010));
                assert_eq!(create.length, 16);
                assert!(create.validate().is_ok());
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn test_rejects_bad_address() {
        let result = Args::try_parse_from(["native-sigscan", "create", "-b", "a", "-s", "zz", "-n", "4"]);
        assert!(result.is_err());
    }
}
