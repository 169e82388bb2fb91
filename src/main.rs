use anyhow::Result;
use clap::{Parser, Subcommand};

#[cfg(test)]
mod testutil;

mod config;
mod directive;
mod filespec;
mod filing;
mod importers;
mod payees;
mod tags;

#[derive(Debug, Parser)]
/// Imports ASN Bank statements into Beancount journals.
struct Command {
    #[command(subcommand)]
    subcmd: SubCommand,
}

#[derive(Debug, Subcommand)]
enum SubCommand {
    #[command(name = "extract")]
    /// Converts ASN Bank CSV statements to Beancount transactions and a
    /// closing balance, asking for payees that are not cached yet.
    Extract(importers::cmd::Command),
    #[command(name = "identify")]
    /// Reports which files are ASN Bank statements of the configured account.
    Identify(filing::cmd::IdentifyCommand),
    #[command(name = "file")]
    /// Copies statements into a documents tree organized by account.
    File(filing::cmd::FileCommand),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cmd = Command::parse();
    use SubCommand::*;
    match cmd.subcmd {
        Extract(cmd) => cmd.run(),
        Identify(cmd) => cmd.run(),
        File(cmd) => cmd.run(),
    }
}
