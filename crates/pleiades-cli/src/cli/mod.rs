mod commands;

use clap::Parser;
use pleiades_core::ParError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error}");
            2
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{err}");
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "pleiades-rs", about = "SAMMY parameter file toolkit")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Print a JSON summary of a parameter file
    Show(commands::ShowArgs),
    /// Parse a parameter file, normalize it and write it back out
    Rewrite(commands::RewriteArgs),
    /// Combine weighted isotope parameter files into a compound file
    Compound(commands::CompoundArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Show(args) => commands::run_show_command(args),
        CliCommand::Rewrite(args) => commands::run_rewrite_command(args),
        CliCommand::Compound(args) => commands::run_compound_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Par(#[from] ParError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
