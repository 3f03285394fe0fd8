pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "intake",
    about = "Patient intake call service operator CLI",
    long_about = "Inspect configuration, check credential readiness, and run transcript extraction by hand.",
    after_help = "Examples:\n  intake doctor --json\n  intake config\n  intake extract call-transcript.txt"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, telephony credentials, and provider endpoint readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Extract email, name, and appointment info from a transcript file")]
    Extract {
        #[arg(help = "Plain-text transcript, or a JSON array of {speaker, text} entries")]
        path: PathBuf,
    },
}

pub fn run() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Extract { path } => commands::extract::run(&path),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
