//! ModelZoo CLI
//!
//! Command-line interface for saving, loading and inspecting trained models

use clap::{Parser, Subcommand};
use modelzoo_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "modelzoo-cli")]
#[command(about = "ModelZoo - Persist trained models to files or database tables", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Save a staging directory as a model
    Save(commands::save::SaveArgs),
    /// Load a model into a directory
    Load(commands::load::LoadArgs),
    /// Print a model's training statement without keeping its files
    Inspect(commands::inspect::InspectArgs),
}

fn main() {
    let cli = Cli::parse();

    init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Save(args) => commands::save::execute(args),
        Commands::Load(args) => commands::load::execute(args),
        Commands::Inspect(args) => commands::inspect::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
