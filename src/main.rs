//! Main entry point for celldiff CLI

use celldiff::cli::Cli;
use celldiff::commands::execute_command;
use clap::Parser;

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = celldiff::logging::init(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Execute the command
    if let Err(e) = execute_command(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
