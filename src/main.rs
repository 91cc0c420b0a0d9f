//! RackPlan - headless rack layout tooling
//!
//! Validates, migrates and inspects rack layout files, imports device
//! libraries and manages the stored editing session.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rackplan::cli::{
    ExitCode, ImportLibraryArgs, InspectArgs, LibraryArgs, MigrateArgs, SessionArgs, ValidateArgs,
};

/// RackPlan - equipment rack layout tooling
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a layout file
    Validate(ValidateArgs),
    /// Upgrade a layout file to the current schema
    Migrate(MigrateArgs),
    /// Show rack occupancy from one side
    Inspect(InspectArgs),
    /// Import device types from a library file
    ImportLibrary(ImportLibraryArgs),
    /// List the built-in starter device types
    Library(LibraryArgs),
    /// Save, restore or clear the editing session
    Session(SessionArgs),
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Commands::Validate(args) => args.execute(),
        Commands::Migrate(args) => args.execute(),
        Commands::Inspect(args) => args.execute(),
        Commands::ImportLibrary(args) => args.execute(),
        Commands::Library(args) => args.execute(),
        Commands::Session(args) => args.execute(),
    };

    match result {
        Ok(()) => std::process::exit(ExitCode::Success.code()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
