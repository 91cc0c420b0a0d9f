//! Session persistence commands.

use crate::cli::common::{load_config, load_layout, CliError, CliResult};
use crate::services::{
    clear_session, export_layout, load_from_session, save_to_session, FileSessionStore,
    LayoutService,
};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Save, restore or clear the stored editing session
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Session directory (defaults to paths.session_dir from config)
    #[arg(long, value_name = "DIR", global = true)]
    pub dir: Option<PathBuf>,

    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum SessionCommand {
    /// Store a layout file as the current session
    Save {
        /// Path to layout JSON file
        #[arg(short, long, value_name = "FILE")]
        layout: PathBuf,
    },
    /// Restore the stored session
    Load {
        /// Write the restored layout here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Delete the stored session
    Clear,
}

impl SessionArgs {
    /// Execute the session command
    pub fn execute(&self) -> CliResult<()> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => load_config()
                .paths
                .session_dir()
                .map_err(|e| CliError::io(format!("Failed to resolve session directory: {e:#}")))?,
        };
        let mut store = FileSessionStore::new(dir);

        match &self.command {
            SessionCommand::Save { layout } => {
                let parsed = load_layout(layout)?;
                let Some(layout) = parsed.layout.filter(|_| parsed.report.is_valid()) else {
                    eprintln!("{}", parsed.report.format_message());
                    return Err(CliError::validation("Refusing to store an invalid layout"));
                };
                if !save_to_session(&mut store, &layout) {
                    return Err(CliError::io("Failed to save session"));
                }
                println!("✓ Session saved to {}", store.dir().display());
            }
            SessionCommand::Load { output } => {
                let layout = load_from_session(&mut store)
                    .ok_or_else(|| CliError::validation("No valid session stored"))?;
                match output {
                    Some(path) => {
                        LayoutService::save(&layout, path)
                            .map_err(|e| CliError::io(format!("Failed to write layout: {e:#}")))?;
                        println!("✓ Session restored to {}", path.display());
                    }
                    None => {
                        let json = export_layout(&layout)
                            .map_err(|e| CliError::io(format!("Failed to serialize layout: {e:#}")))?;
                        println!("{json}");
                    }
                }
            }
            SessionCommand::Clear => {
                clear_session(&mut store);
                println!("✓ Session cleared");
            }
        }

        Ok(())
    }
}
