//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "backlog")]
#[command(about = "Keep track of the games you have played", long_about = None)]
pub(crate) struct Cli {
    /// Storage backend: local or remote (overrides settings and BACKLOG_MODE)
    #[arg(long, global = true)]
    pub mode: Option<String>,

    /// Data directory for the local backend
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the backlog API for the remote backend
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Category config file path or URL
    #[arg(long, global = true)]
    pub categories: Option<String>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Search and ordering options for listing records.
#[derive(Args, Clone, Default)]
pub(crate) struct ListArgs {
    /// Case-insensitive text to look for in game names
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only games recorded in this year
    #[arg(long)]
    pub year: Option<i32>,

    /// Only games recorded in this month (1-12)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Only games in this category code
    #[arg(short, long)]
    pub category: Option<String>,

    /// date-desc, date-asc, score-desc, score-asc, name-asc, name-desc
    #[arg(long, default_value = "date-desc")]
    pub sort: String,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Editable record fields. Every field is optional so `update` can change
/// just one; `add` enforces the required ones itself.
#[derive(Args, Clone, Default)]
pub(crate) struct GameFields {
    /// Score from 0 to 10
    #[arg(long)]
    pub score: Option<String>,

    /// Category code (unknown codes are stored as OTHER)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Hours played
    #[arg(long)]
    pub play_time: Option<String>,

    /// Record date, e.g. 2024-05-01T10:00 (defaults to now)
    #[arg(long)]
    pub date: Option<String>,

    /// Free-form comment
    #[arg(long)]
    pub comment: Option<String>,

    /// Cover image file
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List games, optionally filtered and sorted
    List {
        #[command(flatten)]
        args: ListArgs,
    },

    /// Show one game in full
    Show {
        /// Record id
        id: String,
    },

    /// Add a game
    Add {
        /// Game name
        name: String,

        #[command(flatten)]
        fields: GameFields,
    },

    /// Change fields of an existing game
    Update {
        /// Record id
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: GameFields,
    },

    /// Delete a game and its stored cover image
    Delete {
        /// Record id
        id: String,
    },

    /// Replace unparseable record dates with the current time
    Repair,

    /// Show collection statistics
    Stats {
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// List the years that have recorded games
    Years,

    /// List known category codes
    Categories,

    /// Write a backup copy of the local data file
    Export {
        /// Destination file (default: timestamped file in the current directory)
        dest: Option<PathBuf>,
    },

    /// Replace the local data file with records from a JSON file
    Import {
        /// JSON array of game records
        source: PathBuf,
    },

    /// Delete image files no record references
    Cleanup,

    /// Overwrite the local data file with sample records
    Sample,

    /// Manage settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show resolved settings
    Show,

    /// Print the settings file path
    Path,

    /// Write the resolved settings to the settings file
    Save,
}
