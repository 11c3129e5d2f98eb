//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "affilink")]
#[command(about = "Manage product slugs and affiliate links", long_about = None)]
pub(crate) struct Cli {
    /// Product CSV to operate on (overrides `data_path` from the config)
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Settings file (defaults to ./affilink.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Show record counts and slug completion
    Stats,

    /// Find products whose name or description contains a term
    Search {
        /// Case-insensitive search term (empty lists everything)
        #[arg(default_value = "")]
        query: String,

        /// Maximum number of results to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one product and its links
    Show {
        id: String,

        /// Affiliate id used for the affiliate link
        #[arg(short, long)]
        affiliate: Option<String>,
    },

    /// Assign a slug to a product
    SetSlug { id: String, slug: String },

    /// Remove a product's slug
    ClearSlug { id: String },

    /// Suggest a unique slug for a product from its name
    Suggest {
        id: String,

        /// Assign the suggestion right away
        #[arg(long)]
        apply: bool,
    },

    /// Report missing, invalid, and duplicated slugs
    Analyze {
        /// Print every suggestion instead of the first few
        #[arg(long)]
        all: bool,
    },

    /// Assign derived slugs to every product that has none
    Autofill {
        /// Show planned slugs without writing anything
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Apply slug assignments from a CSV with `id,slug` columns
    Apply { updates: PathBuf },

    /// Export links for products that have slugs
    Export {
        #[command(subcommand)]
        action: ExportAction,
    },

    /// Inspect and restore table snapshots
    Backups {
        #[command(subcommand)]
        action: BackupAction,
    },

    /// Inspect settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ExportAction {
    /// Write direct and affiliate links for every slugged product
    Links {
        /// Affiliate id (omit for direct links only)
        #[arg(short, long, default_value = "")]
        affiliate: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },

    /// Write the affiliate program product config as JSON
    Program {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Commission percentage (defaults to the configured rate)
        #[arg(long)]
        commission: Option<f64>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
pub(crate) enum BackupAction {
    /// List snapshots, newest first
    List,

    /// Replace the table with a snapshot (the current state is backed up first)
    Restore {
        /// Snapshot id as shown by `backups list`, or "latest"
        id: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show effective settings and where they came from
    Show,

    /// Print the settings file path
    Path,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
