//! affilink CLI
//!
//! Command-line interface for managing product slugs, backups, and
//! affiliate link exports.

mod cli_types;
mod commands;
mod error;
mod logging;
mod settings;

use clap::Parser;

use cli_types::{BackupAction, Cli, Commands, ExportAction};
use commands::Context;
pub(crate) use error::CliError;

/// Print an empty line through the logger so `--quiet` suppresses it.
pub(crate) fn log_blank() {
    log::info!("");
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let source = settings::locate(cli.config.as_deref());

    // Config commands must work even when the settings file does not load.
    if let Commands::Config { action } = cli.command {
        return commands::config::run_config(action, source, cli.data);
    }

    let ctx = Context::load(source, cli.data)?;

    match cli.command {
        Commands::Stats => commands::catalog::run_stats(&ctx),
        Commands::Search { query, limit } => commands::catalog::run_search(&ctx, &query, limit),
        Commands::Show { id, affiliate } => {
            commands::catalog::run_show(&ctx, &id, affiliate.as_deref())
        }
        Commands::SetSlug { id, slug } => commands::slugs::run_set_slug(&ctx, &id, &slug),
        Commands::ClearSlug { id } => commands::slugs::run_clear_slug(&ctx, &id),
        Commands::Suggest { id, apply } => commands::slugs::run_suggest(&ctx, &id, apply),
        Commands::Analyze { all } => commands::analyze::run_analyze(&ctx, all),
        Commands::Autofill { dry_run } => commands::bulk::run_autofill(&ctx, dry_run),
        Commands::Apply { updates } => commands::bulk::run_apply(&ctx, &updates),
        Commands::Export { action } => match action {
            ExportAction::Links {
                affiliate,
                output,
                format,
            } => commands::export::run_export_links(&ctx, &affiliate, output.as_deref(), format),
            ExportAction::Program { output, commission } => {
                commands::export::run_export_program(&ctx, output.as_deref(), commission)
            }
        },
        Commands::Backups { action } => match action {
            BackupAction::List => commands::backups::run_backups_list(&ctx),
            BackupAction::Restore { id } => commands::backups::run_backups_restore(&ctx, &id),
        },
        Commands::Config { .. } => Ok(()),
    }
}
