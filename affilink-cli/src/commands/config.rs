use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::cli_types::ConfigAction;
use crate::settings::{self, Settings, SettingsSource};

use super::Context;

pub(crate) fn run_config(
    action: ConfigAction,
    source: SettingsSource,
    data: Option<PathBuf>,
) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => run_config_show(&Context::load(source, data)?),
        ConfigAction::Path => {
            run_config_path(&source);
            Ok(())
        }
        ConfigAction::Init { force } => run_config_init(&source, force),
    }
}

/// Show effective settings and their source.
fn run_config_show(ctx: &Context) -> Result<(), CliError> {
    log::info!(
        "{}",
        "affilink Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!(
        "  Source:  {}",
        ctx.source.if_supports_color(Stdout, |t| t.cyan())
    );
    log::info!("  Data:    {}", ctx.data_path.display());
    log::info!("  Backups: {}", ctx.backups().dir().display());
    crate::log_blank();

    let rendered = toml::to_string_pretty(&ctx.settings)
        .map_err(|e| CliError::config(e.to_string()))?;
    for line in rendered.lines() {
        log::info!("  {}", line);
    }
    Ok(())
}

fn run_config_path(source: &SettingsSource) {
    match source.path() {
        Some(path) => log::info!("{}", path.display()),
        None => log::info!("{}", settings::settings_path().display()),
    }
}

/// Write defaults to the selected settings path, or the user path.
fn run_config_init(source: &SettingsSource, force: bool) -> Result<(), CliError> {
    let path = match source {
        SettingsSource::Flag(p) => p.clone(),
        _ => settings::settings_path(),
    };
    if path.exists() && !force {
        return Err(CliError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    settings::save(&Settings::default(), &path)?;
    log::info!(
        "{} {}",
        "Wrote".if_supports_color(Stdout, |t| t.green()),
        path.display()
    );
    Ok(())
}
