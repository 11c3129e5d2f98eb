use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::Context;

pub(crate) fn run_set_slug(ctx: &Context, id: &str, slug: &str) -> Result<(), CliError> {
    let mut store = ctx.open_store()?;
    let before = store.get(id)?.slug.clone();
    let record = store.update_slug(id, slug)?;

    if before.as_deref() == Some(slug) {
        log::info!("{} already has slug '{}'", id, slug);
        return Ok(());
    }

    log::info!(
        "{} {} → {}",
        "Updated".if_supports_color(Stdout, |t| t.green()),
        record.id,
        slug.if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!("  Direct: {}", ctx.links()?.direct_url(slug));
    Ok(())
}

pub(crate) fn run_clear_slug(ctx: &Context, id: &str) -> Result<(), CliError> {
    let mut store = ctx.open_store()?;
    let before = store.get(id)?.slug.clone();
    store.clear_slug(id)?;

    match before {
        Some(old) => log::info!(
            "{} slug '{}' from {}",
            "Cleared".if_supports_color(Stdout, |t| t.green()),
            old,
            id
        ),
        None => log::info!("{} has no slug", id),
    }
    Ok(())
}

pub(crate) fn run_suggest(ctx: &Context, id: &str, apply: bool) -> Result<(), CliError> {
    let mut store = ctx.open_store()?;
    let record = store.get(id)?;

    let Some(suggestion) = store.rules().suggest(&record.name, store.table(), Some(id)) else {
        log::warn!(
            "No slug can be derived from the name of {} ('{}')",
            id,
            record.name
        );
        return Ok(());
    };

    log::info!(
        "{}  {}",
        super::catalog::display_name(record),
        suggestion.if_supports_color(Stdout, |t| t.cyan()),
    );
    if let Some(current) = record.slug.as_deref() {
        log::info!("  current: {}", current);
    }

    if apply {
        store.update_slug(id, &suggestion)?;
        log::info!(
            "{}",
            "Applied.".if_supports_color(Stdout, |t| t.green())
        );
    }
    Ok(())
}
