use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use affilink_catalog::Record;

use crate::CliError;

use super::Context;

pub(crate) fn run_stats(ctx: &Context) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let stats = store.stats();

    log::info!(
        "{}",
        "Product Catalog Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  File: {}", store.path().display());
    crate::log_blank();
    log::info!("  Products:           {:>8}", stats.total);
    log::info!("  With names:         {:>8}", stats.with_names);
    log::info!("  With descriptions:  {:>8}", stats.with_descriptions);
    log::info!("  With images:        {:>8}", stats.with_images);
    log::info!("  With slugs:         {:>8}", stats.with_slugs);
    log::info!(
        "  Missing slugs:      {:>8}",
        stats.total - stats.with_slugs
    );
    log::info!(
        "  Slug completion:    {:>7.1}%",
        stats.completion_rate()
    );

    Ok(())
}

pub(crate) fn run_search(ctx: &Context, query: &str, limit: Option<usize>) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let matches = store.search(query);
    let total = matches.clone().count();

    for record in matches.take(limit.unwrap_or(usize::MAX)) {
        log_record_line(record);
    }

    crate::log_blank();
    match limit {
        Some(n) if n < total => log::info!("{} match(es), showing {}", total, n),
        _ => log::info!("{} match(es)", total),
    }
    Ok(())
}

pub(crate) fn run_show(ctx: &Context, id: &str, affiliate: Option<&str>) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let record = store.get(id)?;

    log::info!(
        "{}",
        display_name(record).if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  ID:           {}", record.id);
    log::info!(
        "  Description:  {}",
        record.description.as_deref().unwrap_or("-")
    );
    for (i, image) in record.image_refs.iter().enumerate() {
        let label = if i == 0 { "Images:" } else { "" };
        log::info!("  {:<13} {}", label, image);
    }

    match record.slug.as_deref() {
        Some(slug) => {
            let links = ctx.links()?;
            log::info!("  Slug:         {}", slug.if_supports_color(Stdout, |t| t.cyan()));
            crate::log_blank();
            log::info!("  Direct:       {}", links.direct_url(slug));
            if let Some(affiliate) = affiliate {
                log::info!("  Affiliate:    {}", links.affiliate_url(affiliate, slug));
            }
        }
        None => {
            log::info!(
                "  Slug:         {}",
                "(none)".if_supports_color(Stdout, |t| t.dimmed())
            );
        }
    }
    Ok(())
}

pub(super) fn display_name(record: &Record) -> &str {
    if record.name.is_empty() {
        "(unnamed)"
    } else {
        &record.name
    }
}

fn log_record_line(record: &Record) {
    match record.slug.as_deref() {
        Some(slug) => log::info!(
            "  {:<12} {}  {}",
            record.id,
            display_name(record),
            slug.if_supports_color(Stdout, |t| t.cyan()),
        ),
        None => log::info!(
            "  {:<12} {}  {}",
            record.id,
            display_name(record),
            "(no slug)".if_supports_color(Stdout, |t| t.dimmed()),
        ),
    }
}
