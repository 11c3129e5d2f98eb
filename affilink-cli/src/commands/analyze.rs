use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use affilink_store::{SuggestionCause, analyze};

use crate::CliError;

use super::Context;

/// Suggestions printed without `--all`.
const SUGGESTION_PREVIEW: usize = 10;

pub(crate) fn run_analyze(ctx: &Context, all: bool) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let report = analyze(store.table(), store.rules());

    log::info!(
        "{}",
        "Slug Analysis".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  File: {}", store.path().display());
    crate::log_blank();
    log::info!("  Products:           {:>8}", report.total);
    log::info!("  With slugs:         {:>8}", report.with_slugs());
    log::info!("  Missing slugs:      {:>8}", report.missing_count);
    log::info!("  Invalid slugs:      {:>8}", report.invalid_count());
    log::info!("  Duplicate groups:   {:>8}", report.duplicate_groups.len());
    log::info!("  Completion:         {:>7.1}%", report.completion_rate());

    if !report.invalid.is_empty() {
        crate::log_blank();
        log::info!("{}", "Invalid slugs".if_supports_color(Stdout, |t| t.bold()));
        for invalid in &report.invalid {
            log::info!(
                "  {:<12} {}  {}",
                invalid.id,
                invalid.slug.if_supports_color(Stdout, |t| t.red()),
                invalid.reason,
            );
        }
    }

    if !report.duplicate_groups.is_empty() {
        crate::log_blank();
        log::info!(
            "{}",
            "Duplicate slugs (fix by hand)".if_supports_color(Stdout, |t| t.bold())
        );
        for (slug, ids) in &report.duplicate_groups {
            log::info!(
                "  {}  {}",
                slug.if_supports_color(Stdout, |t| t.yellow()),
                ids.join(", ")
            );
        }
    }

    if !report.suggestions.is_empty() {
        crate::log_blank();
        log::info!("{}", "Suggestions".if_supports_color(Stdout, |t| t.bold()));
        let shown = if all {
            report.suggestions.len()
        } else {
            SUGGESTION_PREVIEW.min(report.suggestions.len())
        };
        for suggestion in &report.suggestions[..shown] {
            let cause = match &suggestion.cause {
                SuggestionCause::Missing => "missing".to_string(),
                SuggestionCause::Invalid(reason) => reason.to_string(),
            };
            log::info!(
                "  {:<12} {}  {}",
                suggestion.id,
                suggestion.suggested.if_supports_color(Stdout, |t| t.cyan()),
                format!("({})", cause).if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        if shown < report.suggestions.len() {
            log::info!(
                "  ... and {} more (use --all to list them)",
                report.suggestions.len() - shown
            );
        }
        crate::log_blank();
        log::info!("Run 'affilink autofill' to assign slugs to products that have none.");
    }

    Ok(())
}
