use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use affilink_store::{export_links, program_config, write_links_csv};

use crate::CliError;
use crate::cli_types::ExportFormat;

use super::Context;

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>, CliError> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

pub(crate) fn run_export_links(
    ctx: &Context,
    affiliate: &str,
    output: Option<&Path>,
    format: ExportFormat,
) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let links = ctx.links()?;
    let rows = export_links(store.table(), &links, affiliate);

    let mut out = open_output(output)?;
    match format {
        ExportFormat::Csv => write_links_csv(&rows, &mut out)
            .map_err(|e| CliError::other(format!("Failed to write links: {}", e)))?,
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &rows)
                .map_err(|e| CliError::other(format!("Failed to write links: {}", e)))?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    if let Some(path) = output {
        log::info!("Wrote {} link(s) to {}", rows.len(), path.display());
    }
    Ok(())
}

pub(crate) fn run_export_program(
    ctx: &Context,
    output: Option<&Path>,
    commission: Option<f64>,
) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let links = ctx.links()?;
    let rate = commission.unwrap_or(ctx.settings.links.commission_rate);
    let config = program_config(store.table(), &links, rate);

    let mut out = open_output(output)?;
    serde_json::to_writer_pretty(&mut out, &config)
        .map_err(|e| CliError::other(format!("Failed to write program config: {}", e)))?;
    writeln!(out)?;
    out.flush()?;

    if let Some(path) = output {
        log::info!(
            "Wrote {} product(s) to {}",
            config.products.len(),
            path.display()
        );
    }
    Ok(())
}
