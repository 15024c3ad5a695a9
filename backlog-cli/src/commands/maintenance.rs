use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use backlog_store::LocalFileBackend;
use backlog_store::maintenance;

use crate::CliError;

pub(crate) async fn run_export(
    backend: &LocalFileBackend,
    dest: Option<&Path>,
) -> Result<(), CliError> {
    let written = maintenance::export(backend, dest).await?;
    log::info!(
        "{} Exported to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        written.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}

pub(crate) async fn run_import(backend: &LocalFileBackend, source: &Path) -> Result<(), CliError> {
    let summary = maintenance::import(backend, source).await?;
    if let Some(backup) = &summary.backup {
        log::info!(
            "  Previous data saved to {}",
            backup.display().if_supports_color(Stdout, |t| t.cyan()),
        );
    }
    log::info!(
        "{} Imported {} games",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        summary.imported,
    );
    Ok(())
}

pub(crate) async fn run_cleanup(backend: &LocalFileBackend) -> Result<(), CliError> {
    let removed = maintenance::cleanup_unused_images(backend).await?;
    if removed.is_empty() {
        log::info!(
            "{}",
            "No unused images.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }
    for name in &removed {
        log::info!("  removed {}", name.if_supports_color(Stdout, |t| t.dimmed()));
    }
    log::info!(
        "{} Removed {} unused images",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        removed.len(),
    );
    Ok(())
}

pub(crate) async fn run_sample(backend: &LocalFileBackend) -> Result<(), CliError> {
    let count = maintenance::create_sample(backend).await?;
    log::info!(
        "{} Wrote {} sample games to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        count,
        backend.data_file().display(),
    );
    Ok(())
}
