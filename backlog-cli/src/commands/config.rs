use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use backlog_store::{BackendKind, Settings, settings_path};

use crate::CliError;

/// Show the resolved settings and where the settings file lives.
pub(crate) fn run_config_show(settings: &Settings) -> Result<(), CliError> {
    let path = settings_path();

    log::info!(
        "{}",
        "Backlog Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");

    log::info!("  mode:         {}", settings.backend.mode);
    match settings.backend.mode {
        BackendKind::Local => {
            log::info!("  data_dir:     {}", settings.backend.data_dir.display());
        }
        BackendKind::Remote => {
            log::info!("  api_base_url: {}", settings.backend.api_base_url);
        }
    }
    log::info!("  categories:   {}", settings.category_source());
    log::info!("  max image:    {} bytes", settings.images.max_bytes);
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    println!("{}", settings_path().display());
}

/// Write the resolved settings to the settings file.
pub(crate) fn run_config_save(settings: &Settings) -> Result<(), CliError> {
    let path = settings_path();
    settings.save_to(&path)?;
    log::info!(
        "{} Saved settings to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}
