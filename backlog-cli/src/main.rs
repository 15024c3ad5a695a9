//! backlog CLI
//!
//! Command-line interface for recording, searching, and summarizing the
//! games you have played.

mod cli_types;
mod commands;
mod error;

use std::io::Write;

use clap::Parser;
use log::LevelFilter;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use backlog_core::CategoryRegistry;
use backlog_remote::RemoteBackend;
use backlog_store::{BackendKind, LocalFileBackend, RecordBackend, RecordStore, Settings};

use cli_types::{Cli, Commands, ConfigAction};
use commands::{config, maintenance, records, report};
pub(crate) use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => fail(CliError::runtime(e.to_string())),
    };
    if let Err(e) = rt.block_on(run(cli)) {
        fail(e);
    }
}

fn fail(e: CliError) -> ! {
    log::error!("{} {}", "\u{2718}".if_supports_color(Stdout, |t| t.red()), e);
    std::process::exit(1);
}

/// Plain messages at info level; level and timestamp prefixes with `--verbose`.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module("backlog", level)
        .target(env_logger::Target::Stdout)
        .format(move |buf, record| {
            if verbose {
                writeln!(
                    buf,
                    "[{} {:<5} {}] {}",
                    buf.timestamp_seconds(),
                    record.level(),
                    record.target(),
                    record.args()
                )
            } else {
                writeln!(buf, "{}", record.args())
            }
        })
        .parse_default_env();
    let _ = builder.try_init();
}

/// Settings by priority: command-line flag, environment, settings file,
/// built-in default.
fn resolve_settings(cli: &Cli) -> Result<Settings, CliError> {
    let mut settings = Settings::load();
    if let Some(mode) = &cli.mode {
        settings.backend.mode = BackendKind::from_str_loose(mode).ok_or_else(|| {
            CliError::config(format!("Unknown mode '{mode}' (expected local or remote)"))
        })?;
    }
    if let Some(dir) = &cli.data_dir {
        settings.backend.data_dir = dir.clone();
    }
    if let Some(url) = &cli.api_url {
        settings.backend.api_base_url = url.clone();
    }
    if let Some(source) = &cli.categories {
        settings.categories.source = source.clone();
    }
    Ok(settings)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = resolve_settings(&cli)?;

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => config::run_config_show(&settings),
            ConfigAction::Path => {
                config::run_config_path();
                Ok(())
            }
            ConfigAction::Save => config::run_config_save(&settings),
        },
        Commands::Export { dest } => {
            maintenance::run_export(&local_only(&settings, "export")?, dest.as_deref()).await
        }
        Commands::Import { source } => {
            maintenance::run_import(&local_only(&settings, "import")?, &source).await
        }
        Commands::Cleanup => maintenance::run_cleanup(&local_only(&settings, "cleanup")?).await,
        Commands::Sample => maintenance::run_sample(&local_only(&settings, "sample")?).await,
        command => {
            let registry = CategoryRegistry::new(settings.category_source());
            match settings.backend.mode {
                BackendKind::Local => {
                    let backend = LocalFileBackend::new(&settings.backend.data_dir);
                    let store = RecordStore::new(backend, registry)
                        .with_max_image_bytes(settings.images.max_bytes);
                    run_store_command(store, command).await
                }
                BackendKind::Remote => {
                    let backend = RemoteBackend::new(&settings.backend.api_base_url)?;
                    let store = RecordStore::new(backend, registry)
                        .with_max_image_bytes(settings.images.max_bytes);
                    run_store_command(store, command).await
                }
            }
        }
    }
}

/// The local backend for a maintenance command, or an error in remote mode.
fn local_only(settings: &Settings, command: &str) -> Result<LocalFileBackend, CliError> {
    match settings.backend.mode {
        BackendKind::Local => Ok(LocalFileBackend::new(&settings.backend.data_dir)),
        BackendKind::Remote => Err(CliError::config(format!(
            "'{command}' works on the local data directory; rerun with --mode local"
        ))),
    }
}

async fn run_store_command<B: RecordBackend>(
    mut store: RecordStore<B>,
    command: Commands,
) -> Result<(), CliError> {
    log::debug!(
        "Using {} backend at {}",
        store.backend().kind(),
        store.backend().location()
    );

    match command {
        Commands::List { args } => records::run_list(&mut store, args).await,
        Commands::Show { id } => records::run_show(&mut store, &id).await,
        Commands::Add { name, fields } => records::run_add(&mut store, name, fields).await,
        Commands::Update { id, name, fields } => {
            records::run_update(&mut store, &id, name, fields).await
        }
        Commands::Delete { id } => records::run_delete(&mut store, &id).await,
        Commands::Repair => records::run_repair(&mut store).await,
        Commands::Stats { json } => report::run_stats(&mut store, json).await,
        Commands::Years => report::run_years(&mut store).await,
        Commands::Categories => report::run_categories(&mut store).await,
        Commands::Export { .. }
        | Commands::Import { .. }
        | Commands::Cleanup
        | Commands::Sample
        | Commands::Config { .. } => unreachable!("handled before a store is opened"),
    }
}
