use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use backlog_core::{available_years, statistics};
use backlog_store::{RecordBackend, RecordStore};

use crate::CliError;

/// Print collection statistics.
pub(crate) async fn run_stats<B: RecordBackend>(
    store: &mut RecordStore<B>,
    json: bool,
) -> Result<(), CliError> {
    store.initialize().await;
    store.load_categories().await;
    let stats = statistics(store.records());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    log::info!(
        "{}",
        "Collection statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");
    log::info!("  Games:          {}", stats.total_games);
    log::info!("  Average score:  {:.1}", stats.average_score);
    log::info!("  Total playtime: {} h", stats.total_play_time);

    if !stats.category_stats.is_empty() {
        log::info!("");
        log::info!("{}", "By category:".if_supports_color(Stdout, |t| t.bold()));
        for (code, count) in &stats.category_stats {
            let name = store.registry().name_of(code).unwrap_or(code);
            log::info!(
                "  {:<8} {:>4}  {}",
                code,
                count,
                name.if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    }

    if !stats.year_stats.is_empty() {
        log::info!("");
        log::info!("{}", "By year:".if_supports_color(Stdout, |t| t.bold()));
        for (year, count) in stats.year_stats.iter().rev() {
            log::info!("  {year}  {count:>4}");
        }
    }
    Ok(())
}

/// Print each year that has at least one valid record date, newest first.
pub(crate) async fn run_years<B: RecordBackend>(
    store: &mut RecordStore<B>,
) -> Result<(), CliError> {
    store.initialize().await;
    let years = available_years(store.records());
    if years.is_empty() {
        log::info!(
            "{}",
            "No dated games yet.".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    for year in years {
        log::info!("{year}");
    }
    Ok(())
}

/// Print the known category codes and where they came from.
pub(crate) async fn run_categories<B: RecordBackend>(
    store: &mut RecordStore<B>,
) -> Result<(), CliError> {
    store.load_categories().await;
    let registry = store.registry();
    if registry.using_defaults() {
        log::info!(
            "{}",
            "Using built-in categories.".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    for entry in registry.entries() {
        log::info!(
            "  {:<8} {}",
            entry.code.if_supports_color(Stdout, |t| t.cyan()),
            entry.name,
        );
    }
    Ok(())
}
