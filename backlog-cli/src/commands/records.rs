use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use backlog_core::{GameForm, GameInput, GameRecord, SearchFilters, SortOrder, search, sort};
use backlog_store::{ImageFile, RecordBackend, RecordStore, StoreError};

use crate::CliError;
use crate::cli_types::{GameFields, ListArgs};

/// Longest image reference printed in full by `show`.
const MAX_SHOWN_URL: usize = 80;

/// List records matching the search, in the requested order.
pub(crate) async fn run_list<B: RecordBackend>(
    store: &mut RecordStore<B>,
    args: ListArgs,
) -> Result<(), CliError> {
    store.initialize().await;
    store.load_categories().await;

    let order = SortOrder::from_str_loose(&args.sort);
    if order.as_str() != args.sort.trim().to_lowercase() {
        log::warn!(
            "Unknown sort order '{}', using {}",
            args.sort,
            order.as_str()
        );
    }

    let filters = SearchFilters {
        year: args.year,
        month: args.month,
        category: args.category,
    };
    let text = args.search.unwrap_or_default();
    let found = search(store.records(), &text, &filters, store.registry());
    let sorted = sort(&found, order);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sorted)?);
        return Ok(());
    }

    if sorted.is_empty() {
        log::info!(
            "{}",
            "No games found.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }

    for record in &sorted {
        print_row(record);
    }
    log::info!("");
    log::info!("{} of {} games", sorted.len(), store.records().len());
    Ok(())
}

fn print_row(record: &GameRecord) {
    let date = if record.parsed_date().is_some() {
        format!("{:<16}", record.record_date)
    } else {
        format!("{:<16}", "(invalid date)")
    };
    let score = format!("{:>4.1}", record.score);
    log::info!(
        "  {}  {}  {} {}  {}",
        date.if_supports_color(Stdout, |t| t.dimmed()),
        score.if_supports_color(Stdout, |t| t.yellow()),
        record.name.if_supports_color(Stdout, |t| t.bold()),
        format!("[{}]", record.category).if_supports_color(Stdout, |t| t.cyan()),
        record.id.if_supports_color(Stdout, |t| t.dimmed()),
    );
}

/// Print every field of one record.
pub(crate) async fn run_show<B: RecordBackend>(
    store: &mut RecordStore<B>,
    id: &str,
) -> Result<(), CliError> {
    store.initialize().await;
    store.load_categories().await;
    let record = store
        .find(id)
        .ok_or_else(|| StoreError::not_found(id))?;

    log::info!("{}", record.name.if_supports_color(Stdout, |t| t.bold()));
    log::info!("  ID:        {}", record.id);
    log::info!("  Score:     {:.1}", record.score);
    log::info!(
        "  Category:  {} ({})",
        record.category,
        store.registry().name_of(&record.category).unwrap_or("unknown"),
    );
    if let Some(hours) = record.play_time {
        log::info!("  Play time: {hours} h");
    }
    log::info!("  Date:      {}", record.record_date);
    if !record.comment.is_empty() {
        log::info!("  Comment:   {}", record.comment);
    }
    if let Some(path) = &record.image_path {
        log::info!("  Image:     {path}");
    }
    if let Some(url) = &record.image_url {
        let url = store.backend().resolve_image_url(url);
        log::info!("  Image URL: {}", describe_image_url(&url));
    }
    for (key, value) in &record.extra {
        log::info!("  {key}: {value}");
    }
    Ok(())
}

fn describe_image_url(url: &str) -> String {
    if url.starts_with("data:") {
        format!("embedded data URI ({} bytes)", url.len())
    } else if url.chars().count() > MAX_SHOWN_URL {
        let head: String = url.chars().take(MAX_SHOWN_URL).collect();
        format!("{head}...")
    } else {
        url.to_string()
    }
}

/// Form for a new record. Missing required fields are left blank so
/// validation reports them.
pub(crate) fn form_for_add(name: String, fields: &GameFields) -> GameForm {
    GameForm {
        name,
        score: fields.score.clone().unwrap_or_default(),
        category: fields.category.clone().unwrap_or_default(),
        play_time: fields.play_time.clone().unwrap_or_default(),
        record_date: fields.date.clone().unwrap_or_default(),
        comment: fields.comment.clone().unwrap_or_default(),
    }
}

/// Form for an update: the record's current values with the given fields
/// laid over them.
pub(crate) fn form_for_update(
    current: &GameRecord,
    name: Option<String>,
    fields: &GameFields,
) -> GameForm {
    GameForm {
        name: name.unwrap_or_else(|| current.name.clone()),
        score: fields
            .score
            .clone()
            .unwrap_or_else(|| current.score.to_string()),
        category: fields
            .category
            .clone()
            .unwrap_or_else(|| current.category.clone()),
        play_time: fields
            .play_time
            .clone()
            .or_else(|| current.play_time.map(|h| h.to_string()))
            .unwrap_or_default(),
        record_date: fields
            .date
            .clone()
            .unwrap_or_else(|| current.record_date.clone()),
        comment: fields
            .comment
            .clone()
            .unwrap_or_else(|| current.comment.clone()),
    }
}

async fn read_image(fields: &GameFields) -> Result<Option<ImageFile>, CliError> {
    match &fields.image {
        Some(path) => Ok(Some(ImageFile::read(path).await?)),
        None => Ok(None),
    }
}

pub(crate) async fn run_add<B: RecordBackend>(
    store: &mut RecordStore<B>,
    name: String,
    fields: GameFields,
) -> Result<(), CliError> {
    let input = GameInput::try_from(form_for_add(name, &fields))?;
    let image = read_image(&fields).await?;
    let requested = input.category.clone();

    let record = store.add(input, image).await?;
    if record.category != requested {
        log::warn!(
            "Unknown category '{requested}', stored as {}",
            record.category
        );
    }
    log::info!(
        "{} Added {} {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        record.name.if_supports_color(Stdout, |t| t.bold()),
        format!("({})", record.id).if_supports_color(Stdout, |t| t.dimmed()),
    );
    Ok(())
}

pub(crate) async fn run_update<B: RecordBackend>(
    store: &mut RecordStore<B>,
    id: &str,
    name: Option<String>,
    fields: GameFields,
) -> Result<(), CliError> {
    store.initialize().await;
    let current = store
        .find(id)
        .ok_or_else(|| StoreError::not_found(id))?;
    let input = GameInput::try_from(form_for_update(current, name, &fields))?;
    let image = read_image(&fields).await?;

    let record = store.update(id, input, image).await?;
    log::info!(
        "{} Updated {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        record.name.if_supports_color(Stdout, |t| t.bold()),
    );
    Ok(())
}

pub(crate) async fn run_delete<B: RecordBackend>(
    store: &mut RecordStore<B>,
    id: &str,
) -> Result<(), CliError> {
    let removed = store.delete(id).await?;
    log::info!(
        "{} Deleted {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        removed.name.if_supports_color(Stdout, |t| t.bold()),
    );
    Ok(())
}

pub(crate) async fn run_repair<B: RecordBackend>(
    store: &mut RecordStore<B>,
) -> Result<(), CliError> {
    let repaired = store.repair_invalid_dates().await?;
    if repaired == 0 {
        log::info!("All record dates are valid.");
    } else {
        log::info!(
            "{} Repaired {} record dates",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            repaired,
        );
    }
    Ok(())
}
