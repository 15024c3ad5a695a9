use std::collections::HashSet;
use std::path::Path;

use backlog_core::{CategoryRegistry, GameInput, GameRecord, OTHER_CATEGORY, ImageFields};
use backlog_store::{ImageFile, LocalFileBackend, RecordBackend, RecordStore, StoreError};
use tempfile::TempDir;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRfake";

fn open(dir: &Path) -> RecordStore<LocalFileBackend> {
    RecordStore::new(LocalFileBackend::new(dir), CategoryRegistry::with_defaults())
}

fn chrono_trigger() -> GameInput {
    GameInput::new("Chrono Trigger", 9.5, "RPG").with_record_date("2024-05-01T10:00")
}

fn cover() -> ImageFile {
    ImageFile::from_bytes(PNG.to_vec(), Some("cover.png".to_string()))
}

fn image_count(store: &RecordStore<LocalFileBackend>) -> usize {
    match std::fs::read_dir(store.backend().images().dir()) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

#[tokio::test]
async fn add_without_image() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path());

    let added = store.add(chrono_trigger(), None).await.unwrap();
    let all = store.get_all().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], added);
    assert_eq!(added.category, "RPG");
    assert_eq!(added.image_url, None);
    assert_eq!(added.record_date, "2024-05-01T10:00");

    // Persisted, and imageUrl is omitted rather than null.
    let text = std::fs::read_to_string(tmp.path().join("games.json")).unwrap();
    assert!(!text.contains("imageUrl"));
    assert_eq!(open(tmp.path()).get_all().await, all);
}

#[tokio::test]
async fn unknown_category_becomes_other() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path());

    let added = store
        .add(GameInput::new("Mystery", 5.0, "ZZZ"), None)
        .await
        .unwrap();
    assert_eq!(added.category, OTHER_CATEGORY);

    let updated = store
        .update(&added.id, GameInput::new("Mystery", 5.0, "NOPE"), None)
        .await
        .unwrap();
    assert_eq!(updated.category, OTHER_CATEGORY);
    assert!(store.registry().is_known(&updated.category));
}

#[tokio::test]
async fn update_without_image_keeps_image_fields() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path());

    let added = store.add(chrono_trigger(), Some(cover())).await.unwrap();
    let path = added.image_path.clone().unwrap();
    assert!(path.starts_with("Chrono_Trigger_"));
    assert!(store.backend().images().path_for(&path).exists());

    let mut input = chrono_trigger();
    input.score = 7.0;
    let updated = store.update(&added.id, input, None).await.unwrap();
    assert_eq!(updated.score, 7.0);
    assert_eq!(updated.image_fields(), added.image_fields());
    assert_eq!(updated.id, added.id);
}

#[tokio::test]
async fn update_with_image_replaces_the_stored_file() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path());

    let added = store.add(chrono_trigger(), Some(cover())).await.unwrap();
    let old_path = added.image_path.clone().unwrap();

    let updated = store
        .update(&added.id, chrono_trigger(), Some(cover()))
        .await
        .unwrap();
    let new_path = updated.image_path.clone().unwrap();
    assert_ne!(old_path, new_path);
    assert!(!store.backend().images().path_for(&old_path).exists());
    assert!(store.backend().images().path_for(&new_path).exists());
    assert_eq!(image_count(&store), 1);
}

#[tokio::test]
async fn delete_removes_record_and_image() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path());

    let keep = store.add(chrono_trigger(), None).await.unwrap();
    let doomed = store
        .add(GameInput::new("Doom", 8.0, "ACT"), Some(cover()))
        .await
        .unwrap();
    assert_eq!(image_count(&store), 1);

    let removed = store.delete(&doomed.id).await.unwrap();
    assert_eq!(removed.id, doomed.id);
    assert_eq!(store.get_all().await, [keep]);
    assert_eq!(image_count(&store), 0);
}

#[tokio::test]
async fn missing_ids_fail_without_mutation() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path());
    store.add(chrono_trigger(), None).await.unwrap();
    let before = store.get_all().await;

    let err = store.delete("no-such-id").await.unwrap_err();
    assert!(err.is_not_found());
    let err = store
        .update("no-such-id", chrono_trigger(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { ref id } if id == "no-such-id"));

    assert_eq!(store.get_all().await, before);
}

#[tokio::test]
async fn ids_are_unique() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path());
    for i in 0..20 {
        store
            .add(GameInput::new(format!("Game {i}"), 5.0, "ACT"), None)
            .await
            .unwrap();
    }
    let ids: HashSet<String> = store.get_all().await.into_iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn initialize_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let backend = LocalFileBackend::new(tmp.path());
    let mut seeded = GameRecord::new("seed", "Seed");
    seeded.record_date = "2024-01-01T00:00".to_string();
    backend.write_all(&[seeded.clone()]).await.unwrap();

    let mut store = RecordStore::new(backend, CategoryRegistry::with_defaults());
    assert!(!store.is_initialized());
    store.initialize().await;
    let first = store.records().to_vec();

    // Changes on disk after initialization are not picked up.
    store.backend().write_all(&[]).await.unwrap();
    store.initialize().await;
    assert_eq!(store.records(), first.as_slice());
    assert_eq!(first, [seeded]);
}

#[tokio::test]
async fn malformed_file_loads_empty_and_is_not_overwritten() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("games.json"), "{ not an array").unwrap();

    let mut store = open(tmp.path());
    assert!(store.get_all().await.is_empty());
    assert!(store.is_initialized());
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("games.json")).unwrap(),
        "{ not an array"
    );
}

#[tokio::test]
async fn malformed_file_is_backed_up_before_the_first_write() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("games.json"), "{ not an array").unwrap();

    let mut store = open(tmp.path());
    store.add(chrono_trigger(), None).await.unwrap();

    let backups: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("games_backup_"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        std::fs::read_to_string(tmp.path().join(&backups[0])).unwrap(),
        "{ not an array"
    );

    // The rewritten file holds the new record and loads normally.
    let reopened = open(tmp.path()).get_all().await;
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened[0].name, "Chrono Trigger");
}

#[tokio::test]
async fn null_fields_in_the_data_file_are_tolerated() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("games.json"),
        r#"[
            {"id": "okami", "name": "Okami", "score": null, "category": "ACT",
             "recordDate": null, "comment": null},
            {"id": "doom", "name": "Doom", "score": 8, "category": "ACT",
             "recordDate": "2024-01-01T09:00", "comment": "rip and tear"}
        ]"#,
    )
    .unwrap();

    let mut store = open(tmp.path());
    let all = store.get_all().await;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].record_date, "");
    assert_eq!(all[0].score, 0.0);

    store.add(chrono_trigger(), None).await.unwrap();
    let ids: HashSet<String> = open(tmp.path())
        .get_all()
        .await
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert!(ids.contains("okami"));
    assert!(ids.contains("doom"));
    assert_eq!(ids.len(), 3);

    // The null date counts as invalid and gets repaired.
    assert_eq!(store.repair_invalid_dates().await.unwrap(), 1);
}

#[tokio::test]
async fn unknown_fields_survive_updates() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("games.json"),
        r#"[{"id":"x1","name":"Okami","score":9,"category":"ADV",
            "recordDate":"2023-03-03T03:03","comment":"","platform":"PS2"}]"#,
    )
    .unwrap();

    let mut store = open(tmp.path());
    store
        .update("x1", GameInput::new("Okami HD", 9.5, "ADV"), None)
        .await
        .unwrap();

    let reloaded = open(tmp.path()).get_all().await;
    assert_eq!(reloaded[0].name, "Okami HD");
    assert_eq!(reloaded[0].extra["platform"], "PS2");
}

#[tokio::test]
async fn repair_rewrites_invalid_dates_and_persists() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path());
    store
        .add(chrono_trigger().with_record_date("sometime"), None)
        .await
        .unwrap();
    store.add(chrono_trigger(), None).await.unwrap();

    assert_eq!(store.repair_invalid_dates().await.unwrap(), 1);
    assert_eq!(store.repair_invalid_dates().await.unwrap(), 0);

    let reloaded = open(tmp.path()).get_all().await;
    assert!(reloaded.iter().all(|r| r.parsed_date().is_some()));
}

#[tokio::test]
async fn oversized_image_is_rejected_before_anything_is_written() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path()).with_max_image_bytes(4);

    let err = store.add(chrono_trigger(), Some(cover())).await.unwrap_err();
    assert!(matches!(err, StoreError::Image(_)));
    assert!(store.get_all().await.is_empty());
    assert_eq!(image_count(&store), 0);
}

#[tokio::test]
async fn blocked_image_dir_falls_back_to_embedding() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("images"), b"not a directory").unwrap();
    let mut store = open(tmp.path());

    let added = store.add(chrono_trigger(), Some(cover())).await.unwrap();
    assert_eq!(added.image_path, None);
    let url = added.image_url.clone().unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
    assert_eq!(
        added.image_fields(),
        ImageFields::embedded(url)
    );
}

#[tokio::test]
async fn legacy_records_are_migrated_on_load() {
    let tmp = TempDir::new().unwrap();
    let backend = LocalFileBackend::new(tmp.path());
    let mut legacy = GameRecord::new("old", "Old");
    legacy.image_url = Some("/api/image/old.png".to_string());
    backend.write_all(&[legacy]).await.unwrap();

    let mut store = RecordStore::new(backend, CategoryRegistry::with_defaults());
    let records = store.get_all().await;
    assert_eq!(records[0].image_url, None);

    let on_disk = store.backend().load_all().await.unwrap();
    assert_eq!(on_disk, records);
}
