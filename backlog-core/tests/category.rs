use std::fs;
use std::time::Duration;

use backlog_core::{CategoryRegistry, CategorySource, OTHER_CATEGORY};
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> CategorySource {
    let path = dir.path().join("config.json");
    fs::write(&path, content).unwrap();
    CategorySource::File(path)
}

#[tokio::test]
async fn load_reads_file_and_appends_other() {
    let tmp = TempDir::new().unwrap();
    let source = write_config(
        &tmp,
        r#"{"categories": [
            {"code": "RPG", "name": "Role-Playing"},
            {"code": "FPS", "name": "First-Person Shooter"}
        ]}"#,
    );

    let mut registry = CategoryRegistry::new(source);
    assert!(!registry.is_loaded());
    registry.load().await;

    assert!(registry.is_loaded());
    assert!(!registry.using_defaults());
    let codes: Vec<_> = registry.codes().collect();
    assert_eq!(codes, ["RPG", "FPS", OTHER_CATEGORY]);
    assert_eq!(registry.normalize("FPS"), "FPS");
    assert_eq!(registry.normalize("ADV"), OTHER_CATEGORY);
}

#[tokio::test]
async fn missing_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let mut registry =
        CategoryRegistry::new(CategorySource::File(tmp.path().join("nope.json")));
    registry.load().await;

    assert!(registry.using_defaults());
    assert_eq!(registry.entries().len(), 6);
    assert!(registry.is_known("3DSIM"));
}

#[tokio::test]
async fn malformed_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let source = write_config(&tmp, r#"{"categories": [{"name": "no code"}]}"#);
    let mut registry = CategoryRegistry::new(source);
    registry.load().await;
    assert!(registry.using_defaults());

    let source = write_config(&tmp, "{ not json");
    let mut registry = CategoryRegistry::new(source);
    registry.load().await;
    assert!(registry.using_defaults());
}

#[tokio::test]
async fn load_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let source = write_config(&tmp, r#"{"categories": [{"code": "RPG", "name": "RPG"}]}"#);
    let mut registry = CategoryRegistry::new(source);
    registry.load().await;

    // A changed file is not re-read once loaded.
    write_config(&tmp, r#"{"categories": [{"code": "SIM", "name": "Sim"}]}"#);
    registry.load().await;
    assert!(registry.is_known("RPG"));
    assert!(!registry.is_known("SIM"));
}

#[tokio::test]
async fn unreachable_url_falls_back_to_defaults() {
    // Port 9 (discard) on localhost is closed in test environments.
    let mut registry =
        CategoryRegistry::new(CategorySource::Url("http://127.0.0.1:9/config.json".to_string()));
    registry.load().await;
    assert!(registry.using_defaults());
}

#[tokio::test]
async fn silent_url_times_out_to_defaults() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept connections and never answer.
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut registry =
        CategoryRegistry::new(CategorySource::Url(format!("http://{addr}/config.json")))
            .with_fetch_timeout(Duration::from_millis(200));
    let finished = tokio::time::timeout(Duration::from_secs(5), registry.load()).await;

    assert!(finished.is_ok());
    assert!(registry.using_defaults());
    assert_eq!(registry.normalize("ZZZ"), OTHER_CATEGORY);
}
