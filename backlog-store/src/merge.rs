//! Building stored records from validated input.

use backlog_core::{GameInput, GameRecord, ImageFields};

/// What an update does to the record's image references.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageUpdate {
    /// Leave all three image fields as they are.
    #[default]
    Keep,
    /// Overwrite all three image fields.
    Replace(ImageFields),
}

/// A new record with `id` and the fields of `input`. No image.
pub fn new_record(id: impl Into<String>, input: &GameInput) -> GameRecord {
    let mut record = GameRecord::new(id, input.name.clone());
    apply_input(&mut record, input);
    record
}

/// `old` with every field of `input` applied. The id and any unknown fields
/// are kept; image fields follow `image`.
pub fn merge_update(old: &GameRecord, input: &GameInput, image: ImageUpdate) -> GameRecord {
    let mut merged = old.clone();
    apply_input(&mut merged, input);
    if let ImageUpdate::Replace(fields) = image {
        merged.set_image_fields(fields);
    }
    merged
}

fn apply_input(record: &mut GameRecord, input: &GameInput) {
    record.name = input.name.clone();
    record.score = input.score;
    record.category = input.category.clone();
    record.play_time = input.play_time;
    record.record_date = input.record_date.clone();
    record.comment = input.comment.clone();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> GameRecord {
        let mut r = GameRecord::new("id-1", "Chrono Trigger");
        r.score = 9.5;
        r.category = "RPG".to_string();
        r.play_time = Some(30.0);
        r.record_date = "2024-05-01T10:00".to_string();
        r.set_image_fields(ImageFields::stored("ct.png", "./data/images/ct.png"));
        r.extra
            .insert("platform".to_string(), serde_json::json!("SNES"));
        r
    }

    #[test]
    fn new_record_copies_input_without_image() {
        let input = GameInput::new("Doom", 8.0, "ACT")
            .with_play_time(4.5)
            .with_comment("rip and tear");
        let record = new_record("abc", &input);
        assert_eq!(record.id, "abc");
        assert_eq!(record.name, "Doom");
        assert_eq!(record.play_time, Some(4.5));
        assert_eq!(record.comment, "rip and tear");
        assert!(!record.has_image());
    }

    #[test]
    fn keep_preserves_image_and_extra_fields() {
        let old = stored();
        let input = GameInput::new("Chrono Trigger", 7.0, "RPG")
            .with_record_date("2024-05-01T10:00");

        let merged = merge_update(&old, &input, ImageUpdate::Keep);
        assert_eq!(merged.score, 7.0);
        assert_eq!(merged.play_time, None);
        assert_eq!(merged.image_fields(), old.image_fields());
        assert_eq!(merged.extra, old.extra);
        assert_eq!(merged.id, "id-1");
    }

    #[test]
    fn replace_overwrites_all_image_fields() {
        let old = stored();
        let input = GameInput::new("Chrono Trigger", 9.5, "RPG");
        let fields = ImageFields::embedded("data:image/png;base64,AAAA");

        let merged = merge_update(&old, &input, ImageUpdate::Replace(fields.clone()));
        assert_eq!(merged.image_fields(), fields);
        assert_eq!(merged.image_path, None);
    }
}
