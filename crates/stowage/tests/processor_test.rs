//! End-to-end tests for upload processing.

use regex::Regex;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use stowage::{
    FieldConfig, FieldOutcome, FieldValue, FilePlacement, PathErrorKind, PlacementErrorKind,
    PlacementOptions, PlacementResult, RecordSnapshot, ResolvedPath, StowageConfig,
    StowageErrorKind, StowageResult, UploadErrorKind, UploadProcessor,
};
use tempfile::TempDir;

fn temp_upload(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn upload_value(name: &str, tmp: &Path, error: i64) -> serde_json::Value {
    json!({
        "name": name,
        "type": "application/octet-stream",
        "tmp_name": tmp.to_str().unwrap(),
        "error": error,
        "size": 4,
    })
}

fn field(path: &str) -> FieldConfig {
    FieldConfig::builder().path(path).build().unwrap()
}

fn record(value: serde_json::Value) -> RecordSnapshot {
    RecordSnapshot::from_json(value).unwrap()
}

fn stored(record: &RecordSnapshot, key: &str) -> Option<String> {
    record.get(key).and_then(FieldValue::as_scalar).map(str::to_string)
}

#[test]
fn test_places_upload_end_to_end() {
    let root = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let upload = temp_upload(&tmp, "xyz", "jpeg bytes");

    let config = StowageConfig::new(root.path()).with_field("photo", field("uploads/:id/:md5"));
    let processor = UploadProcessor::new(config);
    let mut record = record(json!({
        "id": 7,
        "photo_file": upload_value("photo.JPG", &upload, 0),
    }));

    let reports = processor.process(&mut record).unwrap();

    let path = stored(&record, "photo").unwrap();
    let pattern = Regex::new(r"^uploads/7/[0-9a-f]{32}\.jpg$").unwrap();
    assert!(pattern.is_match(&path), "stored path: {}", path);
    assert_eq!(fs::read_to_string(root.path().join(&path)).unwrap(), "jpeg bytes");
    assert!(record.get("photo_file").is_none());

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].field(), "photo");
    match reports[0].outcome() {
        FieldOutcome::Placed(placed) => assert_eq!(placed.stored_value(), &path),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_prefix_is_prepended_to_stored_value() {
    let root = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let upload = temp_upload(&tmp, "up", "x");

    let avatar = FieldConfig::builder()
        .path("avatars/:id")
        .prefix("/media/")
        .build()
        .unwrap();
    let config = StowageConfig::new(root.path()).with_field("avatar", avatar);
    let processor = UploadProcessor::new(config);
    let mut record = record(json!({ "id": 3, "avatar_file": upload_value("me.png", &upload, 0) }));

    processor.process(&mut record).unwrap();

    assert_eq!(stored(&record, "avatar").as_deref(), Some("/media/avatars/3.png"));
    assert!(root.path().join("avatars/3.png").exists());
}

#[test]
fn test_no_file_submitted_is_skipped() {
    let root = TempDir::new().unwrap();
    let processor =
        UploadProcessor::new(StowageConfig::new(root.path()).with_field("photo", field("u/:id")));
    let mut record = record(json!({
        "id": 1,
        "photo": "u/1.jpg",
        "photo_file": { "name": "", "tmp_name": "", "error": 4, "size": 0 },
    }));

    let reports = processor.process(&mut record).unwrap();

    assert_eq!(reports[0].outcome(), &FieldOutcome::Skipped);
    assert_eq!(stored(&record, "photo").as_deref(), Some("u/1.jpg"));
    assert!(record.get("photo_file").is_none());
}

#[test]
fn test_fatal_upload_aborts_without_touching_disk() {
    let root = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let upload = temp_upload(&tmp, "partial", "half");
    let processor = UploadProcessor::new(
        StowageConfig::new(root.path()).with_field("photo", field("uploads/:id")),
    );
    let mut record = record(json!({ "id": 1, "photo_file": upload_value("a.jpg", &upload, 3) }));

    let err = processor.process(&mut record).unwrap_err();

    match err.kind() {
        StowageErrorKind::Upload(e) => assert_eq!(e.kind(), &UploadErrorKind::Partial),
        other => panic!("unexpected error: {}", other),
    }
    assert!(format!("{}", err).contains("partially uploaded"));
    assert!(!root.path().join("uploads").exists());
    assert!(record.get("photo").is_none());
    assert!(record.get("photo_file").is_none());
}

#[test]
fn test_missing_path_fails_before_any_change() {
    let root = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let first = temp_upload(&tmp, "first", "a");
    let second = temp_upload(&tmp, "second", "b");

    let config = StowageConfig::new(root.path())
        .with_field("avatar", field("avatars/:id"))
        .with_field("banner", FieldConfig::default());
    let processor = UploadProcessor::new(config);
    let mut record = record(json!({
        "id": 1,
        "avatar_file": upload_value("a.png", &first, 0),
        "banner_file": upload_value("b.png", &second, 0),
    }));
    let before = record.clone();

    let err = processor.process(&mut record).unwrap_err();

    assert!(matches!(err.kind(), StowageErrorKind::Config(_)));
    assert!(format!("{}", err).contains("banner"));
    assert_eq!(record, before);
    assert!(first.exists());
    assert!(!root.path().join("avatars").exists());
}

#[test]
fn test_fields_without_upload_data_are_ignored() {
    let root = TempDir::new().unwrap();
    let processor = UploadProcessor::new(
        StowageConfig::new(root.path()).with_field("photo", FieldConfig::default()),
    );
    let mut record = record(json!({ "id": 1, "photo_file": "not an upload" }));
    let before = record.clone();

    let reports = processor.process(&mut record).unwrap();

    assert!(reports.is_empty());
    assert_eq!(record, before);
}

#[test]
fn test_new_upload_replaces_previous_file() {
    let root = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let old = root.path().join("uploads/7/old.jpg");
    fs::create_dir_all(old.parent().unwrap()).unwrap();
    fs::write(&old, "old").unwrap();
    let upload = temp_upload(&tmp, "new", "new");

    let processor = UploadProcessor::new(
        StowageConfig::new(root.path()).with_field("photo", field("uploads/:id/:md5")),
    );
    let mut record = record(json!({
        "id": 7,
        "photo": "uploads/7/old.jpg",
        "photo_file": upload_value("new.jpg", &upload, 0),
    }));

    processor.process(&mut record).unwrap();

    assert!(!old.exists());
    let path = stored(&record, "photo").unwrap();
    assert_ne!(path, "uploads/7/old.jpg");
    assert!(root.path().join(path).exists());
}

#[test]
fn test_overwrite_disabled_refuses_existing_destination() {
    let root = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let existing = root.path().join("docs/1.pdf");
    fs::create_dir_all(existing.parent().unwrap()).unwrap();
    fs::write(&existing, "keep").unwrap();
    let upload = temp_upload(&tmp, "doc", "new");

    let doc = FieldConfig::builder()
        .path("docs/:id")
        .overwrite(false)
        .build()
        .unwrap();
    let processor = UploadProcessor::new(StowageConfig::new(root.path()).with_field("doc", doc));
    let mut record = record(json!({ "id": 1, "doc_file": upload_value("doc.PDF", &upload, 0) }));

    let err = processor.process(&mut record).unwrap_err();

    match err.kind() {
        StowageErrorKind::Placement(e) => {
            assert!(matches!(e.kind(), PlacementErrorKind::DestinationExists(_)))
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(fs::read_to_string(&existing).unwrap(), "keep");
    assert!(record.get("doc_file").is_none());
}

#[test]
fn test_nested_record_fields_feed_the_template() {
    let root = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let upload = temp_upload(&tmp, "cover", "x");

    let processor = UploadProcessor::new(
        StowageConfig::new(root.path()).with_field("cover", field("covers/:creator.name/:title")),
    );
    let mut record = record(json!({
        "id": 2,
        "title": "My: First/Post",
        "creator": { "name": "Ada" },
        "tags": ["a", "b"],
        "cover_file": upload_value("c.webp", &upload, 0),
    }));

    processor.process(&mut record).unwrap();

    assert_eq!(
        stored(&record, "cover").as_deref(),
        Some("covers/Ada/My- First-Post.webp")
    );
}

#[test]
fn test_upload_without_extension_is_rejected() {
    let root = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let upload = temp_upload(&tmp, "readme", "x");
    let processor = UploadProcessor::new(
        StowageConfig::new(root.path()).with_field("doc", field("docs/:id")),
    );
    let mut record = record(json!({ "id": 1, "doc_file": upload_value("README", &upload, 0) }));

    let err = processor.process(&mut record).unwrap_err();

    match err.kind() {
        StowageErrorKind::Path(e) => assert_eq!(e.kind(), &PathErrorKind::MissingExtension),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_underscore_joined_tokens_resolve() {
    let root = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let upload = temp_upload(&tmp, "thumb", "x");
    let processor = UploadProcessor::new(
        StowageConfig::new(root.path()).with_field("thumb", field("thumbs/:y_:m/:id_small")),
    );
    let mut record = record(json!({ "id": 9, "thumb_file": upload_value("t.PNG", &upload, 0) }));

    processor.process(&mut record).unwrap();

    let path = stored(&record, "thumb").unwrap();
    let pattern = Regex::new(r"^thumbs/\d{4}_\d{2}/9_small\.png$").unwrap();
    assert!(pattern.is_match(&path), "stored path: {}", path);
    assert!(root.path().join(&path).exists());
}

#[test]
fn test_unknown_placeholder_fails_without_touching_disk() {
    let root = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let upload = temp_upload(&tmp, "doc", "x");
    let processor = UploadProcessor::new(
        StowageConfig::new(root.path()).with_field("doc", field("docs/:owner/:id")),
    );
    let mut record = record(json!({ "id": 1, "doc_file": upload_value("a.pdf", &upload, 0) }));

    let err = processor.process(&mut record).unwrap_err();

    match err.kind() {
        StowageErrorKind::Path(e) => {
            assert_eq!(e.kind(), &PathErrorKind::UnresolvedToken(":owner".to_string()))
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!root.path().join("docs").exists());
    assert!(upload.exists());
    assert!(record.get("doc").is_none());
}

#[derive(Default)]
struct RecordingPlacement {
    calls: Mutex<Vec<(String, PlacementOptions, Option<String>)>>,
}

impl FilePlacement for RecordingPlacement {
    fn place(
        &self,
        source: &Path,
        destination: &ResolvedPath,
        options: &PlacementOptions,
        prior: Option<&str>,
    ) -> StowageResult<PlacementResult> {
        self.calls.lock().unwrap().push((
            destination.to_string(),
            options.clone(),
            prior.map(str::to_string),
        ));
        Ok(PlacementResult::new(
            destination.clone(),
            format!("{}{}", options.prefix_str(), destination),
            source,
            None,
        ))
    }
}

#[test]
fn test_field_options_are_passed_per_call() {
    let config = StowageConfig::new("/unused")
        .with_field(
            "avatar",
            FieldConfig::builder()
                .path("a/:id")
                .prefix("/m/")
                .default_file("a/default.png")
                .build()
                .unwrap(),
        )
        .with_field(
            "banner",
            FieldConfig::builder().path("b/:id").overwrite(false).build().unwrap(),
        );
    let processor = UploadProcessor::with_placement(config, RecordingPlacement::default());
    let mut record = record(json!({
        "id": 5,
        "avatar": "/m/a/old.png",
        "avatar_file": upload_value("x.png", Path::new("/tmp/a"), 0),
        "banner_file": upload_value("y.gif", Path::new("/tmp/b"), 0),
    }));

    processor.process(&mut record).unwrap();

    let calls = processor_calls(&processor);
    assert_eq!(calls.len(), 2);

    let (destination, options, prior) = &calls[0];
    assert_eq!(destination, "a/5.png");
    assert_eq!(options.prefix().as_deref(), Some("/m/"));
    assert_eq!(options.default_file().as_deref(), Some("a/default.png"));
    assert!(options.overwrite());
    assert_eq!(prior.as_deref(), Some("/m/a/old.png"));

    let (destination, options, prior) = &calls[1];
    assert_eq!(destination, "b/5.gif");
    assert!(options.prefix().is_none());
    assert!(!options.overwrite());
    assert!(prior.is_none());

    assert_eq!(stored(&record, "avatar").as_deref(), Some("/m/a/5.png"));
    assert_eq!(stored(&record, "banner").as_deref(), Some("b/5.gif"));
}

fn processor_calls(
    processor: &UploadProcessor<RecordingPlacement>,
) -> Vec<(String, PlacementOptions, Option<String>)> {
    processor.placement().calls.lock().unwrap().clone()
}
