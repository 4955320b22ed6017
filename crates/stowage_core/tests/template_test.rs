use stowage_core::{IdentifierMap, extension_of, resolve_path};
use stowage_error::{PathErrorKind, StowageErrorKind};

fn identifiers() -> IdentifierMap {
    [
        (":id", "7"),
        (":md5", "5e3e0d0f163196cb9526d97be1b2ce26"),
        (":y", "2024"),
        (":m", "03"),
        (":d", "05"),
        (":creator.name", "Ada"),
    ]
    .into_iter()
    .collect()
}

fn path_error_kind(template: &str, extension: &str) -> PathErrorKind {
    let err = resolve_path(&identifiers(), template, extension).unwrap_err();
    match err.kind() {
        StowageErrorKind::Path(e) => e.kind().clone(),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_renders_template_with_lowercase_extension() {
    let path = resolve_path(&identifiers(), "uploads/:id/:md5", "JPG").unwrap();
    assert_eq!(path.as_str(), "uploads/7/5e3e0d0f163196cb9526d97be1b2ce26.jpg");
    assert_eq!(path.file_name(), "5e3e0d0f163196cb9526d97be1b2ce26.jpg");
    assert_eq!(path.parent(), Some("uploads/7"));
}

#[test]
fn test_trims_surrounding_separators() {
    for template in ["/uploads/:y/:m/:d/", "uploads/:y/:m/:d", "\\uploads\\:y\\:m\\:d\\"] {
        let path = resolve_path(&identifiers(), template, "Png").unwrap();
        assert_eq!(path.as_str(), "uploads/2024/03/05.png");
        assert!(!path.as_str().starts_with('/'));
        assert!(path.as_str().ends_with(".png"));
    }
}

#[test]
fn test_dotted_tokens_resolve() {
    let path = resolve_path(&identifiers(), "by/:creator.name/:id", "pdf").unwrap();
    assert_eq!(path.as_str(), "by/Ada/7.pdf");
}

#[test]
fn test_token_does_not_match_inside_longer_word() {
    assert_eq!(
        path_error_kind("files/:identifier/:id", "txt"),
        PathErrorKind::UnresolvedToken(":identifier".to_string())
    );
}

#[test]
fn test_underscore_separated_tokens_resolve() {
    let path = resolve_path(&identifiers(), "uploads/:y_:m_:d/:id_thumb", "jpg").unwrap();
    assert_eq!(path.as_str(), "uploads/2024_03_05/7_thumb.jpg");
}

#[test]
fn test_unknown_token_is_rejected() {
    assert_eq!(
        path_error_kind("uploads/:owner/:id", "jpg"),
        PathErrorKind::UnresolvedToken(":owner".to_string())
    );
}

#[test]
fn test_extension_whitespace_is_ignored() {
    let path = resolve_path(&identifiers(), "uploads/:id", "JPG ").unwrap();
    assert_eq!(path.as_str(), "uploads/7.jpg");
    assert_eq!(path_error_kind("uploads/:id", "  "), PathErrorKind::MissingExtension);
}

#[test]
fn test_missing_inputs_are_rejected() {
    assert_eq!(path_error_kind("", "jpg"), PathErrorKind::MissingTemplate);
    assert_eq!(path_error_kind("///", "jpg"), PathErrorKind::MissingTemplate);
    assert_eq!(path_error_kind("uploads/:id", ""), PathErrorKind::MissingExtension);
}

#[test]
fn test_unsafe_extension_is_rejected() {
    assert!(matches!(
        path_error_kind("uploads/:id", "jp/g"),
        PathErrorKind::InvalidExtension(_)
    ));
}

#[test]
fn test_traversal_segments_are_rejected() {
    assert!(matches!(
        path_error_kind("uploads/../:id", "jpg"),
        PathErrorKind::Traversal(_)
    ));
    assert!(matches!(
        path_error_kind("uploads//:id", "jpg"),
        PathErrorKind::Traversal(_)
    ));
}

#[test]
fn test_extension_comes_from_last_component() {
    assert_eq!(extension_of("photo.JPG"), Some("JPG"));
    assert_eq!(extension_of("archive.tar.gz"), Some("gz"));
    assert_eq!(extension_of("dir.d/README"), None);
    assert_eq!(extension_of("trailing."), None);
    assert_eq!(extension_of(""), None);
}
