//! Path template rendering.
//!
//! A template such as `uploads/:id/:md5` becomes
//! `uploads/2/5e3e0d0f163196cb9526d97be1b2ce26.jpg` once identifiers are
//! substituted and the upload's extension is appended.

use crate::IdentifierMap;
use stowage_error::{PathError, PathErrorKind, StowageResult};
use tracing::{debug, instrument};

/// A destination path relative to the storage root.
///
/// Always `/`-separated, without leading or trailing separators, without `.`
/// or `..` segments, and ending in `.` plus a lowercase extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("{}", _0)]
pub struct ResolvedPath(String);

impl ResolvedPath {
    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Everything before the final segment, if the path has a directory part.
    pub fn parent(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(parent, _)| parent)
    }

    /// Iterates the `/`-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Consumes the path, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ResolvedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns the extension of an uploaded file name.
///
/// Only the last path component is considered, and only the text after its
/// final `.`.
///
/// # Example
///
/// ```
/// use stowage_core::extension_of;
///
/// assert_eq!(extension_of("photo.JPG"), Some("JPG"));
/// assert_eq!(extension_of("archive.tar.gz"), Some("gz"));
/// assert_eq!(extension_of("README"), None);
/// ```
pub fn extension_of(name: &str) -> Option<&str> {
    let file = name.rsplit(['/', '\\']).next()?;
    match file.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Renders `template` with `identifiers` and appends the lowercased extension.
///
/// Substitution is a single pass that prefers the longest token at each
/// position. A token only matches when it is not immediately followed by a
/// letter or digit, so `:id` is left alone inside `:identifier` but resolves
/// in `:id_thumb`. Substituted values are never rescanned. Surrounding
/// whitespace on the extension is ignored.
///
/// # Errors
///
/// - [`PathErrorKind::MissingTemplate`] for an empty template
/// - [`PathErrorKind::MissingExtension`] / [`PathErrorKind::InvalidExtension`]
/// - [`PathErrorKind::UnresolvedToken`] if a `:` placeholder has no identifier
/// - [`PathErrorKind::Traversal`] if the rendered path has `.`, `..` or empty
///   segments
///
/// # Example
///
/// ```
/// use stowage_core::{IdentifierMap, resolve_path};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let identifiers: IdentifierMap = [(":id", "7"), (":md5", "abc")].into_iter().collect();
/// let path = resolve_path(&identifiers, "/uploads/:id/:md5/", "PNG")?;
/// assert_eq!(path.as_str(), "uploads/7/abc.png");
/// # Ok(())
/// # }
/// ```
#[instrument(skip(identifiers), fields(identifiers = identifiers.len()))]
pub fn resolve_path(
    identifiers: &IdentifierMap,
    template: &str,
    extension: &str,
) -> StowageResult<ResolvedPath> {
    let normalized = template.replace('\\', "/");
    let trimmed = normalized.trim_matches('/');
    if trimmed.is_empty() {
        return Err(PathError::new(PathErrorKind::MissingTemplate).into());
    }

    let extension = extension.trim();
    if extension.is_empty() {
        return Err(PathError::new(PathErrorKind::MissingExtension).into());
    }
    if !extension
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(PathError::new(PathErrorKind::InvalidExtension(extension.to_string())).into());
    }

    let rendered = substitute(trimmed, identifiers);
    if let Some(token) = unresolved_token(&rendered) {
        return Err(PathError::new(PathErrorKind::UnresolvedToken(token.to_string())).into());
    }
    if rendered
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(PathError::new(PathErrorKind::Traversal(rendered)).into());
    }

    let path = format!("{}.{}", rendered, extension.to_ascii_lowercase());
    debug!(path = %path, "Resolved upload path");
    Ok(ResolvedPath(path))
}

fn continues_token(c: char) -> bool {
    c.is_alphanumeric()
}

/// First `:` placeholder left in a rendered path, up to the next separator.
fn unresolved_token(rendered: &str) -> Option<&str> {
    let start = rendered.find(':')?;
    let end = rendered[start..]
        .find('/')
        .map_or(rendered.len(), |offset| start + offset);
    Some(&rendered[start..end])
}

fn substitute(template: &str, identifiers: &IdentifierMap) -> String {
    let mut tokens: Vec<(&str, &str)> = identifiers
        .iter()
        .filter(|(token, _)| !token.is_empty())
        .collect();
    tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while let Some(c) = rest.chars().next() {
        for &(token, value) in &tokens {
            if let Some(after) = rest.strip_prefix(token) {
                if !after.chars().next().is_some_and(continues_token) {
                    out.push_str(value);
                    rest = after;
                    continue 'scan;
                }
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}
