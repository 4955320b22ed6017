//! Identifier flattening errors.

/// Kinds of identifier build failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum IdentifierErrorKind {
    /// A record key was empty, which would produce a bare `:` token
    #[display("Empty key under '{}'", _0)]
    EmptyKey(String),
    /// Record nesting exceeded the flattening depth limit
    #[display("Record nesting deeper than {} levels at '{}'", limit, path)]
    DepthExceeded {
        /// Dotted path where the limit was hit
        path: String,
        /// The depth limit
        limit: usize,
    },
}

/// Identifier error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Identifier Error: {} at line {} in {}", kind, line, file)]
pub struct IdentifierError {
    kind: IdentifierErrorKind,
    line: u32,
    file: &'static str,
}

impl IdentifierError {
    /// Create a new identifier error with caller location tracking.
    #[track_caller]
    pub fn new(kind: IdentifierErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &IdentifierErrorKind {
        &self.kind
    }
}
