//! Contains the `Error` and `Result` types used throughout this crate.

use thiserror::Error;

/// The result type used by every fallible operation this crate exposes.
pub type Result<T> = std::result::Result<T, Error>;

/// An error produced by the document store, the index manager, or the query
/// planner/executor. Never exposes the internal module that raised it;
/// callers should match on [`Error::code`] or [`ErrorKind`].
#[derive(Clone, Debug, Error)]
#[error("{kind}")]
#[non_exhaustive]
pub struct Error {
    pub kind: Box<ErrorKind>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }

    /// The numeric code compatible with the external protocol's error-code
    /// dictionary.
    pub fn code(&self) -> i32 {
        self.kind.code()
    }

    /// A human-readable message describing the failure.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub(crate) fn bad_value(message: impl Into<String>) -> Self {
        ErrorKind::BadValue {
            message: message.into(),
        }
        .into()
    }

    pub(crate) fn namespace_invalid(name: impl Into<String>) -> Self {
        ErrorKind::NamespaceInvalid { name: name.into() }.into()
    }

    pub(crate) fn namespace_not_found(name: impl Into<String>) -> Self {
        ErrorKind::NamespaceNotFound { name: name.into() }.into()
    }

    pub(crate) fn duplicate_key(
        collection: impl Into<String>,
        index: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        ErrorKind::DuplicateKey {
            collection: collection.into(),
            index: index.into(),
            field: field.into(),
            value: value.into(),
        }
        .into()
    }

    pub(crate) fn document_too_large(size: usize, limit: usize) -> Self {
        ErrorKind::DocumentTooLarge { size, limit }.into()
    }

    pub(crate) fn invalid_length(message: impl Into<String>) -> Self {
        ErrorKind::InvalidLength {
            message: message.into(),
        }
        .into()
    }

    pub(crate) fn index_not_found(collection: impl Into<String>, name: impl Into<String>) -> Self {
        ErrorKind::IndexNotFound {
            collection: collection.into(),
            name: name.into(),
        }
        .into()
    }

    pub(crate) fn cancelled() -> Self {
        ErrorKind::Cancelled.into()
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        ErrorKind::Internal {
            message: message.into(),
        }
        .into()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

/// The specific kind of failure. Numeric codes follow the external
/// protocol's error-code dictionary so front ends can translate them
/// without re-deriving meaning.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed filter/update/projection, forbidden keys, oversized index
    /// string, oversized `$in`/`$nin` array, mixed include/exclude
    /// projection, empty `$or` array.
    #[error("{message}")]
    BadValue { message: String },

    /// A write violated a unique index constraint.
    #[error(
        "duplicate key error collection: {collection} index: {index} field: {field} \
         value: {value}"
    )]
    DuplicateKey {
        collection: String,
        index: String,
        field: String,
        value: String,
    },

    /// Attempted to drop the implicit `_id_` index, or some other
    /// length/arity invariant was violated.
    #[error("{message}")]
    InvalidLength { message: String },

    /// The collection name failed the collection-naming validity predicate.
    #[error("invalid namespace: {name:?}")]
    NamespaceInvalid { name: String },

    /// The referenced collection does not exist.
    #[error("namespace not found: {name:?}")]
    NamespaceNotFound { name: String },

    /// The referenced index does not exist on the collection.
    #[error("index not found: {name:?} on collection {collection:?}")]
    IndexNotFound { collection: String, name: String },

    /// A document exceeded the configured size limit.
    #[error("document too large: {size} bytes exceeds the configured limit of {limit} bytes")]
    DocumentTooLarge { size: usize, limit: usize },

    /// The caller-provided cancellation signal fired before the operation
    /// completed.
    #[error("operation was cancelled")]
    Cancelled,

    /// An unexpected failure from the KV substrate, or any other internal
    /// invariant violation. Never retried by this crate.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ErrorKind {
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::BadValue { .. } => 2,
            ErrorKind::DuplicateKey { .. } => 11000,
            ErrorKind::InvalidLength { .. } => 21,
            ErrorKind::NamespaceInvalid { .. } => 73,
            ErrorKind::NamespaceNotFound { .. } => 26,
            ErrorKind::IndexNotFound { .. } => 27,
            ErrorKind::DocumentTooLarge { .. } => 10334,
            ErrorKind::Cancelled => 1,
            ErrorKind::Internal { .. } => 1,
        }
    }
}

