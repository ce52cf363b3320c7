use thiserror::Error;

/// Errors produced by the live-query store.
///
/// Document-level errors (no operation, ambiguous operation, unknown
/// operation) and the `@live`/`@defer`/`@stream` conflict are the only
/// error kinds the store itself raises; resolver/execution errors are the
/// underlying engine's concern and are carried verbatim in a result's
/// `errors` field instead of through this type.
#[derive(Debug, Error)]
pub enum Error {
    /// The document contains no operations.
    #[error("the document contains no operations")]
    NoOperation,

    /// The document contains more than one operation and no
    /// `operationName` (or a non-matching one) was supplied.
    #[error("the document contains multiple operations and no matching operationName was provided")]
    AmbiguousOperation,

    /// `operationName` did not match any operation in the document.
    #[error("unknown operation \"{0}\"")]
    UnknownOperation(String),

    /// `executeOnce` returned an asynchronous sequence instead of a single
    /// result, meaning the document illegally mixed `@live` with
    /// `@defer`/`@stream`. See `NoLiveMixedWithDeferStreamRule`.
    #[error(
        "a live operation produced an asynchronous sequence of results; \
         @live cannot be mixed with @defer/@stream (NoLiveMixedWithDeferStreamRule \
         appears to have been skipped during validation)"
    )]
    LiveMixedWithDeferStream,

    /// The document failed to parse.
    #[error("failed to parse document: {0}")]
    Parse(String),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
