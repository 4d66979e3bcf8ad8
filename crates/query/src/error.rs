use normalize::NormalizeError;
use thiserror::Error;

use crate::form::TextForm;
use crate::span::Span;

/// Errors raised while building queries or translating spans between forms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryError {
    #[error("index {index} out of range for {form} text of length {len}")]
    OutOfRangeIndex {
        index: usize,
        form: TextForm,
        len: usize,
    },
    #[error("invalid span: end {end} precedes start {start}")]
    InvalidSpan { start: usize, end: usize },
    #[error("system entity resolution failed: {0}")]
    ResolverFailure(#[from] ResolverError),
    #[error("malformed entity type: {0}")]
    MalformedEntityType(String),
    #[error("normalizer rejected its configuration: {0}")]
    Normalize(#[from] NormalizeError),
}

/// Errors a [`SystemEntityResolver`](crate::SystemEntityResolver) may report.
///
/// A resolver that finds nothing returns an empty list; these are reserved for
/// requests it cannot serve at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolverError {
    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),
    #[error("timestamp {0} cannot be represented")]
    InvalidTimestamp(i64),
    #[error("candidate span {0} lies outside the normalized text")]
    InvalidCandidate(Span),
    #[error("resolver backend failure: {0}")]
    Backend(String),
}
