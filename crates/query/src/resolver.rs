use crate::entity::Entity;
use crate::error::ResolverError;
use crate::span::Span;

/// Detects system entities (dates, times, numbers) in normalized query text.
///
/// Implementations must be deterministic for fixed inputs and report spans
/// against exactly the `text` they were given. A resolver shared between
/// threads is called concurrently, hence the `Send + Sync` bound.
pub trait SystemEntityResolver: Send + Sync {
    /// Returns every candidate found in `text`.
    ///
    /// `time_zone` is an IANA zone name and `timestamp` a Unix time in
    /// seconds; when absent the resolver applies its own default zone and the
    /// current time. Finding nothing is `Ok(vec![])`, not an error.
    fn resolve(
        &self,
        text: &str,
        time_zone: Option<&str>,
        timestamp: Option<i64>,
    ) -> Result<Vec<(Span, Entity)>, ResolverError>;
}

/// A resolver that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl SystemEntityResolver for NullResolver {
    fn resolve(
        &self,
        _text: &str,
        _time_zone: Option<&str>,
        _timestamp: Option<i64>,
    ) -> Result<Vec<(Span, Entity)>, ResolverError> {
        Ok(Vec::new())
    }
}

impl<F> SystemEntityResolver for F
where
    F: Fn(&str, Option<&str>, Option<i64>) -> Result<Vec<(Span, Entity)>, ResolverError>
        + Send
        + Sync,
{
    fn resolve(
        &self,
        text: &str,
        time_zone: Option<&str>,
        timestamp: Option<i64>,
    ) -> Result<Vec<(Span, Entity)>, ResolverError> {
        self(text, time_zone, timestamp)
    }
}
