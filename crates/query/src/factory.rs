use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use normalize::TextNormalizer;
use tracing::{info, warn, Level};

use crate::entity::{EntityType, QueryEntity};
use crate::error::{QueryError, ResolverError};
use crate::form::TextForm;
use crate::query::{Query, QueryContext};
use crate::resolver::{NullResolver, SystemEntityResolver};

/// Builds [`Query`] values from raw text.
///
/// Cheap to clone; the resolver is shared behind an `Arc` and must tolerate
/// concurrent calls.
#[derive(Clone)]
pub struct QueryFactory {
    normalizer: TextNormalizer,
    resolver: Arc<dyn SystemEntityResolver>,
}

impl QueryFactory {
    pub fn new(normalizer: TextNormalizer, resolver: Arc<dyn SystemEntityResolver>) -> Self {
        Self {
            normalizer,
            resolver,
        }
    }

    pub fn with_resolver<R>(resolver: R) -> Self
    where
        R: SystemEntityResolver + 'static,
    {
        Self::new(TextNormalizer::default(), Arc::new(resolver))
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Normalizes `text`, resolves system entities and returns the query.
    ///
    /// A resolver error fails the whole call; no partial query is returned.
    pub fn create_query(
        &self,
        text: &str,
        time_zone: Option<&str>,
        timestamp: Option<i64>,
    ) -> Result<Query, QueryError> {
        let start = Instant::now();
        let span = tracing::span!(
            Level::INFO,
            "query.create",
            text_len = text.len(),
            time_zone = ?time_zone,
            timestamp = ?timestamp
        );
        let _guard = span.enter();

        match self.create_inner(text, time_zone, timestamp) {
            Ok(query) => {
                let elapsed_micros = start.elapsed().as_micros();
                info!(
                    normalized_len = query.len_for(TextForm::Normalized),
                    candidates = query.system_entity_candidates().len(),
                    elapsed_micros,
                    "query_created"
                );
                Ok(query)
            }
            Err(err) => {
                let elapsed_micros = start.elapsed().as_micros();
                warn!(error = %err, elapsed_micros, "query_failure");
                Err(err)
            }
        }
    }

    fn create_inner(
        &self,
        text: &str,
        time_zone: Option<&str>,
        timestamp: Option<i64>,
    ) -> Result<Query, QueryError> {
        let processed = self.normalizer.process(text);
        let normalized = self.normalizer.normalize(&processed.text);
        let context = QueryContext {
            time_zone: time_zone.map(str::to_string),
            timestamp,
        };
        let query = Query::new(
            text.to_string(),
            processed.text,
            normalized.text,
            processed.map,
            normalized.map,
            context,
        );

        let found = self
            .resolver
            .resolve(query.normalized_text(), time_zone, timestamp)?;
        let mut candidates = Vec::with_capacity(found.len());
        for (normalized_span, entity) in found {
            let raw_span = query
                .transform_span(normalized_span, TextForm::Normalized, TextForm::Raw)
                .map_err(|_| ResolverError::InvalidCandidate(normalized_span))?;
            let entity_type = EntityType::from_label(&entity.entity_type)?;
            candidates.push(QueryEntity::new(entity_type, raw_span, normalized_span, entity));
        }

        Ok(query.with_candidates(candidates))
    }
}

impl Default for QueryFactory {
    fn default() -> Self {
        Self::with_resolver(NullResolver)
    }
}

impl fmt::Debug for QueryFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryFactory")
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::span::Span;
    use serde_json::json;

    fn span(start: usize, end: usize) -> Span {
        Span::new(start, end).expect("valid span")
    }

    fn factory() -> QueryFactory {
        QueryFactory::default()
    }

    #[test]
    fn builds_all_forms() {
        let query = factory().create_query("Test: 1. 2. 3.", None, None).expect("query");
        assert_eq!(query.text(), "Test: 1. 2. 3.");
        assert_eq!(query.processed_text(), "Test: 1. 2. 3.");
        assert_eq!(query.normalized_text(), "test 1 2 3");
    }

    #[test]
    fn wrapping_punctuation_leaves_processed_text_alone() {
        for text in [" Test: 1. 2. 3.", "\"Test\": 1. 2. 3.", "(Test\": 1. 2. 3.)"] {
            let query = factory().create_query(text, None, None).expect("query");
            assert_eq!(query.text(), text);
            assert_eq!(query.processed_text(), text);
            assert_eq!(query.normalized_text(), "test 1 2 3");
        }

        let query = factory().create_query("((()))", None, None).expect("query");
        assert_eq!(query.processed_text(), "((()))");
        assert_eq!(query.normalized_text(), "");
    }

    #[test]
    fn transform_index_forward() {
        let query = factory().create_query("Test: One. 2. 3.", None, None).expect("query");
        assert_eq!(query.transform_index(6, TextForm::Raw, TextForm::Processed), Ok(6));
        assert_eq!(query.transform_index(6, TextForm::Raw, TextForm::Normalized), Ok(5));
        assert_eq!(query.transform_index(6, TextForm::Processed, TextForm::Normalized), Ok(5));
    }

    #[test]
    fn transform_index_backward() {
        let query = factory().create_query("Test: One. 2. 3.", None, None).expect("query");
        assert_eq!(query.transform_index(5, TextForm::Normalized, TextForm::Raw), Ok(6));
        assert_eq!(query.transform_index(5, TextForm::Normalized, TextForm::Processed), Ok(6));
        // 'e' of "one" and the space after "one"
        assert_eq!(query.transform_index(7, TextForm::Normalized, TextForm::Raw), Ok(8));
        assert_eq!(query.transform_index(8, TextForm::Normalized, TextForm::Raw), Ok(10));
    }

    #[test]
    fn transform_span_both_directions() {
        let query = factory().create_query("Test: One. 2. 3.", None, None).expect("query");
        let forward = query
            .transform_span(span(0, 9), TextForm::Raw, TextForm::Normalized)
            .expect("forward");
        assert_eq!(forward, span(0, 7));
        assert_eq!(query.span_text(forward, TextForm::Normalized), Ok("test one"));

        let backward = query
            .transform_span(span(0, 7), TextForm::Normalized, TextForm::Raw)
            .expect("backward");
        assert_eq!(backward, span(0, 8));
        assert_eq!(query.span_text(backward, TextForm::Raw), Ok("Test: One"));
    }

    #[test]
    fn same_form_is_identity_but_bounds_checked() {
        let query = factory().create_query("Hello. There.", None, None).expect("query");
        assert_eq!(query.transform_index(3, TextForm::Raw, TextForm::Raw), Ok(3));
        assert_eq!(
            query.transform_index(13, TextForm::Raw, TextForm::Raw),
            Err(QueryError::OutOfRangeIndex {
                index: 13,
                form: TextForm::Raw,
                len: 13
            })
        );
    }

    #[test]
    fn equality_uses_text_and_context() {
        let f = factory();
        let a = f.create_query("Hello. There.", None, None).expect("query");
        let b = f.create_query("Hello. There.", None, None).expect("query");
        assert_eq!(a, b);

        let la = f
            .create_query("Hello. There.", Some("America/Los_Angeles"), None)
            .expect("query");
        let bahia = f
            .create_query("Hello. There.", Some("America/Bahia"), None)
            .expect("query");
        assert_ne!(la, bahia);
    }

    #[test]
    fn entity_from_normalized_span_reports_raw_span() {
        let query = factory()
            .create_query("!!Connect me with Paul's meeting room please.", None, None)
            .expect("query");
        let entity =
            QueryEntity::from_query(&query, span(16, 19), "test_type", None).expect("entity");
        assert_eq!(entity.span(), span(18, 21));
        assert_eq!(entity.entity().text, "Paul");
        assert_eq!(entity.entity().entity_type, "test_type");
    }

    type Found = Result<Vec<(Span, Entity)>, ResolverError>;

    fn noon_resolver(text: &str, _: Option<&str>, _: Option<i64>) -> Found {
        let Some(byte) = text.find("noon") else {
            return Ok(Vec::new());
        };
        let start = text[..byte].chars().count();
        let entity = Entity::new("noon", "sys_time").with_value(json!({"value": "12"}));
        Ok(vec![(span(start, start + 3), entity)])
    }

    fn failing_resolver(_: &str, _: Option<&str>, _: Option<i64>) -> Found {
        Err(ResolverError::UnknownTimeZone("Mars/Olympus".into()))
    }

    fn overlong_resolver(_: &str, _: Option<&str>, _: Option<i64>) -> Found {
        Ok(vec![(span(0, 40), Entity::new("x", "sys_number"))])
    }

    #[test]
    fn resolver_candidates_become_query_entities() {
        let query = QueryFactory::with_resolver(noon_resolver)
            .create_query("  At NOON!", None, None)
            .expect("query");
        let candidates = query.system_entity_candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].normalized_span(), span(3, 6));
        assert_eq!(candidates[0].span(), span(5, 8));
        assert_eq!(candidates[0].entity_type().base_type(), "sys_time");
    }

    #[test]
    fn resolver_failure_fails_construction() {
        let err = QueryFactory::with_resolver(failing_resolver)
            .create_query("today", Some("Mars/Olympus"), None)
            .expect_err("must fail");
        assert_eq!(
            err,
            QueryError::ResolverFailure(ResolverError::UnknownTimeZone("Mars/Olympus".into()))
        );
    }

    #[test]
    fn out_of_range_candidate_is_rejected() {
        let err = QueryFactory::with_resolver(overlong_resolver)
            .create_query("one", None, None)
            .expect_err("must fail");
        assert!(matches!(
            err,
            QueryError::ResolverFailure(ResolverError::InvalidCandidate(_))
        ));
    }
}
