use normalize::{NormalizeError, OffsetMap};
use serde::{Deserialize, Serialize};

use crate::entity::QueryEntity;
use crate::error::QueryError;
use crate::form::TextForm;
use crate::span::Span;

/// Request-time context a query was created with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryContext {
    /// IANA time zone name, e.g. `America/Bahia`.
    pub time_zone: Option<String>,
    /// Unix time in seconds.
    pub timestamp: Option<i64>,
}

/// User input in all of its text forms.
///
/// Built by a [`QueryFactory`](crate::QueryFactory) and immutable afterwards.
/// Equality looks at the raw text and the context only; every other field is
/// derived from those.
#[derive(Debug, Clone)]
pub struct Query {
    text: String,
    processed_text: String,
    normalized_text: String,
    text_len: usize,
    processed_len: usize,
    normalized_len: usize,
    raw_to_processed: OffsetMap,
    processed_to_normalized: OffsetMap,
    raw_to_normalized: OffsetMap,
    context: QueryContext,
    system_entity_candidates: Vec<QueryEntity>,
}

impl Query {
    pub(crate) fn new(
        text: String,
        processed_text: String,
        normalized_text: String,
        raw_to_processed: OffsetMap,
        processed_to_normalized: OffsetMap,
        context: QueryContext,
    ) -> Self {
        let raw_to_normalized = raw_to_processed.compose(&processed_to_normalized);
        Self {
            text_len: raw_to_processed.source_len(),
            processed_len: raw_to_processed.target_len(),
            normalized_len: processed_to_normalized.target_len(),
            text,
            processed_text,
            normalized_text,
            raw_to_processed,
            processed_to_normalized,
            raw_to_normalized,
            context,
            system_entity_candidates: Vec::new(),
        }
    }

    pub(crate) fn with_candidates(mut self, candidates: Vec<QueryEntity>) -> Self {
        self.system_entity_candidates = candidates;
        self
    }

    /// The raw text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn processed_text(&self) -> &str {
        &self.processed_text
    }

    pub fn normalized_text(&self) -> &str {
        &self.normalized_text
    }

    pub fn text_for(&self, form: TextForm) -> &str {
        match form {
            TextForm::Raw => &self.text,
            TextForm::Processed => &self.processed_text,
            TextForm::Normalized => &self.normalized_text,
        }
    }

    /// Length of the text in `form`, in characters.
    pub fn len_for(&self, form: TextForm) -> usize {
        match form {
            TextForm::Raw => self.text_len,
            TextForm::Processed => self.processed_len,
            TextForm::Normalized => self.normalized_len,
        }
    }

    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    pub fn time_zone(&self) -> Option<&str> {
        self.context.time_zone.as_deref()
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.context.timestamp
    }

    /// System entities found on the normalized text.
    pub fn system_entity_candidates(&self) -> &[QueryEntity] {
        &self.system_entity_candidates
    }

    /// Translates a character index of the `from` text into the `to` text.
    ///
    /// Characters removed by normalization map to the nearest preceding
    /// surviving character; mapping back always lands on a surviving
    /// character. Indices outside the `from` text are an error, even when
    /// `from == to`, and so is any transform into an empty form.
    ///
    /// ```rust
    /// use query::{QueryFactory, TextForm};
    ///
    /// let query = QueryFactory::default().create_query("Test: One. 2. 3.", None, None).unwrap();
    /// assert_eq!(query.transform_index(6, TextForm::Raw, TextForm::Normalized).unwrap(), 5);
    /// assert_eq!(query.transform_index(5, TextForm::Normalized, TextForm::Raw).unwrap(), 6);
    /// ```
    pub fn transform_index(
        &self,
        index: usize,
        from: TextForm,
        to: TextForm,
    ) -> Result<usize, QueryError> {
        let len = self.len_for(from);
        if index >= len {
            return Err(QueryError::OutOfRangeIndex {
                index,
                form: from,
                len,
            });
        }
        // An empty target form has no index to land on.
        if self.len_for(to) == 0 {
            return Err(QueryError::OutOfRangeIndex {
                index: 0,
                form: to,
                len: 0,
            });
        }

        use TextForm::*;
        let mapped = match (from, to) {
            (a, b) if a == b => Ok(index),
            (Raw, Processed) => self.raw_to_processed.forward(index),
            (Raw, Normalized) => self.raw_to_normalized.forward(index),
            (Processed, Normalized) => self.processed_to_normalized.forward(index),
            (Processed, Raw) => self.raw_to_processed.backward(index),
            (Normalized, Raw) => self.raw_to_normalized.backward(index),
            (Normalized, Processed) => self.processed_to_normalized.backward(index),
            _ => Ok(index),
        };
        mapped.map_err(|err| match err {
            NormalizeError::OutOfRange { index, len } => QueryError::OutOfRangeIndex {
                index,
                form: from,
                len,
            },
            other => QueryError::Normalize(other),
        })
    }

    /// Translates both ends of `span` independently.
    pub fn transform_span(
        &self,
        span: Span,
        from: TextForm,
        to: TextForm,
    ) -> Result<Span, QueryError> {
        let start = self.transform_index(span.start(), from, to)?;
        let end = self.transform_index(span.end(), from, to)?;
        Span::new(start, end)
    }

    /// The characters `span` covers in the `form` text.
    pub fn span_text(&self, span: Span, form: TextForm) -> Result<&str, QueryError> {
        let text = self.text_for(form);
        span.slice(text).ok_or(QueryError::OutOfRangeIndex {
            index: span.end(),
            form,
            len: self.len_for(form),
        })
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.context == other.context
    }
}

impl Eq for Query {}
