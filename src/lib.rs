//! Workspace umbrella crate for the NLU query core.
//!
//! Ties together text normalization, the query and entity model, the bundled
//! system-entity resolver and application configuration, so callers can go
//! from an app directory to a ready [`QueryFactory`] with one call.
//!
//! ```rust,no_run
//! use nlu::{build_query_factory, AppConfig, LocatedEntity, TextForm};
//!
//! let config = AppConfig::for_app_path("apps/food_ordering")?;
//! let factory = build_query_factory(&config)?;
//! let query = factory.create_query("Today at noon", Some("America/Bahia"), None)?;
//! for candidate in query.system_entity_candidates() {
//!     let raw = candidate.span_for(&query, TextForm::Raw)?;
//!     println!("{} -> {:?}", query.span_text(raw, TextForm::Raw)?, candidate.entity().value);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod model_config;

use std::sync::Arc;

pub use normalize::{tokenize, NormalizeConfig, NormalizeError, Normalized, OffsetMap, TextNormalizer, Token};
pub use query::{
    ComparisonKey, Entity, EntityType, LocatedEntity, NestedEntity, NullResolver, Query,
    QueryContext, QueryEntity, QueryError, QueryFactory, ResolverError, Span, SystemEntityResolver,
    TextForm,
};
pub use sysent::{RuleResolver, RuleResolverConfig, SYS_NUMBER, SYS_TIME};

pub use crate::config::{app_namespace, AppConfig, ConfigLoadError};
pub use crate::model_config::{
    classifier_config, expand_parser_config, nlp_config, parser_config, ClassifierContext,
    ClassifierKind, ConfigSources, DependentConfig, ParserConfig, Precedence, ProviderError,
};

/// Builds a query factory wired with the app's normalizer and resolver settings.
pub fn build_query_factory(config: &AppConfig) -> Result<QueryFactory, ConfigLoadError> {
    let normalizer = TextNormalizer::new(config.normalize.clone())
        .map_err(|err| ConfigLoadError::Validation(format!("normalize: {err}")))?;
    let resolver = RuleResolver::new(config.system_entities.clone())
        .map_err(|err| ConfigLoadError::Validation(format!("system_entities: {err}")))?;
    Ok(QueryFactory::new(normalizer, Arc::new(resolver)))
}
