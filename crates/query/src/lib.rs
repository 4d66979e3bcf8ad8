//! Multi-form query text and the extracted-entity model.
//!
//! A [`Query`] holds the user's raw text together with its processed and
//! normalized forms, the character offset maps between them and the system
//! entities detected on the normalized text. Downstream stages (classifiers,
//! parsers) work on normalized tokens and use
//! [`Query::transform_span`] to report what they found against the text the
//! user actually typed.
//!
//! ```rust
//! use query::{QueryEntity, QueryFactory, Span, TextForm};
//!
//! let factory = QueryFactory::default();
//! let query = factory
//!     .create_query("!!Connect me with Paul's meeting room please.", None, None)
//!     .unwrap();
//! assert_eq!(query.normalized_text(), "connect me with paul's meeting room please");
//!
//! let entity = QueryEntity::from_query(&query, Span::new(16, 19).unwrap(), "person", None).unwrap();
//! assert_eq!(entity.span(), Span::new(18, 21).unwrap());
//! assert_eq!(entity.entity().text, "Paul");
//! ```
//!
//! ## Equality
//!
//! - [`Query`]: raw text plus context (time zone, timestamp)
//! - [`Entity`]: every field
//! - [`QueryEntity`] / [`NestedEntity`]: entity type, normalized span and
//!   payload, across variants in both directions
//!
//! ## Threading
//!
//! Queries are immutable once built and can be shared freely. The factory
//! holds its resolver behind an `Arc`, so one factory can serve many threads.

mod entity;
mod error;
mod factory;
mod form;
mod query;
mod resolver;
mod span;

pub use crate::entity::{
    ComparisonKey, Entity, EntityType, LocatedEntity, NestedEntity, QueryEntity, ROLE_SEPARATOR,
};
pub use crate::error::{QueryError, ResolverError};
pub use crate::factory::QueryFactory;
pub use crate::form::TextForm;
pub use crate::query::{Query, QueryContext};
pub use crate::resolver::{NullResolver, SystemEntityResolver};
pub use crate::span::Span;
