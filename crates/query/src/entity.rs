//! Extracted-entity value objects.
//!
//! [`Entity`] is the semantic payload. [`QueryEntity`] binds a payload to its
//! location in a [`Query`]; [`NestedEntity`] does the same for an entity found
//! inside another entity and additionally remembers the parent's span.
//!
//! Both located variants compare through one [`ComparisonKey`]: entity type,
//! normalized span and payload. Raw spans and parent spans are context, not
//! identity, so a `NestedEntity` equals a `QueryEntity` describing the same
//! thing, whichever side of `==` it is on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;
use crate::form::TextForm;
use crate::query::Query;
use crate::span::Span;

/// Separator between type and role in labels such as `product|beverage`.
pub const ROLE_SEPARATOR: char = '|';

/// The semantic payload of an extracted span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

impl Entity {
    pub fn new(text: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entity_type: entity_type.into(),
            role: None,
            value: None,
            display_text: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_display_text(mut self, display_text: impl Into<String>) -> Self {
        self.display_text = Some(display_text.into());
        self
    }

    /// True for entities produced by a system-entity resolver (`sys_*`).
    pub fn is_system_entity(&self) -> bool {
        self.entity_type.starts_with("sys_")
    }
}

/// The `(full_type, base_type, marker)` triple identifying an entity's kind.
///
/// `full_type` is the label as written, `base_type` the part before any
/// [`ROLE_SEPARATOR`] and `marker` the part after it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityType {
    full_type: String,
    base_type: String,
    marker: Option<String>,
}

impl EntityType {
    pub fn from_parts(
        full_type: impl Into<String>,
        base_type: impl Into<String>,
        marker: Option<String>,
    ) -> Result<Self, QueryError> {
        let full_type = full_type.into();
        if full_type.trim().is_empty() {
            return Err(QueryError::MalformedEntityType(full_type));
        }
        let base_type = base_type.into();
        Ok(Self {
            base_type: if base_type.is_empty() {
                full_type.clone()
            } else {
                base_type
            },
            full_type,
            marker,
        })
    }

    /// Parses `type` or `type|role`.
    ///
    /// ```rust
    /// use query::EntityType;
    ///
    /// let ty = EntityType::from_label("product|beverage").unwrap();
    /// assert_eq!(ty.base_type(), "product");
    /// assert_eq!(ty.marker(), Some("beverage"));
    /// ```
    pub fn from_label(label: &str) -> Result<Self, QueryError> {
        let (base, marker) = match label.split_once(ROLE_SEPARATOR) {
            Some((base, marker)) => (base, Some(marker.to_string())),
            None => (label, None),
        };
        if base.trim().is_empty() {
            return Err(QueryError::MalformedEntityType(label.to_string()));
        }
        Self::from_parts(label, base, marker)
    }

    pub fn full_type(&self) -> &str {
        &self.full_type
    }

    pub fn base_type(&self) -> &str {
        &self.base_type
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }
}

impl TryFrom<(&str, &str, &str)> for EntityType {
    type Error = QueryError;

    fn try_from((full, base, marker): (&str, &str, &str)) -> Result<Self, Self::Error> {
        let marker = (!marker.is_empty()).then(|| marker.to_string());
        Self::from_parts(full, base, marker)
    }
}

/// The fields that decide equality between located entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonKey<'a> {
    pub entity_type: &'a EntityType,
    pub normalized_span: Span,
    pub entity: &'a Entity,
}

/// Anything that occupies a span of a query and carries an [`Entity`].
pub trait LocatedEntity {
    fn entity_type(&self) -> &EntityType;
    /// Span in RAW coordinates, as recorded on construction.
    fn span(&self) -> Span;
    fn normalized_span(&self) -> Span;
    fn entity(&self) -> &Entity;

    fn comparison_key(&self) -> ComparisonKey<'_> {
        ComparisonKey {
            entity_type: self.entity_type(),
            normalized_span: self.normalized_span(),
            entity: self.entity(),
        }
    }

    /// The span of this entity in `form`, derived from its normalized span.
    fn span_for(&self, query: &Query, form: TextForm) -> Result<Span, QueryError> {
        query.transform_span(self.normalized_span(), TextForm::Normalized, form)
    }
}

/// Builds the payload for a normalized span of `query`.
///
/// Returns the raw span alongside the entity; the entity text is the raw
/// substring so responses echo what the user typed.
fn locate(
    query: &Query,
    normalized_span: Span,
    entity_type: &EntityType,
    role: Option<&str>,
) -> Result<(Span, Entity), QueryError> {
    let span = query.transform_span(normalized_span, TextForm::Normalized, TextForm::Raw)?;
    let text = query.span_text(span, TextForm::Raw)?;
    let mut entity = Entity::new(text, entity_type.base_type());
    entity.role = role.or(entity_type.marker()).map(str::to_string);
    Ok((span, entity))
}

/// An entity located in a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryEntity {
    entity_type: EntityType,
    span: Span,
    normalized_span: Span,
    entity: Entity,
}

impl QueryEntity {
    pub fn new(entity_type: EntityType, span: Span, normalized_span: Span, entity: Entity) -> Self {
        Self {
            entity_type,
            span,
            normalized_span,
            entity,
        }
    }

    /// Locates the entity at `normalized_span` of `query`.
    ///
    /// `entity_type` is a label in `type` or `type|role` notation; an explicit
    /// `role` wins over the one in the label.
    pub fn from_query(
        query: &Query,
        normalized_span: Span,
        entity_type: &str,
        role: Option<&str>,
    ) -> Result<Self, QueryError> {
        let entity_type = EntityType::from_label(entity_type)?;
        let (span, entity) = locate(query, normalized_span, &entity_type, role)?;
        Ok(Self::new(entity_type, span, normalized_span, entity))
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn normalized_span(&self) -> Span {
        self.normalized_span
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn into_entity(self) -> Entity {
        self.entity
    }
}

/// An entity located inside another entity of the same query.
///
/// Spans are absolute; the parent span (NORMALIZED coordinates) is kept so the
/// relative position can be recovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestedEntity {
    entity_type: EntityType,
    span: Span,
    normalized_span: Span,
    entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_span: Option<Span>,
}

impl NestedEntity {
    pub fn new(entity_type: EntityType, span: Span, normalized_span: Span, entity: Entity) -> Self {
        Self {
            entity_type,
            span,
            normalized_span,
            entity,
            parent_span: None,
        }
    }

    pub fn with_parent_span(mut self, parent_span: Span) -> Self {
        self.parent_span = Some(parent_span);
        self
    }

    /// Locates an entity given by its span relative to a parent entity.
    pub fn from_query(
        query: &Query,
        parent_normalized_span: Span,
        relative_normalized_span: Span,
        entity_type: &str,
        role: Option<&str>,
    ) -> Result<Self, QueryError> {
        let outside = |index| QueryError::OutOfRangeIndex {
            index,
            form: TextForm::Normalized,
            len: parent_normalized_span.end().saturating_add(1),
        };
        let normalized_span = relative_normalized_span
            .offset_by(parent_normalized_span.start())
            .ok_or_else(|| outside(relative_normalized_span.end()))?;
        if !parent_normalized_span.contains(&normalized_span) {
            return Err(outside(normalized_span.end()));
        }
        let entity_type = EntityType::from_label(entity_type)?;
        let (span, entity) = locate(query, normalized_span, &entity_type, role)?;
        Ok(Self::new(entity_type, span, normalized_span, entity)
            .with_parent_span(parent_normalized_span))
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn normalized_span(&self) -> Span {
        self.normalized_span
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn parent_span(&self) -> Option<Span> {
        self.parent_span
    }

    /// The normalized span relative to the parent's start.
    pub fn relative_span(&self) -> Option<Span> {
        self.parent_span
            .and_then(|parent| self.normalized_span.relative_to(&parent))
    }
}

impl From<NestedEntity> for QueryEntity {
    fn from(nested: NestedEntity) -> Self {
        QueryEntity::new(
            nested.entity_type,
            nested.span,
            nested.normalized_span,
            nested.entity,
        )
    }
}

macro_rules! located {
    ($ty:ty) => {
        impl LocatedEntity for $ty {
            fn entity_type(&self) -> &EntityType {
                &self.entity_type
            }

            fn span(&self) -> Span {
                self.span
            }

            fn normalized_span(&self) -> Span {
                self.normalized_span
            }

            fn entity(&self) -> &Entity {
                &self.entity
            }
        }
    };
}

located!(QueryEntity);
located!(NestedEntity);

macro_rules! key_eq {
    ($lhs:ty, $rhs:ty) => {
        impl PartialEq<$rhs> for $lhs {
            fn eq(&self, other: &$rhs) -> bool {
                self.comparison_key() == other.comparison_key()
            }
        }
    };
}

key_eq!(QueryEntity, QueryEntity);
key_eq!(NestedEntity, NestedEntity);
key_eq!(QueryEntity, NestedEntity);
key_eq!(NestedEntity, QueryEntity);

impl Eq for QueryEntity {}
impl Eq for NestedEntity {}
