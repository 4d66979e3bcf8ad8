//! Rule-based system entity resolver.
//!
//! [`RuleResolver`] scans normalized query text for a small, fixed grammar of
//! dates, times and numbers and reports each hit as a `sys_time` or
//! `sys_number` entity with a resolved value:
//!
//! ```text
//! "today at noon"  ->  sys_time   {"value": "2018-01-23T12:00:00.000-03:00", "grain": "hour"}
//! "two"            ->  sys_number {"value": 2}
//! ```
//!
//! Times are resolved against an anchor instant (the query timestamp, or now)
//! in the query's IANA time zone, falling back to the configured default
//! zone. The resolver holds no mutable state and is safe to share between
//! threads.

mod config;
mod number;
mod time;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use normalize::tokenize;
use query::{Entity, ResolverError, Span, SystemEntityResolver};
use tracing::debug;

pub use crate::config::RuleResolverConfig;

pub const SYS_TIME: &str = "sys_time";
pub const SYS_NUMBER: &str = "sys_number";

/// Resolves `sys_time` and `sys_number` candidates.
#[derive(Debug, Clone, Default)]
pub struct RuleResolver {
    cfg: RuleResolverConfig,
}

impl RuleResolver {
    pub fn new(cfg: RuleResolverConfig) -> Result<Self, ResolverError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &RuleResolverConfig {
        &self.cfg
    }
}

fn candidate_span(start: usize, end_exclusive: usize) -> Result<Span, ResolverError> {
    Span::new(start, end_exclusive.saturating_sub(1))
        .map_err(|err| ResolverError::Backend(err.to_string()))
}

impl SystemEntityResolver for RuleResolver {
    fn resolve(
        &self,
        text: &str,
        time_zone: Option<&str>,
        timestamp: Option<i64>,
    ) -> Result<Vec<(Span, Entity)>, ResolverError> {
        let zone = config::parse_zone(time_zone.unwrap_or(&self.cfg.default_time_zone))?;
        let anchor = match timestamp {
            Some(ts) => DateTime::from_timestamp(ts, 0).ok_or(ResolverError::InvalidTimestamp(ts))?,
            None => Utc::now(),
        }
        .with_timezone(&zone);

        let tokens = tokenize(text);
        let mut candidates = Vec::new();
        let mut covered = HashSet::new();

        for found in time::find_times(&tokens, &anchor) {
            let matched = &tokens[found.first..found.end];
            let literal = matched
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let span = candidate_span(matched[0].start, matched[matched.len() - 1].end)?;
            covered.extend(found.first..found.end);
            candidates.push((span, Entity::new(literal, SYS_TIME).with_value(found.value)));
        }

        if self.cfg.numbers {
            for (idx, token) in tokens.iter().enumerate() {
                if covered.contains(&idx) {
                    continue;
                }
                if let Some(value) = number::parse_number(&token.text) {
                    let span = candidate_span(token.start, token.end)?;
                    candidates.push((span, Entity::new(token.text.clone(), SYS_NUMBER).with_value(value)));
                }
            }
        }

        candidates.sort_by_key(|(span, _)| *span);
        debug!(
            time_zone = %zone,
            candidates = candidates.len(),
            "system_entities_resolved"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TUESDAY_EVENING: i64 = 1_516_748_906;

    fn resolve(text: &str, zone: Option<&str>) -> Vec<(Span, Entity)> {
        RuleResolver::default()
            .resolve(text, zone, Some(TUESDAY_EVENING))
            .expect("resolve")
    }

    #[test]
    fn today_at_noon_is_one_candidate() {
        let found = resolve("today at noon", Some("America/Bahia"));
        assert_eq!(found.len(), 1);
        let (span, entity) = &found[0];
        assert_eq!(*span, Span::new(0, 12).expect("span"));
        assert_eq!(entity.text, "today at noon");
        assert_eq!(entity.entity_type, SYS_TIME);
        assert_eq!(
            entity.value,
            Some(json!({"value": "2018-01-23T12:00:00.000-03:00", "grain": "hour"}))
        );
    }

    #[test]
    fn default_zone_applies_without_query_zone() {
        let resolver = RuleResolver::new(RuleResolverConfig {
            default_time_zone: "America/Bahia".into(),
            ..Default::default()
        })
        .expect("valid config");
        let found = resolver
            .resolve("noon", None, Some(TUESDAY_EVENING))
            .expect("resolve");
        assert_eq!(
            found[0].1.value.as_ref().and_then(|v| v["value"].as_str()),
            Some("2018-01-23T12:00:00.000-03:00")
        );
    }

    #[test]
    fn numbers_outside_times() {
        let found = resolve("two tickets for 5pm and 3.5 hours", None);
        let kinds: Vec<(&str, &str)> = found
            .iter()
            .map(|(_, e)| (e.text.as_str(), e.entity_type.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![("two", SYS_NUMBER), ("5pm", SYS_TIME), ("3.5", SYS_NUMBER)]
        );
    }

    #[test]
    fn numbers_can_be_disabled() {
        let resolver = RuleResolver::new(RuleResolverConfig {
            numbers: false,
            ..Default::default()
        })
        .expect("valid config");
        let found = resolver.resolve("two tickets", None, None).expect("resolve");
        assert!(found.is_empty());
    }

    #[test]
    fn no_entities_is_not_an_error() {
        assert!(resolve("connect me with paul", None).is_empty());
        assert!(resolve("", None).is_empty());
    }

    #[test]
    fn unknown_zone_fails() {
        let err = RuleResolver::default()
            .resolve("today", Some("Mars/Olympus"), None)
            .expect_err("unknown zone");
        assert_eq!(err, ResolverError::UnknownTimeZone("Mars/Olympus".into()));
    }

    #[test]
    fn unrepresentable_timestamp_fails() {
        let err = RuleResolver::default()
            .resolve("today", None, Some(i64::MAX))
            .expect_err("bad timestamp");
        assert_eq!(err, ResolverError::InvalidTimestamp(i64::MAX));
    }
}
