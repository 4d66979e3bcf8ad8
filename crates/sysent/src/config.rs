use chrono_tz::Tz;
use query::ResolverError;
use serde::{Deserialize, Serialize};

/// Settings for [`RuleResolver`](crate::RuleResolver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleResolverConfig {
    /// IANA zone applied when a query carries none.
    pub default_time_zone: String,
    /// Emit `sys_number` candidates.
    pub numbers: bool,
}

impl Default for RuleResolverConfig {
    fn default() -> Self {
        Self {
            default_time_zone: "UTC".to_string(),
            numbers: true,
        }
    }
}

impl RuleResolverConfig {
    pub fn validate(&self) -> Result<(), ResolverError> {
        parse_zone(&self.default_time_zone).map(|_| ())
    }
}

pub(crate) fn parse_zone(name: &str) -> Result<Tz, ResolverError> {
    name.parse::<Tz>()
        .map_err(|_| ResolverError::UnknownTimeZone(name.to_string()))
}
