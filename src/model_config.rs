//! Classifier, parser and nlp configuration resolution.
//!
//! Each lookup walks the same precedence tiers:
//!
//! 1. an explicit configuration passed by the caller (parser and nlp only)
//! 2. a registered provider function
//! 3. a section of the app's configuration file
//! 4. the built-in default
//!
//! Providers and sections are found through candidate lists of
//! `(name, is_deprecated)` pairs. The current name is tried first; a hit on a
//! deprecated alias still resolves but logs a warning. A provider that fails
//! is logged and the next tier is tried.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AppConfig, ConfigLoadError};

/// Error reported by a configuration provider function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// A function computing a configuration for a classifier context.
pub type ConfigProvider =
    Arc<dyn Fn(&ClassifierContext) -> Result<Value, ProviderError> + Send + Sync>;

/// A name to look up and whether it is a deprecated alias.
pub type Candidate = (&'static str, bool);

/// The classifiers whose configuration can be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    Domain,
    Intent,
    Entity,
    EntityResolution,
    Role,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 5] = [
        ClassifierKind::Domain,
        ClassifierKind::Intent,
        ClassifierKind::Entity,
        ClassifierKind::EntityResolution,
        ClassifierKind::Role,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierKind::Domain => "domain",
            ClassifierKind::Intent => "intent",
            ClassifierKind::Entity => "entity",
            ClassifierKind::EntityResolution => "entity_resolution",
            ClassifierKind::Role => "role",
        }
    }

    /// Provider names, current first. Domain classifiers take no provider.
    pub fn provider_candidates(&self) -> &'static [Candidate] {
        match self {
            ClassifierKind::Domain => &[],
            ClassifierKind::Intent => &[
                ("get_intent_classifier_config", false),
                ("get_intent_model_config", true),
            ],
            ClassifierKind::Entity => &[
                ("get_entity_recognizer_config", false),
                ("get_entity_model_config", true),
            ],
            ClassifierKind::EntityResolution => &[
                ("get_entity_resolver_config", false),
                ("get_entity_resolution_model_config", true),
            ],
            ClassifierKind::Role => &[
                ("get_role_classifier_config", false),
                ("get_role_model_config", true),
            ],
        }
    }

    /// Configuration file keys, current first.
    pub fn section_candidates(&self) -> &'static [Candidate] {
        match self {
            ClassifierKind::Domain => &[
                ("domain_classifier_config", false),
                ("domain_model_config", true),
            ],
            ClassifierKind::Intent => &[
                ("intent_classifier_config", false),
                ("intent_model_config", true),
            ],
            ClassifierKind::Entity => &[
                ("entity_recognizer_config", false),
                ("entity_model_config", true),
            ],
            ClassifierKind::EntityResolution => &[
                ("entity_resolver_config", false),
                ("entity_resolution_config", true),
            ],
            ClassifierKind::Role => &[
                ("role_classifier_config", false),
                ("role_model_config", true),
            ],
        }
    }

    /// The built-in configuration.
    pub fn default_config(&self) -> Value {
        match self {
            ClassifierKind::Domain => json!({
                "model_type": "text",
                "model_settings": {"classifier_type": "logreg"},
                "param_selection": {
                    "type": "k-fold",
                    "k": 10,
                    "grid": {
                        "fit_intercept": [true, false],
                        "C": [10, 100, 1000, 10000, 100000]
                    }
                },
                "features": {
                    "bag-of-words": {"lengths": [1]},
                    "freq": {"bins": 5},
                    "in-gaz": {}
                }
            }),
            ClassifierKind::Intent => json!({
                "model_type": "text",
                "model_settings": {"classifier_type": "logreg"},
                "param_selection": {
                    "type": "k-fold",
                    "k": 10,
                    "grid": {
                        "fit_intercept": [true, false],
                        "C": [0.01, 1, 100, 10000, 1000000],
                        "class_bias": [1, 0.7, 0.3, 0]
                    }
                },
                "features": {
                    "bag-of-words": {"lengths": [1]},
                    "in-gaz": {},
                    "freq": {"bins": 5},
                    "length": {}
                }
            }),
            ClassifierKind::Entity => json!({
                "model_type": "tagger",
                "label_type": "entities",
                "model_settings": {
                    "classifier_type": "memm",
                    "tag_scheme": "IOB",
                    "feature_scaler": "max-abs"
                },
                "param_selection": {
                    "type": "k-fold",
                    "k": 5,
                    "scoring": "accuracy",
                    "grid": {
                        "penalty": ["l1", "l2"],
                        "C": [0.01, 1, 100, 10000, 1000000, 100000000]
                    }
                },
                "features": {
                    "bag-of-words-seq": {
                        "ngram_lengths_to_start_positions": {
                            "1": [-2, -1, 0, 1, 2],
                            "2": [-2, -1, 0, 1]
                        }
                    },
                    "in-gaz-span-seq": {},
                    "sys-candidates-seq": {"start_positions": [-1, 0, 1]}
                }
            }),
            ClassifierKind::EntityResolution => json!({"model_type": "text_relevance"}),
            ClassifierKind::Role => json!({
                "model_type": "text",
                "model_settings": {"classifier_type": "logreg"},
                "params": {"C": 100, "penalty": "l1"},
                "features": {
                    "bag-of-words-before": {
                        "ngram_lengths_to_start_positions": {"1": [-2, -1], "2": [-2, -1]}
                    },
                    "bag-of-words-after": {
                        "ngram_lengths_to_start_positions": {"1": [0, 1], "2": [0, 1]}
                    },
                    "other-entities": {}
                }
            }),
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in the app hierarchy a classifier sits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierContext {
    pub domain: Option<String>,
    pub intent: Option<String>,
    pub entity: Option<String>,
}

impl ClassifierContext {
    pub fn new(domain: Option<&str>, intent: Option<&str>, entity: Option<&str>) -> Self {
        Self {
            domain: domain.map(str::to_string),
            intent: intent.map(str::to_string),
            entity: entity.map(str::to_string),
        }
    }
}

pub const PARSER_PROVIDER: &[Candidate] = &[("get_parser_config", false)];
pub const PARSER_SECTION: &[Candidate] = &[("parser_config", false)];
pub const NLP_PROVIDER: &[Candidate] = &[("get_nlp_config", false)];
pub const NLP_SECTION: &[Candidate] = &[("nlp_config", false)];
pub const RANKING_SECTION: &[Candidate] = &[("ranking_config", false)];

/// Everything configuration can be resolved from: the app's file and any
/// registered provider functions.
#[derive(Clone, Default)]
pub struct ConfigSources {
    app: Option<AppConfig>,
    providers: HashMap<String, ConfigProvider>,
}

impl ConfigSources {
    pub fn new(app: Option<AppConfig>) -> Self {
        Self {
            app,
            providers: HashMap::new(),
        }
    }

    /// Loads the configuration of the app at `app_path`. A missing file is
    /// not an error; lookups then fall through to the defaults.
    pub fn for_app_path<P: AsRef<Path>>(app_path: P) -> Result<Self, ConfigLoadError> {
        match AppConfig::for_app_path(app_path) {
            Ok(app) => Ok(Self::new(Some(app))),
            Err(ConfigLoadError::NotFound(path)) => {
                info!(path = %path.display(), "no app configuration file found");
                Ok(Self::new(None))
            }
            Err(err) => Err(err),
        }
    }

    /// Registers a provider under `name`, e.g. `get_intent_classifier_config`.
    pub fn with_provider<F>(mut self, name: impl Into<String>, provider: F) -> Self
    where
        F: Fn(&ClassifierContext) -> Result<Value, ProviderError> + Send + Sync + 'static,
    {
        self.providers.insert(name.into(), Arc::new(provider));
        self
    }

    pub fn app(&self) -> Option<&AppConfig> {
        self.app.as_ref()
    }

    fn is_empty(&self) -> bool {
        self.app.is_none() && self.providers.is_empty()
    }

    fn provider(&self, candidates: &[Candidate]) -> Option<&ConfigProvider> {
        lookup(candidates, |name| self.providers.get(name))
    }

    fn section(&self, candidates: &[Candidate]) -> Option<&Value> {
        let app = self.app.as_ref()?;
        lookup(candidates, |name| app.section(name))
    }

    /// Runs the first provider found; failures are logged and yield `None`.
    fn provide(&self, what: &str, candidates: &[Candidate], ctx: &ClassifierContext) -> Option<Value> {
        let provider = self.provider(candidates)?;
        match provider(ctx) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(config = what, error = %err, "configuration provider failed");
                None
            }
        }
    }
}

impl fmt::Debug for ConfigSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.providers.keys().collect();
        names.sort();
        f.debug_struct("ConfigSources")
            .field("app", &self.app)
            .field("providers", &names)
            .finish()
    }
}

/// Resolves the first candidate `get` finds, warning when it is deprecated.
pub fn lookup<T, F>(candidates: &[Candidate], get: F) -> Option<T>
where
    F: Fn(&'static str) -> Option<T>,
{
    let current = candidates
        .iter()
        .find(|(_, deprecated)| !deprecated)
        .map(|(name, _)| *name);
    candidates.iter().find_map(|&(name, deprecated)| {
        let found = get(name)?;
        if deprecated {
            warn!(
                deprecated = name,
                replacement = current.unwrap_or_default(),
                "deprecated config key; use the replacement key"
            );
        }
        Some(found)
    })
}

/// The configuration of the `kind` classifier at `ctx`.
pub fn classifier_config(
    kind: ClassifierKind,
    sources: &ConfigSources,
    ctx: &ClassifierContext,
) -> Value {
    if sources.is_empty() {
        info!(classifier = %kind, "no app configuration; using default model configuration");
        return kind.default_config();
    }
    if let Some(value) = sources.provide(kind.as_str(), kind.provider_candidates(), ctx) {
        return value;
    }
    if let Some(value) = sources.section(kind.section_candidates()) {
        return value.clone();
    }
    info!(classifier = %kind, "no model configuration set; using default");
    kind.default_config()
}

/// Settings for one dependent entity type of a parser head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependentConfig {
    pub left: bool,
    pub right: bool,
    pub min_instances: u32,
    pub max_instances: Option<u32>,
    pub precedence: Precedence,
    pub linking_words: BTreeSet<String>,
}

impl Default for DependentConfig {
    fn default() -> Self {
        Self {
            left: true,
            right: true,
            min_instances: 0,
            max_instances: None,
            precedence: Precedence::Left,
            linking_words: BTreeSet::new(),
        }
    }
}

/// Which side wins when a dependent could attach to two heads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precedence {
    #[default]
    Left,
    Right,
}

/// Fully specified parser configuration: head type to dependent type to settings.
pub type ParserConfig = BTreeMap<String, BTreeMap<String, DependentConfig>>;

/// Expands a parser configuration to its fully specified form.
///
/// A head's group is either a list of dependents, each a type label or a map
/// with a `type` field plus overrides, or a map from dependent type to
/// overrides. Missing settings take [`DependentConfig::default`].
///
/// ```rust
/// use nlu::model_config::expand_parser_config;
/// use serde_json::json;
///
/// let cfg = expand_parser_config(&json!({
///     "product|beverage": ["size", {"type": "quantity", "max_instances": 3}],
///     "store": {"location": {"left": false}}
/// }))
/// .unwrap();
/// assert_eq!(cfg["product|beverage"]["quantity"].max_instances, Some(3));
/// assert!(!cfg["store"]["location"].left);
/// assert!(cfg["store"]["location"].right);
/// ```
pub fn expand_parser_config(config: &Value) -> Result<ParserConfig, ConfigLoadError> {
    let heads = config.as_object().ok_or_else(|| {
        ConfigLoadError::Validation("parser config must map head types to dependents".into())
    })?;
    let mut expanded = ParserConfig::new();
    for (head, group) in heads {
        expanded.insert(head.clone(), expand_group(head, group)?);
    }
    Ok(expanded)
}

fn expand_group(
    head: &str,
    group: &Value,
) -> Result<BTreeMap<String, DependentConfig>, ConfigLoadError> {
    let mut expanded = BTreeMap::new();
    match group {
        Value::Array(dependents) => {
            for dependent in dependents {
                let (dep_type, overrides) = match dependent {
                    Value::String(dep_type) => (dep_type.clone(), Map::new()),
                    Value::Object(fields) => {
                        let mut overrides = fields.clone();
                        let dep_type = match overrides.remove("type") {
                            Some(Value::String(dep_type)) => dep_type,
                            _ => {
                                return Err(ConfigLoadError::Validation(format!(
                                    "parser dependent of '{head}' needs a string 'type'"
                                )))
                            }
                        };
                        (dep_type, overrides)
                    }
                    other => {
                        return Err(ConfigLoadError::Validation(format!(
                            "parser dependent of '{head}' must be a label or a map, got {other}"
                        )))
                    }
                };
                expanded.insert(dep_type, dependent_config(head, overrides)?);
            }
        }
        Value::Object(dependents) => {
            for (dep_type, overrides) in dependents {
                let mut overrides = match overrides {
                    Value::Object(fields) => fields.clone(),
                    Value::Null => Map::new(),
                    other => {
                        return Err(ConfigLoadError::Validation(format!(
                            "settings for '{head}' -> '{dep_type}' must be a map, got {other}"
                        )))
                    }
                };
                overrides.remove("type");
                expanded.insert(dep_type.clone(), dependent_config(head, overrides)?);
            }
        }
        other => {
            return Err(ConfigLoadError::Validation(format!(
                "dependents of '{head}' must be a list or a map, got {other}"
            )))
        }
    }
    Ok(expanded)
}

fn dependent_config(head: &str, overrides: Map<String, Value>) -> Result<DependentConfig, ConfigLoadError> {
    serde_json::from_value(Value::Object(overrides))
        .map_err(|err| ConfigLoadError::Validation(format!("parser config for '{head}': {err}")))
}

/// The fully specified parser configuration, or `None` when nothing
/// configures a parser.
///
/// An explicit, non-empty `config` wins over every other source. A provider
/// that fails or returns something malformed is logged and skipped.
pub fn parser_config(
    explicit: Option<&Value>,
    sources: &ConfigSources,
    domain: Option<&str>,
    intent: Option<&str>,
) -> Result<Option<ParserConfig>, ConfigLoadError> {
    if let Some(config) = explicit.filter(|cfg| !is_empty_value(cfg)) {
        return expand_parser_config(config).map(Some);
    }
    if sources.is_empty() {
        info!("no app configuration; not configuring parser");
        return Ok(None);
    }

    let ctx = ClassifierContext::new(domain, intent, None);
    if let Some(provided) = sources.provide("parser", PARSER_PROVIDER, &ctx) {
        match expand_parser_config(&provided) {
            Ok(expanded) => return Ok(Some(expanded)),
            Err(err) => warn!(error = %err, "parser configuration provider returned invalid config"),
        }
    }
    match sources.section(PARSER_SECTION) {
        Some(section) => expand_parser_config(section).map(Some),
        None => Ok(None),
    }
}

pub fn default_nlp_config() -> Value {
    json!({"extract_nbest_entities": []})
}

/// The nlp (n-best inference) configuration.
pub fn nlp_config(explicit: Option<&Value>, sources: &ConfigSources) -> Value {
    if let Some(config) = explicit.filter(|cfg| !is_empty_value(cfg)) {
        return config.clone();
    }
    if sources.is_empty() {
        info!("no app configuration; not configuring nbest inference");
        return default_nlp_config();
    }
    if let Some(value) = sources.provide("nlp", NLP_PROVIDER, &ClassifierContext::default()) {
        return value;
    }
    sources
        .section(NLP_SECTION)
        .cloned()
        .unwrap_or_else(default_nlp_config)
}

pub fn default_ranking_config() -> Value {
    json!({"query_clauses_operator": "or"})
}

/// The entity resolution ranking configuration.
pub fn ranking_config(sources: &ConfigSources) -> Value {
    sources
        .section(RANKING_SECTION)
        .cloned()
        .unwrap_or_else(default_ranking_config)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
