//! Application configuration files.
//!
//! An application directory may carry a `config.yml` (or `config.yaml`) that
//! configures the query pipeline and the classifiers built on top of it:
//!
//! ```yaml
//! version: "1"
//! app_namespace: "kwik_e_mart"
//!
//! normalize:
//!   version: 1
//!   fold_diacritics: true
//!
//! system_entities:
//!   default_time_zone: "America/Los_Angeles"
//!   numbers: true
//!
//! intent_classifier_config:
//!   model_type: text
//!   model_settings:
//!     classifier_type: logreg
//!
//! parser_config:
//!   "product|beverage": [size, quantity, "option|beverage"]
//!   store: [location]
//! ```
//!
//! Only `version`, `app_namespace`, `normalize` and `system_entities` are
//! interpreted here. Every other top-level key is kept verbatim as JSON data
//! for the classifier, parser and nlp resolution in
//! [`model_config`](crate::model_config).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use normalize::NormalizeConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sysent::RuleResolverConfig;
use thiserror::Error;
use tracing::debug;

/// File names probed, in order, inside an application directory.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["config.yml", "config.yaml"];

/// Environment variable whose value prefixes every app namespace.
pub const JUPYTER_USER_ENV: &str = "JUPYTER_USER";

/// Errors that can occur when loading application configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("no configuration file found in {}", .0.display())]
    NotFound(PathBuf),
}

/// Parsed contents of an application's configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,

    /// Namespace for the app's indexes; defaults to the directory name.
    #[serde(default)]
    pub app_namespace: Option<String>,

    #[serde(default)]
    pub normalize: NormalizeConfig,

    #[serde(default)]
    pub system_entities: RuleResolverConfig,

    /// Remaining keys, uninterpreted.
    #[serde(flatten)]
    pub sections: Map<String, Value>,
}

fn default_version() -> String {
    "1".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            app_namespace: None,
            normalize: NormalizeConfig::default(),
            system_entities: RuleResolverConfig::default(),
            sections: Map::new(),
        }
    }
}

impl AppConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        // An empty file is a valid, empty configuration.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: AppConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration file of the application at `app_path`.
    pub fn for_app_path<P: AsRef<Path>>(app_path: P) -> Result<Self, ConfigLoadError> {
        let app_path = app_path.as_ref();
        let file = config_file_path(app_path)
            .ok_or_else(|| ConfigLoadError::NotFound(app_path.to_path_buf()))?;
        debug!(path = %file.display(), "loading app config");
        Self::from_file(file)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1" | "1.0" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }
        self.normalize
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("normalize: {err}")))?;
        self.system_entities
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("system_entities: {err}")))?;
        if let Some(namespace) = &self.app_namespace {
            if namespace.trim().is_empty() {
                return Err(ConfigLoadError::Validation(
                    "app_namespace must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// An uninterpreted top-level section.
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.sections.get(key)
    }
}

/// The configuration file inside `app_path`, if there is one.
pub fn config_file_path(app_path: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| app_path.join(name))
        .find(|candidate| candidate.is_file())
}

/// The namespace of the application at `app_path`.
///
/// The configured `app_namespace` wins over the directory name. When
/// `JUPYTER_USER` is set its value is prepended with an underscore so that
/// users sharing one search cluster do not collide.
pub fn app_namespace(app_path: &Path, config: Option<&AppConfig>) -> String {
    let user = std::env::var(JUPYTER_USER_ENV).ok();
    namespace_for_user(app_path, config, user.as_deref())
}

pub(crate) fn namespace_for_user(
    app_path: &Path,
    config: Option<&AppConfig>,
    user: Option<&str>,
) -> String {
    let base = config
        .and_then(|cfg| cfg.app_namespace.clone())
        .unwrap_or_else(|| {
            app_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
    match user {
        Some(user) => format!("{user}_{base}"),
        None => base,
    }
}
