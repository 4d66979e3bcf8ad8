use std::fs;

use nlu::model_config::{nlp_config, parser_config, ranking_config};
use nlu::{
    app_namespace, build_query_factory, classifier_config, AppConfig, ClassifierContext,
    ClassifierKind, ConfigSources, Precedence, ProviderError,
};
use serde_json::json;
use tempfile::tempdir;

const APP_CONFIG: &str = r#"
version: "1"
app_namespace: "kwik_e_mart"

system_entities:
  default_time_zone: "America/Bahia"

domain_model_config:
  model_type: text
  model_settings:
    classifier_type: svm

entity_recognizer_config:
  model_type: tagger
  label_type: entities

parser_config:
  "product|beverage": [size, quantity, "option|beverage"]
  store:
    location:
      max_instances: 1

nlp_config:
  extract_nbest_entities: [store_info]
"#;

#[test]
fn app_directory_drives_every_lookup() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.yml"), APP_CONFIG).unwrap();

    let sources = ConfigSources::for_app_path(dir.path()).unwrap();
    let ctx = ClassifierContext::default();

    // deprecated key still resolves
    let domain = classifier_config(ClassifierKind::Domain, &sources, &ctx);
    assert_eq!(domain["model_settings"]["classifier_type"], "svm");

    let entity = classifier_config(ClassifierKind::Entity, &sources, &ctx);
    assert_eq!(entity, json!({"model_type": "tagger", "label_type": "entities"}));

    let role = classifier_config(ClassifierKind::Role, &sources, &ctx);
    assert_eq!(role, ClassifierKind::Role.default_config());

    let parser = parser_config(None, &sources, None, None).unwrap().unwrap();
    assert_eq!(parser["product|beverage"].len(), 3);
    assert_eq!(parser["store"]["location"].max_instances, Some(1));
    assert_eq!(parser["store"]["location"].precedence, Precedence::Left);

    assert_eq!(
        nlp_config(None, &sources),
        json!({"extract_nbest_entities": ["store_info"]})
    );
    assert_eq!(ranking_config(&sources), json!({"query_clauses_operator": "or"}));

    let app = sources.app().unwrap();
    assert!(app_namespace(dir.path(), Some(app)).ends_with("kwik_e_mart"));

    let factory = build_query_factory(app).unwrap();
    let query = factory
        .create_query("today at noon", None, Some(1_516_748_906))
        .unwrap();
    assert_eq!(
        query.system_entity_candidates()[0].entity().value.as_ref().unwrap()["value"],
        "2018-01-23T12:00:00.000-03:00"
    );
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let sources = ConfigSources::for_app_path(dir.path()).unwrap();
    assert!(sources.app().is_none());

    let intent = classifier_config(ClassifierKind::Intent, &sources, &ClassifierContext::default());
    assert_eq!(intent, ClassifierKind::Intent.default_config());
    assert_eq!(parser_config(None, &sources, None, None).unwrap(), None);
}

#[test]
fn broken_config_file_is_an_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.yml"), "version: [1\n").unwrap();
    assert!(ConfigSources::for_app_path(dir.path()).is_err());
}

#[test]
fn providers_receive_classifier_context() {
    let sources = ConfigSources::default()
        .with_provider("get_entity_recognizer_config", |ctx: &ClassifierContext| {
            match ctx.intent.as_deref() {
                Some("build_order") => Ok(json!({"model_type": "tagger", "for": "build_order"})),
                _ => Err(ProviderError("no config for this intent".into())),
            }
        });

    let ctx = ClassifierContext::new(Some("ordering"), Some("build_order"), None);
    let cfg = classifier_config(ClassifierKind::Entity, &sources, &ctx);
    assert_eq!(cfg["for"], "build_order");

    let other = ClassifierContext::new(Some("ordering"), Some("greet"), None);
    let fallback = classifier_config(ClassifierKind::Entity, &sources, &other);
    assert_eq!(fallback, ClassifierKind::Entity.default_config());
}
