use std::env;
use std::error::Error;
use std::path::PathBuf;

use nlu::{app_namespace, build_query_factory, AppConfig, ConfigLoadError, LocatedEntity, TextForm};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env::var("NLU_LOG_JSON").as_deref() == Ok("1") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Usage: nlu [APP_PATH] [TEXT] [TIME_ZONE]
fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let mut args = env::args().skip(1);
    let app_path = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    let text = args
        .next()
        .unwrap_or_else(|| "Book a table for two today at 7:30 pm, please!".to_string());
    let time_zone = args.next();

    let config = match AppConfig::for_app_path(&app_path) {
        Ok(config) => Some(config),
        Err(ConfigLoadError::NotFound(_)) => None,
        Err(err) => return Err(err.into()),
    };
    let factory = build_query_factory(&config.clone().unwrap_or_default())?;
    let query = factory.create_query(&text, time_zone.as_deref(), None)?;

    println!("namespace:  {}", app_namespace(&app_path, config.as_ref()));
    for form in TextForm::ALL {
        println!("{form:<10}  {:?}", query.text_for(form));
    }
    for candidate in query.system_entity_candidates() {
        let raw = candidate.span_for(&query, TextForm::Raw)?;
        println!(
            "{:<10}  {:?} at raw {raw}: {}",
            candidate.entity().entity_type,
            query.span_text(raw, TextForm::Raw)?,
            candidate
                .entity()
                .value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default()
        );
    }

    Ok(())
}
