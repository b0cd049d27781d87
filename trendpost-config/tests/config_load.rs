use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;
use trendpost_common::TrendpostError;
use trendpost_config::TrendpostConfigLoader;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const CREDS: [(&str, Option<&str>); 6] = [
    ("GEMINI_API_KEY", Some("gemini-secret")),
    ("X_BEARER_TOKEN", Some("bearer-secret")),
    ("X_API_KEY", Some("consumer-key")),
    ("X_API_SECRET", Some("consumer-secret")),
    ("X_ACCESS_TOKEN", Some("access-token")),
    ("X_ACCESS_TOKEN_SECRET", Some("access-secret")),
];

#[test]
#[serial]
fn file_values_override_defaults() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "trendpost.yaml",
        r#"
trends:
  url: "https://trends24.in/indonesia/"
  limit: 3
links:
  path: "/srv/trendpost/links.txt"
generation:
  model: "gemini-pro"
  api_key: "${GEMINI_API_KEY}"
"#,
    );

    temp_env::with_vars(CREDS, || {
        let config = TrendpostConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config");

        assert_eq!(config.trends.url, "https://trends24.in/indonesia/");
        assert_eq!(config.trends.limit, 3);
        assert_eq!(config.trends.selector, "ol.trend-card__list li a");
        assert_eq!(config.links.path, "/srv/trendpost/links.txt");
        assert_eq!(config.generation.model, "gemini-pro");
        assert_eq!(config.generation.api_key.expose(), "gemini-secret");
        config.validate().expect("credentials present");
    });
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "trendpost.yaml", "trends:\n  limit: 2\n");

    let mut vars: Vec<(&str, Option<&str>)> = CREDS.to_vec();
    vars.push(("TRENDPOST__TRENDS__LIMIT", Some("5")));
    vars.push(("TRENDPOST__LINKS__PATH", Some("promo.txt")));

    temp_env::with_vars(vars, || {
        let config = TrendpostConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config");
        assert_eq!(config.trends.limit, 5);
        assert_eq!(config.links.path, "promo.txt");
    });
}

#[test]
#[serial]
fn optional_file_may_be_absent() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.yaml");

    let config = TrendpostConfigLoader::new()
        .with_optional_file(&missing)
        .load()
        .expect("absent optional file is fine");
    assert_eq!(config.trends.limit, 4);
}

#[test]
#[serial]
fn required_file_must_exist() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.yaml");
    assert!(TrendpostConfigLoader::new().with_file(&missing).load().is_err());
}

#[test]
#[serial]
fn missing_generation_key_fails_validation() {
    let vars: Vec<(&str, Option<&str>)> = CREDS
        .iter()
        .map(|(k, v)| if *k == "GEMINI_API_KEY" { (*k, None) } else { (*k, *v) })
        .collect();

    temp_env::with_vars(vars, || {
        let config = TrendpostConfigLoader::new().load().expect("load config");
        match config.validate() {
            Err(TrendpostError::MissingCredential(names)) => assert_eq!(names, "GEMINI_API_KEY"),
            other => panic!("expected missing credential, got {other:?}"),
        }
    });
}

#[test]
#[serial]
fn dollar_signs_in_real_secrets_are_kept_verbatim() {
    let vars: Vec<(&str, Option<&str>)> = CREDS
        .iter()
        .map(|(k, v)| match *k {
            "GEMINI_API_KEY" => (*k, Some("$ecret")),
            "X_ACCESS_TOKEN_SECRET" => (*k, Some("a$b${HOME}c")),
            _ => (*k, *v),
        })
        .collect();

    temp_env::with_vars(vars, || {
        let config = TrendpostConfigLoader::new().load().expect("load config");
        assert_eq!(config.generation.api_key.expose(), "$ecret");
        assert_eq!(config.publish.access_token_secret.expose(), "a$b${HOME}c");
        config.validate().expect("dollar-bearing secrets are present");
    });
}
