use bingwebsearch_config::SearchConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const FILE_YAML: &str = r#"
endpoint: "https://bing.example.test/v7.0/search"
subscription_key: "${TEST_BING_KEY}"
timeout_secs: 30
headers:
  accept_language: en-CA
  pragma: no-cache
defaults:
  count: 10
  mkt: en-CA
  safe_search: Moderate
  response_filter: [Webpages]
save_json: response.json
"#;

#[test]
#[serial]
fn loads_file_and_expands_key_from_env() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "bingwebsearch.yaml", FILE_YAML);

    let config = temp_env::with_var("TEST_BING_KEY", Some("k-123"), || {
        SearchConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config")
    });

    assert_eq!(config.endpoint, "https://bing.example.test/v7.0/search");
    assert_eq!(config.subscription_key.as_deref(), Some("k-123"));
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.connect_timeout_secs, 5);
    assert_eq!(config.headers.pragma.as_deref(), Some("no-cache"));
    assert_eq!(config.defaults.count, Some(10));
    assert_eq!(config.defaults.safe_search.as_deref(), Some("Moderate"));
    assert_eq!(config.save_json, Some(PathBuf::from("response.json")));
}

#[test]
#[serial]
fn missing_key_variable_leaves_key_unset() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "bingwebsearch.yaml", FILE_YAML);

    let config = temp_env::with_var_unset("TEST_BING_KEY", || {
        SearchConfigLoader::new().with_file(&p).load().unwrap()
    });

    assert_eq!(config.subscription_key, None);
}

#[test]
#[serial]
fn env_overlay_beats_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "bingwebsearch.yaml", FILE_YAML);

    let config = temp_env::with_vars(
        [
            ("BINGWEBSEARCH__TIMEOUT_SECS", Some("7")),
            ("BINGWEBSEARCH__DEFAULTS__MKT", Some("en-GB")),
            ("BINGWEBSEARCH__DEFAULTS__RESPONSE_FILTER", Some("Webpages,News")),
        ],
        || SearchConfigLoader::new().with_file(&p).load().unwrap(),
    );

    assert_eq!(config.timeout_secs, 7);
    assert_eq!(config.defaults.mkt.as_deref(), Some("en-GB"));
    assert_eq!(
        config.defaults.response_filter,
        Some(vec!["Webpages".to_string(), "News".to_string()])
    );
}

#[test]
#[serial]
fn optional_file_may_be_absent_but_required_file_may_not() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.yaml");

    let cfg = SearchConfigLoader::new()
        .with_optional_file(&missing)
        .load()
        .expect("optional file is skipped");
    assert_eq!(cfg.timeout_secs, 15);

    assert!(SearchConfigLoader::new().with_file(&missing).load().is_err());
}

#[test]
#[serial]
fn wrong_types_are_rejected() {
    let err = SearchConfigLoader::new()
        .with_yaml_str("defaults:\n  count: many\n")
        .load()
        .expect_err("count must be numeric");
    assert!(err.to_string().contains("invalid"), "{err}");
}

#[test]
#[serial]
fn digit_only_env_key_keeps_its_text() {
    let config = temp_env::with_vars(
        [
            ("BINGWEBSEARCH__SUBSCRIPTION_KEY", Some("0123456789")),
            ("BINGWEBSEARCH__HEADERS__CLIENT_ID", Some("00ff00ff")),
            ("BINGWEBSEARCH__DEFAULTS__TEXT_DECORATIONS", Some("true")),
            ("BINGWEBSEARCH__DEFAULTS__COUNT", Some("25")),
        ],
        || SearchConfigLoader::new().load().expect("numeric-looking strings load"),
    );

    assert_eq!(config.subscription_key.as_deref(), Some("0123456789"));
    assert_eq!(config.headers.client_id.as_deref(), Some("00ff00ff"));
    assert_eq!(config.defaults.text_decorations, Some(true));
    assert_eq!(config.defaults.count, Some(25));
}

#[test]
#[serial]
fn numeric_yaml_ids_load_as_text() {
    let config = SearchConfigLoader::new()
        .with_yaml_str("headers:\n  client_id: 0123456789\n  location: \"0042\"\n")
        .load()
        .expect("numeric client id loads");

    // Unquoted YAML numbers lose leading zeros in the parser; quoted ones do not.
    assert_eq!(config.headers.client_id.as_deref(), Some("123456789"));
    assert_eq!(config.headers.location.as_deref(), Some("0042"));
}

#[test]
#[serial]
fn non_numeric_env_timeout_is_rejected() {
    let err = temp_env::with_var("BINGWEBSEARCH__TIMEOUT_SECS", Some("soon"), || {
        SearchConfigLoader::new().load().expect_err("timeout must be numeric")
    });
    assert!(err.to_string().contains("invalid number"), "{err}");
}
