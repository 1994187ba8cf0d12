use std::{collections::HashMap, fs, path::Path};

use loadcache_config::{
    ConfigError, ConfigSource, LoadCacheConfig,
    models::{CAPACITY_VAR, CONFIG_JSON_VAR, CONFIG_PATH_VAR},
};
use loadcache_core::{Completion, Dimensions, FnLoader, ResourceKey};
use tempfile::TempDir;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create config dir");
    }
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn nothing_set_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let (config, source) =
        LoadCacheConfig::load_with(env_of(&[]), dir.path()).unwrap();

    assert_eq!(source, ConfigSource::Default);
    assert_eq!(config, LoadCacheConfig::default());
}

#[test]
fn env_path_takes_priority_over_inline_and_default_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "loadcache.toml", "[cache]\ncapacity = 3\n");
    let explicit = write(
        dir.path(),
        "custom.json",
        r#"{"cache": {"capacity": 12}}"#,
    );
    let path = explicit.to_str().unwrap();

    let (config, source) = LoadCacheConfig::load_with(
        env_of(&[
            (CONFIG_PATH_VAR, path),
            (CONFIG_JSON_VAR, r#"{"cache": {"capacity": 99}}"#),
        ]),
        dir.path(),
    )
    .unwrap();

    assert_eq!(source, ConfigSource::EnvPath(explicit));
    assert_eq!(config.cache.capacity, 12);
}

#[test]
fn inline_json_beats_default_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "loadcache.toml", "[cache]\ncapacity = 3\n");

    let (config, source) = LoadCacheConfig::load_with(
        env_of(&[(CONFIG_JSON_VAR, r#"{"logging": {"filter": "debug"}}"#)]),
        dir.path(),
    )
    .unwrap();

    assert_eq!(source, ConfigSource::EnvInline);
    assert_eq!(config.logging.filter, "debug");
    assert_eq!(config.cache.capacity, 50);
}

#[test]
fn default_file_is_discovered_under_config_dir() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "config/loadcache.toml",
        "[cache]\ncapacity = 7\n\n[logging]\nfilter = \"warn\"\n",
    );

    let (config, source) =
        LoadCacheConfig::load_with(env_of(&[]), dir.path()).unwrap();

    assert_eq!(source, ConfigSource::File(path));
    assert_eq!(config.cache.capacity, 7);
    assert_eq!(config.logging.filter, "warn");
}

#[test]
fn capacity_env_overrides_file_value() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "loadcache.json", r#"{"cache": {"capacity": 4}}"#);

    let (config, _) = LoadCacheConfig::load_with(
        env_of(&[(CAPACITY_VAR, "128")]),
        dir.path(),
    )
    .unwrap();

    assert_eq!(config.cache.capacity, 128);
}

#[test]
fn env_override_applies_to_an_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "explicit.toml", "[cache]\ncapacity = 9\n");
    let mut config = LoadCacheConfig::load_from_file(&path).unwrap();

    config
        .apply_env_overrides(&env_of(&[(CAPACITY_VAR, "3")]))
        .unwrap();
    assert_eq!(config.cache.capacity, 3);

    config.apply_env_overrides(&env_of(&[])).unwrap();
    assert_eq!(config.cache.capacity, 3);
}

#[test]
fn zero_capacity_is_rejected_after_override() {
    let dir = TempDir::new().unwrap();
    let err = LoadCacheConfig::load_with(
        env_of(&[(CAPACITY_VAR, "0")]),
        dir.path(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::ZeroCapacity));

    write(dir.path(), "loadcache.toml", "[cache]\ncapacity = 0\n");
    let err =
        LoadCacheConfig::load_with(env_of(&[]), dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ZeroCapacity));
}

#[test]
fn missing_env_path_reports_read_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = LoadCacheConfig::load_with(
        env_of(&[(CONFIG_PATH_VAR, missing.to_str().unwrap())]),
        dir.path(),
    )
    .unwrap_err();

    match err {
        ConfigError::Read { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn malformed_inline_json_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let err = LoadCacheConfig::load_with(
        env_of(&[(CONFIG_JSON_VAR, "{not json")]),
        dir.path(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Parse { ref origin, .. } if origin == CONFIG_JSON_VAR
    ));
}

struct Square(u32);

impl Dimensions for Square {
    fn width(&self) -> u32 {
        self.0
    }

    fn height(&self) -> u32 {
        self.0
    }
}

#[test]
fn build_coordinator_uses_configured_capacity() {
    let mut config = LoadCacheConfig::default();
    config.cache.capacity = 2;

    let coord = config
        .build_coordinator(FnLoader::new(
            |_key: &ResourceKey, done: Completion<Square>| {
                done.complete(Ok(Square(1)));
            },
        ))
        .unwrap();
    assert_eq!(coord.capacity().get(), 2);

    config.cache.capacity = 0;
    let err = config
        .build_coordinator(FnLoader::new(
            |_key: &ResourceKey, done: Completion<Square>| {
                done.complete(Ok(Square(1)));
            },
        ))
        .unwrap_err();
    assert!(matches!(err, ConfigError::ZeroCapacity));
}
