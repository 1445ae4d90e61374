use super::*;
use tempfile::TempDir;

#[test]
fn default_values() {
    let config = Config::default();

    assert_eq!(config.crawler.max_pages, 50);
    assert_eq!(config.crawler.fetch_delay_ms, 500);
    assert_eq!(config.crawler.timeout_seconds, 30);
    assert_eq!(config.chunking.chunk_size, 1000);
    assert_eq!(config.chunking.overlap, 200);
    assert_eq!(config.provider.base_url, "https://api.openai.com/v1");
    assert_eq!(config.provider.batch_size, 10);
    assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
    assert_eq!(config.search.top_k, 5);

    config.validate().expect("Defaults should validate");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let config = Config::load(dir.path()).expect("Failed to load config");
    assert_eq!(config.base_dir, dir.path());
    assert_eq!(config.crawler.max_pages, Config::default().crawler.max_pages);
}

#[test]
fn save_and_reload_round_trip() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let mut config = Config {
        base_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    config.crawler.max_pages = 25;
    config.chunking.chunk_size = 800;
    config.provider.chat_model = "other-model".to_string();

    config.save().expect("Failed to save config");
    assert!(dir.path().join("config.toml").exists());

    let loaded = Config::load(dir.path()).expect("Failed to reload config");
    assert_eq!(loaded.crawler.max_pages, 25);
    assert_eq!(loaded.chunking.chunk_size, 800);
    assert_eq!(loaded.provider.chat_model, "other-model");
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("config.toml"),
        "[crawler]\nmax_pages = 10\n",
    )
    .expect("Failed to write config");

    let config = Config::load(dir.path()).expect("Failed to load config");
    assert_eq!(config.crawler.max_pages, 10);
    assert_eq!(config.search.top_k, 5);
    assert_eq!(config.provider.batch_size, 10);
}

#[test]
fn invalid_values_are_rejected() {
    let mut config = Config::default();
    config.crawler.max_pages = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidMaxPages(0))
    ));

    let mut config = Config::default();
    config.chunking.overlap = config.chunking.chunk_size;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OverlapTooLarge(_, _))
    ));

    let mut config = Config::default();
    config.provider.batch_size = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidBatchSize(0))
    ));

    let mut config = Config::default();
    config.search.top_k = 0;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidTopK(0))));

    let mut config = Config::default();
    config.provider.base_url = "not a url".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidBaseUrl(_))
    ));

    let mut config = Config::default();
    config.provider.chat_model = "  ".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::EmptyModel)));
}

#[test]
fn invalid_file_fails_to_load() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("config.toml"),
        "[crawler]\nmax_pages = 0\n",
    )
    .expect("Failed to write config");

    assert!(Config::load(dir.path()).is_err());
}

#[test]
fn save_rejects_invalid_config() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config {
        base_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    config.search.top_k = 0;

    assert!(config.save().is_err());
    assert!(!dir.path().join("config.toml").exists());
}
