/*!
 * Tests for application configuration
 */

use anyhow::Result;
use std::path::PathBuf;
use subnotes::app_config::{Config, LogLevel, ProviderConfig, ProviderKind, SeasonConfig};

use crate::common;

fn local_config() -> Config {
    let mut config = Config::default();
    config.provider = ProviderConfig::new(ProviderKind::LMStudio);
    config
}

/// Test that the defaults match the documented pipeline settings
#[test]
fn test_default_config_shouldUsePipelineDefaults() {
    let config = Config::default();

    assert_eq!(config.target_language, "ru");
    assert_eq!(config.provider.kind, ProviderKind::OpenAI);
    assert_eq!(config.provider.get_model(), "gpt-4o");
    assert_eq!(config.annotation.extraction_max_tokens, 120);
    assert_eq!(config.annotation.classification_max_tokens, 20);
    assert_eq!(config.annotation.temperature, 0.0);
    assert_eq!(config.annotation.categories.len(), 15);
    assert_eq!(config.processing.percentage, 100.0);
    assert_eq!(config.processing.sheet_name, "Sheet1");
    assert_eq!(config.cost.rate_per_million_tokens, 1.25);
    assert_eq!(config.cost.token_multiplier, 2.0);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test that a saved config loads back unchanged
#[test]
fn test_save_and_load_withSeasons_shouldPreserveValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = local_config();
    config.seasons = vec![
        SeasonConfig::new("extracted_srt/s1", "Season 1"),
        SeasonConfig::new("extracted_srt/s2", "Season 2"),
    ];
    config.processing.percentage = 25.0;
    config.annotation.strict_categories = true;
    config.save(&path)?;

    let loaded = Config::load(&path)?;
    assert_eq!(loaded.provider.kind, ProviderKind::LMStudio);
    assert_eq!(loaded.seasons, config.seasons);
    assert_eq!(loaded.processing.percentage, 25.0);
    assert!(loaded.annotation.strict_categories);
    Ok(())
}

/// Test that missing sections fall back to defaults
#[test]
fn test_load_withPartialJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "target_language": "fr",
            "provider": { "type": "anthropic", "api_key": "key" },
            "seasons": [{ "folder": "s1", "name": "Season 1" }]
        }"#,
    )?;

    let config = Config::load(&path)?;
    assert_eq!(config.target_language, "fr");
    assert_eq!(config.provider.kind, ProviderKind::Anthropic);
    assert_eq!(config.provider.get_model(), "claude-3-5-haiku-latest");
    assert_eq!(config.provider.timeout_secs, 60);
    assert_eq!(config.annotation.concurrent_requests, 4);
    assert_eq!(config.seasons[0].table_path(), PathBuf::from("s1/s1_notes.xlsx"));
    assert!(config.validate().is_ok());
    Ok(())
}

/// Test that malformed JSON is reported
#[test]
fn test_load_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;
    assert!(Config::load(&path).is_err());
    Ok(())
}

/// Test that validation rejects an empty vocabulary and unknown languages
#[test]
fn test_validate_withInvalidValues_shouldFail() {
    let mut config = local_config();
    config.annotation.categories = vec!["  ".to_string()];
    assert!(config.validate().is_err());

    let mut config = local_config();
    config.target_language = "zz".to_string();
    assert!(config.validate().is_err());

    let mut config = local_config();
    config.cost.rate_per_million_tokens = -1.0;
    assert!(config.validate().is_err());
}

/// Test that an explicit output path overrides the derived table path
#[test]
fn test_season_table_path_withOverride_shouldUseOverride() {
    let mut season = SeasonConfig::new("s1", "Season 1");
    season.output = Some(PathBuf::from("out/s1.xlsx"));
    assert_eq!(season.table_path(), PathBuf::from("out/s1.xlsx"));
}
