use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use airprep_core::config::{
    split_list, ConfigError, PipelineConfig, DEFAULT_COLUMNS_TO_DROP, DEFAULT_SOURCE_PREFIX,
};
use tempfile::{tempdir, NamedTempFile};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn defaults_match_the_data_store_layout() {
    let config = PipelineConfig::default();

    assert_eq!(config.store_root, PathBuf::from("./data"));
    assert_eq!(config.source_prefix, DEFAULT_SOURCE_PREFIX);
    assert_eq!(config.clean_input_key, config.stacked_key);
    assert_eq!(config.columns_to_drop, DEFAULT_COLUMNS_TO_DROP);
    assert!(config.validate().is_ok());
}

#[test]
fn toml_overrides_only_listed_fields() {
    let config = PipelineConfig::from_toml_str(
        r#"
        container = "air-quality"
        columns_to_drop = ["co", "no"]
        "#,
    )
    .expect("valid toml");

    assert_eq!(config.container, "air-quality");
    assert_eq!(config.columns_to_drop, ["co", "no"]);
    assert_eq!(config.source_prefix, DEFAULT_SOURCE_PREFIX);
}

#[test]
fn environment_overrides_file_values() {
    let mut config = PipelineConfig::from_toml_str(r#"container = "from-file""#).expect("toml");

    config.apply_env(env(&[
        ("DATA_BUCKET_NAME", "legacy-bucket"),
        ("AIRPREP_COLUMNS_TO_DROP", " co, so2 ,,"),
        ("TEST_DATA_RM_COL_INPUT", "train/stacked.zip"),
        ("AIRPREP_STORE_ROOT", "   "),
    ]));

    assert_eq!(config.container, "legacy-bucket");
    assert_eq!(config.columns_to_drop, ["co", "so2"]);
    assert_eq!(config.clean_input_key, "train/stacked.zip");
    assert_eq!(config.store_root, PathBuf::from("./data"));
}

#[test]
fn primary_variable_wins_over_alias() {
    let mut config = PipelineConfig::default();

    config.apply_env(env(&[
        ("AIRPREP_CONTAINER", "primary"),
        ("DATA_BUCKET_NAME", "alias"),
    ]));

    assert_eq!(config.container, "primary");
}

#[test]
fn empty_container_is_rejected() {
    let config = PipelineConfig::from_toml_str(r#"container = """#).expect("toml");

    assert!(matches!(
        config.validate(),
        Err(ConfigError::Empty("container"))
    ));
}

#[test]
fn invalid_toml_file_is_a_parse_error() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "container = [unterminated").expect("write config");

    let err = PipelineConfig::from_toml_file(file.path()).expect_err("should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn missing_config_file_is_a_read_error() {
    let dir = tempdir().expect("temp dir");

    assert!(matches!(
        PipelineConfig::from_toml_file(&dir.path().join("absent.toml")),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn toml_file_values_are_read() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "container = \"from-file\"").expect("write config");
    writeln!(file, "source_prefix = \"raw/csv\"").expect("write config");

    let config = PipelineConfig::from_toml_file(file.path()).expect("valid config");

    assert_eq!(config.container, "from-file");
    assert_eq!(config.source_prefix, "raw/csv");
}

#[test]
fn split_list_trims_and_skips_blanks() {
    assert_eq!(split_list("a, b,,c "), ["a", "b", "c"]);
    assert!(split_list(" , ").is_empty());
}
