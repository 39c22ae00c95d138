use super::*;

#[test]
fn test_default_config_path_is_yaml() {
    let path = default_config_path();
    assert!(path.ends_with("config.yaml"));
}

#[test]
fn test_init_writes_loadable_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    init_config(&path, false).unwrap();

    let config = load_config(&path, true).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "remote:\n  enabled: true\n").unwrap();

    assert!(init_config(&path, false).is_err());
    assert!(load_config(&path, true).unwrap().remote.enabled);

    init_config(&path, true).unwrap();
    assert!(!load_config(&path, true).unwrap().remote.enabled);
}

#[test]
fn test_missing_default_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");

    assert_eq!(load_config(&path, false).unwrap(), Config::default());
    assert!(load_config(&path, true).is_err());
}

#[test]
fn test_default_yaml_mentions_every_section() {
    let yaml = default_config_yaml().unwrap();

    assert!(yaml.contains("remote:"));
    assert!(yaml.contains("pull:"));
    assert!(yaml.contains("ecr:"));
    assert!(yaml.contains("registry_ids"));
}
