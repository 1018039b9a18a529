use super::*;
use serial_test::serial;
use tempfile::TempDir;

fn clear_env() {
    std::env::remove_var(PORT_ENV);
    std::env::remove_var(KEEPALIVE_ENV);
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings::load(&temp_dir.path().join("settings.yaml")).unwrap();

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.port, 0);
    assert!(settings.secret_key_in_path);
    assert_eq!(settings.keep_alive_seconds, 30);
    assert_eq!(settings.explicit_port(), None);
}

#[test]
#[serial]
fn test_partial_file_fills_defaults() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.yaml");
    std::fs::write(&path, "port: 8123\n").unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.explicit_port(), Some(8123));
    assert!(settings.secret_key_in_path);
    assert_eq!(settings.keep_alive_window(), Duration::from_secs(30));
}

#[test]
#[serial]
fn test_empty_file_yields_defaults() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.yaml");
    std::fs::write(&path, "\n").unwrap();

    assert_eq!(Settings::load(&path).unwrap(), Settings::default());
}

#[test]
#[serial]
fn test_full_file() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.yaml");
    std::fs::write(
        &path,
        "port: 9001\nsecret_key_in_path: false\nkeep_alive_seconds: 5\n",
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.port, 9001);
    assert!(!settings.secret_key_in_path);
    assert_eq!(settings.keep_alive_window(), Duration::from_secs(5));
}

#[test]
#[serial]
fn test_zero_keepalive_rejected() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.yaml");
    std::fs::write(&path, "keep_alive_seconds: 0\n").unwrap();

    let err = Settings::load(&path).unwrap_err();
    assert!(err.to_string().contains("keep_alive_seconds"));
}

#[test]
fn test_negative_keepalive_rejected() {
    let settings = Settings {
        keep_alive_seconds: -3,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
#[serial]
fn test_invalid_yaml_reports_path() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.yaml");
    std::fs::write(&path, "port: [not a port\n").unwrap();

    let err = Settings::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("settings.yaml"));
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.yaml");
    std::fs::write(&path, "port: 9001\nkeep_alive_seconds: 5\n").unwrap();

    std::env::set_var(PORT_ENV, "8555");
    std::env::set_var(KEEPALIVE_ENV, "12");
    let settings = Settings::load(&path);
    clear_env();

    let settings = settings.unwrap();
    assert_eq!(settings.port, 8555);
    assert_eq!(settings.keep_alive_seconds, 12);
}

#[test]
#[serial]
fn test_env_override_is_validated() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    std::env::set_var(KEEPALIVE_ENV, "0");
    let result = Settings::load(&temp_dir.path().join("settings.yaml"));
    clear_env();

    assert!(result.is_err());
}
