use stack_sample::config::{load_jwt_secret, read_secret_file, Config};
use std::fs;

fn temp_secret(contents: &str) -> String {
    let path = std::env::temp_dir().join(format!("secret_{}", uuid::Uuid::new_v4()));
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn secret_file_contents_are_trimmed() {
    let path = temp_secret("  s3cr3t\n");

    assert_eq!(read_secret_file(&path), Some("s3cr3t".to_string()));

    fs::remove_file(path).ok();
}

#[test]
fn missing_or_blank_secret_is_none() {
    assert_eq!(read_secret_file(""), None);
    assert_eq!(read_secret_file("/definitely/not/here"), None);

    let blank = temp_secret("\n\n");
    assert_eq!(read_secret_file(&blank), None);
    fs::remove_file(blank).ok();
}

#[test]
fn missing_jwt_secret_is_not_fatal() {
    assert_eq!(load_jwt_secret(None), None);

    assert_eq!(load_jwt_secret(Some("/definitely/not/here")), None);

    let config = Config {
        jwt_secret_file: Some("/definitely/not/here".to_string()),
        ..Config::default()
    };
    assert!(stack_sample::create_app(&config).is_ok());
}

#[test]
fn jwt_secret_is_loaded_from_file() {
    let path = temp_secret("jwt-signing-key");

    assert_eq!(
        load_jwt_secret(Some(&path)),
        Some("jwt-signing-key".to_string())
    );

    fs::remove_file(path).ok();
}
