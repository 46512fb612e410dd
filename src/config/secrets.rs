use std::fs;
use std::path::Path;

/// Read a secret mounted as a file (e.g. `/run/secrets/...`).
///
/// Returns the trimmed contents, or `None` if the path is empty, unreadable,
/// or the file holds only whitespace.
pub fn read_secret_file(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }

    match fs::read_to_string(Path::new(path)) {
        Ok(contents) => {
            let secret = contents.trim();
            (!secret.is_empty()).then(|| secret.to_string())
        }
        Err(err) => {
            tracing::debug!(path, error = %err, "Secret file not readable");
            None
        }
    }
}

/// Load the demo JWT secret. A missing secret is not fatal here; real auth must treat it as one.
pub fn load_jwt_secret(path: Option<&str>) -> Option<String> {
    let secret = path.and_then(read_secret_file);

    if secret.is_none() {
        tracing::warn!("JWT secret not found via JWT_SECRET_FILE; demo continues");
    }

    secret
}
