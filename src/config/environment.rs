use std::env;
use std::time::Duration;

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub service_name: String,
    pub jwt_secret_file: Option<String>,
    pub body_limit_bytes: usize,
    pub shutdown_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            service_name: "stack-sample".to_string(),
            jwt_secret_file: None,
            body_limit_bytes: 1024 * 1024,
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| format!("PORT must be a valid port number, got {raw:?}"))?,
            None => defaults.port,
        };

        let service_name = lookup("SERVICE_NAME").unwrap_or(defaults.service_name);

        let jwt_secret_file = lookup("JWT_SECRET_FILE").filter(|path| !path.trim().is_empty());

        let body_limit_bytes = match lookup("BODY_LIMIT_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("BODY_LIMIT_BYTES must be a byte count, got {raw:?}"))?,
            None => defaults.body_limit_bytes,
        };

        let shutdown_timeout = match lookup("SHUTDOWN_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| format!("SHUTDOWN_TIMEOUT_SECS must be whole seconds, got {raw:?}"))?,
            None => defaults.shutdown_timeout,
        };

        Ok(Self {
            host,
            port,
            service_name,
            jwt_secret_file,
            body_limit_bytes,
            shutdown_timeout,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
