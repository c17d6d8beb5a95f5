use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds. Covers the regeneration round
    /// trip, so it is generous.
    pub request_timeout_secs: u64,
    /// Maximum accepted request body (image uploads), in bytes.
    pub max_upload_bytes: usize,
    /// Directory imported image bytes are written to and served from.
    pub media_dir: PathBuf,
    /// Where the generation settings are persisted.
    pub settings_path: PathBuf,
    /// Backend endpoint used when no settings file exists yet.
    pub default_backend_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `120`                      |
    /// | `MAX_UPLOAD_MB`          | `200`                      |
    /// | `MEDIA_DIR`              | `./media`                  |
    /// | `SETTINGS_PATH`          | `./sceneqa-settings.json`  |
    /// | `GENERATION_BACKEND_URL` | `http://localhost:8000`    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_mb: usize = std::env::var("MAX_UPLOAD_MB")
            .unwrap_or_else(|_| "200".into())
            .parse()
            .expect("MAX_UPLOAD_MB must be a valid usize");

        let media_dir = PathBuf::from(std::env::var("MEDIA_DIR").unwrap_or_else(|_| "./media".into()));

        let settings_path = PathBuf::from(
            std::env::var("SETTINGS_PATH").unwrap_or_else(|_| "./sceneqa-settings.json".into()),
        );

        let default_backend_url = std::env::var("GENERATION_BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:8000".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            media_dir,
            settings_path,
            default_backend_url,
        }
    }
}
