//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Frontend serving mode configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendMode {
    /// Proxy requests to a development server (e.g., Dioxus dx serve).
    Proxy { target: String },
    /// Serve the built client from a directory.
    Static { dir: String },
    /// No frontend serving - API only.
    Disabled,
}

impl FrontendMode {
    /// Parse frontend mode from environment variables.
    ///
    /// Environment variables:
    /// - `LTDK_FRONTEND_MODE`: "proxy" | "static" | "disabled" (default: "disabled")
    /// - `LTDK_PROXY_TARGET`: Target URL for proxy mode (default: "http://localhost:8081")
    /// - `LTDK_STATIC_DIR`: Directory for static mode (default: "./public")
    pub fn from_env() -> Self {
        let mode = std::env::var("LTDK_FRONTEND_MODE")
            .unwrap_or_else(|_| "disabled".to_string())
            .to_lowercase();

        match mode.as_str() {
            "proxy" => {
                let target = std::env::var("LTDK_PROXY_TARGET")
                    .unwrap_or_else(|_| "http://localhost:8081".to_string());
                FrontendMode::Proxy { target }
            }
            "static" => {
                let dir = std::env::var("LTDK_STATIC_DIR").unwrap_or_else(|_| "./public".to_string());
                FrontendMode::Static { dir }
            }
            _ => FrontendMode::Disabled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Aurora data directory. `None` keeps everything in memory.
    pub db_path: Option<PathBuf>,
    /// JSON file of `{collection: {id: fields}}` written at startup.
    pub seed_file: Option<PathBuf>,
    pub base_url: String,
    pub frontend: FrontendMode,
}

impl ServerConfig {
    /// Environment variables:
    /// - `LTDK_BIND_ADDR` (default: "0.0.0.0:8080")
    /// - `LTDK_DB_PATH` (default: "ltdk_db_data"; "memory" disables persistence)
    /// - `LTDK_SEED_FILE` (optional)
    /// - `LTDK_BASE_URL` (default: "http://localhost:8080")
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("LTDK_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid LTDK_BIND_ADDR: {e}"))?;

        let db_path = match std::env::var("LTDK_DB_PATH") {
            Ok(path) if path.eq_ignore_ascii_case("memory") => None,
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => Some(PathBuf::from("ltdk_db_data")),
        };

        Ok(Self {
            bind_addr,
            db_path,
            seed_file: std::env::var("LTDK_SEED_FILE").ok().map(PathBuf::from),
            base_url: std::env::var("LTDK_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
            frontend: FrontendMode::from_env(),
        })
    }
}
