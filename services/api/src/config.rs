//! Service configuration loaded from environment variables

use anyhow::Result;
use std::{net::SocketAddr, path::PathBuf};

/// Default upload limit: 10 MiB
const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application name shown on the index page and health endpoints
    pub app_name: String,
    /// Application version
    pub app_version: String,
    /// Debug mode flag
    pub debug: bool,
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Upload settings
    pub upload: UploadConfig,
}

/// File upload configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Maximum accepted file size in bytes
    pub max_file_size: usize,
    /// Directory uploaded files are written to
    pub upload_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Text Summarization API".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            debug: false,
            host: "0.0.0.0".to_string(),
            port: 8000,
            upload: UploadConfig::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `APP_NAME`: Application name (default: "Text Summarization API")
    /// - `APP_VERSION`: Application version (default: crate version)
    /// - `APP_DEBUG`: Debug mode (default: false)
    /// - `HOST`: Bind host (default: 0.0.0.0)
    /// - `PORT`: Bind port (default: 8000)
    /// - `MAX_FILE_SIZE`: Upload size limit in bytes (default: 10485760)
    /// - `UPLOAD_DIR`: Upload directory (default: uploads)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let app_name = std::env::var("APP_NAME").unwrap_or(defaults.app_name);
        let app_version = std::env::var("APP_VERSION").unwrap_or(defaults.app_version);

        let debug = std::env::var("APP_DEBUG")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let host = std::env::var("HOST").unwrap_or(defaults.host);

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .unwrap_or(8000);

        let max_file_size = std::env::var("MAX_FILE_SIZE")
            .unwrap_or_else(|_| DEFAULT_MAX_FILE_SIZE.to_string())
            .parse()
            .unwrap_or(DEFAULT_MAX_FILE_SIZE);

        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload.upload_dir);

        Ok(AppConfig {
            app_name,
            app_version,
            debug,
            host,
            port,
            upload: UploadConfig {
                max_file_size,
                upload_dir,
            },
        })
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "APP_NAME",
        "APP_VERSION",
        "APP_DEBUG",
        "HOST",
        "PORT",
        "MAX_FILE_SIZE",
        "UPLOAD_DIR",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_app_config_defaults() {
        clear_env();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.app_name, "Text Summarization API");
        assert!(!config.debug);
        assert_eq!(config.port, 8000);
        assert_eq!(config.upload.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.upload.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.bind_addr().unwrap().port(), 8000);
    }

    #[test]
    #[serial]
    fn test_app_config_from_env_with_custom_values() {
        clear_env();
        unsafe {
            std::env::set_var("APP_NAME", "Summaries");
            std::env::set_var("APP_DEBUG", "true");
            std::env::set_var("PORT", "9090");
            std::env::set_var("MAX_FILE_SIZE", "oops");
            std::env::set_var("UPLOAD_DIR", "/tmp/uploads");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.app_name, "Summaries");
        assert!(config.debug);
        assert_eq!(config.port, 9090);
        assert_eq!(config.upload.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.upload.upload_dir, PathBuf::from("/tmp/uploads"));

        clear_env();
    }
}
