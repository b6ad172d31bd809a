//! Server configuration from environment variables, with local defaults.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Hosting root for published projects, served at `/flutter_apps`.
    pub public_dir: PathBuf,
    /// Scratch root for build workspaces.
    pub temp_dir: PathBuf,
    pub flutter_bin: String,
    pub build_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            public_dir: PathBuf::from("public/flutter_apps"),
            temp_dir: PathBuf::from("temp_projects"),
            flutter_bin: "flutter".to_string(),
            build_timeout: Duration::from_secs(600),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_parsed("PORT").unwrap_or(defaults.port),
            public_dir: std::env::var("APPIO_PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            temp_dir: std::env::var("APPIO_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_dir),
            flutter_bin: std::env::var("FLUTTER_BIN").unwrap_or(defaults.flutter_bin),
            build_timeout: env_parsed("BUILD_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.build_timeout),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
