//! Runtime configuration for the rover service.
//!
//! Configuration is read from the process environment (a `.env` file is
//! loaded by the binary before this runs). Credentials for the remote
//! controller are required; the process refuses to start without them.
//!
//! # Environment variables
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `ROVERCODE_WEB_URL` | no | `https://rovercode.com/` |
//! | `ROVERCODE_WEB_USER_NAME` | yes | |
//! | `ROVERCODE_WEB_USER_PASS` | yes | |
//! | `ROVER_NAME` | no | `curiosity-rover` |
//! | `ROVERD_WEB_PORT` | no | `8080` |
//! | `ROVERD_STORAGE_DIR` | no | `saved-bds` |
//!
//! # Example
//!
//! ```rust
//! use roverd::config::{Config, ControllerConfig};
//!
//! let config = Config::new(ControllerConfig::new(
//!     "https://rovercode.com/",
//!     "operator",
//!     "secret",
//! ));
//! assert_eq!(
//!     config.controller.registry_url(),
//!     "https://rovercode.com/mission-control/rovers"
//! );
//! ```

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while assembling configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// An environment variable holds a value that cannot be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// The offending value.
        value: String,
    },
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Remote controller connection and credentials.
    pub controller: ControllerConfig,
    /// Local rover identity and hardware timing.
    pub rover: RoverConfig,
    /// Local web API configuration.
    pub web: WebConfig,
    /// Block-diagram storage location.
    pub storage_dir: PathBuf,
}

impl Config {
    /// Create a configuration with defaults everywhere except the
    /// controller section, which has no safe default for credentials.
    pub fn new(controller: ControllerConfig) -> Self {
        Self {
            controller,
            rover: RoverConfig::default(),
            web: WebConfig::default(),
            storage_dir: PathBuf::from("saved-bds"),
        }
    }

    /// Assemble the configuration from the process environment.
    ///
    /// Missing credentials are an error; everything else falls back to the
    /// documented defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("ROVERCODE_WEB_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "https://rovercode.com/".to_string());
        let username = require_env("ROVERCODE_WEB_USER_NAME")?;
        let password = require_env("ROVERCODE_WEB_USER_PASS")?;

        let mut config = Self::new(ControllerConfig::new(&base_url, &username, &password));

        if let Ok(name) = std::env::var("ROVER_NAME") {
            if !name.is_empty() {
                config.rover.name = name;
            }
        }
        if let Ok(port) = std::env::var("ROVERD_WEB_PORT") {
            config.web.port = port.parse().map_err(|_| ConfigError::InvalidVar {
                name: "ROVERD_WEB_PORT",
                value: port.clone(),
            })?;
        }
        if let Ok(dir) = std::env::var("ROVERD_STORAGE_DIR") {
            if !dir.is_empty() {
                config.storage_dir = PathBuf::from(dir);
            }
        }

        Ok(config)
    }

    /// Set the rover section.
    pub fn with_rover(mut self, rover: RoverConfig) -> Self {
        self.rover = rover;
        self
    }

    /// Set the web section.
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set the storage directory.
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

// ============================================================================
// Controller Config
// ============================================================================

/// Remote controller connection settings.
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Base URL of the remote controller, always with a trailing slash.
    pub base_url: String,
    /// Operator login name.
    pub username: String,
    /// Operator password.
    pub password: String,
    /// Interval between registration/check-in cycles.
    pub checkin_interval: Duration,
}

impl ControllerConfig {
    /// Create controller settings; a missing trailing slash on the base URL
    /// is added.
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            username: username.to_string(),
            password: password.to_string(),
            checkin_interval: Duration::from_secs(3),
        }
    }

    /// Set the check-in interval.
    pub fn with_checkin_interval(mut self, interval: Duration) -> Self {
        self.checkin_interval = interval;
        self
    }

    /// URL of the rover registry collection.
    pub fn registry_url(&self) -> String {
        format!("{}mission-control/rovers", self.base_url)
    }

    /// URL of the login endpoint.
    pub fn login_url(&self) -> String {
        format!("{}accounts/login", self.base_url)
    }
}

// ============================================================================
// Rover Config
// ============================================================================

/// Local rover identity and hardware timing.
#[derive(Clone, Debug)]
pub struct RoverConfig {
    /// Name this rover registers under.
    pub name: String,
    /// Interval between sensor polls.
    pub poll_interval: Duration,
    /// Software-PWM frequency used when starting a motor pin.
    pub pwm_frequency_hz: f32,
}

impl Default for RoverConfig {
    fn default() -> Self {
        Self {
            name: "curiosity-rover".to_string(),
            poll_interval: Duration::from_millis(200),
            pwm_frequency_hz: 100.0,
        }
    }
}

impl RoverConfig {
    /// Set the rover name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the sensor poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Local web API configuration.
#[derive(Clone, Debug)]
pub struct WebConfig {
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable CORS for all origins.
    pub cors_permissive: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_permissive: true,
        }
    }
}

impl WebConfig {
    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode.
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_urls() {
        let controller = ControllerConfig::new("https://rovercode.com/", "user", "pass");
        assert_eq!(
            controller.registry_url(),
            "https://rovercode.com/mission-control/rovers"
        );
        assert_eq!(controller.login_url(), "https://rovercode.com/accounts/login");
    }

    #[test]
    fn base_url_trailing_slash_added() {
        let controller = ControllerConfig::new("http://localhost:8000", "user", "pass");
        assert_eq!(controller.base_url, "http://localhost:8000/");
    }

    #[test]
    fn default_sections() {
        let config = Config::new(ControllerConfig::new("http://x/", "u", "p"));
        assert_eq!(config.rover.name, "curiosity-rover");
        assert_eq!(config.rover.poll_interval, Duration::from_millis(200));
        assert_eq!(config.rover.pwm_frequency_hz, 100.0);
        assert_eq!(config.controller.checkin_interval, Duration::from_secs(3));
        assert_eq!(config.web.port, 8080);
        assert!(config.web.cors_permissive);
        assert_eq!(config.storage_dir, PathBuf::from("saved-bds"));
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new(ControllerConfig::new("http://x/", "u", "p"))
            .with_rover(RoverConfig::default().with_name("sojourner"))
            .with_web(WebConfig::default().with_port(3000).with_cors(false))
            .with_storage_dir("/tmp/diagrams");

        assert_eq!(config.rover.name, "sojourner");
        assert_eq!(config.web.port, 3000);
        assert!(!config.web.cors_permissive);
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/diagrams"));
    }

    // Environment-variable behavior is covered in tests/config_tests.rs to
    // avoid env races between parallel unit tests.
}
