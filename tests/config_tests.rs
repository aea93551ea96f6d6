//! Tests for environment-driven configuration.
//!
//! These mutate the process environment, so every test takes the same lock
//! and restores the variables it touched.

use std::sync::Mutex;

use roverd::config::{Config, ConfigError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "ROVERCODE_WEB_URL",
    "ROVERCODE_WEB_USER_NAME",
    "ROVERCODE_WEB_USER_PASS",
    "ROVER_NAME",
    "ROVERD_WEB_PORT",
    "ROVERD_STORAGE_DIR",
];

fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
    let _guard = ENV_LOCK.lock().unwrap();
    for var in VARS {
        std::env::remove_var(var);
    }
    for (name, value) in vars {
        std::env::set_var(name, value);
    }
    f();
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn minimal_env_uses_defaults() {
    with_env(
        &[
            ("ROVERCODE_WEB_USER_NAME", "pathfinder"),
            ("ROVERCODE_WEB_USER_PASS", "hunter2"),
        ],
        || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.controller.base_url, "https://rovercode.com/");
            assert_eq!(config.controller.username, "pathfinder");
            assert_eq!(config.rover.name, "curiosity-rover");
            assert_eq!(config.web.port, 8080);
            assert_eq!(config.storage_dir, std::path::PathBuf::from("saved-bds"));
        },
    );
}

#[test]
fn missing_username_is_an_error() {
    with_env(&[("ROVERCODE_WEB_USER_PASS", "hunter2")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingVar("ROVERCODE_WEB_USER_NAME"))
        ));
    });
}

#[test]
fn empty_password_counts_as_missing() {
    with_env(
        &[
            ("ROVERCODE_WEB_USER_NAME", "pathfinder"),
            ("ROVERCODE_WEB_USER_PASS", ""),
        ],
        || {
            assert!(matches!(
                Config::from_env(),
                Err(ConfigError::MissingVar("ROVERCODE_WEB_USER_PASS"))
            ));
        },
    );
}

#[test]
fn overrides_are_honored() {
    with_env(
        &[
            ("ROVERCODE_WEB_URL", "http://localhost:8000"),
            ("ROVERCODE_WEB_USER_NAME", "pathfinder"),
            ("ROVERCODE_WEB_USER_PASS", "hunter2"),
            ("ROVER_NAME", "sojourner"),
            ("ROVERD_WEB_PORT", "9090"),
            ("ROVERD_STORAGE_DIR", "/tmp/diagrams"),
        ],
        || {
            let config = Config::from_env().unwrap();
            // The base URL is normalized with a trailing slash.
            assert_eq!(config.controller.base_url, "http://localhost:8000/");
            assert_eq!(config.rover.name, "sojourner");
            assert_eq!(config.web.port, 9090);
            assert_eq!(
                config.storage_dir,
                std::path::PathBuf::from("/tmp/diagrams")
            );
        },
    );
}

#[test]
fn bad_port_is_an_error() {
    with_env(
        &[
            ("ROVERCODE_WEB_USER_NAME", "pathfinder"),
            ("ROVERCODE_WEB_USER_PASS", "hunter2"),
            ("ROVERD_WEB_PORT", "not-a-port"),
        ],
        || {
            assert!(matches!(
                Config::from_env(),
                Err(ConfigError::InvalidVar {
                    name: "ROVERD_WEB_PORT",
                    ..
                })
            ));
        },
    );
}

#[test]
fn derived_urls_follow_the_base() {
    with_env(
        &[
            ("ROVERCODE_WEB_URL", "http://localhost:8000/"),
            ("ROVERCODE_WEB_USER_NAME", "pathfinder"),
            ("ROVERCODE_WEB_USER_PASS", "hunter2"),
        ],
        || {
            let config = Config::from_env().unwrap();
            assert_eq!(
                config.controller.registry_url(),
                "http://localhost:8000/mission-control/rovers"
            );
            assert_eq!(
                config.controller.login_url(),
                "http://localhost:8000/accounts/login"
            );
        },
    );
}
