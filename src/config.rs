//! Server Configuration
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! environment variables, then command-line flags.
//!
//! | Setting          | Environment                 | Flag               | Default   |
//! |------------------|-----------------------------|--------------------|-----------|
//! | host             | `RELAY_HOST`                | `--host`, `-h`     | `0.0.0.0` |
//! | port             | `PORT`                      | `--port`, `-p`     | `8080`    |
//! | access token     | `RELAY_ACCESS_TOKEN`        | `--token`, `-t`    | required  |
//! | sweep interval   | `RELAY_SWEEP_INTERVAL_SECS` | `--sweep-interval` | `600`     |
//! | eviction age     | `RELAY_MAX_AGE_SECS`        | `--max-age`        | `60`      |
//!
//! Empty environment variables count as unset.

use crate::storage::{StoreConfig, DEFAULT_MAX_AGE_SECS, DEFAULT_SWEEP_INTERVAL};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

pub const ENV_PORT: &str = "PORT";
pub const ENV_HOST: &str = "RELAY_HOST";
pub const ENV_ACCESS_TOKEN: &str = "RELAY_ACCESS_TOKEN";
pub const ENV_SWEEP_INTERVAL: &str = "RELAY_SWEEP_INTERVAL_SECS";
pub const ENV_MAX_AGE: &str = "RELAY_MAX_AGE_SECS";

/// Errors that can occur while assembling the configuration.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("invalid value for {name}: {value:?}")]
    InvalidNumber { name: String, value: String },

    #[error("unknown argument: {0}")]
    UnknownArgument(String),

    #[error("no access token configured (set RELAY_ACCESS_TOKEN or pass --token)")]
    MissingAccessToken,

    #[error("sweep interval must be greater than zero")]
    ZeroSweepInterval,
}

/// What the process was asked to do.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    Run(Config),
    Help,
    Version,
}

/// Server configuration
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Shared secret for writes
    pub access_token: String,
    /// Time between background sweeps
    pub sweep_interval: Duration,
    /// Entries older than this many seconds are swept
    pub max_age: u64,
    /// True when neither `PORT` nor `--port` was given
    pub port_from_default: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            access_token: String::new(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            max_age: DEFAULT_MAX_AGE_SECS,
            port_from_default: true,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("access_token", &"<redacted>")
            .field("sweep_interval", &self.sweep_interval)
            .field("max_age", &self.max_age)
            .field("port_from_default", &self.port_from_default)
            .finish()
    }
}

impl Config {
    /// Reads the process environment and command line.
    pub fn load() -> Result<Invocation, ConfigError> {
        Self::from_env_and_args(|name| std::env::var(name).ok(), std::env::args().skip(1))
    }

    /// Builds a configuration from an environment lookup and the arguments
    /// that follow the program name.
    pub fn from_env_and_args<E, I>(env: E, args: I) -> Result<Invocation, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let lookup = |name: &str| env(name).filter(|v| !v.is_empty());

        if let Some(host) = lookup(ENV_HOST) {
            config.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.port = parse_number(ENV_PORT, &port)?;
            config.port_from_default = false;
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN) {
            config.access_token = token;
        }
        if let Some(secs) = lookup(ENV_SWEEP_INTERVAL) {
            config.sweep_interval = Duration::from_secs(parse_number(ENV_SWEEP_INTERVAL, &secs)?);
        }
        if let Some(secs) = lookup(ENV_MAX_AGE) {
            config.max_age = parse_number(ENV_MAX_AGE, &secs)?;
        }

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--host" | "-h" => config.host = next_value(&arg, &mut args)?,
                "--port" | "-p" => {
                    config.port = parse_number(&arg, &next_value(&arg, &mut args)?)?;
                    config.port_from_default = false;
                }
                "--token" | "-t" => config.access_token = next_value(&arg, &mut args)?,
                "--sweep-interval" => {
                    let secs = parse_number(&arg, &next_value(&arg, &mut args)?)?;
                    config.sweep_interval = Duration::from_secs(secs);
                }
                "--max-age" => {
                    config.max_age = parse_number(&arg, &next_value(&arg, &mut args)?)?;
                }
                "--help" => return Ok(Invocation::Help),
                "--version" | "-v" => return Ok(Invocation::Version),
                other => return Err(ConfigError::UnknownArgument(other.to_string())),
            }
        }

        if config.access_token.is_empty() {
            return Err(ConfigError::MissingAccessToken);
        }
        if config.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroSweepInterval);
        }

        Ok(Invocation::Run(config))
    }

    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The part of the configuration the store consumes.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.access_token.clone()).with_max_age(self.max_age)
    }
}

fn next_value(flag: &str, args: &mut impl Iterator<Item = String>) -> Result<String, ConfigError> {
    args.next()
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name: name.to_string(),
        value: value.to_string(),
    })
}

pub fn help_text() -> String {
    format!(
        r#"
Progress Relay - An ephemeral, authenticated key-value relay

USAGE:
    progress-relay [OPTIONS]

OPTIONS:
    -h, --host <HOST>              Host to bind to (default: {DEFAULT_HOST})
    -p, --port <PORT>              Port to listen on (default: {DEFAULT_PORT}, env: {ENV_PORT})
    -t, --token <TOKEN>            Shared secret required for writes (env: {ENV_ACCESS_TOKEN})
        --sweep-interval <SECS>    Seconds between background sweeps (default: 600)
        --max-age <SECS>           Entries older than this are swept (default: 60)
    -v, --version                  Print version information
        --help                     Print this help message

ENDPOINTS:
    /store?token=..&key=..&value=..   Publish a value
    /get?key=..                       Read the latest value
    /sweep                            Trigger a sweep (cron only)
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run(invocation: Result<Invocation, ConfigError>) -> Config {
        match invocation {
            Ok(Invocation::Run(config)) => config,
            other => panic!("expected a runnable config, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_with_token() {
        let config = run(Config::from_env_and_args(
            env_of(&[(ENV_ACCESS_TOKEN, "secret")]),
            args(&[]),
        ));

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.access_token, "secret");
        assert_eq!(config.sweep_interval, Duration::from_secs(600));
        assert_eq!(config.max_age, 60);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(
            Config::from_env_and_args(env_of(&[]), args(&[])),
            Err(ConfigError::MissingAccessToken)
        );
        assert_eq!(
            Config::from_env_and_args(env_of(&[(ENV_ACCESS_TOKEN, "")]), args(&[])),
            Err(ConfigError::MissingAccessToken)
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = run(Config::from_env_and_args(
            env_of(&[
                (ENV_PORT, "9000"),
                (ENV_HOST, "127.0.0.1"),
                (ENV_ACCESS_TOKEN, "secret"),
                (ENV_SWEEP_INTERVAL, "30"),
                (ENV_MAX_AGE, "120"),
            ]),
            args(&[]),
        ));

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.sweep_interval, Duration::from_secs(30));
        assert_eq!(config.max_age, 120);
    }

    #[test]
    fn test_empty_port_falls_back_to_default() {
        let config = run(Config::from_env_and_args(
            env_of(&[(ENV_PORT, ""), (ENV_ACCESS_TOKEN, "secret")]),
            args(&[]),
        ));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.port_from_default);
    }

    #[test]
    fn test_port_from_default_tracks_source() {
        let token = (ENV_ACCESS_TOKEN, "secret");

        let config = run(Config::from_env_and_args(env_of(&[token]), args(&[])));
        assert!(config.port_from_default);

        let config = run(Config::from_env_and_args(
            env_of(&[token, (ENV_PORT, "9000")]),
            args(&[]),
        ));
        assert!(!config.port_from_default);

        // Passing the default value explicitly still counts as a choice.
        let config = run(Config::from_env_and_args(
            env_of(&[token]),
            args(&["--port", "8080"]),
        ));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!config.port_from_default);
    }

    #[test]
    fn test_args_override_env() {
        let config = run(Config::from_env_and_args(
            env_of(&[(ENV_PORT, "9000"), (ENV_ACCESS_TOKEN, "from-env")]),
            args(&[
                "--port",
                "9100",
                "-t",
                "from-args",
                "--sweep-interval",
                "5",
                "--max-age",
                "10",
                "-h",
                "localhost",
            ]),
        ));

        assert_eq!(config.port, 9100);
        assert_eq!(config.access_token, "from-args");
        assert_eq!(config.sweep_interval, Duration::from_secs(5));
        assert_eq!(config.max_age, 10);
        assert_eq!(config.host, "localhost");
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(
            Config::from_env_and_args(env_of(&[]), args(&["--help"])),
            Ok(Invocation::Help)
        );
        assert_eq!(
            Config::from_env_and_args(env_of(&[]), args(&["-v"])),
            Ok(Invocation::Version)
        );
    }

    #[test]
    fn test_bad_arguments() {
        let env = || env_of(&[(ENV_ACCESS_TOKEN, "secret")]);

        assert_eq!(
            Config::from_env_and_args(env(), args(&["--port"])),
            Err(ConfigError::MissingValue("--port".to_string()))
        );
        assert_eq!(
            Config::from_env_and_args(env(), args(&["--port", "http"])),
            Err(ConfigError::InvalidNumber {
                name: "--port".to_string(),
                value: "http".to_string(),
            })
        );
        assert_eq!(
            Config::from_env_and_args(env(), args(&["--verbose"])),
            Err(ConfigError::UnknownArgument("--verbose".to_string()))
        );
        assert_eq!(
            Config::from_env_and_args(env(), args(&["--sweep-interval", "0"])),
            Err(ConfigError::ZeroSweepInterval)
        );
    }

    #[test]
    fn test_invalid_env_number() {
        assert_eq!(
            Config::from_env_and_args(
                env_of(&[(ENV_PORT, "99999"), (ENV_ACCESS_TOKEN, "secret")]),
                args(&[]),
            ),
            Err(ConfigError::InvalidNumber {
                name: ENV_PORT.to_string(),
                value: "99999".to_string(),
            })
        );
    }

    #[test]
    fn test_store_config_and_debug() {
        let config = run(Config::from_env_and_args(
            env_of(&[(ENV_ACCESS_TOKEN, "secret"), (ENV_MAX_AGE, "90")]),
            args(&[]),
        ));

        let store_config = config.store_config();
        assert_eq!(store_config.access_token, "secret");
        assert_eq!(store_config.max_age, 90);
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
