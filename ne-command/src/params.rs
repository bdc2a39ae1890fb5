//! Module arguments and the result document.
//!
//! The automation host hands the module a JSON object:
//!
//! ```json
//! {
//!   "commands": ["display version", {"command": "save", "prompt": "\\[Y/N\\]", "answer": "y"}],
//!   "wait_for": "result[0] contains HUAWEI",
//!   "match": "all",
//!   "retries": 10,
//!   "interval": 1,
//!   "provider": {"host": "192.0.2.1", "username": "admin", "password": "..."}
//! }
//! ```
//!
//! and expects a [`ModuleResult`] back.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, warn};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

use crate::command::{self, Command};
use crate::driver::{CommandExecutor, DriverBuilder, GenericDriver, ResponseSet};
use crate::error::{ConfigError, Error, ErrorKind, Result};
use crate::poll::{MatchPolicy, PollBudget, WaitFor};
use crate::transport::config::{AuthMethod, HostKeyVerification};

fn default_retries() -> u32 {
    10
}

fn default_interval() -> f64 {
    1.0
}

fn default_port() -> u16 {
    22
}

fn default_timeout() -> u64 {
    30
}

/// Arguments accepted by the module.
#[derive(Debug, Deserialize)]
pub struct ModuleArgs {
    /// Commands sent each round, in order.
    #[serde(deserialize_with = "one_or_many")]
    pub commands: Vec<Command>,

    /// Conditions the outputs must meet.
    #[serde(default, alias = "waitfor", deserialize_with = "one_or_many_or_null")]
    pub wait_for: Vec<String>,

    #[serde(default, rename = "match")]
    pub match_policy: MatchPolicy,

    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Seconds between rounds; fractions allowed.
    #[serde(default = "default_interval")]
    pub interval: f64,

    /// Dry run: only display commands are sent.
    #[serde(default, alias = "_ansible_check_mode")]
    pub check_mode: bool,

    #[serde(default)]
    pub provider: Option<ConnectionArgs>,
}

impl ModuleArgs {
    /// Parse and validate a JSON arguments document.
    pub fn from_json(json: &str) -> Result<Self> {
        let args: Self = serde_json::from_str(json).map_err(ConfigError::from)?;
        args.validate()?;
        Ok(args)
    }

    /// Read, parse and validate a JSON arguments document.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let args: Self = serde_json::from_reader(reader).map_err(ConfigError::from)?;
        args.validate()?;
        Ok(args)
    }

    fn validate(&self) -> Result<()> {
        if self.commands.is_empty() {
            return Err(ConfigError::Invalid {
                message: "commands must contain at least one command".to_string(),
            }
            .into());
        }
        if let Some(item) = self
            .commands
            .iter()
            .find(|item| item.prompt.is_some() != item.answer.is_some())
        {
            return Err(ConfigError::Invalid {
                message: format!("command '{}' needs both prompt and answer", item.command),
            }
            .into());
        }
        for item in &self.commands {
            if let Some(prompt) = &item.prompt {
                regex::bytes::Regex::new(prompt).map_err(|e| ConfigError::Invalid {
                    message: format!("invalid prompt for command '{}': {e}", item.command),
                })?;
            }
        }
        if !self.interval.is_finite() || self.interval < 0.0 {
            return Err(ConfigError::Invalid {
                message: format!("interval must be a non-negative number, got: {}", self.interval),
            }
            .into());
        }
        Ok(())
    }

    /// Retry budget from `retries` and `interval`.
    pub fn budget(&self) -> PollBudget {
        PollBudget::new(self.retries, Duration::from_secs_f64(self.interval))
    }

    /// Parse the conditions and apply check mode.
    ///
    /// Nothing touches the device here, so a malformed condition is
    /// reported before any connection is made.
    pub fn prepare(&self) -> Result<Invocation> {
        let mut commands = self.commands.clone();
        let warnings = if self.check_mode {
            command::retain_display_commands(&mut commands)
        } else {
            Vec::new()
        };
        for warning in &warnings {
            warn!("{}", warning);
        }

        let wait_for = WaitFor::parse(&self.wait_for, self.match_policy, self.budget())?;
        debug!(
            "prepared {} command(s) with {} condition(s), match {}",
            commands.len(),
            wait_for.conditions().len(),
            wait_for.policy()
        );

        Ok(Invocation {
            commands,
            wait_for,
            warnings,
        })
    }
}

/// SSH connection options (the `provider` block).
#[derive(Debug, Deserialize)]
pub struct ConnectionArgs {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "secret")]
    pub password: Option<SecretString>,

    #[serde(default, alias = "ssh_keyfile")]
    pub private_key: Option<PathBuf>,

    /// Connect and read timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub host_key_checking: HostKeyVerification,

    #[serde(default)]
    pub known_hosts: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Turn the connection options into a driver builder.
    ///
    /// A private key wins over a password; the password then unlocks the key.
    pub fn into_builder(self) -> DriverBuilder {
        let auth = match (self.private_key, self.password) {
            (Some(path), passphrase) => AuthMethod::PrivateKey { path, passphrase },
            (None, Some(password)) => AuthMethod::Password(password),
            (None, None) => AuthMethod::None,
        };

        let mut builder = DriverBuilder::new(self.host)
            .port(self.port)
            .auth(auth)
            .timeout(Duration::from_secs(self.timeout))
            .host_key_verification(self.host_key_checking);
        if let Some(username) = self.username {
            builder = builder.username(username);
        }
        if let Some(path) = self.known_hosts {
            builder = builder.known_hosts_path(path);
        }
        builder
    }

    /// Build an unconnected driver.
    pub fn into_driver(self) -> Result<GenericDriver> {
        self.into_builder().build()
    }
}

/// A validated, ready-to-run module invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    commands: Vec<Command>,
    wait_for: WaitFor,
    warnings: Vec<String>,
}

impl Invocation {
    /// Commands that will be sent, after check-mode filtering.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn wait_for(&self) -> &WaitFor {
        &self.wait_for
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Poll through `executor` and fold the outcome into a result document.
    pub async fn run<E: CommandExecutor>(&self, executor: &mut E) -> ModuleResult {
        match self.wait_for.run(&self.commands, executor).await {
            Ok(outcome) => ModuleResult::success(outcome.responses, self.warnings.clone()),
            Err(e) => ModuleResult::failure(&e, self.warnings.clone()),
        }
    }
}

/// Result document returned to the automation host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleResult {
    /// Always false; polling never changes device state by itself.
    pub changed: bool,

    pub failed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<ResponseSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout_lines: Option<Vec<Vec<String>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_conditions: Option<Vec<String>>,

    pub warnings: Vec<String>,
}

impl ModuleResult {
    /// Result for a round whose outputs satisfied the match policy.
    pub fn success(responses: ResponseSet, warnings: Vec<String>) -> Self {
        Self {
            changed: false,
            failed: false,
            msg: None,
            error: None,
            stdout_lines: Some(responses.to_lines()),
            stdout: Some(responses),
            failed_conditions: None,
            warnings,
        }
    }

    /// Result for any failure, before or during polling.
    pub fn failure(error: &Error, warnings: Vec<String>) -> Self {
        Self {
            changed: false,
            failed: true,
            msg: Some(error.to_string()),
            error: Some(error.kind()),
            stdout: None,
            stdout_lines: None,
            failed_conditions: error.failed_conditions().map(<[String]>::to_vec),
            warnings,
        }
    }

    /// Serialize as a single JSON line.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self).map_err(ConfigError::from)?)
    }
}

/// Accepts a single value or a list of values.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    OneOrMany::deserialize(deserializer).map(Vec::from)
}

fn one_or_many_or_null<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<OneOrMany<T>>::deserialize(deserializer).map(|value| value.map(Vec::from).unwrap_or_default())
}

fn secret<'de, D>(deserializer: D) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|value| value.map(SecretString::from))
}
