//! Error types for ne-command.

use std::io;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Main error type for ne-command operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A `wait_for` condition could not be parsed.
    #[error("Invalid condition: {0}")]
    Condition(#[from] ConditionError),

    /// A parsed condition could not be applied to the responses.
    #[error("Unable to apply conditional to result: {0}")]
    Eval(#[from] EvalError),

    /// The retry budget ran out with conditions still unsatisfied.
    #[error("One or more conditional statements have not been satisfied")]
    RetryExhausted {
        /// Raw text of every condition that was still outstanding.
        failed_conditions: Vec<String>,
    },

    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Module argument errors
    #[error("Invalid arguments: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Map this error onto the kind reported to the automation host.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Condition(_) | Error::Eval(_) => ErrorKind::InvalidCondition,
            Error::RetryExhausted { .. } => ErrorKind::RetryExhausted,
            Error::Transport(_) | Error::Channel(_) | Error::Driver(_) => {
                ErrorKind::ExecutionFailure
            }
            Error::Config(_) => ErrorKind::InvalidArguments,
        }
    }

    /// Conditions left unsatisfied, if this is a retry-exhaustion failure.
    pub fn failed_conditions(&self) -> Option<&[String]> {
        match self {
            Error::RetryExhausted { failed_conditions } => Some(failed_conditions),
            _ => None,
        }
    }
}

/// Failure kinds as seen by the caller of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Malformed condition, or a condition that cannot apply to the output.
    InvalidCondition,
    /// The command batch could not be executed.
    ExecutionFailure,
    /// Every round ran without satisfying the match policy.
    RetryExhausted,
    /// The module arguments were rejected before anything ran.
    InvalidArguments,
}

/// Condition parse errors.
#[derive(Error, Debug)]
pub enum ConditionError {
    /// The condition text could not be split into tokens.
    #[error("failed to parse conditional '{raw}': {reason}")]
    Syntax { raw: String, reason: String },

    /// The operator token is not one we know.
    #[error("unknown operator '{operator}' in conditional '{raw}'")]
    UnknownOperator { raw: String, operator: String },

    /// The left-hand side does not reference a response.
    #[error("unsupported key '{key}' in conditional '{raw}'")]
    UnsupportedKey { raw: String, key: String },

    /// A numeric operator was given a non-numeric value.
    #[error("operator '{operator}' requires a numeric value in conditional '{raw}'")]
    NonNumericOperand { raw: String, operator: String },

    /// The value of a `matches` conditional is not a valid regex.
    #[error("invalid pattern in conditional '{raw}': {source}")]
    InvalidPattern {
        raw: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while applying a parsed condition to a response set.
#[derive(Error, Debug)]
pub enum EvalError {
    /// The condition references a response that does not exist.
    #[error("'{raw}' references result[{index}] but only {len} response(s) are available")]
    IndexOutOfRange { raw: String, index: usize, len: usize },

    /// A numeric comparison was attempted on non-numeric output.
    #[error("'{raw}' compares numerically but the output '{value}' is not a number")]
    NotNumeric { raw: String, value: String },
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// The host is not present in known_hosts and strict checking is on.
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// The host key differs from the one recorded in known_hosts.
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written.
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (pattern matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Driver layer errors (command execution).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Driver not connected
    #[error("Driver not connected - call open() first")]
    NotConnected,

    /// Driver already connected
    #[error("Driver already connected")]
    AlreadyConnected,

    /// The device reported an error for a command.
    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// The executor returned a different number of outputs than commands.
    #[error("Expected {expected} response(s) but received {actual}")]
    ResponseCountMismatch { expected: usize, actual: usize },
}

/// Module argument errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The arguments document is not valid JSON for this module.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// The arguments file could not be read.
    #[error("failed to read arguments: {0}")]
    Io(#[from] io::Error),

    /// A required option is missing or a value is out of range.
    #[error("{message}")]
    Invalid { message: String },
}

/// Result type alias using ne-command's Error.
pub type Result<T> = std::result::Result<T, Error>;
