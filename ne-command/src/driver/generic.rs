//! SSH-backed driver for CLI devices.

use std::time::Instant;

use log::{debug, info, warn};
use regex::bytes::Regex;

use super::CommandExecutor;
use super::response::{Response, ResponseSet};
use crate::channel::{PtyChannel, PtyConfig};
use crate::command::Command;
use crate::error::{ChannelError, DriverError, Result};
use crate::platform::PlatformDefinition;
use crate::transport::{SshConfig, SshTransport};

/// Open transport plus the shell channel running on it.
struct Session {
    transport: SshTransport,
    channel: PtyChannel,
}

/// Driver that works with any platform definition.
///
/// Handles:
/// - SSH transport and shell channel lifetime
/// - Command execution with prompt detection
/// - Single prompt/answer interactions
/// - Output normalization and failure detection
pub struct GenericDriver {
    ssh_config: SshConfig,
    platform: PlatformDefinition,
    session: Option<Session>,
    search_depth: usize,
}

impl GenericDriver {
    /// Create a driver; call [`open`](Self::open) before sending commands.
    pub fn new(ssh_config: SshConfig, platform: PlatformDefinition) -> Self {
        Self {
            ssh_config,
            platform,
            session: None,
            search_depth: PtyConfig::default().search_depth,
        }
    }

    /// Get a reference to the platform definition.
    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// Check if the driver is connected.
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Connect, wait for the first prompt and run the platform's on-open commands.
    pub async fn open(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        let transport = SshTransport::connect(&self.ssh_config).await?;
        let shell = transport.open_shell().await?;
        let mut channel = PtyChannel::new(
            shell,
            PtyConfig {
                timeout: self.ssh_config.timeout,
                search_depth: self.search_depth,
            },
        );

        // banner and first prompt
        channel.read_until(&self.platform.prompt_pattern).await?;
        self.session = Some(Session { transport, channel });
        info!(
            "connected to {} ({})",
            self.ssh_config.socket_addr(),
            self.platform.name
        );

        for cmd in self.platform.on_open_commands.clone() {
            let response = self.send_command(&Command::new(cmd)).await?;
            if let Some(message) = &response.failure_message {
                warn!("on-open command '{}' rejected: {}", response.command, message);
            }
        }

        Ok(())
    }

    /// Run the platform's on-close commands and disconnect.
    pub async fn close(&mut self) -> Result<()> {
        if self.session.is_none() {
            return Ok(());
        }

        for cmd in self.platform.on_close_commands.clone() {
            if let Err(e) = self.send_command(&Command::new(cmd)).await {
                warn!("on-close command failed: {}", e);
            }
        }

        if let Some(Session { transport, channel }) = self.session.take() {
            if let Err(e) = channel.close().await {
                debug!("channel close: {}", e);
            }
            transport.close().await?;
        }
        Ok(())
    }

    /// Send a command and wait for the prompt.
    ///
    /// When the command carries a prompt/answer pair and the device prints
    /// the prompt, the answer is sent and the driver waits for the device
    /// prompt again. Output of both exchanges is returned together.
    pub async fn send_command(&mut self, command: &Command) -> Result<Response> {
        // nothing is sent unless the prompt pattern compiles
        let question = match (&command.prompt, &command.answer) {
            (Some(prompt), Some(answer)) => {
                Some((Regex::new(prompt).map_err(ChannelError::InvalidPattern)?, answer))
            }
            _ => None,
        };

        let session = self.session.as_mut().ok_or(DriverError::NotConnected)?;
        let channel = &mut session.channel;
        let device_prompt = &self.platform.prompt_pattern;

        let start = Instant::now();
        debug!("sending: {}", command.command);
        channel.send(&command.command).await?;

        let raw = match question {
            Some((question, answer)) => {
                let (matched, data) = channel.read_until_any(&[device_prompt, &question]).await?;
                let mut raw = data.to_vec();
                if matched == 1 {
                    debug!("answering prompt '{}'", question.as_str());
                    channel.send(answer).await?;
                    raw.extend_from_slice(&channel.read_until(device_prompt).await?);
                }
                raw
            }
            None => channel.read_until(device_prompt).await?.to_vec(),
        };
        let elapsed = start.elapsed();

        let text = String::from_utf8_lossy(&raw).into_owned();

        let prompt = text
            .lines()
            .last()
            .map(|line| line.trim().to_string())
            .unwrap_or_default();
        let result = self.platform.normalize_output(&text, &command.command);

        let failure = self.platform.detect_failure(&result).map(str::to_string);
        let response = Response::new(&command.command, result, text, prompt, elapsed);
        Ok(match failure {
            Some(pattern) => response.with_failure(pattern),
            None => response,
        })
    }
}

impl CommandExecutor for GenericDriver {
    async fn execute(&mut self, commands: &[Command]) -> Result<ResponseSet> {
        let mut responses = Vec::with_capacity(commands.len());
        for command in commands {
            let response = self.send_command(command).await?;
            if let Some(message) = &response.failure_message {
                return Err(DriverError::CommandFailed {
                    command: command.command.clone(),
                    message: format!("{message} ({})", response.result.trim()),
                }
                .into());
            }
            responses.push(response);
        }
        Ok(ResponseSet::from(responses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DriverBuilder;
    use crate::error::Error;

    fn driver() -> GenericDriver {
        DriverBuilder::new("192.0.2.1")
            .username("admin")
            .password("secret")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_bad_prompt_rejected_before_sending() {
        let mut driver = driver();
        let save = Command::new("reset saved-configuration").with_prompt("(unclosed", "y");

        // an unconnected driver would report NotConnected if it got as far as sending
        let err = driver.send_command(&save).await.unwrap_err();
        assert!(matches!(err, Error::Channel(ChannelError::InvalidPattern(_))));
    }

    #[tokio::test]
    async fn test_send_requires_open_session() {
        let mut driver = driver();
        let err = driver
            .send_command(&Command::new("display version"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Driver(DriverError::NotConnected)));
    }
}
