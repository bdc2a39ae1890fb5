//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use russh::Channel;
use russh::client::{self, Handle, Msg};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use secrecy::ExposeSecret;

use super::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::error::{Result, TransportError};

const MIN_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(1);

/// An authenticated SSH session to one device.
pub struct SshTransport {
    session: Handle<SshHandler>,
    terminal_width: u32,
    terminal_height: u32,
}

impl SshTransport {
    /// Connect to the SSH server and authenticate.
    pub async fn connect(config: &SshConfig) -> Result<Self> {
        let settings = Arc::new(client_config(config));

        let rejection = Arc::new(Mutex::new(None));
        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            verification: config.host_key_verification,
            known_hosts_path: config.known_hosts_path.clone(),
            rejection: Arc::clone(&rejection),
        };

        debug!("connecting to {}", config.socket_addr());
        let mut session = tokio::time::timeout(
            config.timeout,
            client::connect(settings, (config.host.as_str(), config.port), handler),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))?
        .map_err(|e| {
            // prefer the host-key reason over russh's generic UnknownKey
            rejection
                .lock()
                .ok()
                .and_then(|mut slot| slot.take())
                .unwrap_or(TransportError::Ssh(e))
        })?;

        authenticate(&mut session, config).await?;
        debug!("authenticated to {} as {}", config.socket_addr(), config.username);

        Ok(Self {
            session,
            terminal_width: config.terminal_width,
            terminal_height: config.terminal_height,
        })
    }

    /// Open a session channel with a PTY and an interactive shell.
    pub async fn open_shell(&self) -> Result<Channel<Msg>> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_pty(
                true,
                "vt100",
                self.terminal_width,
                self.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;

        Ok(channel)
    }

    /// Disconnect.
    pub async fn close(self) -> Result<()> {
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// Keepalives hold the session open across idle polling intervals of any
/// length. A peer that misses `keepalive_max` replies is dropped.
fn client_config(config: &SshConfig) -> client::Config {
    client::Config {
        inactivity_timeout: Some(config.timeout),
        keepalive_interval: Some((config.timeout / 3).max(MIN_KEEPALIVE_INTERVAL)),
        keepalive_max: 3,
        ..Default::default()
    }
}

async fn authenticate(session: &mut Handle<SshHandler>, config: &SshConfig) -> Result<()> {
    let user = config.username.as_str();
    let outcome = match &config.auth {
        AuthMethod::None => session.authenticate_none(user).await,
        AuthMethod::Password(password) => {
            session
                .authenticate_password(user, password.expose_secret())
                .await
        }
        AuthMethod::PrivateKey { path, passphrase } => {
            let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                .map_err(|e| TransportError::Key(e.to_string()))?;

            let hash_alg = session
                .best_supported_rsa_hash()
                .await
                .map_err(TransportError::Ssh)?
                .flatten();

            session
                .authenticate_publickey(user, PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg))
                .await
        }
    }
    .map_err(TransportError::Ssh)?;

    if !outcome.success() {
        return Err(TransportError::AuthenticationFailed {
            user: user.to_string(),
        }
        .into());
    }
    Ok(())
}

/// russh client callbacks; only host-key checking is customised.
struct SshHandler {
    host: String,
    port: u16,
    verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    rejection: Arc<Mutex<Option<TransportError>>>,
}

impl SshHandler {
    /// `Ok(true)` known, `Ok(false)` unknown, `Err` changed or unreadable.
    fn lookup(&self, key: &PublicKey) -> std::result::Result<bool, TransportError> {
        let found = match &self.known_hosts_path {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, key, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, key),
        };

        found.map_err(|e| match e {
            russh::keys::Error::KeyChanged { line } => TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            },
            other => TransportError::KnownHosts(other.to_string()),
        })
    }

    fn learn(&self, key: &PublicKey) -> std::result::Result<(), TransportError> {
        match &self.known_hosts_path {
            Some(path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, key, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, key),
        }
        .map_err(|e| TransportError::KnownHosts(e.to_string()))
    }

    fn reject(&self, reason: TransportError) -> bool {
        if let Ok(mut slot) = self.rejection.lock() {
            *slot = Some(reason);
        }
        false
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        if self.verification == HostKeyVerification::Disabled {
            return Ok(true);
        }

        let accepted = match self.lookup(server_public_key) {
            Ok(true) => true,
            Ok(false) if self.verification == HostKeyVerification::AcceptNew => {
                if let Err(e) = self.learn(server_public_key) {
                    warn!("Failed to save host key: {}", e);
                }
                true
            }
            Ok(false) => self.reject(TransportError::HostKeyUnknown {
                host: self.host.clone(),
                port: self.port,
            }),
            Err(e) => self.reject(e),
        };
        Ok(accepted)
    }
}
