//! Connection supervision
//!
//! Owns the single persistent client connection for the process: connects,
//! checks authorization, parks inside the receive loop, and on every failure
//! classifies the error and decides between an immediate retry, a delayed
//! retry, or credential invalidation. No error escapes `run`; the only
//! externally observable effect is the evolving [`ConnectionState`]
//! published over a watch channel.
//!
//! Retry policy note: transient and generic remote errors reset the backoff
//! to its floor and retry immediately, because the underlying transport is
//! expected to self-heal. Only the rate-limit edge and the
//! restart-after-invalidation failure edge actually consume increasing
//! delay. Most systems grow backoff on any failure; this one deliberately
//! does not, preserving the long-observed behavior of the reconnect loop it
//! replaces.

mod backoff;

pub use backoff::Backoff;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::connector::{ClientConnection, CredentialStore, StartOutcome};
use crate::error::ErrorKind;
use crate::relay::invite::RelayCandidate;

/// Supervisor phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Before the first `run` iteration.
    #[default]
    Idle,
    /// (Re)establishing the transport connection.
    Connecting,
    /// Verifying the stored credential against the remote endpoint.
    Authorizing,
    /// Inside the long-lived receive loop.
    Running,
    /// Sleeping out a rate limit or a repeated unclassified failure.
    BackingOff,
    /// Wiping revoked credential material.
    Invalidating,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Connecting => "connecting",
            Phase::Authorizing => "authorizing",
            Phase::Running => "running",
            Phase::BackingOff => "backing_off",
            Phase::Invalidating => "invalidating",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Externally observable supervisor state
///
/// There is exactly one of these per process; only the supervisor's own
/// transition logic mutates it. Collaborators hold a watch receiver and use
/// it to learn the selected endpoint and whether the connection is up.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    pub phase: Phase,
    pub active_endpoint: Option<RelayCandidate>,
    pub backoff: std::time::Duration,
    pub last_error: Option<ErrorKind>,
}

impl ConnectionState {
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }
}

/// Supervises the persistent client connection until process shutdown.
pub struct ConnectionSupervisor {
    connection: Arc<dyn ClientConnection>,
    credentials: Arc<dyn CredentialStore>,
    backoff: Backoff,
    state_tx: watch::Sender<ConnectionState>,
}

impl ConnectionSupervisor {
    /// `endpoint` is the relay selected at startup, or `None` for a direct
    /// connection.
    pub fn new(
        connection: Arc<dyn ClientConnection>,
        credentials: Arc<dyn CredentialStore>,
        endpoint: Option<RelayCandidate>,
        backoff: Backoff,
    ) -> Self {
        let initial = ConnectionState {
            phase: Phase::Idle,
            active_endpoint: endpoint,
            backoff: backoff.current(),
            last_error: None,
        };
        let (state_tx, _) = watch::channel(initial);
        Self {
            connection,
            credentials,
            backoff,
            state_tx,
        }
    }

    /// Subscribe to state updates.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Run forever. Every connection-phase error is absorbed here; the
    /// caller never sees one.
    pub async fn run(&mut self) {
        loop {
            self.run_once().await;
        }
    }

    async fn run_once(&mut self) {
        if let Err(kind) = self.cycle().await {
            self.recover(kind).await;
        }
    }

    /// One Connecting → Authorizing → Running pass, ending when the receive
    /// loop drops or any step fails.
    async fn cycle(&mut self) -> Result<(), ErrorKind> {
        self.set_phase(Phase::Connecting);
        if !self.connection.is_connected().await {
            info!("Connecting...");
            match self.connection.start().await? {
                StartOutcome::Authorized => info!("Connected."),
                StartOutcome::NeedsInteractiveAuth => {
                    info!("Connected after interactive authorization.")
                }
            }
        }

        self.set_phase(Phase::Authorizing);
        if !self.connection.is_authorized().await? {
            warn!("Not authorized. Re-running start sequence...");
            self.connection.start().await?;
            info!("Re-authorized.");
        }

        self.backoff.reset();
        self.publish_backoff();

        self.set_phase(Phase::Running);
        info!("Client running. Listening...");
        self.connection.run_until_disconnected().await
    }

    /// Apply the transition policy for one classified error.
    async fn recover(&mut self, kind: ErrorKind) {
        self.state_tx.send_modify(|s| s.last_error = Some(kind));

        match kind {
            ErrorKind::TransientNetwork => {
                warn!(error_kind = %kind, "Network error. Reconnecting...");
                self.backoff.reset();
            }
            ErrorKind::RemoteProtocolError => {
                error!(error_kind = %kind, "Remote protocol error. Reconnecting...");
                self.backoff.reset();
            }
            ErrorKind::Unclassified => {
                error!(error_kind = %kind, "Unexpected error. Reconnecting...");
                self.backoff.reset();
            }
            ErrorKind::RateLimited(mandated) => {
                // The remote's wait is a minimum; never sleep less than the
                // current backoff either. The backoff itself is left alone.
                let delay = mandated.max(self.backoff.current());
                warn!(error_kind = %kind, "Rate limited. Sleeping {:?}...", delay);
                self.set_phase(Phase::BackingOff);
                sleep(delay).await;
            }
            ErrorKind::CredentialRevoked => {
                error!(error_kind = %kind, "Credential revoked by remote endpoint");
                self.set_phase(Phase::Invalidating);
                self.invalidate_credentials();
                self.backoff.reset();
                // Kick off a fresh start so interactive re-auth can happen;
                // if that fails too, fall back to the slow retry path.
                match self.connection.start().await {
                    Ok(_) => info!("Re-started after credential invalidation."),
                    Err(e) => {
                        error!(error_kind = %e, "Restart after invalidation failed");
                        let delay = self.backoff.current();
                        self.set_phase(Phase::BackingOff);
                        sleep(delay).await;
                        self.backoff.advance();
                    }
                }
            }
        }

        self.publish_backoff();
    }

    fn invalidate_credentials(&self) {
        if !self.credentials.exists() {
            return;
        }
        match self.credentials.delete() {
            Ok(()) => info!("Credential material deleted. Re-login required."),
            Err(e) => error!("Failed to delete credential material: {}", e),
        }
    }

    fn set_phase(&self, phase: Phase) {
        info!(phase = %phase, "Supervisor phase changed");
        self.state_tx.send_modify(|s| s.phase = phase);
    }

    fn publish_backoff(&self) {
        let current = self.backoff.current();
        self.state_tx.send_modify(|s| s.backoff = current);
    }
}
