//! Collaborator capability seams
//!
//! The probe scheduler and the connection supervisor never talk to a concrete
//! transport; they consume these traits. The surrounding application supplies
//! implementations backed by its real networking library, and error values
//! cross the boundary already classified as [`ErrorKind`].

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::error::ErrorKind;
use crate::relay::invite::RelayCandidate;

/// Capability to run one short-lived reachability handshake against a relay.
#[async_trait]
pub trait RelayProber: Send + Sync {
    /// Connect to the candidate and immediately tear the connection down.
    ///
    /// Every failure mode (refusal, timeout, protocol mismatch) is an
    /// ordinary `false`; probing never surfaces errors.
    async fn attempt_connect(&self, candidate: &RelayCandidate, timeout: Duration) -> bool;
}

/// Outcome of the external start/authorization flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The stored credential was accepted as-is.
    Authorized,
    /// The flow had to fall back to interactive authorization and completed it.
    NeedsInteractiveAuth,
}

/// Capability interface over the single persistent client connection.
///
/// `start` encapsulates the collaborator's whole connect-and-authorize
/// sequence, including any interactive login it may run.
#[async_trait]
pub trait ClientConnection: Send + Sync {
    async fn is_connected(&self) -> bool;

    async fn start(&self) -> Result<StartOutcome, ErrorKind>;

    async fn is_authorized(&self) -> Result<bool, ErrorKind>;

    /// Block inside the receive loop until the connection drops.
    async fn run_until_disconnected(&self) -> Result<(), ErrorKind>;
}

/// Opaque persisted authorization material.
///
/// The supervisor only ever checks for existence and requests deletion; it
/// never inspects the contents.
pub trait CredentialStore: Send + Sync {
    fn exists(&self) -> bool;

    fn delete(&self) -> io::Result<()>;
}

/// Credential material persisted as a session file on disk
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CredentialStore for SessionFile {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn delete(&self) -> io::Result<()> {
        std::fs::remove_file(&self.path)?;
        info!("Deleted session file {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_file_exists_and_delete() {
        let dir = std::env::temp_dir().join(format!("tether-session-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.session");

        let store = SessionFile::new(&path);
        assert!(!store.exists());

        std::fs::write(&path, b"auth-key").unwrap();
        assert!(store.exists());

        store.delete().unwrap();
        assert!(!store.exists());

        // Deleting again reports the underlying I/O error.
        assert!(store.delete().is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
