use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::relay::invite::InviteError;

/// Unified error type for the Tether library
#[derive(Error, Debug)]
pub enum TetherError {
    #[error("invalid invite link: {0}")]
    InvalidInvite(#[from] InviteError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for Tether operations
pub type Result<T> = std::result::Result<T, TetherError>;

/// Classified connection-phase errors consumed by the supervisor.
///
/// Collaborator implementations map their concrete transport and protocol
/// errors into this closed set; the supervisor never sees raw error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection reset, timeout, I/O failure, cancelled operation.
    /// Expected to be self-healing; retried immediately.
    TransientNetwork,
    /// The remote endpoint no longer accepts the stored credential.
    CredentialRevoked,
    /// The remote endpoint demands a minimum wait before the next attempt.
    RateLimited(Duration),
    /// A well-formed remote error that fits no other class.
    RemoteProtocolError,
    /// Anything the collaborator could not classify.
    Unclassified,
}

impl ErrorKind {
    /// Map a transport-level I/O error into the classification.
    ///
    /// Connection-shaped failures are transient; everything else is left
    /// unclassified so the supervisor's repeat-failure path can slow down.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::Interrupted => ErrorKind::TransientNetwork,
            _ => ErrorKind::Unclassified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::TransientNetwork => "transient_network",
            ErrorKind::CredentialRevoked => "credential_revoked",
            ErrorKind::RateLimited(_) => "rate_limited",
            ErrorKind::RemoteProtocolError => "remote_protocol_error",
            ErrorKind::Unclassified => "unclassified",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::RateLimited(wait) => {
                write!(f, "rate_limited (wait {}s)", wait.as_secs())
            }
            other => write!(f, "{}", other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_shaped_io_errors_are_transient() {
        let transient = [
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionAborted,
            io::ErrorKind::ConnectionRefused,
            io::ErrorKind::NotConnected,
            io::ErrorKind::BrokenPipe,
            io::ErrorKind::TimedOut,
            io::ErrorKind::UnexpectedEof,
            io::ErrorKind::Interrupted,
        ];
        for kind in transient {
            let err = io::Error::new(kind, "boom");
            assert_eq!(ErrorKind::from_io(&err), ErrorKind::TransientNetwork);
        }
    }

    #[test]
    fn test_other_io_errors_are_unclassified() {
        for kind in [
            io::ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied,
            io::ErrorKind::InvalidData,
            io::ErrorKind::Other,
        ] {
            let err = io::Error::new(kind, "boom");
            assert_eq!(ErrorKind::from_io(&err), ErrorKind::Unclassified);
        }
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::TransientNetwork.to_string(), "transient_network");
        assert_eq!(
            ErrorKind::RateLimited(Duration::from_secs(42)).to_string(),
            "rate_limited (wait 42s)"
        );
    }
}
