//! Tether - Relay Discovery & Connection Supervision
//!
//! The connection establishment and resilience core of a long-running
//! messaging client.
//!
//! ## Features
//!
//! - Invite-link parsing into validated relay candidates (hex and
//!   URL-safe base64 secrets)
//! - Bounded concurrent reachability probing with first-success-wins
//!   selection and prompt cancellation of the losers
//! - Supervision of the single persistent client connection: reconnect,
//!   authorization checks, exponential backoff, rate-limit waits, and
//!   credential invalidation on revocation
//! - Watch-channel state publication so collaborators can wait for a
//!   running connection

pub mod config;
pub mod connector;
pub mod error;
pub mod relay;
pub mod supervisor;

pub use config::Config;
pub use connector::{ClientConnection, CredentialStore, RelayProber, SessionFile, StartOutcome};
pub use error::{ErrorKind, Result, TetherError};
pub use relay::{select_working, ProbeConfig, RelayCandidate, TcpProber};
pub use supervisor::{Backoff, ConnectionState, ConnectionSupervisor, Phase};
