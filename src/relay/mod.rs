//! Relay discovery
//!
//! Parsing invite links into candidates and racing bounded connectivity
//! probes to pick a working relay before the supervisor starts.

pub mod invite;
pub mod probe;
pub mod transport;

pub use invite::{parse_invite, parse_invite_list, RelayCandidate};
pub use probe::{select_working, ProbeConfig};
pub use transport::TcpProber;
