//! TCP reachability probing
//!
//! A minimal [`RelayProber`] that checks whether a relay endpoint accepts a
//! TCP connection and tears it straight back down. Suitable for the CLI
//! tester; deployments with a protocol-aware client supply their own prober.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::connector::RelayProber;
use crate::relay::invite::RelayCandidate;

/// Plain TCP connect-then-drop prober
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RelayProber for TcpProber {
    async fn attempt_connect(&self, candidate: &RelayCandidate, attempt_timeout: Duration) -> bool {
        let address = candidate.address();
        match timeout(attempt_timeout, TcpStream::connect(&address)).await {
            Ok(Ok(stream)) => {
                // Dropping the stream closes the socket; the probe holds no
                // connection past this point.
                drop(stream);
                debug!("Relay {} accepted TCP connect", address);
                true
            }
            Ok(Err(e)) => {
                debug!("Relay {} refused: {}", address, e);
                false
            }
            Err(_) => {
                debug!("Relay {} timed out", address);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn candidate(host: &str, port: u16) -> RelayCandidate {
        RelayCandidate {
            host: host.to_string(),
            port,
            secret: vec![0xdd, 0x01],
        }
    }

    #[tokio::test]
    async fn test_listening_endpoint_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let prober = TcpProber::new();
        let reachable = prober
            .attempt_connect(&candidate("127.0.0.1", port), Duration::from_secs(1))
            .await;
        assert!(reachable);
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        // Bind then drop to find a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let prober = TcpProber::new();
        let reachable = prober
            .attempt_connect(&candidate("127.0.0.1", port), Duration::from_secs(1))
            .await;
        assert!(!reachable);
    }
}
