//! Bounded relay probing
//!
//! Races connectivity probes against every candidate under a fixed
//! concurrency cap and keeps the first one that answers.

use std::time::Duration;

use futures::StreamExt;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::connector::RelayProber;
use crate::relay::invite::RelayCandidate;

/// Probe scheduler configuration
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Maximum number of probes in flight at once
    pub concurrency: usize,
    /// Bound on each individual connect attempt
    pub attempt_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: 20,
            attempt_timeout: Duration::from_secs(3),
        }
    }
}

/// Race probes against all candidates and return the first that answers.
///
/// At most `config.concurrency` probes run at once; candidates beyond the cap
/// wait for a free slot. The winner is whichever probe completes successfully
/// first, which is deliberately nondeterministic across near-simultaneous
/// successes: any working relay is equally acceptable. Once a winner is
/// found, in-flight and unstarted probes are dropped. If every candidate
/// fails, or the input is empty, the result is `None` — a valid outcome
/// meaning "connect directly", never an error.
pub async fn select_working<P>(
    prober: &P,
    candidates: Vec<RelayCandidate>,
    config: &ProbeConfig,
) -> Option<RelayCandidate>
where
    P: RelayProber + ?Sized,
{
    if candidates.is_empty() {
        return None;
    }

    let total = candidates.len();
    info!("Probing {} relay candidates", total);

    let attempt_timeout = config.attempt_timeout;
    let mut probes = futures::stream::iter(candidates.into_iter().map(|candidate| async move {
        // The scheduler enforces the bound even if the prober ignores its
        // timeout argument.
        let reachable = timeout(attempt_timeout, prober.attempt_connect(&candidate, attempt_timeout))
            .await
            .unwrap_or(false);
        (candidate, reachable)
    }))
    .buffer_unordered(config.concurrency.max(1));

    while let Some((candidate, reachable)) = probes.next().await {
        if reachable {
            info!("Selected relay {}", candidate);
            // Dropping the stream cancels every other in-flight probe and
            // keeps unstarted ones from launching.
            return Some(candidate);
        }
        debug!("Relay {} did not answer", candidate);
    }

    info!("No relay candidate answered out of {}", total);
    None
}
