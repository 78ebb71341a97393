//! Bounded readiness polling.
//!
//! One wait per interaction, one timeout per wait. A timeout is an outcome,
//! not an error; callers decide whether it is fatal.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::surface::FormSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    TimedOut,
}

impl Readiness {
    /// `TimedOut` becomes [`Error::Timeout`] naming `what`.
    pub fn into_result(self, what: &str) -> Result<()> {
        match self {
            Readiness::Ready => Ok(()),
            Readiness::TimedOut => Err(Error::Timeout(what.to_string())),
        }
    }
}

/// Poll `field` until it is clickable or `timeout` elapses.
///
/// Probe errors (a detached node, a page mid-render) count as "not yet".
/// The predicate is always evaluated at least once, even with a zero timeout,
/// and a single evaluation never runs past the deadline.
pub async fn await_ready<S: FormSurface>(
    surface: &S,
    field: &S::Field,
    timeout: Duration,
    interval: Duration,
) -> Readiness {
    let start = Instant::now();

    loop {
        let budget = timeout.saturating_sub(start.elapsed());
        match tokio::time::timeout(budget, surface.is_clickable(field)).await {
            Ok(Ok(true)) => return Readiness::Ready,
            Ok(Ok(false)) => {}
            Ok(Err(e)) => tracing::trace!(error = %e, "readiness probe failed"),
            Err(_) => tracing::trace!("readiness probe exceeded the wait deadline"),
        }
        if start.elapsed() >= timeout {
            return Readiness::TimedOut;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Poll until at least one element matches `selector`, returning the first.
pub async fn await_present<S: FormSurface>(
    surface: &S,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Option<S::Field> {
    let start = Instant::now();

    loop {
        let budget = timeout.saturating_sub(start.elapsed());
        let Ok(lookup) = tokio::time::timeout(budget, surface.find_all(selector)).await else {
            return None;
        };
        match lookup {
            Ok(found) => {
                if let Some(first) = found.into_iter().next() {
                    return Some(first);
                }
            }
            Err(e) => tracing::trace!(selector, error = %e, "presence probe failed"),
        }
        if start.elapsed() >= timeout {
            return None;
        }
        tokio::time::sleep(interval).await;
    }
}
