//! Wait mechanisms.
//!
//! Every action and assertion funnels through [`wait_until`]: a probe is
//! polled until it reports [`Poll::Ready`] or the timeout elapses. The probe
//! describes what it saw on each miss so a timeout can report the last
//! observed DOM state instead of a bare "timed out".

use crate::locator::LocatorOptions;
use crate::result::{ProbeError, ProbeResult};
use std::future::Future;
use std::time::{Duration, Instant};

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl From<LocatorOptions> for WaitOptions {
    fn from(options: LocatorOptions) -> Self {
        Self {
            timeout_ms: options.timeout.as_millis() as u64,
            poll_interval_ms: options.poll_interval.as_millis() as u64,
        }
    }
}

/// Outcome of a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll<T> {
    /// Condition met
    Ready(T),
    /// Not yet; carries a description of what was observed
    Pending(String),
}

/// Poll `probe` until it is ready or `options.timeout()` elapses.
///
/// The probe runs at least once, even with a zero timeout. Errors returned by
/// the probe abort the wait immediately.
pub async fn wait_until<T, F, Fut>(
    options: WaitOptions,
    waiting_for: impl Into<String>,
    mut probe: F,
) -> ProbeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Poll<T>>>,
{
    let start = Instant::now();
    loop {
        let observed = match probe().await? {
            Poll::Ready(value) => return Ok(value),
            Poll::Pending(observed) => observed,
        };

        if start.elapsed() >= options.timeout() {
            return Err(ProbeError::Timeout {
                ms: options.timeout_ms,
                waiting_for: waiting_for.into(),
                observed,
            });
        }

        tokio::time::sleep(options.poll_interval()).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval(), Duration::from_millis(50));
        }

        #[test]
        fn test_from_locator_options() {
            let opts = WaitOptions::from(LocatorOptions {
                timeout: Duration::from_millis(1200),
                poll_interval: Duration::from_millis(20),
            });
            assert_eq!(opts.timeout_ms, 1200);
            assert_eq!(opts.poll_interval_ms, 20);
        }
    }

    mod wait_until_tests {
        use super::*;

        #[tokio::test]
        async fn test_ready_on_first_probe() {
            let value = wait_until(WaitOptions::new(), "nothing", || async {
                Ok(Poll::Ready(7))
            })
            .await
            .unwrap();
            assert_eq!(value, 7);
        }

        #[tokio::test]
        async fn test_ready_after_retries() {
            let calls = AtomicUsize::new(0);
            let opts = WaitOptions::new().with_poll_interval(1);
            let value = wait_until(opts, "third call", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n >= 2 {
                        Ok(Poll::Ready(n))
                    } else {
                        Ok(Poll::Pending(format!("call {n}")))
                    }
                }
            })
            .await
            .unwrap();
            assert_eq!(value, 2);
        }

        #[tokio::test]
        async fn test_timeout_reports_last_observation() {
            let opts = WaitOptions::new().with_timeout(30).with_poll_interval(5);
            let err = wait_until(opts, "row to appear", || async {
                Ok::<_, ProbeError>(Poll::<()>::Pending("0 elements".to_string()))
            })
            .await
            .unwrap_err();

            match err {
                ProbeError::Timeout {
                    ms,
                    waiting_for,
                    observed,
                } => {
                    assert_eq!(ms, 30);
                    assert_eq!(waiting_for, "row to appear");
                    assert_eq!(observed, "0 elements");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_zero_timeout_still_probes_once() {
            let calls = AtomicUsize::new(0);
            let opts = WaitOptions::new().with_timeout(0);
            let result = wait_until(opts, "once", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(Poll::Ready(())) }
            })
            .await;
            assert!(result.is_ok());
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_probe_error_aborts() {
            let err = wait_until(WaitOptions::new(), "never", || async {
                Err::<Poll<()>, _>(ProbeError::page("connection closed"))
            })
            .await
            .unwrap_err();
            assert!(matches!(err, ProbeError::Page { .. }));
        }
    }
}
