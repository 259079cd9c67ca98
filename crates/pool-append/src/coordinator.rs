//! Read-modify-conditional-write retry loop

use pool_model::{ErrorKind, PoolError, VersionToken};
use pool_store::DocumentStore;
use std::time::Duration;

/// Attempts per append, including the first
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Back-off unit; the pause before attempt `k` is `k × base`
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Retry budget and back-off of an [`AppendCoordinator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendPolicy {
    /// Attempts per append, including the first (at least 1)
    pub max_attempts: u32,
    /// Back-off unit
    pub backoff_base: Duration,
}

impl AppendPolicy {
    /// Policy with explicit limits
    #[inline]
    #[must_use]
    pub const fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts,
            backoff_base,
        }
    }

    /// With a different attempt budget
    #[inline]
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// With a different back-off unit
    #[inline]
    #[must_use]
    pub const fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Pause taken before `attempt` (linear: `attempt × base`)
    #[inline]
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(attempt)
    }
}

impl Default for AppendPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF_BASE)
    }
}

/// Progress of one append, reported to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendState {
    /// Not started
    Idle,
    /// Fetching the current document and token
    Reading {
        /// 1-based attempt number
        attempt: u32,
    },
    /// Conditional write in flight
    Writing {
        /// 1-based attempt number
        attempt: u32,
    },
    /// Lost a race; waiting before the next attempt
    Retrying {
        /// Attempt about to start
        attempt: u32,
        /// Pause before it starts
        delay: Duration,
    },
    /// Record committed
    Succeeded {
        /// Attempts used
        attempts: u32,
    },
    /// Gave up
    Failed {
        /// Attempts used
        attempts: u32,
    },
}

impl AppendState {
    /// Whether the append has finished
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// Result of a committed append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Token of the committed revision, when the store reported one
    pub version: Option<VersionToken>,
    /// Attempts used (1 when no conflict occurred)
    pub attempts: u32,
    /// Record count of the committed document
    pub document_len: usize,
}

/// A failed append; displays the last error message verbatim
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{last_error}")]
pub struct AppendFailure {
    /// Attempts used before giving up
    pub attempts: u32,
    /// Error of the final attempt
    pub last_error: PoolError,
}

impl AppendFailure {
    /// Kind of the final error
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.last_error.kind()
    }

    /// Whether the attempts ran out while still conflicting
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

/// Appends records to a [`DocumentStore`] under optimistic concurrency
///
/// # Guarantees
/// - at most one successful write per call, so a record is never appended twice
/// - retries happen only after a conflict, strictly one after another
/// - any other failure ends the call immediately
#[derive(Debug, Clone)]
pub struct AppendCoordinator<S> {
    store: S,
    policy: AppendPolicy,
}

impl<S: DocumentStore> AppendCoordinator<S> {
    /// Coordinator with the default policy (3 attempts, 500 ms base)
    #[inline]
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_policy(store, AppendPolicy::default())
    }

    /// Coordinator with an explicit policy
    #[inline]
    #[must_use]
    pub fn with_policy(store: S, policy: AppendPolicy) -> Self {
        Self { store, policy }
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> AppendPolicy {
        self.policy
    }

    /// Append `record`, committing with `description`.
    ///
    /// # Errors
    /// [`AppendFailure`] carrying the first non-conflict error, or the last
    /// conflict once the attempts are used up.
    pub async fn append(
        &self,
        record: S::Record,
        description: &str,
    ) -> Result<AppendOutcome, AppendFailure> {
        self.append_observed(record, description, |_| {}).await
    }

    /// [`append`](Self::append), reporting every state change to `observe`.
    ///
    /// # Errors
    /// As [`append`](Self::append).
    pub async fn append_observed<F>(
        &self,
        record: S::Record,
        description: &str,
        mut observe: F,
    ) -> Result<AppendOutcome, AppendFailure>
    where
        F: FnMut(&AppendState) + Send,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            observe(&AppendState::Reading { attempt });
            let result = match self.store.read().await {
                Ok(snapshot) => {
                    let next = snapshot.document.with_appended(record.clone());
                    tracing::debug!(
                        attempt,
                        version = %snapshot.version.short(),
                        records = next.len(),
                        "Writing document"
                    );
                    observe(&AppendState::Writing { attempt });
                    self.store
                        .write(&next, &snapshot.version, description)
                        .await
                        .map(|receipt| (receipt, next.len()))
                }
                Err(e) => Err(e),
            };

            match result {
                Ok((receipt, document_len)) => {
                    tracing::info!(attempts = attempt, records = document_len, "Record appended");
                    observe(&AppendState::Succeeded { attempts: attempt });
                    return Ok(AppendOutcome {
                        version: receipt.version,
                        attempts: attempt,
                        document_len,
                    });
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    attempt += 1;
                    let delay = self.policy.delay_before(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Version conflict, retrying: {}",
                        e
                    );
                    observe(&AppendState::Retrying { attempt, delay });
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::warn!(attempts = attempt, kind = %e.kind(), "Append failed: {}", e);
                    observe(&AppendState::Failed { attempts: attempt });
                    return Err(AppendFailure {
                        attempts: attempt,
                        last_error: e,
                    });
                }
            }
        }
    }
}
