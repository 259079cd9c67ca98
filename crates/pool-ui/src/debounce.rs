//! Debounced, self-cancelling entity lookup for one input field

use parking_lot::Mutex;
use pool_catalog::EntityLookup;
use pool_model::{EntityMatch, ErrorKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Input must stay unchanged this long before a lookup fires
pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(600);

/// What the field currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState {
    /// Empty input, nothing shown
    Idle,
    /// Waiting for the quiet interval or the response
    Pending {
        /// Trimmed query
        query: String,
    },
    /// Query resolved to an entity
    Matched(EntityMatch),
    /// Query names no entity
    NotFound {
        /// Trimmed query
        query: String,
    },
    /// Lookup could not be completed
    Unavailable {
        /// Trimmed query
        query: String,
        /// Transport error message
        message: String,
    },
}

impl LookupState {
    /// Matched entity, if any
    #[inline]
    #[must_use]
    pub fn matched(&self) -> Option<&EntityMatch> {
        match self {
            Self::Matched(entity) => Some(entity),
            _ => None,
        }
    }

    /// Whether no lookup is scheduled or in flight
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }

    /// One-line status for display
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Idle => String::new(),
            Self::Pending { .. } => "Looking up…".to_string(),
            Self::Matched(entity) => entity.display_label(),
            Self::NotFound { .. } => "Not found".to_string(),
            Self::Unavailable { message, .. } => format!("Lookup unavailable: {message}"),
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Lookup handle owned by one input field
///
/// Every input change supersedes the previous one: a timer that has not fired
/// is cancelled, and a request already in flight is left to finish but its
/// answer is dropped.
pub struct DebouncedLookup<L> {
    lookup: Arc<L>,
    quiet: Duration,
    slot: Arc<Mutex<Slot>>,
    state: Arc<watch::Sender<LookupState>>,
}

impl<L: EntityLookup + 'static> DebouncedLookup<L> {
    /// Field handle with the default 600 ms quiet interval
    #[must_use]
    pub fn new(lookup: L) -> Self {
        Self::shared(Arc::new(lookup))
    }

    /// Field handle sharing a lookup with other fields
    #[must_use]
    pub fn shared(lookup: Arc<L>) -> Self {
        let (state, _) = watch::channel(LookupState::Idle);
        Self {
            lookup,
            quiet: DEFAULT_QUIET_INTERVAL,
            slot: Arc::new(Mutex::new(Slot::default())),
            state: Arc::new(state),
        }
    }

    /// With a different quiet interval
    #[must_use]
    pub fn with_quiet_interval(mut self, quiet: Duration) -> Self {
        self.quiet = quiet;
        self
    }

    /// Quiet interval
    #[inline]
    #[must_use]
    pub fn quiet_interval(&self) -> Duration {
        self.quiet
    }

    /// React to the field's text changing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_input_change(&self, text: &str) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }

        let query = text.trim();
        if query.is_empty() {
            self.state.send_replace(LookupState::Idle);
            return;
        }
        self.state.send_replace(LookupState::Pending {
            query: query.to_string(),
        });

        let generation = slot.generation;
        let quiet = self.quiet;
        let query = query.to_string();
        let lookup = Arc::clone(&self.lookup);
        let shared = Arc::clone(&self.slot);
        let state = Arc::clone(&self.state);

        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            if shared.lock().generation != generation {
                return;
            }
            // Detached: aborting the timer after this point must not abort the request.
            tokio::spawn(resolve(lookup, shared, state, generation, query));
        }));
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> LookupState {
        self.state.borrow().clone()
    }

    /// Entity confirmed by the latest completed lookup
    #[must_use]
    pub fn confirmed(&self) -> Option<EntityMatch> {
        self.state.borrow().matched().cloned()
    }

    /// Receiver notified on every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LookupState> {
        self.state.subscribe()
    }

    /// Wait until no lookup is scheduled or in flight
    pub async fn settled(&self) -> LookupState {
        let mut rx = self.state.subscribe();
        let settled = match rx.wait_for(LookupState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }
}

impl<L> Drop for DebouncedLookup<L> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
    }
}

impl<L> std::fmt::Debug for DebouncedLookup<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedLookup")
            .field("quiet", &self.quiet)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

async fn resolve<L: EntityLookup>(
    lookup: Arc<L>,
    slot: Arc<Mutex<Slot>>,
    state: Arc<watch::Sender<LookupState>>,
    generation: u64,
    query: String,
) {
    tracing::debug!(%query, "Looking up entity");
    let next = match lookup.lookup(&query).await {
        Ok(entity) => LookupState::Matched(entity),
        Err(e) if e.kind() == ErrorKind::NotFound => LookupState::NotFound { query },
        Err(e) => {
            tracing::warn!(%query, "Entity lookup failed: {}", e);
            LookupState::Unavailable {
                query,
                message: e.to_string(),
            }
        }
    };

    let slot = slot.lock();
    if slot.generation != generation {
        tracing::debug!("Discarding superseded lookup result");
        return;
    }
    state.send_replace(next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_model::PoolError;
    use pool_test_utils::{eevee, pikachu, ScriptedLookup};
    use pretty_assertions::assert_eq;
    use tokio::time::{sleep, Instant};

    fn field_with(lookup: ScriptedLookup) -> (DebouncedLookup<ScriptedLookup>, Arc<ScriptedLookup>) {
        let lookup = Arc::new(lookup);
        (DebouncedLookup::shared(Arc::clone(&lookup)), lookup)
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_last_burst_input_is_looked_up() {
        let (field, lookup) = field_with(ScriptedLookup::new().with_entity(pikachu()));
        let start = Instant::now();

        field.on_input_change("pik");
        sleep(Duration::from_millis(100)).await;
        field.on_input_change("pika");
        sleep(Duration::from_millis(600)).await;
        field.on_input_change("pikachu");
        assert_eq!(lookup.call_count(), 0);

        let settled = field.settled().await;

        let calls = lookup.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "pikachu");
        assert_eq!(calls[0].1 - start, Duration::from_millis(1300));
        assert_eq!(settled, LookupState::Matched(pikachu()));
        assert_eq!(field.confirmed(), Some(pikachu()));
    }

    #[tokio::test(start_paused = true)]
    async fn settled_returns_at_once_when_nothing_is_pending() {
        let (field, lookup) = field_with(ScriptedLookup::new());
        let start = Instant::now();

        assert_eq!(field.settled().await, LookupState::Idle);
        assert_eq!(Instant::now(), start);
        assert_eq!(lookup.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_clears_without_lookup() {
        let (field, lookup) = field_with(ScriptedLookup::new().with_entity(pikachu()));

        field.on_input_change("pikachu");
        field.on_input_change("   ");
        assert_eq!(field.state(), LookupState::Idle);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(lookup.call_count(), 0);
        assert_eq!(field.state(), LookupState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn miss_is_neutral_not_found() {
        let (field, _) = field_with(ScriptedLookup::new());

        field.on_input_change("  Missingno ");
        assert_eq!(
            field.state(),
            LookupState::Pending {
                query: "Missingno".to_string()
            }
        );

        let settled = field.settled().await;
        assert_eq!(
            settled,
            LookupState::NotFound {
                query: "Missingno".to_string()
            }
        );
        assert_eq!(field.confirmed(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_is_unavailable() {
        let (field, _) = field_with(
            ScriptedLookup::new().with_error("pikachu", PoolError::transport("connection reset")),
        );

        field.on_input_change("pikachu");
        let settled = field.settled().await;

        assert_eq!(
            settled,
            LookupState::Unavailable {
                query: "pikachu".to_string(),
                message: "connection reset".to_string()
            }
        );
        assert_eq!(settled.label(), "Lookup unavailable: connection reset");
    }

    #[tokio::test(start_paused = true)]
    async fn stale_in_flight_result_is_discarded() {
        let (field, lookup) = field_with(
            ScriptedLookup::new()
                .with_entity(eevee())
                .with_entity(pikachu())
                .with_delay("eevee", Duration::from_millis(1000)),
        );

        field.on_input_change("eevee");
        sleep(Duration::from_millis(700)).await;
        assert_eq!(lookup.queries(), vec!["eevee"]);

        field.on_input_change("pikachu");
        sleep(Duration::from_millis(700)).await;
        assert_eq!(field.state(), LookupState::Matched(pikachu()));

        // The eevee response lands at t=1600 and must not overwrite pikachu.
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(lookup.queries(), vec!["eevee", "pikachu"]);
        assert_eq!(field.state(), LookupState::Matched(pikachu()));
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_during_flight_keeps_idle() {
        let (field, _) = field_with(
            ScriptedLookup::new()
                .with_entity(eevee())
                .with_delay("eevee", Duration::from_millis(500)),
        );

        field.on_input_change("eevee");
        sleep(Duration::from_millis(700)).await;
        field.on_input_change("");

        sleep(Duration::from_secs(1)).await;
        assert_eq!(field.state(), LookupState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn fields_do_not_cancel_each_other() {
        let lookup = Arc::new(ScriptedLookup::new().with_entity(pikachu()).with_entity(eevee()));
        let first = DebouncedLookup::shared(Arc::clone(&lookup));
        let second = DebouncedLookup::shared(Arc::clone(&lookup));

        first.on_input_change("pikachu");
        sleep(Duration::from_millis(300)).await;
        second.on_input_change("eevee");

        assert_eq!(first.settled().await, LookupState::Matched(pikachu()));
        assert_eq!(second.settled().await, LookupState::Matched(eevee()));
        assert_eq!(lookup.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_transitions() {
        let (field, _) = field_with(ScriptedLookup::new().with_entity(pikachu()));
        let mut rx = field.subscribe();

        field.on_input_change("pikachu");
        rx.changed().await.unwrap();
        assert!(matches!(*rx.borrow_and_update(), LookupState::Pending { .. }));

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), LookupState::Matched(pikachu()));
    }

    #[test]
    fn labels() {
        assert_eq!(LookupState::Idle.label(), "");
        assert_eq!(LookupState::Matched(pikachu()).label(), "Pikachu (#25)");
        assert_eq!(
            LookupState::NotFound {
                query: "x".to_string()
            }
            .label(),
            "Not found"
        );
    }
}
