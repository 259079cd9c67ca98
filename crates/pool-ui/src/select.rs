//! Incremental search over a large candidate list

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Most candidates shown at once
pub const DEFAULT_MAX_RESULTS: usize = 150;

/// Delay between losing focus and closing the list
pub const DEFAULT_BLUR_GRACE: Duration = Duration::from_millis(150);

/// Keys the select reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Highlight the next candidate
    Down,
    /// Highlight the previous candidate
    Up,
    /// Select the highlighted candidate
    Enter,
    /// Close the list
    Escape,
}

type Listener = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Default)]
struct SelectState {
    query: String,
    /// Indices into the candidate list, in candidate order
    filtered: Vec<usize>,
    highlight: Option<usize>,
    open: bool,
    value: String,
    blur_generation: u64,
    blur_timer: Option<JoinHandle<()>>,
}

impl SelectState {
    fn cancel_blur(&mut self) {
        self.blur_generation += 1;
        if let Some(timer) = self.blur_timer.take() {
            timer.abort();
        }
    }

    fn close(&mut self) {
        self.open = false;
        self.highlight = None;
    }
}

/// Search-as-you-type select over an immutable candidate list
///
/// Clones share the same view state, so a clone can be handed to the task
/// that delivers input events.
#[derive(Clone)]
pub struct SearchSelect {
    candidates: Arc<[String]>,
    folded: Arc<[String]>,
    max_results: usize,
    blur_grace: Duration,
    state: Arc<Mutex<SelectState>>,
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl SearchSelect {
    /// Select over `candidates` with the default limits
    #[must_use]
    pub fn new(candidates: impl Into<Arc<[String]>>) -> Self {
        let candidates: Arc<[String]> = candidates.into();
        let folded: Arc<[String]> = candidates.iter().map(|c| c.to_lowercase()).collect();
        let select = Self {
            candidates,
            folded,
            max_results: DEFAULT_MAX_RESULTS,
            blur_grace: DEFAULT_BLUR_GRACE,
            state: Arc::new(Mutex::new(SelectState::default())),
            listeners: Arc::new(Mutex::new(Vec::new())),
        };
        select.refilter(&mut select.state.lock());
        select
    }

    /// With a different result cap
    #[must_use]
    pub fn with_max_results(self, max_results: usize) -> Self {
        let select = Self {
            max_results,
            ..self
        };
        select.refilter(&mut select.state.lock());
        select
    }

    /// With a different blur grace period
    #[must_use]
    pub fn with_blur_grace(mut self, blur_grace: Duration) -> Self {
        self.blur_grace = blur_grace;
        self
    }

    /// Full candidate list
    #[inline]
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Candidates containing `query` (trimmed, case-insensitive), at most
    /// `max_results`, in candidate order. A blank query matches everything.
    #[must_use]
    pub fn filter(&self, query: &str) -> Vec<String> {
        self.matching(query)
            .into_iter()
            .map(|i| self.candidates[i].clone())
            .collect()
    }

    fn matching(&self, query: &str) -> Vec<usize> {
        let needle = query.trim().to_lowercase();
        self.folded
            .iter()
            .enumerate()
            .filter(|(_, folded)| needle.is_empty() || folded.contains(&needle))
            .map(|(i, _)| i)
            .take(self.max_results)
            .collect()
    }

    fn refilter(&self, state: &mut SelectState) {
        state.filtered = self.matching(&state.query);
        state.highlight = None;
    }

    /// Replace the query text; recomputes the results, clears the highlight,
    /// and opens the list
    pub fn set_query(&self, text: &str) {
        let mut state = self.state.lock();
        state.query = text.to_string();
        self.refilter(&mut state);
        state.open = true;
    }

    /// Current query text
    #[must_use]
    pub fn query(&self) -> String {
        self.state.lock().query.clone()
    }

    /// Currently shown candidates
    #[must_use]
    pub fn results(&self) -> Vec<String> {
        let state = self.state.lock();
        state
            .filtered
            .iter()
            .map(|&i| self.candidates[i].clone())
            .collect()
    }

    /// Number of shown candidates
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.state.lock().filtered.len()
    }

    /// Index of the highlighted result
    #[must_use]
    pub fn highlighted(&self) -> Option<usize> {
        self.state.lock().highlight
    }

    /// Highlighted candidate
    #[must_use]
    pub fn highlighted_value(&self) -> Option<String> {
        let state = self.state.lock();
        state
            .highlight
            .and_then(|h| state.filtered.get(h))
            .map(|&i| self.candidates[i].clone())
    }

    /// Last selected value
    #[must_use]
    pub fn value(&self) -> String {
        self.state.lock().value.clone()
    }

    /// Whether the list is shown
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    /// Move the highlight by `delta`, clamped to the results.
    ///
    /// From no highlight, any move lands on the first result. Returns the new
    /// highlight, `None` when there are no results.
    pub fn move_highlight(&self, delta: isize) -> Option<usize> {
        let mut state = self.state.lock();
        let count = state.filtered.len();
        if count == 0 {
            state.highlight = None;
            return None;
        }

        let last = isize::try_from(count - 1).unwrap_or(isize::MAX);
        let current = state
            .highlight
            .and_then(|h| isize::try_from(h).ok())
            .unwrap_or(-1);
        let next = current.saturating_add(delta).clamp(0, last);
        let next = usize::try_from(next).unwrap_or(0);
        state.highlight = Some(next);
        Some(next)
    }

    /// Select `explicit`, or the highlighted result when `None`.
    ///
    /// No-op returning `None` when there is nothing to select. A selection
    /// becomes the value and the query, closes the list, and notifies
    /// listeners.
    pub fn confirm(&self, explicit: Option<&str>) -> Option<String> {
        let chosen = {
            let mut state = self.state.lock();
            let chosen = match explicit {
                Some(value) => value.to_string(),
                None => state
                    .highlight
                    .and_then(|h| state.filtered.get(h))
                    .map(|&i| self.candidates[i].clone())?,
            };
            state.value = chosen.clone();
            state.query = chosen.clone();
            self.refilter(&mut state);
            state.close();
            chosen
        };

        tracing::debug!(value = %chosen, "Candidate selected");
        // Snapshot so a listener may register further listeners
        let listeners: Vec<Listener> = self.listeners.lock().clone();
        for listener in &listeners {
            listener(&chosen);
        }
        Some(chosen)
    }

    /// Call `listener` with every selected value
    pub fn on_select(&self, listener: impl Fn(&str) + Send + Sync + 'static) {
        self.listeners.lock().push(Arc::new(listener));
    }

    /// Show the list for the current query
    pub fn open(&self) {
        let mut state = self.state.lock();
        self.refilter(&mut state);
        state.open = true;
    }

    /// Hide the list
    pub fn close(&self) {
        self.state.lock().close();
    }

    /// Input gained focus: open, cancelling a pending blur close
    pub fn focus(&self) {
        let mut state = self.state.lock();
        state.cancel_blur();
        self.refilter(&mut state);
        state.open = true;
    }

    /// Input lost focus: close after the grace period.
    ///
    /// The delay lets a pointer selection on the list land first. Must be
    /// called from within a tokio runtime.
    pub fn blur(&self) {
        let mut state = self.state.lock();
        state.cancel_blur();

        let generation = state.blur_generation;
        let grace = self.blur_grace;
        let shared = Arc::clone(&self.state);
        state.blur_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let mut state = shared.lock();
            if state.blur_generation == generation {
                state.close();
                state.blur_timer = None;
            }
        }));
    }

    /// Keyboard handling.
    ///
    /// While closed, any key opens the list and is otherwise ignored. Returns
    /// the selected value when `Enter` selects one.
    pub fn handle_key(&self, key: Key) -> Option<String> {
        if !self.is_open() {
            self.open();
            return None;
        }

        match key {
            Key::Down => {
                self.move_highlight(1);
                None
            }
            Key::Up => {
                self.move_highlight(-1);
                None
            }
            Key::Enter => self.confirm(None),
            Key::Escape => {
                self.close();
                None
            }
        }
    }
}

impl std::fmt::Debug for SearchSelect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSelect")
            .field("candidates", &self.candidates.len())
            .field("max_results", &self.max_results)
            .field("blur_grace", &self.blur_grace)
            .finish_non_exhaustive()
    }
}
