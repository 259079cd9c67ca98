//! Submission workflow
//!
//! Validates a filled-in form against the confirmed entity, turns it into a
//! [`Record`], and appends it through an [`AppendCoordinator`]. The store
//! holds [`StoredRecord`]s, so records already in the document are sent back
//! exactly as they were read.

use crate::error::SubmissionError;
use pool_append::{AppendCoordinator, AppendOutcome, AppendPolicy, AppendState};
use pool_model::{capitalize, EntityMatch, Record, StoredRecord};
use pool_store::DocumentStore;

/// Move slots on the form
pub const MAX_MOVES: usize = 4;

/// Label on the idle submit button
pub const SUBMIT_LABEL: &str = "Submit Egg";

/// Raw form values, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionForm {
    /// Trainer name
    pub submitter: String,
    /// Optional nickname
    pub nickname: String,
    /// Optional ability
    pub ability: String,
    /// Optional held item
    pub item: String,
    /// Up to [`MAX_MOVES`] moves; blanks are allowed
    pub moves: Vec<String>,
    /// Optional message
    pub message: String,
}

impl SubmissionForm {
    /// Form with only the trainer name filled in
    #[must_use]
    pub fn new(submitter: impl Into<String>) -> Self {
        Self {
            submitter: submitter.into(),
            ..Self::default()
        }
    }

    /// With nickname
    #[must_use]
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = nickname.into();
        self
    }

    /// With ability
    #[must_use]
    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.ability = ability.into();
        self
    }

    /// With held item
    #[must_use]
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = item.into();
        self
    }

    /// With moves; anything past [`MAX_MOVES`] is ignored
    #[must_use]
    pub fn with_moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves = moves.into_iter().take(MAX_MOVES).map(Into::into).collect();
        self
    }

    /// With message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Check the form before anything goes over the network.
    ///
    /// The trainer name is checked first, then the entity.
    ///
    /// # Errors
    /// `SubmissionError::Invalid` with the message shown to the user
    pub fn validate<'e>(
        &self,
        entity: Option<&'e EntityMatch>,
    ) -> Result<&'e EntityMatch, SubmissionError> {
        if self.submitter.trim().is_empty() {
            return Err(SubmissionError::Invalid(
                "Please enter your trainer name.".to_string(),
            ));
        }
        entity.ok_or_else(|| {
            SubmissionError::Invalid(
                "Please enter a valid Pokemon name and wait for it to be confirmed.".to_string(),
            )
        })
    }

    /// Build the record: text trimmed, blank moves dropped
    #[must_use]
    pub fn to_record(&self, entity: &EntityMatch) -> Record {
        let moves: Vec<&str> = self
            .moves
            .iter()
            .take(MAX_MOVES)
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .collect();

        Record::builder(self.submitter.trim(), entity)
            .nickname(self.nickname.trim())
            .ability(self.ability.trim())
            .item(self.item.trim())
            .moves(moves)
            .message(self.message.trim())
            .build()
    }
}

/// Commit message for a record
#[must_use]
pub fn commit_message(record: &Record) -> String {
    format!(
        "Add egg from {} ({})",
        record.submitter,
        capitalize(&record.entity_name)
    )
}

/// Submit button label for an append state
#[must_use]
pub fn progress_label(state: &AppendState, max_attempts: u32) -> String {
    match *state {
        AppendState::Reading { attempt } | AppendState::Writing { attempt } if attempt <= 1 => {
            "Submitting…".to_string()
        }
        AppendState::Reading { attempt }
        | AppendState::Writing { attempt }
        | AppendState::Retrying { attempt, .. } => {
            format!("Retrying… ({attempt}/{max_attempts})")
        }
        AppendState::Idle | AppendState::Succeeded { .. } | AppendState::Failed { .. } => {
            SUBMIT_LABEL.to_string()
        }
    }
}

/// A record that made it into the pool
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    /// Record as committed
    pub record: Record,
    /// Append details
    pub outcome: AppendOutcome,
}

impl SubmissionReceipt {
    /// Confirmation line shown after a successful submit
    #[must_use]
    pub fn detail(&self) -> String {
        let name = capitalize(&self.record.entity_name);
        if self.record.nickname.is_empty() {
            format!("{name} from {} has been added to the egg pool.", self.record.submitter)
        } else {
            format!(
                "{name} (nicknamed \"{}\") from {} has been added to the egg pool.",
                self.record.nickname, self.record.submitter
            )
        }
    }
}

/// Validates forms and appends them to the pool
#[derive(Debug, Clone)]
pub struct SubmissionService<S> {
    coordinator: AppendCoordinator<S>,
}

impl<S> SubmissionService<S>
where
    S: DocumentStore<Record = StoredRecord>,
{
    /// Service with the default append policy
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            coordinator: AppendCoordinator::new(store),
        }
    }

    /// Service with an explicit append policy
    #[must_use]
    pub fn with_policy(store: S, policy: AppendPolicy) -> Self {
        Self {
            coordinator: AppendCoordinator::with_policy(store, policy),
        }
    }

    /// Append policy in use
    #[inline]
    #[must_use]
    pub fn policy(&self) -> AppendPolicy {
        self.coordinator.policy()
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        self.coordinator.store()
    }

    /// Validate and append.
    ///
    /// # Errors
    /// `Invalid` before any network call, `Failed` once the append gives up
    pub async fn submit(
        &self,
        form: &SubmissionForm,
        entity: Option<&EntityMatch>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        self.submit_observed(form, entity, |_| {}).await
    }

    /// [`submit`](Self::submit), reporting append progress to `observe`.
    ///
    /// # Errors
    /// As [`submit`](Self::submit).
    pub async fn submit_observed<F>(
        &self,
        form: &SubmissionForm,
        entity: Option<&EntityMatch>,
        observe: F,
    ) -> Result<SubmissionReceipt, SubmissionError>
    where
        F: FnMut(&AppendState) + Send,
    {
        let entity = form.validate(entity)?;
        let record = form.to_record(entity);
        let encoded =
            StoredRecord::encode(&record).map_err(|e| SubmissionError::Invalid(e.to_string()))?;
        let description = commit_message(&record);

        tracing::info!(
            submitter = %record.submitter,
            entity = %record.entity_name,
            id = %record.id,
            "Submitting egg"
        );

        let outcome = self
            .coordinator
            .append_observed(encoded, &description, observe)
            .await?;
        Ok(SubmissionReceipt { record, outcome })
    }
}
