//! Error taxonomy for the egg pool
//!
//! Every failure that crosses a crate boundary is a [`PoolError`]. Callers
//! branch on [`PoolError::kind`], never on the message text; the message is
//! kept verbatim so it can be shown to an operator unchanged.

/// Discriminant of a [`PoolError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Version token mismatch on a conditional write (retryable)
    Conflict,
    /// Network failure or unexpected non-2xx response
    Transport,
    /// Entity lookup miss; a valid negative answer, not a fault
    NotFound,
    /// Caller input rejected before any network call
    Validation,
}

impl ErrorKind {
    /// Human-readable label
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Conflict => "conflict",
            Self::Transport => "transport",
            Self::NotFound => "not found",
            Self::Validation => "validation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Tagged error shared by stores, providers and workflows
///
/// `Display` renders the original message only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Network failure or non-success response
    #[error("{message}")]
    Transport {
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Original message
        message: String,
    },

    /// Write rejected because the version token is stale
    #[error("{message}")]
    Conflict {
        /// HTTP status reported by the store (409 or 422)
        status: u16,
        /// Original message
        message: String,
    },

    /// Requested entity does not exist
    #[error("{message}")]
    NotFound {
        /// Original message
        message: String,
    },

    /// Caller-supplied input is incomplete
    #[error("{0}")]
    Validation(String),
}

impl PoolError {
    /// Transport failure without a response status
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Transport failure carrying the response status
    pub fn transport_status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Version conflict
    pub fn conflict(status: u16, message: impl Into<String>) -> Self {
        Self::Conflict {
            status,
            message: message.into(),
        }
    }

    /// Lookup miss
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Rejected input
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classify a failed conditional write by status code.
    ///
    /// 409 and 422 are conflicts; every other status is a transport failure.
    pub fn from_write_status(status: u16, message: impl Into<String>) -> Self {
        if matches!(status, 409 | 422) {
            Self::conflict(status, message)
        } else {
            Self::transport_status(status, message)
        }
    }

    /// Error discriminant
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }

    /// HTTP status, if one was received
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Conflict { status, .. } => Some(*status),
            Self::NotFound { .. } | Self::Validation(_) => None,
        }
    }

    /// Original message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message, .. }
            | Self::Conflict { message, .. }
            | Self::NotFound { message } => message,
            Self::Validation(message) => message,
        }
    }

    /// Only conflicts are worth retrying with a fresh read
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

/// Result alias for egg pool operations
pub type PoolResult<T> = Result<T, PoolError>;
