//! Account record model and its one-shot outcome transition.
//!
//! A record is `Pending` when parsed and is moved exactly once into either
//! `Succeeded` or `Failed` by the batch runner.

/// Reason recorded when a registration fails without any cause message.
const UNKNOWN_FAILURE: &str = "unknown error";

/// Reason recorded when the remote side reports success but hands out no token.
const EMPTY_TOKEN: &str = "remote system returned an empty token";

/// Registration outcome for one account.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Not yet processed.
    #[default]
    Pending,

    /// Registration succeeded; holds the issued application token.
    Succeeded { token: String },

    /// Registration failed; holds a human-readable cause.
    Failed { reason: String },
}

/// One row of input plus its registration outcome.
///
/// # Invariants
///
/// After processing, exactly one of these holds:
/// - `succeeded()` with a non-empty `token()` and an empty `failure_reason()`
/// - `!succeeded()` with an empty `token()` and a non-empty `failure_reason()`
///
/// The outcome is only set through [`AccountRecord::succeed`] and
/// [`AccountRecord::fail`], which uphold this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    /// Remote base address, e.g. `https://dss.example:8080`.
    pub endpoint: String,

    /// Login name on the remote system.
    pub user: String,

    /// Plaintext password for `user`.
    pub secret: String,

    outcome: Outcome,
}

impl AccountRecord {
    /// Creates a pending record.
    pub fn new(
        endpoint: impl Into<String>,
        user: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        AccountRecord {
            endpoint: endpoint.into(),
            user: user.into(),
            secret: secret.into(),
            outcome: Outcome::Pending,
        }
    }

    /// Returns the current outcome.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Returns `true` if the record has not been processed yet.
    pub fn is_pending(&self) -> bool {
        self.outcome == Outcome::Pending
    }

    /// Returns `true` if registration succeeded.
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded { .. })
    }

    /// Issued token, or `""` unless registration succeeded.
    pub fn token(&self) -> &str {
        match &self.outcome {
            Outcome::Succeeded { token } => token,
            _ => "",
        }
    }

    /// Failure cause, or `""` unless registration failed.
    pub fn failure_reason(&self) -> &str {
        match &self.outcome {
            Outcome::Failed { reason } => reason,
            _ => "",
        }
    }

    /// Consumes a pending record and returns it marked as succeeded.
    ///
    /// An empty token cannot satisfy the record invariant and is recorded
    /// as a failure instead.
    pub fn succeed(self, token: impl Into<String>) -> Self {
        let token = token.into();
        if token.is_empty() {
            return self.fail(EMPTY_TOKEN);
        }
        AccountRecord {
            outcome: Outcome::Succeeded { token },
            ..self
        }
    }

    /// Consumes a pending record and returns it marked as failed.
    pub fn fail(self, reason: impl Into<String>) -> Self {
        let mut reason = reason.into();
        if reason.is_empty() {
            reason = UNKNOWN_FAILURE.to_string();
        }
        AccountRecord {
            outcome: Outcome::Failed { reason },
            ..self
        }
    }

    /// Verifies the post-processing invariant.
    #[cfg(debug_assertions)]
    pub fn check_invariant(&self) -> bool {
        match &self.outcome {
            Outcome::Pending => self.token().is_empty() && self.failure_reason().is_empty(),
            Outcome::Succeeded { token } => !token.is_empty() && self.failure_reason().is_empty(),
            Outcome::Failed { reason } => !reason.is_empty() && self.token().is_empty(),
        }
    }
}
