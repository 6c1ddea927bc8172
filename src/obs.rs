//! Optional observability helpers for signing and the HTTP collaborators.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `zephyr_squad.operation`. Every span carries
//!   `operation`, `outcome` and, on failure, `error`. Signing spans add the upper-cased `method`
//!   and the `qsh` claim; Jira and Zephyr spans add the `issue_key`.
//! - Enable `metrics` to increment `zephyr_squad_operation_total` once per attempt and once per
//!   outcome, labeled by `operation`, `outcome`, and `error` (`none` unless the call failed).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Canonicalizing, hashing, and signing a request token.
	SignToken,
	/// Resolving a Jira issue key to its numeric id.
	ResolveIssue,
	/// Fetching test steps from Zephyr.
	FetchTestSteps,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::SignToken => "sign_token",
			OperationKind::ResolveIssue => "resolve_issue",
			OperationKind::FetchTestSteps => "fetch_test_steps",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto [`OperationOutcome::Success`] or [`OperationOutcome::Failure`].
	pub fn of<T>(result: &Result<T, Error>) -> Self {
		if result.is_ok() { OperationOutcome::Success } else { OperationOutcome::Failure }
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Returns [`Error::label`] for a failed result and `none` otherwise.
pub fn error_label<T>(result: &Result<T, Error>) -> &'static str {
	result.as_ref().err().map_or("none", Error::label)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{ConfigError, InvalidRequestError, TransportError};

	#[test]
	fn labels_are_stable() {
		assert_eq!(OperationKind::SignToken.to_string(), "sign_token");
		assert_eq!(OperationKind::FetchTestSteps.as_str(), "fetch_test_steps");
		assert_eq!(OperationOutcome::of(&Ok(1)), OperationOutcome::Success);
		assert_eq!(
			OperationOutcome::of::<()>(&Err(ConfigError::MissingCredential { field: "x" }.into())),
			OperationOutcome::Failure
		);
	}

	#[test]
	fn failures_are_labeled_by_error_class() {
		let missing = Err::<(), Error>(ConfigError::MissingCredential { field: "secret_key" }.into());
		let marker = Err::<(), Error>(
			InvalidRequestError::MissingBasePathMarker {
				url: "https://host/x".into(),
				marker: "/public".into(),
			}
			.into(),
		);
		let network = Err::<(), Error>(
			TransportError::network("Jira", std::io::Error::other("connection reset")).into(),
		);

		assert_eq!(error_label(&Ok::<_, Error>(())), "none");
		assert_eq!(error_label(&missing), "config");
		assert_eq!(error_label(&marker), "invalid_request");
		assert_eq!(error_label(&network), "transport");
	}
}
