// self
use crate::obs::{OperationKind, OperationOutcome};

/// Counter incremented for every operation attempt and outcome.
pub const OPERATION_COUNTER: &str = "zephyr_squad_operation_total";

/// Increments [`OPERATION_COUNTER`] via the global metrics recorder (when enabled).
///
/// `error` is the failure class from [`crate::Error::label`], or `none` for attempts and
/// successes.
pub fn record_operation_outcome(
	kind: OperationKind,
	outcome: OperationOutcome,
	error: &'static str,
) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			OPERATION_COUNTER,
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str(),
			"error" => error
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recording_without_recorder_is_a_noop() {
		record_operation_outcome(OperationKind::SignToken, OperationOutcome::Failure, "config");
		record_operation_outcome(OperationKind::ResolveIssue, OperationOutcome::Attempt, "none");
	}
}
