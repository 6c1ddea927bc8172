// self
use crate::{
	_prelude::*,
	obs::{self, OperationKind, OperationOutcome},
	qsh::QueryStringHash,
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// Span around one signing or HTTP operation.
///
/// Creating the span counts an attempt; [`OperationSpan::finish`] records the outcome on both
/// the span and the counter. Request details are attached with the `record_*` methods as they
/// become known.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	kind: OperationKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Opens a span for `kind` and counts the attempt.
	pub fn new(kind: OperationKind) -> Self {
		obs::record_operation_outcome(kind, OperationOutcome::Attempt, "none");

		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"zephyr_squad.operation",
				operation = kind.as_str(),
				method = tracing::field::Empty,
				qsh = tracing::field::Empty,
				issue_key = tracing::field::Empty,
				outcome = tracing::field::Empty,
				error = tracing::field::Empty,
			);

			Self { kind, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			Self { kind }
		}
	}

	/// Operation this span covers.
	pub fn kind(&self) -> OperationKind {
		self.kind
	}

	/// Records the HTTP method in its canonical, upper-cased form.
	pub fn record_method(&self, method: &str) {
		#[cfg(feature = "tracing")]
		self.span.record("method", crate::canonical::canonicalize_method(method).as_str());
		#[cfg(not(feature = "tracing"))]
		let _ = method;
	}

	/// Records the `qsh` claim the token was bound to.
	pub fn record_qsh(&self, qsh: &QueryStringHash) {
		#[cfg(feature = "tracing")]
		self.span.record("qsh", qsh.as_str());
		#[cfg(not(feature = "tracing"))]
		let _ = qsh;
	}

	/// Records the Jira issue key being resolved or fetched.
	pub fn record_issue_key(&self, issue_key: &str) {
		#[cfg(feature = "tracing")]
		self.span.record("issue_key", issue_key);
		#[cfg(not(feature = "tracing"))]
		let _ = issue_key;
	}

	/// Runs `f` with the span entered.
	pub fn in_scope<F, R>(&self, f: F) -> R
	where
		F: FnOnce() -> R,
	{
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(f)
		}
		#[cfg(not(feature = "tracing"))]
		{
			f()
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Records the outcome and, on failure, the error class.
	pub fn finish<T>(&self, result: &Result<T>) {
		let outcome = OperationOutcome::of(result);
		let error = obs::error_label(result);

		#[cfg(feature = "tracing")]
		{
			self.span.record("outcome", outcome.as_str());

			if result.is_err() {
				self.span.record("error", error);
			}
		}

		obs::record_operation_outcome(self.kind, outcome, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::InvalidRequestError;

	#[test]
	fn signing_details_record_without_subscriber() {
		let span = OperationSpan::new(OperationKind::SignToken);

		span.record_method("get");
		span.record_qsh(
			&crate::qsh::compute_digest("GET", "https://host/public/x")
				.expect("Digest should compute."),
		);

		let result = span.in_scope(|| {
			Err::<(), _>(Error::from(InvalidRequestError::MalformedIssueKey { key: "TR 1".into() }))
		});

		span.finish(&result);

		assert_eq!(span.kind(), OperationKind::SignToken);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OperationSpan::new(OperationKind::FetchTestSteps);

		span.record_issue_key("TR-1994");

		let value = span.instrument(async { Ok::<_, Error>(42) }).await;

		span.finish(&value);

		assert_eq!(value.expect("Instrumented future should resolve."), 42);
	}
}
