//! Crate-level error types shared by the signing pipeline and its HTTP collaborators.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (credentials, environment, project lookup).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The caller supplied a request that cannot be signed or dispatched.
	#[error(transparent)]
	InvalidRequest(#[from] InvalidRequestError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The remote service answered, but not with something usable.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
}
impl Error {
	/// Returns a stable label for the failure class, used in span and metric fields.
	pub const fn label(&self) -> &'static str {
		match self {
			Error::Config(_) => "config",
			Error::InvalidRequest(_) => "invalid_request",
			Error::Transport(_) => "transport",
			Error::Upstream(_) => "upstream",
		}
	}
}

/// Configuration and validation failures detected before any request is made.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A credential field required for signing is empty.
	#[error("Zephyr credential `{field}` is missing.")]
	MissingCredential {
		/// Name of the empty credential field.
		field: &'static str,
	},
	/// A required environment variable is unset or empty.
	#[error("Environment variable `{var}` is not set.")]
	MissingEnvVar {
		/// Variable name.
		var: &'static str,
	},
	/// A configured URL could not be parsed.
	#[error("Environment variable `{var}` does not contain a valid URL.")]
	InvalidUrl {
		/// Variable name.
		var: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A project mapping entry is not of the form `KEY=ID`.
	#[error("Project mapping entry `{entry}` must look like `KEY=ID`.")]
	InvalidProjectEntry {
		/// Offending entry.
		entry: String,
	},
	/// No numeric project id is configured for the project key.
	#[error("Project id not found for project key `{project}`.")]
	UnknownProject {
		/// Project key taken from the issue key.
		project: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Request-shape failures; these indicate caller mistakes and are never retried.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum InvalidRequestError {
	/// The URL lacks the segment separating the API base path from the resource path.
	#[error("Zephyr Squad endpoint URL must contain `{marker}`: {url}.")]
	MissingBasePathMarker {
		/// URL that failed validation.
		url: String,
		/// Marker that was expected.
		marker: String,
	},
	/// The URL is not an absolute URI.
	#[error("Request URL is malformed: {url}.")]
	MalformedUrl {
		/// URL that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The issue key cannot be embedded in a request path.
	#[error("Issue key `{key}` is malformed.")]
	MalformedIssueKey {
		/// Offending issue key.
		key: String,
	},
	/// The issue time is so late that the expiry claim would overflow.
	#[error("Issue time {iat} leaves no room for the token lifetime.")]
	IssuedAtOutOfRange {
		/// Rejected issue time, epoch seconds.
		iat: i64,
	},
	/// The resolver has no id for the issue key.
	#[error("Issue key `{key}` is unknown.")]
	UnknownIssue {
		/// Issue key that could not be resolved.
		key: String,
	},
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {service}.")]
	Network {
		/// Remote service label.
		service: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(service: &'static str, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { service, source: Box::new(src) }
	}
}

/// Failures reported by, or caused by the responses of, remote services.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// The service answered with a non-success status.
	#[error("{service} responded with HTTP {status}.")]
	Status {
		/// Remote service label.
		service: &'static str,
		/// HTTP status code.
		status: u16,
	},
	/// The service answered with JSON that does not match the expected shape.
	#[error("{service} returned malformed JSON.")]
	Parse {
		/// Remote service label.
		service: &'static str,
		/// Structured parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
