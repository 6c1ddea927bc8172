//! Query string hash (QSH) computation.
//!
//! The QSH is the lowercase hex SHA-256 of a [`CanonicalRequest`] and is embedded in the token
//! as the `qsh` claim, binding the token to exactly one method, path, and query.

// crates.io
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, canonical::CanonicalRequest, error::InvalidRequestError};

/// Path segment that separates the Zephyr connect base path from the resource path.
pub const BASE_PATH_MARKER: &str = "/public";

/// Lowercase hex SHA-256 digest of a canonical request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryStringHash(String);
impl QueryStringHash {
	/// Hashes the rendered canonical request.
	pub fn of(request: &CanonicalRequest) -> Self {
		Self(hex::encode(Sha256::digest(request.to_string().as_bytes())))
	}

	/// Returns the hex digest.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for QueryStringHash {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Display for QueryStringHash {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl From<QueryStringHash> for String {
	fn from(value: QueryStringHash) -> Self {
		value.0
	}
}

/// Computes the QSH for `method` and `url` using [`BASE_PATH_MARKER`].
pub fn compute_digest(method: &str, url: &str) -> Result<QueryStringHash, InvalidRequestError> {
	compute_digest_with_marker(method, url, BASE_PATH_MARKER)
}

/// Computes the QSH for `method` and `url`, splitting the base path at `marker`.
pub fn compute_digest_with_marker(
	method: &str,
	url: &str,
	marker: &str,
) -> Result<QueryStringHash, InvalidRequestError> {
	canonical_request(method, url, marker).map(|request| QueryStringHash::of(&request))
}

/// Validates `url` and builds its [`CanonicalRequest`].
///
/// The base path is everything in the URL path up to and including the first occurrence of
/// `marker` that ends a path segment, so `/public` matches `/connect/public/rest` but not
/// `/publicapi`. The marker check runs on the raw string before the URL is parsed.
pub fn canonical_request(
	method: &str,
	url: &str,
	marker: &str,
) -> Result<CanonicalRequest, InvalidRequestError> {
	if !url.contains(marker) {
		return Err(InvalidRequestError::MissingBasePathMarker {
			url: url.to_owned(),
			marker: marker.to_owned(),
		});
	}

	let parsed = Url::parse(url)
		.map_err(|source| InvalidRequestError::MalformedUrl { url: url.to_owned(), source })?;
	let path = parsed.path();
	// A marker that only shows up in the query, or only inside a longer segment, strips nothing.
	let base_path = base_path_end(path, marker).map_or("", |end| &path[..end]);

	Ok(CanonicalRequest::new(method, &parsed, base_path))
}

fn base_path_end(path: &str, marker: &str) -> Option<usize> {
	path.match_indices(marker)
		.map(|(idx, _)| idx + marker.len())
		.find(|&end| marker.ends_with('/') || matches!(path.as_bytes().get(end), None | Some(b'/')))
}
