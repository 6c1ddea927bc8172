//! Canonical request construction for Atlassian Connect query string hashes.
//!
//! A canonical request is the `&`-joined triple
//!
//! ```text
//! METHOD&canonical-path&canonical-query
//! ```
//!
//! The receiving server recomputes the same string from the request it sees, so every rule
//! here is fixed by the verifier: upper-cased method, path relative to the API base path with a
//! single trailing slash removed, and a query string with sorted keys, sorted values and the
//! `jwt` parameter excluded.

mod percent;

pub use percent::percent_encode;

// self
use crate::_prelude::*;

/// Query parameter that carries the token itself and is never signed.
pub const JWT_PARAM: &str = "jwt";

/// The three components a query string hash is computed over.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalRequest {
	/// Upper-cased HTTP method.
	pub method: String,
	/// Resource path relative to the API base path, always starting with `/`.
	pub path: String,
	/// Sorted, percent-encoded query string without the `jwt` parameter.
	pub query: String,
}
impl CanonicalRequest {
	/// Canonicalizes `method` and `url`, stripping `base_path` from the front of the URL path.
	pub fn new(method: &str, url: &Url, base_path: &str) -> Self {
		Self {
			method: canonicalize_method(method),
			path: canonicalize_path(url, base_path),
			query: canonicalize_query(url),
		}
	}
}
impl Display for CanonicalRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}&{}&{}", self.method, self.path, self.query)
	}
}

/// Upper-cases the method token; no validation is performed.
pub fn canonicalize_method(method: &str) -> String {
	method.to_uppercase()
}

/// Reduces the URL path to the resource path used for signing.
///
/// Only one trailing slash is removed and repeated slashes are kept as-is, matching the form the
/// verifier hashes.
pub fn canonicalize_path(url: &Url, base_path: &str) -> String {
	// An empty base path strips nothing.
	let path = url.path();
	let path = path.strip_prefix(base_path).unwrap_or(path);
	let path = path.strip_suffix('/').unwrap_or(path);
	let path = if path.is_empty() { "/" } else { path };
	let path = path.replace('&', &percent_encode("&"));

	if path.starts_with('/') { path } else { format!("/{path}") }
}

/// Builds the canonical query string of `url`.
///
/// Parameters are decoded, grouped by key (keeping every occurrence, blank values included),
/// stripped of [`JWT_PARAM`], and re-emitted as `key=v1,v2` pairs with keys sorted by codepoint
/// and encoded values sorted within each key.
pub fn canonicalize_query(url: &Url) -> String {
	let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();

	for (key, value) in url.query_pairs() {
		if key == JWT_PARAM {
			continue;
		}

		params.entry(key.into_owned()).or_default().push(percent_encode(&value));
	}

	params
		.into_iter()
		.map(|(key, mut values)| {
			values.sort_unstable();

			format!("{}={}", percent_encode(&key), values.join(","))
		})
		.collect::<Vec<_>>()
		.join("&")
}
