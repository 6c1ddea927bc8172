//! HS256 token signing for Zephyr Squad requests.
//!
//! A token is a compact `header.claims.signature` string. Each segment is base64url without
//! padding; the signature is HMAC-SHA256 over `header.claims` keyed by the Zephyr secret. The
//! claims bind the token to one request (`qsh`), one account (`sub`), one access key (`iss`), and
//! a fixed six-minute window (`iat`..`exp`). Tokens are built fresh for every request and never
//! cached.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use time::OffsetDateTime;
// self
use crate::{
	_prelude::*,
	config::{Credentials, Secret},
	error::{ConfigError, InvalidRequestError},
	obs::{OperationKind, OperationSpan},
	qsh::{self, BASE_PATH_MARKER, QueryStringHash},
};

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of every token, in seconds (`exp - iat`).
pub const TOKEN_TTL_SECS: i64 = 360;

/// Compact JOSE header; the only algorithm this crate emits.
const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Claims carried by a Zephyr request token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
	/// Account the token is issued for.
	pub sub: String,
	/// Query string hash of the signed request.
	pub qsh: QueryStringHash,
	/// Zephyr access key.
	pub iss: String,
	/// Issued-at, epoch seconds.
	pub iat: i64,
	/// Expiry, epoch seconds; always `iat + TOKEN_TTL_SECS`.
	pub exp: i64,
}
impl ClaimSet {
	/// Builds the claims for `qsh` issued at `now`.
	///
	/// Fails with [`InvalidRequestError::IssuedAtOutOfRange`] when `now + TOKEN_TTL_SECS`
	/// does not fit in an `i64`.
	pub fn new(
		credentials: &Credentials,
		qsh: QueryStringHash,
		now: i64,
	) -> Result<Self, InvalidRequestError> {
		let exp = now
			.checked_add(TOKEN_TTL_SECS)
			.ok_or(InvalidRequestError::IssuedAtOutOfRange { iat: now })?;

		Ok(Self {
			sub: credentials.subject.clone(),
			qsh,
			iss: credentials.access_key.clone(),
			iat: now,
			exp,
		})
	}

	fn to_json(&self) -> String {
		json!({
			"sub": self.sub,
			"qsh": self.qsh.as_str(),
			"iss": self.iss,
			"iat": self.iat,
			"exp": self.exp,
		})
		.to_string()
	}
}

/// Compact signed token. Single use; attach it to exactly the request it was signed for.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedToken(String);
impl SignedToken {
	/// Returns the compact token.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Consumes the token, returning the compact string.
	pub fn into_string(self) -> String {
		self.0
	}

	/// Renders the `Authorization` header value (`JWT <token>`).
	pub fn authorization_header(&self) -> String {
		format!("JWT {}", self.0)
	}
}
impl AsRef<str> for SignedToken {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Display for SignedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl Debug for SignedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SignedToken").field(&"<redacted>").finish()
	}
}

/// Signs `method` + `url` with `credentials`, issuing the token at `now` (epoch seconds).
///
/// Empty credential fields fail with [`ConfigError::MissingCredential`] before anything is
/// hashed; URL problems surface as [`Error::InvalidRequest`].
pub fn sign(method: &str, url: &str, credentials: &Credentials, now: i64) -> Result<SignedToken> {
	sign_with_marker(method, url, BASE_PATH_MARKER, credentials, now)
}

fn sign_with_marker(
	method: &str,
	url: &str,
	marker: &str,
	credentials: &Credentials,
	now: i64,
) -> Result<SignedToken> {
	let claims = claims_for(method, url, marker, credentials, now)?;

	Ok(encode(&claims, &credentials.secret_key))
}

fn claims_for(
	method: &str,
	url: &str,
	marker: &str,
	credentials: &Credentials,
	now: i64,
) -> Result<ClaimSet> {
	if let Some(field) = credentials.missing_field() {
		return Err(ConfigError::MissingCredential { field }.into());
	}

	let qsh = qsh::compute_digest_with_marker(method, url, marker)?;

	Ok(ClaimSet::new(credentials, qsh, now)?)
}

fn encode(claims: &ClaimSet, secret: &Secret) -> SignedToken {
	let signing_input = format!(
		"{}.{}",
		URL_SAFE_NO_PAD.encode(HEADER_JSON),
		URL_SAFE_NO_PAD.encode(claims.to_json())
	);
	let mut mac = HmacSha256::new_from_slice(secret.expose().as_bytes())
		.expect("HMAC can take key of any size");

	mac.update(signing_input.as_bytes());

	let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

	SignedToken(format!("{signing_input}.{signature}"))
}

/// Request signer holding process-wide credentials.
///
/// Cloning is cheap and the signer is `Send + Sync`, so one instance can serve every task.
#[derive(Clone, Debug)]
pub struct TokenSigner {
	credentials: Arc<Credentials>,
	marker: Arc<str>,
}
impl TokenSigner {
	/// Creates a signer using [`BASE_PATH_MARKER`].
	pub fn new(credentials: Credentials) -> Self {
		Self { credentials: Arc::new(credentials), marker: Arc::from(BASE_PATH_MARKER) }
	}

	/// Overrides the segment separating the API base path from the resource path.
	pub fn with_base_path_marker(mut self, marker: impl AsRef<str>) -> Self {
		self.marker = Arc::from(marker.as_ref());

		self
	}

	/// Credentials used for signing.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Signs `method` + `url` as of the current wall-clock second.
	pub fn generate_token(&self, method: &str, url: &str) -> Result<SignedToken> {
		self.sign_at(method, url, OffsetDateTime::now_utc().unix_timestamp())
	}

	/// Signs `method` + `url` as of `now` (epoch seconds).
	///
	/// The span records the canonical method and the signed `qsh` claim.
	pub fn sign_at(&self, method: &str, url: &str, now: i64) -> Result<SignedToken> {
		let span = OperationSpan::new(OperationKind::SignToken);

		span.record_method(method);

		let result = span.in_scope(|| -> Result<SignedToken> {
			let claims = claims_for(method, url, &self.marker, &self.credentials, now)?;

			span.record_qsh(&claims.qsh);

			Ok(encode(&claims, &self.credentials.secret_key))
		});

		span.finish(&result);

		result
	}
}
