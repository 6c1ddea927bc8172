// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use zephyr_squad_auth::{
	ClaimSet, ConfigError, Credentials, Error, InvalidRequestError, TOKEN_TTL_SECS, TokenSigner,
	canonical::percent_encode,
	compute_digest,
	qsh::{self, BASE_PATH_MARKER},
	sign,
};

const TEST_STEP_URL: &str =
	"https://host/connect/public/rest/api/2.0/teststep/12345?projectId=67890&jwt=stale";

fn credentials() -> Credentials {
	Credentials::new("zephyr-access", "zephyr-secret", "qa@example.com")
}

fn claims_of(token: &str) -> ClaimSet {
	let segment = token.split('.').nth(1).expect("Token should contain a claims segment.");
	let bytes = URL_SAFE_NO_PAD.decode(segment).expect("Claims segment should be base64url.");

	serde_json::from_slice(&bytes).expect("Claims segment should be JSON.")
}

#[test]
fn end_to_end_example_matches_reference_canonicalization() {
	let request = qsh::canonical_request("GET", TEST_STEP_URL, BASE_PATH_MARKER)
		.expect("Reference URL should canonicalize.");

	assert_eq!(request.method, "GET");
	assert_eq!(request.path, "/rest/api/2.0/teststep/12345");
	assert_eq!(request.query, "projectId=67890");
	assert_eq!(request.to_string(), "GET&/rest/api/2.0/teststep/12345&projectId=67890");

	let digest = compute_digest("GET", TEST_STEP_URL).expect("Reference URL should hash.");
	let expected = hex::encode(Sha256::digest(b"GET&/rest/api/2.0/teststep/12345&projectId=67890"));

	assert_eq!(digest.as_str(), expected);
}

#[test]
fn query_order_and_repeated_values_commute() {
	let base = "https://host/connect/public/rest/api/1.0/executions";
	let orderings = [
		format!("{base}?projectId=1&issueId=2&status=b&status=a"),
		format!("{base}?status=a&issueId=2&status=b&projectId=1"),
		format!("{base}?status=b&projectId=1&status=a&issueId=2"),
	];
	let digests = orderings
		.iter()
		.map(|url| compute_digest("PUT", url).expect("Reordered URL should hash."))
		.collect::<Vec<_>>();

	assert!(digests.windows(2).all(|pair| pair[0] == pair[1]));
	assert_eq!(
		qsh::canonical_request("put", &orderings[1], BASE_PATH_MARKER)
			.expect("Reordered URL should canonicalize.")
			.query,
		"issueId=2&projectId=1&status=a,b"
	);
}

#[test]
fn jwt_parameter_never_affects_digest() {
	for url in [
		"https://host/connect/public/rest/api/1.0/zql/search",
		"https://host/connect/public/rest/api/1.0/zql/search?maxRecords=20&offset=0",
	] {
		let separator = if url.contains('?') { '&' } else { '?' };
		let with_jwt = format!("{url}{separator}jwt=anything");

		assert_eq!(
			compute_digest("POST", url).expect("Base URL should hash."),
			compute_digest("POST", &with_jwt).expect("URL with jwt should hash."),
		);
	}
}

#[test]
fn percent_encoding_fixed_points() {
	assert_eq!(percent_encode(" "), "%20");
	assert_eq!(percent_encode("+"), "%20");
	assert_eq!(percent_encode("*"), "%2A");
	assert_eq!(percent_encode("~"), "~");
}

#[test]
fn marker_is_required() {
	let err = compute_digest("GET", "https://host/no-marker/path")
		.expect_err("URL without marker must be rejected.");

	assert!(matches!(err, InvalidRequestError::MissingBasePathMarker { .. }));
}

#[test]
fn claims_expire_six_minutes_after_issue() {
	for now in [0, 1_700_000_000, 2_000_000_123] {
		let token = sign("GET", TEST_STEP_URL, &credentials(), now).expect("Signing should succeed.");
		let claims = claims_of(token.as_str());

		assert_eq!(claims.iat, now);
		assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
		assert_eq!(TOKEN_TTL_SECS, 360);
		assert_eq!(claims.sub, "qa@example.com");
		assert_eq!(claims.iss, "zephyr-access");
	}
}

#[test]
fn identical_inputs_produce_identical_tokens() {
	let signer = TokenSigner::new(credentials());
	let first = signer.sign_at("GET", TEST_STEP_URL, 1_700_000_000).expect("Signing should succeed.");
	let second = sign("GET", TEST_STEP_URL, &credentials(), 1_700_000_000)
		.expect("Signing should succeed.");

	assert_eq!(first.as_str(), second.as_str());
}

#[test]
fn missing_access_key_fails_with_configuration_error() {
	let err = sign("GET", TEST_STEP_URL, &Credentials::new("", "k", "u"), 0)
		.expect_err("Empty access key must be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::MissingCredential { field: "access_key" })));
}

#[test]
fn every_credential_field_is_required() {
	for (credentials, field) in [
		(Credentials::new("a", "", "u"), "secret_key"),
		(Credentials::new("a", "k", ""), "subject"),
	] {
		let err = TokenSigner::new(credentials)
			.generate_token("GET", TEST_STEP_URL)
			.expect_err("Incomplete credentials must be rejected.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::MissingCredential { field: missing }) if missing == field
		));
	}
}
