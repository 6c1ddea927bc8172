//! Reqwest transport for Zephyr Squad requests.
//!
//! [`ZephyrClient`] is the outbound side of the signing pipeline: it resolves the issue, builds
//! the test-step URL, signs exactly that URL through [`RequestSignerExt`], and parses the
//! response. Timeouts, redirects and retries are whatever the wrapped [`ReqwestClient`] is
//! configured with; nothing here retries.

// crates.io
use reqwest::{
	RequestBuilder, Response,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	canonical::percent_encode,
	config::{ProjectDirectory, ZephyrConfig},
	error::{ConfigError, TransportError, UpstreamError},
	ext::{ACCESS_KEY_HEADER, RequestSignerExt},
	jira::{self, IssueIdResolver},
	obs::{OperationKind, OperationSpan},
	token::TokenSigner,
};

/// Service label used in Jira errors.
pub const JIRA_SERVICE: &str = "Jira";
/// Service label used in Zephyr errors.
pub const ZEPHYR_SERVICE: &str = "Zephyr Squad";

/// One step of a Zephyr test case.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
	/// Action to perform.
	#[serde(default)]
	pub step: Option<String>,
	/// Expected result.
	#[serde(default)]
	pub result: Option<String>,
	/// Test data.
	#[serde(default)]
	pub data: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestStepsResponse {
	#[serde(default)]
	test_steps: Vec<TestStep>,
}

impl RequestSignerExt<RequestBuilder, Error> for TokenSigner {
	fn sign_request(&self, request: RequestBuilder, method: &str, url: &str) -> Result<RequestBuilder> {
		let token = self.generate_token(method, url)?;

		Ok(request
			.header(AUTHORIZATION, token.authorization_header())
			.header(ACCESS_KEY_HEADER, self.credentials().access_key.as_str()))
	}
}

/// Zephyr Squad client that signs every request it sends.
#[derive(Clone)]
pub struct ZephyrClient {
	http: ReqwestClient,
	signer: TokenSigner,
	resolver: Arc<dyn IssueIdResolver>,
	projects: ProjectDirectory,
	base_url: Url,
}
impl ZephyrClient {
	/// Builds a client with a fresh reqwest client.
	pub fn new(config: ZephyrConfig, resolver: Arc<dyn IssueIdResolver>) -> Result<Self> {
		let http = ReqwestClient::builder().build().map_err(ConfigError::http_client_build)?;

		Ok(Self::with_client(http, config, resolver))
	}

	/// Builds a client on top of an existing reqwest client.
	pub fn with_client(
		http: ReqwestClient,
		config: ZephyrConfig,
		resolver: Arc<dyn IssueIdResolver>,
	) -> Self {
		let ZephyrConfig { base_url, credentials, projects } = config;

		Self { http, signer: TokenSigner::new(credentials), resolver, projects, base_url }
	}

	/// Signer shared by every request from this client.
	pub fn signer(&self) -> &TokenSigner {
		&self.signer
	}

	/// Returns `{base}/public/rest/api/2.0/teststep/{issue_id}?projectId={project_id}`.
	pub fn test_steps_url(&self, issue_id: &str, project_id: &str) -> String {
		format!(
			"{}/public/rest/api/2.0/teststep/{}?projectId={}",
			self.base_url.as_str().trim_end_matches('/'),
			percent_encode(issue_id),
			percent_encode(project_id),
		)
	}

	/// Fetches the test steps of `issue_key` (for example `TR-1994`).
	pub async fn get_test_steps(&self, issue_key: &str) -> Result<Vec<TestStep>> {
		let span = OperationSpan::new(OperationKind::FetchTestSteps);

		span.record_issue_key(issue_key);

		let result = span.instrument(self.fetch_test_steps(issue_key)).await;

		span.finish(&result);

		result
	}

	async fn fetch_test_steps(&self, issue_key: &str) -> Result<Vec<TestStep>> {
		jira::validate_issue_key(issue_key)?;

		let project_id = self.projects.project_id_for_issue(issue_key)?;
		let issue_id = self.resolver.resolve_id(issue_key).await?;
		let url = self.test_steps_url(&issue_id, project_id);
		let request = self.http.get(&url).header(CONTENT_TYPE, "application/json");
		let response = self
			.signer
			.sign_request(request, "GET", &url)?
			.send()
			.await
			.map_err(|e| TransportError::network(ZEPHYR_SERVICE, e))?;
		let body: TestStepsResponse = read_json(ZEPHYR_SERVICE, response).await?;

		Ok(body.test_steps)
	}
}
impl Debug for ZephyrClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ZephyrClient")
			.field("signer", &self.signer)
			.field("projects", &self.projects)
			.field("base_url", &self.base_url)
			.finish_non_exhaustive()
	}
}

/// Checks the status and decodes a JSON body, reporting the failing JSON path on mismatch.
pub(crate) async fn read_json<T>(service: &'static str, response: Response) -> Result<T>
where
	T: DeserializeOwned,
{
	let status = response.status();

	if !status.is_success() {
		return Err(UpstreamError::Status { service, status: status.as_u16() }.into());
	}

	let bytes = response.bytes().await.map_err(|e| TransportError::network(service, e))?;
	let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| UpstreamError::Parse { service, source }.into())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{config::Credentials, jira::StaticIssueResolver};

	fn client(base_url: &str) -> ZephyrClient {
		let config = ZephyrConfig {
			base_url: Url::parse(base_url).expect("Base URL fixture should parse."),
			credentials: Credentials::new("access", "secret", "user"),
			projects: ProjectDirectory::default().with_project("TR", "67890"),
		};

		ZephyrClient::with_client(
			ReqwestClient::new(),
			config,
			Arc::new(StaticIssueResolver::default().with_issue("TR-1994", "12345")),
		)
	}

	#[test]
	fn test_steps_url_appends_public_resource_path() {
		let client = client("https://prod-api.zephyr4jiracloud.com/connect/");

		assert_eq!(
			client.test_steps_url("12345", "67890"),
			"https://prod-api.zephyr4jiracloud.com/connect/public/rest/api/2.0/teststep/12345?projectId=67890"
		);
	}

	#[test]
	fn test_steps_response_tolerates_missing_fields() {
		let body: TestStepsResponse = serde_json::from_str(
			r#"{"testSteps":[{"id":1,"step":"Open","result":"Shown","data":null},{"step":"Close"}]}"#,
		)
		.expect("Test step payload should parse.");

		assert_eq!(body.test_steps.len(), 2);
		assert_eq!(body.test_steps[0].result.as_deref(), Some("Shown"));
		assert_eq!(body.test_steps[1], TestStep { step: Some("Close".into()), ..Default::default() });
	}

	#[tokio::test]
	async fn unknown_project_fails_before_any_request() {
		let client = client("http://127.0.0.1:9/connect");
		let err = client.get_test_steps("XX-1").await.expect_err("Unknown project must fail.");

		assert!(matches!(err, Error::Config(ConfigError::UnknownProject { .. })));
	}
}
