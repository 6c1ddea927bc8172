//! Demonstrates fetching Zephyr test steps: a Jira lookup resolves the issue id, the request is
//! signed with a fresh query-string-bound token, and the response is decoded into test steps.
//! Both services are served by a local `httpmock` server.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use zephyr_squad_auth::{
	Credentials, ProjectDirectory, TokenSigner,
	config::{JiraConfig, ZephyrConfig},
	http::ZephyrClient,
	jira::JiraIssueResolver,
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let jira_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/rest/api/3/issue/TR-1994").query_param("fields", "id");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":"12345","key":"TR-1994"}"#);
		})
		.await;
	let zephyr_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/connect/public/rest/api/2.0/teststep/12345")
				.query_param("projectId", "67890")
				.header_exists("authorization");
			then.status(200).header("content-type", "application/json").body(
				r#"{"testSteps":[{"step":"Log in","data":"demo/demo","result":"Dashboard opens"}]}"#,
			);
		})
		.await;
	let credentials = Credentials::new("demo-access", "demo-secret", "demo@example.com");
	let url = server.url("/connect/public/rest/api/2.0/teststep/12345?projectId=67890");
	let token = TokenSigner::new(credentials.clone()).sign_at("GET", &url, 1_700_000_000)?;

	println!("Token for {url}:\n{token}\n");

	let resolver = Arc::new(JiraIssueResolver::with_client(Client::new(), JiraConfig {
		base_url: Url::parse(&server.url("/rest/api/3"))?,
		access_token: "demo-jira-token".into(),
		user_id: Some("demo@example.com".into()),
	}));
	let client = ZephyrClient::with_client(
		Client::new(),
		ZephyrConfig {
			base_url: Url::parse(&server.url("/connect"))?,
			credentials,
			projects: ProjectDirectory::default().with_project("TR", "67890"),
		},
		resolver,
	);
	let steps = client.get_test_steps("TR-1994").await?;

	for (index, step) in steps.iter().enumerate() {
		println!(
			"{}. {} | data: {} | expected: {}",
			index + 1,
			step.step.as_deref().unwrap_or_default(),
			step.data.as_deref().unwrap_or_default(),
			step.result.as_deref().unwrap_or_default(),
		);
	}

	jira_mock.assert_async().await;
	zephyr_mock.assert_async().await;

	Ok(())
}
