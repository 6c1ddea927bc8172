//! Process configuration: Zephyr credentials, Jira access, and project mappings.
//!
//! Everything here is built once at start-up and handed to the signer and HTTP clients by
//! value or reference; nothing in the crate reads the environment after construction. The
//! `from_env` constructors delegate to `from_lookup` so tests can inject variables without
//! touching the process environment.

mod secret;

pub use secret::Secret;

// self
use crate::{_prelude::*, error::ConfigError};

/// Default Zephyr Squad connect base URL.
pub const DEFAULT_ZEPHYR_BASE_URL: &str = "https://prod-api.zephyr4jiracloud.com/connect";

const ZEPHYR_ACCESS_KEY: &str = "ZEPHYR_ACCESS_KEY";
const ZEPHYR_SECRET_KEY: &str = "ZEPHYR_SECRET_KEY";
const ZEPHYR_USERNAME: &str = "ZEPHYR_USERNAME";
const ZEPHYR_BASE_URL: &str = "ZEPHYR_BASE_URL";
const ZEPHYR_PROJECT_IDS: &str = "ZEPHYR_PROJECT_IDS";
const JIRA_BASE_URL: &str = "JIRA_BASE_URL";
const JIRA_ACCESS_TOKEN: &str = "JIRA_ACCESS_TOKEN";
const JIRA_USER_ID: &str = "JIRA_USER_ID";

/// Zephyr API credentials used to sign requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
	/// Zephyr access key, sent as the `iss` claim and the `zapiAccessKey` header.
	pub access_key: String,
	/// Shared secret keying the HMAC signature.
	pub secret_key: Secret,
	/// Account the token is issued for (`sub` claim).
	pub subject: String,
}
impl Credentials {
	/// Creates credentials without validating them; signing rejects empty fields.
	pub fn new(
		access_key: impl Into<String>,
		secret_key: impl Into<Secret>,
		subject: impl Into<String>,
	) -> Self {
		Self { access_key: access_key.into(), secret_key: secret_key.into(), subject: subject.into() }
	}

	/// Reads `ZEPHYR_ACCESS_KEY`, `ZEPHYR_SECRET_KEY`, and `ZEPHYR_USERNAME`.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(env_lookup)
	}

	/// Same as [`Credentials::from_env`] but reads variables through `lookup`.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		Ok(Self::new(
			required(&lookup, ZEPHYR_ACCESS_KEY)?,
			required(&lookup, ZEPHYR_SECRET_KEY)?,
			required(&lookup, ZEPHYR_USERNAME)?,
		))
	}

	/// Returns the name of the first empty field, if any.
	pub fn missing_field(&self) -> Option<&'static str> {
		if self.access_key.is_empty() {
			Some("access_key")
		} else if self.secret_key.is_empty() {
			Some("secret_key")
		} else if self.subject.is_empty() {
			Some("subject")
		} else {
			None
		}
	}
}

/// Jira REST settings used to resolve issue keys.
#[derive(Clone, Debug)]
pub struct JiraConfig {
	/// REST base URL, e.g. `https://example.atlassian.net/rest/api/3`.
	pub base_url: Url,
	/// API token; sent verbatim as the Basic credential unless `user_id` is set.
	pub access_token: Secret,
	/// Optional account email or id paired with the token for Basic authentication.
	pub user_id: Option<String>,
}
impl JiraConfig {
	/// Reads `JIRA_BASE_URL`, `JIRA_ACCESS_TOKEN`, and the optional `JIRA_USER_ID`.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(env_lookup)
	}

	/// Same as [`JiraConfig::from_env`] but reads variables through `lookup`.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		Ok(Self {
			base_url: parse_url(JIRA_BASE_URL, &required(&lookup, JIRA_BASE_URL)?)?,
			access_token: Secret::new(required(&lookup, JIRA_ACCESS_TOKEN)?),
			user_id: optional(&lookup, JIRA_USER_ID),
		})
	}
}

/// Zephyr endpoint settings.
#[derive(Clone, Debug)]
pub struct ZephyrConfig {
	/// Connect base URL; resource paths are appended after `/public`.
	pub base_url: Url,
	/// Signing credentials.
	pub credentials: Credentials,
	/// Project key to project id mapping.
	pub projects: ProjectDirectory,
}
impl ZephyrConfig {
	/// Reads the credentials plus the optional `ZEPHYR_BASE_URL` and `ZEPHYR_PROJECT_IDS`.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(env_lookup)
	}

	/// Same as [`ZephyrConfig::from_env`] but reads variables through `lookup`.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let base_url = optional(&lookup, ZEPHYR_BASE_URL)
			.unwrap_or_else(|| DEFAULT_ZEPHYR_BASE_URL.to_owned());
		let projects = match optional(&lookup, ZEPHYR_PROJECT_IDS) {
			Some(mapping) => mapping.parse::<ProjectDirectory>()?,
			None => ProjectDirectory::default(),
		};

		Ok(Self {
			base_url: parse_url(ZEPHYR_BASE_URL, &base_url)?,
			credentials: Credentials::from_lookup(&lookup)?,
			projects,
		})
	}
}

/// Maps Jira project keys (`TR`) to Zephyr numeric project ids (`10000`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectDirectory(BTreeMap<String, String>);
impl ProjectDirectory {
	/// Adds or replaces a mapping.
	pub fn with_project(mut self, key: impl Into<String>, id: impl Into<String>) -> Self {
		self.0.insert(key.into(), id.into());

		self
	}

	/// Returns the project id for `key`.
	pub fn project_id(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Looks up the project owning `issue_key` (the text before the first `-`).
	pub fn project_id_for_issue(&self, issue_key: &str) -> Result<&str, ConfigError> {
		let project = issue_key.split('-').next().unwrap_or(issue_key);

		self.project_id(project)
			.ok_or_else(|| ConfigError::UnknownProject { project: project.to_owned() })
	}
}
impl std::str::FromStr for ProjectDirectory {
	type Err = ConfigError;

	/// Parses `KEY=ID` pairs separated by commas; blank entries are ignored.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.split(',')
			.map(str::trim)
			.filter(|entry| !entry.is_empty())
			.map(|entry| match entry.split_once('=') {
				Some((key, id)) if !key.trim().is_empty() && !id.trim().is_empty() =>
					Ok((key.trim().to_owned(), id.trim().to_owned())),
				_ => Err(ConfigError::InvalidProjectEntry { entry: entry.to_owned() }),
			})
			.collect::<Result<BTreeMap<_, _>, _>>()
			.map(Self)
	}
}
impl<K, V> FromIterator<(K, V)> for ProjectDirectory
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(key, id)| (key.into(), id.into())).collect())
	}
}

fn env_lookup(var: &str) -> Option<String> {
	std::env::var(var).ok()
}

fn optional<F>(lookup: &F, var: &'static str) -> Option<String>
where
	F: Fn(&str) -> Option<String>,
{
	lookup(var).filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	optional(lookup, var).ok_or(ConfigError::MissingEnvVar { var })
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|source| ConfigError::InvalidUrl { var, source })
}
