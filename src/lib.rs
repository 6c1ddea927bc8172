//! Atlassian Connect-style request signing for the Zephyr Squad API: canonical requests, query
//! string hashes, and single-use HS256 tokens, plus the reqwest collaborators that resolve Jira
//! issues and fetch Zephyr test steps with those tokens attached.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod canonical;
pub mod config;
pub mod error;
pub mod ext;
#[cfg(feature = "reqwest")] pub mod http;
pub mod jira;
pub mod obs;
pub mod qsh;
pub mod token;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};

pub use config::{Credentials, ProjectDirectory, Secret};
pub use error::{ConfigError, Error, InvalidRequestError, Result};
pub use qsh::{BASE_PATH_MARKER, QueryStringHash, compute_digest};
pub use token::{ClaimSet, SignedToken, TOKEN_TTL_SECS, TokenSigner, sign};
