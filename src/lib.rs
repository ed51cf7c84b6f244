//! Token-reviewed compute gate: bearer tokens checked against the cluster `TokenReview` API and
//! scoped to a single audience, in front of a divisor enumeration engine.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod divisor;
pub mod error;
pub mod gate;
pub mod obs;
#[cfg(feature = "reqwest")] pub mod relay;
pub mod review;
#[cfg(feature = "server")] pub mod server;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(feature = "server")] use color_eyre as _;
#[cfg(test)] use {http_body_util as _, httpmock as _, tower as _};
