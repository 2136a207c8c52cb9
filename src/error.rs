use std::sync::Arc;

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use derive_more::From;
use serde_json::json;
use serde_with::{serde_as, DisplayFromStr};
use nanoid::nanoid;

use crate::tools::log::{log_error, LogServiceType};

pub type Result<T> = core::result::Result<T, Error>;

pub const DISCOVERY_FAILED_MESSAGE: &str = "Something went wrong while requesting the access token";
pub const USER_INFO_FAILED_MESSAGE: &str = "Something went wrong while getting user info";

#[serde_as]
#[derive(Debug, Serialize, From, strum_macros::AsRefStr)]
#[serde(tag = "type", content = "data")]
pub enum Error {
	Error { message: String },

	// -- Upstream HTTP errors.
	Status { method: String, url: String, status: u16 },

	// -- Identity provider errors.
	Discovery { reason: String },
	UserInfo { reason: String },
	Token { error: String, description: Option<String> },

	InvalidUrl(String),

	// -- Config errors.
	ConfigMalformed(String),
	ConfigUnableToAccessFolder,

	// -- Externals

	#[from]
	Reqwest(#[serde_as(as = "DisplayFromStr")] reqwest::Error),

	#[from]
	Serde(#[serde_as(as = "DisplayFromStr")] serde_json::Error),

	#[from]
	Io(#[serde_as(as = "DisplayFromStr")] std::io::Error),
}

// region:    --- Error Boilerplate
impl core::fmt::Display for Error {
	fn fmt(
		&self,
		fmt: &mut core::fmt::Formatter,
	) -> core::result::Result<(), core::fmt::Error> {
		match self {
			Self::Discovery { .. } => write!(fmt, "{}", DISCOVERY_FAILED_MESSAGE),
			Self::UserInfo { .. } => write!(fmt, "{}", USER_INFO_FAILED_MESSAGE),
			Self::Status { method, url, status } => write!(fmt, "Response status code does not indicate success: {} ({} {})", status, method, url),
			_ => write!(fmt, "{self:?}"),
		}
	}
}

impl std::error::Error for Error {}
// endregion: --- Error Boilerplate

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let nanoid = nanoid!();
		log_error(LogServiceType::Other, format!("{} - {:?}", nanoid, self));
		let (status_code, client_error) = self.client_status_and_error();

		let error_json = json!({
						"error": {
							"type": client_error.as_ref(),
							"req_uuid": nanoid.to_string(),
						}
					});

		let mut error_response = (status_code, Json(error_json)).into_response();

		// Insert the Error into the reponse.
		error_response.extensions_mut().insert(Arc::new(self));

		error_response
	}
}

impl Error {
	/// Upstream status code carried by the error, if the failure came from a response.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Reqwest(err) => err.status().map(|s| s.as_u16()),
			_ => None,
		}
	}

	pub fn client_status_and_error(&self) -> (StatusCode, ClientError) {
		#[allow(unreachable_patterns)]
		match self {
			Self::Status { status: 401, .. } => (StatusCode::UNAUTHORIZED, ClientError::NO_AUTH),
			Self::Status { status: 403, .. } => (StatusCode::FORBIDDEN, ClientError::FORBIDDEN),
			Self::Status { .. } | Self::Reqwest(_) => (StatusCode::BAD_GATEWAY, ClientError::UPSTREAM_ERROR),

			Self::Discovery { .. }
			| Self::UserInfo { .. }
			| Self::Token { .. } => (StatusCode::BAD_GATEWAY, ClientError::IDENTITY_PROVIDER_ERROR),

			// -- Fallback.
			_ => (
				StatusCode::INTERNAL_SERVER_ERROR,
				ClientError::SERVICE_ERROR,
			),
		}
	}
}


#[derive(Debug, strum_macros::AsRefStr)]
#[allow(non_camel_case_types)]
pub enum ClientError {
	NO_AUTH,
	FORBIDDEN,
	UPSTREAM_ERROR,
	IDENTITY_PROVIDER_ERROR,
	SERVICE_ERROR,
}
