// crates.io
use serde_json::{Value, json};
// self
use crate::{_prelude::*, http::TransportResponse, obs};

/// Decoded body of a successful (< 400) response.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResponse {
	/// Body labelled `application/json` that parsed as JSON.
	Json(Value),
	/// Any other body, returned as text together with its content type.
	Raw {
		/// Body text.
		content: String,
		/// `Content-Type` header value, if any.
		content_type: Option<String>,
	},
}
impl ApiResponse {
	pub(crate) fn decode(response: TransportResponse) -> Self {
		let is_json = response
			.content_type
			.as_deref()
			.is_some_and(|content_type| content_type.to_ascii_lowercase().contains("application/json"));

		if is_json {
			match serde_json::from_slice(&response.body) {
				Ok(value) => return ApiResponse::Json(value),
				Err(e) => obs::undecodable_json(response.status, &e),
			}
		}

		ApiResponse::Raw { content: response.text(), content_type: response.content_type }
	}

	/// Returns the JSON value when the body was decoded as JSON.
	pub fn as_json(&self) -> Option<&Value> {
		match self {
			ApiResponse::Json(value) => Some(value),
			ApiResponse::Raw { .. } => None,
		}
	}

	/// Converts into a JSON value; raw bodies become `{"content", "content_type"}` objects
	/// whose `content_type` is empty when the header was absent.
	pub fn into_value(self) -> Value {
		match self {
			ApiResponse::Json(value) => value,
			ApiResponse::Raw { content, content_type } =>
				json!({ "content": content, "content_type": content_type.unwrap_or_default() }),
		}
	}
}
