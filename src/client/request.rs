// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, http::Method};

/// Body attached to an [`ApiRequest`].
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
	/// JSON document, serialized compactly.
	Json(Value),
	/// Pre-encoded bytes sent verbatim.
	Raw(Vec<u8>),
}
impl RequestBody {
	pub(crate) fn into_bytes(self) -> Vec<u8> {
		match self {
			RequestBody::Json(value) => value.to_string().into_bytes(),
			RequestBody::Raw(bytes) => bytes,
		}
	}
}

/// Request description consumed by [`ApiClient::execute`](crate::client::ApiClient::execute).
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Path relative to the full API URL.
	pub path: String,
	/// Query parameters appended in order.
	pub query: Vec<(String, String)>,
	/// Optional body.
	pub body: Option<RequestBody>,
	/// Caller headers layered over the authentication headers.
	pub headers: BTreeMap<String, String>,
}
impl ApiRequest {
	/// Creates a request without query, body, or extra headers.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			body: None,
			headers: BTreeMap::new(),
		}
	}

	/// `GET path`.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// `POST path`.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// `PUT path`.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// `PATCH path`.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::Patch, path)
	}

	/// `DELETE path`.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Appends a query parameter.
	pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((name.into(), value.into()));

		self
	}

	/// Attaches a JSON body, replacing any previous body.
	pub fn with_json(mut self, body: impl Into<Value>) -> Self {
		self.body = Some(RequestBody::Json(body.into()));

		self
	}

	/// Attaches a raw body, replacing any previous body.
	pub fn with_raw_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(RequestBody::Raw(body.into()));

		self
	}

	/// Adds a caller header; it replaces an authentication header of the same name regardless
	/// of case.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}
}

/// Layers `overrides` onto `base`, replacing entries whose names match case-insensitively.
pub(crate) fn merge_headers(base: &mut BTreeMap<String, String>, overrides: BTreeMap<String, String>) {
	for (name, value) in overrides {
		base.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
		base.insert(name, value);
	}
}
