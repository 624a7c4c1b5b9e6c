use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue, USER_AGENT};
use hyper::{HeaderMap, Method, Uri, Version};

use crate::HttpError;

/// HTTP Request representation
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Request {
	/// Creates a request from already-parsed parts.
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
		}
	}

	/// Starts building a request.
	///
	/// # Examples
	///
	/// ```
	/// use headway_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder().method(Method::GET).uri("/test").build().unwrap();
	/// assert_eq!(request.path(), "/test");
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// Returns the request path.
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Returns the request URL as it was received (path and query).
	pub fn url(&self) -> String {
		self.uri
			.path_and_query()
			.map(|pq| pq.as_str().to_string())
			.unwrap_or_else(|| self.uri.to_string())
	}

	/// Returns the `user-agent` header, if present and valid UTF-8.
	pub fn user_agent(&self) -> Option<&str> {
		self.headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
	}
}

/// Builder for [`Request`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
	method: Method,
	uri: Option<String>,
	version: Version,
	headers: HeaderMap,
	body: Bytes,
	error: Option<HttpError>,
}

impl RequestBuilder {
	/// Sets the method.
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	/// Sets the URI.
	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	/// Sets the HTTP version.
	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	/// Adds a single header. Invalid names or values fail the build.
	pub fn header(mut self, name: &str, value: &str) -> Self {
		match (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			(Ok(name), Ok(value)) => {
				self.headers.insert(name, value);
			}
			_ => {
				self.error
					.get_or_insert(HttpError::InvalidHeader(name.to_string()));
			}
		}
		self
	}

	/// Replaces all headers.
	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Sets the body.
	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Builds the request.
	pub fn build(self) -> crate::Result<Request> {
		if let Some(error) = self.error {
			return Err(error);
		}
		let raw = self.uri.unwrap_or_else(|| "/".to_string());
		let uri = raw
			.parse::<Uri>()
			.map_err(|e| HttpError::InvalidUri(format!("{raw}: {e}")))?;
		Ok(Request::new(
			self.method,
			uri,
			self.version,
			self.headers,
			self.body,
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_builder_defaults_to_root() {
		// Act
		let request = Request::builder().build().unwrap();

		// Assert
		assert_eq!(request.method, Method::GET);
		assert_eq!(request.path(), "/");
		assert!(request.user_agent().is_none());
	}

	#[rstest]
	fn test_url_keeps_query() {
		// Arrange
		let request = Request::builder().uri("/defer?slow=1").build().unwrap();

		// Act & Assert
		assert_eq!(request.url(), "/defer?slow=1");
		assert_eq!(request.path(), "/defer");
	}

	#[rstest]
	fn test_invalid_header_fails_build() {
		// Act
		let result = Request::builder().header("bad header", "x").build();

		// Assert
		assert!(matches!(result, Err(HttpError::InvalidHeader(_))));
	}

	#[rstest]
	fn test_invalid_uri_fails_build() {
		// Act
		let result = Request::builder().uri("http://[::1").build();

		// Assert
		assert!(matches!(result, Err(HttpError::InvalidUri(_))));
	}
}
