use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use hyper::{HeaderMap, StatusCode};
use std::pin::Pin;

use crate::{BoxError, HttpError};

/// HTTP Response representation
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

/// Type alias for streaming body
pub type StreamBody = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// Streaming HTTP Response
pub struct StreamingResponse {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: StreamBody,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use headway_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// Create a Response with HTTP 200 OK status
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Create a Response with HTTP 500 Internal Server Error status
	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Sets the body.
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Sets a header, silently ignoring invalid names or values.
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	/// Converts the buffered response into a single-chunk streaming response.
	pub fn into_streaming(self) -> StreamingResponse {
		let body: StreamBody = Box::pin(stream::iter(vec![Ok::<_, BoxError>(self.body)]));
		StreamingResponse {
			status: self.status,
			headers: self.headers,
			body,
		}
	}
}

impl StreamingResponse {
	/// Creates a streaming response with status 200 and no headers.
	pub fn new(body: StreamBody) -> Self {
		Self {
			status: StatusCode::OK,
			headers: HeaderMap::new(),
			body,
		}
	}

	/// Sets the status code.
	pub fn status(mut self, status: StatusCode) -> Self {
		self.status = status;
		self
	}

	/// Replaces the header map.
	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Sets the `Content-Type` header.
	pub fn media_type(mut self, media_type: &str) -> Self {
		let value = HeaderValue::from_str(media_type)
			.unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
		self.headers.insert(CONTENT_TYPE, value);
		self
	}

	/// Returns the body stream.
	pub fn into_body(self) -> StreamBody {
		self.body
	}

	/// Drains the body into a single buffer.
	///
	/// # Examples
	///
	/// ```
	/// use headway_http::Response;
	///
	/// # #[tokio::main]
	/// # async fn main() {
	/// let streaming = Response::ok().with_body("hello").into_streaming();
	/// let body = streaming.collect_body().await.unwrap();
	/// assert_eq!(&body[..], b"hello");
	/// # }
	/// ```
	pub async fn collect_body(self) -> crate::Result<Bytes> {
		let mut body = self.body;
		let mut buffer = Vec::new();
		while let Some(chunk) = body.next().await {
			let chunk = chunk.map_err(|e| HttpError::Body(e.to_string()))?;
			buffer.extend_from_slice(&chunk);
		}
		Ok(Bytes::from(buffer))
	}
}

impl std::fmt::Debug for StreamingResponse {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StreamingResponse")
			.field("status", &self.status)
			.field("headers", &self.headers)
			.finish_non_exhaustive()
	}
}
