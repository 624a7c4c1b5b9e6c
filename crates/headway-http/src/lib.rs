//! HTTP primitives for headway.
//!
//! This crate carries the request/response vocabulary shared by the page
//! renderer and the HTTP server:
//!
//! - [`Request`]: the incoming request (method, URI, headers)
//! - [`Response`]: a fully buffered response, used for hard failures
//! - [`StreamingResponse`]: a response whose body is produced incrementally
//! - [`Handler`]: the async seam between the server and the application
//!
//! ## Example
//!
//! ```
//! use headway_http::{Request, Response};
//! use hyper::{Method, StatusCode};
//!
//! let request = Request::builder()
//!     .method(Method::GET)
//!     .uri("/defer")
//!     .header("user-agent", "Mozilla/5.0")
//!     .build()
//!     .unwrap();
//! assert_eq!(request.user_agent(), Some("Mozilla/5.0"));
//!
//! let response = Response::internal_server_error();
//! assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
//! ```

mod handler;
mod request;
mod response;

pub use handler::Handler;
pub use request::{Request, RequestBuilder};
pub use response::{Response, StreamBody, StreamingResponse};

/// Boxed error used for body chunks and handler failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while assembling HTTP values.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
	/// The request URI could not be parsed.
	#[error("invalid uri: {0}")]
	InvalidUri(String),
	/// A header name or value was rejected.
	#[error("invalid header: {0}")]
	InvalidHeader(String),
	/// The response body stream failed.
	#[error("body stream error: {0}")]
	Body(String),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, HttpError>;
