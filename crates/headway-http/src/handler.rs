use async_trait::async_trait;

use crate::{BoxError, Request, StreamingResponse};

/// Application entry point driven by the HTTP server.
///
/// An `Err` means nothing could be sent for the request; the server answers
/// it with a bare 500.
///
/// # Examples
///
/// ```
/// use headway_http::{BoxError, Handler, Request, Response, StreamingResponse};
///
/// struct Hello;
///
/// #[async_trait::async_trait]
/// impl Handler for Hello {
///     async fn handle(&self, _request: Request) -> Result<StreamingResponse, BoxError> {
///         Ok(Response::ok().with_body("hello").into_streaming())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles a request.
	async fn handle(&self, request: Request) -> Result<StreamingResponse, BoxError>;
}
