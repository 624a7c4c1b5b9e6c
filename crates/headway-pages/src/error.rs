//! Render errors.

/// Errors produced while rendering a document.
///
/// Where an error surfaces decides how it is handled: anything returned
/// before the stream is ready fails the whole response, anything reported
/// after that only degrades the final status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
	/// The shell could not be produced; nothing was flushed.
	#[error("shell render failed: {0}")]
	Shell(String),

	/// A route component failed while rendering.
	#[error("route `{route_id}` failed to render: {message}")]
	Component {
		/// The route that failed.
		route_id: String,
		/// The underlying failure.
		message: String,
	},

	/// A deferred subtree resolved with an error after streaming began.
	#[error("deferred boundary B:{boundary} failed: {message}")]
	Deferred {
		/// The boundary id (`B:{n}` in the markup).
		boundary: usize,
		/// The underlying failure.
		message: String,
	},

	/// A deferred subtree was still pending when the stream was aborted.
	#[error("deferred boundary B:{boundary} aborted before it resolved")]
	Aborted {
		/// The boundary id (`B:{n}` in the markup).
		boundary: usize,
	},

	/// The render task went away before signalling readiness.
	#[error("render stream closed before it was ready")]
	StreamClosed,

	/// Settings could not be loaded.
	#[error("invalid ssr settings: {0}")]
	Settings(String),

	/// Generic failure raised by application components or loaders.
	#[error("{0}")]
	Failed(String),
}

impl RenderError {
	/// Creates a generic failure, typically returned from a deferred loader.
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed(message.into())
	}

	/// Returns `true` for errors that fail the response before anything
	/// was flushed.
	pub fn is_shell_error(&self) -> bool {
		matches!(
			self,
			Self::Shell(_) | Self::Component { .. } | Self::StreamClosed
		)
	}
}
