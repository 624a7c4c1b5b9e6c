//! Rendering a full HTML document for a request.

use headway_http::{Request, StreamingResponse};
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{HeaderMap, StatusCode};
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;

use super::markers::{document_preamble, fallback_head};
use super::options::SsrOptions;
use super::policy::{CrawlerPolicy, ReadyPolicy};
use super::renderer::{PageRenderer, RouteTreeRenderer};
use super::stream::{self, RenderOutcome, StreamConfig};
use crate::component::{BoundaryIds, HeadComponent};
use crate::context::transform::switch_root_component;
use crate::context::RenderContext;
use crate::error::RenderError;

/// A document response plus a handle on the render still streaming into it.
#[derive(Debug)]
pub struct DocumentResponse {
	/// The response to send. Its body is the document stream.
	pub response: StreamingResponse,
	/// Reports how the render ended; can abort it early.
	pub outcome: RenderOutcome,
}

impl DocumentResponse {
	/// Drops the outcome handle and returns the response.
	pub fn into_response(self) -> StreamingResponse {
		self.response
	}
}

/// Renders HTML documents with a separately rendered head.
///
/// Every request renders twice from the same context: once synchronously
/// with the root route swapped for the head component, giving the head
/// fragment, and once as a stream, giving the body. The head is placed
/// between `<!--start head-->` and `<!--end head-->` so the client can take
/// it over after hydration.
///
/// # Examples
///
/// ```
/// use headway_http::Request;
/// use headway_pages::component::{MetaDescriptor, Page, PageElement};
/// use headway_pages::context::{RenderContext, RouteMatch, RouteModule, RouteProps};
/// use headway_pages::ssr::DocumentRenderer;
/// use headway_pages::RenderError;
/// use hyper::{HeaderMap, StatusCode};
///
/// fn test_page(_props: &RouteProps<'_>) -> Result<Page, RenderError> {
///     Ok(PageElement::new("h1").child("Test Page").into())
/// }
///
/// # #[tokio::main]
/// # async fn main() {
/// let context = RenderContext::new("/test").route(
///     RouteMatch::new("root", "/"),
///     RouteModule::new()
///         .component(test_page)
///         .meta(|_| MetaDescriptor::new().with("title", "Test page")),
/// );
/// let request = Request::builder().uri("/test").build().unwrap();
/// let mut headers = HeaderMap::new();
///
/// let document = DocumentRenderer::new()
///     .handle_request(&request, StatusCode::OK, &mut headers, &context)
///     .await
///     .unwrap();
/// let html = document.into_response().collect_body().await.unwrap();
///
/// assert_eq!(
///     std::str::from_utf8(&html).unwrap(),
///     "<!DOCTYPE html><html><head><!--start head--><title>Test page</title><!--end head--></head>\
///      <body><div id=\"root\"><h1>Test Page</h1></div></body></html>",
/// );
/// # }
/// ```
pub struct DocumentRenderer<R = RouteTreeRenderer> {
	renderer: R,
	head: HeadComponent,
	policy: Arc<dyn ReadyPolicy>,
	options: SsrOptions,
}

impl DocumentRenderer<RouteTreeRenderer> {
	/// Creates a renderer for route trees with default options.
	pub fn new() -> Self {
		Self::with_renderer(RouteTreeRenderer)
	}
}

impl Default for DocumentRenderer<RouteTreeRenderer> {
	fn default() -> Self {
		Self::new()
	}
}

impl<R: PageRenderer> DocumentRenderer<R> {
	/// Creates a document renderer around a custom page renderer.
	pub fn with_renderer(renderer: R) -> Self {
		Self {
			renderer,
			head: HeadComponent::new(),
			policy: Arc::new(CrawlerPolicy),
			options: SsrOptions::default(),
		}
	}

	/// Sets the options.
	pub fn options(mut self, options: SsrOptions) -> Self {
		self.options = options;
		self
	}

	/// Sets the policy deciding when responses start flowing.
	pub fn policy(mut self, policy: impl ReadyPolicy + 'static) -> Self {
		self.policy = Arc::new(policy);
		self
	}

	/// Sets the component rendered for the head.
	///
	/// The client takes the head over with the same component, see
	/// [`head`](Self::head).
	pub fn head_component(mut self, head: HeadComponent) -> Self {
		self.head = head;
		self
	}

	/// Returns the head component, for handing to the client head.
	pub fn head(&self) -> &HeadComponent {
		&self.head
	}

	/// Returns the options.
	pub fn settings(&self) -> &SsrOptions {
		&self.options
	}

	/// Renders the head fragment for `context`.
	///
	/// Only the head component renders; child routes never take part. An
	/// empty render is replaced by a link to the global stylesheet.
	pub fn render_head(&self, context: &RenderContext) -> Result<String, RenderError> {
		let head_context = switch_root_component(context, Arc::new(self.head.clone()));
		let head = self.renderer.render_root_to_string(&head_context)?;
		if head.trim().is_empty() {
			tracing::debug!(url = %context.url, "head render was empty, using fallback stylesheet");
			return Ok(fallback_head(&self.options.global_stylesheet));
		}
		Ok(head)
	}

	/// Renders the document for `request`.
	///
	/// `status` is the status decided before rendering. Once the response
	/// may start, `Content-Type: text/html` is set on `headers` and the
	/// response is built from them. The status becomes the configured error
	/// status if rendering failed before that point.
	///
	/// # Errors
	///
	/// Returns an error if the head or the shell cannot be rendered. Nothing
	/// has been sent in that case; callers answer with a 5xx.
	pub async fn handle_request(
		&self,
		request: &Request,
		status: StatusCode,
		headers: &mut HeaderMap,
		context: &RenderContext,
	) -> Result<DocumentResponse, RenderError> {
		let deadline = Instant::now() + self.options.abort_delay_duration();
		let strategy = self.policy.strategy(request);
		tracing::debug!(url = %request.url(), ?strategy, "rendering document");

		let head = self.render_head(context).inspect_err(|e| {
			tracing::error!(url = %request.url(), error = %e, "head render failed");
		})?;

		let mut ids = BoundaryIds::new();
		let shell = self
			.renderer
			.render_to_stream(context, &mut ids)
			.inspect_err(|e| {
				tracing::error!(url = %request.url(), error = %e, "shell render failed");
			})?;

		let error_status = self.options.error_status_code();
		let stream = stream::start(
			shell,
			ids,
			StreamConfig {
				strategy,
				deadline,
				ok_status: status,
				error_status,
				preamble: document_preamble(&head, &self.options.root_id),
			},
		);

		let ready = stream.ready.await.map_err(|_| RenderError::StreamClosed)?;

		headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
		let status = if ready.did_error { error_status } else { status };
		let response = StreamingResponse::new(stream.body)
			.status(status)
			.headers(headers.clone());

		Ok(DocumentResponse {
			response,
			outcome: stream.outcome,
		})
	}

	/// Renders the document with the status recorded in the context and
	/// fresh headers.
	pub async fn respond(
		&self,
		request: &Request,
		context: &RenderContext,
	) -> Result<DocumentResponse, RenderError> {
		let status = StatusCode::from_u16(context.static_handler.status_code)
			.map_err(|_| {
				RenderError::Shell(format!(
					"invalid status code {}",
					context.static_handler.status_code
				))
			})?;
		let mut headers = HeaderMap::new();
		self.handle_request(request, status, &mut headers, context)
			.await
	}
}

impl<R> fmt::Debug for DocumentRenderer<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DocumentRenderer")
			.field("head", &self.head)
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}
