//! Document streaming integration tests
//!
//! Drives `DocumentRenderer` end to end with route trees similar to a real
//! application: a root layout, a leaf route with deferred data, an error
//! route and an unmatched URL.
//!
//! Success Criteria:
//! 1. The head is sent inside exactly one sentinel pair, before any body
//!    markup, whatever the body latency
//! 2. Errors after the response started degrade the final status but the
//!    document still closes
//! 3. The deadline cuts off pending subtrees and the stream terminates
//! 4. Crawlers get the fully resolved document in one go
//! 5. An empty head falls back to the global stylesheet
//! 6. Route errors never leak into the head render
//!
//! Test Categories:
//! - Document shape: 2 tests
//! - In-stream errors: 2 tests
//! - Deadline: 1 test
//! - Head fallback and errors: 2 tests

#[cfg(not(target_arch = "wasm32"))]
mod streaming_tests {
	use futures::StreamExt;
	use headway_http::Request;
	use headway_pages::component::{
		HeadComponent, LinkTag, MetaDescriptor, Page, PageElement, Suspense,
	};
	use headway_pages::context::handoff::scripts;
	use headway_pages::context::{RenderContext, RouteMatch, RouteModule, RouteProps};
	use headway_pages::ssr::{DocumentRenderer, SsrOptions};
	use headway_pages::RenderError;
	use hyper::{HeaderMap, StatusCode};
	use rstest::*;
	use serde_json::json;
	use std::time::Duration;

	const CHROME: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0 Safari/537.36";
	const GOOGLEBOT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

	fn app(props: &RouteProps<'_>) -> Result<Page, RenderError> {
		Ok(Page::fragment(vec![
			PageElement::new("nav").child("Home").into(),
			props.outlet.clone(),
			scripts(props.context),
		]))
	}

	fn app_error(props: &RouteProps<'_>) -> Result<Page, RenderError> {
		let message = props
			.error
			.and_then(|e| e.get("message"))
			.and_then(|m| m.as_str())
			.unwrap_or("Unknown error");
		Ok(PageElement::new("h1").child(format!("Error: {message}")).into())
	}

	fn defer_page(_props: &RouteProps<'_>) -> Result<Page, RenderError> {
		let slow = Suspense::new("Loading slow data...", async {
			tokio::time::sleep(Duration::from_millis(40)).await;
			Ok(PageElement::new("p").child("This is slow data").into())
		})
		.error_fallback("Error loading slow data!");
		Ok(PageElement::new("div")
			.child(PageElement::new("p").child("This is fast data"))
			.child(slow)
			.into())
	}

	fn failing_defer_page(_props: &RouteProps<'_>) -> Result<Page, RenderError> {
		let slow = Suspense::new("Loading slow data...", async {
			tokio::time::sleep(Duration::from_millis(10)).await;
			Err(RenderError::failed("loader rejected"))
		})
		.error_fallback("Error loading slow data!");
		Ok(slow.into())
	}

	fn error_page(props: &RouteProps<'_>) -> Result<Page, RenderError> {
		let message = props
			.data
			.and_then(|d| d.get("message"))
			.and_then(|m| m.as_str())
			.ok_or_else(|| RenderError::failed("error route rendered without loader data"))?;
		Ok(PageElement::new("p").child(message.to_string()).into())
	}

	fn never_page(_props: &RouteProps<'_>) -> Result<Page, RenderError> {
		Ok(Suspense::new("Loading forever...", futures::future::pending()).into())
	}

	fn root_module() -> RouteModule {
		RouteModule::new()
			.component(app)
			.error_boundary(app_error)
			.meta(|_| {
				MetaDescriptor::new()
					.with("charset", "utf-8")
					.with("title", "New Remix App")
					.with("viewport", "width=device-width,initial-scale=1")
			})
			.links(|| vec![LinkTag::stylesheet("/styles/global.css")])
	}

	fn defer_context(leaf: fn(&RouteProps<'_>) -> Result<Page, RenderError>) -> RenderContext {
		RenderContext::new("/defer")
			.route(RouteMatch::new("root", "/"), root_module())
			.route(
				RouteMatch::new("routes/defer", "/defer"),
				RouteModule::new().component(leaf).meta(|_| {
					MetaDescriptor::new()
						.with("title", "Defer page")
						.with("description", "Let's defer some data!")
				}),
			)
	}

	fn request(user_agent: &str, path: &str) -> Request {
		Request::builder()
			.uri(path)
			.header("user-agent", user_agent)
			.build()
			.unwrap()
	}

	async fn render(
		renderer: &DocumentRenderer,
		request: &Request,
		context: &RenderContext,
	) -> (StatusCode, String, headway_pages::ssr::StreamReport) {
		let mut headers = HeaderMap::new();
		let document = renderer
			.handle_request(request, StatusCode::OK, &mut headers, context)
			.await
			.unwrap();
		let status = document.response.status;
		let outcome = document.outcome;
		let body = document.response.collect_body().await.unwrap();
		let report = outcome.finished().await.unwrap();
		(status, String::from_utf8(body.to_vec()).unwrap(), report)
	}

	#[fixture]
	fn renderer() -> DocumentRenderer {
		DocumentRenderer::new()
	}

	// ============================================================================
	// Document shape
	// ============================================================================

	/// The first chunk carries the whole head; deferred data follows later.
	#[rstest]
	#[tokio::test]
	async fn test_head_arrives_before_slow_body(renderer: DocumentRenderer) {
		// Arrange
		let context = defer_context(defer_page);
		let mut headers = HeaderMap::new();

		// Act
		let document = renderer
			.handle_request(&request(CHROME, "/defer"), StatusCode::OK, &mut headers, &context)
			.await
			.unwrap();
		let mut body = document.response.into_body();
		let first = body.next().await.unwrap().unwrap();
		let first = String::from_utf8(first.to_vec()).unwrap();
		let mut rest = String::new();
		while let Some(chunk) = body.next().await {
			rest.push_str(std::str::from_utf8(&chunk.unwrap()).unwrap());
		}

		// Assert
		assert_eq!(
			first,
			concat!(
				"<!DOCTYPE html><html><head><!--start head-->",
				"<title>Defer page</title>",
				r#"<meta charset="utf-8">"#,
				r#"<meta name="viewport" content="width=device-width,initial-scale=1">"#,
				r#"<meta name="description" content="Let's defer some data!">"#,
				r#"<link rel="stylesheet" href="/styles/global.css">"#,
				r#"<!--end head--></head><body><div id="root">"#,
			)
		);
		assert!(!rest.contains("<!--start head-->"));
		assert!(rest.contains("<p>This is fast data</p>"));
		assert!(rest.contains("Loading slow data..."));
		assert!(rest.contains(r#"<div hidden id="S:0"><p>This is slow data</p></div>"#));
		assert!(rest.ends_with("</div></body></html>"));
	}

	/// Crawlers wait for every subtree before the response starts.
	#[rstest]
	#[tokio::test]
	async fn test_crawler_receives_resolved_document(renderer: DocumentRenderer) {
		// Arrange
		let context = defer_context(defer_page);

		// Act
		let (status, html, report) = render(&renderer, &request(GOOGLEBOT, "/defer"), &context).await;

		// Assert
		assert_eq!(status, StatusCode::OK);
		assert_eq!(html.matches("<!--start head-->").count(), 1);
		assert_eq!(html.matches("<!--end head-->").count(), 1);
		assert!(html.contains(r#"<div hidden id="S:0"><p>This is slow data</p></div>"#));
		assert!(report.completed);
		assert!(report.errors.is_empty());
	}

	// ============================================================================
	// In-stream errors
	// ============================================================================

	/// A subtree failing after the headers went out only changes the report.
	#[rstest]
	#[tokio::test]
	async fn test_error_after_ready_degrades_final_status(renderer: DocumentRenderer) {
		// Arrange
		let context = defer_context(failing_defer_page);

		// Act
		let (status, html, report) = render(&renderer, &request(CHROME, "/defer"), &context).await;

		// Assert
		assert_eq!(status, StatusCode::OK);
		assert_eq!(report.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert!(html.contains(r#"<div hidden id="S:0">Error loading slow data!</div>"#));
		assert!(html.ends_with("</div></body></html>"));
	}

	/// The same failure seen by a crawler happens before ready.
	#[rstest]
	#[tokio::test]
	async fn test_error_before_ready_degrades_response_status(renderer: DocumentRenderer) {
		// Arrange
		let context = defer_context(failing_defer_page);

		// Act
		let (status, html, _) = render(&renderer, &request(GOOGLEBOT, "/defer"), &context).await;

		// Assert
		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert!(html.ends_with("</div></body></html>"));
	}

	// ============================================================================
	// Deadline
	// ============================================================================

	/// Pending subtrees are aborted when the deadline fires.
	#[rstest]
	#[tokio::test]
	async fn test_deadline_terminates_stream() {
		// Arrange
		let renderer = DocumentRenderer::new()
			.options(SsrOptions::new().abort_delay(Duration::from_millis(50)));
		let context = defer_context(never_page);

		// Act
		let (status, html, report) = tokio::time::timeout(
			Duration::from_secs(5),
			render(&renderer, &request(GOOGLEBOT, "/defer"), &context),
		)
		.await
		.expect("stream did not terminate");

		// Assert
		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert!(html.contains("Loading forever..."));
		assert!(html.ends_with("</div></body></html>"));
		assert!(report.aborted);
		assert_eq!(report.errors, vec![RenderError::Aborted { boundary: 0 }]);
	}

	// ============================================================================
	// Head fallback and errors
	// ============================================================================

	/// Unmatched URLs render an empty head, replaced by the global stylesheet.
	#[rstest]
	#[tokio::test]
	async fn test_not_found_uses_fallback_stylesheet(renderer: DocumentRenderer) {
		// Arrange
		let context = RenderContext::new("/missing").status_code(404);
		let request = request(CHROME, "/missing");

		// Act
		let document = renderer.respond(&request, &context).await.unwrap();
		let status = document.response.status;
		let html = document.into_response().collect_body().await.unwrap();
		let html = String::from_utf8(html.to_vec()).unwrap();

		// Assert
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert!(html.contains(
			r#"<!--start head--><link rel="stylesheet" href="/styles/global.css" /><!--end head-->"#
		));
	}

	/// Errors render the boundary in the body while the head ignores them.
	/// The failed route's component needs loader data it never got, so
	/// rendering it anywhere, head pass included, would fail the document.
	#[rstest]
	#[tokio::test]
	async fn test_route_error_stays_out_of_head() {
		// Arrange
		let context = RenderContext::new("/error")
			.route(RouteMatch::new("root", "/"), root_module())
			.route(
				RouteMatch::new("routes/error", "/error"),
				RouteModule::new().component(error_page),
			)
			.error("routes/error", json!({ "message": "Oh no!" }))
			.status_code(500)
			.with_handoff()
			.unwrap();
		let renderer = DocumentRenderer::new().head_component(HeadComponent::with_title("Error"));

		// Act
		let (_, html, _) = render(&renderer, &request(CHROME, "/error"), &context).await;

		// Assert
		let head_end = html.find("<!--end head-->").unwrap();
		let head = &html[..head_end];
		assert!(head.contains("<!--start head--><title>Error</title>"));
		assert!(!head.contains("Oh no!"));
		assert!(html[head_end..].contains("<h1>Error: Oh no!</h1>"));
	}
}
