//! Demo application serving five routes with a streamed body and a
//! separately rendered head.
//!
//! ```text
//! cargo run -p demo-head-streaming
//! HEADWAY_ADDR=0.0.0.0:8080 HEADWAY_SETTINGS=headway.toml HEADWAY_LOG=debug cargo run -p demo-head-streaming
//! ```
//!
//! `HEADWAY_SETTINGS` points at a TOML file with an `[ssr]` table.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use headway::http::{BoxError, Handler, Request, StreamingResponse};
use headway::pages::RenderError;
use headway::pages::component::{LinkTag, MetaDescriptor, Page, PageElement, Suspense};
use headway::pages::context::handoff::scripts;
use headway::pages::context::{RenderContext, RouteMatch, RouteModule, RouteProps};
use headway::pages::ssr::{DocumentRenderer, SsrOptions};
use headway::server::HttpServer;
use serde_json::json;

const GLOBAL_CSS: &str = "/styles/global.css";
const TEST_CSS: &str = "/styles/test.css";
const SLOW_DATA_DELAY: Duration = Duration::from_secs(2);

fn app(props: &RouteProps<'_>) -> Result<Page, RenderError> {
	let nav = PageElement::new("nav")
		.child(nav_link("/", "Home"))
		.child(nav_link("/test", "Test"))
		.child(nav_link("/defer", "Defer"))
		.child(nav_link("/not-found", "Not Found"))
		.child(nav_link("/error", "Error Route"));
	Ok(Page::fragment(vec![nav.into(), props.outlet.clone(), scripts(props.context)]))
}

fn nav_link(href: &str, label: &str) -> PageElement {
	PageElement::new("a").attr("href", href).child(label)
}

fn error_boundary(props: &RouteProps<'_>) -> Result<Page, RenderError> {
	let message = props
		.error
		.and_then(|e| e.get("message"))
		.and_then(|m| m.as_str())
		.unwrap_or("Unknown error");
	Ok(PageElement::new("div")
		.child(PageElement::new("h1").child(message))
		.child(PageElement::new("p").child(nav_link("/", "Go back home")))
		.into())
}

fn catch_boundary(_props: &RouteProps<'_>) -> Result<Page, RenderError> {
	Ok(PageElement::new("div")
		.child(PageElement::new("h1").child("This is a catch boundary!"))
		.child(PageElement::new("p").child(nav_link("/", "Go back home")))
		.into())
}

fn index(_props: &RouteProps<'_>) -> Result<Page, RenderError> {
	Ok(PageElement::new("main")
		.child(PageElement::new("h1").child("Welcome"))
		.into())
}

fn test_route(_props: &RouteProps<'_>) -> Result<Page, RenderError> {
	Ok(PageElement::new("main")
		.child(PageElement::new("h1").child("Test Page"))
		.into())
}

fn defer_route(props: &RouteProps<'_>) -> Result<Page, RenderError> {
	let fast = props
		.data
		.and_then(|d| d.pointer("/fastData/message"))
		.and_then(|m| m.as_str())
		.unwrap_or_default();
	let slow = Suspense::new(PageElement::new("p").child("Loading slow data..."), async {
		tokio::time::sleep(SLOW_DATA_DELAY).await;
		Ok(PageElement::new("p").child("This is slow data").into())
	})
	.error_fallback(PageElement::new("p").child("Error loading slow data!"));

	Ok(PageElement::new("main")
		.child(PageElement::new("h1").child("Defer Route"))
		.child(PageElement::new("p").child(fast))
		.child(slow)
		.into())
}

fn error_route(props: &RouteProps<'_>) -> Result<Page, RenderError> {
	let message = props
		.data
		.and_then(|d| d.get("message"))
		.and_then(|m| m.as_str())
		.ok_or_else(|| RenderError::failed("error route has no loader data"))?;
	Ok(PageElement::new("main").child(PageElement::new("p").child(message)).into())
}

fn root_module() -> RouteModule {
	RouteModule::new()
		.component(app)
		.error_boundary(error_boundary)
		.meta(|_| {
			MetaDescriptor::new()
				.with("charset", "utf-8")
				.with("viewport", "width=device-width,initial-scale=1")
		})
		.links(|| vec![LinkTag::stylesheet(GLOBAL_CSS)])
}

/// Matches `path` against the demo's routes.
fn route(path: &str) -> Result<RenderContext, RenderError> {
	let root = RouteMatch::new("root", "/");
	let context = match path {
		"/" => RenderContext::new(path)
			.route(root, root_module())
			.route(RouteMatch::new("routes/index", "/"), RouteModule::new().component(index)),
		"/test" => RenderContext::new(path).route(root, root_module()).route(
			RouteMatch::new("routes/test", "/test"),
			RouteModule::new()
				.component(test_route)
				.meta(|_| {
					MetaDescriptor::new()
						.with("title", "Test page")
						.with("description", "Remix Test Page!")
				})
				.links(|| vec![LinkTag::stylesheet(TEST_CSS)]),
		),
		"/defer" => RenderContext::new(path)
			.route(root, root_module())
			.route(
				RouteMatch::new("routes/defer", "/defer"),
				RouteModule::new().component(defer_route).meta(|_| {
					MetaDescriptor::new()
						.with("title", "Defer page")
						.with("description", "Let's defer some data!")
				}),
			)
			.loader_data("routes/defer", json!({ "fastData": { "message": "This is fast data" } })),
		"/error" => RenderContext::new(path)
			.route(root, root_module())
			.route(
				RouteMatch::new("routes/error", "/error"),
				RouteModule::new().component(error_route),
			)
			.error("routes/error", json!({ "message": "Oh no! This route failed to load." }))
			.status_code(500),
		// Unmatched URLs only render the catch boundary; their head is empty.
		_ => RenderContext::new(path)
			.route(root, RouteModule::new().component(catch_boundary))
			.status_code(404),
	};
	context.with_handoff()
}

struct DemoApp {
	renderer: DocumentRenderer,
}

#[async_trait::async_trait]
impl Handler for DemoApp {
	async fn handle(&self, request: Request) -> Result<StreamingResponse, BoxError> {
		let context = route(request.path())?;
		let document = self.renderer.respond(&request, &context).await?;

		let path = request.path().to_string();
		let outcome = document.outcome;
		tokio::spawn(async move {
			match outcome.finished().await {
				Ok(report) => tracing::info!(
					%path,
					status = %report.status,
					aborted = report.aborted,
					errors = report.errors.len(),
					"render finished"
				),
				Err(err) => tracing::warn!(%path, error = %err, "render outcome lost"),
			}
		});

		Ok(document.response)
	}
}

fn load_options() -> Result<SsrOptions, BoxError> {
	match std::env::var("HEADWAY_SETTINGS") {
		Ok(path) => {
			let source = std::fs::read_to_string(&path)?;
			let options = SsrOptions::from_toml_str(&source)?;
			tracing::info!(%path, "loaded render settings");
			Ok(options)
		}
		Err(_) => Ok(SsrOptions::default()),
	}
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
	let level = std::env::var("HEADWAY_LOG")
		.ok()
		.and_then(|l| l.parse::<tracing::Level>().ok())
		.unwrap_or(tracing::Level::INFO);
	tracing_subscriber::fmt().with_max_level(level).init();

	let addr: SocketAddr = std::env::var("HEADWAY_ADDR")
		.unwrap_or_else(|_| "127.0.0.1:3000".to_string())
		.parse()?;
	let renderer = DocumentRenderer::new().options(load_options()?);
	let listener = tokio::net::TcpListener::bind(addr).await?;

	HttpServer::new(Arc::new(DemoApp { renderer }))
		.serve_with_shutdown(listener, async {
			let _ = tokio::signal::ctrl_c().await;
		})
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use hyper::StatusCode;
	use rstest::rstest;

	async fn get(path: &str) -> (StatusCode, String) {
		let app = DemoApp {
			renderer: DocumentRenderer::new(),
		};
		let request = Request::builder().uri(path).build().unwrap();
		let response = app.handle(request).await.unwrap();
		let status = response.status;
		let body = response.collect_body().await.unwrap();
		(status, String::from_utf8(body.to_vec()).unwrap())
	}

	#[rstest]
	#[case("/", "<h1>Welcome</h1>")]
	#[case("/test", "<title>Test page</title>")]
	#[case("/not-found", "<h1>This is a catch boundary!</h1>")]
	#[tokio::test]
	async fn test_routes_render(#[case] path: &str, #[case] expected: &str) {
		// Act
		let (_, html) = get(path).await;

		// Assert
		assert!(html.starts_with("<!DOCTYPE html><html><head><!--start head-->"));
		assert!(html.contains(expected));
		assert!(html.ends_with("</div></body></html>"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_not_found_head_falls_back_to_global_css() {
		// Act
		let (status, html) = get("/not-found").await;

		// Assert
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert!(html.contains(
			r#"<!--start head--><link rel="stylesheet" href="/styles/global.css" /><!--end head-->"#
		));
	}

	#[rstest]
	#[tokio::test]
	async fn test_error_route_keeps_error_out_of_head() {
		// Act
		let (status, html) = get("/error").await;

		// Assert
		let head_end = html.find("<!--end head-->").unwrap();
		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert!(!html[..head_end].contains("Oh no!"));
		assert!(html[head_end..].contains("<h1>Oh no! This route failed to load.</h1>"));
	}
}
