//! # Headway
//!
//! Streamed server rendering where the document head is rendered on its own,
//! sent first and taken over by the client after hydration.
//!
//! ## Feature Flags
//!
//! - `pages` (default) - page tree, head component, document streaming and
//!   client head handoff ([`pages`])
//! - `server` (default) - hyper HTTP/1 server ([`server`])
//! - `debug-hooks` - verbose `debug_log!` output from the pages crate
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use headway::http::{BoxError, Handler, Request, StreamingResponse};
//! use headway::pages::prelude::*;
//! use headway::server::HttpServer;
//!
//! fn index(_props: &RouteProps<'_>) -> Result<Page, RenderError> {
//!     Ok(PageElement::new("h1").child("Welcome").into())
//! }
//!
//! struct App {
//!     renderer: DocumentRenderer,
//! }
//!
//! #[async_trait::async_trait]
//! impl Handler for App {
//!     async fn handle(&self, request: Request) -> Result<StreamingResponse, BoxError> {
//!         let context = RenderContext::new(request.path()).route(
//!             RouteMatch::new("root", "/"),
//!             RouteModule::new()
//!                 .component(index)
//!                 .meta(|_| MetaDescriptor::new().with("title", "Home")),
//!         );
//!         Ok(self.renderer.respond(&request, &context).await?.into_response())
//!     }
//! }
//!
//! # async fn run() -> Result<(), BoxError> {
//! let app = App { renderer: DocumentRenderer::new() };
//! HttpServer::new(Arc::new(app)).listen("127.0.0.1:3000".parse()?).await
//! # }
//! ```

#[cfg(not(target_arch = "wasm32"))]
pub mod http;
#[cfg(feature = "pages")]
pub mod pages;
#[cfg(all(feature = "server", not(target_arch = "wasm32")))]
pub mod server;

#[cfg(feature = "pages")]
pub use headway_pages::RenderError;
