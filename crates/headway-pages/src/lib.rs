//! # Headway Pages
//!
//! Streamed server rendering with a document head that is rendered
//! separately from the body and handed over to the client after hydration.
//!
//! ## Features
//!
//! - **Page tree**: [`component::Page`] with suspense boundaries for
//!   subtrees that resolve after the shell is sent
//! - **Head component**: title, meta and link tags merged from the matched
//!   routes ([`component::HeadComponent`])
//! - **Document streaming**: [`ssr::DocumentRenderer`] renders the head
//!   synchronously, streams the body and enforces a deadline
//! - **Head takeover**: the client re-renders the head and removes the
//!   server copy ([`hydration::ClientHead`])
//!
//! ## Architecture
//!
//! ```text
//! request ──► ReadyPolicy ──► ShellReady / AllReady
//!    │
//!    ├─► switch_root_component ─► head-only context ─► render_to_string ─► head
//!    │
//!    └─► full context ─► render_to_stream ─► shell + deferred subtrees
//!
//! <!DOCTYPE html><html><head><!--start head-->{head}<!--end head--></head>
//! <body><div id="root">{shell}{resolved subtrees}</div></body></html>
//! ```
//!
//! On the client, [`hydration::schedule_hydration`] waits for an idle
//! window, [`hydration::hydrate_document`] attaches to the body, and the
//! client head removes everything between the sentinel comments.
//!
//! ## Example
//!
//! ```
//! use headway_pages::component::{MetaDescriptor, Page, PageElement};
//! use headway_pages::context::{RenderContext, RouteMatch, RouteModule, RouteProps};
//! use headway_pages::ssr::{PageRenderer, RouteTreeRenderer};
//! use headway_pages::RenderError;
//!
//! fn index(_props: &RouteProps<'_>) -> Result<Page, RenderError> {
//!     Ok(PageElement::new("h1").child("Welcome").into())
//! }
//!
//! let context = RenderContext::new("/").route(
//!     RouteMatch::new("root", "/"),
//!     RouteModule::new()
//!         .component(index)
//!         .meta(|_| MetaDescriptor::new().with("title", "Home")),
//! );
//!
//! assert_eq!(RouteTreeRenderer.render_to_string(&context).unwrap(), "<h1>Welcome</h1>");
//! ```

pub mod component;
pub mod context;
pub mod error;
pub mod hydration;
pub mod logging;
pub mod ssr;

pub use error::RenderError;

#[doc(hidden)]
pub use tracing as __tracing;

#[cfg(target_arch = "wasm32")]
#[doc(hidden)]
pub use web_sys as __web_sys;

/// Commonly used types.
pub mod prelude {
	pub use crate::component::{
		HeadComponent, LinkTag, MetaDescriptor, Page, PageElement, Suspense,
	};
	pub use crate::context::{
		RenderContext, RouteComponent, RouteMatch, RouteModule, RouteProps,
	};
	pub use crate::error::RenderError;
	pub use crate::ssr::{PageRenderer, RouteTreeRenderer};

	#[cfg(not(target_arch = "wasm32"))]
	pub use crate::ssr::{DocumentRenderer, DocumentResponse, SsrOptions};
}
