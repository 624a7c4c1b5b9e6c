//! Server-side rendering.
//!
//! [`DocumentRenderer`] turns a [`RenderContext`](crate::context::RenderContext)
//! into a streamed HTML document whose head is rendered separately from the
//! body:
//!
//! ```text
//! <!DOCTYPE html><html><head><!--start head-->{head}<!--end head--></head>
//! <body><div id="root">{shell}{deferred chunks...}</div></body></html>
//! ```
//!
//! Markers and the route-tree renderer compile on every target; the
//! streaming pieces are server-only.

pub mod markers;
mod renderer;

#[cfg(not(target_arch = "wasm32"))]
mod document;
#[cfg(not(target_arch = "wasm32"))]
mod options;
#[cfg(not(target_arch = "wasm32"))]
mod policy;
#[cfg(not(target_arch = "wasm32"))]
mod stream;

pub use renderer::{PageRenderer, RouteTreeRenderer, render_root};

#[cfg(not(target_arch = "wasm32"))]
pub use document::{DocumentRenderer, DocumentResponse};
#[cfg(not(target_arch = "wasm32"))]
pub use options::{DEFAULT_ABORT_DELAY_MS, DEFAULT_GLOBAL_STYLESHEET, SsrOptions};
#[cfg(not(target_arch = "wasm32"))]
pub use policy::{CrawlerPolicy, FixedPolicy, ReadyPolicy, ReadyStrategy, is_crawler};
#[cfg(not(target_arch = "wasm32"))]
pub use stream::{AbortHandle, RenderOutcome, StreamReport};
