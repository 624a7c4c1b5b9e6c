//! Page tree, head component and document streaming
//!
//! This module provides access to headway-pages.
//!
//! ## Architecture
//!
//! - **Components**: route components returning a [`component::Page`] tree
//! - **Head**: title, meta and links merged from the matched routes
//! - **SSR**: head rendered to a string, body streamed with a deadline
//! - **Hydration**: client takeover of the server-rendered head

// Re-export all headway-pages functionality
pub use headway_pages::*;
