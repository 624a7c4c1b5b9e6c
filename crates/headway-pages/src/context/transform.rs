//! Derivation of the head-only render context.

use std::sync::Arc;

use super::{RenderContext, RouteComponent, RouteModule, ROOT_ROUTE_ID, handoff};
use crate::warn_log;

/// Derives the head-only context from a full render context.
///
/// The result differs from `context` in exactly three places:
///
/// 1. `server_handoff` has its `state.errors` removed,
/// 2. `static_handler.errors` is `None`,
/// 3. the root route renders `head` instead of the application root.
///
/// The input is never mutated and the transform never fails. A handoff
/// blob that is not valid JSON is passed through unchanged.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use headway_pages::component::HeadComponent;
/// use headway_pages::context::{RenderContext, RouteMatch, RouteModule};
/// use headway_pages::context::transform::switch_root_component;
/// use serde_json::json;
///
/// let full = RenderContext::new("/")
///     .route(RouteMatch::new("root", "/"), RouteModule::new())
///     .error("root", json!("boom"));
///
/// let head_only = switch_root_component(&full, Arc::new(HeadComponent::new()));
///
/// assert!(head_only.static_handler.errors.is_none());
/// assert!(head_only.root_module().unwrap().component.is_some());
/// assert!(full.has_errors());
/// ```
pub fn switch_root_component(
	context: &RenderContext,
	head: Arc<dyn RouteComponent>,
) -> RenderContext {
	let mut head_context = context.clone();

	if let Some(raw) = &context.server_handoff {
		head_context.server_handoff = Some(match handoff::strip_errors(raw) {
			Ok(stripped) => stripped,
			Err(e) => {
				warn_log!("server handoff is not valid JSON, passing it through: {}", e);
				raw.clone()
			}
		});
	}

	head_context.static_handler.errors = None;

	head_context
		.route_modules
		.entry(ROOT_ROUTE_ID.to_string())
		.or_insert_with(RouteModule::new)
		.component = Some(head);

	head_context
}
