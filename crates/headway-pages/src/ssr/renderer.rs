//! Rendering a matched route tree.

use serde_json::Value;

use crate::component::{BoundaryIds, Page, ShellRender};
use crate::context::{RenderContext, RouteComponent, RouteMatch, RouteProps};
use crate::error::RenderError;

/// Renders a [`RenderContext`] to markup.
///
/// The document renderer uses
/// [`render_root_to_string`](Self::render_root_to_string) for the head pass
/// and [`render_to_stream`](Self::render_to_stream) for the body.
pub trait PageRenderer: Send + Sync {
	/// Renders only the root route, with an empty outlet.
	fn render_root_to_string(&self, context: &RenderContext) -> Result<String, RenderError> {
		Ok(render_root(context)?.render_to_string())
	}

	/// Renders the complete markup synchronously. Suspense boundaries
	/// render their fallback.
	fn render_to_string(&self, context: &RenderContext) -> Result<String, RenderError>;

	/// Renders the shell and returns the deferred subtrees still pending.
	///
	/// An `Err` is a shell error: nothing has been sent yet.
	fn render_to_stream(
		&self,
		context: &RenderContext,
		ids: &mut BoundaryIds,
	) -> Result<ShellRender, RenderError>;
}

/// Composes route components from leaf to root.
///
/// Each route renders with the output of its child route as `outlet`. A
/// route without a component passes its outlet through. When routes carry
/// errors, the nearest error boundary at or above the first erroring route
/// renders instead and everything below it is dropped.
///
/// # Examples
///
/// ```
/// use headway_pages::component::{Page, PageElement};
/// use headway_pages::context::{RenderContext, RouteMatch, RouteModule, RouteProps};
/// use headway_pages::ssr::{PageRenderer, RouteTreeRenderer};
/// use headway_pages::RenderError;
///
/// fn layout(props: &RouteProps<'_>) -> Result<Page, RenderError> {
///     Ok(PageElement::new("main").child(props.outlet.clone()).into())
/// }
///
/// fn test_page(_props: &RouteProps<'_>) -> Result<Page, RenderError> {
///     Ok(PageElement::new("h1").child("Test Page").into())
/// }
///
/// let context = RenderContext::new("/test")
///     .route(RouteMatch::new("root", "/"), RouteModule::new().component(layout))
///     .route(RouteMatch::new("routes/test", "/test"), RouteModule::new().component(test_page));
///
/// let html = RouteTreeRenderer.render_to_string(&context).unwrap();
/// assert_eq!(html, "<main><h1>Test Page</h1></main>");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTreeRenderer;

impl RouteTreeRenderer {
	/// Builds the page tree for `context`.
	pub fn render_tree(&self, context: &RenderContext) -> Result<Page, RenderError> {
		let matches = &context.matches;
		if matches.is_empty() {
			return Ok(Page::Empty);
		}

		let mut last = matches.len() - 1;
		let mut boundary_error = None;

		if let Some((failed, error)) = context.static_handler.first_error(matches) {
			let boundary = (0..=failed).rev().find(|&index| {
				context
					.route_modules
					.get(&matches[index].route_id)
					.is_some_and(|module| module.error_boundary.is_some())
			});
			match boundary {
				Some(index) => {
					last = index;
					boundary_error = Some(error);
				}
				None => {
					return Err(RenderError::Shell(format!(
						"route `{}` failed and no error boundary handles it: {}",
						matches[failed].route_id, error
					)));
				}
			}
		}

		let mut outlet = Page::Empty;
		for (index, route) in matches[..=last].iter().enumerate().rev() {
			let Some(module) = context.route_modules.get(&route.route_id) else {
				continue;
			};
			let (component, error) = match boundary_error {
				Some(error) if index == last => (module.error_boundary.as_ref(), Some(error)),
				_ => (module.component.as_ref(), None),
			};
			let Some(component) = component else {
				continue;
			};

			let data = context.static_handler.loader_data.get(&route.route_id);
			let child = std::mem::take(&mut outlet);
			outlet = render_route(component.as_ref(), context, route, data, error, child)?;
		}

		Ok(outlet)
	}
}

fn render_route(
	component: &dyn RouteComponent,
	context: &RenderContext,
	route: &RouteMatch,
	data: Option<&Value>,
	error: Option<&Value>,
	outlet: Page,
) -> Result<Page, RenderError> {
	let props = RouteProps {
		context,
		route,
		data,
		error,
		outlet,
	};
	component.render(&props).map_err(|e| match e {
		RenderError::Component { .. } => e,
		other => RenderError::Component {
			route_id: route.route_id.clone(),
			message: other.to_string(),
		},
	})
}

/// Renders the root route's component alone.
///
/// Child routes are not rendered and route errors are ignored: the head
/// pass swaps the root for the head component, and nothing below the root
/// belongs in `<head>`. A root without a component renders nothing.
pub fn render_root(context: &RenderContext) -> Result<Page, RenderError> {
	let Some(root) = context.matches.first() else {
		return Ok(Page::Empty);
	};
	let Some(component) = context
		.route_modules
		.get(&root.route_id)
		.and_then(|module| module.component.as_deref())
	else {
		return Ok(Page::Empty);
	};
	let data = context.static_handler.loader_data.get(&root.route_id);
	render_route(component, context, root, data, None, Page::Empty)
}

impl PageRenderer for RouteTreeRenderer {
	fn render_to_string(&self, context: &RenderContext) -> Result<String, RenderError> {
		Ok(self.render_tree(context)?.render_to_string())
	}

	fn render_to_stream(
		&self,
		context: &RenderContext,
		ids: &mut BoundaryIds,
	) -> Result<ShellRender, RenderError> {
		Ok(self.render_tree(context)?.render_shell(ids))
	}
}
