//! Render context.
//!
//! A [`RenderContext`] describes everything a render pass needs: the URL,
//! the matched route tree, each route's module, the data loaded for the
//! request and the serialized handoff blob for the client. The head pass
//! renders a derived copy built by [`transform::switch_root_component`].

pub mod handoff;
pub mod transform;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::component::{LinkTag, MetaDescriptor, Page};
use crate::error::RenderError;

/// Id of the route every matched tree starts from.
pub const ROOT_ROUTE_ID: &str = "root";

/// Props passed to a route component.
pub struct RouteProps<'a> {
	/// The whole context being rendered.
	pub context: &'a RenderContext,
	/// The route this component belongs to.
	pub route: &'a RouteMatch,
	/// Loader data for this route.
	pub data: Option<&'a Value>,
	/// The error being handled, when rendered as an error boundary.
	pub error: Option<&'a Value>,
	/// The already rendered child route.
	pub outlet: Page,
}

/// A renderable route component.
///
/// Plain functions taking `&RouteProps` implement this trait.
///
/// # Examples
///
/// ```
/// use headway_pages::component::{Page, PageElement};
/// use headway_pages::context::{RouteComponent, RouteProps};
/// use headway_pages::RenderError;
///
/// fn test_page(_props: &RouteProps<'_>) -> Result<Page, RenderError> {
///     Ok(PageElement::new("h1").child("Test Page").into())
/// }
/// # fn assert_component(_: impl RouteComponent) {}
/// # assert_component(test_page);
/// ```
pub trait RouteComponent: Send + Sync {
	/// Renders the component.
	fn render(&self, props: &RouteProps<'_>) -> Result<Page, RenderError>;

	/// A name for logs.
	fn name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}
}

impl<F> RouteComponent for F
where
	F: Fn(&RouteProps<'_>) -> Result<Page, RenderError> + Send + Sync,
{
	fn render(&self, props: &RouteProps<'_>) -> Result<Page, RenderError> {
		self(props)
	}
}

/// Arguments passed to a route's `meta` function.
#[derive(Debug, Clone, Copy)]
pub struct MetaArgs<'a> {
	/// The route id.
	pub route_id: &'a str,
	/// Path params of the match.
	pub params: &'a BTreeMap<String, String>,
	/// Loader data for the route.
	pub data: Option<&'a Value>,
	/// The request URL.
	pub location: &'a str,
}

/// A route's `meta` function.
pub type MetaFn = Arc<dyn Fn(&MetaArgs<'_>) -> MetaDescriptor + Send + Sync>;

/// A route's `links` function.
pub type LinksFn = Arc<dyn Fn() -> Vec<LinkTag> + Send + Sync>;

/// Everything a route exports.
#[derive(Clone, Default)]
pub struct RouteModule {
	pub component: Option<Arc<dyn RouteComponent>>,
	pub error_boundary: Option<Arc<dyn RouteComponent>>,
	pub meta: Option<MetaFn>,
	pub links: Option<LinksFn>,
}

impl RouteModule {
	/// Creates an empty module.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the component.
	pub fn component(mut self, component: impl RouteComponent + 'static) -> Self {
		self.component = Some(Arc::new(component));
		self
	}

	/// Sets the error boundary.
	pub fn error_boundary(mut self, boundary: impl RouteComponent + 'static) -> Self {
		self.error_boundary = Some(Arc::new(boundary));
		self
	}

	/// Sets the `meta` function.
	pub fn meta<F>(mut self, meta: F) -> Self
	where
		F: Fn(&MetaArgs<'_>) -> MetaDescriptor + Send + Sync + 'static,
	{
		self.meta = Some(Arc::new(meta));
		self
	}

	/// Sets the `links` function.
	pub fn links<F>(mut self, links: F) -> Self
	where
		F: Fn() -> Vec<LinkTag> + Send + Sync + 'static,
	{
		self.links = Some(Arc::new(links));
		self
	}
}

impl fmt::Debug for RouteModule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteModule")
			.field("component", &self.component.as_ref().map(|c| c.name()))
			.field(
				"error_boundary",
				&self.error_boundary.as_ref().map(|c| c.name()),
			)
			.field("meta", &self.meta.is_some())
			.field("links", &self.links.is_some())
			.finish()
	}
}

/// One level of the matched route tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
	pub route_id: String,
	pub pathname: String,
	pub params: BTreeMap<String, String>,
}

impl RouteMatch {
	/// Creates a match without params.
	pub fn new(route_id: impl Into<String>, pathname: impl Into<String>) -> Self {
		Self {
			route_id: route_id.into(),
			pathname: pathname.into(),
			params: BTreeMap::new(),
		}
	}

	/// Adds a path param.
	pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(name.into(), value.into());
		self
	}
}

/// Request-scoped data produced before rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticHandlerContext {
	pub status_code: u16,
	#[serde(default)]
	pub loader_data: BTreeMap<String, Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub action_data: Option<BTreeMap<String, Value>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub errors: Option<BTreeMap<String, Value>>,
}

impl Default for StaticHandlerContext {
	fn default() -> Self {
		Self {
			status_code: 200,
			loader_data: BTreeMap::new(),
			action_data: None,
			errors: None,
		}
	}
}

impl StaticHandlerContext {
	/// Returns the first route, in match order, that carries an error.
	pub fn first_error<'a>(&'a self, matches: &'a [RouteMatch]) -> Option<(usize, &'a Value)> {
		let errors = self.errors.as_ref()?;
		matches
			.iter()
			.enumerate()
			.find_map(|(index, route)| errors.get(&route.route_id).map(|e| (index, e)))
	}
}

/// Everything a render pass needs.
///
/// Cloning is cheap for the route modules (components sit behind `Arc`);
/// loader data is cloned.
#[derive(Clone, Default)]
pub struct RenderContext {
	pub url: String,
	pub matches: Vec<RouteMatch>,
	pub route_modules: HashMap<String, RouteModule>,
	pub static_handler: StaticHandlerContext,
	pub server_handoff: Option<String>,
}

impl RenderContext {
	/// Creates an empty context for `url`.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			..Self::default()
		}
	}

	/// Appends a matched route and registers its module.
	///
	/// # Examples
	///
	/// ```
	/// use headway_pages::context::{RenderContext, RouteMatch, RouteModule};
	///
	/// let context = RenderContext::new("/test")
	///     .route(RouteMatch::new("root", "/"), RouteModule::new())
	///     .route(RouteMatch::new("routes/test", "/test"), RouteModule::new());
	/// assert_eq!(context.matches.len(), 2);
	/// ```
	pub fn route(mut self, route: RouteMatch, module: RouteModule) -> Self {
		self.route_modules.insert(route.route_id.clone(), module);
		self.matches.push(route);
		self
	}

	/// Sets the loader data of a route.
	pub fn loader_data(mut self, route_id: impl Into<String>, data: Value) -> Self {
		self.static_handler
			.loader_data
			.insert(route_id.into(), data);
		self
	}

	/// Records an error thrown by a route.
	pub fn error(mut self, route_id: impl Into<String>, error: Value) -> Self {
		self.static_handler
			.errors
			.get_or_insert_with(BTreeMap::new)
			.insert(route_id.into(), error);
		self
	}

	/// Sets the status code decided before rendering.
	pub fn status_code(mut self, status: u16) -> Self {
		self.static_handler.status_code = status;
		self
	}

	/// Serializes the current request state into `server_handoff`.
	pub fn with_handoff(mut self) -> Result<Self, RenderError> {
		self.server_handoff = Some(handoff::serialize_state(
			&self.url,
			&self.static_handler,
		)?);
		Ok(self)
	}

	/// Returns the module of the root route.
	pub fn root_module(&self) -> Option<&RouteModule> {
		self.route_modules.get(ROOT_ROUTE_ID)
	}

	/// Returns `true` if any route carries an error.
	pub fn has_errors(&self) -> bool {
		self.static_handler
			.errors
			.as_ref()
			.is_some_and(|errors| !errors.is_empty())
	}
}

impl fmt::Debug for RenderContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RenderContext")
			.field("url", &self.url)
			.field("matches", &self.matches)
			.field("static_handler", &self.static_handler)
			.field("server_handoff", &self.server_handoff)
			.finish_non_exhaustive()
	}
}
