//! Document head rendering.
//!
//! [`HeadComponent`] renders only title, meta and link elements, computed
//! from the matched routes' `meta` and `links` functions. The server renders
//! it in place of the application root; the client renders the same
//! component into `document.head` so both passes agree.

use serde_json::Value;

use super::page::{Page, PageElement};
use crate::context::{MetaArgs, RenderContext, RouteComponent, RouteProps};
use crate::error::RenderError;

/// Ordered meta key/value pairs.
///
/// Inserting an existing key replaces its value in place, which is how a
/// deeper route overrides a parent's meta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaDescriptor {
	entries: Vec<(String, String)>,
}

impl MetaDescriptor {
	/// Creates an empty descriptor.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an entry, builder style.
	///
	/// # Examples
	///
	/// ```
	/// use headway_pages::component::MetaDescriptor;
	///
	/// let meta = MetaDescriptor::new()
	///     .with("title", "Test page")
	///     .with("description", "Remix Test Page!");
	/// assert_eq!(meta.get("title"), Some("Test page"));
	/// ```
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(key, value);
		self
	}

	/// Inserts or replaces an entry.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
		let key = key.into();
		let value = value.into();
		match self.entries.iter_mut().find(|(k, _)| *k == key) {
			Some(entry) => entry.1 = value,
			None => self.entries.push((key, value)),
		}
	}

	/// Returns the value for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.entries
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.as_str())
	}

	/// Merges `other` over `self`.
	pub fn merge(&mut self, other: MetaDescriptor) {
		for (key, value) in other.entries {
			self.insert(key, value);
		}
	}

	/// Iterates entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Returns `true` if there are no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// A `<link>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTag {
	rel: String,
	href: String,
	attrs: Vec<(String, String)>,
}

impl LinkTag {
	/// Creates a link with the given relation.
	pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
		Self {
			rel: rel.into(),
			href: href.into(),
			attrs: Vec::new(),
		}
	}

	/// Creates a stylesheet link.
	pub fn stylesheet(href: impl Into<String>) -> Self {
		Self::new("stylesheet", href)
	}

	/// Adds an extra attribute.
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	/// Returns the href.
	pub fn href(&self) -> &str {
		&self.href
	}

	fn to_page(&self) -> Page {
		let mut element = PageElement::new("link")
			.attr("rel", self.rel.as_str())
			.attr("href", self.href.as_str());
		for (name, value) in &self.attrs {
			element = element.attr(name.as_str(), value.as_str());
		}
		element.into()
	}
}

/// Renders the document head for a render context.
///
/// Output order is fixed: `<title>`, meta tags, link tags. An explicit
/// title overrides a `title` meta entry. With neither, no `<title>` is
/// produced.
///
/// # Examples
///
/// ```
/// use headway_pages::component::HeadComponent;
/// use headway_pages::context::RenderContext;
///
/// let head = HeadComponent::with_title("Error");
/// let markup = head.render_head(&RenderContext::new("/")).render_to_string();
/// assert_eq!(markup, "<title>Error</title>");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadComponent {
	title: Option<String>,
}

impl HeadComponent {
	/// Creates a head component without an explicit title.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a head component with an explicit title.
	pub fn with_title(title: impl Into<String>) -> Self {
		Self {
			title: Some(title.into()),
		}
	}

	/// Returns the explicit title, if any.
	pub fn title(&self) -> Option<&str> {
		self.title.as_deref()
	}

	/// Collects merged meta (root to leaf, deeper wins) and links (root to
	/// leaf, concatenated) for the matched routes.
	pub fn collect(&self, context: &RenderContext) -> (MetaDescriptor, Vec<LinkTag>) {
		let mut meta = MetaDescriptor::new();
		let mut links = Vec::new();
		for route in &context.matches {
			let Some(module) = context.route_modules.get(&route.route_id) else {
				continue;
			};
			if let Some(meta_fn) = &module.meta {
				let args = MetaArgs {
					route_id: &route.route_id,
					params: &route.params,
					data: context.static_handler.loader_data.get(&route.route_id),
					location: &context.url,
				};
				meta.merge(meta_fn(&args));
			}
			if let Some(links_fn) = &module.links {
				links.extend(links_fn());
			}
		}
		(meta, links)
	}

	/// Renders the head elements for `context`.
	pub fn render_head(&self, context: &RenderContext) -> Page {
		let (meta, links) = self.collect(context);
		let mut children = Vec::new();

		let title = self.title.as_deref().or_else(|| meta.get("title"));
		if let Some(title) = title {
			children.push(PageElement::new("title").child(title).into());
		}

		for (key, value) in meta.iter() {
			let element = match key {
				"title" => continue,
				"charset" => PageElement::new("meta").attr("charset", value),
				k if k.starts_with("og:") => PageElement::new("meta")
					.attr("property", k)
					.attr("content", value),
				k => PageElement::new("meta").attr("name", k).attr("content", value),
			};
			children.push(element.into());
		}

		children.extend(links.iter().map(LinkTag::to_page));
		Page::Fragment(children)
	}
}

impl RouteComponent for HeadComponent {
	fn render(&self, props: &RouteProps<'_>) -> Result<Page, RenderError> {
		Ok(self.render_head(props.context))
	}

	fn name(&self) -> &'static str {
		"HeadComponent"
	}
}

/// Reads a string field from route loader data.
///
/// Handy inside `meta` functions that derive titles from data.
pub fn data_str<'a>(data: Option<&'a Value>, field: &str) -> Option<&'a str> {
	data?.get(field)?.as_str()
}
