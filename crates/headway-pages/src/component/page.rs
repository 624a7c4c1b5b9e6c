//! Renderable page tree.
//!
//! [`Page`] is the value every route component produces. It renders either
//! to a complete string (head pass, error fallbacks) or to a streaming
//! shell where each [`Suspense`] boundary emits its fallback now and hands
//! its deferred subtree to the stream driver.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::RenderError;
use crate::ssr::markers;

/// A deferred subtree waiting to resolve.
pub type DeferredPage = BoxFuture<'static, Result<Page, RenderError>>;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

/// A node of the page tree.
#[derive(Debug, Clone, Default)]
pub enum Page {
	/// An HTML element.
	Element(PageElement),
	/// Escaped text.
	Text(String),
	/// Trusted markup inserted verbatim.
	RawHtml(String),
	/// Siblings without a wrapper.
	Fragment(Vec<Page>),
	/// A boundary around a deferred subtree.
	Suspense(Suspense),
	/// Renders nothing.
	#[default]
	Empty,
}

/// An HTML element with attributes and children.
#[derive(Debug, Clone)]
pub struct PageElement {
	tag: String,
	attrs: Vec<(String, String)>,
	children: Vec<Page>,
}

impl PageElement {
	/// Creates an element with no attributes or children.
	///
	/// # Examples
	///
	/// ```
	/// use headway_pages::component::{Page, PageElement};
	///
	/// let page: Page = PageElement::new("h1").attr("class", "title").child("Test Page").into();
	/// assert_eq!(page.render_to_string(), r#"<h1 class="title">Test Page</h1>"#);
	/// ```
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			attrs: Vec::new(),
			children: Vec::new(),
		}
	}

	/// Adds an attribute. Attribute order is preserved.
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	/// Appends a child.
	pub fn child(mut self, child: impl Into<Page>) -> Self {
		self.children.push(child.into());
		self
	}

	/// Appends several children.
	pub fn children<I, P>(mut self, children: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<Page>,
	{
		self.children.extend(children.into_iter().map(Into::into));
		self
	}

	/// Returns the tag name.
	pub fn tag(&self) -> &str {
		&self.tag
	}

	/// Returns the value of an attribute, if set.
	pub fn get_attr(&self, name: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, v)| v.as_str())
	}

	fn is_void(&self) -> bool {
		is_void_element(&self.tag)
	}

	fn write_open_tag(&self, out: &mut String) {
		out.push('<');
		out.push_str(&self.tag);
		for (name, value) in &self.attrs {
			out.push(' ');
			out.push_str(name);
			out.push_str("=\"");
			out.push_str(&escape_attr(value));
			out.push('"');
		}
		out.push('>');
	}

	fn write_close_tag(&self, out: &mut String) {
		out.push_str("</");
		out.push_str(&self.tag);
		out.push('>');
	}
}

/// A boundary around a subtree that resolves later.
///
/// The deferred future is taken by the first streaming render. Any later
/// render (or a string render) sees only the fallback.
#[derive(Clone)]
pub struct Suspense {
	fallback: Box<Page>,
	error_fallback: Option<Box<Page>>,
	resolve: Arc<Mutex<Option<DeferredPage>>>,
}

impl Suspense {
	/// Creates a boundary showing `fallback` until `resolve` completes.
	///
	/// # Examples
	///
	/// ```
	/// use headway_pages::component::{Page, Suspense};
	///
	/// let slow = Suspense::new("Loading slow data...", async {
	///     Ok(Page::text("This is slow data"))
	/// })
	/// .error_fallback("Error loading slow data!");
	///
	/// assert_eq!(Page::from(slow).render_to_string(), "Loading slow data...");
	/// ```
	pub fn new<F>(fallback: impl Into<Page>, resolve: F) -> Self
	where
		F: Future<Output = Result<Page, RenderError>> + Send + 'static,
	{
		Self {
			fallback: Box::new(fallback.into()),
			error_fallback: None,
			resolve: Arc::new(Mutex::new(Some(Box::pin(resolve)))),
		}
	}

	/// Sets the markup streamed in place of the subtree when it fails.
	pub fn error_fallback(mut self, page: impl Into<Page>) -> Self {
		self.error_fallback = Some(Box::new(page.into()));
		self
	}

	/// Returns the fallback.
	pub fn fallback(&self) -> &Page {
		&self.fallback
	}

	/// Returns `true` while the deferred subtree has not been claimed.
	pub fn is_pending(&self) -> bool {
		self.resolve.lock().is_some()
	}

	fn take(&self) -> Option<DeferredPage> {
		self.resolve.lock().take()
	}
}

impl fmt::Debug for Suspense {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Suspense")
			.field("fallback", &self.fallback)
			.field("error_fallback", &self.error_fallback)
			.field("pending", &self.is_pending())
			.finish()
	}
}

/// Allocates boundary ids for one document.
///
/// Ids are unique across the shell and every subtree streamed later, so one
/// allocator is shared by the whole response.
#[derive(Debug, Default)]
pub struct BoundaryIds {
	next: usize,
}

impl BoundaryIds {
	/// Creates an allocator starting at `B:0`.
	pub fn new() -> Self {
		Self::default()
	}

	fn allocate(&mut self) -> usize {
		let id = self.next;
		self.next += 1;
		id
	}
}

/// A deferred subtree discovered while rendering a shell.
pub struct PendingBoundary {
	/// Boundary id, `B:{id}` in the shell markup.
	pub id: usize,
	/// Markup streamed in place of the subtree if it fails.
	pub error_fallback: Option<Page>,
	/// The subtree itself.
	pub deferred: DeferredPage,
}

impl fmt::Debug for PendingBoundary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PendingBoundary")
			.field("id", &self.id)
			.field("error_fallback", &self.error_fallback)
			.finish_non_exhaustive()
	}
}

/// Output of a streaming render: the shell plus the subtrees still pending.
#[derive(Debug, Default)]
pub struct ShellRender {
	/// Markup available immediately.
	pub markup: String,
	/// Deferred subtrees, in document order.
	pub pending: Vec<PendingBoundary>,
}

impl ShellRender {
	/// Returns `true` when the shell is the whole document.
	pub fn is_complete(&self) -> bool {
		self.pending.is_empty()
	}
}

impl Page {
	/// Creates a text node.
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	/// Creates a raw markup node. The markup is not escaped.
	pub fn raw_html(html: impl Into<String>) -> Self {
		Self::RawHtml(html.into())
	}

	/// Creates a fragment.
	pub fn fragment<I, P>(children: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<Page>,
	{
		Self::Fragment(children.into_iter().map(Into::into).collect())
	}

	/// Returns `true` if this node renders nothing.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Empty => true,
			Self::Fragment(children) => children.iter().all(Page::is_empty),
			Self::Text(text) | Self::RawHtml(text) => text.is_empty(),
			Self::Element(_) | Self::Suspense(_) => false,
		}
	}

	/// Renders the whole tree to a string.
	///
	/// Suspense boundaries render their fallback; deferred subtrees are left
	/// untouched.
	pub fn render_to_string(&self) -> String {
		let mut out = String::new();
		self.write_string(&mut out);
		out
	}

	fn write_string(&self, out: &mut String) {
		match self {
			Self::Element(element) => {
				element.write_open_tag(out);
				if !element.is_void() {
					for child in &element.children {
						child.write_string(out);
					}
					element.write_close_tag(out);
				}
			}
			Self::Text(text) => out.push_str(&escape_text(text)),
			Self::RawHtml(html) => out.push_str(html),
			Self::Fragment(children) => {
				for child in children {
					child.write_string(out);
				}
			}
			Self::Suspense(suspense) => suspense.fallback.write_string(out),
			Self::Empty => {}
		}
	}

	/// Renders the shell, claiming every pending suspense boundary.
	///
	/// Each claimed boundary is wrapped in boundary markers so the stream
	/// can later deliver its content under the same id.
	pub fn render_shell(&self, ids: &mut BoundaryIds) -> ShellRender {
		let mut shell = ShellRender::default();
		self.write_shell(ids, &mut shell);
		shell
	}

	fn write_shell(&self, ids: &mut BoundaryIds, shell: &mut ShellRender) {
		match self {
			Self::Element(element) => {
				element.write_open_tag(&mut shell.markup);
				if !element.is_void() {
					for child in &element.children {
						child.write_shell(ids, shell);
					}
					element.write_close_tag(&mut shell.markup);
				}
			}
			Self::Fragment(children) => {
				for child in children {
					child.write_shell(ids, shell);
				}
			}
			Self::Suspense(suspense) => match suspense.take() {
				Some(deferred) => {
					let id = ids.allocate();
					shell.markup.push_str(&markers::boundary_start(id));
					suspense.fallback.write_shell(ids, shell);
					shell.markup.push_str(markers::BOUNDARY_END);
					shell.pending.push(PendingBoundary {
						id,
						error_fallback: suspense.error_fallback.as_deref().cloned(),
						deferred,
					});
				}
				None => suspense.fallback.write_shell(ids, shell),
			},
			other => other.write_string(&mut shell.markup),
		}
	}
}

impl From<PageElement> for Page {
	fn from(element: PageElement) -> Self {
		Self::Element(element)
	}
}

impl From<Suspense> for Page {
	fn from(suspense: Suspense) -> Self {
		Self::Suspense(suspense)
	}
}

impl From<&str> for Page {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<String> for Page {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<Vec<Page>> for Page {
	fn from(children: Vec<Page>) -> Self {
		Self::Fragment(children)
	}
}

/// Returns `true` for elements without children or a closing tag.
pub(crate) fn is_void_element(tag: &str) -> bool {
	VOID_ELEMENTS.contains(&tag)
}

/// Escapes text content.
fn escape_text(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			_ => out.push(c),
		}
	}
	out
}

/// Escapes a double-quoted attribute value.
pub(crate) fn escape_attr(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#x27;"),
			_ => out.push(c),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::FutureExt;
	use rstest::rstest;

	#[rstest]
	fn test_void_elements_have_no_closing_tag() {
		// Arrange
		let page: Page = PageElement::new("meta")
			.attr("name", "description")
			.attr("content", "Remix Test Page!")
			.into();

		// Act
		let html = page.render_to_string();

		// Assert
		assert_eq!(html, r#"<meta name="description" content="Remix Test Page!">"#);
	}

	#[rstest]
	#[case("<script>", "&lt;script&gt;")]
	#[case("a & b", "a &amp; b")]
	#[case("plain", "plain")]
	fn test_text_is_escaped(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(Page::text(input).render_to_string(), expected);
	}

	#[rstest]
	fn test_attribute_quotes_are_escaped() {
		// Arrange
		let page: Page = PageElement::new("div").attr("title", r#"say "hi""#).into();

		// Act & Assert
		assert_eq!(
			page.render_to_string(),
			r#"<div title="say &quot;hi&quot;"></div>"#
		);
	}

	#[rstest]
	fn test_raw_html_is_verbatim() {
		assert_eq!(Page::raw_html("<b>x</b>").render_to_string(), "<b>x</b>");
	}

	#[rstest]
	#[case(Page::Empty, true)]
	#[case(Page::fragment(vec![Page::Empty, Page::text("")]), true)]
	#[case(Page::text("x"), false)]
	#[case(PageElement::new("title").into(), false)]
	fn test_is_empty(#[case] page: Page, #[case] expected: bool) {
		assert_eq!(page.is_empty(), expected);
	}

	#[rstest]
	fn test_shell_claims_suspense_once() {
		// Arrange
		let page = Page::fragment(vec![
			Page::text("fast"),
			Suspense::new("Loading...", async { Ok(Page::text("slow")) }).into(),
		]);
		let mut ids = BoundaryIds::new();

		// Act
		let first = page.render_shell(&mut ids);
		let second = page.render_shell(&mut ids);

		// Assert
		assert_eq!(
			first.markup,
			r#"fast<!--$?--><template id="B:0"></template>Loading...<!--/$-->"#
		);
		assert_eq!(first.pending.len(), 1);
		assert_eq!(first.pending[0].id, 0);
		assert_eq!(second.markup, "fastLoading...");
		assert!(second.is_complete());
	}

	#[rstest]
	fn test_nested_boundaries_get_distinct_ids() {
		// Arrange
		let page: Page = PageElement::new("main")
			.child(Suspense::new("a", async { Ok(Page::Empty) }))
			.child(Suspense::new("b", async { Ok(Page::Empty) }))
			.into();
		let mut ids = BoundaryIds::new();

		// Act
		let shell = page.render_shell(&mut ids);

		// Assert
		let ids: Vec<usize> = shell.pending.iter().map(|p| p.id).collect();
		assert_eq!(ids, vec![0, 1]);
		assert!(shell.markup.starts_with("<main>"));
		assert!(shell.markup.ends_with("</main>"));
	}

	#[rstest]
	fn test_pending_boundary_keeps_error_fallback() {
		// Arrange
		let page: Page = Suspense::new("Loading", async { Err(RenderError::failed("nope")) })
			.error_fallback("Error loading slow data!")
			.into();
		let mut ids = BoundaryIds::new();

		// Act
		let mut shell = page.render_shell(&mut ids);
		let boundary = shell.pending.remove(0);
		let resolved = boundary.deferred.now_or_never();

		// Assert
		assert_eq!(
			boundary.error_fallback.map(|p| p.render_to_string()),
			Some("Error loading slow data!".to_string())
		);
		assert!(matches!(resolved, Some(Err(RenderError::Failed(_)))));
	}
}
