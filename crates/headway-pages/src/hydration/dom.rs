//! Access to the document head.
//!
//! The head takeover only needs to list the head's children, recognise
//! comments, remove nodes, commit client-rendered markup and read or write
//! the head markup. Those operations are traits so the same code runs
//! against `document.head` in the browser and against [`VirtualHead`]
//! natively.

use std::cell::RefCell;
use std::rc::Rc;

use crate::component::is_void_element;

/// A child node of the document head.
pub trait HeadNode {
	/// Returns the text of a comment node, `None` for any other node.
	fn comment_text(&self) -> Option<String>;
}

/// The document head as a list of children.
pub trait HeadTree {
	/// Handle to a child node.
	type Node: HeadNode;

	/// Returns the current children, in document order.
	fn children(&self) -> Vec<Self::Node>;

	/// Removes a child. Removing a node that is no longer attached is a no-op.
	fn remove_child(&mut self, node: &Self::Node);
}

/// Where the client-rendered head is committed.
pub trait PortalTarget {
	/// Replaces whatever the previous commit inserted with `markup`.
	fn commit(&mut self, markup: &str);
}

/// The document head as markup.
pub trait HeadMarkup {
	/// Returns the serialized children.
	fn inner_html(&self) -> String;

	/// Replaces all children with parsed `html`.
	fn set_inner_html(&mut self, html: &str);
}

/// A node of a [`VirtualHead`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualNode {
	/// An element and its outer markup.
	Element { tag: String, html: String },
	/// A comment and its text.
	Comment(String),
	/// Text.
	Text(String),
}

impl VirtualNode {
	/// Creates a comment node.
	pub fn comment(text: impl Into<String>) -> Self {
		Self::Comment(text.into())
	}

	/// Creates an element node from its outer markup.
	///
	/// The tag name is read from the markup.
	pub fn element(html: impl Into<String>) -> Self {
		let html = html.into();
		let tag = tag_name(&html);
		Self::Element { tag, html }
	}

	/// Returns the node serialized as markup.
	pub fn to_html(&self) -> String {
		match self {
			Self::Element { html, .. } => html.clone(),
			Self::Comment(text) => format!("<!--{text}-->"),
			Self::Text(text) => text.clone(),
		}
	}
}

/// Handle to a child of a [`VirtualHead`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualHandle {
	id: u64,
	node: VirtualNode,
}

impl VirtualHandle {
	/// Returns the node.
	pub fn node(&self) -> &VirtualNode {
		&self.node
	}
}

impl HeadNode for VirtualHandle {
	fn comment_text(&self) -> Option<String> {
		match &self.node {
			VirtualNode::Comment(text) => Some(text.clone()),
			_ => None,
		}
	}
}

/// In-memory document head.
///
/// # Examples
///
/// ```
/// use headway_pages::hydration::{HeadMarkup, VirtualHead};
///
/// let head = VirtualHead::parse(r#"<meta charset="utf-8"><!--start head--><title>x</title><!--end head-->"#);
/// assert_eq!(head.len(), 4);
/// assert_eq!(head.inner_html(), r#"<meta charset="utf-8"><!--start head--><title>x</title><!--end head-->"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VirtualHead {
	nodes: Vec<VirtualHandle>,
	portal: Vec<u64>,
	next_id: u64,
}

impl VirtualHead {
	/// Creates an empty head.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a head from a list of nodes.
	pub fn from_nodes(nodes: impl IntoIterator<Item = VirtualNode>) -> Self {
		let mut head = Self::new();
		for node in nodes {
			head.append(node);
		}
		head
	}

	/// Creates a head by parsing markup.
	pub fn parse(markup: &str) -> Self {
		Self::from_nodes(parse_fragment(markup))
	}

	/// Appends a node.
	pub fn append(&mut self, node: VirtualNode) -> u64 {
		let id = self.next_id;
		self.next_id += 1;
		self.nodes.push(VirtualHandle { id, node });
		id
	}

	/// Returns the nodes in document order.
	pub fn nodes(&self) -> impl Iterator<Item = &VirtualNode> {
		self.nodes.iter().map(|h| &h.node)
	}

	/// Returns the number of children.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Returns `true` if the head has no children.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

impl HeadTree for VirtualHead {
	type Node = VirtualHandle;

	fn children(&self) -> Vec<VirtualHandle> {
		self.nodes.clone()
	}

	fn remove_child(&mut self, node: &VirtualHandle) {
		self.nodes.retain(|h| h.id != node.id);
		self.portal.retain(|id| *id != node.id);
	}
}

impl PortalTarget for VirtualHead {
	fn commit(&mut self, markup: &str) {
		let previous = std::mem::take(&mut self.portal);
		self.nodes.retain(|h| !previous.contains(&h.id));
		for node in parse_fragment(markup) {
			let id = self.append(node);
			self.portal.push(id);
		}
	}
}

impl HeadMarkup for VirtualHead {
	fn inner_html(&self) -> String {
		self.nodes.iter().map(|h| h.node.to_html()).collect()
	}

	fn set_inner_html(&mut self, html: &str) {
		self.nodes.clear();
		self.portal.clear();
		for node in parse_fragment(html) {
			self.append(node);
		}
	}
}

// A shared handle stands for the one `document.head` that the hydration
// bootstrap and the mounted client head both hold.
impl<T: HeadTree + ?Sized> HeadTree for Rc<RefCell<T>> {
	type Node = T::Node;

	fn children(&self) -> Vec<T::Node> {
		self.borrow().children()
	}

	fn remove_child(&mut self, node: &T::Node) {
		self.borrow_mut().remove_child(node);
	}
}

impl<T: PortalTarget + ?Sized> PortalTarget for Rc<RefCell<T>> {
	fn commit(&mut self, markup: &str) {
		self.borrow_mut().commit(markup);
	}
}

impl<T: HeadMarkup + ?Sized> HeadMarkup for Rc<RefCell<T>> {
	fn inner_html(&self) -> String {
		self.borrow().inner_html()
	}

	fn set_inner_html(&mut self, html: &str) {
		self.borrow_mut().set_inner_html(html);
	}
}

fn tag_name(markup: &str) -> String {
	markup
		.strip_prefix('<')
		.unwrap_or_default()
		.chars()
		.take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
		.collect::<String>()
		.to_ascii_lowercase()
}

/// Splits head markup into top-level nodes.
///
/// Only handles what a head contains: comments, text, void elements and
/// elements whose content never nests the same tag.
fn parse_fragment(markup: &str) -> Vec<VirtualNode> {
	let mut nodes = Vec::new();
	let mut rest = markup;

	while !rest.is_empty() {
		if let Some(after) = rest.strip_prefix("<!--") {
			let end = after.find("-->").unwrap_or(after.len());
			nodes.push(VirtualNode::Comment(after[..end].to_string()));
			rest = after.get(end + 3..).unwrap_or_default();
			continue;
		}

		let tag = tag_name(rest);
		if tag.is_empty() {
			let end = rest
				.char_indices()
				.skip(1)
				.find(|(_, c)| *c == '<')
				.map_or(rest.len(), |(i, _)| i);
			nodes.push(VirtualNode::Text(rest[..end].to_string()));
			rest = &rest[end..];
			continue;
		}

		let open_end = rest.find('>').map_or(rest.len(), |i| i + 1);
		let len = if is_void_element(&tag) || rest[..open_end].ends_with("/>") {
			open_end
		} else {
			let close = format!("</{tag}>");
			rest[open_end..]
				.find(&close)
				.map_or(rest.len(), |i| open_end + i + close.len())
		};
		nodes.push(VirtualNode::Element {
			tag,
			html: rest[..len].to_string(),
		});
		rest = &rest[len..];
	}

	nodes
}

#[cfg(target_arch = "wasm32")]
mod web {
	use super::{HeadMarkup, HeadNode, HeadTree, PortalTarget};
	use web_sys::{Document, HtmlHeadElement, Node};

	impl HeadNode for Node {
		fn comment_text(&self) -> Option<String> {
			if self.node_type() == Node::COMMENT_NODE {
				self.node_value()
			} else {
				None
			}
		}
	}

	/// The live `document.head`.
	pub struct DocumentHead {
		document: Document,
		head: HtmlHeadElement,
		portal: Vec<Node>,
	}

	impl DocumentHead {
		/// Returns the head of the current document.
		pub fn current() -> Option<Self> {
			let document = web_sys::window()?.document()?;
			let head = document.head()?;
			Some(Self {
				document,
				head,
				portal: Vec::new(),
			})
		}
	}

	impl HeadTree for DocumentHead {
		type Node = Node;

		fn children(&self) -> Vec<Node> {
			let list = self.head.child_nodes();
			(0..list.length()).filter_map(|i| list.item(i)).collect()
		}

		fn remove_child(&mut self, node: &Node) {
			// Fails only if the node was already detached.
			let _ = self.head.remove_child(node);
		}
	}

	impl PortalTarget for DocumentHead {
		fn commit(&mut self, markup: &str) {
			for node in self.portal.drain(..) {
				let _ = self.head.remove_child(&node);
			}
			let Ok(container) = self.document.create_element("div") else {
				crate::error_log!("could not create a container for the client head");
				return;
			};
			container.set_inner_html(markup);
			while let Some(child) = container.first_child() {
				if self.head.append_child(&child).is_err() {
					break;
				}
				self.portal.push(child);
			}
		}
	}

	impl HeadMarkup for DocumentHead {
		fn inner_html(&self) -> String {
			self.head.inner_html()
		}

		fn set_inner_html(&mut self, html: &str) {
			self.portal.clear();
			self.head.set_inner_html(html);
		}
	}
}

#[cfg(target_arch = "wasm32")]
pub use web::DocumentHead;
