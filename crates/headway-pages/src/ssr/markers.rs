//! Markers shared by the server document and the client takeover.
//!
//! The head fragment is delimited by two comments in `document.head`. The
//! client finds and removes that range once its own head is mounted, so
//! the comment text is a contract between both sides.

use crate::component::escape_attr;

/// Text of the comment opening the server head range.
pub const HEAD_START_MARKER: &str = "start head";

/// Text of the comment closing the server head range.
pub const HEAD_END_MARKER: &str = "end head";

/// The opening comment as it appears in markup.
pub const HEAD_START_COMMENT: &str = "<!--start head-->";

/// The closing comment as it appears in markup.
pub const HEAD_END_COMMENT: &str = "<!--end head-->";

/// Id of the element the body is rendered into.
pub const DEFAULT_ROOT_ID: &str = "root";

/// Markup closing the document after the body.
pub const DOCUMENT_CLOSING: &str = "</div></body></html>";

/// Closes a suspense boundary in the shell.
pub(crate) const BOUNDARY_END: &str = "<!--/$-->";

/// Builds everything that precedes the body, with `head` between the
/// sentinel comments.
///
/// # Examples
///
/// ```
/// use headway_pages::ssr::markers::document_preamble;
///
/// assert_eq!(
///     document_preamble("<title>x</title>", "root"),
///     r#"<!DOCTYPE html><html><head><!--start head--><title>x</title><!--end head--></head><body><div id="root">"#,
/// );
/// ```
pub fn document_preamble(head: &str, root_id: &str) -> String {
	format!(
		"<!DOCTYPE html><html><head>{HEAD_START_COMMENT}{head}{HEAD_END_COMMENT}</head><body><div id=\"{}\">",
		escape_attr(root_id)
	)
}

/// Head used when the head render produced nothing.
pub fn fallback_head(stylesheet_href: &str) -> String {
	format!(
		"<link rel=\"stylesheet\" href=\"{}\" />",
		escape_attr(stylesheet_href)
	)
}

/// Opens suspense boundary `id` in the shell.
pub(crate) fn boundary_start(id: usize) -> String {
	format!("<!--$?--><template id=\"B:{id}\"></template>")
}

/// Streams the resolved content of boundary `id`.
pub(crate) fn boundary_resolution(id: usize, markup: &str) -> String {
	format!("<div hidden id=\"S:{id}\">{markup}</div>")
}
