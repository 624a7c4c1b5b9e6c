//! Removing the server-rendered head once the client head is mounted.

use std::ops::Range;

use super::dom::{HeadNode, HeadTree};
use crate::ssr::markers::{HEAD_END_MARKER, HEAD_START_MARKER};
use crate::{debug_log, warn_log};

/// Result of a removal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadRemoval {
	/// The range was found; this many nodes were removed, markers included.
	Removed(usize),
	/// No start marker: the range is already gone.
	NoStartMarker,
	/// A start marker without an end marker. Nothing was removed.
	NoEndMarker,
}

/// Locates the server head range among `children`.
///
/// Scans once, in order: everything before the start marker is skipped,
/// and the range runs from the start marker through the first end marker
/// after it, both included.
///
/// # Examples
///
/// ```
/// use headway_pages::hydration::{VirtualHead, HeadTree, find_server_head_range};
///
/// let head = VirtualHead::parse("<meta charset=\"utf-8\"><!--start head--><title>x</title><!--end head-->");
/// assert_eq!(find_server_head_range(&head.children()), Ok(1..4));
/// ```
pub fn find_server_head_range<N: HeadNode>(children: &[N]) -> Result<Range<usize>, HeadRemoval> {
	let mut start = None;
	for (index, node) in children.iter().enumerate() {
		let Some(text) = node.comment_text() else {
			continue;
		};
		match (start, text.trim()) {
			(None, HEAD_START_MARKER) => start = Some(index),
			(Some(first), HEAD_END_MARKER) => return Ok(first..index + 1),
			_ => {}
		}
	}
	Err(match start {
		Some(_) => HeadRemoval::NoEndMarker,
		None => HeadRemoval::NoStartMarker,
	})
}

/// Removes the server head range from `head`.
///
/// Nodes are removed only after the scan finished. Without a matching end
/// marker nothing is touched.
pub fn remove_server_head<T: HeadTree + ?Sized>(head: &mut T) -> HeadRemoval {
	let mut children = head.children();
	match find_server_head_range(&children) {
		Ok(range) => {
			let doomed: Vec<_> = children.drain(range).collect();
			for node in &doomed {
				head.remove_child(node);
			}
			debug_log!("removed {} server head nodes", doomed.len());
			HeadRemoval::Removed(doomed.len())
		}
		Err(HeadRemoval::NoEndMarker) => {
			warn_log!(
				"found <!--{}--> without <!--{}-->; leaving the server head in place",
				HEAD_START_MARKER,
				HEAD_END_MARKER
			);
			HeadRemoval::NoEndMarker
		}
		Err(other) => {
			debug_log!("no server head range to remove");
			other
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hydration::dom::{VirtualHead, VirtualNode};
	use rstest::rstest;

	fn element(tag: &str) -> VirtualNode {
		VirtualNode::element(format!("<{tag}></{tag}>"))
	}

	#[rstest]
	fn test_removes_exactly_the_marked_range() {
		// Arrange
		let mut head = VirtualHead::from_nodes(vec![
			element("a"),
			VirtualNode::comment("start head"),
			element("b"),
			element("c"),
			VirtualNode::comment("end head"),
			element("d"),
		]);

		// Act
		let removal = remove_server_head(&mut head);

		// Assert
		assert_eq!(removal, HeadRemoval::Removed(4));
		let remaining: Vec<_> = head.nodes().cloned().collect();
		assert_eq!(remaining, vec![element("a"), element("d")]);
	}

	#[rstest]
	fn test_missing_end_marker_leaves_head_unchanged() {
		// Arrange
		let mut head = VirtualHead::from_nodes(vec![
			element("a"),
			VirtualNode::comment("start head"),
			element("b"),
		]);

		// Act
		let removal = remove_server_head(&mut head);

		// Assert
		assert_eq!(removal, HeadRemoval::NoEndMarker);
		assert_eq!(head.len(), 3);
	}

	#[rstest]
	fn test_end_marker_before_start_is_ignored() {
		// Arrange
		let mut head = VirtualHead::from_nodes(vec![
			VirtualNode::comment("end head"),
			element("a"),
		]);

		// Act
		let removal = remove_server_head(&mut head);

		// Assert
		assert_eq!(removal, HeadRemoval::NoStartMarker);
		assert_eq!(head.len(), 2);
	}

	#[rstest]
	fn test_other_comments_inside_range_are_removed() {
		// Arrange
		let mut head = VirtualHead::from_nodes(vec![
			VirtualNode::comment("start head"),
			VirtualNode::comment("unrelated"),
			VirtualNode::comment("end head"),
			VirtualNode::comment("end head"),
		]);

		// Act
		let removal = remove_server_head(&mut head);

		// Assert
		assert_eq!(removal, HeadRemoval::Removed(3));
		assert_eq!(
			head.nodes().cloned().collect::<Vec<_>>(),
			vec![VirtualNode::comment("end head")]
		);
	}

	#[rstest]
	fn test_second_removal_is_noop() {
		// Arrange
		let mut head = VirtualHead::parse("<!--start head--><title>x</title><!--end head--><title>y</title>");
		remove_server_head(&mut head);

		// Act
		let removal = remove_server_head(&mut head);

		// Assert
		assert_eq!(removal, HeadRemoval::NoStartMarker);
		assert_eq!(head.len(), 1);
	}
}
