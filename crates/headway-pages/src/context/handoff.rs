//! Serialized server state handed to the client.
//!
//! The blob is JSON shaped as `{"url": ..., "state": {...}}` where `state`
//! is the [`StaticHandlerContext`] of the request. It is embedded in the
//! body by [`scripts`] and read back by the client runtime.

use serde_json::{Value, json};

use super::{RenderContext, StaticHandlerContext};
use crate::component::Page;
use crate::error::RenderError;

/// Global the handoff blob is assigned to in the browser.
pub const HANDOFF_GLOBAL: &str = "__headwayContext";

/// Serializes request state into a handoff blob.
pub fn serialize_state(url: &str, state: &StaticHandlerContext) -> Result<String, RenderError> {
	let value = json!({ "url": url, "state": state });
	serde_json::to_string(&value)
		.map_err(|e| RenderError::Shell(format!("failed to serialize handoff: {e}")))
}

/// Removes `state.errors` from a handoff blob.
///
/// Every other field is preserved. Fails only if `handoff` is not JSON.
///
/// # Examples
///
/// ```
/// use headway_pages::context::handoff::strip_errors;
///
/// let stripped = strip_errors(r#"{"state":{"errors":{"root":"x"},"loaderData":{}}}"#).unwrap();
/// assert_eq!(stripped, r#"{"state":{"loaderData":{}}}"#);
/// ```
pub fn strip_errors(handoff: &str) -> Result<String, serde_json::Error> {
	let mut value: Value = serde_json::from_str(handoff)?;
	if let Some(state) = value.get_mut("state").and_then(Value::as_object_mut) {
		state.remove("errors");
	}
	serde_json::to_string(&value)
}

/// Makes JSON safe to embed inside a `<script>` element.
pub fn escape_json_for_script(json: &str) -> String {
	json.replace("</", "<\\/").replace("<!--", "<\\!--")
}

/// Renders the script that exposes the handoff blob to the client.
///
/// Renders nothing when the context carries no blob.
pub fn scripts(context: &RenderContext) -> Page {
	match &context.server_handoff {
		Some(handoff) => Page::raw_html(format!(
			"<script>window.{HANDOFF_GLOBAL} = {};</script>",
			escape_json_for_script(handoff)
		)),
		None => Page::Empty,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_strip_errors_keeps_other_fields() {
		// Arrange
		let handoff = json!({
			"url": "/boom",
			"state": {
				"statusCode": 500,
				"loaderData": { "root": { "user": "a" } },
				"errors": { "routes/boom": { "message": "kaput" } }
			}
		})
		.to_string();

		// Act
		let stripped: Value = serde_json::from_str(&strip_errors(&handoff).unwrap()).unwrap();

		// Assert
		assert_eq!(
			stripped,
			json!({
				"url": "/boom",
				"state": { "statusCode": 500, "loaderData": { "root": { "user": "a" } } }
			})
		);
	}

	#[rstest]
	fn test_strip_errors_without_state() {
		assert_eq!(strip_errors(r#"{"url":"/"}"#).unwrap(), r#"{"url":"/"}"#);
	}

	#[rstest]
	fn test_strip_errors_rejects_invalid_json() {
		assert!(strip_errors("{not json").is_err());
	}

	#[rstest]
	fn test_scripts_escapes_closing_tags() {
		// Arrange
		let mut context = RenderContext::new("/");
		context.server_handoff = Some(r#"{"x":"</script><script>alert(1)"}"#.to_string());

		// Act
		let markup = scripts(&context).render_to_string();

		// Assert
		assert_eq!(
			markup,
			r#"<script>window.__headwayContext = {"x":"<\/script><script>alert(1)"};</script>"#
		);
	}

	#[rstest]
	fn test_scripts_empty_without_handoff() {
		assert!(scripts(&RenderContext::new("/")).is_empty());
	}

	#[rstest]
	fn test_serialize_state_round_trips_url() {
		// Act
		let blob = serialize_state("/test", &StaticHandlerContext::default()).unwrap();

		// Assert
		let value: Value = serde_json::from_str(&blob).unwrap();
		assert_eq!(value["url"], "/test");
		assert_eq!(value["state"]["statusCode"], 200);
	}
}
