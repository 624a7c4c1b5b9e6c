//! Document render settings.

use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::markers::DEFAULT_ROOT_ID;
use crate::error::RenderError;

/// Default deadline for a whole render, in milliseconds.
pub const DEFAULT_ABORT_DELAY_MS: u64 = 5000;

/// Default stylesheet linked when the head render is empty.
pub const DEFAULT_GLOBAL_STYLESHEET: &str = "/styles/global.css";

/// Options for [`DocumentRenderer`](super::DocumentRenderer).
///
/// Can be built in code or loaded from the `[ssr]` table of a TOML file.
///
/// # Examples
///
/// ```
/// use headway_pages::ssr::SsrOptions;
/// use std::time::Duration;
///
/// let options = SsrOptions::new()
///     .abort_delay(Duration::from_secs(2))
///     .global_stylesheet("/css/app.css");
///
/// assert_eq!(options.abort_delay_duration(), Duration::from_secs(2));
/// assert_eq!(options.global_stylesheet, "/css/app.css");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsrOptions {
	/// Deadline for the whole render, in milliseconds.
	pub abort_delay_ms: u64,
	/// Status used when rendering hits an error.
	pub error_status: u16,
	/// Stylesheet linked when the head render is empty.
	pub global_stylesheet: String,
	/// Id of the element the body is rendered into.
	pub root_id: String,
}

impl Default for SsrOptions {
	fn default() -> Self {
		Self {
			abort_delay_ms: DEFAULT_ABORT_DELAY_MS,
			error_status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
			global_stylesheet: DEFAULT_GLOBAL_STYLESHEET.to_string(),
			root_id: DEFAULT_ROOT_ID.to_string(),
		}
	}
}

#[derive(Deserialize)]
struct SettingsFile {
	#[serde(default)]
	ssr: SsrOptions,
}

impl SsrOptions {
	/// Creates options with default values.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the render deadline.
	pub fn abort_delay(mut self, delay: Duration) -> Self {
		self.abort_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
		self
	}

	/// Sets the status used when rendering hits an error.
	pub fn error_status(mut self, status: StatusCode) -> Self {
		self.error_status = status.as_u16();
		self
	}

	/// Sets the fallback stylesheet.
	pub fn global_stylesheet(mut self, href: impl Into<String>) -> Self {
		self.global_stylesheet = href.into();
		self
	}

	/// Sets the body root element id.
	pub fn root_id(mut self, id: impl Into<String>) -> Self {
		self.root_id = id.into();
		self
	}

	/// Returns the render deadline.
	pub fn abort_delay_duration(&self) -> Duration {
		Duration::from_millis(self.abort_delay_ms)
	}

	/// Returns the error status as a [`StatusCode`].
	pub fn error_status_code(&self) -> StatusCode {
		StatusCode::from_u16(self.error_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Checks that the options describe a usable configuration.
	pub fn validate(&self) -> Result<(), RenderError> {
		let status = StatusCode::from_u16(self.error_status)
			.map_err(|_| RenderError::Settings(format!("invalid error_status {}", self.error_status)))?;
		if !(status.is_client_error() || status.is_server_error()) {
			return Err(RenderError::Settings(format!(
				"error_status must be a 4xx or 5xx status, got {status}"
			)));
		}
		if self.root_id.trim().is_empty() {
			return Err(RenderError::Settings("root_id must not be empty".to_string()));
		}
		Ok(())
	}

	/// Loads options from the `[ssr]` table of a TOML document.
	///
	/// Missing keys (or a missing table) keep their defaults.
	///
	/// # Examples
	///
	/// ```
	/// use headway_pages::ssr::SsrOptions;
	///
	/// let options = SsrOptions::from_toml_str("[ssr]\nabort_delay_ms = 250\n").unwrap();
	/// assert_eq!(options.abort_delay_ms, 250);
	/// assert_eq!(options.error_status, 500);
	/// ```
	pub fn from_toml_str(source: &str) -> Result<Self, RenderError> {
		let file: SettingsFile =
			toml::from_str(source).map_err(|e| RenderError::Settings(e.to_string()))?;
		file.ssr.validate()?;
		Ok(file.ssr)
	}
}
