//! Client entry: scheduling hydration and cleaning up after it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::cell::RefCell;

use super::dom::HeadMarkup;
use crate::{debug_log, info_log};

/// Delay used when the runtime has no idle callback.
pub const FALLBACK_DELAY_MS: i32 = 1;

/// Schedules work on the client event loop.
pub trait IdleScheduler {
	/// Returns `true` if idle callbacks are available.
	fn supports_idle_callback(&self) -> bool;

	/// Runs `task` when the event loop is idle.
	fn request_idle_callback(&self, task: Box<dyn FnOnce()>);

	/// Runs `task` after `delay_ms` milliseconds.
	fn set_timeout(&self, task: Box<dyn FnOnce()>, delay_ms: i32);
}

/// How hydration was scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePath {
	IdleCallback,
	Timeout,
}

/// Schedules `task` for the first idle window, or the next tick if the
/// runtime has no idle callbacks.
pub fn schedule_hydration<S>(scheduler: &S, task: impl FnOnce() + 'static) -> SchedulePath
where
	S: IdleScheduler + ?Sized,
{
	if scheduler.supports_idle_callback() {
		scheduler.request_idle_callback(Box::new(task));
		SchedulePath::IdleCallback
	} else {
		scheduler.set_timeout(Box::new(task), FALLBACK_DELAY_MS);
		SchedulePath::Timeout
	}
}

/// Runs every task immediately. Used outside the browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl IdleScheduler for ImmediateScheduler {
	fn supports_idle_callback(&self) -> bool {
		true
	}

	fn request_idle_callback(&self, task: Box<dyn FnOnce()>) {
		task();
	}

	fn set_timeout(&self, task: Box<dyn FnOnce()>, _delay_ms: i32) {
		task();
	}
}

/// Errors raised while attaching to server markup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HydrationError {
	#[error("root element #{0} not found")]
	RootNotFound(String),
	#[error("hydration failed: {0}")]
	Attach(String),
}

/// The client runtime that takes over the server-rendered body.
pub trait HydrationRuntime {
	/// Attaches behaviour to the markup already inside `#root_id`.
	fn attach_to_existing_dom(&mut self, root_id: &str) -> Result<(), HydrationError>;
}

static SERVER_HEAD_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"(?s)<!--start head-->.*?<!--end head-->")
		.expect("Invalid server head regex pattern")
});

/// Removes the first sentinel-delimited fragment from head markup.
///
/// Markup without a complete fragment is returned unchanged (borrowed).
///
/// # Examples
///
/// ```
/// use headway_pages::hydration::strip_server_head_markup;
///
/// let stripped = strip_server_head_markup("<meta charset=\"utf-8\"><!--start head--><title>x</title><!--end head-->");
/// assert_eq!(stripped, "<meta charset=\"utf-8\">");
/// assert_eq!(strip_server_head_markup("<title>x</title>"), "<title>x</title>");
/// ```
pub fn strip_server_head_markup(markup: &str) -> Cow<'_, str> {
	SERVER_HEAD_FRAGMENT.replace(markup, "")
}

/// Hydrates the body, then strips the stale server head fragment.
///
/// The strip only covers documents without a mounted [`ClientHead`]: once a
/// client head has committed into the head, the sentinel range belongs to
/// it and is removed node by node on its second render after hydration.
///
/// [`ClientHead`]: super::ClientHead
pub fn hydrate_document<R, H>(
	runtime: &mut R,
	root_id: &str,
	head: &mut H,
) -> Result<(), HydrationError>
where
	R: HydrationRuntime + ?Sized,
	H: HeadMarkup + ?Sized,
{
	init_hydration_state();
	runtime.attach_to_existing_dom(root_id)?;
	mark_hydration_complete();

	if is_server_head_claimed() {
		debug_log!("client head owns the server head range; skipping markup strip");
		return Ok(());
	}
	let current = head.inner_html();
	if let Cow::Owned(stripped) = strip_server_head_markup(&current) {
		head.set_inner_html(&stripped);
		debug_log!("stripped server head fragment after hydration");
	}
	Ok(())
}

type HydrationListener = Box<dyn FnOnce() + 'static>;

thread_local! {
	static HYDRATION_COMPLETE: RefCell<bool> = const { RefCell::new(false) };
	static HYDRATION_LISTENERS: RefCell<Vec<HydrationListener>> = const { RefCell::new(Vec::new()) };
	static SERVER_HEAD_CLAIMED: RefCell<bool> = const { RefCell::new(false) };
}

/// Records that a client head committed into the document head.
pub(crate) fn claim_server_head() {
	SERVER_HEAD_CLAIMED.with(|claimed| *claimed.borrow_mut() = true);
}

/// Returns `true` once a client head has taken over the server head range.
pub fn is_server_head_claimed() -> bool {
	SERVER_HEAD_CLAIMED.with(|claimed| *claimed.borrow())
}

/// Resets the hydration flag before a new hydration starts.
pub fn init_hydration_state() {
	HYDRATION_COMPLETE.with(|state| *state.borrow_mut() = false);
}

/// Returns `true` once hydration completed on this thread.
pub fn is_hydration_complete() -> bool {
	HYDRATION_COMPLETE.with(|state| *state.borrow())
}

/// Runs `callback` once hydration completes, or right away if it already has.
pub fn on_hydration_complete<F>(callback: F)
where
	F: FnOnce() + 'static,
{
	if is_hydration_complete() {
		callback();
		return;
	}
	HYDRATION_LISTENERS.with(|listeners| listeners.borrow_mut().push(Box::new(callback)));
}

/// Marks hydration complete and notifies every listener once.
pub fn mark_hydration_complete() {
	HYDRATION_COMPLETE.with(|state| *state.borrow_mut() = true);
	let listeners = HYDRATION_LISTENERS.with(|listeners| std::mem::take(&mut *listeners.borrow_mut()));
	info_log!("hydration complete; notifying {} listeners", listeners.len());
	for listener in listeners {
		listener();
	}
}

#[cfg(target_arch = "wasm32")]
mod web {
	use super::IdleScheduler;
	use wasm_bindgen::JsCast;
	use wasm_bindgen::closure::Closure;

	/// Schedules through the browser window.
	#[derive(Debug, Clone, Copy, Default)]
	pub struct WindowScheduler;

	impl IdleScheduler for WindowScheduler {
		fn supports_idle_callback(&self) -> bool {
			web_sys::window().is_some_and(|window| {
				js_sys::Reflect::has(&window, &"requestIdleCallback".into()).unwrap_or(false)
			})
		}

		fn request_idle_callback(&self, task: Box<dyn FnOnce()>) {
			let Some(window) = web_sys::window() else {
				return;
			};
			let callback = Closure::once_into_js(task);
			if window
				.request_idle_callback(callback.unchecked_ref())
				.is_err()
			{
				crate::error_log!("requestIdleCallback failed; hydration not scheduled");
			}
		}

		fn set_timeout(&self, task: Box<dyn FnOnce()>, delay_ms: i32) {
			let Some(window) = web_sys::window() else {
				return;
			};
			let callback = Closure::once_into_js(task);
			if window
				.set_timeout_with_callback_and_timeout_and_arguments_0(
					callback.unchecked_ref(),
					delay_ms,
				)
				.is_err()
			{
				crate::error_log!("setTimeout failed; hydration not scheduled");
			}
		}
	}
}

#[cfg(target_arch = "wasm32")]
pub use web::WindowScheduler;
