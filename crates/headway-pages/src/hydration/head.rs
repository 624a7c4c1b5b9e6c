//! Client-side head component.
//!
//! After the body hydrates, the client renders [`HeadComponent`] into
//! `document.head` itself and then removes the server copy. The removal
//! waits one extra render so the client head is committed before the
//! server head disappears; otherwise the page would briefly have no head.

use std::cell::RefCell;
use std::rc::Rc;

use super::bootstrap::{IdleScheduler, claim_server_head, on_hydration_complete};
use super::dom::{HeadTree, PortalTarget};
use super::handoff::{HeadRemoval, remove_server_head};
use crate::component::HeadComponent;
use crate::context::RenderContext;
use crate::debug_log;

/// Where the client head is in its takeover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadPhase {
	/// Hydration has not completed. The server head is authoritative.
	Unhydrated,
	/// Hydrated; the server head is removed on a later render.
	PendingRemount,
	/// The server head was removed. Terminal.
	Steady,
}

/// What a single render of [`ClientHead`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadTick {
	/// Committed the head; hydration has not completed yet.
	Mounted,
	/// Committed the head and needs one more render before removal.
	RemountRequested,
	/// Committed the head and removed the server head range.
	ServerHeadRemoved(HeadRemoval),
	/// Committed the head; nothing else left to do.
	Settled,
}

impl HeadTick {
	/// Returns `true` if the caller must schedule another render.
	pub fn needs_rerender(self) -> bool {
		matches!(self, Self::RemountRequested)
	}
}

/// The head component as rendered on the client.
///
/// # Examples
///
/// ```
/// use headway_pages::component::HeadComponent;
/// use headway_pages::context::RenderContext;
/// use headway_pages::hydration::{ClientHead, HeadMarkup, HeadPhase, HeadTick, VirtualHead};
///
/// let context = RenderContext::new("/");
/// let mut head = VirtualHead::parse("<!--start head--><title>server</title><!--end head-->");
/// let mut client = ClientHead::new(HeadComponent::with_title("client"));
///
/// client.render(&context, &mut head);
/// assert!(client.on_hydrated());
/// assert_eq!(client.render(&context, &mut head), HeadTick::RemountRequested);
/// client.render(&context, &mut head);
///
/// assert_eq!(client.phase(), HeadPhase::Steady);
/// assert_eq!(head.inner_html(), "<title>client</title>");
/// ```
#[derive(Debug, Clone)]
pub struct ClientHead {
	component: HeadComponent,
	hydrated: bool,
	rendered_once: bool,
	removed: bool,
}

impl ClientHead {
	/// Creates the client head. Nothing is hydrated yet.
	pub fn new(component: HeadComponent) -> Self {
		Self {
			component,
			hydrated: false,
			rendered_once: false,
			removed: false,
		}
	}

	/// Returns the current phase.
	pub fn phase(&self) -> HeadPhase {
		match (self.hydrated, self.removed) {
			(false, _) => HeadPhase::Unhydrated,
			(true, false) => HeadPhase::PendingRemount,
			(true, true) => HeadPhase::Steady,
		}
	}

	/// Records that hydration completed.
	///
	/// Returns `true` the first time, when the caller must schedule a
	/// render. Later calls change nothing.
	pub fn on_hydrated(&mut self) -> bool {
		if self.hydrated {
			return false;
		}
		self.hydrated = true;
		true
	}

	/// Renders the head into `target` and advances the takeover.
	pub fn render<T>(&mut self, context: &RenderContext, target: &mut T) -> HeadTick
	where
		T: HeadTree + PortalTarget + ?Sized,
	{
		let markup = self.component.render_head(context).render_to_string();
		target.commit(&markup);
		claim_server_head();

		if !self.hydrated {
			return HeadTick::Mounted;
		}
		if !self.rendered_once {
			self.rendered_once = true;
			debug_log!("client head committed; removing server head on next render");
			return HeadTick::RemountRequested;
		}
		if self.removed {
			return HeadTick::Settled;
		}
		self.removed = true;
		HeadTick::ServerHeadRemoved(remove_server_head(target))
	}
}

/// A [`ClientHead`] bound to its context and target.
#[derive(Debug)]
pub struct MountedHead<T> {
	client: ClientHead,
	context: RenderContext,
	target: T,
}

impl<T: HeadTree + PortalTarget> MountedHead<T> {
	/// Renders once more.
	pub fn render(&mut self) -> HeadTick {
		self.client.render(&self.context, &mut self.target)
	}

	/// Returns the takeover phase.
	pub fn phase(&self) -> HeadPhase {
		self.client.phase()
	}

	/// Returns the target the head renders into.
	pub fn target(&self) -> &T {
		&self.target
	}
}

/// Mounts the client head and drives the takeover from hydration.
///
/// Renders immediately, then once more when hydration completes. The
/// render that removes the server head is scheduled through `scheduler`
/// as a separate task.
pub fn mount_client_head<T, S>(
	client: ClientHead,
	context: RenderContext,
	target: T,
	scheduler: Rc<S>,
) -> Rc<RefCell<MountedHead<T>>>
where
	T: HeadTree + PortalTarget + 'static,
	S: IdleScheduler + ?Sized + 'static,
{
	let mounted = Rc::new(RefCell::new(MountedHead {
		client,
		context,
		target,
	}));
	mounted.borrow_mut().render();

	let handle = Rc::clone(&mounted);
	on_hydration_complete(move || {
		let tick = {
			let mut head = handle.borrow_mut();
			head.client.on_hydrated();
			head.render()
		};
		if tick.needs_rerender() {
			let again = Rc::clone(&handle);
			scheduler.set_timeout(
				Box::new(move || {
					again.borrow_mut().render();
				}),
				0,
			);
		}
	});

	mounted
}
