//! Client-side takeover of server-rendered documents.
//!
//! The client goes through these steps in order:
//!
//! 1. [`schedule_hydration`] waits for an idle window (or the next tick),
//! 2. [`hydrate_document`] attaches to the body and, when no client head
//!    has claimed the sentinel range, strips the stale fragment from the
//!    head markup,
//! 3. [`ClientHead`] renders the head into `document.head` and, two renders
//!    after hydration, removes the range between the sentinel comments.
//!
//! DOM access goes through the [`HeadTree`], [`PortalTarget`] and
//! [`HeadMarkup`] traits. `DocumentHead` implements them on `wasm32`;
//! [`VirtualHead`] implements them everywhere.

mod bootstrap;
mod dom;
mod handoff;
mod head;

pub use bootstrap::{
	FALLBACK_DELAY_MS, HydrationError, HydrationRuntime, IdleScheduler, ImmediateScheduler,
	SchedulePath, hydrate_document, init_hydration_state, is_hydration_complete,
	is_server_head_claimed, mark_hydration_complete, on_hydration_complete, schedule_hydration,
	strip_server_head_markup,
};
pub use dom::{
	HeadMarkup, HeadNode, HeadTree, PortalTarget, VirtualHandle, VirtualHead, VirtualNode,
};
pub use handoff::{HeadRemoval, find_server_head_range, remove_server_head};
pub use head::{ClientHead, HeadPhase, HeadTick, MountedHead, mount_client_head};

#[cfg(target_arch = "wasm32")]
pub use bootstrap::WindowScheduler;
#[cfg(target_arch = "wasm32")]
pub use dom::DocumentHead;
