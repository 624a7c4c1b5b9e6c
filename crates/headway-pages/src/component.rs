//! Page tree and head component.
//!
//! Route components (see [`crate::context::RouteComponent`]) return a
//! [`Page`]; the head pass renders a [`HeadComponent`] in place of the
//! application root.

mod head;
mod page;

pub use head::{HeadComponent, LinkTag, MetaDescriptor, data_str};
pub use page::{
	BoundaryIds, DeferredPage, Page, PageElement, PendingBoundary, ShellRender, Suspense,
};

pub(crate) use page::{escape_attr, is_void_element};
