//! Streaming a rendered document body.
//!
//! One spawned task per response writes the document into an unbounded
//! channel whose receiver is the response body:
//!
//! 1. the preamble with the head fragment,
//! 2. the shell,
//! 3. each deferred subtree as it resolves, in completion order,
//! 4. the closing tags.
//!
//! Readiness is signalled once, according to the [`ReadyStrategy`]. The
//! deadline and the caller's [`AbortHandle`] cut off whatever is still
//! pending; the document is closed either way.

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use headway_http::{BoxError, StreamBody};
use hyper::StatusCode;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, sleep_until};
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::markers;
use super::policy::ReadyStrategy;
use crate::component::{BoundaryIds, Page, PendingBoundary, ShellRender};
use crate::error::RenderError;

/// What happened to a streamed render once it finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamReport {
	/// Status the response deserved in the end.
	pub status: StatusCode,
	/// Every in-stream error, in the order it happened.
	pub errors: Vec<RenderError>,
	/// `true` if pending subtrees were cut off by the deadline, an explicit
	/// abort or a disconnected client.
	pub aborted: bool,
	/// `true` if the closing tags were written.
	pub completed: bool,
}

/// Cancels a streamed render.
///
/// Aborting is idempotent and a no-op once the render finished.
#[derive(Debug, Clone)]
pub struct AbortHandle {
	tx: Arc<watch::Sender<bool>>,
}

impl AbortHandle {
	fn new() -> (Self, watch::Receiver<bool>) {
		let (tx, rx) = watch::channel(false);
		(Self { tx: Arc::new(tx) }, rx)
	}

	/// Aborts every subtree still pending.
	pub fn abort(&self) {
		self.tx.send_replace(true);
	}

	/// Returns `true` once [`abort`](Self::abort) was called.
	pub fn is_aborted(&self) -> bool {
		*self.tx.borrow()
	}
}

/// Handle to a render that keeps streaming after the response was returned.
#[derive(Debug)]
pub struct RenderOutcome {
	abort: AbortHandle,
	report: oneshot::Receiver<StreamReport>,
}

impl RenderOutcome {
	/// Returns a handle that can abort the render.
	pub fn abort_handle(&self) -> AbortHandle {
		self.abort.clone()
	}

	/// Aborts every subtree still pending.
	pub fn abort(&self) {
		self.abort.abort();
	}

	/// Waits for the render to finish.
	///
	/// The body must be consumed (or dropped) for this to complete.
	pub async fn finished(self) -> Result<StreamReport, RenderError> {
		self.report.await.map_err(|_| RenderError::StreamClosed)
	}
}

/// Sent once when the response may start.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReadySignal {
	pub did_error: bool,
}

pub(crate) struct StreamConfig {
	pub strategy: ReadyStrategy,
	pub deadline: Instant,
	pub ok_status: StatusCode,
	pub error_status: StatusCode,
	pub preamble: String,
}

pub(crate) struct RenderStream {
	pub ready: oneshot::Receiver<ReadySignal>,
	pub body: StreamBody,
	pub outcome: RenderOutcome,
}

/// Spawns the driver for `shell`.
pub(crate) fn start(shell: ShellRender, ids: BoundaryIds, config: StreamConfig) -> RenderStream {
	let (ready_tx, ready_rx) = oneshot::channel();
	let (report_tx, report_rx) = oneshot::channel();
	let (body_tx, body_rx) = mpsc::unbounded_channel();
	let (abort, abort_rx) = AbortHandle::new();

	let ShellRender { markup, pending } = shell;
	let mut driver = Driver {
		pending: FuturesUnordered::new(),
		outstanding: BTreeSet::new(),
		ids,
		errors: Vec::new(),
		aborted: false,
		abort_rx,
		abort_open: true,
		deadline: config.deadline,
	};
	driver.enqueue(pending);

	tokio::spawn(async move {
		let report = driver.run(markup, config, ready_tx, body_tx).await;
		// Nobody may be waiting for the report.
		let _ = report_tx.send(report);
	});

	RenderStream {
		ready: ready_rx,
		body: Box::pin(UnboundedReceiverStream::new(body_rx)),
		outcome: RenderOutcome {
			abort,
			report: report_rx,
		},
	}
}

type Resolution = (usize, Option<Page>, Result<Page, RenderError>);

enum Step {
	Chunk(String),
	Skip,
	Done,
}

struct Driver {
	pending: FuturesUnordered<BoxFuture<'static, Resolution>>,
	outstanding: BTreeSet<usize>,
	ids: BoundaryIds,
	errors: Vec<RenderError>,
	aborted: bool,
	abort_rx: watch::Receiver<bool>,
	abort_open: bool,
	deadline: Instant,
}

impl Driver {
	async fn run(
		mut self,
		shell: String,
		config: StreamConfig,
		ready_tx: oneshot::Sender<ReadySignal>,
		body_tx: mpsc::UnboundedSender<Result<Bytes, BoxError>>,
	) -> StreamReport {
		let mut buffered = vec![config.preamble, shell];

		if config.strategy == ReadyStrategy::AllReady {
			loop {
				match self.next_step().await {
					Step::Chunk(chunk) => buffered.push(chunk),
					Step::Skip => {}
					Step::Done => break,
				}
			}
		}

		let signal = ReadySignal {
			did_error: !self.errors.is_empty(),
		};
		let mut connected = ready_tx.send(signal).is_ok();

		if connected {
			connected = buffered.into_iter().all(|chunk| send(&body_tx, chunk));
		}
		while connected {
			match self.next_step().await {
				Step::Chunk(chunk) => connected = send(&body_tx, chunk),
				Step::Skip => {}
				Step::Done => break,
			}
		}
		if connected {
			connected = send(&body_tx, markers::DOCUMENT_CLOSING.to_string());
		}

		if !connected {
			tracing::debug!(
				pending = self.outstanding.len(),
				"response body dropped; stopping render"
			);
			self.aborted |= !self.outstanding.is_empty();
		}

		let status = if self.errors.is_empty() {
			config.ok_status
		} else {
			config.error_status
		};
		StreamReport {
			status,
			errors: self.errors,
			aborted: self.aborted,
			completed: connected,
		}
	}

	fn enqueue(&mut self, boundaries: Vec<PendingBoundary>) {
		for PendingBoundary {
			id,
			error_fallback,
			deferred,
		} in boundaries
		{
			self.outstanding.insert(id);
			self.pending
				.push(Box::pin(async move { (id, error_fallback, deferred.await) }));
		}
	}

	async fn next_step(&mut self) -> Step {
		loop {
			if self.pending.is_empty() {
				return Step::Done;
			}
			if *self.abort_rx.borrow_and_update() {
				self.abort_outstanding("aborted by caller");
				return Step::Done;
			}

			tokio::select! {
				biased;

				changed = self.abort_rx.changed(), if self.abort_open => {
					// A closed channel means every handle was dropped: no abort can come.
					if changed.is_err() {
						self.abort_open = false;
					}
				}
				_ = sleep_until(self.deadline) => {
					self.abort_outstanding("deadline elapsed");
					return Step::Done;
				}
				Some((id, error_fallback, result)) = self.pending.next() => {
					return self.resolve(id, error_fallback, result);
				}
			}
		}
	}

	fn resolve(
		&mut self,
		id: usize,
		error_fallback: Option<Page>,
		result: Result<Page, RenderError>,
	) -> Step {
		self.outstanding.remove(&id);
		match result {
			Ok(page) => {
				let shell = page.render_shell(&mut self.ids);
				self.enqueue(shell.pending);
				Step::Chunk(markers::boundary_resolution(id, &shell.markup))
			}
			Err(e) => {
				let error = RenderError::Deferred {
					boundary: id,
					message: e.to_string(),
				};
				tracing::error!(boundary = id, error = %error, "deferred subtree failed");
				self.errors.push(error);
				match error_fallback {
					Some(fallback) => Step::Chunk(markers::boundary_resolution(
						id,
						&fallback.render_to_string(),
					)),
					None => Step::Skip,
				}
			}
		}
	}

	fn abort_outstanding(&mut self, reason: &'static str) {
		self.pending = FuturesUnordered::new();
		for id in std::mem::take(&mut self.outstanding) {
			tracing::error!(boundary = id, reason, "aborting deferred subtree");
			self.errors.push(RenderError::Aborted { boundary: id });
			self.aborted = true;
		}
	}
}

fn send(body_tx: &mpsc::UnboundedSender<Result<Bytes, BoxError>>, chunk: String) -> bool {
	body_tx.send(Ok(Bytes::from(chunk))).is_ok()
}
