use bytes::Bytes;
use futures::TryStreamExt;
use headway_http::{BoxError, Handler, Request, StreamingResponse};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Frame, Incoming};
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper::StatusCode;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Body type written to the connection.
pub type ServerBody = UnsyncBoxBody<Bytes, BoxError>;

/// HTTP/1 server for a single [`Handler`].
pub struct HttpServer {
	handler: Arc<dyn Handler>,
}

impl HttpServer {
	/// Creates a server for `handler`.
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self { handler }
	}

	/// Binds `addr` and serves until accepting fails.
	pub async fn listen(self, addr: SocketAddr) -> Result<(), BoxError> {
		let listener = TcpListener::bind(addr).await?;
		self.serve(listener).await
	}

	/// Serves connections from an already bound listener.
	pub async fn serve(self, listener: TcpListener) -> Result<(), BoxError> {
		self.serve_with_shutdown(listener, std::future::pending()).await
	}

	/// Serves connections until `shutdown` resolves.
	///
	/// Connections accepted before the signal keep running until their
	/// response is complete.
	pub async fn serve_with_shutdown<F>(
		self,
		listener: TcpListener,
		shutdown: F,
	) -> Result<(), BoxError>
	where
		F: Future<Output = ()>,
	{
		let addr = listener.local_addr()?;
		tracing::info!(%addr, "server listening on http://{addr}");
		tokio::pin!(shutdown);

		loop {
			tokio::select! {
				accepted = listener.accept() => {
					let (stream, remote_addr) = accepted?;
					let handler = Arc::clone(&self.handler);
					tokio::task::spawn(async move {
						if let Err(err) = Self::handle_connection(stream, remote_addr, handler).await {
							tracing::warn!(%remote_addr, error = %err, "error handling connection");
						}
					});
				}
				_ = &mut shutdown => {
					tracing::info!(%addr, "shutdown signal received, no longer accepting connections");
					break;
				}
			}
		}

		Ok(())
	}

	/// Serves HTTP/1 requests on a single connection.
	pub async fn handle_connection(
		stream: TcpStream,
		remote_addr: SocketAddr,
		handler: Arc<dyn Handler>,
	) -> Result<(), hyper::Error> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			handler,
			remote_addr,
		};
		http1::Builder::new().serve_connection(io, service).await
	}
}

struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<ServerBody>;
	type Error = BoxError;
	type Future =
		Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = Arc::clone(&self.handler);
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let (parts, body) = req.into_parts();
			let body = body.collect().await?.to_bytes();
			let request = Request::new(parts.method, parts.uri, parts.version, parts.headers, body);
			let path = request.path().to_string();

			match handler.handle(request).await {
				Ok(response) => {
					tracing::debug!(%remote_addr, %path, status = %response.status, "response started");
					Ok(into_hyper_response(response)?)
				}
				Err(err) => {
					tracing::error!(%remote_addr, %path, error = %err, "handler failed");
					Ok(internal_server_error())
				}
			}
		})
	}
}

/// Converts a [`StreamingResponse`] into a hyper response.
///
/// Each chunk of the body becomes one data frame; nothing is buffered.
pub fn into_hyper_response(
	response: StreamingResponse,
) -> Result<hyper::Response<ServerBody>, hyper::http::Error> {
	let StreamingResponse {
		status,
		headers,
		body,
	} = response;
	let body = http_body_util::StreamBody::new(body.map_ok(Frame::data)).boxed_unsync();

	let mut builder = hyper::Response::builder().status(status);
	if let Some(map) = builder.headers_mut() {
		map.extend(headers);
	}
	builder.body(body)
}

fn internal_server_error() -> hyper::Response<ServerBody> {
	let body = Full::new(Bytes::new())
		.map_err(|never| match never {})
		.boxed_unsync();
	let mut response = hyper::Response::new(body);
	*response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
	response
}

/// Binds `addr` and serves `handler` on it.
pub async fn serve(addr: SocketAddr, handler: Arc<dyn Handler>) -> Result<(), BoxError> {
	HttpServer::new(handler).listen(addr).await
}
