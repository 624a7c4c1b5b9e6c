//! Streaming server integration tests
//!
//! Runs `HttpServer` on an ephemeral port and talks to it with a hyper
//! HTTP/1 client.
//!
//! Success Criteria:
//! 1. A chunk is on the wire before the next chunk has been produced
//! 2. Status and headers set by the handler reach the client
//! 3. A failing handler is answered with a bare 500
//! 4. The server stops accepting when the shutdown future resolves

use bytes::Bytes;
use futures::StreamExt;
use headway_http::{BoxError, Handler, Request, Response, StreamingResponse};
use headway_server::HttpServer;
use http_body_util::{BodyExt, Empty};
use hyper::StatusCode;
use hyper::body::Incoming;
use hyper_util::rt::TokioIo;
use rstest::*;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// Sends `<head>` at once and `<body>` only after the gate opens.
struct GatedHandler {
	gate: Mutex<Option<oneshot::Receiver<()>>>,
}

#[async_trait::async_trait]
impl Handler for GatedHandler {
	async fn handle(&self, _request: Request) -> Result<StreamingResponse, BoxError> {
		let gate = self.gate.lock().unwrap().take().ok_or("gate already used")?;
		let head = futures::stream::once(async { Ok::<_, BoxError>(Bytes::from_static(b"<head>")) });
		let body = futures::stream::once(async move {
			gate.await.map_err(|e| Box::new(e) as BoxError)?;
			Ok::<_, BoxError>(Bytes::from_static(b"<body>"))
		});
		Ok(StreamingResponse::new(Box::pin(head.chain(body)))
			.status(StatusCode::CREATED)
			.media_type("text/html; charset=utf-8"))
	}
}

struct FailingHandler;

#[async_trait::async_trait]
impl Handler for FailingHandler {
	async fn handle(&self, _request: Request) -> Result<StreamingResponse, BoxError> {
		Err("shell failed".into())
	}
}

struct EchoPathHandler;

#[async_trait::async_trait]
impl Handler for EchoPathHandler {
	async fn handle(&self, request: Request) -> Result<StreamingResponse, BoxError> {
		Ok(Response::ok().with_body(request.path().to_string()).into_streaming())
	}
}

async fn spawn_server(
	handler: Arc<dyn Handler>,
) -> (SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let (stop_tx, stop_rx) = oneshot::channel::<()>();
	let task = tokio::spawn(async move {
		HttpServer::new(handler)
			.serve_with_shutdown(listener, async {
				let _ = stop_rx.await;
			})
			.await
			.unwrap();
	});
	(addr, stop_tx, task)
}

async fn get(addr: SocketAddr, path: &str) -> hyper::Response<Incoming> {
	let stream = TcpStream::connect(addr).await.unwrap();
	let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
		.await
		.unwrap();
	tokio::spawn(conn);
	let request = hyper::Request::builder()
		.uri(path)
		.header("host", addr.to_string())
		.body(Empty::<Bytes>::new())
		.unwrap();
	sender.send_request(request).await.unwrap()
}

// ============================================================================
// Streaming
// ============================================================================

#[rstest]
#[tokio::test]
async fn test_first_chunk_arrives_before_second_is_produced() {
	// Arrange
	let (gate_tx, gate_rx) = oneshot::channel();
	let handler = Arc::new(GatedHandler {
		gate: Mutex::new(Some(gate_rx)),
	});
	let (addr, _stop, _task) = spawn_server(handler).await;

	// Act
	let response = get(addr, "/defer").await;
	let status = response.status();
	let content_type = response.headers().get("content-type").cloned();
	let mut body = response.into_body();
	let first = body.frame().await.unwrap().unwrap().into_data().unwrap();
	gate_tx.send(()).unwrap();
	let rest = body.collect().await.unwrap().to_bytes();

	// Assert
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(content_type.unwrap(), "text/html; charset=utf-8");
	assert_eq!(&first[..], b"<head>");
	assert_eq!(&rest[..], b"<body>");
}

#[rstest]
#[tokio::test]
async fn test_request_path_reaches_handler() {
	// Arrange
	let (addr, _stop, _task) = spawn_server(Arc::new(EchoPathHandler)).await;

	// Act
	let response = get(addr, "/test?x=1").await;
	let body = response.into_body().collect().await.unwrap().to_bytes();

	// Assert
	assert_eq!(&body[..], b"/test");
}

// ============================================================================
// Failures and shutdown
// ============================================================================

#[rstest]
#[tokio::test]
async fn test_failing_handler_answers_500() {
	// Arrange
	let (addr, _stop, _task) = spawn_server(Arc::new(FailingHandler)).await;

	// Act
	let response = get(addr, "/").await;
	let status = response.status();
	let body = response.into_body().collect().await.unwrap().to_bytes();

	// Assert
	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(body.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_shutdown_stops_accept_loop() {
	// Arrange
	let (_addr, stop, task) = spawn_server(Arc::new(EchoPathHandler)).await;

	// Act
	stop.send(()).unwrap();
	let finished = tokio::time::timeout(std::time::Duration::from_secs(5), task).await;

	// Assert
	assert!(finished.is_ok());
}
