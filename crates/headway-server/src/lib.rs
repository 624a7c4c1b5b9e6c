//! # Headway Server
//!
//! HTTP/1 server that drives a [`headway_http::Handler`] and forwards
//! [`headway_http::StreamingResponse`] bodies to the socket one chunk at a
//! time, so a document head can reach the browser before its body is done.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use headway_http::{BoxError, Handler, Request, Response, StreamingResponse};
//! use headway_server::HttpServer;
//!
//! struct Hello;
//!
//! #[async_trait::async_trait]
//! impl Handler for Hello {
//!     async fn handle(&self, _request: Request) -> Result<StreamingResponse, BoxError> {
//!         Ok(Response::ok().with_body("hello").into_streaming())
//!     }
//! }
//!
//! # async fn run() -> Result<(), BoxError> {
//! HttpServer::new(Arc::new(Hello)).listen("127.0.0.1:3000".parse()?).await
//! # }
//! ```

pub mod http;

pub use http::{HttpServer, ServerBody, into_hyper_response, serve};
