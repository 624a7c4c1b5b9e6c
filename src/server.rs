//! HTTP/1 server with streamed response bodies.

pub use headway_server::*;
