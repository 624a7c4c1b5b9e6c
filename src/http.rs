//! Request, response and handler types.

pub use headway_http::*;
