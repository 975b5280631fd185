//! HTTP front end for the `wordtok` tokenizer.
//!
//! Requests are routed by [`route`], which knows nothing about sockets, and served by
//! [`HttpServer`], which runs each request on its own thread against one shared
//! [`wordtok::Service`].
mod config;
mod routes;
mod server;

pub use config::*;
pub use routes::*;
pub use server::*;
