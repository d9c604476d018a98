//! simple-http-server - thread-per-connection static file server
//!
//! Core library: bounded buffers, streaming deflate, the TCP accept/worker/
//! reaper machinery and the HTTP request state machine.

pub mod buffer;
pub mod compress;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod server;
