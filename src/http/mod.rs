//! HTTP on top of the thread-per-connection server.
//!
//! # Architecture
//!
//! - **`parser`**: Splits a raw PDU and parses its request line
//! - **`request`**: Method table and the parsed request
//! - **`mime`**: Content type by file extension
//! - **`response`**: Response header and error page templates
//! - **`fsa`**: The per-request state machine
//! - **`server`**: The worker handler that ties the above to a socket
//!
//! One request is answered per read: the worker reads whatever the socket
//! holds into its buffer, the state machine turns it into a response in the
//! same buffer, and the worker writes it back.
//!
//! # Example
//!
//! ```no_run
//! use simple_http_server::config::Config;
//! use simple_http_server::http;
//!
//! let cfg = Config { root: "/var/www".into(), ..Config::default() };
//! let server = http::server::bind(&cfg).expect("bind");
//! let reaper = server.spawn_reaper().expect("reaper");
//! server.run();
//! reaper.join().ok();
//! ```

pub mod fsa;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod server;
