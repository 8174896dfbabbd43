//! Network Module
//!
//! Transport and client facade.
//!
//! ## Architecture
//! - `Stream`: TCP or Unix domain socket
//! - `Connection`: buffered reader/writer pair over one stream
//! - `Client`: one command/reply exchange per call, owns the connection
//! - `SharedClient`: mutex around a `Client` for use across threads

mod stream;
mod connection;
mod client;
mod shared;

pub use stream::Stream;
pub use connection::Connection;
pub use client::Client;
pub use shared::SharedClient;
