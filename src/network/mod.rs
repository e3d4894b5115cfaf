//! HTTP networking module
//!
//! Provides the HTTP client used to query the remote search backends.

mod client;

pub use client::HttpClient;
