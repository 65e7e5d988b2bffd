//! Outbound HTTP plumbing.
//!
//! The components never talk to `reqwest` directly; they go through the
//! [`HttpTransport`] trait so a single transport (with its TLS and timeout
//! settings) can be shared, and tests can substitute scripted responses.

pub mod transport;

pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError,
};
