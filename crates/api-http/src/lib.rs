//! HTTP API Layer
//!
//! Exposes PDF-to-HTML conversion over HTTP (multipart upload in, HTML or JSON out).

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::AppState;
pub use server::{router, HttpServer, HttpServerConfig};
