//! Lumina Web - JSON API and media streaming server
//!
//! Serves the video catalog as JSON and streams video and thumbnail files
//! with HTTP byte-range support.

#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]

pub mod error;
pub mod handlers;
pub mod server;

// Re-export main types
pub use error::ApiError;
pub use server::{AppState, build_router, run_server};
