//! End-to-end tests for Lumina
//!
//! Boot the real HTTP server on an ephemeral port and drive it with an HTTP
//! client, checking status codes, headers and bodies as a player would see them.

mod streaming_workflow;
