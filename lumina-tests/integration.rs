//! Integration tests for Lumina
//!
//! Exercise the catalog, local file store and range responder together over
//! real files on disk.

#[path = "integration/library_lifecycle.rs"]
mod library_lifecycle;
#[path = "integration/range_validation.rs"]
mod range_validation;
