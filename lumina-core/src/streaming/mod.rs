//! Byte-range streaming of stored media.
//!
//! `range` parses `Range` headers; `responder` ties catalog lookup, file
//! access and range validation together into a single request/response step.

pub mod range;
pub mod responder;

pub use range::{ByteRange, RangeError, parse_range_header};
pub use responder::{RangeStreamResponder, StreamError, StreamResult};
