//! HTTP byte-range parsing for media streaming
//!
//! Parses a single `Range: bytes=...` request against the size of the file
//! being served. Three forms are accepted:
//!
//! - `bytes=<start>-<end>` - both bounds inclusive
//! - `bytes=<start>-` - from `start` to the last byte
//! - `bytes=-<suffix>` - the last `suffix` bytes
//!
//! Only the first range of a multi-range request is honoured. Everything else,
//! including non-numeric bounds, is reported as unsatisfiable.

use tracing::debug;

const BYTES_UNIT: &str = "bytes=";

/// Inclusive byte window within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Creates a range covering `start..=end`.
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "byte range start {start} after end {end}");
        Self { start, end }
    }

    /// Number of bytes covered by the range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false; an inclusive range covers at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Value for the `Content-Range` response header.
    pub fn content_range(&self, total_size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total_size)
    }
}

/// Reasons a `Range` header cannot be served.
///
/// All variants are answered with 416 Range Not Satisfiable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("unsupported range unit in {header:?}")]
    UnsupportedUnit { header: String },

    #[error("malformed byte range {spec:?}")]
    Malformed { spec: String },

    #[error("suffix range of zero bytes or empty file (size {total_size})")]
    EmptySuffix { total_size: u64 },

    #[error("range {start}-{end} outside file of {total_size} bytes")]
    OutOfBounds { start: u64, end: u64, total_size: u64 },
}

/// Parse an HTTP `Range` header value against a file of `total_size` bytes.
///
/// # Errors
///
/// - `RangeError::UnsupportedUnit` - Header does not start with `bytes=`
/// - `RangeError::Malformed` - Bounds are missing or not decimal integers
/// - `RangeError::EmptySuffix` - `bytes=-0`, or a suffix range on an empty file
/// - `RangeError::OutOfBounds` - `start >= size`, `end >= size` or `start > end`
///
/// # Examples
/// ```
/// use lumina_core::streaming::{ByteRange, parse_range_header};
///
/// assert_eq!(parse_range_header("bytes=0-499", 1000), Ok(ByteRange::new(0, 499)));
/// assert_eq!(parse_range_header("bytes=500-", 1000), Ok(ByteRange::new(500, 999)));
/// assert!(parse_range_header("bytes=900-1200", 1000).is_err());
/// ```
pub fn parse_range_header(header: &str, total_size: u64) -> Result<ByteRange, RangeError> {
    let header = header.trim();
    let ranges = header
        .get(..BYTES_UNIT.len())
        .filter(|unit| unit.eq_ignore_ascii_case(BYTES_UNIT))
        .map(|_| &header[BYTES_UNIT.len()..])
        .ok_or_else(|| RangeError::UnsupportedUnit {
            header: header.to_string(),
        })?;

    let mut specs = ranges.split(',');
    let first = specs.next().unwrap_or_default().trim();
    if specs.next().is_some() {
        debug!("Multi-range request {:?}, serving first range only", header);
    }

    let malformed = || RangeError::Malformed {
        spec: first.to_string(),
    };
    let (start_part, end_part) = first.split_once('-').ok_or_else(malformed)?;
    let (start_part, end_part) = (start_part.trim(), end_part.trim());

    if start_part.is_empty() {
        let suffix = parse_bound(end_part).ok_or_else(malformed)?;
        if suffix == 0 || total_size == 0 {
            return Err(RangeError::EmptySuffix { total_size });
        }
        return Ok(ByteRange::new(
            total_size.saturating_sub(suffix),
            total_size - 1,
        ));
    }

    let start = parse_bound(start_part).ok_or_else(malformed)?;
    let end = if end_part.is_empty() {
        total_size.saturating_sub(1)
    } else {
        parse_bound(end_part).ok_or_else(malformed)?
    };

    if start >= total_size || end >= total_size || start > end {
        return Err(RangeError::OutOfBounds {
            start,
            end,
            total_size,
        });
    }

    Ok(ByteRange::new(start, end))
}

/// Strict decimal parse; rejects signs, whitespace inside digits and overflow.
fn parse_bound(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_parse_closed_range() {
        assert_eq!(
            parse_range_header("bytes=0-499", 1000),
            Ok(ByteRange::new(0, 499))
        );
        assert_eq!(ByteRange::new(0, 499).len(), 500);
    }

    #[test]
    fn test_parse_open_end() {
        let range = parse_range_header("bytes=500-", 1000).unwrap();
        assert_eq!(range, ByteRange::new(500, 999));
        assert_eq!(range.content_range(1000), "bytes 500-999/1000");
    }

    #[test]
    fn test_parse_single_last_byte() {
        assert_eq!(
            parse_range_header("bytes=999-999", 1000),
            Ok(ByteRange::new(999, 999))
        );
    }

    #[test]
    fn test_end_beyond_size_is_rejected() {
        assert_eq!(
            parse_range_header("bytes=900-1200", 1000),
            Err(RangeError::OutOfBounds {
                start: 900,
                end: 1200,
                total_size: 1000
            })
        );
    }

    #[test]
    fn test_start_at_size_is_rejected() {
        assert!(matches!(
            parse_range_header("bytes=1000-", 1000),
            Err(RangeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(matches!(
            parse_range_header("bytes=600-500", 1000),
            Err(RangeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(
            parse_range_header("bytes=-500", 1000),
            Ok(ByteRange::new(500, 999))
        );
        // Suffix longer than the file covers the whole file
        assert_eq!(
            parse_range_header("bytes=-5000", 1000),
            Ok(ByteRange::new(0, 999))
        );
        assert_eq!(
            parse_range_header("bytes=-0", 1000),
            Err(RangeError::EmptySuffix { total_size: 1000 })
        );
    }

    #[test]
    fn test_empty_file_is_never_satisfiable() {
        assert!(parse_range_header("bytes=0-", 0).is_err());
        assert!(parse_range_header("bytes=0-0", 0).is_err());
        assert!(parse_range_header("bytes=-10", 0).is_err());
    }

    #[test]
    fn test_non_numeric_bounds_are_malformed() {
        for header in [
            "bytes=abc-100",
            "bytes=10-xyz",
            "bytes=+5-10",
            "bytes=-",
            "bytes=",
            "bytes=100",
            "bytes=99999999999999999999999-",
        ] {
            assert!(
                matches!(
                    parse_range_header(header, 1000),
                    Err(RangeError::Malformed { .. })
                ),
                "{header} should be malformed"
            );
        }
    }

    #[test]
    fn test_wrong_unit_is_rejected() {
        assert!(matches!(
            parse_range_header("items=0-10", 1000),
            Err(RangeError::UnsupportedUnit { .. })
        ));
        assert!(matches!(
            parse_range_header("0-10", 1000),
            Err(RangeError::UnsupportedUnit { .. })
        ));
    }

    #[test]
    fn test_unit_is_case_insensitive_and_whitespace_tolerant() {
        assert_eq!(
            parse_range_header("  Bytes= 10 - 19 ", 100),
            Ok(ByteRange::new(10, 19))
        );
    }

    #[test]
    fn test_multi_range_serves_first() {
        assert_eq!(
            parse_range_header("bytes=0-99,200-299", 1000),
            Ok(ByteRange::new(0, 99))
        );
    }

    proptest! {
        #[test]
        fn prop_valid_ranges_round_trip(
            size in 1u64..10_000_000,
            a in any::<u64>(),
            b in any::<u64>(),
        ) {
            let (x, y) = (a % size, b % size);
            let (start, end) = (x.min(y), x.max(y));

            let range = parse_range_header(&format!("bytes={start}-{end}"), size).unwrap();
            prop_assert_eq!(range, ByteRange::new(start, end));
            prop_assert_eq!(range.len(), end - start + 1);
            let expected = format!("bytes {start}-{end}/{size}");
            prop_assert_eq!(range.content_range(size), expected);
        }

        #[test]
        fn prop_out_of_bounds_is_rejected(
            size in 0u64..1_000_000,
            start in any::<u64>(),
            end in any::<u64>(),
        ) {
            prop_assume!(start >= size || end >= size || start > end);
            let header = format!("bytes={start}-{end}");
            prop_assert!(parse_range_header(&header, size).is_err());
        }

        #[test]
        fn prop_open_end_reaches_last_byte(size in 1u64..1_000_000, a in any::<u64>()) {
            let start = a % size;
            let range = parse_range_header(&format!("bytes={start}-"), size).unwrap();
            prop_assert_eq!(range.end, size - 1);
            prop_assert_eq!(range.len(), size - start);
        }
    }
}
