//! Byte range type and range planning.

use serde::Serialize;

use crate::error::{DownloadError, Result};

/// Largest accepted section count (each section gets its own thread and connection).
pub const MAX_SECTIONS: usize = 1 << 16;

/// A single section's byte range `[start, end]` (inclusive, zero-indexed).
///
/// A degenerate range (`start > end`) holds no bytes; the planner produces
/// these only when there are more sections than bytes left to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    /// First byte offset.
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered.
    pub fn len(&self) -> u64 {
        if self.start > self.end {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// HTTP Range header value: `bytes=start-end`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// Plans `sections` contiguous ranges covering `[0, size - 1]`.
///
/// Each section spans `size / sections + 1` bytes (floor width plus the start
/// byte); the last section ends at `size - 1` and absorbs the remainder. Ends
/// are clamped to the resource, so when the resource is covered early the
/// trailing sections come out degenerate (`start == size`, `end == size - 1`).
pub fn plan(size: u64, sections: usize) -> Result<Vec<ByteRange>> {
    if size == 0 {
        return Err(DownloadError::InvalidJob("resource size is 0".into()));
    }
    if sections == 0 {
        return Err(DownloadError::InvalidJob("section count is 0".into()));
    }
    if sections > MAX_SECTIONS {
        return Err(DownloadError::InvalidJob(format!(
            "section count {} exceeds the maximum of {}",
            sections, MAX_SECTIONS
        )));
    }

    let each = size / sections as u64;
    let last_byte = size - 1;
    let mut out: Vec<ByteRange> = Vec::with_capacity(sections);

    for i in 0..sections {
        let start = match out.last() {
            None => 0,
            Some(prev) if prev.is_empty() => prev.start,
            Some(prev) => prev.end + 1,
        };
        let end = if i == sections - 1 {
            last_byte
        } else {
            start.saturating_add(each).min(last_byte)
        };
        // start may already sit at `size`; that range stays degenerate.
        let end = if start > last_byte { last_byte } else { end };
        out.push(ByteRange { start, end });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(size: u64, ranges: &[ByteRange]) {
        let mut next = 0u64;
        let mut total = 0u64;
        for r in ranges.iter().filter(|r| !r.is_empty()) {
            assert_eq!(r.start, next, "gap or overlap at {:?}", r);
            next = r.end + 1;
            total += r.len();
        }
        assert_eq!(next, size, "ranges must end at size - 1");
        assert_eq!(total, size);
    }

    #[test]
    fn plan_hundred_bytes_ten_sections() {
        let ranges = plan(100, 10).unwrap();
        assert_eq!(ranges.len(), 10);
        assert_eq!(ranges[0], ByteRange { start: 0, end: 10 });
        assert_eq!(ranges[1], ByteRange { start: 11, end: 21 });
        assert_eq!(ranges[2], ByteRange { start: 22, end: 32 });
        assert_eq!(ranges[8], ByteRange { start: 88, end: 98 });
        assert_eq!(ranges[9], ByteRange { start: 99, end: 99 });
        assert_partition(100, &ranges);
    }

    #[test]
    fn plan_single_section() {
        let ranges = plan(100, 1).unwrap();
        assert_eq!(ranges, vec![ByteRange { start: 0, end: 99 }]);
    }

    #[test]
    fn plan_size_smaller_than_sections() {
        let ranges = plan(3, 8).unwrap();
        assert_eq!(ranges.len(), 8);
        assert_eq!(ranges[0], ByteRange { start: 0, end: 0 });
        assert_eq!(ranges[1], ByteRange { start: 1, end: 1 });
        assert_eq!(ranges[2], ByteRange { start: 2, end: 2 });
        assert!(ranges[3..].iter().all(ByteRange::is_empty));
        assert_partition(3, &ranges);
    }

    #[test]
    fn plan_wide_sections_cover_early() {
        // each = 1, width 2: bytes run out before the last sections.
        let ranges = plan(15, 10).unwrap();
        assert_eq!(ranges.len(), 10);
        assert_eq!(ranges[7], ByteRange { start: 14, end: 14 });
        assert!(ranges[8].is_empty());
        assert!(ranges[9].is_empty());
        assert_partition(15, &ranges);
    }

    #[test]
    fn plan_partitions_for_many_pairs() {
        for size in 1..=64u64 {
            for sections in 1..=20usize {
                let ranges = plan(size, sections).unwrap();
                assert_eq!(ranges.len(), sections, "size={} sections={}", size, sections);
                assert_eq!(ranges[0].start, 0);
                assert_partition(size, &ranges);
            }
        }
        let ranges = plan(u64::MAX, 3).unwrap();
        assert_eq!(ranges.last().unwrap().end, u64::MAX - 1);
    }

    #[test]
    fn plan_rejects_zero_inputs() {
        assert!(matches!(plan(0, 4), Err(DownloadError::InvalidJob(_))));
        assert!(matches!(plan(100, 0), Err(DownloadError::InvalidJob(_))));
    }

    #[test]
    fn plan_rejects_section_counts_past_the_maximum() {
        assert!(matches!(plan(1, usize::MAX), Err(DownloadError::InvalidJob(_))));
        assert!(matches!(
            plan(1, MAX_SECTIONS + 1),
            Err(DownloadError::InvalidJob(_))
        ));
        let ranges = plan(1, MAX_SECTIONS).unwrap();
        assert_eq!(ranges.len(), MAX_SECTIONS);
        assert_partition(1, &ranges);
    }

    #[test]
    fn range_header_and_len() {
        let r = ByteRange { start: 11, end: 21 };
        assert_eq!(r.range_header_value(), "bytes=11-21");
        assert_eq!(r.len(), 11);
        let single = ByteRange { start: 42, end: 42 };
        assert_eq!(single.len(), 1);
        let empty = ByteRange { start: 5, end: 4 };
        assert!(empty.is_empty());
    }
}
