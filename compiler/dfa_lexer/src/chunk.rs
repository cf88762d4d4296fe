//! Fixed-capacity slices of the input stream.

use std::fmt;
use std::ops::RangeInclusive;

/// Control symbol that marks the end of the input.
pub const END_SYMBOL: u8 = 0x04;

/// Symbol that terminates a line.
pub const LINE_FEED: u8 = b'\n';

/// An immutable run of input symbols covering `[start, end]` of the global stream.
///
/// Global indices are 1-based. A chunk always holds at least one symbol, so
/// `end - start + 1 == len()` holds for every chunk.
#[derive(Clone, PartialEq, Eq)]
pub struct Chunk {
    data: Box<[u8]>,
    capacity: usize,
    start: usize,
}

impl Chunk {
    /// Builds a chunk from the symbols read for it, the first of which sits at
    /// global index `start`.
    ///
    /// Returns `None` for an empty read; the window discards those.
    pub(crate) fn new(data: Vec<u8>, capacity: usize, start: usize) -> Option<Self> {
        if data.is_empty() || start == 0 {
            return None;
        }
        debug_assert!(data.len() <= capacity);
        Some(Self {
            data: data.into_boxed_slice(),
            capacity,
            start,
        })
    }

    /// The two-symbol end-of-input chunk: [`END_SYMBOL`] then [`LINE_FEED`].
    pub(crate) fn sentinel(start: usize) -> Self {
        Self {
            data: Box::new([END_SYMBOL, LINE_FEED]),
            capacity: 2,
            start,
        }
    }

    /// Global index of the first symbol.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Global index of the last symbol.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.data.len() - 1
    }

    /// Number of valid symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; empty chunks are never built.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The number of symbols the read that produced this chunk asked for.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The valid symbols.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The global index range covered.
    pub fn range(&self) -> RangeInclusive<usize> {
        self.start..=self.end()
    }

    /// Returns true if `index` falls inside this chunk.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end()
    }

    /// The symbols from global index `from` up to `to`, both inclusive,
    /// clipped to this chunk.
    pub(crate) fn slice(&self, from: usize, to: usize) -> &[u8] {
        if to < self.start || from > self.end() || from > to {
            return &[];
        }
        let lo = from.max(self.start) - self.start;
        let hi = to.min(self.end()) + 1 - self.start;
        &self.data[lo..hi]
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("range", &self.range())
            .field("capacity", &self.capacity)
            .field("data", &String::from_utf8_lossy(&self.data))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_range() {
        let chunk = Chunk::new(b"hello".to_vec(), 8, 11).unwrap();
        assert_eq!(chunk.start(), 11);
        assert_eq!(chunk.end(), 15);
        assert_eq!(chunk.len(), 5);
        assert_eq!(chunk.end() - chunk.start() + 1, chunk.len());
        assert!(chunk.contains(11));
        assert!(chunk.contains(15));
        assert!(!chunk.contains(10));
        assert!(!chunk.contains(16));
    }

    #[test]
    fn test_empty_read_is_rejected() {
        assert!(Chunk::new(Vec::new(), 8, 1).is_none());
    }

    #[test]
    fn test_sentinel_layout() {
        let chunk = Chunk::sentinel(7);
        assert_eq!(chunk.data(), &[END_SYMBOL, LINE_FEED]);
        assert_eq!(chunk.range(), 7..=8);
    }

    #[test]
    fn test_slice_clips_to_chunk() {
        let chunk = Chunk::new(b"abcd".to_vec(), 4, 5).unwrap();
        assert_eq!(chunk.slice(1, 100), b"abcd");
        assert_eq!(chunk.slice(6, 7), b"bc");
        assert_eq!(chunk.slice(8, 20), b"d");
        assert_eq!(chunk.slice(9, 20), b"");
    }
}
