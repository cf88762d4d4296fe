//! The sliding window of buffered input.
//!
//! The window holds the chunks between the tokenization frontier and the read
//! frontier, oldest first. It reads more input on demand, drops chunks once
//! every symbol in them has been tokenized, and copies spans that may cross
//! chunk boundaries.
//!
//! The window does not own the frontiers. The lexer passes them in on every
//! call and the window advances the read frontier as it consumes the source.
//!
//! Because chunks are evicted eagerly, the window only ever spans the
//! automaton's current backtrack distance plus one chunk of read-ahead.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use log::{debug, error, trace};

use crate::chunk::Chunk;
use crate::error::{LexResult, LexerError};

/// The two global indices the lexer advances as it goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frontiers {
    /// Last global index covered by an emitted token (0 before the first one).
    pub tokenized: usize,
    /// Last global index read from the source (0 before the first read).
    pub read: usize,
}

/// An ordered, contiguous cache of chunks.
#[derive(Debug)]
pub struct Window {
    /// Oldest chunk at the front, newest at the back.
    chunks: VecDeque<Chunk>,
    /// Number of symbols requested per read.
    capacity: usize,
    sentinel_appended: bool,
}

impl Window {
    /// Creates an empty window that reads `capacity` symbols at a time.
    pub fn new(capacity: usize) -> Self {
        Self {
            chunks: VecDeque::new(),
            capacity: capacity.max(1),
            sentinel_appended: false,
        }
    }

    /// Guarantees the symbol at `index` is cached and returns the chunk holding it.
    ///
    /// Chunks entirely behind the tokenization frontier are evicted first, then
    /// chunks are read from `source` until the read frontier reaches `index`.
    pub fn ensure<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
        frontiers: &mut Frontiers,
        index: usize,
    ) -> LexResult<&Chunk> {
        if index <= frontiers.tokenized {
            error!(
                "symbol {} requested behind the tokenization frontier {}",
                index, frontiers.tokenized
            );
            return Err(LexerError::Evicted {
                index,
                frontier: frontiers.tokenized,
            });
        }

        self.evict(frontiers.tokenized);

        while frontiers.read < index {
            if self.sentinel_appended {
                return Err(LexerError::PastEndOfInput {
                    index,
                    read_frontier: frontiers.read,
                });
            }
            self.read_chunk(source, frontiers)?;
        }
        self.check_invariants(frontiers);

        // Lookups nearly always hit the newest chunk.
        self.chunks
            .iter()
            .rev()
            .find(|chunk| chunk.contains(index))
            .ok_or(LexerError::Evicted {
                index,
                frontier: frontiers.tokenized,
            })
    }

    /// Copies `len` symbols starting at global index `start` into `dst`.
    ///
    /// The span may cross any number of chunks. It must lie between the
    /// earliest retained symbol and the read frontier.
    pub fn extract(
        &self,
        start: usize,
        len: usize,
        read_frontier: usize,
        dst: &mut Vec<u8>,
    ) -> LexResult<()> {
        if len == 0 {
            return Ok(());
        }
        let earliest = self.earliest_index(read_frontier);
        let last = start + len - 1;
        if start < earliest || last > read_frontier {
            return Err(LexerError::OutOfWindow {
                start,
                len,
                earliest,
                read_frontier,
            });
        }

        dst.reserve(len);
        let target = dst.len() + len;
        for chunk in self.chunks.iter().skip_while(|chunk| chunk.end() < start) {
            dst.extend_from_slice(chunk.slice(start, last));
            if chunk.end() >= last {
                break;
            }
        }
        debug_assert_eq!(dst.len(), target);
        Ok(())
    }

    /// Number of chunks currently held.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if no chunk is held.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The earliest global index still retained, or `read_frontier + 1` when
    /// the window is empty.
    pub fn earliest_index(&self, read_frontier: usize) -> usize {
        self.chunks
            .front()
            .map_or(read_frontier + 1, Chunk::start)
    }

    /// Returns true once the end-of-input sentinel has been appended.
    pub fn sentinel_appended(&self) -> bool {
        self.sentinel_appended
    }

    /// The retained chunks, oldest first.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    /// Drops every chunk whose last symbol is at or behind `tokenized`.
    fn evict(&mut self, tokenized: usize) {
        while let Some(chunk) = self.chunks.front() {
            if chunk.end() > tokenized {
                break;
            }
            trace!("evicting chunk {:?}", chunk.range());
            self.chunks.pop_front();
        }
    }

    /// Reads one chunk from the source and appends it, followed by the
    /// sentinel if the source ran dry.
    fn read_chunk<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
        frontiers: &mut Frontiers,
    ) -> LexResult<()> {
        let mut buf = vec![0; self.capacity];
        let mut filled = 0;
        while filled < self.capacity {
            match source.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!("error reading from source: {}", e);
                    return Err(e.into());
                }
            }
        }
        buf.truncate(filled);

        let at_end = filled < self.capacity;
        if let Some(chunk) = Chunk::new(buf, self.capacity, frontiers.read + 1) {
            debug!("read chunk {:?} ({} symbols)", chunk.range(), chunk.len());
            frontiers.read = chunk.end();
            self.chunks.push_back(chunk);
        }
        if at_end {
            self.append_sentinel(frontiers);
        }
        Ok(())
    }

    fn append_sentinel(&mut self, frontiers: &mut Frontiers) {
        debug_assert!(!self.sentinel_appended);
        let chunk = Chunk::sentinel(frontiers.read + 1);
        debug!("end of input, sentinel at {:?}", chunk.range());
        frontiers.read = chunk.end();
        self.chunks.push_back(chunk);
        self.sentinel_appended = true;
    }

    fn check_invariants(&self, frontiers: &Frontiers) {
        if cfg!(debug_assertions) {
            let mut expected = self.earliest_index(frontiers.read);
            for chunk in &self.chunks {
                assert_eq!(chunk.start(), expected, "chunks must be contiguous");
                assert_eq!(chunk.end() - chunk.start() + 1, chunk.len());
                expected = chunk.end() + 1;
            }
            assert_eq!(expected, frontiers.read + 1, "window must end at the read frontier");
            assert!(
                self.earliest_index(frontiers.read) <= frontiers.tokenized + 1,
                "window must reach back to the tokenization frontier"
            );
        }
    }
}
