//! Fatal errors raised by the lexer.
//!
//! Lexical errors in the input are not represented here: they are recorded in
//! the [`ErrorLog`](crate::ErrorLog) and scanning continues. A `LexerError`
//! means the token stream cannot go on.

use std::io;

/// The result type for lexer operations.
pub type LexResult<T> = Result<T, LexerError>;

/// An unrecoverable failure of the windowing or tokenization protocol.
#[derive(Debug, thiserror::Error)]
pub enum LexerError {
    /// A symbol at or behind the tokenization frontier was requested; its chunk
    /// has already been evicted.
    #[error("symbol {index} was requested but everything up to {frontier} is already tokenized")]
    Evicted {
        /// The requested global index.
        index: usize,
        /// The tokenization frontier at the time of the request.
        frontier: usize,
    },

    /// A symbol past the end-of-input sentinel was requested.
    #[error("symbol {index} lies past the end of input (last symbol is {read_frontier})")]
    PastEndOfInput {
        /// The requested global index.
        index: usize,
        /// The index of the last symbol of the sentinel.
        read_frontier: usize,
    },

    /// A span extraction reached outside the symbols held by the window.
    #[error("span of {len} symbols at {start} is outside the window [{earliest}, {read_frontier}]")]
    OutOfWindow {
        /// First global index of the span.
        start: usize,
        /// Length of the span.
        len: usize,
        /// Earliest index still retained.
        earliest: usize,
        /// Last index read from the source.
        read_frontier: usize,
    },

    /// The automaton was handed a chunk that does not hold the symbol it expected.
    #[error("automaton expected symbol {expected} but was given a chunk starting at {base}")]
    InvalidIndex {
        /// The global index the automaton wanted next.
        expected: usize,
        /// Base index of the chunk it was given.
        base: usize,
    },

    /// The automaton's consumed position does not match the tokenization
    /// frontier at the start of a token, e.g. it was reused after lexing
    /// another input.
    #[error("automaton has consumed {consumed} symbols but {frontier} are tokenized")]
    Desync {
        /// The automaton's consumed position after its reset.
        consumed: usize,
        /// The tokenization frontier.
        frontier: usize,
    },

    /// The automaton asked for more input without moving over the chunk it
    /// was given.
    #[error("automaton made no progress over the chunk holding symbol {index}")]
    Stalled {
        /// The global index the automaton was expected to move over.
        index: usize,
    },

    /// The automaton reported a match that covers no symbols, or that ends
    /// behind the tokenization frontier.
    #[error("automaton reported an empty match at symbol {offset}")]
    EmptyMatch {
        /// Global index where the token would have started.
        offset: usize,
    },

    /// Reading the source failed for a reason other than end of input.
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    /// The lexer already hit a fatal error and cannot produce more tokens.
    #[error("the lexer was aborted by an earlier fatal error")]
    Aborted,
}

impl LexerError {
    /// Returns true if this error came from the underlying reader.
    pub fn is_io(&self) -> bool {
        matches!(self, LexerError::Io(_))
    }
}
