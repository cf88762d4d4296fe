//! Streaming DFA-driven tokenizer
//!
//! This crate turns a byte source into positioned tokens by driving a
//! caller-supplied deterministic automaton over a sliding window of buffered
//! input. Tokens are longest matches: the automaton runs until it traps and
//! is then retracted to the last final state it passed through. Input that no
//! final state covers is skipped one symbol at a time, with each run of it
//! recorded once in an error log.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod chunk;
pub mod dfa;
pub mod error;
pub mod error_log;
pub mod evaluator;
pub mod lexer;
pub mod token;
pub mod window;

// Re-export the main types for convenience
pub use chunk::{Chunk, END_SYMBOL, LINE_FEED};
pub use dfa::{Configuration, Dfa, RetractStatus, RunStatus, StateId, TableDfa};
pub use error::{LexResult, LexerError};
pub use error_log::{ErrorLog, ErrorRecord};
pub use evaluator::{Evaluator, EvaluatorError, StateEvaluators};
pub use lexer::{Lexer, LexerConfig};
pub use token::{Location, Token, TokenKind};
pub use window::{Frontiers, Window};
