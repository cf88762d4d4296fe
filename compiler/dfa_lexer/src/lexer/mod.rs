//! The tokenization driver.
//!
//! The `Lexer` feeds chunks from the [`Window`] to a [`Dfa`] until the
//! automaton traps, retracts to the last final state, and hands the matched
//! span to an [`Evaluator`]. Every call to [`Lexer::next_token`] starts the
//! automaton over at the tokenization frontier, so tokens are always the
//! longest match from where the previous one ended.
//!
//! When the automaton traps before reaching any final state, the span up to
//! and including the symbol that trapped it becomes an error token. The
//! automaton skips that symbol and scanning resumes. A run of such spans with
//! no match in between produces a single entry in the [`ErrorLog`].
//!
//! # Examples
//!
//! ```no_run
//! use dfa_lexer::{Lexer, LexerConfig, StateEvaluators, TableDfa};
//!
//! // 0 = start, 1 = word, 2 = newline
//! let mut dfa = TableDfa::new(3, 0);
//! dfa.add_range(0, b'a'..=b'z', 1)
//!     .add_range(1, b'a'..=b'z', 1)
//!     .add_transition(0, b'\n', 2)
//!     .add_final(1)
//!     .add_final(2);
//!
//! let mut evaluators = StateEvaluators::for_dfa(&dfa);
//! evaluators.add_default_evaluator(|token, _state, text| {
//!     token.payload = String::from_utf8_lossy(text).into_owned();
//!     None
//! });
//!
//! let lexer = Lexer::from_bytes(&b"ab\ncd"[..], dfa, evaluators, LexerConfig::default());
//! for token in lexer {
//!     println!("{}", token?);
//! }
//! # Ok::<(), dfa_lexer::LexerError>(())
//! ```

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::iter::FusedIterator;
use std::path::Path;

use log::{debug, error, trace};

use crate::chunk::LINE_FEED;
use crate::dfa::{Dfa, RetractStatus, RunStatus};
use crate::error::{LexResult, LexerError};
use crate::error_log::{ErrorLog, DEFAULT_MAX_DISPLAY_LEN};
use crate::evaluator::Evaluator;
use crate::token::{Location, Token, TokenKind};
use crate::window::{Frontiers, Window};

/// Configuration for the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerConfig {
    /// Number of symbols read from the source at a time
    pub chunk_size: usize,
    /// Whether unmatched input is returned as error tokens or skipped internally
    pub emit_error_tokens: bool,
    /// Whether lexical errors are written to stderr as they are found
    pub report_immediately: bool,
    /// Number of characters of offending text shown per error
    pub max_display_len: usize,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4 * 1024,
            emit_error_tokens: true,
            report_immediately: false,
            max_display_len: DEFAULT_MAX_DISPLAY_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Running,
    Finished,
    Aborted,
}

/// A lexer that drives a DFA over a chunked input source.
pub struct Lexer<D, E, R> {
    dfa: D,
    source: R,
    evaluator: E,
    config: LexerConfig,
    window: Window,
    errors: ErrorLog,
    frontiers: Frontiers,
    /// Current line (1-based)
    line: usize,
    /// Symbols since the last line break, i.e. the column just after the
    /// last emitted token
    column: usize,
    /// Set while inside a run of unmatched input
    error_recovery: bool,
    status: Status,
    /// Scratch buffer for the text of the current token
    text: Vec<u8>,
}

impl<D: Dfa, E: Evaluator, R: Read> Lexer<D, E, R> {
    /// Creates a lexer over `source`.
    ///
    /// The automaton must not have consumed anything yet; otherwise the first
    /// call to [`Lexer::next_token`] fails with [`LexerError::Desync`].
    pub fn new(dfa: D, source: R, evaluator: E, config: LexerConfig) -> Self {
        // The sentinel must fit in a read.
        let chunk_size = config.chunk_size.max(2);

        Self {
            dfa,
            source,
            evaluator,
            config: LexerConfig { chunk_size, ..config },
            window: Window::new(chunk_size),
            errors: ErrorLog::new(config.report_immediately, config.max_display_len),
            frontiers: Frontiers::default(),
            line: 1,
            column: 0,
            error_recovery: false,
            status: Status::Running,
            text: Vec::new(),
        }
    }

    /// Returns the next token, `Ok(None)` once the input is exhausted, or a
    /// fatal error.
    ///
    /// After a fatal error every further call returns [`LexerError::Aborted`].
    pub fn next_token(&mut self) -> LexResult<Option<Token<E::Payload>>> {
        match self.status {
            Status::Aborted => return Err(LexerError::Aborted),
            Status::Finished => return Ok(None),
            Status::Running => {}
        }

        loop {
            match self.scan() {
                Ok(Some((RetractStatus::Fail, _))) if !self.config.emit_error_tokens => continue,
                Ok(Some((_, token))) => return Ok(Some(token)),
                Ok(None) => {
                    debug!("end of input after {} symbols", self.frontiers.tokenized);
                    self.status = Status::Finished;
                    return Ok(None);
                }
                Err(e) => {
                    error!("lexer aborted at symbol {}: {}", self.frontiers.tokenized + 1, e);
                    self.status = Status::Aborted;
                    return Err(e);
                }
            }
        }
    }

    /// Runs the automaton from the tokenization frontier to its next trap and
    /// emits one token along with the outcome of the retract.
    fn scan(&mut self) -> LexResult<Option<(RetractStatus, Token<E::Payload>)>> {
        if self.window.sentinel_appended() && self.frontiers.tokenized >= self.frontiers.read {
            return Ok(None);
        }

        self.dfa.reset_state();
        let consumed = self.dfa.configuration().consumed;
        if consumed != self.frontiers.tokenized {
            return Err(LexerError::Desync {
                consumed,
                frontier: self.frontiers.tokenized,
            });
        }

        loop {
            let next = self.dfa.configuration().consumed + 1;
            // Nothing follows the sentinel; the automaton is stuck on it.
            if self.window.sentinel_appended() && next > self.frontiers.read {
                break;
            }

            let chunk = self.window.ensure(&mut self.source, &mut self.frontiers, next)?;
            let base = chunk.start();
            let status = self.dfa.run(chunk.data(), base);
            trace!("ran chunk at {} from symbol {}: {:?}", base, next, status);
            match status {
                RunStatus::NeedsMoreInput if self.dfa.configuration().consumed < next => {
                    return Err(LexerError::Stalled { index: next });
                }
                RunStatus::NeedsMoreInput => continue,
                RunStatus::Trapped => break,
                RunStatus::InvalidIndex => {
                    return Err(LexerError::InvalidIndex { expected: next, base });
                }
            }
        }

        let outcome = self.dfa.retract();
        let token = match outcome {
            RetractStatus::Success => self.emit_match()?,
            RetractStatus::Fail => self.emit_error()?,
        };
        Ok(Some((outcome, token)))
    }

    fn emit_match(&mut self) -> LexResult<Token<E::Payload>> {
        let config = self.dfa.configuration();
        let start = self.frontiers.tokenized + 1;
        let length = match config.consumed.checked_sub(self.frontiers.tokenized) {
            Some(length) if length > 0 => length,
            _ => return Err(LexerError::EmptyMatch { offset: start }),
        };

        self.text.clear();
        self.window
            .extract(start, length, self.frontiers.read, &mut self.text)?;
        self.error_recovery = false;

        let location = self.location(start);
        let mut token = Token::new(TokenKind::Lexeme, location, length);
        let message = self.evaluator.on_match(&mut token, config.state, &self.text);
        restore_position(&mut token, TokenKind::Lexeme, location, length);
        if let Some(message) = message {
            self.errors.record(location.line, location.column, &self.text, message);
        }

        self.advance(length);
        debug!("matched {} symbols in state {} at {}", length, config.state, token.location);
        Ok(token)
    }

    fn emit_error(&mut self) -> LexResult<Token<E::Payload>> {
        let config = self.dfa.configuration();
        let start = self.frontiers.tokenized + 1;
        // The offending symbol is the one the automaton trapped on. When it
        // trapped for lack of input past the sentinel there is none to take.
        let has_offender = config.consumed < self.frontiers.read;
        let length = match config.consumed.checked_sub(self.frontiers.tokenized) {
            Some(length) if has_offender => length + 1,
            Some(length) if length > 0 => length,
            _ => return Err(LexerError::EmptyMatch { offset: start }),
        };

        self.text.clear();
        self.window
            .extract(start, length, self.frontiers.read, &mut self.text)?;

        let location = self.location(start);
        let mut token = Token::new(TokenKind::Error, location, length);
        if !self.error_recovery {
            let message = self.evaluator.on_error(&mut token, config.state, &self.text);
            restore_position(&mut token, TokenKind::Error, location, length);
            self.errors.record(location.line, location.column, &self.text, message);
            self.error_recovery = true;
        }
        if has_offender {
            self.dfa.skip();
        }

        self.advance(length);
        debug!("unmatched {} symbols at {}", length, token.location);
        Ok(token)
    }

    /// Where a token starting at global index `start` begins.
    fn location(&self, start: usize) -> Location {
        Location {
            line: self.line,
            column: self.column + 1,
            offset: start,
        }
    }

    /// Moves the tokenization frontier past the text in the scratch buffer.
    fn advance(&mut self, length: usize) {
        self.frontiers.tokenized += length;
        for &symbol in &self.text {
            if symbol == LINE_FEED {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
    }

    /// Process the entire input and return all tokens with the error log
    ///
    /// Stops at the first fatal error.
    pub fn tokenize(mut self) -> LexResult<(Vec<Token<E::Payload>>, ErrorLog)> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        debug!(
            "tokenization completed: {} tokens, {} errors",
            tokens.len(),
            self.errors.len()
        );
        Ok((tokens, self.errors))
    }
}

/// Evaluators own the payload only; the rest of the token is the driver's.
fn restore_position<P>(token: &mut Token<P>, kind: TokenKind, location: Location, length: usize) {
    token.kind = kind;
    token.location = location;
    token.length = length;
}

impl<'a, D: Dfa, E: Evaluator> Lexer<D, E, &'a [u8]> {
    /// Create a lexer over an in-memory buffer
    pub fn from_bytes(input: &'a [u8], dfa: D, evaluator: E, config: LexerConfig) -> Self {
        Self::new(dfa, input, evaluator, config)
    }
}

impl<D: Dfa, E: Evaluator> Lexer<D, E, BufReader<File>> {
    /// Create a lexer reading from a file
    pub fn from_file<P: AsRef<Path>>(path: P, dfa: D, evaluator: E, config: LexerConfig) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(config.chunk_size.max(2), file);
        Ok(Self::new(dfa, reader, evaluator, config))
    }
}

impl<D, E, R> Lexer<D, E, R> {
    /// Current line (1-based)
    pub fn line(&self) -> usize {
        self.line
    }

    /// Number of symbols between the last line break and the end of the last token
    pub fn column(&self) -> usize {
        self.column
    }

    /// Last global index covered by an emitted token
    pub fn tokenized_frontier(&self) -> usize {
        self.frontiers.tokenized
    }

    /// Last global index read from the source
    pub fn read_frontier(&self) -> usize {
        self.frontiers.read
    }

    /// The lexical errors found so far
    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// The automaton
    pub fn dfa(&self) -> &D {
        &self.dfa
    }

    /// The evaluator
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// The evaluator, mutably
    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    /// The input window
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// The configuration in use
    pub fn config(&self) -> &LexerConfig {
        &self.config
    }

    /// Returns true once the input is exhausted or a fatal error occurred
    pub fn is_finished(&self) -> bool {
        self.status != Status::Running
    }

    /// Consumes the lexer and returns its error log
    pub fn into_errors(self) -> ErrorLog {
        self.errors
    }
}

impl<D: Dfa, E: Evaluator, R: Read> Iterator for Lexer<D, E, R> {
    type Item = LexResult<Token<E::Payload>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) | Err(LexerError::Aborted) => None,
            Err(e) => Some(Err(e)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_finished() {
            (0, Some(0))
        } else {
            (0, None)
        }
    }
}

impl<D: Dfa, E: Evaluator, R: Read> FusedIterator for Lexer<D, E, R> {}

#[cfg(test)]
mod tests;
