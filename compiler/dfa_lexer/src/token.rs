//! Tokens and their positions.

use std::fmt;

/// Represents a token's location in the input.
///
/// Line and column are 1-based. The offset is the 1-based global index of the
/// token's first symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    /// The 1-based line number
    pub line: usize,
    /// The 1-based column number, counted in symbols
    pub column: usize,
    /// The 1-based global index of the first symbol
    pub offset: usize,
}

/// Whether a token is a match or a span of input nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenKind {
    /// The automaton reached a final state; the span is the longest match.
    #[default]
    Lexeme,
    /// No final state was reached. The span ends with the symbol that trapped.
    Error,
}

/// A positioned token.
///
/// The lexer fills in the kind, location and length. The payload belongs to
/// the [`Evaluator`](crate::Evaluator) and is never inspected by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<P> {
    /// Match or error
    pub kind: TokenKind,
    /// Where the token starts
    pub location: Location,
    /// Number of symbols covered
    pub length: usize,
    /// Evaluator-defined data
    pub payload: P,
}

impl<P: Default> Token<P> {
    /// Creates a token with a default payload.
    pub fn new(kind: TokenKind, location: Location, length: usize) -> Self {
        Self {
            kind,
            location,
            length,
            payload: P::default(),
        }
    }
}

impl<P> Token<P> {
    /// Returns true if this token marks unmatched input.
    pub fn is_error(&self) -> bool {
        self.kind == TokenKind::Error
    }

    /// The global index of the last symbol covered.
    pub fn end_offset(&self) -> usize {
        self.location.offset + self.length - 1
    }

    /// Replaces the payload, keeping the position.
    pub fn map<Q, F: FnOnce(P) -> Q>(self, f: F) -> Token<Q> {
        Token {
            kind: self.kind,
            location: self.location,
            length: self.length,
            payload: f(self.payload),
        }
    }
}

impl<P: fmt::Debug> fmt::Display for Token<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_error() {
            write!(f, "error")?;
        } else {
            write!(f, "{:?}", self.payload)?;
        }
        write!(f, "@{}+{}", self.location, self.length)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.line, self.column, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let location = Location {
            line: 2,
            column: 5,
            offset: 14,
        };
        let token: Token<()> = Token::new(TokenKind::Lexeme, location, 3);
        assert_eq!(token.location, location);
        assert_eq!(token.end_offset(), 16);
        assert!(!token.is_error());
    }

    #[test]
    fn test_display() {
        let location = Location {
            line: 1,
            column: 3,
            offset: 3,
        };
        let token = Token::<()>::new(TokenKind::Lexeme, location, 1).map(|()| "Newline");
        assert_eq!(token.to_string(), "\"Newline\"@1:3:3+1");

        let error: Token<u8> = Token::new(TokenKind::Error, location, 2);
        assert_eq!(error.to_string(), "error@1:3:3+2");
    }
}
