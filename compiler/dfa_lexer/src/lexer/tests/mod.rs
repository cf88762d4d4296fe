use super::*;
use crate::chunk::END_SYMBOL;
use crate::dfa::{Configuration, StateId, TableDfa};
use crate::evaluator::StateEvaluators;


pub(super) const WORD: StateId = 1;
pub(super) const NEWLINE: StateId = 2;
pub(super) const END: StateId = 3;
pub(super) const INTEGER: StateId = 4;
pub(super) const DECIMAL: StateId = 6;
pub(super) const SPACE: StateId = 7;

/// Words, integers, decimals, spaces, newlines, the end marker and
/// double-quoted strings.
///
/// `12.` is a dead end (state 5) and so is an unterminated string (state 8).
pub(super) fn test_dfa() -> TableDfa {
    let mut dfa = TableDfa::new(10, 0);
    dfa.add_range(0, b'a'..=b'z', WORD)
        .add_range(WORD, b'a'..=b'z', WORD)
        .add_transition(0, b'\n', NEWLINE)
        .add_transition(0, END_SYMBOL, END)
        .add_range(0, b'0'..=b'9', INTEGER)
        .add_range(INTEGER, b'0'..=b'9', INTEGER)
        .add_transition(INTEGER, b'.', 5)
        .add_range(5, b'0'..=b'9', DECIMAL)
        .add_range(DECIMAL, b'0'..=b'9', DECIMAL)
        .add_transition(0, b' ', SPACE)
        .add_transition(SPACE, b' ', SPACE)
        .add_transition(0, b'"', 8)
        .add_range(8, b'a'..=b'z', 8)
        .add_transition(8, b' ', 8)
        .add_transition(8, b'"', 9);
    for state in [WORD, NEWLINE, END, INTEGER, DECIMAL, SPACE, 9] {
        dfa.add_final(state);
    }
    dfa
}

/// What the test evaluator stores in each token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct Lexeme {
    pub state: StateId,
    pub text: String,
}

/// Records the state and text of every token, optionally flagging matches in
/// one state as semantically invalid.
#[derive(Debug, Default)]
pub(super) struct Capture {
    pub flag_state: Option<StateId>,
    pub error_calls: usize,
}

impl Evaluator for Capture {
    type Payload = Lexeme;

    fn on_match(&mut self, token: &mut Token<Lexeme>, state: StateId, text: &[u8]) -> Option<String> {
        token.payload = Lexeme {
            state,
            text: String::from_utf8_lossy(text).into_owned(),
        };
        (self.flag_state == Some(state)).then(|| "Value out of range.".to_string())
    }

    fn on_error(&mut self, token: &mut Token<Lexeme>, state: StateId, text: &[u8]) -> String {
        self.error_calls += 1;
        token.payload = Lexeme {
            state,
            text: String::from_utf8_lossy(text).into_owned(),
        };
        "Unexpected input.".to_string()
    }
}

pub(super) fn config(chunk_size: usize) -> LexerConfig {
    LexerConfig {
        chunk_size,
        ..LexerConfig::default()
    }
}

pub(super) fn lex(input: &str, chunk_size: usize) -> (Vec<Token<Lexeme>>, ErrorLog) {
    Lexer::from_bytes(input.as_bytes(), test_dfa(), Capture::default(), config(chunk_size))
        .tokenize()
        .unwrap()
}

/// (text, line, column, length) of each token
pub(super) fn summary(tokens: &[Token<Lexeme>]) -> Vec<(String, usize, usize, usize)> {
    tokens
        .iter()
        .map(|t| (t.payload.text.clone(), t.location.line, t.location.column, t.length))
        .collect()
}

pub(super) fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
