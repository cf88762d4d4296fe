#![allow(dead_code)]

use dfa_lexer::{Lexer, LexerConfig, StateEvaluators, TableDfa, Token, END_SYMBOL};

pub const IDENT: usize = 1;
pub const NUMBER: usize = 2;
pub const NEWLINE: usize = 3;
pub const BLANK: usize = 4;
pub const ARROW: usize = 6;
pub const END: usize = 7;

/// Identifiers, numbers, blanks, newlines, `->` and the end marker.
///
/// A lone `-` is a dead end, so `-x` exercises retraction failure after a
/// consumed prefix.
pub fn toy_dfa() -> TableDfa {
    let mut dfa = TableDfa::new(8, 0);
    dfa.add_range(0, b'a'..=b'z', IDENT)
        .add_range(0, b'A'..=b'Z', IDENT)
        .add_transition(0, b'_', IDENT)
        .add_range(IDENT, b'a'..=b'z', IDENT)
        .add_range(IDENT, b'A'..=b'Z', IDENT)
        .add_range(IDENT, b'0'..=b'9', IDENT)
        .add_transition(IDENT, b'_', IDENT)
        .add_range(0, b'0'..=b'9', NUMBER)
        .add_range(NUMBER, b'0'..=b'9', NUMBER)
        .add_transition(0, b'\n', NEWLINE)
        .add_transitions(0, [b' ', b'\t'], BLANK)
        .add_transitions(BLANK, [b' ', b'\t'], BLANK)
        .add_transition(0, b'-', 5)
        .add_transition(5, b'>', ARROW)
        .add_transition(0, END_SYMBOL, END);
    for state in [IDENT, NUMBER, NEWLINE, BLANK, ARROW, END] {
        dfa.add_final(state);
    }
    dfa
}

/// Payload: the final state and the exact bytes of the token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    pub state: usize,
    pub bytes: Vec<u8>,
}

pub fn evaluators(dfa: &TableDfa) -> StateEvaluators<Text> {
    let mut evaluators: StateEvaluators<Text> = StateEvaluators::for_dfa(dfa);
    evaluators
        .add_default_evaluator(|token, state, text| {
            token.payload = Text {
                state,
                bytes: text.to_vec(),
            };
            None
        })
        .set_error_evaluator(|token, state, text| {
            token.payload = Text {
                state,
                bytes: text.to_vec(),
            };
            format!("No token starts with {:?}.", char::from(text[0]))
        });
    evaluators
}

pub fn config(chunk_size: usize) -> LexerConfig {
    LexerConfig {
        chunk_size,
        ..LexerConfig::default()
    }
}

pub fn lex_bytes(input: &[u8], chunk_size: usize) -> (Vec<Token<Text>>, dfa_lexer::ErrorLog) {
    let dfa = toy_dfa();
    let evaluators = evaluators(&dfa);
    Lexer::from_bytes(input, dfa, evaluators, config(chunk_size))
        .tokenize()
        .expect("in-memory input never fails")
}

pub fn init_test_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}
