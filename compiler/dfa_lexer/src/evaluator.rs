//! Evaluators turn matched text into token payloads.
//!
//! The lexer calls an [`Evaluator`] at trap points only: once per matched
//! token and once per run of unmatched input. [`StateEvaluators`] is a
//! ready-made evaluator that dispatches on the final state of the match.

use crate::dfa::{Dfa, StateId};
use crate::token::Token;

/// Message used for unmatched input when no error evaluator is registered.
pub const DEFAULT_ERROR_MESSAGE: &str = "Unexpected input.";

/// Grammar-specific callbacks that fill in token payloads.
pub trait Evaluator {
    /// Data attached to each token.
    type Payload: Default;

    /// Called for a successful match ending in final state `state`.
    ///
    /// Returning a message logs a lexical error for the token even though it
    /// matched; scanning still goes on.
    fn on_match(&mut self, token: &mut Token<Self::Payload>, state: StateId, text: &[u8]) -> Option<String>;

    /// Called for the first of a run of unmatched spans. `state` is where the
    /// automaton trapped. The returned message goes into the error log.
    fn on_error(&mut self, token: &mut Token<Self::Payload>, state: StateId, text: &[u8]) -> String;
}

impl<E: Evaluator + ?Sized> Evaluator for &mut E {
    type Payload = E::Payload;

    fn on_match(&mut self, token: &mut Token<Self::Payload>, state: StateId, text: &[u8]) -> Option<String> {
        (**self).on_match(token, state, text)
    }

    fn on_error(&mut self, token: &mut Token<Self::Payload>, state: StateId, text: &[u8]) -> String {
        (**self).on_error(token, state, text)
    }
}

/// An error raised while registering evaluators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluatorError {
    /// The state id is outside the automaton's range.
    #[error("state {state} does not exist (automaton has {state_count} states)")]
    UnknownState {
        /// The rejected state id.
        state: StateId,
        /// Number of states in the automaton.
        state_count: usize,
    },
}

type StateFn<P> = Box<dyn FnMut(&mut Token<P>, &[u8]) -> Option<String>>;
type DefaultFn<P> = Box<dyn FnMut(&mut Token<P>, StateId, &[u8]) -> Option<String>>;
type ErrorFn<P> = Box<dyn FnMut(&mut Token<P>, StateId, &[u8]) -> String>;

/// Evaluators looked up by final state, with a fallback.
///
/// A match ending in a state with its own evaluator goes there; any other
/// match goes to the default evaluator, or keeps a default payload if there
/// is none.
pub struct StateEvaluators<P> {
    per_state: Vec<Option<StateFn<P>>>,
    default: Option<DefaultFn<P>>,
    error: Option<ErrorFn<P>>,
}

impl<P> StateEvaluators<P> {
    /// Creates an empty table for states `0..state_count`.
    pub fn new(state_count: usize) -> Self {
        let mut per_state = Vec::with_capacity(state_count);
        per_state.resize_with(state_count, || None);
        Self {
            per_state,
            default: None,
            error: None,
        }
    }

    /// Creates an empty table sized for `dfa`.
    pub fn for_dfa<D: Dfa + ?Sized>(dfa: &D) -> Self {
        Self::new(dfa.state_count())
    }

    /// Registers the evaluator for matches ending in `state`, replacing any
    /// earlier one.
    pub fn add_state_evaluator<F>(&mut self, state: StateId, f: F) -> Result<&mut Self, EvaluatorError>
    where
        F: FnMut(&mut Token<P>, &[u8]) -> Option<String> + 'static,
    {
        let state_count = self.per_state.len();
        let slot = self
            .per_state
            .get_mut(state)
            .ok_or(EvaluatorError::UnknownState { state, state_count })?;
        *slot = Some(Box::new(f));
        Ok(self)
    }

    /// Registers the fallback for states without their own evaluator.
    pub fn add_default_evaluator<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&mut Token<P>, StateId, &[u8]) -> Option<String> + 'static,
    {
        self.default = Some(Box::new(f));
        self
    }

    /// Registers the evaluator for unmatched input.
    pub fn set_error_evaluator<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&mut Token<P>, StateId, &[u8]) -> String + 'static,
    {
        self.error = Some(Box::new(f));
        self
    }

    /// Number of states the table covers.
    pub fn state_count(&self) -> usize {
        self.per_state.len()
    }

    /// Returns true if `state` has its own evaluator.
    pub fn has_state_evaluator(&self, state: StateId) -> bool {
        matches!(self.per_state.get(state), Some(Some(_)))
    }
}

impl<P: Default> Evaluator for StateEvaluators<P> {
    type Payload = P;

    fn on_match(&mut self, token: &mut Token<P>, state: StateId, text: &[u8]) -> Option<String> {
        if let Some(Some(f)) = self.per_state.get_mut(state) {
            return f(token, text);
        }
        match self.default.as_mut() {
            Some(f) => f(token, state, text),
            None => None,
        }
    }

    fn on_error(&mut self, token: &mut Token<P>, state: StateId, text: &[u8]) -> String {
        match self.error.as_mut() {
            Some(f) => f(token, state, text),
            None => DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

impl<P> std::fmt::Debug for StateEvaluators<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registered: Vec<StateId> = (0..self.per_state.len())
            .filter(|&s| self.has_state_evaluator(s))
            .collect();
        f.debug_struct("StateEvaluators")
            .field("state_count", &self.per_state.len())
            .field("registered", &registered)
            .field("default", &self.default.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::TableDfa;
    use crate::token::{Location, TokenKind};

    fn token() -> Token<String> {
        Token::new(TokenKind::Lexeme, Location::default(), 0)
    }

    #[test]
    fn test_dispatch_by_state() {
        let mut evaluators = StateEvaluators::new(3);
        evaluators
            .add_state_evaluator(1, |tok: &mut Token<String>, text| {
                tok.payload = format!("one:{}", String::from_utf8_lossy(text));
                None
            })
            .unwrap()
            .add_default_evaluator(|tok, state, _| {
                tok.payload = format!("default:{state}");
                Some("flagged".to_string())
            });

        let mut tok = token();
        assert_eq!(evaluators.on_match(&mut tok, 1, b"ab"), None);
        assert_eq!(tok.payload, "one:ab");

        let mut tok = token();
        assert_eq!(evaluators.on_match(&mut tok, 2, b"ab"), Some("flagged".to_string()));
        assert_eq!(tok.payload, "default:2");
    }

    #[test]
    fn test_no_default_keeps_payload() {
        let mut evaluators: StateEvaluators<String> = StateEvaluators::new(2);
        let mut tok = token();
        assert_eq!(evaluators.on_match(&mut tok, 0, b"x"), None);
        assert_eq!(tok.payload, "");
    }

    #[test]
    fn test_error_evaluator() {
        let mut evaluators: StateEvaluators<String> = StateEvaluators::new(1);
        let mut tok = token();
        assert_eq!(evaluators.on_error(&mut tok, 0, b"?"), DEFAULT_ERROR_MESSAGE);

        evaluators.set_error_evaluator(|_, _, text| format!("Bad symbol {:?}", text));
        assert_eq!(evaluators.on_error(&mut tok, 0, b"?"), "Bad symbol [63]");
    }

    #[test]
    fn test_unknown_state_is_rejected() {
        let dfa = TableDfa::new(2, 0);
        let mut evaluators: StateEvaluators<()> = StateEvaluators::for_dfa(&dfa);
        assert_eq!(evaluators.state_count(), 2);
        let err = evaluators.add_state_evaluator(2, |_, _| None).unwrap_err();
        assert_eq!(err, EvaluatorError::UnknownState { state: 2, state_count: 2 });
        assert!(!evaluators.has_state_evaluator(2));
    }
}
