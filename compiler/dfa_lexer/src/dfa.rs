//! The automaton contract the lexer drives, and a table-driven implementation.
//!
//! The lexer never looks inside the automaton. It only relies on the
//! operations of [`Dfa`]: restart from the start state, run over a chunk,
//! retract to the last final state, and skip one symbol.
//!
//! Positions are global 1-based symbol indices. `consumed` is the index of the
//! last symbol the automaton has moved over, so the next symbol it wants is
//! `consumed + 1`.

use std::fmt;

/// Identifier of an automaton state.
pub type StateId = usize;

/// Outcome of [`Dfa::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The chunk was exhausted without trapping.
    NeedsMoreInput,
    /// No transition exists from the current state on the next symbol.
    Trapped,
    /// The chunk does not hold the symbol the automaton expected next.
    InvalidIndex,
}

/// Outcome of [`Dfa::retract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetractStatus {
    /// The automaton rolled back to the most recent final state.
    Success,
    /// No final state was reached since the last reset.
    Fail,
}

/// A read-only snapshot of the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    /// Current state.
    pub state: StateId,
    /// The most recent final state reached since the last reset, if any.
    pub last_final: Option<StateId>,
    /// Global index of the last symbol moved over.
    pub consumed: usize,
}

/// A deterministic automaton that can be driven incrementally over chunks.
pub trait Dfa {
    /// Number of states; ids are `0..state_count()`.
    fn state_count(&self) -> usize;

    /// Goes back to the start state and forgets the remembered final state.
    /// The consumed position is kept.
    fn reset_state(&mut self);

    /// Advances over `chunk`, whose first symbol sits at global index `base`,
    /// starting at symbol `consumed + 1`.
    fn run(&mut self, chunk: &[u8], base: usize) -> RunStatus;

    /// Rolls back to the most recent final state.
    ///
    /// On [`RetractStatus::Fail`] the position is left where the automaton
    /// trapped, so the offending symbol is the one at `consumed + 1`.
    fn retract(&mut self) -> RetractStatus;

    /// Moves the consumed position one symbol forward without a transition.
    fn skip(&mut self);

    /// Current state, last final state and consumed position.
    fn configuration(&self) -> Configuration;
}

impl<D: Dfa + ?Sized> Dfa for &mut D {
    fn state_count(&self) -> usize {
        (**self).state_count()
    }

    fn reset_state(&mut self) {
        (**self).reset_state()
    }

    fn run(&mut self, chunk: &[u8], base: usize) -> RunStatus {
        (**self).run(chunk, base)
    }

    fn retract(&mut self) -> RetractStatus {
        (**self).retract()
    }

    fn skip(&mut self) {
        (**self).skip()
    }

    fn configuration(&self) -> Configuration {
        (**self).configuration()
    }
}

impl<D: Dfa + ?Sized> Dfa for Box<D> {
    fn state_count(&self) -> usize {
        (**self).state_count()
    }

    fn reset_state(&mut self) {
        (**self).reset_state()
    }

    fn run(&mut self, chunk: &[u8], base: usize) -> RunStatus {
        (**self).run(chunk, base)
    }

    fn retract(&mut self) -> RetractStatus {
        (**self).retract()
    }

    fn skip(&mut self) {
        (**self).skip()
    }

    fn configuration(&self) -> Configuration {
        (**self).configuration()
    }
}

const ALPHABET: usize = 256;

/// A dense transition-table automaton over bytes.
///
/// The table is filled by hand with [`add_transition`](Self::add_transition)
/// and friends. Reaching a final state is only recorded after at least one
/// transition, so a final start state never produces an empty match.
///
/// ```
/// use dfa_lexer::TableDfa;
///
/// // 0 = start, 1 = inside a run of digits
/// let mut dfa = TableDfa::new(2, 0);
/// dfa.add_range(0, b'0'..=b'9', 1)
///     .add_range(1, b'0'..=b'9', 1)
///     .add_final(1);
/// ```
#[derive(Clone)]
pub struct TableDfa {
    table: Vec<Option<StateId>>,
    finals: Vec<bool>,
    start: StateId,
    state: StateId,
    consumed: usize,
    last_final: Option<(StateId, usize)>,
}

impl TableDfa {
    /// Creates an automaton with `states` states and no transitions.
    ///
    /// # Panics
    ///
    /// Panics if `start` is not a valid state.
    pub fn new(states: usize, start: StateId) -> Self {
        assert!(start < states, "start state {start} out of range 0..{states}");
        Self {
            table: vec![None; states * ALPHABET],
            finals: vec![false; states],
            start,
            state: start,
            consumed: 0,
            last_final: None,
        }
    }

    /// Adds a transition `from --symbol--> to`.
    ///
    /// # Panics
    ///
    /// Panics if either state is out of range.
    pub fn add_transition(&mut self, from: StateId, symbol: u8, to: StateId) -> &mut Self {
        self.check_state(from);
        self.check_state(to);
        self.table[from * ALPHABET + usize::from(symbol)] = Some(to);
        self
    }

    /// Adds `from --s--> to` for every `s` in `symbols`.
    pub fn add_transitions<I>(&mut self, from: StateId, symbols: I, to: StateId) -> &mut Self
    where
        I: IntoIterator<Item = u8>,
    {
        for symbol in symbols {
            self.add_transition(from, symbol, to);
        }
        self
    }

    /// Adds `from --s--> to` for every `s` in the inclusive range.
    pub fn add_range(
        &mut self,
        from: StateId,
        symbols: std::ops::RangeInclusive<u8>,
        to: StateId,
    ) -> &mut Self {
        self.add_transitions(from, symbols, to)
    }

    /// Marks `state` as accepting.
    ///
    /// # Panics
    ///
    /// Panics if the state is out of range.
    pub fn add_final(&mut self, state: StateId) -> &mut Self {
        self.check_state(state);
        self.finals[state] = true;
        self
    }

    /// Returns true if `state` is accepting.
    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.get(state).copied().unwrap_or(false)
    }

    /// The start state.
    pub fn start_state(&self) -> StateId {
        self.start
    }

    fn check_state(&self, state: StateId) {
        assert!(
            state < self.finals.len(),
            "state {state} out of range 0..{}",
            self.finals.len()
        );
    }
}

impl Dfa for TableDfa {
    fn state_count(&self) -> usize {
        self.finals.len()
    }

    fn reset_state(&mut self) {
        self.state = self.start;
        self.last_final = None;
    }

    fn run(&mut self, chunk: &[u8], base: usize) -> RunStatus {
        let next = self.consumed + 1;
        if next < base || next >= base + chunk.len() {
            return RunStatus::InvalidIndex;
        }

        for &symbol in &chunk[next - base..] {
            match self.table[self.state * ALPHABET + usize::from(symbol)] {
                Some(to) => {
                    self.state = to;
                    self.consumed += 1;
                    if self.finals[to] {
                        self.last_final = Some((to, self.consumed));
                    }
                }
                None => return RunStatus::Trapped,
            }
        }
        RunStatus::NeedsMoreInput
    }

    fn retract(&mut self) -> RetractStatus {
        match self.last_final {
            Some((state, position)) => {
                self.state = state;
                self.consumed = position;
                RetractStatus::Success
            }
            None => RetractStatus::Fail,
        }
    }

    fn skip(&mut self) {
        self.consumed += 1;
    }

    fn configuration(&self) -> Configuration {
        Configuration {
            state: self.state,
            last_final: self.last_final.map(|(state, _)| state),
            consumed: self.consumed,
        }
    }
}

impl fmt::Debug for TableDfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let transitions = self.table.iter().filter(|t| t.is_some()).count();
        f.debug_struct("TableDfa")
            .field("states", &self.finals.len())
            .field("transitions", &transitions)
            .field("start", &self.start)
            .field("state", &self.state)
            .field("consumed", &self.consumed)
            .finish()
    }
}
