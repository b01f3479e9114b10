//! State Machine Runtime
//!
//! Flat, typed state machines for component lifecycles. States and events are
//! plain `Copy` enums supplied by the caller; the machine only knows the
//! transition table. Supports:
//! - Transition lookup by `(state, event)`
//! - Transitions from several source states at once
//! - A bounded history of taken transitions (for debugging and tests)

use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;

/// Default number of transitions remembered in the history
pub const DEFAULT_HISTORY_LIMIT: usize = 32;

/// A transition in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S, E> {
    pub from_state: S,
    pub event: E,
    pub to_state: S,
}

impl<S, E> Transition<S, E> {
    pub fn new(from: S, event: E, to: S) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
        }
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E> {
    initial_state: S,
    table: FxHashMap<(S, E), S>,
    history_limit: usize,
}

impl<S, E> StateMachineBuilder<S, E>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            table: FxHashMap::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Add a transition
    pub fn transition(mut self, transition: Transition<S, E>) -> Self {
        self.table
            .insert((transition.from_state, transition.event), transition.to_state);
        self
    }

    /// Add a simple transition (from, event, to)
    pub fn on(self, from: S, event: E, to: S) -> Self {
        self.transition(Transition::new(from, event, to))
    }

    /// Add the same transition from every state in `from`
    pub fn on_any(mut self, from: &[S], event: E, to: S) -> Self {
        for &state in from {
            self = self.on(state, event, to);
        }
        self
    }

    /// Keep at most `limit` entries of transition history
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build the state machine
    pub fn build(self) -> StateMachine<S, E> {
        StateMachine {
            current_state: self.initial_state,
            table: self.table,
            history: VecDeque::new(),
            history_limit: self.history_limit,
        }
    }
}

/// A state machine instance
pub struct StateMachine<S, E> {
    current_state: S,
    table: FxHashMap<(S, E), S>,
    /// History of state transitions (for debugging)
    history: VecDeque<Transition<S, E>>,
    history_limit: usize,
}

impl<S, E> StateMachine<S, E>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    /// Create a state machine with an initial state and transitions
    pub fn new(initial_state: S, transitions: Vec<Transition<S, E>>) -> Self {
        transitions
            .into_iter()
            .fold(Self::builder(initial_state), StateMachineBuilder::transition)
            .build()
    }

    /// Create a builder for a state machine
    pub fn builder(initial_state: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial_state)
    }

    /// Get the current state
    pub fn current_state(&self) -> S {
        self.current_state
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Transition history, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Transition<S, E>> {
        self.history.iter()
    }

    /// Clear transition history
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Check if an event can trigger a transition from current state
    pub fn can_send(&self, event: E) -> bool {
        self.table.contains_key(&(self.current_state, event))
    }

    /// Send an event, returning the state after it is handled.
    ///
    /// Events without a transition from the current state leave the machine
    /// untouched.
    pub fn send(&mut self, event: E) -> S {
        self.try_send(event).unwrap_or(self.current_state)
    }

    /// Send an event, returning `None` when it had no transition
    pub fn try_send(&mut self, event: E) -> Option<S> {
        let from = self.current_state;
        let Some(&to) = self.table.get(&(from, event)) else {
            tracing::trace!(?from, ?event, "fsm: event ignored");
            return None;
        };

        self.current_state = to;
        tracing::debug!(?from, ?event, ?to, "fsm: transition");

        if self.history_limit > 0 {
            if self.history.len() == self.history_limit {
                self.history.pop_front();
            }
            self.history.push_back(Transition::new(from, event, to));
        }

        Some(to)
    }
}
