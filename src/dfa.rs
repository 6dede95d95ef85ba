//! Deterministic finite automaton produced by subset construction.
//!
//! A [`Dfa`] has at most one transition per state and symbol, and no epsilon
//! or predicate transitions. States inherit their acceptance rank and value
//! from the highest-priority accepting NFA state in the subset they
//! represent, which is what lets a matcher built on top resolve overlapping
//! patterns deterministically.

use crate::nfa::Nfa;
use crate::state::StateId;
use crate::subset_construction;
use indexmap::IndexMap;
use std::hash::Hash;

/// A node in a [`Dfa`].
#[derive(Debug, Clone)]
pub struct DfaState<S, V> {
    id: StateId,
    transitions: IndexMap<S, StateId>,
    accept: Option<(u32, V)>,
}

impl<S: Eq + Hash, V> DfaState<S, V> {
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn is_accepting(&self) -> bool {
        self.accept.is_some()
    }

    /// The acceptance rank inherited from the best accepting NFA state this
    /// DFA state covers. Lower is higher priority.
    pub fn accept_index(&self) -> Option<u32> {
        self.accept.as_ref().map(|(index, _)| *index)
    }

    /// The inherited acceptance value, or `V::default()` for a non-accepting
    /// state.
    pub fn accept_value(&self) -> V
    where
        V: Clone + Default,
    {
        self.accept
            .as_ref()
            .map_or_else(V::default, |(_, value)| value.clone())
    }

    /// The target reached by consuming `symbol`, or `None` when the state
    /// has no transition on it.
    pub fn outgoing_for(&self, symbol: &S) -> Option<StateId> {
        self.transitions.get(symbol).copied()
    }

    /// The outgoing transitions, in the order they were materialized.
    pub fn transitions(&self) -> impl Iterator<Item = (&S, StateId)> + '_ {
        self.transitions.iter().map(|(symbol, target)| (symbol, *target))
    }
}

/// A deterministic finite automaton over symbols `S` with acceptance
/// metadata `V`.
///
/// Obtained from [`Dfa::from_nfa`]; read-only afterwards and freely shareable
/// among readers.
#[derive(Debug, Clone)]
pub struct Dfa<S, V> {
    states: Vec<DfaState<S, V>>,
}

impl<S: Eq + Hash, V> Dfa<S, V> {
    /// Convert `nfa` into an equivalent DFA using the subset construction.
    ///
    /// The input machine is not modified. Predicate transitions in the NFA
    /// are not expanded and do not survive the conversion.
    pub fn from_nfa(nfa: &Nfa<S, V>) -> Self
    where
        S: Clone,
        V: Clone,
    {
        subset_construction::convert(nfa)
    }

    /// The start state handle. Always id 0.
    pub fn start(&self) -> StateId {
        0
    }

    /// Dereference a state handle.
    ///
    /// Panics when `id` did not come from this automaton.
    pub fn state(&self, id: StateId) -> &DfaState<S, V> {
        &self.states[id as usize]
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn empty() -> Self {
        Self { states: Vec::new() }
    }

    pub(crate) fn add_state(&mut self, accept: Option<(u32, V)>) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(DfaState {
            id,
            transitions: IndexMap::new(),
            accept,
        });
        id
    }

    pub(crate) fn add_transition(&mut self, from: StateId, symbol: S, to: StateId) {
        self.states[from as usize].transitions.insert(symbol, to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outgoing_for_unknown_symbol_is_none() {
        let mut nfa: Nfa<char, u8> = Nfa::new();
        let start = nfa.start();
        nfa.add(start, 'a');

        let dfa = Dfa::from_nfa(&nfa);

        assert!(dfa.state(dfa.start()).outgoing_for(&'a').is_some());
        assert_eq!(dfa.state(dfa.start()).outgoing_for(&'z'), None);
    }

    #[test]
    fn test_accept_value_defaults_when_not_accepting() {
        let nfa: Nfa<char, u32> = Nfa::new();
        let dfa = Dfa::from_nfa(&nfa);
        let start = dfa.state(dfa.start());

        assert!(!start.is_accepting());
        assert_eq!(start.accept_index(), None);
        assert_eq!(start.accept_value(), 0);
    }

    #[test]
    fn test_state_ids_start_at_zero() {
        let mut nfa: Nfa<char, u8> = Nfa::new();
        let start = nfa.start();
        nfa.add(start, 'a');

        let dfa = Dfa::from_nfa(&nfa);

        assert_eq!(dfa.state(dfa.start()).id(), 0);
        assert_eq!(dfa.num_states(), 2);
    }
}
