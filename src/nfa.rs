//! Non-deterministic finite automaton builder.

use crate::mvmap::MultiMap;
use crate::state::StateId;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::slice;

/// A transition guard over symbols: the transition is taken for every symbol
/// the function maps to `true`.
///
/// Reference-counted so the same guard can be attached to several states and
/// re-attached each time a fragment is rebuilt.
pub type SymbolPredicate<S> = Rc<dyn Fn(&S) -> bool>;

/// A node in an [`Nfa`] over symbols of type `S` with acceptance metadata of
/// type `V`.
///
/// A state may carry:
/// - outgoing transitions on concrete symbols, possibly several per symbol,
/// - predicate-guarded transitions,
/// - epsilon transitions, taken without consuming input,
/// - an optional acceptance rank and value.
pub struct State<S, V> {
    id: StateId,
    /// Storage for a state with exactly one concrete transition. Mutually
    /// exclusive with `transitions`: promoting to the map clears the slot.
    /// Long literal chains are the common case, and the slot spares them one
    /// map allocation per state.
    edge: Option<(S, StateId)>,
    transitions: Option<MultiMap<S, StateId>>,
    predicates: Vec<(SymbolPredicate<S>, StateId)>,
    epsilons: Vec<StateId>,
    accept: Option<(u32, V)>,
}

impl<S, V> State<S, V> {
    fn new(id: StateId) -> Self {
        Self {
            id,
            edge: None,
            transitions: None,
            predicates: Vec::new(),
            epsilons: Vec::new(),
            accept: None,
        }
    }

    /// The builder-assigned identifier, unique within the owning machine.
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn is_accepting(&self) -> bool {
        self.accept.is_some()
    }

    /// The acceptance rank assigned when the state was marked accepting.
    /// Lower ranks take priority during subset construction.
    pub fn accept_index(&self) -> Option<u32> {
        self.accept.as_ref().map(|(index, _)| *index)
    }

    /// The acceptance value, or `V::default()` for a non-accepting state.
    pub fn accept_value(&self) -> V
    where
        V: Clone + Default,
    {
        self.accept
            .as_ref()
            .map_or_else(V::default, |(_, value)| value.clone())
    }

    pub(crate) fn ranked_accept(&self) -> Option<(u32, &V)> {
        self.accept.as_ref().map(|(index, value)| (*index, value))
    }

    /// States reachable through a single epsilon transition, in insertion
    /// order.
    pub fn epsilon(&self) -> &[StateId] {
        &self.epsilons
    }

    /// The predicate transitions attached to this state, in insertion order.
    pub fn predicates(&self) -> &[(SymbolPredicate<S>, StateId)] {
        &self.predicates
    }
}

impl<S: Eq + Hash, V> State<S, V> {
    /// Every symbol with at least one outgoing concrete transition.
    /// Deduplicated; the order is unspecified.
    pub fn outgoing_symbols(&self) -> impl Iterator<Item = &S> + '_ {
        let slot = self.edge.as_ref().map(|(symbol, _)| symbol);
        let mapped = self.transitions.iter().flat_map(|map| map.keys());
        slot.into_iter().chain(mapped)
    }

    /// The states reachable by consuming `symbol`, or the empty slice when
    /// the state has no transition on it.
    pub fn outgoing_for(&self, symbol: &S) -> &[StateId] {
        if let Some(map) = &self.transitions {
            return map.get(symbol);
        }
        match &self.edge {
            Some((slot_symbol, target)) if slot_symbol == symbol => slice::from_ref(target),
            _ => &[],
        }
    }

    fn put(&mut self, symbol: S, target: StateId) {
        if self.edge.is_none() && self.transitions.is_none() {
            self.edge = Some((symbol, target));
            return;
        }

        // Second edge: move the slot entry into a freshly allocated map.
        let map = self.transitions.get_or_insert_with(MultiMap::new);
        if let Some((slot_symbol, slot_target)) = self.edge.take() {
            map.put(slot_symbol, slot_target);
        }
        map.put(symbol, target);
    }
}

impl<S: fmt::Debug, V: fmt::Debug> fmt::Debug for State<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("edge", &self.edge)
            .field("transitions", &self.transitions)
            .field("predicates", &self.predicates.len())
            .field("epsilons", &self.epsilons)
            .field("accept", &self.accept)
            .finish()
    }
}

/// A non-deterministic finite automaton under construction.
///
/// The machine owns its states in an arena; [`StateId`] handles stay valid
/// for the machine's lifetime. All mutation goes through `&mut self`, so a
/// finished machine shared behind `&` is effectively immutable.
pub struct Nfa<S, V> {
    states: Vec<State<S, V>>,
    next_accept_index: u32,
}

impl<S, V> Nfa<S, V> {
    /// A machine holding only the non-accepting start state, id 0.
    pub fn new() -> Self {
        let mut machine = Self {
            states: Vec::new(),
            next_accept_index: 0,
        };
        machine.alloc();
        machine
    }

    /// The start state handle. Always id 0.
    pub fn start(&self) -> StateId {
        0
    }

    /// Dereference a state handle.
    ///
    /// Panics when `id` did not come from this machine.
    pub fn state(&self, id: StateId) -> &State<S, V> {
        &self.states[id as usize]
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Allocate a fresh, unconnected, non-accepting state.
    pub fn new_state(&mut self) -> StateId {
        self.alloc()
    }

    /// Allocate a new state and connect it from `from` by epsilon.
    pub fn add_epsilon(&mut self, from: StateId) -> StateId {
        let target = self.alloc();
        self.connect_epsilon(from, target);
        target
    }

    /// Allocate a new accepting state carrying `value` and connect it from
    /// `from` by epsilon.
    ///
    /// Acceptance ranks are assigned in call order: states marked earlier win
    /// when subset construction merges overlapping acceptance.
    pub fn add_accepting_epsilon(&mut self, from: StateId, value: V) -> StateId {
        let target = self.alloc();
        self.mark_accepting(target, value);
        self.connect_epsilon(from, target);
        target
    }

    /// Attach a predicate-guarded transition from `from` to `to`.
    pub fn add_predicate(&mut self, from: StateId, to: StateId, predicate: SymbolPredicate<S>) {
        self.states[from as usize].predicates.push((predicate, to));
    }

    /// Connect two existing states by epsilon.
    pub fn connect_epsilon(&mut self, from: StateId, to: StateId) {
        self.states[from as usize].epsilons.push(to);
    }

    fn alloc(&mut self) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(State::new(id));
        id
    }

    fn mark_accepting(&mut self, id: StateId, value: V) {
        let index = self.next_accept_index;
        self.next_accept_index += 1;

        let state = &mut self.states[id as usize];
        debug_assert!(state.accept.is_none(), "state {id} is already accepting");
        state.accept = Some((index, value));
    }
}

impl<S: Eq + Hash, V> Nfa<S, V> {
    /// Allocate a new state and connect it from `from` on `symbol`.
    pub fn add(&mut self, from: StateId, symbol: S) -> StateId {
        let target = self.alloc();
        self.states[from as usize].put(symbol, target);
        target
    }
}

impl<S, V> Default for Nfa<S, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_machine_has_non_accepting_start() {
        let machine: Nfa<char, u8> = Nfa::new();
        let start = machine.state(machine.start());

        assert_eq!(machine.num_states(), 1);
        assert_eq!(start.id(), 0);
        assert!(!start.is_accepting());
        assert_eq!(start.accept_index(), None);
        assert_eq!(start.accept_value(), 0);
        assert!(start.epsilon().is_empty());
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut machine: Nfa<char, u8> = Nfa::new();
        let start = machine.start();

        let first = machine.add(start, 'a');
        let second = machine.add(first, 'b');

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(machine.num_states(), 3);
    }

    #[test]
    fn test_outgoing_for_survives_slot_promotion() {
        let mut machine: Nfa<char, u8> = Nfa::new();
        let start = machine.start();

        let first = machine.add(start, 'a');
        assert_eq!(machine.state(start).outgoing_for(&'a'), &[first]);

        // A second transition on the same symbol forces the map representation.
        let second = machine.add(start, 'a');
        assert_eq!(machine.state(start).outgoing_for(&'a'), &[first, second]);
        assert_eq!(machine.state(start).outgoing_for(&'b'), &[] as &[StateId]);
    }

    #[test]
    fn test_outgoing_for_unknown_symbol_is_empty() {
        let mut machine: Nfa<char, u8> = Nfa::new();
        let start = machine.start();
        machine.add(start, 'a');

        assert!(machine.state(start).outgoing_for(&'z').is_empty());
        assert!(machine.state(machine.start()).outgoing_for(&'a').len() == 1);
    }

    #[test]
    fn test_outgoing_symbols_are_deduplicated() {
        let mut machine: Nfa<char, u8> = Nfa::new();
        let start = machine.start();
        machine.add(start, 'a');
        machine.add(start, 'a');
        machine.add(start, 'b');

        let mut symbols: Vec<char> = machine.state(start).outgoing_symbols().copied().collect();
        symbols.sort_unstable();

        assert_eq!(symbols, vec!['a', 'b']);
    }

    #[test]
    fn test_add_epsilon_creates_and_connects() {
        let mut machine: Nfa<char, u8> = Nfa::new();
        let start = machine.start();

        let target = machine.add_epsilon(start);

        assert_eq!(machine.state(start).epsilon(), &[target]);
        assert!(!machine.state(target).is_accepting());
    }

    #[test]
    fn test_connect_epsilon_links_existing_states() {
        let mut machine: Nfa<char, u8> = Nfa::new();
        let start = machine.start();
        let lone = machine.new_state();

        machine.connect_epsilon(lone, start);

        assert_eq!(machine.state(lone).epsilon(), &[start]);
    }

    #[test]
    fn test_accepting_epsilon_assigns_increasing_ranks() {
        let mut machine: Nfa<char, &str> = Nfa::new();
        let start = machine.start();

        let winner = machine.add_accepting_epsilon(start, "first");
        let runner_up = machine.add_accepting_epsilon(start, "second");

        assert_eq!(machine.state(winner).accept_index(), Some(0));
        assert_eq!(machine.state(runner_up).accept_index(), Some(1));
        assert_eq!(machine.state(winner).accept_value(), "first");
        assert_eq!(machine.state(runner_up).accept_value(), "second");
        assert_eq!(machine.state(start).epsilon(), &[winner, runner_up]);
    }

    #[test]
    fn test_accept_value_defaults_when_not_accepting() {
        let machine: Nfa<char, String> = Nfa::new();

        assert_eq!(machine.state(machine.start()).accept_value(), String::new());
    }

    #[test]
    fn test_predicate_transition_is_stored() {
        let mut machine: Nfa<char, u8> = Nfa::new();
        let start = machine.start();
        let digits = machine.new_state();

        machine.add_predicate(start, digits, Rc::new(|symbol: &char| symbol.is_ascii_digit()));

        let predicates = machine.state(start).predicates();
        assert_eq!(predicates.len(), 1);

        let (predicate, target) = &predicates[0];
        assert_eq!(*target, digits);
        assert!(predicate(&'7'));
        assert!(!predicate(&'x'));
    }
}
