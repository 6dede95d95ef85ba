//! Subset construction: projecting an [`Nfa`] onto an equivalent [`Dfa`].
//!
//! The classical Rabin-Scott powerset construction with two refinements the
//! rest of the crate depends on: epsilon transitions are collapsed through
//! closure computation, and acceptance metadata is merged by rank so the
//! resulting DFA resolves overlapping patterns the same way the NFA's author
//! intended.

use crate::dfa::Dfa;
use crate::nfa::Nfa;
use crate::state::{StateId, StateSet};
use indexmap::{IndexMap, IndexSet};
use log::trace;
use std::collections::VecDeque;
use std::fmt::Write;
use std::hash::Hash;

/// Build a [`Dfa`] equivalent to `nfa`.
///
/// Worklist-driven: each reachable subset of NFA states is materialized as
/// one DFA state and expanded exactly once. Predicate transitions are not
/// expanded; only concrete-symbol transitions project into the result.
pub(crate) fn convert<S, V>(nfa: &Nfa<S, V>) -> Dfa<S, V>
where
    S: Clone + Eq + Hash,
    V: Clone,
{
    let mut dfa = Dfa::empty();
    let mut state_for_key: IndexMap<String, StateId> = IndexMap::new();
    let mut worklist: VecDeque<(StateId, StateSet)> = VecDeque::new();

    let seed = StateSet::singleton(nfa.start(), nfa.num_states());
    let start_subset = epsilon_closure(nfa, &seed);
    trace!(
        "subset construction over {} nfa states, start subset {{{}}}",
        nfa.num_states(),
        subset_key(&start_subset)
    );

    let start = dfa.add_state(merged_acceptance(nfa, &start_subset));
    state_for_key.insert(subset_key(&start_subset), start);
    worklist.push_back((start, start_subset));

    while let Some((from, subset)) = worklist.pop_front() {
        for symbol in subset_alphabet(nfa, &subset) {
            let targets = move_on_symbol(nfa, &subset, symbol);
            if targets.is_empty() {
                continue;
            }

            let next_subset = epsilon_closure(nfa, &targets);
            let key = subset_key(&next_subset);
            let to = match state_for_key.get(key.as_str()) {
                Some(&known) => known,
                None => {
                    let id = dfa.add_state(merged_acceptance(nfa, &next_subset));
                    trace!("dfa state {id} materializes nfa subset {{{key}}}");
                    state_for_key.insert(key, id);
                    worklist.push_back((id, next_subset));
                    id
                }
            };

            dfa.add_transition(from, symbol.clone(), to);
        }
    }

    dfa
}

/// Every NFA state reachable from `seed` through zero or more epsilon hops.
///
/// Breadth-first over the epsilon edges; the visited set makes epsilon
/// cycles terminate.
fn epsilon_closure<S, V>(nfa: &Nfa<S, V>, seed: &StateSet) -> StateSet {
    let mut closure = StateSet::with_capacity(nfa.num_states());
    let mut pending: VecDeque<StateId> = seed.iter().collect();

    while let Some(id) = pending.pop_front() {
        if closure.contains(id) {
            continue;
        }
        closure.insert(id);

        for &target in nfa.state(id).epsilon() {
            if !closure.contains(target) {
                pending.push_back(target);
            }
        }
    }

    closure
}

/// The union of concrete-symbol targets on `symbol` across `subset`.
fn move_on_symbol<S, V>(nfa: &Nfa<S, V>, subset: &StateSet, symbol: &S) -> StateSet
where
    S: Eq + Hash,
{
    let mut targets = StateSet::with_capacity(nfa.num_states());
    for id in subset.iter() {
        for &target in nfa.state(id).outgoing_for(symbol) {
            targets.insert(target);
        }
    }

    targets
}

/// The union of outgoing concrete symbols across `subset`, deduplicated, in
/// first-seen order.
fn subset_alphabet<'n, S, V>(nfa: &'n Nfa<S, V>, subset: &StateSet) -> IndexSet<&'n S>
where
    S: Eq + Hash,
{
    let mut alphabet = IndexSet::new();
    for id in subset.iter() {
        for symbol in nfa.state(id).outgoing_symbols() {
            alphabet.insert(symbol);
        }
    }

    alphabet
}

/// The canonical identity of a subset: distinct state ids, ascending,
/// comma-joined. Two subsets produce the same key iff they contain the same
/// ids, regardless of traversal order.
fn subset_key(subset: &StateSet) -> String {
    let mut key = String::new();
    for (position, id) in subset.iter().enumerate() {
        if position > 0 {
            key.push(',');
        }
        let _ = write!(key, "{id}");
    }

    key
}

/// The rank and value of the lowest-ranked accepting state in `subset`, if
/// any. Ranks are unique per machine, so no tie-breaking is needed.
fn merged_acceptance<S, V>(nfa: &Nfa<S, V>, subset: &StateSet) -> Option<(u32, V)>
where
    V: Clone,
{
    let mut best: Option<(u32, &V)> = None;
    for id in subset.iter() {
        if let Some((index, value)) = nfa.state(id).ranked_accept() {
            if best.map_or(true, |(best_index, _)| index < best_index) {
                best = Some((index, value));
            }
        }
    }

    best.map(|(index, value)| (index, value.clone()))
}
