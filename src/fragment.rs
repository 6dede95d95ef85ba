//! Composable grammar fragments that compile themselves into an [`Nfa`].

use crate::nfa::{Nfa, SymbolPredicate};
use crate::state::StateId;
use std::hash::Hash;
use std::rc::Rc;

/// A reusable description of a sub-pattern.
///
/// Fragments are immutable values. [`Fragment::build`] welds a fresh copy of
/// the described sub-graph into a machine at a given anchor state and returns
/// the exit state reached after matching the fragment; the same fragment may
/// be built any number of times, into any number of machines.
#[derive(Clone)]
pub struct Fragment<S> {
    kind: Kind<S>,
}

#[derive(Clone)]
enum Kind<S> {
    Literal(Vec<S>),
    Sequence(Vec<Fragment<S>>),
    AnyOf(Vec<Fragment<S>>),
    Repeat {
        min: usize,
        max: Option<usize>,
        body: Box<Fragment<S>>,
    },
    SymbolSet(SymbolPredicate<S>),
}

impl<S> Fragment<S> {
    /// A fragment matching the exact, ordered sequence of symbols.
    ///
    /// Panics when `symbols` is empty.
    pub fn literal<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        let symbols: Vec<S> = symbols.into_iter().collect();
        assert!(
            !symbols.is_empty(),
            "literal fragment requires at least one symbol"
        );

        Self {
            kind: Kind::Literal(symbols),
        }
    }

    /// A fragment matching `fragments` one after another. An empty sequence
    /// matches the empty input.
    pub fn sequence(fragments: Vec<Fragment<S>>) -> Self {
        Self {
            kind: Kind::Sequence(fragments),
        }
    }

    /// A fragment matching any single one of `fragments`.
    ///
    /// Panics when fewer than two branches are given.
    pub fn any_of(fragments: Vec<Fragment<S>>) -> Self {
        assert!(
            fragments.len() >= 2,
            "any_of fragment requires at least two branches"
        );

        Self {
            kind: Kind::AnyOf(fragments),
        }
    }

    /// A fragment matching `body` at least `min` times, with no upper bound.
    pub fn repeat_at_least(min: usize, body: Fragment<S>) -> Self {
        Self {
            kind: Kind::Repeat {
                min,
                max: None,
                body: Box::new(body),
            },
        }
    }

    /// A fragment matching `body` between `min` and `max` times, inclusive.
    ///
    /// Panics when `max < min`.
    pub fn repeat_between(min: usize, max: usize, body: Fragment<S>) -> Self {
        assert!(min <= max, "repeat_between requires min <= max");

        Self {
            kind: Kind::Repeat {
                min,
                max: Some(max),
                body: Box::new(body),
            },
        }
    }

    /// A fragment matching any single symbol `predicate` maps to `true`.
    pub fn symbol_set<F>(predicate: F) -> Self
    where
        F: Fn(&S) -> bool + 'static,
    {
        Self {
            kind: Kind::SymbolSet(Rc::new(predicate)),
        }
    }
}

impl<S: Clone + Eq + Hash> Fragment<S> {
    /// Append this fragment to `machine` starting at `start` and return the
    /// state reached after matching it.
    pub fn build<V>(&self, machine: &mut Nfa<S, V>, start: StateId) -> StateId {
        match &self.kind {
            Kind::Literal(symbols) => {
                let mut current = start;
                for symbol in symbols {
                    current = machine.add(current, symbol.clone());
                }
                current
            }
            Kind::Sequence(fragments) => {
                let mut current = start;
                for fragment in fragments {
                    current = fragment.build(machine, current);
                }
                current
            }
            Kind::AnyOf(fragments) => {
                // Thompson alternation: every branch gets its own
                // epsilon-entered anchor so branches cannot share a prefix,
                // and every branch exit funnels into one common exit.
                let exit = machine.new_state();
                for fragment in fragments {
                    let entry = machine.add_epsilon(start);
                    let branch_exit = fragment.build(machine, entry);
                    machine.connect_epsilon(branch_exit, exit);
                }
                exit
            }
            Kind::Repeat { min, max, body } => build_repeat(machine, start, *min, *max, body),
            Kind::SymbolSet(predicate) => {
                let exit = machine.new_state();
                machine.add_predicate(start, exit, Rc::clone(predicate));
                exit
            }
        }
    }
}

fn build_repeat<S: Clone + Eq + Hash, V>(
    machine: &mut Nfa<S, V>,
    start: StateId,
    min: usize,
    max: Option<usize>,
    body: &Fragment<S>,
) -> StateId {
    let mut current = start;
    for _ in 0..min {
        current = body.build(machine, current);
    }

    let exit = machine.new_state();
    machine.connect_epsilon(current, exit);

    match max {
        // Kleene tail: one optional body that loops onto itself.
        None => {
            let body_start = machine.add_epsilon(current);
            let body_exit = body.build(machine, body_start);
            machine.connect_epsilon(body_exit, body_start);
            machine.connect_epsilon(body_exit, exit);
        }
        // Bounded tail: max - min optional bodies threaded one after another,
        // each with its own escape to the exit.
        Some(max) => {
            for _ in 0..max - min {
                let optional_start = machine.add_epsilon(current);
                let optional_exit = body.build(machine, optional_start);
                machine.connect_epsilon(optional_exit, exit);
                current = optional_exit;
            }
        }
    }

    exit
}
