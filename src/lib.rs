//! Generic finite-automaton construction toolkit.
//!
//! The crate builds non-deterministic finite automata from composable grammar
//! fragments and converts them into deterministic automata that preserve
//! ranked acceptance metadata:
//!
//! - [`Nfa`] is the mutable builder: state allocation, concrete-symbol
//!   transitions with a single-edge fast path, predicate-guarded transitions,
//!   epsilon transitions, and acceptance stamping in priority order.
//! - [`Fragment`] is a closed algebra of sub-pattern descriptors (literal,
//!   sequence, alternation, bounded and unbounded repetition, predicate set)
//!   that weld themselves into a machine at an anchor state.
//! - [`Dfa::from_nfa`] runs the subset construction, collapsing epsilon
//!   closures and resolving overlapping acceptance by the lowest rank.
//!
//! The symbol type is an opaque parameter (`Eq + Hash`, plus `Clone` where
//! symbols are copied into the graph); acceptance values are equally opaque.
//! Higher-level matchers such as lexers and tokenizers are expected to be
//! built on top; the crate itself ships no execution engine.

mod dfa;
mod fragment;
mod mvmap;
mod nfa;
mod state;
mod subset_construction;

pub use dfa::{Dfa, DfaState};
pub use fragment::Fragment;
pub use nfa::{Nfa, State, SymbolPredicate};
pub use state::{StateId, StateSet};
