use std::collections::BTreeSet;

use super::alphabet::ClassSet;
use super::pattern::PatternId;

pub type StateId = usize;

#[derive(Debug)]
pub enum State {
    Range { class: ClassSet, target: StateId },
    Goto { target: StateId },
    Split { targets: Vec<StateId> },
    Match { pattern: PatternId },
}

/// The states compiled from one pattern. `accept` is the only `Match` state
/// reachable from `start`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub start: StateId,
    pub accept: StateId,
    pub pattern: PatternId,
}

#[derive(Debug, Default)]
pub struct Builder {
    transitions: Vec<State>,
    fragments: Vec<Fragment>,
}

impl Builder {
    pub(crate) fn push(&mut self, state: State) -> StateId {
        let state_id = self.transitions.len();
        self.transitions.push(state);
        state_id
    }

    pub(crate) fn add_fragment(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub(crate) fn build(self, initial: StateId) -> Nfa {
        Nfa {
            transitions: self.transitions,
            fragments: self.fragments,
            initial,
        }
    }

    pub(crate) fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.transitions[id]
    }
}

#[derive(Debug)]
pub struct Nfa {
    initial: StateId,
    transitions: Vec<State>,
    fragments: Vec<Fragment>,
}

impl Nfa {
    /// Returns the epsilon-closure for the set of NFA states, that is the states that can be
    /// reached from init without consuming any input.
    pub(crate) fn epsilon_closure(
        &self,
        init: impl IntoIterator<Item = StateId>,
    ) -> BTreeSet<StateId> {
        let mut out = BTreeSet::from_iter(init);
        let mut workset = Vec::from_iter(out.iter().copied());
        while let Some(id) = workset.pop() {
            match &self.transitions[id] {
                State::Goto { target } => {
                    if out.insert(*target) {
                        workset.push(*target);
                    }
                }
                State::Split { targets } => {
                    for &id in targets {
                        if out.insert(id) {
                            workset.push(id);
                        }
                    }
                }
                _ => (),
            }
        }

        out
    }

    /// Returns the consuming transitions leaving the states of `s`.
    pub(crate) fn outgoing<'a>(
        &'a self,
        s: &'a BTreeSet<StateId>,
    ) -> impl Iterator<Item = (&'a ClassSet, StateId)> + 'a {
        s.iter().filter_map(|&id| match &self.transitions[id] {
            State::Range { class, target } if !class.is_empty() => Some((class, *target)),
            _ => None,
        })
    }

    /// Follows every transition of `outgoing` that accepts `c`, then closes
    /// the result over epsilon edges.
    pub(crate) fn step(&self, outgoing: &[(&ClassSet, StateId)], c: u32) -> BTreeSet<StateId> {
        self.epsilon_closure(
            outgoing
                .iter()
                .filter(|(class, _)| class.contains(c))
                .map(|&(_, target)| target),
        )
    }

    /// Whether `s` can still consume input or accept. Subsets that cannot are
    /// equivalent to the empty set.
    pub(crate) fn is_live(&self, s: &BTreeSet<StateId>) -> bool {
        s.iter().any(|&id| match &self.transitions[id] {
            State::Match { .. } => true,
            State::Range { class, .. } => !class.is_empty(),
            _ => false,
        })
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// Returns whether the passed state is a match state
    pub(crate) fn is_match(&self, state: StateId) -> Option<PatternId> {
        match self.transitions[state] {
            State::Match { pattern } => Some(pattern),
            _ => None,
        }
    }

    pub(crate) fn fragment(&self, pattern: PatternId) -> &Fragment {
        &self.fragments[pattern.as_usize()]
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }
}
