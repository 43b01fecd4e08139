use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;

use super::alphabet::{partition, DOMAIN_SIZE, MAX_CODE_POINT};
use super::ambiguity::find_witness;
use super::config::{BuildConfig, Mode, TieBreak};
use super::dfa::{Accept, Dfa, DfaState, StateId, Transition, ERROR_STATE};
use super::error::AmbiguityError;
use super::nfa::{self, Nfa};
use super::pattern::{Pattern, PatternId};

type Subset = Rc<BTreeSet<nfa::StateId>>;

/// Subset construction over an NFA whose initial state leads to one fragment
/// per pattern.
pub(crate) struct Builder<'a, P> {
    nfa: &'a Nfa,
    patterns: &'a [Pattern<P>],
    config: &'a BuildConfig,
    dstates: HashMap<Subset, StateId>,
    states: Vec<DfaState>,
    workset: VecDeque<(StateId, Subset)>,
    /// equal-precedence pairs the analyzer found no common input for
    unambiguous_pairs: HashSet<(PatternId, PatternId)>,
}

impl<'a, P> Builder<'a, P> {
    pub(crate) fn new(nfa: &'a Nfa, patterns: &'a [Pattern<P>], config: &'a BuildConfig) -> Self {
        Self {
            nfa,
            patterns,
            config,
            dstates: HashMap::new(),
            states: vec![DfaState::error()],
            workset: VecDeque::new(),
            unambiguous_pairs: HashSet::new(),
        }
    }

    pub(crate) fn build(mut self) -> Result<Dfa, AmbiguityError> {
        let q0 = Rc::new(self.nfa.epsilon_closure([self.nfa.initial()]));
        let initial = self.intern(q0)?;

        while let Some((from, q)) = self.workset.pop_front() {
            log::trace!("exploring DFA state {from} ({} NFA states)", q.len());
            let (transitions, default) = self.transitions(&q)?;
            let state = &mut self.states[from];
            state.transitions = transitions.into();
            state.default = default;
        }

        Ok(Dfa::new(self.states, initial, self.patterns.len()))
    }

    /// Returns the DFA state for `q`, allocating and scheduling it when the
    /// subset is new. Dead subsets map to the error state.
    fn intern(&mut self, q: Subset) -> Result<StateId, AmbiguityError> {
        if !self.nfa.is_live(&q) {
            return Ok(ERROR_STATE);
        }
        if let Some(&id) = self.dstates.get(&q) {
            return Ok(id);
        }

        let accept = self.resolve_accept(&q)?;
        let id = self.states.len();
        self.states.push(DfaState::new(Vec::new(), ERROR_STATE, accept));
        self.dstates.insert(q.clone(), id);
        self.workset.push_back((id, q));

        Ok(id)
    }

    /// Computes the compacted transition list and default transition of `q`.
    fn transitions(&mut self, q: &Subset) -> Result<(Vec<Transition>, StateId), AmbiguityError> {
        let nfa = self.nfa;
        let outgoing = nfa.outgoing(q).collect::<Vec<_>>();
        let cells = partition(outgoing.iter().flat_map(|(class, _)| class.ranges()));

        // adjacent cells with the same successor are merged
        let mut runs: Vec<Transition> = Vec::new();
        for cell in cells {
            let target = self.intern(Rc::new(nfa.step(&outgoing, cell.start())))?;
            if target == ERROR_STATE {
                continue;
            }
            match runs.last_mut() {
                Some(last) if last.target() == target && last.end() + 1 == cell.start() => {
                    *last = Transition::new(last.start(), cell.end(), target);
                }
                _ => runs.push(Transition::new(cell.start(), cell.end(), target)),
            }
        }

        let default = select_default(&runs);
        if default == ERROR_STATE {
            return Ok((runs, ERROR_STATE));
        }

        // the default now covers the largest successor, so the gaps that led
        // to the error state have to be spelled out
        let mut out = Vec::new();
        let mut next = 0u32;
        for run in runs {
            if run.start() > next {
                out.push(Transition::new(next, run.start() - 1, ERROR_STATE));
            }
            next = run.end() + 1;
            if run.target() != default {
                out.push(run);
            }
        }
        if next <= MAX_CODE_POINT {
            out.push(Transition::new(next, MAX_CODE_POINT, ERROR_STATE));
        }

        Ok((out, default))
    }

    fn resolve_accept(&mut self, q: &Subset) -> Result<Option<Accept>, AmbiguityError> {
        let matches = q
            .iter()
            .filter_map(|&s| self.nfa.is_match(s))
            .collect::<BTreeSet<_>>();
        let Some(top) = matches.iter().map(|id| self.precedence(*id)).max() else {
            return Ok(None);
        };
        let winners = matches
            .into_iter()
            .filter(|id| self.precedence(*id) == top)
            .collect::<Vec<_>>();

        if self.config.mode() == Mode::Ambiguous {
            return Ok(Some(Accept::Set(winners.into())));
        }

        match winners.as_slice() {
            [winner] => Ok(Some(Accept::Single(*winner))),
            _ => self.break_tie(&winners).map(|id| Some(Accept::Single(id))),
        }
    }

    /// Picks the winner among equal-precedence patterns accepting the same
    /// subset, in declaration order.
    fn break_tie(&mut self, winners: &[PatternId]) -> Result<PatternId, AmbiguityError> {
        let first = winners[0];
        if self.config.tie_break() == TieBreak::FirstDeclared {
            log::debug!("patterns {winners:?} overlap, picking {first}");
            return Ok(first);
        }

        for (i, &a) in winners.iter().enumerate() {
            for &b in &winners[i + 1..] {
                if self.unambiguous_pairs.contains(&(a, b)) {
                    continue;
                }
                let witness = find_witness(self.nfa, self.nfa.fragment(a), self.nfa.fragment(b));
                match witness {
                    Some(witness) => {
                        return Err(AmbiguityError::new(
                            String::from_iter(witness),
                            (a, self.pattern(a).source()),
                            (b, self.pattern(b).source()),
                        ))
                    }
                    None => {
                        self.unambiguous_pairs.insert((a, b));
                    }
                }
            }
        }

        log::warn!("patterns {winners:?} share an accepting state without a common input, picking {first}");
        Ok(first)
    }

    fn pattern(&self, id: PatternId) -> &Pattern<P> {
        &self.patterns[id.as_usize()]
    }

    fn precedence(&self, id: PatternId) -> u32 {
        self.pattern(id).precedence()
    }
}

/// The successor covering the most code points, or the error state when the
/// code points without a successor are at least as many.
fn select_default(runs: &[Transition]) -> StateId {
    let mut weights: BTreeMap<StateId, u64> = BTreeMap::new();
    for run in runs {
        *weights.entry(run.target()).or_default() += run.range().width();
    }

    let covered: u64 = weights.values().sum();
    let mut best = (ERROR_STATE, DOMAIN_SIZE - covered);
    for (target, weight) in weights {
        if weight > best.1 {
            best = (target, weight);
        }
    }

    best.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_prefers_the_error_state_on_ties() {
        let half = (MAX_CODE_POINT + 1) / 2;
        let runs = [Transition::new(0, half - 1, 3)];
        assert_eq!(select_default(&runs), ERROR_STATE);

        let runs = [Transition::new(0, half, 3)];
        assert_eq!(select_default(&runs), 3);

        let runs = [
            Transition::new(0, 9, 2),
            Transition::new(10, MAX_CODE_POINT, 5),
        ];
        assert_eq!(select_default(&runs), 5);
    }
}
