use std::fmt;

use super::alphabet::{CodeRange, MAX_CODE_POINT};
use super::cursor::Cursor;
use super::error::BuildError;
use super::pattern::PatternId;
use super::scan::{self, AllMatches, Match, NoRecovery, Recover, Tokens};

pub type StateId = usize;

/// The error state: no accept, every input loops back to it.
pub const ERROR_STATE: StateId = 0;

/// The patterns an accepting state accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Accept {
    /// The winner of an unambiguous table.
    Single(PatternId),
    /// Every maximum-precedence pattern, in declaration order. Never empty.
    Set(Box<[PatternId]>),
}

impl Accept {
    pub fn patterns(&self) -> &[PatternId] {
        match self {
            Accept::Single(id) => std::slice::from_ref(id),
            Accept::Set(ids) => ids,
        }
    }

    /// The winning pattern: the single one, or the first of the set.
    pub fn pattern(&self) -> PatternId {
        self.patterns()[0]
    }
}

/// Transition on every code point in `start..=end`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    start: u32,
    end: u32,
    target: StateId,
}

impl Transition {
    pub fn new(start: u32, end: u32, target: StateId) -> Self {
        Self { start, end, target }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn target(&self) -> StateId {
        self.target
    }

    pub fn range(&self) -> CodeRange {
        CodeRange::new(self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DfaState {
    /// sorted by `start`, disjoint, and never targeting `default`
    pub(super) transitions: Box<[Transition]>,
    pub(super) default: StateId,
    pub(super) accept: Option<Accept>,
}

impl DfaState {
    pub fn new(transitions: Vec<Transition>, default: StateId, accept: Option<Accept>) -> Self {
        Self {
            transitions: transitions.into(),
            default,
            accept,
        }
    }

    pub(super) fn error() -> Self {
        Self::new(Vec::new(), ERROR_STATE, None)
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn default_transition(&self) -> StateId {
        self.default
    }

    pub fn accept(&self) -> Option<&Accept> {
        self.accept.as_ref()
    }

    fn next(&self, c: u32) -> StateId {
        let idx = self.transitions.partition_point(|t| t.end < c);
        match self.transitions.get(idx) {
            Some(t) if t.start <= c => t.target,
            _ => self.default,
        }
    }
}

/// The shape of a [`Dfa`] as exchanged with code generators and persistence
/// layers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DfaParts {
    pub states: Vec<DfaState>,
    pub initial: StateId,
    /// number of patterns the table was built from; accepts name ids below it
    pub pattern_count: usize,
}

/// An immutable scanning automaton over code points.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "DfaParts", into = "DfaParts")
)]
pub struct Dfa {
    initial: StateId,
    states: Vec<DfaState>,
    /// `ids[i] == PatternId(i)`, to hand out single-pattern slices
    ids: Box<[PatternId]>,
}

impl Dfa {
    /// `states[ERROR_STATE]` must be the error state.
    pub(super) fn new(states: Vec<DfaState>, initial: StateId, pattern_count: usize) -> Self {
        debug_assert!(states[ERROR_STATE] == DfaState::error());
        Self {
            initial,
            states,
            ids: pattern_ids(pattern_count),
        }
    }

    /// Rebuilds a table from its parts, checking every table invariant.
    pub fn from_parts(parts: DfaParts) -> Result<Self, BuildError> {
        let DfaParts {
            states,
            initial,
            pattern_count,
        } = parts;
        let invalid = |state, reason| Err(BuildError::InvalidTable { state, reason });

        match states.get(ERROR_STATE) {
            None => return invalid(ERROR_STATE, "missing error state"),
            Some(s) if *s != DfaState::error() => {
                return invalid(ERROR_STATE, "error state must loop and not accept")
            }
            Some(_) => (),
        }
        if initial >= states.len() {
            return invalid(initial, "initial state out of bounds");
        }
        if u32::try_from(pattern_count).is_err() {
            return invalid(ERROR_STATE, "too many patterns");
        }

        for (id, state) in states.iter().enumerate() {
            if state.default >= states.len() {
                return invalid(id, "default transition out of bounds");
            }
            if let Some(accept) = &state.accept {
                let ids = accept.patterns();
                if ids.is_empty() {
                    return invalid(id, "empty accept set");
                }
                if ids.windows(2).any(|w| w[0] >= w[1]) {
                    return invalid(id, "accept set is not in declaration order");
                }
                if ids.iter().any(|p| p.as_usize() >= pattern_count) {
                    return invalid(id, "accept names an unknown pattern");
                }
            }

            let mut prev: Option<&Transition> = None;
            for t in state.transitions.iter() {
                if t.start > t.end || t.end > MAX_CODE_POINT {
                    return invalid(id, "malformed transition range");
                }
                if t.target >= states.len() {
                    return invalid(id, "transition target out of bounds");
                }
                if t.target == state.default {
                    return invalid(id, "transition duplicates the default transition");
                }
                if prev.is_some_and(|p| p.end >= t.start) {
                    return invalid(id, "transitions are not sorted and disjoint");
                }
                prev = Some(t);
            }
        }

        Ok(Self::new(states, initial, pattern_count))
    }

    pub fn into_parts(self) -> DfaParts {
        DfaParts {
            pattern_count: self.ids.len(),
            states: self.states,
            initial: self.initial,
        }
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> &DfaState {
        &self.states[id]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.ids.len()
    }

    pub fn transition(&self, from: StateId, c: char) -> StateId {
        self.states[from].next(c as u32)
    }

    pub fn accept(&self, state: StateId) -> Option<&Accept> {
        self.states[state].accept.as_ref()
    }

    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self)
    }

    /// Returns the longest match starting `start` code points into `input`.
    pub fn match_as_prefix<I>(&self, input: I, start: usize) -> Option<Match<'_>>
    where
        I: IntoIterator<Item = char>,
    {
        let (accept, len) = scan::longest_prefix(self, input.into_iter().skip(start))?;
        Some(Match::new(accept.patterns(), start, start + len))
    }

    /// Iterates over the non-overlapping longest matches of `input`, starting
    /// `start` code points in.
    pub fn all_matches<I>(&self, input: I, start: usize) -> AllMatches<'_, I::IntoIter>
    where
        I: IntoIterator<Item = char>,
    {
        AllMatches::new(self, input.into_iter(), start)
    }

    /// Tokenizes the whole of `input`, failing where no pattern matches.
    pub fn tokenize<I>(&self, input: I) -> Tokens<'_, I::IntoIter, NoRecovery>
    where
        I: IntoIterator<Item = char>,
    {
        self.tokenize_with(input, NoRecovery)
    }

    /// Tokenizes the whole of `input`, asking `recover` for a substitute
    /// wherever no pattern matches.
    pub fn tokenize_with<I, R>(&self, input: I, recover: R) -> Tokens<'_, I::IntoIter, R>
    where
        I: IntoIterator<Item = char>,
        R: Recover,
    {
        Tokens::new(self, input.into_iter(), recover)
    }

    pub(super) fn singleton(&self, id: PatternId) -> Option<&[PatternId]> {
        self.ids.get(id.as_usize()).map(std::slice::from_ref)
    }
}

fn pattern_ids(count: usize) -> Box<[PatternId]> {
    (0..count as u32).map(PatternId::new).collect()
}

impl TryFrom<DfaParts> for Dfa {
    type Error = BuildError;

    fn try_from(parts: DfaParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts)
    }
}

impl From<Dfa> for DfaParts {
    fn from(dfa: Dfa) -> Self {
        dfa.into_parts()
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "initial: {}, states: {}", self.initial, self.states.len())?;

        for (id, state) in self.states.iter().enumerate() {
            write!(f, "{id:>5} |")?;
            for t in state.transitions.iter() {
                write!(f, " {} -> {},", t.range(), t.target)?;
            }
            if state.default == ERROR_STATE {
                write!(f, " _ -> _")?;
            } else {
                write!(f, " _ -> {}", state.default)?;
            }
            if let Some(accept) = &state.accept {
                write!(f, " | accept {:?}", accept.patterns())?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
