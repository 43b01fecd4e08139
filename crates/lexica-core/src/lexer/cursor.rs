use super::dfa::{Accept, Dfa, StateId, ERROR_STATE};

/// A position in a [`Dfa`], advanced one code point at a time.
///
/// Cursors are cheap: each scan owns its own, and any number of them can run
/// over the same table.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    dfa: &'a Dfa,
    state: StateId,
}

impl<'a> Cursor<'a> {
    pub fn new(dfa: &'a Dfa) -> Self {
        Self {
            dfa,
            state: dfa.initial(),
        }
    }

    /// Follows the transition for `c`. Code points without an explicit
    /// transition take the state's default transition.
    pub fn advance(&mut self, c: char) {
        self.state = self.dfa.transition(self.state, c);
    }

    /// Returns to the initial state.
    pub fn reset(&mut self) {
        self.state = self.dfa.initial();
    }

    pub fn current_accept(&self) -> Option<&'a Accept> {
        self.dfa.accept(self.state)
    }

    /// Once in the error state, the cursor stays there until [`Cursor::reset`].
    pub fn is_in_error_state(&self) -> bool {
        self.state == ERROR_STATE
    }

    pub fn state(&self) -> StateId {
        self.state
    }
}
