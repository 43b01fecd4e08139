/// How accepting states report the patterns they accept.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Every accepting state has exactly one winning pattern.
    #[default]
    Unambiguous,
    /// Accepting states report every maximum-precedence pattern, in
    /// declaration order.
    Ambiguous,
}

/// What to do when two patterns of equal precedence accept the same input in
/// [`Mode::Unambiguous`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum TieBreak {
    /// Fail construction with an [`AmbiguityError`](super::error::AmbiguityError).
    #[default]
    Fail,
    /// Pick the pattern that was declared first.
    FirstDeclared,
}

#[derive(Debug, Default, Clone)]
pub struct BuildConfig {
    mode: Mode,
    tie_break: TieBreak,
}

impl BuildConfig {
    pub fn set_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn set_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }
}
