use super::pattern::PatternId;

/// A malformed regular expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at offset {offset}: {kind}")]
pub struct SyntaxError {
    /// offset, in characters, of the offending input
    offset: usize,
    kind: SyntaxErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxErrorKind {
    #[error("unbalanced group")]
    UnbalancedGroup,
    #[error("quantifier `{0}` does not follow an atom")]
    DanglingQuantifier(char),
    #[error("unterminated character set")]
    UnterminatedSet,
    #[error("unterminated escape sequence")]
    UnterminatedEscape,
    #[error("unrecognized escape sequence `\\{0}`")]
    UnrecognizedEscape(char),
    #[error("invalid code point escape")]
    InvalidCodePoint,
    #[error("invalid range `{start}-{end}`")]
    InvalidRange { start: char, end: char },
    #[error("unexpected `{0}`")]
    UnexpectedChar(char),
    #[error("expected an atom")]
    ExpectedAtom,
}

impl SyntaxError {
    pub fn new(offset: usize, kind: SyntaxErrorKind) -> Self {
        Self { offset, kind }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn kind(&self) -> &SyntaxErrorKind {
        &self.kind
    }
}

/// Two patterns of equal precedence accept the same input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("patterns {first} `{first_source}` and {second} `{second_source}` have the same precedence and both match {witness:?}")]
pub struct AmbiguityError {
    witness: String,
    first: PatternId,
    first_source: String,
    second: PatternId,
    second_source: String,
}

impl AmbiguityError {
    pub(crate) fn new(
        witness: String,
        (first, first_source): (PatternId, &str),
        (second, second_source): (PatternId, &str),
    ) -> Self {
        Self {
            witness,
            first,
            first_source: first_source.to_owned(),
            second,
            second_source: second_source.to_owned(),
        }
    }

    /// Shortest input accepted by both patterns.
    pub fn witness(&self) -> &str {
        &self.witness
    }

    /// The conflicting patterns, in declaration order.
    pub fn patterns(&self) -> (PatternId, PatternId) {
        (self.first, self.second)
    }
}

/// Errors raised while constructing a scanner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("invalid pattern {pattern}: {source}")]
    Syntax {
        pattern: PatternId,
        #[source]
        source: SyntaxError,
    },
    #[error("duplicate pattern: {duplicate} is the same as {first}")]
    DuplicatePattern {
        first: PatternId,
        duplicate: PatternId,
    },
    #[error(transparent)]
    Ambiguity(#[from] AmbiguityError),
    #[error("invalid automaton table at state {state}: {reason}")]
    InvalidTable { state: usize, reason: &'static str },
}

/// No pattern matches the input at some offset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("scan error at offset {loc}: {kind}")]
pub struct ScanError {
    /// offset in the source of the tokenizer error, in characters
    loc: usize,
    kind: ScanErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanErrorKind {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("recovery produced unknown pattern {0}")]
    UnknownPattern(PatternId),
}

impl ScanError {
    pub fn new(loc: usize, kind: ScanErrorKind) -> Self {
        Self { loc, kind }
    }

    pub fn offset(&self) -> usize {
        self.loc
    }

    pub fn kind(&self) -> &ScanErrorKind {
        &self.kind
    }
}
