use std::collections::VecDeque;
use std::iter::Fuse;
use std::num::NonZeroUsize;
use std::ops::Range;

use super::dfa::{Accept, Dfa};
use super::error::{ScanError, ScanErrorKind};
use super::pattern::PatternId;

/// A span of input, in code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'s> {
    patterns: &'s [PatternId],
    span: Span,
}

impl<'s> Match<'s> {
    pub(super) fn new(patterns: &'s [PatternId], start: usize, end: usize) -> Self {
        Self {
            patterns,
            span: Span::new(start, end),
        }
    }

    /// The winning pattern.
    pub fn pattern(&self) -> PatternId {
        self.patterns[0]
    }

    /// Every pattern reported by the accepting state, in declaration order.
    /// Holds a single pattern unless the scanner was built in ambiguous mode.
    pub fn patterns(&self) -> &'s [PatternId] {
        self.patterns
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }
}

/// Runs a fresh cursor over `input` and returns the last accept seen, with
/// the number of code points consumed to reach it.
pub(crate) fn longest_prefix(
    dfa: &Dfa,
    input: impl IntoIterator<Item = char>,
) -> Option<(&Accept, usize)> {
    let mut cursor = dfa.cursor();
    let mut best = None;
    for (i, c) in input.into_iter().enumerate() {
        cursor.advance(c);
        if cursor.is_in_error_state() {
            break;
        }
        if let Some(accept) = cursor.current_accept() {
            best = Some((accept, i + 1));
        }
    }

    best
}

/// Input read ahead of the current offset but not consumed yet.
struct Lookahead<I: Iterator> {
    input: Fuse<I>,
    buffer: VecDeque<char>,
    offset: usize,
}

impl<I: Iterator<Item = char>> Lookahead<I> {
    fn new(input: I, start: usize) -> Self {
        let mut input = input.fuse();
        for _ in 0..start {
            if input.next().is_none() {
                break;
            }
        }

        Self {
            input,
            buffer: VecDeque::new(),
            offset: start,
        }
    }

    fn get(&mut self, i: usize) -> Option<char> {
        while self.buffer.len() <= i {
            self.buffer.push_back(self.input.next()?);
        }
        Some(self.buffer[i])
    }

    fn longest<'d>(&mut self, dfa: &'d Dfa) -> Option<(&'d Accept, usize)> {
        let mut i = 0;
        longest_prefix(
            dfa,
            std::iter::from_fn(|| {
                let c = self.get(i);
                i += 1;
                c
            }),
        )
    }

    /// Consumes up to `n` code points and returns how many were available.
    fn consume(&mut self, n: usize) -> usize {
        if n > 0 {
            self.get(n - 1);
        }
        let n = n.min(self.buffer.len());
        self.buffer.drain(..n);
        self.offset += n;
        n
    }
}

/// Iterator over the non-overlapping longest matches of an input. Offsets
/// where nothing matches are skipped.
pub struct AllMatches<'d, I: Iterator> {
    dfa: &'d Dfa,
    lookahead: Lookahead<I>,
}

impl<'d, I: Iterator<Item = char>> AllMatches<'d, I> {
    pub(super) fn new(dfa: &'d Dfa, input: I, start: usize) -> Self {
        Self {
            dfa,
            lookahead: Lookahead::new(input, start),
        }
    }
}

impl<'d, I: Iterator<Item = char>> Iterator for AllMatches<'d, I> {
    type Item = Match<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let dfa = self.dfa;
        loop {
            let start = self.lookahead.offset;
            match self.lookahead.longest(dfa) {
                Some((accept, len)) => {
                    self.lookahead.consume(len.max(1));
                    return Some(Match::new(accept.patterns(), start, start + len));
                }
                None => {
                    if self.lookahead.consume(1) == 0 {
                        return None;
                    }
                }
            }
        }
    }
}

/// Substitute for a match where no pattern matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recovery {
    pattern: PatternId,
    len: NonZeroUsize,
}

impl Recovery {
    /// Reports `len` code points as a match of `pattern`.
    pub fn new(pattern: PatternId, len: NonZeroUsize) -> Self {
        Self { pattern, len }
    }

    /// Reports the offending code point alone as a match of `pattern`.
    pub fn skip_one(pattern: PatternId) -> Self {
        Self::new(pattern, NonZeroUsize::MIN)
    }
}

/// Called by [`Tokens`] at an offset where no pattern matches.
pub trait Recover {
    /// Returns `None` to stop tokenizing with a [`ScanError`].
    fn recover(&mut self, offset: usize, unexpected: char) -> Option<Recovery>;
}

impl<F> Recover for F
where
    F: FnMut(usize, char) -> Option<Recovery>,
{
    fn recover(&mut self, offset: usize, unexpected: char) -> Option<Recovery> {
        self(offset, unexpected)
    }
}

/// Fails on the first offset where no pattern matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRecovery;

impl Recover for NoRecovery {
    fn recover(&mut self, _: usize, _: char) -> Option<Recovery> {
        None
    }
}

/// Iterator over the tokens of a whole input. Stops after the first error.
pub struct Tokens<'d, I: Iterator, R> {
    dfa: &'d Dfa,
    lookahead: Lookahead<I>,
    recover: R,
    done: bool,
}

impl<'d, I: Iterator<Item = char>, R: Recover> Tokens<'d, I, R> {
    pub(super) fn new(dfa: &'d Dfa, input: I, recover: R) -> Self {
        Self {
            dfa,
            lookahead: Lookahead::new(input, 0),
            recover,
            done: false,
        }
    }

    /// Offset of the next token.
    pub fn offset(&self) -> usize {
        self.lookahead.offset
    }

    fn recover_at(&mut self, start: usize, c: char) -> Result<Match<'d>, ScanError> {
        let Some(recovery) = self.recover.recover(start, c) else {
            return Err(ScanError::new(start, ScanErrorKind::UnexpectedChar(c)));
        };
        let Some(patterns) = self.dfa.singleton(recovery.pattern) else {
            return Err(ScanError::new(
                start,
                ScanErrorKind::UnknownPattern(recovery.pattern),
            ));
        };

        let len = self.lookahead.consume(recovery.len.get());
        Ok(Match::new(patterns, start, start + len))
    }
}

impl<'d, I: Iterator<Item = char>, R: Recover> Iterator for Tokens<'d, I, R> {
    type Item = Result<Match<'d>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let start = self.lookahead.offset;
        if let Some((accept, len)) = self.lookahead.longest(self.dfa) {
            self.lookahead.consume(len);
            return Some(Ok(Match::new(accept.patterns(), start, start + len)));
        }

        let Some(c) = self.lookahead.get(0) else {
            self.done = true;
            return None;
        };

        let token = self.recover_at(start, c);
        self.done = token.is_err();
        Some(token)
    }
}
