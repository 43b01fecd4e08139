use config::BuildConfig;
use error::BuildError;
use nfa::{Builder, State};
use parser::{Config, Flags, Parser};

mod alphabet;
mod ambiguity;
mod ast;
pub mod config;
mod cursor;
mod dfa;
pub mod error;
mod nfa;
mod parser;
mod pattern;
mod powerset;
mod scan;

pub use alphabet::{ClassSet, CodeRange, MAX_CODE_POINT};
pub use ast::{Quantifier, RegexAst};
pub use cursor::Cursor;
pub use dfa::{Accept, Dfa, DfaParts, DfaState, StateId, Transition, ERROR_STATE};
pub use parser::parse;
pub use pattern::{Pattern, PatternId};
pub use scan::{AllMatches, Match, NoRecovery, Recover, Recovery, Span, Tokens};

pub struct ScannerBuilder<P = ()> {
    builder: Builder,
    patterns: Vec<Pattern<P>>,
    config: BuildConfig,
}

impl<P> Default for ScannerBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl ScannerBuilder {
    pub fn token(&mut self, pat: &str, precedence: u32) -> Result<PatternId, BuildError> {
        self.push(Pattern::new(pat, precedence))
    }

    pub fn token_insensitive(
        &mut self,
        pat: &str,
        precedence: u32,
    ) -> Result<PatternId, BuildError> {
        self.push_insensitive(Pattern::new(pat, precedence))
    }
}

impl<P> ScannerBuilder<P> {
    pub fn new() -> Self {
        Self::with_config(BuildConfig::default())
    }

    pub fn with_config(config: BuildConfig) -> Self {
        let mut builder = Builder::default();
        builder.push(State::Split {
            targets: Vec::new(),
        });
        Self {
            builder,
            patterns: Vec::new(),
            config,
        }
    }

    /// Adds a pattern and returns its id. Ids follow declaration order.
    pub fn push(&mut self, pattern: Pattern<P>) -> Result<PatternId, BuildError>
    where
        P: PartialEq,
    {
        let id = PatternId::new(self.patterns.len() as u32);
        if let Some(first) = self.patterns.iter().position(|p| *p == pattern) {
            return Err(BuildError::DuplicatePattern {
                first: PatternId::new(first as u32),
                duplicate: id,
            });
        }

        let flags = Flags::default().set_case_insensitive(pattern.is_case_insensitive());
        let config = Config::default().set_flags(flags);
        let ast = Parser::new(config)
            .parse(pattern.source())
            .map_err(|source| BuildError::Syntax {
                pattern: id,
                source,
            })?;
        let fragment = ast.to_nfa(&mut self.builder, id);
        self.add_token_state(fragment.start);
        self.builder.add_fragment(fragment);
        self.patterns.push(pattern);

        Ok(id)
    }

    /// Same as [`ScannerBuilder::push`], with ASCII letters matching both cases.
    pub fn push_insensitive(&mut self, pattern: Pattern<P>) -> Result<PatternId, BuildError>
    where
        P: PartialEq,
    {
        self.push(pattern.set_case_insensitive(true))
    }

    fn add_token_state(&mut self, state: nfa::StateId) {
        let State::Split { targets } = self.builder.state_mut(0) else {
            unreachable!()
        };
        targets.push(state);
    }

    pub fn build(self) -> Result<Scanner<P>, BuildError> {
        let nfa = self.builder.build(0);
        log::debug!(
            "compiled {} patterns into {} NFA states",
            self.patterns.len(),
            nfa.len()
        );

        let dfa = powerset::Builder::new(&nfa, &self.patterns, &self.config).build()?;
        log::debug!("determinized into {} DFA states", dfa.len());

        Ok(Scanner {
            dfa,
            patterns: self.patterns,
        })
    }
}

/// A built scanner: the automaton and the patterns it was built from.
///
/// Scanners are immutable; every scan owns its own cursor or iterator, so a
/// scanner can be shared between threads.
#[derive(Debug, Clone)]
pub struct Scanner<P = ()> {
    dfa: Dfa,
    patterns: Vec<Pattern<P>>,
}

impl<P> Scanner<P> {
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    pub fn patterns(&self) -> &[Pattern<P>] {
        &self.patterns
    }

    pub fn pattern(&self, id: PatternId) -> Option<&Pattern<P>> {
        self.patterns.get(id.as_usize())
    }

    pub fn cursor(&self) -> Cursor<'_> {
        self.dfa.cursor()
    }

    /// See [`Dfa::match_as_prefix`].
    pub fn match_as_prefix<I>(&self, input: I, start: usize) -> Option<Match<'_>>
    where
        I: IntoIterator<Item = char>,
    {
        self.dfa.match_as_prefix(input, start)
    }

    /// See [`Dfa::all_matches`].
    pub fn all_matches<I>(&self, input: I, start: usize) -> AllMatches<'_, I::IntoIter>
    where
        I: IntoIterator<Item = char>,
    {
        self.dfa.all_matches(input, start)
    }

    /// See [`Dfa::tokenize`].
    pub fn tokenize<I>(&self, input: I) -> Tokens<'_, I::IntoIter, NoRecovery>
    where
        I: IntoIterator<Item = char>,
    {
        self.dfa.tokenize(input)
    }

    /// See [`Dfa::tokenize_with`].
    pub fn tokenize_with<I, R>(&self, input: I, recover: R) -> Tokens<'_, I::IntoIter, R>
    where
        I: IntoIterator<Item = char>,
        R: Recover,
    {
        self.dfa.tokenize_with(input, recover)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::config::{Mode, TieBreak};
    use crate::lexer::error::SyntaxErrorKind;

    fn scanner(tokens: &[(&str, u32)]) -> Result<Scanner, BuildError> {
        let mut builder = ScannerBuilder::new();
        for (pat, precedence) in tokens {
            builder.token(pat, *precedence)?;
        }
        builder.build()
    }

    fn winner(scanner: &Scanner, input: &str) -> Option<(u32, usize)> {
        scanner
            .match_as_prefix(input.chars(), 0)
            .map(|m| (m.pattern().as_u32(), m.end()))
    }

    #[test]
    fn ids_follow_declaration_order() {
        let mut builder = ScannerBuilder::new();
        assert_eq!(builder.token("a", 0).unwrap(), PatternId::new(0));
        assert_eq!(builder.token("b", 0).unwrap(), PatternId::new(1));
        let scanner = builder.build().unwrap();
        assert_eq!(scanner.pattern(PatternId::new(1)).unwrap().source(), "b");
        assert!(scanner.pattern(PatternId::new(2)).is_none());
    }

    #[test]
    fn syntax_errors_name_the_pattern() {
        let mut builder = ScannerBuilder::new();
        builder.token("a", 0).unwrap();
        let err = builder.token("b(", 0).unwrap_err();
        let BuildError::Syntax { pattern, source } = err else {
            panic!("expected a syntax error, got {err:?}");
        };
        assert_eq!(pattern, PatternId::new(1));
        assert_eq!(source.offset(), 1);
        assert_eq!(source.kind(), &SyntaxErrorKind::UnbalancedGroup);
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut builder = ScannerBuilder::new();
        builder.token("[a-z]+", 0).unwrap();
        builder.token("[a-z]+", 1).unwrap();
        let err = builder.token("[a-z]+", 0).unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicatePattern {
                first: PatternId::new(0),
                duplicate: PatternId::new(2),
            }
        );
    }

    #[test]
    fn payloads_distinguish_patterns() {
        let mut builder = ScannerBuilder::with_config(
            BuildConfig::default().set_tie_break(TieBreak::FirstDeclared),
        );
        builder.push(Pattern::with_payload("x", 0, "first")).unwrap();
        builder.push(Pattern::with_payload("x", 0, "second")).unwrap();
        let scanner = builder.build().unwrap();
        let m = scanner.match_as_prefix("x".chars(), 0).unwrap();
        assert_eq!(scanner.pattern(m.pattern()).unwrap().payload(), &"first");
    }

    #[test]
    fn higher_precedence_wins() {
        let scanner = scanner(&[("[a-z]+", 0), ("if", 1)]).unwrap();
        assert_eq!(winner(&scanner, "if"), Some((1, 2)));
        assert_eq!(winner(&scanner, "iff"), Some((0, 3)));
        assert_eq!(winner(&scanner, "i"), Some((0, 1)));
    }

    #[test]
    fn equal_precedence_overlap_is_ambiguous() {
        let err = scanner(&[("[a-z]+", 0), ("if", 0)]).unwrap_err();
        let BuildError::Ambiguity(err) = err else {
            panic!("expected an ambiguity, got {err:?}");
        };
        assert_eq!(err.witness(), "if");
        assert_eq!(err.patterns(), (PatternId::new(0), PatternId::new(1)));
    }

    #[test]
    fn first_declared_tie_break() {
        let mut builder = ScannerBuilder::with_config(
            BuildConfig::default().set_tie_break(TieBreak::FirstDeclared),
        );
        builder.token("if", 0).unwrap();
        builder.token("[a-z]+", 0).unwrap();
        let scanner = builder.build().unwrap();
        assert_eq!(winner(&scanner, "if"), Some((0, 2)));
        assert_eq!(winner(&scanner, "ifs"), Some((1, 3)));
    }

    #[test]
    fn ambiguous_mode_reports_every_top_pattern() {
        let mut builder =
            ScannerBuilder::with_config(BuildConfig::default().set_mode(Mode::Ambiguous));
        builder.token("[a-z]+", 0).unwrap();
        builder.token("if", 0).unwrap();
        builder.token("i[a-z]", 1).unwrap();
        builder.token("[a-z]f", 1).unwrap();
        let scanner = builder.build().unwrap();

        let m = scanner.match_as_prefix("if".chars(), 0).unwrap();
        assert_eq!(m.patterns(), &[PatternId::new(2), PatternId::new(3)]);
        let m = scanner.match_as_prefix("xyz".chars(), 0).unwrap();
        assert_eq!(m.patterns(), &[PatternId::new(0)]);
        assert!(matches!(
            scanner.dfa().accept(scanner.dfa().transition(scanner.dfa().initial(), 'x')),
            Some(Accept::Set(_))
        ));
    }

    #[test]
    fn case_insensitive_tokens() {
        let mut builder = ScannerBuilder::new();
        builder.token_insensitive("select", 1).unwrap();
        builder.token("[a-z]+", 0).unwrap();
        let scanner = builder.build().unwrap();
        assert_eq!(winner(&scanner, "SeLeCt"), Some((0, 6)));
        assert_eq!(winner(&scanner, "select"), Some((0, 6)));
        assert_eq!(winner(&scanner, "selection"), Some((1, 9)));
    }

    #[test]
    fn case_folding_distinguishes_patterns() {
        let mut builder = ScannerBuilder::new();
        assert_eq!(builder.token("if", 0).unwrap(), PatternId::new(0));
        assert_eq!(builder.token_insensitive("if", 1).unwrap(), PatternId::new(1));
        let err = builder.token_insensitive("if", 1).unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicatePattern {
                first: PatternId::new(1),
                duplicate: PatternId::new(2),
            }
        );
        let scanner = builder.build().unwrap();

        assert!(!scanner.pattern(PatternId::new(0)).unwrap().is_case_insensitive());
        assert!(scanner.pattern(PatternId::new(1)).unwrap().is_case_insensitive());
        assert_eq!(winner(&scanner, "IF"), Some((1, 2)));
        assert_eq!(winner(&scanner, "if"), Some((1, 2)));
    }

    #[test]
    fn empty_builder_matches_nothing() {
        let scanner = ScannerBuilder::<()>::new().build().unwrap();
        assert_eq!(scanner.dfa().initial(), ERROR_STATE);
        assert!(scanner.match_as_prefix("abc".chars(), 0).is_none());
    }

    #[test]
    fn negated_classes_compact_to_defaults() {
        let scanner = scanner(&[("\"[^\"]*\"", 0)]).unwrap();
        let dfa = scanner.dfa();
        let open = dfa.transition(dfa.initial(), '"');
        let body = dfa.transition(open, 'a');
        let state = dfa.state(body);
        assert_eq!(state.default_transition(), body);
        assert_eq!(state.transitions().len(), 1);
        assert_eq!(winner(&scanner, "\"a b\" c"), Some((0, 5)));
    }
}
