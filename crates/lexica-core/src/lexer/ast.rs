use super::alphabet::ClassSet;
use super::nfa::{Builder, Fragment, State, StateId};
use super::pattern::PatternId;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Quantifier {
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
    /// `?`
    ZeroOrOne,
}

impl Quantifier {
    pub(crate) fn from_char(c: char) -> Option<Self> {
        match c {
            '*' => Some(Self::ZeroOrMore),
            '+' => Some(Self::OneOrMore),
            '?' => Some(Self::ZeroOrOne),
            _ => None,
        }
    }

    pub fn min(self) -> u8 {
        match self {
            Quantifier::OneOrMore => 1,
            Quantifier::ZeroOrMore | Quantifier::ZeroOrOne => 0,
        }
    }

    pub fn unbounded(self) -> bool {
        !matches!(self, Quantifier::ZeroOrOne)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexAst {
    Literal(char),
    /// `set` is normalized; `negated` sets match its complement.
    Class { set: ClassSet, negated: bool },
    Concat(Box<Self>, Box<Self>),
    Alt(Box<Self>, Box<Self>),
    Repeat(Box<Self>, Quantifier),
    Group(Box<Self>),
}

impl RegexAst {
    /// Compiles the expression into `builder`. The returned fragment's accept
    /// state is tagged with `pattern`.
    pub(crate) fn to_nfa(&self, builder: &mut Builder, pattern: PatternId) -> Fragment {
        let (start, accept) = build_nfa_from_ast(self, builder, pattern);
        Fragment {
            start,
            accept,
            pattern,
        }
    }
}

/// Every sub-fragment ends in a `Match` state; composite nodes overwrite the
/// inner ends with epsilon edges, so only the outermost end stays a match.
fn build_nfa_from_ast(
    ast: &RegexAst,
    builder: &mut Builder,
    pattern: PatternId,
) -> (StateId, StateId) {
    match ast {
        RegexAst::Literal(c) => edge(builder, ClassSet::single(*c), pattern),
        RegexAst::Class { set, negated } => {
            let class = if *negated {
                set.clone().negated()
            } else {
                set.clone()
            };
            edge(builder, class, pattern)
        }
        RegexAst::Group(e) => build_nfa_from_ast(e, builder, pattern),
        RegexAst::Repeat(e, q) => {
            let (start, end) = build_nfa_from_ast(e, builder, pattern);
            let new_end = builder.push(State::Match { pattern });

            *builder.state_mut(end) = if q.unbounded() {
                State::Split {
                    targets: vec![start, new_end],
                }
            } else {
                State::Goto { target: new_end }
            };

            if q.min() == 1 {
                return (start, new_end);
            }

            let new_start = builder.push(State::Split {
                targets: vec![start, new_end],
            });

            (new_start, new_end)
        }
        RegexAst::Alt(lhs, rhs) => {
            let (lhs_start, lhs_end) = build_nfa_from_ast(lhs, builder, pattern);
            let (rhs_start, rhs_end) = build_nfa_from_ast(rhs, builder, pattern);

            let end = builder.push(State::Match { pattern });

            *builder.state_mut(lhs_end) = State::Goto { target: end };
            *builder.state_mut(rhs_end) = State::Goto { target: end };

            let start = builder.push(State::Split {
                targets: vec![lhs_start, rhs_start],
            });

            (start, end)
        }
        RegexAst::Concat(lhs, rhs) => {
            let (lhs_start, lhs_end) = build_nfa_from_ast(lhs, builder, pattern);
            let (rhs_start, rhs_end) = build_nfa_from_ast(rhs, builder, pattern);

            *builder.state_mut(lhs_end) = State::Goto { target: rhs_start };

            (lhs_start, rhs_end)
        }
    }
}

fn edge(builder: &mut Builder, class: ClassSet, pattern: PatternId) -> (StateId, StateId) {
    let end = builder.push(State::Match { pattern });
    let start = builder.push(State::Range { class, target: end });

    (start, end)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::nfa::Nfa;
    use crate::lexer::parser::parse;

    fn compile(pat: &str) -> (Nfa, Fragment) {
        let mut builder = Builder::default();
        let fragment = parse(pat).unwrap().to_nfa(&mut builder, PatternId::new(7));
        (builder.build(fragment.start), fragment)
    }

    fn accepts(pat: &str, input: &str) -> bool {
        let (nfa, fragment) = compile(pat);
        let mut set = nfa.epsilon_closure([fragment.start]);
        for c in input.chars() {
            let outgoing = nfa.outgoing(&set).collect::<Vec<_>>();
            set = nfa.step(&outgoing, c as u32);
        }
        set.contains(&fragment.accept)
    }

    #[test]
    fn only_the_outer_end_is_a_match() {
        let (nfa, fragment) = compile("(ab|c)*d?");
        let matches = (0..nfa.len())
            .filter_map(|s| nfa.is_match(s))
            .collect::<Vec<_>>();
        assert_eq!(matches, vec![PatternId::new(7)]);
        assert_eq!(nfa.is_match(fragment.accept), Some(PatternId::new(7)));
    }

    #[test]
    fn repetitions() {
        assert!(accepts("a*", ""));
        assert!(accepts("a*", "aaa"));
        assert!(!accepts("a+", ""));
        assert!(accepts("a+", "a"));
        assert!(accepts("a+", "aaaa"));
        assert!(accepts("a?", ""));
        assert!(accepts("a?", "a"));
        assert!(!accepts("a?", "aa"));
    }

    #[test]
    fn alternation_and_concat() {
        assert!(accepts("ab|cd", "ab"));
        assert!(accepts("ab|cd", "cd"));
        assert!(!accepts("ab|cd", "ad"));
        assert!(accepts("[^0-9]x", "ax"));
        assert!(!accepts("[^0-9]x", "1x"));
        assert!(accepts(".", "\u{10FFFF}"));
    }
}
