use std::iter::Peekable;
use std::str::Chars;

use super::alphabet::{ClassSet, CodeRange};
use super::ast::{Quantifier, RegexAst};
use super::error::{SyntaxError, SyntaxErrorKind};

struct Tokens<'a> {
    chars: Peekable<Chars<'a>>,
    offset: usize,
}

impl<'a> Tokens<'a> {
    fn new(pat: &'a str) -> Self {
        Self {
            chars: pat.chars().peekable(),
            offset: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += 1;
        Some(c)
    }

    fn next_if_eq(&mut self, expected: char) -> bool {
        if self.chars.next_if_eq(&expected).is_some() {
            self.offset += 1;
            true
        } else {
            false
        }
    }

    /// offset of the next character
    fn offset(&self) -> usize {
        self.offset
    }

    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(self.offset, kind)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Flags {
    case_insensitive: bool,
}

impl Flags {
    pub fn set_case_insensitive(mut self, insensitive: bool) -> Self {
        self.case_insensitive = insensitive;
        self
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Config {
    flags: Flags,
}

impl Config {
    pub fn set_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }
}

pub struct Parser {
    config: Config,
}

///   <regex>  ::= <term> { '|' <term> }
///
///   <term>   ::= <factor> { <factor> }
///
///   <factor> ::= <base> { '*' | '+' | '?' }
///
///   <base>   ::= <char>
///             |  '.'
///             |  '\' <escape>
///             |  '(' <regex> ')'
///             |  '[' [ '^' ] { <member> } ']'
///
///   <member> ::= <setchar> [ '-' <setchar> ]
impl Parser {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn parse(&self, pat: &str) -> Result<RegexAst, SyntaxError> {
        let mut tokens = Tokens::new(pat);
        let ast = self.parse_regex(&mut tokens)?;
        match tokens.peek() {
            None => Ok(ast),
            Some(')') => Err(tokens.error(SyntaxErrorKind::UnbalancedGroup)),
            Some(c) => Err(tokens.error(SyntaxErrorKind::UnexpectedChar(c))),
        }
    }

    fn parse_regex(&self, tokens: &mut Tokens) -> Result<RegexAst, SyntaxError> {
        let mut lhs = self.parse_term(tokens)?;
        while tokens.next_if_eq('|') {
            let rhs = self.parse_term(tokens)?;
            lhs = RegexAst::Alt(lhs.into(), rhs.into());
        }

        Ok(lhs)
    }

    fn parse_term(&self, tokens: &mut Tokens) -> Result<RegexAst, SyntaxError> {
        let Some(mut lhs) = self.parse_factor(tokens)? else {
            return Err(tokens.error(SyntaxErrorKind::ExpectedAtom));
        };
        while let Some(rhs) = self.parse_factor(tokens)? {
            lhs = RegexAst::Concat(lhs.into(), rhs.into());
        }

        Ok(lhs)
    }

    fn parse_factor(&self, tokens: &mut Tokens) -> Result<Option<RegexAst>, SyntaxError> {
        if let Some(c) = tokens.peek().filter(|c| Quantifier::from_char(*c).is_some()) {
            return Err(tokens.error(SyntaxErrorKind::DanglingQuantifier(c)));
        }

        let Some(mut base) = self.parse_base(tokens)? else {
            return Ok(None);
        };
        while let Some(q) = tokens.peek().and_then(Quantifier::from_char) {
            tokens.next();
            base = RegexAst::Repeat(base.into(), q);
        }

        Ok(Some(base))
    }

    fn parse_base(&self, tokens: &mut Tokens) -> Result<Option<RegexAst>, SyntaxError> {
        let Some(c) = tokens.peek() else {
            return Ok(None);
        };

        let ast = match c {
            '|' | ')' => return Ok(None),
            '(' => {
                let open = tokens.offset();
                tokens.next();
                let inner = self.parse_regex(tokens)?;
                if !tokens.next_if_eq(')') {
                    return Err(SyntaxError::new(open, SyntaxErrorKind::UnbalancedGroup));
                }
                RegexAst::Group(inner.into())
            }
            '[' => self.parse_set(tokens)?,
            ']' => return Err(tokens.error(SyntaxErrorKind::UnexpectedChar(c))),
            '.' => {
                tokens.next();
                RegexAst::Class {
                    set: ClassSet::full(),
                    negated: false,
                }
            }
            '\\' => {
                let c = self.parse_escape(tokens, false)?;
                self.literal(c)
            }
            c => {
                tokens.next();
                self.literal(c)
            }
        };

        Ok(Some(ast))
    }

    fn literal(&self, c: char) -> RegexAst {
        if self.config.flags.case_insensitive && c.is_ascii_alphabetic() {
            RegexAst::Class {
                set: ClassSet::from_ranges([
                    CodeRange::single(c.to_ascii_lowercase() as u32),
                    CodeRange::single(c.to_ascii_uppercase() as u32),
                ]),
                negated: false,
            }
        } else {
            RegexAst::Literal(c)
        }
    }

    fn parse_set(&self, tokens: &mut Tokens) -> Result<RegexAst, SyntaxError> {
        let open = tokens.offset();
        tokens.next();
        let negated = tokens.next_if_eq('^');
        let mut set = ClassSet::empty();

        loop {
            match tokens.peek() {
                None => return Err(SyntaxError::new(open, SyntaxErrorKind::UnterminatedSet)),
                Some(']') => {
                    tokens.next();
                    break;
                }
                Some(c @ ('^' | '-')) => {
                    return Err(tokens.error(SyntaxErrorKind::UnexpectedChar(c)))
                }
                Some(_) => self.parse_member(tokens, &mut set, open)?,
            }
        }

        if self.config.flags.case_insensitive {
            set.fold_ascii_case();
        }

        Ok(RegexAst::Class { set, negated })
    }

    fn parse_member(
        &self,
        tokens: &mut Tokens,
        set: &mut ClassSet,
        open: usize,
    ) -> Result<(), SyntaxError> {
        let start_offset = tokens.offset();
        let start = self.parse_set_char(tokens)?;
        let dash = tokens.offset();
        if !tokens.next_if_eq('-') {
            set.add(CodeRange::single(start as u32));
            return Ok(());
        }

        match tokens.peek() {
            None => Err(SyntaxError::new(open, SyntaxErrorKind::UnterminatedSet)),
            Some(']') => Err(SyntaxError::new(dash, SyntaxErrorKind::UnexpectedChar('-'))),
            Some(_) => {
                let end = self.parse_set_char(tokens)?;
                if end < start {
                    return Err(SyntaxError::new(
                        start_offset,
                        SyntaxErrorKind::InvalidRange { start, end },
                    ));
                }
                set.add(CodeRange::new(start as u32, end as u32));
                Ok(())
            }
        }
    }

    fn parse_set_char(&self, tokens: &mut Tokens) -> Result<char, SyntaxError> {
        match tokens.peek() {
            Some('\\') => self.parse_escape(tokens, true),
            Some(c @ ('^' | '-')) => Err(tokens.error(SyntaxErrorKind::UnexpectedChar(c))),
            Some(c) => {
                tokens.next();
                Ok(c)
            }
            None => Err(tokens.error(SyntaxErrorKind::UnterminatedSet)),
        }
    }

    /// Parses an escape sequence, the leading `\` included.
    fn parse_escape(&self, tokens: &mut Tokens, in_set: bool) -> Result<char, SyntaxError> {
        let start = tokens.offset();
        tokens.next();
        let Some(c) = tokens.next() else {
            return Err(SyntaxError::new(start, SyntaxErrorKind::UnterminatedEscape));
        };

        let escaped = match c {
            't' => '\t',
            'r' => '\r',
            'n' => '\n',
            'v' => '\u{0B}',
            'f' => '\u{0C}',
            '0' => '\0',
            'u' => return self.parse_code_point(tokens, start),
            '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '\\' => c,
            '^' | '-' if in_set => c,
            c => return Err(SyntaxError::new(start, SyntaxErrorKind::UnrecognizedEscape(c))),
        };

        Ok(escaped)
    }

    /// Parses the `{HEX+}` part of a `\u{HEX+}` escape.
    fn parse_code_point(&self, tokens: &mut Tokens, start: usize) -> Result<char, SyntaxError> {
        let invalid = || SyntaxError::new(start, SyntaxErrorKind::InvalidCodePoint);
        if !tokens.next_if_eq('{') {
            return Err(invalid());
        }

        let mut value: u32 = 0;
        let mut digits = 0;
        loop {
            match tokens.next() {
                Some('}') if digits > 0 => break,
                Some(c) => {
                    let digit = c.to_digit(16).ok_or_else(invalid)?;
                    value = value
                        .checked_mul(16)
                        .and_then(|v| v.checked_add(digit))
                        .ok_or_else(invalid)?;
                    digits += 1;
                }
                None => return Err(invalid()),
            }
        }

        char::from_u32(value).ok_or_else(invalid)
    }
}

/// Parses `pat` with the default configuration.
pub fn parse(pat: &str) -> Result<RegexAst, SyntaxError> {
    Parser::new(Config::default()).parse(pat)
}

#[cfg(test)]
mod test {
    use super::*;

    fn err(pat: &str) -> (usize, SyntaxErrorKind) {
        let e = parse(pat).unwrap_err();
        (e.offset(), e.kind().clone())
    }

    fn lit(c: char) -> Box<RegexAst> {
        Box::new(RegexAst::Literal(c))
    }

    #[test]
    fn precedence_of_operators() {
        let ast = parse("ab*|c").unwrap();
        let expected = RegexAst::Alt(
            Box::new(RegexAst::Concat(
                lit('a'),
                Box::new(RegexAst::Repeat(lit('b'), Quantifier::ZeroOrMore)),
            )),
            lit('c'),
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn groups_and_stacked_quantifiers() {
        let ast = parse("(a|b)+?").unwrap();
        let expected = RegexAst::Repeat(
            Box::new(RegexAst::Repeat(
                Box::new(RegexAst::Group(Box::new(RegexAst::Alt(lit('a'), lit('b'))))),
                Quantifier::OneOrMore,
            )),
            Quantifier::ZeroOrOne,
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn escapes() {
        assert_eq!(parse("\\n").unwrap(), RegexAst::Literal('\n'));
        assert_eq!(parse("\\.").unwrap(), RegexAst::Literal('.'));
        assert_eq!(parse("\\u{1F600}").unwrap(), RegexAst::Literal('😀'));
        assert_eq!(parse("\\u{000041}").unwrap(), RegexAst::Literal('A'));
        assert_eq!(err("\\d"), (0, SyntaxErrorKind::UnrecognizedEscape('d')));
        assert_eq!(err("a\\-"), (1, SyntaxErrorKind::UnrecognizedEscape('-')));
        assert_eq!(err("\\u{D800}"), (0, SyntaxErrorKind::InvalidCodePoint));
        assert_eq!(err("\\u{110000}"), (0, SyntaxErrorKind::InvalidCodePoint));
        assert_eq!(err("\\u{}"), (0, SyntaxErrorKind::InvalidCodePoint));
        assert_eq!(err("\\u{41"), (0, SyntaxErrorKind::InvalidCodePoint));
        assert_eq!(err("ab\\"), (2, SyntaxErrorKind::UnterminatedEscape));
    }

    #[test]
    fn character_sets() {
        let RegexAst::Class { set, negated } = parse("[a-c\\-\\]x]").unwrap() else {
            panic!("expected a class");
        };
        assert!(!negated);
        assert_eq!(
            set,
            ClassSet::from_ranges([
                CodeRange::single('-' as u32),
                CodeRange::single(']' as u32),
                CodeRange::new('a' as u32, 'c' as u32),
                CodeRange::single('x' as u32),
            ])
        );

        let RegexAst::Class { negated, .. } = parse("[^\\^]").unwrap() else {
            panic!("expected a class");
        };
        assert!(negated);
    }

    #[test]
    fn malformed_sets() {
        assert_eq!(err("[abc"), (0, SyntaxErrorKind::UnterminatedSet));
        assert_eq!(err("x[a-"), (1, SyntaxErrorKind::UnterminatedSet));
        assert_eq!(err("[a-]"), (2, SyntaxErrorKind::UnexpectedChar('-')));
        assert_eq!(err("[a^]"), (2, SyntaxErrorKind::UnexpectedChar('^')));
        assert_eq!(
            err("[z-a]"),
            (1, SyntaxErrorKind::InvalidRange { start: 'z', end: 'a' })
        );
    }

    #[test]
    fn malformed_structure() {
        assert_eq!(err("(ab"), (0, SyntaxErrorKind::UnbalancedGroup));
        assert_eq!(err("ab)"), (2, SyntaxErrorKind::UnbalancedGroup));
        assert_eq!(err("*a"), (0, SyntaxErrorKind::DanglingQuantifier('*')));
        assert_eq!(err("a|+"), (2, SyntaxErrorKind::DanglingQuantifier('+')));
        assert_eq!(err("(?)"), (1, SyntaxErrorKind::DanglingQuantifier('?')));
        assert_eq!(err(""), (0, SyntaxErrorKind::ExpectedAtom));
        assert_eq!(err("a|"), (2, SyntaxErrorKind::ExpectedAtom));
        assert_eq!(err("()"), (1, SyntaxErrorKind::ExpectedAtom));
        assert_eq!(err("a]"), (1, SyntaxErrorKind::UnexpectedChar(']')));
    }

    #[test]
    fn case_insensitive() {
        let parser = Parser::new(Config::default().set_flags(Flags::default().set_case_insensitive(true)));
        let RegexAst::Class { set, .. } = parser.parse("k").unwrap() else {
            panic!("expected a class");
        };
        assert!(set.contains('k' as u32) && set.contains('K' as u32));
        assert_eq!(parser.parse("1").unwrap(), RegexAst::Literal('1'));
    }
}
