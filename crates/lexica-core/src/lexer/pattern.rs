use std::fmt;

/// Identifies a pattern by its declaration slot in a scanner.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternId(u32);

impl PatternId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A regular expression with its precedence and a caller-defined payload.
///
/// When several patterns match the same longest input, the one with the
/// highest precedence wins. The payload is never inspected by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern<P = ()> {
    source: String,
    precedence: u32,
    case_insensitive: bool,
    payload: P,
}

impl Pattern {
    pub fn new(source: impl Into<String>, precedence: u32) -> Self {
        Self::with_payload(source, precedence, ())
    }
}

impl<P> Pattern<P> {
    pub fn with_payload(source: impl Into<String>, precedence: u32, payload: P) -> Self {
        Self {
            source: source.into(),
            precedence,
            case_insensitive: false,
            payload,
        }
    }

    /// Makes ASCII letters in the pattern match both cases.
    pub fn set_case_insensitive(mut self, insensitive: bool) -> Self {
        self.case_insensitive = insensitive;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn precedence(&self) -> u32 {
        self.precedence
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }
}
