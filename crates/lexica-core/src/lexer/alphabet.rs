use std::fmt::{self, Display};

/// Largest code point of the input domain.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Number of code points in `0..=MAX_CODE_POINT`.
pub(crate) const DOMAIN_SIZE: u64 = MAX_CODE_POINT as u64 + 1;

const SURROGATES: CodeRange = CodeRange {
    start: 0xD800,
    end: 0xDFFF,
};

/// An inclusive range of code points.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodeRange {
    start: u32,
    end: u32,
}

impl CodeRange {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end && end <= MAX_CODE_POINT);
        Self { start, end }
    }

    pub fn single(c: u32) -> Self {
        Self::new(c, c)
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn contains(&self, c: u32) -> bool {
        self.start <= c && c <= self.end
    }

    /// Number of code points in the range.
    pub fn width(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }

    /// Returns the smallest scalar value in the range. Surrogate code points
    /// can never appear in the input, so they are skipped.
    pub fn first_char(&self) -> Option<char> {
        let c = if SURROGATES.contains(self.start) {
            SURROGATES.end + 1
        } else {
            self.start
        };

        if c > self.end {
            None
        } else {
            char::from_u32(c)
        }
    }

    fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Self { start, end })
    }
}

impl fmt::Debug for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Display for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_code_point(f, self.start)?;
        if self.end != self.start {
            f.write_str("-")?;
            fmt_code_point(f, self.end)?;
        }

        Ok(())
    }
}

fn fmt_code_point(f: &mut fmt::Formatter<'_>, c: u32) -> fmt::Result {
    match char::from_u32(c) {
        Some(c) if c.is_ascii_graphic() => write!(f, "{c:?}"),
        _ => write!(f, "U+{c:04X}"),
    }
}

/// A normalized set of code points: ranges are sorted, disjoint and never
/// adjacent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ClassSet {
    ranges: Vec<CodeRange>,
}

impl ClassSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The set of every code point.
    pub fn full() -> Self {
        Self {
            ranges: vec![CodeRange::new(0, MAX_CODE_POINT)],
        }
    }

    pub fn single(c: char) -> Self {
        Self {
            ranges: vec![CodeRange::single(c as u32)],
        }
    }

    pub fn from_ranges(ranges: impl IntoIterator<Item = CodeRange>) -> Self {
        let mut set = Self {
            ranges: ranges.into_iter().collect(),
        };
        set.normalize();
        set
    }

    pub fn add(&mut self, range: CodeRange) {
        self.ranges.push(range);
        self.normalize();
    }

    pub fn contains(&self, c: u32) -> bool {
        let idx = self.ranges.partition_point(|r| r.end < c);
        self.ranges.get(idx).is_some_and(|r| r.start <= c)
    }

    pub fn ranges(&self) -> &[CodeRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Complements the set against `0..=MAX_CODE_POINT`.
    pub fn negate(&mut self) {
        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        let mut next = 0u32;
        for r in &self.ranges {
            if r.start > next {
                out.push(CodeRange::new(next, r.start - 1));
            }
            next = r.end + 1;
        }
        if next <= MAX_CODE_POINT {
            out.push(CodeRange::new(next, MAX_CODE_POINT));
        }

        self.ranges = out;
    }

    pub fn negated(mut self) -> Self {
        self.negate();
        self
    }

    /// Adds the other-case counterpart of every ASCII letter in the set.
    pub fn fold_ascii_case(&mut self) {
        const UPPER: CodeRange = CodeRange {
            start: b'A' as u32,
            end: b'Z' as u32,
        };
        const LOWER: CodeRange = CodeRange {
            start: b'a' as u32,
            end: b'z' as u32,
        };
        const SHIFT: u32 = (b'a' - b'A') as u32;

        let mut extra = Vec::new();
        for r in &self.ranges {
            if let Some(up) = r.intersect(&UPPER) {
                extra.push(CodeRange::new(up.start + SHIFT, up.end + SHIFT));
            }
            if let Some(low) = r.intersect(&LOWER) {
                extra.push(CodeRange::new(low.start - SHIFT, low.end - SHIFT));
            }
        }

        if !extra.is_empty() {
            self.ranges.extend(extra);
            self.normalize();
        }
    }

    fn normalize(&mut self) {
        self.ranges.sort_unstable();
        let mut out: Vec<CodeRange> = Vec::with_capacity(self.ranges.len());
        for r in self.ranges.drain(..) {
            match out.last_mut() {
                Some(last) if r.start <= last.end.saturating_add(1) => {
                    last.end = last.end.max(r.end);
                }
                _ => out.push(r),
            }
        }
        self.ranges = out;
    }
}

/// Splits the code points covered by `ranges` into the coarsest cells such
/// that every input range is a union of cells. Cells come out in ascending
/// order; code points covered by no range are left out.
pub(crate) fn partition<'a>(ranges: impl IntoIterator<Item = &'a CodeRange>) -> Vec<CodeRange> {
    // +1 when a range opens, -1 one past its end
    let mut events: Vec<(u32, i32)> = Vec::new();
    for r in ranges {
        events.push((r.start, 1));
        events.push((r.end + 1, -1));
    }
    events.sort_unstable();

    let mut cells = Vec::new();
    let mut depth = 0;
    let mut i = 0;
    while i < events.len() {
        let at = events[i].0;
        while i < events.len() && events[i].0 == at {
            depth += events[i].1;
            i += 1;
        }

        if depth > 0 {
            if let Some(&(next, _)) = events.get(i) {
                cells.push(CodeRange::new(at, next - 1));
            }
        }
    }

    cells
}

#[cfg(test)]
mod test {
    use super::*;

    fn r(start: char, end: char) -> CodeRange {
        CodeRange::new(start as u32, end as u32)
    }

    #[test]
    fn class_set_normalizes() {
        let set = ClassSet::from_ranges([r('m', 'z'), r('a', 'c'), r('b', 'f'), r('g', 'h')]);
        assert_eq!(set.ranges(), &[r('a', 'h'), r('m', 'z')]);
        assert!(set.contains('d' as u32));
        assert!(!set.contains('k' as u32));
    }

    #[test]
    fn negate_covers_complement() {
        let set = ClassSet::from_ranges([r('A', 'Z'), r('a', 'z')]).negated();
        assert_eq!(
            set.ranges(),
            &[
                CodeRange::new(0, 'A' as u32 - 1),
                CodeRange::new('Z' as u32 + 1, 'a' as u32 - 1),
                CodeRange::new('z' as u32 + 1, MAX_CODE_POINT),
            ]
        );
        assert_eq!(ClassSet::empty().negated(), ClassSet::full());
        assert!(ClassSet::full().negated().is_empty());
    }

    #[test]
    fn fold_ascii_case() {
        let mut set = ClassSet::from_ranges([r('X', 'c')]);
        set.fold_ascii_case();
        assert_eq!(set.ranges(), &[r('A', 'C'), r('X', 'c'), r('x', 'z')]);
    }

    #[test]
    fn partition_splits_on_boundaries() {
        let ranges = [r('a', 'z'), r('f', 'k'), r('0', '9')];
        let cells = partition(&ranges);
        assert_eq!(cells, vec![r('0', '9'), r('a', 'e'), r('f', 'k'), r('l', 'z')]);
    }

    #[test]
    fn first_char_skips_surrogates() {
        assert_eq!(CodeRange::new(0xD800, 0xE000).first_char(), Some('\u{E000}'));
        assert_eq!(CodeRange::new(0xD800, 0xDFFF).first_char(), None);
        assert_eq!(r('a', 'b').first_char(), Some('a'));
    }
}
