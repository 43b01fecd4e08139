//! Scanners built from prioritized regular expressions.
//!
//! Patterns are compiled into a single deterministic automaton that reports,
//! at any offset, the longest match and the highest-precedence pattern
//! producing it. Overlapping patterns of equal precedence are rejected at
//! build time, together with the shortest input both accept.
//!
//! ```
//! use lexica::prelude::*;
//!
//! let mut builder = ScannerBuilder::new();
//! let ident = builder.token("[a-z]+", 0)?;
//! let kw_if = builder.token("if", 1)?;
//! let scanner = builder.build()?;
//!
//! let m = scanner.match_as_prefix("if x".chars(), 0).unwrap();
//! assert_eq!((m.pattern(), m.end()), (kw_if, 2));
//! let m = scanner.match_as_prefix("iffy".chars(), 0).unwrap();
//! assert_eq!((m.pattern(), m.end()), (ident, 4));
//! # Ok::<(), lexica::prelude::Error>(())
//! ```

pub use lexica_core::lexer;
pub use lexica_core::prelude;
