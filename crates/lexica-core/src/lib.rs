mod error;
pub mod lexer;

pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::lexer::config::{BuildConfig, Mode, TieBreak};
    pub use crate::lexer::error::{
        AmbiguityError, BuildError, ScanError, ScanErrorKind, SyntaxError, SyntaxErrorKind,
    };
    pub use crate::lexer::{
        Accept, Cursor, Dfa, Match, NoRecovery, Pattern, PatternId, Recover, Recovery, Scanner,
        ScannerBuilder, Span,
    };
}
