//! Concrete syntax tree parser for free-form Fortran source.
//!
//! The pipeline has three stages:
//! 1. [`scan`] splits the raw text into spliced logical statements, handling
//!    comments, semicolons, and `&` line continuation.
//! 2. [`grammar`] parses each logical statement into a flat [`grammar::Stmt`].
//! 3. [`tree`] folds openers, clauses, and `END` closers into a nested
//!    [`tree::TranslationUnit`].
//!
//! Parsing never fails as a whole: statements that do not parse and blocks
//! that do not close become error nodes, and everything else is still built.
//!
//! ```
//! let tree = fortran_cst::parse("PROGRAM demo\n  X = 1\nEND PROGRAM");
//! assert!(!tree.has_errors());
//! ```

pub mod grammar;
pub mod scan;
pub mod tree;

pub use scan::{BoundaryClassifier, FreeForm, Span};
pub use tree::TranslationUnit;

/// Parse free-form source into a syntax tree.
pub fn parse(source: &str) -> TranslationUnit {
    parse_with(source, &FreeForm)
}

/// Parse with a custom statement-boundary classifier.
pub fn parse_with<B: BoundaryClassifier + ?Sized>(source: &str, classifier: &B) -> TranslationUnit {
    let stmts = scan::split_statements(source, classifier)
        .into_iter()
        .map(grammar::parse_statement)
        .collect();
    tree::build(stmts)
}
