//! # jsonq - Syntax Trees
//!
//! Types shared by the two small languages of the engine.
//!
//! - **[tokens]** - Tokens and postfix items of filter expressions
//! - **[operators]** - Operator table of filter expressions
//! - **[segments]** - Classified units of a path string
//!
//! ## Paths
//!
//! ```text
//! $.store.book[?(@.price < 10)].title
//! ```
//!
//! A path splits into segments evaluated left to right, each against the
//! values produced by the one before:
//!
//! - `store.book` - plain navigation
//! - `[?(@.price < 10)]` - filter
//! - `title` - plain navigation
//!
//! Other segment forms are key globs (`*_name`), descendant search
//! (`..title`, `...`), index lists and slices (`[0]`, `[-1]`, `[1:3,5]`),
//! the wildcard `[*]` and quoted keys (`['first name']`).
//!
//! ## Filter Expressions
//!
//! ```text
//! @.value > 15 && @.active == true
//! @.name ~ 'item\d+'
//! (@.width * @.height) >= 100
//! ```
//!
//! `@.field` references are replaced by literals before the expression is
//! tokenized, so the expression language itself only sees numbers, quoted
//! strings, the words `true`/`false`, operators and parentheses.
pub mod operators;
pub mod segments;
pub mod tokens;

pub use operators::Operator;
pub use segments::{ArraySelector, Segment, SegmentKind, SlicePiece};
pub use tokens::{Postfix, Token};
