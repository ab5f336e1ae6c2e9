//! Go syntax to Java text.
//!
//! Each submodule adds conversion methods to [`Program`](crate::program::Program)
//! for one node category. Anything that depends on types declared elsewhere in
//! the program is emitted through the deferred queue instead of written
//! directly.

mod decl;
mod expr;
mod stmt;
pub(crate) mod types;
