//! Turns timeline text into deferred actions.
//!
//! The pipeline for one line is `preprocess` → `binder` → `directive`; the
//! `compiler` drives it over a whole file and builds the action queue.

pub mod binder;
pub mod compiler;
pub mod directive;
pub mod preprocess;

pub use compiler::Compiler;
pub use directive::{CommandLine, Directive};
pub use preprocess::{preprocess, Line};
