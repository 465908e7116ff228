//! Report generation.

pub mod formatter;

pub use formatter::*;
