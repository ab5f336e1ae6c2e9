//! Input readers - parse source code into the Go syntax tree.

pub mod go;

pub use go::read_go;
