//! Go to Java source translation.
//!
//! `go2j-engine` reads Go packages and writes one Java compilation unit per
//! package plus one per exported type. Translation is surface-level: Go
//! constructs are mapped onto their closest Java spelling, with enough type
//! resolution to pick the right member syntax (`m.get(k)` for maps,
//! `s.charAt(i)` for strings) and to infer which interfaces a struct
//! satisfies.
//!
//! # Architecture
//!
//! ```text
//!  Go source ──> ast::File ──> convert ──> BufferArena ──> Java text
//!   (input)                      │            ▲
//!                                └─ deferred ─┘
//! ```
//!
//! Files are converted in any order. Text that depends on declarations not
//! seen yet is written into a reserved slot of the output buffer and queued.
//! [`Program::finalize`] runs the queue once every file is known and
//! [`Program::flatten`] splices the slots into the final text.
//!
//! # Example
//!
//! ```ignore
//! use go2j_engine::{NoSystemSources, Program};
//!
//! let mut program = Program::new();
//! program.discover("main.go", "package main\nfunc main() {}\n", &NoSystemSources)?;
//! for unit in program.flatten()? {
//!     println!("{}:\n{}", unit.path, unit.text);
//! }
//! ```

pub mod ast;
mod convert;
mod deferred;
pub mod env;
pub mod error;
pub mod input;
pub mod output;
pub mod program;
pub mod resolve;
pub mod tables;
pub mod traits;

pub use error::EngineError;
pub use input::read_go;
pub use program::{Phase, Program, TranslatedUnit};
pub use resolve::ResolveOpts;
pub use traits::{
    MemorySystemSources, NoSystemSources, ReadError, SourceFile, SystemSources,
};
