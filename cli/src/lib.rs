//! Command-line host for the todo/social client core.
//!
//! Owns the two things the core leaves to its host: the HTTP stack
//! (`transport::UreqTransport`) and where the session lives (a `FileStore`
//! path chosen in `main`).

pub mod commands;
pub mod transport;

pub use commands::{run, Command, TodosCommand};
pub use transport::UreqTransport;
