//! Adventure Engine — turn-based interactive survival stories.
//!
//! A session walks a shuffled pool of narrators, one per day. Scripted
//! narrators follow pre-authored chapter graphs loaded from RON; freeform
//! narrators run oracle-authored side-encounters. Free-text player input
//! is mapped onto the story by an external text-generation oracle.

pub mod core;
pub mod schema;

pub use crate::core::chat::{ChatOracle, OracleConfig};
pub use crate::core::io::{Line, PlayerIo, ScriptedIo, TerminalIo};
pub use crate::core::library::ChapterLibrary;
pub use crate::core::narrator::{Narrator, NarratorError};
pub use crate::core::oracle::{Oracle, OracleError};
pub use crate::core::session::{Session, SessionConfig, SessionOutcome};
pub use crate::schema::status::{StatusKind, StatusManager};
