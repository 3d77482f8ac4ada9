pub mod chat;
pub mod freeform;
pub mod io;
pub mod library;
pub mod lint;
pub mod narrator;
pub mod oracle;
pub mod prompts;
pub mod scripted;
pub mod session;
pub mod testing;
