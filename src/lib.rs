//! diagdrop library crate
//!
//! Diagnostic collection, bundling, and feedback submission. The binary is a
//! thin CLI over [`pipeline::Pipeline`].

pub mod account;
pub mod archive;
pub mod config;
pub mod error;
pub mod gate;
pub mod keyring;
pub mod lock;
pub mod logging;
pub mod pipeline;
pub mod probe;
pub mod prompt;
pub mod retry;
pub mod sanitize;
pub mod stats;
pub mod submit;
pub mod util;
