//! Scoreplay CLI library.
//!
//! Command implementations, persisted settings and log setup for the
//! `scoreplay` binary.

pub mod commands;
pub mod logging;
pub mod settings;
