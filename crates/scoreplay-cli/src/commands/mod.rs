//! CLI command implementations.

pub mod config;
pub mod doctor;
pub mod json_output;
pub mod render;
