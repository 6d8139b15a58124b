//! Command handlers for the Lumen CLI.

pub mod classify;
pub mod config;
pub mod labels;
