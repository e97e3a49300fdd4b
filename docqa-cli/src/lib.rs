//! Command-line front end for `docqa-rag`.
//!
//! The binary lives in `main.rs`; everything testable is here.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
