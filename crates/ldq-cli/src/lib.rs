//! Command-line front end: argument definitions and subcommand logic.

pub mod cli;
pub mod commands;
