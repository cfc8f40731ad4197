//! VapeLog command-line front end
//!
//! Argument definitions live in [`cli`]; [`commands::run`] executes a parsed
//! command against any [`EntityStore`](vapelog_common::EntityStore).

pub mod cli;
pub mod commands;

pub use cli::{Args, Command};
