//! Command handlers
//!
//! Each handler takes the store and a writer for its output; nothing here
//! touches stdout directly, so handlers run the same under tests.

mod check_in;
mod insights;
mod product;
mod session;
mod terpenes;
mod transfer;

use crate::cli::Command;
use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use vapelog_common::EntityStore;

pub async fn run<S>(command: Command, store: Arc<S>, out: &mut dyn Write) -> Result<()>
where
    S: EntityStore + ?Sized,
{
    match command {
        Command::Product(cmd) => product::run(cmd, store, out).await,
        Command::Session(cmd) => session::run(cmd, &*store, out).await,
        Command::CheckIn(cmd) => check_in::run(cmd, &*store, out).await,
        Command::Insights { limit, json } => insights::run(store, limit, json, out).await,
        Command::Terpenes { name } => terpenes::run(name, out),
        Command::Scan { file, name, product_type, route, dry_run } => {
            transfer::scan(&*store, &file, name, product_type, route, dry_run, out).await
        }
        Command::Export { output } => transfer::export(&*store, output.as_deref(), out).await,
        Command::Import { file } => transfer::import(&*store, &file, out).await,
    }
}

/// "-" for a missing optional value
fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
