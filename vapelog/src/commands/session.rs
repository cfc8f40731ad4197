use super::or_dash;
use crate::cli::{SessionCommand, SessionFields};
use anyhow::{Context, Result};
use chrono::Local;
use std::io::Write;
use vapelog_common::models::Session;
use vapelog_common::{time, EntityStore};

pub async fn run<S>(command: SessionCommand, store: &S, out: &mut dyn Write) -> Result<()>
where
    S: EntityStore + ?Sized,
{
    match command {
        SessionCommand::Log(fields) => {
            let session = store
                .insert_session(&session_from_fields(fields))
                .await
                .context("Failed to log session")?;
            writeln!(
                out,
                "Logged session {} for product {}",
                or_dash(session.id),
                session.product_id
            )?;
        }
        SessionCommand::List { product } => {
            let sessions = match product {
                Some(product_id) => store.list_sessions_for_product(product_id).await?,
                None => store.list_sessions().await?,
            };
            if sessions.is_empty() {
                writeln!(out, "No sessions yet")?;
            }
            for session in sessions {
                writeln!(
                    out,
                    "{:>4}  {}  product {:<4} dose {} {}  {}",
                    or_dash(session.id),
                    session.date_time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    session.product_id,
                    or_dash(session.dose_mg),
                    session.dose_units.as_deref().unwrap_or("mg"),
                    session.location.as_deref().unwrap_or("")
                )?;
            }
        }
        SessionCommand::Delete { id } => {
            store.delete_session(id).await?;
            writeln!(out, "Deleted session {}", id)?;
        }
    }
    Ok(())
}

fn session_from_fields(fields: SessionFields) -> Session {
    let mut session = Session::new(fields.product, fields.at.unwrap_or_else(time::now));
    session.dose_mg = fields.dose_mg;
    session.dose_units = fields.dose_units;
    session.location = fields.location;
    session.with_company = fields.with_company;
    session.had_caffeine = fields.caffeine;
    session.had_alcohol = fields.alcohol;
    session.had_food = fields.food;
    session.sleep_quality = fields.sleep_quality;
    session.pre_mood = fields.mood;
    session.pre_stress = fields.stress;
    session.notes = fields.notes;
    session
}
