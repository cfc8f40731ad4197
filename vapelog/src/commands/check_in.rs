use super::or_dash;
use crate::cli::CheckInCommand;
use anyhow::{Context, Result};
use std::io::Write;
use vapelog_common::models::{CheckIn, Effect, Polarity, CHECKPOINT_MINUTES};
use vapelog_common::EntityStore;

pub async fn run<S>(command: CheckInCommand, store: &S, out: &mut dyn Write) -> Result<()>
where
    S: EntityStore + ?Sized,
{
    match command {
        CheckInCommand::Add { session, minutes, ratings, notes } => {
            let mut check_in = CheckIn::new(session, minutes);
            for (effect, value) in ratings {
                check_in.set_rating(effect, Some(value));
            }
            check_in.notes = notes;

            let check_in = store
                .insert_check_in(&check_in)
                .await
                .context("Failed to record check-in")?;
            writeln!(
                out,
                "Recorded check-in {} at +{} min (positive {:.1}, negative {:.1})",
                or_dash(check_in.id),
                check_in.minutes_after,
                check_in.positive_composite(),
                check_in.negative_composite()
            )?;
        }
        CheckInCommand::List { session } => {
            let check_ins = store.list_check_ins_for_session(session).await?;
            if check_ins.is_empty() {
                writeln!(out, "No check-ins for session {}", session)?;
            }
            for check_in in &check_ins {
                writeln!(
                    out,
                    "+{:<4} positive {:.1} [{}]  negative {:.1} [{}]",
                    check_in.minutes_after,
                    check_in.positive_composite(),
                    ratings(check_in, Polarity::Positive),
                    check_in.negative_composite(),
                    ratings(check_in, Polarity::Negative)
                )?;
            }

            let missing: Vec<String> = CHECKPOINT_MINUTES
                .iter()
                .filter(|m| !check_ins.iter().any(|c| c.minutes_after == **m))
                .map(|m| format!("+{}", m))
                .collect();
            if !missing.is_empty() {
                writeln!(out, "Missing checkpoints: {}", missing.join(", "))?;
            }
        }
    }
    Ok(())
}

/// "effect=value" pairs of one polarity
fn ratings(check_in: &CheckIn, polarity: Polarity) -> String {
    Effect::all()
        .filter(|e| e.polarity() == polarity)
        .filter_map(|e| check_in.rating(e).map(|v| format!("{}={}", e, v)))
        .collect::<Vec<_>>()
        .join(" ")
}
