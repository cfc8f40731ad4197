use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use vapelog_common::{AnalyticsEngine, EntityStore};

pub async fn run<S>(store: Arc<S>, limit: usize, json: bool, out: &mut dyn Write) -> Result<()>
where
    S: EntityStore + ?Sized,
{
    let engine = AnalyticsEngine::new(store);
    let insights = engine.insights(limit).await?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&insights)?)?;
        return Ok(());
    }

    let readiness = &insights.readiness;
    match &insights.top_products {
        Some(top) => {
            writeln!(out, "Top products")?;
            if top.is_empty() {
                writeln!(out, "  No rated products yet")?;
            }
            for (rank, recommendation) in top.iter().enumerate() {
                writeln!(
                    out,
                    "  {}. {} (score {:.1}, {} confidence)",
                    rank + 1,
                    recommendation.product.name,
                    recommendation.score,
                    recommendation.confidence
                )?;
                writeln!(out, "     {}", recommendation.reason)?;
            }
        }
        None => {
            writeln!(
                out,
                "Learning your preferences: {} of {} sessions ({:.0}%), {} more to go",
                readiness.total_sessions,
                readiness.total_sessions + readiness.sessions_until_ready,
                readiness.progress * 100.0,
                readiness.sessions_until_ready
            )?;
        }
    }

    writeln!(out)?;
    match insights.most_common_time_of_day {
        Some(time_of_day) => writeln!(out, "Most common time: {}", time_of_day.label())?,
        None => writeln!(out, "Most common time: -")?,
    }
    match insights.favorite_terpene {
        Some(terpene) => writeln!(out, "Favorite terpene: {}", terpene)?,
        None => writeln!(out, "Favorite terpene: -")?,
    }
    writeln!(out, "Best results for: {}", insights.best_results_for)?;
    Ok(())
}
