use super::or_dash;
use crate::cli::{ProductCommand, ProductFields};
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use vapelog_common::models::{Cannabinoid, Product};
use vapelog_common::{AnalyticsEngine, EntityStore};

pub async fn run<S>(command: ProductCommand, store: Arc<S>, out: &mut dyn Write) -> Result<()>
where
    S: EntityStore + ?Sized,
{
    match command {
        ProductCommand::Add(fields) => {
            let product = store
                .insert_product(&product_from_fields(fields))
                .await
                .context("Failed to add product")?;
            info!("Added product {:?}", product.id);
            writeln!(out, "Added product {}: {}", or_dash(product.id), product.name)?;
        }
        ProductCommand::List => {
            let products = store.list_products().await?;
            if products.is_empty() {
                writeln!(out, "No products yet")?;
            }
            for product in products {
                writeln!(
                    out,
                    "{:>4}  {:<28} {:<12} {}",
                    or_dash(product.id),
                    product.name,
                    product.product_type.as_str(),
                    product.cannabinoid_summary()
                )?;
            }
        }
        ProductCommand::Show { id } => {
            let product = store.get_product(id).await?;
            let engine = AnalyticsEngine::new(Arc::clone(&store));
            let sessions = store.count_sessions_for_product(id).await?;

            writeln!(out, "{} ({})", product.name, or_dash(product.brand.as_deref()))?;
            writeln!(out, "Type: {}  Route: {}", product.product_type, product.route)?;
            writeln!(out, "Cannabinoids: {}", product.cannabinoid_summary())?;
            for (terpene, value) in product.terpene_values() {
                writeln!(out, "  {}: {:.2}%", terpene, value)?;
            }
            if let Some(other) = &product.other_terpenes {
                writeln!(out, "Other terpenes: {}", other)?;
            }
            writeln!(out, "Sessions: {}  Confidence: {}", sessions, engine.confidence(id).await?)?;
            match engine.product_effects(id).await? {
                Some(effects) => writeln!(
                    out,
                    "Effects: positive {:.1}, negative {:.1} over {} check-ins",
                    effects.positive, effects.negative, effects.check_ins
                )?,
                None => writeln!(out, "Effects: no check-ins yet")?,
            }
            if let Some(notes) = &product.notes {
                writeln!(out, "Notes: {}", notes)?;
            }
        }
        ProductCommand::Delete { id } => {
            store.delete_product(id).await?;
            writeln!(out, "Deleted product {}", id)?;
        }
    }
    Ok(())
}

fn product_from_fields(fields: ProductFields) -> Product {
    let mut product = Product::new(fields.name, fields.product_type, fields.route);
    product.brand = fields.brand;
    product.set_cannabinoid(Cannabinoid::Thc, fields.thc);
    product.set_cannabinoid(Cannabinoid::Cbd, fields.cbd);
    product.set_cannabinoid(Cannabinoid::Cbg, fields.cbg);
    product.set_cannabinoid(Cannabinoid::Thcv, fields.thcv);
    for (terpene, value) in fields.terpenes {
        product.set_terpene(terpene, Some(value));
    }
    product.other_terpenes = fields.other_terpenes;
    product.notes = fields.notes;
    product
}
