//! Label scans, export and import

use super::or_dash;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;
use vapelog_common::export::{export_all, import_data, ExportData};
use vapelog_common::models::{ConsumptionRoute, ProductType};
use vapelog_common::scan::extract_from_text;
use vapelog_common::EntityStore;

pub async fn scan<S>(
    store: &S,
    file: &Path,
    name: String,
    product_type: ProductType,
    route: ConsumptionRoute,
    dry_run: bool,
    out: &mut dyn Write,
) -> Result<()>
where
    S: EntityStore + ?Sized,
{
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read label text from {}", file.display()))?;
    let result = extract_from_text(&text);

    for (key, value) in result.cannabinoids.iter().chain(result.terpenes.iter()) {
        writeln!(out, "  {}: {}%", key, value)?;
    }
    if result.cannabinoids.is_empty() && result.terpenes.is_empty() {
        writeln!(out, "  Nothing recognized")?;
    }

    let product = result.into_product(name, product_type, route);
    if dry_run {
        return Ok(());
    }

    let product = store
        .insert_product(&product)
        .await
        .context("Failed to save scanned product")?;
    writeln!(out, "Added product {}: {}", or_dash(product.id), product.name)?;
    Ok(())
}

pub async fn export<S>(store: &S, output: Option<&Path>, out: &mut dyn Write) -> Result<()>
where
    S: EntityStore + ?Sized,
{
    let json = export_all(store).await?.to_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            info!("Export written to {}", path.display());
            writeln!(out, "Exported to {}", path.display())?;
        }
        None => writeln!(out, "{}", json)?,
    }
    Ok(())
}

pub async fn import<S>(store: &S, file: &Path, out: &mut dyn Write) -> Result<()>
where
    S: EntityStore + ?Sized,
{
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let data = ExportData::from_json(&json).context("Not a VapeLog export document")?;
    let summary = import_data(store, &data).await.context("Import failed")?;

    writeln!(
        out,
        "Imported {} products, {} sessions, {} check-ins",
        summary.products, summary.sessions, summary.check_ins
    )?;
    Ok(())
}
