use anyhow::Result;
use std::io::Write;
use vapelog_common::models::{Terpene, TerpeneInfo, REFERENCE};

pub fn run(name: Option<Terpene>, out: &mut dyn Write) -> Result<()> {
    match name {
        Some(terpene) => describe(terpene.info(), out),
        None => {
            for info in REFERENCE.iter() {
                writeln!(out, "{:<14} {}", info.terpene.name(), info.aroma)?;
            }
            Ok(())
        }
    }
}

fn describe(info: &TerpeneInfo, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", info.terpene)?;
    writeln!(out, "Aroma: {}", info.aroma)?;
    writeln!(out, "{}", info.description)?;
    writeln!(out, "Effects: {}", info.effects.join(", "))?;
    Ok(())
}
