//! Command-line definitions

use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use vapelog_common::analytics::DEFAULT_RECOMMENDATION_LIMIT;
use vapelog_common::models::{
    ConsumptionRoute, Effect, ProductId, ProductType, SessionId, Terpene, CHECKPOINT_MINUTES,
};

/// Command-line arguments for vapelog
#[derive(Parser, Debug)]
#[command(name = "vapelog")]
#[command(about = "Track cannabis products, sessions and effects")]
#[command(version)]
pub struct Args {
    /// Folder holding vapelog.db
    #[arg(short, long, global = true)]
    pub root_folder: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage products
    #[command(subcommand)]
    Product(ProductCommand),

    /// Log and review sessions
    #[command(subcommand)]
    Session(SessionCommand),

    /// Record effect check-ins
    #[command(subcommand)]
    #[command(name = "checkin")]
    CheckIn(CheckInCommand),

    /// Show recommendations and usage patterns
    Insights {
        /// Number of top products to show
        #[arg(long, default_value_t = DEFAULT_RECOMMENDATION_LIMIT)]
        limit: usize,

        /// Print the insights document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Terpene reference
    Terpenes {
        /// Show a single terpene
        name: Option<Terpene>,
    },

    /// Create a product from recognized label text
    Scan {
        /// Text file produced by an OCR engine
        file: PathBuf,

        #[arg(long)]
        name: String,

        #[arg(long = "type", value_name = "TYPE")]
        product_type: ProductType,

        #[arg(long)]
        route: ConsumptionRoute,

        /// Only print what was read, do not save
        #[arg(long)]
        dry_run: bool,
    },

    /// Write every product, session and check-in as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Add the contents of an export document
    Import {
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// Add a product
    Add(ProductFields),

    /// List products, newest first
    List,

    /// Show a product with its effect summary
    Show { id: ProductId },

    /// Delete a product with its sessions and check-ins
    Delete { id: ProductId },
}

#[derive(ClapArgs, Debug)]
pub struct ProductFields {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub brand: Option<String>,

    #[arg(long = "type", value_name = "TYPE")]
    pub product_type: ProductType,

    #[arg(long)]
    pub route: ConsumptionRoute,

    #[arg(long)]
    pub thc: Option<f64>,

    #[arg(long)]
    pub cbd: Option<f64>,

    #[arg(long)]
    pub cbg: Option<f64>,

    #[arg(long)]
    pub thcv: Option<f64>,

    /// Terpene concentration, e.g. --terpene myrcene=0.8 (repeatable)
    #[arg(long = "terpene", value_name = "NAME=PERCENT", value_parser = parse_terpene)]
    pub terpenes: Vec<(Terpene, f64)>,

    /// Free-form list of other terpenes
    #[arg(long)]
    pub other_terpenes: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Log a session
    Log(SessionFields),

    /// List sessions, most recent first
    List {
        /// Only sessions of this product
        #[arg(long)]
        product: Option<ProductId>,
    },

    /// Delete a session with its check-ins
    Delete { id: SessionId },
}

#[derive(ClapArgs, Debug)]
pub struct SessionFields {
    #[arg(long)]
    pub product: ProductId,

    /// Session time as RFC 3339 (defaults to now)
    #[arg(long, value_name = "DATETIME")]
    pub at: Option<DateTime<Utc>>,

    #[arg(long)]
    pub dose_mg: Option<f64>,

    #[arg(long)]
    pub dose_units: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub with_company: bool,

    #[arg(long)]
    pub caffeine: bool,

    #[arg(long)]
    pub alcohol: bool,

    #[arg(long)]
    pub food: bool,

    /// Last night's sleep, 1-5
    #[arg(long)]
    pub sleep_quality: Option<u8>,

    /// Mood before the session, 1-10
    #[arg(long)]
    pub mood: Option<u8>,

    /// Stress before the session, 1-10
    #[arg(long)]
    pub stress: Option<u8>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CheckInCommand {
    /// Record how a session feels after some minutes
    Add {
        #[arg(long)]
        session: SessionId,

        /// Minutes since the session started
        #[arg(long, default_value_t = CHECKPOINT_MINUTES[0])]
        minutes: i64,

        /// Effect rating 0-10, e.g. --rating euphoric=7 (repeatable)
        #[arg(long = "rating", value_name = "EFFECT=VALUE", value_parser = parse_rating)]
        ratings: Vec<(Effect, u8)>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List the check-ins of a session
    List {
        #[arg(long)]
        session: SessionId,
    },
}

fn split_pair(s: &str) -> Result<(&str, &str), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))
}

fn parse_terpene(s: &str) -> Result<(Terpene, f64), String> {
    let (name, value) = split_pair(s)?;
    let terpene = name.parse::<Terpene>().map_err(|e| e.to_string())?;
    let value = value.parse::<f64>().map_err(|e| format!("invalid percentage '{}': {}", value, e))?;
    Ok((terpene, value))
}

fn parse_rating(s: &str) -> Result<(Effect, u8), String> {
    let (name, value) = split_pair(s)?;
    let effect = name.parse::<Effect>().map_err(|e| e.to_string())?;
    let value = value.parse::<u8>().map_err(|e| format!("invalid rating '{}': {}", value, e))?;
    Ok((effect, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs() {
        assert_eq!(parse_terpene("Myrcene=0.8").unwrap(), (Terpene::Myrcene, 0.8));
        assert_eq!(parse_rating("dry-mouth = 3").unwrap(), (Effect::DryMouth, 3));
        assert!(parse_rating("euphoric").is_err());
        assert!(parse_terpene("cbn=1").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
