//! Entity models
//!
//! Field names serialize in camelCase so export documents mirror the entity
//! attribute names used by every front end.

pub mod check_in;
pub mod product;
pub mod session;
pub mod terpene;

pub use check_in::{CheckIn, Effect, Polarity, CHECKPOINT_MINUTES};
pub use product::{Cannabinoid, ConsumptionRoute, Product, ProductType};
pub use session::Session;
pub use terpene::{Terpene, TerpeneInfo, REFERENCE};

/// Product identity (SQLite rowid, never reused)
pub type ProductId = i64;
/// Session identity
pub type SessionId = i64;
/// Check-in identity
pub type CheckInId = i64;
