//! Entity store abstraction
//!
//! The engine never talks to a database directly: it is handed an
//! [`EntityStore`] at construction. [`SqliteStore`] is the on-device
//! implementation; [`MemoryStore`] backs tests and throwaway sessions.
//!
//! Ordering contract for list operations:
//! - products by `createdAt` descending
//! - sessions by `dateTime` descending
//! - check-ins of one session by `minutesAfter` ascending

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::models::{CheckIn, CheckInId, Product, ProductId, Session, SessionId};
use crate::Result;
use async_trait::async_trait;

/// Storage backend trait defining all required operations
///
/// Lookups, updates and deletes of a missing id fail with
/// [`Error::NotFound`](crate::Error::NotFound). Inserting a session or
/// check-in whose parent does not exist fails with
/// [`Error::ConstraintViolation`](crate::Error::ConstraintViolation).
/// Deleting a product removes its sessions and their check-ins.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Store a new product; returns it with its assigned id
    async fn insert_product(&self, product: &Product) -> Result<Product>;

    async fn get_product(&self, id: ProductId) -> Result<Product>;

    /// All products, newest first
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Replace a stored product; `updatedAt` is refreshed
    async fn update_product(&self, product: &Product) -> Result<Product>;

    /// Delete a product with its sessions and check-ins
    async fn delete_product(&self, id: ProductId) -> Result<()>;

    /// Store a new session; returns it with its assigned id
    async fn insert_session(&self, session: &Session) -> Result<Session>;

    async fn get_session(&self, id: SessionId) -> Result<Session>;

    /// All sessions, most recent `dateTime` first
    async fn list_sessions(&self) -> Result<Vec<Session>>;

    /// Sessions of one product, most recent `dateTime` first
    async fn list_sessions_for_product(&self, product_id: ProductId) -> Result<Vec<Session>>;

    /// Replace a stored session; `updatedAt` is refreshed
    async fn update_session(&self, session: &Session) -> Result<Session>;

    /// Delete a session with its check-ins
    async fn delete_session(&self, id: SessionId) -> Result<()>;

    /// Total number of sessions
    async fn count_sessions(&self) -> Result<usize>;

    /// Store a new check-in; returns it with its assigned id
    async fn insert_check_in(&self, check_in: &CheckIn) -> Result<CheckIn>;

    async fn get_check_in(&self, id: CheckInId) -> Result<CheckIn>;

    /// Every check-in, grouped by session, each group by `minutesAfter`
    async fn list_check_ins(&self) -> Result<Vec<CheckIn>>;

    /// Check-ins of one session by `minutesAfter` ascending
    async fn list_check_ins_for_session(&self, session_id: SessionId) -> Result<Vec<CheckIn>>;

    async fn update_check_in(&self, check_in: &CheckIn) -> Result<CheckIn>;

    async fn delete_check_in(&self, id: CheckInId) -> Result<()>;

    /// Number of sessions logged for one product
    async fn count_sessions_for_product(&self, product_id: ProductId) -> Result<usize> {
        Ok(self.list_sessions_for_product(product_id).await?.len())
    }

    /// Every check-in recorded against any session of one product
    ///
    /// Backends that can should answer from a single snapshot; the default
    /// walks sessions and then their check-ins.
    async fn check_ins_for_product(&self, product_id: ProductId) -> Result<Vec<CheckIn>> {
        let mut check_ins = Vec::new();
        for session in self.list_sessions_for_product(product_id).await? {
            let Some(session_id) = session.id else { continue };
            check_ins.extend(self.list_check_ins_for_session(session_id).await?);
        }
        Ok(check_ins)
    }
}
