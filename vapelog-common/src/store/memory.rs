//! In-memory entity store
//!
//! Same contract as the SQLite store, including cascade deletes and
//! never-reused ids. Every call works on one locked snapshot.

use crate::models::{CheckIn, CheckInId, Product, ProductId, Session, SessionId};
use crate::store::EntityStore;
use crate::time::{now, truncate_to_storage};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    sessions: BTreeMap<SessionId, Session>,
    check_ins: BTreeMap<CheckInId, CheckIn>,
    next_product_id: i64,
    next_session_id: i64,
    next_check_in_id: i64,
}

impl Tables {
    fn sessions_for_product(&self, product_id: ProductId) -> Vec<Session> {
        let mut sessions: Vec<Session> = self
            .sessions
            .values()
            .filter(|s| s.product_id == product_id)
            .cloned()
            .collect();
        sort_sessions(&mut sessions);
        sessions
    }

    fn check_ins_for_session(&self, session_id: SessionId) -> Vec<CheckIn> {
        let mut check_ins: Vec<CheckIn> = self
            .check_ins
            .values()
            .filter(|c| c.session_id == session_id)
            .cloned()
            .collect();
        // BTreeMap iteration already yields id order, so the stable sort keeps it for ties
        check_ins.sort_by_key(|c| c.minutes_after);
        check_ins
    }

    fn remove_session_cascade(&mut self, session_id: SessionId) {
        self.sessions.remove(&session_id);
        self.check_ins.retain(|_, c| c.session_id != session_id);
    }
}

/// Timestamps at the precision the SQLite store keeps
fn stored_product(product: &Product, id: ProductId) -> Product {
    Product {
        id: Some(id),
        created_at: truncate_to_storage(product.created_at),
        updated_at: truncate_to_storage(product.updated_at),
        ..product.clone()
    }
}

fn stored_session(session: &Session, id: SessionId) -> Session {
    Session {
        id: Some(id),
        date_time: truncate_to_storage(session.date_time),
        created_at: truncate_to_storage(session.created_at),
        updated_at: truncate_to_storage(session.updated_at),
        ..session.clone()
    }
}

fn stored_check_in(check_in: &CheckIn, id: CheckInId) -> CheckIn {
    CheckIn {
        id: Some(id),
        timestamp: truncate_to_storage(check_in.timestamp),
        created_at: truncate_to_storage(check_in.created_at),
        ..check_in.clone()
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Most recent dateTime first, newest id first on ties
fn sort_sessions(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| b.date_time.cmp(&a.date_time).then(b.id.cmp(&a.id)));
}

/// Entity store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<Product> {
        product.validate()?;

        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.next_product_id);
        let stored = stored_product(product, id);
        tables.products.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        let tables = self.tables.read().await;
        tables
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("product {}", id)))
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        let mut products: Vec<Product> = tables.products.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(products)
    }

    async fn update_product(&self, product: &Product) -> Result<Product> {
        let id = product
            .id
            .ok_or_else(|| Error::InvalidInput("Cannot update a product without an id".to_string()))?;
        product.validate()?;

        let mut tables = self.tables.write().await;
        let slot = tables
            .products
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("product {}", id)))?;

        *slot = Product {
            created_at: slot.created_at,
            updated_at: now(),
            ..stored_product(product, id)
        };
        Ok(slot.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.products.remove(&id).is_none() {
            return Err(Error::NotFound(format!("product {}", id)));
        }

        let orphaned: Vec<SessionId> = tables
            .sessions
            .values()
            .filter(|s| s.product_id == id)
            .filter_map(|s| s.id)
            .collect();
        for session_id in orphaned {
            tables.remove_session_cascade(session_id);
        }

        Ok(())
    }

    async fn insert_session(&self, session: &Session) -> Result<Session> {
        session.validate()?;

        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&session.product_id) {
            return Err(Error::ConstraintViolation(format!(
                "session for product {} references a missing parent",
                session.product_id
            )));
        }

        let id = next_id(&mut tables.next_session_id);
        let stored = stored_session(session, id);
        tables.sessions.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_session(&self, id: SessionId) -> Result<Session> {
        let tables = self.tables.read().await;
        tables
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("session {}", id)))
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        let tables = self.tables.read().await;
        let mut sessions: Vec<Session> = tables.sessions.values().cloned().collect();
        sort_sessions(&mut sessions);
        Ok(sessions)
    }

    async fn list_sessions_for_product(&self, product_id: ProductId) -> Result<Vec<Session>> {
        Ok(self.tables.read().await.sessions_for_product(product_id))
    }

    async fn update_session(&self, session: &Session) -> Result<Session> {
        let id = session
            .id
            .ok_or_else(|| Error::InvalidInput("Cannot update a session without an id".to_string()))?;
        session.validate()?;

        let mut tables = self.tables.write().await;
        if !tables.sessions.contains_key(&id) {
            return Err(Error::NotFound(format!("session {}", id)));
        }
        if !tables.products.contains_key(&session.product_id) {
            return Err(Error::ConstraintViolation(format!(
                "session {} references a missing parent",
                id
            )));
        }

        let slot = tables
            .sessions
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("session {}", id)))?;

        *slot = Session {
            created_at: slot.created_at,
            updated_at: now(),
            ..stored_session(session, id)
        };
        Ok(slot.clone())
    }

    async fn delete_session(&self, id: SessionId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.sessions.contains_key(&id) {
            return Err(Error::NotFound(format!("session {}", id)));
        }
        tables.remove_session_cascade(id);
        Ok(())
    }

    async fn count_sessions(&self) -> Result<usize> {
        Ok(self.tables.read().await.sessions.len())
    }

    async fn insert_check_in(&self, check_in: &CheckIn) -> Result<CheckIn> {
        check_in.validate()?;

        let mut tables = self.tables.write().await;
        if !tables.sessions.contains_key(&check_in.session_id) {
            return Err(Error::ConstraintViolation(format!(
                "check-in for session {} references a missing parent",
                check_in.session_id
            )));
        }

        let id = next_id(&mut tables.next_check_in_id);
        let stored = stored_check_in(check_in, id);
        tables.check_ins.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_check_in(&self, id: CheckInId) -> Result<CheckIn> {
        let tables = self.tables.read().await;
        tables
            .check_ins
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("check-in {}", id)))
    }

    async fn list_check_ins(&self) -> Result<Vec<CheckIn>> {
        let tables = self.tables.read().await;
        let mut check_ins: Vec<CheckIn> = tables.check_ins.values().cloned().collect();
        check_ins.sort_by_key(|c| (c.session_id, c.minutes_after));
        Ok(check_ins)
    }

    async fn list_check_ins_for_session(&self, session_id: SessionId) -> Result<Vec<CheckIn>> {
        Ok(self.tables.read().await.check_ins_for_session(session_id))
    }

    async fn update_check_in(&self, check_in: &CheckIn) -> Result<CheckIn> {
        let id = check_in
            .id
            .ok_or_else(|| Error::InvalidInput("Cannot update a check-in without an id".to_string()))?;
        check_in.validate()?;

        let mut tables = self.tables.write().await;
        if !tables.check_ins.contains_key(&id) {
            return Err(Error::NotFound(format!("check-in {}", id)));
        }
        if !tables.sessions.contains_key(&check_in.session_id) {
            return Err(Error::ConstraintViolation(format!(
                "check-in {} references a missing parent",
                id
            )));
        }

        let slot = tables
            .check_ins
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("check-in {}", id)))?;

        *slot = CheckIn {
            created_at: slot.created_at,
            ..stored_check_in(check_in, id)
        };
        Ok(slot.clone())
    }

    async fn delete_check_in(&self, id: CheckInId) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .check_ins
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("check-in {}", id)))
    }

    async fn check_ins_for_product(&self, product_id: ProductId) -> Result<Vec<CheckIn>> {
        let tables = self.tables.read().await;
        let check_ins = tables
            .sessions_for_product(product_id)
            .iter()
            .filter_map(|s| s.id)
            .flat_map(|session_id| tables.check_ins_for_session(session_id))
            .collect();
        Ok(check_ins)
    }
}
