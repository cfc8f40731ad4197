//! Export and import of the full data set
//!
//! One JSON document with `products`, `sessions`, `checkIns` and
//! `exportedAt`. Field names match the entity attributes so a document can
//! be imported back without loss.

use crate::models::{CheckIn, Product, ProductId, Session, SessionId};
use crate::store::EntityStore;
use crate::{time, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub products: Vec<Product>,
    pub sessions: Vec<Session>,
    pub check_ins: Vec<CheckIn>,
    pub exported_at: DateTime<Utc>,
}

impl ExportData {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Counts of entities created by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub products: usize,
    pub sessions: usize,
    pub check_ins: usize,
}

/// Snapshot every entity in the store
pub async fn export_all<S: EntityStore + ?Sized>(store: &S) -> Result<ExportData> {
    let data = ExportData {
        products: store.list_products().await?,
        sessions: store.list_sessions().await?,
        check_ins: store.list_check_ins().await?,
        exported_at: time::now(),
    };

    info!(
        "Exported {} products, {} sessions, {} check-ins",
        data.products.len(),
        data.sessions.len(),
        data.check_ins.len()
    );
    Ok(data)
}

/// Insert every entity of `data` as new records.
///
/// Each entity kind is inserted in ascending original id order, so orderings
/// that fall back to id (and check-in grouping by session) survive the trip.
/// Stored ids are freshly assigned; session and check-in parents are
/// remapped through them. A session or check-in whose parent is not in the
/// document fails with [`Error::ConstraintViolation`]. Records inserted
/// before the failure are kept.
pub async fn import_data<S: EntityStore + ?Sized>(store: &S, data: &ExportData) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    let mut product_ids: HashMap<ProductId, ProductId> = HashMap::new();
    let mut session_ids: HashMap<SessionId, SessionId> = HashMap::new();

    let mut products: Vec<&Product> = data.products.iter().collect();
    products.sort_by_key(|p| p.id);
    let mut sessions: Vec<&Session> = data.sessions.iter().collect();
    sessions.sort_by_key(|s| s.id);
    let mut check_ins: Vec<&CheckIn> = data.check_ins.iter().collect();
    check_ins.sort_by_key(|c| c.id);

    for product in products {
        let stored = store.insert_product(&Product { id: None, ..product.clone() }).await?;
        if let (Some(old), Some(new)) = (product.id, stored.id) {
            product_ids.insert(old, new);
        }
        summary.products += 1;
    }

    for session in sessions {
        let product_id = *product_ids.get(&session.product_id).ok_or_else(|| {
            Error::ConstraintViolation(format!(
                "Imported session references unknown product {}",
                session.product_id
            ))
        })?;

        let stored = store
            .insert_session(&Session { id: None, product_id, ..session.clone() })
            .await?;
        if let (Some(old), Some(new)) = (session.id, stored.id) {
            session_ids.insert(old, new);
        }
        summary.sessions += 1;
    }

    for check_in in check_ins {
        let session_id = *session_ids.get(&check_in.session_id).ok_or_else(|| {
            Error::ConstraintViolation(format!(
                "Imported check-in references unknown session {}",
                check_in.session_id
            ))
        })?;

        store
            .insert_check_in(&CheckIn { id: None, session_id, ..check_in.clone() })
            .await?;
        summary.check_ins += 1;
    }

    info!(
        "Imported {} products, {} sessions, {} check-ins",
        summary.products, summary.sessions, summary.check_ins
    );
    Ok(summary)
}
