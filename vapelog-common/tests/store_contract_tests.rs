//! Store contract tests, run against both store implementations
//!
//! Every check is written once against `EntityStore` and executed for the
//! SQLite store (in-memory pool) and the plain in-memory store.

use chrono::{Duration, TimeZone, Utc};
use vapelog_common::db::init_memory_database;
use vapelog_common::models::{CheckIn, ConsumptionRoute, Effect, Product, ProductType, Session};
use vapelog_common::{EntityStore, Error, MemoryStore, SqliteStore};

async fn sqlite_store() -> SqliteStore {
    SqliteStore::new(init_memory_database().await.expect("memory database"))
}

fn product(name: &str) -> Product {
    Product::new(name, ProductType::Flower, ConsumptionRoute::Inhalation)
}

fn at(hour: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap()
}

async fn crud_round_trip(store: &dyn EntityStore) {
    let mut draft = product("Blue Dream");
    draft.thc_percent = Some(21.5);
    draft.myrcene = Some(0.8);
    draft.other_terpenes = Some("Bisabolol 0.1%".to_string());

    let stored = store.insert_product(&draft).await.unwrap();
    let id = stored.id.expect("assigned id");
    assert_eq!(store.get_product(id).await.unwrap(), stored);

    let mut changed = stored.clone();
    changed.notes = Some("Smooth".to_string());
    let updated = store.update_product(&changed).await.unwrap();
    assert_eq!(updated.notes.as_deref(), Some("Smooth"));
    assert_eq!(updated.created_at, stored.created_at);
    assert!(updated.updated_at >= stored.updated_at);

    let mut session = Session::new(id, at(20));
    session.dose_mg = Some(5.0);
    session.location = Some("Home".to_string());
    session.pre_mood = Some(6);
    let session = store.insert_session(&session).await.unwrap();
    let session_id = session.id.unwrap();
    assert_eq!(store.get_session(session_id).await.unwrap(), session);

    let mut check_in = CheckIn::new(session_id, 30);
    check_in.set_rating(Effect::Euphoric, Some(7));
    check_in.set_rating(Effect::DryMouth, Some(2));
    let check_in = store.insert_check_in(&check_in).await.unwrap();
    assert_eq!(store.get_check_in(check_in.id.unwrap()).await.unwrap(), check_in);
}

async fn missing_ids_are_not_found(store: &dyn EntityStore) {
    assert!(matches!(store.get_product(404).await, Err(Error::NotFound(_))));
    assert!(matches!(store.get_session(404).await, Err(Error::NotFound(_))));
    assert!(matches!(store.get_check_in(404).await, Err(Error::NotFound(_))));
    assert!(matches!(store.delete_product(404).await, Err(Error::NotFound(_))));

    let mut ghost = product("Ghost");
    ghost.id = Some(404);
    assert!(matches!(store.update_product(&ghost).await, Err(Error::NotFound(_))));
}

async fn orphans_are_rejected(store: &dyn EntityStore) {
    let session = Session::new(777, at(9));
    assert!(matches!(store.insert_session(&session).await, Err(Error::ConstraintViolation(_))));

    let check_in = CheckIn::new(777, 60);
    assert!(matches!(store.insert_check_in(&check_in).await, Err(Error::ConstraintViolation(_))));
}

async fn list_ordering(store: &dyn EntityStore) {
    let base = Utc::now();
    let mut older = product("Older");
    older.created_at = base - Duration::days(2);
    older.updated_at = older.created_at;
    let mut newer = product("Newer");
    newer.created_at = base - Duration::days(1);
    newer.updated_at = newer.created_at;

    let older = store.insert_product(&older).await.unwrap();
    store.insert_product(&newer).await.unwrap();

    let names: Vec<String> = store.list_products().await.unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Newer", "Older"]);

    let product_id = older.id.unwrap();
    for hour in [8, 22, 13] {
        store.insert_session(&Session::new(product_id, at(hour))).await.unwrap();
    }
    let hours: Vec<_> = store
        .list_sessions_for_product(product_id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.date_time)
        .collect();
    assert_eq!(hours, vec![at(22), at(13), at(8)]);

    let session_id = store.list_sessions().await.unwrap()[0].id.unwrap();
    for minutes in [120, 30, 60] {
        store.insert_check_in(&CheckIn::new(session_id, minutes)).await.unwrap();
    }
    let minutes: Vec<i64> = store
        .list_check_ins_for_session(session_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.minutes_after)
        .collect();
    assert_eq!(minutes, vec![30, 60, 120]);
    assert_eq!(store.count_sessions().await.unwrap(), 3);
    assert_eq!(store.count_sessions_for_product(product_id).await.unwrap(), 3);
    assert_eq!(store.check_ins_for_product(product_id).await.unwrap().len(), 3);
}

async fn deleting_product_cascades(store: &dyn EntityStore) {
    let kept = store.insert_product(&product("Kept")).await.unwrap();
    let doomed = store.insert_product(&product("Doomed")).await.unwrap();

    let kept_session = store.insert_session(&Session::new(kept.id.unwrap(), at(10))).await.unwrap();
    store.insert_check_in(&CheckIn::new(kept_session.id.unwrap(), 30)).await.unwrap();

    let doomed_session = store.insert_session(&Session::new(doomed.id.unwrap(), at(11))).await.unwrap();
    let doomed_check_in = store
        .insert_check_in(&CheckIn::new(doomed_session.id.unwrap(), 30))
        .await
        .unwrap();

    store.delete_product(doomed.id.unwrap()).await.unwrap();

    assert!(matches!(store.get_session(doomed_session.id.unwrap()).await, Err(Error::NotFound(_))));
    assert!(matches!(store.get_check_in(doomed_check_in.id.unwrap()).await, Err(Error::NotFound(_))));
    assert_eq!(store.count_sessions().await.unwrap(), 1);
    assert_eq!(store.list_check_ins().await.unwrap().len(), 1);
}

async fn deleting_session_cascades(store: &dyn EntityStore) {
    let product = store.insert_product(&product("Solo")).await.unwrap();
    let session = store.insert_session(&Session::new(product.id.unwrap(), at(12))).await.unwrap();
    store.insert_check_in(&CheckIn::new(session.id.unwrap(), 60)).await.unwrap();

    store.delete_session(session.id.unwrap()).await.unwrap();

    assert!(store.list_check_ins().await.unwrap().is_empty());
    assert_eq!(store.get_product(product.id.unwrap()).await.unwrap().name, "Solo");
}

async fn invalid_input_is_rejected(store: &dyn EntityStore) {
    let mut bad = product("Hot");
    bad.thc_percent = Some(120.0);
    assert!(matches!(store.insert_product(&bad).await, Err(Error::InvalidInput(_))));

    let parent = store.insert_product(&product("Parent")).await.unwrap();
    let session = store.insert_session(&Session::new(parent.id.unwrap(), at(7))).await.unwrap();
    let mut check_in = CheckIn::new(session.id.unwrap(), 30);
    check_in.set_rating(Effect::Anxious, Some(11));
    assert!(matches!(store.insert_check_in(&check_in).await, Err(Error::InvalidInput(_))));
}

async fn update_of_missing_entity_is_not_found(store: &dyn EntityStore) {
    // Parent ids are missing too; the entity's own id is checked first
    let mut session = Session::new(888, at(9));
    session.id = Some(404);
    assert!(matches!(store.update_session(&session).await, Err(Error::NotFound(_))));

    let mut check_in = CheckIn::new(888, 30);
    check_in.id = Some(404);
    assert!(matches!(store.update_check_in(&check_in).await, Err(Error::NotFound(_))));
}

async fn timestamps_stored_at_microseconds(store: &dyn EntityStore) {
    let precise = at(10) + Duration::nanoseconds(987_654_321);
    let mut draft = product("Precise");
    draft.created_at = precise;
    draft.updated_at = precise;
    let stored = store.insert_product(&draft).await.unwrap();

    let session = store
        .insert_session(&Session { date_time: precise, ..Session::new(stored.id.unwrap(), precise) })
        .await
        .unwrap();

    let fetched = store.get_session(session.id.unwrap()).await.unwrap();
    assert_eq!(fetched.date_time.timestamp_subsec_nanos(), 987_654_000);
    assert_eq!(
        store.get_product(stored.id.unwrap()).await.unwrap().created_at.timestamp_subsec_nanos(),
        987_654_000
    );
}

macro_rules! contract_test {
    ($name:ident) => {
        mod $name {
            use super::*;

            #[tokio::test]
            async fn sqlite() {
                super::$name(&sqlite_store().await).await;
            }

            #[tokio::test]
            async fn memory() {
                super::$name(&MemoryStore::new()).await;
            }
        }
    };
}

contract_test!(crud_round_trip);
contract_test!(missing_ids_are_not_found);
contract_test!(orphans_are_rejected);
contract_test!(list_ordering);
contract_test!(deleting_product_cascades);
contract_test!(deleting_session_cascades);
contract_test!(invalid_input_is_rejected);
contract_test!(update_of_missing_entity_is_not_found);
contract_test!(timestamps_stored_at_microseconds);
