//! Analytics engine tests against an injected in-memory store

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use vapelog_common::analytics::{Confidence, TimeOfDay, BEST_RESULTS_FOR};
use vapelog_common::db::init_memory_database;
use vapelog_common::models::{
    CheckIn, ConsumptionRoute, Effect, Product, ProductId, ProductType, Session, Terpene,
};
use vapelog_common::{AnalyticsEngine, EntityStore, MemoryStore, SqliteStore};

fn engine() -> (Arc<MemoryStore>, AnalyticsEngine<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Arc::clone(&store), AnalyticsEngine::new(store))
}

/// Insert a product created `age_days` ago so list order is deterministic
async fn add_product(store: &dyn EntityStore, name: &str, age_days: i64) -> ProductId {
    let mut product = Product::new(name, ProductType::Vape, ConsumptionRoute::Inhalation);
    product.created_at = vapelog_common::time::truncate_to_storage(Utc::now() - Duration::days(age_days));
    product.updated_at = product.created_at;
    store.insert_product(&product).await.unwrap().id.unwrap()
}

/// One session at `hour` UTC with a single check-in rating `positive`/`negative`
async fn add_rated_session(
    store: &dyn EntityStore,
    product_id: ProductId,
    hour: u32,
    positive: Option<u8>,
    negative: Option<u8>,
) {
    let date_time = Utc.with_ymd_and_hms(2025, 5, 4, hour, 0, 0).unwrap();
    let session = store.insert_session(&Session::new(product_id, date_time)).await.unwrap();

    let mut check_in = CheckIn::new(session.id.unwrap(), 60);
    check_in.set_rating(Effect::Euphoric, positive);
    check_in.set_rating(Effect::Groggy, negative);
    store.insert_check_in(&check_in).await.unwrap();
}

#[tokio::test]
async fn test_product_without_check_ins_is_no_data() {
    let (store, engine) = engine();
    let id = add_product(&*store, "Quiet", 0).await;
    store
        .insert_session(&Session::new(id, Utc::now()))
        .await
        .unwrap();

    assert_eq!(engine.product_effects(id).await.unwrap(), None);
    assert!(engine.top_products(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_zero_feedback_is_not_no_data() {
    let (store, engine) = engine();
    let id = add_product(&*store, "Flat", 0).await;
    add_rated_session(&*store, id, 12, None, None).await;

    let effects = engine.product_effects(id).await.unwrap().expect("has check-ins");
    assert_eq!(effects.positive, 0.0);
    assert_eq!(effects.negative, 0.0);
    assert_eq!(effects.check_ins, 1);
}

#[tokio::test]
async fn test_product_effects_average_over_sessions() {
    let (store, engine) = engine();
    let id = add_product(&*store, "Mixed", 0).await;
    add_rated_session(&*store, id, 9, Some(8), Some(2)).await;
    add_rated_session(&*store, id, 19, Some(4), None).await;

    let effects = engine.product_effects(id).await.unwrap().unwrap();
    assert!((effects.positive - 6.0).abs() < 1e-9);
    assert!((effects.negative - 1.0).abs() < 1e-9);
    assert_eq!(effects.check_ins, 2);
}

#[tokio::test]
async fn test_top_products_ranking_and_limits() {
    let (store, engine) = engine();
    let low = add_product(&*store, "Low", 3).await;
    let high = add_product(&*store, "High", 2).await;
    let negative = add_product(&*store, "Harsh", 1).await;
    add_product(&*store, "Unrated", 0).await;

    add_rated_session(&*store, low, 10, Some(5), Some(3)).await;
    add_rated_session(&*store, high, 10, Some(9), Some(1)).await;
    add_rated_session(&*store, negative, 10, Some(1), Some(6)).await;

    assert!(engine.top_products(0).await.unwrap().is_empty());

    let all = engine.top_products(50).await.unwrap();
    let names: Vec<&str> = all.iter().map(|r| r.product.name.as_str()).collect();
    assert_eq!(names, vec!["High", "Low", "Harsh"]);
    assert!((all[0].score - 8.0).abs() < 1e-9);
    assert!((all[2].score + 5.0).abs() < 1e-9, "scores are never clamped");

    let top = engine.top_products(1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].product.name, "High");
    assert_eq!(top[0].confidence, Confidence::Low);
    assert_eq!(top[0].reason, "Based on your past experiences with similar products");
}

#[tokio::test]
async fn test_equal_scores_keep_newest_first() {
    let (store, engine) = engine();
    let older = add_product(&*store, "Older", 5).await;
    let newer = add_product(&*store, "Newer", 1).await;
    add_rated_session(&*store, older, 10, Some(6), None).await;
    add_rated_session(&*store, newer, 10, Some(6), None).await;

    let names: Vec<String> = engine
        .top_products(3)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.product.name)
        .collect();
    assert_eq!(names, vec!["Newer", "Older"]);
}

#[tokio::test]
async fn test_confidence_follows_session_count() {
    let (store, engine) = engine();
    let id = add_product(&*store, "Regular", 0).await;
    assert_eq!(engine.confidence(id).await.unwrap(), Confidence::Low);

    for expected in [Confidence::Low, Confidence::Medium, Confidence::Medium, Confidence::Medium, Confidence::High] {
        add_rated_session(&*store, id, 15, Some(5), None).await;
        assert_eq!(engine.confidence(id).await.unwrap(), expected);
    }
}

#[tokio::test]
async fn test_readiness_and_insights_gate() {
    let (store, engine) = engine();
    let id = add_product(&*store, "Daily", 0).await;

    for _ in 0..14 {
        add_rated_session(&*store, id, 21, Some(7), None).await;
    }

    let readiness = engine.readiness().await.unwrap();
    assert_eq!(readiness.total_sessions, 14);
    assert_eq!(readiness.sessions_until_ready, 1);
    assert!(!readiness.is_ready);

    let insights = engine.insights(3).await.unwrap();
    assert!(insights.top_products.is_none());
    assert_eq!(insights.best_results_for, BEST_RESULTS_FOR);

    add_rated_session(&*store, id, 21, Some(7), None).await;

    let insights = engine.insights(3).await.unwrap();
    assert!(insights.readiness.is_ready);
    assert_eq!(insights.readiness.progress, 1.0);
    let top = insights.top_products.expect("ready");
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].confidence, Confidence::High);
}

#[tokio::test]
async fn test_most_common_time_of_day() {
    let (store, engine) = engine();
    assert_eq!(engine.most_common_time_of_day_in(&Utc).await.unwrap(), None);

    let id = add_product(&*store, "Evening", 0).await;
    for hour in [18, 19, 13] {
        add_rated_session(&*store, id, hour, None, None).await;
    }

    assert_eq!(
        engine.most_common_time_of_day_in(&Utc).await.unwrap(),
        Some(TimeOfDay::Evening)
    );
}

#[tokio::test]
async fn test_favorite_terpene_weighted_by_feedback() {
    let (store, engine) = engine();
    assert_eq!(engine.favorite_terpene().await.unwrap(), None);

    let mut a = Product::new("A", ProductType::Vape, ConsumptionRoute::Inhalation);
    a.limonene = Some(10.0);
    let a = store.insert_product(&a).await.unwrap().id.unwrap();

    let mut b = Product::new("B", ProductType::Vape, ConsumptionRoute::Inhalation);
    b.myrcene = Some(10.0);
    let b = store.insert_product(&b).await.unwrap().id.unwrap();

    add_rated_session(&*store, a, 10, Some(2), None).await;
    add_rated_session(&*store, b, 10, Some(1), None).await;

    assert_eq!(engine.favorite_terpene().await.unwrap(), Some(Terpene::Limonene));
}

#[tokio::test]
async fn test_engine_over_sqlite_store() {
    let pool = init_memory_database().await.unwrap();
    let store: Arc<dyn EntityStore> = Arc::new(SqliteStore::new(pool));
    let engine = AnalyticsEngine::new(Arc::clone(&store));

    let mut product = Product::new("Terp Heavy", ProductType::Concentrate, ConsumptionRoute::Inhalation);
    product.myrcene = Some(1.2);
    product.limonene = Some(0.9);
    product.pinene = Some(0.9);
    let id = store.insert_product(&product).await.unwrap().id.unwrap();
    add_rated_session(&*store, id, 8, Some(6), Some(1)).await;

    let top = engine.top_products(3).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].reason, "Based on your positive responses to Myrcene and Limonene");
    assert_eq!(engine.favorite_terpene().await.unwrap(), Some(Terpene::Myrcene));

    let engine_clone = engine.clone();
    assert_eq!(engine_clone.readiness().await.unwrap().total_sessions, 1);
}

#[tokio::test]
async fn test_store_failures_are_not_reported_as_no_data() {
    // An empty, working store answers with "no data"
    let empty = AnalyticsEngine::new(Arc::new(SqliteStore::new(init_memory_database().await.unwrap())));
    assert_eq!(empty.product_effects(1).await.unwrap(), None);
    assert!(empty.top_products(3).await.unwrap().is_empty());
    assert_eq!(empty.favorite_terpene().await.unwrap(), None);
    assert_eq!(empty.most_common_time_of_day_in(&Utc).await.unwrap(), None);
    assert_eq!(empty.readiness().await.unwrap().total_sessions, 0);

    // The same calls over a closed pool must fail
    let pool = init_memory_database().await.unwrap();
    let broken = AnalyticsEngine::new(Arc::new(SqliteStore::new(pool.clone())));
    pool.close().await;

    let failures = [
        broken.product_effects(1).await.err(),
        broken.top_products(3).await.err(),
        broken.favorite_terpene().await.err(),
        broken.most_common_time_of_day_in(&Utc).await.err(),
        broken.readiness().await.err(),
        broken.confidence(1).await.err(),
        broken.insights(3).await.err(),
    ];
    for (index, failure) in failures.into_iter().enumerate() {
        let err = failure.unwrap_or_else(|| panic!("operation {} swallowed a store failure", index));
        assert!(err.is_storage_failure(), "operation {}: {}", index, err);
    }
}
