//! SQLite-backed entity store
//!
//! Timestamps are stored as fixed-width RFC 3339 text (see [`crate::time`]),
//! ratings and ordinal scales as INTEGER, booleans as 0/1.

use crate::models::{CheckIn, CheckInId, Effect, Product, ProductId, Session, SessionId};
use crate::store::EntityStore;
use crate::{time, Error, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

const PRODUCT_COLUMNS: &str = r#"
    id, name, brand, type, route,
    thcPercent, cbdPercent, cbgPercent, thcvPercent,
    myrcene, limonene, pinene, caryophyllene, humulene, linalool, terpinolene, ocimene,
    otherTerpenes, notes, createdAt, updatedAt
"#;

const SESSION_COLUMNS: &str = r#"
    id, productId, dateTime, doseMg, doseUnits, location,
    withCompany, hadCaffeine, hadAlcohol, hadFood,
    sleepQuality, preMood, preStress, notes, createdAt, updatedAt
"#;

const CHECK_IN_COLUMNS: &str = r#"
    id, sessionId, minutesAfter, timestamp,
    awake, active, cerebral, social, euphoric, creative, focused,
    tired, groggy, anxious, antisocial, paranoia, dryMouth, dryEyes, racingHeart,
    notes, createdAt
"#;

/// Entity store over a shared SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an initialized pool (see [`crate::db::init_database`])
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Map foreign key failures to ConstraintViolation, everything else to Database
fn map_write_error(err: sqlx::Error, what: &str) -> Error {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            Error::ConstraintViolation(format!("{} references a missing parent", what))
        }
        other => Error::Database(other),
    }
}

fn small_int(row: &SqliteRow, column: &str) -> Result<Option<u8>> {
    let value: Option<i64> = row.try_get(column)?;
    value
        .map(|v| {
            u8::try_from(v)
                .map_err(|_| Error::Internal(format!("{} out of range in database: {}", column, v)))
        })
        .transpose()
}

fn timestamp(row: &SqliteRow, column: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    let value: String = row.try_get(column)?;
    time::from_db(column, &value)
}

fn product_from_row(row: &SqliteRow) -> Result<Product> {
    let product_type: String = row.try_get("type")?;
    let route: String = row.try_get("route")?;

    Ok(Product {
        id: Some(row.try_get("id")?),
        name: row.try_get("name")?,
        brand: row.try_get("brand")?,
        product_type: product_type
            .parse()
            .map_err(|_| Error::Internal(format!("Unknown product type in database: {}", product_type)))?,
        route: route
            .parse()
            .map_err(|_| Error::Internal(format!("Unknown route in database: {}", route)))?,
        thc_percent: row.try_get("thcPercent")?,
        cbd_percent: row.try_get("cbdPercent")?,
        cbg_percent: row.try_get("cbgPercent")?,
        thcv_percent: row.try_get("thcvPercent")?,
        myrcene: row.try_get("myrcene")?,
        limonene: row.try_get("limonene")?,
        pinene: row.try_get("pinene")?,
        caryophyllene: row.try_get("caryophyllene")?,
        humulene: row.try_get("humulene")?,
        linalool: row.try_get("linalool")?,
        terpinolene: row.try_get("terpinolene")?,
        ocimene: row.try_get("ocimene")?,
        other_terpenes: row.try_get("otherTerpenes")?,
        notes: row.try_get("notes")?,
        created_at: timestamp(row, "createdAt")?,
        updated_at: timestamp(row, "updatedAt")?,
    })
}

fn session_from_row(row: &SqliteRow) -> Result<Session> {
    Ok(Session {
        id: Some(row.try_get("id")?),
        product_id: row.try_get("productId")?,
        date_time: timestamp(row, "dateTime")?,
        dose_mg: row.try_get("doseMg")?,
        dose_units: row.try_get("doseUnits")?,
        location: row.try_get("location")?,
        with_company: row.try_get("withCompany")?,
        had_caffeine: row.try_get("hadCaffeine")?,
        had_alcohol: row.try_get("hadAlcohol")?,
        had_food: row.try_get("hadFood")?,
        sleep_quality: small_int(row, "sleepQuality")?,
        pre_mood: small_int(row, "preMood")?,
        pre_stress: small_int(row, "preStress")?,
        notes: row.try_get("notes")?,
        created_at: timestamp(row, "createdAt")?,
        updated_at: timestamp(row, "updatedAt")?,
    })
}

fn check_in_from_row(row: &SqliteRow) -> Result<CheckIn> {
    let mut check_in = CheckIn {
        id: Some(row.try_get("id")?),
        session_id: row.try_get("sessionId")?,
        minutes_after: row.try_get("minutesAfter")?,
        timestamp: timestamp(row, "timestamp")?,
        notes: row.try_get("notes")?,
        created_at: timestamp(row, "createdAt")?,
        ..CheckIn::new(0, 0)
    };

    for effect in Effect::all() {
        check_in.set_rating(effect, small_int(row, effect.field_name())?);
    }

    Ok(check_in)
}

fn collect<T>(rows: Vec<SqliteRow>, decode: fn(&SqliteRow) -> Result<T>) -> Result<Vec<T>> {
    rows.iter().map(decode).collect()
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn insert_product(&self, product: &Product) -> Result<Product> {
        product.validate()?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (
                name, brand, type, route,
                thcPercent, cbdPercent, cbgPercent, thcvPercent,
                myrcene, limonene, pinene, caryophyllene, humulene, linalool, terpinolene, ocimene,
                otherTerpenes, notes, createdAt, updatedAt
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.product_type.as_str())
        .bind(product.route.as_str())
        .bind(product.thc_percent)
        .bind(product.cbd_percent)
        .bind(product.cbg_percent)
        .bind(product.thcv_percent)
        .bind(product.myrcene)
        .bind(product.limonene)
        .bind(product.pinene)
        .bind(product.caryophyllene)
        .bind(product.humulene)
        .bind(product.linalool)
        .bind(product.terpinolene)
        .bind(product.ocimene)
        .bind(&product.other_terpenes)
        .bind(&product.notes)
        .bind(time::to_db(&product.created_at))
        .bind(time::to_db(&product.updated_at))
        .fetch_one(&self.pool)
        .await?;

        debug!("Inserted product {} ({})", id, product.name);
        self.get_product(id).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        let sql = format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("product {}", id)))?;

        product_from_row(&row)
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY createdAt DESC, id DESC",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        collect(rows, product_from_row)
    }

    async fn update_product(&self, product: &Product) -> Result<Product> {
        let id = product
            .id
            .ok_or_else(|| Error::InvalidInput("Cannot update a product without an id".to_string()))?;
        product.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?, brand = ?, type = ?, route = ?,
                thcPercent = ?, cbdPercent = ?, cbgPercent = ?, thcvPercent = ?,
                myrcene = ?, limonene = ?, pinene = ?, caryophyllene = ?,
                humulene = ?, linalool = ?, terpinolene = ?, ocimene = ?,
                otherTerpenes = ?, notes = ?, updatedAt = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.product_type.as_str())
        .bind(product.route.as_str())
        .bind(product.thc_percent)
        .bind(product.cbd_percent)
        .bind(product.cbg_percent)
        .bind(product.thcv_percent)
        .bind(product.myrcene)
        .bind(product.limonene)
        .bind(product.pinene)
        .bind(product.caryophyllene)
        .bind(product.humulene)
        .bind(product.linalool)
        .bind(product.terpinolene)
        .bind(product.ocimene)
        .bind(&product.other_terpenes)
        .bind(&product.notes)
        .bind(time::to_db(&time::now()))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("product {}", id)));
        }

        self.get_product(id).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        // Sessions and check-ins go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("product {}", id)));
        }

        debug!("Deleted product {}", id);
        Ok(())
    }

    async fn insert_session(&self, session: &Session) -> Result<Session> {
        session.validate()?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sessions (
                productId, dateTime, doseMg, doseUnits, location,
                withCompany, hadCaffeine, hadAlcohol, hadFood,
                sleepQuality, preMood, preStress, notes, createdAt, updatedAt
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(session.product_id)
        .bind(time::to_db(&session.date_time))
        .bind(session.dose_mg)
        .bind(&session.dose_units)
        .bind(&session.location)
        .bind(session.with_company)
        .bind(session.had_caffeine)
        .bind(session.had_alcohol)
        .bind(session.had_food)
        .bind(session.sleep_quality.map(i64::from))
        .bind(session.pre_mood.map(i64::from))
        .bind(session.pre_stress.map(i64::from))
        .bind(&session.notes)
        .bind(time::to_db(&session.created_at))
        .bind(time::to_db(&session.updated_at))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("session for product {}", session.product_id)))?;

        debug!("Inserted session {} for product {}", id, session.product_id);
        self.get_session(id).await
    }

    async fn get_session(&self, id: SessionId) -> Result<Session> {
        let sql = format!("SELECT {} FROM sessions WHERE id = ?", SESSION_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("session {}", id)))?;

        session_from_row(&row)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        let sql = format!(
            "SELECT {} FROM sessions ORDER BY dateTime DESC, id DESC",
            SESSION_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        collect(rows, session_from_row)
    }

    async fn list_sessions_for_product(&self, product_id: ProductId) -> Result<Vec<Session>> {
        let sql = format!(
            "SELECT {} FROM sessions WHERE productId = ? ORDER BY dateTime DESC, id DESC",
            SESSION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows, session_from_row)
    }

    async fn update_session(&self, session: &Session) -> Result<Session> {
        let id = session
            .id
            .ok_or_else(|| Error::InvalidInput("Cannot update a session without an id".to_string()))?;
        session.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                productId = ?, dateTime = ?, doseMg = ?, doseUnits = ?, location = ?,
                withCompany = ?, hadCaffeine = ?, hadAlcohol = ?, hadFood = ?,
                sleepQuality = ?, preMood = ?, preStress = ?, notes = ?, updatedAt = ?
            WHERE id = ?
            "#,
        )
        .bind(session.product_id)
        .bind(time::to_db(&session.date_time))
        .bind(session.dose_mg)
        .bind(&session.dose_units)
        .bind(&session.location)
        .bind(session.with_company)
        .bind(session.had_caffeine)
        .bind(session.had_alcohol)
        .bind(session.had_food)
        .bind(session.sleep_quality.map(i64::from))
        .bind(session.pre_mood.map(i64::from))
        .bind(session.pre_stress.map(i64::from))
        .bind(&session.notes)
        .bind(time::to_db(&time::now()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("session {}", id)))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("session {}", id)));
        }

        self.get_session(id).await
    }

    async fn delete_session(&self, id: SessionId) -> Result<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("session {}", id)));
        }

        Ok(())
    }

    async fn count_sessions(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&self.pool)
            .await?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    async fn insert_check_in(&self, check_in: &CheckIn) -> Result<CheckIn> {
        check_in.validate()?;

        let mut query = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO check_ins (
                sessionId, minutesAfter, timestamp,
                awake, active, cerebral, social, euphoric, creative, focused,
                tired, groggy, anxious, antisocial, paranoia, dryMouth, dryEyes, racingHeart,
                notes, createdAt
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(check_in.session_id)
        .bind(check_in.minutes_after)
        .bind(time::to_db(&check_in.timestamp));

        // Column order above matches Effect::all()
        for effect in Effect::all() {
            query = query.bind(check_in.rating(effect).map(i64::from));
        }

        let id = query
            .bind(&check_in.notes)
            .bind(time::to_db(&check_in.created_at))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &format!("check-in for session {}", check_in.session_id)))?;

        debug!("Inserted check-in {} for session {}", id, check_in.session_id);
        self.get_check_in(id).await
    }

    async fn get_check_in(&self, id: CheckInId) -> Result<CheckIn> {
        let sql = format!("SELECT {} FROM check_ins WHERE id = ?", CHECK_IN_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("check-in {}", id)))?;

        check_in_from_row(&row)
    }

    async fn list_check_ins(&self) -> Result<Vec<CheckIn>> {
        let sql = format!(
            "SELECT {} FROM check_ins ORDER BY sessionId ASC, minutesAfter ASC, id ASC",
            CHECK_IN_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        collect(rows, check_in_from_row)
    }

    async fn list_check_ins_for_session(&self, session_id: SessionId) -> Result<Vec<CheckIn>> {
        let sql = format!(
            "SELECT {} FROM check_ins WHERE sessionId = ? ORDER BY minutesAfter ASC, id ASC",
            CHECK_IN_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(session_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows, check_in_from_row)
    }

    async fn update_check_in(&self, check_in: &CheckIn) -> Result<CheckIn> {
        let id = check_in
            .id
            .ok_or_else(|| Error::InvalidInput("Cannot update a check-in without an id".to_string()))?;
        check_in.validate()?;

        let mut query = sqlx::query(
            r#"
            UPDATE check_ins SET
                sessionId = ?, minutesAfter = ?, timestamp = ?,
                awake = ?, active = ?, cerebral = ?, social = ?, euphoric = ?, creative = ?, focused = ?,
                tired = ?, groggy = ?, anxious = ?, antisocial = ?, paranoia = ?,
                dryMouth = ?, dryEyes = ?, racingHeart = ?,
                notes = ?
            WHERE id = ?
            "#,
        )
        .bind(check_in.session_id)
        .bind(check_in.minutes_after)
        .bind(time::to_db(&check_in.timestamp));

        for effect in Effect::all() {
            query = query.bind(check_in.rating(effect).map(i64::from));
        }

        let result = query
            .bind(&check_in.notes)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &format!("check-in {}", id)))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("check-in {}", id)));
        }

        self.get_check_in(id).await
    }

    async fn delete_check_in(&self, id: CheckInId) -> Result<()> {
        let result = sqlx::query("DELETE FROM check_ins WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("check-in {}", id)));
        }

        Ok(())
    }

    async fn count_sessions_for_product(&self, product_id: ProductId) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE productId = ?")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    async fn check_ins_for_product(&self, product_id: ProductId) -> Result<Vec<CheckIn>> {
        // One statement, one snapshot
        let columns = CHECK_IN_COLUMNS
            .split(',')
            .map(|c| format!("c.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT {}
            FROM check_ins c
            JOIN sessions s ON s.id = c.sessionId
            WHERE s.productId = ?
            ORDER BY s.dateTime DESC, c.minutesAfter ASC, c.id ASC
            "#,
            columns
        );
        let rows = sqlx::query(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows, check_in_from_row)
    }
}
