//! SQLite-based storage implementation
//!
//! Each document is stored whole as JSON in a `doc` column, next to the
//! columns it is looked up or ordered by. Creation order is `rowid` order.

use std::sync::Mutex;

use chrono::SecondsFormat;
use cropadvisor_core::{Admin, Crop, ObjectId, Prediction, SelectedCrop, Timeline, User};
use rusqlite::{params, Connection, OptionalExtension, Params};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{AccountStore, CatalogStore, PredictionStore, StoreResult};
use crate::error::ApiError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQLite-based store implementing every store trait
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, ApiError> {
        let conn = Connection::open(path).map_err(internal)?;

        Self::migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), ApiError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(internal)?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, ApiError> {
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(internal)?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(internal)
    }

    /// Migration to version 1: initial schema
    fn migrate_v1(conn: &Connection) -> Result<(), ApiError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

            CREATE TABLE IF NOT EXISTS admins (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                doc TEXT NOT NULL
            );

            -- name_key is the lowercased scientific name
            CREATE TABLE IF NOT EXISTS crops (
                id TEXT PRIMARY KEY,
                name_key TEXT,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_crops_name_key ON crops(name_key);

            CREATE TABLE IF NOT EXISTS timelines (
                id TEXT PRIMARY KEY,
                name_key TEXT NOT NULL,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_timelines_name_key ON timelines(name_key);

            CREATE TABLE IF NOT EXISTS predictions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_predictions_user_id ON predictions(user_id);

            -- No foreign key: selections may outlive their prediction
            CREATE TABLE IF NOT EXISTS selected_crops (
                id TEXT PRIMARY KEY,
                prediction_id TEXT NOT NULL,
                selected_at TEXT NOT NULL,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_selected_prediction ON selected_crops(prediction_id);
            "#,
        )
        .map_err(internal)?;

        Ok(())
    }

    fn query_one<T, P>(&self, sql: &str, params: P) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned,
        P: Params,
    {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(sql, params, |row| row.get(0))
            .optional()
            .map_err(internal)?;
        raw.map(|doc| decode(&doc)).transpose()
    }

    fn query_all<T, P>(&self, sql: &str, params: P) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
        P: Params,
    {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql).map_err(internal)?;
        let docs = stmt
            .query_map(params, |row| row.get::<_, String>(0))
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal)?;
        docs.iter().map(|doc| decode(doc)).collect()
    }

    /// Run a write statement, returning the number of affected rows
    fn execute<P: Params>(&self, sql: &str, params: P) -> StoreResult<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(sql, params).map_err(internal)
    }
}

fn internal(e: impl ToString) -> ApiError {
    ApiError::Internal(e.to_string())
}

fn encode<T: Serialize>(doc: &T) -> StoreResult<String> {
    serde_json::to_string(doc).map_err(internal)
}

fn decode<T: DeserializeOwned>(doc: &str) -> StoreResult<T> {
    serde_json::from_str(doc).map_err(internal)
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn affected_or(rows: usize, missing: ApiError) -> StoreResult<()> {
    if rows == 0 {
        return Err(missing);
    }
    Ok(())
}

/// Map unique-constraint violations on the admins table
fn admin_write_error(e: rusqlite::Error) -> ApiError {
    if let rusqlite::Error::SqliteFailure(ref err, _) = e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            return ApiError::AdminAlreadyExists;
        }
    }
    internal(e)
}

impl AccountStore for SqliteStore {
    fn create_user(&self, user: &User) -> StoreResult<()> {
        self.execute(
            "INSERT INTO users (id, email, doc) VALUES (?1, ?2, ?3)",
            params![user.id.to_hex(), user.email, encode(user)?],
        )?;
        Ok(())
    }

    fn get_user(&self, id: ObjectId) -> StoreResult<Option<User>> {
        self.query_one("SELECT doc FROM users WHERE id = ?1", params![id.to_hex()])
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.query_one(
            "SELECT doc FROM users WHERE email = ?1 ORDER BY rowid LIMIT 1",
            params![email],
        )
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        self.query_all("SELECT doc FROM users ORDER BY rowid", [])
    }

    fn replace_user(&self, user: &User) -> StoreResult<()> {
        let rows = self.execute(
            "UPDATE users SET email = ?1, doc = ?2 WHERE id = ?3",
            params![user.email, encode(user)?, user.id.to_hex()],
        )?;
        affected_or(rows, ApiError::UserNotFound)
    }

    fn delete_user(&self, id: ObjectId) -> StoreResult<bool> {
        let rows = self.execute("DELETE FROM users WHERE id = ?1", params![id.to_hex()])?;
        Ok(rows > 0)
    }

    fn create_admin(&self, admin: &Admin) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO admins (id, email, doc) VALUES (?1, ?2, ?3)",
            params![admin.id.to_hex(), admin.email, encode(admin)?],
        )
        .map_err(admin_write_error)?;
        Ok(())
    }

    fn get_admin(&self, id: ObjectId) -> StoreResult<Option<Admin>> {
        self.query_one("SELECT doc FROM admins WHERE id = ?1", params![id.to_hex()])
    }

    fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        self.query_one("SELECT doc FROM admins WHERE email = ?1", params![email])
    }

    fn list_admins(&self) -> StoreResult<Vec<Admin>> {
        self.query_all("SELECT doc FROM admins ORDER BY rowid", [])
    }

    fn replace_admin(&self, admin: &Admin) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let rows = conn
            .execute(
                "UPDATE admins SET email = ?1, doc = ?2 WHERE id = ?3",
                params![admin.email, encode(admin)?, admin.id.to_hex()],
            )
            .map_err(admin_write_error)?;
        affected_or(rows, ApiError::AdminNotFound)
    }

    fn delete_admin(&self, id: ObjectId) -> StoreResult<bool> {
        let rows = self.execute("DELETE FROM admins WHERE id = ?1", params![id.to_hex()])?;
        Ok(rows > 0)
    }
}

impl CatalogStore for SqliteStore {
    fn create_crop(&self, crop: &Crop) -> StoreResult<()> {
        self.execute(
            "INSERT INTO crops (id, name_key, doc) VALUES (?1, ?2, ?3)",
            params![
                crop.id.to_hex(),
                crop.scientific_name.as_deref().map(name_key),
                encode(crop)?
            ],
        )?;
        Ok(())
    }

    fn get_crop(&self, id: ObjectId) -> StoreResult<Option<Crop>> {
        self.query_one("SELECT doc FROM crops WHERE id = ?1", params![id.to_hex()])
    }

    fn find_crop_by_scientific_name(&self, name: &str) -> StoreResult<Option<Crop>> {
        self.query_one(
            "SELECT doc FROM crops WHERE name_key = ?1 ORDER BY rowid LIMIT 1",
            params![name_key(name)],
        )
    }

    fn list_crops(&self) -> StoreResult<Vec<Crop>> {
        self.query_all("SELECT doc FROM crops ORDER BY rowid", [])
    }

    fn replace_crop(&self, crop: &Crop) -> StoreResult<()> {
        let rows = self.execute(
            "UPDATE crops SET name_key = ?1, doc = ?2 WHERE id = ?3",
            params![
                crop.scientific_name.as_deref().map(name_key),
                encode(crop)?,
                crop.id.to_hex()
            ],
        )?;
        affected_or(rows, ApiError::CropNotFound)
    }

    fn delete_crop(&self, id: ObjectId) -> StoreResult<bool> {
        let rows = self.execute("DELETE FROM crops WHERE id = ?1", params![id.to_hex()])?;
        Ok(rows > 0)
    }

    fn create_timeline(&self, timeline: &Timeline) -> StoreResult<()> {
        self.execute(
            "INSERT INTO timelines (id, name_key, doc) VALUES (?1, ?2, ?3)",
            params![
                timeline.id.to_hex(),
                name_key(&timeline.scientific_name),
                encode(timeline)?
            ],
        )?;
        Ok(())
    }

    fn get_timeline(&self, id: ObjectId) -> StoreResult<Option<Timeline>> {
        self.query_one("SELECT doc FROM timelines WHERE id = ?1", params![id.to_hex()])
    }

    fn find_timeline_by_scientific_name(&self, name: &str) -> StoreResult<Option<Timeline>> {
        self.query_one(
            "SELECT doc FROM timelines WHERE name_key = ?1 ORDER BY rowid LIMIT 1",
            params![name_key(name)],
        )
    }

    fn list_timelines(&self) -> StoreResult<Vec<Timeline>> {
        self.query_all("SELECT doc FROM timelines ORDER BY rowid", [])
    }

    fn replace_timeline(&self, timeline: &Timeline) -> StoreResult<()> {
        let rows = self.execute(
            "UPDATE timelines SET name_key = ?1, doc = ?2 WHERE id = ?3",
            params![
                name_key(&timeline.scientific_name),
                encode(timeline)?,
                timeline.id.to_hex()
            ],
        )?;
        affected_or(rows, ApiError::TimelineNotFound)
    }

    fn delete_timeline(&self, id: ObjectId) -> StoreResult<bool> {
        let rows = self.execute("DELETE FROM timelines WHERE id = ?1", params![id.to_hex()])?;
        Ok(rows > 0)
    }
}

fn selected_at_key(selected: &SelectedCrop) -> String {
    // Fixed-width so text order is time order
    selected
        .selected_at
        .to_rfc3339_opts(SecondsFormat::Nanos, true)
}

impl PredictionStore for SqliteStore {
    fn create_prediction(&self, prediction: &Prediction) -> StoreResult<()> {
        self.execute(
            "INSERT INTO predictions (id, user_id, doc) VALUES (?1, ?2, ?3)",
            params![
                prediction.id.to_hex(),
                prediction.user_id.to_hex(),
                encode(prediction)?
            ],
        )?;
        Ok(())
    }

    fn get_prediction(&self, id: ObjectId) -> StoreResult<Option<Prediction>> {
        self.query_one("SELECT doc FROM predictions WHERE id = ?1", params![id.to_hex()])
    }

    fn list_predictions(&self) -> StoreResult<Vec<Prediction>> {
        self.query_all("SELECT doc FROM predictions ORDER BY rowid", [])
    }

    fn list_predictions_by_user(&self, user_id: ObjectId) -> StoreResult<Vec<Prediction>> {
        self.query_all(
            "SELECT doc FROM predictions WHERE user_id = ?1 ORDER BY rowid",
            params![user_id.to_hex()],
        )
    }

    fn replace_prediction(&self, prediction: &Prediction) -> StoreResult<()> {
        let rows = self.execute(
            "UPDATE predictions SET user_id = ?1, doc = ?2 WHERE id = ?3",
            params![
                prediction.user_id.to_hex(),
                encode(prediction)?,
                prediction.id.to_hex()
            ],
        )?;
        affected_or(rows, ApiError::PredictionNotFound)
    }

    fn delete_prediction(&self, id: ObjectId) -> StoreResult<bool> {
        let rows = self.execute("DELETE FROM predictions WHERE id = ?1", params![id.to_hex()])?;
        Ok(rows > 0)
    }

    fn create_selected_crop(&self, selected: &SelectedCrop) -> StoreResult<()> {
        self.execute(
            "INSERT INTO selected_crops (id, prediction_id, selected_at, doc) VALUES (?1, ?2, ?3, ?4)",
            params![
                selected.id.to_hex(),
                selected.prediction_id.to_hex(),
                selected_at_key(selected),
                encode(selected)?
            ],
        )?;
        Ok(())
    }

    fn get_selected_crop(&self, id: ObjectId) -> StoreResult<Option<SelectedCrop>> {
        self.query_one(
            "SELECT doc FROM selected_crops WHERE id = ?1",
            params![id.to_hex()],
        )
    }

    fn list_selected_crops(&self) -> StoreResult<Vec<SelectedCrop>> {
        self.query_all(
            "SELECT doc FROM selected_crops ORDER BY selected_at DESC, rowid DESC",
            [],
        )
    }

    fn latest_selected_crop(&self, prediction_id: ObjectId) -> StoreResult<Option<SelectedCrop>> {
        self.query_one(
            "SELECT doc FROM selected_crops WHERE prediction_id = ?1
             ORDER BY selected_at DESC, rowid DESC LIMIT 1",
            params![prediction_id.to_hex()],
        )
    }

    fn replace_selected_crop(&self, selected: &SelectedCrop) -> StoreResult<()> {
        let rows = self.execute(
            "UPDATE selected_crops SET prediction_id = ?1, selected_at = ?2, doc = ?3 WHERE id = ?4",
            params![
                selected.prediction_id.to_hex(),
                selected_at_key(selected),
                encode(selected)?,
                selected.id.to_hex()
            ],
        )?;
        affected_or(rows, ApiError::SelectedCropNotFound)
    }

    fn delete_selected_crop(&self, id: ObjectId) -> StoreResult<bool> {
        let rows = self.execute(
            "DELETE FROM selected_crops WHERE id = ?1",
            params![id.to_hex()],
        )?;
        Ok(rows > 0)
    }

    fn delete_selected_crops_for_prediction(&self, prediction_id: ObjectId) -> StoreResult<u64> {
        let rows = self.execute(
            "DELETE FROM selected_crops WHERE prediction_id = ?1",
            params![prediction_id.to_hex()],
        )?;
        Ok(rows as u64)
    }
}
