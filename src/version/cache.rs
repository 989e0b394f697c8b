use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};
use tracing::{debug, info};

use crate::version::error::CacheError;
use crate::version::store::PackageStore;
use crate::version::types::{NewPackage, PackageRecord};

const PACKAGE_COLUMNS: &str = "id, name, latest_version, npm_page, created_at, updated_at";

/// SQLite-backed package cache shared by every audit run on this machine
pub struct Cache {
    conn: Mutex<Connection>,
}

/// Raw `packages` row before versions and timestamps are attached
struct PackageRow {
    id: i64,
    name: String,
    latest_version: String,
    npm_page: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl PackageRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            latest_version: row.get(2)?,
            npm_page: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn into_record(self, versions: Vec<String>) -> Result<PackageRecord, CacheError> {
        let created_at = millis_to_datetime(&self.name, self.created_at)?;
        let updated_at = millis_to_datetime(&self.name, self.updated_at)?;
        Ok(PackageRecord {
            id: self.id,
            name: self.name,
            latest_version: self.latest_version,
            versions,
            npm_page: self.npm_page,
            created_at,
            updated_at,
        })
    }
}

fn millis_to_datetime(package: &str, millis: i64) -> Result<DateTime<Utc>, CacheError> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| CacheError::InvalidTimestamp {
        package: package.to_string(),
        millis,
    })
}

impl Cache {
    pub fn new(db_path: &Path) -> Result<Self, CacheError> {
        info!("Initializing cache database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        debug!("Database connection established");

        let cache = Self {
            conn: Mutex::new(conn),
        };

        cache.create_schema()?;
        info!("Cache initialized successfully");

        Ok(cache)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    fn current_timestamp_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    fn create_schema(&self) -> Result<(), CacheError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS packages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                latest_version TEXT NOT NULL,
                npm_page TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_updated_at ON packages(updated_at)",
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS package_versions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                package_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                version TEXT NOT NULL,
                FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE,
                UNIQUE(package_id, version)
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_package_id ON package_versions(package_id)",
            [],
        )?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Read one package with its versions (newest first)
    fn read_package(conn: &Connection, name: &str) -> Result<Option<PackageRecord>, CacheError> {
        let result = conn.query_row(
            &format!("SELECT {} FROM packages WHERE name = ?1", PACKAGE_COLUMNS),
            [name],
            PackageRow::from_row,
        );

        let row = match result {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let versions = Self::read_versions(conn, row.id)?;
        row.into_record(versions).map(Some)
    }

    fn read_versions(conn: &Connection, package_id: i64) -> Result<Vec<String>, CacheError> {
        let mut stmt = conn.prepare(
            "SELECT version FROM package_versions WHERE package_id = ?1 ORDER BY position",
        )?;

        let versions = stmt
            .query_map([package_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(versions)
    }

    /// Replace the stored version list of a package, keeping the given order
    fn write_versions(
        conn: &Connection,
        package_id: i64,
        versions: &[String],
    ) -> Result<(), CacheError> {
        conn.execute(
            "DELETE FROM package_versions WHERE package_id = ?1",
            [package_id],
        )?;

        // INSERT OR IGNORE drops duplicate entries from the registry list
        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO package_versions (package_id, position, version) VALUES (?1, ?2, ?3)",
        )?;
        for (position, version) in versions.iter().enumerate() {
            stmt.execute((package_id, position as i64, version))?;
        }

        Ok(())
    }

    fn package_id(conn: &Connection, name: &str) -> Result<i64, CacheError> {
        Ok(conn.query_row(
            "SELECT id FROM packages WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?)
    }

    /// Load a record that was just written in `conn`
    fn reload(conn: &Connection, name: &str) -> Result<PackageRecord, CacheError> {
        Self::read_package(conn, name)?.ok_or_else(|| CacheError::NotFound(name.to_string()))
    }
}

impl PackageStore for Cache {
    fn find_by_name(&self, name: &str) -> Result<Option<PackageRecord>, CacheError> {
        let conn = self.lock_conn()?;
        Self::read_package(&conn, name)
    }

    fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<PackageRecord>, CacheError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock_conn()?;

        let placeholders: Vec<_> = (0..ids.len()).map(|i| format!("?{}", i + 1)).collect();
        let query = format!(
            "SELECT {} FROM packages WHERE id IN ({}) ORDER BY id",
            PACKAGE_COLUMNS,
            placeholders.join(", ")
        );

        let rows = {
            let mut stmt = conn.prepare(&query)?;
            stmt.query_map(rusqlite::params_from_iter(ids.iter()), PackageRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };

        rows.into_iter()
            .map(|row| {
                let versions = Self::read_versions(&conn, row.id)?;
                row.into_record(versions)
            })
            .collect()
    }

    fn create(&self, package: &NewPackage) -> Result<PackageRecord, CacheError> {
        debug!(
            "Creating package {} with {} versions",
            package.name,
            package.versions.len()
        );

        let now = Self::current_timestamp_ms();
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO packages (name, latest_version, npm_page, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
            (&package.name, &package.latest_version, &package.npm_page, now),
        )?;
        let package_id = tx.last_insert_rowid();
        Self::write_versions(&tx, package_id, &package.versions)?;

        let record = Self::reload(&tx, &package.name)?;
        tx.commit()?;
        Ok(record)
    }

    fn update(&self, name: &str, package: &NewPackage) -> Result<PackageRecord, CacheError> {
        debug!(
            "Updating package {} with {} versions",
            name,
            package.versions.len()
        );

        let now = Self::current_timestamp_ms();
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let rows_affected = tx.execute(
            r#"
            UPDATE packages
            SET latest_version = ?1, npm_page = ?2, updated_at = ?3
            WHERE name = ?4
            "#,
            (&package.latest_version, &package.npm_page, now, name),
        )?;

        if rows_affected == 0 {
            return Err(CacheError::NotFound(name.to_string()));
        }

        let package_id = Self::package_id(&tx, name)?;
        Self::write_versions(&tx, package_id, &package.versions)?;

        let record = Self::reload(&tx, name)?;
        tx.commit()?;
        Ok(record)
    }

    fn upsert(&self, package: &NewPackage) -> Result<PackageRecord, CacheError> {
        debug!(
            "Saving {} versions for {}",
            package.versions.len(),
            package.name
        );

        let now = Self::current_timestamp_ms();
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        // Insert or update package; the UNIQUE name constraint resolves concurrent writers
        tx.execute(
            r#"
            INSERT INTO packages (name, latest_version, npm_page, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(name) DO UPDATE SET
                latest_version = excluded.latest_version,
                npm_page = excluded.npm_page,
                updated_at = excluded.updated_at
            "#,
            (&package.name, &package.latest_version, &package.npm_page, now),
        )?;

        let package_id = Self::package_id(&tx, &package.name)?;
        Self::write_versions(&tx, package_id, &package.versions)?;

        let record = Self::reload(&tx, &package.name)?;
        tx.commit()?;

        debug!("Successfully saved package {}", package.name);
        Ok(record)
    }
}
