use std::path::Path;

use rusqlite::{params, Connection};
use thiserror::Error;

use crate::db::{FindingRecord, ScanRunRecord, ScanRunStatus};
use crate::detect::ResourceKind;

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for scan database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },

    /// A stored JSON column (finding detail, account list) could not be encoded or decoded.
    #[error("Invalid stored JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored row holds a value this version does not recognize.
    #[error("Invalid stored value '{value}' for {column}")]
    InvalidValue { column: &'static str, value: String },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed scan history.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Recording scan runs and their findings, and reading them back.
#[derive(Debug)]
pub struct ScanDb {
    conn: Connection,
}

const SCAN_RUN_COLUMNS: &str =
    "id, started_at, finished_at, status, accounts, regions, findings, data_digest, error";

impl ScanDb {
    /// Open (or create) a scan database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert a scan run record and return its row id.
    pub fn insert_scan_run(&self, record: &ScanRunRecord) -> DbResult<i64> {
        insert_run_row(&self.conn, record)
    }

    /// Persist findings for a given scan run id.
    pub fn insert_findings(&self, run_id: i64, findings: &[FindingRecord]) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        insert_finding_rows(&tx, run_id, findings)?;
        tx.commit()?;
        Ok(())
    }

    /// Insert a run and its findings in one transaction; returns the run id.
    ///
    /// Either both land or neither does.
    pub fn record_scan(&self, record: &ScanRunRecord, findings: &[FindingRecord]) -> DbResult<i64> {
        let tx = self.conn.unchecked_transaction()?;
        let run_id = insert_run_row(&tx, record)?;
        insert_finding_rows(&tx, run_id, findings)?;
        tx.commit()?;
        Ok(run_id)
    }

    /// List all scan runs (ordered by id).
    pub fn list_scan_runs(&self) -> DbResult<Vec<ScanRunRecord>> {
        let mut stmt =
            self.conn.prepare(&format!("SELECT {SCAN_RUN_COLUMNS} FROM scan_runs ORDER BY id"))?;
        let rows = stmt.query_map([], map_run)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_record()?);
        }
        Ok(out)
    }

    /// Load one scan run by id.
    pub fn get_scan_run(&self, id: i64) -> DbResult<Option<ScanRunRecord>> {
        let mut stmt =
            self.conn.prepare(&format!("SELECT {SCAN_RUN_COLUMNS} FROM scan_runs WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], map_run)?;
        match rows.next() {
            Some(row) => Ok(Some(row?.into_record()?)),
            None => Ok(None),
        }
    }

    /// The most recent scan run, if any.
    pub fn latest_scan_run(&self) -> DbResult<Option<ScanRunRecord>> {
        let id: Option<i64> =
            self.conn.query_row("SELECT MAX(id) FROM scan_runs", [], |row| row.get(0))?;
        match id {
            Some(id) => self.get_scan_run(id),
            None => Ok(None),
        }
    }

    /// List findings recorded for a scan run, in insertion order.
    pub fn list_findings(&self, run_id: i64) -> DbResult<Vec<FindingRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT account_id, account_name, region, resource_type, resource_id, detail
            FROM scan_findings
            WHERE run_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (account_id, account_name, region, resource_type, resource_id, detail) = row?;
            let resource_type = ResourceKind::parse(&resource_type).ok_or(DbError::InvalidValue {
                column: "scan_findings.resource_type",
                value: resource_type,
            })?;
            out.push(FindingRecord {
                account_id,
                account_name,
                region,
                resource_type,
                resource_id,
                detail: serde_json::from_str(&detail)?,
            });
        }
        Ok(out)
    }
}

fn insert_run_row(conn: &Connection, record: &ScanRunRecord) -> DbResult<i64> {
    conn.execute(
        r#"
        INSERT INTO scan_runs
            (started_at, finished_at, status, accounts, regions, findings, data_digest, error)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            record.started_at,
            record.finished_at,
            record.status.as_str(),
            serde_json::to_string(&record.accounts)?,
            record.regions,
            record.findings,
            record.data_digest,
            record.error,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_finding_rows(conn: &Connection, run_id: i64, findings: &[FindingRecord]) -> DbResult<()> {
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO scan_findings
            (run_id, account_id, account_name, region, resource_type, resource_id, detail)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )?;
    for f in findings {
        stmt.execute(params![
            run_id,
            f.account_id,
            f.account_name,
            f.region,
            f.resource_type.as_str(),
            f.resource_id,
            serde_json::to_string(&f.detail)?,
        ])?;
    }
    Ok(())
}

/// Raw scan_runs row before status/account decoding.
struct ScanRunRow {
    id: i64,
    started_at: String,
    finished_at: String,
    status: String,
    accounts: String,
    regions: i64,
    findings: i64,
    data_digest: Option<String>,
    error: Option<String>,
}

impl ScanRunRow {
    fn into_record(self) -> DbResult<ScanRunRecord> {
        let status = ScanRunStatus::parse(&self.status)
            .ok_or(DbError::InvalidValue { column: "scan_runs.status", value: self.status })?;
        let accounts: Vec<String> = serde_json::from_str(&self.accounts)?;
        Ok(ScanRunRecord {
            id: Some(self.id),
            started_at: self.started_at,
            finished_at: self.finished_at,
            status,
            accounts,
            regions: self.regions,
            findings: self.findings,
            data_digest: self.data_digest,
            error: self.error,
        })
    }
}

fn map_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScanRunRow> {
    Ok(ScanRunRow {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        status: row.get(3)?,
        accounts: row.get(4)?,
        regions: row.get(5)?,
        findings: row.get(6)?,
        data_digest: row.get(7)?,
        error: row.get(8)?,
    })
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: scan_runs
/// - 2: scan_findings
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let mut current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS scan_runs (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                started_at  TEXT NOT NULL,
                finished_at TEXT NOT NULL,
                status      TEXT NOT NULL,
                accounts    TEXT NOT NULL, -- JSON array of account names
                regions     INTEGER NOT NULL DEFAULT 0,
                findings    INTEGER NOT NULL DEFAULT 0,
                data_digest TEXT,
                error       TEXT
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
        current_version = 1;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS scan_findings (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id        INTEGER NOT NULL REFERENCES scan_runs(id),
                account_id    TEXT NOT NULL,
                account_name  TEXT NOT NULL,
                region        TEXT NOT NULL,
                resource_type TEXT NOT NULL,
                resource_id   TEXT NOT NULL,
                detail        TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS scan_findings_run ON scan_findings(run_id);

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
