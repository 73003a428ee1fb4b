//! SQLite ledger implementation.

use crate::{Error, Result, UsageRecord};
use chrono::SecondsFormat;
use registry::ProviderId;
use rusqlite::{Connection, Row, params};
use std::path::Path;

/// Aggregate usage for one model.
#[derive(Debug, Clone, PartialEq)]
pub struct CostSummary {
    pub model: String,
    pub provider: ProviderId,
    pub calls: u64,
    pub failures: u64,
    pub incoming_tokens: u64,
    pub outgoing_tokens: u64,
    pub cost: f64,
}

/// SQLite-backed usage ledger.
pub struct Ledger {
    conn: Connection,
}

impl Ledger {
    /// Open or create a ledger at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let ledger = Self { conn };
        ledger.init_schema()?;
        Ok(ledger)
    }

    /// Create an in-memory ledger (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let ledger = Self { conn };
        ledger.init_schema()?;
        Ok(ledger)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS usage (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                config_id TEXT NOT NULL,
                provider TEXT NOT NULL,
                model TEXT NOT NULL,
                incoming_tokens INTEGER NOT NULL,
                outgoing_tokens INTEGER NOT NULL,
                cost REAL NOT NULL,
                estimated INTEGER NOT NULL,
                error TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_usage_timestamp
                ON usage(timestamp);
            "#,
        )?;
        Ok(())
    }

    /// Append a record.
    pub fn append(&self, record: &UsageRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO usage (id, timestamp, config_id, provider, model,
                incoming_tokens, outgoing_tokens, cost, estimated, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id.to_string(),
                // Fixed-width so text ordering matches time ordering.
                record.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
                record.config_id,
                record.provider.as_str(),
                record.model,
                record.incoming_tokens,
                record.outgoing_tokens,
                record.cost,
                record.estimated,
                record.error,
            ],
        )?;
        Ok(())
    }

    /// The most recent records, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<UsageRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, config_id, provider, model,
                    incoming_tokens, outgoing_tokens, cost, estimated, error
             FROM usage ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map([limit as i64], RawRecord::from_row)?;
        rows.map(|row| row?.parse()).collect()
    }

    /// Per-model totals, most expensive first.
    pub fn totals(&self) -> Result<Vec<CostSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT model, provider,
                    COUNT(*),
                    SUM(CASE WHEN error IS NULL THEN 0 ELSE 1 END),
                    SUM(incoming_tokens),
                    SUM(outgoing_tokens),
                    SUM(cost)
             FROM usage
             GROUP BY model, provider
             ORDER BY SUM(cost) DESC, model",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, f64>(6)?,
            ))
        })?;

        rows.map(|row| {
            let (model, provider, calls, failures, incoming, outgoing, cost) = row?;
            Ok(CostSummary {
                provider: parse_provider(&model, &provider)?,
                model,
                calls: calls as u64,
                failures: failures as u64,
                incoming_tokens: incoming as u64,
                outgoing_tokens: outgoing as u64,
                cost,
            })
        })
        .collect()
    }
}

/// Columns as stored, before parsing typed fields.
struct RawRecord {
    id: String,
    timestamp: String,
    config_id: String,
    provider: String,
    model: String,
    incoming_tokens: u32,
    outgoing_tokens: u32,
    cost: f64,
    estimated: bool,
    error: Option<String>,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            config_id: row.get(2)?,
            provider: row.get(3)?,
            model: row.get(4)?,
            incoming_tokens: row.get(5)?,
            outgoing_tokens: row.get(6)?,
            cost: row.get(7)?,
            estimated: row.get(8)?,
            error: row.get(9)?,
        })
    }

    fn parse(self) -> Result<UsageRecord> {
        let corrupt = |reason: String| Error::Corrupt {
            id: self.id.clone(),
            reason,
        };
        Ok(UsageRecord {
            id: self.id.parse().map_err(|e| corrupt(format!("{e}")))?,
            timestamp: self
                .timestamp
                .parse()
                .map_err(|e| corrupt(format!("{e}")))?,
            provider: parse_provider(&self.id, &self.provider)?,
            config_id: self.config_id,
            model: self.model,
            incoming_tokens: self.incoming_tokens,
            outgoing_tokens: self.outgoing_tokens,
            cost: self.cost,
            estimated: self.estimated,
            error: self.error,
        })
    }
}

fn parse_provider(id: &str, provider: &str) -> Result<ProviderId> {
    provider.parse().map_err(|e: registry::Error| Error::Corrupt {
        id: id.to_string(),
        reason: e.to_string(),
    })
}
