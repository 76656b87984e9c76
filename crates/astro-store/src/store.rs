use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{Connection, params};
use uuid::Uuid;

use astro_core::{BadgeTier, CatalogSource, RankedRecord, SelectionDocument};

use crate::error::{Result, StoreError};
use crate::schema;

/// One persisted selection run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub id: Uuid,
    pub generated_at: String,
    pub target_count: usize,
    pub actual_count: usize,
    pub tier_distribution: BTreeMap<BadgeTier, usize>,
    pub type_distribution: BTreeMap<String, usize>,
    pub created_at: String,
}

/// A selected object as stored for a run. `token_id` is its 1-based
/// position in the written document.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub token_id: u32,
    pub record: RankedRecord,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    // --- Save ---

    /// Persist a selection document as a new run. Objects keep the document
    /// order and are numbered from 1.
    pub fn save_selection(&self, document: &SelectionDocument) -> Result<RunRecord> {
        let id = Uuid::new_v4();
        let meta = &document.metadata;
        let tier_json = to_json(&meta.tier_distribution)?;
        let type_json = to_json(&meta.type_distribution)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO runs (id, generated_at, target_count, actual_count, tier_distribution, type_distribution)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.to_string(),
                meta.generated_at,
                meta.target_count as i64,
                meta.actual_count as i64,
                tier_json,
                type_json,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO selected_objects
                 (run_id, token_id, name, object_type, category, catalog_source, badge_tier, total_score, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (i, object) in document.objects.iter().enumerate() {
                let record = &object.scored.record;
                stmt.execute(params![
                    id.to_string(),
                    (i + 1) as i64,
                    record.name,
                    record.object_type,
                    record.category().as_str(),
                    source_key(record.catalog_source),
                    object.badge_tier.as_str(),
                    object.total_score(),
                    to_json(object)?,
                ])?;
            }
        }

        tx.commit()?;
        tracing::info!(run_id = %id, objects = document.objects.len(), "saved selection run");

        self.load_run(id)?
            .ok_or_else(|| StoreError::InvalidData(format!("run {id} missing after insert")))
    }

    // --- Load ---

    pub fn load_run(&self, id: Uuid) -> Result<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, generated_at, target_count, actual_count, tier_distribution, type_distribution, created_at
             FROM runs WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map([id.to_string()], raw_run)?;
        match rows.next() {
            Some(row) => Ok(Some(row?.into_record()?)),
            None => Ok(None),
        }
    }

    /// Every run, oldest first.
    pub fn list_runs(&self) -> Result<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, generated_at, target_count, actual_count, tier_distribution, type_distribution, created_at
             FROM runs ORDER BY created_at, rowid",
        )?;
        let raw = stmt
            .query_map([], raw_run)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        raw.into_iter().map(RawRun::into_record).collect()
    }

    pub fn load_run_objects(&self, run_id: Uuid) -> Result<Vec<StoredObject>> {
        let mut stmt = self.conn.prepare(
            "SELECT token_id, payload FROM selected_objects WHERE run_id = ?1 ORDER BY token_id",
        )?;
        let rows = stmt
            .query_map([run_id.to_string()], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(token_id, payload)| {
                let record: RankedRecord = serde_json::from_str(&payload)
                    .map_err(|e| StoreError::InvalidData(format!("bad payload: {e}")))?;
                Ok(StoredObject {
                    token_id: token_id as u32,
                    record,
                })
            })
            .collect()
    }

    pub fn tier_counts(&self, run_id: Uuid) -> Result<BTreeMap<BadgeTier, usize>> {
        let mut stmt = self.conn.prepare(
            "SELECT badge_tier, COUNT(*) FROM selected_objects WHERE run_id = ?1 GROUP BY badge_tier",
        )?;
        let rows = stmt
            .query_map([run_id.to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(key, count)| {
                let tier = BadgeTier::from_key(&key)
                    .ok_or_else(|| StoreError::InvalidData(format!("unknown tier: {key}")))?;
                Ok((tier, count as usize))
            })
            .collect()
    }
}

struct RawRun {
    id: String,
    generated_at: String,
    target_count: i64,
    actual_count: i64,
    tier_distribution: String,
    type_distribution: String,
    created_at: String,
}

fn raw_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRun> {
    Ok(RawRun {
        id: row.get(0)?,
        generated_at: row.get(1)?,
        target_count: row.get(2)?,
        actual_count: row.get(3)?,
        tier_distribution: row.get(4)?,
        type_distribution: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl RawRun {
    fn into_record(self) -> Result<RunRecord> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::InvalidData(format!("bad run id {}: {e}", self.id)))?;
        Ok(RunRecord {
            id,
            generated_at: self.generated_at,
            target_count: self.target_count as usize,
            actual_count: self.actual_count as usize,
            tier_distribution: from_json(&self.tier_distribution)?,
            type_distribution: from_json(&self.type_distribution)?,
            created_at: self.created_at,
        })
    }
}

fn source_key(source: CatalogSource) -> &'static str {
    match source {
        CatalogSource::Curated => "curated",
        CatalogSource::Generated => "generated",
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| StoreError::InvalidData(format!("JSON encode: {e}")))
}

fn from_json<T: serde::de::DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| StoreError::InvalidData(format!("JSON decode: {e}")))
}
