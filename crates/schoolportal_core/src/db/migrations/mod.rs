//! Ordered schema steps for `kv_entries`.
//!
//! 1. `kv_entries` table, primary key `(area, key)`.
//! 2. `(area, updated_at DESC)` index for per-area listings.
//!
//! Steps run inside one transaction; a failure leaves the file at its
//! previous `user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[
    Step {
        version: 1,
        name: "kv_entries",
        sql: include_str!("0001_kv_entries.sql"),
    },
    Step {
        version: 2,
        name: "kv_area_index",
        sql: include_str!("0002_kv_area_index.sql"),
    },
];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Brings `conn` up to `latest_version()`. Returns how many steps ran.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let from = user_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Step> = STEPS.iter().filter(|step| step.version > from).collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for step in &pending {
        run_step(&tx, step)?;
    }
    tx.commit()?;
    info!(
        "event=db_migrate module=db status=ok from={from} to={latest} steps={}",
        pending.len()
    );
    Ok(pending.len())
}

fn run_step(tx: &Transaction<'_>, step: &Step) -> DbResult<()> {
    tx.execute_batch(step.sql)?;
    // PRAGMA does not take bound parameters.
    tx.execute_batch(&format!("PRAGMA user_version = {};", step.version))?;
    info!(
        "event=db_migrate_step module=db status=ok version={} name={}",
        step.version, step.name
    );
    Ok(())
}

fn user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}
