//! Persisted definition cache

use chrono::Utc;
use rusqlite::{params, Connection, Result};
use std::collections::HashMap;

use super::{try_lock, DbPool, StoreError};
use crate::ai::DefinitionStore;
use crate::domain::WordKey;

pub fn get_definition(conn: &Connection, key: &WordKey) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT definition FROM definitions WHERE word_key = ?1")?;
    let mut rows = stmt.query(params![key.as_str()])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row.get(0)?))
    } else {
        Ok(None)
    }
}

pub fn upsert_definition(conn: &Connection, key: &WordKey, definition: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"
    INSERT INTO definitions (word_key, definition, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?3)
    ON CONFLICT(word_key) DO UPDATE SET
        definition = excluded.definition,
        updated_at = excluded.updated_at
    "#,
        params![key.as_str(), definition, now],
    )?;
    Ok(())
}

pub fn count_definitions(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM definitions", [], |row| row.get(0))
}

/// [`DefinitionStore`] over the shared SQLite connection
#[derive(Clone)]
pub struct SqliteDefinitionStore {
    pool: DbPool,
}

impl SqliteDefinitionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl DefinitionStore for SqliteDefinitionStore {
    fn get_many(&self, words: &[String]) -> std::result::Result<HashMap<WordKey, String>, StoreError> {
        let conn = try_lock(&self.pool)?;
        let mut found = HashMap::new();
        for word in words {
            let key = WordKey::new(word);
            if found.contains_key(&key) {
                continue;
            }
            if let Some(definition) = get_definition(&conn, &key)? {
                found.insert(key, definition);
            }
        }
        Ok(found)
    }

    fn put_many(&self, definitions: &[(WordKey, String)]) -> std::result::Result<(), StoreError> {
        if definitions.is_empty() {
            return Ok(());
        }
        let mut conn = try_lock(&self.pool)?;
        let tx = conn.transaction()?;
        for (key, definition) in definitions {
            upsert_definition(&tx, key, definition)?;
        }
        tx.commit()?;
        Ok(())
    }
}
