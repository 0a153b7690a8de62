// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation log insert and audit queries.

use std::str::FromStr;

use palabra_core::{LogRecord, PalabraError, PrincipalId, Role, StoredRecord};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Insert one record. The id and `created_at` are assigned here, not by the caller.
pub async fn insert_record(
    db: &Database,
    collection: &str,
    record: &LogRecord,
) -> Result<String, PalabraError> {
    let id = uuid::Uuid::new_v4().to_string();
    let row_id = id.clone();
    let collection = collection.to_string();
    let principal_id = record.principal_id.as_str().to_string();
    let role = record.role.to_string();
    let content = record.content.clone();

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversation_log (id, collection, principal_id, role, content)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![row_id, collection, principal_id, role, content],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

    Ok(id)
}

/// List records of a collection in insertion order.
///
/// `limit` keeps the most recent `limit` records, still returned oldest first.
pub async fn list_records(
    db: &Database,
    collection: &str,
    principal: Option<&PrincipalId>,
    limit: Option<i64>,
) -> Result<Vec<StoredRecord>, PalabraError> {
    let collection = collection.to_string();
    let principal = principal.map(|p| p.as_str().to_string());
    let limit = limit.unwrap_or(-1);

    let rows = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, collection, principal_id, role, content, created_at FROM (
                     SELECT seq, id, collection, principal_id, role, content, created_at
                     FROM conversation_log
                     WHERE collection = ?1 AND (?2 IS NULL OR principal_id = ?2)
                     ORDER BY seq DESC LIMIT ?3
                 ) ORDER BY seq ASC",
            )?;
            let rows = stmt.query_map(params![collection, principal, limit], |row| {
                Ok(RawRecord {
                    id: row.get(0)?,
                    collection: row.get(1)?,
                    principal_id: row.get(2)?,
                    role: row.get(3)?,
                    content: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter().map(RawRecord::into_stored).collect()
}

struct RawRecord {
    id: String,
    collection: String,
    principal_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl RawRecord {
    fn into_stored(self) -> Result<StoredRecord, PalabraError> {
        let role = Role::from_str(&self.role).map_err(|e| PalabraError::Storage {
            source: format!("invalid role `{}` in record {}: {e}", self.role, self.id).into(),
        })?;
        Ok(StoredRecord {
            id: self.id,
            collection: self.collection,
            principal_id: PrincipalId(self.principal_id),
            role,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("records.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn record(principal: &str, role: Role, content: &str) -> LogRecord {
        LogRecord {
            principal_id: PrincipalId(principal.to_string()),
            role,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_list_in_order() {
        let (db, _dir) = setup_db().await;

        insert_record(&db, "chat-messages", &record("uid-1", Role::User, "Hola"))
            .await
            .unwrap();
        insert_record(&db, "chat-messages", &record("uid-1", Role::Assistant, "¡Hola!"))
            .await
            .unwrap();
        insert_record(&db, "chat-messages", &record("uid-1", Role::User, "¿Qué es un contrato?"))
            .await
            .unwrap();

        let records = list_records(&db, "chat-messages", None, None).await.unwrap();
        let contents: Vec<&str> = records.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["Hola", "¡Hola!", "¿Qué es un contrato?"]);
        assert_eq!(records[1].role, Role::Assistant);
        assert_eq!(records[0].collection, "chat-messages");
    }

    #[tokio::test]
    async fn store_assigns_id_and_timestamp() {
        let (db, _dir) = setup_db().await;

        let id = insert_record(&db, "c", &record("uid-1", Role::User, "x"))
            .await
            .unwrap();
        let records = list_records(&db, "c", None, None).await.unwrap();

        assert_eq!(records[0].id, id);
        assert!(records[0].created_at.ends_with('Z'), "got: {}", records[0].created_at);
        assert!(records[0].created_at.contains('T'));
    }

    #[tokio::test]
    async fn filters_by_collection_and_principal() {
        let (db, _dir) = setup_db().await;

        insert_record(&db, "a", &record("uid-1", Role::User, "one")).await.unwrap();
        insert_record(&db, "a", &record("uid-2", Role::User, "two")).await.unwrap();
        insert_record(&db, "b", &record("uid-1", Role::User, "three")).await.unwrap();

        let uid1 = PrincipalId("uid-1".into());
        let records = list_records(&db, "a", Some(&uid1), None).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "one");

        assert_eq!(list_records(&db, "a", None, None).await.unwrap().len(), 2);
        assert!(list_records(&db, "missing", None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn limit_keeps_most_recent_oldest_first() {
        let (db, _dir) = setup_db().await;

        for i in 1..=5 {
            insert_record(&db, "c", &record("uid-1", Role::User, &format!("m{i}")))
                .await
                .unwrap();
        }

        let records = list_records(&db, "c", None, Some(2)).await.unwrap();
        let contents: Vec<&str> = records.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["m4", "m5"]);
    }
}
