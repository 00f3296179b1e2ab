//! SQLite-backed checkpointer (feature `sqlite`).
//!
//! One table keyed by (thread_id, checkpoint_ns, checkpoint_id); state bytes
//! produced by the injected `Serializer`. Suitable for single-node use.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::checkpoint::checkpoint::{
    Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource,
};
use crate::checkpoint::checkpointer::{CheckpointError, Checkpointer};
use crate::checkpoint::config::RunnableConfig;
use crate::checkpoint::serializer::Serializer;

/// Persistent Checkpointer over a SQLite file.
///
/// **Interaction**: Built with a `Serializer<S>` (usually `JsonSerializer`);
/// compiled into graphs the same way as `MemorySaver`.
pub struct SqliteSaver<S> {
    conn: Mutex<Connection>,
    serializer: Arc<dyn Serializer<S>>,
}

impl<S> SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub fn open(
        path: impl AsRef<std::path::Path>,
        serializer: Arc<dyn Serializer<S>>,
    ) -> Result<Self, CheckpointError> {
        let conn = Connection::open(path).map_err(|e| CheckpointError::Storage(e.to_string()))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS checkpoints (
                thread_id     TEXT NOT NULL,
                checkpoint_ns TEXT NOT NULL DEFAULT '',
                checkpoint_id TEXT NOT NULL,
                ts            TEXT NOT NULL,
                source        TEXT NOT NULL,
                step          INTEGER NOT NULL,
                state         BLOB NOT NULL,
                PRIMARY KEY (thread_id, checkpoint_ns, checkpoint_id)
            )",
            [],
        )
        .map_err(|e| CheckpointError::Storage(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            serializer,
        })
    }

    fn thread_id(config: &RunnableConfig) -> Result<&str, CheckpointError> {
        config
            .thread_id
            .as_deref()
            .ok_or(CheckpointError::MissingThreadId)
    }

    fn row_to_checkpoint(
        &self,
        id: String,
        ts: String,
        source: String,
        step: u64,
        bytes: Vec<u8>,
    ) -> Result<Checkpoint<S>, CheckpointError> {
        let state = self.serializer.deserialize(&bytes)?;
        Ok(Checkpoint {
            id,
            ts,
            channel_values: state,
            channel_versions: Default::default(),
            metadata: CheckpointMetadata {
                source: CheckpointSource::from_str_lossy(&source),
                step,
                created_at: None,
            },
        })
    }
}

#[async_trait]
impl<S> Checkpointer<S> for SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<(), CheckpointError> {
        let thread_id = Self::thread_id(config)?;
        let bytes = self.serializer.serialize(&checkpoint.channel_values)?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| CheckpointError::Storage(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO checkpoints
                (thread_id, checkpoint_ns, checkpoint_id, ts, source, step, state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                thread_id,
                config.checkpoint_ns,
                checkpoint.id,
                checkpoint.ts,
                checkpoint.metadata.source.as_str(),
                checkpoint.metadata.step as i64,
                bytes,
            ],
        )
        .map_err(|e| CheckpointError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        let thread_id = Self::thread_id(config)?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| CheckpointError::Storage(e.to_string()))?;
        let mut query = |sql: &str, extra: Option<&str>| -> Result<Option<(String, String, String, u64, Vec<u8>)>, CheckpointError> {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| CheckpointError::Storage(e.to_string()))?;
            let map = |row: &rusqlite::Row<'_>| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)? as u64,
                    row.get::<_, Vec<u8>>(4)?,
                ))
            };
            let result = match extra {
                Some(id) => stmt.query_row(params![thread_id, config.checkpoint_ns, id], map),
                None => stmt.query_row(params![thread_id, config.checkpoint_ns], map),
            };
            match result {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(CheckpointError::Storage(e.to_string())),
            }
        };

        let row = match &config.checkpoint_id {
            Some(id) => query(
                "SELECT checkpoint_id, ts, source, step, state FROM checkpoints
                 WHERE thread_id = ?1 AND checkpoint_ns = ?2 AND checkpoint_id = ?3",
                Some(id),
            )?,
            None => query(
                "SELECT checkpoint_id, ts, source, step, state FROM checkpoints
                 WHERE thread_id = ?1 AND checkpoint_ns = ?2
                 ORDER BY step DESC, ts DESC LIMIT 1",
                None,
            )?,
        };
        drop(conn);

        match row {
            Some((id, ts, source, step, bytes)) => {
                Ok(Some(self.row_to_checkpoint(id, ts, source, step, bytes)?))
            }
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        config: &RunnableConfig,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let thread_id = Self::thread_id(config)?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| CheckpointError::Storage(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT checkpoint_id, source, step FROM checkpoints
                 WHERE thread_id = ?1 AND checkpoint_ns = ?2
                 ORDER BY step DESC, ts DESC",
            )
            .map_err(|e| CheckpointError::Storage(e.to_string()))?;
        let items = stmt
            .query_map(params![thread_id, config.checkpoint_ns], |row| {
                Ok(CheckpointListItem {
                    checkpoint_id: row.get::<_, String>(0)?,
                    metadata: CheckpointMetadata {
                        source: CheckpointSource::from_str_lossy(&row.get::<_, String>(1)?),
                        step: row.get::<_, i64>(2)? as u64,
                        created_at: None,
                    },
                })
            })
            .map_err(|e| CheckpointError::Storage(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CheckpointError::Storage(e.to_string()))?;
        Ok(items)
    }
}
