//! Record store contract and SQLite snapshot implementation.
//!
//! # Responsibility
//! - Persist goals and progress entries as two independent collections.
//! - Assign identifiers and creation timestamps on create.
//! - Cascade goal deletion to dependent progress entries.
//!
//! # Invariants
//! - Each collection is stored as one JSON array snapshot; every mutation
//!   rewrites the whole snapshot inside one `IMMEDIATE` transaction.
//! - Goal cascade rewrites both snapshots in the same transaction, so either
//!   both land or neither does.
//! - Read paths reject snapshots that fail to decode instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::goal::{Goal, GoalDraft, GoalId, GoalPatch};
use crate::model::progress::{ProgressDraft, ProgressEntry, ProgressId, ProgressPatch};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from record store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target goal does not exist.
    GoalNotFound(GoalId),
    /// Target progress entry does not exist.
    ProgressNotFound(ProgressId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required collection table or row is missing.
    MissingCollection(&'static str),
    /// Snapshot payload cannot be encoded or decoded.
    InvalidData {
        collection: &'static str,
        message: String,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::GoalNotFound(id) => write!(f, "goal not found: {id}"),
            Self::ProgressNotFound(id) => write!(f, "progress entry not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "record store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingCollection(name) => {
                write!(f, "record store requires collection `{name}`")
            }
            Self::InvalidData {
                collection,
                message,
            } => write!(f, "invalid `{collection}` snapshot: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persisted collections, one snapshot row each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Goals,
    ProgressEntries,
}

impl Collection {
    /// Row key in the `collections` table.
    pub fn key(self) -> &'static str {
        match self {
            Self::Goals => "goals",
            Self::ProgressEntries => "progress_entries",
        }
    }
}

/// Outcome of a goal delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalDeletion {
    /// Whether a goal record was present and removed.
    pub goal_removed: bool,
    /// Number of dependent progress entries removed with it.
    pub entries_removed: usize,
}

/// Record store interface for both collections.
pub trait RecordStore {
    /// Assigns id and timestamp, persists, and returns the stored goal.
    fn create_goal(&mut self, draft: GoalDraft) -> StoreResult<Goal>;
    /// Returns every goal in insertion order.
    fn list_goals(&self) -> StoreResult<Vec<Goal>>;
    fn get_goal(&self, id: GoalId) -> StoreResult<Goal>;
    /// Merges supplied patch fields onto the stored goal.
    fn update_goal(&mut self, id: GoalId, patch: &GoalPatch) -> StoreResult<Goal>;
    /// Removes the goal and every entry referencing it. Absent ids are not an
    /// error.
    fn delete_goal(&mut self, id: GoalId) -> StoreResult<GoalDeletion>;
    fn create_progress(&mut self, draft: ProgressDraft) -> StoreResult<ProgressEntry>;
    /// Returns entries in insertion order, optionally only those of one goal.
    fn list_progress(&self, goal_id: Option<GoalId>) -> StoreResult<Vec<ProgressEntry>>;
    fn get_progress(&self, id: ProgressId) -> StoreResult<ProgressEntry>;
    fn update_progress(&mut self, id: ProgressId, patch: &ProgressPatch)
        -> StoreResult<ProgressEntry>;
    /// Removes one entry. Returns whether it was present.
    fn delete_progress(&mut self, id: ProgressId) -> StoreResult<bool>;
}

/// SQLite-backed record store owning its connection.
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a fresh, empty in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps a migrated connection.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Read-only access to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, surfacing any close-time error.
    pub fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, err)| err.into())
    }

    fn mutate<R, T>(
        &mut self,
        collection: Collection,
        apply: impl FnOnce(&mut Vec<R>) -> StoreResult<T>,
    ) -> StoreResult<T>
    where
        R: Serialize + DeserializeOwned,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut records: Vec<R> = read_collection(&tx, collection)?;
        let outcome = apply(&mut records)?;
        write_collection(&tx, collection, &records)?;
        tx.commit()?;
        Ok(outcome)
    }
}

impl RecordStore for SqliteRecordStore {
    fn create_goal(&mut self, draft: GoalDraft) -> StoreResult<Goal> {
        let goal = Goal::new(draft);
        let created = goal.clone();
        self.mutate(Collection::Goals, move |goals: &mut Vec<Goal>| {
            goals.push(goal);
            Ok(())
        })?;
        Ok(created)
    }

    fn list_goals(&self) -> StoreResult<Vec<Goal>> {
        read_collection(&self.conn, Collection::Goals)
    }

    fn get_goal(&self, id: GoalId) -> StoreResult<Goal> {
        self.list_goals()?
            .into_iter()
            .find(|goal| goal.id == id)
            .ok_or(StoreError::GoalNotFound(id))
    }

    fn update_goal(&mut self, id: GoalId, patch: &GoalPatch) -> StoreResult<Goal> {
        self.mutate(Collection::Goals, |goals: &mut Vec<Goal>| {
            let goal = goals
                .iter_mut()
                .find(|goal| goal.id == id)
                .ok_or(StoreError::GoalNotFound(id))?;
            goal.apply_patch(patch);
            Ok(goal.clone())
        })
    }

    fn delete_goal(&mut self, id: GoalId) -> StoreResult<GoalDeletion> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut goals: Vec<Goal> = read_collection(&tx, Collection::Goals)?;
        let goals_before = goals.len();
        goals.retain(|goal| goal.id != id);
        let goal_removed = goals.len() != goals_before;

        let mut entries: Vec<ProgressEntry> = read_collection(&tx, Collection::ProgressEntries)?;
        let entries_before = entries.len();
        entries.retain(|entry| entry.goal_id != id);
        let entries_removed = entries_before - entries.len();

        write_collection(&tx, Collection::Goals, &goals)?;
        write_collection(&tx, Collection::ProgressEntries, &entries)?;
        tx.commit()?;

        Ok(GoalDeletion {
            goal_removed,
            entries_removed,
        })
    }

    fn create_progress(&mut self, draft: ProgressDraft) -> StoreResult<ProgressEntry> {
        let entry = ProgressEntry::new(draft);
        let created = entry.clone();
        self.mutate(
            Collection::ProgressEntries,
            move |entries: &mut Vec<ProgressEntry>| {
                entries.push(entry);
                Ok(())
            },
        )?;
        Ok(created)
    }

    fn list_progress(&self, goal_id: Option<GoalId>) -> StoreResult<Vec<ProgressEntry>> {
        let mut entries: Vec<ProgressEntry> =
            read_collection(&self.conn, Collection::ProgressEntries)?;
        if let Some(goal_id) = goal_id {
            entries.retain(|entry| entry.goal_id == goal_id);
        }
        Ok(entries)
    }

    fn get_progress(&self, id: ProgressId) -> StoreResult<ProgressEntry> {
        self.list_progress(None)?
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or(StoreError::ProgressNotFound(id))
    }

    fn update_progress(
        &mut self,
        id: ProgressId,
        patch: &ProgressPatch,
    ) -> StoreResult<ProgressEntry> {
        self.mutate(
            Collection::ProgressEntries,
            |entries: &mut Vec<ProgressEntry>| {
                let entry = entries
                    .iter_mut()
                    .find(|entry| entry.id == id)
                    .ok_or(StoreError::ProgressNotFound(id))?;
                entry.apply_patch(patch);
                Ok(entry.clone())
            },
        )
    }

    fn delete_progress(&mut self, id: ProgressId) -> StoreResult<bool> {
        self.mutate(
            Collection::ProgressEntries,
            |entries: &mut Vec<ProgressEntry>| {
                let before = entries.len();
                entries.retain(|entry| entry.id != id);
                Ok(entries.len() != before)
            },
        )
    }
}

fn read_collection<R: DeserializeOwned>(
    conn: &Connection,
    collection: Collection,
) -> StoreResult<Vec<R>> {
    let payload: Option<String> = conn
        .query_row(
            "SELECT payload FROM collections WHERE name = ?1;",
            [collection.key()],
            |row| row.get(0),
        )
        .optional()?;
    let payload = payload.ok_or(StoreError::MissingCollection(collection.key()))?;

    serde_json::from_str(&payload).map_err(|err| StoreError::InvalidData {
        collection: collection.key(),
        message: err.to_string(),
    })
}

fn write_collection<R: Serialize>(
    conn: &Connection,
    collection: Collection,
    records: &[R],
) -> StoreResult<()> {
    let payload = serde_json::to_string(records).map_err(|err| StoreError::InvalidData {
        collection: collection.key(),
        message: err.to_string(),
    })?;

    let changed = conn.execute(
        "UPDATE collections
         SET
            payload = ?2,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE name = ?1;",
        params![collection.key(), payload],
    )?;
    if changed == 0 {
        return Err(StoreError::MissingCollection(collection.key()));
    }

    debug!(
        "event=snapshot_write module=repo status=ok collection={} records={} bytes={}",
        collection.key(),
        records.len(),
        payload.len()
    );
    Ok(())
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'collections'
        );",
        [],
        |row| row.get(0),
    )?;
    if table_exists != 1 {
        return Err(StoreError::MissingCollection("collections"));
    }

    for collection in [Collection::Goals, Collection::ProgressEntries] {
        let row_exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM collections WHERE name = ?1);",
            [collection.key()],
            |row| row.get(0),
        )?;
        if row_exists != 1 {
            return Err(StoreError::MissingCollection(collection.key()));
        }
    }

    Ok(())
}
