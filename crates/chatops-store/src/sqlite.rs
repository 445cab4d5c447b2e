//! SQLite-backed `RepositoryStore` implementation with durable persistence.
//!
//! Pipelines are stored as an embedded JSON document on the repository row,
//! keyed by the unique repository name.

use crate::{
    apply_default_pipeline, Repository, RepositoryStore, RepositoryStoreError, StoreResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SELECT_REPOSITORY_COLUMNS: &str =
    "SELECT id, name, url, default_branch, added_by, added_at, pipelines_json FROM repositories";

/// Persistent SQLite store backend for the repository directory.
#[derive(Debug, Clone)]
pub struct SqliteRepositoryStore {
    db_path: PathBuf,
}

impl SqliteRepositoryStore {
    /// Creates a SQLite-backed store at `path`, creating schema if needed.
    pub fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self { db_path };
        let connection = open_connection(&store.db_path)?;
        initialize_schema(&connection)?;
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn run_blocking<T, F>(&self, operation: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = open_connection(&db_path)?;
            operation(&mut connection)
        })
        .await
        .map_err(|error| RepositoryStoreError::Task(error.to_string()))?
    }
}

fn open_connection(db_path: &Path) -> StoreResult<Connection> {
    let connection = Connection::open(db_path)?;
    connection.busy_timeout(Duration::from_secs(5))?;
    connection.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        "#,
    )?;
    Ok(connection)
}

fn initialize_schema(connection: &Connection) -> StoreResult<()> {
    connection.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS repositories (
            name TEXT PRIMARY KEY,
            id TEXT NOT NULL,
            url TEXT NOT NULL,
            default_branch TEXT NOT NULL,
            added_by TEXT NOT NULL,
            added_at TEXT NOT NULL,
            pipelines_json TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

#[async_trait]
impl RepositoryStore for SqliteRepositoryStore {
    async fn add_repository(&self, repository: Repository) -> StoreResult<()> {
        if repository.name.trim().is_empty() {
            return Err(RepositoryStoreError::EmptyRepositoryName);
        }
        self.run_blocking(move |connection| {
            let inserted = connection.execute(
                r#"
                INSERT INTO repositories (
                    name, id, url, default_branch, added_by, added_at, pipelines_json
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    repository.name,
                    repository.id,
                    repository.url,
                    repository.default_branch,
                    repository.added_by,
                    timestamp_to_db(repository.added_at),
                    serde_json::to_string(&repository.pipelines)?,
                ],
            );
            match inserted {
                Ok(_) => Ok(()),
                Err(error) if is_unique_violation(&error) => Err(
                    RepositoryStoreError::RepositoryAlreadyExists(repository.name),
                ),
                Err(error) => Err(error.into()),
            }
        })
        .await
    }

    async fn get_repository(&self, name: &str) -> StoreResult<Repository> {
        let name = name.to_string();
        self.run_blocking(move |connection| {
            load_repository(connection, &name)?
                .ok_or(RepositoryStoreError::RepositoryNotFound(name))
        })
        .await
    }

    async fn list_repositories(&self) -> StoreResult<Vec<Repository>> {
        self.run_blocking(|connection| {
            let mut statement =
                connection.prepare(&format!("{SELECT_REPOSITORY_COLUMNS} ORDER BY name"))?;
            let rows = statement.query_map([], read_repository_row)?;
            let mut repositories = Vec::new();
            for row in rows {
                repositories.push(repository_from_row(row?)?);
            }
            Ok(repositories)
        })
        .await
    }

    async fn update_repository(&self, repository: Repository) -> StoreResult<()> {
        self.run_blocking(move |connection| {
            let changed = connection.execute(
                r#"
                UPDATE repositories
                SET url = ?1, default_branch = ?2, pipelines_json = ?3
                WHERE name = ?4
                "#,
                params![
                    repository.url,
                    repository.default_branch,
                    serde_json::to_string(&repository.pipelines)?,
                    repository.name,
                ],
            )?;
            if changed == 0 {
                return Err(RepositoryStoreError::RepositoryNotFound(repository.name));
            }
            Ok(())
        })
        .await
    }

    async fn set_default_pipeline(
        &self,
        repository_name: &str,
        pipeline_name: &str,
    ) -> StoreResult<Repository> {
        let repository_name = repository_name.to_string();
        let pipeline_name = pipeline_name.to_string();
        self.run_blocking(move |connection| {
            let transaction =
                connection.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let Some(mut repository) = load_repository(&transaction, &repository_name)? else {
                return Err(RepositoryStoreError::RepositoryNotFound(repository_name));
            };
            apply_default_pipeline(&mut repository, &pipeline_name)?;
            transaction.execute(
                "UPDATE repositories SET pipelines_json = ?1 WHERE name = ?2",
                params![serde_json::to_string(&repository.pipelines)?, repository.name],
            )?;
            transaction.commit()?;
            Ok(repository)
        })
        .await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.run_blocking(|connection| {
            connection.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}

type RepositoryRow = (String, String, String, String, String, String, String);

fn read_repository_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RepositoryRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn repository_from_row(row: RepositoryRow) -> StoreResult<Repository> {
    let (id, name, url, default_branch, added_by, added_at, pipelines_json) = row;
    Ok(Repository {
        id,
        name,
        url,
        default_branch,
        added_by,
        added_at: timestamp_from_db(&added_at)?,
        pipelines: serde_json::from_str(&pipelines_json)?,
    })
}

fn load_repository(connection: &Connection, name: &str) -> StoreResult<Option<Repository>> {
    connection
        .query_row(
            &format!("{SELECT_REPOSITORY_COLUMNS} WHERE name = ?1"),
            params![name],
            read_repository_row,
        )
        .optional()?
        .map(repository_from_row)
        .transpose()
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

fn timestamp_to_db(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

fn timestamp_from_db(value: &str) -> StoreResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
