//! Repository for [`Mapping`] rows.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{Mapping, MappingRow};
use exn::ResultExt;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::instrument;

/// Repository for managing mappings in the database.
///
/// Each method is a single self-contained statement, so the repository can be
/// cloned freely and shared between the live watcher and the control loop.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Record a new mapping.
    ///
    /// Returns [`ErrorKind::DuplicateKey`] if the source path already has a
    /// mapping; the existing row is left untouched.
    #[instrument(level = "debug", skip_all, fields(source = %mapping.source.display()))]
    pub async fn insert(&self, mapping: &Mapping) -> Result<()> {
        let row = MappingRow::try_from(mapping)?;
        let result = sqlx::query(include_str!("../queries/insert_mapping.sql"))
            .bind(row.source_filename)
            .bind(row.target_filename)
            .execute(&self.pool)
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                exn::bail!(ErrorKind::DuplicateKey(mapping.source.clone()))
            },
            Err(e) => Err(e).or_raise(|| ErrorKind::Database),
        }
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    /// Whether a mapping exists for the given source path.
    pub async fn exists(&self, source: impl AsRef<Path>) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(include_str!("../queries/mapping_exists.sql"))
            .bind(MappingRow::text(source.as_ref(), "source path")?)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(exists)
    }

    /// Get the mapping for a source path.
    pub async fn get(&self, source: impl AsRef<Path>) -> Result<Option<Mapping>> {
        let row: Option<MappingRow> = sqlx::query_as(include_str!("../queries/get_mapping.sql"))
            .bind(MappingRow::text(source.as_ref(), "source path")?)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(row.map(Mapping::from))
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// List all mappings, ordered by source path.
    pub async fn all(&self) -> Result<Vec<Mapping>> {
        let rows: Vec<MappingRow> = sqlx::query_as(include_str!("../queries/list_mappings.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(rows.into_iter().map(Mapping::from).collect())
    }

    /// Count the number of mappings.
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_mappings.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("mapping count"))
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete the mapping for a source path.
    ///
    /// Returns `true` if a row was deleted, `false` if there was none.
    #[instrument(level = "debug", skip_all, fields(source = %source.as_ref().display()))]
    pub async fn delete(&self, source: impl AsRef<Path>) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/delete_mapping.sql"))
            .bind(MappingRow::text(source.as_ref(), "source path")?)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repository() -> Repository {
        let db = Database::connect_in_memory().await.unwrap();
        Repository::from(&db)
    }

    fn mapping(name: &str) -> Mapping {
        Mapping::new(format!("/source/Series/{name}.cbz"), format!("/target/Series/Series Chapter {name}.cbz"))
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repository().await;
        let m = mapping("1");
        assert!(!repo.exists(&m.source).await.unwrap());
        repo.insert(&m).await.unwrap();
        assert!(repo.exists(&m.source).await.unwrap());
        assert_eq!(repo.get(&m.source).await.unwrap(), Some(m));
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let repo = repository().await;
        let first = mapping("1");
        repo.insert(&first).await.unwrap();
        let second = Mapping::new(&first.source, "/target/elsewhere.cbz");
        let err = repo.insert(&second).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::DuplicateKey(p) if p == &first.source));
        // The first writer wins.
        assert_eq!(repo.get(&first.source).await.unwrap(), Some(first));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_all_is_ordered() {
        let repo = repository().await;
        for name in ["3", "1", "2"] {
            repo.insert(&mapping(name)).await.unwrap();
        }
        let all = repo.all().await.unwrap();
        let sources: Vec<_> = all.iter().map(|m| m.source.to_str().unwrap()).collect();
        assert_eq!(sources, ["/source/Series/1.cbz", "/source/Series/2.cbz", "/source/Series/3.cbz"]);
    }

    #[tokio::test]
    async fn test_delete_only_touches_one_row() {
        let repo = repository().await;
        repo.insert(&mapping("1")).await.unwrap();
        repo.insert(&mapping("2")).await.unwrap();
        assert!(repo.delete(&mapping("1").source).await.unwrap());
        assert!(!repo.delete(&mapping("1").source).await.unwrap());
        assert_eq!(repo.all().await.unwrap(), vec![mapping("2")]);
    }

    #[tokio::test]
    async fn test_sources_may_share_a_target() {
        // Two files without a readable chapter render the same link name.
        let repo = repository().await;
        let a = Mapping::new("/source/S/a.cbz", "/target/S/S Chapter Unknown.cbz");
        let b = Mapping::new("/source/S/b.cbz", "/target/S/S Chapter Unknown.cbz");
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();
        assert_eq!(repo.all().await.unwrap(), vec![a, b]);
    }
}
