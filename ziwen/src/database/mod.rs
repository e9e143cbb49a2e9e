mod types;

use std::{path::Path, sync::Arc};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Executor, Row, Sqlite,
};

pub use types::{PointsEntry, Tracked};

use crate::{ajo::Ajo, config::Config, Error};

type Pool = sqlx::Pool<Sqlite>;

pub struct Database {
    pub(crate) pool: Pool,
}

impl Database {
    pub async fn new(config: &Config) -> Result<Arc<Database>, Error> {
        log::info!("Opening database at {}", config.database_path.display());
        Ok(Arc::new(Database::open(&config.database_path).await?))
    }

    /// Open, creating if needed, the database file at `path`.
    pub async fn open(path: &Path) -> Result<Database, Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(32)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .pragma("cache_size", "-32768")
                    .busy_timeout(std::time::Duration::from_secs(600)),
            )
            .await?;

        // Do some init. Create the tables...

        // LOCAL_DATABASE:
        // id (post ID, unique primary key)
        // created_time (seconds since epoch)
        // ajo (the request record as JSON)
        // revision (bumped on every write)
        pool.execute(sqlx::query(
            "
                CREATE TABLE IF NOT EXISTS local_database (
                    id TEXT PRIMARY KEY NOT NULL,
                    created_time INTEGER NOT NULL,
                    ajo TEXT NOT NULL,
                    revision INTEGER NOT NULL DEFAULT 0
                ) STRICT;",
        ))
        .await?;

        // Transparent database migration for files made before revisions existed.
        // Will fail harmlessly if the column already exists.
        let _ = sqlx::query(
            "ALTER TABLE local_database
        ADD COLUMN revision INTEGER NOT NULL DEFAULT 0;",
        )
        .execute(&pool)
        .await;

        // Records that failed to parse, kept for a human to look at.
        pool.execute(sqlx::query(
            "
                CREATE TABLE IF NOT EXISTS quarantined_ajos (
                    id TEXT NOT NULL,
                    ajo TEXT NOT NULL,
                    quarantined_at TEXT NOT NULL
                ) STRICT;",
        ))
        .await?;

        // Comments that were already looked at.
        pool.execute(sqlx::query(
            "
                CREATE TABLE IF NOT EXISTS old_comments (
                    id TEXT PRIMARY KEY NOT NULL
                ) STRICT;",
        ))
        .await?;

        pool.execute(sqlx::query(
            "
                CREATE TABLE IF NOT EXISTS total_points (
                    month TEXT NOT NULL,
                    comment_id TEXT NOT NULL,
                    username TEXT NOT NULL COLLATE NOCASE,
                    points INTEGER NOT NULL,
                    post_id TEXT NOT NULL
                ) STRICT;",
        ))
        .await?;

        // Posts the streamer crossposted, keyed by the original's URL.
        pool.execute(sqlx::query(
            "
                CREATE TABLE IF NOT EXISTS crossposts (
                    url TEXT PRIMARY KEY NOT NULL COLLATE NOCASE,
                    post_id TEXT NOT NULL
                ) STRICT;",
        ))
        .await?;

        Ok(Database { pool })
    }

    /// Get the record of a post. Returns [`None`] if the post isn't tracked.
    pub async fn get(&self, id: &str) -> Result<Option<Tracked>, Error> {
        let row = sqlx::query("SELECT ajo, revision FROM local_database WHERE id=?;")
            .bind(id)
            .map(|row: SqliteRow| (row.get::<String, _>("ajo"), row.get::<i64, _>("revision")))
            .fetch_optional(&self.pool)
            .await?;

        let Some((blob, revision)) = row else {
            return Ok(None);
        };

        let ajo = serde_json::from_str(&blob).map_err(|source| Error::MalformedRecord {
            id: id.to_string(),
            source,
        })?;

        Ok(Some(Tracked {
            ajo,
            revision: Some(revision),
        }))
    }

    /// Like [`Self::get`], but a missing record is [`Error::NotFound`].
    pub async fn load(&self, id: &str) -> Result<Tracked, Error> {
        self.get(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Write a record, overwriting whatever is stored. Returns the new revision.
    pub async fn put(&self, ajo: &Ajo) -> Result<i64, Error> {
        let blob = serde_json::to_string(ajo)?;
        let revision = sqlx::query(
            "INSERT INTO local_database(id, created_time, ajo, revision)
            VALUES (?, ?, ?, 1)
        ON CONFLICT(id) DO
            UPDATE SET ajo=excluded.ajo, revision=revision+1
        RETURNING revision;",
        )
        .bind(ajo.id())
        .bind(ajo.created_utc)
        .bind(blob)
        .map(|row: SqliteRow| row.get::<i64, _>("revision"))
        .fetch_one(&self.pool)
        .await?;
        Ok(revision)
    }

    /// Write a record only if it wasn't written since it was read.
    /// Otherwise fails with [`Error::Conflict`] and leaves the stored record alone.
    pub async fn put_checked(&self, tracked: &mut Tracked) -> Result<(), Error> {
        let blob = serde_json::to_string(&tracked.ajo)?;
        let id = tracked.ajo.id();

        let result = match tracked.revision {
            None => {
                sqlx::query(
                    "INSERT INTO local_database(id, created_time, ajo, revision)
                    VALUES (?, ?, ?, 1)
                ON CONFLICT(id) DO NOTHING;",
                )
                .bind(id)
                .bind(tracked.ajo.created_utc)
                .bind(blob)
                .execute(&self.pool)
                .await?
            }
            Some(revision) => {
                sqlx::query(
                    "UPDATE local_database SET ajo=?, revision=revision+1
                WHERE id=? AND revision=?;",
                )
                .bind(blob)
                .bind(id)
                .bind(revision)
                .execute(&self.pool)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(Error::Conflict(id.to_string()));
        }
        tracked.revision = Some(tracked.revision.map_or(1, |x| x + 1));
        Ok(())
    }

    /// Returns whether there was anything to delete.
    pub async fn delete(&self, id: &str) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM local_database WHERE id=?;")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a stored record out of the way, into `quarantined_ajos`.
    /// Returns whether there was anything to move.
    pub async fn quarantine(&self, id: &str) -> Result<bool, Error> {
        let mut transaction = self.pool.begin().await?;
        let moved = sqlx::query(
            "INSERT INTO quarantined_ajos(id, ajo, quarantined_at)
            SELECT id, ajo, ? FROM local_database WHERE id=?;",
        )
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(&mut *transaction)
        .await?;
        sqlx::query("DELETE FROM local_database WHERE id=?;")
            .bind(id)
            .execute(&mut *transaction)
            .await?;
        transaction.commit().await?;
        Ok(moved.rows_affected() > 0)
    }

    /// IDs of requests that are currently claimed by someone.
    pub async fn in_progress_ids(&self) -> Result<Vec<String>, Error> {
        Ok(sqlx::query(
            "SELECT id FROM local_database
            WHERE json_extract(ajo, '$.status') = 'inprogress';",
        )
        .map(|row: SqliteRow| row.get::<String, _>("id"))
        .fetch_all(&self.pool)
        .await?)
    }

    /// Remember a comment as processed. Returns `false` if it already was.
    pub async fn mark_comment_processed(&self, id: &str) -> Result<bool, Error> {
        let result = sqlx::query("INSERT INTO old_comments(id) VALUES (?) ON CONFLICT DO NOTHING;")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_comment_processed(&self, id: &str) -> Result<bool, Error> {
        Ok(sqlx::query("SELECT 1 FROM old_comments WHERE id=?;")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .is_some())
    }

    pub async fn add_points(&self, entry: &PointsEntry) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO total_points(month, comment_id, username, points, post_id)
            VALUES (?, ?, ?, ?, ?);",
        )
        .bind(&entry.month)
        .bind(&entry.comment_id)
        .bind(&entry.username)
        .bind(entry.points)
        .bind(&entry.post_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All-time points of a user.
    pub async fn points_for_user(&self, username: &str) -> Result<i64, Error> {
        Ok(sqlx::query(
            "SELECT COALESCE(SUM(points), 0) AS total FROM total_points WHERE username=?;",
        )
        .bind(username)
        .map(|row: SqliteRow| row.get::<i64, _>("total"))
        .fetch_one(&self.pool)
        .await?)
    }

    /// Whether this exact award was already given for this post.
    pub async fn has_points_entry(
        &self,
        username: &str,
        post_id: &str,
        points: i64,
    ) -> Result<bool, Error> {
        Ok(sqlx::query(
            "SELECT 1 FROM total_points WHERE username=? AND post_id=? AND points=? LIMIT 1;",
        )
        .bind(username)
        .bind(post_id)
        .bind(points)
        .fetch_optional(&self.pool)
        .await?
        .is_some())
    }

    pub async fn record_crosspost(&self, url: &str, post_id: &str) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO crossposts(url, post_id) VALUES (?, ?)
        ON CONFLICT DO UPDATE SET post_id=excluded.post_id;",
        )
        .bind(url)
        .bind(post_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The crosspost made of `url`, if there is one.
    pub async fn crosspost_for(&self, url: &str) -> Result<Option<String>, Error> {
        Ok(sqlx::query("SELECT post_id FROM crossposts WHERE url=?;")
            .bind(url)
            .map(|row: SqliteRow| row.get::<String, _>("post_id"))
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use sqlx::Row;
    use tempfile::TempDir;

    use super::{Database, PointsEntry, Tracked};
    use crate::{
        ajo::{fixtures, Ajo, Status},
        Error,
    };

    async fn temp_database() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::open(&dir.path().join("ziwen.sqlite")).await.unwrap();
        (dir, database)
    }

    #[tokio::test]
    async fn put_get_delete() {
        let (_dir, database) = temp_database().await;
        let ajo = fixtures::bronze_statue();

        assert!(database.get(ajo.id()).await.unwrap().is_none());
        assert_eq!(database.put(&ajo).await.unwrap(), 1);
        assert_eq!(database.put(&ajo).await.unwrap(), 2);

        let tracked = database.get(ajo.id()).await.unwrap().unwrap();
        assert_eq!(tracked.ajo(), &ajo);
        assert_eq!(tracked.revision(), Some(2));

        assert!(database.delete(ajo.id()).await.unwrap());
        assert!(!database.delete(ajo.id()).await.unwrap());
        assert!(database.get(ajo.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_is_not_found() {
        let (_dir, database) = temp_database().await;
        assert!(matches!(
            database.load("nothing").await,
            Err(Error::NotFound(id)) if id == "nothing"
        ));
    }

    #[tokio::test]
    async fn both_fixtures_survive_the_database() {
        let (_dir, database) = temp_database().await;
        for ajo in [fixtures::bronze_statue(), fixtures::great_lion()] {
            database.put(&ajo).await.unwrap();
            assert_eq!(database.load(ajo.id()).await.unwrap().into_ajo(), ajo);
        }
    }

    #[tokio::test]
    async fn lost_updates_are_refused() {
        let (_dir, database) = temp_database().await;
        let mut fresh = Tracked::new(fixtures::great_lion());
        database.put_checked(&mut fresh).await.unwrap();
        assert_eq!(fresh.revision(), Some(1));

        // Creating it a second time must not clobber the first.
        let mut duplicate = Tracked::new(fixtures::great_lion());
        assert!(matches!(
            database.put_checked(&mut duplicate).await,
            Err(Error::Conflict(_))
        ));

        let mut first = database.load("9ozxe6").await.unwrap();
        let mut second = database.load("9ozxe6").await.unwrap();

        first.ajo_mut().add_translator("first_writer");
        database.put_checked(&mut first).await.unwrap();
        assert_eq!(first.revision(), Some(2));

        second.ajo_mut().add_translator("second_writer");
        assert!(matches!(
            database.put_checked(&mut second).await,
            Err(Error::Conflict(_))
        ));

        let stored = database.load("9ozxe6").await.unwrap();
        assert!(stored.ajo().recorded_translators().contains(&"first_writer".to_string()));
        assert!(!stored.ajo().recorded_translators().contains(&"second_writer".to_string()));
    }

    #[tokio::test]
    async fn malformed_records_are_quarantined() {
        let (_dir, database) = temp_database().await;
        sqlx::query("INSERT INTO local_database(id, created_time, ajo) VALUES ('bad1', 0, '{\"id\": 5');")
            .execute(&database.pool)
            .await
            .unwrap();

        assert!(matches!(
            database.get("bad1").await,
            Err(Error::MalformedRecord { id, .. }) if id == "bad1"
        ));
        assert!(database.quarantine("bad1").await.unwrap());
        assert!(database.get("bad1").await.unwrap().is_none());
        assert!(!database.quarantine("bad1").await.unwrap());

        let kept = sqlx::query("SELECT ajo FROM quarantined_ajos WHERE id='bad1';")
            .fetch_one(&database.pool)
            .await
            .unwrap();
        assert_eq!(kept.get::<String, _>("ajo"), "{\"id\": 5");
    }

    #[tokio::test]
    async fn claimed_requests_are_found() {
        let (_dir, database) = temp_database().await;
        let mut claimed = Ajo::new("c1", 0, "op", "[Korean > English] Letter");
        claimed.set_claim("someone", 10);
        database.put(&claimed).await.unwrap();
        database.put(&fixtures::bronze_statue()).await.unwrap();
        assert_eq!(claimed.status(), Some(Status::InProgress));
        assert_eq!(database.in_progress_ids().await.unwrap(), vec!["c1".to_string()]);
    }

    #[tokio::test]
    async fn ledgers() {
        let (_dir, database) = temp_database().await;

        assert!(!database.is_comment_processed("k1").await.unwrap());
        assert!(database.mark_comment_processed("k1").await.unwrap());
        assert!(!database.mark_comment_processed("k1").await.unwrap());
        assert!(database.is_comment_processed("k1").await.unwrap());

        for (comment_id, points) in [("k1", 4), ("k2", 2)] {
            database
                .add_points(&PointsEntry {
                    month: "2018-10".to_string(),
                    comment_id: comment_id.to_string(),
                    username: "Kotobaya".to_string(),
                    points,
                    post_id: "9ozxe6".to_string(),
                })
                .await
                .unwrap();
        }
        assert_eq!(database.points_for_user("kotobaya").await.unwrap(), 6);
        assert_eq!(database.points_for_user("nobody").await.unwrap(), 0);
        assert!(database.has_points_entry("Kotobaya", "9ozxe6", 2).await.unwrap());
        assert!(!database.has_points_entry("Kotobaya", "9ozxe6", 3).await.unwrap());

        assert_eq!(database.crosspost_for("https://redd.it/abc").await.unwrap(), None);
        database.record_crosspost("https://redd.it/abc", "xp1").await.unwrap();
        assert_eq!(
            database.crosspost_for("HTTPS://REDD.IT/abc").await.unwrap().as_deref(),
            Some("xp1")
        );
    }
}
