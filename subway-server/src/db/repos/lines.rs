//! Line repository
//!
//! Handles line CRUD. `updated_at` is refreshed by the UPDATE statement,
//! and a unique violation on `name` is reported as `Duplicate`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::{FromRow, PgPool};
use subway_core::{Line, LineColor, LineId, LineName, NewLine, ValidationError};

use super::{DbError, LineRepository};

const LINE_COLUMNS: &str =
    "id, name, color, start_time, end_time, interval_time, created_at, updated_at";

/// Line record from database
#[derive(Debug, Clone, FromRow)]
struct LineRow {
    id: i64,
    name: String,
    color: String,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    interval_time: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LineRow> for Line {
    type Error = DbError;

    fn try_from(row: LineRow) -> Result<Self, Self::Error> {
        let corrupt = |e: ValidationError| DbError::corrupt("line", row.id, e);
        Ok(Line {
            id: LineId(row.id),
            name: LineName::new(&row.name).map_err(corrupt)?,
            color: LineColor::new(&row.color).map_err(corrupt)?,
            start_time: row.start_time,
            end_time: row.end_time,
            interval_time: row.interval_time,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL line repository
#[derive(Clone)]
pub struct PgLineRepo {
    pool: PgPool,
}

impl PgLineRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LineRepository for PgLineRepo {
    async fn save(&self, line: &NewLine) -> Result<Line, DbError> {
        let sql = format!(
            r#"
            INSERT INTO lines (name, color, start_time, end_time, interval_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {LINE_COLUMNS}
            "#
        );
        let row: LineRow = sqlx::query_as(&sql)
            .bind(line.name.as_str())
            .bind(line.color.as_str())
            .bind(line.start_time)
            .bind(line.end_time)
            .bind(line.interval_time)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::from_insert(e, "line", line.name.as_str()))?;

        tracing::debug!(line_id = row.id, "line saved");
        row.try_into()
    }

    async fn find_all(&self) -> Result<Vec<Line>, DbError> {
        let sql = format!("SELECT {LINE_COLUMNS} FROM lines ORDER BY id");
        sqlx::query_as::<_, LineRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Line::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: LineId) -> Result<Option<Line>, DbError> {
        let sql = format!("SELECT {LINE_COLUMNS} FROM lines WHERE id = $1");
        sqlx::query_as::<_, LineRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .map(Line::try_from)
            .transpose()
    }

    async fn find_by_name(&self, name: &LineName) -> Result<Option<Line>, DbError> {
        let sql = format!("SELECT {LINE_COLUMNS} FROM lines WHERE name = $1");
        sqlx::query_as::<_, LineRow>(&sql)
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Line::try_from)
            .transpose()
    }

    async fn update(&self, id: LineId, line: &NewLine) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE lines
            SET name = $2, color = $3, start_time = $4, end_time = $5,
                interval_time = $6, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(line.name.as_str())
        .bind(line.color.as_str())
        .bind(line.start_time)
        .bind(line.end_time)
        .bind(line.interval_time)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, "line", line.name.as_str()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: LineId) -> Result<bool, DbError> {
        // sections go with the line (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM lines WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrations};

    // Integration tests - run with DATABASE_URL set
    // cargo test -p subway-server -- --ignored

    async fn repo() -> PgLineRepo {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        PgLineRepo::new(pool)
    }

    fn unique_line(prefix: &str) -> NewLine {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        NewLine::new(&format!("{}-{}", prefix, nanos), "bg-red-600").unwrap()
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn save_find_update_delete() {
        let repo = repo().await;
        let new_line = unique_line("분당선");
        let saved = repo.save(&new_line).await.unwrap();
        assert_eq!(saved.name, new_line.name);

        let found = repo.find_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);

        let renamed = unique_line("신분당선");
        assert!(repo.update(saved.id, &renamed).await.unwrap());
        let found = repo.find_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(found.name, renamed.name);
        assert!(found.updated_at >= found.created_at);

        assert!(repo.delete_by_id(saved.id).await.unwrap());
        assert!(repo.find_by_id(saved.id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_name_is_reported() {
        let repo = repo().await;
        let line = unique_line("분당선");
        repo.save(&line).await.unwrap();

        let err = repo.save(&line).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate { resource: "line", .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn find_by_name_missing_is_none() {
        let repo = repo().await;
        let name = LineName::new("없는노선-0").unwrap();
        assert!(repo.find_by_name(&name).await.unwrap().is_none());
    }
}
