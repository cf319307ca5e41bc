//! Section repository
//!
//! Sections are loaded together with both endpoint stations in one JOIN.
//! [`SectionRepository::apply`] writes a whole topology edit in a single
//! transaction: deletes first, then rewrites, then inserts, so the
//! unique path is never observed half-edited.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use subway_core::{LineId, Section, SectionDiff, SectionId, Station, StationId, StationName};

use super::{stored_section_ids, stored_station_id, DbError, SectionRepository};

const SECTION_SELECT: &str = r#"
    SELECT s.id, s.line_id, s.distance,
           up.id AS up_id, up.name AS up_name,
           down.id AS down_id, down.name AS down_name
    FROM sections s
    JOIN stations up ON up.id = s.up_station_id
    JOIN stations down ON down.id = s.down_station_id
"#;

/// Section joined with its endpoint stations
#[derive(Debug, Clone, FromRow)]
struct SectionRow {
    id: i64,
    line_id: i64,
    distance: i32,
    up_id: i64,
    up_name: String,
    down_id: i64,
    down_name: String,
}

impl TryFrom<SectionRow> for Section {
    type Error = DbError;

    fn try_from(row: SectionRow) -> Result<Self, Self::Error> {
        let corrupt = |e: String| DbError::corrupt("section", row.id, e);
        let up = StationName::new(&row.up_name).map_err(|e| corrupt(e.to_string()))?;
        let down = StationName::new(&row.down_name).map_err(|e| corrupt(e.to_string()))?;

        Section::with_id(
            SectionId(row.id),
            LineId(row.line_id),
            Station::persisted(StationId(row.up_id), up),
            Station::persisted(StationId(row.down_id), down),
            row.distance,
        )
        .map_err(|e| corrupt(e.to_string()))
    }
}

fn into_sections(rows: Vec<SectionRow>) -> Result<Vec<Section>, DbError> {
    rows.into_iter().map(Section::try_from).collect()
}

/// PostgreSQL section repository
#[derive(Clone)]
pub struct PgSectionRepo {
    pool: PgPool,
}

impl PgSectionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert(tx: &mut Transaction<'_, Postgres>, section: &Section) -> Result<i64, DbError> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO sections (line_id, up_station_id, down_station_id, distance)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(section.line_id().0)
    .bind(stored_station_id(section.up_station())?)
    .bind(stored_station_id(section.down_station())?)
    .bind(section.distance())
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}

async fn rewrite(tx: &mut Transaction<'_, Postgres>, section: &Section) -> Result<bool, DbError> {
    let id = section
        .id()
        .ok_or(DbError::Unsaved { resource: "section" })?;
    let result = sqlx::query(
        r#"
        UPDATE sections
        SET up_station_id = $2, down_station_id = $3, distance = $4
        WHERE id = $1
        "#,
    )
    .bind(id.0)
    .bind(stored_station_id(section.up_station())?)
    .bind(stored_station_id(section.down_station())?)
    .bind(section.distance())
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

async fn delete_ids(tx: &mut Transaction<'_, Postgres>, ids: &[i64]) -> Result<u64, DbError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let result = sqlx::query("DELETE FROM sections WHERE id = ANY($1)")
        .bind(ids)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

#[async_trait]
impl SectionRepository for PgSectionRepo {
    async fn save(&self, section: &Section) -> Result<SectionId, DbError> {
        let mut tx = self.pool.begin().await?;
        let id = insert(&mut tx, section).await?;
        tx.commit().await?;

        tracing::debug!(section_id = id, line_id = %section.line_id(), "section saved");
        Ok(SectionId(id))
    }

    async fn find_by_id(&self, id: SectionId) -> Result<Option<Section>, DbError> {
        let sql = format!("{SECTION_SELECT} WHERE s.id = $1");
        sqlx::query_as::<_, SectionRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .map(Section::try_from)
            .transpose()
    }

    async fn find_by_line_id(&self, line_id: LineId) -> Result<Vec<Section>, DbError> {
        let sql = format!("{SECTION_SELECT} WHERE s.line_id = $1 ORDER BY s.id");
        let rows = sqlx::query_as::<_, SectionRow>(&sql)
            .bind(line_id.0)
            .fetch_all(&self.pool)
            .await?;
        into_sections(rows)
    }

    async fn find_all(&self) -> Result<Vec<Section>, DbError> {
        let sql = format!("{SECTION_SELECT} ORDER BY s.line_id, s.id");
        let rows = sqlx::query_as::<_, SectionRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        into_sections(rows)
    }

    async fn update(&self, section: &Section) -> Result<bool, DbError> {
        let mut tx = self.pool.begin().await?;
        let updated = rewrite(&mut tx, section).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_sections(&self, sections: &[Section]) -> Result<u64, DbError> {
        let ids = stored_section_ids(sections);
        let mut tx = self.pool.begin().await?;
        let deleted = delete_ids(&mut tx, &ids).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn delete_by_line_id(&self, line_id: LineId) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM sections WHERE line_id = $1")
            .bind(line_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn is_station_used(&self, station_id: StationId) -> Result<bool, DbError> {
        let (used,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM sections
                WHERE up_station_id = $1 OR down_station_id = $1
            )
            "#,
        )
        .bind(station_id.0)
        .fetch_one(&self.pool)
        .await?;
        Ok(used)
    }

    async fn apply(&self, diff: &SectionDiff) -> Result<(), DbError> {
        if diff.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        let removed = delete_ids(&mut tx, &stored_section_ids(&diff.removed)).await?;
        for section in &diff.updated {
            rewrite(&mut tx, section).await?;
        }
        for section in &diff.added {
            insert(&mut tx, section).await?;
        }
        tx.commit().await?;

        tracing::debug!(
            added = diff.added.len(),
            updated = diff.updated.len(),
            removed,
            "section edit applied"
        );
        Ok(())
    }
}
