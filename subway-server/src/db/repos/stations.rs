//! Station repository
//!
//! - save: plain INSERT, unique violation reported as `Duplicate`
//! - lookups: `fetch_optional`, absence is `None`

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use subway_core::{Station, StationId, StationName};

use super::{DbError, StationRepository};

/// Station record from database
#[derive(Debug, Clone, FromRow)]
struct StationRow {
    id: i64,
    name: String,
}

impl TryFrom<StationRow> for Station {
    type Error = DbError;

    fn try_from(row: StationRow) -> Result<Self, Self::Error> {
        let name =
            StationName::new(&row.name).map_err(|e| DbError::corrupt("station", row.id, e))?;
        Ok(Station::persisted(StationId(row.id), name))
    }
}

/// PostgreSQL station repository
#[derive(Clone)]
pub struct PgStationRepo {
    pool: PgPool,
}

impl PgStationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StationRepository for PgStationRepo {
    async fn save(&self, name: &StationName) -> Result<Station, DbError> {
        let row: StationRow =
            sqlx::query_as("INSERT INTO stations (name) VALUES ($1) RETURNING id, name")
                .bind(name.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DbError::from_insert(e, "station", name.as_str()))?;

        tracing::debug!(station_id = row.id, "station saved");
        row.try_into()
    }

    async fn find_by_id(&self, id: StationId) -> Result<Option<Station>, DbError> {
        sqlx::query_as::<_, StationRow>("SELECT id, name FROM stations WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .map(Station::try_from)
            .transpose()
    }

    async fn find_by_name(&self, name: &StationName) -> Result<Option<Station>, DbError> {
        sqlx::query_as::<_, StationRow>("SELECT id, name FROM stations WHERE name = $1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Station::try_from)
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<Station>, DbError> {
        sqlx::query_as::<_, StationRow>("SELECT id, name FROM stations ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Station::try_from)
            .collect()
    }

    async fn delete_by_id(&self, id: StationId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM stations WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
