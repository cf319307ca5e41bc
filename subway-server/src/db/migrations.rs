//! Schema migrations for the subway tables
//!
//! Every statement is idempotent, so this runs on each startup.

use sqlx::PgPool;

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running subway migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stations (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lines (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            color VARCHAR(33) NOT NULL,
            start_time TIME,
            end_time TIME,
            interval_time INTEGER CHECK (interval_time > 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Stations in use cannot be dropped; a deleted line takes its sections along
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sections (
            id BIGSERIAL PRIMARY KEY,
            line_id BIGINT NOT NULL REFERENCES lines(id) ON DELETE CASCADE,
            up_station_id BIGINT NOT NULL REFERENCES stations(id) ON DELETE RESTRICT,
            down_station_id BIGINT NOT NULL REFERENCES stations(id) ON DELETE RESTRICT,
            distance INTEGER NOT NULL CHECK (distance > 0),
            CHECK (up_station_id <> down_station_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sections_line ON sections(line_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sections_up ON sections(up_station_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sections_down ON sections(down_station_id)")
        .execute(pool)
        .await?;

    tracing::info!("Subway migrations complete");
    Ok(())
}
