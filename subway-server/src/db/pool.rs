//! Database connection pool
//!
//! Pool size and acquire timeout come from the `[database]` section of
//! the config file; a zero-sized pool is refused before connecting.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use subway_core::DatabaseSection;

/// Create a PostgreSQL connection pool with the default `[database]` settings.
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/subway").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, &DatabaseSection::default()).await
}

/// Create a PostgreSQL connection pool sized by `options`.
pub async fn create_pool_with_options(
    database_url: &str,
    options: &DatabaseSection,
) -> Result<PgPool, sqlx::Error> {
    pool_options(options)?.connect(database_url).await
}

fn pool_options(options: &DatabaseSection) -> Result<PgPoolOptions, sqlx::Error> {
    if options.max_connections == 0 {
        return Err(sqlx::Error::Configuration(
            "database.max_connections must be at least 1".into(),
        ));
    }
    tracing::debug!(
        max_connections = options.max_connections,
        acquire_timeout_secs = options.acquire_timeout_secs,
        "connecting to database"
    );
    Ok(PgPoolOptions::new()
        .max_connections(options.max_connections)
        .acquire_timeout(Duration::from_secs(options.acquire_timeout_secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_options_follow_config() {
        let options = DatabaseSection {
            max_connections: 12,
            acquire_timeout_secs: 2,
            ..DatabaseSection::default()
        };
        let pool = pool_options(&options).unwrap();
        assert_eq!(pool.get_max_connections(), 12);
        assert_eq!(pool.get_acquire_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn zero_sized_pool_is_refused() {
        let options = DatabaseSection {
            max_connections: 0,
            ..DatabaseSection::default()
        };
        assert!(matches!(
            pool_options(&options),
            Err(sqlx::Error::Configuration(_))
        ));
    }

    // Run with: DATABASE_URL=postgres://... cargo test -p subway-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_reaches_the_schema() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        crate::db::migrations::run(&pool).await.expect("migrations failed");

        let (tables,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM information_schema.tables
            WHERE table_name IN ('stations', 'lines', 'sections')
            "#,
        )
        .fetch_one(&pool)
        .await
        .expect("query failed");

        assert_eq!(tables, 3);
    }
}
