//! Application state shared across handlers

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{
    LineRepository, MemoryStore, PgLineRepo, PgSectionRepo, PgStationRepo, SectionRepository,
    StationRepository,
};
use crate::service::{LineService, StationService};

/// Where line data lives
#[derive(Clone)]
pub enum Storage {
    Postgres(PgPool),
    Memory,
}

impl Storage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory => "memory",
        }
    }

    /// Round-trip to the store.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        match self {
            Self::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
            Self::Memory => Ok(()),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub stations: StationService,
    pub lines: LineService,
    pub storage: Storage,
}

impl AppState {
    /// Wire the services to a set of repositories.
    pub fn new(
        storage: Storage,
        stations: Arc<dyn StationRepository>,
        lines: Arc<dyn LineRepository>,
        sections: Arc<dyn SectionRepository>,
    ) -> Self {
        let station_service = StationService::new(stations, sections.clone());
        Self {
            lines: LineService::new(lines, sections, station_service.clone()),
            stations: station_service,
            storage,
        }
    }

    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Storage::Postgres(pool.clone()),
            Arc::new(PgStationRepo::new(pool.clone())),
            Arc::new(PgLineRepo::new(pool.clone())),
            Arc::new(PgSectionRepo::new(pool)),
        )
    }

    /// State backed by a fresh in-process store
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self::new(
            Storage::Memory,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
        )
    }
}
