//! Postgres access for the startup-loaded lookup tables.

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::domain::entities::{EquipmentTypeRecord, WeaponExceptionRecord};

use super::error::InfraError;

pub struct PostgresLookups {
    pool: PgPool,
}

impl PostgresLookups {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn equipment_types(&self) -> Result<Vec<EquipmentTypeRecord>, InfraError> {
        sqlx::query_as::<_, EquipmentTypeRecord>(
            "SELECT source_type_id, equipment_kind, item_kind, area_effect_ids \
             FROM equipment_types \
             ORDER BY source_type_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| InfraError::database(err.to_string()))
    }

    pub async fn weapon_exceptions(&self) -> Result<Vec<WeaponExceptionRecord>, InfraError> {
        sqlx::query_as::<_, WeaponExceptionRecord>(
            "SELECT source_weapon_id, area_effect_id \
             FROM weapon_exceptions \
             ORDER BY source_weapon_id, area_effect_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| InfraError::database(err.to_string()))
    }
}
