// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::settings::{TinyEnvironment, TinySettings},
};

#[derive(Clone)]
pub struct TinySettingsRepository {
    pool: PgPool,
}

impl TinySettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, workspace_id: Uuid) -> Result<Option<TinySettings>, AppError> {
        let settings = sqlx::query_as::<_, TinySettings>(
            "SELECT * FROM tiny_settings WHERE workspace_id = $1",
        )
        .bind(workspace_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    /// UPSERT do token cifrado no campo do ambiente pedido. O outro campo
    /// nunca é tocado.
    pub async fn upsert_token<'e, E>(
        &self,
        executor: E,
        workspace_id: Uuid,
        environment: TinyEnvironment,
        token_cifrado: &str,
    ) -> Result<TinySettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = match environment {
            TinyEnvironment::Production => {
                r#"
                INSERT INTO tiny_settings (workspace_id, api_token_encrypted, updated_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (workspace_id)
                DO UPDATE SET
                    api_token_encrypted = EXCLUDED.api_token_encrypted,
                    updated_at = NOW()
                RETURNING *
                "#
            }
            TinyEnvironment::Test => {
                r#"
                INSERT INTO tiny_settings (workspace_id, api_token_test_encrypted, updated_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (workspace_id)
                DO UPDATE SET
                    api_token_test_encrypted = EXCLUDED.api_token_test_encrypted,
                    updated_at = NOW()
                RETURNING *
                "#
            }
        };

        let settings = sqlx::query_as::<_, TinySettings>(sql)
            .bind(workspace_id)
            .bind(token_cifrado)
            .fetch_one(executor)
            .await?;

        Ok(settings)
    }

    /// UPSERT de environment/is_active (última escrita vence).
    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        workspace_id: Uuid,
        environment: TinyEnvironment,
        is_active: bool,
    ) -> Result<TinySettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, TinySettings>(
            r#"
            INSERT INTO tiny_settings (workspace_id, environment, is_active, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (workspace_id)
            DO UPDATE SET
                environment = EXCLUDED.environment,
                is_active = EXCLUDED.is_active,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(environment)
        .bind(is_active)
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }
}
