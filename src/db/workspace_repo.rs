// src/db/workspace_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::settings::Workspace};

const WORKSPACE_PADRAO: &str = "Default";

#[derive(Clone)]
pub struct WorkspaceRepository {
    pool: PgPool,
}

impl WorkspaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Busca o workspace "Default", criando-o no primeiro acesso.
    /// O upsert cobre a corrida de duas requisições simultâneas.
    pub async fn get_or_create_default(&self) -> Result<Workspace, AppError> {
        let existente = sqlx::query_as::<_, Workspace>(
            "SELECT * FROM workspaces WHERE name = $1",
        )
        .bind(WORKSPACE_PADRAO)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(ws) = existente {
            return Ok(ws);
        }

        let criado = sqlx::query_as::<_, Workspace>(
            r#"
            INSERT INTO workspaces (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(WORKSPACE_PADRAO)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Workspace \"{}\" criado no primeiro acesso", WORKSPACE_PADRAO);
        Ok(criado)
    }
}
