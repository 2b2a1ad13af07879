// src/db/transportadora_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::transportadora::Transportadora};

#[derive(Clone)]
pub struct TransportadoraRepository {
    pool: PgPool,
}

impl TransportadoraRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        nome: &str,
        nome_display: &str,
        aliases: &[String],
    ) -> Result<Transportadora, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transportadora = sqlx::query_as::<_, Transportadora>(
            r#"
            INSERT INTO transportadoras (nome, nome_display, aliases)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(nome)
        .bind(nome_display)
        .bind(aliases)
        .fetch_one(executor)
        .await?;

        Ok(transportadora)
    }

    pub async fn list_all(&self) -> Result<Vec<Transportadora>, AppError> {
        let lista = sqlx::query_as::<_, Transportadora>(
            "SELECT * FROM transportadoras ORDER BY criado_em, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(lista)
    }

    /// Lista usada pelo matching. A ordem de criação é contrato: o matching
    /// parcial devolve a primeira transportadora que satisfizer, então a
    /// varredura precisa ser estável entre execuções.
    pub async fn list_ativas(&self) -> Result<Vec<Transportadora>, AppError> {
        let lista = sqlx::query_as::<_, Transportadora>(
            "SELECT * FROM transportadoras WHERE is_active ORDER BY criado_em, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(lista)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        nome: &str,
        nome_display: &str,
        aliases: &[String],
        is_active: bool,
    ) -> Result<Transportadora, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transportadora = sqlx::query_as::<_, Transportadora>(
            r#"
            UPDATE transportadoras
            SET nome = $2, nome_display = $3, aliases = $4, is_active = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(nome)
        .bind(nome_display)
        .bind(aliases)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;

        transportadora.ok_or(AppError::TransportadoraNaoEncontrada)
    }
}
