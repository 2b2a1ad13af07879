// src/db/pickup_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::pickup::{LinhaTempoOcorrencia, Ocorrencia, Pickup, StatusLinhaTempo, StatusOcorrencia},
};

#[derive(Clone)]
pub struct PickupRepository {
    pool: PgPool,
}

impl PickupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PICKUPS
    // =========================================================================

    pub async fn create<'e, E>(
        &self,
        executor: E,
        workspace_id: Uuid,
        numero_pedido: Option<&str>,
        transportadora_id: Option<Uuid>,
        transportadora_nome: &str,
        criado_por: Option<&str>,
    ) -> Result<Pickup, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pickup = sqlx::query_as::<_, Pickup>(
            r#"
            INSERT INTO pickups (workspace_id, numero_pedido, transportadora_id, transportadora_nome, criado_por)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(numero_pedido)
        .bind(transportadora_id)
        .bind(transportadora_nome)
        .bind(criado_por)
        .fetch_one(executor)
        .await?;

        Ok(pickup)
    }

    pub async fn list(&self, workspace_id: Uuid) -> Result<Vec<Pickup>, AppError> {
        let pickups = sqlx::query_as::<_, Pickup>(
            "SELECT * FROM pickups WHERE workspace_id = $1 ORDER BY criado_em DESC",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(pickups)
    }

    pub async fn get(
        &self,
        workspace_id: Uuid,
        pickup_id: Uuid,
    ) -> Result<Option<Pickup>, AppError> {
        let pickup = sqlx::query_as::<_, Pickup>(
            "SELECT * FROM pickups WHERE workspace_id = $1 AND id = $2",
        )
        .bind(workspace_id)
        .bind(pickup_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pickup)
    }

    /// Exclusão em massa. Linhas de tempo e ocorrências caem junto
    /// (ON DELETE CASCADE). Retorna quantos pickups saíram.
    pub async fn delete_many<'e, E>(
        &self,
        executor: E,
        workspace_id: Uuid,
        ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let resultado = sqlx::query(
            "DELETE FROM pickups WHERE workspace_id = $1 AND id = ANY($2)",
        )
        .bind(workspace_id)
        .bind(ids)
        .execute(executor)
        .await?;

        Ok(resultado.rows_affected())
    }

    // =========================================================================
    //  LINHAS DO TEMPO
    // =========================================================================

    pub async fn create_linha_tempo<'e, E>(
        &self,
        executor: E,
        pickup_id: Uuid,
        titulo: &str,
        descricao: Option<&str>,
        status: StatusLinhaTempo,
    ) -> Result<LinhaTempoOcorrencia, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linha = sqlx::query_as::<_, LinhaTempoOcorrencia>(
            r#"
            INSERT INTO linhas_tempo_ocorrencias (pickup_id, titulo, descricao, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(pickup_id)
        .bind(titulo)
        .bind(descricao)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(linha)
    }

    pub async fn list_linhas_tempo(
        &self,
        pickup_id: Uuid,
    ) -> Result<Vec<LinhaTempoOcorrencia>, AppError> {
        let linhas = sqlx::query_as::<_, LinhaTempoOcorrencia>(
            "SELECT * FROM linhas_tempo_ocorrencias WHERE pickup_id = $1 ORDER BY criado_em",
        )
        .bind(pickup_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(linhas)
    }

    /// Encerra a linha do tempo. O WHERE casa id + pickup_id: id certo sob
    /// pickup errado não atualiza nada (proteção contra ids chutados).
    /// Reencerrar uma linha já ENCERRADA recarimba encerrado_em/encerrado_por.
    pub async fn encerrar_linha_tempo<'e, E>(
        &self,
        executor: E,
        pickup_id: Uuid,
        linha_id: Uuid,
        encerrado_por: Option<&str>,
    ) -> Result<Option<LinhaTempoOcorrencia>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linha = sqlx::query_as::<_, LinhaTempoOcorrencia>(
            r#"
            UPDATE linhas_tempo_ocorrencias
            SET status = 'ENCERRADA', encerrado_em = NOW(), encerrado_por = $3
            WHERE pickup_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(pickup_id)
        .bind(linha_id)
        .bind(encerrado_por)
        .fetch_optional(executor)
        .await?;

        Ok(linha)
    }

    // =========================================================================
    //  OCORRÊNCIAS
    // =========================================================================

    pub async fn create_ocorrencia<'e, E>(
        &self,
        executor: E,
        pickup_id: Uuid,
        titulo: &str,
        descricao: Option<&str>,
        status: StatusOcorrencia,
    ) -> Result<Ocorrencia, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ocorrencia = sqlx::query_as::<_, Ocorrencia>(
            r#"
            INSERT INTO ocorrencias (pickup_id, titulo, descricao, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(pickup_id)
        .bind(titulo)
        .bind(descricao)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(ocorrencia)
    }

    pub async fn list_ocorrencias(&self, pickup_id: Uuid) -> Result<Vec<Ocorrencia>, AppError> {
        let ocorrencias = sqlx::query_as::<_, Ocorrencia>(
            "SELECT * FROM ocorrencias WHERE pickup_id = $1 ORDER BY criado_em",
        )
        .bind(pickup_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ocorrencias)
    }

    /// Mesmo formato do encerramento da linha do tempo.
    pub async fn resolver_ocorrencia<'e, E>(
        &self,
        executor: E,
        pickup_id: Uuid,
        ocorrencia_id: Uuid,
        resolvido_por: Option<&str>,
    ) -> Result<Option<Ocorrencia>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ocorrencia = sqlx::query_as::<_, Ocorrencia>(
            r#"
            UPDATE ocorrencias
            SET status = 'RESOLVIDO', resolvido_em = NOW(), resolvido_por = $3
            WHERE pickup_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(pickup_id)
        .bind(ocorrencia_id)
        .bind(resolvido_por)
        .fetch_optional(executor)
        .await?;

        Ok(ocorrencia)
    }
}
