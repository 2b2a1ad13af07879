// src/services/pickup_service.rs
//
// Ciclo de vida operacional do pickup: linhas do tempo (ABERTA → ENCERRADA)
// e ocorrências (ABERTO → RESOLVIDO). As duas máquinas têm o mesmo formato;
// os carimbos de encerramento/resolução andam sempre juntos com o status.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PickupRepository,
    models::pickup::{
        LinhaTempoOcorrencia, Ocorrencia, Pickup, PickupDetalhe, StatusLinhaTempo,
        StatusOcorrencia,
    },
    services::TransportadoraService,
};

#[derive(Clone)]
pub struct PickupService {
    pool: PgPool,
    repo: PickupRepository,
    transportadoras: TransportadoraService,
}

impl PickupService {
    pub fn new(
        pool: PgPool,
        repo: PickupRepository,
        transportadoras: TransportadoraService,
    ) -> Self {
        Self { pool, repo, transportadoras }
    }

    // --- PICKUPS ---

    /// Cria o pickup resolvendo o nome livre da transportadora na hora da
    /// escrita: o rótulo gravado é o display do registro (ou o texto
    /// original quando não há match).
    pub async fn criar(
        &self,
        workspace_id: Uuid,
        numero_pedido: Option<&str>,
        transportadora_nome: Option<&str>,
        criado_por: Option<&str>,
    ) -> Result<Pickup, AppError> {
        let resolucao = self.transportadoras.resolver(transportadora_nome).await?;

        self.repo
            .create(
                &self.pool,
                workspace_id,
                numero_pedido,
                resolucao.transportadora.as_ref().map(|t| t.id),
                &resolucao.nome_display,
                criado_por,
            )
            .await
    }

    pub async fn listar(&self, workspace_id: Uuid) -> Result<Vec<Pickup>, AppError> {
        self.repo.list(workspace_id).await
    }

    pub async fn detalhe(
        &self,
        workspace_id: Uuid,
        pickup_id: Uuid,
    ) -> Result<PickupDetalhe, AppError> {
        let pickup = self
            .repo
            .get(workspace_id, pickup_id)
            .await?
            .ok_or(AppError::PickupNaoEncontrado)?;

        let linhas_tempo = self.repo.list_linhas_tempo(pickup_id).await?;
        let ocorrencias = self.repo.list_ocorrencias(pickup_id).await?;

        Ok(PickupDetalhe { pickup, linhas_tempo, ocorrencias })
    }

    pub async fn excluir_em_massa(
        &self,
        workspace_id: Uuid,
        ids: &[Uuid],
    ) -> Result<u64, AppError> {
        self.repo.delete_many(&self.pool, workspace_id, ids).await
    }

    // --- LINHAS DO TEMPO ---

    /// Nova linha do tempo, sempre ABERTA. O vínculo com o workspace é
    /// conferido antes da escrita.
    pub async fn criar_linha_tempo(
        &self,
        workspace_id: Uuid,
        pickup_id: Uuid,
        titulo: &str,
        descricao: Option<&str>,
    ) -> Result<LinhaTempoOcorrencia, AppError> {
        self.repo
            .get(workspace_id, pickup_id)
            .await?
            .ok_or(AppError::PickupNaoEncontrado)?;

        self.repo
            .create_linha_tempo(&self.pool, pickup_id, titulo, descricao, StatusLinhaTempo::Aberta)
            .await
    }

    /// Encerra a linha do tempo. A validação do status vem antes de
    /// qualquer consulta; o par (pickup, linha) é conferido pelo UPDATE:
    /// id certo sob pickup errado é `NaoEncontrado`.
    pub async fn encerrar_linha_tempo(
        &self,
        workspace_id: Uuid,
        pickup_id: Uuid,
        linha_id: Uuid,
        status: Option<&str>,
        encerrado_por: Option<&str>,
    ) -> Result<LinhaTempoOcorrencia, AppError> {
        validar_encerramento(status)?;

        self.repo
            .get(workspace_id, pickup_id)
            .await?
            .ok_or(AppError::PickupNaoEncontrado)?;

        self.repo
            .encerrar_linha_tempo(&self.pool, pickup_id, linha_id, encerrado_por)
            .await?
            .ok_or(AppError::LinhaTempoNaoEncontrada)
    }

    // --- OCORRÊNCIAS ---

    pub async fn criar_ocorrencia(
        &self,
        workspace_id: Uuid,
        pickup_id: Uuid,
        titulo: &str,
        descricao: Option<&str>,
    ) -> Result<Ocorrencia, AppError> {
        self.repo
            .get(workspace_id, pickup_id)
            .await?
            .ok_or(AppError::PickupNaoEncontrado)?;

        self.repo
            .create_ocorrencia(&self.pool, pickup_id, titulo, descricao, StatusOcorrencia::Aberto)
            .await
    }

    pub async fn resolver_ocorrencia(
        &self,
        workspace_id: Uuid,
        pickup_id: Uuid,
        ocorrencia_id: Uuid,
        status: Option<&str>,
        resolvido_por: Option<&str>,
    ) -> Result<Ocorrencia, AppError> {
        validar_resolucao(status)?;

        self.repo
            .get(workspace_id, pickup_id)
            .await?
            .ok_or(AppError::PickupNaoEncontrado)?;

        self.repo
            .resolver_ocorrencia(&self.pool, pickup_id, ocorrencia_id, resolvido_por)
            .await?
            .ok_or(AppError::OcorrenciaNaoEncontrada)
    }
}

/// O payload de encerramento pode trazer o status por extenso; qualquer
/// valor fora do enum é rejeitado aqui, antes de tocar o banco. A transição
/// é unidirecional: ABERTA não é um destino válido.
fn validar_encerramento(status: Option<&str>) -> Result<(), AppError> {
    let status = StatusLinhaTempo::parse(status.unwrap_or("ENCERRADA"))?;
    if status != StatusLinhaTempo::Encerrada {
        return Err(AppError::StatusInvalido("ABERTA".to_string()));
    }
    Ok(())
}

fn validar_resolucao(status: Option<&str>) -> Result<(), AppError> {
    let status = StatusOcorrencia::parse(status.unwrap_or("RESOLVIDO"))?;
    if status != StatusOcorrencia::Resolvido {
        return Err(AppError::StatusInvalido("ABERTO".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encerramento_sem_status_explicito_e_valido() {
        assert!(validar_encerramento(None).is_ok());
        assert!(validar_encerramento(Some("ENCERRADA")).is_ok());
    }

    #[test]
    fn status_desconhecido_e_rejeitado_antes_de_qualquer_consulta() {
        let err = validar_encerramento(Some("CANCELADA")).unwrap_err();
        assert!(matches!(err, AppError::StatusInvalido(s) if s == "CANCELADA"));
    }

    #[test]
    fn reabertura_nao_e_modelada() {
        // ABERTA é valor válido do enum, mas não é destino de transição.
        assert!(validar_encerramento(Some("ABERTA")).is_err());
        assert!(validar_resolucao(Some("ABERTO")).is_err());
    }

    #[test]
    fn resolucao_aceita_o_proprio_status_terminal() {
        assert!(validar_resolucao(None).is_ok());
        assert!(validar_resolucao(Some("RESOLVIDO")).is_ok());
        assert!(validar_resolucao(Some("FECHADO")).is_err());
    }
}
