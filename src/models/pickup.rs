// src/models/pickup.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Enums de status ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_linha_tempo", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusLinhaTempo {
    Aberta,
    Encerrada,
}

impl StatusLinhaTempo {
    /// Converte o texto vindo do payload. Valores fora do enum são
    /// rejeitados antes de qualquer consulta.
    pub fn parse(valor: &str) -> Result<Self, AppError> {
        match valor {
            "ABERTA" => Ok(Self::Aberta),
            "ENCERRADA" => Ok(Self::Encerrada),
            outro => Err(AppError::StatusInvalido(outro.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_ocorrencia", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusOcorrencia {
    Aberto,
    Resolvido,
}

impl StatusOcorrencia {
    pub fn parse(valor: &str) -> Result<Self, AppError> {
        match valor {
            "ABERTO" => Ok(Self::Aberto),
            "RESOLVIDO" => Ok(Self::Resolvido),
            outro => Err(AppError::StatusInvalido(outro.to_string())),
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pickup {
    pub id: Uuid,
    #[schema(ignore)]
    pub workspace_id: Uuid,
    #[schema(example = "123456")]
    pub numero_pedido: Option<String>,
    pub transportadora_id: Option<Uuid>,
    #[schema(example = "Correios")]
    pub transportadora_nome: String,
    pub criado_por: Option<String>,
    pub criado_em: DateTime<Utc>,
}

/// Linha do tempo: intervalo de atividade do pickup, aberto até ser
/// explicitamente encerrado. `encerrado_em`/`encerrado_por` são não-nulos
/// se e somente se status = ENCERRADA.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinhaTempoOcorrencia {
    pub id: Uuid,
    pub pickup_id: Uuid,
    #[schema(example = "Aguardando transportadora")]
    pub titulo: String,
    pub descricao: Option<String>,
    pub status: StatusLinhaTempo,
    pub encerrado_em: Option<DateTime<Utc>>,
    pub encerrado_por: Option<String>,
    pub criado_em: DateTime<Utc>,
}

/// Ocorrência: incidente registrado no pickup, mesmo par de carimbos da
/// linha do tempo (resolvido_em/resolvido_por ⇔ RESOLVIDO).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ocorrencia {
    pub id: Uuid,
    pub pickup_id: Uuid,
    #[schema(example = "Volume extraviado")]
    pub titulo: String,
    pub descricao: Option<String>,
    pub status: StatusOcorrencia,
    pub resolvido_em: Option<DateTime<Utc>>,
    pub resolvido_por: Option<String>,
    pub criado_em: DateTime<Utc>,
}

// Visão completa para a tela de detalhe (pickup + registros operacionais)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PickupDetalhe {
    #[serde(flatten)]
    pub pickup: Pickup,
    pub linhas_tempo: Vec<LinhaTempoOcorrencia>,
    pub ocorrencias: Vec<Ocorrencia>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_aceita_os_dois_status_de_linha_tempo() {
        assert_eq!(StatusLinhaTempo::parse("ABERTA").unwrap(), StatusLinhaTempo::Aberta);
        assert_eq!(StatusLinhaTempo::parse("ENCERRADA").unwrap(), StatusLinhaTempo::Encerrada);
    }

    #[test]
    fn parse_rejeita_status_desconhecido() {
        let err = StatusLinhaTempo::parse("FECHADA").unwrap_err();
        assert!(matches!(err, AppError::StatusInvalido(s) if s == "FECHADA"));
    }

    #[test]
    fn parse_ocorrencia_rejeita_minusculas() {
        // O contrato é estrito: o valor deve vir exatamente como no enum.
        assert!(StatusOcorrencia::parse("resolvido").is_err());
        assert!(StatusOcorrencia::parse("RESOLVIDO").is_ok());
    }
}
