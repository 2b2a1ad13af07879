// src/models/transportadora.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Transportadora canônica. `nome` é o identificador em maiúsculas contra o
/// qual o matching roda; `aliases` guarda grafias alternativas na ordem em
/// que o operador as cadastrou.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transportadora {
    pub id: Uuid,
    #[schema(example = "CORREIOS")]
    pub nome: String,
    #[schema(example = "Correios")]
    pub nome_display: String,
    #[schema(example = json!(["ECT", "CORREIO"]))]
    pub aliases: Vec<String>,
    pub is_active: bool,
    pub criado_em: DateTime<Utc>,
}

/// Resultado do matching: a transportadora encontrada (se houver) e o rótulo
/// a exibir. Sem match, o texto original é preservado como rótulo.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolucaoTransportadora {
    pub transportadora: Option<Transportadora>,
    #[schema(example = "Correios")]
    pub nome_display: String,
}
