// src/models/tiny.rs
//
// Tipos de transporte das duas gerações da API do Tiny. A legada devolve
// formas variadas por endpoint, então o resultado é etiquetado pelo formato
// e o chamador faz pattern-match em vez de sondar campos.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Resposta da API legada (api2). O formato pedido na query decide a
/// variante: JSON já parseado, ou o corpo cru para XML.
#[derive(Debug, Clone)]
pub enum RespostaLegada {
    Json(serde_json::Value),
    Xml(String),
    Texto(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormatoLegado {
    Json,
    Xml,
}

impl FormatoLegado {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Xml => "XML",
        }
    }
}

/// Resultado da troca client-credentials no servidor de autorização.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenOAuth {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Corpo de uma resposta da API v3 após negociação de conteúdo.
#[derive(Debug, Clone, PartialEq)]
pub enum CorpoResposta {
    Json(serde_json::Value),
    Texto(String),
    Vazio,
}

/// Resposta bruta da API v3: status + corpo etiquetado. Sem retry
/// implícito; o chamador decide pelo status.
#[derive(Debug, Clone)]
pub struct RespostaV3 {
    pub status: u16,
    pub corpo: CorpoResposta,
}

/// Descrição de uma chamada v3, devolvida no dry-run no lugar da execução.
/// Tem que ser idêntica em forma à chamada real, para os testes poderem
/// comparar dry-run e execução de verdade.
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChamadaDescrita {
    #[schema(example = "PUT")]
    pub metodo: String,
    #[schema(example = "/pedidos/123/situacao")]
    pub path: String,
    pub corpo: serde_json::Value,
}

/// Resultado de `marcar enviado`: a flag de dry-run fica sempre visível na
/// resposta, junto com a chamada descrita e (no modo real) o retorno do ERP.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarcarEnviadoResultado {
    pub dry_run: bool,
    pub chamada: ChamadaDescrita,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resposta: Option<serde_json::Value>,
}
