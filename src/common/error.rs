use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Status fora do enum (ABERTA/ENCERRADA, ABERTO/RESOLVIDO).
    // Rejeitado na borda, antes de qualquer consulta ou mutação.
    #[error("Status inválido: {0}")]
    StatusInvalido(String),

    #[error("Integração com o Tiny não configurada")]
    TinyNaoConfigurado,

    // Chamada mutante sem access token. Nenhuma chamada de rede é feita.
    #[error("Não autenticado junto ao Tiny")]
    NaoAutenticado,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    AcessoNegado,

    #[error("Pickup não encontrado")]
    PickupNaoEncontrado,

    #[error("Linha do tempo não encontrada")]
    LinhaTempoNaoEncontrada,

    #[error("Ocorrência não encontrada")]
    OcorrenciaNaoEncontrada,

    #[error("Transportadora não encontrada")]
    TransportadoraNaoEncontrada,

    // Não-2xx na troca de credenciais OAuth. Status e corpo do upstream
    // são preservados para diagnóstico; nunca há retry automático.
    #[error("Falha na troca OAuth (status {status})")]
    FalhaTrocaOAuth { status: u16, corpo: String },

    // Não-2xx numa chamada mutante ao ERP.
    #[error("Chamada recusada pelo Tiny (status {status})")]
    RecusadoUpstream { status: u16, corpo: String },

    #[error("Resposta JSON inválida do Tiny")]
    JsonInvalido(String),

    #[error("Falha ao cifrar/decifrar credencial")]
    FalhaCriptografia,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de rede ao chamar o Tiny: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::StatusInvalido(valor) => {
                let body = Json(json!({ "error": format!("Status inválido: {valor}") }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::TinyNaoConfigurado => (
                StatusCode::NOT_FOUND,
                "Integração com o Tiny não configurada. Cadastre o token em /api/configuracoes/tiny/token.",
            ),
            AppError::NaoAutenticado => (
                StatusCode::UNAUTHORIZED,
                "Sem access token do Tiny para a chamada.",
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.",
            ),
            AppError::JwtError(_) => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.",
            ),
            AppError::AcessoNegado => (
                StatusCode::FORBIDDEN,
                "Apenas administradores podem executar esta operação.",
            ),
            AppError::PickupNaoEncontrado => (StatusCode::NOT_FOUND, "Pickup não encontrado."),
            AppError::LinhaTempoNaoEncontrada => (
                StatusCode::NOT_FOUND,
                "Linha do tempo não encontrada para este pickup.",
            ),
            AppError::OcorrenciaNaoEncontrada => (
                StatusCode::NOT_FOUND,
                "Ocorrência não encontrada para este pickup.",
            ),
            AppError::TransportadoraNaoEncontrada => {
                (StatusCode::NOT_FOUND, "Transportadora não encontrada.")
            }
            // Falhas do upstream viram 502 com o retorno anexado, nunca
            // rebaixadas para sucesso.
            AppError::FalhaTrocaOAuth { status, corpo } => {
                tracing::error!(status, corpo = %corpo, "Troca OAuth recusada pelo Tiny");
                let body = Json(json!({
                    "error": "Falha na troca OAuth com o Tiny.",
                    "upstreamStatus": status,
                    "upstreamBody": corpo,
                }));
                return (StatusCode::BAD_GATEWAY, body).into_response();
            }
            AppError::RecusadoUpstream { status, corpo } => {
                tracing::error!(status, corpo = %corpo, "Chamada recusada pelo Tiny");
                let body = Json(json!({
                    "error": "Chamada recusada pelo Tiny.",
                    "upstreamStatus": status,
                    "upstreamBody": corpo,
                }));
                return (StatusCode::BAD_GATEWAY, body).into_response();
            }
            AppError::HttpError(ref e) => {
                tracing::error!("Erro de rede ao chamar o Tiny: {}", e);
                (StatusCode::BAD_GATEWAY, "Erro de rede ao chamar o Tiny.")
            }
            AppError::JsonInvalido(ref corpo) => {
                // O corpo recebido fica no log para diagnóstico.
                tracing::error!(corpo = %corpo, "Resposta JSON inválida do Tiny");
                (StatusCode::INTERNAL_SERVER_ERROR, "Resposta inesperada do Tiny.")
            }
            // Todos os outros erros viram 500. O `tracing` loga a mensagem
            // detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
