// src/handlers/transportadoras.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AuthenticatedUser, exigir_admin},
    models::transportadora::{ResolucaoTransportadora, Transportadora},
    services::transportadora_service::normalizar,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransportadoraPayload {
    #[validate(length(min = 1, message = "obrigatório"))]
    #[schema(example = "Correios")]
    pub nome: String,

    #[schema(example = "Correios")]
    pub nome_display: Option<String>,

    #[serde(default)]
    #[schema(example = json!(["ECT", "CORREIO"]))]
    pub aliases: Vec<String>,
}

// POST /api/transportadoras
#[utoipa::path(
    post,
    path = "/api/transportadoras",
    tag = "Transportadoras",
    request_body = CreateTransportadoraPayload,
    responses(
        (status = 201, description = "Transportadora cadastrada", body = Transportadora)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_transportadora(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTransportadoraPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    exigir_admin(&user)?;

    // O canônico vai sempre em maiúsculas; o display fica como digitado.
    let nome = normalizar(&payload.nome);
    let nome_display = payload
        .nome_display
        .unwrap_or_else(|| payload.nome.trim().to_string());

    let transportadora = app_state
        .transportadora_repo
        .create(&app_state.db_pool, &nome, &nome_display, &payload.aliases)
        .await?;

    Ok((StatusCode::CREATED, Json(transportadora)))
}

// GET /api/transportadoras
#[utoipa::path(
    get,
    path = "/api/transportadoras",
    tag = "Transportadoras",
    responses(
        (status = 200, description = "Registro completo, em ordem de criação", body = [Transportadora])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_transportadoras(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let lista = app_state.transportadora_repo.list_all().await?;
    Ok((StatusCode::OK, Json(lista)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransportadoraPayload {
    #[validate(length(min = 1, message = "obrigatório"))]
    pub nome: String,
    pub nome_display: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "super::settings::default_true")]
    pub is_active: bool,
}

// PUT /api/transportadoras/{id}
#[utoipa::path(
    put,
    path = "/api/transportadoras/{id}",
    tag = "Transportadoras",
    request_body = UpdateTransportadoraPayload,
    params(("id" = Uuid, Path, description = "ID da transportadora")),
    responses(
        (status = 200, description = "Transportadora atualizada", body = Transportadora),
        (status = 404, description = "Transportadora não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_transportadora(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransportadoraPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    exigir_admin(&user)?;

    let nome = normalizar(&payload.nome);
    let nome_display = payload
        .nome_display
        .unwrap_or_else(|| payload.nome.trim().to_string());

    let transportadora = app_state
        .transportadora_repo
        .update(
            &app_state.db_pool,
            id,
            &nome,
            &nome_display,
            &payload.aliases,
            payload.is_active,
        )
        .await?;

    Ok((StatusCode::OK, Json(transportadora)))
}

#[derive(Debug, Deserialize)]
pub struct ResolverParams {
    pub nome: Option<String>,
}

// GET /api/transportadoras/resolver
#[utoipa::path(
    get,
    path = "/api/transportadoras/resolver",
    tag = "Transportadoras",
    params(("nome" = Option<String>, Query, description = "Nome livre vindo do ERP")),
    responses(
        (status = 200, description = "Resultado do matching (nunca falha por falta de match)", body = ResolucaoTransportadora)
    ),
    security(("api_jwt" = []))
)]
pub async fn resolver_transportadora(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(params): Query<ResolverParams>,
) -> Result<impl IntoResponse, AppError> {
    let resolucao = app_state
        .transportadora_service
        .resolver(params.nome.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(resolucao)))
}
