// src/handlers/pickups.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AuthenticatedUser, exigir_admin},
    models::pickup::{LinhaTempoOcorrencia, Ocorrencia, Pickup, PickupDetalhe},
};

// =============================================================================
//  PICKUPS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePickupPayload {
    #[schema(example = "123456")]
    pub numero_pedido: Option<String>,

    // Texto livre vindo do ERP; o matching resolve na gravação.
    #[schema(example = "correio")]
    pub transportadora_nome: Option<String>,
}

// POST /api/pickups
#[utoipa::path(
    post,
    path = "/api/pickups",
    tag = "Pickups",
    request_body = CreatePickupPayload,
    responses(
        (status = 201, description = "Pickup criado", body = Pickup)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_pickup(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreatePickupPayload>,
) -> Result<impl IntoResponse, AppError> {
    let workspace = app_state.workspace_repo.get_or_create_default().await?;

    let pickup = app_state
        .pickup_service
        .criar(
            workspace.id,
            payload.numero_pedido.as_deref(),
            payload.transportadora_nome.as_deref(),
            Some(&user.0.email),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(pickup)))
}

// GET /api/pickups
#[utoipa::path(
    get,
    path = "/api/pickups",
    tag = "Pickups",
    responses(
        (status = 200, description = "Pickups do workspace, mais recentes primeiro", body = [Pickup])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pickups(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let workspace = app_state.workspace_repo.get_or_create_default().await?;
    let pickups = app_state.pickup_service.listar(workspace.id).await?;
    Ok((StatusCode::OK, Json(pickups)))
}

// GET /api/pickups/{id}
#[utoipa::path(
    get,
    path = "/api/pickups/{id}",
    tag = "Pickups",
    params(("id" = Uuid, Path, description = "ID do pickup")),
    responses(
        (status = 200, description = "Pickup com linhas do tempo e ocorrências", body = PickupDetalhe),
        (status = 404, description = "Pickup não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_pickup(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let workspace = app_state.workspace_repo.get_or_create_default().await?;
    let detalhe = app_state.pickup_service.detalhe(workspace.id, id).await?;
    Ok((StatusCode::OK, Json(detalhe)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExcluirEmMassaPayload {
    #[validate(length(min = 1, message = "informe ao menos um id"))]
    pub ids: Vec<Uuid>,
}

// POST /api/pickups/excluir-em-massa
#[utoipa::path(
    post,
    path = "/api/pickups/excluir-em-massa",
    tag = "Pickups",
    request_body = ExcluirEmMassaPayload,
    responses(
        (status = 200, description = "Pickups removidos (cascata leva linhas do tempo e ocorrências)"),
        (status = 403, description = "Apenas ADMIN pode excluir em massa")
    ),
    security(("api_jwt" = []))
)]
pub async fn excluir_em_massa(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<ExcluirEmMassaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    exigir_admin(&user)?;

    let workspace = app_state.workspace_repo.get_or_create_default().await?;
    let removidos = app_state
        .pickup_service
        .excluir_em_massa(workspace.id, &payload.ids)
        .await?;

    Ok((StatusCode::OK, Json(json!({ "removidos": removidos }))))
}

// =============================================================================
//  LINHAS DO TEMPO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinhaTempoPayload {
    #[validate(length(min = 1, message = "obrigatório"))]
    #[schema(example = "Aguardando transportadora")]
    pub titulo: String,
    pub descricao: Option<String>,
}

// POST /api/pickups/{id}/linhas-tempo
#[utoipa::path(
    post,
    path = "/api/pickups/{id}/linhas-tempo",
    tag = "Pickups",
    request_body = CreateLinhaTempoPayload,
    params(("id" = Uuid, Path, description = "ID do pickup")),
    responses(
        (status = 201, description = "Linha do tempo aberta", body = LinhaTempoOcorrencia),
        (status = 404, description = "Pickup não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_linha_tempo(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateLinhaTempoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let workspace = app_state.workspace_repo.get_or_create_default().await?;
    let linha = app_state
        .pickup_service
        .criar_linha_tempo(workspace.id, id, &payload.titulo, payload.descricao.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(linha)))
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EncerrarPayload {
    // Aceito por extenso para validação; só ENCERRADA é destino válido.
    #[schema(example = "ENCERRADA")]
    pub status: Option<String>,
    pub encerrado_por: Option<String>,
}

// POST /api/pickups/{id}/linhas-tempo/{linhaId}/encerrar
#[utoipa::path(
    post,
    path = "/api/pickups/{id}/linhas-tempo/{linha_id}/encerrar",
    tag = "Pickups",
    request_body = EncerrarPayload,
    params(
        ("id" = Uuid, Path, description = "ID do pickup"),
        ("linha_id" = Uuid, Path, description = "ID da linha do tempo")
    ),
    responses(
        (status = 200, description = "Linha encerrada com carimbo de hora e autor", body = LinhaTempoOcorrencia),
        (status = 400, description = "Status inválido"),
        (status = 404, description = "Linha não pertence a este pickup")
    ),
    security(("api_jwt" = []))
)]
pub async fn encerrar_linha_tempo(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, linha_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<EncerrarPayload>,
) -> Result<impl IntoResponse, AppError> {
    let workspace = app_state.workspace_repo.get_or_create_default().await?;

    let encerrado_por = payload.encerrado_por.as_deref().unwrap_or(&user.0.email);
    let linha = app_state
        .pickup_service
        .encerrar_linha_tempo(
            workspace.id,
            id,
            linha_id,
            payload.status.as_deref(),
            Some(encerrado_por),
        )
        .await?;

    Ok((StatusCode::OK, Json(linha)))
}

// =============================================================================
//  OCORRÊNCIAS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOcorrenciaPayload {
    #[validate(length(min = 1, message = "obrigatório"))]
    #[schema(example = "Volume extraviado")]
    pub titulo: String,
    pub descricao: Option<String>,
}

// POST /api/pickups/{id}/ocorrencias
#[utoipa::path(
    post,
    path = "/api/pickups/{id}/ocorrencias",
    tag = "Pickups",
    request_body = CreateOcorrenciaPayload,
    params(("id" = Uuid, Path, description = "ID do pickup")),
    responses(
        (status = 201, description = "Ocorrência aberta", body = Ocorrencia),
        (status = 404, description = "Pickup não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_ocorrencia(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateOcorrenciaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let workspace = app_state.workspace_repo.get_or_create_default().await?;
    let ocorrencia = app_state
        .pickup_service
        .criar_ocorrencia(workspace.id, id, &payload.titulo, payload.descricao.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(ocorrencia)))
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolverOcorrenciaPayload {
    #[schema(example = "RESOLVIDO")]
    pub status: Option<String>,
    pub resolvido_por: Option<String>,
}

// POST /api/pickups/{id}/ocorrencias/{ocorrenciaId}/resolver
#[utoipa::path(
    post,
    path = "/api/pickups/{id}/ocorrencias/{ocorrencia_id}/resolver",
    tag = "Pickups",
    request_body = ResolverOcorrenciaPayload,
    params(
        ("id" = Uuid, Path, description = "ID do pickup"),
        ("ocorrencia_id" = Uuid, Path, description = "ID da ocorrência")
    ),
    responses(
        (status = 200, description = "Ocorrência resolvida", body = Ocorrencia),
        (status = 400, description = "Status inválido"),
        (status = 404, description = "Ocorrência não pertence a este pickup")
    ),
    security(("api_jwt" = []))
)]
pub async fn resolver_ocorrencia(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, ocorrencia_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ResolverOcorrenciaPayload>,
) -> Result<impl IntoResponse, AppError> {
    let workspace = app_state.workspace_repo.get_or_create_default().await?;

    let resolvido_por = payload.resolvido_por.as_deref().unwrap_or(&user.0.email);
    let ocorrencia = app_state
        .pickup_service
        .resolver_ocorrencia(
            workspace.id,
            id,
            ocorrencia_id,
            payload.status.as_deref(),
            Some(resolvido_por),
        )
        .await?;

    Ok((StatusCode::OK, Json(ocorrencia)))
}
