// src/handlers/settings.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AuthenticatedUser, exigir_admin},
    models::settings::{TinyEnvironment, TinySettingsView},
};

// GET /api/configuracoes/tiny
#[utoipa::path(
    get,
    path = "/api/configuracoes/tiny",
    tag = "Configurações",
    responses(
        (status = 200, description = "Configurações do Tiny (tokens nunca saem em claro)", body = TinySettingsView)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let workspace = app_state.workspace_repo.get_or_create_default().await?;

    let view = match app_state.settings_repo.get(workspace.id).await? {
        Some(settings) => TinySettingsView::from(settings),
        None => TinySettingsView::padrao(workspace.id),
    };

    Ok((StatusCode::OK, Json(view)))
}

pub(crate) fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTinySettingsPayload {
    #[schema(example = "test")]
    pub environment: TinyEnvironment,
    #[serde(default = "default_true")]
    #[schema(example = true)]
    pub is_active: bool,
}

// PUT /api/configuracoes/tiny
#[utoipa::path(
    put,
    path = "/api/configuracoes/tiny",
    tag = "Configurações",
    request_body = UpdateTinySettingsPayload,
    responses(
        (status = 200, description = "Configurações atualizadas", body = TinySettingsView),
        (status = 403, description = "Apenas ADMIN pode trocar o ambiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateTinySettingsPayload>,
) -> Result<impl IntoResponse, AppError> {
    // Trocar o ambiente muda qual token vai para as chamadas; só ADMIN.
    exigir_admin(&user)?;

    let workspace = app_state.workspace_repo.get_or_create_default().await?;

    let atualizado = app_state
        .settings_repo
        .update_settings(
            &app_state.db_pool,
            workspace.id,
            payload.environment,
            payload.is_active,
        )
        .await?;

    Ok((StatusCode::OK, Json(TinySettingsView::from(atualizado))))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetTokenPayload {
    #[schema(example = "test")]
    pub environment: TinyEnvironment,
    #[validate(length(min = 1, message = "obrigatório"))]
    pub token: String,
}

// POST /api/configuracoes/tiny/token
#[utoipa::path(
    post,
    path = "/api/configuracoes/tiny/token",
    tag = "Configurações",
    request_body = SetTokenPayload,
    responses(
        (status = 200, description = "Token cifrado e gravado", body = TinySettingsView),
        (status = 403, description = "Apenas ADMIN pode gravar credenciais")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_token(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<SetTokenPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    exigir_admin(&user)?;

    let workspace = app_state.workspace_repo.get_or_create_default().await?;

    // O token em claro vive só neste escopo; gravado, circula cifrado.
    let atualizado = app_state
        .credential_vault
        .set_token(
            &app_state.db_pool,
            workspace.id,
            payload.environment,
            &payload.token,
        )
        .await?;

    Ok((StatusCode::OK, Json(TinySettingsView::from(atualizado))))
}
