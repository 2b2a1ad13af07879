// src/handlers/tiny.rs
//
// Superfície HTTP da integração com o Tiny: consultas via API legada,
// marcar-enviado atrás do gate de dry-run e o fluxo OAuth (URL de
// autorização + troca client-credentials).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use reqwest::Method;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AuthenticatedUser, exigir_admin},
    models::{
        settings::TinyEnvironment,
        tiny::{CorpoResposta, MarcarEnviadoResultado, RespostaLegada, RespostaV3, TokenOAuth},
    },
};

// O access token da v3 vem do chamador a cada requisição (armazenamento de
// curta duração do lado dele); não há cache nem refresh aqui.
const HEADER_TOKEN_V3: &str = "x-tiny-token";

/// Token legado do ambiente: primeiro o cofre; sem nada gravado, vale o
/// fallback estático da configuração.
async fn token_legado(
    app_state: &AppState,
    workspace_id: Uuid,
    environment: TinyEnvironment,
) -> Result<String, AppError> {
    match app_state
        .credential_vault
        .get_token(workspace_id, environment)
        .await
    {
        Ok(token) => Ok(token),
        Err(AppError::TinyNaoConfigurado) => app_state
            .tiny
            .api_token_fallback
            .clone()
            .ok_or(AppError::TinyNaoConfigurado),
        Err(e) => Err(e),
    }
}

/// Ambiente configurado no workspace; sem linha de configurações, opera-se
/// em teste.
async fn ambiente(app_state: &AppState, workspace_id: Uuid) -> Result<TinyEnvironment, AppError> {
    Ok(app_state
        .settings_repo
        .get(workspace_id)
        .await?
        .map(|s| s.environment)
        .unwrap_or(TinyEnvironment::Test))
}

fn token_v3(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(HEADER_TOKEN_V3)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or(AppError::NaoAutenticado)
}

/// O status do Tiny volta cru para o chamador decidir; o corpo segue a
/// etiqueta da negociação de conteúdo.
fn resposta_v3(resposta: RespostaV3) -> Result<Response, AppError> {
    let status = StatusCode::from_u16(resposta.status).map_err(anyhow::Error::from)?;
    Ok(match resposta.corpo {
        CorpoResposta::Json(valor) => (status, Json(valor)).into_response(),
        CorpoResposta::Texto(texto) => (status, texto).into_response(),
        CorpoResposta::Vazio => status.into_response(),
    })
}

fn resposta_legada(resposta: RespostaLegada) -> Response {
    match resposta {
        RespostaLegada::Json(valor) => (StatusCode::OK, Json(valor)).into_response(),
        RespostaLegada::Xml(texto) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/xml")],
            texto,
        )
            .into_response(),
        RespostaLegada::Texto(texto) => (StatusCode::OK, texto).into_response(),
    }
}

// =============================================================================
//  CONSULTAS (API LEGADA)
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct PesquisaParams {
    pub pesquisa: String,
}

// GET /api/tiny/pedidos
#[utoipa::path(
    get,
    path = "/api/tiny/pedidos",
    tag = "Tiny",
    params(("pesquisa" = String, Query, description = "Texto de pesquisa de pedidos")),
    responses(
        (status = 200, description = "Retorno cru do Tiny"),
        (status = 404, description = "Integração não configurada")
    ),
    security(("api_jwt" = []))
)]
pub async fn pesquisar_pedidos(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(params): Query<PesquisaParams>,
) -> Result<Response, AppError> {
    let workspace = app_state.workspace_repo.get_or_create_default().await?;
    let env = ambiente(&app_state, workspace.id).await?;
    let token = token_legado(&app_state, workspace.id, env).await?;

    let resposta = app_state
        .tiny_legacy
        .pesquisar_pedidos(&token, &params.pesquisa)
        .await?;

    Ok(resposta_legada(resposta))
}

// GET /api/tiny/pedidos/{id}
#[utoipa::path(
    get,
    path = "/api/tiny/pedidos/{id}",
    tag = "Tiny",
    params(("id" = String, Path, description = "ID do pedido no Tiny")),
    responses(
        (status = 200, description = "Retorno cru do Tiny"),
        (status = 404, description = "Integração não configurada")
    ),
    security(("api_jwt" = []))
)]
pub async fn obter_pedido(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let workspace = app_state.workspace_repo.get_or_create_default().await?;
    let env = ambiente(&app_state, workspace.id).await?;
    let token = token_legado(&app_state, workspace.id, env).await?;

    let resposta = app_state.tiny_legacy.obter_pedido(&token, &id).await?;
    Ok(resposta_legada(resposta))
}

// GET /api/tiny/expedicoes/{id}
#[utoipa::path(
    get,
    path = "/api/tiny/expedicoes/{id}",
    tag = "Tiny",
    params(("id" = String, Path, description = "ID da expedição no Tiny")),
    responses(
        (status = 200, description = "Retorno cru do Tiny"),
        (status = 404, description = "Integração não configurada")
    ),
    security(("api_jwt" = []))
)]
pub async fn obter_expedicao(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let workspace = app_state.workspace_repo.get_or_create_default().await?;
    let env = ambiente(&app_state, workspace.id).await?;
    let token = token_legado(&app_state, workspace.id, env).await?;

    let resposta = app_state.tiny_legacy.obter_expedicao(&token, &id).await?;
    Ok(resposta_legada(resposta))
}

// GET /api/tiny/transportadoras
#[utoipa::path(
    get,
    path = "/api/tiny/transportadoras",
    tag = "Tiny",
    params(("pesquisa" = String, Query, description = "Texto de pesquisa no catálogo de transportadoras")),
    responses(
        (status = 200, description = "Retorno cru do Tiny"),
        (status = 404, description = "Integração não configurada")
    ),
    security(("api_jwt" = []))
)]
pub async fn pesquisar_transportadoras(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(params): Query<PesquisaParams>,
) -> Result<Response, AppError> {
    let workspace = app_state.workspace_repo.get_or_create_default().await?;
    let env = ambiente(&app_state, workspace.id).await?;
    let token = token_legado(&app_state, workspace.id, env).await?;

    let resposta = app_state
        .tiny_legacy
        .pesquisar_transportadoras(&token, &params.pesquisa)
        .await?;

    Ok(resposta_legada(resposta))
}

// =============================================================================
//  CONSULTAS (API V3, BEARER)
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PedidosV3Params {
    pub numero: Option<String>,
}

// GET /api/tiny/v3/pedidos
#[utoipa::path(
    get,
    path = "/api/tiny/v3/pedidos",
    tag = "Tiny",
    params(
        ("numero" = Option<String>, Query, description = "Filtro por número do pedido"),
        ("x-tiny-token" = String, Header, description = "Access token do Tiny (curta duração)")
    ),
    responses(
        (status = 200, description = "Pedidos da API v3, status do Tiny repassado cru"),
        (status = 401, description = "Sem access token")
    ),
    security(("api_jwt" = []))
)]
pub async fn pesquisar_pedidos_v3(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    headers: HeaderMap,
    Query(params): Query<PedidosV3Params>,
) -> Result<Response, AppError> {
    let token = token_v3(&headers)?;

    let path = match params.numero {
        Some(numero) => format!("/pedidos?numero={}", urlencoding::encode(&numero)),
        None => "/pedidos".to_string(),
    };

    let resposta = app_state
        .tiny_oauth
        .request(&path, Method::GET, None, &token)
        .await?;

    resposta_v3(resposta)
}

// GET /api/tiny/v3/pedidos/{id}
#[utoipa::path(
    get,
    path = "/api/tiny/v3/pedidos/{id}",
    tag = "Tiny",
    params(
        ("id" = String, Path, description = "ID do pedido no Tiny"),
        ("x-tiny-token" = String, Header, description = "Access token do Tiny (curta duração)")
    ),
    responses(
        (status = 200, description = "Pedido da API v3, status do Tiny repassado cru"),
        (status = 401, description = "Sem access token")
    ),
    security(("api_jwt" = []))
)]
pub async fn obter_pedido_v3(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let token = token_v3(&headers)?;

    let resposta = app_state
        .tiny_oauth
        .request(&format!("/pedidos/{id}"), Method::GET, None, &token)
        .await?;

    resposta_v3(resposta)
}

// =============================================================================
//  MARCAR ENVIADO
// =============================================================================

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarcarEnviadoPayload {
    // Sem a flag, vale o default da configuração (seguro: true).
    #[schema(example = true)]
    pub dry_run: Option<bool>,
}

// POST /api/tiny/pedidos/{id}/marcar-enviado
#[utoipa::path(
    post,
    path = "/api/tiny/pedidos/{id}/marcar-enviado",
    tag = "Tiny",
    request_body = MarcarEnviadoPayload,
    params(("id" = String, Path, description = "ID do pedido no Tiny")),
    responses(
        (status = 200, description = "Resultado com a flag de dry-run sempre visível", body = MarcarEnviadoResultado),
        (status = 401, description = "Sem access token para a chamada mutante"),
        (status = 502, description = "Tiny recusou a chamada")
    ),
    security(("api_jwt" = []))
)]
pub async fn marcar_enviado(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(payload): Json<MarcarEnviadoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let workspace = app_state.workspace_repo.get_or_create_default().await?;
    let env = ambiente(&app_state, workspace.id).await?;
    let dry_run = app_state.order_status.dry_run_efetivo(payload.dry_run);

    // Produção fala com a v3 (bearer); teste fica na API legada com o
    // token do cofre. Em dry-run nenhum dos dois precisa de credencial.
    let resultado = match env {
        TinyEnvironment::Production => {
            let access_token = if dry_run {
                None
            } else {
                match (&app_state.tiny.client_id, &app_state.tiny.client_secret) {
                    (Some(client_id), Some(client_secret)) => Some(
                        app_state
                            .tiny_oauth
                            .exchange(client_id, client_secret)
                            .await?
                            .access_token,
                    ),
                    _ => None,
                }
            };

            app_state
                .order_status
                .marcar_enviado(&id, payload.dry_run, access_token.as_deref())
                .await?
        }
        TinyEnvironment::Test => {
            let token = if dry_run {
                None
            } else {
                Some(token_legado(&app_state, workspace.id, TinyEnvironment::Test).await?)
            };

            app_state
                .order_status
                .marcar_enviado_legado(token.as_deref(), &id, payload.dry_run)
                .await?
        }
    };

    Ok((StatusCode::OK, Json(resultado)))
}

// =============================================================================
//  OAUTH
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AutorizarParams {
    pub state: Option<String>,
}

// GET /api/tiny/oauth/autorizar
#[utoipa::path(
    get,
    path = "/api/tiny/oauth/autorizar",
    tag = "Tiny",
    params(("state" = Option<String>, Query, description = "State opcional propagado no redirect")),
    responses(
        (status = 307, description = "Redirect para o servidor de autorização do Tiny"),
        (status = 404, description = "Client id não configurado")
    ),
    security(("api_jwt" = []))
)]
pub async fn oauth_autorizar(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(params): Query<AutorizarParams>,
) -> Result<impl IntoResponse, AppError> {
    let client_id = app_state
        .tiny
        .client_id
        .as_deref()
        .ok_or(AppError::TinyNaoConfigurado)?;

    let url = app_state.tiny_oauth.build_authorization_url(
        client_id,
        &app_state.tiny.redirect_uri,
        params.state.as_deref(),
    );

    Ok(Redirect::temporary(&url))
}

// POST /api/tiny/oauth/token
#[utoipa::path(
    post,
    path = "/api/tiny/oauth/token",
    tag = "Tiny",
    responses(
        (status = 200, description = "Access token de curta duração", body = TokenOAuth),
        (status = 404, description = "Credenciais OAuth não configuradas"),
        (status = 502, description = "Servidor de autorização recusou a troca")
    ),
    security(("api_jwt" = []))
)]
pub async fn oauth_token(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    exigir_admin(&user)?;

    let (client_id, client_secret) = match (
        &app_state.tiny.client_id,
        &app_state.tiny.client_secret,
    ) {
        (Some(id), Some(secret)) => (id.clone(), secret.clone()),
        _ => return Err(AppError::TinyNaoConfigurado),
    };

    let token = app_state
        .tiny_oauth
        .exchange(&client_id, &client_secret)
        .await?;

    Ok((StatusCode::OK, Json(token)))
}
