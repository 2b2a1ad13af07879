// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Configurações ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::settings::set_token,

        // --- Transportadoras ---
        handlers::transportadoras::create_transportadora,
        handlers::transportadoras::list_transportadoras,
        handlers::transportadoras::update_transportadora,
        handlers::transportadoras::resolver_transportadora,

        // --- Pickups ---
        handlers::pickups::create_pickup,
        handlers::pickups::list_pickups,
        handlers::pickups::get_pickup,
        handlers::pickups::excluir_em_massa,
        handlers::pickups::create_linha_tempo,
        handlers::pickups::encerrar_linha_tempo,
        handlers::pickups::create_ocorrencia,
        handlers::pickups::resolver_ocorrencia,

        // --- Tiny ---
        handlers::tiny::pesquisar_pedidos,
        handlers::tiny::obter_pedido,
        handlers::tiny::pesquisar_pedidos_v3,
        handlers::tiny::obter_pedido_v3,
        handlers::tiny::obter_expedicao,
        handlers::tiny::pesquisar_transportadoras,
        handlers::tiny::marcar_enviado,
        handlers::tiny::oauth_autorizar,
        handlers::tiny::oauth_token,
    ),
    components(
        schemas(
            // --- Configurações ---
            models::settings::TinyEnvironment,
            models::settings::Workspace,
            models::settings::TinySettingsView,
            handlers::settings::UpdateTinySettingsPayload,
            handlers::settings::SetTokenPayload,

            // --- Transportadoras ---
            models::transportadora::Transportadora,
            models::transportadora::ResolucaoTransportadora,
            handlers::transportadoras::CreateTransportadoraPayload,
            handlers::transportadoras::UpdateTransportadoraPayload,

            // --- Pickups ---
            models::pickup::StatusLinhaTempo,
            models::pickup::StatusOcorrencia,
            models::pickup::Pickup,
            models::pickup::PickupDetalhe,
            models::pickup::LinhaTempoOcorrencia,
            models::pickup::Ocorrencia,
            handlers::pickups::CreatePickupPayload,
            handlers::pickups::ExcluirEmMassaPayload,
            handlers::pickups::CreateLinhaTempoPayload,
            handlers::pickups::EncerrarPayload,
            handlers::pickups::CreateOcorrenciaPayload,
            handlers::pickups::ResolverOcorrenciaPayload,

            // --- Tiny ---
            models::tiny::FormatoLegado,
            models::tiny::TokenOAuth,
            models::tiny::ChamadaDescrita,
            models::tiny::MarcarEnviadoResultado,
            handlers::tiny::MarcarEnviadoPayload,
        )
    ),
    tags(
        (name = "Configurações", description = "Credenciais e ambiente da integração com o Tiny"),
        (name = "Transportadoras", description = "Registro canônico e matching de nomes"),
        (name = "Pickups", description = "Coletas, linhas do tempo e ocorrências"),
        (name = "Tiny", description = "Consultas e operações contra o ERP")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
