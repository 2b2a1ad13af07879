//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Configurações da integração (leitura livre, mutação só para ADMIN)
    let settings_routes = Router::new()
        .route(
            "/tiny",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route("/tiny/token", post(handlers::settings::set_token));

    let transportadora_routes = Router::new()
        .route(
            "/",
            post(handlers::transportadoras::create_transportadora)
                .get(handlers::transportadoras::list_transportadoras),
        )
        .route("/resolver", get(handlers::transportadoras::resolver_transportadora))
        .route("/{id}", put(handlers::transportadoras::update_transportadora));

    let pickup_routes = Router::new()
        .route(
            "/",
            post(handlers::pickups::create_pickup).get(handlers::pickups::list_pickups),
        )
        .route("/excluir-em-massa", post(handlers::pickups::excluir_em_massa))
        .route("/{id}", get(handlers::pickups::get_pickup))
        .route("/{id}/linhas-tempo", post(handlers::pickups::create_linha_tempo))
        .route(
            "/{id}/linhas-tempo/{linha_id}/encerrar",
            post(handlers::pickups::encerrar_linha_tempo),
        )
        .route("/{id}/ocorrencias", post(handlers::pickups::create_ocorrencia))
        .route(
            "/{id}/ocorrencias/{ocorrencia_id}/resolver",
            post(handlers::pickups::resolver_ocorrencia),
        );

    let tiny_routes = Router::new()
        .route("/pedidos", get(handlers::tiny::pesquisar_pedidos))
        .route("/pedidos/{id}", get(handlers::tiny::obter_pedido))
        .route("/v3/pedidos", get(handlers::tiny::pesquisar_pedidos_v3))
        .route("/v3/pedidos/{id}", get(handlers::tiny::obter_pedido_v3))
        .route("/pedidos/{id}/marcar-enviado", post(handlers::tiny::marcar_enviado))
        .route("/expedicoes/{id}", get(handlers::tiny::obter_expedicao))
        .route("/transportadoras", get(handlers::tiny::pesquisar_transportadoras))
        .route("/oauth/autorizar", get(handlers::tiny::oauth_autorizar))
        .route("/oauth/token", post(handlers::tiny::oauth_token));

    // Tudo protegido pelo guard de autenticação; health e docs ficam fora.
    let api = Router::new()
        .nest("/api/configuracoes", settings_routes)
        .nest("/api/transportadoras", transportadora_routes)
        .nest("/api/pickups", pickup_routes)
        .nest("/api/tiny", tiny_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
