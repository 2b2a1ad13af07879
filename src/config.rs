// src/config.rs

use std::{env, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    common::crypto::CryptoService,
    db::{PickupRepository, TinySettingsRepository, TransportadoraRepository, WorkspaceRepository},
    services::{
        CredentialVault, OrderStatusSync, PickupService, TinyLegacyClient, TinyOAuthClient,
        TransportadoraService,
        tiny_legacy::TINY_API2_BASE,
        tiny_oauth::{TINY_ACCOUNTS_BASE, TINY_API_V3_BASE},
    },
};

/// Configuração da integração com o Tiny, lida uma vez na subida. Nada aqui
/// é relido de ambiente no meio de uma requisição.
#[derive(Clone)]
pub struct TinyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    // Token legado estático, usado quando o cofre não tem nada gravado.
    pub api_token_fallback: Option<String>,
    pub dry_run_default: bool,
}

impl TinyConfig {
    pub fn from_env() -> Self {
        Self {
            client_id: env::var("TINY_CLIENT_ID").ok(),
            client_secret: env::var("TINY_CLIENT_SECRET").ok(),
            redirect_uri: env::var("TINY_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:3000/api/tiny/oauth/callback".to_string()),
            api_token_fallback: env::var("TINY_API_TOKEN").ok(),
            dry_run_default: dry_run_de_env(env::var("TINY_DRY_RUN").ok().as_deref()),
        }
    }
}

/// Default do dry-run: só desligado quando alguém escreve "false"/"0" de
/// propósito. Qualquer outra coisa (inclusive ausência) fica no modo seguro.
fn dry_run_de_env(valor: Option<&str>) -> bool {
    match valor {
        Some(v) => !matches!(v.trim().to_lowercase().as_str(), "false" | "0"),
        None => true,
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub tiny: TinyConfig,
    pub workspace_repo: WorkspaceRepository,
    pub settings_repo: TinySettingsRepository,
    pub transportadora_repo: TransportadoraRepository,
    pub credential_vault: CredentialVault,
    pub tiny_legacy: TinyLegacyClient,
    pub tiny_oauth: TinyOAuthClient,
    pub order_status: OrderStatusSync,
    pub transportadora_service: TransportadoraService,
    pub pickup_service: PickupService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let tiny = TinyConfig::from_env();
        let crypto = CryptoService::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let workspace_repo = WorkspaceRepository::new(db_pool.clone());
        let settings_repo = TinySettingsRepository::new(db_pool.clone());
        let transportadora_repo = TransportadoraRepository::new(db_pool.clone());
        let pickup_repo = PickupRepository::new(db_pool.clone());

        let credential_vault = CredentialVault::new(settings_repo.clone(), crypto);
        let tiny_legacy = TinyLegacyClient::new(TINY_API2_BASE);
        let tiny_oauth = TinyOAuthClient::new(TINY_ACCOUNTS_BASE, TINY_API_V3_BASE);
        let order_status = OrderStatusSync::new(
            tiny_oauth.clone(),
            tiny_legacy.clone(),
            tiny.dry_run_default,
        );
        let transportadora_service = TransportadoraService::new(transportadora_repo.clone());
        let pickup_service = PickupService::new(
            db_pool.clone(),
            pickup_repo,
            transportadora_service.clone(),
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            tiny,
            workspace_repo,
            settings_repo,
            transportadora_repo,
            credential_vault,
            tiny_legacy,
            tiny_oauth,
            order_status,
            transportadora_service,
            pickup_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_so_desliga_com_false_explicito() {
        assert!(dry_run_de_env(None));
        assert!(dry_run_de_env(Some("true")));
        assert!(dry_run_de_env(Some("qualquer-coisa")));
        assert!(!dry_run_de_env(Some("false")));
        assert!(!dry_run_de_env(Some("FALSE")));
        assert!(!dry_run_de_env(Some("0")));
    }
}
