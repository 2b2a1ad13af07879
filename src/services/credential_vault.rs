// src/services/credential_vault.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{crypto::CryptoService, error::AppError},
    db::TinySettingsRepository,
    models::settings::{TinyEnvironment, TinySettings},
};

/// Cofre de credenciais do Tiny. Os tokens só existem em claro dentro da
/// requisição que precisa deles; fora disso, apenas o ciphertext circula.
#[derive(Clone)]
pub struct CredentialVault {
    settings_repo: TinySettingsRepository,
    crypto: CryptoService,
}

impl CredentialVault {
    pub fn new(settings_repo: TinySettingsRepository, crypto: CryptoService) -> Self {
        Self { settings_repo, crypto }
    }

    /// Token em claro do ambiente pedido. `TinyNaoConfigurado` quando não há
    /// linha de configurações ou não há token cadastrado para o ambiente.
    /// O valor decifrado nunca vai para o log.
    pub async fn get_token(
        &self,
        workspace_id: Uuid,
        environment: TinyEnvironment,
    ) -> Result<String, AppError> {
        let settings = self
            .settings_repo
            .get(workspace_id)
            .await?
            .ok_or(AppError::TinyNaoConfigurado)?;

        let cifrado = settings
            .token_cifrado(environment)
            .ok_or(AppError::TinyNaoConfigurado)?;

        self.crypto.decrypt(cifrado)
    }

    /// Cifra e grava o token no campo do ambiente pedido (última escrita
    /// vence). O campo do outro ambiente não é tocado.
    pub async fn set_token<'e, E>(
        &self,
        executor: E,
        workspace_id: Uuid,
        environment: TinyEnvironment,
        token: &str,
    ) -> Result<TinySettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cifrado = self.crypto.encrypt(token)?;
        self.settings_repo
            .upsert_token(executor, workspace_id, environment, &cifrado)
            .await
    }
}
