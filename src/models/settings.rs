// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    #[schema(example = "Default")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tiny_environment", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TinyEnvironment {
    Production,
    Test,
}

/// Configurações do Tiny por workspace. Os tokens ficam cifrados; o
/// `environment` decide qual dos dois campos é decifrado na hora da chamada.
#[derive(Debug, Clone, FromRow)]
pub struct TinySettings {
    pub workspace_id: Uuid,
    pub environment: TinyEnvironment,
    pub api_token_encrypted: Option<String>,
    pub api_token_test_encrypted: Option<String>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl TinySettings {
    /// Seleciona o ciphertext do ambiente pedido (nunca o plaintext).
    pub fn token_cifrado(&self, environment: TinyEnvironment) -> Option<&str> {
        match environment {
            TinyEnvironment::Production => self.api_token_encrypted.as_deref(),
            TinyEnvironment::Test => self.api_token_test_encrypted.as_deref(),
        }
    }
}

// Visão pública das configurações: os tokens nunca saem, só a presença.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TinySettingsView {
    #[schema(ignore)]
    pub workspace_id: Uuid,
    pub environment: TinyEnvironment,
    pub api_token_configurado: bool,
    pub api_token_test_configurado: bool,
    pub is_active: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TinySettingsView {
    /// Visão antes de qualquer configuração ser gravada.
    pub fn padrao(workspace_id: Uuid) -> Self {
        Self {
            workspace_id,
            environment: TinyEnvironment::Test,
            api_token_configurado: false,
            api_token_test_configurado: false,
            is_active: true,
            updated_at: None,
        }
    }
}

impl From<TinySettings> for TinySettingsView {
    fn from(s: TinySettings) -> Self {
        Self {
            workspace_id: s.workspace_id,
            environment: s.environment,
            api_token_configurado: s.api_token_encrypted.is_some(),
            api_token_test_configurado: s.api_token_test_encrypted.is_some(),
            is_active: s.is_active,
            updated_at: Some(s.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(prod: Option<&str>, test: Option<&str>) -> TinySettings {
        TinySettings {
            workspace_id: Uuid::new_v4(),
            environment: TinyEnvironment::Test,
            api_token_encrypted: prod.map(str::to_string),
            api_token_test_encrypted: test.map(str::to_string),
            is_active: true,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_cifrado_respeita_o_ambiente() {
        let s = settings(Some("cifrado-prod"), Some("cifrado-test"));
        assert_eq!(s.token_cifrado(TinyEnvironment::Production), Some("cifrado-prod"));
        assert_eq!(s.token_cifrado(TinyEnvironment::Test), Some("cifrado-test"));
    }

    #[test]
    fn view_nao_expoe_ciphertext() {
        let view = TinySettingsView::from(settings(Some("cifrado"), None));
        assert!(view.api_token_configurado);
        assert!(!view.api_token_test_configurado);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("apiTokenEncrypted").is_none());
    }
}
